//! Rendering bound nodes back to concrete syntax
//!
//! Produces indented, source-like text for any bound node. Parentheses are
//! inserted only where the surrounding operator binds at least as tightly as
//! the child; statements indent one level per block, and labels hang one
//! level to the left of the statements they precede.

use crate::bound::expr::BoundExpr;
use crate::bound::stmt::{BoundBlock, BoundStmt};
use crate::interp::Value;
use crate::types::Type;
use std::fmt::{self, Write as FmtWrite};
use thiserror::Error;

/// Result type alias for printing.
pub type Result<T> = std::result::Result<T, PrintError>;

/// A failure while rendering a bound node.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The node holds a literal no source syntax exists for
    #[error("cannot print literal of type {ty}")]
    UnprintableLiteral { ty: Type },

    /// The underlying sink failed
    #[error("formatter error")]
    Fmt(#[from] fmt::Error),
}

const INDENT: &str = "    ";

/// An indentation-aware text sink.
///
/// The caller owns the underlying writer; this wrapper only tracks the
/// current indent level and lays it down at the start of each line.
pub struct IndentWriter<'a> {
    out: &'a mut dyn FmtWrite,
    indent: usize,
    at_line_start: bool,
}

impl<'a> IndentWriter<'a> {
    pub fn new(out: &'a mut dyn FmtWrite) -> IndentWriter<'a> {
        IndentWriter {
            out,
            indent: 0,
            at_line_start: true,
        }
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Saturating; the indent never goes below zero.
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Write text, laying down the indent first when at a line start.
    pub fn write(&mut self, text: &str) -> Result<()> {
        if self.at_line_start && !text.is_empty() {
            for _ in 0..self.indent {
                self.out.write_str(INDENT)?;
            }
            self.at_line_start = false;
        }
        self.out.write_str(text)?;
        Ok(())
    }

    /// Write text and terminate the line.
    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.newline()
    }

    pub fn newline(&mut self) -> Result<()> {
        self.out.write_str("\n")?;
        self.at_line_start = true;
        Ok(())
    }
}

/// Render a statement into `w`.
pub fn write_statement(w: &mut IndentWriter<'_>, stmt: &BoundStmt) -> Result<()> {
    match stmt {
        BoundStmt::Block(block) => write_block(w, block),
        BoundStmt::Expression(expr) => {
            write_expression(w, expr)?;
            w.newline()
        }
        BoundStmt::VariableDeclaration {
            symbol,
            initializer,
        } => {
            w.write(if symbol.is_read_only() { "let" } else { "imply" })?;
            w.write(" ")?;
            w.write(symbol.name())?;
            w.write(" = ")?;
            write_expression(w, initializer)?;
            w.newline()
        }
        BoundStmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            w.write("if ")?;
            write_expression(w, condition)?;
            w.newline()?;
            write_nested_statement(w, then_branch)?;
            if let Some(else_branch) = else_branch {
                w.write_line("else")?;
                write_nested_statement(w, else_branch)?;
            }
            Ok(())
        }
        BoundStmt::While { condition, body } => {
            w.write("while ")?;
            write_expression(w, condition)?;
            w.newline()?;
            write_nested_statement(w, body)
        }
        BoundStmt::DoWhile { body, condition } => {
            w.write_line("do")?;
            write_nested_statement(w, body)?;
            w.write("while ")?;
            write_expression(w, condition)?;
            w.newline()
        }
        BoundStmt::For {
            variable,
            lower,
            upper,
            body,
        } => {
            w.write("for ")?;
            w.write(variable.name())?;
            w.write(" = ")?;
            write_expression(w, lower)?;
            w.write(" to ")?;
            write_expression(w, upper)?;
            w.newline()?;
            write_nested_statement(w, body)
        }
        BoundStmt::Label(label) => {
            // Labels hang one level to the left of the surrounding statements
            let hang = w.indent_level() > 0;
            if hang {
                w.dedent();
            }
            w.write(label.name())?;
            w.write_line(":")?;
            if hang {
                w.indent();
            }
            Ok(())
        }
        BoundStmt::Goto(label) => {
            w.write("goto ")?;
            w.write_line(label.name())
        }
        BoundStmt::ConditionalGoto {
            label,
            condition,
            jump_if_true,
        } => {
            w.write("goto ")?;
            w.write(label.name())?;
            w.write(if *jump_if_true { " if " } else { " unless " })?;
            write_expression(w, condition)?;
            w.newline()
        }
        BoundStmt::Return(expression) => {
            w.write("return")?;
            if let Some(expr) = expression {
                w.write(" ")?;
                write_expression(w, expr)?;
            }
            w.newline()
        }
    }
}

fn write_block(w: &mut IndentWriter<'_>, block: &BoundBlock) -> Result<()> {
    w.write_line("{")?;
    w.indent();
    for stmt in &block.statements {
        write_statement(w, stmt)?;
    }
    w.dedent();
    w.write_line("}")
}

/// Blocks print at the current level; any other statement indents one step.
fn write_nested_statement(w: &mut IndentWriter<'_>, stmt: &BoundStmt) -> Result<()> {
    if let BoundStmt::Block(block) = stmt {
        write_block(w, block)
    } else {
        w.indent();
        write_statement(w, stmt)?;
        w.dedent();
        Ok(())
    }
}

/// Render an expression into `w`.
pub fn write_expression(w: &mut IndentWriter<'_>, expr: &BoundExpr) -> Result<()> {
    match expr {
        BoundExpr::Literal { value, .. } => write_literal(w, value),
        BoundExpr::Variable(symbol) => w.write(symbol.name()),
        BoundExpr::Assignment { symbol, value } => {
            w.write(symbol.name())?;
            w.write(" = ")?;
            write_expression(w, value)
        }
        BoundExpr::Unary { op, operand } => {
            w.write(op.kind.token())?;
            write_nested_expression(w, op.kind.precedence(), operand)
        }
        BoundExpr::Binary {
            left, op, right, ..
        } => {
            write_nested_expression(w, op.kind.precedence(), left)?;
            w.write(" ")?;
            w.write(op.kind.token())?;
            w.write(" ")?;
            write_nested_expression(w, op.kind.precedence(), right)
        }
        BoundExpr::Call {
            function,
            arguments,
        } => {
            w.write(function.name())?;
            w.write("(")?;
            for (i, argument) in arguments.iter().enumerate() {
                if i > 0 {
                    w.write(", ")?;
                }
                write_expression(w, argument)?;
            }
            w.write(")")
        }
        BoundExpr::Conversion { ty, expression } => {
            w.write(ty.name())?;
            w.write("(")?;
            write_expression(w, expression)?;
            w.write(")")
        }
        BoundExpr::Error => w.write("?"),
    }
}

/// Parenthesize exactly when the parent binds at least as tightly.
fn write_nested_expression(
    w: &mut IndentWriter<'_>,
    parent_precedence: u8,
    expr: &BoundExpr,
) -> Result<()> {
    if parent_precedence >= expression_precedence(expr) {
        w.write("(")?;
        write_expression(w, expr)?;
        w.write(")")
    } else {
        write_expression(w, expr)
    }
}

fn expression_precedence(expr: &BoundExpr) -> u8 {
    match expr {
        BoundExpr::Unary { op, .. } => op.kind.precedence(),
        BoundExpr::Binary { op, .. } => op.kind.precedence(),
        BoundExpr::Assignment { .. } => 0,
        _ => u8::MAX,
    }
}

fn write_literal(w: &mut IndentWriter<'_>, value: &Value) -> Result<()> {
    match value {
        Value::Bool(b) => w.write(if *b { "true" } else { "false" }),
        Value::Int(n) => w.write(&n.to_string()),
        Value::String(s) => {
            w.write("\"")?;
            w.write(&s.replace('"', "\"\""))?;
            w.write("\"")
        }
        Value::Unit => Err(PrintError::UnprintableLiteral { ty: Type::Unit }),
    }
}

/// Render a statement to a fresh string.
pub fn statement_to_string(stmt: &BoundStmt) -> Result<String> {
    let mut text = String::new();
    write_statement(&mut IndentWriter::new(&mut text), stmt)?;
    Ok(text)
}

/// Render an expression to a fresh string.
pub fn expression_to_string(expr: &BoundExpr) -> Result<String> {
    let mut text = String::new();
    write_expression(&mut IndentWriter::new(&mut text), expr)?;
    Ok(text)
}

impl fmt::Display for BoundExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        write_expression(&mut IndentWriter::new(&mut text), self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for BoundStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        write_statement(&mut IndentWriter::new(&mut text), self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Display for BoundBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        write_block(&mut IndentWriter::new(&mut text), self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
