//! The tree-walking evaluator
//!
//! Interprets a lowered bound program: resolves the entry function, walks
//! each function body with a label-indexed program counter, keeps one local
//! frame per call plus the caller-owned global map, and dispatches calls to
//! user functions and built-ins.

use crate::bound::ops::{BinaryOpKind, BinaryOperator, UnaryOpKind, UnaryOperator};
use crate::bound::{BoundBlock, BoundExpr, BoundProgram, BoundStmt};
use crate::conversion::{self, Conversion};
use crate::interp::builtins;
use crate::interp::error::{Result, RuntimeError};
use crate::interp::scope::{Frame, Frames};
use crate::interp::value::Value;
use crate::symbols::{BoundLabel, FunctionSymbol, VariableSymbol};
use crate::types::Type;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tracing::{debug, trace};

// Stack growth parameters for deep expression trees and call chains
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Maximum number of nested calls before the evaluator gives up.
const MAX_CALL_DEPTH: usize = 10_000;

/// The caller-owned global variable map.
pub type Globals = HashMap<VariableSymbol, Value>;

/// Evaluate `program` against `globals` using the process's standard streams.
pub fn evaluate(program: &BoundProgram, globals: &mut Globals) -> Result<Value> {
    Evaluator::new(program, globals).evaluate()
}

/// One evaluation of one bound program.
///
/// Not re-entrant; evaluate concurrently by constructing independent
/// evaluators over independent global maps.
pub struct Evaluator<'a> {
    /// Function table merged across the program chain; immutable after startup
    functions: HashMap<Rc<FunctionSymbol>, Rc<BoundBlock>>,
    entry: Option<Rc<FunctionSymbol>>,
    globals: &'a mut Globals,
    locals: Frames,
    call_depth: usize,
    /// Constructed on the first `rnd` call, reused thereafter
    rng: Option<StdRng>,
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
}

impl<'a> Evaluator<'a> {
    /// An evaluator over the standard streams.
    pub fn new(program: &BoundProgram, globals: &'a mut Globals) -> Evaluator<'a> {
        Self::with_io(
            program,
            globals,
            Box::new(std::io::stdin().lock()),
            Box::new(std::io::stdout()),
        )
    }

    /// An evaluator with injected streams; `input` feeds the `input`
    /// built-in, `output` receives `print`.
    pub fn with_io(
        program: &BoundProgram,
        globals: &'a mut Globals,
        input: Box<dyn BufRead + 'a>,
        output: Box<dyn Write + 'a>,
    ) -> Evaluator<'a> {
        Evaluator {
            functions: collect_functions(program),
            entry: program.entry().cloned(),
            globals,
            locals: Frames::new(),
            call_depth: 0,
            rng: None,
            input,
            output,
        }
    }

    /// Seed the `rnd` built-in for deterministic runs.
    pub fn seed_random(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// Run the entry function to completion.
    ///
    /// Returns `Value::Unit` when the program has no entry function.
    pub fn evaluate(&mut self) -> Result<Value> {
        let Some(entry) = self.entry.clone() else {
            debug!("no entry function; nothing to evaluate");
            return Ok(Value::Unit);
        };
        trace!(entry = entry.name(), "starting evaluation");
        let body = self.function_body(&entry)?;
        self.locals.push();
        let result = self.eval_block(&body);
        self.locals.pop();
        result
    }

    /// Execute the statements of one lowered block.
    ///
    /// The program counter starts at 0; jumps move it through the label
    /// index; falling off the end yields the last expression value.
    fn eval_block(&mut self, block: &BoundBlock) -> Result<Value> {
        let labels = label_index(block)?;
        let mut last = Value::Unit;
        let mut pc = 0;
        while pc < block.statements.len() {
            match &block.statements[pc] {
                BoundStmt::VariableDeclaration {
                    symbol,
                    initializer,
                } => {
                    let value = self.eval_expr(initializer)?;
                    last = value.clone();
                    self.assign(symbol, value);
                    pc += 1;
                }
                BoundStmt::Expression(expr) => {
                    last = self.eval_expr(expr)?;
                    pc += 1;
                }
                BoundStmt::Label(_) => pc += 1,
                BoundStmt::Goto(label) => pc = jump_target(&labels, label)?,
                BoundStmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    let value = self.eval_expr(condition)?;
                    let truthy = value.as_condition().ok_or_else(|| {
                        RuntimeError::structural(format!(
                            "jump condition evaluated to {}",
                            value.type_name()
                        ))
                    })?;
                    if truthy == *jump_if_true {
                        pc = jump_target(&labels, label)?;
                    } else {
                        pc += 1;
                    }
                }
                BoundStmt::Return(expression) => {
                    return match expression {
                        Some(expr) => self.eval_expr(expr),
                        None => Ok(Value::Unit),
                    };
                }
                other => return Err(RuntimeError::unexpected_node(other.kind())),
            }
        }
        Ok(last)
    }

    fn eval_expr(&mut self, expr: &BoundExpr) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &BoundExpr) -> Result<Value> {
        match expr {
            BoundExpr::Literal { value, .. } => Ok(value.clone()),
            BoundExpr::Variable(symbol) => self.read_variable(symbol),
            BoundExpr::Assignment { symbol, value } => {
                let value = self.eval_expr(value)?;
                self.assign(symbol, value.clone());
                Ok(value)
            }
            BoundExpr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                self.eval_unary(*op, operand.ty(), value)
            }
            BoundExpr::Binary {
                left,
                op,
                right,
                ty,
            } => {
                let lhs = self.eval_expr(left)?;
                let rhs = self.eval_expr(right)?;
                self.eval_binary(*op, left.ty(), right.ty(), *ty, lhs, rhs)
            }
            BoundExpr::Call {
                function,
                arguments,
            } => self.eval_call(function, arguments),
            BoundExpr::Conversion { ty, expression } => {
                let value = self.eval_expr(expression)?;
                Ok(conversion::convert(*ty, value)?)
            }
            BoundExpr::Error => Err(RuntimeError::structural(
                "error expression reached the evaluator",
            )),
        }
    }

    /// Apply a unary operator: widen the operand into the operator's domain,
    /// operate, then narrow the result back to the declared type.
    fn eval_unary(&mut self, op: UnaryOperator, operand_ty: Type, value: Value) -> Result<Value> {
        if !Conversion::classify(operand_ty, op.result).is_implicit {
            return Err(RuntimeError::structural(format!(
                "operand of unary {} cannot widen from {} to {}",
                op.kind, operand_ty, op.result
            )));
        }
        let value = conversion::convert(op.result, value)?;
        let result = apply_unary(op.kind, value)?;
        Ok(conversion::convert(op.result, result)?)
    }

    /// Apply a binary operator. Polymorphic operators convert both operands
    /// to the node type first and narrow the result back; fixed operators
    /// operate directly.
    fn eval_binary(
        &mut self,
        op: BinaryOperator,
        lhs_ty: Type,
        rhs_ty: Type,
        node_ty: Type,
        lhs: Value,
        rhs: Value,
    ) -> Result<Value> {
        let (lhs, rhs) = match op.result {
            None => {
                if !Conversion::classify(lhs_ty, node_ty).is_implicit
                    || !Conversion::classify(rhs_ty, node_ty).is_implicit
                {
                    return Err(RuntimeError::structural(format!(
                        "operands of {} cannot widen from ({}, {}) to {}",
                        op.kind, lhs_ty, rhs_ty, node_ty
                    )));
                }
                (
                    conversion::convert(node_ty, lhs)?,
                    conversion::convert(node_ty, rhs)?,
                )
            }
            Some(_) => (lhs, rhs),
        };
        let value = apply_binary(op.kind, lhs, rhs)?;
        Ok(conversion::convert(node_ty, value)?)
    }

    fn eval_call(
        &mut self,
        function: &Rc<FunctionSymbol>,
        arguments: &[BoundExpr],
    ) -> Result<Value> {
        if arguments.len() != function.parameters().len() {
            return Err(RuntimeError::arity_mismatch(
                function.name(),
                function.parameters().len(),
                arguments.len(),
            ));
        }

        if builtins::is_input(function) {
            return self.builtin_input();
        }
        if builtins::is_print(function) {
            let value = self.eval_expr(&arguments[0])?;
            return self.builtin_print(value);
        }
        if builtins::is_rnd(function) {
            let value = self.eval_expr(&arguments[0])?;
            return self.builtin_rnd(value);
        }

        trace!(function = function.name(), "user call");

        // Arguments are evaluated in the caller's scope, left to right,
        // then bound into the callee's fresh frame.
        let mut frame = Frame::new();
        for (parameter, argument) in function.parameters().iter().zip(arguments) {
            let value = self.eval_expr(argument)?;
            frame.insert(parameter.clone(), value);
        }

        let body = self.function_body(function)?;
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow {
                limit: MAX_CALL_DEPTH,
            });
        }
        self.call_depth += 1;
        self.locals.push_frame(frame);
        let result =
            stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_block(&body));
        self.locals.pop();
        self.call_depth -= 1;
        result
    }

    fn builtin_input(&mut self) -> Result<Value> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Value::String(line))
    }

    fn builtin_print(&mut self, value: Value) -> Result<Value> {
        writeln!(self.output, "{value}")?;
        self.output.flush()?;
        Ok(Value::Unit)
    }

    fn builtin_rnd(&mut self, value: Value) -> Result<Value> {
        let bound = value.as_int().ok_or_else(|| {
            RuntimeError::structural(format!("rnd bound evaluated to {}", value.type_name()))
        })?;
        if bound <= 0 {
            return Err(RuntimeError::InvalidRandomBound { bound });
        }
        let rng = self.rng.get_or_insert_with(StdRng::from_entropy);
        Ok(Value::Int(rng.gen_range(0..bound)))
    }

    fn read_variable(&self, symbol: &VariableSymbol) -> Result<Value> {
        let value = if symbol.is_global() {
            self.globals.get(symbol)
        } else {
            self.locals.get(symbol)
        };
        value
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(symbol.name()))
    }

    fn assign(&mut self, symbol: &VariableSymbol, value: Value) {
        if symbol.is_global() {
            self.globals.insert(symbol.clone(), value);
        } else {
            self.locals.define(symbol.clone(), value);
        }
    }

    fn function_body(&self, function: &FunctionSymbol) -> Result<Rc<BoundBlock>> {
        self.functions
            .get(function)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_function(function.name()))
    }
}

/// Merge the function tables of the whole program chain, newest first.
/// A function already seen shadows any earlier definition.
fn collect_functions(
    program: &BoundProgram,
) -> HashMap<Rc<FunctionSymbol>, Rc<BoundBlock>> {
    let mut functions = HashMap::new();
    let mut current = Some(program);
    while let Some(p) = current {
        for (function, body) in &p.functions {
            if !functions.contains_key(function) {
                functions.insert(Rc::clone(function), Rc::clone(body));
            } else {
                trace!(
                    function = function.name(),
                    "skipping shadowed definition from earlier submission"
                );
            }
        }
        current = p.previous.as_deref();
    }
    debug!(count = functions.len(), "function table assembled");
    functions
}

/// Map every label to the position immediately after its label statement.
fn label_index(block: &BoundBlock) -> Result<HashMap<BoundLabel, usize>> {
    let mut index = HashMap::new();
    for (i, stmt) in block.statements.iter().enumerate() {
        if let BoundStmt::Label(label) = stmt {
            if index.insert(label.clone(), i + 1).is_some() {
                return Err(RuntimeError::duplicate_label(label.name()));
            }
        }
    }
    Ok(index)
}

fn jump_target(labels: &HashMap<BoundLabel, usize>, label: &BoundLabel) -> Result<usize> {
    labels
        .get(label)
        .copied()
        .ok_or_else(|| RuntimeError::missing_label(label.name()))
}

fn arith(value: &Value) -> Result<i64> {
    value.as_arith().ok_or_else(|| {
        RuntimeError::structural(format!("{} is not arithmetic", value.type_name()))
    })
}

fn condition(value: &Value) -> Result<bool> {
    value.as_condition().ok_or_else(|| {
        RuntimeError::structural(format!("{} is not a condition", value.type_name()))
    })
}

fn apply_unary(kind: UnaryOpKind, value: Value) -> Result<Value> {
    match kind {
        UnaryOpKind::Identity => Ok(Value::Int(arith(&value)?)),
        UnaryOpKind::Negation => Ok(Value::Int(arith(&value)?.wrapping_neg())),
        UnaryOpKind::BitwiseNot => Ok(Value::Int(!arith(&value)?)),
        UnaryOpKind::LogicalNot => Ok(Value::Bool(!condition(&value)?)),
    }
}

fn apply_binary(kind: BinaryOpKind, lhs: Value, rhs: Value) -> Result<Value> {
    match kind {
        BinaryOpKind::Addition => match (&lhs, &rhs) {
            (Value::String(a), Value::String(b)) => {
                let mut s = String::with_capacity(a.len() + b.len());
                s.push_str(a);
                s.push_str(b);
                Ok(Value::String(s))
            }
            _ => Ok(Value::Int(arith(&lhs)?.wrapping_add(arith(&rhs)?))),
        },
        BinaryOpKind::Subtraction => Ok(Value::Int(arith(&lhs)?.wrapping_sub(arith(&rhs)?))),
        BinaryOpKind::Multiplication => Ok(Value::Int(arith(&lhs)?.wrapping_mul(arith(&rhs)?))),
        BinaryOpKind::Division => {
            let divisor = arith(&rhs)?;
            if divisor == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Int(arith(&lhs)?.wrapping_div(divisor)))
        }
        BinaryOpKind::BitwiseAnd => match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a & b)),
            _ => Ok(Value::Int(arith(&lhs)? & arith(&rhs)?)),
        },
        BinaryOpKind::BitwiseOr => match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a | b)),
            _ => Ok(Value::Int(arith(&lhs)? | arith(&rhs)?)),
        },
        BinaryOpKind::BitwiseXor => match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),
            _ => Ok(Value::Int(arith(&lhs)? ^ arith(&rhs)?)),
        },
        // The binder lowers && and || to conditional jumps; evaluated here
        // they are strict.
        BinaryOpKind::LogicalAnd => Ok(Value::Bool(condition(&lhs)? && condition(&rhs)?)),
        BinaryOpKind::LogicalOr => Ok(Value::Bool(condition(&lhs)? || condition(&rhs)?)),
        BinaryOpKind::Equals => Ok(Value::Bool(lhs == rhs)),
        BinaryOpKind::NotEquals => Ok(Value::Bool(lhs != rhs)),
        BinaryOpKind::Less => Ok(Value::Bool(arith(&lhs)? < arith(&rhs)?)),
        BinaryOpKind::LessOrEquals => Ok(Value::Bool(arith(&lhs)? <= arith(&rhs)?)),
        BinaryOpKind::Greater => Ok(Value::Bool(arith(&lhs)? > arith(&rhs)?)),
        BinaryOpKind::GreaterOrEquals => Ok(Value::Bool(arith(&lhs)? >= arith(&rhs)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> BoundExpr {
        BoundExpr::literal(Value::Int(n))
    }

    fn boolean(b: bool) -> BoundExpr {
        BoundExpr::literal(Value::Bool(b))
    }

    fn string(s: &str) -> BoundExpr {
        BoundExpr::literal(Value::String(s.into()))
    }

    fn binary(left: BoundExpr, kind: BinaryOpKind, right: BoundExpr) -> BoundExpr {
        let op = BinaryOperator::resolve(kind, left.ty(), right.ty()).unwrap();
        BoundExpr::binary(left, op, right)
    }

    /// A program whose script entry runs the given statements.
    fn script(statements: Vec<BoundStmt>) -> BoundProgram {
        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut functions = HashMap::new();
        functions.insert(Rc::clone(&entry), Rc::new(BoundBlock::new(statements)));
        BoundProgram::new(None, None, Some(entry), functions)
    }

    fn run(program: &BoundProgram) -> Result<Value> {
        let mut globals = Globals::new();
        evaluate_quiet(program, &mut globals)
    }

    /// Evaluate with throwaway streams so tests never touch stdin/stdout.
    fn evaluate_quiet(program: &BoundProgram, globals: &mut Globals) -> Result<Value> {
        let mut sink = Vec::new();
        let mut evaluator =
            Evaluator::with_io(program, globals, Box::new(&b""[..]), Box::new(&mut sink));
        evaluator.evaluate()
    }

    fn run_capturing(program: &BoundProgram, input: &'static [u8]) -> (Result<Value>, String) {
        let mut globals = Globals::new();
        let mut out = Vec::new();
        let result = Evaluator::with_io(
            program,
            &mut globals,
            Box::new(input),
            Box::new(&mut out),
        )
        .evaluate();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_empty_program_returns_unit() {
        let program = BoundProgram::new(None, None, None, HashMap::new());
        assert_eq!(run(&program).unwrap(), Value::Unit);
    }

    #[test]
    fn test_main_wins_over_script() {
        let main = Rc::new(FunctionSymbol::new("main", vec![], Type::Unit));
        let script_fn = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut functions = HashMap::new();
        functions.insert(
            Rc::clone(&main),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(int(1))])),
        );
        functions.insert(
            Rc::clone(&script_fn),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(int(2))])),
        );
        let program = BoundProgram::new(None, Some(main), Some(script_fn), functions);
        assert_eq!(run(&program).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_last_expression_value_falls_through() {
        let program = script(vec![
            BoundStmt::Expression(int(1)),
            BoundStmt::Expression(int(2)),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_variable_declaration_and_read() {
        let x = VariableSymbol::local("x", Type::Int, true);
        let program = script(vec![
            BoundStmt::VariableDeclaration {
                symbol: x.clone(),
                initializer: int(5),
            },
            BoundStmt::Expression(BoundExpr::variable(x)),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_assignment_yields_value() {
        let x = VariableSymbol::local("x", Type::Int, false);
        let program = script(vec![
            BoundStmt::VariableDeclaration {
                symbol: x.clone(),
                initializer: int(1),
            },
            BoundStmt::Expression(BoundExpr::assignment(x, int(9))),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(9));
    }

    #[test]
    fn test_goto_skips_statements() {
        let label = BoundLabel::new("end");
        let program = script(vec![
            BoundStmt::Goto(label.clone()),
            BoundStmt::Expression(int(1)),
            BoundStmt::Label(label),
            BoundStmt::Expression(int(2)),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_goto_backward_with_guard() {
        // i = 0; loop: i = i + 1; goto loop unless i >= 3; i
        let i = VariableSymbol::local("i", Type::Int, false);
        let label = BoundLabel::new("loop");
        let program = script(vec![
            BoundStmt::VariableDeclaration {
                symbol: i.clone(),
                initializer: int(0),
            },
            BoundStmt::Label(label.clone()),
            BoundStmt::Expression(BoundExpr::assignment(
                i.clone(),
                binary(
                    BoundExpr::variable(i.clone()),
                    BinaryOpKind::Addition,
                    int(1),
                ),
            )),
            BoundStmt::ConditionalGoto {
                label,
                condition: binary(
                    BoundExpr::variable(i.clone()),
                    BinaryOpKind::GreaterOrEquals,
                    int(3),
                ),
                jump_if_true: false,
            },
            BoundStmt::Expression(BoundExpr::variable(i)),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_conditional_goto_truth_table() {
        // jump taken iff truthiness == jump_if_true
        for (cond, jump_if_true, jumps) in [
            (boolean(true), true, true),
            (boolean(true), false, false),
            (boolean(false), true, false),
            (boolean(false), false, true),
            (int(7), true, true),
            (int(0), true, false),
            (int(0), false, true),
        ] {
            let label = BoundLabel::new("skip");
            let program = script(vec![
                BoundStmt::ConditionalGoto {
                    label: label.clone(),
                    condition: cond,
                    jump_if_true,
                },
                BoundStmt::Expression(int(1)),
                BoundStmt::Label(label),
            ]);
            let expected = if jumps { Value::Unit } else { Value::Int(1) };
            assert_eq!(run(&program).unwrap(), expected, "jump_if_true={jump_if_true}");
        }
    }

    #[test]
    fn test_label_index_points_past_label() {
        let label = BoundLabel::new("l");
        let block = BoundBlock::new(vec![
            BoundStmt::Expression(int(1)),
            BoundStmt::Label(label.clone()),
            BoundStmt::Expression(int(2)),
        ]);
        let index = label_index(&block).unwrap();
        assert_eq!(index[&label], 2);
    }

    #[test]
    fn test_duplicate_label_is_structural() {
        let label = BoundLabel::new("l");
        let block = BoundBlock::new(vec![
            BoundStmt::Label(label.clone()),
            BoundStmt::Label(label),
        ]);
        assert!(label_index(&block).unwrap_err().is_structural());
    }

    #[test]
    fn test_goto_missing_label_is_structural() {
        let program = script(vec![BoundStmt::Goto(BoundLabel::new("nowhere"))]);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_structured_statement_is_structural() {
        let program = script(vec![BoundStmt::If {
            condition: boolean(true),
            then_branch: Box::new(BoundStmt::Expression(int(1))),
            else_branch: None,
        }]);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_error_expression_is_structural() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::Error)]);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_return_stops_execution() {
        let program = script(vec![
            BoundStmt::Return(Some(int(42))),
            BoundStmt::Expression(int(1)),
        ]);
        assert_eq!(run(&program).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_return_without_value_is_unit() {
        let program = script(vec![BoundStmt::Return(None)]);
        assert_eq!(run(&program).unwrap(), Value::Unit);
    }

    #[test]
    fn test_arithmetic() {
        let expr = binary(
            int(2),
            BinaryOpKind::Addition,
            binary(int(3), BinaryOpKind::Multiplication, int(4)),
        );
        let program = script(vec![BoundStmt::Expression(expr)]);
        assert_eq!(run(&program).unwrap(), Value::Int(14));
    }

    #[test]
    fn test_division_by_zero() {
        let program = script(vec![BoundStmt::Expression(binary(
            int(1),
            BinaryOpKind::Division,
            int(0),
        ))]);
        assert!(matches!(
            run(&program).unwrap_err(),
            RuntimeError::DivisionByZero
        ));
    }

    #[test]
    fn test_bool_arithmetic_narrows_back() {
        // true + true promotes to bool; the sum (2) narrows back to true
        let expr = binary(boolean(true), BinaryOpKind::Addition, boolean(true));
        assert_eq!(expr.ty(), Type::Bool);
        let program = script(vec![BoundStmt::Expression(expr)]);
        assert_eq!(run(&program).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_mixed_arithmetic_widens() {
        let expr = binary(boolean(true), BinaryOpKind::Addition, int(41));
        assert_eq!(expr.ty(), Type::Int);
        let program = script(vec![BoundStmt::Expression(expr)]);
        assert_eq!(run(&program).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_string_concatenation() {
        let expr = binary(string("foo"), BinaryOpKind::Addition, string("bar"));
        let program = script(vec![BoundStmt::Expression(expr)]);
        assert_eq!(run(&program).unwrap(), Value::String("foobar".into()));
    }

    #[test]
    fn test_unary_operators() {
        let neg = UnaryOperator::resolve(UnaryOpKind::Negation, Type::Int).unwrap();
        let program = script(vec![BoundStmt::Expression(BoundExpr::unary(neg, int(5)))]);
        assert_eq!(run(&program).unwrap(), Value::Int(-5));

        let not = UnaryOperator::resolve(UnaryOpKind::LogicalNot, Type::Bool).unwrap();
        let program = script(vec![BoundStmt::Expression(BoundExpr::unary(
            not,
            boolean(false),
        ))]);
        assert_eq!(run(&program).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_comparisons() {
        let program = script(vec![BoundStmt::Expression(binary(
            int(1),
            BinaryOpKind::Less,
            int(2),
        ))]);
        assert_eq!(run(&program).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_conversion_expression() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::conversion(
            Type::String,
            boolean(true),
        ))]);
        assert_eq!(run(&program).unwrap(), Value::String("true".into()));

        let program = script(vec![BoundStmt::Expression(BoundExpr::conversion(
            Type::Int,
            string("false"),
        ))]);
        assert_eq!(run(&program).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_conversion_failure_surfaces() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::conversion(
            Type::Int,
            string("maybe"),
        ))]);
        assert!(matches!(
            run(&program).unwrap_err(),
            RuntimeError::Conversion(_)
        ));
    }

    #[test]
    fn test_global_reads_and_writes() {
        let g = VariableSymbol::global("g", Type::Int, false);
        let program = script(vec![
            BoundStmt::Expression(BoundExpr::assignment(g.clone(), int(10))),
            BoundStmt::Expression(BoundExpr::variable(g.clone())),
        ]);
        let mut globals = Globals::new();
        assert_eq!(
            evaluate_quiet(&program, &mut globals).unwrap(),
            Value::Int(10)
        );
        // The write persisted into the caller-owned map
        assert_eq!(globals[&g], Value::Int(10));
    }

    #[test]
    fn test_caller_seeded_globals_are_visible() {
        let g = VariableSymbol::global("g", Type::Int, true);
        let program = script(vec![BoundStmt::Expression(BoundExpr::variable(g.clone()))]);
        let mut globals = Globals::new();
        globals.insert(g, Value::Int(99));
        assert_eq!(
            evaluate_quiet(&program, &mut globals).unwrap(),
            Value::Int(99)
        );
    }

    #[test]
    fn test_missing_variable_is_structural() {
        let x = VariableSymbol::local("x", Type::Int, false);
        let program = script(vec![BoundStmt::Expression(BoundExpr::variable(x))]);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_user_function_call() {
        let a = VariableSymbol::parameter("a", Type::Int);
        let b = VariableSymbol::parameter("b", Type::Int);
        let add = Rc::new(FunctionSymbol::new(
            "add",
            vec![a.clone(), b.clone()],
            Type::Int,
        ));
        let body = BoundBlock::new(vec![BoundStmt::Return(Some(binary(
            BoundExpr::variable(a),
            BinaryOpKind::Addition,
            BoundExpr::variable(b),
        )))]);

        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut functions = HashMap::new();
        functions.insert(Rc::clone(&add), Rc::new(body));
        functions.insert(
            Rc::clone(&entry),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(
                BoundExpr::call(add, vec![int(40), int(2)]),
            )])),
        );
        let program = BoundProgram::new(None, None, Some(entry), functions);
        assert_eq!(run(&program).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_callee_cannot_see_caller_locals() {
        // callee reads a local symbol that only exists in the caller's frame
        let x = VariableSymbol::local("x", Type::Int, false);
        let peek = Rc::new(FunctionSymbol::new("peek", vec![], Type::Int));
        let peek_body = BoundBlock::new(vec![BoundStmt::Return(Some(BoundExpr::variable(
            x.clone(),
        )))]);

        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let entry_body = BoundBlock::new(vec![
            BoundStmt::VariableDeclaration {
                symbol: x,
                initializer: int(1),
            },
            BoundStmt::Expression(BoundExpr::call(Rc::clone(&peek), vec![])),
        ]);

        let mut functions = HashMap::new();
        functions.insert(peek, Rc::new(peek_body));
        functions.insert(Rc::clone(&entry), Rc::new(entry_body));
        let program = BoundProgram::new(None, None, Some(entry), functions);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_global_writes_cross_calls() {
        let g = VariableSymbol::global("g", Type::Int, false);
        let bump = Rc::new(FunctionSymbol::new("bump", vec![], Type::Unit));
        let bump_body = BoundBlock::new(vec![BoundStmt::Expression(BoundExpr::assignment(
            g.clone(),
            int(7),
        ))]);

        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let entry_body = BoundBlock::new(vec![
            BoundStmt::Expression(BoundExpr::call(Rc::clone(&bump), vec![])),
            BoundStmt::Expression(BoundExpr::variable(g)),
        ]);

        let mut functions = HashMap::new();
        functions.insert(bump, Rc::new(bump_body));
        functions.insert(Rc::clone(&entry), Rc::new(entry_body));
        let program = BoundProgram::new(None, None, Some(entry), functions);
        assert_eq!(run(&program).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_arity_mismatch_is_structural() {
        let a = VariableSymbol::parameter("a", Type::Int);
        let f = Rc::new(FunctionSymbol::new("f", vec![a], Type::Int));
        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut functions = HashMap::new();
        functions.insert(
            Rc::clone(&f),
            Rc::new(BoundBlock::new(vec![BoundStmt::Return(Some(int(0)))])),
        );
        functions.insert(
            Rc::clone(&entry),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(
                BoundExpr::call(f, vec![]),
            )])),
        );
        let program = BoundProgram::new(None, None, Some(entry), functions);
        assert!(run(&program).unwrap_err().is_structural());
    }

    #[test]
    fn test_chain_merges_previous_functions() {
        // Submission 1 defines f; submission 2 calls it.
        let f = Rc::new(FunctionSymbol::new("f", vec![], Type::Int));
        let mut first_functions = HashMap::new();
        first_functions.insert(
            Rc::clone(&f),
            Rc::new(BoundBlock::new(vec![BoundStmt::Return(Some(int(11)))])),
        );
        let first = Rc::new(BoundProgram::new(None, None, None, first_functions));

        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut second_functions = HashMap::new();
        second_functions.insert(
            Rc::clone(&entry),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(
                BoundExpr::call(f, vec![]),
            )])),
        );
        let second = BoundProgram::new(Some(first), None, Some(entry), second_functions);
        assert_eq!(run(&second).unwrap(), Value::Int(11));
    }

    #[test]
    fn test_later_submission_shadows_earlier() {
        // The same symbol carries a body in both submissions; the newer wins.
        let f = Rc::new(FunctionSymbol::new("f", vec![], Type::Int));
        let mut first_functions = HashMap::new();
        first_functions.insert(
            Rc::clone(&f),
            Rc::new(BoundBlock::new(vec![BoundStmt::Return(Some(int(1)))])),
        );
        let first = Rc::new(BoundProgram::new(None, None, None, first_functions));

        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut second_functions = HashMap::new();
        second_functions.insert(
            Rc::clone(&f),
            Rc::new(BoundBlock::new(vec![BoundStmt::Return(Some(int(2)))])),
        );
        second_functions.insert(
            Rc::clone(&entry),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(
                BoundExpr::call(f, vec![]),
            )])),
        );
        let second = BoundProgram::new(Some(first), None, Some(entry), second_functions);
        assert_eq!(run(&second).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_print_builtin_writes_line() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::call(
            builtins::print(),
            vec![BoundExpr::conversion(Type::Object, int(14))],
        ))]);
        let (result, output) = run_capturing(&program, b"");
        assert_eq!(result.unwrap(), Value::Unit);
        assert_eq!(output, "14\n");
    }

    #[test]
    fn test_input_builtin_reads_line() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::call(
            builtins::input(),
            vec![],
        ))]);
        let (result, _) = run_capturing(&program, b"hello\nrest\n");
        assert_eq!(result.unwrap(), Value::String("hello".into()));
    }

    #[test]
    fn test_input_builtin_at_end_of_stream() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::call(
            builtins::input(),
            vec![],
        ))]);
        let (result, _) = run_capturing(&program, b"");
        assert_eq!(result.unwrap(), Value::String(String::new()));
    }

    #[test]
    fn test_rnd_builtin_in_range_and_deterministic() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::call(
            builtins::rnd(),
            vec![int(10)],
        ))]);

        let sample = |seed| {
            let mut globals = Globals::new();
            let mut sink = Vec::new();
            let mut evaluator = Evaluator::with_io(
                &program,
                &mut globals,
                Box::new(&b""[..]),
                Box::new(&mut sink),
            );
            evaluator.seed_random(seed);
            evaluator.evaluate().unwrap()
        };

        let first = sample(7);
        let again = sample(7);
        assert_eq!(first, again);
        let n = first.as_int().unwrap();
        assert!((0..10).contains(&n));
    }

    #[test]
    fn test_rnd_rejects_non_positive_bound() {
        let program = script(vec![BoundStmt::Expression(BoundExpr::call(
            builtins::rnd(),
            vec![int(0)],
        ))]);
        assert!(matches!(
            run(&program).unwrap_err(),
            RuntimeError::InvalidRandomBound { bound: 0 }
        ));
    }

    #[test]
    fn test_call_depth_limit() {
        // f() calls itself forever
        let f = Rc::new(FunctionSymbol::new("f", vec![], Type::Int));
        let body = BoundBlock::new(vec![BoundStmt::Return(Some(BoundExpr::call(
            Rc::clone(&f),
            vec![],
        )))]);
        let entry = Rc::new(FunctionSymbol::new("$eval", vec![], Type::Object));
        let mut functions = HashMap::new();
        functions.insert(Rc::clone(&f), Rc::new(body));
        functions.insert(
            Rc::clone(&entry),
            Rc::new(BoundBlock::new(vec![BoundStmt::Expression(
                BoundExpr::call(f, vec![]),
            )])),
        );
        let program = BoundProgram::new(None, None, Some(entry), functions);
        assert!(matches!(
            run(&program).unwrap_err(),
            RuntimeError::StackOverflow { .. }
        ));
    }
}
