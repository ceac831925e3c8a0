//! The bound intermediate representation
//!
//! The typed, name-resolved tree an external binder delivers after semantic
//! analysis and control-flow lowering. This layer is pure data: constructors,
//! read-only accessors, and the kind tags the evaluator and the printer
//! switch on.

mod expr;
pub mod ops;
pub mod output;
mod stmt;

pub use expr::BoundExpr;
pub use stmt::{BoundBlock, BoundStmt};

use crate::symbols::FunctionSymbol;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Closed enumeration of bound node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundNodeKind {
    LiteralExpression,
    VariableExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    CallExpression,
    ConversionExpression,
    ErrorExpression,
    BlockStatement,
    ExpressionStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    LabelStatement,
    GotoStatement,
    ConditionalGotoStatement,
    ReturnStatement,
}

impl fmt::Display for BoundNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A fully bound program: entry points, function bodies, and an optional
/// link to the previous submission whose definitions stay in scope.
#[derive(Debug, Clone)]
pub struct BoundProgram {
    /// Entry when running as a compiled unit; wins over `script_function`.
    pub main_function: Option<Rc<FunctionSymbol>>,
    /// Entry in script mode; used when `main_function` is absent.
    pub script_function: Option<Rc<FunctionSymbol>>,
    /// Lowered body of every function bound in this submission.
    pub functions: HashMap<Rc<FunctionSymbol>, Rc<BoundBlock>>,
    /// Earlier program in the submission chain, if any.
    pub previous: Option<Rc<BoundProgram>>,
}

impl BoundProgram {
    pub fn new(
        previous: Option<Rc<BoundProgram>>,
        main_function: Option<Rc<FunctionSymbol>>,
        script_function: Option<Rc<FunctionSymbol>>,
        functions: HashMap<Rc<FunctionSymbol>, Rc<BoundBlock>>,
    ) -> Self {
        BoundProgram {
            main_function,
            script_function,
            functions,
            previous,
        }
    }

    /// The entry function: `main` when present, otherwise the script entry.
    pub fn entry(&self) -> Option<&Rc<FunctionSymbol>> {
        self.main_function.as_ref().or(self.script_function.as_ref())
    }
}
