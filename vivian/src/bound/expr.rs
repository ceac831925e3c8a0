//! Bound expression nodes
//!
//! Every node carries the type the binder resolved for it. Nodes are
//! immutable once built; the constructors compute derived types so trees
//! assembled by hand (in tests, or by an embedding binder) stay consistent.

use crate::bound::ops::{BinaryOperator, UnaryOperator};
use crate::bound::BoundNodeKind;
use crate::interp::Value;
use crate::symbols::{FunctionSymbol, VariableSymbol};
use crate::types::Type;
use serde::Serialize;
use std::rc::Rc;

/// A typed, bound expression.
#[derive(Debug, Clone, Serialize)]
pub enum BoundExpr {
    /// Constant value
    Literal { value: Value, ty: Type },
    /// Read of a variable or parameter
    Variable(VariableSymbol),
    /// Write then yield the written value
    Assignment {
        symbol: VariableSymbol,
        value: Box<BoundExpr>,
    },
    /// Resolved unary operator application
    Unary {
        op: UnaryOperator,
        operand: Box<BoundExpr>,
    },
    /// Resolved binary operator application; `ty` is the promoted node type
    Binary {
        left: Box<BoundExpr>,
        op: BinaryOperator,
        right: Box<BoundExpr>,
        ty: Type,
    },
    /// Call of a user function or built-in
    Call {
        function: Rc<FunctionSymbol>,
        arguments: Vec<BoundExpr>,
    },
    /// Binder-sanctioned conversion to `ty`
    Conversion {
        ty: Type,
        expression: Box<BoundExpr>,
    },
    /// Placeholder kept by the binder to suppress cascading errors
    Error,
}

impl BoundExpr {
    /// A literal node; the type follows the value.
    pub fn literal(value: Value) -> BoundExpr {
        let ty = value.ty();
        BoundExpr::Literal { value, ty }
    }

    pub fn variable(symbol: VariableSymbol) -> BoundExpr {
        BoundExpr::Variable(symbol)
    }

    pub fn assignment(symbol: VariableSymbol, value: BoundExpr) -> BoundExpr {
        BoundExpr::Assignment {
            symbol,
            value: Box::new(value),
        }
    }

    pub fn unary(op: UnaryOperator, operand: BoundExpr) -> BoundExpr {
        BoundExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// A binary node. Operators with a fixed result use it; polymorphic
    /// operators take the promoted type of their operands.
    pub fn binary(left: BoundExpr, op: BinaryOperator, right: BoundExpr) -> BoundExpr {
        let ty = op
            .result
            .unwrap_or_else(|| Type::promote(left.ty(), right.ty(), op.kind.is_additive()));
        BoundExpr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            ty,
        }
    }

    pub fn call(function: Rc<FunctionSymbol>, arguments: Vec<BoundExpr>) -> BoundExpr {
        BoundExpr::Call {
            function,
            arguments,
        }
    }

    pub fn conversion(ty: Type, expression: BoundExpr) -> BoundExpr {
        BoundExpr::Conversion {
            ty,
            expression: Box::new(expression),
        }
    }

    /// The resolved type of this node.
    pub fn ty(&self) -> Type {
        match self {
            BoundExpr::Literal { ty, .. } => *ty,
            BoundExpr::Variable(symbol) => symbol.ty(),
            BoundExpr::Assignment { value, .. } => value.ty(),
            BoundExpr::Unary { op, .. } => op.result,
            BoundExpr::Binary { ty, .. } => *ty,
            BoundExpr::Call { function, .. } => function.return_type(),
            BoundExpr::Conversion { ty, .. } => *ty,
            BoundExpr::Error => Type::Error,
        }
    }

    /// The kind tag consumers switch on.
    pub fn kind(&self) -> BoundNodeKind {
        match self {
            BoundExpr::Literal { .. } => BoundNodeKind::LiteralExpression,
            BoundExpr::Variable(_) => BoundNodeKind::VariableExpression,
            BoundExpr::Assignment { .. } => BoundNodeKind::AssignmentExpression,
            BoundExpr::Unary { .. } => BoundNodeKind::UnaryExpression,
            BoundExpr::Binary { .. } => BoundNodeKind::BinaryExpression,
            BoundExpr::Call { .. } => BoundNodeKind::CallExpression,
            BoundExpr::Conversion { .. } => BoundNodeKind::ConversionExpression,
            BoundExpr::Error => BoundNodeKind::ErrorExpression,
        }
    }
}
