//! Resolved operator descriptors
//!
//! The binder resolves every source operator to one of these plain-data
//! records. Evaluation dispatches on the kind tag; no boxed callables.
//! Arithmetic binary operators are polymorphic over the numeric domain and
//! carry no fixed result type; the bound node's type (picked via promotion)
//! decides what they produce.

use crate::types::Type;
use serde::Serialize;
use std::fmt;

/// Unary operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOpKind {
    /// `+x`
    Identity,
    /// `-x`
    Negation,
    /// `!x`
    LogicalNot,
    /// `~x`
    BitwiseNot,
}

impl UnaryOpKind {
    /// Source token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            UnaryOpKind::Identity => "+",
            UnaryOpKind::Negation => "-",
            UnaryOpKind::LogicalNot => "!",
            UnaryOpKind::BitwiseNot => "~",
        }
    }

    /// Unary operators bind tighter than every binary operator.
    pub fn precedence(self) -> u8 {
        6
    }
}

impl fmt::Display for UnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Binary operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOpKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

impl BinaryOpKind {
    /// Source token for this operator.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOpKind::Addition => "+",
            BinaryOpKind::Subtraction => "-",
            BinaryOpKind::Multiplication => "*",
            BinaryOpKind::Division => "/",
            BinaryOpKind::BitwiseAnd => "&",
            BinaryOpKind::BitwiseOr => "|",
            BinaryOpKind::BitwiseXor => "^",
            BinaryOpKind::LogicalAnd => "&&",
            BinaryOpKind::LogicalOr => "||",
            BinaryOpKind::Equals => "==",
            BinaryOpKind::NotEquals => "!=",
            BinaryOpKind::Less => "<",
            BinaryOpKind::LessOrEquals => "<=",
            BinaryOpKind::Greater => ">",
            BinaryOpKind::GreaterOrEquals => ">=",
        }
    }

    /// Precedence as in the source grammar; larger binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOpKind::Multiplication | BinaryOpKind::Division => 5,
            BinaryOpKind::Addition | BinaryOpKind::Subtraction => 4,
            BinaryOpKind::Equals
            | BinaryOpKind::NotEquals
            | BinaryOpKind::Less
            | BinaryOpKind::LessOrEquals
            | BinaryOpKind::Greater
            | BinaryOpKind::GreaterOrEquals => 3,
            BinaryOpKind::LogicalAnd | BinaryOpKind::BitwiseAnd => 2,
            BinaryOpKind::LogicalOr | BinaryOpKind::BitwiseOr | BinaryOpKind::BitwiseXor => 1,
        }
    }

    /// Whether this is the additive operator (string promotion applies).
    pub fn is_additive(self) -> bool {
        self == BinaryOpKind::Addition
    }

    /// Whether this operator is polymorphic over the numeric domain.
    pub fn is_polymorphic(self) -> bool {
        matches!(
            self,
            BinaryOpKind::Addition
                | BinaryOpKind::Subtraction
                | BinaryOpKind::Multiplication
                | BinaryOpKind::Division
        )
    }
}

impl fmt::Display for BinaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A resolved unary operator: kind, operand type, result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnaryOperator {
    pub kind: UnaryOpKind,
    pub operand: Type,
    pub result: Type,
}

const UNARY_OPERATORS: &[UnaryOperator] = &[
    UnaryOperator {
        kind: UnaryOpKind::Identity,
        operand: Type::Int,
        result: Type::Int,
    },
    UnaryOperator {
        kind: UnaryOpKind::Negation,
        operand: Type::Int,
        result: Type::Int,
    },
    UnaryOperator {
        kind: UnaryOpKind::BitwiseNot,
        operand: Type::Int,
        result: Type::Int,
    },
    UnaryOperator {
        kind: UnaryOpKind::LogicalNot,
        operand: Type::Bool,
        result: Type::Bool,
    },
];

impl UnaryOperator {
    /// Look up the descriptor for `kind` applied to an operand of `operand`
    /// type. Arithmetic operands widen to the operator's domain, so `Bool`
    /// resolves against the `Int` rows.
    pub fn resolve(kind: UnaryOpKind, operand: Type) -> Option<UnaryOperator> {
        UNARY_OPERATORS
            .iter()
            .find(|op| {
                op.kind == kind
                    && (op.operand == operand
                        || (op.operand == Type::Int && operand.is_arithmetic()))
            })
            .copied()
    }
}

/// A resolved binary operator.
///
/// `result` is `None` for the numeric-polymorphic operators: the bound node's
/// type, chosen through promotion, is the contract then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryOperator {
    pub kind: BinaryOpKind,
    pub lhs: Type,
    pub rhs: Type,
    pub result: Option<Type>,
}

const FIXED_BINARY_OPERATORS: &[BinaryOperator] = &[
    // Bitwise, over each arithmetic width
    BinaryOperator {
        kind: BinaryOpKind::BitwiseAnd,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Int),
    },
    BinaryOperator {
        kind: BinaryOpKind::BitwiseOr,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Int),
    },
    BinaryOperator {
        kind: BinaryOpKind::BitwiseXor,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Int),
    },
    BinaryOperator {
        kind: BinaryOpKind::BitwiseAnd,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::BitwiseOr,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::BitwiseXor,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    // Logical connectives; kept for the printer, the binder lowers them to jumps
    BinaryOperator {
        kind: BinaryOpKind::LogicalAnd,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::LogicalOr,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    // Equality
    BinaryOperator {
        kind: BinaryOpKind::Equals,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::NotEquals,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::Equals,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::NotEquals,
        lhs: Type::Bool,
        rhs: Type::Bool,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::Equals,
        lhs: Type::String,
        rhs: Type::String,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::NotEquals,
        lhs: Type::String,
        rhs: Type::String,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::Equals,
        lhs: Type::Object,
        rhs: Type::Object,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::NotEquals,
        lhs: Type::Object,
        rhs: Type::Object,
        result: Some(Type::Bool),
    },
    // Relational
    BinaryOperator {
        kind: BinaryOpKind::Less,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::LessOrEquals,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::Greater,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
    BinaryOperator {
        kind: BinaryOpKind::GreaterOrEquals,
        lhs: Type::Int,
        rhs: Type::Int,
        result: Some(Type::Bool),
    },
];

impl BinaryOperator {
    /// A polymorphic arithmetic descriptor over the given operand types.
    pub fn polymorphic(kind: BinaryOpKind, lhs: Type, rhs: Type) -> BinaryOperator {
        debug_assert!(kind.is_polymorphic());
        BinaryOperator {
            kind,
            lhs,
            rhs,
            result: None,
        }
    }

    /// Resolve `kind` over the given operand types, the way the binder does.
    ///
    /// Fixed rows win; the arithmetic operators fall back to a polymorphic
    /// descriptor when promotion can produce a result type.
    pub fn resolve(kind: BinaryOpKind, lhs: Type, rhs: Type) -> Option<BinaryOperator> {
        if let Some(op) = FIXED_BINARY_OPERATORS
            .iter()
            .find(|op| op.kind == kind && op.lhs == lhs && op.rhs == rhs)
        {
            return Some(*op);
        }
        if kind.is_polymorphic() && Type::promote(lhs, rhs, kind.is_additive()) != Type::Error {
            return Some(BinaryOperator::polymorphic(kind, lhs, rhs));
        }
        None
    }
}
