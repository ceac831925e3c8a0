//! Runtime values for the evaluator

use crate::types::Type;
use serde::Serialize;
use std::fmt;

/// A runtime value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// No value
    Unit,
    /// Boolean
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// String
    String(String),
}

impl Value {
    /// The static type this value inhabits.
    pub fn ty(&self) -> Type {
        match self {
            Value::Unit => Type::Unit,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::String(_) => Type::String,
        }
    }

    /// Type name for error messages.
    pub fn type_name(&self) -> &'static str {
        self.ty().name()
    }

    /// Try to read as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to read as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to read as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value in the arithmetic domain, where booleans count as 0/1.
    pub fn as_arith(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Truthiness for conditional jumps: a boolean, or a nonzero integer.
    ///
    /// `None` for values the lowering never puts in jump position.
    pub fn as_condition(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::String("hi".into())), "hi");
        assert_eq!(format!("{}", Value::Unit), "()");
    }

    #[test]
    fn test_value_types() {
        assert_eq!(Value::Int(1).ty(), Type::Int);
        assert_eq!(Value::Bool(false).ty(), Type::Bool);
        assert_eq!(Value::String(String::new()).ty(), Type::String);
        assert_eq!(Value::Unit.ty(), Type::Unit);
    }

    #[test]
    fn test_as_condition() {
        assert_eq!(Value::Bool(true).as_condition(), Some(true));
        assert_eq!(Value::Bool(false).as_condition(), Some(false));
        assert_eq!(Value::Int(0).as_condition(), Some(false));
        assert_eq!(Value::Int(-3).as_condition(), Some(true));
        assert_eq!(Value::String("x".into()).as_condition(), None);
        assert_eq!(Value::Unit.as_condition(), None);
    }

    #[test]
    fn test_as_arith_counts_bools() {
        assert_eq!(Value::Bool(true).as_arith(), Some(1));
        assert_eq!(Value::Bool(false).as_arith(), Some(0));
        assert_eq!(Value::Int(7).as_arith(), Some(7));
        assert_eq!(Value::String("7".into()).as_arith(), None);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int(9).as_int(), Some(9));
        assert_eq!(Value::Bool(true).as_int(), None);
        assert_eq!(Value::String("a".into()).as_str(), Some("a"));
        assert_eq!(Value::Int(1).as_str(), None);
    }
}
