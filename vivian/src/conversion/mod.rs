//! Conversions between Vivian types
//!
//! `Conversion::classify` answers what the binder may do between two static
//! types; `convert` carries a runtime value into a target type. The two must
//! agree: whenever `classify` reports a conversion exists, `convert` succeeds
//! for every well-typed value except the string-to-arithmetic narrowing,
//! which only admits the literal spellings `"true"` and `"false"`.

use crate::interp::Value;
use crate::types::Type;
use thiserror::Error;

/// Result alias for runtime conversions.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// A runtime conversion the binder sanctioned could not be realized for the
/// actual value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} to {target}")]
pub struct ConversionError {
    pub value: Value,
    pub target: Type,
}

/// Classification of a conversion between two static types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub exists: bool,
    pub is_identity: bool,
    pub is_implicit: bool,
}

impl Conversion {
    pub const NONE: Conversion = Conversion {
        exists: false,
        is_identity: false,
        is_implicit: false,
    };
    pub const IDENTITY: Conversion = Conversion {
        exists: true,
        is_identity: true,
        is_implicit: true,
    };
    pub const IMPLICIT: Conversion = Conversion {
        exists: true,
        is_identity: false,
        is_implicit: true,
    };
    pub const EXPLICIT: Conversion = Conversion {
        exists: true,
        is_identity: false,
        is_implicit: false,
    };

    /// Exists but requires a cast in source.
    pub fn is_explicit(self) -> bool {
        self.exists && !self.is_implicit
    }

    /// Classify the conversion from `from` to `to`.
    pub fn classify(from: Type, to: Type) -> Conversion {
        if from == to {
            return Conversion::IDENTITY;
        }
        if from == Type::Error || to == Type::Error {
            return Conversion::NONE;
        }
        // Everything boxes into the top type; unboxing needs a cast.
        if to == Type::Object {
            return Conversion::IMPLICIT;
        }
        if from == Type::Object {
            return Conversion::EXPLICIT;
        }
        // Arithmetic widening is implicit, narrowing explicit.
        if from.is_arithmetic() && to.is_arithmetic() {
            return if from == Type::Bool {
                Conversion::IMPLICIT
            } else {
                Conversion::EXPLICIT
            };
        }
        // Any arithmetic type converts to and from string text, explicitly.
        if from == Type::String && to.is_arithmetic() {
            return Conversion::EXPLICIT;
        }
        if from.is_arithmetic() && to == Type::String {
            return Conversion::EXPLICIT;
        }
        Conversion::NONE
    }
}

/// Convert a runtime value to `target`.
///
/// Strings narrow to the arithmetic domain only through the literal
/// spellings `"true"` (1) and `"false"` (0); numeric text is rejected.
pub fn convert(target: Type, value: Value) -> Result<Value> {
    let fail = |value: Value| -> Result<Value> { Err(ConversionError { value, target }) };
    match target {
        Type::Object => Ok(value),
        Type::Int => match value {
            Value::Int(n) => Ok(Value::Int(n)),
            Value::Bool(b) => Ok(Value::Int(i64::from(b))),
            Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Int(1)),
                "false" => Ok(Value::Int(0)),
                _ => fail(Value::String(s)),
            },
            other => fail(other),
        },
        Type::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::Int(n) => Ok(Value::Bool(n != 0)),
            Value::String(s) => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => fail(Value::String(s)),
            },
            other => fail(other),
        },
        Type::String => match value {
            Value::String(s) => Ok(Value::String(s)),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Int(n) => Ok(Value::String(n.to_string())),
            other => fail(other),
        },
        Type::Unit => match value {
            Value::Unit => Ok(Value::Unit),
            other => fail(other),
        },
        Type::Error => fail(value),
    }
}
