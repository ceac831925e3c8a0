//! The Vivian type universe
//!
//! A closed set of primitive types plus the `Error` marker the binder uses to
//! suppress cascading diagnostics. Types carry capability flags; promotion
//! picks the result type of a polymorphic binary operator.

use bitflags::bitflags;
use serde::Serialize;
use std::fmt;

/// A primitive Vivian type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// Immutable string
    String,
    /// Top type; every value converts to it implicitly
    Object,
    /// No value (the return type of `print`, and of functions that return nothing)
    Unit,
    /// Binder error marker; never evaluated
    Error,
}

bitflags! {
    /// Capability flags attached to each type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// Participates in arithmetic and numeric widening
        const ARITHMETIC = 1 << 0;
    }
}

impl Type {
    /// Capability flags for this type.
    pub fn flags(self) -> TypeFlags {
        match self {
            Type::Bool | Type::Int => TypeFlags::ARITHMETIC,
            Type::String | Type::Object | Type::Unit | Type::Error => TypeFlags::empty(),
        }
    }

    /// Whether this type participates in arithmetic.
    pub fn is_arithmetic(self) -> bool {
        self.flags().contains(TypeFlags::ARITHMETIC)
    }

    /// Bit width within the arithmetic domain, used to pick the wider operand.
    fn numeric_width(self) -> u8 {
        match self {
            Type::Bool => 1,
            Type::Int => 64,
            _ => 0,
        }
    }

    /// Result type of a polymorphic binary operator over `lhs` and `rhs`.
    ///
    /// Identity when both sides agree; otherwise the widest arithmetic type
    /// among the operands; `String` when either side is a string and the
    /// operator is additive; `Error` for everything else.
    pub fn promote(lhs: Type, rhs: Type, additive: bool) -> Type {
        if lhs == rhs {
            return lhs;
        }
        if lhs.is_arithmetic() && rhs.is_arithmetic() {
            return if lhs.numeric_width() >= rhs.numeric_width() {
                lhs
            } else {
                rhs
            };
        }
        if additive && (lhs == Type::String || rhs == Type::String) {
            return Type::String;
        }
        Type::Error
    }

    /// The type's name as it appears in Vivian source.
    pub fn name(self) -> &'static str {
        match self {
            Type::Bool => "bool",
            Type::Int => "int",
            Type::String => "string",
            Type::Object => "object",
            Type::Unit => "unit",
            Type::Error => "?",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
