//! Runtime errors for the evaluator

use crate::bound::BoundNodeKind;
use crate::conversion::ConversionError;
use thiserror::Error;

/// Result type alias for evaluation.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// A failure surfaced while evaluating a bound program.
///
/// Structural errors mean the bound tree violates an invariant the binder
/// should have upheld; they are never recoverable. Conversion and I/O errors
/// propagate verbatim from the layers that produced them.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The bound tree is malformed
    #[error("malformed bound tree: {message}")]
    Structural { message: String },

    /// A sanctioned conversion failed for the actual runtime value
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A built-in's host I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Integer division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// `rnd` was asked for an empty range
    #[error("rnd bound must be positive, got {bound}")]
    InvalidRandomBound { bound: i64 },

    /// Too many nested calls
    #[error("call depth exceeded {limit} frames")]
    StackOverflow { limit: usize },
}

impl RuntimeError {
    pub fn structural(message: impl Into<String>) -> Self {
        RuntimeError::Structural {
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::structural(format!("no binding for variable: {name}"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::structural(format!("no body for function: {name}"))
    }

    pub fn missing_label(name: &str) -> Self {
        Self::structural(format!("jump to undefined label: {name}"))
    }

    pub fn duplicate_label(name: &str) -> Self {
        Self::structural(format!("label defined twice in one block: {name}"))
    }

    pub fn unexpected_node(kind: BoundNodeKind) -> Self {
        Self::structural(format!("unexpected node kind: {kind}"))
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::structural(format!(
            "function {name} expects {expected} argument(s), got {got}"
        ))
    }

    /// Whether this error reports a malformed tree.
    pub fn is_structural(&self) -> bool {
        matches!(self, RuntimeError::Structural { .. })
    }
}
