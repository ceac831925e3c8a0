//! Runtime: values, scopes, built-ins, and the evaluator

pub mod builtins;
mod error;
mod eval;
mod scope;
mod value;

pub use error::{Result, RuntimeError};
pub use eval::{evaluate, Evaluator, Globals};
pub use value::Value;
