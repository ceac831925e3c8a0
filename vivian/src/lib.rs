//! Vivian back-end core
//!
//! The lowered, type-checked intermediate representation of the Vivian
//! scripting language, together with the two operations that give it
//! meaning: a tree-walking evaluator and a pretty-printer that renders
//! bound nodes back to concrete syntax. Lexing, parsing, and binding are
//! external collaborators; this crate consumes the bound tree they produce.

pub mod bound;
pub mod conversion;
pub mod interp;
pub mod symbols;
pub mod types;

pub use bound::{BoundBlock, BoundExpr, BoundNodeKind, BoundProgram, BoundStmt};
pub use interp::{evaluate, Evaluator, Globals, RuntimeError, Value};
pub use types::Type;
