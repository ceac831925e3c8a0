//! Symbols: the named entities of a bound program
//!
//! Every symbol carries a fresh numeric id; equality and hashing use the id
//! only, so two symbols with the same name are still distinct. The binder is
//! expected to hand the evaluator and the printer the exact instances it
//! resolved.

use crate::types::Type;
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token shared by all symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolId(u64);

impl SymbolId {
    fn fresh() -> Self {
        SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Discriminates the named entities of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SymbolKind {
    GlobalVariable,
    LocalVariable,
    Parameter,
    Function,
    Label,
}

/// A variable, parameter, or global binding.
#[derive(Debug, Clone, Serialize)]
pub struct VariableSymbol {
    id: SymbolId,
    name: String,
    kind: SymbolKind,
    ty: Type,
    is_read_only: bool,
}

impl VariableSymbol {
    fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, is_read_only: bool) -> Self {
        VariableSymbol {
            id: SymbolId::fresh(),
            name: name.into(),
            kind,
            ty,
            is_read_only,
        }
    }

    /// A module-level variable, stored in the caller-owned globals map.
    pub fn global(name: impl Into<String>, ty: Type, is_read_only: bool) -> Self {
        Self::new(name, SymbolKind::GlobalVariable, ty, is_read_only)
    }

    /// A variable local to a function body.
    pub fn local(name: impl Into<String>, ty: Type, is_read_only: bool) -> Self {
        Self::new(name, SymbolKind::LocalVariable, ty, is_read_only)
    }

    /// A function parameter. Parameters are always read-only.
    pub fn parameter(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, SymbolKind::Parameter, ty, true)
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn ty(&self) -> Type {
        self.ty
    }

    pub fn is_read_only(&self) -> bool {
        self.is_read_only
    }

    /// Whether assignments go to the globals map rather than a local frame.
    pub fn is_global(&self) -> bool {
        self.kind == SymbolKind::GlobalVariable
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for VariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A function: name, ordered parameters, return type.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSymbol {
    id: SymbolId,
    name: String,
    parameters: Vec<VariableSymbol>,
    return_type: Type,
}

impl FunctionSymbol {
    pub fn new(name: impl Into<String>, parameters: Vec<VariableSymbol>, return_type: Type) -> Self {
        FunctionSymbol {
            id: SymbolId::fresh(),
            name: name.into(),
            parameters,
            return_type,
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[VariableSymbol] {
        &self.parameters
    }

    pub fn return_type(&self) -> Type {
        self.return_type
    }

    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Function
    }
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionSymbol {}

impl Hash for FunctionSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A jump target produced by control-flow lowering.
#[derive(Debug, Clone, Serialize)]
pub struct BoundLabel {
    id: SymbolId,
    name: String,
}

impl BoundLabel {
    pub fn new(name: impl Into<String>) -> Self {
        BoundLabel {
            id: SymbolId::fresh(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Label
    }
}

impl PartialEq for BoundLabel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BoundLabel {}

impl Hash for BoundLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
