//! Built-in functions
//!
//! Built-ins are ordinary `FunctionSymbol`s the binder resolves calls
//! against; the evaluator recognizes them by identity, not by name. The
//! instances live in thread-local storage so a binder and an evaluator on
//! the same thread agree on identities.

use crate::symbols::{FunctionSymbol, VariableSymbol};
use crate::types::Type;
use std::rc::Rc;

struct Builtins {
    input: Rc<FunctionSymbol>,
    print: Rc<FunctionSymbol>,
    rnd: Rc<FunctionSymbol>,
}

impl Builtins {
    fn new() -> Self {
        Builtins {
            input: Rc::new(FunctionSymbol::new("input", vec![], Type::String)),
            print: Rc::new(FunctionSymbol::new(
                "print",
                vec![VariableSymbol::parameter("text", Type::Object)],
                Type::Unit,
            )),
            rnd: Rc::new(FunctionSymbol::new(
                "rnd",
                vec![VariableSymbol::parameter("max", Type::Int)],
                Type::Int,
            )),
        }
    }
}

thread_local! {
    static BUILTINS: Builtins = Builtins::new();
}

/// `input() → string`: reads one line from standard input.
pub fn input() -> Rc<FunctionSymbol> {
    BUILTINS.with(|b| Rc::clone(&b.input))
}

/// `print(text: object)`: writes the argument and a line terminator.
pub fn print() -> Rc<FunctionSymbol> {
    BUILTINS.with(|b| Rc::clone(&b.print))
}

/// `rnd(max: int) → int`: uniform random integer in `[0, max)`.
pub fn rnd() -> Rc<FunctionSymbol> {
    BUILTINS.with(|b| Rc::clone(&b.rnd))
}

/// All built-in symbols, for binder seeding.
pub fn all() -> Vec<Rc<FunctionSymbol>> {
    vec![input(), print(), rnd()]
}

/// Whether `function` is one of the built-ins.
pub fn is_builtin(function: &FunctionSymbol) -> bool {
    BUILTINS.with(|b| {
        function == b.input.as_ref() || function == b.print.as_ref() || function == b.rnd.as_ref()
    })
}

pub(crate) fn is_input(function: &FunctionSymbol) -> bool {
    BUILTINS.with(|b| function == b.input.as_ref())
}

pub(crate) fn is_print(function: &FunctionSymbol) -> bool {
    BUILTINS.with(|b| function == b.print.as_ref())
}

pub(crate) fn is_rnd(function: &FunctionSymbol) -> bool {
    BUILTINS.with(|b| function == b.rnd.as_ref())
}
