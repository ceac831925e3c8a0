//! Local scope stack
//!
//! One frame per active call. Lookups see only the topmost frame: a Vivian
//! function has no view of its caller's locals, and globals live in the
//! caller-owned map outside this stack.

use super::Value;
use crate::symbols::VariableSymbol;
use std::collections::HashMap;

/// A single call's local bindings.
pub type Frame = HashMap<VariableSymbol, Value>;

/// Stack of per-call local scopes.
#[derive(Debug, Default)]
pub struct Frames {
    frames: Vec<Frame>,
}

impl Frames {
    pub fn new() -> Self {
        Frames { frames: Vec::new() }
    }

    /// Push an empty frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Push a pre-populated frame (parameter bindings).
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Pop the current frame. Pushes and pops must pair up; an underflow is
    /// an evaluator bug, not a program error.
    pub fn pop(&mut self) {
        if self.frames.pop().is_none() {
            panic!("local scope stack underflow");
        }
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look up a binding in the current frame only.
    pub fn get(&self, symbol: &VariableSymbol) -> Option<&Value> {
        self.frames.last().and_then(|frame| frame.get(symbol))
    }

    /// Bind or overwrite in the current frame.
    pub fn define(&mut self, symbol: VariableSymbol, value: Value) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.insert(symbol, value);
            }
            None => panic!("no active local scope"),
        }
    }
}
