// monkey-vm - Call frames
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Call frames for the VM.

use std::rc::Rc;

use monkey_code::Instructions;
use monkey_core::object::Closure;

/// One active function invocation.
#[derive(Debug)]
pub struct Frame {
    /// The closure being executed; carries the bytecode and free values.
    pub closure: Rc<Closure>,

    /// Instruction pointer into the closure's instruction stream.
    pub ip: usize,

    /// Absolute stack index of this frame's first local slot. Parameter
    /// slots (and the var-args carrier, when variadic) sit at the bottom;
    /// `let` bindings follow.
    pub locals_base: usize,
}

impl Frame {
    /// Create a frame starting at the function's first instruction.
    pub fn new(closure: Rc<Closure>, locals_base: usize) -> Self {
        Self {
            closure,
            ip: 0,
            locals_base,
        }
    }

    /// The instruction stream of the running function.
    pub fn instructions(&self) -> &Instructions {
        &self.closure.func.instructions
    }
}
