// monkey-vm - Shared test helpers
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Shared helpers for the compiler and VM integration tests.

#![allow(dead_code)]

use monkey_core::object::Object;
use monkey_parser::parser::parse;
use monkey_vm::compiler::{Bytecode, Compiler};
use monkey_vm::vm::{RuntimeError, VM};

/// Parse and compile, failing the test on any diagnostic or compile error.
pub fn compile(source: &str) -> Bytecode {
    let program = parse(source);
    assert!(
        program.diagnostics.is_empty(),
        "parse diagnostics for {:?}: {:?}",
        source,
        program.diagnostics
    );

    let mut compiler = Compiler::new();
    compiler
        .compile(&program)
        .unwrap_or_else(|e| panic!("compile error for {:?}: {}", source, e));
    compiler.bytecode()
}

/// Compile and run on a fresh VM, returning the program's value.
pub fn run(source: &str) -> Result<Object, RuntimeError> {
    VM::new(compile(source)).run()
}

pub fn run_ok(source: &str) -> Object {
    run(source).unwrap_or_else(|e| panic!("vm error for {:?}: {}", source, e))
}
