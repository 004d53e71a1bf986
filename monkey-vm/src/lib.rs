// monkey-vm - Bytecode compiler and virtual machine for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # monkey-vm
//!
//! Bytecode compiler and stack-based virtual machine for Monkey.
//!
//! This crate provides an alternative execution model to the AST-walking
//! interpreter in `monkey-core`. Code is first compiled to bytecode, then
//! executed by a stack-based VM with call frames. The compiler's symbol
//! table and the VM's frame layout agree on all binding indices: globals
//! are slots in a persistent array, locals are frame-relative stack slots,
//! builtins share a fixed registration table, and free variables are
//! captured into closures at `OpClosure` time.

pub mod compiler;
pub mod symbols;
pub mod vm;

pub use compiler::{Bytecode, CompileError, Compiler};
pub use symbols::{Symbol, SymbolScope, SymbolTable};
pub use vm::{GLOBALS_SIZE, MAX_FRAMES, RuntimeError, STACK_SIZE, VM};
