// monkey-code - Bytecode instruction definitions for the Monkey VM
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # monkey-code
//!
//! Bytecode instruction definitions shared by the Monkey compiler and
//! virtual machine: the opcode table with per-opcode operand widths,
//! instruction encoding and decoding, and disassembly.
//!
//! Instructions are a flat byte stream. Each instruction is a single
//! opcode byte followed by big-endian operands of fixed, per-opcode
//! widths (two bytes for pool/global indexes, sizes, and jump targets;
//! one byte for local, free, and builtin indexes).

pub mod opcode;

pub use opcode::{
    Definition, Instructions, Opcode, make, read_operands, read_u8, read_u16,
};
