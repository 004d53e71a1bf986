// monkey-core - Runtime and evaluator for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # monkey-core
//!
//! Runtime object model and tree-walking evaluator for the Monkey
//! programming language.
//!
//! # Quick Start
//!
//! ```
//! use monkey_core::{Env, eval};
//! use monkey_parser::parser::parse;
//!
//! let program = parse("let a = 2; a * 21");
//! assert!(program.diagnostics.is_empty());
//!
//! let env = Env::new();
//! let result = eval::eval_program(&program, &env).unwrap();
//! assert_eq!(result.to_string(), "42");
//! ```
//!
//! # Core Components
//!
//! - [`Object`] - runtime value variants shared by both backends
//! - [`Env`] - lexical environment chain for the evaluator
//! - [`eval`] - the tree-walking evaluator
//! - [`builtins`] - the host-provided builtin functions

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod object;

pub use env::Env;
pub use error::{EvalError, Result};
pub use object::{Builtin, Closure, CompiledFunction, Function, HashKey, MapEntry, Object};
