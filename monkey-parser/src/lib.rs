// monkey-parser - Lexer and parser for the Monkey programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # monkey-parser
//!
//! Lexer and parser for the Monkey programming language.
//! Produces an [`ast::Program`] (plus a list of [`Diagnostic`]s) from
//! source code strings.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Block, Expr, Ident, Program, Stmt};
pub use diagnostics::Diagnostic;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Location, Span, Token, TokenKind};
