// monkey-core - Error type for the Monkey evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime errors for the evaluator.
//!
//! Evaluation errors carry the span of the offending expression and
//! short-circuit evaluation the same way a `return` does. They render
//! contextually through the shared diagnostic renderer.

use std::fmt;

use monkey_parser::diagnostics::render_span;
use monkey_parser::token::Span;

/// Result type for evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;

/// A runtime error anchored to the source span that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
    pub span: Span,
}

impl EvalError {
    /// Create an error over the given span.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Render this error against the source it came from, underlining the
    /// offending span.
    pub fn render(&self, source: &str) -> String {
        render_span(source, self.span, &self.message)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}
