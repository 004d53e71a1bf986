// monkey-parser - Contextual diagnostic rendering
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Diagnostics with contextual source rendering.
//!
//! A [`Diagnostic`] is a message anchored to a [`Span`]. Rendering excerpts
//! the offending lines from the source buffer, underlines the span with
//! ANSI codes, and appends the message in red on a trailing line.

use std::fmt;

use crate::token::Span;

const UNDERLINE: &str = "\x1b[4m";
const UNDERLINE_RESET: &str = "\x1b[24m";
const RED: &str = "\x1b[31m";
const RESET_COLOR: &str = "\x1b[0m";

/// An error message anchored to a source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// Render this diagnostic against the source it was produced from,
    /// underlining the offending span.
    pub fn render(&self, source: &str) -> String {
        render_span(source, self.span, &self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.start.line, self.span.start.column, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Render `message` against `source` with `span` underlined.
///
/// The underline opens at the span's start column and closes at its end
/// column; lines in between are emitted verbatim and stay underlined by
/// terminal state. The message follows on its own line in red.
pub fn render_span(source: &str, span: Span, message: &str) -> String {
    let lines: Vec<&str> = source.split('\n').collect();
    let start_line = span.start.line;
    let end_line = span.end.line;

    let mut out = String::new();
    for line_idx in start_line..=end_line {
        let Some(line) = lines.get(line_idx) else {
            break;
        };

        if line_idx == start_line && line_idx == end_line {
            let (first, rest) = split_clamped(line, span.start.column);
            let (second, third) = split_clamped(rest, span.end.column - span.start.column);
            out.push_str(first);
            out.push_str(UNDERLINE);
            out.push_str(second);
            out.push_str(UNDERLINE_RESET);
            out.push_str(third);
        } else if line_idx == start_line {
            let (first, second) = split_clamped(line, span.start.column);
            out.push_str(first);
            out.push_str(UNDERLINE);
            out.push_str(second);
        } else if line_idx == end_line {
            let (first, second) = split_clamped(line, span.end.column);
            out.push_str(first);
            out.push_str(UNDERLINE_RESET);
            out.push_str(second);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    out.push_str(&format!("\t{}{}{}\n", RED, message, RESET_COLOR));
    out
}

/// Split a line at a byte column, clamping out-of-range or mid-character
/// offsets to the end of the line.
fn split_clamped(line: &str, column: usize) -> (&str, &str) {
    if column <= line.len() && line.is_char_boundary(column) {
        line.split_at(column)
    } else {
        (line, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Location;

    fn span(start: (usize, usize), end: (usize, usize)) -> Span {
        Span::new(Location::new(start.0, start.1), Location::new(end.0, end.1))
    }

    #[test]
    fn test_render_single_line() {
        let source = "let a = 5 @ 3;";
        let diag = Diagnostic::new(span((0, 10), (0, 11)), "Invalid token");
        assert_eq!(
            diag.render(source),
            "let a = 5 \x1b[4m@\x1b[24m 3;\n\t\x1b[31mInvalid token\x1b[0m\n"
        );
    }

    #[test]
    fn test_render_multi_line() {
        let source = "let a = fn(x,\ny,\nz { x };";
        let diag = Diagnostic::new(span((0, 10), (2, 1)), "Expected body of fn literal");
        assert_eq!(
            diag.render(source),
            "let a = fn\x1b[4m(x,\ny,\nz\x1b[24m { x };\n\t\x1b[31mExpected body of fn literal\x1b[0m\n"
        );
    }

    #[test]
    fn test_render_clamps_out_of_range_columns() {
        let source = "x";
        let diag = Diagnostic::new(span((0, 1), (0, 1)), "Unexpected end of input");
        // Zero-width span at end of line keeps the line intact.
        assert_eq!(
            diag.render(source),
            "x\x1b[4m\x1b[24m\n\t\x1b[31mUnexpected end of input\x1b[0m\n"
        );
    }

    #[test]
    fn test_display_has_location_prefix() {
        let diag = Diagnostic::new(span((3, 7), (3, 9)), "bad");
        assert_eq!(diag.to_string(), "3:7: bad");
    }
}
