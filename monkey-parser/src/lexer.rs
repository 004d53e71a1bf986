// monkey-parser - Lexer for Monkey
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Lexer (tokeniser) for Monkey source code.
//!
//! Single pass over the raw bytes with one byte of lookahead (two for the
//! `...` token). Tracks `(line, column)` so every token carries an exact
//! source span.

use crate::token::{Location, Span, Token, TokenKind, lookup_keyword};

/// The lexer converts source code into tokens.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    /// Byte offset of the current character.
    position: usize,
    /// Current character under examination (0 at end of input).
    ch: u8,
    /// Current line, 0-indexed.
    current_line: usize,
    /// Byte offset of the start of the current line.
    line_byte_offset: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(input: &'a str) -> Self {
        let bytes = input.as_bytes();
        Lexer {
            input,
            bytes,
            position: 0,
            ch: bytes.first().copied().unwrap_or(0),
            current_line: 0,
            line_byte_offset: 0,
        }
    }

    /// Produce the next token. At end of input this returns a zero-width
    /// [`TokenKind::Eof`] token, repeatedly.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let tok = match self.ch {
            b'=' => {
                if self.peek(1) == b'=' {
                    self.two_char_token(TokenKind::Eq)
                } else {
                    self.single_char_token(TokenKind::Assign)
                }
            }
            b'!' => {
                if self.peek(1) == b'=' {
                    self.two_char_token(TokenKind::NotEq)
                } else {
                    self.single_char_token(TokenKind::Bang)
                }
            }
            b'+' => self.single_char_token(TokenKind::Plus),
            b'-' => self.single_char_token(TokenKind::Minus),
            b'*' => self.single_char_token(TokenKind::Asterisk),
            b'/' => self.single_char_token(TokenKind::Slash),
            b'<' => self.single_char_token(TokenKind::Lt),
            b'>' => self.single_char_token(TokenKind::Gt),
            b',' => self.single_char_token(TokenKind::Comma),
            b';' => self.single_char_token(TokenKind::Semicolon),
            b':' => self.single_char_token(TokenKind::Colon),
            b'(' => self.single_char_token(TokenKind::Lparen),
            b')' => self.single_char_token(TokenKind::Rparen),
            b'{' => self.single_char_token(TokenKind::Lbrace),
            b'}' => self.single_char_token(TokenKind::Rbrace),
            b'[' => self.single_char_token(TokenKind::Lbracket),
            b']' => self.single_char_token(TokenKind::Rbracket),
            b'.' => return self.read_dots(),
            b'"' => return self.read_string(),
            0 => {
                let at = self.location();
                return Token::new(TokenKind::Eof, "", Span::new(at, at));
            }
            c if is_letter(c) => return self.read_identifier(),
            c if c.is_ascii_digit() => return self.read_number(),
            _ => return self.illegal_token(),
        };

        self.read_char();
        tok
    }

    /// Collect all tokens up to and excluding EOF.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn location(&self) -> Location {
        Location::new(self.current_line, self.position - self.line_byte_offset)
    }

    fn read_char(&mut self) {
        let next = self.position + 1;
        self.ch = self.bytes.get(next).copied().unwrap_or(0);
        self.position = next;
    }

    fn peek(&self, offset: usize) -> u8 {
        self.bytes.get(self.position + offset).copied().unwrap_or(0)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\r' | b'\n') {
            if self.ch == b'\n' {
                self.current_line += 1;
                self.line_byte_offset = self.position + 1;
            }
            self.read_char();
        }
    }

    fn single_char_token(&self, kind: TokenKind) -> Token {
        let start = self.location();
        let end = Location::new(start.line, start.column + 1);
        Token::new(kind, (self.ch as char).to_string(), Span::new(start, end))
    }

    fn two_char_token(&mut self, kind: TokenKind) -> Token {
        let start = self.location();
        let first = self.ch;
        self.read_char();
        let literal = format!("{}{}", first as char, self.ch as char);
        let end = Location::new(start.line, start.column + 2);
        Token::new(kind, literal, Span::new(start, end))
    }

    fn illegal_token(&mut self) -> Token {
        let start = self.location();
        // The offending byte may be the start of a multi-byte character;
        // take the whole character so the literal stays valid UTF-8.
        let ch = self.input[self.position..].chars().next().unwrap_or('\0');
        for _ in 0..ch.len_utf8() {
            self.read_char();
        }
        let end = self.location();
        Token::new(TokenKind::Illegal, ch.to_string(), Span::new(start, end))
    }

    fn read_identifier(&mut self) -> Token {
        let line = self.current_line;
        let start_pos = self.position;
        while is_letter(self.ch) {
            self.read_char();
        }
        let literal = &self.input[start_pos..self.position];
        let span = Span::new(
            Location::new(line, start_pos - self.line_byte_offset),
            Location::new(line, self.position - self.line_byte_offset),
        );
        Token::new(lookup_keyword(literal), literal, span)
    }

    fn read_number(&mut self) -> Token {
        let line = self.current_line;
        let start_pos = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        let literal = &self.input[start_pos..self.position];
        let span = Span::new(
            Location::new(line, start_pos - self.line_byte_offset),
            Location::new(line, self.position - self.line_byte_offset),
        );
        Token::new(TokenKind::Int, literal, span)
    }

    /// Read a string literal. The token literal keeps the surrounding
    /// quotes; there are no escape sequences. An unterminated string
    /// becomes an ILLEGAL token reaching to the end of input.
    fn read_string(&mut self) -> Token {
        let line = self.current_line;
        let start_pos = self.position;

        // Skip the initial quote.
        self.read_char();
        while self.ch != b'"' && self.ch != 0 {
            self.read_char();
        }

        let terminated = self.ch == b'"';
        if terminated {
            // Skip the closing quote.
            self.read_char();
        }

        let literal = &self.input[start_pos..self.position];
        let span = Span::new(
            Location::new(line, start_pos - self.line_byte_offset),
            Location::new(line, self.position - self.line_byte_offset),
        );
        let kind = if terminated {
            TokenKind::Str
        } else {
            TokenKind::Illegal
        };
        Token::new(kind, literal, span)
    }

    /// Read `..` or `...`. A lone dot is an ILLEGAL token.
    fn read_dots(&mut self) -> Token {
        if self.peek(1) != b'.' {
            return self.illegal_token();
        }

        let start = self.location();
        self.read_char();
        self.read_char();

        let (kind, literal) = if self.ch == b'.' {
            self.read_char();
            (TokenKind::ThreeDots, "...")
        } else {
            (TokenKind::TwoDots, "..")
        };

        Token::new(kind, literal, Span::new(start, self.location()))
    }
}

fn is_letter(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

// ============================================================================
// Tests
// ============================================================================
