// monkey-parser - Parser for Monkey
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Pratt parser for Monkey source code.
//!
//! The parser keeps two tokens of lookahead (`cur` and `peek`). Errors are
//! collected as [`Diagnostic`]s rather than aborting: a failing sub-rule
//! returns `None` and the statement loop advances past it, so one malformed
//! statement does not hide diagnostics for the rest of the program.

use crate::ast::{Block, Expr, Ident, Program, Stmt};
use crate::diagnostics::Diagnostic;
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

/// Operator precedence, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,      // == or !=
    LessGreater, // < or >
    Sum,         // + or -
    Product,     // * or /
    Prefix,      // -x or !x
    Call,        // fn(x)
    Range,       // 1..2
    Index,       // array[idx]
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::Lparen => Precedence::Call,
        TokenKind::TwoDots => Precedence::Range,
        TokenKind::Lbracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Parse a source string into a [`Program`].
pub fn parse(source: &str) -> Program {
    Parser::new(source).parse_program()
}

/// The Monkey parser.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Create a parser over the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            cur,
            peek,
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole input. Never panics; syntax errors are reported in
    /// the returned program's `diagnostics`.
    pub fn parse_program(mut self) -> Program {
        let mut statements = Vec::new();

        while self.cur.kind != TokenKind::Eof {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        Program {
            statements,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(span, message));
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur.kind)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let let_span = self.cur.span;
        self.next_token();

        if self.cur.kind != TokenKind::Ident {
            self.error(self.cur.span, "Let statement expected an identifier");
            return None;
        }
        let name = Ident {
            name: self.cur.literal.clone(),
            span: self.cur.span,
        };
        self.next_token();

        if self.cur.kind != TokenKind::Assign {
            self.error(self.cur.span, "Expected \"=\" in let statement");
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        let mut span = let_span.join(value.span());
        let semicolon = self.peek.kind == TokenKind::Semicolon;
        if semicolon {
            self.next_token();
            span = span.join(self.cur.span);
        }

        Some(Stmt::Let {
            name,
            value,
            semicolon,
            span,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let return_span = self.cur.span;

        // A bare `return` carries no value.
        if matches!(self.peek.kind, TokenKind::Rbrace | TokenKind::Eof) {
            return Some(Stmt::Return {
                value: None,
                semicolon: false,
                span: return_span,
            });
        }
        if self.peek.kind == TokenKind::Semicolon {
            self.next_token();
            return Some(Stmt::Return {
                value: None,
                semicolon: true,
                span: return_span.join(self.cur.span),
            });
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        let mut span = return_span.join(value.span());
        let semicolon = self.peek.kind == TokenKind::Semicolon;
        if semicolon {
            self.next_token();
            span = span.join(self.cur.span);
        }

        Some(Stmt::Return {
            value: Some(value),
            semicolon,
            span,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        let mut span = expr.span();
        let semicolon = self.peek.kind == TokenKind::Semicolon;
        if semicolon {
            self.next_token();
            span = span.join(self.cur.span);
        }

        Some(Stmt::Expr {
            expr,
            semicolon,
            span,
        })
    }

    /// Parse a braced block. `cur` must be on the opening `{`.
    fn parse_block_statement(&mut self) -> Option<Block> {
        let lbrace_span = self.cur.span;
        let mut stmts = Vec::new();

        while self.peek.kind != TokenKind::Rbrace {
            if self.peek.kind == TokenKind::Eof {
                self.error(self.peek.span, "Expected } to close block");
                return None;
            }
            self.next_token();
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
        }

        self.next_token();
        Some(Block {
            stmts,
            span: lbrace_span.join(self.cur.span),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while self.peek.kind != TokenKind::Semicolon && precedence < self.peek_precedence() {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::Lparen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::Lbracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                TokenKind::TwoDots => {
                    self.next_token();
                    self.parse_range_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur.kind {
            TokenKind::Ident => Some(Expr::Ident(Ident {
                name: self.cur.literal.clone(),
                span: self.cur.span,
            })),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::Str => Some(self.parse_string_literal()),
            TokenKind::True | TokenKind::False => Some(Expr::Bool {
                value: self.cur.kind == TokenKind::True,
                span: self.cur.span,
            }),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::Lparen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_fn_literal(),
            TokenKind::Lbracket => self.parse_array_literal(),
            TokenKind::Lbrace => self.parse_map_literal(),
            TokenKind::ThreeDots => Some(Expr::VarArgs {
                span: self.cur.span,
            }),
            _ => {
                self.error(self.cur.span, "Invalid token");
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expr::Int {
                value,
                span: self.cur.span,
            }),
            Err(_) => {
                self.error(
                    self.cur.span,
                    "Invalid integer literal. Could not be converted to a 64-bit 10-base integer.",
                );
                None
            }
        }
    }

    /// The token literal keeps the source quotes; the AST value is the
    /// unquoted content.
    fn parse_string_literal(&self) -> Expr {
        let literal = &self.cur.literal;
        Expr::Str {
            value: literal[1..literal.len() - 1].to_string(),
            span: self.cur.span,
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expr> {
        let op = self.cur.kind;
        let op_span = self.cur.span;
        self.next_token();

        let rhs = self.parse_expression(Precedence::Prefix)?;
        let span = op_span.join(rhs.span());
        Some(Expr::Prefix {
            op,
            rhs: Box::new(rhs),
            span,
        })
    }

    fn parse_infix_expression(&mut self, lhs: Expr) -> Option<Expr> {
        let op = self.cur.kind;
        let precedence = self.cur_precedence();
        self.next_token();

        let rhs = self.parse_expression(precedence)?;
        let span = lhs.span().join(rhs.span());
        Some(Expr::Infix {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek.kind != TokenKind::Rparen {
            self.error(self.peek.span, "Expected ) to close grouped expression");
            return None;
        }
        self.next_token();
        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        let if_span = self.cur.span;

        if self.peek.kind != TokenKind::Lparen {
            self.error(self.peek.span, "Expected ( after \"if\"");
            return None;
        }
        self.next_token();
        self.next_token();

        let cond = self.parse_expression(Precedence::Lowest)?;

        if self.peek.kind != TokenKind::Rparen {
            self.error(self.peek.span, "Expected ) to close if condition");
            return None;
        }
        self.next_token();

        if self.peek.kind != TokenKind::Lbrace {
            self.error(self.peek.span, "Expected { after if condition");
            return None;
        }
        self.next_token();

        let consequence = self.parse_block_statement()?;
        let mut span = if_span.join(consequence.span);

        let alternative = if self.peek.kind == TokenKind::Else {
            self.next_token();
            if self.peek.kind != TokenKind::Lbrace {
                self.error(self.peek.span, "Expected { after \"else\"");
                return None;
            }
            self.next_token();
            let alternative = self.parse_block_statement()?;
            span = span.join(alternative.span);
            Some(alternative)
        } else {
            None
        };

        Some(Expr::If {
            cond: Box::new(cond),
            consequence,
            alternative,
            span,
        })
    }

    fn parse_fn_literal(&mut self) -> Option<Expr> {
        let fn_span = self.cur.span;

        if self.peek.kind != TokenKind::Lparen {
            self.error(self.peek.span, "fn literal must be followed by argument list");
            return None;
        }
        self.next_token();
        self.next_token();

        let mut params = Vec::new();
        let mut variadic = false;

        while self.cur.kind != TokenKind::Rparen {
            if self.cur.kind == TokenKind::Eof {
                self.error(self.cur.span, "Expected ) to close fn argument list");
                return None;
            }
            if self.cur.kind != TokenKind::Ident && self.cur.kind != TokenKind::ThreeDots {
                self.error(
                    self.cur.span,
                    "Parameters to an fn literal must be identifier expressions or \"...\"",
                );
                return None;
            }
            if self.peek.kind != TokenKind::Comma && self.peek.kind != TokenKind::Rparen {
                self.error(
                    self.peek.span,
                    "Invalid token found in argument list of fn literal expression",
                );
                return None;
            }

            if self.cur.kind == TokenKind::ThreeDots {
                variadic = true;
                self.next_token();
                if self.cur.kind != TokenKind::Rparen {
                    self.error(
                        self.cur.span,
                        "`...` var args must be the last argument to a function",
                    );
                    return None;
                }
            } else {
                params.push(Ident {
                    name: self.cur.literal.clone(),
                    span: self.cur.span,
                });
                self.next_token();
            }

            if self.cur.kind == TokenKind::Comma {
                self.next_token();
            }
        }

        if self.peek.kind != TokenKind::Lbrace {
            self.error(self.peek.span, "Expected body of fn literal");
            return None;
        }
        self.next_token();

        let body = self.parse_block_statement()?;
        let span = fn_span.join(body.span);
        Some(Expr::Fn {
            params,
            variadic,
            body,
            span,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let lbracket_span = self.cur.span;
        let mut elems = Vec::new();
        self.next_token();

        while self.cur.kind != TokenKind::Rbracket {
            if self.cur.kind == TokenKind::Eof {
                self.error(self.cur.span, "Expected ] to close array literal");
                return None;
            }
            let elem = self.parse_expression(Precedence::Lowest)?;

            if self.peek.kind != TokenKind::Comma && self.peek.kind != TokenKind::Rbracket {
                self.error(
                    self.peek.span,
                    "Invalid delimiter token found in array literal",
                );
                return None;
            }
            elems.push(elem);
            self.next_token();
            if self.cur.kind == TokenKind::Comma {
                self.next_token();
            }
        }

        Some(Expr::Array {
            elems,
            span: lbracket_span.join(self.cur.span),
        })
    }

    fn parse_map_literal(&mut self) -> Option<Expr> {
        let lbrace_span = self.cur.span;
        let mut pairs = Vec::new();
        self.next_token();

        while self.cur.kind != TokenKind::Rbrace {
            if self.cur.kind == TokenKind::Eof {
                self.error(self.cur.span, "Expected } to close map literal");
                return None;
            }
            let key = self.parse_expression(Precedence::Lowest)?;

            if self.peek.kind != TokenKind::Colon {
                self.error(self.peek.span, "Expected \":\" between map key and value");
                return None;
            }
            self.next_token();
            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;

            if self.peek.kind != TokenKind::Comma && self.peek.kind != TokenKind::Rbrace {
                self.error(
                    self.peek.span,
                    "Invalid delimiter token found in map literal",
                );
                return None;
            }
            pairs.push((key, value));
            self.next_token();
            if self.cur.kind == TokenKind::Comma {
                self.next_token();
            }
        }

        Some(Expr::Map {
            pairs,
            span: lbrace_span.join(self.cur.span),
        })
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Option<Expr> {
        let mut args = Vec::new();
        self.next_token();

        while self.cur.kind != TokenKind::Rparen {
            if self.cur.kind == TokenKind::Eof {
                self.error(self.cur.span, "Expected ) to close call argument list");
                return None;
            }
            let arg = self.parse_expression(Precedence::Lowest)?;

            if self.peek.kind != TokenKind::Comma && self.peek.kind != TokenKind::Rparen {
                self.error(
                    self.peek.span,
                    "Invalid delimiter token found in call expression argument list",
                );
                return None;
            }
            args.push(arg);
            self.next_token();
            if self.cur.kind == TokenKind::Comma {
                self.next_token();
            }
        }

        let span = callee.span().join(self.cur.span);
        Some(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }

    fn parse_index_expression(&mut self, obj: Expr) -> Option<Expr> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if self.peek.kind != TokenKind::Rbracket {
            self.error(
                self.peek.span,
                "Expected ] delimiter to close array index expression",
            );
            return None;
        }
        self.next_token();

        let span = obj.span().join(self.cur.span);
        Some(Expr::Index {
            obj: Box::new(obj),
            index: Box::new(index),
            span,
        })
    }

    fn parse_range_expression(&mut self, start: Expr) -> Option<Expr> {
        let precedence = self.cur_precedence();
        self.next_token();

        let end = self.parse_expression(precedence)?;
        let span = start.span().join(end.span());
        Some(Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
            span,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
