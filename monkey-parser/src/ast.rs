// monkey-parser - Abstract syntax tree for Monkey
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! AST node definitions.
//!
//! Nodes are plain sum types; evaluation and compilation live elsewhere and
//! dispatch with exhaustive matches. Every node records the [`Span`] it was
//! parsed from, and every node has a canonical `Display` form that parses
//! back to an equivalent tree.

use std::fmt;

use crate::diagnostics::Diagnostic;
use crate::token::{Span, TokenKind};

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A braced sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for stmt in &self.stmts {
            write!(f, "{} ", stmt)?;
        }
        write!(f, "}}")
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: Ident,
        value: Expr,
        semicolon: bool,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        semicolon: bool,
        span: Span,
    },
    Expr {
        expr: Expr,
        semicolon: bool,
        span: Span,
    },
}

impl Stmt {
    /// The source extent of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let { span, .. } | Stmt::Return { span, .. } | Stmt::Expr { span, .. } => *span,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let {
                name,
                value,
                semicolon,
                ..
            } => {
                write!(f, "let {} = {}", name, value)?;
                if *semicolon {
                    write!(f, ";")?;
                }
                Ok(())
            }
            Stmt::Return {
                value, semicolon, ..
            } => {
                match value {
                    Some(value) => write!(f, "return {}", value)?,
                    None => write!(f, "return")?,
                }
                if *semicolon {
                    write!(f, ";")?;
                }
                Ok(())
            }
            Stmt::Expr {
                expr, semicolon, ..
            } => {
                write!(f, "{}", expr)?;
                if *semicolon {
                    write!(f, ";")?;
                }
                Ok(())
            }
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Int {
        value: i64,
        span: Span,
    },
    Bool {
        value: bool,
        span: Span,
    },
    /// A string literal; `value` holds the unquoted content.
    Str {
        value: String,
        span: Span,
    },
    Array {
        elems: Vec<Expr>,
        span: Span,
    },
    /// A map literal; pairs keep their source order.
    Map {
        pairs: Vec<(Expr, Expr)>,
        span: Span,
    },
    Prefix {
        op: TokenKind,
        rhs: Box<Expr>,
        span: Span,
    },
    Infix {
        op: TokenKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    If {
        cond: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
        span: Span,
    },
    Fn {
        params: Vec<Ident>,
        variadic: bool,
        body: Block,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Index {
        obj: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// The `...` expression, valid inside a variadic function.
    VarArgs {
        span: Span,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    /// The source extent of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(ident) => ident.span,
            Expr::Int { span, .. }
            | Expr::Bool { span, .. }
            | Expr::Str { span, .. }
            | Expr::Array { span, .. }
            | Expr::Map { span, .. }
            | Expr::Prefix { span, .. }
            | Expr::Infix { span, .. }
            | Expr::If { span, .. }
            | Expr::Fn { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::VarArgs { span }
            | Expr::Range { span, .. } => *span,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(ident) => write!(f, "{}", ident),
            Expr::Int { value, .. } => write!(f, "{}", value),
            Expr::Bool { value, .. } => write!(f, "{}", value),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Array { elems, .. } => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Expr::Map { pairs, .. } => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Expr::Prefix { op, rhs, .. } => write!(f, "({}{})", op, rhs),
            Expr::Infix { op, lhs, rhs, .. } => write!(f, "({}{}{})", lhs, op, rhs),
            Expr::If {
                cond,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", cond, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expr::Fn {
                params,
                variadic,
                body,
                ..
            } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                if *variadic {
                    if !params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") {}", body)
            }
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Index { obj, index, .. } => write!(f, "({}[{}])", obj, index),
            Expr::VarArgs { .. } => write!(f, "..."),
            Expr::Range { start, end, .. } => write!(f, "({}..{})", start, end),
        }
    }
}

/// A parsed program: an ordered sequence of statements plus the diagnostics
/// collected while parsing it.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}
