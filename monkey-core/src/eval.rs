// monkey-core - Tree-walking evaluator
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Direct AST interpretation.
//!
//! Each node kind has an eval rule threading the current [`Env`]. A
//! `return` wraps its value in the [`Object::Return`] sentinel, which
//! propagates through blocks until the enclosing function (or program)
//! boundary unwraps it. Errors short-circuit the same way via `Result`.

use std::rc::Rc;

use im::Vector;
use monkey_parser::ast::{Block, Expr, Program, Stmt};
use monkey_parser::token::{Span, TokenKind};

use crate::builtins;
use crate::env::Env;
use crate::error::{EvalError, Result};
use crate::object::{Function, MapEntry, Object};

/// Evaluate a program. The value of the program is the value of its last
/// statement, or the value carried by the first `return` to reach the top.
pub fn eval_program(program: &Program, env: &Env) -> Result<Object> {
    let mut result = Object::Null;
    for stmt in &program.statements {
        match eval_stmt(stmt, env)? {
            Object::Return(value) => return Ok(*value),
            other => result = other,
        }
    }
    Ok(result)
}

fn eval_stmt(stmt: &Stmt, env: &Env) -> Result<Object> {
    match stmt {
        Stmt::Let { name, value, .. } => {
            let value = eval_expr(value, env)?;
            if matches!(value, Object::Return(_)) {
                return Ok(value);
            }
            env.define(&name.name, value);
            Ok(Object::Null)
        }
        Stmt::Return { value, .. } => {
            let value = match value {
                Some(value) => eval_expr(value, env)?,
                None => Object::Null,
            };
            Ok(Object::Return(Box::new(value)))
        }
        Stmt::Expr { expr, .. } => eval_expr(expr, env),
    }
}

/// Blocks evaluate to their last statement's value. A `Return` sentinel
/// passes through unwrapped so it keeps propagating outward.
fn eval_block(block: &Block, env: &Env) -> Result<Object> {
    let mut result = Object::Null;
    for stmt in &block.stmts {
        result = eval_stmt(stmt, env)?;
        if matches!(result, Object::Return(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_expr(expr: &Expr, env: &Env) -> Result<Object> {
    match expr {
        Expr::Int { value, .. } => Ok(Object::Integer(*value)),
        Expr::Bool { value, .. } => Ok(Object::Boolean(*value)),
        Expr::Str { value, .. } => Ok(Object::str(value)),
        Expr::Ident(ident) => env
            .lookup(&ident.name)
            .or_else(|| builtins::lookup(&ident.name).map(Object::Builtin))
            .ok_or_else(|| EvalError::new(ident.span, "Identifier not found")),
        Expr::Array { elems, .. } => {
            let mut values = Vector::new();
            for elem in elems {
                values.push_back(eval_expr(elem, env)?);
            }
            Ok(Object::Array(values))
        }
        Expr::Map { pairs, .. } => eval_map_literal(pairs, env),
        Expr::Prefix { op, rhs, span } => eval_prefix(*op, rhs, *span, env),
        Expr::Infix { op, lhs, rhs, span } => eval_infix(*op, lhs, rhs, *span, env),
        Expr::If {
            cond,
            consequence,
            alternative,
            ..
        } => {
            let condition = eval_expr(cond, env)?;
            let Object::Boolean(condition) = condition else {
                return Err(EvalError::new(
                    cond.span(),
                    "Condition must evaluate to a boolean object",
                ));
            };

            if condition {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Object::Null)
            }
        }
        Expr::Fn {
            params,
            variadic,
            body,
            ..
        } => Ok(Object::Function(Rc::new(Function {
            params: params.clone(),
            variadic: *variadic,
            body: body.clone(),
            env: env.copy(),
        }))),
        Expr::Call { callee, args, span } => {
            let callee_obj = eval_expr(callee, env)?;

            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(eval_expr(arg, env)?);
            }

            match callee_obj {
                Object::Function(func) => apply_function(&func, arg_values, *span),
                // Builtins receive their arguments unexpanded, so that
                // `toArray(...)` sees the carrier itself.
                Object::Builtin(builtin) => (builtin.func)(*span, arg_values),
                _ => Err(EvalError::new(callee.span(), "Expression is not callable")),
            }
        }
        Expr::Index { obj, index, .. } => eval_index(obj, index, env),
        Expr::VarArgs { span } => env.var_args().map(Object::VarArgs).ok_or_else(|| {
            EvalError::new(*span, "\"...\" is only valid inside a variadic function")
        }),
        Expr::Range { start, end, .. } => eval_range(start, end, env),
    }
}

/// Call an evaluator function: flatten any var-args carriers among the
/// arguments, check arity, bind parameters in a fresh frame over the
/// captured environment, and unwrap the `Return` sentinel on the way out.
fn apply_function(func: &Rc<Function>, args: Vec<Object>, call_span: Span) -> Result<Object> {
    let mut flat = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Object::VarArgs(elems) => flat.extend(elems.iter().cloned()),
            other => flat.push(other),
        }
    }

    let want = func.params.len();
    if func.variadic {
        if flat.len() < want {
            return Err(EvalError::new(
                call_span,
                format!(
                    "wrong number of arguments: want>={}, got={}",
                    want,
                    flat.len()
                ),
            ));
        }
    } else if flat.len() != want {
        return Err(EvalError::new(
            call_span,
            format!("wrong number of arguments: want={}, got={}", want, flat.len()),
        ));
    }

    let call_env = func.env.enclosed();
    for (param, value) in func.params.iter().zip(&flat) {
        call_env.define(&param.name, value.clone());
    }
    if func.variadic {
        call_env.set_var_args(flat[want..].iter().cloned().collect());
    }

    let result = eval_block(&func.body, &call_env)?;
    Ok(match result {
        Object::Return(value) => *value,
        other => other,
    })
}

fn eval_map_literal(pairs: &[(Expr, Expr)], env: &Env) -> Result<Object> {
    let mut entries = im::OrdMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expr(key_expr, env)?;
        let Some(hash_key) = key.hash_key() else {
            return Err(EvalError::new(
                key_expr.span(),
                "Map key is not a hashable object",
            ));
        };
        let value = eval_expr(value_expr, env)?;
        entries.insert(hash_key, MapEntry { key, value });
    }
    Ok(Object::Map(entries))
}

fn eval_prefix(op: TokenKind, rhs: &Expr, span: Span, env: &Env) -> Result<Object> {
    let value = eval_expr(rhs, env)?;
    match op {
        TokenKind::Bang => match value {
            Object::Boolean(value) => Ok(Object::Boolean(!value)),
            _ => Err(EvalError::new(span, "\"!\" requires a boolean argument")),
        },
        TokenKind::Minus => match value {
            Object::Integer(value) => Ok(Object::Integer(-value)),
            _ => Err(EvalError::new(span, "\"-\" requires an integer argument")),
        },
        _ => Err(EvalError::new(span, "Unsupported prefix operator")),
    }
}

fn eval_infix(op: TokenKind, lhs: &Expr, rhs: &Expr, span: Span, env: &Env) -> Result<Object> {
    let left = eval_expr(lhs, env)?;
    let right = eval_expr(rhs, env)?;

    match op {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Lt
        | TokenKind::Gt => {
            for (operand, operand_expr) in [(&left, lhs), (&right, rhs)] {
                if !matches!(operand, Object::Integer(_) | Object::Str(_)) {
                    return Err(EvalError::new(
                        operand_expr.span(),
                        "Expression does not evaluate to an integer or string object",
                    ));
                }
            }
            if left.type_name() != right.type_name() {
                return Err(EvalError::new(
                    span,
                    "Left and right arguments to the infix operator do not have the same type",
                ));
            }

            match (&left, &right) {
                (Object::Integer(a), Object::Integer(b)) => eval_integer_infix(op, *a, *b, span),
                (Object::Str(a), Object::Str(b)) => {
                    if op == TokenKind::Plus {
                        Ok(Object::str(format!("{}{}", a, b)))
                    } else {
                        Err(EvalError::new(
                            span,
                            format!("Operator \"{}\" is not supported for string operands", op),
                        ))
                    }
                }
                _ => unreachable!("operand types checked above"),
            }
        }
        TokenKind::Eq | TokenKind::NotEq => {
            for (operand, operand_expr) in [(&left, lhs), (&right, rhs)] {
                if !matches!(
                    operand,
                    Object::Integer(_) | Object::Boolean(_) | Object::Str(_)
                ) {
                    return Err(EvalError::new(
                        operand_expr.span(),
                        "Expression does not evaluate to an integer, boolean or string object",
                    ));
                }
            }
            if left.type_name() != right.type_name() {
                return Err(EvalError::new(
                    span,
                    "Left and right arguments to the infix operator do not have the same type",
                ));
            }

            let equal = left == right;
            Ok(Object::Boolean(if op == TokenKind::Eq { equal } else { !equal }))
        }
        _ => Err(EvalError::new(span, "Unsupported infix operator")),
    }
}

fn eval_integer_infix(op: TokenKind, a: i64, b: i64, span: Span) -> Result<Object> {
    Ok(match op {
        TokenKind::Plus => Object::Integer(a + b),
        TokenKind::Minus => Object::Integer(a - b),
        TokenKind::Asterisk => Object::Integer(a * b),
        TokenKind::Slash => {
            if b == 0 {
                return Err(EvalError::new(span, "Division by zero"));
            }
            Object::Integer(a / b)
        }
        TokenKind::Lt => Object::Boolean(a < b),
        TokenKind::Gt => Object::Boolean(a > b),
        _ => unreachable!("operator checked by caller"),
    })
}

fn eval_index(obj: &Expr, index: &Expr, env: &Env) -> Result<Object> {
    let container = eval_expr(obj, env)?;
    let idx = eval_expr(index, env)?;

    match container {
        Object::Array(elems) => {
            let Object::Integer(i) = idx else {
                return Err(EvalError::new(
                    index.span(),
                    "Array index must evaluate to an integer object",
                ));
            };
            if i < 0 || i as usize >= elems.len() {
                return Err(EvalError::new(
                    index.span(),
                    format!("Index {} exceeds length of the array ({})", i, elems.len()),
                ));
            }
            Ok(elems[i as usize].clone())
        }
        Object::Map(entries) => {
            let Some(key) = idx.hash_key() else {
                return Err(EvalError::new(
                    index.span(),
                    "Map key is not a hashable object",
                ));
            };
            entries
                .get(&key)
                .filter(|entry| entry.key.to_string() == idx.to_string())
                .map(|entry| entry.value.clone())
                .ok_or_else(|| EvalError::new(index.span(), "Key not found in map"))
        }
        _ => Err(EvalError::new(obj.span(), "Expression is not indexable")),
    }
}

/// `start..end` builds the array of integers from `start` towards `end`,
/// excluding `end`; the direction is inferred and `start == end` is empty.
fn eval_range(start: &Expr, end: &Expr, env: &Env) -> Result<Object> {
    let start_obj = eval_expr(start, env)?;
    let Object::Integer(start_value) = start_obj else {
        return Err(EvalError::new(
            start.span(),
            "Range start does not evaluate to an integer object",
        ));
    };
    let end_obj = eval_expr(end, env)?;
    let Object::Integer(end_value) = end_obj else {
        return Err(EvalError::new(
            end.span(),
            "Range end does not evaluate to an integer object",
        ));
    };

    Ok(Object::Array(range_values(start_value, end_value)))
}

/// Shared range construction; also used by the VM's `OpRange`.
pub fn range_values(start: i64, end: i64) -> Vector<Object> {
    let step = if start > end { -1 } else { 1 };
    let mut values = Vector::new();
    let mut current = start;
    while current != end {
        values.push_back(Object::Integer(current));
        current += step;
    }
    values
}
