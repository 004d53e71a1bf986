// monkey-core - Runtime object model for Monkey
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Runtime value variants shared by the evaluator and the VM.
//!
//! Values are cheap to clone: aggregates use `im` persistent collections
//! and functions sit behind `Rc`. `Display` renders the inspect form used
//! by `puts` and the REPL.

use std::fmt;
use std::rc::Rc;

use im::{OrdMap, Vector};
use monkey_code::Instructions;
use monkey_parser::ast::{Block, Ident};
use monkey_parser::token::Span;

use crate::env::Env;
use crate::error::Result;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(Rc<str>),
    Null,
    Array(Vector<Object>),
    /// Hash maps index entries by [`HashKey`]; each entry keeps the
    /// original key object for identity comparison.
    Map(OrdMap<HashKey, MapEntry>),
    /// Sentinel wrapping a `return`ed value until it is unwrapped at the
    /// enclosing function or program boundary.
    Return(Box<Object>),
    /// An evaluator function with its captured environment.
    Function(Rc<Function>),
    /// A compiled function body living in the constant pool.
    CompiledFunction(Rc<CompiledFunction>),
    /// A compiled function paired with its captured free values.
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// First-class carrier for the tail arguments of a variadic call.
    VarArgs(Vector<Object>),
}

impl Object {
    /// Build a string object.
    pub fn str(value: impl AsRef<str>) -> Object {
        Object::Str(Rc::from(value.as_ref()))
    }

    /// The type tag used in error messages and hash keys.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Map(_) => "MAP",
            Object::Return(_) => "RETURN_VALUE",
            Object::Function(_) => "FUNCTION",
            Object::CompiledFunction(_) => "COMPILED_FUNCTION",
            Object::Closure(_) => "CLOSURE",
            Object::Builtin(_) => "BUILTIN",
            Object::VarArgs(_) => "VAR_ARGS",
        }
    }

    /// The hash key of this object, if it can be used as a map key.
    /// Only integers, booleans, and strings are hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                tag: "INTEGER",
                digest: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                tag: "BOOLEAN",
                digest: u64::from(*value),
            }),
            Object::Str(value) => Some(HashKey {
                tag: "STRING",
                digest: fnv1a(value.as_bytes()),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::Str(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(elems) => {
                write!(f, "[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Object::Map(entries) => {
                write!(f, "{{")?;
                for entry in entries.values() {
                    write!(f, "{}:{},", entry.key, entry.value)?;
                }
                write!(f, "}}")
            }
            Object::Return(value) => write!(f, "{}", value),
            Object::Function(func) => {
                write!(f, "fn(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", param)?;
                }
                if func.variadic {
                    if !func.params.is_empty() {
                        write!(f, ",")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") {}", func.body)
            }
            Object::CompiledFunction(func) => {
                write!(f, "CompiledFunction[{:p}]", Rc::as_ptr(func))
            }
            Object::Closure(closure) => write!(f, "Closure[{:p}]", Rc::as_ptr(closure)),
            Object::Builtin(_) => write!(f, "<Builtin>"),
            Object::VarArgs(elems) => {
                write!(f, "VA[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Map(a), Object::Map(b)) => a == b,
            (Object::Return(a), Object::Return(b)) => a == b,
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::CompiledFunction(a), Object::CompiledFunction(b)) => Rc::ptr_eq(a, b),
            (Object::Closure(a), Object::Closure(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => a.name == b.name,
            (Object::VarArgs(a), Object::VarArgs(b)) => a == b,
            _ => false,
        }
    }
}

/// The key a map entry is stored under: the operand's type tag plus a
/// 64-bit digest. Equal keys always produce the same hash key; collisions
/// between unequal keys of the same type are guarded at lookup time by
/// comparing against the stored key object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashKey {
    pub tag: &'static str,
    pub digest: u64,
}

/// A stored map entry: the original key object and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Object,
    pub value: Object,
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// An evaluator function literal with the environment captured (by copy)
/// at definition time.
#[derive(Debug)]
pub struct Function {
    pub params: Vec<Ident>,
    pub variadic: bool,
    pub body: Block,
    pub env: Env,
}

/// A function compiled to bytecode, stored in the constant pool.
#[derive(Debug, PartialEq)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    /// Stack slots reserved for this function's frame: parameters, the
    /// var-args slot when variadic, and `let` bindings.
    pub num_locals: usize,
    /// Number of named parameters.
    pub num_args: usize,
    pub variadic: bool,
}

/// A compiled function paired with the values captured for its free
/// variables, in capture order. `free` always has exactly the length the
/// compiler counted for the function.
#[derive(Debug)]
pub struct Closure {
    pub func: Rc<CompiledFunction>,
    pub free: Vec<Object>,
}

/// The signature of a builtin: the span of the call (for error reporting)
/// and the argument list.
pub type BuiltinFn = fn(Span, Vec<Object>) -> Result<Object>;

/// A host-provided function registered under a stable index shared by the
/// compiler and the VM.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

// ============================================================================
// Tests
// ============================================================================
