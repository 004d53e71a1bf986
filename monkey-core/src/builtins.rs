// monkey-core - Builtin functions
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The host-provided builtin functions.
//!
//! Registration order is part of the bytecode contract: the compiler
//! resolves builtin names to indices into [`BUILTINS`], and the VM
//! dispatches `OpGetBuiltin` through the same table.

use monkey_parser::token::Span;

use crate::error::{EvalError, Result};
use crate::object::{Builtin, Object};

/// All builtins, in registration order. Indices are stable.
pub const BUILTINS: [Builtin; 8] = [
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
    Builtin {
        name: "toArray",
        func: builtin_to_array,
    },
    Builtin {
        name: "contains",
        func: builtin_contains,
    },
];

/// Look up a builtin by name.
pub fn lookup(name: &str) -> Option<Builtin> {
    BUILTINS.iter().find(|b| b.name == name).copied()
}

fn builtin_len(span: Span, args: Vec<Object>) -> Result<Object> {
    let mkerr = || {
        EvalError::new(
            span,
            "\"len\" builtin takes a single string or array argument",
        )
    };
    if args.len() != 1 {
        return Err(mkerr());
    }
    match &args[0] {
        Object::Str(value) => Ok(Object::Integer(value.len() as i64)),
        Object::Array(elems) => Ok(Object::Integer(elems.len() as i64)),
        _ => Err(mkerr()),
    }
}

fn builtin_puts(_span: Span, args: Vec<Object>) -> Result<Object> {
    for arg in &args {
        print!("{}", arg);
    }
    println!();
    Ok(Object::Null)
}

fn builtin_first(span: Span, args: Vec<Object>) -> Result<Object> {
    match args.as_slice() {
        [Object::Array(elems)] => match elems.front() {
            Some(first) => Ok(first.clone()),
            None => Err(EvalError::new(span, "Array is empty")),
        },
        _ => Err(EvalError::new(
            span,
            "\"first\" builtin takes a single array argument",
        )),
    }
}

fn builtin_last(span: Span, args: Vec<Object>) -> Result<Object> {
    match args.as_slice() {
        [Object::Array(elems)] => match elems.back() {
            Some(last) => Ok(last.clone()),
            None => Err(EvalError::new(span, "Array is empty")),
        },
        _ => Err(EvalError::new(
            span,
            "\"last\" builtin takes a single array argument",
        )),
    }
}

fn builtin_rest(span: Span, args: Vec<Object>) -> Result<Object> {
    match args.as_slice() {
        [Object::Array(elems)] => {
            if elems.is_empty() {
                return Err(EvalError::new(span, "Array is empty"));
            }
            Ok(Object::Array(elems.clone().split_at(1).1))
        }
        _ => Err(EvalError::new(
            span,
            "\"rest\" builtin takes a single array argument",
        )),
    }
}

fn builtin_push(span: Span, args: Vec<Object>) -> Result<Object> {
    match args.as_slice() {
        [Object::Array(elems), value] => {
            let mut appended = elems.clone();
            appended.push_back(value.clone());
            Ok(Object::Array(appended))
        }
        _ => Err(EvalError::new(
            span,
            "\"push\" builtin takes an array argument and a new object to push",
        )),
    }
}

/// Unwrap a var-args carrier into an array. Builtins receive their
/// arguments unexpanded, so `toArray(...)` sees exactly the carrier.
fn builtin_to_array(span: Span, args: Vec<Object>) -> Result<Object> {
    match args.as_slice() {
        [Object::VarArgs(elems)] => Ok(Object::Array(elems.clone())),
        _ => Err(EvalError::new(
            span,
            "\"toArray\" builtin takes a VarArg argument",
        )),
    }
}

fn builtin_contains(span: Span, args: Vec<Object>) -> Result<Object> {
    if args.len() != 2 {
        return Err(EvalError::new(
            span,
            "\"contains\" builtin takes a HashMap argument and a key",
        ));
    }
    let Object::Map(entries) = &args[0] else {
        return Err(EvalError::new(span, "First argument is not a hash map"));
    };
    let Some(key) = args[1].hash_key() else {
        return Err(EvalError::new(
            span,
            "Second argument is not a hashable object",
        ));
    };

    // Guard against digest collisions: the stored key must also match.
    let present = entries
        .get(&key)
        .is_some_and(|entry| entry.key.to_string() == args[1].to_string());
    Ok(Object::Boolean(present))
}

/// Look up a builtin by its registered index.
pub fn by_index(index: usize) -> Option<Builtin> {
    BUILTINS.get(index).copied()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use im::Vector;

    fn arr(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    fn call(builtin: &str, args: Vec<Object>) -> Result<Object> {
        (lookup(builtin).unwrap().func)(Span::default(), args)
    }

    #[test]
    fn test_registration_order() {
        let names: Vec<&str> = BUILTINS.iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec!["len", "puts", "first", "last", "rest", "push", "toArray", "contains"]
        );
    }

    #[test]
    fn test_len() {
        assert_eq!(call("len", vec![Object::str("hello")]), Ok(Object::Integer(5)));
        assert_eq!(call("len", vec![arr(&[1, 2, 3])]), Ok(Object::Integer(3)));
        assert_eq!(
            call("len", vec![Object::Integer(1)]).unwrap_err().message,
            "\"len\" builtin takes a single string or array argument"
        );
        assert!(call("len", vec![]).is_err());
    }

    #[test]
    fn test_first_last_rest() {
        assert_eq!(call("first", vec![arr(&[1, 2])]), Ok(Object::Integer(1)));
        assert_eq!(call("last", vec![arr(&[1, 2])]), Ok(Object::Integer(2)));
        assert_eq!(call("rest", vec![arr(&[1, 2, 3])]), Ok(arr(&[2, 3])));

        for builtin in ["first", "last", "rest"] {
            assert_eq!(
                call(builtin, vec![arr(&[])]).unwrap_err().message,
                "Array is empty"
            );
        }
    }

    #[test]
    fn test_push_does_not_mutate() {
        let original = arr(&[1]);
        let pushed = call("push", vec![original.clone(), Object::Integer(2)]).unwrap();
        assert_eq!(pushed, arr(&[1, 2]));
        assert_eq!(original, arr(&[1]));
    }

    #[test]
    fn test_to_array_requires_carrier() {
        let carrier = Object::VarArgs(Vector::from(vec![Object::Integer(1)]));
        assert_eq!(call("toArray", vec![carrier]), Ok(arr(&[1])));
        assert_eq!(
            call("toArray", vec![arr(&[1])]).unwrap_err().message,
            "\"toArray\" builtin takes a VarArg argument"
        );
    }

    #[test]
    fn test_contains() {
        use crate::object::MapEntry;
        use im::OrdMap;

        let key = Object::str("k");
        let mut entries = OrdMap::new();
        entries.insert(
            key.hash_key().unwrap(),
            MapEntry {
                key: key.clone(),
                value: Object::Integer(1),
            },
        );
        let map = Object::Map(entries);

        assert_eq!(
            call("contains", vec![map.clone(), key]),
            Ok(Object::Boolean(true))
        );
        assert_eq!(
            call("contains", vec![map.clone(), Object::str("other")]),
            Ok(Object::Boolean(false))
        );
        assert_eq!(
            call("contains", vec![map, Object::Null]).unwrap_err().message,
            "Second argument is not a hashable object"
        );
    }
}
