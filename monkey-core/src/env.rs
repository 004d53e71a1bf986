// monkey-core - Environment for lexical scoping
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Environment chains for the tree-walking evaluator.
//!
//! Each function call gets a frame mapping identifiers to values, with a
//! parent pointer to the enclosing scope and an optional var-args slot for
//! variadic calls. Lookup walks outward. [`Env::copy`] freezes the lexical
//! view at function-definition time, which is how closures capture.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use im::Vector;

use crate::object::Object;

/// A lexical environment frame.
#[derive(Debug, Clone)]
pub struct Env {
    inner: Rc<RefCell<EnvInner>>,
}

#[derive(Debug, Default)]
struct EnvInner {
    bindings: HashMap<String, Object>,
    parent: Option<Env>,
    /// The var-args carrier of the current call, when the called function
    /// is variadic. Not inherited from parents and not copied.
    var_args: Option<Vector<Object>>,
}

impl Env {
    /// Create a new root environment.
    pub fn new() -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner::default())),
        }
    }

    /// Create a child environment with this environment as parent.
    #[must_use]
    pub fn enclosed(&self) -> Self {
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                parent: Some(self.clone()),
                ..EnvInner::default()
            })),
        }
    }

    /// Define a binding in this frame, shadowing any outer binding.
    pub fn define(&self, name: impl Into<String>, value: Object) {
        self.inner.borrow_mut().bindings.insert(name.into(), value);
    }

    /// Look up a name in this frame or the parent chain.
    /// Iterative traversal, so deep chains cannot overflow the stack.
    pub fn lookup(&self, name: &str) -> Option<Object> {
        let mut current = self.clone();
        loop {
            let inner = current.inner.borrow();
            if let Some(value) = inner.bindings.get(name) {
                return Some(value.clone());
            }
            let parent = inner.parent.clone();
            drop(inner);
            current = parent?;
        }
    }

    /// Install the var-args carrier for the current call frame.
    pub fn set_var_args(&self, elems: Vector<Object>) {
        self.inner.borrow_mut().var_args = Some(elems);
    }

    /// The var-args carrier of this frame, if the enclosing call was
    /// variadic. Deliberately does not walk the parent chain.
    pub fn var_args(&self) -> Option<Vector<Object>> {
        self.inner.borrow().var_args.clone()
    }

    /// Snapshot this frame: a fresh environment with the same parent and a
    /// copy of the current bindings. Later definitions in the original are
    /// invisible to the copy, freezing the lexical view for closures.
    #[must_use]
    pub fn copy(&self) -> Env {
        let inner = self.inner.borrow();
        Env {
            inner: Rc::new(RefCell::new(EnvInner {
                bindings: inner.bindings.clone(),
                parent: inner.parent.clone(),
                var_args: None,
            })),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
