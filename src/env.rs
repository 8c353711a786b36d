//! Lexically scoped variable bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::eval::Value;

/// One frame of the environment chain.
///
/// Frames form a tree rooted at the globals; a block or call frame holds an
/// `Rc` to its enclosing frame. The evaluator threads the current frame
/// down by parameter, so leaving a scope on any path (fall-through, runtime
/// error, `return`) restores the enclosing frame.
#[derive(Debug)]
pub struct Environment {
    parent: Option<Rc<Environment>>,
    bindings: RefCell<HashMap<String, Value>>,
}

impl Environment {
    pub fn global() -> Rc<Environment> {
        Rc::new(Environment {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Bind `name` in this frame, overwriting any existing binding.
    /// Redeclaration is legal.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    /// Look `name` up in this frame, then its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.borrow().get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Overwrite the nearest binding of `name`; false if no frame in the
    /// chain defines it.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut bindings = self.bindings.borrow_mut();
            if bindings.contains_key(name) {
                bindings.insert(name.to_string(), value);
                return true;
            }
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}
