use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::value::Value;

/// One lexical scope of a running program.
///
/// Scopes form a chain through `parent`; closures keep the scope they were
/// declared in alive by holding an `Rc` to it.
#[derive(Debug, Default)]
pub struct Scope {
    variables: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new_global() -> Rc<Scope> {
        Rc::new(Scope::default())
    }

    pub fn child(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            variables: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn declare(&self, name: String, value: Value) {
        self.variables.borrow_mut().insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.variables.borrow().get(name) {
            return Some(value.clone());
        }

        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Overwrites the nearest binding of `name`. Returns `false` when no
    /// enclosing scope declares it.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.variables.borrow_mut().get_mut(name) {
            *slot = value;
            return true;
        }

        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }
}
