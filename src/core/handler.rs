//! Named handlers and observer slots shared by actions and states.

use super::error::{MachineError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// A named, caller-registered callback bound to an entity of type `T`.
///
/// The second argument is the optional parameter; `None` means the caller
/// supplied no parameter.
pub type Handler<T> = Rc<dyn Fn(&T, Option<Value>) -> Value>;

/// Enter/leave observer receiving the entity that moved.
pub type Observer<T> = Rc<dyn Fn(&T)>;

/// Registry of named handlers.
///
/// Lookups hand out a clone of the `Rc` so the caller can release any
/// `RefCell` borrow before invoking it.
pub(crate) struct Handlers<T> {
    entries: HashMap<String, Handler<T>>,
}

impl<T> Handlers<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register `handler` under `id`, replacing any previous one.
    pub(crate) fn insert(&mut self, id: &str, handler: Handler<T>) -> Result<()> {
        if id.is_empty() {
            return Err(MachineError::InvalidHandlerId);
        }
        self.entries.insert(id.to_string(), handler);
        Ok(())
    }

    pub(crate) fn get(&self, id: &str) -> Option<Handler<T>> {
        self.entries.get(id).cloned()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_rejects_empty_id() {
        let mut handlers: Handlers<String> = Handlers::new();
        let result = handlers.insert("", Rc::new(|_: &String, _: Option<Value>| Value::Null));
        assert_eq!(result, Err(MachineError::InvalidHandlerId));
        assert!(!handlers.contains(""));
    }

    #[test]
    fn last_registration_wins() {
        let mut handlers: Handlers<String> = Handlers::new();
        handlers
            .insert("greet", Rc::new(|_: &String, _: Option<Value>| json!("first")))
            .unwrap();
        handlers
            .insert("greet", Rc::new(|owner: &String, _: Option<Value>| json!(format!("hi {owner}"))))
            .unwrap();

        let handler = handlers.get("greet").unwrap();
        assert_eq!(handler(&"bob".to_string(), None), json!("hi bob"));
    }

    #[test]
    fn missing_handler_is_none() {
        let handlers: Handlers<String> = Handlers::default();
        assert!(handlers.get("nope").is_none());
    }
}
