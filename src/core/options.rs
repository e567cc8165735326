//! Free-form entity options with a shallow "defaults overlaid by overrides" merge.
//!
//! Only a couple of keys are interpreted by the engine (see the constants
//! below). Any other key is stored untouched and can be read back through
//! `get_option` on the owning entity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Option key naming the state an action falls back to when none is current.
pub const DEFAULT_STATE_OPTION: &str = "defaultState";

/// Option key that keeps a state active when its action is left.
pub const PERSIST_OPTION: &str = "persist";

/// Id used for the default state when nothing else is configured.
pub const DEFAULT_STATE_ID: &str = "default";

/// Key/value options attached to an action or a state.
///
/// # Example
///
/// ```rust
/// use loose_machine::Options;
///
/// let defaults = Options::new().with("persist", false).with("label", "List");
/// let merged = Options::extend(defaults, Options::new().with("persist", true));
///
/// assert_eq!(merged.get_bool("persist"), Some(true));
/// assert_eq!(merged.get_str("label"), Some("List"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    values: Map<String, Value>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow merge: every key of `defaults`, then every key of `overrides`
    /// replacing values with the same key.
    pub fn extend(defaults: Options, overrides: Options) -> Options {
        let mut values = defaults.values;
        for (key, value) in overrides.values {
            values.insert(key, value);
        }
        Options { values }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Read a flag. JSON `null` counts as unset.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for Options {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}
