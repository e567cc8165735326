//! Builder for assembling an action with its states.

use crate::builder::error::BuildError;
use crate::core::{Action, ActionState, Director, Observer, Options, DEFAULT_STATE_OPTION};
use serde_json::Value;
use std::collections::HashSet;
use std::rc::Rc;

/// Builder for constructing actions with a fluent API.
///
/// # Example
///
/// ```rust
/// use loose_machine::{ActionBuilder, ActionState, Director};
///
/// let director = Director::new();
/// let browse = ActionBuilder::new("browse")
///     .default_state("list")
///     .state(ActionState::new("list"))
///     .state(ActionState::persistent("detail"))
///     .director(&director)
///     .build()
///     .unwrap();
///
/// browse.enter().unwrap();
/// assert!(browse.is_current_state("list"));
/// assert_eq!(director.current_action(), Some(browse));
/// ```
pub struct ActionBuilder {
    id: String,
    options: Options,
    default_state: Option<String>,
    states: Vec<ActionState>,
    director: Option<Director>,
    on_enter: Option<Observer<Action>>,
    on_leave: Option<Observer<Action>>,
}

impl ActionBuilder {
    /// Create a new builder for the action `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            options: Options::new(),
            default_state: None,
            states: Vec::new(),
            director: None,
            on_enter: None,
            on_leave: None,
        }
    }

    /// Set the id of the state used when none is current (optional).
    pub fn default_state(mut self, id: impl Into<String>) -> Self {
        self.default_state = Some(id.into());
        self
    }

    /// Store an extra option on the action.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.set(key, value);
        self
    }

    /// Add a state. The first state added is the fallback default.
    pub fn state(mut self, state: ActionState) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = ActionState>) -> Self {
        self.states.extend(states);
        self
    }

    /// Report transitions to `director` (optional).
    pub fn director(mut self, director: &Director) -> Self {
        self.director = Some(director.clone());
        self
    }

    pub fn on_enter<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Action) + 'static,
    {
        self.on_enter = Some(Rc::new(observer));
        self
    }

    pub fn on_leave<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Action) + 'static,
    {
        self.on_leave = Some(Rc::new(observer));
        self
    }

    /// Build the action.
    /// Returns an error if the id is empty, a state id repeats, or the default
    /// state names none of the added states.
    pub fn build(self) -> Result<Action, BuildError> {
        if self.id.is_empty() {
            return Err(BuildError::EmptyId);
        }

        let mut seen = HashSet::new();
        for state in &self.states {
            if !seen.insert(state.id()) {
                return Err(BuildError::DuplicateState {
                    id: state.id().to_string(),
                });
            }
        }

        let mut options = self.options;
        if let Some(default) = self.default_state {
            if !self.states.is_empty() && !seen.contains(default.as_str()) {
                return Err(BuildError::UnknownDefaultState { id: default });
            }
            options.set(DEFAULT_STATE_OPTION, default);
        }

        let action = Action::with_options(self.id, options);
        for state in &self.states {
            action.add_state(state)?;
        }
        if let Some(director) = &self.director {
            action.set_director(director);
        }
        if let Some(observer) = self.on_enter {
            action.on_enter(move |a| observer(a));
        }
        if let Some(observer) = self.on_leave {
            action.on_leave(move |a| observer(a));
        }
        Ok(action)
    }
}
