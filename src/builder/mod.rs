//! Builder API for ergonomic action construction.
//!
//! The engine entities can be wired up by hand with `add_state`,
//! `set_director` and friends; the builder does the same in one fluent chain
//! and validates the result before handing the action out.

pub mod action;
pub mod error;

pub use action::ActionBuilder;
pub use error::BuildError;

use crate::core::{Action, ActionState, Director};

/// Build an action from plain state ids, all non-persistent, reporting to
/// `director`.
///
/// # Example
///
/// ```
/// use loose_machine::builder::simple_action;
/// use loose_machine::Director;
///
/// let director = Director::new();
/// let settings = simple_action("settings", &["general", "advanced"], &director).unwrap();
///
/// settings.enter().unwrap();
/// assert!(settings.is_current_state("general"));
/// ```
pub fn simple_action(
    id: &str,
    state_ids: &[&str],
    director: &Director,
) -> Result<Action, BuildError> {
    ActionBuilder::new(id)
        .states(state_ids.iter().map(|state_id| ActionState::new(*state_id)))
        .director(director)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_action_builds() {
        let director = Director::new();
        let action = simple_action("settings", &["general", "advanced"], &director).unwrap();

        assert_eq!(action.id(), "settings");
        assert_eq!(action.get_default_state().unwrap().id(), "general");
        assert!(action.states().iter().all(|s| !s.persists()));
    }

    #[test]
    fn simple_actions_share_director() {
        let director = Director::new();
        let first = simple_action("first", &["a"], &director).unwrap();
        let second = simple_action("second", &["b"], &director).unwrap();

        first.enter().unwrap();
        second.enter().unwrap();

        assert!(!first.is_active());
        assert_eq!(director.current_action(), Some(second));
    }

    #[test]
    fn simple_action_rejects_repeated_ids() {
        let director = Director::new();
        let result = simple_action("dup", &["a", "a"], &director);
        assert!(matches!(result, Err(BuildError::DuplicateState { .. })));
    }
}
