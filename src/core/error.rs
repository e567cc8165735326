//! Errors raised by the transition engine.

use thiserror::Error;

/// Errors that can occur while driving actions and their states.
///
/// Idempotent calls (entering an active entity, leaving an inactive one,
/// selecting the state that is already current) are not errors; they return
/// `Ok(false)` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("Action '{action}' has no state '{state}'")]
    StateNotFound { action: String, state: String },

    #[error("State '{state}' does not belong to action '{action}'")]
    ForeignState { action: String, state: String },

    #[error("Unable to determine the default state of action '{action}': no states registered")]
    NoStateAvailable { action: String },

    #[error("State '{state}' is not attached to an action. Call Action::add_state first")]
    Detached { state: String },

    #[error("State '{state}' is already attached to action '{action}'")]
    AlreadyAttached { state: String, action: String },

    #[error("Invalid id provided: ids must not be empty")]
    InvalidId,

    #[error("Invalid or empty handler id")]
    InvalidHandlerId,
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, MachineError>;
