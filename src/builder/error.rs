//! Build errors for the action builder.

use crate::core::MachineError;
use thiserror::Error;

/// Errors that can occur when building an action.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Action id is empty. Pass a non-empty id to ActionBuilder::new")]
    EmptyId,

    #[error("State '{id}' was added more than once")]
    DuplicateState { id: String },

    #[error("Default state '{id}' is not one of the added states")]
    UnknownDefaultState { id: String },

    #[error("Failed to attach state: {0}")]
    Attach(#[from] MachineError),
}
