//! The transition engine.
//!
//! This module contains the three entities of the machine:
//! - [`Director`]: tracks the current action and fans out notifications
//! - [`Action`]: a top-level mode owning mutually exclusive states
//! - [`ActionState`]: a sub-mode within one action
//!
//! Everything here is synchronous and single-threaded. Every `enter`/`leave`
//! completes its whole cascade of notifications before returning; the
//! `active` flags are what stop the cascade from recursing forever.

mod action;
mod director;
mod error;
mod handler;
mod options;
mod state;

pub use action::{Action, StateSelector};
pub use director::Director;
pub use error::{MachineError, Result};
pub use handler::{Handler, Observer};
pub use options::{Options, DEFAULT_STATE_ID, DEFAULT_STATE_OPTION, PERSIST_OPTION};
pub use state::{ActionState, EnterObserver};
