//! Loose Machine: a two-level hierarchical state machine
//!
//! Exactly one *action* is current at a time, and within that action exactly
//! one *state* is current. Hosts drive transitions by entering and leaving
//! actions or states; observers hear about every transition through the
//! action, the state, or a shared [`Director`].
//!
//! # Core Concepts
//!
//! - **Action**: a top-level, mutually exclusive mode owning its states
//! - **ActionState**: a sub-mode of one action; `persist` states survive the
//!   action being left and resume when it comes back
//! - **Director**: tracks the current action and fans out notifications
//! - **Handlers**: named callbacks attached to actions or states
//!
//! # Example
//!
//! ```rust
//! use loose_machine::{Action, ActionState, Director};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let director = Director::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = seen.clone();
//! director.on_enter_state(move |state| log.borrow_mut().push(state.id().to_string()));
//!
//! let inbox = Action::new("inbox");
//! inbox.set_director(&director);
//! inbox
//!     .add_state(&ActionState::new("list"))
//!     .unwrap()
//!     .add_state(&ActionState::persistent("compose"))
//!     .unwrap();
//!
//! inbox.enter().unwrap();
//! inbox.set_current_state("compose", false).unwrap();
//! inbox.leave().unwrap();
//!
//! assert_eq!(*seen.borrow(), vec!["list", "compose"]);
//! // The persistent compose state is still active and will resume.
//! assert!(inbox.get_state("compose").unwrap().is_active());
//! ```

pub mod builder;
pub mod core;
pub mod snapshot;

// Re-export commonly used types
pub use builder::{ActionBuilder, BuildError};
pub use crate::core::{Action, ActionState, Director, MachineError, Options, StateSelector};
pub use snapshot::{ActionSnapshot, StateSnapshot};
