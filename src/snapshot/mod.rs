//! Read-only snapshots of an action and its states.
//!
//! A snapshot captures counters, activity flags, and data stores at one
//! point in time so hosts can log or inspect the machine. Snapshots are never
//! fed back into the engine.

use crate::core::{Action, ActionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Point-in-time view of one state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub id: String,
    pub active: bool,
    pub persist: bool,
    pub enter_count: u64,
    pub leave_count: u64,
    pub data: Map<String, Value>,
}

impl StateSnapshot {
    pub fn capture(state: &ActionState) -> Self {
        Self {
            id: state.id().to_string(),
            active: state.is_active(),
            persist: state.persists(),
            enter_count: state.enter_count(),
            leave_count: state.leave_count(),
            data: state.data(),
        }
    }
}

/// Point-in-time view of an action and all of its states.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionSnapshot {
    /// Snapshot format version
    pub version: u32,

    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub active: bool,

    /// Explicitly selected state, without default fallback
    pub current_state: Option<String>,

    /// What the default state resolves to, if the action has any state
    pub default_state: Option<String>,

    pub enter_count: u64,
    pub leave_count: u64,

    /// States in insertion order
    pub states: Vec<StateSnapshot>,

    pub data: Map<String, Value>,
}

impl ActionSnapshot {
    pub fn capture(action: &Action) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: action.id().to_string(),
            taken_at: Utc::now(),
            active: action.is_active(),
            current_state: action
                .current_state_pointer()
                .map(|state| state.id().to_string()),
            default_state: action
                .get_default_state()
                .ok()
                .map(|state| state.id().to_string()),
            enter_count: action.enter_count(),
            leave_count: action.leave_count(),
            states: action.states().iter().map(StateSnapshot::capture).collect(),
            data: action.data(),
        }
    }

    pub fn state(&self, id: &str) -> Option<&StateSnapshot> {
        self.states.iter().find(|state| state.id == id)
    }

    /// Ids of the states that were active, including persisted ones whose
    /// action has been left.
    pub fn active_states(&self) -> Vec<&str> {
        self.states
            .iter()
            .filter(|state| state.active)
            .map(|state| state.id.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }
}

impl Action {
    /// Capture an [`ActionSnapshot`] of this action.
    pub fn snapshot(&self) -> ActionSnapshot {
        ActionSnapshot::capture(self)
    }
}
