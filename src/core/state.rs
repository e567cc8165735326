//! Action states: the sub-modes nested inside an action.
//!
//! A state must be attached to an action (see [`Action::add_state`]) before
//! it can be entered or left. Entering a state always makes sure its action
//! is active and points at it.

use super::action::{Action, ActionCore, StateSelector};
use super::error::{MachineError, Result};
use super::handler::{Handlers, Observer};
use super::options::{Options, DEFAULT_STATE_ID, PERSIST_OPTION};
use serde_json::{Map, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// Enter observer for states. The flag is `true` when the state was already
/// active, i.e. it is being resumed.
pub type EnterObserver = Rc<dyn Fn(&ActionState, bool)>;

pub(crate) struct StateCore {
    id: String,
    inner: RefCell<StateInner>,
}

struct StateInner {
    active: bool,
    options: Options,
    action: Option<Weak<ActionCore>>,
    handlers: Handlers<ActionState>,
    data: Map<String, Value>,
    enter_count: u64,
    leave_count: u64,
    on_enter: Option<EnterObserver>,
    on_leave: Option<Observer<ActionState>>,
}

/// A single sub-mode within one action.
///
/// Like [`Action`], this is a shared handle with identity equality.
///
/// # Example
///
/// ```rust
/// use loose_machine::{Action, ActionState};
///
/// let editor = Action::new("editor");
/// let draft = ActionState::persistent("draft");
/// editor.add_state(&draft).unwrap();
///
/// draft.on_enter(|state, is_resume| {
///     println!("{} entered (resume: {is_resume})", state.id());
/// });
///
/// editor.enter().unwrap();
/// editor.leave().unwrap();
/// // Persistent states survive their action being left.
/// assert!(draft.is_active());
/// ```
#[derive(Clone)]
pub struct ActionState {
    core: Rc<StateCore>,
}

impl ActionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_options(id, Options::new())
    }

    /// A state that stays active when its action is left.
    pub fn persistent(id: impl Into<String>) -> Self {
        Self::with_options(id, Options::new().with(PERSIST_OPTION, true))
    }

    /// Create a state with `options` laid over the defaults (`persist = false`).
    pub fn with_options(id: impl Into<String>, options: Options) -> Self {
        let defaults = Options::new().with(PERSIST_OPTION, false);
        let inner = StateInner {
            active: false,
            options: Options::extend(defaults, options),
            action: None,
            handlers: Handlers::new(),
            data: Map::new(),
            enter_count: 0,
            leave_count: 0,
            on_enter: None,
            on_leave: None,
        };
        Self {
            core: Rc::new(StateCore {
                id: id.into(),
                inner: RefCell::new(inner),
            }),
        }
    }

    fn inner(&self) -> Ref<'_, StateInner> {
        self.core.inner.borrow()
    }

    fn inner_mut(&self) -> RefMut<'_, StateInner> {
        self.core.inner.borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> Weak<StateCore> {
        Rc::downgrade(&self.core)
    }

    pub(crate) fn upgrade(weak: &Weak<StateCore>) -> Option<ActionState> {
        weak.upgrade().map(|core| ActionState { core })
    }

    pub(crate) fn is_same(&self, weak: &Weak<StateCore>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.core), weak.as_ptr())
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn is_active(&self) -> bool {
        self.inner().active
    }

    /// Whether the `persist` option is set.
    pub fn persists(&self) -> bool {
        self.inner().options.get_bool(PERSIST_OPTION).unwrap_or(false)
    }

    pub fn get_option(&self, key: &str) -> Option<Value> {
        self.inner().options.get(key).cloned()
    }

    pub fn set_option(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner_mut().options.set(key, value);
        self
    }

    /// Attach this state to `action`.
    ///
    /// A state belongs to one action for its whole life; attaching it again
    /// to the same action is allowed, attaching it to a different live action
    /// is not.
    pub fn set_action(&self, action: &Action) -> Result<()> {
        if let Some(owner) = self.action() {
            if owner != *action {
                return Err(MachineError::AlreadyAttached {
                    state: self.id().to_string(),
                    action: owner.id().to_string(),
                });
            }
        }
        self.inner_mut().action = Some(action.downgrade());
        Ok(())
    }

    /// The owning action, if attached and still alive.
    pub fn action(&self) -> Option<Action> {
        self.inner().action.as_ref().and_then(Action::upgrade)
    }

    fn owner(&self) -> Result<Action> {
        self.action().ok_or_else(|| MachineError::Detached {
            state: self.id().to_string(),
        })
    }

    /// Enter the state, making it its action's current state and activating
    /// the action if needed.
    ///
    /// Entering an already active state is legal: it is a resume, reported as
    /// `true` to the enter observer. Always returns `Ok(true)` once attached.
    ///
    /// When the action is inactive, entering it resumes this state from
    /// inside the call. The state's observers and the director's
    /// `on_enter_state` then fire twice (first with `is_resume = true`) and
    /// `enter_count` grows by two.
    pub fn enter(&self) -> Result<bool> {
        let action = self.owner()?;
        let is_resume = {
            let mut inner = self.inner_mut();
            let was_active = inner.active;
            inner.active = true;
            inner.enter_count += 1;
            was_active
        };

        action.set_current_state(self, true)?;
        if !action.is_active() {
            action.enter()?;
        }

        if let Some(director) = action.director() {
            director.enter_state(self);
        }
        let observer = self.inner().on_enter.clone();
        if let Some(observer) = observer {
            observer(self, is_resume);
        }
        Ok(true)
    }

    /// Leave the state. If it is still its action's current state, the action
    /// is left without a current state. Returns `Ok(false)` if not active.
    pub fn leave(&self) -> Result<bool> {
        let action = self.owner()?;
        {
            let mut inner = self.inner_mut();
            if !inner.active {
                return Ok(false);
            }
            inner.active = false;
            inner.leave_count += 1;
        }

        if action.current_state_pointer().as_ref() == Some(self) {
            action.set_current_state(StateSelector::None, true)?;
        }

        let observer = self.inner().on_leave.clone();
        if let Some(observer) = observer {
            observer(self);
        }
        if let Some(director) = action.director() {
            director.leave_state(self);
        }
        Ok(true)
    }

    pub fn on_enter<F>(&self, observer: F) -> &Self
    where
        F: Fn(&ActionState, bool) + 'static,
    {
        self.inner_mut().on_enter = Some(Rc::new(observer));
        self
    }

    pub fn on_leave<F>(&self, observer: F) -> &Self
    where
        F: Fn(&ActionState) + 'static,
    {
        self.inner_mut().on_leave = Some(Rc::new(observer));
        self
    }

    pub fn add_handler<F>(&self, id: &str, handler: F) -> Result<&Self>
    where
        F: Fn(&ActionState, Option<Value>) -> Value + 'static,
    {
        self.inner_mut().handlers.insert(id, Rc::new(handler))?;
        Ok(self)
    }

    pub fn has_handler(&self, id: &str) -> bool {
        self.inner().handlers.contains(id)
    }

    /// Run a handler registered on this state.
    ///
    /// With `as_state` the handler is bound to that state instead of this one,
    /// so handler logic can be shared between states. Returns `None` if no
    /// handler is registered under `id`.
    pub fn run_handler(
        &self,
        id: &str,
        parameter: Option<Value>,
        as_state: Option<&ActionState>,
    ) -> Option<Value> {
        let handler = self.inner().handlers.get(id)?;
        Some(handler(as_state.unwrap_or(self), parameter))
    }

    /// Run this state's handler `id` bound to `state`.
    pub fn run_handler_as(
        &self,
        state: &ActionState,
        id: &str,
        parameter: Option<Value>,
    ) -> Option<Value> {
        self.run_handler(id, parameter, Some(state))
    }

    /// Like [`ActionState::run_handler`], but only while this state is active.
    pub fn run_handler_if_active(&self, id: &str, parameter: Option<Value>) -> Option<Value> {
        if !self.is_active() {
            return None;
        }
        self.run_handler(id, parameter, None)
    }

    pub fn set_data(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner_mut().data.insert(key.into(), value.into());
        self
    }

    pub fn get_data(&self, key: &str) -> Option<Value> {
        self.inner().data.get(key).cloned()
    }

    pub fn data(&self) -> Map<String, Value> {
        self.inner().data.clone()
    }

    pub fn enter_count(&self) -> u64 {
        self.inner().enter_count
    }

    pub fn leave_count(&self) -> u64 {
        self.inner().leave_count
    }
}

impl Default for ActionState {
    /// A non-persistent state with the id `"default"`.
    fn default() -> Self {
        Self::new(DEFAULT_STATE_ID)
    }
}

impl PartialEq for ActionState {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for ActionState {}

impl fmt::Debug for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner();
        f.debug_struct("ActionState")
            .field("id", &self.core.id)
            .field("active", &inner.active)
            .field("persist", &inner.options.get_bool(PERSIST_OPTION))
            .field("enter_count", &inner.enter_count)
            .field("leave_count", &inner.leave_count)
            .finish()
    }
}
