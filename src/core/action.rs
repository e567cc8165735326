//! Actions: the top level of the machine.
//!
//! An action owns a set of mutually exclusive states and, while active, keeps
//! exactly one of them current.

use super::director::{Director, DirectorCore};
use super::error::{MachineError, Result};
use super::handler::{Handlers, Observer};
use super::options::{Options, DEFAULT_STATE_ID, DEFAULT_STATE_OPTION};
use super::state::{ActionState, StateCore};
use serde_json::{Map, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) struct ActionCore {
    id: String,
    inner: RefCell<ActionInner>,
}

struct ActionInner {
    active: bool,
    current_state: Option<Weak<StateCore>>,
    /// Insertion ordered; the first entry is the fallback default state.
    states: Vec<ActionState>,
    options: Options,
    director: Option<Weak<RefCell<DirectorCore>>>,
    handlers: Handlers<Action>,
    data: Map<String, Value>,
    enter_count: u64,
    leave_count: u64,
    on_enter: Option<Observer<Action>>,
    on_leave: Option<Observer<Action>>,
}

/// Names a state of an action, either by id or by handle.
///
/// `StateSelector::None` clears the current state when passed to
/// [`Action::set_current_state`].
#[derive(Clone, Copy, Debug)]
pub enum StateSelector<'a> {
    None,
    Id(&'a str),
    State(&'a ActionState),
}

impl<'a> From<&'a str> for StateSelector<'a> {
    fn from(id: &'a str) -> Self {
        StateSelector::Id(id)
    }
}

impl<'a> From<&'a String> for StateSelector<'a> {
    fn from(id: &'a String) -> Self {
        StateSelector::Id(id.as_str())
    }
}

impl<'a> From<&'a ActionState> for StateSelector<'a> {
    fn from(state: &'a ActionState) -> Self {
        StateSelector::State(state)
    }
}

impl<'a> From<Option<&'a ActionState>> for StateSelector<'a> {
    fn from(state: Option<&'a ActionState>) -> Self {
        state.map_or(StateSelector::None, StateSelector::State)
    }
}

/// A top-level, mutually exclusive mode of operation.
///
/// `Action` is a shared handle: clones refer to the same action and compare
/// equal. Its states are owned by the action; states only point back weakly.
///
/// # Example
///
/// ```rust
/// use loose_machine::{Action, ActionState};
///
/// let browse = Action::new("browse");
/// let list = ActionState::new("list");
/// let detail = ActionState::new("detail");
/// browse.add_state(&list).unwrap().add_state(&detail).unwrap();
///
/// browse.enter().unwrap();
/// assert!(list.is_active());
///
/// browse.set_current_state("detail", false).unwrap();
/// assert!(!list.is_active());
/// assert!(detail.is_active());
/// ```
#[derive(Clone)]
pub struct Action {
    core: Rc<ActionCore>,
}

impl Action {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_options(id, Options::new())
    }

    /// Create an action with `options` laid over the defaults
    /// (`defaultState = "default"`).
    pub fn with_options(id: impl Into<String>, options: Options) -> Self {
        let defaults = Options::new().with(DEFAULT_STATE_OPTION, DEFAULT_STATE_ID);
        let inner = ActionInner {
            active: false,
            current_state: None,
            states: Vec::new(),
            options: Options::extend(defaults, options),
            director: None,
            handlers: Handlers::new(),
            data: Map::new(),
            enter_count: 0,
            leave_count: 0,
            on_enter: None,
            on_leave: None,
        };
        Self {
            core: Rc::new(ActionCore {
                id: id.into(),
                inner: RefCell::new(inner),
            }),
        }
    }

    fn inner(&self) -> Ref<'_, ActionInner> {
        self.core.inner.borrow()
    }

    fn inner_mut(&self) -> RefMut<'_, ActionInner> {
        self.core.inner.borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> Weak<ActionCore> {
        Rc::downgrade(&self.core)
    }

    pub(crate) fn upgrade(weak: &Weak<ActionCore>) -> Option<Action> {
        weak.upgrade().map(|core| Action { core })
    }

    pub(crate) fn is_same(&self, weak: &Weak<ActionCore>) -> bool {
        std::ptr::eq(Rc::as_ptr(&self.core), weak.as_ptr())
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn is_active(&self) -> bool {
        self.inner().active
    }

    pub fn get_option(&self, key: &str) -> Option<Value> {
        self.inner().options.get(key).cloned()
    }

    pub fn set_option(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner_mut().options.set(key, value);
        self
    }

    /// Id of the state used when nothing is current, read from the
    /// `defaultState` option.
    pub fn default_state_id(&self) -> String {
        self.inner()
            .options
            .get_str(DEFAULT_STATE_OPTION)
            .unwrap_or(DEFAULT_STATE_ID)
            .to_string()
    }

    /// The state registered under the default state id, or else the first
    /// state added.
    pub fn get_default_state(&self) -> Result<ActionState> {
        let default_id = self.default_state_id();
        let inner = self.inner();
        inner
            .states
            .iter()
            .find(|state| state.id() == default_id)
            .or_else(|| inner.states.first())
            .cloned()
            .ok_or_else(|| MachineError::NoStateAvailable {
                action: self.id().to_string(),
            })
    }

    /// The explicitly selected state, falling back to the default state.
    pub fn get_current_state(&self) -> Result<ActionState> {
        match self.current_state_pointer() {
            Some(state) => Ok(state),
            None => self.get_default_state(),
        }
    }

    /// The explicitly selected state only, without default fallback.
    pub(crate) fn current_state_pointer(&self) -> Option<ActionState> {
        self.inner()
            .current_state
            .as_ref()
            .and_then(ActionState::upgrade)
    }

    fn resolve_current(&self) -> Option<ActionState> {
        self.get_current_state().ok()
    }

    /// Whether `state` is what [`Action::get_current_state`] resolves to.
    /// Unknown ids and foreign states are never current.
    pub fn is_current_state<'a>(&self, state: impl Into<StateSelector<'a>>) -> bool {
        match (self.resolve(state.into()), self.resolve_current()) {
            (Ok(Some(wanted)), Some(current)) => wanted == current,
            _ => false,
        }
    }

    fn resolve(&self, selector: StateSelector<'_>) -> Result<Option<ActionState>> {
        match selector {
            StateSelector::None => Ok(None),
            StateSelector::Id(id) => {
                self.get_state(id)
                    .map(Some)
                    .ok_or_else(|| MachineError::StateNotFound {
                        action: self.id().to_string(),
                        state: id.to_string(),
                    })
            }
            StateSelector::State(state) => match state.action() {
                Some(owner) if owner == *self => Ok(Some(state.clone())),
                Some(_) => Err(MachineError::ForeignState {
                    action: self.id().to_string(),
                    state: state.id().to_string(),
                }),
                None => Err(MachineError::Detached {
                    state: state.id().to_string(),
                }),
            },
        }
    }

    /// Switch the current state.
    ///
    /// The previous current state is always left first. Unless
    /// `suppress_enter` is set, the new state is then entered. Selecting the
    /// state that is already current returns `Ok(false)` and does nothing.
    ///
    /// States call this themselves with `suppress_enter = true` while
    /// entering or leaving, to move the pointer without re-entering.
    pub fn set_current_state<'a>(
        &self,
        state: impl Into<StateSelector<'a>>,
        suppress_enter: bool,
    ) -> Result<bool> {
        let target = self.resolve(state.into())?;
        let previous = self.current_state_pointer();
        if previous == target {
            return Ok(false);
        }

        if let Some(previous) = previous {
            previous.leave()?;
        }
        self.inner_mut().current_state = target.as_ref().map(ActionState::downgrade);

        if let Some(target) = target {
            if !suppress_enter {
                target.enter()?;
            }
        }
        Ok(true)
    }

    /// Activate the action and its current state.
    ///
    /// The director (if any) hears about it before the local observer does.
    /// Returns `Ok(false)` if the action is already active.
    pub fn enter(&self) -> Result<bool> {
        {
            let mut inner = self.inner_mut();
            if inner.active {
                return Ok(false);
            }
            inner.active = true;
            inner.enter_count += 1;
        }

        if let Some(director) = self.director() {
            director.enter(self)?;
        }
        let observer = self.inner().on_enter.clone();
        if let Some(observer) = observer {
            observer(self);
        }

        if let Some(state) = self.resolve_current() {
            state.enter()?;
        }
        Ok(true)
    }

    /// Deactivate the action.
    ///
    /// The current state is left too unless it is persistent, in which case
    /// it stays active and resumes when entered again. Returns `Ok(false)` if
    /// the action is not active.
    pub fn leave(&self) -> Result<bool> {
        {
            let mut inner = self.inner_mut();
            if !inner.active {
                return Ok(false);
            }
            inner.active = false;
            inner.leave_count += 1;
        }

        if let Some(state) = self.resolve_current() {
            if !state.persists() {
                state.leave()?;
            }
        }

        let observer = self.inner().on_leave.clone();
        if let Some(observer) = observer {
            observer(self);
        }
        if let Some(director) = self.director() {
            director.leave(self);
        }
        Ok(true)
    }

    pub fn on_enter<F>(&self, observer: F) -> &Self
    where
        F: Fn(&Action) + 'static,
    {
        self.inner_mut().on_enter = Some(Rc::new(observer));
        self
    }

    pub fn on_leave<F>(&self, observer: F) -> &Self
    where
        F: Fn(&Action) + 'static,
    {
        self.inner_mut().on_leave = Some(Rc::new(observer));
        self
    }

    /// Attach `state` to this action, replacing any state with the same id.
    ///
    /// If the replaced state was the current one, the action is left without
    /// a current state and resolution falls back to the default state.
    pub fn add_state(&self, state: &ActionState) -> Result<&Self> {
        if self.id().is_empty() || state.id().is_empty() {
            return Err(MachineError::InvalidId);
        }
        state.set_action(self)?;

        let mut inner = self.inner_mut();
        match inner.states.iter().position(|s| s.id() == state.id()) {
            Some(index) => {
                let replaced = std::mem::replace(&mut inner.states[index], state.clone());
                let was_current = inner
                    .current_state
                    .as_ref()
                    .is_some_and(|current| replaced.is_same(current));
                if was_current && replaced != *state {
                    inner.current_state = None;
                }
            }
            None => inner.states.push(state.clone()),
        }
        Ok(self)
    }

    pub fn get_state(&self, id: &str) -> Option<ActionState> {
        self.inner()
            .states
            .iter()
            .find(|state| state.id() == id)
            .cloned()
    }

    /// All states in the order they were added.
    pub fn states(&self) -> Vec<ActionState> {
        self.inner().states.clone()
    }

    pub fn set_director(&self, director: &Director) -> &Self {
        self.inner_mut().director = Some(director.downgrade());
        self
    }

    pub fn director(&self) -> Option<Director> {
        self.inner().director.as_ref().and_then(Director::upgrade)
    }

    /// Register a named handler. It is called with this action and the
    /// optional parameter.
    pub fn add_handler<F>(&self, id: &str, handler: F) -> Result<&Self>
    where
        F: Fn(&Action, Option<Value>) -> Value + 'static,
    {
        self.inner_mut().handlers.insert(id, Rc::new(handler))?;
        Ok(self)
    }

    pub fn has_handler(&self, id: &str) -> bool {
        self.inner().handlers.contains(id)
    }

    /// Run a handler. Returns `None` if no handler is registered under `id`.
    pub fn run_handler(&self, id: &str, parameter: Option<Value>) -> Option<Value> {
        let handler = self.inner().handlers.get(id)?;
        Some(handler(self, parameter))
    }

    /// Like [`Action::run_handler`], but only while the action is active.
    pub fn run_handler_if_active(&self, id: &str, parameter: Option<Value>) -> Option<Value> {
        if !self.is_active() {
            return None;
        }
        self.run_handler(id, parameter)
    }

    pub fn set_data(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner_mut().data.insert(key.into(), value.into());
        self
    }

    pub fn get_data(&self, key: &str) -> Option<Value> {
        self.inner().data.get(key).cloned()
    }

    /// The whole data store.
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

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Action {}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner();
        let states: Vec<&str> = inner.states.iter().map(ActionState::id).collect();
        f.debug_struct("Action")
            .field("id", &self.core.id)
            .field("active", &inner.active)
            .field("states", &states)
            .field("enter_count", &inner.enter_count)
            .field("leave_count", &inner.leave_count)
            .finish()
    }
}
