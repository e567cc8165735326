//! The director tracks the single current action and fans out transition
//! notifications to whoever registered for them.

use super::action::{Action, ActionCore};
use super::error::Result;
use super::handler::Observer;
use super::state::ActionState;
use chrono::Utc;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Default)]
pub(crate) struct DirectorCore {
    current: Option<Weak<ActionCore>>,
    debug: bool,
    on_enter: Option<Observer<Action>>,
    on_leave: Option<Observer<Action>>,
    on_enter_state: Option<Observer<ActionState>>,
    on_leave_state: Option<Observer<ActionState>>,
}

/// Coordinator that knows which action is current and notifies observers of
/// every action and state transition routed through it.
///
/// Actions report to the director they were given with
/// [`Action::set_director`]; the director holds only a weak reference to the
/// current action, so the host application stays responsible for keeping
/// actions alive.
///
/// # Example
///
/// ```rust
/// use loose_machine::{Action, ActionState, Director};
///
/// let director = Director::new();
/// let inbox = Action::new("inbox");
/// inbox.add_state(&ActionState::new("list")).unwrap();
/// inbox.set_director(&director);
///
/// inbox.enter().unwrap();
/// assert_eq!(director.current_action(), Some(inbox.clone()));
///
/// inbox.leave().unwrap();
/// assert!(director.current_action().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Director {
    core: Rc<RefCell<DirectorCore>>,
}

impl Director {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<DirectorCore>> {
        Rc::downgrade(&self.core)
    }

    pub(crate) fn upgrade(weak: &Weak<RefCell<DirectorCore>>) -> Option<Director> {
        weak.upgrade().map(|core| Director { core })
    }

    /// The action most recently entered and not yet left, if it is still alive.
    pub fn current_action(&self) -> Option<Action> {
        self.core
            .borrow()
            .current
            .as_ref()
            .and_then(Action::upgrade)
    }

    /// Leave whatever action is current. Returns `Ok(false)` when there is none.
    pub fn leave_current_action(&self) -> Result<bool> {
        match self.current_action() {
            Some(action) => action.leave(),
            None => Ok(false),
        }
    }

    /// Make `action` the current action.
    ///
    /// The previous current action is left first. Entering the action that is
    /// already current is a no-op and returns `Ok(false)`.
    pub fn enter(&self, action: &Action) -> Result<bool> {
        self.log("action enter", action.id(), None);
        let previous = self.current_action();
        if previous.as_ref() == Some(action) {
            return Ok(false);
        }

        if let Some(previous) = previous {
            previous.leave()?;
            // The previous action may not route through this director, or may
            // already be inactive; either way it must not stay current.
            if self.current_action().as_ref() == Some(&previous) {
                self.leave(&previous);
            }
        }

        self.core.borrow_mut().current = Some(action.downgrade());
        let observer = self.core.borrow().on_enter.clone();
        if let Some(observer) = observer {
            observer(action);
        }
        Ok(true)
    }

    /// Record that `action` was left and notify the leave observer.
    ///
    /// The current action is cleared only when it is `action`, so a stale
    /// leave from some other action cannot erase the real current one.
    pub fn leave(&self, action: &Action) {
        self.log("action leave", action.id(), None);
        {
            let mut core = self.core.borrow_mut();
            let is_current = core
                .current
                .as_ref()
                .is_some_and(|current| action.is_same(current));
            if is_current {
                core.current = None;
            }
        }
        let observer = self.core.borrow().on_leave.clone();
        if let Some(observer) = observer {
            observer(action);
        }
    }

    pub fn enter_state(&self, state: &ActionState) {
        self.log_state("state enter", state);
        let observer = self.core.borrow().on_enter_state.clone();
        if let Some(observer) = observer {
            observer(state);
        }
    }

    pub fn leave_state(&self, state: &ActionState) {
        self.log_state("state leave", state);
        let observer = self.core.borrow().on_leave_state.clone();
        if let Some(observer) = observer {
            observer(state);
        }
    }

    /// Observe actions becoming current. Replaces any previous observer.
    pub fn on_enter<F>(&self, observer: F) -> &Self
    where
        F: Fn(&Action) + 'static,
    {
        self.core.borrow_mut().on_enter = Some(Rc::new(observer));
        self
    }

    pub fn on_leave<F>(&self, observer: F) -> &Self
    where
        F: Fn(&Action) + 'static,
    {
        self.core.borrow_mut().on_leave = Some(Rc::new(observer));
        self
    }

    pub fn on_enter_state<F>(&self, observer: F) -> &Self
    where
        F: Fn(&ActionState) + 'static,
    {
        self.core.borrow_mut().on_enter_state = Some(Rc::new(observer));
        self
    }

    pub fn on_leave_state<F>(&self, observer: F) -> &Self
    where
        F: Fn(&ActionState) + 'static,
    {
        self.core.borrow_mut().on_leave_state = Some(Rc::new(observer));
        self
    }

    /// Emit a `tracing` debug event for every transition routed through this
    /// director.
    pub fn enable_debug(&self) -> &Self {
        self.core.borrow_mut().debug = true;
        self
    }

    pub fn disable_debug(&self) -> &Self {
        self.core.borrow_mut().debug = false;
        self
    }

    pub fn is_debug_enabled(&self) -> bool {
        self.core.borrow().debug
    }

    fn log(&self, event: &str, action: &str, state: Option<&str>) {
        if !self.core.borrow().debug {
            return;
        }
        let at = Utc::now().to_rfc3339();
        match state {
            Some(state) => tracing::debug!(action, state, at = %at, "{event}"),
            None => tracing::debug!(action, at = %at, "{event}"),
        }
    }

    fn log_state(&self, event: &str, state: &ActionState) {
        if !self.is_debug_enabled() {
            return;
        }
        let action_id = state
            .action()
            .map(|action| action.id().to_string())
            .unwrap_or_default();
        self.log(event, &action_id, Some(state.id()));
    }
}

impl PartialEq for Director {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for Director {}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current_action();
        f.debug_struct("Director")
            .field("current_action", &current.as_ref().map(Action::id))
            .field("debug", &self.is_debug_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, Director) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let director = Director::new();
        let log = events.clone();
        director.on_enter(move |a| log.borrow_mut().push(format!("enter {}", a.id())));
        let log = events.clone();
        director.on_leave(move |a| log.borrow_mut().push(format!("leave {}", a.id())));
        let log = events.clone();
        director.on_enter_state(move |s| log.borrow_mut().push(format!("enter state {}", s.id())));
        let log = events.clone();
        director.on_leave_state(move |s| log.borrow_mut().push(format!("leave state {}", s.id())));
        (events, director)
    }

    #[test]
    fn enter_sets_current_and_notifies() {
        let (events, director) = recorder();
        let action = Action::new("inbox");

        assert_eq!(director.enter(&action), Ok(true));

        assert_eq!(director.current_action(), Some(action));
        assert_eq!(*events.borrow(), vec!["enter inbox"]);
    }

    #[test]
    fn enter_same_action_twice_is_noop() {
        let (events, director) = recorder();
        let action = Action::new("inbox");

        director.enter(&action).unwrap();
        assert_eq!(director.enter(&action), Ok(false));

        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn entering_second_action_leaves_first() {
        let (events, director) = recorder();
        let first = Action::new("first");
        let second = Action::new("second");
        first.set_director(&director);
        second.set_director(&director);

        first.enter().unwrap();
        second.enter().unwrap();

        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(director.current_action(), Some(second));
        assert_eq!(
            *events.borrow(),
            vec!["enter first", "leave first", "enter second"]
        );
    }

    #[test]
    fn entering_second_action_directly_still_notifies_leave() {
        let (events, director) = recorder();
        let first = Action::new("first");
        let second = Action::new("second");

        director.enter(&first).unwrap();
        director.enter(&second).unwrap();

        assert_eq!(director.current_action(), Some(second));
        assert_eq!(
            *events.borrow(),
            vec!["enter first", "leave first", "enter second"]
        );
    }

    #[test]
    fn leave_of_other_action_keeps_current() {
        let (events, director) = recorder();
        let current = Action::new("current");
        let stranger = Action::new("stranger");

        director.enter(&current).unwrap();
        director.leave(&stranger);

        assert_eq!(director.current_action(), Some(current));
        assert_eq!(*events.borrow(), vec!["enter current", "leave stranger"]);
    }

    #[test]
    fn state_notifications_do_not_touch_current_action() {
        let (events, director) = recorder();
        let action = Action::new("inbox");
        let state = ActionState::new("list");
        action.add_state(&state).unwrap();

        director.enter_state(&state);
        director.leave_state(&state);

        assert!(director.current_action().is_none());
        assert_eq!(
            *events.borrow(),
            vec!["enter state list", "leave state list"]
        );
    }

    #[test]
    fn registering_observer_replaces_previous() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let director = Director::new();
        let log = hits.clone();
        director.on_enter(move |_| log.borrow_mut().push("old"));
        let log = hits.clone();
        director.on_enter(move |_| log.borrow_mut().push("new"));

        director.enter(&Action::new("a")).unwrap();

        assert_eq!(*hits.borrow(), vec!["new"]);
    }

    #[test]
    fn dropped_action_is_not_current() {
        let director = Director::new();
        {
            let action = Action::new("short-lived");
            director.enter(&action).unwrap();
        }
        assert!(director.current_action().is_none());
        assert_eq!(director.leave_current_action(), Ok(false));
    }

    #[test]
    fn debug_flag_does_not_change_flow() {
        let (events, director) = recorder();
        director.enable_debug();
        assert!(director.is_debug_enabled());

        let action = Action::new("inbox");
        director.enter(&action).unwrap();
        director.leave(&action);

        director.disable_debug();
        assert!(!director.is_debug_enabled());
        assert_eq!(*events.borrow(), vec!["enter inbox", "leave inbox"]);
    }
}
