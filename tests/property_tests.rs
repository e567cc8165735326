//! Property-based tests for the transition engine.
//!
//! These tests use proptest to drive random sequences of enters, leaves and
//! state switches through two actions sharing a director, checking the
//! machine's invariants after every step.

use loose_machine::{Action, ActionState, Director};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

#[derive(Clone, Debug)]
enum Op {
    EnterAction(usize),
    LeaveAction(usize),
    EnterState(usize, usize),
    LeaveState(usize, usize),
    Select(usize, usize),
}

prop_compose! {
    fn arbitrary_op()(kind in 0..5u8, action in 0..2usize, state in 0..2usize) -> Op {
        match kind {
            0 => Op::EnterAction(action),
            1 => Op::LeaveAction(action),
            2 => Op::EnterState(action, state),
            3 => Op::LeaveState(action, state),
            _ => Op::Select(action, state),
        }
    }
}

struct Machine {
    director: Director,
    actions: Vec<Action>,
    states: Vec<Vec<ActionState>>,
}

impl Machine {
    /// Two actions, each with a plain state and a persistent one.
    fn new() -> Self {
        let director = Director::new();
        let mut actions = Vec::new();
        let mut states = Vec::new();
        for id in ["first", "second"] {
            let action = Action::new(id);
            action.set_director(&director);
            let owned = vec![ActionState::new("plain"), ActionState::persistent("kept")];
            for state in &owned {
                action.add_state(state).unwrap();
            }
            actions.push(action);
            states.push(owned);
        }
        Self {
            director,
            actions,
            states,
        }
    }

    fn apply(&self, op: &Op) -> loose_machine::core::Result<bool> {
        match *op {
            Op::EnterAction(a) => self.actions[a].enter(),
            Op::LeaveAction(a) => self.actions[a].leave(),
            Op::EnterState(a, s) => self.states[a][s].enter(),
            Op::LeaveState(a, s) => self.states[a][s].leave(),
            Op::Select(a, s) => self.actions[a].set_current_state(&self.states[a][s], false),
        }
    }

    fn check_invariants(&self) -> Result<(), TestCaseError> {
        let active: Vec<&Action> = self.actions.iter().filter(|a| a.is_active()).collect();
        prop_assert!(active.len() <= 1);
        let current = self.director.current_action();
        prop_assert_eq!(current.as_ref(), active.first().copied());

        for (action, states) in self.actions.iter().zip(&self.states) {
            prop_assert_eq!(
                action.enter_count() - action.leave_count(),
                u64::from(action.is_active())
            );

            let active_states: Vec<&ActionState> =
                states.iter().filter(|s| s.is_active()).collect();
            prop_assert!(active_states.len() <= 1);

            for state in &active_states {
                prop_assert!(action.is_current_state(*state));
                if !state.persists() {
                    prop_assert!(action.is_active());
                }
            }

            for state in states {
                prop_assert!(state.leave_count() <= state.enter_count());
            }
        }
        Ok(())
    }
}

proptest! {
    #[test]
    fn invariants_hold_across_random_transitions(
        ops in prop::collection::vec(arbitrary_op(), 1..40)
    ) {
        let machine = Machine::new();
        for op in &ops {
            prop_assert!(machine.apply(op).is_ok(), "{:?} failed", op);
            machine.check_invariants()?;
        }
    }

    #[test]
    fn entering_active_action_is_idempotent(
        ops in prop::collection::vec(arbitrary_op(), 0..20),
        target in 0..2usize
    ) {
        let machine = Machine::new();
        for op in &ops {
            machine.apply(op).unwrap();
        }

        let action = &machine.actions[target];
        action.enter().unwrap();
        let enters = action.enter_count();
        let state_enters: Vec<u64> =
            machine.states[target].iter().map(ActionState::enter_count).collect();

        prop_assert_eq!(action.enter(), Ok(false));
        prop_assert_eq!(action.enter_count(), enters);
        let after: Vec<u64> =
            machine.states[target].iter().map(ActionState::enter_count).collect();
        prop_assert_eq!(after, state_enters);
    }

    #[test]
    fn current_state_resolution_is_stable(
        ops in prop::collection::vec(arbitrary_op(), 0..20)
    ) {
        let machine = Machine::new();
        for op in &ops {
            machine.apply(op).unwrap();
        }

        for action in &machine.actions {
            let first = action.get_current_state().unwrap();
            let second = action.get_current_state().unwrap();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn leaving_action_leaves_only_plain_states(
        ops in prop::collection::vec(arbitrary_op(), 0..20),
        target in 0..2usize,
        state in 0..2usize
    ) {
        let machine = Machine::new();
        for op in &ops {
            machine.apply(op).unwrap();
        }

        let action = &machine.actions[target];
        let chosen = &machine.states[target][state];
        chosen.enter().unwrap();
        action.leave().unwrap();

        prop_assert!(!action.is_active());
        prop_assert_eq!(chosen.is_active(), chosen.persists());
    }
}
