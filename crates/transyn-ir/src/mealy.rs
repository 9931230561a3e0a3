use std::fmt;

use crate::actions::ActionSet;
use crate::error::AutomatonError;
use crate::guard::Guard;
use crate::scenario::{Scenario, TraceStep};

/// Identifier of an automaton state.
pub type StateId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MealyTransition {
    pub event: String,
    pub guard: Guard,
    pub actions: ActionSet,
    pub dst: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealyState {
    pub transitions: Vec<MealyTransition>,
}

/// Deterministic Mealy transducer with initial state 0.
///
/// At most one transition leaves a state per (event, guard) pair. The
/// backtracking search mutates one instance in place and undoes every
/// tentative insertion with [`MealyAutomaton::remove_transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyAutomaton {
    states: Vec<MealyState>,
}

impl MealyAutomaton {
    pub fn new(size: usize) -> Self {
        Self {
            states: vec![MealyState::default(); size],
        }
    }

    pub fn size(&self) -> usize {
        self.states.len()
    }

    pub fn initial_state(&self) -> StateId {
        0
    }

    pub fn states(&self) -> &[MealyState] {
        &self.states
    }

    pub fn transitions(&self, state: StateId) -> &[MealyTransition] {
        self.states
            .get(state)
            .map(|s| s.transitions.as_slice())
            .unwrap_or(&[])
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn transition(
        &self,
        state: StateId,
        event: &str,
        guard: &Guard,
    ) -> Option<&MealyTransition> {
        self.transitions(state)
            .iter()
            .find(|t| t.event == event && t.guard == *guard)
    }

    /// Whether `state` has a transition on `event` under any guard.
    pub fn has_event(&self, state: StateId, event: &str) -> bool {
        self.transitions(state).iter().any(|t| t.event == event)
    }

    pub fn add_transition(
        &mut self,
        src: StateId,
        event: impl Into<String>,
        guard: Guard,
        actions: ActionSet,
        dst: StateId,
    ) -> Result<(), AutomatonError> {
        let event = event.into();
        if dst >= self.states.len() {
            return Err(AutomatonError::UnknownState(dst));
        }
        if self.transition(src, &event, &guard).is_some() {
            return Err(AutomatonError::DuplicateTransition {
                state: src,
                event,
                guard: guard.to_string(),
            });
        }
        let state = self
            .states
            .get_mut(src)
            .ok_or(AutomatonError::UnknownState(src))?;
        state.transitions.push(MealyTransition {
            event,
            guard,
            actions,
            dst,
        });
        Ok(())
    }

    pub fn remove_transition(
        &mut self,
        src: StateId,
        event: &str,
        guard: &Guard,
    ) -> Option<MealyTransition> {
        let state = self.states.get_mut(src)?;
        let index = state
            .transitions
            .iter()
            .position(|t| t.event == event && t.guard == *guard)?;
        Some(state.transitions.remove(index))
    }

    /// Replace the actions of an existing transition, returning the old ones.
    pub fn set_actions(
        &mut self,
        src: StateId,
        event: &str,
        guard: &Guard,
        actions: ActionSet,
    ) -> Option<ActionSet> {
        let transition = self
            .states
            .get_mut(src)?
            .transitions
            .iter_mut()
            .find(|t| t.event == event && t.guard == *guard)?;
        Some(std::mem::replace(&mut transition.actions, actions))
    }

    /// Destination and emitted actions for a trace step taken from `state`.
    ///
    /// Every event of an event set must have a transition and all of them
    /// must agree on the destination. `None` when the step cannot be taken.
    fn step_from(&self, state: StateId, step: &TraceStep) -> Option<(StateId, bool)> {
        let mut dst = None;
        let mut actions_match = true;
        for event in &step.events {
            let t = self.transition(state, event, &step.guard)?;
            if dst.is_some_and(|d| d != t.dst) {
                return None;
            }
            dst = Some(t.dst);
            actions_match &= t.actions == step.actions;
        }
        dst.map(|d| (d, actions_match))
    }

    /// Whether the automaton replays `scenario` from the initial state,
    /// reproducing every recorded action set.
    pub fn complies_with(&self, scenario: &Scenario) -> bool {
        let mut state = self.initial_state();
        for step in &scenario.steps {
            match self.step_from(state, step) {
                Some((dst, true)) => state = dst,
                _ => return false,
            }
        }
        true
    }

    /// Number of steps whose actions differ from the trace, plus the length
    /// of the suffix that cannot be replayed at all.
    pub fn missed_actions(&self, scenario: &Scenario) -> usize {
        let mut state = self.initial_state();
        let mut missed = 0;
        for (index, step) in scenario.steps.iter().enumerate() {
            match self.step_from(state, step) {
                Some((dst, matched)) => {
                    if !matched {
                        missed += 1;
                    }
                    state = dst;
                }
                None => return missed + scenario.len() - index,
            }
        }
        missed
    }
}

impl fmt::Display for MealyAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (src, state) in self.states.iter().enumerate() {
            for t in &state.transitions {
                write!(f, "{src} --{}", t.event)?;
                if !t.guard.is_tautology() {
                    write!(f, " [{}]", t.guard)?;
                }
                writeln!(f, " / {}--> {}", t.actions, t.dst)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle() -> MealyAutomaton {
        let mut a = MealyAutomaton::new(2);
        a.add_transition(0, "e", Guard::True, ActionSet::parse("on"), 1)
            .unwrap();
        a.add_transition(1, "e", Guard::True, ActionSet::parse("off"), 0)
            .unwrap();
        a
    }

    #[test]
    fn duplicate_transition_is_rejected() {
        let mut a = toggle();
        let err = a
            .add_transition(0, "e", Guard::True, ActionSet::new(), 0)
            .unwrap_err();
        assert!(matches!(err, AutomatonError::DuplicateTransition { state: 0, .. }));
        assert_eq!(
            a.add_transition(0, "f", Guard::True, ActionSet::new(), 5),
            Err(AutomatonError::UnknownState(5))
        );
    }

    #[test]
    fn replay_checks_actions_exactly() {
        let a = toggle();
        assert!(a.complies_with(&Scenario::new().step("e", "on").step("e", "off")));
        assert!(!a.complies_with(&Scenario::new().step("e", "on").step("e", "on")));
        assert!(!a.complies_with(&Scenario::new().step("f", "")));
    }

    #[test]
    fn missed_actions_counts_mismatches_and_unreplayable_suffix() {
        let a = toggle();
        let s = Scenario::new()
            .step("e", "on")
            .step("e", "on")
            .step("f", "")
            .step("e", "");
        assert_eq!(a.missed_actions(&s), 1 + 2);
    }

    #[test]
    fn remove_and_set_actions_round_trip() {
        let mut a = toggle();
        let old = a.set_actions(0, "e", &Guard::True, ActionSet::parse("x"));
        assert_eq!(old, Some(ActionSet::parse("on")));
        let removed = a.remove_transition(0, "e", &Guard::True).unwrap();
        assert_eq!(removed.actions, ActionSet::parse("x"));
        assert_eq!(a.transition_count(), 1);
        assert!(a.remove_transition(0, "e", &Guard::True).is_none());
    }
}
