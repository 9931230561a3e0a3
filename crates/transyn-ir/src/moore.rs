use std::collections::BTreeSet;
use std::fmt;

use crate::actions::ActionSet;
use crate::error::AutomatonError;
use crate::mealy::StateId;
use crate::scenario::{Scenario, INITIAL_EVENT};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MooreTransition {
    pub event: String,
    pub dst: StateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MooreState {
    /// Actions emitted whenever the state is entered.
    pub actions: ActionSet,
    pub transitions: Vec<MooreTransition>,
}

/// Nondeterministic Moore automaton used as a plant model.
///
/// Several states may be initial, and several transitions may leave a state
/// on the same event. Traces start with an [`INITIAL_EVENT`] step whose
/// actions are those of the chosen start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NondetMooreAutomaton {
    states: Vec<MooreState>,
    start: Vec<bool>,
}

impl NondetMooreAutomaton {
    /// Create an automaton without transitions. `start` is padded with
    /// `false` (or truncated) to the number of states.
    pub fn new(actions: Vec<ActionSet>, mut start: Vec<bool>) -> Self {
        start.resize(actions.len(), false);
        Self {
            states: actions
                .into_iter()
                .map(|actions| MooreState {
                    actions,
                    transitions: Vec::new(),
                })
                .collect(),
            start,
        }
    }

    pub fn size(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[MooreState] {
        &self.states
    }

    pub fn actions(&self, state: StateId) -> &ActionSet {
        &self.states[state].actions
    }

    pub fn is_start(&self, state: StateId) -> bool {
        self.start.get(state).copied().unwrap_or(false)
    }

    pub fn start_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.start
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| s.then_some(i))
    }

    pub fn transitions(&self, state: StateId) -> &[MooreTransition] {
        self.states
            .get(state)
            .map(|s| s.transitions.as_slice())
            .unwrap_or(&[])
    }

    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn has_transition(&self, src: StateId, event: &str, dst: StateId) -> bool {
        self.transitions(src)
            .iter()
            .any(|t| t.event == event && t.dst == dst)
    }

    /// Add a transition. Returns `false` when it was already present.
    pub fn add_transition(
        &mut self,
        src: StateId,
        event: impl Into<String>,
        dst: StateId,
    ) -> Result<bool, AutomatonError> {
        if dst >= self.states.len() {
            return Err(AutomatonError::UnknownState(dst));
        }
        let event = event.into();
        if self.has_transition(src, &event, dst) {
            return Ok(false);
        }
        self.states
            .get_mut(src)
            .ok_or(AutomatonError::UnknownState(src))?
            .transitions
            .push(MooreTransition { event, dst });
        Ok(true)
    }

    pub fn remove_transition(&mut self, src: StateId, event: &str, dst: StateId) -> bool {
        let Some(state) = self.states.get_mut(src) else {
            return false;
        };
        match state
            .transitions
            .iter()
            .position(|t| t.event == event && t.dst == dst)
        {
            Some(index) => {
                state.transitions.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether some run of the automaton produces `scenario`.
    ///
    /// The first step must carry [`INITIAL_EVENT`]; it selects the start
    /// states emitting its actions. The empty trace is always replayed.
    pub fn replays(&self, scenario: &Scenario) -> bool {
        let Some((first, rest)) = scenario.steps.split_first() else {
            return true;
        };
        if first.event() != INITIAL_EVENT {
            return false;
        }
        let mut current: BTreeSet<StateId> = self
            .start_states()
            .filter(|&s| self.states[s].actions == first.actions)
            .collect();
        for step in rest {
            let next: BTreeSet<StateId> = current
                .iter()
                .flat_map(|&s| self.states[s].transitions.iter())
                .filter(|t| step.events.contains(&t.event))
                .map(|t| t.dst)
                .filter(|&d| self.states[d].actions == step.actions)
                .collect();
            if next.is_empty() {
                return false;
            }
            current = next;
        }
        !current.is_empty()
    }
}

impl fmt::Display for NondetMooreAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.states.iter().enumerate() {
            let marker = if self.is_start(id) { "*" } else { "" };
            writeln!(f, "{marker}{id} / {}", state.actions)?;
            for t in &state.transitions {
                writeln!(f, "  --{}--> {}", t.event, t.dst)?;
            }
        }
        Ok(())
    }
}
