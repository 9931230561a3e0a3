//! Uniform view of Mealy and Moore automata as labeled transition systems.

use transyn_ir::{ActionSet, Guard, MealyAutomaton, NondetMooreAutomaton, StateId};

/// A position in a labeled system.
///
/// Moore plants start in a virtual location before one of their start
/// states is chosen; Mealy automata start directly in state 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Start,
    State(StateId),
}

/// One transition leaving a location.
#[derive(Debug, Clone, Copy)]
pub struct SystemStep<'a> {
    /// `None` for the step from [`Location::Start`] into a start state.
    pub event: Option<&'a str>,
    pub guard: Option<&'a Guard>,
    pub actions: &'a ActionSet,
    pub target: Location,
    /// Index of the transition among those leaving its source location.
    pub index: usize,
}

pub trait LabeledSystem {
    fn initial(&self) -> Location;

    fn steps(&self, from: Location) -> Vec<SystemStep<'_>>;
}

impl LabeledSystem for MealyAutomaton {
    fn initial(&self) -> Location {
        Location::State(self.initial_state())
    }

    fn steps(&self, from: Location) -> Vec<SystemStep<'_>> {
        let Location::State(state) = from else {
            return Vec::new();
        };
        self.transitions(state)
            .iter()
            .enumerate()
            .map(|(index, t)| SystemStep {
                event: Some(t.event.as_str()),
                guard: Some(&t.guard),
                actions: &t.actions,
                target: Location::State(t.dst),
                index,
            })
            .collect()
    }
}

impl LabeledSystem for NondetMooreAutomaton {
    fn initial(&self) -> Location {
        Location::Start
    }

    fn steps(&self, from: Location) -> Vec<SystemStep<'_>> {
        match from {
            Location::Start => self
                .start_states()
                .enumerate()
                .map(|(index, s)| SystemStep {
                    event: None,
                    guard: None,
                    actions: self.actions(s),
                    target: Location::State(s),
                    index,
                })
                .collect(),
            Location::State(state) => self
                .transitions(state)
                .iter()
                .enumerate()
                .map(|(index, t)| SystemStep {
                    event: Some(t.event.as_str()),
                    guard: None,
                    actions: self.actions(t.dst),
                    target: Location::State(t.dst),
                    index,
                })
                .collect(),
        }
    }
}
