use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::ActionSet;
use crate::guard::Guard;

/// Reserved event labelling the first step of a Moore (plant) trace: the step
/// that enters one of the automaton's start states.
pub const INITIAL_EVENT: &str = "$init";

/// One observed step of a trace.
///
/// `events` usually holds a single event. Several events denote an event set:
/// concrete events that share one abstract transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceStep {
    pub events: Vec<String>,
    pub guard: Guard,
    pub actions: ActionSet,
}

impl TraceStep {
    pub fn new(event: impl Into<String>, actions: ActionSet) -> Self {
        Self {
            events: vec![event.into()],
            guard: Guard::True,
            actions,
        }
    }

    pub fn with_events<S: Into<String>>(
        events: impl IntoIterator<Item = S>,
        actions: ActionSet,
    ) -> Self {
        Self {
            events: events.into_iter().map(Into::into).collect(),
            guard: Guard::True,
            actions,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    /// First event of the step. Empty when the step carries no event.
    pub fn event(&self) -> &str {
        self.events.first().map(String::as_str).unwrap_or("")
    }
}

/// An observed sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<TraceStep>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-event step whose actions are given as a
    /// comma-separated list.
    pub fn step(mut self, event: &str, actions: &str) -> Self {
        self.steps.push(TraceStep::new(event, ActionSet::parse(actions)));
        self
    }

    pub fn guarded_step(mut self, event: &str, guard: Guard, actions: &str) -> Self {
        self.steps
            .push(TraceStep::new(event, ActionSet::parse(actions)).guarded(guard));
        self
    }

    pub fn push(&mut self, step: TraceStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<TraceStep> for Scenario {
    fn from_iter<I: IntoIterator<Item = TraceStep>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", step.events.join(","))?;
            if !step.guard.is_tautology() {
                write!(f, " [{}]", step.guard)?;
            }
            write!(f, " / {}", step.actions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_appends_steps_in_order() {
        let s = Scenario::new().step("e1", "z1").step("e2", "");
        assert_eq!(s.len(), 2);
        assert_eq!(s.steps[0].event(), "e1");
        assert!(s.steps[1].actions.is_empty());
        assert_eq!(s.to_string(), "e1 / z1; e2 / ");
    }

    #[test]
    fn guarded_step_is_displayed_with_guard() {
        let s = Scenario::new().guarded_step("e", Guard::var("x"), "z");
        assert_eq!(s.to_string(), "e [x] / z");
    }
}
