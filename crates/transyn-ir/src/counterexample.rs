use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::ActionSet;
use crate::scenario::{Scenario, TraceStep};

/// A violating run: a finite prefix whose last `loop_length` steps repeat
/// forever. `loop_length == 0` denotes a finite violation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Counterexample {
    pub steps: Vec<(String, ActionSet)>,
    pub loop_length: usize,
}

impl Counterexample {
    pub fn new(steps: Vec<(String, ActionSet)>, loop_length: usize) -> Self {
        Self { steps, loop_length }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of transitions, loop included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Unroll the loop so that it appears `times` times in total and drop
    /// the loop marker.
    ///
    /// Repeating a loop as many times as the automaton has states forces a
    /// contradiction against any transducer of that size that could produce
    /// it, so the result can be stored as a finite negative trace.
    pub fn collapse_loop(&self, times: usize) -> Counterexample {
        if self.loop_length == 0 || times <= 1 {
            return Counterexample::new(self.steps.clone(), 0);
        }
        let split = self.steps.len() - self.loop_length;
        let mut steps = self.steps.clone();
        let cycle = &self.steps[split..];
        for _ in 1..times {
            steps.extend(cycle.iter().cloned());
        }
        Counterexample::new(steps, 0)
    }

    pub fn to_scenario(&self) -> Scenario {
        self.steps
            .iter()
            .map(|(event, actions)| TraceStep::new(event.clone(), actions.clone()))
            .collect()
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let split = self.steps.len() - self.loop_length.min(self.steps.len());
        for (i, (event, actions)) in self.steps.iter().enumerate() {
            if i == split && self.loop_length > 0 {
                write!(f, "loop: ")?;
            }
            write!(f, "{event}/{actions}")?;
            if i + 1 < self.steps.len() {
                write!(f, " ")?;
            }
        }
        Ok(())
    }
}
