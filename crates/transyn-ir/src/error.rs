use thiserror::Error;

use crate::actions::ActionSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForestError {
    #[error(
        "Inconsistent traces at step {step}: event '{event}' produces '{found}' here \
         but '{existing}' in an earlier trace"
    )]
    InconsistentActions {
        step: usize,
        event: String,
        existing: ActionSet,
        found: ActionSet,
    },
    #[error("Event set at step {step} matches edges leading to different nodes")]
    SplitEventSet { step: usize },
    #[error("Trace step {0} carries no event")]
    EmptyEventSet(usize),
    #[error("Loop length {loop_length} exceeds trace length {trace_length}")]
    LoopOutOfRange {
        loop_length: usize,
        trace_length: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("Unknown state {0}")]
    UnknownState(usize),
    #[error("State {state} already has a transition on '{event}' [{guard}]")]
    DuplicateTransition {
        state: usize,
        event: String,
        guard: String,
    },
}
