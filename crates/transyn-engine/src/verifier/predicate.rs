//! Atomic propositions over system steps and the boolean formulas built
//! from them.
//!
//! Evaluation is three-valued: a predicate that cannot decide (a guard that
//! does not mention the variable, say) answers `None`. A Büchi transition
//! fires only when its condition is definitely true.

use std::fmt;
use std::sync::Arc;

use transyn_ir::{StateId, INITIAL_EVENT};

use super::system::{Location, SystemStep};

/// Capability evaluating one proposition kind on (previous location, step).
pub trait AtomicPredicate: fmt::Debug + Send + Sync {
    fn evaluate(&self, from: Location, step: &SystemStep<'_>) -> Option<bool>;

    /// Whether the answer depends on how automaton states are numbered.
    fn mentions_state(&self) -> bool {
        false
    }
}

/// The step was taken on one of the listed events. The entry step of a
/// plant counts as [`INITIAL_EVENT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasEvent {
    pub events: Vec<String>,
}

impl WasEvent {
    /// Parse a comma-separated event list.
    pub fn parse(list: &str) -> Self {
        Self {
            events: list
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl AtomicPredicate for WasEvent {
    fn evaluate(&self, _from: Location, step: &SystemStep<'_>) -> Option<bool> {
        let event = step.event.unwrap_or(INITIAL_EVENT);
        Some(self.events.iter().any(|e| e == event))
    }
}

/// The step emitted the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasAction(pub String);

impl AtomicPredicate for WasAction {
    fn evaluate(&self, _from: Location, step: &SystemStep<'_>) -> Option<bool> {
        Some(step.actions.contains(&self.0))
    }
}

/// The step left the given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasInState(pub StateId);

impl AtomicPredicate for WasInState {
    fn evaluate(&self, from: Location, _step: &SystemStep<'_>) -> Option<bool> {
        Some(from == Location::State(self.0))
    }

    fn mentions_state(&self) -> bool {
        true
    }
}

/// The step entered the given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsInState(pub StateId);

impl AtomicPredicate for IsInState {
    fn evaluate(&self, _from: Location, step: &SystemStep<'_>) -> Option<bool> {
        Some(step.target == Location::State(self.0))
    }

    fn mentions_state(&self) -> bool {
        true
    }
}

/// The input variable was true on the step's guard. Unknown when the guard
/// does not force the variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasTrue(pub String);

impl AtomicPredicate for WasTrue {
    fn evaluate(&self, _from: Location, step: &SystemStep<'_>) -> Option<bool> {
        step.guard.and_then(|g| g.literal(&self.0))
    }
}

#[derive(Debug, Clone)]
pub enum PropFormula {
    True,
    Atom(Arc<dyn AtomicPredicate>),
    Not(Box<PropFormula>),
    And(Vec<PropFormula>),
    Or(Vec<PropFormula>),
}

#[allow(clippy::should_implement_trait)]
impl PropFormula {
    pub fn atom(predicate: impl AtomicPredicate + 'static) -> Self {
        PropFormula::Atom(Arc::new(predicate))
    }

    pub fn was_event(list: &str) -> Self {
        Self::atom(WasEvent::parse(list))
    }

    pub fn was_action(action: &str) -> Self {
        Self::atom(WasAction(action.to_string()))
    }

    pub fn was_in_state(state: StateId) -> Self {
        Self::atom(WasInState(state))
    }

    pub fn is_in_state(state: StateId) -> Self {
        Self::atom(IsInState(state))
    }

    pub fn was_true(var: &str) -> Self {
        Self::atom(WasTrue(var.to_string()))
    }

    pub fn not(self) -> Self {
        PropFormula::Not(Box::new(self))
    }

    pub fn and(items: Vec<PropFormula>) -> Self {
        PropFormula::And(items)
    }

    pub fn or(items: Vec<PropFormula>) -> Self {
        PropFormula::Or(items)
    }

    /// Kleene evaluation.
    pub fn evaluate(&self, from: Location, step: &SystemStep<'_>) -> Option<bool> {
        match self {
            PropFormula::True => Some(true),
            PropFormula::Atom(p) => p.evaluate(from, step),
            PropFormula::Not(inner) => inner.evaluate(from, step).map(|v| !v),
            PropFormula::And(items) => {
                let mut unknown = false;
                for item in items {
                    match item.evaluate(from, step) {
                        Some(false) => return Some(false),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                (!unknown).then_some(true)
            }
            PropFormula::Or(items) => {
                let mut unknown = false;
                for item in items {
                    match item.evaluate(from, step) {
                        Some(true) => return Some(true),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                (!unknown).then_some(false)
            }
        }
    }

    pub fn fires(&self, from: Location, step: &SystemStep<'_>) -> bool {
        self.evaluate(from, step) == Some(true)
    }

    /// Whether any atom refers to a state by number.
    pub fn mentions_states(&self) -> bool {
        match self {
            PropFormula::True => false,
            PropFormula::Atom(p) => p.mentions_state(),
            PropFormula::Not(inner) => inner.mentions_states(),
            PropFormula::And(items) | PropFormula::Or(items) => {
                items.iter().any(PropFormula::mentions_states)
            }
        }
    }
}
