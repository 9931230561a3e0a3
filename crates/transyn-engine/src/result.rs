use std::fmt;

use serde::Serialize;
use transyn_ir::Counterexample;

use crate::timeout::timed_out;

/// Outcome of one exhaustive search at a fixed size.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<A> {
    Found(A),
    /// Every branch failed: no automaton of this size exists.
    Exhausted,
    TimedOut,
}

impl<A> SearchOutcome<A> {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
}

/// Outcome exposed by the synthesis entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisResult<A> {
    Found(A),
    NotFound,
    /// The budget ran out; nothing is known about this size.
    Unknown(String),
}

impl<A> SynthesisResult<A> {
    pub fn found(self) -> Option<A> {
        match self {
            SynthesisResult::Found(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SynthesisResult::NotFound)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SynthesisResult::Unknown(_))
    }
}

impl<A> From<SearchOutcome<A>> for SynthesisResult<A> {
    fn from(outcome: SearchOutcome<A>) -> Self {
        match outcome {
            SearchOutcome::Found(a) => SynthesisResult::Found(a),
            SearchOutcome::Exhausted => SynthesisResult::NotFound,
            SearchOutcome::TimedOut => {
                SynthesisResult::Unknown(timed_out("Backtracking search"))
            }
        }
    }
}

/// Result of model checking one automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    Counterexample {
        property: String,
        counterexample: Counterexample,
    },
}

impl Verdict {
    pub fn holds(&self) -> bool {
        matches!(self, Verdict::Holds)
    }

    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::Holds => None,
            Verdict::Counterexample { counterexample, .. } => Some(counterexample),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Holds => write!(f, "HOLDS"),
            Verdict::Counterexample {
                property,
                counterexample,
            } => write!(f, "VIOLATED '{property}': {counterexample}"),
        }
    }
}

/// Product-graph work done by the verifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerificationStats {
    pub product_nodes: usize,
    pub product_edges: usize,
    /// Distinct automaton transitions that fired at least one product edge.
    pub transitions_covered: usize,
}

impl VerificationStats {
    pub fn absorb(&mut self, other: VerificationStats) {
        self.product_nodes += other.product_nodes;
        self.product_edges += other.product_edges;
        self.transitions_covered += other.transitions_covered;
    }
}

/// Record of one CEGAR iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CegarIteration {
    pub iteration: usize,
    /// Trace counts of the local and global negative forests after folding.
    pub local_forest_size: usize,
    pub global_forest_size: usize,
    pub added_local: Option<Counterexample>,
    pub added_global: Option<Counterexample>,
}
