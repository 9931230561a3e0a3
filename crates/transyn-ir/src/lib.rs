//! Data model for transducer synthesis.
//!
//! This crate defines action sets and guards, observed traces and the
//! prefix-merged trace forests built from them, the Mealy and nondeterministic
//! Moore automata produced by synthesis, and verifier counterexamples.

pub mod actions;
pub mod completeness;
pub mod counterexample;
pub mod error;
pub mod forest;
pub mod guard;
pub mod mealy;
pub mod moore;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest_generators;
pub mod scenario;

pub use actions::ActionSet;
pub use completeness::CompletenessPolicy;
pub use counterexample::Counterexample;
pub use error::{AutomatonError, ForestError};
pub use forest::{EdgeId, ForestKind, NodeId, TraceForest, TreeEdge, TreeNode};
pub use guard::Guard;
pub use mealy::{MealyAutomaton, MealyState, MealyTransition, StateId};
pub use moore::{MooreState, MooreTransition, NondetMooreAutomaton};
pub use scenario::{Scenario, TraceStep, INITIAL_EVENT};
