//! Transducer synthesis engine.
//!
//! This crate searches for Mealy automata consistent with recorded traces
//! by backtracking, completes them under temporal properties, verifies
//! candidates with an explicit-state Büchi product check, and synthesizes
//! nondeterministic Moore plants with a counterexample-guided SAT loop.

pub mod backtracking;
pub mod cegar;
pub mod completion;
pub mod counterexample;
pub mod pipeline;
pub mod result;
pub mod timeout;
pub mod verifier;

pub use backtracking::{
    synthesize_backtracking, BacktrackingOptions, EventExtensions, SearchVariant,
};
pub use cegar::{synthesize_plant, CegarOptions, CegarReport};
pub use completion::AutomatonCompleter;
pub use pipeline::{synthesize, synthesize_minimal, verify, SynthesisError, SynthesisOptions};
pub use result::{CegarIteration, SearchOutcome, SynthesisResult, Verdict, VerificationStats};
pub use verifier::{Property, PropFormula, Verifier, VerifierPair};
