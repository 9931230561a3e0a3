//! Entry points tying trace forests, the verifier and the searches together.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use transyn_ir::{AutomatonError, CompletenessPolicy, ForestError, MealyAutomaton, TraceForest};

use crate::backtracking::{
    synthesize_backtracking, BacktrackingOptions, EventExtensions, SearchVariant,
};
use crate::cegar::CegarOptions;
use crate::result::{SearchOutcome, SynthesisResult, Verdict};
use crate::timeout::{deadline_exceeded, deadline_from_timeout_secs, timed_out};
use crate::verifier::{LabeledSystem, Property, Verifier};

/// Errors from the synthesis pipeline.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Trace error: {0}")]
    Forest(#[from] ForestError),
    #[error("Automaton error: {0}")]
    Automaton(#[from] AutomatonError),
    #[error("Oracle error: {0}")]
    Oracle(String),
    #[error("Invalid oracle assignment: {0}")]
    InvalidAssignment(String),
    #[error("Refinement stalled: {0}")]
    Stalled(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Options shared by the backtracking and plant pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisOptions {
    /// Number of states for [`synthesize`].
    pub size: usize,
    /// Largest size tried by [`synthesize_minimal`].
    pub max_size: usize,
    /// Wall-clock budget for the whole call; 0 is unbounded.
    pub timeout_secs: u64,
    pub completeness: CompletenessPolicy,
    pub variant: SearchVariant,
    pub symmetry_breaking: bool,
    /// Event alphabet used to complete automata. Empty means the events seen
    /// in the traces.
    pub events: Vec<String>,
    /// Number of input-variable characters closing each concrete event name.
    pub extension_variables: usize,
    /// Weighted action mismatches tolerated by the error-tolerant variant.
    pub error_bound: usize,
    /// Plant synthesis: forbid two transitions on one event from one state.
    pub deterministic: bool,
    /// Plant synthesis: actions beyond those observed in the traces.
    pub actions: Vec<String>,
    pub max_iterations: Option<usize>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            size: 2,
            max_size: 8,
            timeout_secs: 0,
            completeness: CompletenessPolicy::Normal,
            variant: SearchVariant::Ordinary,
            symmetry_breaking: true,
            events: Vec::new(),
            extension_variables: 0,
            error_bound: 0,
            deterministic: false,
            actions: Vec::new(),
            max_iterations: None,
        }
    }
}

impl SynthesisOptions {
    pub fn from_json_str(text: &str) -> Result<Self, SynthesisError> {
        serde_json::from_str(text).map_err(|e| SynthesisError::Config(e.to_string()))
    }

    /// Search options for one size under a shared deadline.
    pub fn backtracking(
        &self,
        forest: &TraceForest,
        size: usize,
        deadline: Option<Instant>,
    ) -> BacktrackingOptions {
        let events: Vec<String> = if self.events.is_empty() {
            forest.events().into_iter().collect()
        } else {
            self.events.clone()
        };
        BacktrackingOptions {
            size,
            variant: self.variant,
            completeness: self.completeness,
            deadline,
            symmetry_breaking: self.symmetry_breaking,
            event_extensions: EventExtensions::from_suffix(&events, self.extension_variables),
            events,
            error_bound: self.error_bound,
        }
    }

    /// Refinement-loop options for a plant of `size` states.
    pub fn cegar(&self) -> CegarOptions {
        CegarOptions {
            size: self.size,
            policy: self.completeness,
            deterministic: self.deterministic,
            events: self.events.clone(),
            actions: self.actions.clone(),
            timeout_secs: self.timeout_secs,
            max_iterations: self.max_iterations,
        }
    }
}

/// Search for an automaton with exactly `options.size` states.
pub fn synthesize(
    forest: &TraceForest,
    properties: &[Property],
    options: &SynthesisOptions,
) -> Result<SynthesisResult<MealyAutomaton>, SynthesisError> {
    let verifier = Verifier::new(properties.to_vec());
    let deadline = deadline_from_timeout_secs(options.timeout_secs);
    let search = options.backtracking(forest, options.size, deadline);
    Ok(synthesize_backtracking(forest, &verifier, &search)?.into())
}

/// Try sizes `1..=options.max_size` in order and return the first automaton
/// found. All sizes share one deadline.
pub fn synthesize_minimal(
    forest: &TraceForest,
    properties: &[Property],
    options: &SynthesisOptions,
) -> Result<SynthesisResult<MealyAutomaton>, SynthesisError> {
    if options.max_size == 0 {
        return Err(SynthesisError::Config("max_size must be at least 1".into()));
    }
    let verifier = Verifier::new(properties.to_vec());
    let deadline = deadline_from_timeout_secs(options.timeout_secs);
    for size in 1..=options.max_size {
        if deadline_exceeded(deadline) {
            return Ok(SynthesisResult::Unknown(timed_out(
                "Minimal-size search",
            )));
        }
        let search = options.backtracking(forest, size, deadline);
        match synthesize_backtracking(forest, &verifier, &search)? {
            SearchOutcome::Found(automaton) => {
                info!(size, "Found minimal automaton");
                return Ok(SynthesisResult::Found(automaton));
            }
            SearchOutcome::Exhausted => {
                info!(size, "No automaton of this size");
            }
            SearchOutcome::TimedOut => {
                return Ok(SynthesisResult::Unknown(timed_out(
                    "Minimal-size search",
                )));
            }
        }
    }
    Ok(SynthesisResult::NotFound)
}

/// Check an automaton against `properties`, reporting the first violation.
pub fn verify<S: LabeledSystem + ?Sized>(system: &S, properties: &[Property]) -> Verdict {
    Verifier::new(properties.to_vec()).verify(system)
}
