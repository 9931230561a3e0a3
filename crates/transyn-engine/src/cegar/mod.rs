//! Counterexample-guided synthesis of nondeterministic Moore plants.
//!
//! Each iteration asks the SAT oracle for a plant that replays every
//! positive trace and none of the stored negative traces, verifies it, and
//! folds the shortest counterexamples into the negative forests. Negative
//! traces found by the global verifier are kept in a separate forest so that
//! callers can share them between related synthesis runs.

mod materialize;

pub use materialize::materialize_plant;

use tracing::{info, warn};
use transyn_ir::{
    CompletenessPolicy, Counterexample, ForestKind, NondetMooreAutomaton, TraceForest,
};
use transyn_sat::{OracleResponse, PlantEncoder, SatOracle};

use crate::counterexample::{format_counterexample, shortest};
use crate::pipeline::SynthesisError;
use crate::result::{CegarIteration, SynthesisResult};
use crate::timeout::{
    deadline_exceeded, deadline_from_timeout_secs, remaining_timeout_secs, timed_out,
};
use crate::verifier::VerifierPair;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CegarOptions {
    pub size: usize,
    pub policy: CompletenessPolicy,
    pub deterministic: bool,
    /// Events beyond those observed in the positive traces.
    pub events: Vec<String>,
    /// Actions beyond those observed in the positive traces.
    pub actions: Vec<String>,
    /// Budget for the whole loop; 0 is unbounded.
    pub timeout_secs: u64,
    pub max_iterations: Option<usize>,
}

impl CegarOptions {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            policy: CompletenessPolicy::Normal,
            deterministic: false,
            events: Vec::new(),
            actions: Vec::new(),
            timeout_secs: 0,
            max_iterations: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CegarReport {
    pub result: SynthesisResult<NondetMooreAutomaton>,
    pub iterations: Vec<CegarIteration>,
}

fn finish(
    result: SynthesisResult<NondetMooreAutomaton>,
    iterations: Vec<CegarIteration>,
) -> Result<CegarReport, SynthesisError> {
    Ok(CegarReport { result, iterations })
}

/// Store `ce` as a finite negative trace unless the forest already has it.
fn fold(
    forest: &mut TraceForest,
    ce: Option<(String, Counterexample)>,
    scope: &str,
) -> Result<Option<Counterexample>, SynthesisError> {
    let Some((property, ce)) = ce else {
        return Ok(None);
    };
    let scenario = ce.to_scenario();
    if forest.contains(&scenario) {
        return Ok(None);
    }
    forest.insert_with_loop(&scenario, 0)?;
    info!(scope, "Folded {}", format_counterexample(&property, &ce));
    Ok(Some(ce))
}

/// Run the refinement loop for a plant with `options.size` states.
///
/// `local` and `global` are the negative forests and must be branching;
/// every counterexample folded into them stays there after the call.
pub fn synthesize_plant<O: SatOracle>(
    positive: &TraceForest,
    local: &mut TraceForest,
    global: &mut TraceForest,
    verifiers: &VerifierPair,
    oracle: &mut O,
    options: &CegarOptions,
) -> Result<CegarReport, SynthesisError> {
    if options.size == 0 {
        return Err(SynthesisError::Config("plant size must be at least 1".into()));
    }
    if local.kind() != ForestKind::Branching || global.kind() != ForestKind::Branching {
        return Err(SynthesisError::Config(
            "negative trace forests must be branching".into(),
        ));
    }
    let deadline = deadline_from_timeout_secs(options.timeout_secs);
    let mut iterations: Vec<CegarIteration> = Vec::new();

    loop {
        if deadline_exceeded(deadline) {
            return finish(
                SynthesisResult::Unknown(timed_out("CEGAR loop")),
                iterations,
            );
        }
        if let Some(max) = options.max_iterations {
            if iterations.len() >= max {
                return finish(
                    SynthesisResult::Unknown(format!("Iteration limit of {max} reached.")),
                    iterations,
                );
            }
        }

        let plant = {
            let encoder = PlantEncoder::new(positive, options.size)
                .with_events(options.events.iter().cloned())
                .with_actions(options.actions.iter().cloned())
                .with_negative(local)
                .with_negative(global)
                .with_policy(options.policy)
                .with_determinism(options.deterministic);
            let constraints = encoder.encode();
            let response = oracle
                .solve(&constraints, remaining_timeout_secs(deadline))
                .map_err(|e| SynthesisError::Oracle(e.to_string()))?;
            match response {
                OracleResponse::Sat(assignment) => {
                    materialize_plant(&assignment, &encoder, positive, options.policy)?
                }
                OracleResponse::Unsat => {
                    info!(
                        size = options.size,
                        iterations = iterations.len(),
                        "No plant of this size"
                    );
                    return finish(SynthesisResult::NotFound, iterations);
                }
                OracleResponse::Timeout => {
                    warn!(oracle = oracle.name(), "SAT oracle timed out");
                    return finish(
                        SynthesisResult::Unknown(timed_out("SAT oracle")),
                        iterations,
                    );
                }
            }
        };

        let tagged = verifiers.verify(&plant);
        if tagged.is_empty() {
            info!(
                size = options.size,
                iterations = iterations.len(),
                "Plant satisfies all properties"
            );
            return finish(SynthesisResult::Found(plant), iterations);
        }

        let collapse = |ces: &[(String, Counterexample)]| {
            shortest(
                ces.iter()
                    .map(|(name, ce)| (name.clone(), ce.collapse_loop(options.size))),
            )
        };
        let local_ce = collapse(&tagged.local);
        let global_ce = collapse(&tagged.global);
        // A local counterexample strictly longer than the global one is dropped.
        let (local_ce, global_ce) = match (local_ce, global_ce) {
            (Some(l), Some(g)) => ((l.1.len() <= g.1.len()).then_some(l), Some(g)),
            pair => pair,
        };

        let added_local = fold(local, local_ce, "local")?;
        let added_global = fold(global, global_ce, "global")?;
        if added_local.is_none() && added_global.is_none() {
            return Err(SynthesisError::Stalled(format!(
                "counterexample against plant of size {} is already excluded",
                options.size
            )));
        }

        let iteration = CegarIteration {
            iteration: iterations.len() + 1,
            local_forest_size: local.trace_count(),
            global_forest_size: global.trace_count(),
            added_local,
            added_global,
        };
        info!(
            iteration = iteration.iteration,
            local_traces = iteration.local_forest_size,
            global_traces = iteration.global_forest_size,
            "Refined negative traces"
        );
        iterations.push(iteration);
    }
}
