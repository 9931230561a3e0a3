mod common;
use common::*;

use std::convert::Infallible;

use transyn_engine::cegar::{synthesize_plant, CegarOptions};
use transyn_engine::pipeline::{verify, SynthesisError};
use transyn_engine::result::SynthesisResult;
use transyn_engine::verifier::{PropFormula, Property, Verifier, VerifierPair};
use transyn_ir::{Scenario, TraceForest, INITIAL_EVENT};
use transyn_sat::{Assignment, ConstraintSet, OracleResponse, SatOracle, Z3Oracle};

/// Oracle replaying canned responses; the last one repeats forever.
struct ScriptedOracle {
    responses: Vec<OracleResponse>,
    calls: usize,
}

impl ScriptedOracle {
    fn new(responses: Vec<OracleResponse>) -> Self {
        Self {
            responses,
            calls: 0,
        }
    }
}

impl SatOracle for ScriptedOracle {
    type Error = Infallible;

    fn solve(
        &mut self,
        _constraints: &ConstraintSet,
        _timeout_secs: Option<u64>,
    ) -> Result<OracleResponse, Self::Error> {
        let index = self.calls.min(self.responses.len() - 1);
        self.calls += 1;
        Ok(self.responses[index].clone())
    }
}

fn idle_busy_traces() -> TraceForest {
    branching_forest(&[trace(&[(INITIAL_EVENT, "idle"), ("go", "busy"), ("stop", "idle")])])
}

/// `stop` never leads into a busy state.
fn stop_stays_idle() -> Property {
    Property::never(
        "stop-stays-idle",
        PropFormula::and(vec![PropFormula::was_event("stop"), PropFormula::was_action("busy")]),
    )
}

/// A one-state plant that only emits `idle`.
fn idle_only() -> (TraceForest, Assignment) {
    let positive = branching_forest(&[trace(&[(INITIAL_EVENT, "idle")])]);
    let assignment = ["x_1_0", "s_0", "z_0_0"]
        .into_iter()
        .map(|v| (v.to_string(), true))
        .collect();
    (positive, assignment)
}

/// A one-state plant emitting `idle` that loops on `go`.
fn idle_loop() -> (TraceForest, Assignment) {
    let positive = branching_forest(&[trace(&[(INITIAL_EVENT, "idle"), ("go", "idle")])]);
    let assignment = ["x_1_0", "x_2_0", "s_0", "z_0_0", "y_0_0_0"]
        .into_iter()
        .map(|v| (v.to_string(), true))
        .collect();
    (positive, assignment)
}

fn never_event(event: &str) -> Property {
    Property::never(format!("never-{event}"), PropFormula::was_event(event))
}

#[test]
fn z3_loop_refines_until_local_property_holds() {
    init_tracing();
    let positive = idle_busy_traces();
    let mut local = TraceForest::branching();
    let mut global = TraceForest::branching();
    let verifiers = VerifierPair::new(Verifier::new(vec![stop_stays_idle()]), Verifier::default());
    let mut oracle = Z3Oracle::new();

    let report = synthesize_plant(
        &positive,
        &mut local,
        &mut global,
        &verifiers,
        &mut oracle,
        &CegarOptions::new(2),
    )
    .unwrap();

    let plant = match report.result {
        SynthesisResult::Found(plant) => plant,
        other => panic!("expected a plant, got {other:?}"),
    };
    let observed = trace(&[(INITIAL_EVENT, "idle"), ("go", "busy"), ("stop", "idle")]);
    assert!(plant.replays(&observed));
    assert!(verify(&plant, &[stop_stays_idle()]).holds());
    for state in 0..plant.size() {
        for event in ["go", "stop"] {
            assert!(plant.transitions(state).iter().any(|t| t.event == event));
        }
    }

    assert_eq!(local.trace_count(), report.iterations.len());
    assert_eq!(global.trace_count(), 0);
    for (index, iteration) in report.iterations.iter().enumerate() {
        assert_eq!(iteration.iteration, index + 1);
        assert_eq!(iteration.local_forest_size, index + 1);
        assert!(iteration.added_local.is_some());
        assert!(iteration.added_global.is_none());
    }
}

#[test]
fn global_counterexamples_go_to_the_global_forest() {
    let positive = idle_busy_traces();
    let mut local = TraceForest::branching();
    let mut global = TraceForest::branching();
    let verifiers = VerifierPair::new(Verifier::default(), Verifier::new(vec![stop_stays_idle()]));

    let report = synthesize_plant(
        &positive,
        &mut local,
        &mut global,
        &verifiers,
        &mut Z3Oracle::new(),
        &CegarOptions::new(2),
    )
    .unwrap();

    assert!(report.result.found().is_some());
    assert_eq!(local.trace_count(), 0);
    assert_eq!(global.trace_count(), report.iterations.len());
}

#[test]
fn too_small_plant_is_not_found() {
    let positive = idle_busy_traces();
    let report = synthesize_plant(
        &positive,
        &mut TraceForest::branching(),
        &mut TraceForest::branching(),
        &VerifierPair::default(),
        &mut Z3Oracle::new(),
        &CegarOptions::new(1),
    )
    .unwrap();
    assert_eq!(report.result, SynthesisResult::NotFound);
    assert!(report.iterations.is_empty());
}

#[test]
fn oracle_timeout_is_unknown() {
    let (positive, _) = idle_only();
    let report = synthesize_plant(
        &positive,
        &mut TraceForest::branching(),
        &mut TraceForest::branching(),
        &VerifierPair::default(),
        &mut ScriptedOracle::new(vec![OracleResponse::Timeout]),
        &CegarOptions::new(1),
    )
    .unwrap();
    assert!(report.result.is_unknown());
}

#[test]
fn repeated_counterexample_stalls_the_loop() {
    let (positive, assignment) = idle_only();
    let mut local = TraceForest::branching();
    let verifiers =
        VerifierPair::new(Verifier::new(vec![never_action("idle")]), Verifier::default());
    let mut oracle = ScriptedOracle::new(vec![OracleResponse::Sat(assignment)]);

    let err = synthesize_plant(
        &positive,
        &mut local,
        &mut TraceForest::branching(),
        &verifiers,
        &mut oracle,
        &CegarOptions::new(1),
    )
    .unwrap_err();
    assert!(matches!(err, SynthesisError::Stalled(_)));
    assert_eq!(oracle.calls, 2);
    assert!(local.contains(&Scenario::new().step(INITIAL_EVENT, "idle")));
}

#[test]
fn iteration_limit_yields_unknown() {
    let (positive, assignment) = idle_only();
    let verifiers =
        VerifierPair::new(Verifier::new(vec![never_action("idle")]), Verifier::default());
    let options = CegarOptions {
        max_iterations: Some(1),
        ..CegarOptions::new(1)
    };
    let report = synthesize_plant(
        &positive,
        &mut TraceForest::branching(),
        &mut TraceForest::branching(),
        &verifiers,
        &mut ScriptedOracle::new(vec![OracleResponse::Sat(assignment)]),
        &options,
    )
    .unwrap();
    assert_eq!(
        report.result,
        SynthesisResult::Unknown("Iteration limit of 1 reached.".into())
    );
    assert_eq!(report.iterations.len(), 1);
}

#[test]
fn deterministic_negative_forest_is_rejected() {
    let (positive, _) = idle_only();
    let err = synthesize_plant(
        &positive,
        &mut TraceForest::deterministic(),
        &mut TraceForest::branching(),
        &VerifierPair::default(),
        &mut ScriptedOracle::new(vec![OracleResponse::Unsat]),
        &CegarOptions::new(1),
    )
    .unwrap_err();
    assert!(matches!(err, SynthesisError::Config(_)));
}

#[test]
fn equal_length_local_counterexample_is_folded_with_the_global_one() {
    let (positive, assignment) = idle_only();
    let mut local = TraceForest::branching();
    let mut global = TraceForest::branching();
    // Both properties reject the one-step run `$init/idle`.
    let verifiers = VerifierPair::new(
        Verifier::new(vec![never_action("idle")]),
        Verifier::new(vec![never_event(INITIAL_EVENT)]),
    );
    let options = CegarOptions {
        max_iterations: Some(1),
        ..CegarOptions::new(1)
    };

    let report = synthesize_plant(
        &positive,
        &mut local,
        &mut global,
        &verifiers,
        &mut ScriptedOracle::new(vec![OracleResponse::Sat(assignment)]),
        &options,
    )
    .unwrap();

    assert!(report.result.is_unknown());
    let iteration = &report.iterations[0];
    assert_eq!(iteration.added_local.as_ref().map(|ce| ce.len()), Some(1));
    assert_eq!(iteration.added_global.as_ref().map(|ce| ce.len()), Some(1));
    let entry = Scenario::new().step(INITIAL_EVENT, "idle");
    assert!(local.contains(&entry));
    assert!(global.contains(&entry));
}

#[test]
fn longer_local_counterexample_is_left_to_the_global_one() {
    let (positive, assignment) = idle_loop();
    let mut local = TraceForest::branching();
    let mut global = TraceForest::branching();
    // Local: `$init/idle go/idle` (2 steps). Global: `$init/idle` (1 step).
    let verifiers = VerifierPair::new(
        Verifier::new(vec![never_event("go")]),
        Verifier::new(vec![never_action("idle")]),
    );
    let options = CegarOptions {
        max_iterations: Some(1),
        ..CegarOptions::new(1)
    };

    let report = synthesize_plant(
        &positive,
        &mut local,
        &mut global,
        &verifiers,
        &mut ScriptedOracle::new(vec![OracleResponse::Sat(assignment)]),
        &options,
    )
    .unwrap();

    let iteration = &report.iterations[0];
    assert!(iteration.added_local.is_none());
    assert_eq!(iteration.added_global.as_ref().map(|ce| ce.len()), Some(1));
    assert_eq!(local.trace_count(), 0);
    assert_eq!(global.trace_count(), 1);
    assert_eq!(iteration.local_forest_size, 0);
    assert_eq!(iteration.global_forest_size, 1);
}
