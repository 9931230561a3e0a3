#![allow(dead_code)]

use transyn_engine::pipeline::SynthesisOptions;
use transyn_engine::verifier::{PropFormula, Property};
use transyn_ir::{ActionSet, Guard, MealyAutomaton, Scenario, TraceForest};

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A trace from `event/actions` pairs, e.g. `trace(&[("a", ""), ("b", "z1")])`.
pub fn trace(steps: &[(&str, &str)]) -> Scenario {
    steps
        .iter()
        .fold(Scenario::new(), |scenario, (event, actions)| scenario.step(event, actions))
}

pub fn deterministic_forest(traces: &[Scenario]) -> TraceForest {
    TraceForest::from_scenarios(traces).unwrap_or_else(|e| panic!("inconsistent traces: {e}"))
}

pub fn branching_forest(traces: &[Scenario]) -> TraceForest {
    let mut forest = TraceForest::branching();
    for trace in traces {
        forest
            .insert(trace)
            .unwrap_or_else(|e| panic!("rejected trace {trace}: {e}"));
    }
    forest
}

pub fn options(size: usize) -> SynthesisOptions {
    SynthesisOptions {
        size,
        max_size: size,
        ..SynthesisOptions::default()
    }
}

pub fn never_action(action: &str) -> Property {
    Property::never(format!("never-{action}"), PropFormula::was_action(action))
}

/// Add an unguarded transition, panicking on duplicates.
pub fn edge(automaton: &mut MealyAutomaton, src: usize, event: &str, actions: &str, dst: usize) {
    automaton
        .add_transition(src, event, Guard::True, ActionSet::parse(actions), dst)
        .unwrap_or_else(|e| panic!("bad transition: {e}"));
}
