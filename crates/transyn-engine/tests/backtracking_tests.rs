mod common;
use common::*;

use transyn_engine::backtracking::SearchVariant;
use transyn_engine::pipeline::{synthesize, synthesize_minimal, verify, SynthesisOptions};
use transyn_engine::result::SynthesisResult;
use transyn_engine::verifier::{PropFormula, Property};
use transyn_ir::{ActionSet, CompletenessPolicy, Guard, Scenario, TraceStep};

#[test]
fn alternating_outputs_need_two_states() {
    init_tracing();
    let traces = [trace(&[("a", "z1"), ("a", "z2"), ("a", "z1"), ("a", "z2")])];
    let forest = deterministic_forest(&traces);

    assert!(synthesize(&forest, &[], &options(1)).unwrap().is_not_found());

    let automaton = synthesize_minimal(&forest, &[], &options(4))
        .unwrap()
        .found()
        .expect("two states suffice");
    assert_eq!(automaton.size(), 2);
    assert!(automaton.complies_with(&traces[0]));
}

#[test]
fn completion_is_steered_by_properties() {
    // Event `b` is never observed, so only completion defines it.
    let traces = [trace(&[("a", "z1")])];
    let forest = deterministic_forest(&traces);
    let properties = vec![Property::never(
        "b-leaves-initial",
        PropFormula::and(vec![PropFormula::was_event("b"), PropFormula::is_in_state(0)]),
    )];
    let opts = SynthesisOptions {
        events: vec!["a".into(), "b".into()],
        ..options(3)
    };

    let one = SynthesisOptions { size: 1, ..opts.clone() };
    assert!(synthesize(&forest, &properties, &one).unwrap().is_not_found());

    let automaton = synthesize_minimal(&forest, &properties, &opts)
        .unwrap()
        .found()
        .expect("two states suffice");
    assert_eq!(automaton.size(), 2);
    assert!(verify(&automaton, &properties).holds());
    for state in 0..automaton.size() {
        for event in ["a", "b"] {
            assert!(automaton.has_event(state, event));
        }
    }
}

#[test]
fn no_dead_ends_accepts_partial_automata() {
    let traces = [trace(&[("a", ""), ("b", "z1")])];
    let forest = deterministic_forest(&traces);
    let opts = SynthesisOptions {
        completeness: CompletenessPolicy::NoDeadEnds,
        ..options(2)
    };
    let automaton = synthesize(&forest, &[], &opts)
        .unwrap()
        .found()
        .expect("two states suffice");
    for state in 0..automaton.size() {
        assert!(!automaton.transitions(state).is_empty());
    }
    assert!(automaton.complies_with(&traces[0]));
}

#[test]
fn multi_edge_steps_share_one_destination() {
    let mut traces = vec![Scenario::new()];
    traces[0].push(TraceStep::with_events(["a", "b"], ActionSet::parse("z1")));
    traces[0].push(TraceStep::new("a", ActionSet::parse("z2")));
    let forest = deterministic_forest(&traces);

    for variant in [SearchVariant::Ordinary, SearchVariant::MultiEdge] {
        let opts = SynthesisOptions {
            variant,
            ..options(2)
        };
        assert!(synthesize(&forest, &[], &SynthesisOptions { size: 1, ..opts.clone() })
            .unwrap()
            .is_not_found());
        let automaton = synthesize(&forest, &[], &opts)
            .unwrap()
            .found()
            .expect("two states suffice");
        let via_a = automaton.transition(0, "a", &Guard::True).map(|t| t.dst);
        let via_b = automaton.transition(0, "b", &Guard::True).map(|t| t.dst);
        assert_eq!(via_a, via_b);
        assert!(automaton.complies_with(&traces[0]));
    }
}

#[test]
fn multi_edge_event_sets_conflict_when_partially_defined() {
    let mut traces = vec![Scenario::new()];
    traces[0].push(TraceStep::with_events(["A0"], ActionSet::parse("z1")));
    traces[0].push(TraceStep::with_events(["A0", "A1"], ActionSet::parse("z1")));
    let forest = deterministic_forest(&traces);

    // A0 is already defined when {A0, A1} is reached, so A1 cannot join it.
    let multi = SynthesisOptions {
        variant: SearchVariant::MultiEdge,
        ..options(1)
    };
    assert!(synthesize(&forest, &[], &multi).unwrap().is_not_found());

    let ordinary = SynthesisOptions {
        variant: SearchVariant::Ordinary,
        ..options(1)
    };
    let automaton = synthesize(&forest, &[], &ordinary)
        .unwrap()
        .found()
        .expect("edges are placed one at a time");
    assert!(automaton.complies_with(&traces[0]));
}

#[test]
fn weak_completeness_rejects_half_defined_abstract_events() {
    let opts = SynthesisOptions {
        variant: SearchVariant::WeakCompleteness,
        events: vec!["A0".into(), "A1".into()],
        extension_variables: 1,
        ..options(1)
    };

    let half = deterministic_forest(&[trace(&[("A0", "z1")])]);
    assert!(synthesize(&half, &[], &opts).unwrap().is_not_found());

    let full = deterministic_forest(&[trace(&[("A0", "z1")]), trace(&[("A1", "z1")])]);
    let automaton = synthesize(&full, &[], &opts)
        .unwrap()
        .found()
        .expect("both extensions observed");
    assert!(automaton.has_event(0, "A0"));
    assert!(automaton.has_event(0, "A1"));

    // The ordinary search completes the missing extension instead.
    let ordinary = SynthesisOptions {
        variant: SearchVariant::Ordinary,
        ..opts
    };
    assert!(synthesize(&half, &[], &ordinary).unwrap().found().is_some());
}

#[test]
fn error_tolerant_search_takes_the_weighted_majority() {
    let traces = [
        trace(&[("a", "z1"), ("b", "")]),
        trace(&[("a", "z1"), ("c", "")]),
        trace(&[("a", "z2")]),
    ];
    let forest = branching_forest(&traces);
    let tolerant = SynthesisOptions {
        variant: SearchVariant::ErrorTolerant,
        error_bound: 1,
        ..options(1)
    };
    let automaton = synthesize(&forest, &[], &tolerant)
        .unwrap()
        .found()
        .expect("one mismatch is tolerated");
    let actions = automaton.transition(0, "a", &Guard::True).map(|t| t.actions.clone());
    assert_eq!(actions, Some(ActionSet::parse("z1")));
    let missed: usize = traces.iter().map(|t| automaton.missed_actions(t)).sum();
    assert_eq!(missed, 1);

    let strict = SynthesisOptions {
        error_bound: 0,
        ..tolerant
    };
    assert_eq!(synthesize(&forest, &[], &strict).unwrap(), SynthesisResult::NotFound);
}

#[test]
fn symmetry_breaking_does_not_change_the_answer() {
    let traces = [
        trace(&[("a", ""), ("a", "z1")]),
        trace(&[("b", ""), ("a", "z2")]),
    ];
    let forest = deterministic_forest(&traces);
    for size in 1..=3 {
        let on = synthesize(&forest, &[], &options(size)).unwrap();
        let off = synthesize(
            &forest,
            &[],
            &SynthesisOptions {
                symmetry_breaking: false,
                ..options(size)
            },
        )
        .unwrap();
        assert_eq!(on.found().is_some(), off.found().is_some(), "size {size}");
    }
}

#[test]
fn symmetry_breaking_is_skipped_for_properties_naming_states() {
    let traces = [trace(&[("a", "z1"), ("a", "z2")])];
    let forest = deterministic_forest(&traces);
    let avoid_one = Property::never("avoid-1", PropFormula::is_in_state(1));
    for symmetry_breaking in [true, false] {
        let opts = SynthesisOptions {
            symmetry_breaking,
            ..options(3)
        };
        let automaton = synthesize(&forest, &[avoid_one.clone()], &opts)
            .unwrap()
            .found()
            .unwrap_or_else(|| panic!("states 0 and 2 suffice (symmetry {symmetry_breaking})"));
        assert!(automaton.complies_with(&traces[0]));
        assert!(verify(&automaton, &[avoid_one.clone()]).holds());
    }
}

#[test]
fn never_action_blocks_observed_output() {
    let forest = deterministic_forest(&[trace(&[("a", "bad")])]);
    let result = synthesize_minimal(&forest, &[never_action("bad")], &options(3)).unwrap();
    assert!(result.is_not_found());
}
