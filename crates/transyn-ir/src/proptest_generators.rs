//! Proptest strategies for small Mealy automata and the traces they produce.

use proptest::prelude::*;

use crate::actions::ActionSet;
use crate::guard::Guard;
use crate::mealy::MealyAutomaton;
use crate::scenario::{Scenario, TraceStep};

/// Event alphabet of generated automata.
pub const EVENTS: [&str; 2] = ["a", "b"];
/// Action sets emitted by generated transitions.
pub const ACTION_SETS: [&str; 3] = ["", "z1", "z2"];

/// Strategy for a complete deterministic Mealy automaton with
/// `1..=max_states` states over [`EVENTS`].
pub fn arb_mealy_automaton(max_states: usize) -> impl Strategy<Value = MealyAutomaton> {
    (1..=max_states.max(1)).prop_flat_map(|size| {
        let cells = size * EVENTS.len();
        proptest::collection::vec((0..size, 0..ACTION_SETS.len()), cells..=cells).prop_map(
            move |table| {
                let mut automaton = MealyAutomaton::new(size);
                for (cell, (dst, actions)) in table.into_iter().enumerate() {
                    automaton
                        .add_transition(
                            cell / EVENTS.len(),
                            EVENTS[cell % EVENTS.len()],
                            Guard::True,
                            ActionSet::parse(ACTION_SETS[actions]),
                            dst,
                        )
                        .expect("each (state, event) cell is generated once");
                }
                automaton
            },
        )
    })
}

/// Run `automaton` on a word of event indices and record the trace.
pub fn record_trace(automaton: &MealyAutomaton, word: &[usize]) -> Scenario {
    let mut state = automaton.initial_state();
    let mut scenario = Scenario::new();
    for &index in word {
        let event = EVENTS[index % EVENTS.len()];
        let Some(t) = automaton.transition(state, event, &Guard::True) else {
            break;
        };
        scenario.push(TraceStep::new(event, t.actions.clone()));
        state = t.dst;
    }
    scenario
}

/// Strategy for an automaton together with 1 to 4 traces it produces.
pub fn arb_mealy_with_traces(
    max_states: usize,
) -> impl Strategy<Value = (MealyAutomaton, Vec<Scenario>)> {
    arb_mealy_automaton(max_states)
        .prop_flat_map(|automaton| {
            let words = proptest::collection::vec(
                proptest::collection::vec(0..EVENTS.len(), 1..=6),
                1..=4,
            );
            (Just(automaton), words)
        })
        .prop_map(|(automaton, words)| {
            let traces = words
                .iter()
                .map(|word| record_trace(&automaton, word))
                .collect();
            (automaton, traces)
        })
}
