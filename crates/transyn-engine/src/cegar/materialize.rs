//! Decoding of a satisfying assignment into a plant.

use std::collections::HashSet;

use transyn_ir::{ActionSet, CompletenessPolicy, NondetMooreAutomaton, StateId, TraceForest};
use transyn_sat::encoder::variables::{color_var, output_var, start_var, transition_var};
use transyn_sat::{Assignment, PlantEncoder};

use crate::pipeline::SynthesisError;

fn is_true(assignment: &Assignment, name: &str) -> bool {
    assignment.get(name).unwrap_or(false)
}

/// Build the plant described by `assignment`.
///
/// Transitions not taken by any positive trace are dropped, except the first
/// one needed to keep the completeness policy satisfied.
pub fn materialize_plant(
    assignment: &Assignment,
    encoder: &PlantEncoder<'_>,
    positive: &TraceForest,
    policy: CompletenessPolicy,
) -> Result<NondetMooreAutomaton, SynthesisError> {
    let size = encoder.size();
    let root = positive.root();

    let mut coloring: Vec<Option<StateId>> = vec![None; positive.node_count()];
    for (node, color) in coloring.iter_mut().enumerate() {
        if node == root {
            continue;
        }
        let states: Vec<StateId> = (0..size)
            .filter(|&i| is_true(assignment, &color_var(node, i)))
            .collect();
        match states.as_slice() {
            [state] => *color = Some(*state),
            _ => {
                return Err(SynthesisError::InvalidAssignment(format!(
                    "tree node {node} has {} colors",
                    states.len()
                )))
            }
        }
    }

    let actions: Vec<ActionSet> = (0..size)
        .map(|i| {
            encoder
                .actions()
                .iter()
                .enumerate()
                .filter(|(a, _)| is_true(assignment, &output_var(i, *a)))
                .map(|(_, action)| action.clone())
                .collect()
        })
        .collect();
    let start: Vec<bool> = (0..size)
        .map(|i| is_true(assignment, &start_var(i)))
        .collect();

    let mut used: HashSet<(StateId, usize, StateId)> = HashSet::new();
    for edge in positive.edges() {
        let Some(dst) = coloring[edge.dst] else {
            continue;
        };
        if actions[dst] != edge.actions {
            return Err(SynthesisError::InvalidAssignment(format!(
                "state {dst} emits '{}' but a trace expects '{}'",
                actions[dst], edge.actions
            )));
        }
        let event = encoder.events().get_index_of(&edge.event);
        let (Some(src), Some(event)) = (coloring[edge.src], event) else {
            continue;
        };
        used.insert((src, event, dst));
    }

    let mut plant = NondetMooreAutomaton::new(actions, start);
    let events = encoder.events();
    for i in 0..size {
        let mut kept_any = false;
        for (e, event) in events.iter().enumerate() {
            let mut first = None;
            let mut kept_event = false;
            for j in 0..size {
                if !is_true(assignment, &transition_var(i, j, e)) {
                    continue;
                }
                first.get_or_insert(j);
                if used.contains(&(i, e, j)) {
                    plant.add_transition(i, event.clone(), j)?;
                    kept_event = true;
                }
            }
            if !kept_event && policy == CompletenessPolicy::Normal {
                if let Some(j) = first {
                    plant.add_transition(i, event.clone(), j)?;
                    kept_event = true;
                }
            }
            kept_any |= kept_event;
        }
        if !kept_any && policy == CompletenessPolicy::NoDeadEnds {
            let fallback = events.iter().enumerate().find_map(|(e, event)| {
                (0..size)
                    .find(|&j| is_true(assignment, &transition_var(i, j, e)))
                    .map(|j| (event.clone(), j))
            });
            if let Some((event, j)) = fallback {
                plant.add_transition(i, event, j)?;
            }
        }
    }
    Ok(plant)
}
