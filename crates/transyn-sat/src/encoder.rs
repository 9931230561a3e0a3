//! Boolean encoding of plant (nondeterministic Moore) synthesis.
//!
//! Given a branching positive forest whose root edges carry
//! [`INITIAL_EVENT`], the encoding is satisfiable iff some plant with `size`
//! states replays every positive trace, meets the completeness policy, and
//! replays none of the traces stored in the negative forests.

pub mod variables;

use indexmap::IndexSet;
use tracing::debug;
use transyn_ir::{ActionSet, CompletenessPolicy, TraceForest, INITIAL_EVENT};

use crate::constraints::ConstraintSet;
use crate::terms::SatTerm;
use variables::*;

#[derive(Debug, Clone)]
pub struct PlantEncoder<'a> {
    positive: &'a TraceForest,
    negatives: Vec<&'a TraceForest>,
    size: usize,
    events: IndexSet<String>,
    actions: IndexSet<String>,
    policy: CompletenessPolicy,
    deterministic: bool,
}

impl<'a> PlantEncoder<'a> {
    /// Encoder over the events and actions observed in `positive`.
    pub fn new(positive: &'a TraceForest, size: usize) -> Self {
        Self {
            positive,
            negatives: Vec::new(),
            size,
            events: positive
                .events()
                .into_iter()
                .filter(|e| e != INITIAL_EVENT)
                .collect(),
            actions: positive.action_alphabet(),
            policy: CompletenessPolicy::Normal,
            deterministic: false,
        }
    }

    /// Extend the event alphabet beyond the observed events.
    pub fn with_events<S: Into<String>>(mut self, events: impl IntoIterator<Item = S>) -> Self {
        self.events.extend(
            events
                .into_iter()
                .map(Into::into)
                .filter(|e: &String| e != INITIAL_EVENT),
        );
        self
    }

    /// Extend the action alphabet beyond the observed actions.
    pub fn with_actions<S: Into<String>>(mut self, actions: impl IntoIterator<Item = S>) -> Self {
        self.actions.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn with_negative(mut self, forest: &'a TraceForest) -> Self {
        self.negatives.push(forest);
        self
    }

    pub fn with_policy(mut self, policy: CompletenessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Forbid two transitions leaving one state on the same event.
    pub fn with_determinism(mut self, deterministic: bool) -> Self {
        self.deterministic = deterministic;
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn events(&self) -> &IndexSet<String> {
        &self.events
    }

    pub fn actions(&self) -> &IndexSet<String> {
        &self.actions
    }

    /// Conjunction of `z` literals stating that `state` emits exactly
    /// `actions`. `None` when an action is outside the alphabet.
    fn output_term(&self, state: usize, actions: &ActionSet) -> Option<SatTerm> {
        if actions.iter().any(|a| !self.actions.contains(a)) {
            return None;
        }
        let literals = self
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| {
                let z = SatTerm::var(output_var(state, index));
                if actions.contains(action) {
                    z
                } else {
                    z.not()
                }
            })
            .collect();
        Some(SatTerm::and(literals))
    }

    pub fn encode(&self) -> ConstraintSet {
        let mut cs = ConstraintSet::new();
        self.declare_structure(&mut cs);
        self.encode_positive(&mut cs);
        self.encode_structure(&mut cs);
        for (index, forest) in self.negatives.iter().enumerate() {
            self.encode_negative(&mut cs, index, forest);
        }
        debug!(
            size = self.size,
            vars = cs.var_count(),
            assertions = cs.assertions.len(),
            negative_forests = self.negatives.len(),
            "Encoded plant constraints"
        );
        cs
    }

    fn declare_structure(&self, cs: &mut ConstraintSet) {
        for i in 0..self.size {
            cs.declare(start_var(i));
            for a in 0..self.actions.len() {
                cs.declare(output_var(i, a));
            }
            for j in 0..self.size {
                for e in 0..self.events.len() {
                    cs.declare(transition_var(i, j, e));
                }
            }
        }
    }

    fn encode_positive(&self, cs: &mut ConstraintSet) {
        let forest = self.positive;
        let root = forest.root();
        for node in 0..forest.node_count() {
            if node == root {
                continue;
            }
            let colors: Vec<SatTerm> = (0..self.size)
                .map(|i| cs.declare(color_var(node, i)))
                .collect();
            cs.assert(SatTerm::exactly_one(&colors));
        }

        let initial: Vec<usize> = forest.outgoing(root).map(|e| e.dst).collect();
        for i in 0..self.size {
            for &node in &initial {
                cs.assert(SatTerm::var(color_var(node, i)).implies(SatTerm::var(start_var(i))));
            }
            let witnesses = initial
                .iter()
                .map(|&node| SatTerm::var(color_var(node, i)))
                .collect();
            cs.assert(SatTerm::var(start_var(i)).implies(SatTerm::or(witnesses)));
        }

        for edge in forest.edges() {
            for i in 0..self.size {
                let color = SatTerm::var(color_var(edge.dst, i));
                match self.output_term(i, &edge.actions) {
                    Some(out) => cs.assert(color.implies(out)),
                    None => cs.assert(color.not()),
                }
            }
            if edge.src == root {
                continue;
            }
            let Some(event) = self.events.get_index_of(&edge.event) else {
                continue;
            };
            for i in 0..self.size {
                for j in 0..self.size {
                    let both = SatTerm::and(vec![
                        SatTerm::var(color_var(edge.src, i)),
                        SatTerm::var(color_var(edge.dst, j)),
                    ]);
                    cs.assert(both.implies(SatTerm::var(transition_var(i, j, event))));
                }
            }
        }
    }

    fn encode_structure(&self, cs: &mut ConstraintSet) {
        if self.deterministic {
            for i in 0..self.size {
                for e in 0..self.events.len() {
                    let targets: Vec<SatTerm> = (0..self.size)
                        .map(|j| SatTerm::var(transition_var(i, j, e)))
                        .collect();
                    cs.assert(SatTerm::at_most_one(&targets));
                }
            }
        }
        if self.events.is_empty() {
            return;
        }
        match self.policy {
            CompletenessPolicy::Normal => {
                for i in 0..self.size {
                    for e in 0..self.events.len() {
                        let targets = (0..self.size)
                            .map(|j| SatTerm::var(transition_var(i, j, e)))
                            .collect();
                        cs.assert(SatTerm::or(targets));
                    }
                }
            }
            CompletenessPolicy::NoDeadEnds => {
                for i in 0..self.size {
                    let mut outgoing = Vec::new();
                    for j in 0..self.size {
                        for e in 0..self.events.len() {
                            outgoing.push(SatTerm::var(transition_var(i, j, e)));
                        }
                    }
                    cs.assert(SatTerm::or(outgoing));
                }
            }
        }
    }

    fn encode_negative(&self, cs: &mut ConstraintSet, index: usize, forest: &TraceForest) {
        let root = forest.root();
        for node in 0..forest.node_count() {
            if node == root {
                continue;
            }
            for i in 0..self.size {
                cs.declare(negative_var(index, node, i));
            }
        }
        for edge in forest.edges() {
            if edge.src == root {
                if edge.event != INITIAL_EVENT {
                    continue;
                }
                for i in 0..self.size {
                    let Some(out) = self.output_term(i, &edge.actions) else {
                        continue;
                    };
                    let premise = SatTerm::and(vec![SatTerm::var(start_var(i)), out]);
                    cs.assert(premise.implies(SatTerm::var(negative_var(index, edge.dst, i))));
                }
                continue;
            }
            let Some(event) = self.events.get_index_of(&edge.event) else {
                continue;
            };
            for i in 0..self.size {
                let Some(out) = self.output_term(i, &edge.actions) else {
                    continue;
                };
                for j in 0..self.size {
                    let premise = SatTerm::and(vec![
                        SatTerm::var(negative_var(index, edge.src, j)),
                        SatTerm::var(transition_var(j, i, event)),
                        out.clone(),
                    ]);
                    cs.assert(premise.implies(SatTerm::var(negative_var(index, edge.dst, i))));
                }
            }
        }
        for (node, tree_node) in forest.nodes().iter().enumerate() {
            if node == root || !tree_node.terminal {
                continue;
            }
            for i in 0..self.size {
                cs.assert(SatTerm::var(negative_var(index, node, i)).not());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::z3_backend::Z3Oracle;
    use crate::solver::{OracleResponse, SatOracle};
    use transyn_ir::Scenario;

    fn positive() -> TraceForest {
        let mut forest = TraceForest::branching();
        forest
            .insert(
                &Scenario::new()
                    .step(INITIAL_EVENT, "low")
                    .step("up", "high")
                    .step("down", "low"),
            )
            .unwrap();
        forest
    }

    fn solve(cs: &ConstraintSet) -> OracleResponse {
        Z3Oracle::new().solve(cs, None).unwrap()
    }

    #[test]
    fn alphabets_come_from_positive_forest() {
        let forest = positive();
        let encoder = PlantEncoder::new(&forest, 2).with_events(["reset"]);
        assert_eq!(
            encoder.events().iter().collect::<Vec<_>>(),
            vec!["up", "down", "reset"]
        );
        assert_eq!(encoder.actions().iter().collect::<Vec<_>>(), vec!["low", "high"]);
    }

    #[test]
    fn two_distinct_outputs_need_two_states() {
        let forest = positive();
        let one = PlantEncoder::new(&forest, 1).encode();
        assert_eq!(solve(&one), OracleResponse::Unsat);
        let two = PlantEncoder::new(&forest, 2).encode();
        match solve(&two) {
            OracleResponse::Sat(model) => assert!(two.is_satisfied_by(&model)),
            other => panic!("expected SAT, got {other:?}"),
        }
    }

    #[test]
    fn negative_trace_excludes_replaying_plants() {
        let forest = positive();
        let mut negative = TraceForest::branching();
        negative
            .insert(&Scenario::new().step(INITIAL_EVENT, "low").step("down", "low"))
            .unwrap();
        let cs = PlantEncoder::new(&forest, 2)
            .with_negative(&negative)
            .with_policy(CompletenessPolicy::Normal)
            .encode();
        // `down` from the low start state must now lead to the high state.
        match solve(&cs) {
            OracleResponse::Sat(model) => {
                assert!(cs.is_satisfied_by(&model));
                let low_start = (0..2)
                    .find(|&i| model.get(&start_var(i)) == Some(true))
                    .expect("one start state");
                let down = 1;
                assert_eq!(model.get(&transition_var(low_start, low_start, down)), Some(false));
            }
            other => panic!("expected SAT, got {other:?}"),
        }
    }
}
