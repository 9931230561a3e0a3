//! Exact synthesis of Mealy automata by backtracking over a trace forest.
//!
//! The search maps every tree node to an automaton state, starting with the
//! root on state 0. Each decision picks the destination of the first
//! undecided frontier group, adds the transitions it implies and
//! propagates them through the forest. Four variants share the engine:
//!
//! - [`SearchVariant::Ordinary`]: one decision per tree edge; partial
//!   automata are pruned by the verifier and completed at the end.
//! - [`SearchVariant::MultiEdge`]: edges of one event-set step are decided
//!   together.
//! - [`SearchVariant::WeakCompleteness`]: like `MultiEdge`, accepting any
//!   automaton that is weakly complete over the event extensions.
//! - [`SearchVariant::ErrorTolerant`]: action mismatches are recorded as
//!   weighted votes and the majority wins, within an error bound.

mod frontier;
mod tolerant;
mod weak;

pub use weak::EventExtensions;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use transyn_ir::{
    ActionSet, CompletenessPolicy, Guard, MealyAutomaton, NodeId, StateId, TraceForest,
};

use crate::completion::AutomatonCompleter;
use crate::pipeline::SynthesisError;
use crate::result::SearchOutcome;
use crate::timeout::deadline_exceeded;
use crate::verifier::Verifier;
use frontier::PendingGroup;
use tolerant::{TransitionKey, VoteBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchVariant {
    #[default]
    Ordinary,
    MultiEdge,
    WeakCompleteness,
    ErrorTolerant,
}

impl SearchVariant {
    fn groups_event_sets(self) -> bool {
        matches!(self, SearchVariant::MultiEdge | SearchVariant::WeakCompleteness)
    }

    fn verifies_partial(self) -> bool {
        matches!(self, SearchVariant::Ordinary | SearchVariant::MultiEdge)
    }

    fn tolerates_mismatches(self) -> bool {
        self == SearchVariant::ErrorTolerant
    }
}

#[derive(Debug, Clone)]
pub struct BacktrackingOptions {
    pub size: usize,
    pub variant: SearchVariant,
    pub completeness: CompletenessPolicy,
    pub deadline: Option<Instant>,
    /// Forbid using state `k` before state `k - 1` has an incoming transition.
    /// Ignored when a property refers to states by number.
    pub symmetry_breaking: bool,
    /// Events used to complete the automaton. Empty means the forest's events.
    pub events: Vec<String>,
    pub event_extensions: EventExtensions,
    pub error_bound: usize,
}

impl BacktrackingOptions {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            variant: SearchVariant::Ordinary,
            completeness: CompletenessPolicy::Normal,
            deadline: None,
            symmetry_breaking: true,
            events: Vec::new(),
            event_extensions: EventExtensions::new(),
            error_bound: 0,
        }
    }
}

/// Changes made by one decision, reverted when the branch fails.
#[derive(Debug, Default)]
struct Undo {
    colored: Vec<NodeId>,
    transitions: Vec<(StateId, String, Guard, StateId)>,
    votes: Vec<(TransitionKey, ActionSet, usize)>,
}

struct Search<'a> {
    forest: &'a TraceForest,
    verifier: &'a Verifier,
    options: &'a BacktrackingOptions,
    events: Vec<String>,
    automaton: MealyAutomaton,
    coloring: Vec<Option<StateId>>,
    symmetry_breaking: bool,
    incoming: Vec<usize>,
    /// Traces ending in each node's subtree; error-tolerant vote weights.
    weights: Vec<usize>,
    votes: VoteBook,
    decisions: usize,
}

impl<'a> Search<'a> {
    fn new(
        forest: &'a TraceForest,
        verifier: &'a Verifier,
        options: &'a BacktrackingOptions,
    ) -> Self {
        let events = if options.events.is_empty() {
            forest.events().into_iter().collect()
        } else {
            options.events.clone()
        };
        let weights = if options.variant.tolerates_mismatches() {
            subtree_trace_counts(forest)
        } else {
            Vec::new()
        };
        // Relabeling states may change the verdict of such properties.
        let symmetry_breaking = options.symmetry_breaking && !verifier.mentions_states();
        if options.symmetry_breaking && !symmetry_breaking {
            debug!("Symmetry breaking disabled: a property names automaton states");
        }
        Self {
            forest,
            verifier,
            options,
            events,
            automaton: MealyAutomaton::new(options.size),
            coloring: vec![None; forest.node_count()],
            symmetry_breaking,
            incoming: vec![0; options.size],
            weights,
            votes: VoteBook::default(),
            decisions: 0,
        }
    }

    fn run(&mut self) -> Result<SearchOutcome<MealyAutomaton>, SynthesisError> {
        let root = self.forest.root();
        let initial = self.automaton.initial_state();
        self.coloring[root] = Some(initial);
        let mut undo = Undo::default();
        let outcome = match self.recompute(&[], vec![(root, initial)], &mut undo) {
            Some(frontier) => self.search(frontier)?,
            None => SearchOutcome::Exhausted,
        };
        self.rollback(undo);
        self.coloring[root] = None;
        Ok(outcome)
    }

    fn search(
        &mut self,
        frontier: Vec<PendingGroup>,
    ) -> Result<SearchOutcome<MealyAutomaton>, SynthesisError> {
        if deadline_exceeded(self.options.deadline) {
            return Ok(SearchOutcome::TimedOut);
        }
        let Some(chosen) = frontier.first() else {
            return Ok(self.finish());
        };
        let forest = self.forest;
        for dst in 0..self.options.size {
            if self.symmetry_breaking && dst >= 2 && self.incoming[dst - 1] == 0 {
                break;
            }
            self.decisions += 1;
            let mut undo = Undo::default();
            for &e in &chosen.edges {
                let edge = forest.edge(e);
                self.automaton.add_transition(
                    chosen.state,
                    edge.event.clone(),
                    edge.guard.clone(),
                    edge.actions.clone(),
                    dst,
                )?;
                self.incoming[dst] += 1;
                undo.transitions
                    .push((chosen.state, edge.event.clone(), edge.guard.clone(), dst));
            }
            let outcome = match self.recompute(&frontier, Vec::new(), &mut undo) {
                Some(next) if self.partial_holds() => self.search(next)?,
                _ => SearchOutcome::Exhausted,
            };
            self.rollback(undo);
            if !matches!(outcome, SearchOutcome::Exhausted) {
                return Ok(outcome);
            }
        }
        Ok(SearchOutcome::Exhausted)
    }

    fn partial_holds(&self) -> bool {
        !self.options.variant.verifies_partial()
            || self.verifier.is_empty()
            || self.verifier.verify(&self.automaton).holds()
    }

    /// Every tree edge is consistent with the automaton; apply the
    /// variant's acceptance condition.
    fn finish(&mut self) -> SearchOutcome<MealyAutomaton> {
        match self.options.variant {
            SearchVariant::Ordinary | SearchVariant::MultiEdge => {
                let completer = AutomatonCompleter::new(
                    self.verifier,
                    self.events.clone(),
                    self.options.completeness,
                )
                .with_action_candidates(self.forest.observed_action_sets())
                .with_deadline(self.options.deadline);
                completer.complete(&mut self.automaton)
            }
            SearchVariant::WeakCompleteness => {
                if self.options.event_extensions.is_weakly_complete(&self.automaton) {
                    SearchOutcome::Found(self.automaton.clone())
                } else {
                    SearchOutcome::Exhausted
                }
            }
            SearchVariant::ErrorTolerant => {
                if self.votes.errors() > self.options.error_bound {
                    return SearchOutcome::Exhausted;
                }
                let mut automaton = self.automaton.clone();
                self.votes.apply(&mut automaton);
                if self.options.event_extensions.is_weakly_complete(&automaton) {
                    debug!(errors = self.votes.errors(), "Accepted automaton by majority vote");
                    SearchOutcome::Found(automaton)
                } else {
                    SearchOutcome::Exhausted
                }
            }
        }
    }

    fn rollback(&mut self, undo: Undo) {
        for node in undo.colored {
            self.coloring[node] = None;
        }
        for (state, event, guard, dst) in undo.transitions.into_iter().rev() {
            self.automaton.remove_transition(state, &event, &guard);
            self.incoming[dst] -= 1;
        }
        for (key, actions, weight) in undo.votes.into_iter().rev() {
            self.votes.remove(&key, &actions, weight);
        }
    }
}

/// Number of trace ends in the subtree below each node, the node included.
fn subtree_trace_counts(forest: &TraceForest) -> Vec<usize> {
    let mut counts: Vec<usize> = forest.nodes().iter().map(|n| usize::from(n.terminal)).collect();
    // Children are always created after their parents.
    for node in (0..forest.node_count()).rev() {
        let below: usize = forest
            .grouped_outgoing(node)
            .iter()
            .map(|(child, _)| counts[*child])
            .sum();
        counts[node] += below;
    }
    counts
}

/// Search for an automaton with `options.size` states consistent with every
/// trace in `forest` and satisfying every property of `verifier`.
pub fn synthesize_backtracking(
    forest: &TraceForest,
    verifier: &Verifier,
    options: &BacktrackingOptions,
) -> Result<SearchOutcome<MealyAutomaton>, SynthesisError> {
    if options.size == 0 {
        return Err(SynthesisError::Config("automaton size must be at least 1".into()));
    }
    info!(
        size = options.size,
        variant = ?options.variant,
        tree_nodes = forest.node_count(),
        "Starting backtracking search"
    );
    let mut search = Search::new(forest, verifier, options);
    let outcome = search.run()?;
    info!(
        size = options.size,
        decisions = search.decisions,
        found = outcome.is_found(),
        timed_out = matches!(outcome, SearchOutcome::TimedOut),
        "Backtracking search finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transyn_ir::Scenario;

    fn forest(traces: &[Scenario]) -> TraceForest {
        TraceForest::from_scenarios(traces).unwrap()
    }

    #[test]
    fn subtree_counts_sum_trace_ends() {
        let f = forest(&[
            Scenario::new().step("a", "").step("b", "z1"),
            Scenario::new().step("a", "").step("c", ""),
        ]);
        let counts = subtree_trace_counts(&f);
        assert_eq!(counts[f.root()], 2);
        assert_eq!(counts[f.edge(0).dst], 2);
    }

    #[test]
    fn single_state_loop_is_found() {
        let f = forest(&[Scenario::new().step("a", "z1").step("a", "z1")]);
        let options = BacktrackingOptions::new(1);
        let outcome = synthesize_backtracking(&f, &Verifier::default(), &options).unwrap();
        let SearchOutcome::Found(a) = outcome else {
            panic!("expected an automaton");
        };
        assert_eq!(a.transition(0, "a", &Guard::True).map(|t| t.dst), Some(0));
    }

    #[test]
    fn conflicting_outputs_need_two_states() {
        let f = forest(&[Scenario::new().step("a", "z1").step("a", "z2")]);
        let verifier = Verifier::default();
        let one = synthesize_backtracking(&f, &verifier, &BacktrackingOptions::new(1)).unwrap();
        assert_eq!(one, SearchOutcome::Exhausted);
        let two = synthesize_backtracking(&f, &verifier, &BacktrackingOptions::new(2)).unwrap();
        assert!(two.is_found());
    }

    #[test]
    fn zero_size_is_a_config_error() {
        let err = synthesize_backtracking(
            &TraceForest::deterministic(),
            &Verifier::default(),
            &BacktrackingOptions::new(0),
        )
        .unwrap_err();
        assert!(matches!(err, SynthesisError::Config(_)));
    }

    #[test]
    fn expired_deadline_times_out() {
        let f = forest(&[Scenario::new().step("a", "z1")]);
        let options = BacktrackingOptions {
            deadline: Some(Instant::now()),
            ..BacktrackingOptions::new(2)
        };
        let outcome = synthesize_backtracking(&f, &Verifier::default(), &options).unwrap();
        assert_eq!(outcome, SearchOutcome::TimedOut);
    }
}
