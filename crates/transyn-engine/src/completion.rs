//! Completion of partially defined automata under temporal properties.

use std::time::Instant;

use tracing::debug;
use transyn_ir::{ActionSet, CompletenessPolicy, Guard, MealyAutomaton, StateId};

use crate::result::SearchOutcome;
use crate::timeout::deadline_exceeded;
use crate::verifier::Verifier;

/// Adds unguarded transitions to an automaton until it satisfies the
/// completeness policy, keeping every intermediate automaton verified.
#[derive(Debug)]
pub struct AutomatonCompleter<'a> {
    verifier: &'a Verifier,
    events: Vec<String>,
    policy: CompletenessPolicy,
    action_candidates: Vec<ActionSet>,
    deadline: Option<Instant>,
}

impl<'a> AutomatonCompleter<'a> {
    pub fn new(verifier: &'a Verifier, events: Vec<String>, policy: CompletenessPolicy) -> Self {
        Self {
            verifier,
            events,
            policy,
            action_candidates: vec![ActionSet::new()],
            deadline: None,
        }
    }

    /// Action sets tried on each added transition, after the empty set.
    pub fn with_action_candidates(
        mut self,
        candidates: impl IntoIterator<Item = ActionSet>,
    ) -> Self {
        for actions in candidates {
            if !self.action_candidates.contains(&actions) {
                self.action_candidates.push(actions);
            }
        }
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Search for a completion of `automaton`.
    ///
    /// `automaton` is restored before returning; a completion is returned
    /// as a separate copy.
    pub fn complete(&self, automaton: &mut MealyAutomaton) -> SearchOutcome<MealyAutomaton> {
        if !self.verifier.verify(automaton).holds() {
            return SearchOutcome::Exhausted;
        }
        self.extend(automaton)
    }

    /// The first undefined state together with the events that may fill it.
    fn next_gap(&self, automaton: &MealyAutomaton) -> Option<(StateId, Vec<&str>)> {
        match self.policy {
            CompletenessPolicy::Normal => (0..automaton.size()).find_map(|state| {
                self.events
                    .iter()
                    .find(|e| !automaton.has_event(state, e))
                    .map(|e| (state, vec![e.as_str()]))
            }),
            CompletenessPolicy::NoDeadEnds => (0..automaton.size())
                .find(|&state| automaton.transitions(state).is_empty())
                .map(|state| (state, self.events.iter().map(String::as_str).collect())),
        }
    }

    fn extend(&self, automaton: &mut MealyAutomaton) -> SearchOutcome<MealyAutomaton> {
        if deadline_exceeded(self.deadline) {
            return SearchOutcome::TimedOut;
        }
        let Some((state, events)) = self.next_gap(automaton) else {
            return SearchOutcome::Found(automaton.clone());
        };
        for event in events {
            for dst in 0..automaton.size() {
                for actions in &self.action_candidates {
                    if automaton
                        .add_transition(state, event, Guard::True, actions.clone(), dst)
                        .is_err()
                    {
                        continue;
                    }
                    let outcome = if self.verifier.verify(automaton).holds() {
                        self.extend(automaton)
                    } else {
                        SearchOutcome::Exhausted
                    };
                    automaton.remove_transition(state, event, &Guard::True);
                    if !matches!(outcome, SearchOutcome::Exhausted) {
                        return outcome;
                    }
                }
            }
        }
        debug!(state, "No verified completion for state");
        SearchOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::{PropFormula, Property};

    fn partial() -> MealyAutomaton {
        let mut a = MealyAutomaton::new(2);
        a.add_transition(0, "a", Guard::True, ActionSet::new(), 1).unwrap();
        a
    }

    #[test]
    fn completion_defines_every_pair_and_leaves_input_untouched() {
        let verifier = Verifier::default();
        let completer = AutomatonCompleter::new(
            &verifier,
            vec!["a".into(), "b".into()],
            CompletenessPolicy::Normal,
        );
        let mut a = partial();
        let completed = completer.complete(&mut a);
        let SearchOutcome::Found(completed) = completed else {
            panic!("expected a completion");
        };
        assert_eq!(completed.transition_count(), 4);
        assert_eq!(a, partial());
    }

    #[test]
    fn no_dead_ends_only_needs_one_transition_per_state() {
        let verifier = Verifier::default();
        let completer = AutomatonCompleter::new(
            &verifier,
            vec!["a".into(), "b".into()],
            CompletenessPolicy::NoDeadEnds,
        );
        let SearchOutcome::Found(completed) = completer.complete(&mut partial()) else {
            panic!("expected a completion");
        };
        assert_eq!(completed.transition_count(), 2);
        assert!(!completed.transitions(1).is_empty());
    }

    #[test]
    fn completion_respects_properties() {
        // State 1 may only loop through `a` without ever returning to 0.
        let verifier = Verifier::new(vec![Property::never(
            "stay-in-1",
            PropFormula::and(vec![PropFormula::was_in_state(1), PropFormula::is_in_state(0)]),
        )]);
        let completer =
            AutomatonCompleter::new(&verifier, vec!["a".into()], CompletenessPolicy::Normal);
        let SearchOutcome::Found(completed) = completer.complete(&mut partial()) else {
            panic!("expected a completion");
        };
        assert_eq!(completed.transition(1, "a", &Guard::True).map(|t| t.dst), Some(1));
    }

    #[test]
    fn violated_input_cannot_be_completed() {
        let verifier = Verifier::new(vec![Property::never("no-a", PropFormula::was_event("a"))]);
        let completer =
            AutomatonCompleter::new(&verifier, vec!["a".into()], CompletenessPolicy::Normal);
        assert_eq!(completer.complete(&mut partial()), SearchOutcome::Exhausted);
    }

    #[test]
    fn candidates_are_deduplicated_with_empty_set_first() {
        let verifier = Verifier::default();
        let z1 = ActionSet::parse("z1");
        let completer = AutomatonCompleter::new(&verifier, Vec::new(), CompletenessPolicy::Normal)
            .with_action_candidates([z1.clone(), ActionSet::new(), z1]);
        assert_eq!(
            completer.action_candidates,
            vec![ActionSet::new(), ActionSet::parse("z1")]
        );
    }
}
