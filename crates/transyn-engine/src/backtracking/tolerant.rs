//! Majority voting over the action sets observed on each transition.

use std::collections::HashMap;

use transyn_ir::{ActionSet, Guard, MealyAutomaton, StateId};

pub(super) type TransitionKey = (StateId, String, Guard);

/// Weighted action-set tallies per transition. The error count of a
/// transition is the weight of every vote that disagrees with its majority.
#[derive(Debug, Default)]
pub(super) struct VoteBook {
    tallies: HashMap<TransitionKey, HashMap<ActionSet, usize>>,
    errors: usize,
}

fn cost(tally: &HashMap<ActionSet, usize>) -> usize {
    let total: usize = tally.values().sum();
    let best = tally.values().copied().max().unwrap_or(0);
    total - best
}

impl VoteBook {
    pub(super) fn errors(&self) -> usize {
        self.errors
    }

    pub(super) fn add(&mut self, key: &TransitionKey, actions: &ActionSet, weight: usize) {
        let tally = self.tallies.entry(key.clone()).or_default();
        self.errors -= cost(tally);
        *tally.entry(actions.clone()).or_default() += weight;
        self.errors += cost(tally);
    }

    pub(super) fn remove(&mut self, key: &TransitionKey, actions: &ActionSet, weight: usize) {
        let Some(tally) = self.tallies.get_mut(key) else {
            return;
        };
        self.errors -= cost(tally);
        if let Some(count) = tally.get_mut(actions) {
            *count = count.saturating_sub(weight);
            if *count == 0 {
                tally.remove(actions);
            }
        }
        self.errors += cost(tally);
        if tally.is_empty() {
            self.tallies.remove(key);
        }
    }

    /// Most voted action set; ties go to the smallest set.
    pub(super) fn winner(&self, key: &TransitionKey) -> Option<&ActionSet> {
        self.tallies.get(key).and_then(|tally| {
            tally
                .iter()
                .max_by(|(a, x), (b, y)| x.cmp(y).then_with(|| b.cmp(a)))
                .map(|(actions, _)| actions)
        })
    }

    /// Overwrite every voted transition with its majority action set.
    pub(super) fn apply(&self, automaton: &mut MealyAutomaton) {
        for key in self.tallies.keys() {
            if let Some(actions) = self.winner(key) {
                automaton.set_actions(key.0, &key.1, &key.2, actions.clone());
            }
        }
    }
}
