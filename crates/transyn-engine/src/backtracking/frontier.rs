//! Lockstep walk of the trace forest against the partial automaton.
//!
//! Each colored tree node carries the automaton state it is mapped to. A
//! frontier group is a set of edges leaving one colored node that the
//! automaton cannot take yet; choosing a destination for a group defines
//! the missing transitions.

use std::collections::VecDeque;

use transyn_ir::{EdgeId, NodeId, StateId};

use super::tolerant::TransitionKey;
use super::{Search, Undo};

/// Edges leaving a node colored `state`, all leading to the same tree node.
#[derive(Debug, Clone)]
pub(super) struct PendingGroup {
    pub(super) state: StateId,
    pub(super) edges: Vec<EdgeId>,
}

enum Resolution {
    /// No edge of the group has a transition yet.
    Undefined,
    /// Every edge is taken by a transition into `dst`.
    Matched { dst: StateId, matched: Vec<EdgeId> },
    Conflict,
}

impl Search<'_> {
    /// Groups to push when `node` is colored `state`.
    fn groups_of(&self, node: NodeId, state: StateId) -> Vec<PendingGroup> {
        if self.options.variant.groups_event_sets() {
            self.forest
                .grouped_outgoing(node)
                .into_iter()
                .map(|(_, edges)| PendingGroup { state, edges })
                .collect()
        } else {
            self.forest
                .node(node)
                .outgoing
                .iter()
                .map(|&e| PendingGroup {
                    state,
                    edges: vec![e],
                })
                .collect()
        }
    }

    fn resolve(&self, group: &PendingGroup) -> Resolution {
        let tolerant = self.options.variant.tolerates_mismatches();
        let mut dst = None;
        let mut matched = Vec::new();
        let mut missing = Vec::new();
        for &e in &group.edges {
            let edge = self.forest.edge(e);
            match self.automaton.transition(group.state, &edge.event, &edge.guard) {
                Some(t) => {
                    if !tolerant && t.actions != edge.actions {
                        return Resolution::Conflict;
                    }
                    if dst.is_some_and(|d| d != t.dst) {
                        return Resolution::Conflict;
                    }
                    dst = Some(t.dst);
                    matched.push(e);
                }
                None => missing.push(e),
            }
        }
        match dst {
            None => Resolution::Undefined,
            // Edges of an event set are defined together or not at all.
            Some(_) if !missing.is_empty() => Resolution::Conflict,
            Some(dst) => Resolution::Matched { dst, matched },
        }
    }

    /// Colors the group's target node, or queues the group for a decision.
    /// `false` on contradiction.
    fn settle(
        &mut self,
        group: &PendingGroup,
        frontier: &mut Vec<PendingGroup>,
        worklist: &mut VecDeque<(NodeId, StateId)>,
        undo: &mut Undo,
    ) -> bool {
        let (dst, matched) = match self.resolve(group) {
            Resolution::Undefined => {
                frontier.push(group.clone());
                return true;
            }
            Resolution::Conflict => return false,
            Resolution::Matched { dst, matched } => (dst, matched),
        };
        let forest = self.forest;
        if self.options.variant.tolerates_mismatches() {
            for e in matched {
                let edge = forest.edge(e);
                let key: TransitionKey = (group.state, edge.event.clone(), edge.guard.clone());
                let weight = self.weights[edge.dst];
                self.votes.add(&key, &edge.actions, weight);
                undo.votes.push((key, edge.actions.clone(), weight));
            }
            if self.votes.errors() > self.options.error_bound {
                return false;
            }
        }
        let node = forest.edge(group.edges[0]).dst;
        match self.coloring[node] {
            Some(color) if color != dst => return false,
            Some(_) => {}
            None => {
                self.coloring[node] = Some(dst);
                undo.colored.push(node);
                worklist.push_back((node, dst));
            }
        }
        true
    }

    /// Re-resolve `pending` against the current automaton and propagate
    /// through every node colored on the way. Returns the next frontier, or
    /// `None` when the automaton contradicts the forest.
    pub(super) fn recompute(
        &mut self,
        pending: &[PendingGroup],
        seeds: Vec<(NodeId, StateId)>,
        undo: &mut Undo,
    ) -> Option<Vec<PendingGroup>> {
        let mut frontier = Vec::new();
        let mut worklist: VecDeque<(NodeId, StateId)> = seeds.into();
        for group in pending {
            if !self.settle(group, &mut frontier, &mut worklist, undo) {
                return None;
            }
        }
        while let Some((node, state)) = worklist.pop_front() {
            for group in self.groups_of(node, state) {
                if !self.settle(&group, &mut frontier, &mut worklist, undo) {
                    return None;
                }
            }
        }
        Some(frontier)
    }
}
