//! Prefix-merged trace forests.
//!
//! Traces that share a prefix share the corresponding path from the root.
//! Node 0 is the root; for Mealy synthesis it is the forced initial state of
//! every candidate automaton, for plant synthesis it is a virtual node whose
//! outgoing edges carry [`crate::scenario::INITIAL_EVENT`].

use indexmap::IndexSet;

use crate::actions::ActionSet;
use crate::error::ForestError;
use crate::guard::Guard;
use crate::scenario::{Scenario, TraceStep};

/// Identifier of a tree node.
pub type NodeId = usize;
/// Identifier of a tree edge.
pub type EdgeId = usize;

/// How edges leaving a node are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForestKind {
    /// One edge per (event, guard). A second trace producing different
    /// actions on an identical prefix is rejected.
    #[default]
    Deterministic,
    /// One edge per (event, guard, actions). Used for nondeterministic plant
    /// traces and for negative traces.
    Branching,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub outgoing: Vec<EdgeId>,
    /// A trace ends here.
    pub terminal: bool,
    /// Loop points of negative traces ending here. A loop point equal to the
    /// node itself means the trace was recorded with loop length 0.
    pub loops: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEdge {
    pub src: NodeId,
    pub event: String,
    pub guard: Guard,
    pub actions: ActionSet,
    pub dst: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceForest {
    kind: ForestKind,
    nodes: Vec<TreeNode>,
    edges: Vec<TreeEdge>,
    trace_count: usize,
}

/// How one trace step is realized during insertion.
enum StepPlan {
    /// Follow existing edges to `dst`, adding edges for `missing` events.
    Follow { dst: NodeId, missing: Vec<String> },
    /// Create a fresh node and one edge per event.
    Create,
}

impl Default for TraceForest {
    fn default() -> Self {
        Self::new(ForestKind::default())
    }
}

impl TraceForest {
    pub fn new(kind: ForestKind) -> Self {
        Self {
            kind,
            nodes: vec![TreeNode::default()],
            edges: Vec::new(),
            trace_count: 0,
        }
    }

    pub fn deterministic() -> Self {
        Self::new(ForestKind::Deterministic)
    }

    pub fn branching() -> Self {
        Self::new(ForestKind::Branching)
    }

    /// Build a deterministic forest from a list of traces.
    pub fn from_scenarios<'a>(
        scenarios: impl IntoIterator<Item = &'a Scenario>,
    ) -> Result<Self, ForestError> {
        let mut forest = Self::deterministic();
        for scenario in scenarios {
            forest.insert(scenario)?;
        }
        Ok(forest)
    }

    pub fn kind(&self) -> ForestKind {
        self.kind
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &TreeEdge {
        &self.edges[id]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &TreeEdge> {
        self.nodes[id].outgoing.iter().map(|&e| &self.edges[e])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn trace_count(&self) -> usize {
        self.trace_count
    }

    /// Outgoing edges of `id` grouped by destination node, in ascending
    /// destination order. Edges of one group come from one event-set step.
    pub fn grouped_outgoing(&self, id: NodeId) -> Vec<(NodeId, Vec<EdgeId>)> {
        let mut groups: Vec<(NodeId, Vec<EdgeId>)> = Vec::new();
        for &e in &self.nodes[id].outgoing {
            let dst = self.edges[e].dst;
            match groups.iter_mut().find(|(d, _)| *d == dst) {
                Some((_, members)) => members.push(e),
                None => groups.push((dst, vec![e])),
            }
        }
        groups.sort_by_key(|(dst, _)| *dst);
        groups
    }

    /// Distinct action sets on tree edges, in first-seen order.
    pub fn observed_action_sets(&self) -> Vec<ActionSet> {
        let set: IndexSet<&ActionSet> = self.edges.iter().map(|e| &e.actions).collect();
        set.into_iter().cloned().collect()
    }

    /// Distinct events on tree edges, in first-seen order.
    pub fn events(&self) -> IndexSet<String> {
        self.edges.iter().map(|e| e.event.clone()).collect()
    }

    /// Distinct action names on tree edges, in first-seen order.
    pub fn action_alphabet(&self) -> IndexSet<String> {
        self.edges
            .iter()
            .flat_map(|e| e.actions.iter().map(str::to_string))
            .collect()
    }

    /// Insert a trace and return the node where it ends.
    ///
    /// The whole trace is validated before the forest is touched, so a
    /// rejected trace leaves the forest unchanged.
    pub fn insert(&mut self, scenario: &Scenario) -> Result<NodeId, ForestError> {
        let plan = self.plan(scenario)?;
        let terminal = self.apply(scenario, plan);
        self.nodes[terminal].terminal = true;
        self.trace_count += 1;
        Ok(terminal)
    }

    /// Insert a negative trace whose last `loop_length` steps repeat forever.
    pub fn insert_with_loop(
        &mut self,
        scenario: &Scenario,
        loop_length: usize,
    ) -> Result<NodeId, ForestError> {
        if loop_length > scenario.len() {
            return Err(ForestError::LoopOutOfRange {
                loop_length,
                trace_length: scenario.len(),
            });
        }
        let plan = self.plan(scenario)?;
        let path = self.apply_with_path(scenario, plan);
        let terminal = path[path.len() - 1];
        let loop_point = path[scenario.len() - loop_length];
        let node = &mut self.nodes[terminal];
        node.terminal = true;
        if !node.loops.contains(&loop_point) {
            node.loops.push(loop_point);
        }
        self.trace_count += 1;
        Ok(terminal)
    }

    /// Whether the trace was inserted, i.e. its full path exists and ends at
    /// a terminal node.
    pub fn contains(&self, scenario: &Scenario) -> bool {
        self.path_of(scenario)
            .and_then(|path| path.last().copied())
            .is_some_and(|end| self.nodes[end].terminal)
    }

    /// Nodes visited by the trace, starting at the root, if its full path
    /// exists in the forest.
    pub fn path_of(&self, scenario: &Scenario) -> Option<Vec<NodeId>> {
        let mut path = vec![self.root()];
        let mut current = self.root();
        for step in &scenario.steps {
            let event = step.events.first()?;
            let edge = self.outgoing(current).find(|e| {
                e.event == *event && e.guard == step.guard && e.actions == step.actions
            })?;
            current = edge.dst;
            path.push(current);
        }
        Some(path)
    }

    fn matches_key(&self, edge: &TreeEdge, event: &str, step: &TraceStep) -> bool {
        edge.event == event
            && edge.guard == step.guard
            && (self.kind == ForestKind::Deterministic || edge.actions == step.actions)
    }

    fn plan(&self, scenario: &Scenario) -> Result<Vec<StepPlan>, ForestError> {
        let mut plan = Vec::with_capacity(scenario.len());
        let mut current = Some(self.root());
        for (index, step) in scenario.steps.iter().enumerate() {
            if step.events.is_empty() {
                return Err(ForestError::EmptyEventSet(index));
            }
            let Some(node) = current else {
                plan.push(StepPlan::Create);
                continue;
            };
            let mut dst = None;
            let mut missing = Vec::new();
            for event in &step.events {
                let found = self
                    .outgoing(node)
                    .find(|e| self.matches_key(e, event, step));
                match found {
                    Some(edge) => {
                        if edge.actions != step.actions {
                            return Err(ForestError::InconsistentActions {
                                step: index,
                                event: event.clone(),
                                existing: edge.actions.clone(),
                                found: step.actions.clone(),
                            });
                        }
                        if dst.is_some_and(|d| d != edge.dst) {
                            return Err(ForestError::SplitEventSet { step: index });
                        }
                        dst = Some(edge.dst);
                    }
                    None => missing.push(event.clone()),
                }
            }
            match dst {
                Some(dst) => {
                    plan.push(StepPlan::Follow { dst, missing });
                    current = Some(dst);
                }
                None => {
                    plan.push(StepPlan::Create);
                    current = None;
                }
            }
        }
        Ok(plan)
    }

    fn apply(&mut self, scenario: &Scenario, plan: Vec<StepPlan>) -> NodeId {
        let path = self.apply_with_path(scenario, plan);
        path[path.len() - 1]
    }

    fn apply_with_path(&mut self, scenario: &Scenario, plan: Vec<StepPlan>) -> Vec<NodeId> {
        let mut path = vec![self.root()];
        let mut current = self.root();
        for (step, step_plan) in scenario.steps.iter().zip(plan) {
            let (dst, events) = match step_plan {
                StepPlan::Follow { dst, missing } => (dst, missing),
                StepPlan::Create => {
                    self.nodes.push(TreeNode::default());
                    (self.nodes.len() - 1, step.events.clone())
                }
            };
            for event in events {
                let id = self.edges.len();
                self.edges.push(TreeEdge {
                    src: current,
                    event,
                    guard: step.guard.clone(),
                    actions: step.actions.clone(),
                    dst,
                });
                self.nodes[current].outgoing.push(id);
            }
            current = dst;
            path.push(current);
        }
        path
    }
}
