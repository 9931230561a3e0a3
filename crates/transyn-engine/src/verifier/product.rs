//! Lazily built product of a labeled system with a Büchi automaton, and the
//! two-phase breadth-first search over it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;

use tracing::debug;
use transyn_ir::{ActionSet, Counterexample, INITIAL_EVENT};

use super::buchi::BuchiAutomaton;
use super::system::{LabeledSystem, Location};
use crate::result::VerificationStats;

type ProductKey = (Location, usize);

struct ProductEdge {
    target: usize,
    event: String,
    actions: ActionSet,
}

struct ProductGraph<'a, S: LabeledSystem + ?Sized> {
    system: &'a S,
    buchi: &'a BuchiAutomaton,
    ids: HashMap<ProductKey, usize>,
    keys: Vec<ProductKey>,
    expanded: Vec<Option<Range<usize>>>,
    edges: Vec<ProductEdge>,
    covered: HashSet<(Location, usize)>,
}

impl<'a, S: LabeledSystem + ?Sized> ProductGraph<'a, S> {
    fn new(system: &'a S, buchi: &'a BuchiAutomaton) -> Self {
        Self {
            system,
            buchi,
            ids: HashMap::new(),
            keys: Vec::new(),
            expanded: Vec::new(),
            edges: Vec::new(),
            covered: HashSet::new(),
        }
    }

    fn intern(&mut self, key: ProductKey) -> usize {
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.keys.len();
        self.keys.push(key);
        self.ids.insert(key, id);
        self.expanded.push(None);
        id
    }

    /// Edge ids leaving `id`, materializing them on first request.
    fn successors(&mut self, id: usize) -> Range<usize> {
        if let Some(range) = &self.expanded[id] {
            return range.clone();
        }
        let (location, node) = self.keys[id];
        let system = self.system;
        let buchi = self.buchi;
        let start = self.edges.len();
        for step in system.steps(location) {
            for transition in &buchi.node(node).transitions {
                if !transition.condition.fires(location, &step) {
                    continue;
                }
                let target = self.intern((step.target, transition.target));
                self.covered.insert((location, step.index));
                self.edges.push(ProductEdge {
                    target,
                    event: step.event.unwrap_or(INITIAL_EVENT).to_string(),
                    actions: step.actions.clone(),
                });
            }
        }
        let range = start..self.edges.len();
        self.expanded[id] = Some(range.clone());
        range
    }

    fn stats(&self) -> VerificationStats {
        VerificationStats {
            product_nodes: self.keys.len(),
            product_edges: self.edges.len(),
            transitions_covered: self.covered.len(),
        }
    }

    fn steps_of(&self, edges: &[usize]) -> Vec<(String, ActionSet)> {
        edges
            .iter()
            .map(|&e| (self.edges[e].event.clone(), self.edges[e].actions.clone()))
            .collect()
    }

    /// Shortest nonempty cycle through `root`, as edge ids.
    fn shortest_cycle(&mut self, root: usize) -> Option<Vec<usize>> {
        let mut parent: HashMap<usize, (usize, usize)> = HashMap::new();
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for edge in self.successors(node) {
                let target = self.edges[edge].target;
                if target == root {
                    let mut cycle = path_to(&parent, node);
                    cycle.push(edge);
                    return Some(cycle);
                }
                if visited.insert(target) {
                    parent.insert(target, (node, edge));
                    queue.push_back(target);
                }
            }
        }
        None
    }
}

/// Edge ids on the BFS tree path leading to `node`.
fn path_to(parent: &HashMap<usize, (usize, usize)>, mut node: usize) -> Vec<usize> {
    let mut edges = Vec::new();
    while let Some(&(pred, edge)) = parent.get(&node) {
        edges.push(edge);
        node = pred;
    }
    edges.reverse();
    edges
}

fn better(candidate: &Counterexample, best: &Option<Counterexample>) -> bool {
    match best {
        None => true,
        Some(best) => {
            (candidate.len(), candidate.loop_length) < (best.len(), best.loop_length)
        }
    }
}

/// Minimal counterexample of `system` against `buchi`, if any.
///
/// Phase 1 explores the product breadth-first from the initial pair. A
/// finite-violation node yields its shortest path with loop length 0. Each
/// accepting node starts phase 2, a fresh search for the shortest cycle back
/// to it, yielding a lasso. The shortest candidate wins, ties going to the
/// smaller loop.
pub(crate) fn find_counterexample<S: LabeledSystem + ?Sized>(
    system: &S,
    buchi: &BuchiAutomaton,
) -> (Option<Counterexample>, VerificationStats) {
    if buchi.is_empty() {
        return (None, VerificationStats::default());
    }
    let mut graph = ProductGraph::new(system, buchi);
    let root = graph.intern((system.initial(), buchi.initial()));
    let mut parent: HashMap<usize, (usize, usize)> = HashMap::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut best: Option<Counterexample> = None;

    while let Some(node) = queue.pop_front() {
        let buchi_node = buchi.node(graph.keys[node].1);
        if buchi_node.finite_violation {
            let prefix = path_to(&parent, node);
            let candidate = Counterexample::new(graph.steps_of(&prefix), 0);
            if better(&candidate, &best) {
                best = Some(candidate);
            }
            continue;
        }
        if buchi_node.accepting {
            if let Some(cycle) = graph.shortest_cycle(node) {
                let mut edges = path_to(&parent, node);
                let loop_length = cycle.len();
                edges.extend(cycle);
                let candidate = Counterexample::new(graph.steps_of(&edges), loop_length);
                if better(&candidate, &best) {
                    best = Some(candidate);
                }
            }
        }
        for edge in graph.successors(node) {
            let target = graph.edges[edge].target;
            if visited.insert(target) {
                parent.insert(target, (node, edge));
                queue.push_back(target);
            }
        }
    }

    let stats = graph.stats();
    debug!(
        product_nodes = stats.product_nodes,
        product_edges = stats.product_edges,
        transitions_covered = stats.transitions_covered,
        violated = best.is_some(),
        "Explored product graph"
    );
    (best, stats)
}
