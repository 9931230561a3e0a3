//! Büchi automata accepting the violations of a property.

use super::predicate::PropFormula;

#[derive(Debug, Clone)]
pub struct BuchiTransition {
    pub condition: PropFormula,
    pub target: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BuchiNode {
    /// Visiting this node infinitely often is a violation.
    pub accepting: bool,
    /// Reaching this node is already a violation.
    pub finite_violation: bool,
    pub transitions: Vec<BuchiTransition>,
}

#[derive(Debug, Clone, Default)]
pub struct BuchiAutomaton {
    nodes: Vec<BuchiNode>,
    initial: usize,
}

impl BuchiAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, accepting: bool) -> usize {
        self.nodes.push(BuchiNode {
            accepting,
            ..BuchiNode::default()
        });
        self.nodes.len() - 1
    }

    pub fn mark_finite_violation(&mut self, node: usize) {
        self.nodes[node].finite_violation = true;
    }

    pub fn add_transition(&mut self, src: usize, condition: PropFormula, target: usize) {
        self.nodes[src]
            .transitions
            .push(BuchiTransition { condition, target });
    }

    pub fn set_initial(&mut self, node: usize) {
        self.initial = node;
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn node(&self, id: usize) -> &BuchiNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether some transition condition refers to a state by number.
    pub fn mentions_states(&self) -> bool {
        self.nodes
            .iter()
            .flat_map(|n| &n.transitions)
            .any(|t| t.condition.mentions_states())
    }
}

/// A named property together with the Büchi automaton of its violations.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub buchi: BuchiAutomaton,
}

impl Property {
    pub fn new(name: impl Into<String>, buchi: BuchiAutomaton) -> Self {
        Self {
            name: name.into(),
            buchi,
        }
    }

    /// `G !p`: violated by the first step satisfying `p`.
    pub fn never(name: impl Into<String>, p: PropFormula) -> Self {
        let mut buchi = BuchiAutomaton::new();
        let waiting = buchi.add_node(false);
        let violated = buchi.add_node(false);
        buchi.mark_finite_violation(violated);
        buchi.add_transition(waiting, PropFormula::True, waiting);
        buchi.add_transition(waiting, p, violated);
        Self::new(name, buchi)
    }

    /// `G F p`: violated by a run that eventually stops satisfying `p`.
    pub fn infinitely_often(name: impl Into<String>, p: PropFormula) -> Self {
        let mut buchi = BuchiAutomaton::new();
        let anything = buchi.add_node(false);
        let starved = buchi.add_node(true);
        buchi.add_transition(anything, PropFormula::True, anything);
        buchi.add_transition(anything, p.clone().not(), starved);
        buchi.add_transition(starved, p.not(), starved);
        Self::new(name, buchi)
    }
}
