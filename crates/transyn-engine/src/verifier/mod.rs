//! Explicit-state temporal verification of candidate automata.
//!
//! Each property is given as a Büchi automaton over system steps accepting
//! the violating runs. Verification explores the product of the automaton
//! and the Büchi automaton from scratch for every call.

pub mod buchi;
pub mod predicate;
mod product;
pub mod system;

pub use buchi::{BuchiAutomaton, BuchiNode, BuchiTransition, Property};
pub use predicate::{
    AtomicPredicate, IsInState, PropFormula, WasAction, WasEvent, WasInState, WasTrue,
};
pub use system::{LabeledSystem, Location, SystemStep};

use transyn_ir::Counterexample;

use crate::result::{Verdict, VerificationStats};

#[derive(Debug, Clone, Default)]
pub struct Verifier {
    properties: Vec<Property>,
}

impl Verifier {
    pub fn new(properties: Vec<Property>) -> Self {
        Self { properties }
    }

    pub fn add(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether some property depends on state numbering, so that relabeling
    /// the states of an automaton may change the verdict.
    pub fn mentions_states(&self) -> bool {
        self.properties.iter().any(|p| p.buchi.mentions_states())
    }

    /// Minimal counterexample of `system` against one property.
    pub fn verify_property<S: LabeledSystem + ?Sized>(
        &self,
        system: &S,
        property: &Property,
    ) -> Option<Counterexample> {
        product::find_counterexample(system, &property.buchi).0
    }

    /// Check properties in order and report the first violation.
    pub fn verify<S: LabeledSystem + ?Sized>(&self, system: &S) -> Verdict {
        self.verify_with_stats(system).0
    }

    pub fn verify_with_stats<S: LabeledSystem + ?Sized>(
        &self,
        system: &S,
    ) -> (Verdict, VerificationStats) {
        let mut total = VerificationStats::default();
        for property in &self.properties {
            let (counterexample, stats) = product::find_counterexample(system, &property.buchi);
            total.absorb(stats);
            if let Some(counterexample) = counterexample {
                return (
                    Verdict::Counterexample {
                        property: property.name.clone(),
                        counterexample,
                    },
                    total,
                );
            }
        }
        (Verdict::Holds, total)
    }

    /// Every violated property with its minimal counterexample.
    pub fn verify_all<S: LabeledSystem + ?Sized>(
        &self,
        system: &S,
    ) -> Vec<(String, Counterexample)> {
        self.properties
            .iter()
            .filter_map(|p| {
                self.verify_property(system, p)
                    .map(|ce| (p.name.clone(), ce))
            })
            .collect()
    }
}

/// Counterexamples of one candidate keyed by property name, split by
/// verifier scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedCounterexamples {
    pub local: Vec<(String, Counterexample)>,
    pub global: Vec<(String, Counterexample)>,
}

impl TaggedCounterexamples {
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.global.is_empty()
    }
}

/// The per-configuration ("local") verifier and the one whose
/// counterexamples are shared across configurations ("global").
#[derive(Debug, Clone, Default)]
pub struct VerifierPair {
    pub local: Verifier,
    pub global: Verifier,
}

impl VerifierPair {
    pub fn new(local: Verifier, global: Verifier) -> Self {
        Self { local, global }
    }

    pub fn verify<S: LabeledSystem + ?Sized>(&self, system: &S) -> TaggedCounterexamples {
        TaggedCounterexamples {
            local: self.local.verify_all(system),
            global: self.global.verify_all(system),
        }
    }
}
