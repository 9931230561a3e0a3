use indexmap::IndexSet;

use crate::solver::Assignment;
use crate::terms::SatTerm;

/// Declared boolean variables plus the assertions over them.
///
/// Declaration order is preserved so printed scripts are reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    pub vars: IndexSet<String>,
    pub assertions: Vec<SatTerm>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` (idempotent) and return a term referring to it.
    pub fn declare(&mut self, name: impl Into<String>) -> SatTerm {
        let name = name.into();
        self.vars.insert(name.clone());
        SatTerm::Var(name)
    }

    pub fn assert(&mut self, term: SatTerm) {
        self.assertions.push(term);
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.assertions
            .iter()
            .all(|t| t.evaluate(&assignment.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent_and_ordered() {
        let mut cs = ConstraintSet::new();
        cs.declare("b");
        cs.declare("a");
        cs.declare("b");
        assert_eq!(cs.vars.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn satisfaction_is_checked_against_assignment() {
        let mut cs = ConstraintSet::new();
        let a = cs.declare("a");
        let b = cs.declare("b");
        cs.assert(a.implies(b));
        let mut assignment = Assignment::default();
        assignment.values.insert("a".into(), true);
        assert!(!cs.is_satisfied_by(&assignment));
        assignment.values.insert("b".into(), true);
        assert!(cs.is_satisfied_by(&assignment));
    }
}
