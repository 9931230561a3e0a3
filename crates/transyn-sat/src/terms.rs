use std::collections::HashMap;

/// Propositional term, solver-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SatTerm {
    /// Variable reference by name.
    Var(String),
    /// Boolean literal.
    Lit(bool),
    And(Vec<SatTerm>),
    Or(Vec<SatTerm>),
    Not(Box<SatTerm>),
    Implies(Box<SatTerm>, Box<SatTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SatTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SatTerm::Var(name.into())
    }

    pub fn bool(b: bool) -> Self {
        SatTerm::Lit(b)
    }

    pub fn and(terms: Vec<SatTerm>) -> Self {
        SatTerm::And(terms)
    }

    pub fn or(terms: Vec<SatTerm>) -> Self {
        SatTerm::Or(terms)
    }

    pub fn not(self) -> Self {
        SatTerm::Not(Box::new(self))
    }

    pub fn implies(self, other: SatTerm) -> Self {
        SatTerm::Implies(Box::new(self), Box::new(other))
    }

    /// Pairwise at-most-one over `terms`.
    pub fn at_most_one(terms: &[SatTerm]) -> Self {
        let mut pairs = Vec::new();
        for i in 0..terms.len() {
            for j in (i + 1)..terms.len() {
                pairs.push(SatTerm::or(vec![
                    terms[i].clone().not(),
                    terms[j].clone().not(),
                ]));
            }
        }
        SatTerm::and(pairs)
    }

    pub fn exactly_one(terms: &[SatTerm]) -> Self {
        SatTerm::and(vec![
            SatTerm::or(terms.to_vec()),
            SatTerm::at_most_one(terms),
        ])
    }

    /// Evaluate with unassigned variables read as `false`.
    pub fn evaluate(&self, values: &HashMap<String, bool>) -> bool {
        match self {
            SatTerm::Var(name) => values.get(name).copied().unwrap_or(false),
            SatTerm::Lit(b) => *b,
            SatTerm::And(terms) => terms.iter().all(|t| t.evaluate(values)),
            SatTerm::Or(terms) => terms.iter().any(|t| t.evaluate(values)),
            SatTerm::Not(inner) => !inner.evaluate(values),
            SatTerm::Implies(lhs, rhs) => !lhs.evaluate(values) || rhs.evaluate(values),
        }
    }
}
