use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean guard over input variables attached to a transition.
///
/// Traces recorded without input variables use [`Guard::True`]; a transition
/// is then selected by its event alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guard {
    #[default]
    True,
    Var(String),
    Not(Box<Guard>),
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

#[allow(clippy::should_implement_trait)]
impl Guard {
    pub fn var(name: impl Into<String>) -> Self {
        Guard::Var(name.into())
    }

    pub fn not(self) -> Self {
        Guard::Not(Box::new(self))
    }

    pub fn and(guards: Vec<Guard>) -> Self {
        Guard::And(guards)
    }

    pub fn or(guards: Vec<Guard>) -> Self {
        Guard::Or(guards)
    }

    /// Build the conjunction of literals described by `(variable, value)` pairs.
    pub fn cube<'a>(literals: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let items: Vec<Guard> = literals
            .into_iter()
            .map(|(name, value)| {
                if value {
                    Guard::var(name)
                } else {
                    Guard::var(name).not()
                }
            })
            .collect();
        match items.len() {
            0 => Guard::True,
            1 => items.into_iter().next().unwrap_or(Guard::True),
            _ => Guard::And(items),
        }
    }

    pub fn is_tautology(&self) -> bool {
        match self {
            Guard::True => true,
            Guard::And(items) => items.iter().all(Guard::is_tautology),
            Guard::Or(items) => items.iter().any(Guard::is_tautology),
            _ => false,
        }
    }

    /// Evaluate under a full valuation. Returns `None` when a referenced
    /// variable is missing from `valuation`.
    pub fn evaluate(&self, valuation: &HashMap<String, bool>) -> Option<bool> {
        match self {
            Guard::True => Some(true),
            Guard::Var(name) => valuation.get(name).copied(),
            Guard::Not(inner) => inner.evaluate(valuation).map(|v| !v),
            Guard::And(items) => {
                let mut result = true;
                for item in items {
                    result &= item.evaluate(valuation)?;
                }
                Some(result)
            }
            Guard::Or(items) => {
                let mut result = false;
                for item in items {
                    result |= item.evaluate(valuation)?;
                }
                Some(result)
            }
        }
    }

    /// Value of `var` forced by this guard, if any.
    ///
    /// A conjunction forces the value of each of its literals; a disjunction
    /// forces a value only when every branch forces the same one.
    pub fn literal(&self, var: &str) -> Option<bool> {
        match self {
            Guard::True => None,
            Guard::Var(name) => (name == var).then_some(true),
            Guard::Not(inner) => match inner.as_ref() {
                Guard::Var(name) if name == var => Some(false),
                _ => None,
            },
            Guard::And(items) => items.iter().find_map(|g| g.literal(var)),
            Guard::Or(items) => {
                let mut forced = None;
                for item in items {
                    let value = item.literal(var)?;
                    match forced {
                        None => forced = Some(value),
                        Some(prev) if prev != value => return None,
                        Some(_) => {}
                    }
                }
                forced
            }
        }
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::True => write!(f, "1"),
            Guard::Var(name) => write!(f, "{name}"),
            Guard::Not(inner) => write!(f, "~{inner}"),
            Guard::And(items) | Guard::Or(items) => {
                let sep = if matches!(self, Guard::And(_)) {
                    " & "
                } else {
                    " | "
                };
                let parts: Vec<String> = items.iter().map(|g| format!("{g}")).collect();
                write!(f, "({})", parts.join(sep))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_forces_literals() {
        let g = Guard::cube([("x1", true), ("x2", false)]);
        assert_eq!(g.literal("x1"), Some(true));
        assert_eq!(g.literal("x2"), Some(false));
        assert_eq!(g.literal("x3"), None);
        assert!(!g.is_tautology());
    }

    #[test]
    fn disjunction_forces_only_common_value() {
        let same = Guard::or(vec![
            Guard::cube([("x", true), ("y", true)]),
            Guard::cube([("x", true), ("y", false)]),
        ]);
        assert_eq!(same.literal("x"), Some(true));
        assert_eq!(same.literal("y"), None);
    }

    #[test]
    fn evaluate_reports_missing_variables() {
        let g = Guard::and(vec![Guard::var("a"), Guard::var("b").not()]);
        let mut valuation = HashMap::new();
        valuation.insert("a".to_string(), true);
        assert_eq!(g.evaluate(&valuation), None);
        valuation.insert("b".to_string(), false);
        assert_eq!(g.evaluate(&valuation), Some(true));
    }

    #[test]
    fn empty_cube_is_tautology() {
        assert!(Guard::cube([]).is_tautology());
        assert_eq!(Guard::True.to_string(), "1");
    }
}
