use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Set of output actions emitted by a transition (Mealy) or a state (Moore).
///
/// Actions are kept sorted so two sets compare equal regardless of the order
/// in which a trace listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSet {
    actions: BTreeSet<String>,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated action list such as `"z1, z2"`.
    ///
    /// Blank entries are ignored, so `""` yields the empty set.
    pub fn parse(text: &str) -> Self {
        text.split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect()
    }

    pub fn insert(&mut self, action: impl Into<String>) -> bool {
        self.actions.insert(action.into())
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains(action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_order_whitespace_and_blanks() {
        let a = ActionSet::parse("z2, z1,,");
        let b: ActionSet = ["z1", "z2"].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "z1,z2");
    }

    #[test]
    fn empty_text_is_empty_set() {
        let a = ActionSet::parse("");
        assert!(a.is_empty());
        assert_eq!(a.to_string(), "");
    }
}
