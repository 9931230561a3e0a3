use serde::{Deserialize, Serialize};

/// Which missing (state, event) transitions a synthesized automaton must
/// define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletenessPolicy {
    /// Every state has a transition on every event.
    #[default]
    Normal,
    /// Every state has at least one outgoing transition; other pairs may
    /// stay undefined.
    NoDeadEnds,
}
