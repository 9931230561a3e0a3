use indexmap::IndexMap;
use transyn_ir::MealyAutomaton;

/// Map from abstract events to the concrete events refining them.
///
/// Concrete events are an abstract event name followed by one character per
/// input variable, e.g. `A01` refines `A` under two variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventExtensions {
    map: IndexMap<String, Vec<String>>,
}

impl EventExtensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, abstract_event: impl Into<String>, concrete: Vec<String>) {
        self.map.insert(abstract_event.into(), concrete);
    }

    /// Group `events` by the name left after stripping the last `variables`
    /// characters.
    pub fn from_suffix<S: AsRef<str>>(events: &[S], variables: usize) -> Self {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
        for event in events {
            let name = event.as_ref();
            let chars = name.chars().count();
            let keep = chars.saturating_sub(variables);
            let abstract_event: String = name.chars().take(keep).collect();
            let abstract_event = if abstract_event.is_empty() {
                name.to_string()
            } else {
                abstract_event
            };
            map.entry(abstract_event).or_default().push(name.to_string());
        }
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, abstract_event: &str) -> Option<&[String]> {
        self.map.get(abstract_event).map(Vec::as_slice)
    }

    /// For every state and abstract event, either all or none of the
    /// concrete extensions have a transition.
    pub fn is_weakly_complete(&self, automaton: &MealyAutomaton) -> bool {
        (0..automaton.size()).all(|state| {
            self.map.values().all(|concrete| {
                let defined = concrete
                    .iter()
                    .filter(|e| automaton.has_event(state, e))
                    .count();
                defined == 0 || defined == concrete.len()
            })
        })
    }
}
