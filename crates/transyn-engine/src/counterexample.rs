//! Helpers for reporting and ranking counterexamples.

use transyn_ir::Counterexample;

/// The shortest of some per-property counterexamples, ties going to the
/// smaller loop and then to the earliest one.
pub fn shortest<I>(counterexamples: I) -> Option<(String, Counterexample)>
where
    I: IntoIterator<Item = (String, Counterexample)>,
{
    counterexamples
        .into_iter()
        .min_by_key(|(_, ce)| (ce.len(), ce.loop_length))
}

/// Multi-line rendering of a counterexample, one step per line.
pub fn format_counterexample(property: &str, ce: &Counterexample) -> String {
    let split = ce.len() - ce.loop_length.min(ce.len());
    let mut out = format!("Counterexample for '{property}' ({} steps", ce.len());
    if ce.loop_length > 0 {
        out.push_str(&format!(", loop of {}", ce.loop_length));
    }
    out.push_str("):\n");
    for (i, (event, actions)) in ce.steps.iter().enumerate() {
        if ce.loop_length > 0 && i == split {
            out.push_str("  -- loop --\n");
        }
        out.push_str(&format!("  {i}: {event} / {actions}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use transyn_ir::ActionSet;

    fn ce(events: &[&str], loop_length: usize) -> Counterexample {
        Counterexample::new(
            events
                .iter()
                .map(|e| (e.to_string(), ActionSet::new()))
                .collect(),
            loop_length,
        )
    }

    #[test]
    fn shortest_prefers_length_then_loop() {
        let best = shortest([
            ("p".to_string(), ce(&["a", "b", "c"], 0)),
            ("q".to_string(), ce(&["a", "b"], 1)),
            ("r".to_string(), ce(&["b", "a"], 0)),
            ("s".to_string(), ce(&["a", "a"], 0)),
        ]);
        assert_eq!(best, Some(("r".to_string(), ce(&["b", "a"], 0))));
        assert_eq!(shortest(Vec::new()), None);
    }

    #[test]
    fn format_marks_loop_start() {
        let text = format_counterexample("live", &ce(&["a", "b", "c"], 2));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Counterexample for 'live' (3 steps, loop of 2):");
        assert_eq!(lines[1], "  0: a / ");
        assert_eq!(lines[2], "  -- loop --");
        assert_eq!(lines[3], "  1: b / ");
    }
}
