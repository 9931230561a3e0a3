//! Variable naming conventions for plant encodings.
//!
//! - `x_v_i`: positive tree node v is colored with state i
//! - `y_i_j_e`: transition from state i to state j on event index e
//! - `z_i_a`: state i emits action index a
//! - `s_i`: state i is a start state
//! - `nF_v_i`: after the prefix ending at node v of negative forest F the
//!   plant can be in state i

/// A decoded solver variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodedVar {
    Color { node: usize, state: usize },
    Transition { from: usize, to: usize, event: usize },
    Output { state: usize, action: usize },
    Start { state: usize },
    Negative { forest: usize, node: usize, state: usize },
}

pub fn color_var(node: usize, state: usize) -> String {
    format!("x_{node}_{state}")
}

pub fn transition_var(from: usize, to: usize, event: usize) -> String {
    format!("y_{from}_{to}_{event}")
}

pub fn output_var(state: usize, action: usize) -> String {
    format!("z_{state}_{action}")
}

pub fn start_var(state: usize) -> String {
    format!("s_{state}")
}

pub fn negative_var(forest: usize, node: usize, state: usize) -> String {
    format!("n{forest}_{node}_{state}")
}

fn indices(rest: &str, count: usize) -> Option<Vec<usize>> {
    let parts: Vec<usize> = rest
        .split('_')
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    (parts.len() == count).then_some(parts)
}

/// Decode a variable name produced by this module.
pub fn parse_var(name: &str) -> Option<EncodedVar> {
    if let Some(rest) = name.strip_prefix("x_") {
        let p = indices(rest, 2)?;
        return Some(EncodedVar::Color {
            node: p[0],
            state: p[1],
        });
    }
    if let Some(rest) = name.strip_prefix("y_") {
        let p = indices(rest, 3)?;
        return Some(EncodedVar::Transition {
            from: p[0],
            to: p[1],
            event: p[2],
        });
    }
    if let Some(rest) = name.strip_prefix("z_") {
        let p = indices(rest, 2)?;
        return Some(EncodedVar::Output {
            state: p[0],
            action: p[1],
        });
    }
    if let Some(rest) = name.strip_prefix("s_") {
        let p = indices(rest, 1)?;
        return Some(EncodedVar::Start { state: p[0] });
    }
    if let Some(rest) = name.strip_prefix('n') {
        let p = indices(rest, 3)?;
        return Some(EncodedVar::Negative {
            forest: p[0],
            node: p[1],
            state: p[2],
        });
    }
    None
}
