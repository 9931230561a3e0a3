use std::collections::HashMap;

use crate::constraints::ConstraintSet;

/// A satisfying assignment returned by an oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub values: HashMap<String, bool>,
}

impl Assignment {
    pub fn get(&self, name: &str) -> Option<bool> {
        self.values.get(name).copied()
    }

    /// Variables set to true, sorted by name.
    pub fn true_vars(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = self
            .values
            .iter()
            .filter(|(_, &v)| v)
            .map(|(name, _)| name.as_str())
            .collect();
        vars.sort_unstable();
        vars
    }
}

impl FromIterator<(String, bool)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Outcome of one oracle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleResponse {
    Sat(Assignment),
    Unsat,
    Timeout,
}

/// Opaque satisfiability oracle.
///
/// Each call is independent: the oracle receives the full constraint set and
/// the remaining time budget in whole seconds (`None` means unbounded).
pub trait SatOracle {
    type Error: std::error::Error;

    fn solve(
        &mut self,
        constraints: &ConstraintSet,
        timeout_secs: Option<u64>,
    ) -> Result<OracleResponse, Self::Error>;

    /// Short name used in log messages.
    fn name(&self) -> &str {
        "oracle"
    }
}

impl<T: SatOracle + ?Sized> SatOracle for &mut T {
    type Error = T::Error;

    fn solve(
        &mut self,
        constraints: &ConstraintSet,
        timeout_secs: Option<u64>,
    ) -> Result<OracleResponse, Self::Error> {
        (**self).solve(constraints, timeout_secs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct MockOracle {
        response: OracleResponse,
        calls: Vec<Option<u64>>,
    }

    impl SatOracle for MockOracle {
        type Error = io::Error;

        fn solve(
            &mut self,
            _constraints: &ConstraintSet,
            timeout_secs: Option<u64>,
        ) -> Result<OracleResponse, Self::Error> {
            self.calls.push(timeout_secs);
            Ok(self.response.clone())
        }
    }

    #[test]
    fn true_vars_are_sorted_and_filtered() {
        let assignment: Assignment = [
            ("y".to_string(), true),
            ("x".to_string(), true),
            ("z".to_string(), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(assignment.true_vars(), vec!["x", "y"]);
        assert_eq!(assignment.get("z"), Some(false));
        assert_eq!(assignment.get("w"), None);
    }

    #[test]
    fn mutable_reference_forwards_calls() {
        let mut mock = MockOracle {
            response: OracleResponse::Unsat,
            calls: Vec::new(),
        };
        fn solve_once<O: SatOracle>(mut oracle: O) -> OracleResponse {
            oracle
                .solve(&ConstraintSet::new(), Some(3))
                .expect("mock oracle never fails")
        }
        assert_eq!(solve_once(&mut mock), OracleResponse::Unsat);
        assert_eq!(mock.calls, vec![Some(3)]);
    }
}
