//! In-process oracle on the `z3` crate.
//!
//! Every call builds a fresh solver, so no state leaks between CEGAR
//! iterations.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use z3::SatResult as Z3SatResult;

use crate::constraints::ConstraintSet;
use crate::solver::{Assignment, OracleResponse, SatOracle};
use crate::terms::SatTerm;

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("Z3 error: {0}")]
    Internal(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

#[derive(Debug, Clone, Default)]
pub struct Z3Oracle {
    calls: u64,
}

impl Z3Oracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

fn make_solver(timeout_secs: Option<u64>) -> z3::Solver {
    let solver = z3::Solver::new();
    if let Some(secs) = timeout_secs {
        let mut params = z3::Params::new();
        let timeout_ms = secs.saturating_mul(1000).min(u64::from(u32::MAX)) as u32;
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);
    }
    solver
}

fn translate(
    term: &SatTerm,
    vars: &HashMap<String, z3::ast::Bool>,
) -> Result<z3::ast::Bool, Z3Error> {
    match term {
        SatTerm::Var(name) => vars
            .get(name)
            .cloned()
            .ok_or_else(|| Z3Error::UnknownVariable(name.clone())),
        SatTerm::Lit(b) => Ok(z3::ast::Bool::from_bool(*b)),
        SatTerm::And(terms) => {
            let bools = terms
                .iter()
                .map(|t| translate(t, vars))
                .collect::<Result<Vec<_>, _>>()?;
            let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
            Ok(z3::ast::Bool::and(&refs))
        }
        SatTerm::Or(terms) => {
            let bools = terms
                .iter()
                .map(|t| translate(t, vars))
                .collect::<Result<Vec<_>, _>>()?;
            let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
            Ok(z3::ast::Bool::or(&refs))
        }
        SatTerm::Not(inner) => Ok(translate(inner, vars)?.not()),
        SatTerm::Implies(lhs, rhs) => {
            let l = translate(lhs, vars)?;
            let r = translate(rhs, vars)?;
            Ok(l.implies(&r))
        }
    }
}

impl SatOracle for Z3Oracle {
    type Error = Z3Error;

    fn solve(
        &mut self,
        constraints: &ConstraintSet,
        timeout_secs: Option<u64>,
    ) -> Result<OracleResponse, Z3Error> {
        if timeout_secs == Some(0) {
            return Ok(OracleResponse::Timeout);
        }
        self.calls += 1;
        let vars: HashMap<String, z3::ast::Bool> = constraints
            .vars
            .iter()
            .map(|name| (name.clone(), z3::ast::Bool::new_const(name.as_str())))
            .collect();
        let solver = make_solver(timeout_secs);
        for assertion in &constraints.assertions {
            solver.assert(&translate(assertion, &vars)?);
        }
        debug!(
            vars = constraints.var_count(),
            assertions = constraints.assertions.len(),
            timeout_secs,
            "Running z3"
        );
        match solver.check() {
            Z3SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
                let mut assignment = Assignment::default();
                for (name, var) in &vars {
                    let value = model
                        .eval::<z3::ast::Bool>(var, true)
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                    assignment.values.insert(name.clone(), value);
                }
                Ok(OracleResponse::Sat(assignment))
            }
            Z3SatResult::Unsat => Ok(OracleResponse::Unsat),
            Z3SatResult::Unknown if timeout_secs.is_some() => Ok(OracleResponse::Timeout),
            Z3SatResult::Unknown => Err(Z3Error::Internal("Z3 returned unknown".into())),
        }
    }

    fn name(&self) -> &str {
        "z3"
    }
}
