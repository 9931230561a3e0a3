//! Boolean constraint layer for transducer synthesis.
//!
//! This crate provides propositional terms and constraint sets, the
//! [`solver::SatOracle`] contract, an SMT-LIB2 process backend for z3 and
//! cvc5, an in-process backend on the `z3` crate, and the plant constraint
//! encoder used by the CEGAR loop.

pub mod backends;
pub mod constraints;
pub mod encoder;
pub mod solver;
pub mod terms;

pub use backends::process::{OracleError, ProcessOracle, SolverKind};
pub use backends::z3_backend::{Z3Error, Z3Oracle};
pub use constraints::ConstraintSet;
pub use encoder::PlantEncoder;
pub use solver::{Assignment, OracleResponse, SatOracle};
pub use terms::SatTerm;
