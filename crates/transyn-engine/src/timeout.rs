//! Wall-clock budget of one synthesis run.
//!
//! `timeout_secs` from the options is turned into a single deadline when a
//! run starts (`0` means no limit and becomes `None`). Every stage then
//! polls that same deadline instead of keeping its own clock:
//!
//! * the backtracking search checks it on entry to each recursive step and
//!   unwinds with `SearchOutcome::TimedOut`, and so does automaton
//!   completion before adding a transition;
//! * the minimal-size driver hands the deadline to every size it tries, so
//!   the budget covers the whole sweep rather than each size;
//! * the CEGAR loop checks it before each iteration and passes the
//!   seconds left to the SAT oracle, which treats `Some(0)` as already
//!   expired.
//!
//! An expired budget is reported as `SynthesisResult::Unknown` carrying
//! [`timed_out`] for the stage that noticed it.

use std::time::{Duration, Instant};

pub fn deadline_from_timeout_secs(timeout_secs: u64) -> Option<Instant> {
    if timeout_secs == 0 {
        return None;
    }
    Instant::now().checked_add(Duration::from_secs(timeout_secs))
}

pub fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Budget for one oracle call: whole seconds left, rounded up so that a
/// live deadline never yields `Some(0)`.
pub fn remaining_timeout_secs(deadline: Option<Instant>) -> Option<u64> {
    let left = deadline?.checked_duration_since(Instant::now());
    let Some(left) = left.filter(|d| !d.is_zero()) else {
        return Some(0);
    };
    Some(left.as_secs() + u64::from(left.subsec_nanos() > 0))
}

pub fn timed_out(stage: &str) -> String {
    format!("{stage} ran out of time")
}
