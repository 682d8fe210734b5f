//! This module contains constants that are needed throughout the codebase.

/// The default radius of the integer domain searched by the bounded reference
/// oracle.
///
/// Integer variables are enumerated over `-radius..=radius`. The radius is
/// deliberately small: the bounded oracle exists to decide the compact
/// formulas that arise in feasibility checks, not to be a general decision
/// procedure.
pub const DEFAULT_BOUNDED_DOMAIN_RADIUS: i64 = 8;

/// The default maximum number of variable assignments the bounded reference
/// oracle will enumerate before giving up and returning an unknown outcome.
pub const DEFAULT_BOUNDED_ASSIGNMENT_BUDGET: u64 = 1_000_000;

/// The default number of worklist iterations the interpreter will wait before
/// polling the watchdog.
pub const DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS: usize = 100;

/// The default value for whether the interpreter elides the satisfiability
/// query when forking on a branch condition that is syntactically `true`.
pub const DEFAULT_ELIDE_TAUTOLOGICAL_FORKS: bool = true;
