//! This module contains errors raised by decision-procedure backends.

use thiserror::Error;

use crate::term::Term;

/// Errors that a [`crate::solver::Oracle`] implementation can raise.
///
/// These are hard backend failures. A query that the backend ran but could
/// not decide is _not_ an error; it is the
/// [`crate::solver::SatOutcome::Unknown`] outcome, which callers must handle
/// as a third value rather than collapsing into either of the others.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The term {term} is not well-sorted for this query")]
    IllSortedTerm { term: Term },

    #[error("Cannot pop {requested} assertion frames when only {available} are pushed")]
    NoSuchFrame { requested: usize, available: usize },

    #[error("The solver backend failed: {message}")]
    Backend { message: String },
}

/// The result type for methods that may have solver errors.
pub type Result<T> = std::result::Result<T, Error>;
