//! This module contains the primary error type for the crate's interface. It
//! also re-exports the more specific error types that are subsystem-specific.

pub mod interpretation;
pub mod path;
pub mod scope;
pub mod solver;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the more-specific
/// child error types as appropriate.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
///
/// Note that path infeasibility is _not_ an error anywhere in the crate: an
/// infeasible fork is an expected outcome that prunes work. The errors here
/// are contract violations and resource failures, and the interpretation that
/// raised them must be abandoned rather than continued on a corrupted
/// scope/path tree.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Errors from the scope and symbol subsystem.
    #[error(transparent)]
    Scope(#[from] scope::Error),

    /// Errors from the path fork/join subsystem.
    #[error(transparent)]
    Path(#[from] path::Error),

    /// Errors raised by the decision-procedure backend.
    #[error(transparent)]
    Solver(#[from] solver::Error),

    /// Errors from the worklist interpreter.
    #[error(transparent)]
    Interpretation(#[from] interpretation::Error),
}
