//! This module contains errors pertaining to the path fork/join machinery.

use thiserror::Error;

use crate::path::PathId;

/// Errors that occur when operating on the [`crate::path::PathTree`].
///
/// As with the scope errors, these are contract violations: they indicate
/// that the caller has mis-wired the path tree, not that the analyzed program
/// has some property. They abort the current interpretation.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The paths {receiver:?} and {donor:?} are not siblings and cannot be joined")]
    NotSiblings { receiver: PathId, donor: PathId },

    #[error("The path {path:?} does not exist in this path tree")]
    NoSuchPath { path: PathId },
}

/// The result type for methods that may have path errors.
pub type Result<T> = std::result::Result<T, Error>;
