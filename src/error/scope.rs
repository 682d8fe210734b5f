//! This module contains errors pertaining to the scope tree and its symbol
//! bookkeeping.

use thiserror::Error;

use crate::scope::{ScopeId, Symbol};

/// Errors that occur when operating on the [`crate::scope::ScopeTree`].
///
/// Every variant here is a contract violation on the part of the graph
/// builder or an interpreter plug-in, never a property of the program under
/// analysis. Callers must treat them as fatal for the current interpretation.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The identifier {name:?} is not declared in the scope chain starting at {scope:?}")]
    UndeclaredIdentifier { scope: ScopeId, name: String },

    #[error("The symbol {symbol:?} has no binding in the scope chain starting at {scope:?}")]
    UnboundSymbol { scope: ScopeId, symbol: Symbol },

    #[error(
        "The symbol {symbol:?} is already declared in scope {scope:?}; shadowing requires a \
         child scope"
    )]
    AlreadyDeclared { scope: ScopeId, symbol: Symbol },

    #[error("The scope {scope:?} does not exist in this scope tree")]
    NoSuchScope { scope: ScopeId },
}

/// The result type for methods that may have scope errors.
pub type Result<T> = std::result::Result<T, Error>;
