//! This module contains errors pertaining to the worklist interpreter.

use thiserror::Error;

use crate::graph::{BlockId, ConditionId, JumpId};

/// Errors that occur while the worklist interpreter walks a
/// block/condition/jump graph.
///
/// The dangling-id variants attribute the offending node directly so that a
/// front-end bug can be reported against the graph element that caused it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The block {block:?} does not exist in the graph")]
    NoSuchBlock { block: BlockId },

    #[error("The condition {condition:?} does not exist in the graph")]
    NoSuchCondition { condition: ConditionId },

    #[error("The jump {jump:?} does not exist in the graph")]
    NoSuchJump { jump: JumpId },

    #[error("Interpretation was stopped by the watchdog")]
    StoppedByWatchdog,
}

/// The result type for methods that may have interpretation errors.
pub type Result<T> = std::result::Result<T, Error>;
