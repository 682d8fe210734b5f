//! This module contains the [`ControlGraph`], the lowered block/condition/jump
//! representation that the worklist interpreter walks.
//!
//! Graphs are produced by an external front-end: translating concrete source
//! syntax (labels, gotos, loops, switches) into this shape is a separate
//! concern, as is any bounding of cyclic structure. The interpreter only ever
//! sees blocks holding statement lists, conditions holding a check expression
//! and a set of jumps, and jumps holding a guard expression and a destination
//! block. The graph is generic over the statement and expression node types,
//! which are interpreted by the pluggable strategies in
//! [`crate::interpreter`].

use serde::{Deserialize, Serialize};

use crate::error::interpretation::{Error, Result};

/// The identity of a block within a [`ControlGraph`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct BlockId(u32);

/// The identity of a condition within a [`ControlGraph`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct ConditionId(u32);

/// The identity of a jump within a [`ControlGraph`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct JumpId(u32);

/// A basic block: a statement list plus at most one condition deciding the
/// outgoing jumps.
///
/// A block with no condition has no successors; the designated exit block is
/// such a block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block<S> {
    statements: Vec<S>,
    condition:  Option<ConditionId>,
}

impl<S> Block<S> {
    /// Gets the statements executed when control enters the block.
    #[must_use]
    pub fn statements(&self) -> &[S] {
        self.statements.as_slice()
    }

    /// Gets the condition deciding the block's outgoing jumps, if any.
    #[must_use]
    pub fn condition(&self) -> Option<ConditionId> {
        self.condition
    }
}

/// A branch point: a check expression evaluated once, compared against the
/// guard of each jump.
///
/// A check of [`None`] means the canonical `true`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Condition<E> {
    check: Option<E>,
    jumps: Vec<JumpId>,
}

impl<E> Condition<E> {
    /// Gets the check expression, or [`None`] for the canonical `true`.
    #[must_use]
    pub fn check(&self) -> Option<&E> {
        self.check.as_ref()
    }

    /// Gets the jumps guarded by this condition.
    #[must_use]
    pub fn jumps(&self) -> &[JumpId] {
        self.jumps.as_slice()
    }
}

/// One outgoing edge: taken when the owning condition's check equals the
/// jump's guard.
///
/// A guard of [`None`] means the canonical `true`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Jump<E> {
    guard:  Option<E>,
    target: BlockId,
}

impl<E> Jump<E> {
    /// Gets the guard expression, or [`None`] for the canonical `true`.
    #[must_use]
    pub fn guard(&self) -> Option<&E> {
        self.guard.as_ref()
    }

    /// Gets the destination block of the jump.
    #[must_use]
    pub fn target(&self) -> BlockId {
        self.target
    }
}

/// The block/condition/jump graph walked by the interpreter.
///
/// # Construction
///
/// The graph is built incrementally: blocks are added with their statements,
/// conditions and jumps are added afterwards, and a block's condition is
/// attached with [`Self::set_condition`] once its jumps exist. This two-step
/// shape is what lets a jump target a block that appears earlier in the
/// source (loops) or later (forward branches). A fresh graph contains only
/// the exit block, which is also the entry until [`Self::set_entry`] says
/// otherwise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ControlGraph<S, E> {
    blocks:     Vec<Block<S>>,
    conditions: Vec<Condition<E>>,
    jumps:      Vec<Jump<E>>,
    entry:      BlockId,
}

impl<S, E> ControlGraph<S, E> {
    /// Constructs a new graph containing only the exit block.
    #[must_use]
    pub fn new() -> Self {
        let exit = Block {
            statements: Vec::new(),
            condition:  None,
        };
        let blocks = vec![exit];
        let conditions = Vec::new();
        let jumps = Vec::new();
        let entry = BlockId(0);
        Self {
            blocks,
            conditions,
            jumps,
            entry,
        }
    }

    /// Gets the designated entry block.
    #[must_use]
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// Gets the designated exit block, the sentinel at which a path
    /// terminates.
    #[must_use]
    pub fn exit(&self) -> BlockId {
        BlockId(0)
    }

    /// Designates `block` as the entry.
    pub fn set_entry(&mut self, block: BlockId) {
        self.entry = block;
    }

    /// Adds a block holding `statements` and no condition yet, returning its
    /// id.
    pub fn add_block(&mut self, statements: Vec<S>) -> BlockId {
        let id = BlockId(
            u32::try_from(self.blocks.len()).expect("Block count should not exceed u32::MAX"),
        );
        self.blocks.push(Block {
            statements,
            condition: None,
        });
        id
    }

    /// Adds a condition with the provided `check` expression and no jumps
    /// yet, returning its id.
    pub fn add_condition(&mut self, check: Option<E>) -> ConditionId {
        let id = ConditionId(
            u32::try_from(self.conditions.len())
                .expect("Condition count should not exceed u32::MAX"),
        );
        self.conditions.push(Condition {
            check,
            jumps: Vec::new(),
        });
        id
    }

    /// Adds a jump from `condition` to `target` under `guard`, returning its
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `condition` or `target` does not exist.
    pub fn add_jump(
        &mut self,
        condition: ConditionId,
        guard: Option<E>,
        target: BlockId,
    ) -> Result<JumpId> {
        self.block(target)?;
        self.condition(condition)?;

        let id = JumpId(
            u32::try_from(self.jumps.len()).expect("Jump count should not exceed u32::MAX"),
        );
        self.jumps.push(Jump { guard, target });
        self.conditions[condition.0 as usize].jumps.push(id);
        Ok(id)
    }

    /// Attaches `condition` to `block` as the decider of its outgoing jumps.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `block` or `condition` does not exist.
    pub fn set_condition(&mut self, block: BlockId, condition: ConditionId) -> Result<()> {
        self.condition(condition)?;
        self.blocks
            .get_mut(block.0 as usize)
            .ok_or(Error::NoSuchBlock { block })?
            .condition = Some(condition);
        Ok(())
    }

    /// Gets the block with the provided `block` id.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no such block exists, attributing the dangling id.
    pub fn block(&self, block: BlockId) -> Result<&Block<S>> {
        self.blocks
            .get(block.0 as usize)
            .ok_or(Error::NoSuchBlock { block })
    }

    /// Gets the condition with the provided `condition` id.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no such condition exists, attributing the dangling
    /// id.
    pub fn condition(&self, condition: ConditionId) -> Result<&Condition<E>> {
        self.conditions
            .get(condition.0 as usize)
            .ok_or(Error::NoSuchCondition { condition })
    }

    /// Gets the jump with the provided `jump` id.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no such jump exists, attributing the dangling id.
    pub fn jump(&self, jump: JumpId) -> Result<&Jump<E>> {
        self.jumps
            .get(jump.0 as usize)
            .ok_or(Error::NoSuchJump { jump })
    }
}

impl<S, E> Default for ControlGraph<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
