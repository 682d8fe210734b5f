//! This module contains the [`PathTree`], the tree of hypothetical execution
//! traces explored during one interpretation run.
//!
//! Each path owns a scope frame and a path condition — the conjunction of
//! every guard accumulated from the root — and a child's condition always
//! implies its parent's. Paths support two primitives:
//!
//! - **Fork** creates a feasibility-checked child with a strictly more
//!   constrained condition, pruning branches the oracle proves unreachable as
//!   early as possible. Pruning is the mechanism that bounds path-space
//!   growth.
//! - **Join** merges a sibling's divergent state back into the receiver by
//!   synthesising if-then-else terms for every variable on which the two
//!   disagree, then disjoining the conditions. One primitive covers both
//!   if-then merging (join against the other fork of the same branch) and
//!   if-then-else merging.
//!
//! Paths live in an arena indexed by [`PathId`], parented by id, dropped
//! wholesale when the run ends.

use serde::{Deserialize, Serialize};

use crate::{
    constant::DEFAULT_ELIDE_TAUTOLOGICAL_FORKS,
    error::{path::Error, Result},
    scope::{ScopeId, ScopeTree, Symbol},
    solver::{Feasibility, Oracle},
    term::Term,
};

/// The identity of a path within a [`PathTree`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct PathId(u32);

/// One hypothetical execution trace.
#[derive(Clone, Debug)]
struct PathNode {
    /// The parent path, if this is not the root.
    parent: Option<PathId>,

    /// The scope frame owned by this path.
    scope: ScopeId,

    /// The path condition: which concrete inputs drive execution down this
    /// path.
    condition: Term,
}

/// The outcome of forking a path on a branch condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForkOutcome {
    /// The fork is feasible and was taken.
    Taken(PathId),

    /// The fork is provably infeasible; no child was created and no
    /// successor work should be scheduled. This is an expected outcome, not
    /// an error.
    Pruned,

    /// The oracle could not decide the fork's feasibility. The child exists
    /// and may be explored — an unrealizable path's condition gates its
    /// contributions off everywhere, whereas discarding it could lose a
    /// reachable path — but callers must report it rather than treating it
    /// as either of the decided outcomes.
    Undecided(PathId),
}

/// The arena of paths for one interpretation run.
#[derive(Clone, Debug)]
pub struct PathTree {
    /// The paths of the tree, indexed by [`PathId`].
    nodes: Vec<PathNode>,

    /// Whether to skip the satisfiability query when forking on a branch
    /// condition that simplifies to the constant `true`.
    elide_tautologies: bool,
}

impl PathTree {
    /// Constructs a new path tree whose root path owns `scope` and carries
    /// the trivial condition.
    #[must_use]
    pub fn new(scope: ScopeId) -> Self {
        let root = PathNode {
            parent: None,
            scope,
            condition: Term::True,
        };
        let nodes = vec![root];
        let elide_tautologies = DEFAULT_ELIDE_TAUTOLOGICAL_FORKS;
        Self {
            nodes,
            elide_tautologies,
        }
    }

    /// Sets whether tautological branch conditions skip the feasibility
    /// query.
    #[must_use]
    pub fn with_tautology_elision(mut self, elide: bool) -> Self {
        self.elide_tautologies = elide;
        self
    }

    /// Gets the id of the root path.
    #[must_use]
    pub fn root(&self) -> PathId {
        PathId(0)
    }

    /// Gets the condition of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist.
    pub fn condition(&self, path: PathId) -> Result<&Term> {
        Ok(&self.node(path)?.condition)
    }

    /// Gets the scope frame owned by `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist.
    pub fn scope(&self, path: PathId) -> Result<ScopeId> {
        Ok(self.node(path)?.scope)
    }

    /// Gets the parent of `path`, or [`None`] at the root.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist.
    pub fn parent(&self, path: PathId) -> Result<Option<PathId>> {
        Ok(self.node(path)?.parent)
    }

    /// Gets the number of paths created so far, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Checks whether the tree is empty. It never is: the root always
    /// exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Forks `path` on `branch_condition`, conjoining it (simplified) with
    /// the path's condition and checking the feasibility of the result.
    ///
    /// A feasible fork owns a fresh scope frame branched from the parent's.
    /// An infeasible fork creates nothing. When the branch condition
    /// simplifies to the constant `true` and tautology elision is enabled,
    /// the satisfiability query is skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist or the oracle fails.
    pub fn fork(
        &mut self,
        path: PathId,
        branch_condition: &Term,
        scopes: &mut ScopeTree,
        oracle: &mut impl Oracle,
    ) -> Result<ForkOutcome> {
        let parent = self.node(path)?;
        let parent_scope = parent.scope;
        let branch = oracle.simplify(branch_condition);
        let condition = oracle.simplify(&Term::and(parent.condition.clone(), branch.clone()));

        // Conjoining a tautology cannot change the feasibility the parent was
        // already checked for, so the query is elided on the branch condition
        // alone.
        let feasibility = if self.elide_tautologies && branch.is_true() {
            Feasibility::Feasible
        } else {
            self.feasibility_of(parent_scope, &condition, scopes, oracle)?
        };

        let outcome = match feasibility {
            Feasibility::Infeasible => {
                tracing::debug!(%condition, "Fork pruned as infeasible");
                return Ok(ForkOutcome::Pruned);
            }
            Feasibility::Feasible => {
                let child = self.push_child(path, scopes.branch(parent_scope)?, condition);
                ForkOutcome::Taken(child)
            }
            Feasibility::Undecided => {
                let child = self.push_child(path, scopes.branch(parent_scope)?, condition);
                tracing::debug!(?child, "Fork feasibility undecided");
                ForkOutcome::Undecided(child)
            }
        };

        Ok(outcome)
    }

    /// Checks the feasibility of `path`: whether the oracle finds a
    /// satisfying assignment for its condition conjoined with the
    /// placeholder/valuation equality of every visible symbol.
    ///
    /// The check is bracketed by an oracle push/pop so no assertion leaks
    /// into checks made for sibling paths.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist or the oracle fails.
    pub fn feasibility(
        &self,
        path: PathId,
        scopes: &ScopeTree,
        oracle: &mut impl Oracle,
    ) -> Result<Feasibility> {
        let node = self.node(path)?;
        self.feasibility_of(node.scope, &node.condition, scopes, oracle)
    }

    /// Checks whether `path` is feasible, with the undecided outcome
    /// conservatively counted as feasible.
    ///
    /// Callers that need to distinguish the third outcome use
    /// [`Self::feasibility`].
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `path` does not exist or the oracle fails.
    pub fn is_feasible(
        &self,
        path: PathId,
        scopes: &ScopeTree,
        oracle: &mut impl Oracle,
    ) -> Result<bool> {
        Ok(self.feasibility(path, scopes, oracle)? != Feasibility::Infeasible)
    }

    /// Merges the sibling path `preferred` into `receiver` in place.
    ///
    /// For every symbol visible from the receiver on which the two paths
    /// disagree, the receiver's valuation becomes
    /// `ite(preferred.condition, preferred's valuation, receiver's
    /// valuation)`; the receiver's condition then becomes the disjunction of
    /// both conditions. The tie-break is structural: wherever both paths'
    /// conditions hold simultaneously, the `preferred` argument wins and the
    /// receiver is the fallback.
    ///
    /// Symbols declared locally inside only one of the two paths are private
    /// to it and are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the two paths are not siblings (a fatal contract
    /// violation) or if either does not exist.
    pub fn join(
        &mut self,
        receiver: PathId,
        preferred: PathId,
        scopes: &mut ScopeTree,
    ) -> Result<()> {
        let receiver_node = self.node(receiver)?;
        let preferred_node = self.node(preferred)?;
        let siblings = receiver != preferred
            && receiver_node.parent.is_some()
            && receiver_node.parent == preferred_node.parent;
        if !siblings {
            return Err(Error::NotSiblings {
                receiver,
                donor: preferred,
            }
            .into());
        }

        let receiver_scope = receiver_node.scope;
        let preferred_scope = preferred_node.scope;
        let preferred_condition = preferred_node.condition.clone();

        // First pass: collect the disagreements without mutating anything.
        let mut divergent: Vec<(Symbol, Term)> = Vec::new();
        let mut visible: Vec<(Symbol, Term)> = Vec::new();
        scopes.visible_symbols(receiver_scope, |symbol, _, valuation| {
            visible.push((symbol, valuation.clone()));
        })?;
        for (symbol, receiver_valuation) in visible {
            // A symbol declared only inside the receiver is invisible to the
            // sibling and stays as-is.
            let Ok(preferred_valuation) = scopes.valuation(preferred_scope, symbol) else {
                continue;
            };
            if preferred_valuation != receiver_valuation {
                let merged = Term::ite(
                    preferred_condition.clone(),
                    preferred_valuation,
                    receiver_valuation,
                );
                divergent.push((symbol, merged));
            }
        }

        // Second pass: write the merged valuations as the receiver's
        // versions, then widen the receiver's condition.
        for (symbol, merged) in divergent {
            scopes.assign(receiver_scope, symbol, merged)?;
        }
        let receiver_node = self
            .nodes
            .get_mut(receiver.0 as usize)
            .expect("Path existence was checked above");
        receiver_node.condition =
            Term::or(receiver_node.condition.clone(), preferred_condition).simplify();

        Ok(())
    }

    fn push_child(&mut self, parent: PathId, scope: ScopeId, condition: Term) -> PathId {
        let id = PathId(
            u32::try_from(self.nodes.len()).expect("Path count should not exceed u32::MAX"),
        );
        self.nodes.push(PathNode {
            parent: Some(parent),
            scope,
            condition,
        });
        id
    }

    fn feasibility_of(
        &self,
        scope: ScopeId,
        condition: &Term,
        scopes: &ScopeTree,
        oracle: &mut impl Oracle,
    ) -> Result<Feasibility> {
        oracle.push();
        let queried = scopes
            .assert_bindings(scope, oracle)
            .and_then(|()| oracle.assert_term(condition).map_err(Into::into))
            .and_then(|()| oracle.check_sat().map_err(Into::into));
        oracle.pop(1)?;
        Ok(queried?.into())
    }

    fn node(&self, path: PathId) -> std::result::Result<&PathNode, Error> {
        self.nodes
            .get(path.0 as usize)
            .ok_or(Error::NoSuchPath { path })
    }
}
