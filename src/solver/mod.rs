//! This module contains the seam between the path machinery and the SMT
//! decision procedure that judges the formulas it builds.
//!
//! The core only ever asks sat/unsat questions; it never inspects models.
//! Everything it needs from a backend is captured by the [`Oracle`] trait,
//! and every outcome is three-valued: a backend that cannot decide a query
//! says so via [`SatOutcome::Unknown`], and that third value is propagated
//! (as [`Feasibility::Undecided`]) rather than being collapsed into either
//! boolean. Collapsing it would either unsoundly prune reachable paths or
//! silently explore unrealizable ones.

pub mod bounded;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use crate::solver::bounded::BoundedOracle;
use crate::{error::solver::Result, term::Term};

/// The outcome of a satisfiability query.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SatOutcome {
    /// The asserted formulas have a satisfying assignment.
    Sat,

    /// The asserted formulas have no satisfying assignment.
    Unsat,

    /// The backend could not decide the query.
    Unknown,
}

/// The feasibility of a path, as judged by an oracle.
///
/// This is the path-level projection of [`SatOutcome`]: a path is feasible
/// iff the oracle finds a satisfying assignment for its condition together
/// with the placeholder/valuation equalities of every visible symbol.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Feasibility {
    /// Some concrete input drives execution down this path.
    Feasible,

    /// No concrete input can drive execution down this path.
    Infeasible,

    /// The oracle could not decide whether the path is reachable.
    Undecided,
}

impl From<SatOutcome> for Feasibility {
    fn from(value: SatOutcome) -> Self {
        match value {
            SatOutcome::Sat => Self::Feasible,
            SatOutcome::Unsat => Self::Infeasible,
            SatOutcome::Unknown => Self::Undecided,
        }
    }
}

/// The interface to the decision procedure consumed by the path machinery.
///
/// # Assertion Scoping
///
/// The oracle is a single shared mutable resource across every path explored
/// by one interpretation, so all feasibility checks must bracket their
/// assertions with [`Oracle::push`] and [`Oracle::pop`]. Assertions that leak
/// between sibling paths corrupt every subsequent query. The provided
/// helpers on this trait perform that bracketing and should be preferred
/// over manual push/assert/pop sequences.
pub trait Oracle {
    /// Pushes a new assertion frame onto the oracle's stack.
    fn push(&mut self);

    /// Pops the `frames` most recent assertion frames from the oracle's
    /// stack, discarding every assertion made within them.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if fewer than `frames` frames have been pushed.
    fn pop(&mut self, frames: usize) -> Result<()>;

    /// Asserts `term` within the current assertion frame.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend rejects the term.
    fn assert_term(&mut self, term: &Term) -> Result<()>;

    /// Checks the satisfiability of the conjunction of every asserted term.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] only on backend failure. A query that ran but could
    /// not be decided is the [`SatOutcome::Unknown`] outcome, not an error.
    fn check_sat(&mut self) -> Result<SatOutcome>;

    /// Simplifies `term`, returning a term with the same logical value.
    ///
    /// The default implementation performs the local constant folding from
    /// [`Term::simplify`]; backends with stronger simplifiers can override
    /// it.
    fn simplify(&self, term: &Term) -> Term {
        term.simplify()
    }

    /// Replaces the variables of `term` according to `mapping`.
    ///
    /// The default implementation is the structural replacement from
    /// [`Term::substitute`].
    fn substitute(&self, term: &Term, mapping: &BTreeMap<u32, Term>) -> Term {
        term.substitute(mapping)
    }

    /// Checks the satisfiability of `term` alone, in a fresh assertion frame
    /// on top of whatever is currently asserted.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails.
    fn is_satisfiable(&mut self, term: &Term) -> Result<SatOutcome> {
        self.push();
        let outcome = self.assert_term(term).and_then(|()| self.check_sat());
        self.pop(1)?;
        outcome
    }

    /// Checks whether `conclusion` holds in every model of `assumption`, by
    /// refuting `assumption && !conclusion`.
    ///
    /// An [`SatOutcome::Unknown`] query outcome makes this return `false`:
    /// entailment is only claimed when it is actually proved.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails.
    fn proves(&mut self, assumption: &Term, conclusion: &Term) -> Result<bool> {
        let refutation = Term::and(assumption.clone(), Term::not(conclusion.clone()));
        Ok(self.is_satisfiable(&refutation)? == SatOutcome::Unsat)
    }

    /// Checks whether `left` and `right` are provably equal in every model of
    /// `assumption`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the backend fails.
    fn proves_equal(&mut self, assumption: &Term, left: &Term, right: &Term) -> Result<bool> {
        self.proves(assumption, &Term::eq(left.clone(), right.clone()))
    }
}
