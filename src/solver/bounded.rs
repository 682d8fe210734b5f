//! This module contains the bounded reference implementation of the
//! [`Oracle`] trait.
//!
//! The bounded oracle decides queries by exhaustively enumerating assignments
//! to the free variables of the asserted formulas, with integer variables
//! drawn from a bounded domain. Within that domain it is a genuine decision
//! procedure: `Unsat` means no assignment in the domain satisfies the
//! formulas, and `Unknown` is returned whenever the search space exceeds the
//! configured budget rather than ever guessing.
//!
//! It exists so that the crate is usable and testable without linking an
//! external solver; deployments that need full integer reasoning plug a real
//! backend (Z3 and friends) in through the [`Oracle`] trait instead.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::{
    constant::{DEFAULT_BOUNDED_ASSIGNMENT_BUDGET, DEFAULT_BOUNDED_DOMAIN_RADIUS},
    error::solver::{Error, Result},
    solver::{Oracle, SatOutcome},
    term::{Sort, Term},
};

/// A concrete value taken by a variable during enumeration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Value {
    Boolean(bool),
    Integer(i64),
}

/// An [`Oracle`] that decides queries by exhaustive enumeration over a
/// bounded integer domain.
#[derive(Clone, Debug)]
pub struct BoundedOracle {
    /// The asserted terms, in assertion order across all frames.
    assertions: Vec<Term>,

    /// The assertion count at the start of each pushed frame.
    frames: Vec<usize>,

    /// Integer variables are enumerated over `-domain_radius..=domain_radius`.
    domain_radius: i64,

    /// The maximum number of assignments enumerated per query before the
    /// oracle reports an unknown outcome.
    assignment_budget: u64,
}

impl BoundedOracle {
    /// Constructs a new bounded oracle with the default domain radius and
    /// assignment budget.
    #[must_use]
    pub fn new() -> Self {
        let assertions = Vec::new();
        let frames = Vec::new();
        let domain_radius = DEFAULT_BOUNDED_DOMAIN_RADIUS;
        let assignment_budget = DEFAULT_BOUNDED_ASSIGNMENT_BUDGET;
        Self {
            assertions,
            frames,
            domain_radius,
            assignment_budget,
        }
    }

    /// Sets the radius of the integer domain searched by the oracle.
    #[must_use]
    pub fn with_domain_radius(mut self, radius: i64) -> Self {
        self.domain_radius = radius.abs();
        self
    }

    /// Sets the maximum number of assignments enumerated per query.
    #[must_use]
    pub fn with_assignment_budget(mut self, budget: u64) -> Self {
        self.assignment_budget = budget;
        self
    }

    /// Gets the number of currently asserted terms, across all frames.
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.assertions.len()
    }

    /// The number of values a variable of `sort` ranges over.
    fn cardinality(&self, sort: Sort) -> u64 {
        match sort {
            Sort::Boolean => 2,
            #[allow(clippy::cast_sign_loss)] // The radius is kept non-negative.
            Sort::Integer => (2 * self.domain_radius + 1) as u64,
        }
    }

    /// The `index`th value in the enumeration order of `sort`.
    #[allow(clippy::cast_possible_wrap)] // Indices are bounded by cardinality.
    fn value_at(&self, sort: Sort, index: u64) -> Value {
        match sort {
            Sort::Boolean => Value::Boolean(index == 1),
            Sort::Integer => Value::Integer(index as i64 - self.domain_radius),
        }
    }

    /// Evaluates `term` under `assignment`, failing if the term mixes sorts
    /// in a way that has no value.
    fn evaluate(term: &Term, assignment: &BTreeMap<u32, Value>) -> Result<Value> {
        let ill_sorted = || Error::IllSortedTerm { term: term.clone() };
        let boolean = |t: &Term| -> Result<bool> {
            match Self::evaluate(t, assignment)? {
                Value::Boolean(b) => Ok(b),
                Value::Integer(_) => Err(ill_sorted()),
            }
        };
        let integer = |t: &Term| -> Result<i64> {
            match Self::evaluate(t, assignment)? {
                Value::Integer(i) => Ok(i),
                Value::Boolean(_) => Err(ill_sorted()),
            }
        };

        let value = match term {
            Term::True => Value::Boolean(true),
            Term::False => Value::Boolean(false),
            Term::Integer { value } => Value::Integer(*value),
            Term::Variable { id, sort } => match assignment.get(id) {
                Some(value) => *value,
                // A variable the query never constrains; any value will do.
                None => match sort {
                    Sort::Boolean => Value::Boolean(false),
                    Sort::Integer => Value::Integer(0),
                },
            },
            Term::Not { inner } => Value::Boolean(!boolean(inner)?),
            Term::And { left, right } => Value::Boolean(boolean(left)? && boolean(right)?),
            Term::Or { left, right } => Value::Boolean(boolean(left)? || boolean(right)?),
            Term::Eq { left, right } => {
                let left = Self::evaluate(left, assignment)?;
                let right = Self::evaluate(right, assignment)?;
                match (left, right) {
                    (Value::Boolean(l), Value::Boolean(r)) => Value::Boolean(l == r),
                    (Value::Integer(l), Value::Integer(r)) => Value::Boolean(l == r),
                    _ => return Err(ill_sorted()),
                }
            }
            Term::Lt { left, right } => Value::Boolean(integer(left)? < integer(right)?),
            Term::Le { left, right } => Value::Boolean(integer(left)? <= integer(right)?),
            Term::Add { left, right } => {
                Value::Integer(integer(left)?.wrapping_add(integer(right)?))
            }
            Term::Sub { left, right } => {
                Value::Integer(integer(left)?.wrapping_sub(integer(right)?))
            }
            Term::Mul { left, right } => {
                Value::Integer(integer(left)?.wrapping_mul(integer(right)?))
            }
            Term::Neg { inner } => Value::Integer(integer(inner)?.wrapping_neg()),
            Term::Ite {
                condition,
                then,
                otherwise,
            } => {
                if boolean(condition)? {
                    Self::evaluate(then, assignment)?
                } else {
                    Self::evaluate(otherwise, assignment)?
                }
            }
        };

        Ok(value)
    }
}

impl Default for BoundedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle for BoundedOracle {
    fn push(&mut self) {
        self.frames.push(self.assertions.len());
    }

    fn pop(&mut self, frames: usize) -> Result<()> {
        if frames > self.frames.len() {
            return Err(Error::NoSuchFrame {
                requested: frames,
                available: self.frames.len(),
            });
        }

        for _ in 0..frames {
            let restore_to = self.frames.pop().expect("Frame presence was just checked");
            self.assertions.truncate(restore_to);
        }

        Ok(())
    }

    fn assert_term(&mut self, term: &Term) -> Result<()> {
        self.assertions.push(term.clone());
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatOutcome> {
        // Anything refuted by folding alone never needs enumeration.
        let assertions = self
            .assertions
            .iter()
            .map(Term::simplify)
            .filter(|term| !term.is_true())
            .collect_vec();
        if assertions.iter().any(Term::is_false) {
            return Ok(SatOutcome::Unsat);
        }

        let mut variables = BTreeMap::new();
        for assertion in &assertions {
            assertion.variables(&mut variables);
        }
        let variables = variables.into_iter().collect_vec();

        let mut search_space: u64 = 1;
        for (_, sort) in &variables {
            search_space = search_space.saturating_mul(self.cardinality(*sort));
        }
        if search_space > self.assignment_budget {
            tracing::debug!(
                variables = variables.len(),
                budget = self.assignment_budget,
                "Search space exceeds the assignment budget"
            );
            return Ok(SatOutcome::Unknown);
        }

        // Odometer-style enumeration of every assignment in the domain.
        let mut indices = vec![0u64; variables.len()];
        loop {
            let assignment: BTreeMap<u32, Value> = variables
                .iter()
                .zip(&indices)
                .map(|((id, sort), index)| (*id, self.value_at(*sort, *index)))
                .collect();

            let mut holds = true;
            for assertion in &assertions {
                match Self::evaluate(assertion, &assignment)? {
                    Value::Boolean(true) => (),
                    Value::Boolean(false) => {
                        holds = false;
                        break;
                    }
                    Value::Integer(_) => {
                        return Err(Error::IllSortedTerm {
                            term: assertion.clone(),
                        })
                    }
                }
            }
            if holds {
                return Ok(SatOutcome::Sat);
            }

            let mut position = 0;
            loop {
                if position == variables.len() {
                    return Ok(SatOutcome::Unsat);
                }
                indices[position] += 1;
                if indices[position] == self.cardinality(variables[position].1) {
                    indices[position] = 0;
                    position += 1;
                } else {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        solver::{BoundedOracle, Oracle, SatOutcome},
        term::{Sort, Term},
    };

    #[test]
    fn decides_a_contradiction_as_unsat() -> anyhow::Result<()> {
        let x = Term::variable(0, Sort::Integer);
        let contradiction = Term::and(
            Term::gt(x.clone(), Term::integer(0)),
            Term::le(x, Term::integer(0)),
        );

        let mut oracle = BoundedOracle::new();
        assert_eq!(oracle.is_satisfiable(&contradiction)?, SatOutcome::Unsat);

        Ok(())
    }

    #[test]
    fn decides_a_satisfiable_constraint_as_sat() -> anyhow::Result<()> {
        let x = Term::variable(0, Sort::Integer);
        let constraint = Term::gt(x, Term::integer(3));

        let mut oracle = BoundedOracle::new();
        assert_eq!(oracle.is_satisfiable(&constraint)?, SatOutcome::Sat);

        Ok(())
    }

    #[test]
    fn reports_unknown_past_the_assignment_budget() -> anyhow::Result<()> {
        let constraint = Term::lt(
            Term::add(
                Term::variable(0, Sort::Integer),
                Term::variable(1, Sort::Integer),
            ),
            Term::variable(2, Sort::Integer),
        );

        let mut oracle = BoundedOracle::new().with_assignment_budget(10);
        assert_eq!(oracle.is_satisfiable(&constraint)?, SatOutcome::Unknown);

        Ok(())
    }

    #[test]
    fn popped_assertions_do_not_leak_into_later_queries() -> anyhow::Result<()> {
        let x = Term::variable(0, Sort::Integer);
        let mut oracle = BoundedOracle::new();

        oracle.push();
        oracle.assert_term(&Term::gt(x.clone(), Term::integer(0)))?;
        oracle.push();
        oracle.assert_term(&Term::le(x.clone(), Term::integer(0)))?;
        assert_eq!(oracle.check_sat()?, SatOutcome::Unsat);
        oracle.pop(1)?;

        // The inner contradiction is gone; the outer constraint remains.
        assert_eq!(oracle.check_sat()?, SatOutcome::Sat);
        oracle.pop(1)?;
        assert_eq!(oracle.assertion_count(), 0);

        Ok(())
    }

    #[test]
    fn popping_more_frames_than_pushed_is_an_error() {
        let mut oracle = BoundedOracle::new();
        oracle.push();
        assert!(oracle.pop(2).is_err());
    }

    #[test]
    fn entailment_helper_proves_under_assumption() -> anyhow::Result<()> {
        let x = Term::variable(0, Sort::Integer);
        let assumption = Term::gt(x.clone(), Term::integer(2));
        let conclusion = Term::gt(x.clone(), Term::integer(0));

        let mut oracle = BoundedOracle::new();
        assert!(oracle.proves(&assumption, &conclusion)?);
        assert!(!oracle.proves(&conclusion, &assumption)?);

        Ok(())
    }
}
