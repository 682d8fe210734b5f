//! This module contains the definition of the symbolic [`Term`] language and
//! its supporting [`Sort`]s.
//!
//! Terms are the currency of the whole crate: scopes store them as
//! placeholders and valuations, paths accumulate them as conditions, and the
//! interpreter folds them into output formulas. The decision procedure that
//! judges them is consumed abstractly (see [`crate::solver::Oracle`]), but the
//! term representation itself is a closed variant type owned here, so all
//! dispatch over term kinds happens in one place without reflection.

use std::{collections::BTreeMap, fmt::Formatter};

use serde::{Deserialize, Serialize};

/// The type of a boxed term.
///
/// Terms are recursive, so in the vast majority of positions indirection is
/// needed.
pub type BoxedTerm = Box<Term>;

/// The sorts that a term or declared variable can have.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Sort {
    /// The sort of truth values.
    Boolean,

    /// The sort of (unbounded, as far as this crate is concerned) integers.
    Integer,
}

impl Sort {
    /// Gets the canonical zero term for this sort, used as the valuation of
    /// variables that are defined without an initialiser.
    #[must_use]
    pub fn canonical_zero(self) -> Term {
        match self {
            Self::Boolean => Term::False,
            Self::Integer => Term::integer(0),
        }
    }
}

/// A symbolic term over declared variables.
///
/// The variant set is intentionally closed: it covers the boolean connectives,
/// equality, linear integer arithmetic and if-then-else synthesis that the
/// path machinery needs, and nothing more. Richer source-level operators are
/// the concern of the pluggable expression interpreters, which must lower into
/// this language.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Term {
    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// An integer constant.
    Integer { value: i64 },

    /// A named constant of the given sort.
    ///
    /// Variables are identified by the opaque `id` handed out by the
    /// [`crate::scope::SymbolFactory`], which guarantees that identifiers
    /// never collide within one interpretation run.
    Variable { id: u32, sort: Sort },

    /// Boolean negation.
    Not { inner: BoxedTerm },

    /// Boolean conjunction.
    And { left: BoxedTerm, right: BoxedTerm },

    /// Boolean disjunction.
    Or { left: BoxedTerm, right: BoxedTerm },

    /// Equality between two terms of the same sort.
    Eq { left: BoxedTerm, right: BoxedTerm },

    /// Strict less-than over integers.
    Lt { left: BoxedTerm, right: BoxedTerm },

    /// Non-strict less-than over integers.
    Le { left: BoxedTerm, right: BoxedTerm },

    /// Integer addition.
    Add { left: BoxedTerm, right: BoxedTerm },

    /// Integer subtraction.
    Sub { left: BoxedTerm, right: BoxedTerm },

    /// Integer multiplication.
    Mul { left: BoxedTerm, right: BoxedTerm },

    /// Integer negation.
    Neg { inner: BoxedTerm },

    /// If-then-else selection: `then` when `condition` holds, `otherwise`
    /// when it does not.
    ///
    /// This is the variant through which divergent paths merge, both in
    /// [`crate::path::PathTree::join`] and in the interpreter's output
    /// accumulator.
    Ite {
        condition: BoxedTerm,
        then:      BoxedTerm,
        otherwise: BoxedTerm,
    },
}

impl Term {
    /// Constructs an integer constant term.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::Integer { value }
    }

    /// Constructs a variable term with the provided `id` and `sort`.
    #[must_use]
    pub fn variable(id: u32, sort: Sort) -> Self {
        Self::Variable { id, sort }
    }

    /// Constructs the negation of `inner`.
    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    /// Constructs the conjunction of `left` and `right`.
    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs the disjunction of `left` and `right`.
    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs the equality of `left` and `right`.
    #[must_use]
    pub fn eq(left: Self, right: Self) -> Self {
        Self::Eq {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs `left < right`.
    #[must_use]
    pub fn lt(left: Self, right: Self) -> Self {
        Self::Lt {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs `left <= right`.
    #[must_use]
    pub fn le(left: Self, right: Self) -> Self {
        Self::Le {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs `left > right` as the argument-swapped strict less-than.
    #[must_use]
    pub fn gt(left: Self, right: Self) -> Self {
        Self::lt(right, left)
    }

    /// Constructs `left >= right` as the argument-swapped non-strict
    /// less-than.
    #[must_use]
    pub fn ge(left: Self, right: Self) -> Self {
        Self::le(right, left)
    }

    /// Constructs the sum of `left` and `right`.
    #[must_use]
    pub fn add(left: Self, right: Self) -> Self {
        Self::Add {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs the difference of `left` and `right`.
    #[must_use]
    pub fn sub(left: Self, right: Self) -> Self {
        Self::Sub {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs the product of `left` and `right`.
    #[must_use]
    pub fn mul(left: Self, right: Self) -> Self {
        Self::Mul {
            left:  Box::new(left),
            right: Box::new(right),
        }
    }

    /// Constructs the arithmetic negation of `inner`.
    #[must_use]
    pub fn neg(inner: Self) -> Self {
        Self::Neg {
            inner: Box::new(inner),
        }
    }

    /// Constructs the if-then-else selection of `then` and `otherwise` under
    /// `condition`.
    #[must_use]
    pub fn ite(condition: Self, then: Self, otherwise: Self) -> Self {
        Self::Ite {
            condition: Box::new(condition),
            then:      Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Gets the sort of the term.
    ///
    /// Terms are well-sorted by construction contract, so the sort can be
    /// read off the head variant; for [`Term::Ite`] it is the sort of the
    /// `then` arm.
    #[must_use]
    pub fn sort(&self) -> Sort {
        match self {
            Self::True
            | Self::False
            | Self::Not { .. }
            | Self::And { .. }
            | Self::Or { .. }
            | Self::Eq { .. }
            | Self::Lt { .. }
            | Self::Le { .. } => Sort::Boolean,
            Self::Integer { .. }
            | Self::Add { .. }
            | Self::Sub { .. }
            | Self::Mul { .. }
            | Self::Neg { .. } => Sort::Integer,
            Self::Variable { sort, .. } => *sort,
            Self::Ite { then, .. } => then.sort(),
        }
    }

    /// Checks if this term is syntactically the constant `true`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Checks if this term is syntactically the constant `false`.
    #[must_use]
    pub fn is_false(&self) -> bool {
        matches!(self, Self::False)
    }

    /// Performs local simplification of the term, folding constants and
    /// applying the boolean identities.
    ///
    /// This is not a decision procedure; it exists to keep the path
    /// conditions that accumulate along a fork chain structurally small, and
    /// to make syntactic tautologies recognisable so that the interpreter can
    /// elide satisfiability queries for them.
    #[must_use]
    pub fn simplify(&self) -> Self {
        match self {
            Self::Not { inner } => match inner.simplify() {
                Self::True => Self::False,
                Self::False => Self::True,
                Self::Not { inner } => *inner,
                simplified => Self::not(simplified),
            },
            Self::And { left, right } => match (left.simplify(), right.simplify()) {
                (Self::False, _) | (_, Self::False) => Self::False,
                (Self::True, side) | (side, Self::True) => side,
                (l, r) if l == r => l,
                (l, r) => Self::and(l, r),
            },
            Self::Or { left, right } => match (left.simplify(), right.simplify()) {
                (Self::True, _) | (_, Self::True) => Self::True,
                (Self::False, side) | (side, Self::False) => side,
                (l, r) if l == r => l,
                (l, r) => Self::or(l, r),
            },
            Self::Eq { left, right } => match (left.simplify(), right.simplify()) {
                (l, r) if l == r => Self::True,
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    if l == r {
                        Self::True
                    } else {
                        Self::False
                    }
                }
                (Self::True, Self::False) | (Self::False, Self::True) => Self::False,
                (l, r) => Self::eq(l, r),
            },
            Self::Lt { left, right } => match (left.simplify(), right.simplify()) {
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    if l < r {
                        Self::True
                    } else {
                        Self::False
                    }
                }
                (l, r) => Self::lt(l, r),
            },
            Self::Le { left, right } => match (left.simplify(), right.simplify()) {
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    if l <= r {
                        Self::True
                    } else {
                        Self::False
                    }
                }
                (l, r) if l == r => Self::True,
                (l, r) => Self::le(l, r),
            },
            Self::Add { left, right } => match (left.simplify(), right.simplify()) {
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    Self::integer(l.wrapping_add(r))
                }
                (Self::Integer { value: 0 }, side) | (side, Self::Integer { value: 0 }) => side,
                (l, r) => Self::add(l, r),
            },
            Self::Sub { left, right } => match (left.simplify(), right.simplify()) {
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    Self::integer(l.wrapping_sub(r))
                }
                (side, Self::Integer { value: 0 }) => side,
                (l, r) if l == r => Self::integer(0),
                (l, r) => Self::sub(l, r),
            },
            Self::Mul { left, right } => match (left.simplify(), right.simplify()) {
                (Self::Integer { value: l }, Self::Integer { value: r }) => {
                    Self::integer(l.wrapping_mul(r))
                }
                (Self::Integer { value: 0 }, _) | (_, Self::Integer { value: 0 }) => {
                    Self::integer(0)
                }
                (Self::Integer { value: 1 }, side) | (side, Self::Integer { value: 1 }) => side,
                (l, r) => Self::mul(l, r),
            },
            Self::Neg { inner } => match inner.simplify() {
                Self::Integer { value } => Self::integer(value.wrapping_neg()),
                Self::Neg { inner } => *inner,
                simplified => Self::neg(simplified),
            },
            Self::Ite {
                condition,
                then,
                otherwise,
            } => match (condition.simplify(), then.simplify(), otherwise.simplify()) {
                (Self::True, t, _) => t,
                (Self::False, _, o) => o,
                (_, t, o) if t == o => t,
                (c, t, o) => Self::ite(c, t, o),
            },
            other => other.clone(),
        }
    }

    /// Replaces every variable whose id appears in `mapping` with the
    /// corresponding term, leaving all other structure untouched.
    #[must_use]
    pub fn substitute(&self, mapping: &BTreeMap<u32, Term>) -> Self {
        match self {
            Self::Variable { id, .. } => mapping.get(id).cloned().unwrap_or_else(|| self.clone()),
            Self::True | Self::False | Self::Integer { .. } => self.clone(),
            Self::Not { inner } => Self::not(inner.substitute(mapping)),
            Self::And { left, right } => {
                Self::and(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Or { left, right } => {
                Self::or(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Eq { left, right } => {
                Self::eq(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Lt { left, right } => {
                Self::lt(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Le { left, right } => {
                Self::le(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Add { left, right } => {
                Self::add(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Sub { left, right } => {
                Self::sub(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Mul { left, right } => {
                Self::mul(left.substitute(mapping), right.substitute(mapping))
            }
            Self::Neg { inner } => Self::neg(inner.substitute(mapping)),
            Self::Ite {
                condition,
                then,
                otherwise,
            } => Self::ite(
                condition.substitute(mapping),
                then.substitute(mapping),
                otherwise.substitute(mapping),
            ),
        }
    }

    /// Collects the free variables of the term into `into`, keyed by variable
    /// id.
    pub fn variables(&self, into: &mut BTreeMap<u32, Sort>) {
        match self {
            Self::Variable { id, sort } => {
                into.insert(*id, *sort);
            }
            Self::True | Self::False | Self::Integer { .. } => (),
            Self::Not { inner } | Self::Neg { inner } => inner.variables(into),
            Self::And { left, right }
            | Self::Or { left, right }
            | Self::Eq { left, right }
            | Self::Lt { left, right }
            | Self::Le { left, right }
            | Self::Add { left, right }
            | Self::Sub { left, right }
            | Self::Mul { left, right } => {
                left.variables(into);
                right.variables(into);
            }
            Self::Ite {
                condition,
                then,
                otherwise,
            } => {
                condition.variables(into);
                then.variables(into);
                otherwise.variables(into);
            }
        }
    }
}

/// Renders the term in an SMT-style prefix notation, with variables printed as
/// `v` followed by their id.
impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Integer { value } => write!(f, "{value}"),
            Self::Variable { id, .. } => write!(f, "v{id}"),
            Self::Not { inner } => write!(f, "(not {inner})"),
            Self::And { left, right } => write!(f, "(and {left} {right})"),
            Self::Or { left, right } => write!(f, "(or {left} {right})"),
            Self::Eq { left, right } => write!(f, "(= {left} {right})"),
            Self::Lt { left, right } => write!(f, "(< {left} {right})"),
            Self::Le { left, right } => write!(f, "(<= {left} {right})"),
            Self::Add { left, right } => write!(f, "(+ {left} {right})"),
            Self::Sub { left, right } => write!(f, "(- {left} {right})"),
            Self::Mul { left, right } => write!(f, "(* {left} {right})"),
            Self::Neg { inner } => write!(f, "(- {inner})"),
            Self::Ite {
                condition,
                then,
                otherwise,
            } => write!(f, "(ite {condition} {then} {otherwise})"),
        }
    }
}
