//! This library implements the path-sensitive core of a symbolic execution
//! engine: it explores every control path of a lowered block graph at once,
//! computing for each declared variable a symbolic term over the function's
//! inputs rather than a concrete value.
//!
//! Note that this library is not intended to be nor expected to evolve into a
//! full verifier front-end. Lowering concrete source syntax into the block
//! graph, and bounding cyclic structure, are the caller's concern.
//!
//! # How it Works
//!
//! From a very high level, one exploration run proceeds as follows:
//!
//! 1. The caller lowers its program into a [`graph::ControlGraph`] of blocks,
//!    conditions and guarded jumps, and declares the function's inputs in the
//!    root frame of a [`scope::ScopeTree`]. Each input is bound to a
//!    [`term::Term`] placeholder, a free variable standing for "whatever the
//!    caller passes".
//! 2. The [`interpreter::Interpreter`] walks the graph breadth-first over a
//!    FIFO worklist. Every work item pairs a [`path::PathId`] with the block
//!    it has reached; the path carries the condition under which execution
//!    gets there, and owns a scope frame holding its private view of every
//!    variable.
//! 3. At each branch the path is forked once per outgoing jump. Before a
//!    child is scheduled, a [`solver::Oracle`] is asked whether the extended
//!    condition is satisfiable; provably unreachable branches are pruned on
//!    the spot, and undecided ones are explored but reported.
//! 4. Paths reaching the exit block contribute their outputs, gated on their
//!    path condition, to the run's [`interpreter::Exploration`]: slot by
//!    slot, outputs from different paths are folded into one if-then-else
//!    term.
//!
//! Alongside the worklist engine, [`path::PathTree::join`] offers the
//! structured-merge primitive directly: two sibling paths can be merged back
//! into one, synthesising a selection term for every variable on which they
//! disagree.
//!
//! # Basic Usage
//!
//! The fork/join primitives can be driven directly, without building a graph:
//!
//! ```
//! use sympath::{
//!     path::{ForkOutcome, PathTree},
//!     scope::ScopeTree,
//!     solver::{BoundedOracle, Oracle},
//!     term::{Sort, Term},
//! };
//!
//! let mut scopes = ScopeTree::new();
//! let root_scope = scopes.root();
//!
//! // One free input `x`, one local `n := 0`.
//! let x = scopes.bind(root_scope, "x").unwrap();
//! let x_term = scopes.declare_input(root_scope, x, Sort::Integer).unwrap();
//! let n = scopes.bind(root_scope, "n").unwrap();
//! scopes.declare(root_scope, n, Term::integer(0)).unwrap();
//!
//! let mut paths = PathTree::new(root_scope);
//! let mut oracle = BoundedOracle::new();
//! let root = paths.root();
//!
//! // if x > 0 { n := 10 }
//! let positive = Term::gt(x_term, Term::integer(0));
//! let ForkOutcome::Taken(then_path) =
//!     paths.fork(root, &positive, &mut scopes, &mut oracle).unwrap()
//! else {
//!     panic!("satisfiable");
//! };
//! let ForkOutcome::Taken(else_path) = paths
//!     .fork(root, &Term::not(positive.clone()), &mut scopes, &mut oracle)
//!     .unwrap()
//! else {
//!     panic!("satisfiable");
//! };
//! scopes.assign(paths.scope(then_path).unwrap(), n, Term::integer(10)).unwrap();
//!
//! // Merging the branches makes `n` a selection over the branch condition.
//! paths.join(else_path, then_path, &mut scopes).unwrap();
//! let merged = scopes.valuation(paths.scope(else_path).unwrap(), n).unwrap();
//! let expected = Term::ite(positive, Term::integer(10), Term::integer(0));
//! assert!(oracle.proves_equal(&Term::True, &merged, &expected).unwrap());
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod constant;
pub mod error;
pub mod graph;
pub mod interpreter;
pub mod path;
pub mod scope;
pub mod solver;
pub mod term;
pub mod watchdog;

// Re-exports to provide the library interface.
pub use interpreter::{Exploration, Interpreter};
pub use term::Term;
