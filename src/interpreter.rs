//! This module contains the worklist interpreter that drives symbolic
//! exploration of a [`ControlGraph`].
//!
//! The interpreter is generic over the graph's statement and expression node
//! types; what those nodes _mean_ is supplied by two pluggable strategies,
//! [`StatementInterpreter`] and [`ExpressionInterpreter`]. The engine itself
//! only schedules: it executes each block against its path's scope, forks one
//! child path per outgoing jump (letting the oracle prune the provably
//! unreachable ones), and folds the outputs of completed paths into one
//! aggregate via if-then-else composition.
//!
//! # Ordering
//!
//! The worklist is a FIFO, so exploration is breadth-first in enqueue order.
//! Because output merging uses condition-gated if-then-else composition
//! rather than concatenation, the logical value of the combined outputs does
//! not depend on dequeue order; only the tie-break among simultaneously
//! feasible overlapping paths is order-sensitive.
//!
//! # Loops
//!
//! There is no cycle detection and no widening. A cyclic graph is explored
//! until the oracle proves every further unrolling infeasible; bounding an
//! unbounded loop is strictly an upstream graph-construction responsibility.

use std::collections::VecDeque;

use crate::{
    constant::DEFAULT_ELIDE_TAUTOLOGICAL_FORKS,
    error::{interpretation, Result},
    graph::{BlockId, ControlGraph},
    path::{ForkOutcome, PathId, PathTree},
    scope::{ScopeId, ScopeTree},
    solver::{Feasibility, Oracle},
    term::Term,
    watchdog::DynWatchdog,
};

/// How a variable reference is resolved by an expression interpreter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// Resolve to the variable's current valuation. This is the reduced
    /// resolution used for ordinary evaluation.
    Valuation,

    /// Resolve to the variable's stable placeholder, for callers that build
    /// solver-bookkeeping formulas rather than values.
    Placeholder,
}

/// The strategy that gives meaning to a block's statement list.
pub trait StatementInterpreter<S> {
    /// Executes `statements` against `scope`, mutating it, and returns the
    /// output terms the statements produce (typically from returns). Most
    /// blocks produce none.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] on a contract violation, which aborts the whole
    /// interpretation.
    fn execute(
        &mut self,
        scopes: &mut ScopeTree,
        scope: ScopeId,
        statements: &[S],
    ) -> Result<Vec<Term>>;
}

/// The strategy that lowers an expression node into a [`Term`].
pub trait ExpressionInterpreter<E> {
    /// Evaluates `expression` against `scope`, resolving variable references
    /// per `resolution`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] on a contract violation, which aborts the whole
    /// interpretation.
    fn evaluate(
        &mut self,
        scopes: &ScopeTree,
        scope: ScopeId,
        expression: &E,
        resolution: Resolution,
    ) -> Result<Term>;
}

/// An ephemeral unit of pending work: one path positioned at one block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct WorkItem {
    path:  PathId,
    block: BlockId,
}

/// The configuration for the interpreter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Whether to skip the satisfiability query when forking on a branch
    /// condition that simplifies to the constant `true`.
    ///
    /// The per-fork query is the dominant cost of an interpretation, and
    /// unconditional jumps fork on a syntactic tautology, so eliding those
    /// queries is almost always wanted.
    ///
    /// Defaults to [`DEFAULT_ELIDE_TAUTOLOGICAL_FORKS`].
    pub elide_tautological_forks: bool,
}

impl Config {
    /// Sets the `elide_tautological_forks` config parameter to `value`.
    #[must_use]
    pub fn with_elide_tautological_forks(mut self, value: bool) -> Self {
        self.elide_tautological_forks = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let elide_tautological_forks = DEFAULT_ELIDE_TAUTOLOGICAL_FORKS;
        Self {
            elide_tautological_forks,
        }
    }
}

/// The result of interpreting a graph to worklist exhaustion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Exploration {
    /// The combined outputs: slot by slot, the if-then-else composition of
    /// every completed path's contribution gated on that path's condition.
    pub outputs: Vec<Term>,

    /// The number of paths that reached the exit block.
    pub completed_paths: usize,

    /// The number of forks whose feasibility the oracle could not decide.
    ///
    /// These paths were explored — their conditions gate their contributions,
    /// so an unrealizable one contributes nothing to any feasible model —
    /// but callers must surface them: a non-zero count means the exploration
    /// may include unrealizable paths.
    pub undecided_paths: usize,
}

impl Exploration {
    fn empty() -> Self {
        Self {
            outputs: Vec::new(),
            completed_paths: 0,
            undecided_paths: 0,
        }
    }
}

/// The worklist interpreter for one [`ControlGraph`].
///
/// It owns the graph and the two node-interpretation strategies; the scope
/// tree and the oracle are passed per run so that callers can declare the
/// function's inputs in the root frame beforehand and inspect the tree
/// afterwards.
#[derive(Debug)]
pub struct Interpreter<S, E, SI, EI>
where
    SI: StatementInterpreter<S>,
    EI: ExpressionInterpreter<E>,
{
    /// The graph being interpreted.
    graph: ControlGraph<S, E>,

    /// The strategy executing statement lists.
    statements: SI,

    /// The strategy lowering expressions into terms.
    expressions: EI,

    /// The configuration of the interpreter.
    config: Config,

    /// A watchdog polled between work items to check whether the caller
    /// wants the run abandoned wholesale.
    watchdog: DynWatchdog,
}

impl<S, E, SI, EI> Interpreter<S, E, SI, EI>
where
    SI: StatementInterpreter<S>,
    EI: ExpressionInterpreter<E>,
{
    /// Constructs a new interpreter over `graph` with the provided
    /// strategies.
    pub fn new(
        graph: ControlGraph<S, E>,
        statements: SI,
        expressions: EI,
        config: Config,
        watchdog: DynWatchdog,
    ) -> Self {
        Self {
            graph,
            statements,
            expressions,
            config,
            watchdog,
        }
    }

    /// Gets the graph being interpreted.
    #[must_use]
    pub fn graph(&self) -> &ControlGraph<S, E> {
        &self.graph
    }

    /// Gets a reference to the interpreter's configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Interprets the graph from its entry block to worklist exhaustion,
    /// returning the combined outputs.
    ///
    /// The root path executes in `scope`, which would usually be the root of
    /// `scopes` with the function's inputs already declared. Work items are
    /// feasibility-checked when their fork is created, so the queue never
    /// holds a provably infeasible item.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] on a contract violation from the graph or a strategy,
    /// on oracle failure, or when the watchdog stops the run. Infeasible
    /// branches are not errors; they are pruned silently.
    pub fn interpret(
        &mut self,
        scopes: &mut ScopeTree,
        scope: ScopeId,
        oracle: &mut impl Oracle,
    ) -> Result<Exploration> {
        let mut paths =
            PathTree::new(scope).with_tautology_elision(self.config.elide_tautological_forks);
        let mut exploration = Exploration::empty();

        match paths.feasibility(paths.root(), scopes, oracle)? {
            Feasibility::Infeasible => {
                tracing::debug!("The root path is infeasible; nothing to explore");
                return Ok(exploration);
            }
            Feasibility::Undecided => exploration.undecided_paths += 1,
            Feasibility::Feasible => (),
        }

        let mut worklist = VecDeque::new();
        worklist.push_back(WorkItem {
            path:  paths.root(),
            block: self.graph.entry(),
        });

        // An interval of zero means polling on every item, not dividing by
        // zero below.
        let poll_interval = self.watchdog.poll_every().max(1);
        let mut counter: usize = 0;

        while let Some(item) = worklist.pop_front() {
            if counter % poll_interval == 0 && self.watchdog.should_stop() {
                return Err(interpretation::Error::StoppedByWatchdog.into());
            }
            counter += 1;
            tracing::trace!(path = ?item.path, block = ?item.block, "Executing work item");

            // The exit block is a terminal sentinel; reaching it completes
            // the path.
            if item.block == self.graph.exit() {
                exploration.completed_paths += 1;
                tracing::trace!(path = ?item.path, "Path reached the exit block");
                continue;
            }

            let path_scope = paths.scope(item.path)?;
            let block = self.graph.block(item.block)?;
            let produced = self
                .statements
                .execute(scopes, path_scope, block.statements())?;
            if !produced.is_empty() {
                let condition = paths.condition(item.path)?.clone();
                Self::fold_outputs(&mut exploration.outputs, &condition, produced);
            }

            let Some(condition_id) = self.graph.block(item.block)?.condition() else {
                continue;
            };
            let branch = self.graph.condition(condition_id)?;
            let actual = match branch.check() {
                Some(expression) => self.expressions.evaluate(
                    scopes,
                    path_scope,
                    expression,
                    Resolution::Valuation,
                )?,
                None => Term::True,
            };

            for jump_id in branch.jumps().to_vec() {
                let jump = self.graph.jump(jump_id)?;
                let target = jump.target();
                let expected = match jump.guard() {
                    Some(expression) => self.expressions.evaluate(
                        scopes,
                        path_scope,
                        expression,
                        Resolution::Valuation,
                    )?,
                    None => Term::True,
                };
                let guard = Term::eq(actual.clone(), expected);

                match paths.fork(item.path, &guard, scopes, oracle)? {
                    ForkOutcome::Taken(child) => {
                        worklist.push_back(WorkItem {
                            path:  child,
                            block: target,
                        });
                    }
                    ForkOutcome::Undecided(child) => {
                        exploration.undecided_paths += 1;
                        worklist.push_back(WorkItem {
                            path:  child,
                            block: target,
                        });
                    }
                    ForkOutcome::Pruned => (),
                }
            }
        }

        tracing::debug!(
            outputs = exploration.outputs.len(),
            completed = exploration.completed_paths,
            undecided = exploration.undecided_paths,
            "Interpretation ran to worklist exhaustion"
        );

        Ok(exploration)
    }

    /// Folds `produced` into the output accumulator slot by slot: the first
    /// path to reach a slot seeds it, and every later one wraps the slot in
    /// a selection gated on its own path condition.
    fn fold_outputs(outputs: &mut Vec<Term>, condition: &Term, produced: Vec<Term>) {
        for (slot, term) in produced.into_iter().enumerate() {
            if slot < outputs.len() {
                outputs[slot] =
                    Term::ite(condition.clone(), term, outputs[slot].clone()).simplify();
            } else {
                outputs.push(term);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{atomic::AtomicBool, Arc};

    use crate::{
        graph::ControlGraph,
        interpreter::{Config, Interpreter},
        scope::ScopeTree,
        solver::BoundedOracle,
        watchdog::{FlagWatchdog, LazyWatchdog},
    };

    use self::lang::{Expr, Stmt};

    /// A minimal statement language for exercising the engine. The richer
    /// scenario tests build their own under `tests/common`.
    mod lang {
        use crate::{
            error::Result,
            interpreter::{ExpressionInterpreter, Resolution, StatementInterpreter},
            scope::{ScopeId, ScopeTree},
            term::Term,
        };

        #[derive(Clone, Debug)]
        pub enum Expr {
            Int(i64),
            Var(&'static str),
            Add(Box<Expr>, Box<Expr>),
            Lt(Box<Expr>, Box<Expr>),
        }

        #[derive(Clone, Debug)]
        pub enum Stmt {
            Declare(&'static str, Expr),
            Assign(&'static str, Expr),
            Return(Expr),
        }

        #[derive(Clone, Debug, Default)]
        pub struct Expressions;

        impl Expressions {
            fn lower(
                scopes: &ScopeTree,
                scope: ScopeId,
                expression: &Expr,
                resolution: Resolution,
            ) -> Result<Term> {
                let term = match expression {
                    Expr::Int(value) => Term::integer(*value),
                    Expr::Var(name) => {
                        let (symbol, _) = scopes.lookup(scope, name)?;
                        match resolution {
                            Resolution::Valuation => scopes.valuation(scope, symbol)?,
                            Resolution::Placeholder => scopes.placeholder(scope, symbol)?,
                        }
                    }
                    Expr::Add(left, right) => Term::add(
                        Self::lower(scopes, scope, left, resolution)?,
                        Self::lower(scopes, scope, right, resolution)?,
                    ),
                    Expr::Lt(left, right) => Term::lt(
                        Self::lower(scopes, scope, left, resolution)?,
                        Self::lower(scopes, scope, right, resolution)?,
                    ),
                };
                Ok(term)
            }
        }

        impl ExpressionInterpreter<Expr> for Expressions {
            fn evaluate(
                &mut self,
                scopes: &ScopeTree,
                scope: ScopeId,
                expression: &Expr,
                resolution: Resolution,
            ) -> Result<Term> {
                Self::lower(scopes, scope, expression, resolution)
            }
        }

        #[derive(Clone, Debug, Default)]
        pub struct Statements;

        impl StatementInterpreter<Stmt> for Statements {
            fn execute(
                &mut self,
                scopes: &mut ScopeTree,
                scope: ScopeId,
                statements: &[Stmt],
            ) -> Result<Vec<Term>> {
                let mut outputs = Vec::new();
                for statement in statements {
                    match statement {
                        Stmt::Declare(name, initial) => {
                            let value = Expressions::lower(
                                scopes,
                                scope,
                                initial,
                                Resolution::Valuation,
                            )?;
                            let symbol = scopes.bind(scope, *name)?;
                            scopes.declare(scope, symbol, value)?;
                        }
                        Stmt::Assign(name, value) => {
                            let value = Expressions::lower(
                                scopes,
                                scope,
                                value,
                                Resolution::Valuation,
                            )?;
                            let (symbol, _) = scopes.lookup(scope, name)?;
                            scopes.assign(scope, symbol, value)?;
                        }
                        Stmt::Return(value) => {
                            outputs.push(Expressions::lower(
                                scopes,
                                scope,
                                value,
                                Resolution::Valuation,
                            )?);
                        }
                    }
                }
                Ok(outputs)
            }
        }
    }

    /// Builds a straight-line graph: declare `a := 1; a := a + 2; return a`.
    fn straight_line() -> ControlGraph<Stmt, Expr> {
        let mut graph = ControlGraph::new();
        let body = graph.add_block(vec![
            Stmt::Declare("a", Expr::Int(1)),
            Stmt::Assign("a", Expr::Add(Box::new(Expr::Var("a")), Box::new(Expr::Int(2)))),
            Stmt::Return(Expr::Var("a")),
        ]);
        let to_exit = graph.add_condition(None);
        graph
            .add_jump(to_exit, None, graph.exit())
            .expect("The exit block always exists");
        graph.set_condition(body, to_exit).expect("The block was just added");
        graph.set_entry(body);
        graph
    }

    #[test]
    fn interprets_a_straight_line_block() -> anyhow::Result<()> {
        let mut interpreter = Interpreter::new(
            straight_line(),
            lang::Statements,
            lang::Expressions,
            Config::default(),
            LazyWatchdog.in_rc(),
        );
        let mut scopes = ScopeTree::new();
        let mut oracle = BoundedOracle::new();

        let root = scopes.root();
        let exploration = interpreter.interpret(&mut scopes, root, &mut oracle)?;

        assert_eq!(exploration.outputs.len(), 1);
        assert_eq!(exploration.outputs[0].simplify(), crate::term::Term::integer(3));
        assert_eq!(exploration.completed_paths, 1);
        assert_eq!(exploration.undecided_paths, 0);

        Ok(())
    }

    #[test]
    fn unconditional_jumps_elide_the_feasibility_query() -> anyhow::Result<()> {
        // A budget of zero makes every query report unknown, so the only way
        // the straight-line program explores without undecided paths is for
        // its tautological forks to skip the oracle entirely. The seed
        // feasibility check still runs, hence exactly one undecided count.
        let mut interpreter = Interpreter::new(
            straight_line(),
            lang::Statements,
            lang::Expressions,
            Config::default().with_elide_tautological_forks(true),
            LazyWatchdog.in_rc(),
        );
        let mut scopes = ScopeTree::new();
        let mut oracle = BoundedOracle::new().with_assignment_budget(0);

        let root = scopes.root();
        let exploration = interpreter.interpret(&mut scopes, root, &mut oracle)?;

        assert_eq!(exploration.completed_paths, 1);
        assert_eq!(exploration.undecided_paths, 1);

        Ok(())
    }

    #[test]
    fn the_watchdog_stops_the_run() {
        let mut interpreter = Interpreter::new(
            straight_line(),
            lang::Statements,
            lang::Expressions,
            Config::default(),
            FlagWatchdog::new(Arc::new(AtomicBool::new(true)))
                .polling_every(1)
                .in_rc(),
        );
        let mut scopes = ScopeTree::new();
        let mut oracle = BoundedOracle::new();

        let root = scopes.root();
        let result = interpreter.interpret(&mut scopes, root, &mut oracle);
        assert!(result.is_err());
    }

    #[test]
    fn a_zero_poll_interval_polls_on_every_item() -> anyhow::Result<()> {
        let mut interpreter = Interpreter::new(
            straight_line(),
            lang::Statements,
            lang::Expressions,
            Config::default(),
            FlagWatchdog::new(Arc::new(AtomicBool::new(false)))
                .polling_every(0)
                .in_rc(),
        );
        let mut scopes = ScopeTree::new();
        let mut oracle = BoundedOracle::new();

        let root = scopes.root();
        let exploration = interpreter.interpret(&mut scopes, root, &mut oracle)?;
        assert_eq!(exploration.completed_paths, 1);

        Ok(())
    }

    #[test]
    fn assigning_an_undeclared_identifier_aborts_the_run() {
        let mut graph = ControlGraph::new();
        let body = graph.add_block(vec![Stmt::Assign("ghost", Expr::Int(1))]);
        let to_exit = graph.add_condition(None);
        graph
            .add_jump(to_exit, None, graph.exit())
            .expect("The exit block always exists");
        graph.set_condition(body, to_exit).expect("The block was just added");
        graph.set_entry(body);

        let mut interpreter = Interpreter::new(
            graph,
            lang::Statements,
            lang::Expressions,
            Config::default(),
            LazyWatchdog.in_rc(),
        );
        let mut scopes = ScopeTree::new();
        let mut oracle = BoundedOracle::new();

        let root = scopes.root();
        let result = interpreter.interpret(&mut scopes, root, &mut oracle);
        assert!(result.is_err());
    }
}
