//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.
//!
//! The engine is generic over the statement and expression node types of the
//! graph it walks, so the tests need a concrete language to lower. The one
//! here is deliberately tiny: integer expressions over named variables, and
//! the three statements (declare, assign, return) that the scope machinery
//! distinguishes.

#![cfg(test)]

use sympath::{
    error::Result,
    graph::{BlockId, ControlGraph},
    interpreter::{
        Config,
        ExpressionInterpreter,
        Interpreter,
        Resolution,
        StatementInterpreter,
    },
    scope::{ScopeId, ScopeTree},
    term::{Sort, Term},
    watchdog::{DynWatchdog, LazyWatchdog},
};

/// An expression of the test language.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Bool(bool),
    Int(i64),
    Var(&'static str),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
}

#[allow(unused)] // Each scenario uses its own subset.
impl Expr {
    pub fn var(name: &'static str) -> Self {
        Self::Var(name)
    }

    pub fn add(left: Expr, right: Expr) -> Self {
        Self::Add(Box::new(left), Box::new(right))
    }

    pub fn sub(left: Expr, right: Expr) -> Self {
        Self::Sub(Box::new(left), Box::new(right))
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::Lt(Box::new(left), Box::new(right))
    }
}

/// A statement of the test language.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stmt {
    Declare(&'static str, Expr),
    Assign(&'static str, Expr),
    Return(Expr),
}

/// The expression-lowering strategy for the test language.
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
            Expr::Bool(true) => Term::True,
            Expr::Bool(false) => Term::False,
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
            Expr::Sub(left, right) => Term::sub(
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

/// The statement-execution strategy for the test language.
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
                    let value =
                        Expressions::lower(scopes, scope, initial, Resolution::Valuation)?;
                    let symbol = scopes.bind(scope, *name)?;
                    scopes.declare(scope, symbol, value)?;
                }
                Stmt::Assign(name, value) => {
                    let value =
                        Expressions::lower(scopes, scope, value, Resolution::Valuation)?;
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

/// Constructs an interpreter over `graph` with the test-language strategies,
/// the default configuration, and the provided `watchdog`.
#[allow(unused)] // It is actually
pub fn new_interpreter(
    graph: ControlGraph<Stmt, Expr>,
    watchdog: DynWatchdog,
) -> Interpreter<Stmt, Expr, Statements, Expressions> {
    Interpreter::new(graph, Statements, Expressions, Config::default(), watchdog)
}

/// Constructs an interpreter over `graph` with the test-language strategies
/// and no execution restrictions.
#[allow(unused)] // It is actually
pub fn new_unrestricted_interpreter(
    graph: ControlGraph<Stmt, Expr>,
) -> Interpreter<Stmt, Expr, Statements, Expressions> {
    new_interpreter(graph, LazyWatchdog.in_rc())
}

/// Declares the named integer inputs in the root frame of a fresh scope tree,
/// returning the tree and the placeholder term of each input in order.
#[allow(unused)] // It is actually
pub fn scopes_with_inputs(names: &[&'static str]) -> anyhow::Result<(ScopeTree, Vec<Term>)> {
    let mut scopes = ScopeTree::new();
    let root = scopes.root();
    let mut placeholders = Vec::with_capacity(names.len());
    for name in names {
        let symbol = scopes.bind(root, *name)?;
        placeholders.push(scopes.declare_input(root, symbol, Sort::Integer)?);
    }
    Ok((scopes, placeholders))
}

/// Builds a two-armed branch graph: `entry` runs `prologue`, then branches on
/// `check`; the true arm runs `consequence` and the false arm `alternative`,
/// and both arms fall through to the exit.
///
/// When `swap_jump_order` is set the false arm's jump is registered first,
/// reversing the enqueue order of the two forks without changing which guard
/// leads where.
#[allow(unused)] // It is actually
pub fn branch_graph(
    prologue: Vec<Stmt>,
    check: Expr,
    consequence: Vec<Stmt>,
    alternative: Vec<Stmt>,
    swap_jump_order: bool,
) -> anyhow::Result<ControlGraph<Stmt, Expr>> {
    let mut graph = ControlGraph::new();

    let entry = graph.add_block(prologue);
    let then_block = graph.add_block(consequence);
    let else_block = graph.add_block(alternative);

    let branch = graph.add_condition(Some(check));
    if swap_jump_order {
        graph.add_jump(branch, Some(Expr::Bool(false)), else_block)?;
        graph.add_jump(branch, None, then_block)?;
    } else {
        graph.add_jump(branch, None, then_block)?;
        graph.add_jump(branch, Some(Expr::Bool(false)), else_block)?;
    }
    graph.set_condition(entry, branch)?;

    let exit = graph.exit();
    attach_fallthrough(&mut graph, then_block, exit)?;
    attach_fallthrough(&mut graph, else_block, exit)?;
    graph.set_entry(entry);

    Ok(graph)
}

/// Attaches an unconditional jump from `block` to `target`.
#[allow(unused)] // It is actually
pub fn attach_fallthrough(
    graph: &mut ControlGraph<Stmt, Expr>,
    block: BlockId,
    target: BlockId,
) -> anyhow::Result<()> {
    let fallthrough = graph.add_condition(None);
    graph.add_jump(fallthrough, None, target)?;
    graph.set_condition(block, fallthrough)?;
    Ok(())
}
