//! This module is an integration test checking that a run is abandoned
//! wholesale when the watchdog requests a stop.
#![cfg(test)]

use std::sync::{atomic::AtomicBool, Arc};

use sympath::{
    error::{interpretation, Error},
    solver::BoundedOracle,
    watchdog::FlagWatchdog,
};

mod common;

use common::{Expr, Stmt};

#[test]
fn a_raised_flag_stops_the_run() -> anyhow::Result<()> {
    let graph = common::branch_graph(
        Vec::new(),
        Expr::lt(Expr::var("n"), Expr::var("m")),
        vec![Stmt::Return(Expr::var("n"))],
        vec![Stmt::Return(Expr::var("m"))],
        false,
    )?;
    let flag = Arc::new(AtomicBool::new(true));
    let watchdog = FlagWatchdog::new(flag).polling_every(1).in_rc();
    let mut interpreter = common::new_interpreter(graph, watchdog);
    let (mut scopes, _) = common::scopes_with_inputs(&["n", "m"])?;
    let mut oracle = BoundedOracle::new();

    let root = scopes.root();
    let result = interpreter.interpret(&mut scopes, root, &mut oracle);
    assert!(matches!(
        result,
        Err(Error::Interpretation(interpretation::Error::StoppedByWatchdog))
    ));

    Ok(())
}
