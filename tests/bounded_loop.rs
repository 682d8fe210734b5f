//! This module is an integration test that runs the engine on a cyclic graph
//! whose loop bound is concrete, checking that exploration terminates through
//! pruning alone and produces the expected constant.
#![cfg(test)]

use sympath::{graph::ControlGraph, solver::BoundedOracle, term::Term};

mod common;

use common::{Expr, Stmt};

/// The function under test, expressed with a genuine back edge:
///
/// ```text
/// sum := 0
/// for x := 0; x < 2; x := x + 1 { sum := sum + 1 }
/// return sum
/// ```
fn counting_loop() -> anyhow::Result<ControlGraph<Stmt, Expr>> {
    let mut graph = ControlGraph::new();

    let entry = graph.add_block(vec![
        Stmt::Declare("sum", Expr::Int(0)),
        Stmt::Declare("x", Expr::Int(0)),
    ]);
    let body = graph.add_block(vec![
        Stmt::Assign("sum", Expr::add(Expr::var("sum"), Expr::Int(1))),
        Stmt::Assign("x", Expr::add(Expr::var("x"), Expr::Int(1))),
    ]);
    let tail = graph.add_block(vec![Stmt::Return(Expr::var("sum"))]);

    // Both the entry and the body branch on the same loop condition; the body
    // jumping back through it is what makes the graph cyclic.
    let check = graph.add_condition(Some(Expr::lt(Expr::var("x"), Expr::Int(2))));
    graph.add_jump(check, None, body)?;
    graph.add_jump(check, Some(Expr::Bool(false)), tail)?;
    graph.set_condition(entry, check)?;
    graph.set_condition(body, check)?;

    let exit = graph.exit();
    common::attach_fallthrough(&mut graph, tail, exit)?;
    graph.set_entry(entry);

    Ok(graph)
}

#[test]
fn a_concretely_bounded_loop_terminates_by_pruning() -> anyhow::Result<()> {
    let mut interpreter = common::new_unrestricted_interpreter(counting_loop()?);
    let (mut scopes, _) = common::scopes_with_inputs(&[])?;
    let mut oracle = BoundedOracle::new();

    let root = scopes.root();
    let exploration = interpreter.interpret(&mut scopes, root, &mut oracle)?;

    // Exactly one path survives: two trips through the body, then out.
    assert_eq!(exploration.completed_paths, 1);
    assert_eq!(exploration.undecided_paths, 0);
    assert_eq!(exploration.outputs.len(), 1);
    assert_eq!(exploration.outputs[0].simplify(), Term::integer(2));

    Ok(())
}
