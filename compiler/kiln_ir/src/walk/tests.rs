use super::*;
use crate::{Attrs, Literal};
use pretty_assertions::assert_eq;

fn rendered(visits: &[Visit]) -> Vec<String> {
    visits.iter().map(|v| v.path.to_string()).collect()
}

#[test]
fn children_before_parents() {
    let mut arena = ExprArena::new();
    let add = arena.op("add");
    let x = arena.var("x", None);
    let one = arena.constant(Literal::Int(1));
    let call = arena.call(add, [x, one]);

    let visits = post_order(&arena, call, Path::root());
    let ids: Vec<ExprId> = visits.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![add, x, one, call]);
    assert_eq!(
        rendered(&visits),
        vec!["<root>.callee", "<root>.args[0]", "<root>.args[1]", "<root>"]
    );
}

#[test]
fn shared_nodes_are_visited_once_at_first_path() {
    let mut arena = ExprArena::new();
    let add = arena.op("add");
    let x = arena.var("x", None);
    let shared = arena.call(add, [x, x]);
    let outer = arena.tuple([shared, shared]);

    let visits = post_order(&arena, outer, Path::root());
    assert_eq!(visits.len(), 4);
    let shared_visit = visits.iter().find(|v| v.id == shared);
    assert_eq!(
        shared_visit.map(|v| v.path.to_string()),
        Some("<root>.fields[0]".to_string())
    );
    let x_visit = visits.iter().find(|v| v.id == x);
    assert_eq!(
        x_visit.map(|v| v.path.to_string()),
        Some("<root>.fields[0].args[0]".to_string())
    );
}

#[test]
fn function_params_precede_body() {
    let mut arena = ExprArena::new();
    let x = arena.var("x", None);
    let relu = arena.op("nn.relu");
    let body = arena.call(relu, [x]);
    let f = arena.function([x], body, Attrs::new());
    let call = arena.call(f, [x]);

    let visits = post_order(&arena, call, Path::root().attr("body"));
    assert_eq!(
        rendered(&visits),
        vec![
            "<root>.body.callee.params[0]",
            "<root>.body.callee.body.callee",
            "<root>.body.callee.body",
            "<root>.body.callee",
            "<root>.body",
        ]
    );
}

#[test]
fn visited_set_spans_roots() {
    let mut arena = ExprArena::new();
    let x = arena.var("x", None);
    let first = arena.tuple([x]);
    let second = arena.tuple([x]);

    let mut walker = PostOrder::new(&arena);
    assert_eq!(walker.visit(first, Path::root().attr("a")).len(), 2);
    assert!(walker.is_visited(x));
    let again = walker.visit(second, Path::root().attr("b"));
    assert_eq!(rendered(&again), vec!["<root>.b"]);
    assert!(walker.visit(first, Path::root()).is_empty());
}

#[test]
fn deep_chain_does_not_recurse() {
    let mut arena = ExprArena::new();
    let neg = arena.op("negative");
    let mut expr = arena.var("x", None);
    for _ in 0..100_000 {
        expr = arena.call(neg, [expr]);
    }
    let visits = post_order(&arena, expr, Path::root());
    assert_eq!(visits.len(), arena.len());
    assert_eq!(visits.last().map(|v| v.id), Some(expr));
}

#[test]
fn params_and_let_vars_are_bound() {
    let mut arena = ExprArena::new();
    let a = arena.var("a", None);
    let y = arena.var("y", None);
    let v = arena.var("v", None);
    let add = arena.op("add");
    let sum = arena.call(add, [a, y]);
    let body = arena.let_binding(v, sum, v);
    let f = arena.function([a], body, Attrs::new());

    let bound = bound_vars(&arena, f);
    assert!(bound.contains(&a));
    assert!(bound.contains(&v));
    assert!(!bound.contains(&y));

    let free = free_vars(&arena, f, Path::root().attr("body").attr("callee"));
    assert_eq!(free.iter().map(|v| v.id).collect::<Vec<_>>(), vec![y]);
    assert_eq!(rendered(&free), vec!["<root>.body.callee.body.value.args[1]"]);
}

#[test]
fn closed_function_has_no_free_vars() {
    let mut arena = ExprArena::new();
    let a = arena.var("a", None);
    let relu = arena.op("nn.relu");
    let body = arena.call(relu, [a]);
    let f = arena.function([a], body, Attrs::new());
    assert!(free_vars(&arena, f, Path::root()).is_empty());
}
