use super::*;
use crate::DType;
use pretty_assertions::assert_eq;

#[test]
fn alloc_and_lookup() {
    let mut arena = ExprArena::new();
    assert!(arena.is_empty());
    let x = arena.var("x", Some(Type::scalar(DType::Float32)));
    let one = arena.constant(Literal::Int(1));
    assert_eq!(arena.len(), 2);
    assert_eq!(x, ExprId::new(0));
    assert_eq!(arena.kind(one), &ExprKind::Constant(Literal::Int(1)));
    assert!(arena.get(ExprId::new(9)).is_none());
}

#[test]
fn replace_is_seen_by_every_parent() {
    let mut arena = ExprArena::new();
    let add = arena.op("add");
    let x = arena.var("x", None);
    let shared = arena.call(add, [x, x]);
    let left = arena.tuple([shared]);
    let right = arena.tuple_get(shared, 0);

    let old = arena.replace(shared, ExprKind::Constant(Literal::Bool(true)));
    assert_eq!(old.kind_name(), "call");
    for parent in [left, right] {
        let child = arena.kind(parent).edges()[0].1;
        assert_eq!(arena.kind(child), &ExprKind::Constant(Literal::Bool(true)));
    }
}

#[test]
fn as_function_only_matches_literals() {
    let mut arena = ExprArena::new();
    let x = arena.var("x", None);
    let f = arena.function([x], x, Attrs::new().with("Compiler", "dnnl"));
    assert!(arena.as_function(x).is_none());
    let function = arena.as_function(f);
    assert_eq!(function.map(|f| f.params.clone()), Some(vec![x]));
    assert_eq!(function.and_then(|f| f.body), Some(x));
}

#[test]
fn extract_copies_only_reachable_nodes() {
    let mut arena = ExprArena::new();
    let _unrelated = arena.constant(Literal::Int(7));
    let relu = arena.op("nn.relu");
    let x = arena.var("x", None);
    let call = arena.call(relu, [x]);
    let f = arena.function([x], call, Attrs::new());

    let (copy, root) = arena.extract(f);
    assert_eq!(copy.len(), 4);
    let function = copy.as_function(root);
    assert!(function.is_some());
    let body = function.and_then(|f| f.body).map(|b| copy.kind(b).kind_name());
    assert_eq!(body, Some("call"));
}

#[test]
fn extract_preserves_sharing() {
    let mut arena = ExprArena::new();
    let add = arena.op("add");
    let x = arena.var("x", None);
    let shared = arena.call(add, [x, x]);
    let outer = arena.call(add, [shared, shared]);

    let (copy, root) = arena.extract(outer);
    // add, x, shared, outer
    assert_eq!(copy.len(), 4);
    match copy.kind(root) {
        ExprKind::Call { args, .. } => assert_eq!(args[0], args[1]),
        other => panic!("expected a call, found {other:?}"),
    }
}

#[test]
fn extract_handles_deep_nesting() {
    let mut arena = ExprArena::new();
    let neg = arena.op("negative");
    let mut expr = arena.var("x", None);
    for _ in 0..50_000 {
        expr = arena.call(neg, [expr]);
    }
    let (copy, _) = arena.extract(expr);
    assert_eq!(copy.len(), arena.len());
}
