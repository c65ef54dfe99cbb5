use super::*;
use pretty_assertions::assert_eq;

fn sample() -> Path {
    Path::root().attr("a").array_index(2).map_value("k")
}

#[test]
fn root_has_zero_length() {
    let root = Path::root();
    assert_eq!(root.len(), 0);
    assert!(root.is_root());
    assert!(root.is_empty());
    assert_eq!(root.last(), &Segment::Root);
}

#[test]
fn distinct_roots_are_equal() {
    assert_eq!(Path::root(), Path::root());
    assert!(Path::root().paths_equal(&Path::root()));
}

#[test]
fn extension_increments_length() {
    let path = sample();
    assert_eq!(path.len(), 3);
    assert_eq!(path.parent().map(|p| p.len()), Ok(2));
    assert!(!path.is_root());
    assert!(!path.is_empty());
}

#[test]
fn every_extension_kind() {
    let root = Path::root();
    let cases = [
        (root.attr("body"), Segment::Attr(Arc::from("body"))),
        (root.unknown_attr(), Segment::UnknownAttr),
        (root.array_index(4), Segment::ArrayIndex(4)),
        (root.missing_array_element(4), Segment::MissingArrayElement(4)),
        (root.map_value(7_i64), Segment::MapValue(PathKey::Int(7))),
        (root.missing_map_entry(), Segment::MissingMapEntry),
    ];
    for (path, expected) in cases {
        assert_eq!(path.len(), 1);
        assert_eq!(path.last(), &expected);
        assert_eq!(path.parent(), Ok(Path::root()));
    }
}

#[test]
fn parent_of_root_fails() {
    assert_eq!(Path::root().parent(), Err(PathError::RootHasNoParent));
}

#[test]
fn prefix_bounds() {
    let path = sample();
    assert_eq!(path.prefix(3), Ok(path.clone()));
    assert_eq!(path.prefix(0), Ok(Path::root()));
    assert_eq!(path.prefix(1), Ok(Path::root().attr("a")));
    assert_eq!(
        path.prefix(4),
        Err(PathError::PrefixTooLong {
            requested: 4,
            length: 3
        })
    );
}

#[test]
fn independently_built_paths_are_equal() {
    let a = Path::root().attr("args").array_index(1).missing_map_entry();
    let b = Path::root().attr("args").array_index(1).missing_map_entry();
    assert!(a.paths_equal(&b));
    assert_eq!(a, b);
}

#[test]
fn payload_differences_break_equality() {
    let base = Path::root().attr("args");
    assert_ne!(base.array_index(1), base.array_index(2));
    assert_ne!(base.array_index(1), base.missing_array_element(1));
    assert_ne!(base.map_value("x"), base.map_value("y"));
    assert_ne!(base.map_value(1_i64), base.map_value(1_u64));
    assert_ne!(Path::root().attr("a"), Path::root().attr("b"));
}

#[test]
fn different_lengths_are_unequal() {
    let short = Path::root().attr("a");
    let long = short.attr("b");
    assert!(!short.paths_equal(&long));
    assert!(!long.paths_equal(&short));
}

#[test]
fn unknown_attributes_compare_by_kind() {
    let a = Path::root().unknown_attr();
    let b = Path::root().unknown_attr();
    assert_eq!(a, b);
    assert_ne!(a, Path::root().attr("x"));
}

#[test]
fn shared_prefix_short_circuits() {
    let shared = Path::root().attr("body").attr("callee");
    let a = shared.array_index(0);
    let b = shared.array_index(0);
    let c = shared.array_index(1);
    assert!(a.paths_equal(&b));
    assert!(!a.paths_equal(&c));
}

#[test]
fn prefix_relation() {
    let p = Path::root().attr("body");
    let q = p.attr("args").array_index(0);
    assert!(p.is_prefix_of(&q));
    assert!(!q.is_prefix_of(&p));
    assert!(p.is_prefix_of(&p));
    assert!(Path::root().is_prefix_of(&q));

    let other = Path::root().attr("params").attr("args").array_index(0);
    assert!(!p.is_prefix_of(&other));
}

#[test]
fn prefix_relation_across_allocations() {
    let p = Path::root().attr("body").array_index(3);
    let q = Path::root().attr("body").array_index(3).attr("value");
    assert!(p.is_prefix_of(&q));
}

#[test]
fn rendering() {
    assert_eq!(Path::root().to_string(), "<root>");
    assert_eq!(sample().to_string(), "<root>.a[2][\"k\"]");
    assert_eq!(
        Path::root()
            .attr("attrs")
            .missing_map_entry()
            .to_string(),
        "<root>.attrs[<missing entry>]"
    );
    assert_eq!(
        Path::root()
            .attr("args")
            .missing_array_element(3)
            .unknown_attr()
            .to_string(),
        "<root>.args[<missing element #3>].<unknown attribute>"
    );
    assert_eq!(format!("{:?}", Path::root().attr("x")), "Path(<root>.x)");
}

#[test]
fn rendering_concatenates_segments() {
    let path = sample();
    let joined: String = path.segments().iter().map(ToString::to_string).collect();
    assert_eq!(path.to_string(), format!("<root>{joined}"));
    assert_eq!(path.segments().len(), path.len());
}

#[test]
fn ancestors_walk_leaf_to_root() {
    let path = sample();
    let lengths: Vec<usize> = path.ancestors().map(Path::len).collect();
    assert_eq!(lengths, vec![3, 2, 1, 0]);
}

#[test]
fn equal_paths_hash_equal() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(sample());
    set.insert(sample());
    set.insert(Path::root().attr("a"));
    assert_eq!(set.len(), 2);
}

#[test]
fn long_paths_drop_without_recursion() {
    let mut path = Path::root();
    for i in 0..500_000 {
        path = path.array_index(i);
    }
    assert_eq!(path.len(), 500_000);
    drop(path);
}

#[test]
fn dropping_a_branch_keeps_shared_prefix() {
    let prefix = Path::root().attr("body");
    let branch = prefix.attr("args").array_index(0);
    drop(branch);
    assert_eq!(prefix.to_string(), "<root>.body");
    assert_eq!(prefix.len(), 1);
}

#[test]
fn path_pair_swap() {
    let pair = PathPair::new(Path::root().attr("a"), Path::root().attr("b"));
    assert_eq!(pair.to_string(), "<root>.a vs <root>.b");
    let swapped = pair.clone().swapped();
    assert_eq!(swapped.lhs, pair.rhs);
    assert_eq!(swapped.rhs, pair.lhs);
    assert_eq!(PathPair::root().lhs, Path::root());
}
