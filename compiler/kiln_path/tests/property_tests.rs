//! Property-based tests for the path model.
//!
//! Random segment sequences are replayed onto fresh roots so that equality
//! never relies on shared allocations.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use kiln_path::{Path, PathKey};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Step {
    Attr(String),
    Unknown,
    Index(usize),
    Missing(usize),
    MapStr(String),
    MapInt(i64),
    MissingEntry,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        "[a-z_]{1,8}".prop_map(Step::Attr),
        Just(Step::Unknown),
        (0usize..16).prop_map(Step::Index),
        (0usize..16).prop_map(Step::Missing),
        "[a-z]{0,4}".prop_map(Step::MapStr),
        any::<i64>().prop_map(Step::MapInt),
        Just(Step::MissingEntry),
    ]
}

fn steps_strategy() -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(step_strategy(), 0..24)
}

fn apply(base: &Path, step: &Step) -> Path {
    match step {
        Step::Attr(name) => base.attr(name),
        Step::Unknown => base.unknown_attr(),
        Step::Index(i) => base.array_index(*i),
        Step::Missing(i) => base.missing_array_element(*i),
        Step::MapStr(key) => base.map_value(PathKey::from(key.as_str())),
        Step::MapInt(key) => base.map_value(*key),
        Step::MissingEntry => base.missing_map_entry(),
    }
}

fn build(steps: &[Step]) -> Path {
    steps.iter().fold(Path::root(), |path, step| apply(&path, step))
}

proptest! {
    #[test]
    fn length_counts_steps(steps in steps_strategy()) {
        prop_assert_eq!(build(&steps).len(), steps.len());
    }

    #[test]
    fn full_prefix_is_self_and_empty_prefix_is_root(steps in steps_strategy()) {
        let path = build(&steps);
        prop_assert!(path.prefix(path.len()).unwrap().paths_equal(&path));
        prop_assert!(path.prefix(0).unwrap().paths_equal(&Path::root()));
        prop_assert!(path.prefix(path.len() + 1).is_err());
    }

    #[test]
    fn independent_builds_are_equal(steps in steps_strategy()) {
        let a = build(&steps);
        let b = build(&steps);
        prop_assert!(a.paths_equal(&b));
        prop_assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn base_is_prefix_of_extension(base in steps_strategy(), extra in steps_strategy()) {
        let p = build(&base);
        let q = extra.iter().fold(p.clone(), |path, step| apply(&path, step));
        prop_assert!(p.is_prefix_of(&q));
        prop_assert_eq!(q.is_prefix_of(&p), p.paths_equal(&q));
        prop_assert_eq!(q.is_prefix_of(&p), extra.is_empty());
    }

    #[test]
    fn rebuilt_base_is_prefix_of_extension(base in steps_strategy(), extra in steps_strategy()) {
        let mut all = base.clone();
        all.extend(extra);
        prop_assert!(build(&base).is_prefix_of(&build(&all)));
    }

    #[test]
    fn prefix_agrees_with_truncated_steps(steps in steps_strategy(), cut in 0usize..24) {
        let cut = cut.min(steps.len());
        let path = build(&steps);
        prop_assert!(path.prefix(cut).unwrap().paths_equal(&build(&steps[..cut])));
    }

    #[test]
    fn rendering_concatenates_segments(steps in steps_strategy()) {
        let path = build(&steps);
        let expected: String = steps
            .iter()
            .map(|step| apply(&Path::root(), step).last().to_string())
            .collect();
        prop_assert_eq!(path.to_string(), format!("<root>{expected}"));
    }
}
