//! Structural hashing and structural equality.
//!
//! Two sub-graphs are structurally equal when they have the same shape,
//! the same constants, operators, global names, types and attributes, up to
//! a consistent renaming of bound variables.
//!
//! A variable is bound when the compared sub-graph itself introduces it, as
//! a function parameter or a `let` variable. The names of bound variables are
//! cosmetic. A free variable refers to something outside the sub-graph, so
//! its name is part of the structure: `fn(%a) { add(%a, %y) }` and
//! `fn(%a) { add(%a, %z) }` differ.
//!
//! # Node correspondence
//!
//! Variables and compound nodes are matched by identity: the first time a
//! pair `(l, r)` is compared they are bound to each other, and every later
//! occurrence of `l` must meet `r` again (and vice versa). This gives
//! alpha-equivalence for variables and requires both sides to share
//! sub-graphs the same way. Leaves without identity (constants, operators,
//! global references) compare by value.
//!
//! [`Structural::hash`] numbers nodes in the same first-visit order the
//! comparison binds them, so structurally equal sub-graphs hash equally.
//!
//! # Ignored attributes
//!
//! A [`Structural`] policy can ignore attribute keys. The partitioning passes
//! ignore the external-name attribute so that a function compares equal to
//! its outlined copy.

mod equal;
mod hash;

use kiln_path::PathPair;

use crate::{ExprArena, ExprId, Function};

/// Comparison policy shared by hashing and equality.
#[derive(Clone, Debug, Default)]
pub struct Structural {
    ignored_attrs: Vec<String>,
}

impl Structural {
    pub fn new() -> Self {
        Structural {
            ignored_attrs: Vec::new(),
        }
    }

    /// Leave attribute `key` out of hashing and comparison.
    #[must_use]
    pub fn ignore_attr(mut self, key: &str) -> Self {
        if !self.is_ignored(key) {
            self.ignored_attrs.push(key.to_string());
        }
        self
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.ignored_attrs.iter().any(|ignored| ignored == key)
    }

    /// Fingerprint of the sub-graph rooted at `root`.
    pub fn hash(&self, arena: &ExprArena, root: ExprId) -> u64 {
        hash::StructuralHasher::new(arena, self).finish(root)
    }

    /// Positions of the first difference, or `None` when equal.
    ///
    /// Both roots are at `<root>` of their respective paths.
    pub fn first_mismatch(
        &self,
        lhs: &ExprArena,
        lhs_root: ExprId,
        rhs: &ExprArena,
        rhs_root: ExprId,
    ) -> Option<PathPair> {
        equal::StructuralEq::new(lhs, rhs, self).run(lhs_root, rhs_root)
    }

    /// [`Structural::first_mismatch`] for two functions held outside the
    /// arena, such as top-level units. Both functions are at `<root>`.
    pub fn function_mismatch(
        &self,
        lhs: &ExprArena,
        lhs_function: &Function,
        rhs: &ExprArena,
        rhs_function: &Function,
    ) -> Option<PathPair> {
        equal::StructuralEq::new(lhs, rhs, self).run_function(lhs_function, rhs_function)
    }

    pub fn equal(
        &self,
        lhs: &ExprArena,
        lhs_root: ExprId,
        rhs: &ExprArena,
        rhs_root: ExprId,
    ) -> bool {
        self.first_mismatch(lhs, lhs_root, rhs, rhs_root).is_none()
    }
}

/// [`Structural::hash`] with no ignored attributes.
pub fn structural_hash(arena: &ExprArena, root: ExprId) -> u64 {
    Structural::new().hash(arena, root)
}

/// [`Structural::first_mismatch`] with no ignored attributes.
pub fn first_mismatch(
    lhs: &ExprArena,
    lhs_root: ExprId,
    rhs: &ExprArena,
    rhs_root: ExprId,
) -> Option<PathPair> {
    Structural::new().first_mismatch(lhs, lhs_root, rhs, rhs_root)
}

/// [`Structural::equal`] with no ignored attributes.
pub fn structural_eq(lhs: &ExprArena, lhs_root: ExprId, rhs: &ExprArena, rhs_root: ExprId) -> bool {
    first_mismatch(lhs, lhs_root, rhs, rhs_root).is_none()
}
