//! Structural fingerprints.
//!
//! # Strategy
//!
//! Recursive depth-first traversal in [`ExprKind::edges`] order. For each node:
//! 1. Hash `discriminant(kind)`
//! 2. Leaves without identity: hash the payload
//! 3. Variables and compound nodes: on first visit assign the next ordinal
//!    and hash the content; on a revisit hash only the ordinal
//!
//! `ExprId` values are never hashed. Names of bound variables are never
//! hashed; free variables hash their name.

use std::hash::{Hash, Hasher};
use std::mem;

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use kiln_stack::ensure_sufficient_stack;

use super::Structural;
use crate::{bound_vars, Attrs, ExprArena, ExprId, ExprKind, Function};

const FIRST_VISIT: u8 = 0;
const REVISIT: u8 = 1;

pub(super) struct StructuralHasher<'a> {
    arena: &'a ExprArena,
    policy: &'a Structural,
    state: FxHasher,
    ordinals: FxHashMap<ExprId, u32>,
    bound: FxHashSet<ExprId>,
}

impl<'a> StructuralHasher<'a> {
    pub(super) fn new(arena: &'a ExprArena, policy: &'a Structural) -> Self {
        StructuralHasher {
            arena,
            policy,
            state: FxHasher::default(),
            ordinals: FxHashMap::default(),
            bound: FxHashSet::default(),
        }
    }

    pub(super) fn finish(mut self, root: ExprId) -> u64 {
        self.bound = bound_vars(self.arena, root);
        self.node(root);
        self.state.finish()
    }

    /// Hash the identity of `id` if seen before. Returns `true` if so.
    fn revisit(&mut self, id: ExprId) -> bool {
        if let Some(&ordinal) = self.ordinals.get(&id) {
            REVISIT.hash(&mut self.state);
            ordinal.hash(&mut self.state);
            return true;
        }
        // ordinals are dense, so the count fits whenever ids do
        let ordinal = u32::try_from(self.ordinals.len()).unwrap_or(u32::MAX);
        self.ordinals.insert(id, ordinal);
        FIRST_VISIT.hash(&mut self.state);
        false
    }

    fn node(&mut self, id: ExprId) {
        let arena = self.arena;
        let kind = arena.kind(id);
        mem::discriminant(kind).hash(&mut self.state);

        match kind {
            ExprKind::Constant(literal) => literal.hash(&mut self.state),
            ExprKind::Op(name) => name.hash(&mut self.state),
            ExprKind::GlobalVar(gv) => gv.name().hash(&mut self.state),
            ExprKind::Var { name, ty } => {
                if !self.revisit(id) {
                    ty.hash(&mut self.state);
                    let bound = self.bound.contains(&id);
                    bound.hash(&mut self.state);
                    if !bound {
                        name.hash(&mut self.state);
                    }
                }
            }
            _ => {
                if !self.revisit(id) {
                    ensure_sufficient_stack(|| self.compound(kind));
                }
            }
        }
    }

    fn compound(&mut self, kind: &ExprKind) {
        match kind {
            ExprKind::Call { callee, args } => {
                self.node(*callee);
                self.list(args);
            }
            ExprKind::CallLowered { target, args } => {
                target.name().hash(&mut self.state);
                self.list(args);
            }
            ExprKind::Tuple(fields) => self.list(fields),
            ExprKind::TupleGet { tuple, index } => {
                index.hash(&mut self.state);
                self.node(*tuple);
            }
            ExprKind::Let { var, value, body } => {
                self.node(*var);
                self.node(*value);
                self.node(*body);
            }
            ExprKind::Function(function) => self.function(function),
            ExprKind::Var { .. }
            | ExprKind::Constant(_)
            | ExprKind::Op(_)
            | ExprKind::GlobalVar(_) => {}
        }
    }

    fn list(&mut self, ids: &[ExprId]) {
        ids.len().hash(&mut self.state);
        for id in ids {
            self.node(*id);
        }
    }

    fn function(&mut self, function: &Function) {
        self.list(&function.params);
        function.ret_type.hash(&mut self.state);
        self.attrs(&function.attrs);
        match function.body {
            Some(body) => {
                1_u8.hash(&mut self.state);
                self.node(body);
            }
            None => 0_u8.hash(&mut self.state),
        }
    }

    fn attrs(&mut self, attrs: &Attrs) {
        let policy = self.policy;
        let kept = || attrs.iter().filter(|(key, _)| !policy.is_ignored(key));
        kept().count().hash(&mut self.state);
        for (key, value) in kept() {
            key.hash(&mut self.state);
            value.hash(&mut self.state);
        }
    }
}
