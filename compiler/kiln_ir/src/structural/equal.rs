//! Structural equality with positional mismatch reporting.

use std::collections::BTreeMap;
use std::mem;

use rustc_hash::{FxHashMap, FxHashSet};

use kiln_path::{PathPair, Traced};
use kiln_stack::ensure_sufficient_stack;

use super::Structural;
use crate::{bound_vars, AttrValue, ExprArena, ExprId, ExprKind, Function};

type Compare = Result<(), PathPair>;

enum Binding {
    /// Neither side seen before.
    Fresh,
    /// Both sides already bound to each other.
    Same,
    /// One side already bound elsewhere.
    Conflict,
}

fn here(lhs: &Traced<ExprId>, rhs: &Traced<ExprId>) -> PathPair {
    PathPair::new(lhs.path().clone(), rhs.path().clone())
}

pub(super) struct StructuralEq<'a> {
    lhs: &'a ExprArena,
    rhs: &'a ExprArena,
    policy: &'a Structural,
    lhs_to_rhs: FxHashMap<ExprId, ExprId>,
    rhs_to_lhs: FxHashMap<ExprId, ExprId>,
    /// Variables bound inside the compared sub-graphs. Any other variable is
    /// free and must keep its name.
    lhs_bound: FxHashSet<ExprId>,
    rhs_bound: FxHashSet<ExprId>,
}

impl<'a> StructuralEq<'a> {
    pub(super) fn new(lhs: &'a ExprArena, rhs: &'a ExprArena, policy: &'a Structural) -> Self {
        StructuralEq {
            lhs,
            rhs,
            policy,
            lhs_to_rhs: FxHashMap::default(),
            rhs_to_lhs: FxHashMap::default(),
            lhs_bound: FxHashSet::default(),
            rhs_bound: FxHashSet::default(),
        }
    }

    pub(super) fn run(mut self, lhs_root: ExprId, rhs_root: ExprId) -> Option<PathPair> {
        self.lhs_bound = bound_vars(self.lhs, lhs_root);
        self.rhs_bound = bound_vars(self.rhs, rhs_root);
        self.node(&Traced::root(lhs_root), &Traced::root(rhs_root))
            .err()
    }

    pub(super) fn run_function(mut self, lhs: &'a Function, rhs: &'a Function) -> Option<PathPair> {
        self.lhs_bound = function_bound_vars(self.lhs, lhs);
        self.rhs_bound = function_bound_vars(self.rhs, rhs);
        self.function(&Traced::root(lhs), &Traced::root(rhs)).err()
    }

    fn binding(&self, l: ExprId, r: ExprId) -> Binding {
        match (self.lhs_to_rhs.get(&l), self.rhs_to_lhs.get(&r)) {
            (None, None) => Binding::Fresh,
            (Some(&mapped), Some(_)) if mapped == r => Binding::Same,
            _ => Binding::Conflict,
        }
    }

    fn bind(&mut self, l: ExprId, r: ExprId) {
        self.lhs_to_rhs.insert(l, r);
        self.rhs_to_lhs.insert(r, l);
    }

    /// Bound variables correspond by position alone. Free variables also
    /// need the same name.
    fn same_scope(&self, l: ExprId, l_name: &str, r: ExprId, r_name: &str) -> bool {
        match (self.lhs_bound.contains(&l), self.rhs_bound.contains(&r)) {
            (true, true) => true,
            (false, false) => l_name == r_name,
            _ => false,
        }
    }

    fn node(&mut self, lhs: &Traced<ExprId>, rhs: &Traced<ExprId>) -> Compare {
        let (l, r) = (*lhs.get(), *rhs.get());
        let (lhs_arena, rhs_arena) = (self.lhs, self.rhs);
        let (lk, rk) = (lhs_arena.kind(l), rhs_arena.kind(r));

        if mem::discriminant(lk) != mem::discriminant(rk) {
            return Err(here(lhs, rhs));
        }

        match (lk, rk) {
            (ExprKind::Constant(a), ExprKind::Constant(b)) if a == b => Ok(()),
            (ExprKind::Op(a), ExprKind::Op(b)) if a == b => Ok(()),
            (ExprKind::GlobalVar(a), ExprKind::GlobalVar(b)) if a == b => Ok(()),
            (ExprKind::Constant(_), _) | (ExprKind::Op(_), _) | (ExprKind::GlobalVar(_), _) => {
                Err(here(lhs, rhs))
            }
            (
                ExprKind::Var {
                    name: ln,
                    ty: a,
                },
                ExprKind::Var {
                    name: rn,
                    ty: b,
                },
            ) => match self.binding(l, r) {
                Binding::Same => Ok(()),
                Binding::Conflict => Err(here(lhs, rhs)),
                Binding::Fresh if !self.same_scope(l, ln, r, rn) => Err(here(lhs, rhs)),
                Binding::Fresh if a != b => Err(PathPair::new(
                    lhs.path().attr("ty"),
                    rhs.path().attr("ty"),
                )),
                Binding::Fresh => {
                    self.bind(l, r);
                    Ok(())
                }
            },
            _ => match self.binding(l, r) {
                Binding::Same => Ok(()),
                Binding::Conflict => Err(here(lhs, rhs)),
                Binding::Fresh => {
                    self.bind(l, r);
                    ensure_sufficient_stack(|| self.compound(lhs, lk, rhs, rk))
                }
            },
        }
    }

    fn compound(
        &mut self,
        lhs: &Traced<ExprId>,
        lk: &'a ExprKind,
        rhs: &Traced<ExprId>,
        rk: &'a ExprKind,
    ) -> Compare {
        match (lk, rk) {
            (
                ExprKind::Call {
                    callee: lc,
                    args: la,
                },
                ExprKind::Call {
                    callee: rc,
                    args: ra,
                },
            ) => {
                self.node(&lhs.attr("callee", |_| *lc), &rhs.attr("callee", |_| *rc))?;
                self.list(
                    &lhs.attr("args", |_| la.as_slice()),
                    &rhs.attr("args", |_| ra.as_slice()),
                )
            }
            (
                ExprKind::CallLowered {
                    target: lt,
                    args: la,
                },
                ExprKind::CallLowered {
                    target: rt,
                    args: ra,
                },
            ) => {
                if lt != rt {
                    return Err(PathPair::new(
                        lhs.path().attr("target"),
                        rhs.path().attr("target"),
                    ));
                }
                self.list(
                    &lhs.attr("args", |_| la.as_slice()),
                    &rhs.attr("args", |_| ra.as_slice()),
                )
            }
            (ExprKind::Tuple(lf), ExprKind::Tuple(rf)) => self.list(
                &lhs.attr("fields", |_| lf.as_slice()),
                &rhs.attr("fields", |_| rf.as_slice()),
            ),
            (
                ExprKind::TupleGet {
                    tuple: lt,
                    index: li,
                },
                ExprKind::TupleGet {
                    tuple: rt,
                    index: ri,
                },
            ) => {
                if li != ri {
                    return Err(PathPair::new(
                        lhs.path().attr("index"),
                        rhs.path().attr("index"),
                    ));
                }
                self.node(&lhs.attr("tuple", |_| *lt), &rhs.attr("tuple", |_| *rt))
            }
            (
                ExprKind::Let {
                    var: lv,
                    value: lx,
                    body: lb,
                },
                ExprKind::Let {
                    var: rv,
                    value: rx,
                    body: rb,
                },
            ) => {
                self.node(&lhs.attr("var", |_| *lv), &rhs.attr("var", |_| *rv))?;
                self.node(&lhs.attr("value", |_| *lx), &rhs.attr("value", |_| *rx))?;
                self.node(&lhs.attr("body", |_| *lb), &rhs.attr("body", |_| *rb))
            }
            (ExprKind::Function(lf), ExprKind::Function(rf)) => self.function(
                &Traced::new(lf, lhs.path().clone()),
                &Traced::new(rf, rhs.path().clone()),
            ),
            _ => Err(here(lhs, rhs)),
        }
    }

    fn list(&mut self, lhs: &Traced<&[ExprId]>, rhs: &Traced<&[ExprId]>) -> Compare {
        for i in 0..lhs.len().max(rhs.len()) {
            match (lhs.index(i), rhs.index(i)) {
                (Some(l), Some(r)) => self.node(&l.map(|id| *id), &r.map(|id| *id))?,
                (Some(l), None) => {
                    return Err(PathPair::new(
                        l.path().clone(),
                        rhs.path().missing_array_element(i),
                    ))
                }
                (None, Some(r)) => {
                    return Err(PathPair::new(
                        lhs.path().missing_array_element(i),
                        r.path().clone(),
                    ))
                }
                (None, None) => break,
            }
        }
        Ok(())
    }

    fn function(&mut self, lhs: &Traced<&'a Function>, rhs: &Traced<&'a Function>) -> Compare {
        let (lf, rf) = (*lhs.get(), *rhs.get());
        self.list(
            &lhs.attr("params", |_| lf.params.as_slice()),
            &rhs.attr("params", |_| rf.params.as_slice()),
        )?;
        if lf.ret_type != rf.ret_type {
            return Err(PathPair::new(
                lhs.path().attr("ret_type"),
                rhs.path().attr("ret_type"),
            ));
        }
        self.attrs(
            &lhs.attr("attrs", |_| lf.attrs.as_map()),
            &rhs.attr("attrs", |_| rf.attrs.as_map()),
        )?;
        match (lf.body, rf.body) {
            (Some(lb), Some(rb)) => {
                self.node(&lhs.attr("body", |_| lb), &rhs.attr("body", |_| rb))
            }
            (None, None) => Ok(()),
            _ => Err(PathPair::new(
                lhs.path().attr("body"),
                rhs.path().attr("body"),
            )),
        }
    }

    fn attrs(
        &self,
        lhs: &Traced<&BTreeMap<String, AttrValue>>,
        rhs: &Traced<&BTreeMap<String, AttrValue>>,
    ) -> Compare {
        for (key, l) in lhs.iter() {
            if self.policy.is_ignored(key) {
                continue;
            }
            match rhs.lookup(key.as_str()) {
                Some(r) if l.get() == r.get() => {}
                Some(r) => return Err(PathPair::new(l.path().clone(), r.path().clone())),
                None => {
                    return Err(PathPair::new(
                        l.path().clone(),
                        rhs.path().missing_map_entry(),
                    ))
                }
            }
        }
        for (key, r) in rhs.iter() {
            if !self.policy.is_ignored(key) && lhs.lookup(key.as_str()).is_none() {
                return Err(PathPair::new(
                    lhs.path().missing_map_entry(),
                    r.path().clone(),
                ));
            }
        }
        Ok(())
    }
}

fn function_bound_vars(arena: &ExprArena, function: &Function) -> FxHashSet<ExprId> {
    let mut bound: FxHashSet<ExprId> = function.params.iter().copied().collect();
    if let Some(body) = function.body {
        bound.extend(bound_vars(arena, body));
    }
    bound
}
