//! Expression arena.
//!
//! Nodes are append-only and addressed by [`ExprId`]. Passes that rewrite a
//! node do so in place with [`ExprArena::replace`], so every parent that
//! references the node observes the rewrite exactly once.

use rustc_hash::FxHashMap;

use kiln_stack::ensure_sufficient_stack;

use crate::{Attrs, ExprId, ExprKind, ExprList, Function, GlobalVar, Literal, Type};

/// Flat storage for expression nodes.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    nodes: Vec<ExprKind>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena { nodes: Vec::new() }
    }

    /// Allocate a node, returning its ID.
    ///
    /// # Panics
    ///
    /// Panics if the arena already holds `u32::MAX` nodes.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let index = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX nodes"));
        self.nodes.push(kind);
        ExprId::new(index)
    }

    /// The node at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&ExprKind> {
        self.nodes.get(id.index())
    }

    /// The function literal at `id`, if that node is one.
    pub fn as_function(&self, id: ExprId) -> Option<&Function> {
        match self.get(id)? {
            ExprKind::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Overwrite the node at `id`, returning the old node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this arena.
    pub fn replace(&mut self, id: ExprId, kind: ExprKind) -> ExprKind {
        std::mem::replace(&mut self.nodes[id.index()], kind)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // Builders

    pub fn var(&mut self, name: &str, ty: Option<Type>) -> ExprId {
        self.alloc(ExprKind::Var {
            name: name.to_string(),
            ty,
        })
    }

    pub fn constant(&mut self, literal: Literal) -> ExprId {
        self.alloc(ExprKind::Constant(literal))
    }

    pub fn op(&mut self, name: &str) -> ExprId {
        self.alloc(ExprKind::Op(name.to_string()))
    }

    pub fn global(&mut self, gv: GlobalVar) -> ExprId {
        self.alloc(ExprKind::GlobalVar(gv))
    }

    pub fn call(&mut self, callee: ExprId, args: impl IntoIterator<Item = ExprId>) -> ExprId {
        self.alloc(ExprKind::Call {
            callee,
            args: args.into_iter().collect(),
        })
    }

    pub fn call_lowered(
        &mut self,
        target: GlobalVar,
        args: impl IntoIterator<Item = ExprId>,
    ) -> ExprId {
        self.alloc(ExprKind::CallLowered {
            target,
            args: args.into_iter().collect(),
        })
    }

    pub fn tuple(&mut self, fields: impl IntoIterator<Item = ExprId>) -> ExprId {
        self.alloc(ExprKind::Tuple(fields.into_iter().collect()))
    }

    pub fn tuple_get(&mut self, tuple: ExprId, index: u32) -> ExprId {
        self.alloc(ExprKind::TupleGet { tuple, index })
    }

    pub fn let_binding(&mut self, var: ExprId, value: ExprId, body: ExprId) -> ExprId {
        self.alloc(ExprKind::Let { var, value, body })
    }

    /// Allocate a function literal.
    pub fn function(
        &mut self,
        params: impl IntoIterator<Item = ExprId>,
        body: ExprId,
        attrs: Attrs,
    ) -> ExprId {
        self.alloc(ExprKind::Function(
            Function::new(params, body).with_attrs(attrs),
        ))
    }

    /// Copy the sub-graph reachable from `root` into a fresh arena.
    ///
    /// Sharing is preserved: a node reachable along several edges is copied
    /// once. Returns the new arena and the id of the copied root.
    pub fn extract(&self, root: ExprId) -> (ExprArena, ExprId) {
        let mut extractor = Extractor {
            source: self,
            target: ExprArena::new(),
            copied: FxHashMap::default(),
        };
        let new_root = extractor.copy(root);
        (extractor.target, new_root)
    }
}

struct Extractor<'a> {
    source: &'a ExprArena,
    target: ExprArena,
    copied: FxHashMap<ExprId, ExprId>,
}

impl Extractor<'_> {
    fn copy(&mut self, id: ExprId) -> ExprId {
        if let Some(&new_id) = self.copied.get(&id) {
            return new_id;
        }
        let source = self.source;
        ensure_sufficient_stack(|| {
            let kind = match source.kind(id) {
                leaf @ (ExprKind::Var { .. }
                | ExprKind::Constant(_)
                | ExprKind::Op(_)
                | ExprKind::GlobalVar(_)) => leaf.clone(),
                ExprKind::Call { callee, args } => ExprKind::Call {
                    callee: self.copy(*callee),
                    args: self.copy_list(args),
                },
                ExprKind::CallLowered { target, args } => ExprKind::CallLowered {
                    target: target.clone(),
                    args: self.copy_list(args),
                },
                ExprKind::Tuple(fields) => ExprKind::Tuple(self.copy_list(fields)),
                ExprKind::TupleGet { tuple, index } => ExprKind::TupleGet {
                    tuple: self.copy(*tuple),
                    index: *index,
                },
                ExprKind::Let { var, value, body } => ExprKind::Let {
                    var: self.copy(*var),
                    value: self.copy(*value),
                    body: self.copy(*body),
                },
                ExprKind::Function(function) => ExprKind::Function(Function {
                    params: function.params.iter().map(|p| self.copy(*p)).collect(),
                    ret_type: function.ret_type.clone(),
                    body: function.body.map(|body| self.copy(body)),
                    attrs: function.attrs.clone(),
                }),
            };
            let new_id = self.target.alloc(kind);
            self.copied.insert(id, new_id);
            new_id
        })
    }

    fn copy_list(&mut self, ids: &[ExprId]) -> ExprList {
        ids.iter().map(|id| self.copy(*id)).collect()
    }
}

#[cfg(test)]
mod tests;
