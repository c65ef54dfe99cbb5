//! Deterministic visit-once traversal.
//!
//! The IR is a DAG, so a plain recursive walk would visit shared nodes once
//! per parent. [`PostOrder`] visits each node once, children before parents,
//! and reports the path of the *first* edge along which the node was reached.
//! Children are explored in [`ExprKind::edges`](crate::ExprKind::edges)
//! order, so the result depends only on the graph.
//!
//! The walk keeps an explicit stack and never recurses.

use rustc_hash::FxHashSet;

use kiln_path::Path;

use crate::{ExprArena, ExprId, ExprKind};

/// A node together with the first path it was reached by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visit {
    pub id: ExprId,
    pub path: Path,
}

enum Frame {
    Enter(ExprId, Path),
    Exit(ExprId, Path),
}

/// Post-order walker whose visited set persists across roots.
///
/// Walking several roots with one walker reports a node shared between
/// them only under the first root.
pub struct PostOrder<'a> {
    arena: &'a ExprArena,
    seen: FxHashSet<ExprId>,
}

impl<'a> PostOrder<'a> {
    pub fn new(arena: &'a ExprArena) -> Self {
        PostOrder {
            arena,
            seen: FxHashSet::default(),
        }
    }

    /// Whether `id` has already been reached from an earlier root.
    pub fn is_visited(&self, id: ExprId) -> bool {
        self.seen.contains(&id)
    }

    /// Every node reachable from `root` not yet visited, in post-order.
    pub fn visit(&mut self, root: ExprId, path: Path) -> Vec<Visit> {
        let mut out = Vec::new();
        let mut stack = vec![Frame::Enter(root, path)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id, path) => {
                    if !self.seen.insert(id) {
                        continue;
                    }
                    let edges = self.arena.kind(id).edges();
                    stack.push(Frame::Exit(id, path.clone()));
                    // reversed so the first edge is entered first
                    for (edge, child) in edges.into_iter().rev() {
                        if !self.seen.contains(&child) {
                            stack.push(Frame::Enter(child, edge.extend(&path)));
                        }
                    }
                }
                Frame::Exit(id, path) => out.push(Visit { id, path }),
            }
        }
        out
    }
}

/// Every node reachable from `root`, children first, each once.
pub fn post_order(arena: &ExprArena, root: ExprId, path: Path) -> Vec<Visit> {
    PostOrder::new(arena).visit(root, path)
}

/// Variables bound inside the sub-graph at `root`: function parameters and
/// `let` variables.
pub fn bound_vars(arena: &ExprArena, root: ExprId) -> FxHashSet<ExprId> {
    let mut bound = FxHashSet::default();
    for visit in post_order(arena, root, Path::root()) {
        match arena.kind(visit.id) {
            ExprKind::Let { var, .. } => {
                bound.insert(*var);
            }
            ExprKind::Function(function) => bound.extend(function.params.iter().copied()),
            _ => {}
        }
    }
    bound
}

/// Variables reachable from `root` that nothing inside it binds, each at the
/// first path it was reached by.
pub fn free_vars(arena: &ExprArena, root: ExprId, path: Path) -> Vec<Visit> {
    let bound = bound_vars(arena, root);
    post_order(arena, root, path)
        .into_iter()
        .filter(|visit| {
            matches!(arena.kind(visit.id), ExprKind::Var { .. }) && !bound.contains(&visit.id)
        })
        .collect()
}

#[cfg(test)]
mod tests;
