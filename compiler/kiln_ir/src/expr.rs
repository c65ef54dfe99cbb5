//! Expression node kinds.
//!
//! Children are referenced by [`ExprId`]. Every child slot has a fixed
//! [`Edge`] name, which is how traversals turn node ids into paths.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use kiln_path::{Path, PathKey};
use smallvec::SmallVec;

use crate::{Attrs, ExprId, Type};

/// Child list for calls and tuples. Most operators take at most four inputs.
pub type ExprList = SmallVec<[ExprId; 4]>;

/// Name of a top-level unit in a [`Module`](crate::Module).
///
/// Cloning is O(1). Ordered by name so module iteration is deterministic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalVar(Arc<str>);

impl GlobalVar {
    pub fn new(name: &str) -> Self {
        GlobalVar(Arc::from(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlobalVar {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GlobalVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalVar(@{})", self.0)
    }
}

impl fmt::Display for GlobalVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl From<GlobalVar> for PathKey {
    fn from(gv: GlobalVar) -> Self {
        PathKey::Str(gv.0)
    }
}

/// Scalar constant payload. Floats are stored as bits.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Literal {
    Int(i64),
    Float(u64),
    Bool(bool),
}

impl Literal {
    pub fn float(value: f64) -> Self {
        Literal::Float(value.to_bits())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(bits) => write!(f, "{:?}f", f64::from_bits(*bits)),
            Literal::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// A function literal, or the definition of a top-level unit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Function {
    /// Parameter variables, each an [`ExprKind::Var`] node.
    pub params: Vec<ExprId>,
    pub ret_type: Option<Type>,
    /// `None` for a name-only external declaration.
    pub body: Option<ExprId>,
    pub attrs: Attrs,
}

impl Function {
    pub fn new(params: impl IntoIterator<Item = ExprId>, body: ExprId) -> Self {
        Function {
            params: params.into_iter().collect(),
            ret_type: None,
            body: Some(body),
            attrs: Attrs::new(),
        }
    }

    #[must_use]
    pub fn with_ret_type(mut self, ret_type: Type) -> Self {
        self.ret_type = Some(ret_type);
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Whether this is a declaration without a body.
    pub fn is_declaration(&self) -> bool {
        self.body.is_none()
    }
}

/// Expression node.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExprKind {
    /// A variable. The name is cosmetic; identity is the node.
    Var { name: String, ty: Option<Type> },
    Constant(Literal),
    /// Reference to a primitive operator, e.g. `nn.conv2d`.
    Op(String),
    /// Reference to a top-level unit.
    GlobalVar(GlobalVar),
    Call { callee: ExprId, args: ExprList },
    /// Call to an externally compiled unit. The callee body must not be
    /// inlined or analyzed further.
    CallLowered { target: GlobalVar, args: ExprList },
    Tuple(ExprList),
    TupleGet { tuple: ExprId, index: u32 },
    Let { var: ExprId, value: ExprId, body: ExprId },
    Function(Function),
}

impl ExprKind {
    /// Short discriminant name, used in dumps and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::Var { .. } => "var",
            ExprKind::Constant(_) => "constant",
            ExprKind::Op(_) => "op",
            ExprKind::GlobalVar(_) => "global_var",
            ExprKind::Call { .. } => "call",
            ExprKind::CallLowered { .. } => "call_lowered",
            ExprKind::Tuple(_) => "tuple",
            ExprKind::TupleGet { .. } => "tuple_get",
            ExprKind::Let { .. } => "let",
            ExprKind::Function(_) => "function",
        }
    }

    /// Whether the node has no child slots.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            ExprKind::Var { .. } | ExprKind::Constant(_) | ExprKind::Op(_) | ExprKind::GlobalVar(_)
        )
    }

    /// Child slots in evaluation order. Binding positions (parameters, let
    /// variables) come before the expressions that may use them.
    pub fn edges(&self) -> SmallVec<[(Edge, ExprId); 4]> {
        let mut edges = SmallVec::new();
        match self {
            ExprKind::Var { .. }
            | ExprKind::Constant(_)
            | ExprKind::Op(_)
            | ExprKind::GlobalVar(_) => {}
            ExprKind::Call { callee, args } => {
                edges.push((Edge::Field("callee"), *callee));
                push_list(&mut edges, "args", args);
            }
            ExprKind::CallLowered { args, .. } => push_list(&mut edges, "args", args),
            ExprKind::Tuple(fields) => push_list(&mut edges, "fields", fields),
            ExprKind::TupleGet { tuple, .. } => edges.push((Edge::Field("tuple"), *tuple)),
            ExprKind::Let { var, value, body } => {
                edges.push((Edge::Field("var"), *var));
                edges.push((Edge::Field("value"), *value));
                edges.push((Edge::Field("body"), *body));
            }
            ExprKind::Function(function) => {
                push_list(&mut edges, "params", &function.params);
                if let Some(body) = function.body {
                    edges.push((Edge::Field("body"), body));
                }
            }
        }
        edges
    }
}

fn push_list(edges: &mut SmallVec<[(Edge, ExprId); 4]>, name: &'static str, ids: &[ExprId]) {
    edges.extend(
        ids.iter()
            .enumerate()
            .map(|(i, id)| (Edge::Element(name, i), *id)),
    );
}

/// Name of a child slot relative to its parent.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edge {
    /// Single-child field: `.callee`, `.body`.
    Field(&'static str),
    /// Element of a list field: `.args[1]`.
    Element(&'static str, usize),
}

impl Edge {
    /// The child's path given the parent's.
    pub fn extend(self, parent: &Path) -> Path {
        match self {
            Edge::Field(name) => parent.attr(name),
            Edge::Element(name, index) => parent.attr(name).array_index(index),
        }
    }
}
