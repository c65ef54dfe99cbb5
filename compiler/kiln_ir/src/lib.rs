//! Kiln IR - expression graphs for computation-graph compilation.
//!
//! This crate contains the IR surface the partitioning passes operate on:
//! - [`ExprArena`]: flat storage of [`ExprKind`] nodes addressed by [`ExprId`]
//! - [`Function`]: function literals and top-level units, with an [`Attrs`] map
//! - [`Module`]: the table of top-level units keyed by [`GlobalVar`]
//! - [`walk`]: deterministic visit-once traversal that records node paths
//! - [`structural`]: structural hashing and structural equality
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: children are `ExprId` indices, never `Box<Expr>`.
//!   A node referenced from several parents is one node, so the IR is a DAG.
//! - **Positions are paths**: a node's identity is its `ExprId`, its position
//!   is a [`kiln_path::Path`]. Traversals and comparisons report paths.
//! - **Structure over identity**: variable names and the external-name
//!   attribute are cosmetic. Structural hashing and equality ignore them.
//!
//! Floats are stored as `u64` bits so every IR type is `Eq + Hash`.

mod arena;
mod attrs;
mod expr;
mod expr_id;
mod module;
pub mod structural;
mod types;
pub mod walk;

pub use arena::ExprArena;
pub use attrs::{AttrError, AttrValue, Attrs};
pub use expr::{Edge, ExprKind, ExprList, Function, GlobalVar, Literal};
pub use expr_id::ExprId;
pub use module::Module;
pub use structural::{first_mismatch, structural_eq, structural_hash, Structural};
pub use types::{DType, Type};
pub use walk::{bound_vars, free_vars, post_order, PostOrder, Visit};
