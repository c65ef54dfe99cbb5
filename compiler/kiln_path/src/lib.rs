//! Kiln Path - positional identity for nodes of a shared IR graph.
//!
//! IR nodes are immutable and freely shared: the same sub-expression can be
//! referenced from many parents. A pointer therefore cannot say *where* in a
//! tree something went wrong. A [`Path`] can: it records how a node was
//! reached from some root (`<root>.body.args[1].callee`), so two occurrences
//! of one node at different positions get two different paths.
//!
//! # Representation
//!
//! A path is a reverse-linked chain of immutable [`Segment`]s. Extending a
//! path allocates one node pointing at its parent, so sibling paths share
//! their common prefix:
//!
//! ```text
//! <root> ── .body ──┬── .callee
//!                   └── .args ── [0]
//! ```
//!
//! Equality is by content, not allocation. Comparisons walk both chains
//! towards the root and stop early once they reach a shared node.
//!
//! # Crate Contents
//!
//! - [`Path`], [`Segment`], [`PathKey`]: the identity model
//! - [`PathPair`]: a pair of positions in two compared trees
//! - [`Traced`]: a value carried together with its path
//! - [`PathError`]: precondition violations

mod error;
mod path;
mod segment;
mod traced;

pub use error::PathError;
pub use path::{Ancestors, Path, PathPair};
pub use segment::{PathKey, Segment};
pub use traced::Traced;
