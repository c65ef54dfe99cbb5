//! Precondition violations of the path API.

use thiserror::Error;

/// Misuse of the [`Path`](crate::Path) API.
///
/// These are caller bugs. They are reported, never clamped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// `parent()` was called on the root path.
    #[error("the root path has no parent")]
    RootHasNoParent,

    /// `prefix(n)` was called with `n` greater than the path length.
    #[error("cannot take a prefix of length {requested} from a path of length {length}")]
    PrefixTooLong { requested: usize, length: usize },
}
