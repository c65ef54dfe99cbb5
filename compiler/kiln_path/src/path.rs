//! The path chain.
//!
//! Layout: each [`Path`] is a handle to an immutable node holding one
//! [`Segment`], a handle to its parent, and its cached length. Nodes never
//! point at their children, so there are no cycles and a common prefix is
//! shared simply by cloning the parent handle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{PathError, PathKey, Segment};

struct PathNode {
    /// `None` only for the root.
    parent: Option<Path>,
    /// Segments from the root; 0 for the root itself.
    length: usize,
    segment: Segment,
}

impl Drop for PathNode {
    // Unlink the chain iteratively so very long paths don't recurse once per
    // segment when the last handle goes away.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(Path(node)) = parent {
            match Arc::into_inner(node) {
                Some(mut node) => parent = node.parent.take(),
                None => break,
            }
        }
    }
}

/// Position of a node relative to the root of some IR tree.
///
/// Cloning is O(1). Equality ([`PartialEq`], [`Path::paths_equal`]) compares
/// segment contents, so two paths built independently from the same steps
/// are equal even though they share no allocation.
#[derive(Clone)]
pub struct Path(Arc<PathNode>);

impl Path {
    /// The path of the root object itself.
    pub fn root() -> Self {
        Path(Arc::new(PathNode {
            parent: None,
            length: 0,
            segment: Segment::Root,
        }))
    }

    fn extend(&self, segment: Segment) -> Self {
        Path(Arc::new(PathNode {
            parent: Some(self.clone()),
            length: self.0.length + 1,
            segment,
        }))
    }

    /// Extend with access to the attribute `name`.
    pub fn attr(&self, name: &str) -> Self {
        self.extend(Segment::Attr(Arc::from(name)))
    }

    /// Extend with access to an attribute that cannot be named statically.
    pub fn unknown_attr(&self) -> Self {
        self.extend(Segment::UnknownAttr)
    }

    /// Extend with access to array element `index`.
    pub fn array_index(&self, index: usize) -> Self {
        self.extend(Segment::ArrayIndex(index))
    }

    /// Extend with access to array element `index`, which does not exist.
    pub fn missing_array_element(&self, index: usize) -> Self {
        self.extend(Segment::MissingArrayElement(index))
    }

    /// Extend with access to the map value stored under `key`.
    pub fn map_value(&self, key: impl Into<PathKey>) -> Self {
        self.extend(Segment::MapValue(key.into()))
    }

    /// Extend with access to a map entry that does not exist.
    pub fn missing_map_entry(&self) -> Self {
        self.extend(Segment::MissingMapEntry)
    }

    /// Number of segments after the root. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.length
    }

    /// Whether this is the root path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Same as [`Path::is_root`]: the root is the only path with no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// The last segment of the path.
    #[inline]
    pub fn last(&self) -> &Segment {
        &self.0.segment
    }

    /// The path one segment shorter.
    pub fn parent(&self) -> Result<Path, PathError> {
        self.0.parent.clone().ok_or(PathError::RootHasNoParent)
    }

    /// The ancestor of this path that has exactly `length` segments.
    ///
    /// `prefix(self.len())` is `self`, `prefix(0)` is the root.
    pub fn prefix(&self, length: usize) -> Result<Path, PathError> {
        if length > self.len() {
            return Err(PathError::PrefixTooLong {
                requested: length,
                length: self.len(),
            });
        }
        Ok(self.ancestor(self.len() - length).clone())
    }

    /// Walk `steps` parent links. Stops at the root.
    fn ancestor(&self, steps: usize) -> &Path {
        let mut node = self;
        for _ in 0..steps {
            match &node.0.parent {
                Some(parent) => node = parent,
                None => break,
            }
        }
        node
    }

    /// Whether `self` is a prefix of `other`. Every path is a prefix of itself.
    ///
    /// Walks `other` up to the length of `self`, then compares both chains
    /// segment by segment. O(`other.len()`).
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        if self.len() > other.len() {
            return false;
        }
        other
            .ancestor(other.len() - self.len())
            .paths_equal(self)
    }

    /// Whether both paths have the same segments from root to leaf.
    ///
    /// Stops as soon as both walks reach the same node, since everything above
    /// a shared node is shared too.
    pub fn paths_equal(&self, other: &Path) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut lhs = self;
        let mut rhs = other;
        loop {
            if Arc::ptr_eq(&lhs.0, &rhs.0) {
                return true;
            }
            if lhs.0.segment != rhs.0.segment {
                return false;
            }
            match (&lhs.0.parent, &rhs.0.parent) {
                (Some(l), Some(r)) => {
                    lhs = l;
                    rhs = r;
                }
                (None, None) => return true,
                // unreachable while lengths agree
                _ => return false,
            }
        }
    }

    /// Iterate from this path up to the root, leaf first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Segments from the root to the leaf, excluding the root segment.
    pub fn segments(&self) -> Vec<&Segment> {
        let mut segments: Vec<&Segment> = self
            .ancestors()
            .filter(|path| !path.is_root())
            .map(Path::last)
            .collect();
        segments.reverse();
        segments
    }
}

/// Iterator over a path and its ancestors, leaf first.
pub struct Ancestors<'a> {
    next: Option<&'a Path>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Path;

    fn next(&mut self) -> Option<&'a Path> {
        let current = self.next?;
        self.next = current.0.parent.as_ref();
        Some(current)
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.paths_equal(other)
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for path in self.ancestors() {
            path.last().hash(state);
        }
    }
}

/// Renders every segment from the root to the leaf (`<root>.body.args[1]`).
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Segment::Root, f)?;
        for segment in self.segments() {
            fmt::Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

/// Positions of two corresponding nodes in two compared trees.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathPair {
    pub lhs: Path,
    pub rhs: Path,
}

impl PathPair {
    pub fn new(lhs: Path, rhs: Path) -> Self {
        PathPair { lhs, rhs }
    }

    /// Both trees at their roots.
    pub fn root() -> Self {
        let root = Path::root();
        PathPair {
            lhs: root.clone(),
            rhs: root,
        }
    }

    /// The same pair with the sides exchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        PathPair {
            lhs: self.rhs,
            rhs: self.lhs,
        }
    }
}

impl fmt::Display for PathPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests;
