//! Path segments.
//!
//! The set of ways to step from a node to one of its children is closed, so
//! segments are a plain enum and every consumer matches exhaustively.

use std::fmt;
use std::sync::Arc;

/// Key of a map entry addressed by [`Segment::MapValue`].
///
/// Keys are opaque to the path model; only equality and rendering matter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathKey {
    Str(Arc<str>),
    Int(i64),
    Uint(u64),
    Bool(bool),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Str(s) => write!(f, "{:?}", &**s),
            PathKey::Int(v) => write!(f, "{v}"),
            PathKey::Uint(v) => write!(f, "{v}"),
            PathKey::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(s: &str) -> Self {
        PathKey::Str(Arc::from(s))
    }
}

impl From<String> for PathKey {
    fn from(s: String) -> Self {
        PathKey::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for PathKey {
    fn from(s: Arc<str>) -> Self {
        PathKey::Str(s)
    }
}

impl From<i64> for PathKey {
    fn from(v: i64) -> Self {
        PathKey::Int(v)
    }
}

impl From<i32> for PathKey {
    fn from(v: i32) -> Self {
        PathKey::Int(i64::from(v))
    }
}

impl From<u64> for PathKey {
    fn from(v: u64) -> Self {
        PathKey::Uint(v)
    }
}

impl From<u32> for PathKey {
    fn from(v: u32) -> Self {
        PathKey::Uint(u64::from(v))
    }
}

impl From<usize> for PathKey {
    fn from(v: usize) -> Self {
        // usize is at most 64 bits on every supported target
        PathKey::Uint(v as u64)
    }
}

impl From<bool> for PathKey {
    fn from(v: bool) -> Self {
        PathKey::Bool(v)
    }
}

/// One step of a [`Path`](crate::Path).
///
/// Two segments are equal when they have the same kind and the same payload.
/// `UnknownAttr` carries no payload, so any two unknown attribute accesses
/// compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The root object itself.
    Root,
    /// Access to a named attribute.
    Attr(Arc<str>),
    /// Access to an attribute whose name could not be determined.
    UnknownAttr,
    /// Element of an array.
    ArrayIndex(usize),
    /// Element expected at this index but absent (the array is too short).
    MissingArrayElement(usize),
    /// Value of a map entry.
    MapValue(PathKey),
    /// Map entry expected but absent.
    MissingMapEntry,
}

impl Segment {
    /// Whether this is the root segment.
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self, Segment::Root)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Root => f.write_str("<root>"),
            Segment::Attr(name) => write!(f, ".{name}"),
            Segment::UnknownAttr => f.write_str(".<unknown attribute>"),
            Segment::ArrayIndex(index) => write!(f, "[{index}]"),
            Segment::MissingArrayElement(index) => write!(f, "[<missing element #{index}>]"),
            Segment::MapValue(key) => write!(f, "[{key}]"),
            Segment::MissingMapEntry => f.write_str("[<missing entry>]"),
        }
    }
}
