//! Attribute maps carried by functions.
//!
//! Keys are ordered so attribute iteration, printing and hashing are
//! deterministic.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Attribute payload.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    /// Name of the payload kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Str(_) => "string",
            AttrValue::Int(_) => "integer",
            AttrValue::Bool(_) => "bool",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => write!(f, "{s:?}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

/// An attribute is present but its payload has the wrong kind.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum AttrError {
    #[error("attribute `{key}` must be a {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// String-keyed attribute map.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Attrs(BTreeMap<String, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Attrs(BTreeMap::new())
    }

    /// Builder form of [`Attrs::set`].
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or overwrite `key`, returning the previous value.
    pub fn set(&mut self, key: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The underlying ordered map.
    pub fn as_map(&self) -> &BTreeMap<String, AttrValue> {
        &self.0
    }

    /// The string payload of `key`.
    ///
    /// `Ok(None)` when absent, `Err` when present with another payload kind.
    pub fn get_str(&self, key: &str) -> Result<Option<&str>, AttrError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(AttrValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(AttrError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: other.kind_name(),
            }),
        }
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#[")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("]")
    }
}
