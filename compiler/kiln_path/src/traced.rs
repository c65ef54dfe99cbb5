//! Values that carry the path at which they were found.
//!
//! Traversal code that projects through [`Traced`] cannot forget to extend
//! the path: every projection (`attr`, `index`, `lookup`, `iter`) produces the
//! child value together with the child path.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::{Path, PathKey};

/// A value paired with its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Traced<T> {
    value: T,
    path: Path,
}

impl<T> Traced<T> {
    /// `value` located at the root.
    pub fn root(value: T) -> Self {
        Traced::new(value, Path::root())
    }

    pub fn new(value: T, path: Path) -> Self {
        Traced { value, path }
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Path) {
        (self.value, self.path)
    }

    /// Project the attribute `name` out of the value.
    pub fn attr<U>(&self, name: &str, project: impl FnOnce(&T) -> U) -> Traced<U> {
        Traced::new(project(&self.value), self.path.attr(name))
    }

    /// Transform the value, keeping the path.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Traced<U> {
        Traced::new(f(self.value), self.path)
    }
}

impl<'a, T> Traced<&'a [T]> {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Element `index`, or `None` past the end.
    pub fn index(&self, index: usize) -> Option<Traced<&'a T>> {
        self.value
            .get(index)
            .map(|element| Traced::new(element, self.path.array_index(index)))
    }

    /// Every element at its index path.
    pub fn iter(&self) -> impl Iterator<Item = Traced<&'a T>> {
        let path = self.path.clone();
        self.value
            .iter()
            .enumerate()
            .map(move |(index, element)| Traced::new(element, path.array_index(index)))
    }
}

impl<'a, K, V> Traced<&'a BTreeMap<K, V>>
where
    K: Ord + Clone + Into<PathKey>,
{
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// The value under `key`, or `None` if absent.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Traced<&'a V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (key, value) = self.value.get_key_value(key)?;
        Some(Traced::new(value, self.path.map_value(key.clone())))
    }

    /// Every entry in key order, values at their key paths.
    pub fn iter(&self) -> impl Iterator<Item = (&'a K, Traced<&'a V>)> {
        let path = self.path.clone();
        self.value
            .iter()
            .map(move |(key, value)| (key, Traced::new(value, path.map_value(key.clone()))))
    }
}

#[cfg(test)]
mod tests;
