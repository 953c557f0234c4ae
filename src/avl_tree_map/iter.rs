use core::fmt;
use core::iter::FusedIterator;

use super::AvlTreeMap;
use crate::ForEachMode;
use crate::raw::{Handle, RawAvlTreeMap};

/// An iterator over the entries of an `AvlTreeMap`, in the order of a [`ForEachMode`].
///
/// This `struct` is created by the [`iter`] method on [`AvlTreeMap`]. See its
/// documentation for more.
///
/// [`iter`]: AvlTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawAvlTreeMap<K, V>,
    mode: ForEachMode,
    next: Option<Handle>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw,
            mode: self.mode,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<K, V> AvlTreeMap<K, V> {
    /// Gets an iterator over the entries of the map, in the order given by `mode`.
    ///
    /// The iterator yields exactly [`len`](Self::len) entries, following the same links as
    /// [`for_each`](Self::for_each).
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, ForEachMode};
    ///
    /// let mut map = AvlTreeMap::ordered("");
    /// map.put(3, "c");
    /// map.put(1, "a");
    ///
    /// let mut iter = map.iter(ForEachMode::ReverseInOrder);
    /// assert_eq!(iter.len(), 2);
    /// assert_eq!(iter.next(), Some((&3, &"c")));
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self, mode: ForEachMode) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            mode,
            next: self.raw.start(mode),
            remaining: self.raw.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.next?;
        let node = self.raw.node(handle);
        self.remaining -= 1;
        self.next = Some(self.raw.step(handle, self.mode));
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("mode", &self.mode)
            .field("remaining", &self.remaining)
            .finish()
    }
}
