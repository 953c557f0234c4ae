use core::ops::{Index, IndexMut};

use super::AvlTreeMap;
use crate::Rank;
use crate::error::Error;

impl<K, V> AvlTreeMap<K, V> {
    /// Returns the key-value pair at position `rank` in sorted order.
    ///
    /// The rank is zero-based.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `rank` is not less than [`len`](Self::len).
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, Error};
    ///
    /// let mut map = AvlTreeMap::ordered("");
    /// map.put("a", "alpha");
    /// map.put("c", "gamma");
    /// map.put("b", "beta");
    ///
    /// assert_eq!(map.get_at(1), Ok((&"b", &"beta")));
    /// assert_eq!(map.get_at(3), Err(Error::OutOfRange { rank: 3, len: 3 }));
    /// ```
    pub fn get_at(&self, rank: usize) -> Result<(&K, &V), Error> {
        let handle = self.raw.get_at(rank).ok_or(Error::OutOfRange { rank, len: self.len() })?;
        let node = self.raw.node(handle);
        Ok((&node.key, &node.value))
    }

    /// Returns the key and a mutable reference to the value at position `rank` in sorted
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `rank` is not less than [`len`](Self::len).
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered("");
    /// map.put(10, "a");
    /// map.put(5, "b");
    ///
    /// let (key, value) = map.get_at_mut(0).unwrap();
    /// assert_eq!(*key, 5);
    /// *value = "updated";
    /// assert_eq!(map.get(&5), Some(&"updated"));
    /// ```
    pub fn get_at_mut(&mut self, rank: usize) -> Result<(&K, &mut V), Error> {
        let handle = self.raw.get_at(rank).ok_or(Error::OutOfRange { rank, len: self.len() })?;
        let node = self.raw.node_mut(handle);
        Ok((&node.key, &mut node.value))
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if the key is not
    /// present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered("");
    /// map.put(10, "a");
    /// map.put(20, "b");
    ///
    /// assert_eq!(map.rank_of(&20), Some(1));
    /// assert_eq!(map.rank_of(&15), None);
    /// ```
    #[must_use]
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        let handle = self.raw.search(&*self.comparator, key)?;
        Some(self.raw.index(handle))
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use chrono_avl::{AvlTreeMap, Rank};
///
/// let mut map = AvlTreeMap::ordered(0);
/// map.put("a", 1);
/// map.put("b", 2);
///
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V> Index<Rank> for AvlTreeMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_at(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<K, V> IndexMut<Rank> for AvlTreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.get_at_mut(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}
