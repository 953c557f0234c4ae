use super::AvlTreeMap;
use crate::config::Config;
use crate::error::Error;
use crate::raw::RawAvlTreeMap;

impl<K, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap` with room for at least `capacity` entries before
    /// its node storage reallocates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` has no comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, Config};
    ///
    /// let map: AvlTreeMap<i32, i32> = AvlTreeMap::with_capacity(Config::ordered(0), 32).unwrap();
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    pub fn with_capacity(config: Config<K, V>, capacity: usize) -> Result<Self, Error> {
        Self::from_raw(config, RawAvlTreeMap::with_capacity(capacity))
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
