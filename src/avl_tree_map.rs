use alloc::boxed::Box;
use core::fmt;

use tracing::debug;

use crate::config::{CollisionPolicy, Comparator, Config, KeyExtractor};
use crate::error::Error;
use crate::raw::{InsertOutcome, RawAvlTreeMap};
use crate::ForEachMode;

mod capacity;
mod iter;
mod order_statistic;

pub use crate::Rank;
pub use iter::Iter;

/// An ordered map based on an [AVL tree], threaded in both key order and insertion order.
///
/// Keys are ordered by the comparator supplied through [`Config`]. Every entry is
/// simultaneously reachable three ways:
///
/// - by key, through the balanced tree, in O(log n);
/// - by rank (its position in key order), through subtree sizes cached in every node, in
///   O(log n);
/// - by walking one of two circular lists, one in key order and one in insertion order, in
///   O(1) per step. See [`ForEachMode`].
///
/// Under [`CollisionPolicy::Replace`], re-inserting a present key overwrites its value and
/// moves it to the newest end of the insertion order, which makes the map usable as the
/// recency index of an LRU-style cache.
///
/// It is a logic error for the comparator to be inconsistent, or for a key to be modified
/// such that its ordering relative to other keys changes while it is in the map. The
/// behavior resulting from such a logic error is not specified, but will be encapsulated to
/// the `AvlTreeMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use chrono_avl::{AvlTreeMap, ForEachMode};
///
/// let mut sessions = AvlTreeMap::ordered("");
/// sessions.put(31, "carol");
/// sessions.put(7, "alice");
/// sessions.put(19, "bob");
///
/// // Lookup by key and by rank.
/// assert_eq!(sessions.get(&19), Some(&"bob"));
/// assert_eq!(sessions.get_at(0), Ok((&7, &"alice")));
/// assert_eq!(sessions.rank_of(&31), Some(2));
///
/// // Touching a key makes it the newest.
/// assert_eq!(sessions.put(31, "carol again"), "carol");
/// let oldest_first: Vec<_> = sessions.iter(ForEachMode::Queue).map(|(k, _)| *k).collect();
/// assert_eq!(oldest_first, [7, 19, 31]);
///
/// // Evict the oldest entry.
/// let (&oldest, _) = sessions.first_inserted().unwrap();
/// assert_eq!(sessions.remove(&oldest), Ok("alice"));
/// assert_eq!(sessions.len(), 2);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlTreeMap<K, V> {
    raw: RawAvlTreeMap<K, V>,
    comparator: Box<Comparator<K>>,
    on_collision: CollisionPolicy,
    zero_value: V,
    key_extractor: Option<Box<KeyExtractor<K, V>>>,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap` from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `config` has no comparator.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, Config, Error};
    ///
    /// let map: AvlTreeMap<i32, &str> = AvlTreeMap::new(Config::ordered("")).unwrap();
    /// assert!(map.is_empty());
    ///
    /// let missing = AvlTreeMap::<i32, &str>::new(Config::new(""));
    /// assert!(matches!(missing, Err(Error::InvalidConfiguration(_))));
    /// ```
    pub fn new(config: Config<K, V>) -> Result<Self, Error> {
        Self::from_raw(config, RawAvlTreeMap::new())
    }

    fn from_raw(config: Config<K, V>, raw: RawAvlTreeMap<K, V>) -> Result<Self, Error> {
        let Config {
            comparator,
            on_collision,
            zero_value,
            key_extractor,
        } = config;
        let comparator = comparator.ok_or(Error::InvalidConfiguration("a key comparator is required"))?;
        Ok(Self {
            raw,
            comparator,
            on_collision,
            zero_value,
            key_extractor,
        })
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::ordered(0);
    /// assert_eq!(a.len(), 0);
    /// a.put(1, 10);
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all elements. The configuration is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::ordered(0);
    /// a.put(1, 10);
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        debug!(len = self.raw.len(), "clearing tree");
        self.raw.clear();
    }

    /// Returns the height of the tree: -1 when empty, 0 for a single element.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered(0);
    /// assert_eq!(map.height(), -1);
    /// for k in 1..=3 {
    ///     map.put(k, k);
    /// }
    /// assert_eq!(map.height(), 1);
    /// ```
    #[must_use]
    pub fn height(&self) -> i32 {
        self.raw.height()
    }

    /// Returns the value [`put`](Self::put) reports when there was no previous value.
    #[must_use]
    pub fn zero_value(&self) -> &V {
        &self.zero_value
    }

    /// Returns the policy applied when an inserted key is already present.
    #[must_use]
    pub fn collision_policy(&self) -> CollisionPolicy {
        self.on_collision
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns `None` if the key was not present. Otherwise returns the value that did not
    /// end up in the map: the previous value under [`CollisionPolicy::Replace`], or `value`
    /// itself under [`CollisionPolicy::IgnoreInsertion`].
    ///
    /// # Note
    ///
    /// A colliding insert never updates the stored key, only the value. This matters for
    /// comparators that treat distinct keys as equal, such as a case-insensitive one.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, CollisionPolicy, Config};
    ///
    /// let mut map = AvlTreeMap::new(Config::ordered("").on_collision(CollisionPolicy::IgnoreInsertion)).unwrap();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.insert(&*self.comparator, self.on_collision, key, value) {
            InsertOutcome::Inserted => None,
            InsertOutcome::Replaced(old) => Some(old),
            InsertOutcome::Ignored { rejected, .. } => Some(rejected),
        }
    }

    /// Removes a key from the map, returning the value at the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the map is empty and [`Error::KeyNotFound`] if the
    /// key is absent. The map is unchanged in both cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, Error};
    ///
    /// let mut map = AvlTreeMap::ordered("");
    /// assert_eq!(map.remove(&1), Err(Error::EmptyTree));
    /// map.put(1, "a");
    /// assert_eq!(map.remove(&2), Err(Error::KeyNotFound));
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<V, Error> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// Same as [`remove`](Self::remove).
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V), Error> {
        self.raw.remove(&*self.comparator, key)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// Writing through the reference does not change the entry's place in insertion order.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.raw.search(&*self.comparator, key)?;
        Some(&mut self.raw.node_mut(handle).value)
    }

    /// Returns the stored key-value pair corresponding to the key.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let handle = self.raw.search(&*self.comparator, key)?;
        let node = self.raw.node(handle);
        Some((&node.key, &node.value))
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.search(&*self.comparator, key).is_some()
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.min_value())
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.max_value())
    }

    /// Returns the oldest entry in insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered(0);
    /// map.put(2, 20);
    /// map.put(1, 10);
    /// assert_eq!(map.first_inserted(), Some((&2, &20)));
    /// assert_eq!(map.last_inserted(), Some((&1, &10)));
    /// ```
    #[must_use]
    pub fn first_inserted(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.first_inserted())
    }

    /// Returns the newest entry in insertion order.
    #[must_use]
    pub fn last_inserted(&self) -> Option<(&K, &V)> {
        self.entry_at(self.raw.last_inserted())
    }

    fn entry_at(&self, handle: Option<crate::raw::Handle>) -> Option<(&K, &V)> {
        let node = self.raw.node(handle?);
        Some((&node.key, &node.value))
    }

    /// Calls `action` on every entry, in the order given by `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalInvariantViolation`] if the list being walked does not close
    /// after exactly [`len`](Self::len) entries. This signals a bug in this crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, ForEachMode};
    ///
    /// let mut map = AvlTreeMap::ordered(0);
    /// for k in [3, 1, 2] {
    ///     map.put(k, k * 10);
    /// }
    ///
    /// let mut newest_first = Vec::new();
    /// map.for_each(ForEachMode::Stack, |k, v| newest_first.push((*k, *v))).unwrap();
    /// assert_eq!(newest_first, [(2, 20), (1, 10), (3, 30)]);
    /// ```
    pub fn for_each(&self, mode: ForEachMode, action: impl FnMut(&K, &V)) -> Result<(), Error> {
        self.raw.for_each(mode, action)
    }

    /// Rebuilds the tree into a perfectly balanced shape.
    ///
    /// Every entry, and both the key order and the insertion order, are preserved. Maps with
    /// fewer than 8 entries are left as they are. AVL rebalancing already bounds the height
    /// to about 1.44 log<sub>2</sub> n; compaction brings it down to log<sub>2</sub> n, which
    /// pays off for maps that are built once and then queried many times.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered(0);
    /// for k in 0..1000 {
    ///     map.put(k, k);
    /// }
    /// map.compact_balance();
    /// assert_eq!(map.height(), 9);
    /// assert_eq!(map.get_at(500), Ok((&500, &500)));
    /// ```
    pub fn compact_balance(&mut self) {
        self.raw.compact_balance();
    }
}

impl<K, V: Clone> AvlTreeMap<K, V> {
    /// Inserts a key-value pair into the map, returning the value previously stored under
    /// the key, or the [zero value](Self::zero_value) if there was none.
    ///
    /// Under [`CollisionPolicy::IgnoreInsertion`] a present key keeps its value, and that
    /// value is returned.
    ///
    /// # Note
    ///
    /// A colliding insert never updates the stored key, only the value. This matters for
    /// comparators that treat distinct keys as equal, such as a case-insensitive one.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::ordered(-1);
    /// assert_eq!(map.put(1, 10), -1);
    /// assert_eq!(map.put(1, 11), 10);
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn put(&mut self, key: K, value: V) -> V {
        match self.raw.insert(&*self.comparator, self.on_collision, key, value) {
            InsertOutcome::Inserted => self.zero_value.clone(),
            InsertOutcome::Replaced(old) => old,
            InsertOutcome::Ignored { existing, .. } => self.raw.node(existing).value.clone(),
        }
    }

    /// Inserts `value` under the key derived by the configured key extractor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no key extractor was configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, Config};
    ///
    /// #[derive(Clone, Debug, Default, PartialEq)]
    /// struct User { id: u32, name: &'static str }
    ///
    /// let config = Config::ordered(User::default()).key_extractor(|u: &User| u.id);
    /// let mut users = AvlTreeMap::new(config).unwrap();
    /// users.put_value(User { id: 7, name: "alice" }).unwrap();
    /// assert_eq!(users.get(&7).map(|u| u.name), Some("alice"));
    /// ```
    pub fn put_value(&mut self, value: V) -> Result<V, Error> {
        let extractor = self
            .key_extractor
            .as_ref()
            .ok_or(Error::InvalidConfiguration("a key extractor is required"))?;
        let key = extractor(&value);
        Ok(self.put(key, value))
    }
}

impl<K: Ord + 'static, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap` ordering keys by their [`Ord`] implementation and
    /// replacing values on key collision.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_avl::{AvlTreeMap, CollisionPolicy};
    ///
    /// let map: AvlTreeMap<&str, u8> = AvlTreeMap::ordered(0);
    /// assert_eq!(map.collision_policy(), CollisionPolicy::Replace);
    /// ```
    #[must_use]
    pub fn ordered(zero_value: V) -> Self {
        Self {
            raw: RawAvlTreeMap::new(),
            comparator: Box::new(K::cmp),
            on_collision: CollisionPolicy::Replace,
            zero_value,
            key_extractor: None,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter(ForEachMode::InOrder)).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter(ForEachMode::InOrder)
    }
}

impl<K, V> Extend<(K, V)> for AvlTreeMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
