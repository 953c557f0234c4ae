use alloc::boxed::Box;
use core::cmp::Ordering;
use core::fmt;

/// A three-way comparison over keys. It must describe a total order.
///
/// The `Send + Sync` bounds let a map be shared between threads behind a lock.
pub type Comparator<K> = dyn Fn(&K, &K) -> Ordering + Send + Sync;

/// Derives the key of a value, for [`AvlTreeMap::put_value`](crate::AvlTreeMap::put_value).
pub type KeyExtractor<K, V> = dyn Fn(&V) -> K + Send + Sync;

/// What an insertion does when its key is already present.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum CollisionPolicy {
    /// Overwrite the stored value and make the entry the most recently inserted one.
    #[default]
    Replace,
    /// Keep the stored value and its place in insertion order.
    IgnoreInsertion,
}

/// Construction parameters for an [`AvlTreeMap`](crate::AvlTreeMap).
///
/// A comparator is mandatory; [`AvlTreeMap::new`](crate::AvlTreeMap::new) rejects a
/// configuration without one.
///
/// # Examples
///
/// ```
/// use chrono_avl::{AvlTreeMap, CollisionPolicy, Config};
///
/// let config = Config::new("")
///     .comparator(|a: &u32, b: &u32| b.cmp(a))
///     .on_collision(CollisionPolicy::IgnoreInsertion);
/// let mut map = AvlTreeMap::new(config).unwrap();
///
/// assert_eq!(map.put(1, "one"), "");
/// assert_eq!(map.put(1, "uno"), "one");
/// assert_eq!(map.get(&1), Some(&"one"));
/// ```
pub struct Config<K, V> {
    pub(crate) comparator: Option<Box<Comparator<K>>>,
    pub(crate) on_collision: CollisionPolicy,
    pub(crate) zero_value: V,
    pub(crate) key_extractor: Option<Box<KeyExtractor<K, V>>>,
}

impl<K, V> Config<K, V> {
    /// Starts a configuration with the value returned when there is no previous value.
    ///
    /// The collision policy defaults to [`CollisionPolicy::Replace`].
    #[must_use]
    pub fn new(zero_value: V) -> Self {
        Self {
            comparator: None,
            on_collision: CollisionPolicy::default(),
            zero_value,
            key_extractor: None,
        }
    }

    /// Sets the key comparator.
    #[must_use]
    pub fn comparator(mut self, comparator: impl Fn(&K, &K) -> Ordering + Send + Sync + 'static) -> Self {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// Sets the key collision policy.
    #[must_use]
    pub fn on_collision(mut self, policy: CollisionPolicy) -> Self {
        self.on_collision = policy;
        self
    }

    /// Sets the function deriving a key from a value.
    #[must_use]
    pub fn key_extractor(mut self, extractor: impl Fn(&V) -> K + Send + Sync + 'static) -> Self {
        self.key_extractor = Some(Box::new(extractor));
        self
    }
}

impl<K: Ord + 'static, V> Config<K, V> {
    /// Starts a configuration ordering keys by their [`Ord`] implementation.
    #[must_use]
    pub fn ordered(zero_value: V) -> Self {
        Self::new(zero_value).comparator(K::cmp)
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Config<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("comparator", &self.comparator.is_some())
            .field("on_collision", &self.on_collision)
            .field("zero_value", &self.zero_value)
            .field("key_extractor", &self.key_extractor.is_some())
            .finish()
    }
}
