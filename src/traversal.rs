/// The linked order followed by [`AvlTreeMap::for_each`](crate::AvlTreeMap::for_each) and
/// [`AvlTreeMap::iter`](crate::AvlTreeMap::iter).
///
/// Every node sits in two circular lists at once: one sorted by key, one sorted by the time
/// the key was inserted (or last replaced). Each mode walks one of them in one direction.
///
/// # Examples
///
/// ```
/// use chrono_avl::{AvlTreeMap, ForEachMode};
///
/// let mut map = AvlTreeMap::ordered(0);
/// map.put(2, 20);
/// map.put(1, 10);
/// map.put(3, 30);
///
/// let keys = |mode| map.iter(mode).map(|(k, _)| *k).collect::<Vec<_>>();
/// assert_eq!(keys(ForEachMode::InOrder), [1, 2, 3]);
/// assert_eq!(keys(ForEachMode::ReverseInOrder), [3, 2, 1]);
/// assert_eq!(keys(ForEachMode::Queue), [2, 1, 3]);
/// assert_eq!(keys(ForEachMode::Stack), [3, 1, 2]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ForEachMode {
    /// Ascending key order, starting at the smallest key.
    #[default]
    InOrder,
    /// Descending key order, starting at the largest key.
    ReverseInOrder,
    /// Oldest entry first.
    Queue,
    /// Newest entry first.
    Stack,
}
