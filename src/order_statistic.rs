/// A zero-based rank into the sorted order of an [`AvlTreeMap`](crate::AvlTreeMap).
///
/// # Examples
///
/// ```
/// use chrono_avl::{AvlTreeMap, Rank};
///
/// let mut map = AvlTreeMap::ordered(0);
/// map.put("b", 20);
/// map.put("a", 10);
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);
