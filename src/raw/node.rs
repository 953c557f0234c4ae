use super::handle::Handle;

/// Height reported for an absent child.
pub(crate) const EMPTY_HEIGHT: i32 = -1;

/// Which child slot of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// AVL node threaded into two circular lists.
//
// Tree links use `Option<Handle>`; list links are always populated because a node that is
// alone in the tree links to itself.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // A leaf has height 0.
    pub(crate) height: i32,
    // Number of nodes in each subtree, for order-statistic operations.
    pub(crate) size_left: usize,
    pub(crate) size_right: usize,
    pub(crate) father: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    // Ascending key order.
    pub(crate) next_in_order: Handle,
    pub(crate) prev_in_order: Handle,
    // Chronological order.
    pub(crate) next_inserted: Handle,
    pub(crate) prev_inserted: Handle,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf that links to itself in both lists.
    pub(crate) fn new(handle: Handle, key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 0,
            size_left: 0,
            size_right: 0,
            father: None,
            left: None,
            right: None,
            next_in_order: handle,
            prev_in_order: handle,
            next_inserted: handle,
            prev_inserted: handle,
        }
    }

    /// Returns the number of nodes in the subtree rooted at this node.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size_left + self.size_right + 1
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns the side `child` hangs from, if it is a child of this node at all.
    #[inline]
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left == Some(child) {
            Some(Side::Left)
        } else if self.right == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Swaps the key/value payloads of two nodes, leaving every link in place.
    pub(crate) fn swap_entry(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.key, &mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }
}
