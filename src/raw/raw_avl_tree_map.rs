use core::cmp::Ordering;

use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{EMPTY_HEIGHT, Node, Side};
use crate::ForEachMode;
use crate::config::{CollisionPolicy, Comparator};
use crate::error::Error;

/// The core AVL implementation backing `AvlTreeMap`.
pub(crate) struct RawAvlTreeMap<K, V> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    pub(super) root: Option<Handle>,
    /// Handle to the node with the smallest key, where the sorted list starts.
    pub(super) min_value: Option<Handle>,
    /// Handle to the oldest node, where the insertion list starts.
    pub(super) first_inserted: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    pub(super) len: usize,
}

/// Result of an insertion attempt.
pub(crate) enum InsertOutcome<V> {
    /// A new node was created.
    Inserted,
    /// The key was present; its value was overwritten and this is the previous one.
    Replaced(V),
    /// The key was present and kept its value; the new value is handed back.
    Ignored { existing: Handle, rejected: V },
}

impl<K, V> RawAvlTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            min_value: None,
            first_inserted: None,
            len: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            ..Self::new()
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.min_value = None;
        self.first_inserted = None;
        self.len = 0;
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Returns the height of the root, or -1 for an empty tree.
    pub(crate) fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    pub(crate) fn min_value(&self) -> Option<Handle> {
        self.min_value
    }

    /// Returns the node with the largest key, the predecessor of the smallest.
    pub(crate) fn max_value(&self) -> Option<Handle> {
        self.min_value.map(|min| self.node(min).prev_in_order)
    }

    pub(crate) fn first_inserted(&self) -> Option<Handle> {
        self.first_inserted
    }

    pub(crate) fn last_inserted(&self) -> Option<Handle> {
        self.first_inserted.map(|first| self.node(first).prev_inserted)
    }

    #[inline]
    pub(super) fn height_of(&self, handle: Option<Handle>) -> i32 {
        handle.map_or(EMPTY_HEIGHT, |h| self.node(h).height)
    }

    #[inline]
    pub(super) fn size_of(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.node(h).size())
    }

    /// Recomputes the cached height and subtree sizes of `handle` from its children.
    /// Returns the balance factor.
    pub(super) fn refresh(&mut self, handle: Handle) -> i32 {
        let (left, right) = {
            let node = self.node(handle);
            (node.left, node.right)
        };
        let (height_left, height_right) = (self.height_of(left), self.height_of(right));
        let (size_left, size_right) = (self.size_of(left), self.size_of(right));

        let node = self.node_mut(handle);
        node.height = 1 + height_left.max(height_right);
        node.size_left = size_left;
        node.size_right = size_right;
        height_left - height_right
    }

    /// Points whatever referenced `old` as a child (its father, or the root slot) at `new`.
    pub(super) fn replace_child(&mut self, father: Option<Handle>, old: Handle, new: Option<Handle>) {
        match father {
            None => self.root = new,
            Some(father) => {
                let side = self
                    .node(father)
                    .side_of(old)
                    .expect("`RawAvlTreeMap::replace_child()` - `old` is not a child of `father`!");
                self.node_mut(father).set_child(side, new);
            }
        }
    }

    /// Walks from `start` up to the root, refreshing caches and rotating wherever the
    /// balance factor reaches ±2.
    pub(super) fn fixup(&mut self, start: Option<Handle>) {
        let mut current = start;
        while let Some(handle) = current {
            let balance = self.refresh(handle);
            current = if balance > 1 {
                let top = self.rotate(handle, Side::Left);
                self.node(top).father
            } else if balance < -1 {
                let top = self.rotate(handle, Side::Right);
                self.node(top).father
            } else {
                self.node(handle).father
            };
        }
    }

    // ─── Sorted list ─────────────────────────────────────────────────────────────

    fn link_in_order_after(&mut self, anchor: Handle, handle: Handle) {
        let next = self.node(anchor).next_in_order;
        let node = self.node_mut(handle);
        node.prev_in_order = anchor;
        node.next_in_order = next;
        self.node_mut(next).prev_in_order = handle;
        self.node_mut(anchor).next_in_order = handle;
    }

    fn link_in_order_before(&mut self, anchor: Handle, handle: Handle) {
        let prev = self.node(anchor).prev_in_order;
        self.link_in_order_after(prev, handle);
    }

    /// Removes `handle` from the sorted list. The tree must hold at least two nodes.
    fn unlink_in_order(&mut self, handle: Handle) {
        let (prev, next) = {
            let node = self.node(handle);
            (node.prev_in_order, node.next_in_order)
        };
        self.node_mut(prev).next_in_order = next;
        self.node_mut(next).prev_in_order = prev;
        if self.min_value == Some(handle) {
            self.min_value = Some(next);
        }
        let node = self.node_mut(handle);
        node.prev_in_order = handle;
        node.next_in_order = handle;
    }

    // ─── Insertion list ──────────────────────────────────────────────────────────

    /// Appends a detached node to the tail of the insertion list.
    fn push_inserted(&mut self, handle: Handle) {
        let Some(first) = self.first_inserted else {
            self.first_inserted = Some(handle);
            let node = self.node_mut(handle);
            node.prev_inserted = handle;
            node.next_inserted = handle;
            return;
        };
        let last = self.node(first).prev_inserted;
        let node = self.node_mut(handle);
        node.prev_inserted = last;
        node.next_inserted = first;
        self.node_mut(last).next_inserted = handle;
        self.node_mut(first).prev_inserted = handle;
    }

    /// Removes `handle` from the insertion list, leaving it self-linked.
    fn unlink_inserted(&mut self, handle: Handle) {
        let (prev, next) = {
            let node = self.node(handle);
            (node.prev_inserted, node.next_inserted)
        };
        if next == handle {
            self.first_inserted = None;
            return;
        }
        self.node_mut(prev).next_inserted = next;
        self.node_mut(next).prev_inserted = prev;
        if self.first_inserted == Some(handle) {
            self.first_inserted = Some(next);
        }
        let node = self.node_mut(handle);
        node.prev_inserted = handle;
        node.next_inserted = handle;
    }

    /// Moves the detached node `handle` into the insertion-list slot held by `vacated`.
    fn take_inserted_slot(&mut self, vacated: Handle, handle: Handle) {
        let (prev, next) = {
            let node = self.node(vacated);
            (node.prev_inserted, node.next_inserted)
        };
        if next == vacated {
            let node = self.node_mut(handle);
            node.prev_inserted = handle;
            node.next_inserted = handle;
        } else {
            let node = self.node_mut(handle);
            node.prev_inserted = prev;
            node.next_inserted = next;
            self.node_mut(prev).next_inserted = handle;
            self.node_mut(next).prev_inserted = handle;
        }
        if self.first_inserted.is_none_or(|first| first == vacated) {
            self.first_inserted = Some(handle);
        }
    }

    // ─── Order statistics ────────────────────────────────────────────────────────

    /// Returns the node at position `rank` in sorted order.
    pub(crate) fn get_at(&self, rank: usize) -> Option<Handle> {
        if rank >= self.len {
            return None;
        }

        let mut remaining = rank;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if remaining < node.size_left {
                current = node.left;
            } else {
                remaining -= node.size_left;
                if remaining == 0 {
                    return Some(handle);
                }
                remaining -= 1;
                current = node.right;
            }
        }
        None
    }

    /// Returns the zero-based position of `handle` in sorted order.
    pub(crate) fn index(&self, handle: Handle) -> usize {
        let mut rank = self.node(handle).size_left;
        let mut current = handle;
        while let Some(father) = self.node(current).father {
            let node = self.node(father);
            // Everything left of a father we climb to from the right precedes us.
            if node.right == Some(current) {
                rank += node.size_left + 1;
            }
            current = father;
        }
        rank
    }

    // ─── Traversal ───────────────────────────────────────────────────────────────

    /// Returns the node a traversal in `mode` starts from.
    pub(crate) fn start(&self, mode: ForEachMode) -> Option<Handle> {
        match mode {
            ForEachMode::InOrder => self.min_value,
            ForEachMode::ReverseInOrder => self.max_value(),
            ForEachMode::Queue => self.first_inserted,
            ForEachMode::Stack => self.last_inserted(),
        }
    }

    /// Returns the node following `handle` in `mode`.
    #[inline]
    pub(crate) fn step(&self, handle: Handle, mode: ForEachMode) -> Handle {
        let node = self.node(handle);
        match mode {
            ForEachMode::InOrder => node.next_in_order,
            ForEachMode::ReverseInOrder => node.prev_in_order,
            ForEachMode::Queue => node.next_inserted,
            ForEachMode::Stack => node.prev_inserted,
        }
    }

    /// Calls `action` on every entry in `mode`, checking that the walk closes its circle
    /// after exactly `len` nodes.
    pub(crate) fn for_each(&self, mode: ForEachMode, mut action: impl FnMut(&K, &V)) -> Result<(), Error> {
        let Some(start) = self.start(mode) else {
            return Ok(());
        };

        let mut current = start;
        let mut visited = 0;
        loop {
            if visited == self.len {
                return Err(Error::InternalInvariantViolation("traversal ran past `len` nodes"));
            }
            let node = self.node(current);
            action(&node.key, &node.value);
            visited += 1;
            current = self.step(current, mode);
            if current == start {
                break;
            }
        }

        if visited == self.len {
            Ok(())
        } else {
            Err(Error::InternalInvariantViolation("traversal closed before visiting `len` nodes"))
        }
    }
}

impl<K, V> RawAvlTreeMap<K, V> {
    /// Searches for a key and returns its node.
    pub(crate) fn search(&self, cmp: &Comparator<K>, key: &K) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match cmp(key, &node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts a key-value pair into the tree.
    pub(crate) fn insert(&mut self, cmp: &Comparator<K>, policy: CollisionPolicy, key: K, value: V) -> InsertOutcome<V> {
        let Some(root) = self.root else {
            let handle = self.nodes.alloc_with(|h| Node::new(h, key, value));
            self.root = Some(handle);
            self.min_value = Some(handle);
            self.first_inserted = Some(handle);
            self.len = 1;
            return InsertOutcome::Inserted;
        };

        // Descend to the empty slot the key belongs in.
        let mut father = root;
        let side = loop {
            let node = self.node(father);
            let side = match cmp(&key, &node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return self.collide(father, policy, value),
            };
            match node.child(side) {
                Some(child) => father = child,
                None => break side,
            }
        };

        let handle = self.nodes.alloc_with(|h| Node::new(h, key, value));
        self.node_mut(handle).father = Some(father);
        self.node_mut(father).set_child(side, Some(handle));

        // A new leaf is the sorted neighbour of its father.
        match side {
            Side::Right => self.link_in_order_after(father, handle),
            Side::Left => {
                self.link_in_order_before(father, handle);
                if self.min_value == Some(father) {
                    self.min_value = Some(handle);
                }
            }
        }
        self.push_inserted(handle);
        self.len = self.len.saturating_add(1);

        self.fixup(Some(father));
        InsertOutcome::Inserted
    }

    fn collide(&mut self, handle: Handle, policy: CollisionPolicy, value: V) -> InsertOutcome<V> {
        match policy {
            CollisionPolicy::Replace => {
                let old = core::mem::replace(&mut self.node_mut(handle).value, value);
                // Replacing counts as the most recent insertion.
                self.unlink_inserted(handle);
                self.push_inserted(handle);
                InsertOutcome::Replaced(old)
            }
            CollisionPolicy::IgnoreInsertion => InsertOutcome::Ignored {
                existing: handle,
                rejected: value,
            },
        }
    }

    /// Removes a key from the tree, returning the stored key-value pair.
    pub(crate) fn remove(&mut self, cmp: &Comparator<K>, key: &K) -> Result<(K, V), Error> {
        if self.is_empty() {
            return Err(Error::EmptyTree);
        }
        let handle = self.search(cmp, key).ok_or(Error::KeyNotFound)?;
        Ok(self.remove_node(handle))
    }

    fn remove_node(&mut self, handle: Handle) -> (K, V) {
        if self.len == 1 {
            let node = self.nodes.take(handle);
            self.root = None;
            self.min_value = None;
            self.first_inserted = None;
            self.len = 0;
            return (node.key, node.value);
        }

        // The node physically leaving the tree. With two children it is the in-order
        // successor, which has no left child. With one child it is that child, which is a
        // leaf. Either way it is a sorted neighbour of `handle`.
        let victim = {
            let node = self.node(handle);
            match (node.left, node.right) {
                (Some(_), Some(_)) => {
                    trace!("removal promotes the in-order successor");
                    node.next_in_order
                }
                (Some(child), None) | (None, Some(child)) => {
                    trace!("removal pulls up the only child");
                    child
                }
                (None, None) => handle,
            }
        };

        if victim == handle {
            self.unlink_inserted(handle);
        } else {
            // `handle` adopts the victim's entry and with it the victim's chronological slot,
            // while its own slot, the removed entry's, disappears.
            let (node, other) = self.nodes.get_pair_mut(handle, victim);
            node.swap_entry(other);
            self.unlink_inserted(handle);
            self.take_inserted_slot(victim, handle);
        }
        self.unlink_in_order(victim);

        let (father, child) = {
            let node = self.node(victim);
            (node.father, node.left.or(node.right))
        };
        self.replace_child(father, victim, child);
        if let Some(child) = child {
            self.node_mut(child).father = father;
        }
        self.len -= 1;
        self.fixup(father);

        if self.len == 1 {
            self.settle_singleton();
        }

        let node = self.nodes.take(victim);
        (node.key, node.value)
    }

    /// Self-links the only remaining node in both lists.
    fn settle_singleton(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let node = self.node_mut(root);
        node.father = None;
        node.next_in_order = root;
        node.prev_in_order = root;
        node.next_inserted = root;
        node.prev_inserted = root;
        self.min_value = Some(root);
        self.first_inserted = Some(root);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_sign_loss)]
pub(crate) mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    pub(crate) fn cmp(a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    impl<K: Ord + Clone + core::fmt::Debug, V> RawAvlTreeMap<K, V> {
        /// Validates every structural invariant. Panics with all violations found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            let Some(root) = self.root else {
                assert_eq!(self.len, 0, "empty tree should have len 0");
                assert!(self.min_value.is_none(), "empty tree should have no min_value");
                assert!(self.first_inserted.is_none(), "empty tree should have no first_inserted");
                return;
            };

            if self.node(root).father.is_some() {
                errors.push("root has a father".into());
            }

            let mut in_order: Vec<Handle> = Vec::new();
            let (size, _) = self.validate_node(root, &mut in_order, &mut errors);
            if size != self.len {
                errors.push(format!("len mismatch: len={}, counted={size}", self.len));
            }
            for pair in in_order.windows(2) {
                if self.node(pair[0]).key >= self.node(pair[1]).key {
                    errors.push(format!(
                        "keys out of order: {:?} before {:?}",
                        self.node(pair[0]).key,
                        self.node(pair[1]).key
                    ));
                }
            }

            // Sorted list must match the in-order walk of the tree, in both directions.
            if self.min_value != in_order.first().copied() {
                errors.push(format!("min_value mismatch: {:?}", self.min_value));
            }
            for (i, &handle) in in_order.iter().enumerate() {
                let node = self.node(handle);
                let next = in_order[(i + 1) % in_order.len()];
                let prev = in_order[(i + in_order.len() - 1) % in_order.len()];
                if node.next_in_order != next || node.prev_in_order != prev {
                    errors.push(format!("sorted list broken at {:?}", node.key));
                }
                if self.index(handle) != i {
                    errors.push(format!("index({:?}) = {}, expected {i}", node.key, self.index(handle)));
                }
                if self.get_at(i) != Some(handle) {
                    errors.push(format!("get_at({i}) does not return {:?}", node.key));
                }
            }

            // Insertion list must be a closed circle over all nodes.
            let inserted = self.inserted_handles();
            if inserted.len() != self.len {
                errors.push(format!("insertion list has {} nodes, len is {}", inserted.len(), self.len));
            }
            let mut sorted_inserted = inserted.clone();
            sorted_inserted.sort_by_key(|h| h.to_index());
            sorted_inserted.dedup();
            if sorted_inserted.len() != inserted.len() {
                errors.push("insertion list visits a node twice".into());
            }
            for (i, &handle) in inserted.iter().enumerate() {
                let prev = inserted[(i + inserted.len() - 1) % inserted.len()];
                if self.node(handle).prev_inserted != prev {
                    errors.push(format!("insertion list back link broken at {:?}", self.node(handle).key));
                }
            }

            assert!(errors.is_empty(), "tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns (subtree size, height).
        fn validate_node(&self, handle: Handle, in_order: &mut Vec<Handle>, errors: &mut Vec<String>) -> (usize, i32) {
            let node = self.node(handle);
            let visit = |child: Option<Handle>, in_order: &mut Vec<Handle>, errors: &mut Vec<String>| {
                child.map_or((0, EMPTY_HEIGHT), |c| {
                    if self.node(c).father != Some(handle) {
                        errors.push(format!("father link broken below {:?}", node.key));
                    }
                    self.validate_node(c, in_order, errors)
                })
            };

            let (size_left, height_left) = visit(node.left, in_order, errors);
            in_order.push(handle);
            let (size_right, height_right) = visit(node.right, in_order, errors);

            if node.size_left != size_left || node.size_right != size_right {
                errors.push(format!(
                    "size mismatch at {:?}: cached ({}, {}), actual ({size_left}, {size_right})",
                    node.key, node.size_left, node.size_right
                ));
            }
            let height = 1 + height_left.max(height_right);
            if node.height != height {
                errors.push(format!("height mismatch at {:?}: cached {}, actual {height}", node.key, node.height));
            }
            if (height_left - height_right).abs() > 1 {
                errors.push(format!("unbalanced at {:?}: {height_left} vs {height_right}", node.key));
            }
            (size_left + size_right + 1, height)
        }

        pub(crate) fn inserted_handles(&self) -> Vec<Handle> {
            let mut handles = Vec::new();
            let Some(first) = self.first_inserted else {
                return handles;
            };
            let mut current = first;
            loop {
                handles.push(current);
                current = self.node(current).next_inserted;
                if current == first || handles.len() > self.len {
                    break;
                }
            }
            handles
        }

        pub(crate) fn keys_in(&self, mode: ForEachMode) -> Vec<K> {
            let mut keys = Vec::new();
            self.for_each(mode, |k, _| keys.push(k.clone())).expect("lists should be intact");
            keys
        }

        pub(crate) fn key_of(&self, handle: Option<Handle>) -> Option<K> {
            handle.map(|h| self.node(h).key.clone())
        }
    }

    fn tree_of(keys: &[i32]) -> RawAvlTreeMap<i32, i32> {
        let mut tree = RawAvlTreeMap::new();
        for &k in keys {
            tree.insert(&cmp, CollisionPolicy::Replace, k, k * 10);
            tree.validate_invariants();
        }
        tree
    }

    fn children(tree: &RawAvlTreeMap<i32, i32>, key: i32) -> (Option<i32>, Option<i32>) {
        let node = tree.node(tree.search(&cmp, &key).expect("key should exist"));
        (tree.key_of(node.left), tree.key_of(node.right))
    }

    #[test]
    fn empty_tree() {
        let tree: RawAvlTreeMap<i32, i32> = RawAvlTreeMap::new();
        tree.validate_invariants();
        assert_eq!(tree.height(), -1);
        assert!(tree.get_at(0).is_none());
        assert_eq!(tree.for_each(ForEachMode::Stack, |_, _| panic!("no entries")), Ok(()));
    }

    #[test]
    fn first_insert_self_links() {
        let tree = tree_of(&[42]);
        let root = tree.root.expect("root");
        let node = tree.node(root);
        assert_eq!((node.next_in_order, node.prev_in_order), (root, root));
        assert_eq!((node.next_inserted, node.prev_inserted), (root, root));
        assert_eq!(tree.min_value, Some(root));
        assert_eq!(tree.first_inserted, Some(root));
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn ascending_triple_rotates_left() {
        let tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.key_of(tree.root), Some(2));
        assert_eq!(children(&tree, 2), (Some(1), Some(3)));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.key_of(tree.get_at(0)), Some(1));
        assert_eq!(tree.key_of(tree.get_at(2)), Some(3));
    }

    #[test]
    fn descending_triple_rotates_right() {
        let tree = tree_of(&[3, 2, 1]);
        assert_eq!(tree.key_of(tree.root), Some(2));
        assert_eq!(children(&tree, 2), (Some(1), Some(3)));
        assert_eq!(tree.key_of(tree.min_value), Some(1));
    }

    #[test]
    fn left_right_double_rotation() {
        let tree = tree_of(&[20, 10, 30, 3, 5]);
        assert_eq!(tree.key_of(tree.root), Some(20));
        assert_eq!(children(&tree, 20), (Some(5), Some(30)));
        assert_eq!(children(&tree, 5), (Some(3), Some(10)));
        assert_eq!(children(&tree, 30), (None, None));
        assert_eq!(tree.key_of(tree.get_at(0)), Some(3));
        assert_eq!(tree.key_of(tree.get_at(4)), Some(30));
        assert_eq!(tree.keys_in(ForEachMode::Queue), [20, 10, 30, 3, 5]);
    }

    #[test]
    fn right_left_double_rotation() {
        let tree = tree_of(&[10, 5, 20, 30, 25]);
        assert_eq!(children(&tree, 10), (Some(5), Some(25)));
        assert_eq!(children(&tree, 25), (Some(20), Some(30)));
    }

    #[test]
    fn replace_moves_entry_to_newest() {
        let mut tree = tree_of(&[1, 2, 3]);
        match tree.insert(&cmp, CollisionPolicy::Replace, 1, 99) {
            InsertOutcome::Replaced(old) => assert_eq!(old, 10),
            _ => panic!("expected a replacement"),
        }
        tree.validate_invariants();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.keys_in(ForEachMode::Queue), [2, 3, 1]);
        assert_eq!(tree.keys_in(ForEachMode::InOrder), [1, 2, 3]);
    }

    #[test]
    fn ignore_keeps_entry_and_order() {
        let mut tree = tree_of(&[1, 2, 3]);
        match tree.insert(&cmp, CollisionPolicy::IgnoreInsertion, 1, 99) {
            InsertOutcome::Ignored { existing, rejected } => {
                assert_eq!(rejected, 99);
                assert_eq!(tree.node(existing).value, 10);
            }
            _ => panic!("expected the insertion to be ignored"),
        }
        tree.validate_invariants();
        assert_eq!(tree.keys_in(ForEachMode::Queue), [1, 2, 3]);
    }

    #[test]
    fn remove_from_empty_and_missing() {
        let mut tree: RawAvlTreeMap<i32, i32> = RawAvlTreeMap::new();
        assert_eq!(tree.remove(&cmp, &1).err(), Some(Error::EmptyTree));
        let mut tree = tree_of(&[1]);
        assert_eq!(tree.remove(&cmp, &2).err(), Some(Error::KeyNotFound));
        tree.validate_invariants();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_sole_element_empties() {
        let mut tree = tree_of(&[7]);
        assert_eq!(tree.remove(&cmp, &7), Ok((7, 70)));
        tree.validate_invariants();
        assert!(tree.is_empty());
        assert_eq!(tree.remove(&cmp, &7).err(), Some(Error::EmptyTree));
    }

    #[test]
    fn remove_root_with_two_children_promotes_successor() {
        let mut tree = tree_of(&[10, 20, 30]);
        assert_eq!(tree.key_of(tree.root), Some(20));
        assert_eq!(tree.remove(&cmp, &20), Ok((20, 200)));
        tree.validate_invariants();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.key_of(tree.root), Some(30));
        assert_eq!(tree.keys_in(ForEachMode::Queue), [10, 30]);
        assert_eq!(tree.keys_in(ForEachMode::Stack), [30, 10]);
    }

    #[test]
    fn remove_with_one_child_adopts_child_slot() {
        // 2 is the root with only a right child once 1 is gone.
        let mut tree = tree_of(&[2, 3, 1]);
        tree.remove(&cmp, &1).expect("present");
        tree.validate_invariants();
        assert_eq!(tree.remove(&cmp, &2), Ok((2, 20)));
        tree.validate_invariants();
        assert_eq!(tree.key_of(tree.root), Some(3));
        assert_eq!(tree.keys_in(ForEachMode::Queue), [3]);
    }

    #[test]
    fn remove_with_left_child_moves_min_value() {
        let mut tree = tree_of(&[5, 8, 3, 9, 1]);
        // 3 has only the left child 1, which is the minimum.
        assert_eq!(children(&tree, 3), (Some(1), None));
        assert_eq!(tree.remove(&cmp, &3), Ok((3, 30)));
        tree.validate_invariants();
        assert_eq!(tree.key_of(tree.min_value), Some(1));
        assert_eq!(tree.keys_in(ForEachMode::Queue), [5, 8, 9, 1]);
    }

    #[test]
    fn remove_oldest_updates_first_inserted() {
        let mut tree = tree_of(&[2, 1, 3]);
        assert_eq!(tree.remove(&cmp, &2), Ok((2, 20)));
        tree.validate_invariants();
        assert_eq!(tree.keys_in(ForEachMode::Queue), [1, 3]);
        assert_eq!(tree.remove(&cmp, &1), Ok((1, 10)));
        tree.validate_invariants();
        assert_eq!(tree.keys_in(ForEachMode::Queue), [3]);
    }

    #[test]
    fn removal_rebalances() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);
        for key in [9, 8, 7] {
            tree.remove(&cmp, &key).expect("present");
            tree.validate_invariants();
        }
        assert_eq!(tree.keys_in(ForEachMode::InOrder), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut tree = tree_of(&[1, 2, 3, 4]);
        tree.remove(&cmp, &2).expect("present");
        tree.insert(&cmp, CollisionPolicy::Replace, 10, 100);
        tree.validate_invariants();
        assert_eq!(tree.nodes.len(), 4);
    }

    #[test]
    fn corrupted_list_is_reported() {
        let mut tree = tree_of(&[1, 2, 3]);
        // Short-circuit the sorted list: 1 -> 1.
        let min = tree.min_value.expect("min");
        tree.node_mut(min).next_in_order = min;
        assert!(matches!(
            tree.for_each(ForEachMode::InOrder, |_, _| {}),
            Err(Error::InternalInvariantViolation(_))
        ));

        let mut tree = tree_of(&[1, 2, 3]);
        // Skip the start: 3 -> 2, so the walk never returns to 1.
        let max = tree.max_value().expect("max");
        let middle = tree.node(max).prev_in_order;
        tree.node_mut(max).next_in_order = middle;
        assert!(matches!(
            tree.for_each(ForEachMode::InOrder, |_, _| {}),
            Err(Error::InternalInvariantViolation(_))
        ));
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32, bool),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0..200i32, any::<bool>()).prop_map(|(k, replace)| Op::Insert(k, replace)),
            2 => (0..200i32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawAvlTreeMap<i32, i32> = RawAvlTreeMap::new();
            // Chronological model: oldest first.
            let mut chronological: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(k, replace) => {
                        let policy = if replace { CollisionPolicy::Replace } else { CollisionPolicy::IgnoreInsertion };
                        let present = chronological.contains(&k);
                        tree.insert(&cmp, policy, k, k);
                        if !present {
                            chronological.push(k);
                        } else if replace {
                            chronological.retain(|&x| x != k);
                            chronological.push(k);
                        }
                    }
                    Op::Remove(k) => {
                        let result = tree.remove(&cmp, &k);
                        if chronological.contains(&k) {
                            prop_assert_eq!(result, Ok((k, k)));
                            chronological.retain(|&x| x != k);
                        } else if chronological.is_empty() {
                            prop_assert_eq!(result, Err(Error::EmptyTree));
                        } else {
                            prop_assert_eq!(result, Err(Error::KeyNotFound));
                        }
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.keys_in(ForEachMode::Queue), chronological.clone());
                let mut newest_first = chronological.clone();
                newest_first.reverse();
                prop_assert_eq!(tree.keys_in(ForEachMode::Stack), newest_first);
            }
        }

        #[test]
        fn height_stays_logarithmic(keys in prop::collection::vec(any::<i32>(), 1..2000)) {
            let mut tree: RawAvlTreeMap<i32, ()> = RawAvlTreeMap::new();
            for k in keys {
                tree.insert(&cmp, CollisionPolicy::Replace, k, ());
            }
            // AVL bound: h < 1.4405 * log2(n + 2).
            let log2 = (tree.len() + 2).ilog2() + 1;
            prop_assert!((tree.height() as u32) * 100 < 145 * log2);
        }
    }
}
