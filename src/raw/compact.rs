use alloc::vec::Vec;

use tracing::debug;

use super::handle::Handle;
use super::raw_avl_tree_map::RawAvlTreeMap;

/// Below this many nodes insertion alone cannot produce a degenerate shape.
pub(crate) const COMPACT_THRESHOLD: usize = 8;

/// A node chosen for the rebuilt tree, with the plan slots of its future children.
#[derive(Clone, Copy)]
struct PlanSlot {
    handle: Handle,
    left: Option<usize>,
    right: Option<usize>,
}

impl<K, V> RawAvlTreeMap<K, V> {
    /// Rebuilds the tree into a perfectly balanced shape.
    ///
    /// Keys, values and insertion order are preserved; the sorted list is re-threaded.
    pub(crate) fn compact_balance(&mut self) {
        if self.len < COMPACT_THRESHOLD {
            return;
        }
        let before = self.height();

        // The plan is built entirely before any link changes, while ranks still resolve.
        let mut plan: Vec<PlanSlot> = Vec::with_capacity(self.len);
        let Some(root) = self.plan_range(0, self.len, &mut plan) else {
            return;
        };
        let (min, max) = self.link_planned(&plan, root, None);
        self.join_in_order(max, min);
        self.root = Some(plan[root].handle);
        self.min_value = Some(min);

        debug!(len = self.len, before, after = self.height(), "compacted tree");
    }

    /// Plans the subtree holding ranks `low..high`, rooted at the middle rank.
    fn plan_range(&self, low: usize, high: usize, plan: &mut Vec<PlanSlot>) -> Option<usize> {
        if low >= high {
            return None;
        }
        let mid = low + (high - low) / 2;
        let handle = self
            .get_at(mid)
            .expect("`RawAvlTreeMap::plan_range()` - rank below `len` has no node!");

        let slot = plan.len();
        plan.push(PlanSlot {
            handle,
            left: None,
            right: None,
        });
        plan[slot].left = self.plan_range(low, mid, plan);
        plan[slot].right = self.plan_range(mid + 1, high, plan);
        Some(slot)
    }

    /// Applies the plan below `slot`, returning the first and last node of the subtree in
    /// sorted order.
    fn link_planned(&mut self, plan: &[PlanSlot], slot: usize, father: Option<Handle>) -> (Handle, Handle) {
        let PlanSlot { handle, left, right } = plan[slot];
        let left_span = left.map(|s| self.link_planned(plan, s, Some(handle)));
        let right_span = right.map(|s| self.link_planned(plan, s, Some(handle)));

        let node = self.node_mut(handle);
        node.father = father;
        node.left = left.map(|s| plan[s].handle);
        node.right = right.map(|s| plan[s].handle);
        self.refresh(handle);

        let min = match left_span {
            Some((min, max)) => {
                self.join_in_order(max, handle);
                min
            }
            None => handle,
        };
        let max = match right_span {
            Some((min, max)) => {
                self.join_in_order(handle, min);
                max
            }
            None => handle,
        };
        (min, max)
    }

    fn join_in_order(&mut self, prev: Handle, next: Handle) {
        self.node_mut(prev).next_in_order = next;
        self.node_mut(next).prev_in_order = prev;
    }
}
