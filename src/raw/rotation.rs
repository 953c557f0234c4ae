use tracing::trace;

use super::handle::Handle;
use super::node::Side;
use super::raw_avl_tree_map::RawAvlTreeMap;

impl<K, V> RawAvlTreeMap<K, V> {
    /// Rebalances the subtree rooted at `handle`, whose `heavy` side is two levels taller
    /// than the other. Returns the new subtree root.
    ///
    /// Only topology, heights and sizes change; neither circular list is touched.
    pub(super) fn rotate(&mut self, handle: Handle, heavy: Side) -> Handle {
        let pivot = self
            .node(handle)
            .child(heavy)
            .expect("`RawAvlTreeMap::rotate()` - heavy side has no child!");
        let (outer, inner) = {
            let node = self.node(pivot);
            (node.child(heavy), node.child(heavy.opposite()))
        };

        // Lifting the pivot alone would leave a taller inner grandchild unbalanced on the
        // other side, so that grandchild goes to the top instead.
        match inner {
            Some(grandchild) if self.height_of(inner) > self.height_of(outer) => {
                self.rotate_double(handle, pivot, grandchild, heavy)
            }
            _ => self.rotate_single(handle, pivot, heavy),
        }
    }

    fn rotate_single(&mut self, handle: Handle, pivot: Handle, heavy: Side) -> Handle {
        trace!(?heavy, "single rotation");
        let inner = heavy.opposite();
        let father = self.node(handle).father;

        let moved = self.node(pivot).child(inner);
        self.node_mut(handle).set_child(heavy, moved);
        if let Some(moved) = moved {
            self.node_mut(moved).father = Some(handle);
        }

        self.replace_child(father, handle, Some(pivot));
        self.node_mut(pivot).father = father;
        self.node_mut(pivot).set_child(inner, Some(handle));
        self.node_mut(handle).father = Some(pivot);

        self.refresh(handle);
        self.refresh(pivot);
        pivot
    }

    fn rotate_double(&mut self, handle: Handle, pivot: Handle, grandchild: Handle, heavy: Side) -> Handle {
        trace!(?heavy, "double rotation");
        let inner = heavy.opposite();
        let father = self.node(handle).father;

        // The grandchild's subtrees split between its two new children.
        let (toward_pivot, toward_handle) = {
            let node = self.node(grandchild);
            (node.child(heavy), node.child(inner))
        };
        self.node_mut(pivot).set_child(inner, toward_pivot);
        if let Some(child) = toward_pivot {
            self.node_mut(child).father = Some(pivot);
        }
        self.node_mut(handle).set_child(heavy, toward_handle);
        if let Some(child) = toward_handle {
            self.node_mut(child).father = Some(handle);
        }

        self.replace_child(father, handle, Some(grandchild));
        let node = self.node_mut(grandchild);
        node.father = father;
        node.set_child(heavy, Some(pivot));
        node.set_child(inner, Some(handle));
        self.node_mut(pivot).father = Some(grandchild);
        self.node_mut(handle).father = Some(grandchild);

        self.refresh(handle);
        self.refresh(pivot);
        self.refresh(grandchild);
        grandchild
    }
}
