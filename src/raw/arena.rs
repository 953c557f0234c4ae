use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes, addressed by [`Handle`].
///
/// Vacated slots are recycled by later allocations, so a handle stays valid until the
/// element it names is taken out.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    /// Allocates a slot and builds the element from the handle it will live under.
    ///
    /// Nodes of the circular lists point at themselves when alone, so they need their own
    /// handle before they exist.
    pub(crate) fn alloc_with(&mut self, build: impl FnOnce(Handle) -> T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.to_index()] = Some(build(handle));
            handle
        } else {
            // Strict less-than keeps every handle (and the element count) within `Handle::MAX`.
            assert!(
                self.slots.len() < Handle::MAX,
                "`Arena::alloc_with()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            let handle = Handle::from_index(self.slots.len());
            self.slots.push(Some(build(handle)));
            handle
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Returns mutable references to two distinct elements.
    pub(crate) fn get_pair_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (i, j) = (a.to_index(), b.to_index());
        assert_ne!(i, j, "`Arena::get_pair_mut()` - `a` and `b` are the same handle!");
        let (first, second) = if i < j {
            let (low, high) = self.slots.split_at_mut(j);
            (&mut low[i], &mut high[0])
        } else {
            let (low, high) = self.slots.split_at_mut(i);
            (&mut high[0], &mut low[j])
        };
        (
            first.as_mut().expect("`Arena::get_pair_mut()` - `a` is invalid!"),
            second.as_mut().expect("`Arena::get_pair_mut()` - `b` is invalid!"),
        )
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
