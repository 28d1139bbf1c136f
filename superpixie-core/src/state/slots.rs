//! Two-slot current/pending buffer

/// A current and a pending copy of a record
///
/// Writers edit the pending copy. [`swap`](Self::swap) promotes it to
/// current by flipping the active index, then re-seeds pending from the
/// new current so later edits start from what is on screen.
#[derive(Debug, Clone)]
pub struct DoubleSlot<T: Clone> {
    slots: [T; 2],
    active: usize,
    dirty: bool,
}

impl<T: Clone> DoubleSlot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slots: [initial.clone(), initial],
            active: 0,
            dirty: false,
        }
    }

    pub fn current(&self) -> &T {
        &self.slots[self.active]
    }

    pub fn pending(&self) -> &T {
        &self.slots[1 - self.active]
    }

    /// Pending copy for editing; marks the buffer dirty
    pub fn pending_mut(&mut self) -> &mut T {
        self.dirty = true;
        &mut self.slots[1 - self.active]
    }

    /// Edit both copies at once, bypassing the transition
    pub fn set_both(&mut self, mut edit: impl FnMut(&mut T)) {
        edit(&mut self.slots[0]);
        edit(&mut self.slots[1]);
    }

    /// Whether pending was edited since the last swap
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Index of the slot currently shown
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Promote pending to current
    ///
    /// Returns whether pending had been edited.
    pub fn swap(&mut self) -> bool {
        self.active = 1 - self.active;
        let current = self.slots[self.active].clone();
        self.slots[1 - self.active] = current;
        core::mem::replace(&mut self.dirty, false)
    }

    /// Reset both copies
    pub fn reset(&mut self, value: T) {
        self.slots = [value.clone(), value];
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_pending_then_swap() {
        let mut slot = DoubleSlot::new(1u32);
        *slot.pending_mut() = 5;
        assert_eq!(*slot.current(), 1);
        assert_eq!(*slot.pending(), 5);
        assert!(slot.is_dirty());

        assert!(slot.swap());
        assert_eq!(*slot.current(), 5);
        assert_eq!(*slot.pending(), 5);
        assert_eq!(slot.active_index(), 1);
        assert!(!slot.is_dirty());
    }

    #[test]
    fn test_clean_swap_reports_false() {
        let mut slot = DoubleSlot::new(1u32);
        assert!(!slot.swap());
        assert_eq!(*slot.current(), 1);
    }

    #[test]
    fn test_set_both() {
        let mut slot = DoubleSlot::new(1u32);
        slot.set_both(|v| *v = 9);
        assert_eq!(*slot.current(), 9);
        assert_eq!(*slot.pending(), 9);
        assert!(!slot.is_dirty());
    }
}
