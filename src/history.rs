// Bounded undo history over mask snapshots.
//
// The bottom entry is the mask as it was when the image was loaded. Every later
// entry is the mask as it was just before one edit (a stroke or a clear). Undoing
// pops the newest entry and hands it back, so one undo reverts exactly one edit and
// the load-time entry can never be popped.

use std::collections::VecDeque;

use crate::types::Mask;

pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Clone, Debug)]
pub struct UndoHistory {
    entries: VecDeque<Mask>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl UndoHistory {
    /// History holding at most `capacity` snapshots (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push a copy of `mask`, evicting the oldest entry when full.
    pub fn snapshot(&mut self, mask: &Mask) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(mask.clone());
    }

    pub fn can_undo(&self) -> bool {
        self.entries.len() > 1
    }

    /// The mask to restore, or `None` when only the base entry is left.
    pub fn undo(&mut self) -> Option<Mask> {
        if !self.can_undo() {
            return None;
        }
        self.entries.pop_back()
    }

    /// Forget everything and start over from `mask`.
    pub fn reset(&mut self, mask: &Mask) {
        self.entries.clear();
        self.entries.push_back(mask.clone());
    }

    /// Drop the newest snapshot if the edit it guarded left `mask` unchanged.
    /// Returns true when an entry was dropped.
    pub fn discard_if_unchanged(&mut self, mask: &Mask) -> bool {
        if self.can_undo() && self.entries.back() == Some(mask) {
            self.entries.pop_back();
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
