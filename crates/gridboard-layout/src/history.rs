//! Bounded undo/redo history of layout snapshots.
//!
//! ```text
//! push(s3)            undo() x2             push(s4): new branch
//! undo: [s0 s1 s2 s3] undo: [s0 s1]         undo: [s0 s1 s4]
//! redo: []            redo: [s3 s2]         redo: []
//! ```
//!
//! The back of the undo stack is the current entry. Pushing a snapshot equal
//! to the current entry is a no-op, so re-committing an unchanged layout never
//! grows the history.

use std::collections::VecDeque;

use crate::widget::Widget;

/// Default number of retained snapshots.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Snapshot history for any cloneable, comparable state.
///
/// # Invariants
///
/// 1. `undo_stack.len() <= capacity` after every operation.
/// 2. The redo stack is cleared by every accepted `push`.
/// 3. `push` is ignored while a restore is in progress.
#[derive(Debug, Clone)]
pub struct SnapshotHistory<T> {
    undo_stack: VecDeque<T>,
    redo_stack: Vec<T>,
    capacity: usize,
    restoring: bool,
}

/// History of full widget arrays.
pub type LayoutHistory = SnapshotHistory<Vec<Widget>>;

impl<T: Clone + PartialEq> SnapshotHistory<T> {
    /// Capacity is clamped to at least one entry.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            restoring: false,
        }
    }

    /// Record `snapshot` as the new current entry.
    ///
    /// Returns `true` if an entry was appended.
    pub fn push(&mut self, snapshot: &T) -> bool {
        if self.restoring {
            return false;
        }
        if self.undo_stack.back() == Some(snapshot) {
            return false;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(snapshot.clone());
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        true
    }

    /// Step back one entry and return a copy of it.
    pub fn undo(&mut self) -> Option<T> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push(current);
        self.undo_stack.back().cloned()
    }

    /// Step forward one entry and return a copy of it.
    pub fn redo(&mut self) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(snapshot);
        self.undo_stack.back().cloned()
    }

    /// Suppress pushes while an undo/redo result is being applied.
    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    #[must_use]
    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.undo_stack.back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Entries reachable by undo, including the current one.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Total retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty() && self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest entry still reachable by undo.
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.undo_stack.front()
    }

    /// Drop everything and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: &T) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.restoring = false;
        self.undo_stack.push_back(snapshot.clone());
    }
}

impl<T: Clone + PartialEq> Default for SnapshotHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_has_nothing_to_step() {
        let mut history = SnapshotHistory::<i32>::default();
        assert!(history.is_empty());
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.capacity(), DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn consecutive_equal_pushes_are_deduplicated() {
        let mut history = SnapshotHistory::new(10);
        assert!(history.push(&1));
        assert!(!history.push(&1));
        assert!(history.push(&2));
        assert!(history.push(&1));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn undo_and_redo_round_trip() {
        let mut history = SnapshotHistory::new(10);
        for state in 1..=3 {
            history.push(&state);
        }
        assert_eq!(history.undo(), Some(2));
        assert_eq!(history.undo(), Some(1));
        assert_eq!(history.undo(), None);
        assert_eq!(history.current(), Some(&1));
        assert_eq!(history.redo(), Some(2));
        assert_eq!(history.redo(), Some(3));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn push_after_undo_drops_redo_branch() {
        let mut history = SnapshotHistory::new(10);
        for state in 1..=3 {
            history.push(&state);
        }
        history.undo();
        assert!(history.push(&9));
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(2));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = SnapshotHistory::new(DEFAULT_HISTORY_CAPACITY);
        for state in 1..=60 {
            history.push(&state);
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.oldest(), Some(&11));
        assert_eq!(history.current(), Some(&60));
    }

    #[test]
    fn pushes_are_ignored_during_restore() {
        let mut history = SnapshotHistory::new(10);
        history.push(&1);
        history.push(&2);
        let restored = history.undo();
        history.begin_restore();
        assert!(history.is_restoring());
        assert!(!history.push(&5));
        history.end_restore();
        assert_eq!(restored, Some(1));
        assert!(history.can_redo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn reset_keeps_a_single_entry() {
        let mut history = SnapshotHistory::new(10);
        history.push(&1);
        history.push(&2);
        history.reset(&7);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&7));
        assert!(!history.can_undo());
    }
}
