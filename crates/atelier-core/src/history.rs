//! Bounded snapshot history with a cursor
//!
//! Pushing a snapshot discards everything after the cursor (the undone
//! branch). When the buffer is full the oldest snapshot is evicted, so
//! undo can reach back at most `capacity - 1` steps.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<T>,
    /// Index of the snapshot that matches the live state; `None` when empty
    cursor: Option<usize>,
    capacity: usize,
}

impl<T> HistoryBuffer<T> {
    /// Create an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            cursor: None,
            capacity,
        }
    }

    /// Create a history seeded with an initial snapshot at cursor 0
    pub fn seeded(capacity: usize, initial: T) -> Self {
        let mut history = Self::new(capacity);
        history.push(initial);
        history
    }

    /// Record a new snapshot after the cursor, dropping any redo branch
    pub fn push(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one snapshot. Returns `None` (and does nothing) at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        let cursor = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    /// Step forward one snapshot. Returns `None` (and does nothing) at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.cursor? + 1;
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        self.entries.get(next)
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.cursor?)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let mut history: HistoryBuffer<u32> = HistoryBuffer::new(8);
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_push_moves_cursor_to_end() {
        let mut history = HistoryBuffer::seeded(16, 0);
        for n in 1..=5 {
            history.push(n);
        }
        assert_eq!(history.len(), 6);
        assert_eq!(history.cursor(), Some(5));
        assert_eq!(history.current(), Some(&5));
    }

    #[test]
    fn test_undo_redo_boundaries() {
        let mut history = HistoryBuffer::seeded(16, "blank");
        assert_eq!(history.undo(), None);
        assert_eq!(history.cursor(), Some(0));

        history.push("a");
        assert_eq!(history.redo(), None);
        assert_eq!(history.cursor(), Some(1));

        assert_eq!(history.undo(), Some(&"blank"));
        assert_eq!(history.redo(), Some(&"a"));
    }

    #[test]
    fn test_push_after_undo_truncates_branch() {
        let mut history = HistoryBuffer::seeded(16, 0);
        history.push(1);
        history.push(2);
        history.undo();
        history.undo();
        history.push(9);
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(1));
        assert!(!history.can_redo());
        assert_eq!(history.current(), Some(&9));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryBuffer::seeded(3, 0);
        for n in 1..=4 {
            history.push(n);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut history = HistoryBuffer::new(0);
        history.push('x');
        history.push('y');
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), Some(&'y'));
        assert!(!history.can_undo());
    }
}
