//! # History
//!
//! Linear undo/redo over committed layout snapshots.
//!
//! ```text
//! entries:  [s0] [s1] [s2] [s3]
//!                      ^ index          undo -> s1, redo -> s3
//! commit(s4) here  =>  [s0] [s1] [s2] [s4]   (s3 discarded)
//! ```
//!
//! Entry 0 is the state the session was opened with. Only completed user
//! actions are committed, never individual pointer-move frames.

use crate::TemplateLayout;

/// Undo/redo stack of immutable layout snapshots with dirty tracking.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<TemplateLayout>,
    index: usize,
    /// Index of the last persisted entry; `None` once it has been discarded
    /// or dropped by the capacity limit.
    saved_index: Option<usize>,
    /// Maximum number of entries kept (oldest dropped when exceeded).
    max_entries: usize,
}

impl History {
    /// Default maximum number of entries.
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    /// Start a history whose first entry is `initial`, considered persisted.
    #[must_use]
    pub fn new(initial: TemplateLayout) -> Self {
        Self::with_max_entries(initial, Self::DEFAULT_MAX_ENTRIES)
    }

    /// Start a history bounded to `max_entries` (at least 1).
    #[must_use]
    pub fn with_max_entries(initial: TemplateLayout, max_entries: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            saved_index: Some(0),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a committed state.
    ///
    /// Discards every redoable entry, appends `snapshot`, and moves the
    /// cursor to it.
    pub fn commit(&mut self, snapshot: TemplateLayout) {
        self.entries.truncate(self.index + 1);
        if self.saved_index.is_some_and(|saved| saved > self.index) {
            self.saved_index = None;
        }
        self.entries.push(snapshot);
        self.index = self.entries.len() - 1;

        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
            self.index -= overflow;
            self.saved_index = self
                .saved_index
                .and_then(|saved| saved.checked_sub(overflow));
        }
        tracing::debug!("History commit -> {}/{}", self.index, self.entries.len());
    }

    /// Step back. Returns the state to apply, or `None` at the first entry.
    pub fn undo(&mut self) -> Option<&TemplateLayout> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        tracing::debug!("Undo -> {}/{}", self.index, self.entries.len());
        self.entries.get(self.index)
    }

    /// Step forward. Returns the state to apply, or `None` at the tail.
    pub fn redo(&mut self) -> Option<&TemplateLayout> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        tracing::debug!("Redo -> {}/{}", self.index, self.entries.len());
        self.entries.get(self.index)
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The entry at the cursor.
    #[must_use]
    pub fn current(&self) -> &TemplateLayout {
        &self.entries[self.index]
    }

    /// Cursor position.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a history holds at least its initial entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the cursor differs from the last persisted entry.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.saved_index != Some(self.index)
    }

    /// Record that the entry at the cursor has been persisted.
    pub fn mark_saved(&mut self) {
        self.saved_index = Some(self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(width: f64) -> TemplateLayout {
        TemplateLayout::new(width, 100.0)
    }

    #[test]
    fn test_new_history_is_clean() {
        let history = History::new(layout(1.0));
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_dirty());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_redo_walks_entries() {
        let mut history = History::new(layout(1.0));
        history.commit(layout(2.0));
        history.commit(layout(3.0));
        assert!(history.is_dirty());

        assert_eq!(history.undo(), Some(&layout(2.0)));
        assert_eq!(history.undo(), Some(&layout(1.0)));
        assert_eq!(history.undo(), None);
        assert_eq!(history.index(), 0);

        assert_eq!(history.redo(), Some(&layout(2.0)));
        assert_eq!(history.redo(), Some(&layout(3.0)));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_commit_discards_redo_branch() {
        let mut history = History::new(layout(1.0));
        history.commit(layout(2.0));
        history.commit(layout(3.0));
        history.undo();
        history.undo();
        history.commit(layout(4.0));

        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &layout(4.0));
        assert_eq!(history.undo(), Some(&layout(1.0)));
    }

    #[test]
    fn test_dirty_follows_saved_entry() {
        let mut history = History::new(layout(1.0));
        history.commit(layout(2.0));
        history.mark_saved();
        assert!(!history.is_dirty());

        history.undo();
        assert!(history.is_dirty());
        history.redo();
        assert!(!history.is_dirty());

        // Saved entry discarded by a new branch: dirty until saved again.
        history.undo();
        history.commit(layout(5.0));
        assert!(history.is_dirty());
        history.undo();
        assert!(history.is_dirty());
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut history = History::with_max_entries(layout(0.0), 3);
        for i in 1..=5 {
            history.commit(layout(f64::from(i)));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), &layout(5.0));
        assert_eq!(history.undo(), Some(&layout(4.0)));
        assert_eq!(history.undo(), Some(&layout(3.0)));
        assert_eq!(history.undo(), None);
        // Initial (saved) entry was dropped.
        assert!(history.is_dirty());
    }
}
