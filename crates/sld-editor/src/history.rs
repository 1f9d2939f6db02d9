//! Bounded linear undo history over diagram snapshots.
//!
//! Entries are full snapshots, so undo and redo are plain restores. The
//! cursor points at the entry matching the current diagram; `None` means
//! nothing has been recorded yet.

use sld_core::Snapshot;

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a committed state. Drops the redo branch, then the oldest
    /// entries beyond capacity.
    pub fn push(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = Some(self.entries.len() - 1);
        log::debug!("history push: {} entries", self.entries.len());
    }

    /// Step back. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let c = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(c);
        log::debug!("undo to entry {c}");
        self.entries.get(c)
    }

    /// Step forward. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let c = self.cursor.map_or(0, |c| c + 1);
        if c >= self.entries.len() {
            return None;
        }
        self.cursor = Some(c);
        log::debug!("redo to entry {c}");
        self.entries.get(c)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.and_then(|c| self.entries.get(c))
    }
}
