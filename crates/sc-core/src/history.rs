//! Bounded undo/redo history over deep project snapshots.
//!
//! Entries are serialized JSON deep copies, so a snapshot can never alias
//! the live, mutable `Project`. The cursor always points at the entry that
//! matches the live state; entries behind it are undo states, entries ahead
//! of it are redo states.

use serde_json::Value;

/// Default history capacity.
pub const MAX_HISTORY: usize = 100;

/// An immutable deep snapshot of a project state.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp_ms: u64,
    pub snapshot: Value,
}

#[derive(Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Index of the entry matching the live project state.
    cursor: usize,
    capacity: usize,
}

impl History {
    /// A history seeded with the initial state. `undo` is unavailable until
    /// at least one later snapshot is recorded.
    pub fn new(initial: Value, capacity: usize) -> Self {
        Self {
            entries: vec![entry(initial)],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new snapshot after a mutation. Discards the redo branch,
    /// then evicts the oldest entry if the capacity is exceeded.
    pub fn record(&mut self, snapshot: Value) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry(snapshot));
        if self.entries.len() > self.capacity {
            self.entries.remove(0);
        } else {
            self.cursor += 1;
        }
    }

    /// Drop everything and reseed with a single snapshot (project load).
    pub fn reset(&mut self, snapshot: Value) {
        self.entries.clear();
        self.entries.push(entry(snapshot));
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Move the cursor one step back and return the snapshot now under it.
    pub fn step_back(&mut self) -> Option<&Value> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor].snapshot)
    }

    /// Move the cursor one step forward and return the snapshot now under it.
    pub fn step_forward(&mut self) -> Option<&Value> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor].snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry(snapshot: Value) -> HistoryEntry {
    HistoryEntry {
        timestamp_ms: crate::model::now_ms(),
        snapshot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_state_has_no_undo() {
        let mut h = History::new(json!(0), 10);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.step_back().is_none());
    }

    #[test]
    fn undo_redo_walks_the_cursor() {
        let mut h = History::new(json!(0), 10);
        h.record(json!(1));
        h.record(json!(2));

        assert_eq!(h.step_back(), Some(&json!(1)));
        assert_eq!(h.step_back(), Some(&json!(0)));
        assert!(h.step_back().is_none());
        assert_eq!(h.step_forward(), Some(&json!(1)));
        assert_eq!(h.step_forward(), Some(&json!(2)));
        assert!(h.step_forward().is_none());
    }

    #[test]
    fn divergent_record_discards_redo_branch() {
        let mut h = History::new(json!(0), 10);
        h.record(json!(1));
        h.step_back();
        assert!(h.can_redo());

        h.record(json!(2));
        assert!(!h.can_redo());
        assert_eq!(h.step_back(), Some(&json!(0)));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut h = History::new(json!(0), 3);
        for i in 1..=5 {
            h.record(json!(i));
        }
        assert_eq!(h.len(), 3);

        // Only capacity - 1 undo steps remain.
        let mut undos = 0;
        while h.step_back().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 2);
        assert_eq!(h.entries[h.cursor].snapshot, json!(3));
    }
}
