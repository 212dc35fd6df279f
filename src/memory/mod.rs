//! Short-term memory of recent exchanges.
//!
//! The server remembers the last few query/answer pairs for the lifetime of
//! the process. The buffer is a strict FIFO: once it holds `capacity` entries
//! every new exchange evicts the oldest one. Nothing is persisted.

use crate::types::MemoryEntry;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::VecDeque;
use uuid::Uuid;

/// Default number of exchanges kept in memory.
pub const DEFAULT_CAPACITY: usize = 5;

/// Bounded, insertion-ordered buffer of [`MemoryEntry`] values.
///
/// Reads and writes take a `parking_lot` lock that is never held across an
/// `.await`, so the buffer can be shared freely between handlers.
#[derive(Debug)]
pub struct ShortTermMemory {
    capacity: usize,
    entries: RwLock<VecDeque<MemoryEntry>>,
}

impl ShortTermMemory {
    /// Create a buffer holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Remember an exchange, evicting the oldest entry when full.
    pub fn record(&self, query: impl Into<String>, answer: impl Into<String>) -> MemoryEntry {
        let entry = MemoryEntry {
            id: Uuid::new_v4(),
            query: query.into(),
            answer: answer.into(),
            created_at: Utc::now(),
        };

        let mut entries = self.entries.write();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());

        entry
    }

    /// Most recent entries first, at most `limit` (all when `None`).
    pub fn recent(&self, limit: Option<usize>) -> Vec<MemoryEntry> {
        let entries = self.entries.read();
        let limit = limit.unwrap_or(self.capacity);
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ShortTermMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Formats recent exchanges for inclusion in a prompt.
///
/// `history` is expected most-recent-first (as returned by
/// [`ShortTermMemory::recent`]); the output lists exchanges oldest first so
/// the conversation reads in order. Returns an empty string for no history.
pub fn format_history_for_prompt(history: &[MemoryEntry]) -> String {
    history
        .iter()
        .rev()
        .map(|e| format!("User: {}\nAssistant: {}", e.query, e.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recent_order() {
        let memory = ShortTermMemory::new(3);
        memory.record("q1", "a1");
        memory.record("q2", "a2");

        let recent = memory.recent(None);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].query, "q2");
        assert_eq!(recent[1].query, "q1");
    }

    #[test]
    fn test_fifo_eviction_never_exceeds_capacity() {
        let memory = ShortTermMemory::new(3);
        for i in 0..10 {
            memory.record(format!("q{i}"), format!("a{i}"));
            assert!(memory.len() <= 3);
        }

        let queries: Vec<_> = memory.recent(None).into_iter().map(|e| e.query).collect();
        assert_eq!(queries, vec!["q9", "q8", "q7"]);
    }

    #[test]
    fn test_recent_respects_limit() {
        let memory = ShortTermMemory::new(5);
        for i in 0..4 {
            memory.record(format!("q{i}"), "a");
        }

        assert_eq!(memory.recent(Some(2)).len(), 2);
        assert_eq!(memory.recent(Some(2))[0].query, "q3");
        assert_eq!(memory.recent(Some(100)).len(), 4);
        assert!(memory.recent(Some(0)).is_empty());
    }

    #[test]
    fn test_clear_returns_removed_count() {
        let memory = ShortTermMemory::new(5);
        memory.record("q", "a");
        memory.record("q", "a");

        assert_eq!(memory.clear(), 2);
        assert!(memory.is_empty());
        assert_eq!(memory.clear(), 0);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let memory = ShortTermMemory::new(0);
        assert_eq!(memory.capacity(), 1);
        memory.record("a", "1");
        memory.record("b", "2");
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.recent(None)[0].query, "b");
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ShortTermMemory::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_format_history_oldest_first() {
        let memory = ShortTermMemory::new(5);
        memory.record("first question", "first answer");
        memory.record("second question", "second answer");

        let formatted = format_history_for_prompt(&memory.recent(None));
        let first = formatted.find("first question").unwrap();
        let second = formatted.find("second question").unwrap();
        assert!(first < second);
        assert!(formatted.contains("Assistant: second answer"));
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history_for_prompt(&[]), "");
    }
}
