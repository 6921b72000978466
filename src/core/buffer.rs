// BotConsole - core/buffer.rs
//
// Capacity-bounded terminal buffer with FIFO eviction.
// Invariant: len() <= capacity() after every operation.

use crate::core::model::LogEntry;
use std::collections::VecDeque;

/// Ordered, bounded sequence of terminal entries. Always holds the most
/// recent `capacity` entries in arrival order.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one so the
    /// newest entry is always retained.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(4_096)),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest ones first when full.
    /// Returns the number of evicted entries.
    pub fn push(&mut self, entry: LogEntry) -> usize {
        let mut evicted = 0;
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.entries.push_back(entry);
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    /// Entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter()
    }

    /// Owned snapshot, oldest-first (used by export).
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(crate::util::constants::DEFAULT_BUFFER_CAPACITY)
    }
}
