use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;

use super::error::TelemetryError;
use super::event::{EntryHandle, LogEntry};

pub const DEFAULT_CAPACITY: usize = 2000;

#[derive(Debug)]
struct Ring {
    entries: VecDeque<LogEntry>,
    // Sequence number the next entry will get. The front entry's sequence is
    // `next_seq - entries.len()`.
    next_seq: u64,
    evicted: u64,
}

impl Ring {
    fn front_seq(&self) -> u64 {
        self.next_seq - self.entries.len() as u64
    }

    fn slot(&self, handle: EntryHandle) -> Option<usize> {
        let front = self.front_seq();
        if handle.0 < front || handle.0 >= self.next_seq {
            return None;
        }
        Some((handle.0 - front) as usize)
    }

    fn entry_mut(&mut self, handle: EntryHandle) -> Result<&mut LogEntry, TelemetryError> {
        let idx = self.slot(handle).ok_or(TelemetryError::StaleHandle(handle))?;
        self.entries.get_mut(idx).ok_or(TelemetryError::StaleHandle(handle))
    }
}

/// Capacity-bounded, insertion-ordered log of entries.
///
/// Every access goes through one mutex. Mutators return a clone of the entry as it
/// was right after the mutation so callers can publish it without holding the lock.
#[derive(Debug)]
pub struct LogStore {
    capacity: usize,
    ring: Mutex<Ring>,
}

impl LogStore {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            ring: Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity),
                next_seq: 0,
                evicted: 0,
            }),
        }
    }

    /// Append a new entry, evicting the oldest one first if the store is full.
    pub fn record_request(
        &self,
        kind: &str,
        operation: &str,
        name: Option<&str>,
        parameters: Map<String, Value>,
        payload: Value,
    ) -> (EntryHandle, LogEntry) {
        let name = name.map(str::to_string);

        let mut ring = self.ring.lock();
        // Stamped under the lock so timestamps follow insertion order.
        let entry = LogEntry::new(kind, operation, name, parameters, payload);
        let snapshot = entry.clone();
        if ring.entries.len() >= self.capacity {
            ring.entries.pop_front();
            ring.evicted += 1;
        }
        ring.entries.push_back(entry);
        let handle = EntryHandle(ring.next_seq);
        ring.next_seq += 1;

        (handle, snapshot)
    }

    pub fn record_response(
        &self,
        handle: EntryHandle,
        payload: Option<Value>,
        error: Option<String>,
        latency_ms: Option<f64>,
    ) -> Result<LogEntry, TelemetryError> {
        let mut ring = self.ring.lock();
        let entry = ring.entry_mut(handle)?;
        entry.apply_response(payload, error, latency_ms);
        Ok(entry.clone())
    }

    pub fn record_stream_event(
        &self,
        handle: EntryHandle,
        payload: Value,
    ) -> Result<LogEntry, TelemetryError> {
        let mut ring = self.ring.lock();
        let entry = ring.entry_mut(handle)?;
        entry.push_stream_event(payload);
        Ok(entry.clone())
    }

    /// Snapshot of retained entries, oldest first, optionally only the last `limit`.
    pub fn recent(&self, limit: Option<usize>) -> Vec<LogEntry> {
        let ring = self.ring.lock();
        let skip = match limit {
            Some(n) => ring.entries.len().saturating_sub(n),
            None => 0,
        };
        ring.entries.iter().skip(skip).cloned().collect()
    }

    pub fn get(&self, handle: EntryHandle) -> Option<LogEntry> {
        let ring = self.ring.lock();
        ring.slot(handle).and_then(|idx| ring.entries.get(idx).cloned())
    }

    pub fn len(&self) -> usize {
        self.ring.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries ever recorded, evicted ones included.
    pub fn total_recorded(&self) -> u64 {
        self.ring.lock().next_seq
    }

    pub fn evicted(&self) -> u64 {
        self.ring.lock().evicted
    }

    /// Drop every retained entry. Outstanding handles become stale; sequence numbers
    /// keep counting so they are never reused.
    pub fn clear(&self) {
        let mut ring = self.ring.lock();
        let dropped = ring.entries.len() as u64;
        ring.entries.clear();
        ring.evicted += dropped;
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
