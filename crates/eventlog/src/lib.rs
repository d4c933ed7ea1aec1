//! Event Log: an append-only, per-project sequence of data-change events
//! with a monotonic, strictly-increasing sequence id.
//!
//! Sequences are totally ordered within a project; cross-project ordering
//! is intentionally undefined. Events are immutable once appended.
//!
//! ```
//! use eventlog::EventLog;
//!
//! let log = EventLog::new();
//! let s1 = log.append("p", "users_updated", b"one".to_vec());
//! let s2 = log.append("p", "users_updated", b"two".to_vec());
//! assert!(s2 > s1);
//! assert_eq!(log.range("p", 0, None).len(), 2);
//! assert_eq!(log.range("p", s1, None).len(), 1);
//! ```

use std::path::Path;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub use backend::EventLogBackend;
#[cfg(feature = "backend-redb")]
pub use backend::RedbEventBackend;

#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log backend error: {0}")]
    Backend(String),
}

/// An immutable, appended event. `sequence` strictly exceeds every
/// previously returned sequence for the same project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub sequence: u64,
    pub project: String,
    pub event_type: String,
    pub payload: Vec<u8>,
    pub created_at_millis: u64,
}

struct ProjectLog {
    events: RwLock<Vec<Event>>,
    /// Next sequence to assign. Tracked independently of `events.len()`
    /// because retention (`trim_to_max_len`/`trim_older_than`) drops a
    /// prefix of the vector without renumbering survivors — deriving the
    /// next sequence from `len()` after a trim would reissue a sequence
    /// that was already handed out and observed by a subscriber.
    next_sequence: std::sync::atomic::AtomicU64,
}

impl ProjectLog {
    fn new() -> Self {
        ProjectLog {
            events: RwLock::new(Vec::new()),
            next_sequence: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

/// Per-project append-only event log.
///
/// The in-memory `Vec<Event>` is the source of truth for the hot
/// read path (`range`/`latest`/`length`); an optional [`EventLogBackend`]
/// mirrors every append for durability and is replayed back into memory
/// by [`EventLog::open`] on startup.
pub struct EventLog {
    projects: DashMap<String, ProjectLog>,
    backend: Option<Box<dyn EventLogBackend>>,
}

impl EventLog {
    /// In-memory-only log. Events do not survive a process restart.
    pub fn new() -> Self {
        EventLog {
            projects: DashMap::new(),
            backend: None,
        }
    }

    /// A log backed by `backend`, replaying any previously persisted
    /// events into memory before returning so `range`/`latest` reflect
    /// state from a prior process.
    pub fn with_backend(backend: Box<dyn EventLogBackend>) -> Result<Self, EventLogError> {
        let log = EventLog {
            projects: DashMap::new(),
            backend: Some(backend),
        };
        log.replay()?;
        Ok(log)
    }

    #[cfg(feature = "backend-redb")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EventLogError> {
        Self::with_backend(Box::new(backend::RedbEventBackend::open(path)?))
    }

    fn replay(&self) -> Result<(), EventLogError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let mut loaded: std::collections::HashMap<String, Vec<Event>> = std::collections::HashMap::new();
        backend.scan(&mut |event| {
            loaded.entry(event.project.clone()).or_default().push(event);
            Ok(())
        })?;
        for (project, mut events) in loaded {
            events.sort_by_key(|e| e.sequence);
            let next = events.last().map(|e| e.sequence + 1).unwrap_or(1);
            self.projects.insert(
                project,
                ProjectLog {
                    events: RwLock::new(events),
                    next_sequence: std::sync::atomic::AtomicU64::new(next),
                },
            );
        }
        Ok(())
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Append an event, returning the assigned sequence. Strictly exceeds
    /// all sequences previously returned for `project`.
    pub fn append(&self, project: &str, event_type: &str, payload: Vec<u8>) -> u64 {
        let log = self
            .projects
            .entry(project.to_string())
            .or_insert_with(ProjectLog::new);
        let sequence = log.next_sequence.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let event = Event {
            sequence,
            project: project.to_string(),
            event_type: event_type.to_string(),
            payload,
            created_at_millis: Self::now_millis(),
        };
        if let Some(backend) = &self.backend {
            if let Err(err) = backend.put(&backend::storage_key(project, sequence), &event) {
                tracing::warn!(project, sequence, error = %err, "event log backend persist failed");
            }
        }
        log.events.write().unwrap().push(event);
        sequence
    }

    /// Events with `sequence > since_exclusive`, in order. `0` means "from
    /// the beginning." Returns fewer than `max_count` if that's all there is;
    /// callers loop if they need more.
    pub fn range(&self, project: &str, since_exclusive: u64, max_count: Option<usize>) -> Vec<Event> {
        let Some(log) = self.projects.get(project) else {
            return Vec::new();
        };
        let events = log.events.read().unwrap();
        // `events` is sorted ascending by sequence even after retention has
        // dropped a prefix, so a binary-search partition point is correct
        // regardless of whether sequence still equals index + 1.
        let start = events.partition_point(|e| e.sequence <= since_exclusive);
        let iter = events[start..].iter().cloned();
        match max_count {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    pub fn latest(&self, project: &str) -> Option<u64> {
        let log = self.projects.get(project)?;
        let events = log.events.read().unwrap();
        events.last().map(|e| e.sequence)
    }

    pub fn length(&self, project: &str) -> usize {
        self.projects
            .get(project)
            .map(|log| log.events.read().unwrap().len())
            .unwrap_or(0)
    }

    /// Administrative: drop all events for a project.
    pub fn delete(&self, project: &str) {
        self.projects.remove(project);
        if let Some(backend) = &self.backend {
            if let Err(err) = backend.delete_prefix(&format!("{project}\u{0}")) {
                tracing::warn!(project, error = %err, "event log backend delete failed");
            }
        }
    }

    /// Trim the oldest events beyond `max_len` (retention by count).
    /// Trimmed events keep their original sequence numbers; surviving
    /// events are never renumbered, since callers may hold stale
    /// `last_sequence` references into this log.
    pub fn trim_to_max_len(&self, project: &str, max_len: usize) {
        let Some(log) = self.projects.get(project) else {
            return;
        };
        let dropped: Vec<Event> = {
            let mut events = log.events.write().unwrap();
            if events.len() > max_len {
                let drop_count = events.len() - max_len;
                events.drain(0..drop_count).collect()
            } else {
                Vec::new()
            }
        };
        self.evict_from_backend(project, &dropped);
    }

    /// Drop events older than `cutoff_millis` (retention by age).
    pub fn trim_older_than(&self, project: &str, cutoff_millis: u64) {
        let Some(log) = self.projects.get(project) else {
            return;
        };
        let dropped: Vec<Event> = {
            let mut events = log.events.write().unwrap();
            let (keep, drop): (Vec<_>, Vec<_>) = events.drain(..).partition(|e| e.created_at_millis >= cutoff_millis);
            *events = keep;
            drop
        };
        self.evict_from_backend(project, &dropped);
    }

    fn evict_from_backend(&self, project: &str, dropped: &[Event]) {
        let Some(backend) = &self.backend else {
            return;
        };
        for event in dropped {
            if let Err(err) = backend.delete_prefix(&backend::storage_key(project, event.sequence)) {
                tracing::warn!(project, sequence = event.sequence, error = %err, "event log retention eviction failed");
            }
        }
    }

    pub fn projects(&self) -> Vec<String> {
        self.projects.iter().map(|e| e.key().clone()).collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_strictly_increase_within_a_project() {
        let log = EventLog::new();
        let s1 = log.append("p", "t", vec![]);
        let s2 = log.append("p", "t", vec![]);
        let s3 = log.append("p", "t", vec![]);
        assert!(s1 < s2 && s2 < s3);
    }

    #[test]
    fn range_since_exclusive_zero_means_from_beginning() {
        let log = EventLog::new();
        log.append("p", "t", vec![1]);
        log.append("p", "t", vec![2]);
        let all = log.range("p", 0, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].payload, vec![1]);
    }

    #[test]
    fn range_respects_since_exclusive_and_max_count() {
        let log = EventLog::new();
        let s1 = log.append("p", "t", vec![1]);
        log.append("p", "t", vec![2]);
        log.append("p", "t", vec![3]);
        let since_s1 = log.range("p", s1, None);
        assert_eq!(since_s1.len(), 2);
        assert_eq!(since_s1[0].payload, vec![2]);

        let capped = log.range("p", 0, Some(1));
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn latest_and_length_reflect_appends() {
        let log = EventLog::new();
        assert_eq!(log.latest("p"), None);
        assert_eq!(log.length("p"), 0);
        log.append("p", "t", vec![]);
        let s2 = log.append("p", "t", vec![]);
        assert_eq!(log.latest("p"), Some(s2));
        assert_eq!(log.length("p"), 2);
    }

    #[test]
    fn cross_project_sequences_are_independent() {
        let log = EventLog::new();
        log.append("p1", "t", vec![]);
        let p2_first = log.append("p2", "t", vec![]);
        assert_eq!(p2_first, 1);
    }

    #[test]
    fn delete_drops_all_events() {
        let log = EventLog::new();
        log.append("p", "t", vec![]);
        log.delete("p");
        assert_eq!(log.length("p"), 0);
        assert_eq!(log.latest("p"), None);
    }

    #[test]
    fn trim_to_max_len_drops_oldest() {
        let log = EventLog::new();
        for i in 0..5u8 {
            log.append("p", "t", vec![i]);
        }
        log.trim_to_max_len("p", 2);
        let remaining = log.range("p", 0, None);
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].payload, vec![3]);
        assert_eq!(remaining[1].payload, vec![4]);
    }

    #[test]
    fn trim_to_max_len_does_not_reissue_a_dropped_sequence() {
        let log = EventLog::new();
        for i in 0..5u8 {
            log.append("p", "t", vec![i]);
        }
        log.trim_to_max_len("p", 2);
        let next = log.append("p", "t", vec![99]);
        assert_eq!(next, 6, "sequence must continue past trimmed events, never repeat one");
    }

    #[cfg(feature = "backend-redb")]
    #[test]
    fn events_survive_reopening_a_redb_backed_log() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let log = EventLog::open(&path).unwrap();
        let s1 = log.append("p", "users_updated", b"one".to_vec());
        let s2 = log.append("p", "users_updated", b"two".to_vec());
        drop(log);

        let reopened = EventLog::open(&path).unwrap();
        let events = reopened.range("p", 0, None);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, s1);
        assert_eq!(events[1].sequence, s2);
        assert_eq!(reopened.latest("p"), Some(s2));

        // Sequence assignment continues past what was replayed.
        let s3 = reopened.append("p", "users_updated", b"three".to_vec());
        assert!(s3 > s2);
    }
}
