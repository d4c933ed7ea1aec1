//! Snapshots (core spec §4.12): a point-in-time fold of a project's event
//! log into `{data_key -> last-published value}`, kept so a registering
//! agent's initial context can be served from one replay instead of
//! re-walking the whole log, and so operators can inspect state as of a
//! given sequence without racing live publishes.
//!
//! Grounded on the original `SnapshotManager`/`create_snapshot_from_events`:
//! fold every event's `data_key`/`data` pair in sequence order, keep the
//! last `max_snapshots` per project, evicting the oldest first.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use eventlog::EventLog;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub project: String,
    pub sequence: u64,
    pub created_at_millis: u64,
    pub data: HashMap<String, Value>,
}

struct ProjectSnapshots {
    /// Oldest first; the last element is the most recent snapshot.
    snapshots: Vec<Snapshot>,
}

/// Keeps the last `max_snapshots` snapshots per project in memory.
pub struct SnapshotStore {
    eventlog: Arc<EventLog>,
    max_snapshots: usize,
    projects: RwLock<HashMap<String, ProjectSnapshots>>,
}

impl SnapshotStore {
    pub fn new(eventlog: Arc<EventLog>, max_snapshots: usize) -> Self {
        SnapshotStore {
            eventlog,
            max_snapshots,
            projects: RwLock::new(HashMap::new()),
        }
    }

    /// Fold every event for `project` up to and including `target_sequence`
    /// (or the latest sequence, if `None`) into a snapshot, store it, and
    /// evict the oldest snapshot past `max_snapshots`.
    pub fn create_snapshot(&self, project: &str, target_sequence: Option<u64>) -> Snapshot {
        let events = self.eventlog.range(project, 0, None);
        let target = target_sequence.unwrap_or_else(|| events.last().map(|e| e.sequence).unwrap_or(0));

        let mut data: HashMap<String, Value> = HashMap::new();
        let mut sequence = 0u64;
        for event in events.iter().filter(|e| e.sequence <= target) {
            sequence = event.sequence;
            if let Ok(parsed) = serde_json::from_slice::<Value>(&event.payload) {
                let data_key = parsed.get("data_key").and_then(Value::as_str).map(str::to_string);
                if let Some(data_key) = data_key {
                    data.insert(data_key, parsed.get("data").cloned().unwrap_or(Value::Null));
                }
            }
        }

        let snapshot = Snapshot {
            project: project.to_string(),
            sequence,
            created_at_millis: now_millis(),
            data,
        };

        let mut projects = self.projects.write().unwrap();
        let entry = projects
            .entry(project.to_string())
            .or_insert_with(|| ProjectSnapshots { snapshots: Vec::new() });
        entry.snapshots.push(snapshot.clone());
        if entry.snapshots.len() > self.max_snapshots {
            let drop_count = entry.snapshots.len() - self.max_snapshots;
            entry.snapshots.drain(0..drop_count);
        }

        snapshot
    }

    pub fn latest(&self, project: &str) -> Option<Snapshot> {
        self.projects.read().unwrap().get(project)?.snapshots.last().cloned()
    }

    /// The most recent snapshot whose sequence doesn't exceed `target_sequence`.
    pub fn closest_at_or_before(&self, project: &str, target_sequence: u64) -> Option<Snapshot> {
        self.projects
            .read()
            .unwrap()
            .get(project)?
            .snapshots
            .iter()
            .rev()
            .find(|s| s.sequence <= target_sequence)
            .cloned()
    }

    pub fn list(&self, project: &str) -> Vec<Snapshot> {
        self.projects.read().unwrap().get(project).map(|p| p.snapshots.clone()).unwrap_or_default()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn push_event(log: &EventLog, project: &str, data_key: &str, data: Value) -> u64 {
        let body = serde_json::to_vec(&json!({"data_key": data_key, "data": data})).unwrap();
        log.append(project, "updated", body)
    }

    #[test]
    fn snapshot_folds_latest_value_per_data_key() {
        let log = Arc::new(EventLog::new());
        push_event(&log, "p", "a", json!({"v": 1}));
        push_event(&log, "p", "b", json!({"v": 1}));
        push_event(&log, "p", "a", json!({"v": 2}));

        let store = SnapshotStore::new(log, 10);
        let snap = store.create_snapshot("p", None);
        assert_eq!(snap.data.get("a"), Some(&json!({"v": 2})));
        assert_eq!(snap.data.get("b"), Some(&json!({"v": 1})));
    }

    #[test]
    fn snapshot_at_target_sequence_ignores_later_events() {
        let log = Arc::new(EventLog::new());
        let s1 = push_event(&log, "p", "a", json!({"v": 1}));
        push_event(&log, "p", "a", json!({"v": 2}));

        let store = SnapshotStore::new(log, 10);
        let snap = store.create_snapshot("p", Some(s1));
        assert_eq!(snap.data.get("a"), Some(&json!({"v": 1})));
    }

    #[test]
    fn retention_keeps_only_max_snapshots() {
        let log = Arc::new(EventLog::new());
        push_event(&log, "p", "a", json!(1));

        let store = SnapshotStore::new(log, 2);
        for _ in 0..5 {
            store.create_snapshot("p", None);
        }
        assert_eq!(store.list("p").len(), 2);
    }
}
