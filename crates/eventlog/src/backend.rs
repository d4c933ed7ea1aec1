//! Optional durable persistence for the event log.
//!
//! The log's hot path (append/range/latest) is served entirely from the
//! in-memory per-project `Vec<Event>` in `lib.rs` — ordering and sequence
//! assignment never touch disk. A backend, when configured, is a
//! write-behind mirror: every `append` is also persisted keyed by
//! `(project, sequence)`, and `EventLog::open` replays a backend's full
//! contents back into memory on startup so events survive a process
//! restart, per the core's event durability guarantee.

use crate::{Event, EventLogError};

/// Durable storage for appended events, keyed by an opaque byte key the
/// caller derives from `(project, sequence)`.
pub trait EventLogBackend: Send + Sync {
    fn put(&self, key: &str, event: &Event) -> Result<(), EventLogError>;
    fn delete_prefix(&self, prefix: &str) -> Result<(), EventLogError>;
    /// Visit every stored event in unspecified order; callers sort by
    /// `(project, sequence)` themselves after the scan completes.
    fn scan(&self, visitor: &mut dyn FnMut(Event) -> Result<(), EventLogError>) -> Result<(), EventLogError>;
}

/// Key an event durably by project and sequence, zero-padded so the
/// lexicographic backend key order matches sequence order (useful for
/// backends that iterate in key order; not relied on for correctness).
pub fn storage_key(project: &str, sequence: u64) -> String {
    format!("{project}\u{0}{sequence:020}")
}

#[cfg(feature = "backend-redb")]
pub mod redb_backend {
    use super::*;
    use redb::{Database, ReadableTable, TableDefinition};
    use std::path::Path;
    use std::sync::Arc;

    const EVENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("contex_events");

    /// Redb-backed durable mirror of the event log, one row per event.
    pub struct RedbEventBackend {
        db: Arc<Database>,
    }

    impl RedbEventBackend {
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EventLogError> {
            let db = Database::create(path).map_err(|e| EventLogError::Backend(e.to_string()))?;
            let write_txn = db.begin_write().map_err(|e| EventLogError::Backend(e.to_string()))?;
            {
                let _ = write_txn
                    .open_table(EVENTS_TABLE)
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
            }
            write_txn.commit().map_err(|e| EventLogError::Backend(e.to_string()))?;
            Ok(RedbEventBackend { db: Arc::new(db) })
        }
    }

    impl EventLogBackend for RedbEventBackend {
        fn put(&self, key: &str, event: &Event) -> Result<(), EventLogError> {
            let bytes = bincode::serde::encode_to_vec(event, bincode::config::standard())
                .map_err(|e| EventLogError::Backend(e.to_string()))?;
            let write_txn = self.db.begin_write().map_err(|e| EventLogError::Backend(e.to_string()))?;
            {
                let mut table = write_txn
                    .open_table(EVENTS_TABLE)
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
                table
                    .insert(key, bytes.as_slice())
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
            }
            write_txn.commit().map_err(|e| EventLogError::Backend(e.to_string()))?;
            Ok(())
        }

        fn delete_prefix(&self, prefix: &str) -> Result<(), EventLogError> {
            let write_txn = self.db.begin_write().map_err(|e| EventLogError::Backend(e.to_string()))?;
            let keys: Vec<String> = {
                let table = write_txn
                    .open_table(EVENTS_TABLE)
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
                table
                    .iter()
                    .map_err(|e| EventLogError::Backend(e.to_string()))?
                    .filter_map(|item| item.ok())
                    .map(|(k, _)| k.value().to_string())
                    .filter(|k| k.starts_with(prefix))
                    .collect()
            };
            {
                let mut table = write_txn
                    .open_table(EVENTS_TABLE)
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
                for key in &keys {
                    table.remove(key.as_str()).map_err(|e| EventLogError::Backend(e.to_string()))?;
                }
            }
            write_txn.commit().map_err(|e| EventLogError::Backend(e.to_string()))?;
            Ok(())
        }

        fn scan(&self, visitor: &mut dyn FnMut(Event) -> Result<(), EventLogError>) -> Result<(), EventLogError> {
            let read_txn = self.db.begin_read().map_err(|e| EventLogError::Backend(e.to_string()))?;
            let table = read_txn
                .open_table(EVENTS_TABLE)
                .map_err(|e| EventLogError::Backend(e.to_string()))?;
            for item in table.iter().map_err(|e| EventLogError::Backend(e.to_string()))? {
                let (_, value) = item.map_err(|e| EventLogError::Backend(e.to_string()))?;
                let (event, _): (Event, usize) = bincode::serde::decode_from_slice(value.value(), bincode::config::standard())
                    .map_err(|e| EventLogError::Backend(e.to_string()))?;
                visitor(event)?;
            }
            Ok(())
        }
    }
}

#[cfg(feature = "backend-redb")]
pub use redb_backend::RedbEventBackend;
