//! Vector Index: a per-project keyed store of
//! `{node_key -> (vector, node content, metadata)}` with cosine kNN.
//!
//! Every read and write is scoped by `project`; the filter is structural
//! (each project gets its own table) rather than applied by post-filtering
//! a global neighbor list, so it can never silently under-return.
//!
//! `upsert` replaces every [`NodeRecord`] previously stored under
//! `(project, data_key)` with the given set in one write-locked step, so a
//! concurrent reader never observes a partial replacement.
//!
//! ```
//! use index::{NodeRecord, VectorIndex};
//!
//! let idx = VectorIndex::in_memory();
//! let record = NodeRecord {
//!     project: "p".into(),
//!     data_key: "users_schema".into(),
//!     node_key: "users_schema".into(),
//!     node_path: String::new(),
//!     node_type: ingest::NodeType::Object,
//!     description: "table: users".into(),
//!     content: ingest::Payload::Str("users".into()),
//!     original_payload: ingest::Payload::Null,
//!     data_format: "json".into(),
//!     vector: vec![1.0, 0.0, 0.0],
//! };
//! idx.upsert("p", "users_schema", vec![record]).unwrap();
//! let hits = idx.knn("p", &[1.0, 0.0, 0.0], 5).unwrap();
//! assert_eq!(hits[0].0, "users_schema");
//! ```

pub mod backend;

use std::collections::HashMap;
use std::sync::RwLock;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;
pub use backend::{BackendConfig, IndexBackend, InMemoryBackend};

/// A single vector-index row: the §3 `NodeRecord`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub project: String,
    /// Publisher-supplied identifier for the coherent payload this node came from.
    pub data_key: String,
    /// `data_key + "." + node.path`, or just `data_key` for a root node.
    pub node_key: String,
    pub node_path: String,
    pub node_type: ingest::NodeType,
    /// The node's `embedding_text`: used as the lexical/semantic projection.
    pub description: String,
    pub content: ingest::Payload,
    /// The full original payload, kept for context when hydrating a match.
    pub original_payload: ingest::Payload,
    pub data_format: String,
    pub vector: Vec<f32>,
}

impl NodeRecord {
    pub fn node_key_for(data_key: &str, node_path: &str) -> String {
        if node_path.is_empty() {
            data_key.to_string()
        } else {
            format!("{data_key}.{node_path}")
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("poisoned lock")]
    Poisoned,
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        IndexError::Backend(err.to_string())
    }
}

type ProjectTable = RwLock<HashMap<String, NodeRecord>>;

/// Per-project vector store with an optional write-through durable backend.
///
/// The in-memory per-project `HashMap` is the authoritative read path (it's
/// what `knn`/`list_data_keys` query); the backend, when configured, mirrors
/// writes for durability across process restarts but is never read from
/// directly — this keeps the mandatory-project-filter and atomic-replace
/// invariants trivial to enforce in one place.
pub struct VectorIndex {
    projects: DashMap<String, ProjectTable>,
    backend: Option<Box<dyn IndexBackend>>,
}

impl VectorIndex {
    pub fn in_memory() -> Self {
        VectorIndex {
            projects: DashMap::new(),
            backend: None,
        }
    }

    pub fn with_backend(backend: Box<dyn IndexBackend>) -> Self {
        VectorIndex {
            projects: DashMap::new(),
            backend: Some(backend),
        }
    }

    pub fn new(cfg: BackendConfig) -> Result<Self, IndexError> {
        match cfg {
            BackendConfig::InMemory => Ok(Self::in_memory()),
            other => Ok(Self::with_backend(other.build()?)),
        }
    }

    fn backend_key(project: &str, node_key: &str) -> String {
        format!("{project}\u{0}{node_key}")
    }

    fn persist(&self, project: &str, record: &NodeRecord) -> Result<(), IndexError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let bytes = encode_record(record)?;
        backend
            .put(&Self::backend_key(project, &record.node_key), &bytes)
            .map_err(IndexError::backend)
    }

    fn unpersist(&self, project: &str, node_key: &str) -> Result<(), IndexError> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        backend
            .delete(&Self::backend_key(project, node_key))
            .map_err(IndexError::backend)
    }

    /// Atomic replace (I2): every [`NodeRecord`] previously stored under
    /// `(project, data_key)` is dropped and the given set inserted, under a
    /// single write lock on the project's table.
    pub fn upsert(
        &self,
        project: &str,
        data_key: &str,
        records: Vec<NodeRecord>,
    ) -> Result<(), IndexError> {
        let table = self
            .projects
            .entry(project.to_string())
            .or_insert_with(|| RwLock::new(HashMap::new()));
        let mut guard = table.write().map_err(|_| IndexError::Poisoned)?;

        let stale: Vec<String> = guard
            .values()
            .filter(|r| r.data_key == data_key)
            .map(|r| r.node_key.clone())
            .collect();
        for node_key in &stale {
            guard.remove(node_key);
        }

        for record in &records {
            guard.insert(record.node_key.clone(), record.clone());
        }
        drop(guard);

        for node_key in &stale {
            self.unpersist(project, node_key)?;
        }
        for record in &records {
            self.persist(project, record)?;
        }
        Ok(())
    }

    /// Cosine kNN over `project`'s table, sorted by descending similarity,
    /// ties broken by `node_key` ascending. Never post-filters a global list:
    /// a project with no table simply returns no results.
    pub fn knn(
        &self,
        project: &str,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<(String, f32, NodeRecord)>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let Some(table) = self.projects.get(project) else {
            return Ok(Vec::new());
        };
        let guard = table.read().map_err(|_| IndexError::Poisoned)?;

        let mut hits: Vec<(String, f32, NodeRecord)> = guard
            .values()
            .map(|r| {
                let sim = cosine_similarity(query_vector, &r.vector);
                (r.node_key.clone(), sim.max(0.0), r.clone())
            })
            .collect();

        hits.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Fetch a single row by its full `node_key`, regardless of similarity.
    /// Used to hydrate matches that a lexical-only hit surfaced without a
    /// vector-search pass over them.
    pub fn get(&self, project: &str, node_key: &str) -> Option<NodeRecord> {
        let table = self.projects.get(project)?;
        let guard = table.read().ok()?;
        guard.get(node_key).cloned()
    }

    /// `node_key`s currently stored under `(project, data_key)`, read before
    /// an `upsert` so a caller can evict the same rows from a sibling index
    /// (e.g. the Lexical Index) that `upsert`'s atomic replace doesn't know
    /// about.
    pub fn node_keys_for_data_key(&self, project: &str, data_key: &str) -> Vec<String> {
        let Some(table) = self.projects.get(project) else {
            return Vec::new();
        };
        let Ok(guard) = table.read() else {
            return Vec::new();
        };
        guard
            .values()
            .filter(|r| r.data_key == data_key)
            .map(|r| r.node_key.clone())
            .collect()
    }

    pub fn list_data_keys(&self, project: &str) -> Vec<String> {
        let Some(table) = self.projects.get(project) else {
            return Vec::new();
        };
        let guard = match table.read() {
            Ok(g) => g,
            Err(_) => return Vec::new(),
        };
        let mut keys: Vec<String> = guard
            .values()
            .map(|r| r.data_key.clone())
            .collect::<std::collections::HashSet<_>>()
            .into_iter()
            .collect();
        keys.sort();
        keys
    }

    pub fn clear(&self, project: &str) {
        self.projects.remove(project);
    }

    pub fn len(&self, project: &str) -> usize {
        self.projects
            .get(project)
            .and_then(|t| t.read().ok().map(|g| g.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, project: &str) -> bool {
        self.len(project) == 0
    }
}

/// `cos(a,b) = a·b / (||a|| ||b||)`. Returns 0.0 for mismatched/empty/zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn encode_record(record: &NodeRecord) -> Result<Vec<u8>, IndexError> {
    let encoded = bincode::serde::encode_to_vec(record, bincode::config::standard())
        .map_err(|e| IndexError::Serde(e.to_string()))?;
    zstd::encode_all(encoded.as_slice(), 3).map_err(IndexError::backend)
}

#[allow(dead_code)]
fn decode_record(bytes: &[u8]) -> Result<NodeRecord, IndexError> {
    let decompressed = zstd::decode_all(bytes).map_err(IndexError::backend)?;
    let (record, _) = bincode::serde::decode_from_slice(&decompressed, bincode::config::standard())
        .map_err(|e| IndexError::Serde(e.to_string()))?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(project: &str, data_key: &str, path: &str, vector: Vec<f32>) -> NodeRecord {
        NodeRecord {
            project: project.into(),
            data_key: data_key.into(),
            node_key: NodeRecord::node_key_for(data_key, path),
            node_path: path.into(),
            node_type: ingest::NodeType::Object,
            description: format!("{data_key} {path}"),
            content: ingest::Payload::Null,
            original_payload: ingest::Payload::Null,
            data_format: "json".into(),
            vector,
        }
    }

    #[test]
    fn knn_orders_by_similarity_tie_break_node_key() {
        let idx = VectorIndex::in_memory();
        idx.upsert(
            "p",
            "a",
            vec![record("p", "a", "", vec![1.0, 0.0])],
        )
        .unwrap();
        idx.upsert(
            "p",
            "b",
            vec![record("p", "b", "", vec![1.0, 0.0])],
        )
        .unwrap();
        idx.upsert(
            "p",
            "c",
            vec![record("p", "c", "", vec![0.0, 1.0])],
        )
        .unwrap();

        let hits = idx.knn("p", &[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, "a");
        assert_eq!(hits[1].0, "b");
        assert!((hits[0].1 - hits[1].1).abs() < f32::EPSILON);
        assert_eq!(hits[2].0, "c");
    }

    #[test]
    fn upsert_atomically_replaces_data_key_prefix() {
        let idx = VectorIndex::in_memory();
        idx.upsert(
            "p",
            "doc",
            vec![
                record("p", "doc", "a", vec![1.0, 0.0]),
                record("p", "doc", "b", vec![0.0, 1.0]),
            ],
        )
        .unwrap();
        assert_eq!(idx.len("p"), 2);

        idx.upsert("p", "doc", vec![record("p", "doc", "c", vec![1.0, 1.0])])
            .unwrap();
        assert_eq!(idx.len("p"), 1);
        let hits = idx.knn("p", &[1.0, 1.0], 10).unwrap();
        assert_eq!(hits[0].0, "doc.c");
    }

    #[test]
    fn project_filter_is_structural() {
        let idx = VectorIndex::in_memory();
        idx.upsert("p1", "a", vec![record("p1", "a", "", vec![1.0, 0.0])])
            .unwrap();
        let hits = idx.knn("p2", &[1.0, 0.0], 10).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn list_data_keys_deduplicates_and_sorts() {
        let idx = VectorIndex::in_memory();
        idx.upsert(
            "p",
            "doc",
            vec![
                record("p", "doc", "a", vec![1.0]),
                record("p", "doc", "b", vec![0.5]),
            ],
        )
        .unwrap();
        idx.upsert("p", "another", vec![record("p", "another", "", vec![0.1])])
            .unwrap();
        assert_eq!(idx.list_data_keys("p"), vec!["another", "doc"]);
    }

    #[test]
    fn clear_drops_all_rows_for_project() {
        let idx = VectorIndex::in_memory();
        idx.upsert("p", "a", vec![record("p", "a", "", vec![1.0])])
            .unwrap();
        idx.clear("p");
        assert!(idx.is_empty("p"));
    }

    #[test]
    fn node_keys_for_data_key_lists_current_rows_only() {
        let idx = VectorIndex::in_memory();
        idx.upsert(
            "p",
            "doc",
            vec![
                record("p", "doc", "a", vec![1.0, 0.0]),
                record("p", "doc", "b", vec![0.0, 1.0]),
            ],
        )
        .unwrap();
        let mut keys = idx.node_keys_for_data_key("p", "doc");
        keys.sort();
        assert_eq!(keys, vec!["doc.a", "doc.b"]);

        idx.upsert("p", "doc", vec![record("p", "doc", "c", vec![1.0, 1.0])])
            .unwrap();
        assert_eq!(idx.node_keys_for_data_key("p", "doc"), vec!["doc.c"]);
    }

    #[test]
    fn get_fetches_by_node_key_regardless_of_similarity() {
        let idx = VectorIndex::in_memory();
        idx.upsert("p", "a", vec![record("p", "a", "", vec![1.0, 0.0])])
            .unwrap();
        assert!(idx.get("p", "a").is_some());
        assert!(idx.get("p", "missing").is_none());
        assert!(idx.get("other", "a").is_none());
    }

    #[test]
    fn cosine_similarity_clamped_non_negative_by_knn() {
        let idx = VectorIndex::in_memory();
        idx.upsert("p", "a", vec![record("p", "a", "", vec![-1.0, 0.0])])
            .unwrap();
        let hits = idx.knn("p", &[1.0, 0.0], 10).unwrap();
        assert_eq!(hits[0].1, 0.0);
    }
}
