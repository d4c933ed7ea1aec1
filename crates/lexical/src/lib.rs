//! Lexical Index: an optional, per-project BM25 index over node text.
//!
//! Enabled by configuration; when disabled the Rank-Fusion Matcher falls
//! back to pure vector kNN. Only ranks matter to callers — raw BM25 scores
//! are an implementation detail used solely to order results before the
//! rank is read off.
//!
//! ```
//! use lexical::LexicalIndex;
//! use serde_json::json;
//!
//! let idx = LexicalIndex::new();
//! idx.index("p", "roster.0", "Name: Bob | Role: Manager", json!({}));
//! idx.index("p", "roster.1", "Name: Alice | Role: Engineer", json!({}));
//!
//! let hits = idx.search("p", "Bob", 10);
//! assert_eq!(hits[0].0, "roster.0");
//! assert_eq!(hits[0].1, 0);
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use dashmap::DashMap;
use serde_json::Value;

/// Okapi BM25 term-frequency saturation constant.
const K1: f32 = 1.2;
/// Okapi BM25 length-normalization constant.
const B: f32 = 0.75;

#[derive(Debug, Clone)]
struct Document {
    term_freqs: HashMap<String, u32>,
    length: usize,
    metadata: Value,
}

struct ProjectIndex {
    docs: RwLock<HashMap<String, Document>>,
    /// term -> node_keys containing it, for candidate gathering without a
    /// full per-project scan.
    postings: RwLock<HashMap<String, std::collections::HashSet<String>>>,
}

impl ProjectIndex {
    fn new() -> Self {
        ProjectIndex {
            docs: RwLock::new(HashMap::new()),
            postings: RwLock::new(HashMap::new()),
        }
    }
}

/// Tokenize into lowercase terms using the shared canonical tokenizer.
fn terms_of(text: &str) -> Vec<String> {
    canonical::tokenize(text)
        .into_iter()
        .map(|t| t.text.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Per-project BM25 index.
pub struct LexicalIndex {
    projects: DashMap<String, ProjectIndex>,
}

impl LexicalIndex {
    pub fn new() -> Self {
        LexicalIndex {
            projects: DashMap::new(),
        }
    }

    fn project(&self, project: &str) -> dashmap::mapref::one::Ref<'_, String, ProjectIndex> {
        self.projects
            .entry(project.to_string())
            .or_insert_with(ProjectIndex::new)
            .downgrade()
    }

    /// Index (or re-index) `text` under `node_key`. Replaces any prior
    /// document stored at the same `node_key`.
    pub fn index(&self, project: &str, node_key: &str, text: &str, metadata: Value) {
        let proj = self.project(project);
        let terms = terms_of(text);
        let mut term_freqs: HashMap<String, u32> = HashMap::new();
        for term in &terms {
            *term_freqs.entry(term.clone()).or_insert(0) += 1;
        }

        let mut docs = proj.docs.write().unwrap();
        let mut postings = proj.postings.write().unwrap();

        if let Some(old) = docs.remove(node_key) {
            for term in old.term_freqs.keys() {
                if let Some(set) = postings.get_mut(term) {
                    set.remove(node_key);
                }
            }
        }

        for term in term_freqs.keys() {
            postings
                .entry(term.clone())
                .or_default()
                .insert(node_key.to_string());
        }

        docs.insert(
            node_key.to_string(),
            Document {
                term_freqs,
                length: terms.len(),
                metadata,
            },
        );
    }

    /// Remove a single document (used when a publisher's data_key is
    /// replaced and its stale node_keys need to drop out of the index).
    pub fn remove(&self, project: &str, node_key: &str) {
        let Some(proj) = self.projects.get(project) else {
            return;
        };
        let mut docs = proj.docs.write().unwrap();
        let mut postings = proj.postings.write().unwrap();
        if let Some(old) = docs.remove(node_key) {
            for term in old.term_freqs.keys() {
                if let Some(set) = postings.get_mut(term) {
                    set.remove(node_key);
                }
            }
        }
    }

    pub fn clear(&self, project: &str) {
        self.projects.remove(project);
    }

    /// BM25-ranked search, returning `(node_key, 0-based rank)` pairs.
    /// Only the rank is contractually meaningful to callers.
    pub fn search(&self, project: &str, query: &str, size: usize) -> Vec<(String, usize)> {
        if size == 0 {
            return Vec::new();
        }
        let Some(proj) = self.projects.get(project) else {
            return Vec::new();
        };
        let docs = proj.docs.read().unwrap();
        let postings = proj.postings.read().unwrap();
        if docs.is_empty() {
            return Vec::new();
        }

        let query_terms = terms_of(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let n = docs.len() as f32;
        let avg_len: f32 =
            docs.values().map(|d| d.length as f32).sum::<f32>() / n.max(1.0);

        let mut candidates: std::collections::HashSet<String> = std::collections::HashSet::new();
        for term in &query_terms {
            if let Some(set) = postings.get(term) {
                candidates.extend(set.iter().cloned());
            }
        }

        let mut scored: Vec<(String, f32)> = candidates
            .into_iter()
            .map(|node_key| {
                let doc = &docs[&node_key];
                let score = bm25_score(&query_terms, doc, &docs, avg_len, n);
                (node_key, score)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(size);
        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (node_key, _))| (node_key, rank))
            .collect()
    }

    /// Metadata stored alongside a document, if any (used by callers that
    /// need to hydrate a lexical hit without a round-trip to the vector index).
    pub fn metadata(&self, project: &str, node_key: &str) -> Option<Value> {
        let proj = self.projects.get(project)?;
        let docs = proj.docs.read().ok()?;
        docs.get(node_key).map(|d| d.metadata.clone())
    }
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn bm25_score(
    query_terms: &[String],
    doc: &Document,
    docs: &HashMap<String, Document>,
    avg_len: f32,
    n: f32,
) -> f32 {
    let mut score = 0.0f32;
    for term in query_terms {
        let Some(&tf) = doc.term_freqs.get(term) else {
            continue;
        };
        let doc_freq = docs.values().filter(|d| d.term_freqs.contains_key(term)).count() as f32;
        let idf = ((n - doc_freq + 0.5) / (doc_freq + 0.5) + 1.0).ln();
        let tf = tf as f32;
        let len_norm = 1.0 - B + B * (doc.length as f32 / avg_len.max(1.0));
        score += idf * (tf * (K1 + 1.0)) / (tf + K1 * len_norm);
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exact_keyword_ranks_first() {
        let idx = LexicalIndex::new();
        idx.index("p", "roster.0", "Name: Alice | Role: Engineer", json!({}));
        idx.index("p", "roster.1", "Name: Bob | Role: Manager", json!({}));
        idx.index("p", "roster.2", "Name: Carol | Role: Designer", json!({}));

        let hits = idx.search("p", "Bob", 10);
        assert_eq!(hits[0], ("roster.1".to_string(), 0));
    }

    #[test]
    fn reindexing_same_node_key_replaces_document() {
        let idx = LexicalIndex::new();
        idx.index("p", "doc", "alpha beta", json!({}));
        idx.index("p", "doc", "gamma delta", json!({}));
        assert!(idx.search("p", "alpha", 10).is_empty());
        assert_eq!(idx.search("p", "gamma", 10)[0].0, "doc");
    }

    #[test]
    fn missing_project_returns_empty() {
        let idx = LexicalIndex::new();
        assert!(idx.search("nope", "anything", 5).is_empty());
    }

    #[test]
    fn empty_query_returns_empty() {
        let idx = LexicalIndex::new();
        idx.index("p", "doc", "alpha beta", json!({}));
        assert!(idx.search("p", "   ", 5).is_empty());
    }

    #[test]
    fn remove_drops_document_from_results() {
        let idx = LexicalIndex::new();
        idx.index("p", "doc", "alpha beta", json!({}));
        idx.remove("p", "doc");
        assert!(idx.search("p", "alpha", 5).is_empty());
    }

    #[test]
    fn size_limits_results() {
        let idx = LexicalIndex::new();
        for i in 0..5 {
            idx.index("p", &format!("doc{i}"), "common term", json!({}));
        }
        let hits = idx.search("p", "common", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].1, 0);
        assert_eq!(hits[1].1, 1);
    }
}
