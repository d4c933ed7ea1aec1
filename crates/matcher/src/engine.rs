use std::collections::HashMap;

use index::{NodeRecord, VectorIndex};
use lexical::LexicalIndex;
use semantic::{EmbeddingCache, Embedder};

use crate::types::{Match, MatchError, MatchOverrides, MatchResult, MatcherConfig};

#[cfg(test)]
mod tests;

/// Hybrid lexical+vector search over a project's indexed nodes.
///
/// Combines BM25 (via [`lexical::LexicalIndex`]) and cosine kNN (via
/// [`index::VectorIndex`]) with reciprocal rank fusion: a node's fused score
/// is the sum of `1 / (rrf_k + rank)` over every ranked list it appears
/// in, weighting the vector side by `vector_boost`. Ties are broken by
/// `node_key` ascending so results stay deterministic across identical runs.
pub struct Matcher {
    index: VectorIndex,
    lexical: LexicalIndex,
    embedder: Embedder,
    cache: EmbeddingCache,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(index: VectorIndex, lexical: LexicalIndex, embedder: Embedder, cache: EmbeddingCache, config: MatcherConfig) -> Self {
        Matcher {
            index,
            lexical,
            embedder,
            cache,
            config,
        }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Embed `text`, serving from the shared cache when present. Exposed so
    /// callers outside the match path (ingest-time node embedding) spend the
    /// same cache the way query-time embedding does.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, MatchError> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached);
        }
        let vector = self.embedder.encode(text).await?;
        self.cache.set(text, vector.clone());
        Ok(vector)
    }

    /// Match a single need's free text against `project`'s indexed nodes.
    pub async fn match_need(&self, project: &str, need: &str) -> Result<MatchResult, MatchError> {
        self.match_need_with(project, need, &MatchOverrides::default()).await
    }

    /// Match a single need, overriding `max_matches`/`similarity_threshold`
    /// for this call only. Used by ad-hoc queries that pass their own
    /// `top_k`/`threshold` rather than a subscription's fixed config.
    pub async fn match_need_with(&self, project: &str, need: &str, overrides: &MatchOverrides) -> Result<MatchResult, MatchError> {
        let max_matches = overrides.max_matches.unwrap_or(self.config.max_matches);
        let similarity_threshold = overrides.similarity_threshold.unwrap_or(self.config.similarity_threshold);

        let query_vector = self.embed(need).await?;
        let oversample = max_matches.saturating_mul(2).max(max_matches);

        let vector_hits = self.index.knn(project, &query_vector, oversample)?;
        let lexical_hits = if self.config.hybrid_search_enabled {
            self.lexical.search(project, need, oversample)
        } else {
            Vec::new()
        };

        // §4.7 step 5: fusion only applies when the lexical list is
        // non-empty for this need. Otherwise (lexical disabled, or enabled
        // but no terms matched) score is the raw cosine similarity and the
        // threshold gates it directly — an RRF contribution is never on the
        // same scale as a cosine similarity, so comparing one against a
        // similarity_threshold silently discards everything.
        let fusion_active = !lexical_hits.is_empty();

        let mut fused: HashMap<String, Match> = HashMap::new();

        for (rank, (node_key, similarity, record)) in vector_hits.into_iter().enumerate() {
            let contribution = if fusion_active {
                self.config.vector_boost / (self.config.rrf_k + rank as f32)
            } else {
                similarity
            };
            let entry = fused.entry(node_key.clone()).or_insert_with(|| Match {
                data_key: record.data_key.clone(),
                node_key: node_key.clone(),
                score: 0.0,
                vector_similarity: None,
                lexical_rank: None,
                record: record.clone(),
            });
            entry.score += contribution;
            entry.vector_similarity = Some(similarity);
        }

        for (node_key, rank) in lexical_hits {
            let contribution = 1.0 / (self.config.rrf_k + rank as f32);
            let entry = fused.entry(node_key.clone()).or_insert_with(|| {
                // A lexical-only hit wasn't returned by `knn`, so hydrate its
                // record by direct lookup instead of a vector search.
                let record = self.index.get(project, &node_key).unwrap_or_else(|| {
                    tracing::warn!(project, node_key, "lexical hit has no matching vector-index record");
                    placeholder_record(project, &node_key)
                });
                Match {
                    data_key: record.data_key.clone(),
                    node_key: node_key.clone(),
                    score: 0.0,
                    vector_similarity: None,
                    lexical_rank: None,
                    record,
                }
            });
            entry.score += contribution;
            entry.lexical_rank = Some(rank);
        }

        // When fusion is active a node present in either list is kept even
        // if its cosine similarity alone is below threshold (§9 open
        // question #4, resolved literally); otherwise pure-vector mode
        // still gates on similarity_threshold.
        let mut matches: Vec<Match> = fused
            .into_values()
            .filter(|m| fusion_active || m.score >= similarity_threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node_key.cmp(&b.node_key))
        });
        matches.truncate(max_matches);

        Ok(MatchResult {
            need: need.to_string(),
            matches,
        })
    }

    /// Match every need, preserving input order.
    pub async fn match_needs(&self, project: &str, needs: &[String]) -> Result<Vec<MatchResult>, MatchError> {
        let mut results = Vec::with_capacity(needs.len());
        for need in needs {
            results.push(self.match_need(project, need).await?);
        }
        Ok(results)
    }
}

fn placeholder_record(project: &str, node_key: &str) -> NodeRecord {
    NodeRecord {
        project: project.to_string(),
        data_key: node_key.to_string(),
        node_key: node_key.to_string(),
        node_path: String::new(),
        node_type: ingest::NodeType::Object,
        description: String::new(),
        content: ingest::Payload::Null,
        original_payload: ingest::Payload::Null,
        data_format: String::new(),
        vector: Vec::new(),
    }
}
