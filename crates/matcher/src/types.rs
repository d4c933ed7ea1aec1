use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning knobs for the Rank-Fusion Matcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    /// Minimum fused score a match must clear to be returned.
    #[serde(default)]
    pub similarity_threshold: f32,
    /// Maximum matches returned per need.
    #[serde(default = "MatcherConfig::default_max_matches")]
    pub max_matches: usize,
    /// Reciprocal rank fusion damping constant.
    #[serde(default = "MatcherConfig::default_rrf_k")]
    pub rrf_k: f32,
    /// Multiplier applied to the vector side of the fusion score.
    #[serde(default = "MatcherConfig::default_vector_boost")]
    pub vector_boost: f32,
    /// Whether lexical (BM25) search participates in fusion. When false,
    /// matching is pure vector kNN.
    #[serde(default = "MatcherConfig::default_hybrid_enabled")]
    pub hybrid_search_enabled: bool,
}

impl MatcherConfig {
    fn default_max_matches() -> usize {
        20
    }
    fn default_rrf_k() -> f32 {
        60.0
    }
    fn default_vector_boost() -> f32 {
        1.0
    }
    fn default_hybrid_enabled() -> bool {
        true
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            similarity_threshold: 0.0,
            max_matches: Self::default_max_matches(),
            rrf_k: Self::default_rrf_k(),
            vector_boost: Self::default_vector_boost(),
            hybrid_search_enabled: Self::default_hybrid_enabled(),
        }
    }
}

/// Per-call overrides for an ad-hoc match, layered over a [`MatcherConfig`]
/// without mutating it. `None` fields fall back to the matcher's config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOverrides {
    pub max_matches: Option<usize>,
    pub similarity_threshold: Option<f32>,
}

/// A single ranked hit for one need.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Match {
    pub data_key: String,
    pub node_key: String,
    /// Final fused score used for ranking and threshold filtering.
    pub score: f32,
    /// Raw cosine similarity, when the vector side contributed a hit.
    pub vector_similarity: Option<f32>,
    /// 0-based BM25 rank, when the lexical side contributed a hit.
    pub lexical_rank: Option<usize>,
    pub record: index::NodeRecord,
}

/// The ranked result of matching a single need against a project's index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub need: String,
    pub matches: Vec<Match>,
}

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("index error: {0}")]
    Index(#[from] index::IndexError),
    #[error("embedding error: {0}")]
    Semantic(#[from] semantic::SemanticError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = MatcherConfig::default();
        assert_eq!(cfg.rrf_k, 60.0);
        assert_eq!(cfg.vector_boost, 1.0);
        assert!(cfg.hybrid_search_enabled);
        assert_eq!(cfg.similarity_threshold, 0.0);
    }
}
