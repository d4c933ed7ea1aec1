use std::time::Duration;

use index::{NodeRecord, VectorIndex};
use lexical::LexicalIndex;
use semantic::{Embedder, EmbeddingCache, SemanticConfig};
use serde_json::json;

use super::Matcher;
use crate::types::MatcherConfig;

fn record(project: &str, data_key: &str, description: &str, vector: Vec<f32>) -> NodeRecord {
    NodeRecord {
        project: project.into(),
        data_key: data_key.into(),
        node_key: data_key.into(),
        node_path: String::new(),
        node_type: ingest::NodeType::Object,
        description: description.into(),
        content: ingest::Payload::Str(description.into()),
        original_payload: ingest::Payload::Null,
        data_format: "json".into(),
        vector,
    }
}

fn matcher_with(config: MatcherConfig) -> Matcher {
    let semantic_cfg = SemanticConfig {
        tier: "fast".into(),
        ..SemanticConfig::default()
    };
    Matcher::new(
        VectorIndex::in_memory(),
        LexicalIndex::new(),
        Embedder::new(semantic_cfg),
        EmbeddingCache::new(Duration::from_secs(60)),
        config,
    )
}

#[tokio::test]
async fn vector_only_match_ranks_by_similarity() {
    let matcher = matcher_with(MatcherConfig {
        hybrid_search_enabled: false,
        ..MatcherConfig::default()
    });
    matcher
        .index()
        .upsert("p", "a", vec![record("p", "a", "users table schema", vec![1.0, 0.0, 0.0])])
        .unwrap();
    matcher
        .index()
        .upsert("p", "b", vec![record("p", "b", "orders table schema", vec![0.0, 1.0, 0.0])])
        .unwrap();

    let result = matcher.match_need("p", "users table schema").await.unwrap();
    assert_eq!(result.need, "users table schema");
    assert!(!result.matches.is_empty());
    assert_eq!(result.matches[0].node_key, "a");
    assert!(result.matches[0].vector_similarity.unwrap() > 0.9);
    assert!(result.matches[0].lexical_rank.is_none());
}

#[tokio::test]
async fn lexical_hit_is_hydrated_and_fused_with_vector_hit() {
    let matcher = matcher_with(MatcherConfig::default());
    matcher
        .index()
        .upsert("p", "a", vec![record("p", "a", "users table schema", vec![1.0, 0.0])])
        .unwrap();
    matcher.lexical().index("p", "a", "users table schema", json!({}));

    let result = matcher.match_need("p", "users table schema").await.unwrap();
    let hit = result.matches.iter().find(|m| m.node_key == "a").unwrap();
    assert!(hit.vector_similarity.is_some());
    assert!(hit.lexical_rank.is_some());
}

#[tokio::test]
async fn max_matches_truncates_results() {
    let matcher = matcher_with(MatcherConfig {
        max_matches: 1,
        hybrid_search_enabled: false,
        ..MatcherConfig::default()
    });
    for i in 0..3 {
        matcher
            .index()
            .upsert(
                "p",
                &format!("doc{i}"),
                vec![record("p", &format!("doc{i}"), "same text content", vec![1.0, 0.0])],
            )
            .unwrap();
    }
    let result = matcher.match_need("p", "same text content").await.unwrap();
    assert_eq!(result.matches.len(), 1);
}

#[tokio::test]
async fn similarity_threshold_filters_weak_matches() {
    let matcher = matcher_with(MatcherConfig {
        similarity_threshold: 10.0,
        hybrid_search_enabled: false,
        ..MatcherConfig::default()
    });
    matcher
        .index()
        .upsert("p", "a", vec![record("p", "a", "users table schema", vec![1.0, 0.0])])
        .unwrap();

    let result = matcher.match_need("p", "users table schema").await.unwrap();
    assert!(result.matches.is_empty());
}

#[tokio::test]
async fn pure_vector_mode_scores_by_raw_cosine_similarity() {
    // A moderate threshold only passes under raw cosine scoring. Under the
    // RRF-contribution formula every score would sit near 1/rrf_k ≈
    // 0.017, well below 0.5, and both matches would be wrongly discarded.
    let matcher = matcher_with(MatcherConfig {
        similarity_threshold: 0.5,
        hybrid_search_enabled: false,
        ..MatcherConfig::default()
    });
    matcher
        .index()
        .upsert("p", "a", vec![record("p", "a", "users table schema", vec![1.0, 0.0])])
        .unwrap();
    matcher
        .index()
        .upsert("p", "b", vec![record("p", "b", "unrelated shipping weight", vec![0.0, 1.0])])
        .unwrap();

    let result = matcher.match_need("p", "users table schema").await.unwrap();
    assert_eq!(result.matches.len(), 1);
    assert_eq!(result.matches[0].node_key, "a");
    assert_eq!(result.matches[0].score, result.matches[0].vector_similarity.unwrap());
}

#[tokio::test]
async fn repeated_need_reuses_cached_embedding() {
    let matcher = matcher_with(MatcherConfig::default());
    matcher
        .index()
        .upsert("p", "a", vec![record("p", "a", "users table schema", vec![1.0, 0.0])])
        .unwrap();

    let first = matcher.match_need("p", "users table schema").await.unwrap();
    let second = matcher.match_need("p", "users table schema").await.unwrap();
    assert_eq!(first.matches[0].vector_similarity, second.matches[0].vector_similarity);
}
