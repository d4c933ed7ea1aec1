//! # Matcher
//!
//! Turns an agent's free-text `need` into a ranked set of [`types::Match`]es
//! over a project's indexed nodes, by fusing two independent rankings:
//!
//! - Cosine kNN over [`index::VectorIndex`].
//! - BM25 over [`lexical::LexicalIndex`] (optional; disabled via
//!   [`types::MatcherConfig::hybrid_search_enabled`] falls back to pure
//!   vector search).
//!
//! The two rankings are combined with reciprocal rank fusion rather than a
//! weighted blend of raw scores, since BM25 and cosine similarity live on
//! unrelated scales and naive blending would let whichever signal has the
//! larger numeric range dominate.
//!
//! ```no_run
//! use std::time::Duration;
//! use index::VectorIndex;
//! use lexical::LexicalIndex;
//! use semantic::{Embedder, EmbeddingCache, SemanticConfig};
//! use matcher::{Matcher, MatcherConfig};
//!
//! # async fn run() {
//! let matcher = Matcher::new(
//!     VectorIndex::in_memory(),
//!     LexicalIndex::new(),
//!     Embedder::new(SemanticConfig::default()),
//!     EmbeddingCache::new(Duration::from_secs(3600)),
//!     MatcherConfig::default(),
//! );
//! let result = matcher.match_need("project-a", "recent schema changes").await.unwrap();
//! for hit in result.matches {
//!     println!("{} score={}", hit.node_key, hit.score);
//! }
//! # }
//! ```

pub mod engine;
pub mod types;

pub use crate::engine::Matcher;
pub use crate::types::{Match, MatchError, MatchOverrides, MatchResult, MatcherConfig};
