//! Pipeline Orchestrator: the component that actually drives the
//! ingest → embed → match → fan-out pipeline end to end.
//!
//! Every other crate in the workspace is a pure building block — parsing,
//! embedding, indexing, matching, delivering — with no opinion about how
//! they're sequenced. [`Orchestrator`] is that sequencing: `publish_data`
//! turns a publisher's payload into indexed nodes and a fanned-out
//! notification, and `register_agent` turns an agent's declared needs into
//! a standing subscription plus an immediate snapshot of what already
//! matches.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use dispatcher::Dispatcher;
//! use eventlog::EventLog;
//! use index::VectorIndex;
//! use lexical::LexicalIndex;
//! use matcher::{Matcher, MatcherConfig};
//! use registry::SubscriptionRegistry;
//! use semantic::{Embedder, EmbeddingCache, SemanticConfig};
//! use orchestrator::{Orchestrator, OrchestratorConfig, PublishRequest};
//!
//! # async fn run() -> Result<(), orchestrator::OrchestratorError> {
//! let matcher = Arc::new(Matcher::new(
//!     VectorIndex::in_memory(),
//!     LexicalIndex::new(),
//!     Embedder::new(SemanticConfig::default()),
//!     EmbeddingCache::new(Duration::from_secs(3600)),
//!     MatcherConfig::default(),
//! ));
//! let orch = Orchestrator::new(
//!     matcher,
//!     Arc::new(EventLog::new()),
//!     Arc::new(SubscriptionRegistry::new()),
//!     Arc::new(Dispatcher::new()),
//!     OrchestratorConfig::default(),
//! );
//! let sequence = orch
//!     .publish_data(PublishRequest {
//!         project: "p".into(),
//!         data_key: "users_schema".into(),
//!         payload: br#"{"table":"users"}"#.to_vec(),
//!         format_hint: Some("json".into()),
//!         event_type: None,
//!     })
//!     .await?;
//! # let _ = sequence;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod retention;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod tests;

pub use crate::engine::{Orchestrator, OrchestratorConfig};
pub use crate::error::OrchestratorError;
pub use crate::retention::{RetentionConfig, RetentionReport, RetentionSweeper};
pub use crate::snapshot::{Snapshot, SnapshotStore};
pub use crate::types::{
    Envelope, MatchOut, NotificationMethod, PublishRequest, QueryRequest, QueryResponse, RegisterRequest, RegistrationResponse,
};
