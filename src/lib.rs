//! Workspace umbrella crate for Contex, the semantic context router.
//!
//! Re-exports the per-stage crates so embedders can drive the full
//! ingest → embed → match → fan-out pipeline through a single dependency,
//! and exposes [`ContexError`] as the aggregate error type returned by
//! [`orchestrator::Orchestrator`] operations.
//!
//! ```ignore
//! use contex::{orchestrator::Orchestrator, PublishRequest};
//!
//! # async fn demo(orch: &Orchestrator) -> Result<(), contex::ContexError> {
//! let seq = orch
//!     .publish_data(PublishRequest {
//!         project: "p".into(),
//!         data_key: "users_schema".into(),
//!         payload: br#"{"table":"users"}"#.to_vec(),
//!         format_hint: Some("json".into()),
//!         event_type: None,
//!     })
//!     .await?;
//! # let _ = seq;
//! # Ok(())
//! # }
//! ```

pub use canonical;
pub use dispatcher;
pub use eventlog;
pub use format;
pub use index;
pub use ingest;
pub use lexical;
pub use matcher;
pub use orchestrator;
pub use registry;
pub use semantic;

pub use orchestrator::{OrchestratorError, PublishRequest, RegisterRequest};

/// Umbrella error aggregating every stage's error type.
///
/// Mirrors [`orchestrator::OrchestratorError`] one-for-one; kept as a
/// separate alias so callers that only depend on `contex` (not
/// `contex-orchestrator` directly) have a stable name to match on.
pub type ContexError = OrchestratorError;
