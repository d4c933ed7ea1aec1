//! Contex Server - HTTP REST API for the semantic context router
//!
//! This crate exposes the ingest → embed → match → fan-out pipeline (the
//! [`orchestrator::Orchestrator`]) over a REST API. It supports:
//!
//! - **Publishing**: publishers push arbitrary structured or unstructured
//!   project data, which is parsed, embedded, indexed, and fanned out to
//!   every subscriber whose declared needs already match it.
//! - **Agent registration**: agents declare natural-language "data needs"
//!   and receive an initial matched context plus a standing subscription
//!   for future updates, delivered over pub/sub or webhook.
//! - **Ad-hoc query**: a subscription-free, single-need match against a
//!   project's indexed nodes.
//! - **Health & Metrics**: liveness/readiness probes and Prometheus-style
//!   metrics.
//!
//! # Features
//!
//! - **Authentication**: API key-based authentication with rate limiting
//! - **Middleware**: compression, CORS, request id tracking, structured logging
//! - **Configuration**: environment variable and file-based configuration
//! - **Error handling**: error responses mapped from [`contex::ContexError`]
//! - **Graceful shutdown**: signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! ## Public Endpoints (No Authentication)
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Protected Endpoints (API Key Required)
//!
//! - `POST /data/publish` - Publish a coherent unit of project data
//! - `POST /agents/register` - Register an agent's data needs
//! - `DELETE /agents/{id}` - Unregister an agent
//! - `POST /projects/{id}/query` - Ad-hoc single-need match
//! - `GET /projects/{id}/events` - Event log range read
//! - `GET /projects/{id}/data` - List indexed data keys
//! - `GET /metadata` - Server metadata
//!
//! See `README.md` for complete documentation.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::start_server;
pub use state::ServerState;
