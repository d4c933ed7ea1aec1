//! API route handlers
//!
//! This module contains the HTTP endpoint implementations for the Contex
//! semantic context router, organized the way the core spec's §6 groups
//! them:
//!
//! - `health`: liveness/readiness probes and metrics
//! - `publish`: `POST /data/publish`
//! - `agents`: `POST /agents/register`, `DELETE /agents/{id}`
//! - `query`: `POST /projects/{id}/query`
//! - `project`: `GET /projects/{id}/events`, `GET /projects/{id}/data`

pub mod agents;
pub mod health;
pub mod project;
pub mod publish;
pub mod query;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info.
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Contex Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "POST /data/publish",
            "POST /agents/register",
            "DELETE /agents/{id}",
            "POST /projects/{id}/query",
            "GET /projects/{id}/events",
            "GET /projects/{id}/data",
            "GET /health",
            "GET /ready",
            "GET /metrics"
        ]
    })))
}

/// 404 Not Found handler.
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
