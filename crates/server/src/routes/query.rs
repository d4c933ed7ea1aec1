//! `POST /projects/{id}/query` — core spec §6. An ad-hoc, single-need match
//! against a project's indexed nodes with no subscription side effect.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use format::OutputFormat;
use orchestrator::QueryRequest as CoreQueryRequest;
use serde::Deserialize;

use crate::error::ServerResult;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct QueryRequestBody {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub response_format: Option<OutputFormat>,
}

pub async fn query(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
    Extension(api_key): Extension<String>,
    axum::Json(body): axum::Json<QueryRequestBody>,
) -> ServerResult<impl IntoResponse> {
    state.enforce_boundary(&api_key, &project_id)?;

    let response_format = body.response_format.unwrap_or_default();
    let response = state
        .orchestrator
        .query(
            &project_id,
            CoreQueryRequest {
                need: body.query,
                top_k: body.top_k,
                similarity_threshold: body.threshold,
                max_tokens: body.max_tokens,
                response_format: Some(response_format),
            },
        )
        .await?;

    let value = serde_json::to_value(&response).unwrap_or(serde_json::Value::Null);
    let body = format::serialize_safe(&value, response_format);

    Ok(Response::builder()
        .header(CONTENT_TYPE, format::content_type(response_format))
        .body(axum::body::Body::from(body))
        .unwrap())
}
