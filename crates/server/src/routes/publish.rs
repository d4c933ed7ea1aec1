//! `POST /data/publish` — core spec §6, invokes [`orchestrator::Orchestrator::publish_data`].

use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::response::IntoResponse;
use axum::Json;
use orchestrator::PublishRequest as CorePublishRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;

/// Body of `POST /data/publish`. `data` may be any JSON shape; it is
/// re-serialized to bytes before being handed to the Node Parser, which is
/// format-agnostic about its input (JSON, YAML, CSV, Markdown, plain text
/// all arrive as opaque bytes plus an optional format hint).
#[derive(Debug, Deserialize)]
pub struct PublishRequestBody {
    pub project_id: String,
    pub data_key: String,
    pub data: Value,
    #[serde(default)]
    pub data_format: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishResponseBody {
    pub status: &'static str,
    pub project_id: String,
    pub data_key: String,
    pub sequence: u64,
}

pub async fn publish(
    State(state): State<Arc<ServerState>>,
    Extension(api_key): Extension<String>,
    Json(body): Json<PublishRequestBody>,
) -> ServerResult<impl IntoResponse> {
    state.enforce_boundary(&api_key, &body.project_id)?;

    let payload = match &body.data {
        Value::String(s) => s.clone().into_bytes(),
        other => serde_json::to_vec(other).map_err(|e| ServerError::BadRequest(e.to_string()))?,
    };

    let sequence = state
        .orchestrator
        .publish_data(CorePublishRequest {
            project: body.project_id.clone(),
            data_key: body.data_key.clone(),
            payload,
            format_hint: body.data_format,
            event_type: body.event_type,
        })
        .await?;

    Ok(Json(PublishResponseBody {
        status: "published",
        project_id: body.project_id,
        data_key: body.data_key,
        sequence,
    }))
}
