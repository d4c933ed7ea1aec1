//! `POST /agents/register` and `DELETE /agents/{id}` — core spec §6, invoke
//! [`orchestrator::Orchestrator::register_agent`] and `unregister_agent`.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;
use axum::Json;
use orchestrator::{NotificationMethod, RegisterRequest};
use serde_json::json;

use crate::error::ServerResult;
use crate::state::ServerState;

pub async fn register(
    State(state): State<Arc<ServerState>>,
    Extension(api_key): Extension<String>,
    Json(request): Json<RegisterRequest>,
) -> ServerResult<impl IntoResponse> {
    state.enforce_boundary(&api_key, &request.project_id)?;

    if request.notification_method == NotificationMethod::Webhook && request.webhook_url.is_none() {
        return Err(crate::error::ServerError::BadRequest(
            "webhook_url is required when notification_method is \"webhook\"".to_string(),
        ));
    }

    let response = state.orchestrator.register_agent(request).await?;
    Ok(Json(response))
}

pub async fn unregister(
    State(state): State<Arc<ServerState>>,
    Path(agent_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let removed = state.orchestrator.unregister_agent(&agent_id);
    Ok(Json(json!({ "status": if removed { "unregistered" } else { "not_found" }, "agent_id": agent_id })))
}
