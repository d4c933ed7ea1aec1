//! `GET /projects/{id}/events` and `GET /projects/{id}/data` — core spec §6.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServerResult;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: Option<u64>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// An [`eventlog::Event`] with its JSON-encoded payload decoded back into a
/// `Value`, since the event log itself only knows about opaque bytes.
#[derive(Debug, Serialize)]
pub struct EventOut {
    pub sequence: u64,
    pub event_type: String,
    pub data: Value,
    pub created_at_millis: u64,
}

impl From<eventlog::Event> for EventOut {
    fn from(e: eventlog::Event) -> Self {
        EventOut {
            sequence: e.sequence,
            event_type: e.event_type,
            data: serde_json::from_slice(&e.payload).unwrap_or(Value::Null),
            created_at_millis: e.created_at_millis,
        }
    }
}

pub async fn events(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
    Query(params): Query<EventsQuery>,
) -> ServerResult<impl IntoResponse> {
    let events: Vec<EventOut> = state
        .orchestrator
        .events(&project_id, params.since.unwrap_or(0), params.count)
        .into_iter()
        .map(EventOut::from)
        .collect();

    Ok(Json(json!({
        "project_id": project_id,
        "events": events,
    })))
}

pub async fn data(
    State(state): State<Arc<ServerState>>,
    Path(project_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let data_keys = state.orchestrator.list_data_keys(&project_id);

    Ok(Json(json!({
        "project_id": project_id,
        "data_keys": data_keys,
    })))
}
