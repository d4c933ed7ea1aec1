use std::collections::HashMap;

use format::OutputFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to publish a coherent unit of data under `data_key`, replacing
/// whatever was previously published under the same key.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub project: String,
    pub data_key: String,
    pub payload: Vec<u8>,
    #[serde(default)]
    pub format_hint: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
}

/// How a registered agent wants to be told about matching updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    Redis,
    Webhook,
}

/// An agent's registration: its needs, where to deliver matches, and how far
/// behind the event log it already is.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub agent_id: String,
    pub project_id: String,
    pub data_needs: Vec<String>,
    #[serde(default)]
    pub last_seen_sequence: Option<u64>,
    #[serde(default)]
    pub response_format: OutputFormat,
    pub notification_method: NotificationMethod,
    #[serde(default)]
    pub notification_channel: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub status: String,
    pub agent_id: String,
    pub project_id: String,
    pub caught_up_events: usize,
    pub current_sequence: u64,
    pub matched_needs: HashMap<String, usize>,
    pub notification_channel: Option<String>,
}

/// An ad-hoc, subscription-free query against a project's indexed nodes.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub need: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub response_format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub need: String,
    pub matches: Vec<MatchOut>,
}

/// A [`matcher::Match`] flattened into the JSON-friendly shape delivered to
/// agents, with its estimated token cost attached.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOut {
    pub data_key: String,
    pub node_key: String,
    pub similarity: f32,
    pub description: String,
    pub content: Value,
    pub token_count: usize,
}

impl MatchOut {
    pub fn from_match(m: &matcher::Match) -> Self {
        MatchOut {
            data_key: m.data_key.clone(),
            node_key: m.node_key.clone(),
            similarity: m.score,
            description: m.record.description.clone(),
            content: serde_json::to_value(&m.record.content).unwrap_or(Value::Null),
            token_count: budget::estimate_tokens(m),
        }
    }
}

/// The three outbound shapes an agent can receive: the initial context sent
/// at registration, a data-change notification for a matched subscription,
/// and a replayed historical event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    InitialContext {
        agent_id: String,
        project: String,
        sequence: u64,
        context: HashMap<String, Vec<MatchOut>>,
    },
    DataUpdate {
        project: String,
        sequence: u64,
        data_key: String,
        event_type: String,
        data: Value,
    },
    Event {
        project: String,
        sequence: u64,
        event_type: String,
        data: Value,
    },
}
