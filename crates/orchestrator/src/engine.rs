use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eventlog::{Event, EventLog};
use ingest::{Node, Payload};
use matcher::{Match, MatchOverrides, Matcher};
use registry::{Delivery, Subscription, SubscriptionRegistry};
use serde_json::Value;

use crate::error::OrchestratorError;
use crate::types::{
    Envelope, MatchOut, NotificationMethod, PublishRequest, QueryRequest, QueryResponse, RegisterRequest, RegistrationResponse,
};

/// Maximum number of webhook deliveries a single process will have in
/// flight at once. A delivery beyond this is dropped rather than queued
/// without bound; the subscription's `last_sequence` cursor still advances
/// at the next event it does receive, so a dropped delivery never wedges
/// replay (the agent can always re-register and catch up from the log).
const DEFAULT_MAX_INFLIGHT_WEBHOOKS: usize = 64;

/// Tuning knobs for the Pipeline Orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Caps the total estimated token cost of a registration's initial
    /// context. `None` means unbounded.
    pub max_context_tokens: Option<usize>,
    /// Upper bound on concurrently in-flight webhook deliveries.
    pub max_inflight_webhooks: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            max_context_tokens: None,
            max_inflight_webhooks: DEFAULT_MAX_INFLIGHT_WEBHOOKS,
        }
    }
}

/// Wires the Node Parser, Rank-Fusion Matcher, Event Log, Subscription
/// Registry, and Dispatcher into the two operations an agent actually calls:
/// publishing data and registering for future matches.
pub struct Orchestrator {
    matcher: Arc<Matcher>,
    eventlog: Arc<EventLog>,
    registry: Arc<SubscriptionRegistry>,
    dispatcher: Arc<dispatcher::Dispatcher>,
    config: OrchestratorConfig,
    webhook_fanout: Arc<tokio::sync::Semaphore>,
}

impl Orchestrator {
    pub fn new(
        matcher: Arc<Matcher>,
        eventlog: Arc<EventLog>,
        registry: Arc<SubscriptionRegistry>,
        dispatcher: Arc<dispatcher::Dispatcher>,
        config: OrchestratorConfig,
    ) -> Self {
        let webhook_fanout = Arc::new(tokio::sync::Semaphore::new(config.max_inflight_webhooks));
        Orchestrator {
            matcher,
            eventlog,
            registry,
            dispatcher,
            config,
            webhook_fanout,
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn eventlog(&self) -> &EventLog {
        &self.eventlog
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Parse `request.payload` into nodes, embed and index them, append the
    /// resulting event, and notify every subscription already matched to
    /// `data_key`. Returns the assigned event sequence.
    ///
    /// Steps 1-9 of the core spec's publish flow: parse, embed each node,
    /// replace the vector-index rows for `data_key` (I2), mirror into the
    /// lexical index, append the event only once the index write has
    /// committed (I1), then fan the update out to affected subscribers.
    pub async fn publish_data(&self, request: PublishRequest) -> Result<u64, OrchestratorError> {
        let parsed = ingest::parse(&request.payload, request.format_hint.as_deref());
        if !parsed.success {
            return Err(OrchestratorError::Parse(
                parsed.error.unwrap_or_else(|| "no parser accepted the payload".to_string()),
            ));
        }

        let mut records = Vec::with_capacity(parsed.nodes.len());
        for node in &parsed.nodes {
            let text = node.embedding_text();
            let vector = self.matcher.embed(&text).await?;
            records.push(index::NodeRecord {
                project: request.project.clone(),
                data_key: request.data_key.clone(),
                node_key: index::NodeRecord::node_key_for(&request.data_key, &node.path),
                node_path: node.path.clone(),
                node_type: node.node_type,
                description: text,
                content: node.content.clone(),
                original_payload: node.content.clone(),
                data_format: parsed.format_name.clone(),
                vector,
            });
        }

        // Evict the data_key's prior rows from the lexical index too, since
        // its own `index` call only replaces by node_key, not by data_key
        // prefix the way the vector index's `upsert` does.
        let stale_node_keys = self.matcher.index().node_keys_for_data_key(&request.project, &request.data_key);

        // I1: the vector-index replace commits before the event is appended,
        // so a reader who observes the event already sees the new rows.
        self.matcher.index().upsert(&request.project, &request.data_key, records.clone())?;

        if self.matcher.config().hybrid_search_enabled {
            for node_key in &stale_node_keys {
                if !records.iter().any(|r| &r.node_key == node_key) {
                    self.matcher.lexical().remove(&request.project, node_key);
                }
            }
            for record in &records {
                self.matcher
                    .lexical()
                    .index(&request.project, &record.node_key, &record.description, Value::Null);
            }
        }

        let document = document_value(&parsed.nodes);
        let event_type = request.event_type.clone().unwrap_or_else(|| format!("{}_updated", request.data_key));
        let event_payload = serde_json::to_vec(&serde_json::json!({
            "data_key": request.data_key,
            "format": parsed.format_name,
            "data": document,
        }))
        .unwrap_or_default();

        let sequence = self.eventlog.append(&request.project, &event_type, event_payload);

        self.notify_affected(&request.project, &request.data_key, sequence, &event_type, document).await;

        Ok(sequence)
    }

    /// Match every declared need, reserve a subscription slot, send the
    /// initial context, and replay any events the agent missed.
    pub async fn register_agent(&self, request: RegisterRequest) -> Result<RegistrationResponse, OrchestratorError> {
        if request.data_needs.is_empty() {
            return Err(OrchestratorError::Validation("data_needs must not be empty".into()));
        }
        let delivery = self.resolve_delivery(&request)?;

        let results = self.matcher.match_needs(&request.project_id, &request.data_needs).await?;
        let results = match self.config.max_context_tokens {
            Some(budget_tokens) => budget::truncate(&results, budget_tokens)?,
            None => results,
        };

        let mut matched_data_keys: HashSet<String> = HashSet::new();
        let mut matched_needs: HashMap<String, usize> = HashMap::new();
        let mut context: HashMap<String, Vec<MatchOut>> = HashMap::new();
        for result in &results {
            matched_needs.insert(result.need.clone(), result.matches.len());
            matched_data_keys.extend(result.matches.iter().map(|m: &Match| m.data_key.clone()));
            context.insert(result.need.clone(), result.matches.iter().map(MatchOut::from_match).collect());
        }

        let mut subscription = Subscription::new(request.agent_id.clone(), request.project_id.clone(), request.data_needs.clone(), delivery.clone());
        subscription.format = request.response_format;
        subscription.matched_data_keys = matched_data_keys;
        self.registry.put(subscription);

        let current_sequence = self.eventlog.latest(&request.project_id).unwrap_or(0);

        let initial_envelope = Envelope::InitialContext {
            agent_id: request.agent_id.clone(),
            project: request.project_id.clone(),
            sequence: current_sequence,
            context,
        };
        self.send(&delivery, request.response_format, "initial_context", &initial_envelope).await;

        let missed = self.eventlog.range(&request.project_id, request.last_seen_sequence.unwrap_or(0), None);
        for event in &missed {
            let envelope = event_envelope(&request.project_id, event);
            self.send(&delivery, request.response_format, "event", &envelope).await;
        }

        self.registry.update_last_sequence(&request.agent_id, current_sequence);

        Ok(RegistrationResponse {
            status: "registered".to_string(),
            agent_id: request.agent_id,
            project_id: request.project_id,
            caught_up_events: missed.len(),
            current_sequence,
            matched_needs,
            notification_channel: match &delivery {
                Delivery::PubSub { channel } => Some(channel.clone()),
                Delivery::Webhook { .. } => None,
            },
        })
    }

    /// Drop a subscription. A no-op (not an error) if the agent was never
    /// registered or already unregistered.
    pub fn unregister_agent(&self, agent_id: &str) -> bool {
        self.registry.remove(agent_id).is_some()
    }

    /// One-off match against a project's indexed nodes, with no subscription
    /// side effect: nothing is stored in the registry and no delivery is
    /// attempted.
    pub async fn query(&self, project: &str, request: QueryRequest) -> Result<QueryResponse, OrchestratorError> {
        let overrides = MatchOverrides {
            max_matches: request.top_k,
            similarity_threshold: request.similarity_threshold,
        };
        let mut result = self.matcher.match_need_with(project, &request.need, &overrides).await?;
        if let Some(budget_tokens) = request.max_tokens {
            let truncated = budget::truncate(std::slice::from_ref(&result), budget_tokens)?;
            result = truncated.into_iter().next().unwrap_or(result);
        }
        Ok(QueryResponse {
            need: result.need,
            matches: result.matches.iter().map(MatchOut::from_match).collect(),
        })
    }

    /// Events for `project` strictly after `since_exclusive`.
    pub fn events(&self, project: &str, since_exclusive: u64, max_count: Option<usize>) -> Vec<Event> {
        self.eventlog.range(project, since_exclusive, max_count)
    }

    /// Data keys currently indexed for `project`.
    pub fn list_data_keys(&self, project: &str) -> Vec<String> {
        self.matcher.index().list_data_keys(project)
    }

    fn resolve_delivery(&self, request: &RegisterRequest) -> Result<Delivery, OrchestratorError> {
        match request.notification_method {
            NotificationMethod::Redis => Ok(Delivery::PubSub {
                channel: request
                    .notification_channel
                    .clone()
                    .unwrap_or_else(|| format!("agent:{}:updates", request.agent_id)),
            }),
            NotificationMethod::Webhook => {
                let url = request
                    .webhook_url
                    .clone()
                    .ok_or_else(|| OrchestratorError::Validation("webhook_url is required for webhook notification_method".into()))?;
                Ok(Delivery::Webhook {
                    url,
                    secret: request.webhook_secret.clone().unwrap_or_default(),
                })
            }
        }
    }

    /// Serialize `envelope` in `response_format` and deliver it
    /// synchronously. Used for registration's own initial-context and
    /// replay sends, which are one-shot per request rather than fanned out
    /// to many subscribers.
    async fn send(&self, delivery: &Delivery, response_format: format::OutputFormat, event_type: &str, envelope: &Envelope) {
        let value = serde_json::to_value(envelope).unwrap_or(Value::Null);
        let body = format::serialize_safe(&value, response_format);
        if let Err(err) = self.dispatcher.deliver(delivery, event_type, body).await {
            tracing::warn!(event_type, error = %err, "envelope delivery failed");
        }
    }

    /// Notify every subscription already matched to `data_key`. Pub/sub
    /// deliveries are cheap and awaited inline; webhook deliveries are
    /// fanned out onto bounded background tasks so one slow endpoint can't
    /// stall the publish call for every other subscriber.
    async fn notify_affected(&self, project: &str, data_key: &str, sequence: u64, event_type: &str, document: Value) {
        let affected = self.registry.affected_by(project, data_key);
        for sub in affected {
            let envelope = Envelope::DataUpdate {
                project: project.to_string(),
                sequence,
                data_key: data_key.to_string(),
                event_type: event_type.to_string(),
                data: document.clone(),
            };
            let value = serde_json::to_value(&envelope).unwrap_or(Value::Null);
            let body = format::serialize_safe(&value, sub.format);

            match &sub.delivery {
                Delivery::PubSub { .. } => {
                    if let Err(err) = self.dispatcher.deliver(&sub.delivery, event_type, body).await {
                        tracing::warn!(agent_id = %sub.agent_id, error = %err, "pub/sub delivery failed");
                    }
                    self.registry.update_last_sequence(&sub.agent_id, sequence);
                }
                Delivery::Webhook { .. } => {
                    let Ok(permit) = Arc::clone(&self.webhook_fanout).try_acquire_owned() else {
                        tracing::warn!(agent_id = %sub.agent_id, "webhook fan-out queue full, dropping delivery");
                        continue;
                    };
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let registry = Arc::clone(&self.registry);
                    let delivery = sub.delivery.clone();
                    let agent_id = sub.agent_id.clone();
                    let event_type = event_type.to_string();
                    tokio::spawn(async move {
                        let _permit = permit;
                        if let Err(err) = dispatcher.deliver(&delivery, &event_type, body).await {
                            tracing::warn!(agent_id = %agent_id, error = %err, "webhook delivery failed");
                        }
                        registry.update_last_sequence(&agent_id, sequence);
                    });
                }
            }
        }
    }
}

/// Fold a parsed payload's nodes back into a single JSON value for delivery:
/// a lone root node's content as-is, otherwise every node's content as an
/// array (order preserved from the parser chain's output).
fn document_value(nodes: &[Node]) -> Value {
    let payload = if nodes.len() == 1 && nodes[0].path.is_empty() {
        nodes[0].content.clone()
    } else {
        Payload::Array(nodes.iter().map(|n| n.content.clone()).collect())
    };
    serde_json::to_value(&payload).unwrap_or(Value::Null)
}

fn event_envelope(project: &str, event: &Event) -> Envelope {
    let data = serde_json::from_slice::<Value>(&event.payload)
        .ok()
        .and_then(|v| v.get("data").cloned())
        .unwrap_or(Value::Null);
    Envelope::Event {
        project: project.to_string(),
        sequence: event.sequence,
        event_type: event.event_type.clone(),
        data,
    }
}
