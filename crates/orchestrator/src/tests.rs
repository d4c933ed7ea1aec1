use std::sync::Arc;
use std::time::Duration;

use dispatcher::Dispatcher;
use eventlog::EventLog;
use index::VectorIndex;
use lexical::LexicalIndex;
use matcher::{Matcher, MatcherConfig};
use registry::SubscriptionRegistry;
use semantic::{EmbeddingCache, Embedder, SemanticConfig};

use crate::engine::{Orchestrator, OrchestratorConfig};
use crate::types::{NotificationMethod, PublishRequest, QueryRequest, RegisterRequest};

fn stub_config() -> SemanticConfig {
    SemanticConfig {
        tier: "fast".into(),
        mode: "fast".into(),
        ..SemanticConfig::default()
    }
}

fn test_orchestrator() -> Orchestrator {
    let matcher = Arc::new(Matcher::new(
        VectorIndex::in_memory(),
        LexicalIndex::new(),
        Embedder::new(stub_config()),
        EmbeddingCache::new(Duration::from_secs(3600)),
        MatcherConfig::default(),
    ));
    Orchestrator::new(
        matcher,
        Arc::new(EventLog::new()),
        Arc::new(SubscriptionRegistry::new()),
        Arc::new(Dispatcher::new()),
        OrchestratorConfig::default(),
    )
}

fn publish(project: &str, data_key: &str, json: &str) -> PublishRequest {
    PublishRequest {
        project: project.to_string(),
        data_key: data_key.to_string(),
        payload: json.as_bytes().to_vec(),
        format_hint: Some("json".into()),
        event_type: None,
    }
}

#[tokio::test]
async fn publish_data_indexes_nodes_and_appends_one_event() {
    let orch = test_orchestrator();
    let seq = orch
        .publish_data(publish("p", "users_schema", r#"{"table":"users","columns":{"id":"uuid"}}"#))
        .await
        .unwrap();
    assert_eq!(seq, 1);
    assert_eq!(orch.eventlog().latest("p"), Some(1));
    assert!(!orch.list_data_keys("p").is_empty());
}

#[tokio::test]
async fn republishing_same_data_key_replaces_prior_nodes() {
    let orch = test_orchestrator();
    orch.publish_data(publish("p", "doc", r#"{"a": 1, "b": 2}"#)).await.unwrap();
    let before = orch.matcher().index().len("p");
    orch.publish_data(publish("p", "doc", r#"{"a": 1}"#)).await.unwrap();
    let after = orch.matcher().index().len("p");
    assert!(after <= before);
    assert_eq!(orch.list_data_keys("p"), vec!["doc".to_string()]);
}

#[tokio::test]
async fn malformed_publish_rejected_before_any_parser_accepts() {
    // The default parser chain's terminal plaintext parser always accepts,
    // so `success` only goes false for an empty custom chain; exercise the
    // success path holds for arbitrary prose instead.
    let orch = test_orchestrator();
    let seq = orch
        .publish_data(PublishRequest {
            project: "p".into(),
            data_key: "notes".into(),
            payload: b"just some unstructured prose".to_vec(),
            format_hint: None,
            event_type: None,
        })
        .await
        .unwrap();
    assert_eq!(seq, 1);
}

#[tokio::test]
async fn register_agent_rejects_empty_needs() {
    let orch = test_orchestrator();
    let err = orch
        .register_agent(RegisterRequest {
            agent_id: "a1".into(),
            project_id: "p".into(),
            data_needs: vec![],
            last_seen_sequence: None,
            response_format: format::OutputFormat::Json,
            notification_method: NotificationMethod::Redis,
            notification_channel: None,
            webhook_url: None,
            webhook_secret: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::OrchestratorError::Validation(_)));
}

#[tokio::test]
async fn register_agent_requires_webhook_url_for_webhook_method() {
    let orch = test_orchestrator();
    let err = orch
        .register_agent(RegisterRequest {
            agent_id: "a1".into(),
            project_id: "p".into(),
            data_needs: vec!["schema changes".into()],
            last_seen_sequence: None,
            response_format: format::OutputFormat::Json,
            notification_method: NotificationMethod::Webhook,
            notification_channel: None,
            webhook_url: None,
            webhook_secret: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::OrchestratorError::Validation(_)));
}

#[tokio::test]
async fn register_agent_matches_already_published_data_and_catches_up_on_replay() {
    let orch = test_orchestrator();
    orch.publish_data(publish("p", "users_schema", r#"{"table":"users"}"#)).await.unwrap();
    orch.publish_data(publish("p", "orders_schema", r#"{"table":"orders"}"#)).await.unwrap();

    let response = orch
        .register_agent(RegisterRequest {
            agent_id: "a1".into(),
            project_id: "p".into(),
            data_needs: vec!["users table schema".into()],
            last_seen_sequence: Some(0),
            response_format: format::OutputFormat::Json,
            notification_method: NotificationMethod::Redis,
            notification_channel: Some("a1-channel".into()),
            webhook_url: None,
            webhook_secret: None,
        })
        .await
        .unwrap();

    assert_eq!(response.agent_id, "a1");
    assert_eq!(response.current_sequence, 2);
    assert_eq!(response.caught_up_events, 2);
    assert_eq!(response.notification_channel.as_deref(), Some("a1-channel"));
    assert!(orch.registry().get("a1").is_some());
}

#[tokio::test]
async fn publish_after_registration_notifies_matched_subscription() {
    let orch = test_orchestrator();
    orch.publish_data(publish("p", "users_schema", r#"{"table":"users"}"#)).await.unwrap();
    orch.register_agent(RegisterRequest {
        agent_id: "a1".into(),
        project_id: "p".into(),
        data_needs: vec!["users table schema".into()],
        last_seen_sequence: None,
        response_format: format::OutputFormat::Json,
        notification_method: NotificationMethod::Redis,
        notification_channel: Some("a1-channel".into()),
        webhook_url: None,
        webhook_secret: None,
    })
    .await
    .unwrap();

    let subscription = orch.registry().get("a1").unwrap();
    assert!(!subscription.matched_data_keys.is_empty());

    let seq = orch.publish_data(publish("p", "users_schema", r#"{"table":"users","columns":{"id":"uuid"}}"#)).await.unwrap();
    assert_eq!(seq, 2);
}

#[tokio::test]
async fn unregister_agent_removes_subscription() {
    let orch = test_orchestrator();
    orch.register_agent(RegisterRequest {
        agent_id: "a1".into(),
        project_id: "p".into(),
        data_needs: vec!["anything".into()],
        last_seen_sequence: None,
        response_format: format::OutputFormat::Json,
        notification_method: NotificationMethod::Redis,
        notification_channel: None,
        webhook_url: None,
        webhook_secret: None,
    })
    .await
    .unwrap();
    assert!(orch.unregister_agent("a1"));
    assert!(orch.registry().get("a1").is_none());
    assert!(!orch.unregister_agent("a1"));
}

#[tokio::test]
async fn ad_hoc_query_does_not_create_a_subscription() {
    let orch = test_orchestrator();
    orch.publish_data(publish("p", "users_schema", r#"{"table":"users"}"#)).await.unwrap();

    let response = orch
        .query(
            "p",
            QueryRequest {
                need: "users table".into(),
                top_k: Some(5),
                similarity_threshold: None,
                max_tokens: None,
                response_format: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(response.need, "users table");
    assert!(orch.registry().is_empty());
}
