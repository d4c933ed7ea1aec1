//! In-memory, concurrency-safe registry of active agent subscriptions.
//!
//! A subscription records what an agent asked to be notified about (its
//! `needs`), where matches get delivered, and which data keys last matched —
//! so a publish only has to diff against `matched_data_keys` instead of
//! re-running the full match pipeline for every subscriber on every event.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use format::OutputFormat;
use serde::{Deserialize, Serialize};

/// Where a subscription's matches get delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Delivery {
    PubSub { channel: String },
    Webhook { url: String, secret: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub agent_id: String,
    pub project: String,
    pub needs: Vec<String>,
    pub delivery: Delivery,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub matched_data_keys: HashSet<String>,
    #[serde(default)]
    pub last_sequence: u64,
    #[serde(default)]
    pub last_activity_millis: u64,
}

impl Subscription {
    pub fn new(agent_id: impl Into<String>, project: impl Into<String>, needs: Vec<String>, delivery: Delivery) -> Self {
        Subscription {
            agent_id: agent_id.into(),
            project: project.into(),
            needs,
            delivery,
            format: OutputFormat::default(),
            matched_data_keys: HashSet::new(),
            last_sequence: 0,
            last_activity_millis: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Registry of live subscriptions, keyed by `agent_id`.
pub struct SubscriptionRegistry {
    inner: DashMap<String, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        SubscriptionRegistry { inner: DashMap::new() }
    }

    /// Create or fully replace the subscription for `subscription.agent_id`.
    /// Re-registering resets `matched_data_keys` and `last_sequence` — a
    /// fresh registration starts from a clean match state.
    pub fn put(&self, subscription: Subscription) {
        self.inner.insert(subscription.agent_id.clone(), subscription);
    }

    pub fn get(&self, agent_id: &str) -> Option<Subscription> {
        self.inner.get(agent_id).map(|e| e.value().clone())
    }

    pub fn remove(&self, agent_id: &str) -> Option<Subscription> {
        self.inner.remove(agent_id).map(|(_, v)| v)
    }

    pub fn list(&self) -> Vec<String> {
        self.inner.iter().map(|e| e.key().clone()).collect()
    }

    pub fn list_all(&self) -> Vec<Subscription> {
        self.inner.iter().map(|e| e.value().clone()).collect()
    }

    /// Subscriptions in `project` whose `matched_data_keys` already contains
    /// `data_key` — the set a fan-out considers "still relevant" without
    /// re-matching.
    pub fn affected_by(&self, project: &str, data_key: &str) -> Vec<Subscription> {
        self.inner
            .iter()
            .filter(|e| e.project == project && e.matched_data_keys.contains(data_key))
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn for_project(&self, project: &str) -> Vec<Subscription> {
        self.inner
            .iter()
            .filter(|e| e.project == project)
            .map(|e| e.value().clone())
            .collect()
    }

    /// Advance `last_sequence`, ignoring an update that would move it
    /// backwards (I3: a subscription's delivery cursor is monotone even if
    /// callers race or retry a stale publish).
    pub fn update_last_sequence(&self, agent_id: &str, sequence: u64) {
        if let Some(mut entry) = self.inner.get_mut(agent_id) {
            if sequence > entry.last_sequence {
                entry.last_sequence = sequence;
            }
        }
    }

    pub fn set_matched_data_keys(&self, agent_id: &str, keys: HashSet<String>) {
        if let Some(mut entry) = self.inner.get_mut(agent_id) {
            entry.matched_data_keys = keys;
        }
    }

    pub fn touch(&self, agent_id: &str) {
        if let Some(mut entry) = self.inner.get_mut(agent_id) {
            entry.last_activity_millis = now_millis();
        }
    }

    /// Agent ids whose last activity predates `cutoff_millis`.
    pub fn stale(&self, cutoff_millis: u64) -> Vec<String> {
        self.inner
            .iter()
            .filter(|e| e.last_activity_millis < cutoff_millis)
            .map(|e| e.key().clone())
            .collect()
    }

    /// Remove and return every subscription stale as of `cutoff_millis`.
    pub fn reap_stale(&self, cutoff_millis: u64) -> Vec<Subscription> {
        let stale_ids = self.stale(cutoff_millis);
        stale_ids
            .into_iter()
            .filter_map(|id| self.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
