//! Retention sweeping (core spec §4.12): bounds the Event Log's growth by
//! age and by count, and reaps subscriptions an agent has stopped renewing.
//!
//! Grounded on the original `RetentionManager`'s three policies — event TTL,
//! stream trim-to-length, and stale-agent cleanup — reimplemented here over
//! the in-process [`eventlog::EventLog`] and [`registry::SubscriptionRegistry`]
//! rather than Redis `XTRIM`/key-scan operations.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use eventlog::EventLog;
use registry::SubscriptionRegistry;

#[derive(Debug, Clone)]
pub struct RetentionConfig {
    /// Events older than this are dropped on each sweep.
    pub events_ttl: Duration,
    /// A project's event log is trimmed to at most this many events.
    pub max_stream_length: usize,
    /// A subscription with no activity for this long is reaped.
    pub agent_inactive: Duration,
    /// How often [`RetentionSweeper::spawn_periodic`] runs a sweep.
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        RetentionConfig {
            events_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            max_stream_length: 10_000,
            agent_inactive: Duration::from_secs(7 * 24 * 60 * 60),
            sweep_interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Outcome of one sweep, for logging/metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    pub projects_swept: usize,
    pub agents_reaped: usize,
}

pub struct RetentionSweeper {
    eventlog: Arc<EventLog>,
    registry: Arc<SubscriptionRegistry>,
    config: RetentionConfig,
}

impl RetentionSweeper {
    pub fn new(eventlog: Arc<EventLog>, registry: Arc<SubscriptionRegistry>, config: RetentionConfig) -> Self {
        RetentionSweeper { eventlog, registry, config }
    }

    /// Run one retention pass over every project with events, and reap
    /// stale subscriptions registry-wide.
    pub fn sweep_once(&self) -> RetentionReport {
        let now = now_millis();
        let ttl_cutoff = now.saturating_sub(self.config.events_ttl.as_millis() as u64);

        let projects = self.eventlog.projects();
        for project in &projects {
            self.eventlog.trim_to_max_len(project, self.config.max_stream_length);
            self.eventlog.trim_older_than(project, ttl_cutoff);
        }

        let agent_cutoff = now.saturating_sub(self.config.agent_inactive.as_millis() as u64);
        let reaped = self.registry.reap_stale(agent_cutoff);
        if !reaped.is_empty() {
            tracing::info!(count = reaped.len(), "reaped stale subscriptions");
        }

        RetentionReport {
            projects_swept: projects.len(),
            agents_reaped: reaped.len(),
        }
    }

    /// Run [`sweep_once`](Self::sweep_once) on `config.sweep_interval`,
    /// forever, until the returned handle is dropped/aborted.
    pub fn spawn_periodic(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = self.sweep_once();
                tracing::debug!(?report, "retention sweep complete");
            }
        })
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_trims_events_past_max_length() {
        let log = Arc::new(EventLog::new());
        for i in 0..5u8 {
            log.append("p", "t", vec![i]);
        }
        let registry = Arc::new(SubscriptionRegistry::new());
        let sweeper = RetentionSweeper::new(
            log.clone(),
            registry,
            RetentionConfig {
                max_stream_length: 2,
                ..RetentionConfig::default()
            },
        );
        let report = sweeper.sweep_once();
        assert_eq!(report.projects_swept, 1);
        assert_eq!(log.length("p"), 2);
    }

    #[test]
    fn sweep_reaps_only_stale_subscriptions() {
        use registry::{Delivery, Subscription};

        let log = Arc::new(EventLog::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        registry.put(Subscription::new(
            "stale",
            "p",
            vec!["need".into()],
            Delivery::PubSub { channel: "c".into() },
        ));
        // Let "stale" age past a short inactivity window, then register
        // "fresh" right before sweeping.
        std::thread::sleep(Duration::from_millis(5));
        registry.put(Subscription::new(
            "fresh",
            "p",
            vec!["need".into()],
            Delivery::PubSub { channel: "c".into() },
        ));

        let sweeper = RetentionSweeper::new(
            log,
            registry.clone(),
            RetentionConfig {
                agent_inactive: Duration::from_millis(2),
                ..RetentionConfig::default()
            },
        );
        let report = sweeper.sweep_once();
        assert_eq!(report.agents_reaped, 1);
        assert!(registry.get("stale").is_none());
        assert!(registry.get("fresh").is_some());
    }
}
