use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration: ambient HTTP/operational knobs loaded the way the
/// teacher crate loads them (`config::Config::builder` layering an optional
/// `server.toml` file under environment overrides), plus the core pipeline's
/// tuning knobs, which the core spec names as bare (unprefixed) environment
/// variables rather than `CONTEX_SERVER__*` ones.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Rate limit: requests per minute per API key
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// API keys for authentication (in production, use a database)
    #[serde(default)]
    pub api_keys: HashSet<String>,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Upper bound on concurrently in-flight webhook deliveries.
    #[serde(default = "default_max_inflight_webhooks")]
    pub max_inflight_webhooks: usize,

    /// Minimum fused score a match must clear to be returned.
    #[serde(default)]
    pub similarity_threshold: f32,

    /// Maximum matches returned per need.
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Caps the total estimated token cost of a registration's initial
    /// context, and of an ad-hoc query when it doesn't set its own
    /// `max_tokens`. `None` means unbounded.
    #[serde(default)]
    pub max_context_size: Option<usize>,

    /// Whether lexical (BM25) search participates in fusion.
    #[serde(default = "default_true")]
    pub hybrid_search_enabled: bool,

    /// Reciprocal rank fusion damping constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Multiplier applied to the vector side of the fusion score.
    #[serde(default = "default_vector_boost")]
    pub vector_boost: f32,

    /// Embedding cache entry lifetime, in seconds.
    #[serde(default = "default_embedding_cache_ttl_secs")]
    pub embedding_cache_ttl_secs: u64,

    /// Event TTL for retention sweeps, in days.
    #[serde(default = "default_retention_events_ttl_days")]
    pub retention_events_ttl_days: u64,

    /// Subscription inactivity cutoff for retention sweeps, in days.
    #[serde(default = "default_retention_agent_inactive_days")]
    pub retention_agent_inactive_days: u64,

    /// Per-project event log cap enforced by retention sweeps.
    #[serde(default = "default_retention_max_stream_length")]
    pub retention_max_stream_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            max_inflight_webhooks: default_max_inflight_webhooks(),
            similarity_threshold: 0.0,
            max_matches: default_max_matches(),
            max_context_size: None,
            hybrid_search_enabled: default_true(),
            rrf_k: default_rrf_k(),
            vector_boost: default_vector_boost(),
            embedding_cache_ttl_secs: default_embedding_cache_ttl_secs(),
            retention_events_ttl_days: default_retention_events_ttl_days(),
            retention_agent_inactive_days: default_retention_agent_inactive_days(),
            retention_max_stream_length: default_retention_max_stream_length(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `server.toml`, ambient
    /// `CONTEX_SERVER__*` environment overrides, and the core's bare,
    /// unprefixed environment variables (`SIMILARITY_THRESHOLD`,
    /// `MAX_MATCHES`, `MAX_CONTEXT_SIZE`, `HYBRID_SEARCH_ENABLED`, `RRF_K`,
    /// `VECTOR_BOOST`, `EMBEDDING_CACHE_TTL`, `RETENTION_EVENTS_TTL_DAYS`,
    /// `RETENTION_AGENT_INACTIVE_DAYS`, `RETENTION_MAX_STREAM_LENGTH`).
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("CONTEX_SERVER").separator("__"));

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        config.apply_core_env_overrides();

        if config.api_keys.is_empty() {
            tracing::warn!("No API keys configured, using demo key 'demo-key-12345'");
            config.api_keys.insert("demo-key-12345".to_string());
        }

        Ok(config)
    }

    fn apply_core_env_overrides(&mut self) {
        if let Some(v) = env_parse::<f32>("SIMILARITY_THRESHOLD") {
            self.similarity_threshold = v;
        }
        if let Some(v) = env_parse::<usize>("MAX_MATCHES") {
            self.max_matches = v;
        }
        if let Some(v) = env_parse::<usize>("MAX_CONTEXT_SIZE") {
            self.max_context_size = Some(v);
        }
        if let Some(v) = env_parse::<bool>("HYBRID_SEARCH_ENABLED") {
            self.hybrid_search_enabled = v;
        }
        if let Some(v) = env_parse::<f32>("RRF_K") {
            self.rrf_k = v;
        }
        if let Some(v) = env_parse::<f32>("VECTOR_BOOST") {
            self.vector_boost = v;
        }
        if let Some(v) = env_parse::<u64>("EMBEDDING_CACHE_TTL") {
            self.embedding_cache_ttl_secs = v;
        }
        if let Some(v) = env_parse::<u64>("RETENTION_EVENTS_TTL_DAYS") {
            self.retention_events_ttl_days = v;
        }
        if let Some(v) = env_parse::<u64>("RETENTION_AGENT_INACTIVE_DAYS") {
            self.retention_agent_inactive_days = v;
        }
        if let Some(v) = env_parse::<usize>("RETENTION_MAX_STREAM_LENGTH") {
            self.retention_max_stream_length = v;
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    pub fn matcher_config(&self) -> matcher::MatcherConfig {
        matcher::MatcherConfig {
            similarity_threshold: self.similarity_threshold,
            max_matches: self.max_matches,
            rrf_k: self.rrf_k,
            vector_boost: self.vector_boost,
            hybrid_search_enabled: self.hybrid_search_enabled,
        }
    }

    pub fn retention_config(&self) -> orchestrator::RetentionConfig {
        orchestrator::RetentionConfig {
            events_ttl: Duration::from_secs(self.retention_events_ttl_days * 24 * 60 * 60),
            max_stream_length: self.retention_max_stream_length,
            agent_inactive: Duration::from_secs(self.retention_agent_inactive_days * 24 * 60 * 60),
            ..Default::default()
        }
    }

    pub fn orchestrator_config(&self) -> orchestrator::OrchestratorConfig {
        orchestrator::OrchestratorConfig {
            max_context_tokens: self.max_context_size,
            max_inflight_webhooks: self.max_inflight_webhooks,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_inflight_webhooks() -> usize {
    64
}

fn default_max_matches() -> usize {
    20
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_vector_boost() -> f32 {
    1.0
}

fn default_embedding_cache_ttl_secs() -> u64 {
    3600
}

fn default_retention_events_ttl_days() -> u64 {
    30
}

fn default_retention_agent_inactive_days() -> u64 {
    7
}

fn default_retention_max_stream_length() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert_eq!(cfg.rate_limit_per_minute, 100);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.hybrid_search_enabled);
        assert_eq!(cfg.max_matches, 20);
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_matcher_config_mirrors_server_config() {
        let cfg = ServerConfig {
            similarity_threshold: 0.4,
            max_matches: 5,
            ..ServerConfig::default()
        };
        let matcher_cfg = cfg.matcher_config();
        assert_eq!(matcher_cfg.similarity_threshold, 0.4);
        assert_eq!(matcher_cfg.max_matches, 5);
    }
}
