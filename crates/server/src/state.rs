use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dispatcher::Dispatcher;
use eventlog::EventLog;
use index::VectorIndex;
use lexical::LexicalIndex;
use matcher::Matcher;
use orchestrator::{Orchestrator, RetentionSweeper};
use registry::SubscriptionRegistry;
use semantic::{EmbeddingCache, Embedder, SemanticConfig};

use crate::collaborators::{Authorizer, NoopAuthorizer, NoopQuotaGuard, QuotaGuard, SingleTenantResolver, TenantResolver};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared application state: the wired-up Pipeline Orchestrator plus the
/// HTTP-edge concerns (auth, rate limiting) the core never sees.
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// The Pipeline Orchestrator: ingest, match, dispatch, wired together.
    pub orchestrator: Arc<Orchestrator>,

    /// Background retention sweeper handle, kept so it can be aborted on
    /// shutdown; `None` when retention sweeping was never started.
    pub retention: Arc<RetentionSweeper>,

    /// RBAC collaborator consulted before any core operation. Defaults to
    /// [`NoopAuthorizer`]; a real deployment supplies its own.
    pub authorizer: Arc<dyn Authorizer>,

    /// Quota collaborator consulted before publish/register. Defaults to
    /// [`NoopQuotaGuard`].
    pub quota: Arc<dyn QuotaGuard>,

    /// Resolves the tenant namespace a project id belongs to, for the quota
    /// check. Defaults to [`SingleTenantResolver`].
    pub tenants: Arc<dyn TenantResolver>,
}

impl ServerState {
    /// Create new server state: an in-memory vector/lexical index, a fast
    /// stub embedder (swap `SemanticConfig` for an ONNX/API tier in
    /// production), and every other core collaborator wired from
    /// `config`'s knobs.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let embedder = Embedder::new(SemanticConfig::default());
        let cache = EmbeddingCache::new(Duration::from_secs(config.embedding_cache_ttl_secs));
        let matcher = Arc::new(Matcher::new(
            VectorIndex::in_memory(),
            LexicalIndex::new(),
            embedder,
            cache,
            config.matcher_config(),
        ));

        let eventlog = Arc::new(EventLog::new());
        let registry = Arc::new(SubscriptionRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new());

        let orchestrator = Arc::new(Orchestrator::new(
            matcher,
            eventlog.clone(),
            registry.clone(),
            dispatcher,
            config.orchestrator_config(),
        ));

        let retention = Arc::new(RetentionSweeper::new(eventlog, registry, config.retention_config()));

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            orchestrator,
            retention,
            authorizer: Arc::new(NoopAuthorizer),
            quota: Arc::new(NoopQuotaGuard),
            tenants: Arc::new(SingleTenantResolver),
        })
    }

    /// Core spec §6 boundary contract: an RBAC verdict and a quota check are
    /// both consulted before any state-mutating core operation (publish,
    /// register), never influencing core logic itself.
    pub fn enforce_boundary(&self, api_key: &str, project_id: &str) -> ServerResult<()> {
        self.enforce_authz(api_key, project_id)?;
        let tenant = self.tenants.tenant_of(project_id);
        if !self.quota.within_quota(&tenant) {
            return Err(ServerError::QuotaExceeded);
        }
        Ok(())
    }

    /// RBAC-only check, for read endpoints that don't consume quota.
    pub fn enforce_authz(&self, api_key: &str, project_id: &str) -> ServerResult<()> {
        if !self.authorizer.allowed(api_key, project_id) {
            return Err(ServerError::Forbidden);
        }
        Ok(())
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        // Check limit
        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
