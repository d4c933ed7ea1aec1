//! Narrow boundary traits a real deployment's auth/tenancy/quota stack wires
//! in. The core treats project as the only scope it understands; everything
//! here is consumed at the HTTP edge, before a request reaches the
//! [`orchestrator::Orchestrator`], and never influences core logic itself.
//!
//! This workspace ships permissive default implementations so the server is
//! usable standalone, with multi-tenant plumbing gated behind a trait a
//! real deployment swaps in rather than hard-wired.

/// Opaque caller identity attached to a request for audit context only.
pub trait Identity: Send + Sync {
    fn identity_of(&self, api_key: &str) -> String;
}

/// Resolves the tenant namespace a project id is scoped within.
pub trait TenantResolver: Send + Sync {
    fn tenant_of(&self, project_id: &str) -> String;
}

/// RBAC verdict, checked before any core operation runs.
pub trait Authorizer: Send + Sync {
    fn allowed(&self, api_key: &str, project_id: &str) -> bool;
}

/// Pre-publish/pre-register quota check. The core must not exceed whatever
/// this reports.
pub trait QuotaGuard: Send + Sync {
    fn within_quota(&self, tenant: &str) -> bool;
}

/// Treats the API key itself as the identity; sufficient for single-tenant
/// or library use, where there is no separate identity provider.
pub struct ApiKeyIdentity;

impl Identity for ApiKeyIdentity {
    fn identity_of(&self, api_key: &str) -> String {
        api_key.to_string()
    }
}

/// Every project belongs to one tenant: the deployment itself.
pub struct SingleTenantResolver;

impl TenantResolver for SingleTenantResolver {
    fn tenant_of(&self, _project_id: &str) -> String {
        "default".to_string()
    }
}

/// Allows every request whose API key is already valid; RBAC is left to a
/// real deployment's own authorizer.
pub struct NoopAuthorizer;

impl Authorizer for NoopAuthorizer {
    fn allowed(&self, _api_key: &str, _project_id: &str) -> bool {
        true
    }
}

/// Never rejects for quota; a real deployment supplies its own tenancy
/// collaborator.
pub struct NoopQuotaGuard;

impl QuotaGuard for NoopQuotaGuard {
    fn within_quota(&self, _tenant: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_collaborators_never_reject() {
        assert!(NoopAuthorizer.allowed("any-key", "any-project"));
        assert!(NoopQuotaGuard.within_quota("any-tenant"));
        assert_eq!(SingleTenantResolver.tenant_of("p"), "default");
        assert_eq!(ApiKeyIdentity.identity_of("k1"), "k1");
    }
}
