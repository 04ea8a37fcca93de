use std::sync::Arc;

use tenantry_core::error::{Result, TrustError};
use tenantry_core::CapabilityRequest;

use crate::enforce::{push_frame, Decision, EnforcementContext, FrameGuard, FrameKind};
use crate::host_state::HostState;
use crate::resolver::{ModuleResolver, ResolvedModule, TenantResolver};

/// Tenant resolver plus the shared enforcement context, handed to the
/// hosting layer for each unit of tenant work.
#[derive(Debug, Clone)]
pub struct TenantContext {
    resolver: Arc<TenantResolver>,
    enforcement: Arc<EnforcementContext>,
}

impl TenantContext {
    pub fn new(resolver: Arc<TenantResolver>, enforcement: Arc<EnforcementContext>) -> Self {
        Self {
            resolver,
            enforcement,
        }
    }

    pub fn tenant_id(&self) -> &str {
        self.resolver.tenant_id()
    }

    pub fn resolver(&self) -> &Arc<TenantResolver> {
        &self.resolver
    }

    pub fn enforcement(&self) -> &Arc<EnforcementContext> {
        &self.enforcement
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>> {
        self.resolver.resolve(name)
    }

    /// Push an `Ordinary` frame for a call into `module`.
    pub fn enter(&self, module: &ResolvedModule) -> FrameGuard {
        push_frame(Arc::clone(&module.origin), FrameKind::Ordinary)
    }

    /// Push a `PrivilegedEntry` frame; honored only for trusted tiers.
    pub fn enter_privileged(&self, module: &ResolvedModule) -> FrameGuard {
        push_frame(Arc::clone(&module.origin), FrameKind::PrivilegedEntry)
    }

    pub fn check(&self, req: &CapabilityRequest) -> Decision {
        self.enforcement.check_capability(req)
    }

    pub fn ensure(&self, req: &CapabilityRequest) -> Result<()> {
        self.enforcement.ensure(req)
    }
}

/// Tenant context or a not-found error for unknown tenants.
pub fn resolve_tenant(state: &HostState, tenant_id: &str) -> Result<TenantContext> {
    state
        .tenant(tenant_id)
        .ok_or_else(|| TrustError::NotFound(format!("unknown tenant: {tenant_id}")))
}
