//! Tenant tier: one resolver per tenant over the tenant's own roots.
//!
//! Whitelisted and engine-reserved names always go to the Shared tier and
//! never fall back to tenant roots; everything else comes only from tenant
//! roots and never falls back to Shared.

use std::sync::Arc;

use tenantry_core::error::{Result, TrustError};
use tenantry_core::TrustTier;

use super::cache::ModuleCache;
use super::shared::SharedResolver;
use super::source::SourceRoot;
use super::{load_from_roots, ModuleResolver, ResolvedModule, ResourceHandle, TierRoot};
use crate::whitelist::WhitelistValidator;

#[derive(Debug)]
pub struct TenantResolver {
    tenant_id: String,
    tier: TrustTier,
    whitelist: Arc<WhitelistValidator>,
    shared: Arc<SharedResolver>,
    roots: Vec<TierRoot>,
    secondary_prefixes: Vec<String>,
    cache: ModuleCache,
}

/// Build the resolver for `tenant_id` over `roots` (lookup order).
pub fn create_tenant_resolver(
    whitelist: Arc<WhitelistValidator>,
    shared: Arc<SharedResolver>,
    roots: Vec<Arc<dyn SourceRoot>>,
    tenant_id: &str,
) -> TenantResolver {
    let tier = TrustTier::Tenant(tenant_id.to_string());
    let roots: Vec<TierRoot> = roots
        .into_iter()
        .map(|r| TierRoot::new(r, tier.clone()))
        .collect();
    tracing::info!(tenant = %tenant_id, roots = roots.len(), "tenant resolver built");
    TenantResolver {
        tenant_id: tenant_id.to_string(),
        tier,
        whitelist,
        shared,
        roots,
        secondary_prefixes: Vec::new(),
        cache: ModuleCache::new(),
    }
}

impl TenantResolver {
    /// Resource prefixes that fall back to the Shared tier after tenant roots
    /// miss.
    pub fn with_secondary_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.secondary_prefixes = prefixes;
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn shared(&self) -> &Arc<SharedResolver> {
        &self.shared
    }

    pub fn cached(&self, name: &str) -> Option<Arc<ResolvedModule>> {
        self.cache.get(name)
    }

    fn is_delegated(&self, name: &str) -> bool {
        self.shared.bootstrap().is_reserved(name) || self.whitelist.is_accepted(name)
    }

    fn is_secondary(&self, path: &str) -> bool {
        self.secondary_prefixes
            .iter()
            .any(|p| path.starts_with(p.as_str()))
    }

    fn local_resource(&self, path: &str) -> Option<ResourceHandle> {
        self.roots.iter().find_map(|r| r.root.locate(path))
    }

    /// Delegated names must never carry a tenant origin, and tenant-resolved
    /// names must carry this tenant's. A violation is `TrustError::Conflict`.
    pub fn check_isolation(&self, name: &str, module: &ResolvedModule) -> Result<()> {
        let tier = &module.origin.trust_tier;
        let breach = if self.is_delegated(name) {
            matches!(tier, TrustTier::Tenant(_))
        } else {
            *tier != self.tier
        };
        if breach {
            tracing::error!(
                tenant = %self.tenant_id(),
                %name,
                origin = %module.origin,
                "isolation breach: module resolved from the wrong tier"
            );
            return Err(TrustError::Conflict {
                name: name.to_string(),
                tenant: self.tenant_id().to_string(),
            });
        }
        Ok(())
    }
}

impl ModuleResolver for TenantResolver {
    fn tier(&self) -> TrustTier {
        self.tier.clone()
    }

    fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>> {
        let module = if self.is_delegated(name) {
            tracing::debug!(tenant = %self.tenant_id(), %name, "delegating to shared tier");
            self.shared.resolve(name)?
        } else {
            self.cache.get_or_resolve(name, || {
                load_from_roots(name, &self.roots, &self.tier, self.shared.metrics())
            })?
        };
        self.check_isolation(name, &module)?;
        Ok(module)
    }

    fn resolve_resource(&self, path: &str) -> Option<ResourceHandle> {
        if self.shared.bootstrap().is_reserved_resource(path) {
            return None;
        }
        if self.whitelist.is_allowed_resource(path) {
            if let Some(h) = self.shared.resolve_resource(path) {
                return Some(h);
            }
        }
        if let Some(h) = self.local_resource(path) {
            return Some(h);
        }
        if self.is_secondary(path) {
            return self.shared.resolve_resource(path);
        }
        None
    }

    fn list_resources(&self, path: &str) -> Vec<ResourceHandle> {
        if self.shared.bootstrap().is_reserved_resource(path) {
            return Vec::new();
        }
        let mut out = Vec::new();
        if self.whitelist.is_allowed_resource(path) {
            out.extend(self.shared.list_resources(path));
        }
        out.extend(self.roots.iter().filter_map(|r| r.root.locate(path)));
        if self.is_secondary(path) {
            out.extend(self.shared.list_resources(path));
        }
        out
    }
}
