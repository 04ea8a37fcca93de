//! Shared host state: everything built once at startup and read afterwards.
//!
//! Startup is all-or-nothing. Any policy, whitelist, or root error is
//! returned to the caller; no partially configured state is ever produced.

use std::collections::HashMap;
use std::sync::Arc;

use tenantry_core::error::Result;

use crate::config::HostConfig;
use crate::context::TenantContext;
use crate::enforce::EnforcementContext;
use crate::obs::EngineMetrics;
use crate::policy::{load_policy, PolicyStore};
use crate::resolver::{
    create_tenant_resolver, open_root, BootstrapResolver, SharedResolver, SourceRoot,
    TenantResolver, VirtualFs,
};
use crate::whitelist::{load_whitelist, WhitelistValidator};

#[derive(Debug, Clone)]
pub struct HostState {
    inner: Arc<HostStateInner>,
}

#[derive(Debug)]
struct HostStateInner {
    cfg: HostConfig,
    whitelist: Arc<WhitelistValidator>,
    enforcement: Arc<EnforcementContext>,
    shared: Arc<SharedResolver>,
    tenants: HashMap<String, Arc<TenantResolver>>,
    metrics: Arc<EngineMetrics>,
}

impl HostState {
    /// Load the policy and whitelist files named by `cfg` and build every tier.
    pub fn new(cfg: HostConfig, vfs: Option<Arc<dyn VirtualFs>>) -> Result<Self> {
        let whitelist = WhitelistValidator::load_from_file(&cfg.whitelist_file)?;
        let policy = PolicyStore::load_from_file(&cfg.policy_file, &cfg.paths.to_environment())?;
        let bootstrap = BootstrapResolver::new(cfg.bootstrap.reserved_prefixes.clone());
        Self::assemble(cfg, policy, whitelist, bootstrap, vfs)
    }

    /// Like [`new`](Self::new), with policy and whitelist given as text.
    pub fn from_sources(
        cfg: HostConfig,
        policy_src: &str,
        whitelist_src: &str,
        vfs: Option<Arc<dyn VirtualFs>>,
    ) -> Result<Self> {
        let whitelist = load_whitelist(whitelist_src)?;
        let policy = load_policy(policy_src, &cfg.paths.to_environment())?;
        let bootstrap = BootstrapResolver::new(cfg.bootstrap.reserved_prefixes.clone());
        Self::assemble(cfg, policy, whitelist, bootstrap, vfs)
    }

    /// Wire already-loaded parts; `bootstrap` carries the host's built-in
    /// modules.
    pub fn assemble(
        cfg: HostConfig,
        policy: PolicyStore,
        whitelist: WhitelistValidator,
        bootstrap: BootstrapResolver,
        vfs: Option<Arc<dyn VirtualFs>>,
    ) -> Result<Self> {
        let metrics = Arc::new(EngineMetrics::default());
        let enforcement = Arc::new(
            EnforcementContext::new(Arc::new(policy)).with_metrics(Arc::clone(&metrics)),
        );
        let whitelist = Arc::new(whitelist);
        tracing::info!(
            packages = whitelist.package_count(),
            names = whitelist.name_count(),
            "whitelist loaded"
        );

        let mut shared = SharedResolver::new(Arc::new(bootstrap)).with_metrics(Arc::clone(&metrics));
        for r in &cfg.shared.roots {
            shared.add_root(open_root(&r.protocol, &r.location, vfs.as_ref())?);
        }
        let shared = Arc::new(shared);

        let mut tenants = HashMap::new();
        for t in &cfg.tenants {
            let roots = t
                .roots
                .iter()
                .map(|r| open_root(&r.protocol, &r.location, vfs.as_ref()))
                .collect::<Result<Vec<Arc<dyn SourceRoot>>>>()?;
            let resolver =
                create_tenant_resolver(Arc::clone(&whitelist), Arc::clone(&shared), roots, &t.id)
                    .with_secondary_prefixes(cfg.resources.secondary_prefixes.clone());
            tenants.insert(t.id.clone(), Arc::new(resolver));
        }

        tracing::info!(
            shared_roots = shared.root_count(),
            tenants = tenants.len(),
            "host state ready"
        );

        Ok(Self {
            inner: Arc::new(HostStateInner {
                cfg,
                whitelist,
                enforcement,
                shared,
                tenants,
                metrics,
            }),
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.inner.cfg
    }

    pub fn whitelist(&self) -> &Arc<WhitelistValidator> {
        &self.inner.whitelist
    }

    pub fn enforcement(&self) -> &Arc<EnforcementContext> {
        &self.inner.enforcement
    }

    pub fn shared(&self) -> &Arc<SharedResolver> {
        &self.inner.shared
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.inner.metrics
    }

    pub fn tenant(&self, tenant_id: &str) -> Option<TenantContext> {
        self.inner.tenants.get(tenant_id).map(|r| {
            TenantContext::new(Arc::clone(r), Arc::clone(&self.inner.enforcement))
        })
    }

    pub fn tenant_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.inner.tenants.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn render_metrics(&self) -> String {
        self.inner.metrics.render()
    }
}
