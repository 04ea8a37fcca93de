//! Shared tier: platform libraries visible to every tenant.

use std::sync::Arc;

use tenantry_core::error::Result;
use tenantry_core::TrustTier;

use super::bootstrap::BootstrapResolver;
use super::cache::ModuleCache;
use super::source::SourceRoot;
use super::{load_from_roots, ModuleResolver, ResolvedModule, ResourceHandle, TierRoot};
use crate::obs::EngineMetrics;

/// Ordered roots, first hit wins. A module present in two roots is served
/// from the earlier-registered one; the later copy is shadowed silently.
#[derive(Debug)]
pub struct SharedResolver {
    bootstrap: Arc<BootstrapResolver>,
    roots: Vec<TierRoot>,
    cache: ModuleCache,
    metrics: Arc<EngineMetrics>,
}

impl SharedResolver {
    pub fn new(bootstrap: Arc<BootstrapResolver>) -> Self {
        Self {
            bootstrap,
            roots: Vec::new(),
            cache: ModuleCache::new(),
            metrics: Arc::new(EngineMetrics::default()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Append a root. Registration order is lookup order.
    pub fn add_root(&mut self, root: Arc<dyn SourceRoot>) {
        tracing::debug!(root = root.id(), "shared root registered");
        self.roots.push(TierRoot::new(root, TrustTier::Shared));
    }

    pub fn bootstrap(&self) -> &Arc<BootstrapResolver> {
        &self.bootstrap
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Cached module, if `name` was resolved before.
    pub fn cached(&self, name: &str) -> Option<Arc<ResolvedModule>> {
        self.cache.get(name)
    }
}

impl ModuleResolver for SharedResolver {
    fn tier(&self) -> TrustTier {
        TrustTier::Shared
    }

    fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>> {
        if self.bootstrap.is_reserved(name) {
            return self.bootstrap.resolve(name);
        }
        self.cache.get_or_resolve(name, || {
            load_from_roots(name, &self.roots, &TrustTier::Shared, &self.metrics)
        })
    }

    fn resolve_resource(&self, path: &str) -> Option<ResourceHandle> {
        if self.bootstrap.is_reserved_resource(path) {
            return None;
        }
        self.roots.iter().find_map(|r| r.root.locate(path))
    }

    fn list_resources(&self, path: &str) -> Vec<ResourceHandle> {
        if self.bootstrap.is_reserved_resource(path) {
            return Vec::new();
        }
        self.roots.iter().filter_map(|r| r.root.locate(path)).collect()
    }
}
