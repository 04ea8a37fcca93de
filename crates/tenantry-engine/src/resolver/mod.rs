//! Layered module resolution: Bootstrap, Shared, and per-tenant tiers.
//!
//! Tiers compose by explicit delegation (Tenant -> Shared -> Bootstrap) with
//! no back-references. Every module carries the origin of the root that
//! supplied its bytes, tagged with the resolving tier.

pub mod archive;
pub mod bootstrap;
pub mod cache;
pub mod shared;
pub mod source;
pub mod tenant;
pub mod vfs;

use std::sync::Arc;

use bytes::Bytes;
use tenantry_core::error::{Result, TrustError};
use tenantry_core::{ModuleOrigin, TrustTier};

use crate::obs::EngineMetrics;

pub use archive::ArchiveRoot;
pub use bootstrap::{BootstrapResolver, ENGINE_NAMESPACE};
pub use cache::ModuleCache;
pub use shared::SharedResolver;
pub use source::{
    module_path, open_root, Backing, DirectoryRoot, ResourceHandle, RootKind, SourceRoot,
    PROTOCOL_FILE, PROTOCOL_VFS,
};
pub use tenant::{create_tenant_resolver, TenantResolver};
pub use vfs::{MemoryVfs, VirtualFs};

/// A loaded module. Shared by reference once cached.
#[derive(Debug)]
pub struct ResolvedModule {
    pub name: String,
    pub origin: Arc<ModuleOrigin>,
    pub bytes: Bytes,
}

/// One resolver tier.
pub trait ModuleResolver: Send + Sync {
    fn tier(&self) -> TrustTier;

    /// Resolve a fully qualified module name (`a.b.Foo`).
    fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>>;

    /// First match for a `/`-separated resource path.
    fn resolve_resource(&self, path: &str) -> Option<ResourceHandle>;

    /// Every match for a resource path, in tier order.
    fn list_resources(&self, path: &str) -> Vec<ResourceHandle>;
}

/// A root paired with the origin its modules receive.
#[derive(Debug, Clone)]
pub(crate) struct TierRoot {
    pub(crate) root: Arc<dyn SourceRoot>,
    pub(crate) origin: Arc<ModuleOrigin>,
}

impl TierRoot {
    pub(crate) fn new(root: Arc<dyn SourceRoot>, tier: TrustTier) -> Self {
        let origin = Arc::new(ModuleOrigin {
            code_source: Some(root.code_source().clone()),
            trust_tier: tier,
        });
        Self { root, origin }
    }
}

/// First root (registration order) holding `name`'s bytes.
pub(crate) fn load_from_roots(
    name: &str,
    roots: &[TierRoot],
    tier: &TrustTier,
    metrics: &EngineMetrics,
) -> Result<Arc<ResolvedModule>> {
    let labels = [("tier", tier.label())];
    let Some(path) = module_path(name) else {
        metrics.resolution_misses.inc(&labels);
        return Err(TrustError::NotFound(name.to_string()));
    };

    for r in roots {
        if let Some(handle) = r.root.locate(&path) {
            metrics.module_loads.inc(&labels);
            tracing::debug!(%name, %tier, root = r.root.id(), "module loaded");
            return Ok(Arc::new(ResolvedModule {
                name: name.to_string(),
                origin: Arc::clone(&r.origin),
                bytes: handle.data,
            }));
        }
    }

    metrics.resolution_misses.inc(&labels);
    Err(TrustError::NotFound(name.to_string()))
}
