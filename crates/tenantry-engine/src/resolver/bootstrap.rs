//! Bootstrap tier: modules built into the host process.
//!
//! Names under a reserved prefix resolve here and nowhere else, so no tenant
//! or shared root can shadow the trust engine's own modules.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tenantry_core::error::{Result, TrustError};
use tenantry_core::{ModuleOrigin, TrustTier};

use super::{ModuleResolver, ResolvedModule, ResourceHandle};

/// Namespace of the engine's own modules.
pub const ENGINE_NAMESPACE: &str = "tenantry.";

#[derive(Debug)]
pub struct BootstrapResolver {
    reserved: Vec<String>,
    reserved_resources: Vec<String>,
    modules: HashMap<String, Arc<ResolvedModule>>,
    origin: Arc<ModuleOrigin>,
}

impl BootstrapResolver {
    pub fn new(reserved_prefixes: impl IntoIterator<Item = String>) -> Self {
        let reserved: Vec<String> = reserved_prefixes.into_iter().collect();
        let reserved_resources = reserved.iter().map(|p| p.replace('.', "/")).collect();
        Self {
            reserved,
            reserved_resources,
            modules: HashMap::new(),
            origin: Arc::new(ModuleOrigin::bootstrap()),
        }
    }

    /// Register a built-in module. Startup only.
    pub fn register(&mut self, name: impl Into<String>, bytes: impl Into<Bytes>) {
        let name = name.into();
        let module = Arc::new(ResolvedModule {
            name: name.clone(),
            origin: Arc::clone(&self.origin),
            bytes: bytes.into(),
        });
        self.modules.insert(name, module);
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|p| name.starts_with(p.as_str()))
    }

    pub fn is_reserved_resource(&self, path: &str) -> bool {
        self.reserved_resources
            .iter()
            .any(|p| path.starts_with(p.as_str()))
    }

    pub fn origin(&self) -> &Arc<ModuleOrigin> {
        &self.origin
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl ModuleResolver for BootstrapResolver {
    fn tier(&self) -> TrustTier {
        TrustTier::Bootstrap
    }

    fn resolve(&self, name: &str) -> Result<Arc<ResolvedModule>> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| TrustError::NotFound(name.to_string()))
    }

    fn resolve_resource(&self, _path: &str) -> Option<ResourceHandle> {
        None
    }

    fn list_resources(&self, _path: &str) -> Vec<ResourceHandle> {
        Vec::new()
    }
}
