//! Whitelist lookups.
//!
//! A name is whitelisted when it starts with the trusted library prefix, is
//! listed exactly, or its *immediate* parent namespace is a listed package.
//! Packages never imply their sub-packages: `a.b` accepts `a.b.Foo` but not
//! `a.b.c.Bar`.

use std::collections::HashSet;
use std::fs;

use tenantry_core::error::{Result, TrustError};

/// Trusted library namespace, always delegated upward.
pub const TRUSTED_LIBRARY_PREFIX: &str = "platform.taglib.";

/// Resource form of [`TRUSTED_LIBRARY_PREFIX`].
pub const TRUSTED_LIBRARY_RESOURCE_PREFIX: &str = "platform/taglib/";

/// Metadata resources are always resolved from the shared tier.
pub const METADATA_PREFIX: &str = "META-INF/";

/// Immutable after load; shared by every tenant resolver.
#[derive(Debug, Clone, Default)]
pub struct WhitelistValidator {
    packages: HashSet<String>,
    names: HashSet<String>,
}

impl WhitelistValidator {
    pub fn new(
        packages: impl IntoIterator<Item = String>,
        names: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            packages: packages.into_iter().collect(),
            names: names.into_iter().collect(),
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let src = fs::read_to_string(path)
            .map_err(|e| TrustError::Io(format!("read whitelist failed ({path}): {e}")))?;
        Ok(super::load_whitelist(&src)?)
    }

    /// Whether a fully qualified module name must come from the shared tier.
    pub fn is_accepted(&self, name: &str) -> bool {
        if name.starts_with(TRUSTED_LIBRARY_PREFIX) || self.names.contains(name) {
            return true;
        }
        let parent = name.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
        self.packages.contains(parent)
    }

    /// Resource variant of [`is_accepted`](Self::is_accepted), keyed on the
    /// `/`-separated parent directory of `path`.
    pub fn is_allowed_resource(&self, path: &str) -> bool {
        if path.starts_with(METADATA_PREFIX) || path.starts_with(TRUSTED_LIBRARY_RESOURCE_PREFIX) {
            return true;
        }
        let dir = path.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
        self.packages.contains(dir.replace('/', ".").as_str())
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}
