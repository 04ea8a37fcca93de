use std::collections::HashSet;

use serde::Deserialize;
use tenantry_core::error::{Result, TrustError};

use crate::policy::PolicyEnvironment;
use crate::resolver::{PROTOCOL_FILE, PROTOCOL_VFS};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    pub version: u32,

    pub policy_file: String,
    pub whitelist_file: String,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub bootstrap: BootstrapSection,

    #[serde(default)]
    pub shared: SharedSection,

    #[serde(default)]
    pub resources: ResourcesSection,

    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TrustError::Config(format!(
                "unsupported config version {} (expected 1)",
                self.version
            )));
        }
        if self.tenants.is_empty() {
            return Err(TrustError::Config("tenants must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for t in &self.tenants {
            if t.id.trim().is_empty() {
                return Err(TrustError::Config("tenant id must not be empty".into()));
            }
            if !seen.insert(t.id.as_str()) {
                return Err(TrustError::Config(format!("duplicate tenant id: {}", t.id)));
            }
            for r in &t.roots {
                r.validate()?;
            }
        }

        self.bootstrap.validate()?;
        for r in &self.shared.roots {
            r.validate()?;
        }
        Ok(())
    }
}

/// Values for the fixed `${...}` path variables of the policy language.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub install: Option<String>,
    #[serde(default)]
    pub temp: Option<String>,
    #[serde(default)]
    pub runtime_home: Option<String>,
    #[serde(default)]
    pub extension_dirs: Vec<String>,
}

impl PathsSection {
    pub fn to_environment(&self) -> PolicyEnvironment {
        let mut env = PolicyEnvironment::new().with_extension_dirs(self.extension_dirs.clone());
        if let Some(v) = &self.base {
            env = env.with_platform_base(v.clone());
        }
        if let Some(v) = &self.install {
            env = env.with_platform_install(v.clone());
        }
        if let Some(v) = &self.temp {
            env = env.with_platform_temp(v.clone());
        }
        if let Some(v) = &self.runtime_home {
            env = env.with_runtime_home(v.clone());
        }
        env
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapSection {
    #[serde(default = "default_reserved_prefixes")]
    pub reserved_prefixes: Vec<String>,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        Self {
            reserved_prefixes: default_reserved_prefixes(),
        }
    }
}

impl BootstrapSection {
    pub fn validate(&self) -> Result<()> {
        if self.reserved_prefixes.iter().any(|p| p.is_empty()) {
            return Err(TrustError::Config(
                "bootstrap.reserved_prefixes entries must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedSection {
    #[serde(default)]
    pub roots: Vec<RootConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourcesSection {
    /// Resource prefixes served from Shared after tenant roots miss.
    #[serde(default)]
    pub secondary_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    pub protocol: String,
    pub location: String,
}

impl RootConfig {
    pub fn validate(&self) -> Result<()> {
        if self.protocol != PROTOCOL_FILE && self.protocol != PROTOCOL_VFS {
            return Err(TrustError::Config(format!(
                "root protocol must be file or vfs (got {})",
                self.protocol
            )));
        }
        if self.location.is_empty() {
            return Err(TrustError::Config("root location must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    pub id: String,

    #[serde(default)]
    pub roots: Vec<RootConfig>,
}

fn default_reserved_prefixes() -> Vec<String> {
    vec![crate::resolver::ENGINE_NAMESPACE.to_string()]
}
