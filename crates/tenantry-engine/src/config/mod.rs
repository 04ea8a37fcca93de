//! Host config loader (strict parsing).

pub mod schema;

use std::fs;

use tenantry_core::error::{Result, TrustError};

pub use schema::{
    BootstrapSection, HostConfig, PathsSection, ResourcesSection, RootConfig, SharedSection,
    TenantConfig,
};

pub fn load_from_file(path: &str) -> Result<HostConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TrustError::Io(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<HostConfig> {
    let cfg: HostConfig = serde_yaml::from_str(s)
        .map_err(|e| TrustError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
