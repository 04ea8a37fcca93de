//! tenantry-host: load host config, policy, and whitelist, build every
//! resolver tier, and report. Any startup error exits non-zero.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use tenantry_core::error::Result;
use tenantry_engine::{config, host_state::HostState};

const DEFAULT_CONFIG: &str = "tenantry.yaml";

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());

    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(class = e.class().as_str(), error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<()> {
    let cfg = config::load_from_file(path)?;
    // No virtual filesystem is attached here; vfs roots fail at startup.
    let state = HostState::new(cfg, None)?;

    let policy = state.enforcement().policy();
    tracing::info!(
        config = %path,
        rules = policy.rule_count(),
        grants = policy.grant_count(),
        tenants = ?state.tenant_ids(),
        "tenantry-host ready"
    );
    Ok(())
}
