#![allow(dead_code)]

use std::sync::Arc;

use tenantry_core::ModuleOrigin;
use tenantry_engine::policy::{load_policy, PolicyEnvironment, PolicyStore};

/// Baseline policy shared by the enforcement and host tests.
pub const POLICY: &str = r#"
// code sources, first match wins
define codesource SHARED {
    file "/opt/shared/-" ;
    vfs "/opt/shared/-" ;
}
define codesource TENANT_ACME {
    vfs "/acme/-" ;
}

grant USER {
    permission Property "app.*", "read" ;
    permission Runtime "getName" ;
}

grant SYSTEM {
    permission All "*" ;
}

grant SHARED {
    permission FileAccess "/opt/shared/-", "read" ;
    permission NetworkAccess "db.internal:5432", "connect" ;
    inherit USER ;
}

grant TENANT_ACME {
    permission FileAccess "/data/acme/-", "read,write" ;
    inherit USER ;
}
"#;

pub const WHITELIST: &str = r#"
packages { "a.b", "platform.io" }
classes { "x.y.Z" }
"#;

pub fn policy() -> Arc<PolicyStore> {
    Arc::new(load_policy(POLICY, &PolicyEnvironment::new()).expect("fixture policy parses"))
}

pub fn shared_origin(location: &str) -> Arc<ModuleOrigin> {
    Arc::new(ModuleOrigin::shared("file", location))
}

pub fn tenant_origin(tenant: &str, location: &str) -> Arc<ModuleOrigin> {
    Arc::new(ModuleOrigin::tenant(tenant, "vfs", location))
}

pub fn bootstrap_origin() -> Arc<ModuleOrigin> {
    Arc::new(ModuleOrigin::bootstrap())
}
