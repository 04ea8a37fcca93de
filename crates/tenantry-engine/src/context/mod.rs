//! Per-tenant execution context.

pub mod tenant;

pub use tenant::{resolve_tenant, TenantContext};
