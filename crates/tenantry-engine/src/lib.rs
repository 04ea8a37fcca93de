//! tenantry engine library entry.
//!
//! This crate wires the whitelist, policy store, enforcement engine, and
//! layered module resolvers into the trust core a hosting layer consumes. It
//! is intended to be used by the `tenantry-host` binary (`main.rs`) and by
//! integration tests.

pub mod config;
pub mod context;
pub mod enforce;
pub mod host_state;
pub mod obs;
pub mod policy;
pub mod resolver;
pub mod whitelist;

pub use enforce::{Decision, EnforcementContext, FrameGuard, FrameKind};
pub use policy::{load_policy, PolicyEnvironment, PolicyStore};
pub use resolver::{create_tenant_resolver, ModuleResolver, ResolvedModule};
pub use whitelist::{load_whitelist, WhitelistValidator};
