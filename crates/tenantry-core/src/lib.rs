//! tenantry core: transport-agnostic trust primitives, error types, and the
//! tokenizer shared by the policy and whitelist languages.
//!
//! This crate defines the vocabulary the engine speaks: capability kinds and
//! permission entries with their three target match forms, trust tiers and
//! module origins, and the error surface handed to the hosting layer. It
//! carries no I/O and no runtime dependencies so it can be reused by host
//! tooling and tests alike.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed policy text surfaces as `ParseError`, never as a crash.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod capability;
pub mod error;
pub mod grammar;
pub mod origin;

/// Shared result type.
pub use error::{Result, TrustError};

pub use capability::{CapabilityKind, CapabilityRequest, PermissionEntry, TargetPattern};
pub use error::{ConfigSource, Denial, ErrorClass, ParseError};
pub use origin::{CodeSource, ModuleOrigin, TrustTier};
