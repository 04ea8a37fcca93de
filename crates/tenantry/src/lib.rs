//! tenantry facade crate.
//!
//! Re-exports the core primitives and the engine so hosting layers depend on
//! a single crate.

pub mod core {
    pub use tenantry_core::*;
}

pub mod engine {
    pub use tenantry_engine::*;
}
