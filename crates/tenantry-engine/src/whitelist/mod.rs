//! Whitelist layer: which module and resource names a tenant tier must
//! delegate upward instead of resolving from its own roots.

pub mod parser;
pub mod validator;

pub use validator::{WhitelistValidator, METADATA_PREFIX, TRUSTED_LIBRARY_PREFIX};

use tenantry_core::ParseError;

/// Parse whitelist source text (`packages { .. }` / `classes { .. }` blocks).
pub fn load_whitelist(src: &str) -> Result<WhitelistValidator, ParseError> {
    parser::parse(src)
}
