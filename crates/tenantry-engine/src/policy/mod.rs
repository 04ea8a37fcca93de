//! Policy layer: code-source rules, named grants, and the grant language.

pub mod grant;
pub mod parser;
pub mod store;
pub mod vars;

pub use grant::Grant;
pub use store::{CodeSourceRule, PolicyStore, SYSTEM_GRANT, USER_GRANT};
pub use vars::PolicyEnvironment;

use tenantry_core::ParseError;

/// Parse policy source text into an immutable store.
///
/// Any malformed statement aborts the whole load; no partial store is ever
/// returned.
pub fn load_policy(src: &str, env: &PolicyEnvironment) -> Result<PolicyStore, ParseError> {
    parser::parse(src, env)
}
