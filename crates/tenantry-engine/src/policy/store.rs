//! Immutable policy store: ordered code-source rules plus named grants.
//!
//! Built once at startup and shared read-only; lookups take no locks.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use tenantry_core::error::{Result, TrustError};
use tenantry_core::{CodeSource, ConfigSource, ParseError, TargetPattern};

use super::grant::Grant;
use super::vars::PolicyEnvironment;

/// Baseline grant for code matching no rule.
pub const USER_GRANT: &str = "USER";
/// Grant for origin-less code.
pub const SYSTEM_GRANT: &str = "SYSTEM";

/// One `protocol pattern ;` line of a `define codesource` block.
#[derive(Debug, Clone)]
pub struct CodeSourceRule {
    pub protocol: String,
    pub location: TargetPattern,
    pub grant: String,
    /// Source line, kept for load-time diagnostics.
    pub line: usize,
}

impl CodeSourceRule {
    pub fn matches(&self, protocol: &str, location: &str) -> bool {
        self.protocol == protocol && self.location.matches(location, '/')
    }
}

#[derive(Debug)]
pub struct PolicyStore {
    rules: Vec<(CodeSourceRule, Arc<Grant>)>,
    grants: HashMap<String, Arc<Grant>>,
    user: Arc<Grant>,
    system: Arc<Grant>,
}

impl PolicyStore {
    /// Resolve rule targets and check the mandatory grants exist.
    pub(crate) fn assemble(
        rules: Vec<CodeSourceRule>,
        grants: HashMap<String, Grant>,
        last_line: usize,
    ) -> std::result::Result<Self, ParseError> {
        let grants: HashMap<String, Arc<Grant>> =
            grants.into_iter().map(|(k, g)| (k, Arc::new(g))).collect();

        let mut resolved = Vec::with_capacity(rules.len());
        for rule in rules {
            let grant = grants.get(&rule.grant).cloned().ok_or_else(|| {
                ParseError::new(
                    ConfigSource::Policy,
                    rule.line,
                    format!("code source rule names undefined grant '{}'", rule.grant),
                )
            })?;
            resolved.push((rule, grant));
        }

        let required = |name: &str| {
            grants.get(name).cloned().ok_or_else(|| {
                ParseError::new(
                    ConfigSource::Policy,
                    last_line,
                    format!("grant '{name}' must be defined"),
                )
            })
        };
        let user = required(USER_GRANT)?;
        let system = required(SYSTEM_GRANT)?;

        Ok(Self {
            rules: resolved,
            grants,
            user,
            system,
        })
    }

    pub fn load_from_file(path: &str, env: &PolicyEnvironment) -> Result<Self> {
        let src = fs::read_to_string(path)
            .map_err(|e| TrustError::Io(format!("read policy failed ({path}): {e}")))?;
        Ok(super::load_policy(&src, env)?)
    }

    /// First rule in registration order wins; no match means `USER`.
    pub fn match_grant(&self, protocol: &str, location: &str) -> &Grant {
        match self.rules.iter().find(|(r, _)| r.matches(protocol, location)) {
            Some((_, grant)) => grant.as_ref(),
            None => {
                tracing::debug!(%protocol, %location, "no code source rule matched; using USER");
                self.user.as_ref()
            }
        }
    }

    /// Grant for a module origin; `None` (origin-less code) maps to `SYSTEM`.
    pub fn grant_for(&self, code_source: Option<&CodeSource>) -> &Grant {
        match code_source {
            Some(cs) => self.match_grant(&cs.protocol, &cs.location),
            None => self.system.as_ref(),
        }
    }

    pub fn grant(&self, name: &str) -> Option<&Grant> {
        self.grants.get(name).map(Arc::as_ref)
    }

    pub fn user_grant(&self) -> &Grant {
        &self.user
    }

    pub fn system_grant(&self) -> &Grant {
        &self.system
    }

    pub fn rules(&self) -> impl Iterator<Item = &CodeSourceRule> {
        self.rules.iter().map(|(r, _)| r)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }
}
