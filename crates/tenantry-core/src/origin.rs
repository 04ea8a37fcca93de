//! Trust tiers and module origins.

use std::fmt;

/// Which tier of code supplied a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrustTier {
    /// Built into the host process (the trust engine itself).
    Bootstrap,
    /// Platform libraries shared by every tenant.
    Shared,
    /// A tenant's uploaded code.
    Tenant(String),
}

impl TrustTier {
    /// Bootstrap and Shared code may elevate through a privileged entry.
    pub fn is_trusted(&self) -> bool {
        matches!(self, TrustTier::Bootstrap | TrustTier::Shared)
    }

    /// Low-cardinality label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TrustTier::Bootstrap => "bootstrap",
            TrustTier::Shared => "shared",
            TrustTier::Tenant(_) => "tenant",
        }
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustTier::Tenant(id) => write!(f, "tenant:{id}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Where a module was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodeSource {
    pub protocol: String,
    pub location: String,
}

impl CodeSource {
    pub fn new(protocol: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for CodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.protocol, self.location)
    }
}

/// Identity attached once to every loaded module and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleOrigin {
    /// `None` for code with no determinable origin (bootstrap).
    pub code_source: Option<CodeSource>,
    pub trust_tier: TrustTier,
}

impl ModuleOrigin {
    pub fn new(
        protocol: impl Into<String>,
        location: impl Into<String>,
        trust_tier: TrustTier,
    ) -> Self {
        Self {
            code_source: Some(CodeSource::new(protocol, location)),
            trust_tier,
        }
    }

    pub fn bootstrap() -> Self {
        Self {
            code_source: None,
            trust_tier: TrustTier::Bootstrap,
        }
    }

    pub fn shared(protocol: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new(protocol, location, TrustTier::Shared)
    }

    pub fn tenant(
        tenant_id: impl Into<String>,
        protocol: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self::new(protocol, location, TrustTier::Tenant(tenant_id.into()))
    }
}

impl fmt::Display for ModuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code_source {
            Some(cs) => write!(f, "{cs} ({})", self.trust_tier),
            None => write!(f, "<no code source> ({})", self.trust_tier),
        }
    }
}
