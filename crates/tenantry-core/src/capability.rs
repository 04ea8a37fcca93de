//! Capability kinds, permission entries, and target matching.
//!
//! Targets support three match forms:
//! - exact: `"/etc/hosts"` matches only itself
//! - subtree: `"/opt/shared/-"` matches everything below `/opt/shared/`
//! - children: `"/opt/shared/*"` matches `/opt/shared/<x>` but not deeper
//!
//! The set of kinds is closed; policy text naming an unknown kind fails to
//! load rather than being constructed dynamically.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability types that can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    FileAccess,
    NetworkAccess,
    Runtime,
    Property,
    Platform,
    /// Implies every request.
    All,
}

impl CapabilityKind {
    pub const KINDS: [CapabilityKind; 6] = [
        CapabilityKind::FileAccess,
        CapabilityKind::NetworkAccess,
        CapabilityKind::Runtime,
        CapabilityKind::Property,
        CapabilityKind::Platform,
        CapabilityKind::All,
    ];

    /// Name used in policy text.
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKind::FileAccess => "FileAccess",
            CapabilityKind::NetworkAccess => "NetworkAccess",
            CapabilityKind::Runtime => "Runtime",
            CapabilityKind::Property => "Property",
            CapabilityKind::Platform => "Platform",
            CapabilityKind::All => "All",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::KINDS.into_iter().find(|k| k.as_str() == name)
    }

    /// Hierarchy separator used by the children (`*`) match form.
    pub fn separator(self) -> char {
        match self {
            CapabilityKind::FileAccess => '/',
            CapabilityKind::NetworkAccess => ':',
            _ => '.',
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiled target expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetPattern {
    Exact(String),
    /// Trailing `-`: the stored prefix and everything below it.
    Subtree(String),
    /// Trailing `*`: the stored prefix and its immediate children.
    Children(String),
}

impl TargetPattern {
    pub fn parse(raw: &str) -> Self {
        if let Some(prefix) = raw.strip_suffix('-') {
            TargetPattern::Subtree(prefix.to_string())
        } else if let Some(prefix) = raw.strip_suffix('*') {
            TargetPattern::Children(prefix.to_string())
        } else {
            TargetPattern::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, target: &str, sep: char) -> bool {
        match self {
            TargetPattern::Exact(e) => e == target,
            TargetPattern::Subtree(p) => target.starts_with(p.as_str()),
            TargetPattern::Children(p) => target
                .strip_prefix(p.as_str())
                .is_some_and(|rest| !rest.contains(sep)),
        }
    }

    /// Whether every target matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &TargetPattern, sep: char) -> bool {
        match (self, other) {
            (_, TargetPattern::Exact(t)) => self.matches(t, sep),
            (TargetPattern::Subtree(p), TargetPattern::Subtree(q))
            | (TargetPattern::Subtree(p), TargetPattern::Children(q)) => q.starts_with(p.as_str()),
            (TargetPattern::Children(p), TargetPattern::Children(q)) => p == q,
            _ => false,
        }
    }
}

impl fmt::Display for TargetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPattern::Exact(e) => f.write_str(e),
            TargetPattern::Subtree(p) => write!(f, "{p}-"),
            TargetPattern::Children(p) => write!(f, "{p}*"),
        }
    }
}

/// One granted capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionEntry {
    pub kind: CapabilityKind,
    pub target: TargetPattern,
    /// `None` grants every action.
    pub action: Option<String>,
}

impl PermissionEntry {
    pub fn new(kind: CapabilityKind, target: &str, action: Option<&str>) -> Self {
        Self {
            kind,
            target: TargetPattern::parse(target),
            action: action.map(str::to_string),
        }
    }

    pub fn implies(&self, req: &CapabilityRequest) -> bool {
        if self.kind == CapabilityKind::All {
            return true;
        }
        if self.kind != req.kind {
            return false;
        }
        let action_ok = match (&self.action, &req.action) {
            (None, _) => true,
            (Some(a), Some(b)) => a == b,
            (Some(_), None) => false,
        };
        action_ok && self.target.matches(&req.target, self.kind.separator())
    }

    /// Entry-level implication, used to de-duplicate inherited entries.
    pub fn implies_entry(&self, other: &PermissionEntry) -> bool {
        if self.kind == CapabilityKind::All {
            return true;
        }
        if self.kind != other.kind {
            return false;
        }
        let action_ok = match (&self.action, &other.action) {
            (None, _) => true,
            (Some(a), Some(b)) => a == b,
            (Some(_), None) => false,
        };
        action_ok && self.target.covers(&other.target, self.kind.separator())
    }
}

impl fmt::Display for PermissionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(a) => write!(f, "{} \"{}\", \"{a}\"", self.kind, self.target),
            None => write!(f, "{} \"{}\"", self.kind, self.target),
        }
    }
}

/// A capability request, built fresh for every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRequest {
    pub kind: CapabilityKind,
    pub target: String,
    pub action: Option<String>,
}

impl CapabilityRequest {
    pub fn new(kind: CapabilityKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            action: None,
        }
    }

    pub fn with_action(
        kind: CapabilityKind,
        target: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            target: target.into(),
            action: Some(action.into()),
        }
    }

    pub fn file_read(path: impl Into<String>) -> Self {
        Self::with_action(CapabilityKind::FileAccess, path, "read")
    }

    pub fn file_write(path: impl Into<String>) -> Self {
        Self::with_action(CapabilityKind::FileAccess, path, "write")
    }

    pub fn connect(host_port: impl Into<String>) -> Self {
        Self::with_action(CapabilityKind::NetworkAccess, host_port, "connect")
    }

    pub fn runtime(name: impl Into<String>) -> Self {
        Self::new(CapabilityKind::Runtime, name)
    }

    pub fn platform(name: impl Into<String>) -> Self {
        Self::new(CapabilityKind::Platform, name)
    }
}

impl fmt::Display for CapabilityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            Some(a) => write!(f, "({} \"{}\" \"{a}\")", self.kind, self.target),
            None => write!(f, "({} \"{}\")", self.kind, self.target),
        }
    }
}
