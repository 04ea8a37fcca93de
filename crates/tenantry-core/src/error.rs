//! Shared error type across tenantry crates.

use std::fmt;

use thiserror::Error;

use crate::capability::CapabilityRequest;

/// Stable error classes handed to the hosting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Policy, whitelist, or host config could not be loaded.
    ConfigInvalid,
    /// A capability check failed.
    Forbidden,
    /// No tier could resolve the requested name.
    NotFound,
    /// An isolation invariant was violated (engine bug).
    IsolationBreach,
    /// Anything else.
    Internal,
}

impl ErrorClass {
    /// String representation used in host responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorClass::ConfigInvalid => "CONFIG_INVALID",
            ErrorClass::Forbidden => "FORBIDDEN",
            ErrorClass::NotFound => "NOT_FOUND",
            ErrorClass::IsolationBreach => "ISOLATION_BREACH",
            ErrorClass::Internal => "INTERNAL",
        }
    }

    /// Fatal classes must abort the host instead of being reported per request.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorClass::ConfigInvalid | ErrorClass::IsolationBreach)
    }
}

/// Which configuration language a parse error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Policy,
    Whitelist,
}

impl ConfigSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfigSource::Policy => "policy",
            ConfigSource::Whitelist => "whitelist",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grammar violation or semantic error in policy / whitelist text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{config} line {line}: {message}")]
pub struct ParseError {
    pub config: ConfigSource,
    /// 1-based line of the offending token (last line for end-of-input errors).
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(config: ConfigSource, line: usize, message: impl Into<String>) -> Self {
        Self {
            config,
            line,
            message: message.into(),
        }
    }
}

/// A failed capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    /// Position in the active call chain, innermost frame = 0.
    pub frame: usize,
    pub reason: String,
    pub request: CapabilityRequest,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [frame: {}]: {}", self.request, self.frame, self.reason)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TrustError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("access denied: {0}")]
    Denied(Denial),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("isolation breach: `{name}` resolved from tenant tier of `{tenant}`")]
    Conflict { name: String, tenant: String },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("io: {0}")]
    Io(String),
}

impl TrustError {
    /// Map internal error to a stable class.
    pub fn class(&self) -> ErrorClass {
        match self {
            TrustError::Parse(_) | TrustError::Config(_) => ErrorClass::ConfigInvalid,
            TrustError::Denied(_) => ErrorClass::Forbidden,
            TrustError::NotFound(_) => ErrorClass::NotFound,
            TrustError::Conflict { .. } => ErrorClass::IsolationBreach,
            TrustError::Io(_) => ErrorClass::Internal,
        }
    }
}
