//! Capability checks against the policy store and the active call chain.

use std::sync::Arc;

use tenantry_core::error::{Result, TrustError};
use tenantry_core::{CapabilityRequest, CodeSource, Denial};

use super::chain::{self, ActiveFrame, FrameKind};
use crate::obs::EngineMetrics;
use crate::policy::{Grant, PolicyStore};

/// Outcome of a capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// `frame` counts from the innermost frame (0).
    Deny { frame: usize, reason: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Process-wide enforcement context, built once at startup and passed by
/// reference. Independent contexts can coexist (tests build their own).
#[derive(Debug, Clone)]
pub struct EnforcementContext {
    policy: Arc<PolicyStore>,
    metrics: Option<Arc<EngineMetrics>>,
}

impl EnforcementContext {
    pub fn new(policy: Arc<PolicyStore>) -> Self {
        Self {
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    /// Check `req` against the calling thread's chain.
    ///
    /// Never blocks and performs no I/O.
    pub fn check_capability(&self, req: &CapabilityRequest) -> Decision {
        if self.policy.user_grant().implies(req) {
            return Decision::Allow;
        }
        chain::with_chain(|frames| self.walk(frames.iter().rev(), req))
    }

    /// Check `req` against an explicit chain, innermost frame first.
    pub fn check_with_chain(&self, frames: &[ActiveFrame], req: &CapabilityRequest) -> Decision {
        if self.policy.user_grant().implies(req) {
            return Decision::Allow;
        }
        self.walk(frames.iter(), req)
    }

    /// `check_capability` as a `Result`, for callers that propagate with `?`.
    pub fn ensure(&self, req: &CapabilityRequest) -> Result<()> {
        match self.check_capability(req) {
            Decision::Allow => Ok(()),
            Decision::Deny { frame, reason } => {
                if let Some(m) = &self.metrics {
                    m.capability_denials.inc(&[]);
                }
                Err(TrustError::Denied(Denial {
                    frame,
                    reason,
                    request: req.clone(),
                }))
            }
        }
    }

    fn walk<'f>(
        &self,
        frames: impl Iterator<Item = &'f ActiveFrame>,
        req: &CapabilityRequest,
    ) -> Decision {
        // Per-call memo; frames from one module share a code source.
        let mut memo: Vec<(Option<&CodeSource>, &Grant)> = Vec::new();
        let mut checked = 0usize;

        for (idx, frame) in frames.enumerate() {
            if frame.kind == FrameKind::EngineInternal {
                continue;
            }
            let cs = frame.origin.code_source.as_ref();
            let grant = match memo.iter().find(|(k, _)| *k == cs) {
                Some((_, g)) => *g,
                None => {
                    let g = self.policy.grant_for(cs);
                    memo.push((cs, g));
                    g
                }
            };
            checked += 1;

            if !grant.implies(req) {
                return deny(idx, format!("not implied by {}", grant.name()), req);
            }
            if frame.kind == FrameKind::PrivilegedEntry {
                if frame.origin.trust_tier.is_trusted() {
                    return Decision::Allow;
                }
                return deny(idx, "privileged entry from untrusted origin".into(), req);
            }
        }

        if checked > 0 {
            Decision::Allow
        } else {
            deny(0, "no checkable frames".into(), req)
        }
    }
}

fn deny(frame: usize, reason: String, req: &CapabilityRequest) -> Decision {
    tracing::debug!(frame, %req, %reason, "capability denied");
    Decision::Deny { frame, reason }
}
