//! Capability enforcement: the per-thread call chain and the checker that
//! walks it.

pub mod chain;
pub mod engine;

pub use chain::{pop_frame, push_frame, with_frame, ActiveFrame, FrameGuard, FrameKind};
pub use engine::{Decision, EnforcementContext};
