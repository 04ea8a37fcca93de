//! Observability helpers (metrics).

pub mod metrics;

pub use metrics::{CounterVec, EngineMetrics};
