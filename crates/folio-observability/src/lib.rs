//! # folio-observability
//!
//! Structured tracing (subscriber setup, span macros, event helpers) and
//! lock-free service metrics.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
