//! Observability
//!
//! In-process counters and gauges for the judge pipeline, with Prometheus
//! text export.

pub mod metrics;

pub use metrics::{get_metrics, MetricsRegistry};
