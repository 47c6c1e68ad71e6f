//! Metrics module for Prometheus-based monitoring.
//!
//! This module provides metrics collection and export for the simulator:
//! lane occupancy, lifecycle counters and per-timer tick outcomes.
//!
//! # Example
//!
//! ```ignore
//! use packet_flow::metrics::{init_metrics, export_metrics};
//!
//! // Initialize metrics on startup
//! init_metrics().expect("Failed to initialize metrics");
//!
//! // ... run a simulation ...
//!
//! // Export metrics in Prometheus text format
//! let metrics_text = export_metrics();
//! ```

pub mod collectors;
pub mod prometheus;

pub use collectors::MetricsCollector;
pub use prometheus::{export_metrics, init_metrics};

pub use prometheus::{
    ACTIVE_RUNNERS, DECISIONS_TOTAL, PACKETS_EVICTED_TOTAL, PACKETS_SPAWNED_TOTAL, REGISTRY,
    STAGE_OCCUPANCY, TICKS_TOTAL,
};
