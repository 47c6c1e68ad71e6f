//! Prometheus metrics registration and export.
//!
//! This module defines all Prometheus metrics used by packet-flow and provides
//! functions for initializing, registering, and exporting metrics.

use prometheus::{Counter, CounterVec, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all packet-flow metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Packets currently in each lane, labeled by stage.
pub static STAGE_OCCUPANCY: OnceLock<GaugeVec> = OnceLock::new();

/// Total packets admitted into intake.
pub static PACKETS_SPAWNED_TOTAL: OnceLock<Counter> = OnceLock::new();

/// Total review decisions, labeled by verdict.
pub static DECISIONS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Total packets evicted from terminal lanes, labeled by stage.
pub static PACKETS_EVICTED_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Total timer ticks, labeled by timer and outcome.
pub static TICKS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Number of real-time runners currently ticking.
pub static ACTIVE_RUNNERS: OnceLock<Gauge> = OnceLock::new();

/// Initialize all metrics and register them with the registry.
///
/// This function should be called once at application startup. Recording
/// before initialization is a silent no-op.
///
/// # Errors
///
/// Returns a `prometheus::Error` if metric registration fails, typically due to
/// duplicate metric names or invalid metric configurations.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    // Lane metrics
    let stage_occupancy = GaugeVec::new(
        Opts::new("packet_flow_stage_occupancy", "Packets currently in each lane"),
        &["stage"],
    )?;

    // Lifecycle metrics
    let packets_spawned_total = Counter::new(
        "packet_flow_packets_spawned_total",
        "Total packets admitted into intake",
    )?;

    let decisions_total = CounterVec::new(
        Opts::new("packet_flow_decisions_total", "Total review decisions"),
        &["verdict"],
    )?;

    let packets_evicted_total = CounterVec::new(
        Opts::new(
            "packet_flow_packets_evicted_total",
            "Total packets evicted from terminal lanes",
        ),
        &["stage"],
    )?;

    // Scheduler metrics
    let ticks_total = CounterVec::new(
        Opts::new("packet_flow_ticks_total", "Total timer ticks"),
        &["timer", "outcome"],
    )?;

    let active_runners = Gauge::new(
        "packet_flow_active_runners",
        "Number of real-time runners currently ticking",
    )?;

    registry.register(Box::new(stage_occupancy.clone()))?;
    registry.register(Box::new(packets_spawned_total.clone()))?;
    registry.register(Box::new(decisions_total.clone()))?;
    registry.register(Box::new(packets_evicted_total.clone()))?;
    registry.register(Box::new(ticks_total.clone()))?;
    registry.register(Box::new(active_runners.clone()))?;

    // If any of these fail, metrics were already initialized (idempotent)
    let _ = REGISTRY.set(registry);
    let _ = STAGE_OCCUPANCY.set(stage_occupancy);
    let _ = PACKETS_SPAWNED_TOTAL.set(packets_spawned_total);
    let _ = DECISIONS_TOTAL.set(decisions_total);
    let _ = PACKETS_EVICTED_TOTAL.set(packets_evicted_total);
    let _ = TICKS_TOTAL.set(ticks_total);
    let _ = ACTIVE_RUNNERS.set(active_runners);

    tracing::info!("Prometheus metrics initialized successfully");

    Ok(())
}

/// Export all registered metrics in Prometheus text format.
///
/// If the registry has not been initialized or encoding fails, returns a
/// comment line describing the problem.
pub fn export_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}
