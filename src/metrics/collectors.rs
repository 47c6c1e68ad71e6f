//! Metric collectors for simulator operations.
//!
//! The `MetricsCollector` struct wraps the raw Prometheus metrics and gives
//! the simulator one call per tick. It holds no state of its own.

use crate::pipeline::{LaneOccupancy, Stage, TickOutcome};
use crate::scheduler::TimerKind;

use super::prometheus::{
    ACTIVE_RUNNERS, DECISIONS_TOTAL, PACKETS_EVICTED_TOTAL, PACKETS_SPAWNED_TOTAL,
    STAGE_OCCUPANCY, TICKS_TOTAL,
};

/// Metrics collector for recording simulator metrics.
///
/// Metrics must be initialized with `init_metrics()` for any of the
/// recording methods to have an effect.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    /// Create a new MetricsCollector instance.
    pub fn new() -> Self {
        Self
    }

    /// Record one timer tick and the lifecycle events it produced.
    ///
    /// `evicted` pairs each evicted packet with the lane it left.
    pub fn record_tick(&self, timer: TimerKind, outcome: &TickOutcome, evicted: &[Stage]) {
        if let Some(ticks) = TICKS_TOTAL.get() {
            ticks
                .with_label_values(&[timer.as_str(), outcome.label()])
                .inc();
        }

        match outcome {
            TickOutcome::Spawned(_) => {
                if let Some(spawned) = PACKETS_SPAWNED_TOTAL.get() {
                    spawned.inc();
                }
            }
            TickOutcome::Decided { verdict, .. } | TickOutcome::Settled { verdict, .. } => {
                if let Some(decisions) = DECISIONS_TOTAL.get() {
                    decisions.with_label_values(&[verdict.stage().as_str()]).inc();
                }
            }
            _ => {}
        }

        if let Some(evictions) = PACKETS_EVICTED_TOTAL.get() {
            for stage in evicted {
                evictions.with_label_values(&[stage.as_str()]).inc();
            }
        }

        tracing::trace!(
            timer = timer.as_str(),
            outcome = outcome.label(),
            evicted = evicted.len(),
            "Recorded tick metric"
        );
    }

    /// Update the occupancy gauges from a lane snapshot.
    pub fn update_occupancy(&self, lanes: &[LaneOccupancy]) {
        if let Some(occupancy) = STAGE_OCCUPANCY.get() {
            for lane in lanes {
                occupancy
                    .with_label_values(&[lane.stage.as_str()])
                    .set(lane.count as f64);
            }
        }
    }

    /// Mark a real-time runner as started.
    pub fn runner_started(&self) {
        if let Some(runners) = ACTIVE_RUNNERS.get() {
            runners.inc();
        }
    }

    /// Mark a real-time runner as stopped.
    pub fn runner_stopped(&self) {
        if let Some(runners) = ACTIVE_RUNNERS.get() {
            runners.dec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{export_metrics, init_metrics};
    use crate::pipeline::{PacketId, Verdict};

    #[test]
    fn test_metrics_collector_new() {
        let collector = MetricsCollector::new();
        // Recording without init must not panic.
        collector.record_tick(
            TimerKind::Spawn,
            &TickOutcome::Spawned(PacketId::new(0)),
            &[],
        );
    }

    #[test]
    fn test_record_tick_after_init() {
        let _ = init_metrics();
        let collector = MetricsCollector::new();

        collector.record_tick(
            TimerKind::Decide,
            &TickOutcome::Decided {
                id: PacketId::new(3),
                verdict: Verdict::Flagged,
            },
            &[],
        );
        collector.record_tick(
            TimerKind::Cleanup,
            &TickOutcome::Evicted(vec![PacketId::new(0), PacketId::new(1)]),
            &[Stage::Verified, Stage::Flagged],
        );

        let metrics = export_metrics();
        assert!(metrics.contains("packet_flow_decisions_total"));
        assert!(metrics.contains("packet_flow_packets_evicted_total"));
        assert!(metrics.contains("timer=\"cleanup\""));
    }

    #[test]
    fn test_update_occupancy() {
        let _ = init_metrics();
        let collector = MetricsCollector::new();
        collector.update_occupancy(&[LaneOccupancy {
            stage: Stage::Reviewing,
            count: 4,
            capacity: 6,
        }]);

        if let Some(occupancy) = STAGE_OCCUPANCY.get() {
            assert_eq!(occupancy.with_label_values(&["reviewing"]).get(), 4.0);
        }
    }

    #[test]
    fn test_runner_gauge() {
        let _ = init_metrics();
        let collector = MetricsCollector::new();
        collector.runner_started();
        collector.runner_stopped();
    }
}
