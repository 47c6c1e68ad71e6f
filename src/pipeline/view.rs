//! Read model handed to the presentation layer.
//!
//! Renderers only ever see a [`PipelineView`]: a point-in-time copy of every
//! packet, the occupancy of each lane and the lifetime counters. Nothing in
//! a view can be used to mutate the simulator.

use serde::Serialize;

use super::config::StageCapacities;
use super::packet::{Packet, Stage};

/// Current fill level of one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneOccupancy {
    pub stage: Stage,
    pub count: usize,
    pub capacity: usize,
}

impl LaneOccupancy {
    /// Returns whether the lane holds at least its capacity.
    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }
}

impl std::fmt::Display for LaneOccupancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.stage.lane_title(),
            self.count,
            self.capacity
        )
    }
}

/// Monotonic totals since the simulator was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LifetimeCounters {
    /// Packets admitted into intake.
    pub spawned: u64,
    /// Packets that reached the verified lane.
    pub verified: u64,
    /// Packets that reached the flagged lane.
    pub flagged: u64,
    /// Packets removed from terminal lanes.
    pub evicted: u64,
}

impl LifetimeCounters {
    /// Returns the number of completed reviews.
    pub fn decided(&self) -> u64 {
        self.verified + self.flagged
    }

    /// Returns the observed flag fraction, or 0.0 before any decision.
    pub fn flag_fraction(&self) -> f64 {
        let decided = self.decided();
        if decided == 0 {
            return 0.0;
        }
        self.flagged as f64 / decided as f64
    }
}

/// Point-in-time snapshot of the whole simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineView {
    /// Simulated time since start, in milliseconds.
    pub elapsed_ms: u64,
    /// Live packets in spawn order.
    pub packets: Vec<Packet>,
    /// Occupancy of the four lanes in lane order.
    pub lanes: Vec<LaneOccupancy>,
    /// Lifetime totals.
    pub lifetime: LifetimeCounters,
}

impl PipelineView {
    /// Builds a view from a packet snapshot.
    pub fn new(
        elapsed_ms: u64,
        packets: Vec<Packet>,
        capacities: &StageCapacities,
        lifetime: LifetimeCounters,
    ) -> Self {
        let lanes = lane_occupancy(&packets, capacities);
        Self {
            elapsed_ms,
            packets,
            lanes,
            lifetime,
        }
    }

    /// Returns the occupancy of one lane.
    pub fn lane(&self, stage: Stage) -> Option<&LaneOccupancy> {
        self.lanes.iter().find(|l| l.stage == stage)
    }

    /// Returns the packets in one lane, oldest first.
    pub fn packets_in(&self, stage: Stage) -> Vec<&Packet> {
        self.packets.iter().filter(|p| p.stage == stage).collect()
    }

    /// Renders a single status line for terminal output.
    pub fn board_line(&self) -> String {
        let lanes: Vec<String> = self.lanes.iter().map(|l| l.to_string()).collect();
        format!(
            "[{:>7.1}s] {} | spawned={} verified={} flagged={}",
            self.elapsed_ms as f64 / 1000.0,
            lanes.join(" -> "),
            self.lifetime.spawned,
            self.lifetime.verified,
            self.lifetime.flagged
        )
    }
}

/// Counts packets per lane.
pub fn lane_occupancy(packets: &[Packet], capacities: &StageCapacities) -> Vec<LaneOccupancy> {
    Stage::ALL
        .iter()
        .map(|&stage| LaneOccupancy {
            stage,
            count: packets.iter().filter(|p| p.stage == stage).count(),
            capacity: capacities.get(stage),
        })
        .collect()
}
