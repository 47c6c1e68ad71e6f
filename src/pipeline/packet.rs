//! Packet definitions for the simulator.
//!
//! This module defines the core packet types:
//!
//! - `PacketId`: Monotonic identifier assigned at spawn
//! - `Stage`: The four lanes a packet can occupy
//! - `Verdict`: Outcome of a review decision
//! - `Packet`: A simulated unit of review work

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{Sector, TaskEntry};

/// Identifies a packet within one simulator instance.
///
/// Ids are handed out in spawn order starting at zero and are never reused,
/// so the smallest id in a stage is also the oldest packet in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketId(u64);

impl PacketId {
    /// Creates an identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PacketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pipeline lane.
///
/// Stages are ordered: a packet only ever moves to a stage with a higher
/// rank. `Verified` and `Flagged` share the terminal rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Freshly spawned AI output waiting for a reviewer.
    Intake,
    /// Under human review.
    Reviewing,
    /// Review accepted the output.
    Verified,
    /// Review rejected the output.
    Flagged,
}

impl Stage {
    /// All stages in lane order.
    pub const ALL: [Stage; 4] = [Stage::Intake, Stage::Reviewing, Stage::Verified, Stage::Flagged];

    /// Returns the lowercase name used in logs, metrics labels and views.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Intake => "intake",
            Stage::Reviewing => "reviewing",
            Stage::Verified => "verified",
            Stage::Flagged => "flagged",
        }
    }

    /// Returns the lane title shown on the board.
    pub fn lane_title(&self) -> &'static str {
        match self {
            Stage::Intake => "AI Output",
            Stage::Reviewing => "Human Review",
            Stage::Verified => "Verified",
            Stage::Flagged => "Flagged",
        }
    }

    /// Returns whether this stage ends the packet's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Verified | Stage::Flagged)
    }

    fn rank(&self) -> u8 {
        match self {
            Stage::Intake => 0,
            Stage::Reviewing => 1,
            Stage::Verified | Stage::Flagged => 2,
        }
    }

    /// Returns whether a packet may move from `self` to `next`.
    pub fn can_advance_to(&self, next: Stage) -> bool {
        next.rank() == self.rank() + 1
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    Flagged,
}

impl Verdict {
    /// Returns the terminal stage this verdict sends a packet to.
    pub fn stage(&self) -> Stage {
        match self {
            Verdict::Verified => Stage::Verified,
            Verdict::Flagged => Stage::Flagged,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stage().as_str())
    }
}

/// A simulated unit of review work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    /// Identifier assigned at spawn.
    pub id: PacketId,
    /// Current lane.
    pub stage: Stage,
    /// Verdict already drawn but not yet applied (staged decisions only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Verdict>,
    /// Task description from the catalog.
    pub label: &'static str,
    /// Sector tag from the catalog.
    pub sector: Sector,
    /// Simulated clock reading when the packet entered its current stage.
    #[serde(skip)]
    pub entered_stage_at: Duration,
}

impl Packet {
    /// Creates a packet in the intake stage.
    pub fn new(id: PacketId, task: &TaskEntry, now: Duration) -> Self {
        Self {
            id,
            stage: Stage::Intake,
            pending: None,
            label: task.label,
            sector: task.sector,
            entered_stage_at: now,
        }
    }

    /// Creates a packet directly in the given stage.
    ///
    /// Used to seed a store with a known layout.
    pub fn in_stage(id: PacketId, task: &TaskEntry, stage: Stage, now: Duration) -> Self {
        Self {
            stage,
            ..Self::new(id, task, now)
        }
    }

    /// Returns how long the packet has been in its current stage.
    pub fn dwell(&self, now: Duration) -> Duration {
        now.saturating_sub(self.entered_stage_at)
    }
}
