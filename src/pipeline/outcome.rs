//! Result of a single timer tick.

use super::packet::{PacketId, Verdict};

/// Why a tick changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Intake is at capacity.
    IntakeFull,
    /// Review is at capacity.
    ReviewFull,
    /// No packet waits in intake.
    NothingToPromote,
    /// No packet in review lacks a verdict.
    NothingToDecide,
    /// No packet holds a pending verdict.
    NothingToSettle,
    /// Every terminal lane is within its capacity and dwell limit.
    NothingToEvict,
    /// The chosen packet was removed before the move landed.
    PacketVanished,
    /// A store invariant was violated; the error was logged.
    Defect,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::IntakeFull => "intake_full",
            SkipReason::ReviewFull => "review_full",
            SkipReason::NothingToPromote => "nothing_to_promote",
            SkipReason::NothingToDecide => "nothing_to_decide",
            SkipReason::NothingToSettle => "nothing_to_settle",
            SkipReason::NothingToEvict => "nothing_to_evict",
            SkipReason::PacketVanished => "packet_vanished",
            SkipReason::Defect => "defect",
        }
    }
}

/// What a tick did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A packet entered intake.
    Spawned(PacketId),
    /// A packet moved from intake into review.
    Promoted(PacketId),
    /// A packet left review for its terminal lane.
    Decided { id: PacketId, verdict: Verdict },
    /// A verdict was recorded on a packet that stays in review.
    Staged { id: PacketId, verdict: Verdict },
    /// A pending verdict was applied. `made_room` names the packet evicted
    /// from a full target lane beforehand.
    Settled {
        id: PacketId,
        verdict: Verdict,
        made_room: Option<PacketId>,
    },
    /// Packets removed from terminal lanes, oldest first.
    Evicted(Vec<PacketId>),
    /// Nothing changed.
    Skipped(SkipReason),
}

impl TickOutcome {
    /// Returns whether the tick left the store untouched.
    pub fn is_noop(&self) -> bool {
        matches!(self, TickOutcome::Skipped(_))
    }

    /// Returns the short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TickOutcome::Spawned(_) => "spawned",
            TickOutcome::Promoted(_) => "promoted",
            TickOutcome::Decided { .. } => "decided",
            TickOutcome::Staged { .. } => "staged",
            TickOutcome::Settled { .. } => "settled",
            TickOutcome::Evicted(_) => "evicted",
            TickOutcome::Skipped(reason) => reason.as_str(),
        }
    }
}
