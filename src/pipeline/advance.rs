//! Stage advancement: intake to review, and review to a terminal lane.
//!
//! Each function runs exactly one tick against the store and returns what it
//! did. A packet that disappears between selection and move (possible only
//! when callers interleave evictions) is reported as
//! [`SkipReason::PacketVanished`], never as an error.

use std::time::Duration;

use tracing::{debug, error};

use crate::error::StoreError;

use super::config::DecisionMode;
use super::decision::DecisionPolicy;
use super::outcome::{SkipReason, TickOutcome};
use super::packet::{PacketId, Stage};
use super::store::PacketStore;

/// Moves the oldest intake packet into review when review has room.
///
/// Packets holding a pending verdict still occupy review.
pub fn promote(store: &mut PacketStore, now: Duration) -> TickOutcome {
    if !store.has_room(Stage::Reviewing) {
        return TickOutcome::Skipped(SkipReason::ReviewFull);
    }

    let Some(id) = store.oldest_in(Stage::Intake).map(|p| p.id) else {
        return TickOutcome::Skipped(SkipReason::NothingToPromote);
    };

    match store.update_status(id, Stage::Reviewing, now) {
        Ok(()) => TickOutcome::Promoted(id),
        Err(e) => skipped_on(id, e),
    }
}

/// Draws a verdict for the oldest undecided packet in review.
///
/// In direct mode the packet moves to its terminal lane right away, even if
/// that lane is full; eviction trims it later. In staged mode the verdict is
/// only recorded and [`settle`] applies it.
pub fn decide(
    store: &mut PacketStore,
    policy: &mut DecisionPolicy,
    mode: DecisionMode,
    now: Duration,
) -> TickOutcome {
    let Some(id) = store
        .oldest_matching(|p| p.stage == Stage::Reviewing && p.pending.is_none())
        .map(|p| p.id)
    else {
        return TickOutcome::Skipped(SkipReason::NothingToDecide);
    };

    let verdict = policy.decide();
    let result = match mode {
        DecisionMode::Direct => store
            .update_status(id, verdict.stage(), now)
            .map(|()| TickOutcome::Decided { id, verdict }),
        DecisionMode::Staged => store
            .set_pending(id, verdict)
            .map(|()| TickOutcome::Staged { id, verdict }),
    };

    result.unwrap_or_else(|e| skipped_on(id, e))
}

/// Applies the oldest pending verdict.
///
/// If the target lane is already at capacity its oldest packet is evicted
/// first, so a settle never pushes a lane over its limit.
pub fn settle(store: &mut PacketStore, now: Duration) -> TickOutcome {
    let Some((id, verdict)) = store
        .oldest_matching(|p| p.pending.is_some())
        .and_then(|p| p.pending.map(|v| (p.id, v)))
    else {
        return TickOutcome::Skipped(SkipReason::NothingToSettle);
    };

    let target = verdict.stage();
    let made_room = if store.has_room(target) {
        None
    } else {
        let oldest = store.oldest_in(target).map(|p| p.id);
        oldest.and_then(|old| store.remove(old)).map(|p| p.id)
    };

    match store.update_status(id, target, now) {
        Ok(()) => TickOutcome::Settled {
            id,
            verdict,
            made_room,
        },
        Err(e) => skipped_on(id, e),
    }
}

fn skipped_on(id: PacketId, err: StoreError) -> TickOutcome {
    match err {
        StoreError::NotFound(_) => {
            debug!(packet = %id, "Packet evicted before its move, skipping");
            TickOutcome::Skipped(SkipReason::PacketVanished)
        }
        other => {
            error!(packet = %id, error = %other, "Store rejected a stage move");
            TickOutcome::Skipped(SkipReason::Defect)
        }
    }
}
