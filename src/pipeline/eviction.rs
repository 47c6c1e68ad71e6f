//! Eviction of terminal packets.
//!
//! Terminal lanes are bounded FIFO buffers. An eviction pass first drops
//! packets that have outstayed the optional dwell limit, then removes the
//! oldest packets until the lane is within capacity. Running a pass twice
//! at the same clock reading removes nothing the second time.

use std::time::Duration;

use super::outcome::{SkipReason, TickOutcome};
use super::packet::{PacketId, Stage};
use super::store::PacketStore;

/// Runs one eviction pass over a single lane.
///
/// Returns the removed ids, oldest first.
pub fn evict_lane(
    store: &mut PacketStore,
    stage: Stage,
    dwell: Option<Duration>,
    now: Duration,
) -> Vec<PacketId> {
    let mut removed = Vec::new();

    if let Some(limit) = dwell {
        let expired: Vec<PacketId> = store
            .packets()
            .iter()
            .filter(|p| p.stage == stage && p.dwell(now) >= limit)
            .map(|p| p.id)
            .collect();
        for id in expired {
            if store.remove(id).is_some() {
                removed.push(id);
            }
        }
    }

    let capacity = store.capacities().get(stage);
    while store.count(stage) > capacity {
        let Some(id) = store.oldest_in(stage).map(|p| p.id) else {
            break;
        };
        store.remove(id);
        removed.push(id);
    }

    removed
}

/// Runs an eviction pass over each given lane.
///
/// Returns every removed packet with the lane it left, oldest first.
pub fn evict(
    store: &mut PacketStore,
    stages: &[Stage],
    dwell: Option<Duration>,
    now: Duration,
) -> Vec<(PacketId, Stage)> {
    let mut removed: Vec<(PacketId, Stage)> = stages
        .iter()
        .flat_map(|&stage| {
            evict_lane(store, stage, dwell, now)
                .into_iter()
                .map(move |id| (id, stage))
        })
        .collect();
    removed.sort_by_key(|(id, _)| *id);
    removed
}

/// Wraps an eviction result as a tick outcome.
pub fn into_outcome(removed: &[(PacketId, Stage)]) -> TickOutcome {
    if removed.is_empty() {
        return TickOutcome::Skipped(SkipReason::NothingToEvict);
    }
    TickOutcome::Evicted(removed.iter().map(|(id, _)| *id).collect())
}
