//! Spawn policy: admits new packets into intake.

use std::time::Duration;

use tracing::error;

use crate::catalog::TaskCatalog;

use super::outcome::{SkipReason, TickOutcome};
use super::packet::{Packet, PacketId, Stage};
use super::store::PacketStore;

/// Hands out packet ids and stamps catalog entries on new packets.
#[derive(Debug, Clone)]
pub struct Spawner {
    next_id: u64,
}

impl Spawner {
    /// Creates a spawner whose first packet gets `next_id`.
    pub fn new(next_id: u64) -> Self {
        Self { next_id }
    }

    /// Creates a spawner that continues after the largest id in `store`.
    pub fn after(store: &PacketStore) -> Self {
        Self::new(store.max_id().map_or(0, |id| id.as_u64() + 1))
    }

    /// Returns the id the next spawned packet will receive.
    pub fn next_id(&self) -> PacketId {
        PacketId::new(self.next_id)
    }

    /// Runs one spawn tick.
    ///
    /// A full intake skips the tick without consuming an id. The task is the
    /// catalog entry at `id mod len`, so labels cycle through the catalog.
    pub fn tick(
        &mut self,
        store: &mut PacketStore,
        catalog: &TaskCatalog,
        now: Duration,
    ) -> TickOutcome {
        if !store.has_room(Stage::Intake) {
            return TickOutcome::Skipped(SkipReason::IntakeFull);
        }

        let Some(task) = catalog.entry_for(self.next_id) else {
            error!("Task catalog is empty, cannot spawn");
            return TickOutcome::Skipped(SkipReason::Defect);
        };

        match store.append(Packet::new(self.next_id(), task, now)) {
            Ok(id) => {
                self.next_id += 1;
                TickOutcome::Spawned(id)
            }
            Err(e) => {
                error!(error = %e, "Spawn rejected by store");
                TickOutcome::Skipped(SkipReason::Defect)
            }
        }
    }
}
