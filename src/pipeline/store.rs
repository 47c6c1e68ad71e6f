//! In-memory packet store.
//!
//! The store is the single source of truth for the live packet collection.
//! Packets are kept sorted by id, which equals spawn order, so "oldest" is
//! always the smallest id and never depends on how the vector was mutated.

use std::time::Duration;

use crate::error::StoreError;

use super::config::StageCapacities;
use super::packet::{Packet, PacketId, Stage, Verdict};

/// Ordered collection of live packets with per-stage capacity limits.
#[derive(Debug, Clone)]
pub struct PacketStore {
    packets: Vec<Packet>,
    capacities: StageCapacities,
}

impl PacketStore {
    /// Creates an empty store enforcing the given capacities on append.
    pub fn new(capacities: StageCapacities) -> Self {
        Self {
            packets: Vec::new(),
            capacities,
        }
    }

    /// Returns the configured capacities.
    pub fn capacities(&self) -> &StageCapacities {
        &self.capacities
    }

    /// Adds a packet.
    ///
    /// # Errors
    ///
    /// - `StoreError::CapacityExceeded` if the packet's stage is already full.
    /// - `StoreError::DuplicateId` if a packet with the same id is present.
    pub fn append(&mut self, packet: Packet) -> Result<PacketId, StoreError> {
        let capacity = self.capacities.get(packet.stage);
        if self.count(packet.stage) >= capacity {
            return Err(StoreError::CapacityExceeded {
                stage: packet.stage,
                capacity,
            });
        }

        let pos = self.packets.partition_point(|p| p.id < packet.id);
        if self.packets.get(pos).map(|p| p.id) == Some(packet.id) {
            return Err(StoreError::DuplicateId(packet.id));
        }

        let id = packet.id;
        self.packets.insert(pos, packet);
        Ok(id)
    }

    /// Moves a packet to a later stage and clears any pending verdict.
    ///
    /// Capacity is not checked here: terminal stages may overshoot until the
    /// next eviction tick, and the advancer checks review capacity itself.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the packet was already evicted.
    /// - `StoreError::InvalidTransition` if `stage` is not the next lane.
    pub fn update_status(
        &mut self,
        id: PacketId,
        stage: Stage,
        now: Duration,
    ) -> Result<(), StoreError> {
        let packet = self.get_mut(id)?;
        if !packet.stage.can_advance_to(stage) {
            return Err(StoreError::InvalidTransition {
                id,
                from: packet.stage,
                to: stage,
            });
        }

        packet.stage = stage;
        packet.pending = None;
        packet.entered_stage_at = now;
        Ok(())
    }

    /// Records a drawn verdict on a packet that stays in review.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the packet was already evicted.
    /// - `StoreError::InvalidTransition` if the packet is not in review.
    pub fn set_pending(&mut self, id: PacketId, verdict: Verdict) -> Result<(), StoreError> {
        let packet = self.get_mut(id)?;
        if packet.stage != Stage::Reviewing {
            return Err(StoreError::InvalidTransition {
                id,
                from: packet.stage,
                to: verdict.stage(),
            });
        }
        packet.pending = Some(verdict);
        Ok(())
    }

    /// Deletes a packet. Removing an absent id is a no-op.
    ///
    /// Returns the removed packet, if any.
    pub fn remove(&mut self, id: PacketId) -> Option<Packet> {
        let pos = self.position(id)?;
        Some(self.packets.remove(pos))
    }

    /// Returns a point-in-time copy of all packets in spawn order.
    pub fn snapshot(&self) -> Vec<Packet> {
        self.packets.clone()
    }

    /// Returns the packets in spawn order without copying.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Looks up a packet by id.
    pub fn get(&self, id: PacketId) -> Option<&Packet> {
        self.position(id).map(|pos| &self.packets[pos])
    }

    /// Returns the number of packets in a stage.
    pub fn count(&self, stage: Stage) -> usize {
        self.packets.iter().filter(|p| p.stage == stage).count()
    }

    /// Returns whether a stage is below its capacity.
    pub fn has_room(&self, stage: Stage) -> bool {
        self.count(stage) < self.capacities.get(stage)
    }

    /// Returns the oldest packet in a stage.
    pub fn oldest_in(&self, stage: Stage) -> Option<&Packet> {
        self.oldest_matching(|p| p.stage == stage)
    }

    /// Returns the oldest packet satisfying a predicate.
    pub fn oldest_matching<F>(&self, predicate: F) -> Option<&Packet>
    where
        F: Fn(&Packet) -> bool,
    {
        self.packets
            .iter()
            .filter(|p| predicate(p))
            .min_by_key(|p| p.id)
    }

    /// Returns the total number of live packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Returns the largest id currently stored.
    pub fn max_id(&self) -> Option<PacketId> {
        self.packets.last().map(|p| p.id)
    }

    fn position(&self, id: PacketId) -> Option<usize> {
        self.packets.binary_search_by_key(&id, |p| p.id).ok()
    }

    fn get_mut(&mut self, id: PacketId) -> Result<&mut Packet, StoreError> {
        let pos = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(&mut self.packets[pos])
    }
}
