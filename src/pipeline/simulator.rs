//! Simulator coordinating the packet lifecycle.
//!
//! This module provides the `Simulator` that owns the packet store and runs
//! one policy per timer tick:
//! - Spawning new packets into intake
//! - Promoting intake packets into review
//! - Drawing review verdicts and applying them
//! - Evicting old packets from terminal lanes
//!
//! The simulator never reads a clock. Callers either step it through
//! [`Simulator::run_for`] on virtual time, or set the clock themselves with
//! [`Simulator::advance_clock`] and call [`Simulator::fire`] per tick.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::metrics::MetricsCollector;
use crate::scheduler::{TickSchedule, TimerKind};

use super::advance;
use super::config::SimulationConfig;
use super::decision::{DecisionPolicy, RandomSource, SeededSource};
use super::eviction;
use super::outcome::{SkipReason, TickOutcome};
use super::packet::{Packet, PacketId, Stage};
use super::spawn::Spawner;
use super::store::PacketStore;
use super::view::{lane_occupancy, LaneOccupancy, LifetimeCounters, PipelineView};

/// Owns the live packet collection and applies timer ticks to it.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    store: PacketStore,
    spawner: Spawner,
    decision: DecisionPolicy,
    schedule: TickSchedule,
    now: Duration,
    lifetime: LifetimeCounters,
    metrics: MetricsCollector,
}

impl Simulator {
    /// Creates an empty simulator with a ChaCha random source seeded from
    /// `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let source = Box::new(SeededSource::new(config.seed));
        Self::with_random_source(config, source)
    }

    /// Creates an empty simulator drawing decisions from `source`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn with_random_source(
        config: SimulationConfig,
        source: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        let store = PacketStore::new(config.capacities);
        Self::from_store(config, store, source)
    }

    /// Creates a simulator around an existing store.
    ///
    /// The store's capacities replace those in `config`. New packets get ids
    /// after the largest id already stored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation.
    pub fn from_store(
        mut config: SimulationConfig,
        store: PacketStore,
        source: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.capacities = *store.capacities();
        config.validate()?;

        info!(
            decision_mode = ?config.decision_mode,
            flag_rate = config.flag_rate,
            capacities = ?config.capacities,
            seeded = config.seed.is_some(),
            "Simulator created"
        );

        let decision = DecisionPolicy::new(config.flag_rate, source);
        let schedule = TickSchedule::from_periods(&config.periods, Duration::ZERO);
        Ok(Self {
            spawner: Spawner::after(&store),
            store,
            decision,
            schedule,
            now: Duration::ZERO,
            lifetime: LifetimeCounters::default(),
            metrics: MetricsCollector::new(),
            config,
        })
    }

    /// Returns the validated configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns the packet store.
    pub fn store(&self) -> &PacketStore {
        &self.store
    }

    /// Returns the simulated clock reading.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Returns the id the next spawned packet will receive.
    pub fn next_id(&self) -> PacketId {
        self.spawner.next_id()
    }

    /// Returns the lifetime counters.
    pub fn lifetime(&self) -> LifetimeCounters {
        self.lifetime
    }

    /// Returns a copy of all live packets in spawn order.
    pub fn snapshot(&self) -> Vec<Packet> {
        self.store.snapshot()
    }

    /// Returns the occupancy of every lane.
    pub fn lanes(&self) -> Vec<LaneOccupancy> {
        lane_occupancy(self.store.packets(), self.store.capacities())
    }

    /// Builds the read model for renderers.
    pub fn view(&self) -> PipelineView {
        PipelineView::new(
            self.now.as_millis() as u64,
            self.store.snapshot(),
            self.store.capacities(),
            self.lifetime,
        )
    }

    /// Moves the clock forward. Earlier readings are ignored.
    ///
    /// Use this when ticks are driven externally; mixing it with
    /// [`Simulator::run_for`] makes the virtual schedule catch up on every
    /// tick it skipped.
    pub fn advance_clock(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Runs every tick due within the next `duration` of virtual time.
    ///
    /// Returns the number of ticks fired. The clock ends at the deadline.
    pub fn run_for(&mut self, duration: Duration) -> usize {
        let deadline = self.now + duration;
        let mut fired = 0;
        while let Some((at, timer)) = self.schedule.pop_until(deadline) {
            self.advance_clock(at);
            self.fire(timer);
            fired += 1;
        }
        self.advance_clock(deadline);

        debug!(
            fired,
            now_ms = self.now.as_millis() as u64,
            live = self.store.len(),
            "Virtual run finished"
        );
        fired
    }

    /// Runs the tick belonging to `timer` at the current clock reading.
    pub fn fire(&mut self, timer: TimerKind) -> TickOutcome {
        let now = self.now;
        let mut evicted: Vec<Stage> = Vec::new();

        let outcome = match timer {
            TimerKind::Spawn => self.spawner.tick(&mut self.store, &self.config.catalog, now),
            TimerKind::Review => advance::promote(&mut self.store, now),
            TimerKind::Decide => advance::decide(
                &mut self.store,
                &mut self.decision,
                self.config.decision_mode,
                now,
            ),
            TimerKind::Settle => advance::settle(&mut self.store, now),
            TimerKind::EvictVerified | TimerKind::EvictFlagged | TimerKind::Cleanup => {
                let removed = eviction::evict(
                    &mut self.store,
                    timer.evicted_stages(),
                    self.config.terminal_dwell,
                    now,
                );
                evicted.extend(removed.iter().map(|(_, stage)| *stage));
                eviction::into_outcome(&removed)
            }
        };

        if let TickOutcome::Settled {
            verdict,
            made_room: Some(_),
            ..
        } = &outcome
        {
            evicted.push(verdict.stage());
        }

        self.record(timer, &outcome, &evicted);
        outcome
    }

    /// Spawn tick.
    pub fn spawn_tick(&mut self) -> TickOutcome {
        self.fire(TimerKind::Spawn)
    }

    /// Review tick: intake to review.
    pub fn review_tick(&mut self) -> TickOutcome {
        self.fire(TimerKind::Review)
    }

    /// Decide tick: draws a verdict for the oldest undecided review packet.
    pub fn decide_tick(&mut self) -> TickOutcome {
        self.fire(TimerKind::Decide)
    }

    /// Settle tick: applies the oldest pending verdict.
    pub fn settle_tick(&mut self) -> TickOutcome {
        self.fire(TimerKind::Settle)
    }

    /// Eviction tick for one terminal lane.
    ///
    /// Non-terminal lanes are never evicted.
    pub fn evict_tick(&mut self, stage: Stage) -> TickOutcome {
        match stage {
            Stage::Verified => self.fire(TimerKind::EvictVerified),
            Stage::Flagged => self.fire(TimerKind::EvictFlagged),
            Stage::Intake | Stage::Reviewing => TickOutcome::Skipped(SkipReason::NothingToEvict),
        }
    }

    /// Cleanup tick: evicts both terminal lanes.
    pub fn cleanup_tick(&mut self) -> TickOutcome {
        self.fire(TimerKind::Cleanup)
    }

    fn record(&mut self, timer: TimerKind, outcome: &TickOutcome, evicted: &[Stage]) {
        match outcome {
            TickOutcome::Spawned(_) => self.lifetime.spawned += 1,
            TickOutcome::Decided { verdict, .. } | TickOutcome::Settled { verdict, .. } => {
                match verdict.stage() {
                    Stage::Flagged => self.lifetime.flagged += 1,
                    _ => self.lifetime.verified += 1,
                }
            }
            _ => {}
        }
        self.lifetime.evicted += evicted.len() as u64;

        self.metrics.record_tick(timer, outcome, evicted);
        self.metrics.update_occupancy(&self.lanes());

        debug!(
            timer = %timer,
            outcome = outcome.label(),
            now_ms = self.now.as_millis() as u64,
            live = self.store.len(),
            "Tick"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::{DecisionMode, StageCapacities};
    use crate::pipeline::decision::ScriptedSource;
    use crate::pipeline::packet::Verdict;

    fn create_test_simulator(config: SimulationConfig, source: ScriptedSource) -> Simulator {
        Simulator::with_random_source(config, Box::new(source)).expect("valid config")
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig::pipeline().with_flag_rate(2.0);
        let err = Simulator::new(config).expect_err("flag rate out of range");
        assert_eq!(err, ConfigError::InvalidFlagRate(2.0));
    }

    #[test]
    fn test_full_lifecycle_direct() {
        let mut sim = create_test_simulator(
            SimulationConfig::pipeline(),
            ScriptedSource::always_flag(),
        );

        assert_eq!(sim.spawn_tick(), TickOutcome::Spawned(PacketId::new(0)));
        assert_eq!(sim.review_tick(), TickOutcome::Promoted(PacketId::new(0)));
        assert_eq!(
            sim.decide_tick(),
            TickOutcome::Decided {
                id: PacketId::new(0),
                verdict: Verdict::Flagged
            }
        );

        let lifetime = sim.lifetime();
        assert_eq!(lifetime.spawned, 1);
        assert_eq!(lifetime.flagged, 1);
        assert_eq!(lifetime.verified, 0);
        assert_eq!(sim.store().count(Stage::Flagged), 1);
    }

    #[test]
    fn test_staged_lifecycle_counts_on_settle() {
        let mut sim = create_test_simulator(
            SimulationConfig::looped(),
            ScriptedSource::always_verify(),
        );
        sim.spawn_tick();
        sim.review_tick();

        assert!(matches!(sim.decide_tick(), TickOutcome::Staged { .. }));
        assert_eq!(sim.lifetime().verified, 0);

        assert!(matches!(sim.settle_tick(), TickOutcome::Settled { .. }));
        assert_eq!(sim.lifetime().verified, 1);
        assert_eq!(sim.store().count(Stage::Verified), 1);
    }

    #[test]
    fn test_eviction_counts() {
        let mut sim = create_test_simulator(
            SimulationConfig::pipeline().with_capacities(StageCapacities::new(6, 6, 1, 1)),
            ScriptedSource::always_verify(),
        );
        for _ in 0..2 {
            sim.spawn_tick();
            sim.review_tick();
            sim.decide_tick();
        }
        assert_eq!(sim.store().count(Stage::Verified), 2);

        assert_eq!(
            sim.evict_tick(Stage::Verified),
            TickOutcome::Evicted(vec![PacketId::new(0)])
        );
        assert_eq!(sim.lifetime().evicted, 1);
        assert!(sim.evict_tick(Stage::Verified).is_noop());
        assert!(sim.evict_tick(Stage::Intake).is_noop());
    }

    #[test]
    fn test_run_for_advances_clock() {
        let mut sim = create_test_simulator(
            SimulationConfig::pipeline(),
            ScriptedSource::always_verify(),
        );
        let fired = sim.run_for(Duration::from_millis(1400));

        // 600 evict x2, 700 spawn, 900 review, 1100 decide, 1200 evict x2, 1400 spawn
        assert_eq!(fired, 8);
        assert_eq!(sim.now(), Duration::from_millis(1400));
        assert_eq!(sim.lifetime().spawned, 2);
        assert_eq!(sim.lifetime().verified, 1);
        assert_eq!(sim.next_id(), PacketId::new(2));
    }

    #[test]
    fn test_from_store_continues_ids() {
        let mut store = PacketStore::new(StageCapacities::default());
        store
            .append(Packet::new(
                PacketId::new(41),
                &crate::catalog::DEFAULT_TASKS[0],
                Duration::ZERO,
            ))
            .expect("room");

        let mut sim = Simulator::from_store(
            SimulationConfig::pipeline(),
            store,
            Box::new(ScriptedSource::always_flag()),
        )
        .expect("valid config");

        assert_eq!(sim.spawn_tick(), TickOutcome::Spawned(PacketId::new(42)));
    }

    #[test]
    fn test_advance_clock_is_monotonic() {
        let mut sim = create_test_simulator(
            SimulationConfig::pipeline().with_decision_mode(DecisionMode::Direct),
            ScriptedSource::always_flag(),
        );
        sim.advance_clock(Duration::from_millis(500));
        sim.advance_clock(Duration::from_millis(100));
        assert_eq!(sim.now(), Duration::from_millis(500));
        assert_eq!(sim.view().elapsed_ms, 500);
    }
}
