//! Packet lifecycle simulation for a human-in-the-loop review pipeline.
//!
//! This module provides the simulator core: the packet store, the tick
//! policies that move packets between lanes, and the read model handed to
//! renderers.
//!
//! # Architecture
//!
//! - **Store**: Ordered collection of live packets with per-lane capacities
//! - **Spawner**: Admits new packets into intake
//! - **Advance**: Moves packets into review and out to a terminal lane
//! - **Decision**: Draws independent verify/flag verdicts
//! - **Eviction**: Trims terminal lanes back to capacity
//! - **Simulator**: Owns the store and runs one policy per timer tick
//!
//! # Packet Flow
//!
//! ```text
//!  spawn        review          decide (settle)
//! ───────▶ Intake ──────▶ Reviewing ──────┬──▶ Verified ──▶ evicted
//!                                         └──▶ Flagged  ──▶ evicted
//! ```
//!
//! Stages only move forward. Intake and review are hard-capped; terminal
//! lanes may overshoot until their next eviction tick.
//!
//! # Example
//!
//! ```rust,ignore
//! use packet_flow::pipeline::{SimulationConfig, Simulator};
//! use std::time::Duration;
//!
//! let config = SimulationConfig::pipeline().with_seed(7);
//! let mut sim = Simulator::new(config)?;
//!
//! sim.run_for(Duration::from_secs(30));
//! println!("{}", sim.view().board_line());
//! ```

pub mod advance;
pub mod config;
pub mod decision;
pub mod eviction;
pub mod outcome;
pub mod packet;
pub mod simulator;
pub mod spawn;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::{
    DecisionMode, Profile, SimulationConfig, StageCapacities, TickPeriods, DEFAULT_FLAG_RATE,
};
pub use decision::{classify, DecisionPolicy, RandomSource, ScriptedSource, SeededSource};
pub use outcome::{SkipReason, TickOutcome};
pub use packet::{Packet, PacketId, Stage, Verdict};
pub use simulator::Simulator;
pub use spawn::Spawner;
pub use store::PacketStore;
pub use view::{LaneOccupancy, LifetimeCounters, PipelineView};
