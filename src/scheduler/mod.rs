//! Tick scheduling for the simulator.
//!
//! This module provides the two ways of driving a [`crate::pipeline::Simulator`]:
//!
//! - **TickSchedule**: Deterministic timer ordering on a virtual clock
//! - **SimulationRunner**: One tokio task ticking on wall-clock intervals
//!
//! # Architecture
//!
//! ```text
//!   spawn ──┐
//!  review ──┤
//!  decide ──┼──▶ single tick task ──▶ Simulator::fire ──▶ watch<PipelineView>
//!  settle ──┤
//!   evict ──┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use packet_flow::pipeline::{SimulationConfig, Simulator};
//! use packet_flow::scheduler::SimulationRunner;
//!
//! let sim = Simulator::new(SimulationConfig::looped())?;
//! let mut runner = SimulationRunner::start(sim);
//! let mut views = runner.subscribe();
//!
//! views.changed().await?;
//! println!("{}", views.borrow().board_line());
//!
//! let sim = runner.shutdown().await?;
//! ```

pub mod runner;
pub mod timer;

pub use runner::SimulationRunner;
pub use timer::{TickSchedule, TimerKind};
