//! packet-flow: Packet lifecycle simulator for human-in-the-loop AI review.
//!
//! This library simulates AI-generated work items ("packets") flowing
//! through a bounded review pipeline, from AI output through human review
//! to a verified or flagged outcome, and provides tools for driving the
//! simulation on virtual or wall-clock time.

// Core modules
pub mod catalog;
pub mod cli;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod scheduler;

// Re-export commonly used error types
pub use error::{ConfigError, RunnerError, StoreError};

// Re-export the simulator entry points
pub use pipeline::{PipelineView, Profile, SimulationConfig, Simulator};
pub use scheduler::SimulationRunner;
