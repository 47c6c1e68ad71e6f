//! Command-line interface for packet-flow.
//!
//! Provides commands for virtual-time simulation, real-time runs and
//! catalog listing.

mod commands;

pub use commands::{parse_cli, render_lanes, run, run_with_cli, Cli, Commands};
