//! CLI command definitions for packet-flow.
//!
//! This module provides the command-line interface for running the review
//! pipeline simulator on virtual time, on wall-clock time, and for listing
//! the task catalog.

use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::catalog::{Sector, TaskCatalog, TaskEntry};
use crate::metrics::{export_metrics, init_metrics};
use crate::pipeline::{PipelineView, Profile, SimulationConfig, Simulator, Stage};
use crate::scheduler::SimulationRunner;

/// Default virtual duration of a `simulate` run.
const DEFAULT_DURATION_MS: &str = "30000";

/// Default wall-clock duration of a `run` session.
const DEFAULT_RUN_SECONDS: &str = "10";

/// Packet lifecycle simulator for a human-in-the-loop AI review pipeline.
#[derive(Parser)]
#[command(name = "packet-flow")]
#[command(about = "Simulate AI outputs flowing through human review")]
#[command(version)]
#[command(
    long_about = "packet-flow simulates AI-generated work items moving through a bounded\nreview pipeline: AI Output -> Human Review -> Verified / Flagged.\n\nExample usage:\n  packet-flow simulate --profile loop --duration-ms 60000 --seed 7\n  packet-flow run --profile pipeline --seconds 20"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the simulator on virtual time and print the final board.
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Run the simulator on wall-clock time, printing the board as it changes.
    Run(RunArgs),

    /// List the task catalog stamped on spawned packets.
    Catalog(CatalogArgs),
}

/// Settings shared by `simulate` and `run`.
#[derive(Parser, Debug, Clone)]
pub struct ProfileArgs {
    /// Configuration preset (pipeline, loop).
    #[arg(short, long, default_value = "pipeline")]
    pub profile: Profile,

    /// Seed for review decisions. Omit for a fresh random seed.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Probability that a review flags the packet.
    #[arg(long)]
    pub flag_rate: Option<f64>,

    /// Evict terminal packets after this many milliseconds in their lane.
    #[arg(long)]
    pub dwell_ms: Option<u64>,
}

impl ProfileArgs {
    /// Builds the simulation configuration these arguments describe.
    pub fn to_config(&self) -> SimulationConfig {
        let mut config = self.profile.config();
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(rate) = self.flag_rate {
            config = config.with_flag_rate(rate);
        }
        if let Some(dwell) = self.dwell_ms {
            config = config.with_terminal_dwell(Duration::from_millis(dwell));
        }
        config
    }
}

/// Arguments for `packet-flow simulate`.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Virtual time to simulate, in milliseconds.
    #[arg(short, long, default_value = DEFAULT_DURATION_MS)]
    pub duration_ms: u64,

    /// Print the final view as JSON.
    #[arg(short, long)]
    pub json: bool,

    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for `packet-flow run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Wall-clock seconds to run before shutting down.
    #[arg(long, default_value = DEFAULT_RUN_SECONDS)]
    pub seconds: u64,

    /// Divide every tick period by this factor.
    #[arg(long, default_value = "1")]
    pub speed: u32,

    /// Milliseconds between board refreshes.
    #[arg(long, default_value = "500")]
    pub refresh_ms: u64,

    /// Print each refresh as a JSON line.
    #[arg(short, long)]
    pub json: bool,
}

/// Arguments for `packet-flow catalog`.
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Only list tasks from this sector (legal, healthcare, finance).
    #[arg(long)]
    pub sector: Option<Sector>,

    /// Output as JSON.
    #[arg(short, long)]
    pub json: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Simulate(args) => run_simulate_command(args)?,
        Commands::Run(args) => run_realtime_command(args).await?,
        Commands::Catalog(args) => run_catalog_command(args)?,
    }
    Ok(())
}

// ============================================================================
// Simulate Command Implementation
// ============================================================================

/// JSON output of `simulate`.
#[derive(Debug, Serialize)]
pub struct SimulationOutput {
    pub profile: String,
    pub seed: Option<u64>,
    pub duration_ms: u64,
    pub ticks: usize,
    pub flag_fraction: f64,
    pub view: PipelineView,
}

fn run_simulate_command(args: SimulateArgs) -> anyhow::Result<()> {
    if args.metrics {
        init_metrics()?;
    }

    let config = args.profile.to_config();
    let mut sim = Simulator::new(config)?;
    let ticks = sim.run_for(Duration::from_millis(args.duration_ms));
    let view = sim.view();

    info!(
        profile = %args.profile.profile,
        ticks,
        spawned = view.lifetime.spawned,
        "Simulation finished"
    );

    if args.json {
        let output = SimulationOutput {
            profile: args.profile.profile.to_string(),
            seed: args.profile.seed,
            duration_ms: args.duration_ms,
            ticks,
            flag_fraction: view.lifetime.flag_fraction(),
            view,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", view.board_line());
        print!("{}", render_lanes(&view));
    }

    if args.metrics {
        print!("{}", export_metrics());
    }
    Ok(())
}

/// Renders every lane with its packets, oldest first.
pub fn render_lanes(view: &PipelineView) -> String {
    let mut out = String::new();
    for stage in Stage::ALL {
        let Some(lane) = view.lane(stage) else {
            continue;
        };
        out.push_str(&format!(
            "{} ({}/{})\n",
            stage.lane_title(),
            lane.count,
            lane.capacity
        ));
        for packet in view.packets_in(stage) {
            let pending = packet
                .pending
                .map(|v| format!(" -> {}", v))
                .unwrap_or_default();
            out.push_str(&format!(
                "  #{:<4} [{}] {}{}\n",
                packet.id.as_u64(),
                packet.sector,
                packet.label,
                pending
            ));
        }
    }
    out
}

// ============================================================================
// Run Command Implementation
// ============================================================================

async fn run_realtime_command(args: RunArgs) -> anyhow::Result<()> {
    let mut config = args.profile.to_config();
    config.periods = config.periods.scaled(args.speed);
    let sim = Simulator::new(config)?;

    info!(
        profile = %args.profile.profile,
        seconds = args.seconds,
        speed = args.speed,
        "Starting real-time simulation"
    );

    let mut runner = SimulationRunner::start(sim);
    let mut refresh = tokio::time::interval(Duration::from_millis(args.refresh_ms.max(1)));
    let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline);
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = refresh.tick() => {
                print_view(&runner.latest(), args.json)?;
            }
        }
    }

    let sim = runner.shutdown().await?;
    print_view(&sim.view(), args.json)?;
    Ok(())
}

fn print_view(view: &PipelineView, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(view)?);
    } else {
        println!("{}", view.board_line());
    }
    Ok(())
}

// ============================================================================
// Catalog Command Implementation
// ============================================================================

fn run_catalog_command(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = TaskCatalog::default();
    let entries: Vec<&TaskEntry> = match args.sector {
        Some(sector) => catalog.by_sector(sector),
        None => catalog.entries().iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{:>2}. [{}] {}",
            i + 1,
            entry.sector.display_name(),
            entry.label
        );
    }
    Ok(())
}
