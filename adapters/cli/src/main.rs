#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays observations through a planning session.

mod config;
mod replay;

use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use lux_agent_core::{PlannerConfig, TeamId};
use lux_agent_system_planner::Session;
use tracing_subscriber::{fmt, EnvFilter};

/// Replays JSON-lines observations and prints one action line per turn.
#[derive(Debug, Parser)]
#[command(name = "lux-agent", version)]
#[command(about = "Replays observations through the Lux agent planner")]
struct Cli {
    /// Observations file with one JSON snapshot per line, or `-` for stdin
    observations: PathBuf,

    /// TOML file with planner limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Team the agent plays for
    #[arg(short, long, default_value_t = 0)]
    team: u32,

    /// Log every unit decision
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Lux agent command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load(path)?,
        None => PlannerConfig::default(),
    };
    let mut session =
        Session::new(TeamId::new(cli.team), config).context("invalid planner configuration")?;

    let stdout = io::stdout();
    let turns = if cli.observations == Path::new("-") {
        replay::run(&mut session, io::stdin().lock(), stdout.lock())?
    } else {
        let file = File::open(&cli.observations).with_context(|| {
            format!(
                "failed to open observations at {}",
                cli.observations.display()
            )
        })?;
        replay::run(&mut session, BufReader::new(file), stdout.lock())?
    };

    tracing::info!(turns, team = cli.team, "replay finished");
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
