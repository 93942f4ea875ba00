//! Headless siege runner.
//!
//! Runs the simulation on the game loop thread, logs gameplay to stderr and
//! prints a JSON run summary to stdout.
//!
//! ```bash
//! cargo run -p siege-host -- --ticks 3750 --seed 7 --unpaced
//! cargo run -p siege-host -- --config siege.json -v
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use siege_core::commands::PlayerCommand;
use siege_host::{spawn_game_loop, HostConfig, HostError, LogPresenter, LoopOptions, StatsPresenter};

#[derive(Parser)]
#[command(name = "siege-host")]
#[command(about = "Headless runner for the siege simulation")]
#[command(version)]
struct Cli {
    /// JSON config file; missing keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run (overrides the config)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// RNG seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Run as fast as possible instead of at the 16 ms tick rate
    #[arg(long)]
    unpaced: bool,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "siege-host failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HostError> {
    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = Some(ticks);
    }
    if let Some(seed) = cli.seed {
        config.sim.seed = seed;
    }
    if cli.unpaced {
        config.realtime = false;
    }
    config.validate()?;

    let options = LoopOptions {
        max_ticks: config.ticks,
        realtime: config.realtime,
        initial_commands: if config.auto_start {
            vec![PlayerCommand::Start]
        } else {
            Vec::new()
        },
    };
    let presenter = (LogPresenter::new(config.log_every_ticks), StatsPresenter::new());

    let handle = spawn_game_loop(config.sim, options, presenter)?;
    let (_, stats) = handle.join()?;

    match serde_json::to_string_pretty(&stats) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::warn!(%err, "could not serialise run summary"),
    }
    Ok(())
}
