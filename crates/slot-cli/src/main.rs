//! Terminal line slot game
//!
//! Usage:
//!   slot                      - play with default limits
//!   slot --seed 42            - reproducible spins
//!   slot --config game.yaml   - custom columns, lines and bet limits
//!
//! Logging goes to stderr; set `RUST_LOG` or pass `-v`.

mod terminal;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use slot_core::{GameConfig, GameLoop, SpinSession};

use crate::terminal::{TerminalInput, TerminalSink};

#[derive(Parser)]
#[command(name = "slot", about = "Terminal line slot machine")]
struct Cli {
    /// Game config file (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    log::info!("starting session with {config:?}");

    let session = SpinSession::from_config(config).context("invalid game configuration")?;
    let input = TerminalInput::new(io::stdin().lock(), io::stdout());
    let output = TerminalSink::new(io::stdout());

    GameLoop::new(session, input, output)
        .run()
        .context("game aborted")?;

    Ok(())
}
