mod config;
mod display;
mod firefly;
mod flock;
mod geom;
mod runner;

use crate::config::Config;
use crate::display::TextDisplay;
use crate::firefly::Swarm;
use crate::flock::Flock;
use crate::runner::Runner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use std::{
    io,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    /// Path to a TOML configuration file; defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random number generator; OS entropy when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames instead of running until interrupted.
    #[arg(long)]
    frames: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bird flocking simulation.
    Birds,

    /// Run the firefly blink animation.
    Fireflies,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = match &args.config {
        Some(path) => Config::from_file(path).context("failed to construct cfg")?,
        None => Config::default(),
    };
    log::info!("{cfg:#?}");

    let rng = match args.seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::try_from_os_rng()?,
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
        .context("failed to set interrupt handler")?;

    let sink = TextDisplay::new(io::stdout(), cfg.display.width, cfg.display.height)
        .context("failed to acquire display")?;

    let mut runner = Runner::new(
        sink,
        Duration::from_millis(cfg.display.frame_delay_ms),
        args.frames,
        interrupted,
    );

    match args.command {
        Command::Birds => {
            let mut flock = Flock::new(cfg.flock, &cfg.display, rng)
                .context("failed to construct flock")?;
            runner.run(&mut flock)?;
        }
        Command::Fireflies => {
            let mut swarm = Swarm::new(cfg.firefly, &cfg.display, rng)
                .context("failed to construct swarm")?;
            runner.run(&mut swarm)?;
        }
    }

    Ok(())
}
