//! Headless driver: runs a scripted session and prints the outcome.
//!
//! ```text
//! cabbie-headless [--settings PATH] [--seed N] [--ticks N] [--snapshot PATH]
//! ```
//!
//! Without `--settings` the built-in settings are used. The script holds the
//! accelerator and weaves left and right, so the run exercises handling,
//! collisions and, given enough ticks, the passenger trips.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use cabbie_engine::config::DEFAULT_SETTINGS;
use cabbie_engine::prelude::*;

#[derive(Debug)]
struct Args {
    settings: Option<PathBuf>,
    seed: u64,
    ticks: u64,
    snapshot: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        settings: None,
        seed: 0,
        ticks: 3600,
        snapshot: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--settings" => args.settings = Some(PathBuf::from(value()?)),
            "--seed" => args.seed = value()?.parse().context("--seed expects an integer")?,
            "--ticks" => args.ticks = value()?.parse().context("--ticks expects an integer")?,
            "--snapshot" => args.snapshot = Some(PathBuf::from(value()?)),
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

/// Input for tick `n` of the script: two seconds of weaving per cycle.
fn scripted_input(n: u64) -> InputFrame {
    let phase = n % 240;
    InputFrame {
        accelerate: phase < 200,
        brake: phase >= 220,
        left: (40..80).contains(&phase),
        right: (120..160).contains(&phase),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    let settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::parse(DEFAULT_SETTINGS),
    };
    let config = GameConfig::from_settings(&settings);
    let mut tick_loop = TickLoop::new(
        Game::new(config, args.seed),
        TickConfig {
            headless: true,
            ..Default::default()
        },
    );

    tracing::info!(seed = args.seed, ticks = args.ticks, "starting headless run");
    let mut trips = 0usize;
    for n in 0..args.ticks {
        tick_loop.set_input(scripted_input(n));
        for event in tick_loop.tick() {
            trips += 1;
            tracing::info!(tick = tick_loop.tick_count(), event = ?event, "trip event");
        }
    }

    let snapshot = tick_loop.capture_snapshot();
    if let Some(path) = &args.snapshot {
        let json = snapshot.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("writing snapshot to {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot written");
    }

    let player = tick_loop
        .game()
        .player()
        .context("player car missing at end of run")?;
    println!("ticks:      {}", tick_loop.tick_count());
    println!("simulated:  {:.2}s", tick_loop.elapsed_sec());
    println!("position:   ({:.1}, {:.1})", player.body.position.x, player.body.position.y);
    println!("trip events: {trips}");
    println!("cash:       {}", tick_loop.game().cash());
    println!("state hash: {}", snapshot.hash);
    Ok(())
}
