//! Headless driver for the shiny mob server: builds a dark arena, adds
//! players, replays a command script and lets the spawn scheduler run.

mod command_script;
mod event_log;
mod headless;

use anyhow::Result;
use clap::Parser;
use headless::HeadlessConfig;
use shinymobs_shiny::ShinyConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "shinymobs", version, about = "Timed shiny creature spawns, run headless")]
struct Cli {
    /// TOML settings file. Written with defaults when missing.
    #[arg(long)]
    config: Option<PathBuf>,

    /// World directory; player preferences are stored under `<dir>/data`.
    #[arg(long)]
    world_dir: Option<PathBuf>,

    /// Raw simulation ticks to run (20 per second).
    #[arg(long, default_value_t = 20 * 60 * 60)]
    ticks: u64,

    /// Number of players placed in the arena.
    #[arg(long, default_value_t = 1)]
    players: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON command script: `{"steps": [{"tick", "player", "op_level", "command"}]}`.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write spawn and command events as JSONL.
    #[arg(long)]
    events: Option<PathBuf>,
}

fn main() -> Result<()> {
    // RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting shinymobs v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) if !path.exists() => {
            let config = ShinyConfig::default();
            config.save_to_path(path)?;
            info!(path = %path.display(), "Wrote default shiny config");
            config
        }
        Some(path) => ShinyConfig::load_from_path(path),
        None => ShinyConfig::default(),
    };

    let summary = headless::run(HeadlessConfig {
        config,
        world_dir: cli.world_dir,
        ticks: cli.ticks,
        players: cli.players,
        seed: cli.seed,
        command_script: cli.script,
        event_log: cli.events,
    })?;

    println!(
        "ran {} ticks: {} shiny spawns, {} commands ({} failed)",
        summary.ticks, summary.spawns, summary.commands, summary.failed_commands
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_long_flags() {
        let cli = Cli::try_parse_from([
            "shinymobs",
            "--ticks",
            "100",
            "--players",
            "4",
            "--seed",
            "9",
            "--world-dir",
            "saves/demo",
        ])
        .unwrap();
        assert_eq!(cli.ticks, 100);
        assert_eq!(cli.players, 4);
        assert_eq!(cli.seed, 9);
        assert_eq!(cli.world_dir, Some(PathBuf::from("saves/demo")));
        assert!(cli.script.is_none());
    }
}
