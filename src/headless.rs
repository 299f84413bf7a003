use crate::command_script::{CommandScriptPlayer, ScriptedCommand};
use crate::event_log::EventLog;
use anyhow::{Context, Result};
use shinymobs_core::{ChatMessage, PlayerId, SimTick};
use shinymobs_server::commands::CommandSource;
use shinymobs_server::ShinyServer;
use shinymobs_shiny::{JsonFileBackend, MemoryBackend, PreferenceBackend, ShinyConfig};
use shinymobs_world::{BlockPos, MemoryWorld, Players, Vec3, BLOCK_STONE};
use std::path::PathBuf;
use tracing::{info, warn};

/// Arena margin beyond the spawn distance, so every placement candidate lands on the floor.
const ARENA_MARGIN: i32 = 8;

/// Y of the arena's stone floor.
const FLOOR_Y: i32 = 63;

/// Unlit stone floor covering `-radius..=radius`, air above.
fn build_arena(radius: i32) -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.fill(
        BlockPos::new(-radius, FLOOR_Y, -radius),
        BlockPos::new(radius, FLOOR_Y, radius),
        BLOCK_STONE,
    );
    world
}

/// Player number `n` from the command line or a script.
fn player_for(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

fn add_player(world: &mut MemoryWorld, n: u128) {
    let spot = Vec3::new(0.5, f64::from(FLOOR_Y + 1), 0.5);
    world.add_player(player_for(n), format!("Player{n}"), spot);
}

pub struct HeadlessConfig {
    pub config: ShinyConfig,
    /// World save directory; preferences live under `<dir>/data`. `None` keeps them in memory.
    pub world_dir: Option<PathBuf>,
    pub ticks: u64,
    pub players: u32,
    pub seed: u64,
    pub command_script: Option<PathBuf>,
    pub event_log: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub spawns: usize,
    pub commands: usize,
    pub failed_commands: usize,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let script = cfg
        .command_script
        .as_deref()
        .map(CommandScriptPlayer::from_path)
        .transpose()?;
    let log = cfg.event_log.as_deref().map(EventLog::create).transpose()?;

    let radius = cfg.config.spawn.spawn_distance as i32 + ARENA_MARGIN;
    let mut world = build_arena(radius);
    for n in 1..=u128::from(cfg.players) {
        add_player(&mut world, n);
    }

    let mut driver = Driver { script, log };
    match cfg.world_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create world dir {}", dir.display()))?;
            let backend = JsonFileBackend::for_world(&dir);
            let server = ShinyServer::new(world, backend, cfg.config, cfg.seed);
            driver.drive(server, cfg.ticks)
        }
        None => {
            let server = ShinyServer::new(world, MemoryBackend::default(), cfg.config, cfg.seed);
            driver.drive(server, cfg.ticks)
        }
    }
}

struct Driver {
    script: Option<CommandScriptPlayer>,
    log: Option<EventLog>,
}

impl Driver {
    fn drive<B: PreferenceBackend>(
        &mut self,
        mut server: ShinyServer<MemoryWorld, B>,
        ticks: u64,
    ) -> Result<RunSummary> {
        server.start();
        let mut summary = RunSummary::default();

        for raw in 1..=ticks {
            let tick = SimTick(raw);
            let ready = match self.script.as_mut() {
                Some(script) => script.drain_ready_commands(tick),
                None => Vec::new(),
            };
            for step in ready {
                summary.commands += 1;
                if !self.run_command(&mut server, tick, &step)? {
                    summary.failed_commands += 1;
                }
            }

            for report in server.tick() {
                summary.spawns += 1;
                let payload = format!("{} for {} at {}", report.kind, report.player, report.position);
                self.record(tick, "spawn", &payload)?;
            }
            summary.ticks = raw;
        }

        server.stop();
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
        }
        info!(
            ticks = summary.ticks,
            spawns = summary.spawns,
            commands = summary.commands,
            failed = summary.failed_commands,
            "Headless run finished"
        );
        Ok(summary)
    }

    fn run_command<B: PreferenceBackend>(
        &mut self,
        server: &mut ShinyServer<MemoryWorld, B>,
        tick: SimTick,
        step: &ScriptedCommand,
    ) -> Result<bool> {
        let source = match step.player {
            Some(n) => CommandSource::Player {
                id: player_for(n),
                op_level: step.op_level,
            },
            None => CommandSource::Console,
        };
        let (ok, payload) = match server.execute(source, &step.command) {
            Ok(out) => {
                if let Some(id) = source.player_id() {
                    deliver(server, id, &out.lines);
                }
                (true, format!("{} -> {}", step.command, out.texts().join(" | ")))
            }
            Err(err) => {
                warn!(command = %step.command, %err, "Scripted command failed");
                (false, format!("{} -> error: {err}", step.command))
            }
        };
        self.record(tick, "command", &payload)?;
        Ok(ok)
    }

    fn record(&mut self, tick: SimTick, kind: &str, payload: &str) -> Result<()> {
        if let Some(log) = self.log.as_mut() {
            log.record(tick, kind, payload)?;
        }
        Ok(())
    }
}

fn deliver<B: PreferenceBackend>(
    server: &mut ShinyServer<MemoryWorld, B>,
    player: PlayerId,
    lines: &[ChatMessage],
) {
    for line in lines {
        server.world_mut().send_message(player, line.clone());
    }
}
