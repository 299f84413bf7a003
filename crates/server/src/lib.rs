#![warn(missing_docs)]
//! Server-side host for the shiny mob core: lifecycle, per-tick driving,
//! gameplay event forwarding and chat command dispatch.

/// Command parsing and execution.
pub mod commands;

use commands::{execute_command, parse_command, CommandError, CommandOutput, CommandSource, ShinyContext};
use shinymobs_core::{ChatColor, ChatMessage, PlayerId, SimTick};
use shinymobs_shiny::{
    DeathOutcome, PreferenceBackend, ShinyConfig, ShinyEvents, SpawnReport, SpawnScheduler,
};
use shinymobs_world::{CreatureHandle, PlayerInfo, ShinyWorld};
use tracing::{debug, info};

/// Owns the world adapter, the preference backend and the scheduler.
///
/// Preferences are read once in [`ShinyServer::start`] and written once in
/// [`ShinyServer::stop`]; nothing touches the backend while ticking.
pub struct ShinyServer<W, B> {
    world: W,
    backend: B,
    scheduler: SpawnScheduler,
    running: bool,
}

impl<W: ShinyWorld, B: PreferenceBackend> ShinyServer<W, B> {
    /// Stopped server with a fresh scheduler.
    pub fn new(world: W, backend: B, config: ShinyConfig, seed: u64) -> Self {
        Self::with_scheduler(world, backend, SpawnScheduler::new(config, seed))
    }

    /// Stopped server around an existing scheduler.
    pub fn with_scheduler(world: W, backend: B, scheduler: SpawnScheduler) -> Self {
        Self {
            world,
            backend,
            scheduler,
            running: false,
        }
    }

    /// Load persisted preferences. Calling it twice is a no-op.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.scheduler.preferences_mut().load(&self.backend);
        self.running = true;
        info!(
            players = self.scheduler.preferences().player_count(),
            profiles = self.scheduler.registry().len(),
            enabled = self.scheduler.config().general.enabled,
            "Shiny mob server started"
        );
    }

    /// Run one raw simulation tick. Does nothing before [`Self::start`].
    pub fn tick(&mut self) -> Vec<SpawnReport> {
        if !self.running {
            return Vec::new();
        }
        self.scheduler.tick(&mut self.world)
    }

    /// Run `ticks` raw ticks and collect every spawn.
    pub fn run_ticks(&mut self, ticks: u64) -> Vec<SpawnReport> {
        let mut spawned = Vec::new();
        for _ in 0..ticks {
            spawned.extend(self.tick());
        }
        spawned
    }

    /// Save preferences and drop session state.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.scheduler.preferences().save(&mut self.backend);
        self.scheduler.reset_session();
        self.running = false;
        info!("Shiny mob server stopped");
    }

    /// Between [`Self::start`] and [`Self::stop`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Parse and run one command line.
    pub fn execute(&mut self, source: CommandSource, line: &str) -> Result<CommandOutput, CommandError> {
        let cmd = parse_command(line)?;
        debug!(?source, ?cmd, "Executing shiny command");
        let mut ctx = ShinyContext {
            scheduler: &mut self.scheduler,
            world: &mut self.world,
        };
        let result = execute_command(&mut ctx, source, cmd);
        if let Err(err) = &result {
            debug!(?source, %err, "Shiny command failed");
        }
        result
    }

    /// Run a command for a player and deliver the output (or failure) to their chat.
    pub fn execute_for_player(&mut self, player: PlayerId, op_level: u8, line: &str) -> bool {
        let source = CommandSource::Player {
            id: player,
            op_level,
        };
        match self.execute(source, line) {
            Ok(out) => {
                for message in out.lines {
                    self.world.send_message(player, message);
                }
                true
            }
            Err(err) => {
                self.world.send_message(
                    player,
                    ChatMessage::new(err.message(), ChatColor::Red),
                );
                false
            }
        }
    }

    /// Forward a creature death.
    pub fn creature_died(&mut self, creature: CreatureHandle, killer: Option<PlayerId>) -> DeathOutcome {
        self.scheduler.on_creature_death(&mut self.world, creature, killer)
    }

    /// Forward a creature hitting a player. Returns whether they were set on fire.
    pub fn player_attacked(&mut self, attacker: CreatureHandle, victim: PlayerId) -> bool {
        self.scheduler.on_player_attacked(&mut self.world, attacker, victim)
    }

    /// Forward a login. Returns whether the player was reminded of a live shiny.
    pub fn player_joined(&mut self, player: PlayerId) -> bool {
        self.scheduler.on_player_login(&mut self.world, player)
    }

    /// Timers and tracked creatures stay as they are.
    pub fn player_left(&mut self, player: &PlayerInfo) {
        self.scheduler.on_player_logout(player);
    }

    /// Scheduler tick counter.
    pub fn current_tick(&self) -> SimTick {
        self.scheduler.current_tick()
    }

    /// The host world.
    pub fn world(&self) -> &W {
        &self.world
    }

    /// Mutable host world.
    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Preference persistence.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shiny state.
    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    /// Mutable shiny state.
    pub fn scheduler_mut(&mut self) -> &mut SpawnScheduler {
        &mut self.scheduler
    }

    /// Stop if needed and hand back the world and backend.
    pub fn into_parts(mut self) -> (W, B) {
        self.stop();
        (self.world, self.backend)
    }
}
