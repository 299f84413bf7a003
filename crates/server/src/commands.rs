//! Chat command parsing and dispatch for the `/shiny*` commands.

use std::fmt;

use shinymobs_core::{ChatColor, ChatMessage, PlayerId, RegistryKey};
use shinymobs_shiny::{
    format_countdown, DisableReport, ShinyStatus, SpawnError, SpawnReport, SpawnScheduler,
};
use shinymobs_world::ShinyWorld;
use tracing::warn;

/// Operator level needed for the admin commands.
pub const ADMIN_PERMISSION_LEVEL: u8 = 2;

/// A command that could not run. The message is shown to the sender as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    /// Error with a player-facing message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The player-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

/// Who issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Server console; always fully privileged but has no player.
    Console,
    /// An in-game player with their operator level.
    Player {
        /// The player.
        id: PlayerId,
        /// Operator level, 0 for regular players.
        op_level: u8,
    },
}

impl CommandSource {
    /// Non-operator player.
    pub fn player(id: PlayerId) -> Self {
        Self::Player { id, op_level: 0 }
    }

    /// Player with the admin permission level.
    pub fn operator(id: PlayerId) -> Self {
        Self::Player {
            id,
            op_level: ADMIN_PERMISSION_LEVEL,
        }
    }

    /// `None` for the console.
    pub fn player_id(self) -> Option<PlayerId> {
        match self {
            Self::Console => None,
            Self::Player { id, .. } => Some(id),
        }
    }

    /// Whether the source meets `level`. The console always does.
    pub fn has_permission(self, level: u8) -> bool {
        match self {
            Self::Console => true,
            Self::Player { op_level, .. } => op_level >= level,
        }
    }
}

/// A parsed `/shiny*` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShinyCommand {
    /// `/shinyhelp`
    Help,
    /// `/shinyon`
    On,
    /// `/shinyoff`
    Off,
    /// `/shinyhard on|off`
    Hard {
        /// Requested state.
        enabled: bool,
    },
    /// `/shinystatus`
    Status,
    /// `/shinyspawntest [type]`
    SpawnTest {
        /// Forced creature type.
        kind: Option<RegistryKey>,
    },
    /// `/shinyclear`
    Clear,
    /// `/shinykillall`
    KillAll,
}

impl ShinyCommand {
    /// Operator level needed to run it.
    pub fn required_permission(&self) -> u8 {
        match self {
            Self::SpawnTest { .. } | Self::Clear | Self::KillAll => ADMIN_PERMISSION_LEVEL,
            _ => 0,
        }
    }

    /// Whether the console is refused.
    pub fn requires_player(&self) -> bool {
        !matches!(self, Self::Help | Self::Clear | Self::KillAll)
    }
}

/// Lines sent back to the sender.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Colored chat lines, in order.
    pub lines: Vec<ChatMessage>,
}

impl CommandOutput {
    fn push(&mut self, text: impl Into<String>, color: ChatColor) {
        self.lines.push(ChatMessage::new(text, color));
    }

    /// Plain text of every line, for logs and transcripts.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }
}

/// Host-side actions the shiny commands drive.
pub trait CommandContext {
    /// Turn timed spawns on. `false` when already on.
    fn enable_spawns(&mut self, player: PlayerId) -> bool;
    /// Turn timed spawns off and despawn the live shiny.
    fn disable_spawns(&mut self, player: PlayerId) -> DisableReport;
    /// `false` when the flag already had that value.
    fn set_hard_mode(&mut self, player: PlayerId, enabled: bool) -> bool;
    /// Current flags and countdown.
    fn status(&mut self, player: PlayerId) -> ShinyStatus;
    /// Immediate spawn, optionally of a forced type.
    fn spawn_test(
        &mut self,
        player: PlayerId,
        kind: Option<&RegistryKey>,
    ) -> Result<SpawnReport, SpawnError>;
    /// Despawn every tracked shiny.
    fn clear_tracked(&mut self) -> usize;
    /// Despawn every marked creature in the world.
    fn kill_all(&mut self) -> usize;
}

/// Scheduler plus the world it acts on.
pub struct ShinyContext<'a, W: ?Sized> {
    /// Shiny state.
    pub scheduler: &'a mut SpawnScheduler,
    /// Host world.
    pub world: &'a mut W,
}

impl<W: ShinyWorld + ?Sized> CommandContext for ShinyContext<'_, W> {
    fn enable_spawns(&mut self, player: PlayerId) -> bool {
        self.scheduler.enable_spawns(player)
    }

    fn disable_spawns(&mut self, player: PlayerId) -> DisableReport {
        self.scheduler.disable_spawns(self.world, player)
    }

    fn set_hard_mode(&mut self, player: PlayerId, enabled: bool) -> bool {
        self.scheduler.set_hard_mode(player, enabled)
    }

    fn status(&mut self, player: PlayerId) -> ShinyStatus {
        self.scheduler.status(self.world, player)
    }

    fn spawn_test(
        &mut self,
        player: PlayerId,
        kind: Option<&RegistryKey>,
    ) -> Result<SpawnReport, SpawnError> {
        self.scheduler.spawn_for(self.world, player, kind)
    }

    fn clear_tracked(&mut self) -> usize {
        self.scheduler.clear_tracked(self.world)
    }

    fn kill_all(&mut self) -> usize {
        self.scheduler.kill_all(self.world)
    }
}

/// Check permissions and the player requirement, then run `cmd` against `ctx`.
pub fn execute_command(
    ctx: &mut impl CommandContext,
    source: CommandSource,
    cmd: ShinyCommand,
) -> Result<CommandOutput, CommandError> {
    if !source.has_permission(cmd.required_permission()) {
        return Err(CommandError::new(
            "You do not have permission to use this command.",
        ));
    }
    let player = match (cmd.requires_player(), source.player_id()) {
        (true, None) => {
            return Err(CommandError::new(
                "This command can only be used by players!",
            ))
        }
        (_, player) => player,
    };

    let mut out = CommandOutput::default();
    match (cmd, player) {
        (ShinyCommand::Help, _) => {
            for line in help_lines() {
                out.push(line, ChatColor::Gray);
            }
        }
        (ShinyCommand::On, Some(player)) => {
            if ctx.enable_spawns(player) {
                out.push("✔ Shiny mob spawns have been enabled!", ChatColor::Green);
            } else {
                out.push("Shiny spawns are already enabled for you!", ChatColor::Green);
            }
        }
        (ShinyCommand::Off, Some(player)) => {
            let report = ctx.disable_spawns(player);
            if report.was_enabled {
                out.push("✘ Shiny mob spawns have been disabled!", ChatColor::Red);
            } else {
                out.push("Shiny spawns are already disabled for you!", ChatColor::Red);
            }
            if report.removed.is_some() {
                out.push("Your existing shiny mob has been removed.", ChatColor::Gray);
            }
        }
        (ShinyCommand::Hard { enabled }, Some(player)) => {
            let changed = ctx.set_hard_mode(player, enabled);
            let text = match (enabled, changed) {
                (true, true) => "✔ Hard mode enabled! Hard-only shiny mobs can now spawn for you.",
                (true, false) => "Hard mode is already enabled for you!",
                (false, true) => "✘ Hard mode disabled.",
                (false, false) => "Hard mode is already disabled for you!",
            };
            let color = if enabled {
                ChatColor::DarkRed
            } else {
                ChatColor::Green
            };
            out.push(text, color);
        }
        (ShinyCommand::Status, Some(player)) => {
            let status = ctx.status(player);
            out.lines.push(
                ChatMessage::new(
                    format!(
                        "Shiny spawns status: {}",
                        if status.spawn_enabled { "ENABLED" } else { "DISABLED" }
                    ),
                    if status.spawn_enabled {
                        ChatColor::Green
                    } else {
                        ChatColor::Red
                    },
                )
                .bold(),
            );
            out.push(
                format!("Hard mode: {}", if status.hard_mode { "ON" } else { "OFF" }),
                ChatColor::Gray,
            );
            if let Some(ticks) = status.countdown {
                out.push(
                    format!("Next spawn in approximately: {}", format_countdown(ticks)),
                    ChatColor::Yellow,
                );
            }
            if status.active_creature.is_some() {
                out.push("You have an active shiny mob!", ChatColor::Gray);
            }
        }
        (ShinyCommand::SpawnTest { kind }, Some(player)) => {
            match ctx.spawn_test(player, kind.as_ref()) {
                Ok(_) => out.push("✔ Test shiny mob spawned successfully!", ChatColor::Green),
                Err(SpawnError::UnknownCreatureType(kind)) => {
                    return Err(CommandError::new(format!(
                        "Unknown creature type: {kind}"
                    )))
                }
                Err(err @ SpawnError::NotEligible(_)) => {
                    return Err(CommandError::new(err.to_string()))
                }
                Err(err) => {
                    warn!(%player, %err, "Test shiny spawn failed");
                    return Err(CommandError::new(
                        "Failed to spawn test shiny mob. Check logs for details.",
                    ));
                }
            }
        }
        (ShinyCommand::Clear, _) => {
            let count = ctx.clear_tracked();
            out.push(format!("✔ Cleared {count} shiny mobs!"), ChatColor::Green);
        }
        (ShinyCommand::KillAll, _) => {
            let count = ctx.kill_all();
            out.push(format!("✔ Killed {count} shiny mobs!"), ChatColor::Green);
        }
        (_, None) => {
            return Err(CommandError::new(
                "This command can only be used by players!",
            ))
        }
    }
    Ok(out)
}

/// Parse one command line. Case-insensitive, leading `/` optional; an empty line is `/shinyhelp`.
pub fn parse_command(input: &str) -> Result<ShinyCommand, CommandError> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    if input.is_empty() {
        return Ok(ShinyCommand::Help);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match cmd.as_str() {
        "shinyhelp" => ShinyCommand::Help,
        "shinyon" => ShinyCommand::On,
        "shinyoff" => ShinyCommand::Off,
        "shinystatus" => ShinyCommand::Status,
        "shinyclear" => ShinyCommand::Clear,
        "shinykillall" => ShinyCommand::KillAll,
        "shinyhard" => return parse_hard_command(&args),
        "shinyspawntest" => return parse_spawn_test_command(&args),
        _ => {
            return Err(CommandError::new(format!(
                "Unknown command: {cmd}. Try /shinyhelp"
            )))
        }
    };
    if !args.is_empty() {
        return Err(CommandError::new(format!("/{cmd} takes no arguments")));
    }
    Ok(command)
}

fn parse_hard_command(args: &[&str]) -> Result<ShinyCommand, CommandError> {
    if args.len() != 1 {
        return Err(CommandError::new("Usage: /shinyhard <on|off>"));
    }
    let enabled = match args[0].to_ascii_lowercase().as_str() {
        "on" | "true" | "enable" => true,
        "off" | "false" | "disable" => false,
        _ => return Err(CommandError::new("Usage: /shinyhard <on|off>")),
    };
    Ok(ShinyCommand::Hard { enabled })
}

fn parse_spawn_test_command(args: &[&str]) -> Result<ShinyCommand, CommandError> {
    match args {
        [] => Ok(ShinyCommand::SpawnTest { kind: None }),
        [token] => {
            let kind = RegistryKey::parse(&token.to_ascii_lowercase())
                .map_err(|_| CommandError::new(format!("Unknown creature type: {token}")))?;
            Ok(ShinyCommand::SpawnTest { kind: Some(kind) })
        }
        _ => Err(CommandError::new("Usage: /shinyspawntest [type]")),
    }
}

fn help_lines() -> Vec<&'static str> {
    vec![
        "Shiny commands:",
        "  /shinyon                 enable shiny spawns for you",
        "  /shinyoff                disable them and remove your shiny",
        "  /shinyhard <on|off>      allow hard-only shiny types",
        "  /shinystatus             show your settings and next spawn",
        "  /shinyspawntest [type]   (op) spawn a shiny now",
        "  /shinyclear              (op) remove every tracked shiny",
        "  /shinykillall            (op) remove every shiny in the world",
    ]
}
