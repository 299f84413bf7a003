use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shinymobs_core::SimTick;
use std::{collections::VecDeque, fs, path::Path};

#[derive(Debug, Deserialize)]
struct CommandScriptFile {
    steps: Vec<CommandScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandScriptStepDef {
    tick: u64,
    /// Fixture player number; absent means the console.
    #[serde(default)]
    player: Option<u128>,
    #[serde(default)]
    op_level: u8,
    command: String,
}

/// One scheduled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCommand {
    pub player: Option<u128>,
    pub op_level: u8,
    pub command: String,
}

#[derive(Debug, Clone)]
struct CommandScriptStep {
    tick: SimTick,
    command: ScriptedCommand,
}

/// Deterministic command script runner.
///
/// Scripts are a list of `{tick, player?, op_level?, command}` steps sorted by tick.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    pending: VecDeque<CommandScriptStep>,
}

impl CommandScriptPlayer {
    /// Load a command script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read command script {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Load a command script from an in-memory JSON string.
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: CommandScriptFile =
            serde_json::from_str(contents).context("invalid command script JSON")?;
        if file.steps.is_empty() {
            bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        let mut last_tick: Option<u64> = None;
        for step in file.steps {
            let command = step.command.trim().to_string();
            if command.is_empty() {
                bail!("command script contains an empty command");
            }

            if let Some(prev) = last_tick {
                if step.tick < prev {
                    bail!("command script steps must be sorted by tick");
                }
            }
            last_tick = Some(step.tick);

            pending.push_back(CommandScriptStep {
                tick: SimTick(step.tick),
                command: ScriptedCommand {
                    player: step.player,
                    op_level: step.op_level,
                    command,
                },
            });
        }

        Ok(Self { pending })
    }

    /// Drain and return all commands scheduled for ticks `<= tick`.
    pub fn drain_ready_commands(&mut self, tick: SimTick) -> Vec<ScriptedCommand> {
        let mut commands = Vec::new();
        while self.pending.front().is_some_and(|step| step.tick <= tick) {
            if let Some(step) = self.pending.pop_front() {
                commands.push(step.command);
            }
        }
        commands
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(commands: Vec<ScriptedCommand>) -> Vec<String> {
        commands.into_iter().map(|c| c.command).collect()
    }

    #[test]
    fn command_script_rejects_unsorted_ticks() {
        let json = r#"{
            "steps": [
                {"tick": 2, "player": 1, "command": "/shinyon"},
                {"tick": 1, "player": 1, "command": "/shinyoff"}
            ]
        }"#;
        let err = CommandScriptPlayer::from_json(json).unwrap_err();
        assert!(
            err.to_string().contains("sorted by tick"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn command_script_rejects_blank_commands() {
        let json = r#"{"steps": [{"tick": 0, "command": "   "}]}"#;
        assert!(CommandScriptPlayer::from_json(json).is_err());
        assert!(CommandScriptPlayer::from_json(r#"{"steps": []}"#).is_err());
    }

    #[test]
    fn command_script_drains_in_order_and_is_deterministic() {
        let json = r#"{
            "steps": [
                {"tick": 1, "player": 1, "command": "/shinyhard on"},
                {"tick": 1, "command": "/shinyclear"},
                {"tick": 3, "player": 2, "op_level": 2, "command": "/shinyspawntest husk"}
            ]
        }"#;
        let mut script = CommandScriptPlayer::from_json(json).expect("script should parse");

        assert!(script.drain_ready_commands(SimTick(0)).is_empty());
        let first = script.drain_ready_commands(SimTick(1));
        assert_eq!(first[0].player, Some(1));
        assert_eq!(first[1].player, None);
        assert_eq!(texts(first), vec!["/shinyhard on", "/shinyclear"]);
        assert!(script.drain_ready_commands(SimTick(2)).is_empty());
        assert_eq!(
            script.drain_ready_commands(SimTick(3)),
            vec![ScriptedCommand {
                player: Some(2),
                op_level: 2,
                command: "/shinyspawntest husk".to_string(),
            }]
        );
        assert!(script.is_finished());
    }
}
