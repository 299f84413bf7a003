//! Per-player opt-in flags and their persistence.
//!
//! Two flat documents map a player id string to a boolean. They are read once
//! when the server starts and written once when it stops. Nothing in here is
//! allowed to fail the caller: bad entries are skipped and I/O errors are
//! logged.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use shinymobs_core::PlayerId;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Which preference document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreferenceDocument {
    /// Spawn opt-out flags (`true` = spawns enabled).
    Spawn,
    /// Hard-mode opt-in flags.
    HardMode,
}

impl PreferenceDocument {
    /// Both documents, in load/save order.
    pub const ALL: [PreferenceDocument; 2] = [PreferenceDocument::Spawn, PreferenceDocument::HardMode];

    /// File name under the data directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            PreferenceDocument::Spawn => "shinymobs_player_data.json",
            PreferenceDocument::HardMode => "shinymobs_player_hard_data.json",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            PreferenceDocument::Spawn => "spawn",
            PreferenceDocument::HardMode => "hard-mode",
        }
    }
}

/// Key-value persistence used by [`PreferenceStore::load`] and [`PreferenceStore::save`].
pub trait PreferenceBackend {
    /// Raw document entries, or `None` when the document does not exist yet.
    fn read(&self, document: PreferenceDocument) -> Result<Option<Map<String, Value>>>;

    /// Replace the document with `entries`.
    fn write(&mut self, document: PreferenceDocument, entries: &BTreeMap<String, bool>) -> Result<()>;
}

/// Pretty-printed JSON files under `<world>/data/`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_dir: PathBuf,
}

impl JsonFileBackend {
    /// Backend rooted at `data_dir` itself.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Backend rooted at the `data` directory of a world save.
    pub fn for_world(world_dir: &Path) -> Self {
        Self::new(world_dir.join("data"))
    }

    /// Where `document` lives on disk.
    pub fn path(&self, document: PreferenceDocument) -> PathBuf {
        self.data_dir.join(document.file_name())
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn read(&self, document: PreferenceDocument) -> Result<Option<Map<String, Value>>> {
        let path = self.path(document);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read {}", path.display()));
            }
        };
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("parse {}", path.display()))?;
        match value {
            Value::Object(entries) => Ok(Some(entries)),
            Value::Null => Ok(Some(Map::new())),
            other => bail!(
                "{} holds a JSON {} instead of an object",
                path.display(),
                json_kind(&other)
            ),
        }
    }

    fn write(&mut self, document: PreferenceDocument, entries: &BTreeMap<String, bool>) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("create data dir {}", self.data_dir.display()))?;
        let path = self.path(document);
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }
}

/// In-memory backend for hosts without a world directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: BTreeMap<PreferenceDocument, Map<String, Value>>,
}

impl MemoryBackend {
    /// Seed a document with raw entries (which may be malformed).
    pub fn insert_raw(&mut self, document: PreferenceDocument, key: &str, value: Value) {
        self.documents
            .entry(document)
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Stored entries, if the document was ever written.
    pub fn document(&self, document: PreferenceDocument) -> Option<&Map<String, Value>> {
        self.documents.get(&document)
    }
}

impl PreferenceBackend for MemoryBackend {
    fn read(&self, document: PreferenceDocument) -> Result<Option<Map<String, Value>>> {
        Ok(self.documents.get(&document).cloned())
    }

    fn write(&mut self, document: PreferenceDocument, entries: &BTreeMap<String, bool>) -> Result<()> {
        let map = entries
            .iter()
            .map(|(key, value)| (key.clone(), Value::Bool(*value)))
            .collect();
        self.documents.insert(document, map);
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Effective flags for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerPreference {
    /// Timed spawns are on.
    pub spawn_enabled: bool,
    /// Hard-only types are in the pool.
    pub hard_mode_enabled: bool,
}

/// Per-player spawn and hard-mode flags.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    spawn_enabled: BTreeMap<PlayerId, bool>,
    hard_mode: BTreeMap<PlayerId, bool>,
}

impl PreferenceStore {
    /// Empty store: everyone has spawns on and hard mode off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns are enabled unless the player turned them off.
    pub fn is_spawn_disabled(&self, player: PlayerId) -> bool {
        !self.spawn_enabled.get(&player).copied().unwrap_or(true)
    }

    /// Record an explicit choice; it is saved even when it matches the default.
    pub fn set_spawn_enabled(&mut self, player: PlayerId, enabled: bool) {
        self.spawn_enabled.insert(player, enabled);
    }

    /// Hard mode is off unless the player turned it on.
    pub fn is_hard_mode_enabled(&self, player: PlayerId) -> bool {
        self.hard_mode.get(&player).copied().unwrap_or(false)
    }

    /// Record an explicit hard-mode choice.
    pub fn set_hard_mode_enabled(&mut self, player: PlayerId, enabled: bool) {
        self.hard_mode.insert(player, enabled);
    }

    /// Forget both flags for a player.
    pub fn remove_player(&mut self, player: PlayerId) {
        self.spawn_enabled.remove(&player);
        self.hard_mode.remove(&player);
    }

    /// Both effective flags at once.
    pub fn snapshot(&self, player: PlayerId) -> PlayerPreference {
        PlayerPreference {
            spawn_enabled: !self.is_spawn_disabled(player),
            hard_mode_enabled: self.is_hard_mode_enabled(player),
        }
    }

    /// Players with at least one recorded flag.
    pub fn player_count(&self) -> usize {
        let mut ids: Vec<_> = self.spawn_enabled.keys().chain(self.hard_mode.keys()).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }

    /// Replace in-memory state with the backend's documents.
    ///
    /// A document that cannot be read leaves its map empty; the other one still loads.
    pub fn load<B: PreferenceBackend + ?Sized>(&mut self, backend: &B) {
        for document in PreferenceDocument::ALL {
            let map = match document {
                PreferenceDocument::Spawn => &mut self.spawn_enabled,
                PreferenceDocument::HardMode => &mut self.hard_mode,
            };
            map.clear();

            match backend.read(document) {
                Ok(None) => {
                    info!(document = document.label(), "No shiny preference data found, starting fresh");
                }
                Ok(Some(entries)) => {
                    for (key, value) in entries {
                        let Ok(player) = key.parse::<PlayerId>() else {
                            warn!(document = document.label(), key = %key, "Invalid player id in preference data");
                            continue;
                        };
                        let Value::Bool(flag) = value else {
                            warn!(document = document.label(), %player, "Non-boolean preference value skipped");
                            continue;
                        };
                        map.insert(player, flag);
                    }
                    info!(
                        document = document.label(),
                        players = map.len(),
                        "Loaded shiny preference data"
                    );
                }
                Err(err) => {
                    error!(document = document.label(), "Failed to load shiny preference data: {err:#}");
                }
            }
        }
    }

    /// Write both documents. Failures are logged; the other document is still attempted.
    pub fn save<B: PreferenceBackend + ?Sized>(&self, backend: &mut B) {
        for document in PreferenceDocument::ALL {
            let map = match document {
                PreferenceDocument::Spawn => &self.spawn_enabled,
                PreferenceDocument::HardMode => &self.hard_mode,
            };
            let entries: BTreeMap<String, bool> = map
                .iter()
                .map(|(player, flag)| (player.to_string(), *flag))
                .collect();

            match backend.write(document, &entries) {
                Ok(()) => info!(
                    document = document.label(),
                    players = entries.len(),
                    "Saved shiny preference data"
                ),
                Err(err) => {
                    error!(document = document.label(), "Failed to save shiny preference data: {err:#}")
                }
            }
        }
    }
}
