//! Settings read by the shiny core.
//!
//! Loaded from TOML. Every section and key is optional; anything missing takes
//! its default and anything out of range is clamped with a warning.

use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Bounds for the spawn interval, in minutes.
pub const SPAWN_MINUTES_RANGE: (u32, u32) = (1, 1440);
/// Bounds for the spawn distance, in blocks.
pub const SPAWN_DISTANCE_RANGE: (u32, u32) = (10, 200);
/// Bounds for every health and damage multiplier.
pub const MULTIPLIER_RANGE: (f64, f64) = (1.0, 100.0);
/// Bounds for the per-item drop chance.
pub const DROP_CHANCE_RANGE: (f64, f64) = (0.0, 1.0);
/// Bounds for `[profiles.*]` `health_scale` and `damage_scale`.
pub const PROFILE_SCALE_RANGE: (f64, f64) = (0.1, 10.0);

/// Everything the shiny core reads from the settings file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ShinyConfig {
    /// `[spawn]`
    pub spawn: SpawnSettings,
    /// `[mob]`
    pub mob: MobSettings,
    /// `[equipment]`
    pub equipment: EquipmentSettings,
    /// `[visual]`
    pub visual: VisualSettings,
    /// `[general]`
    pub general: GeneralSettings,
    /// Per-type adjustments keyed by creature type id (`zombie`, `minecraft:husk`, ...).
    pub profiles: BTreeMap<String, ProfileOverride>,
}

/// Timing, distance and notification settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Shortest interval between spawns.
    pub min_spawn_minutes: u32,
    /// Longest interval between spawns. Values at or below the minimum mean "always the minimum".
    pub max_spawn_minutes: u32,
    /// Horizontal distance from the player, in blocks.
    pub spawn_distance: u32,
    /// Tell the player when their shiny appears.
    pub show_spawn_message: bool,
    /// Include the spawn coordinates in that message.
    pub show_coordinates: bool,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            min_spawn_minutes: 15,
            max_spawn_minutes: 60,
            spawn_distance: 50,
            show_spawn_message: true,
            show_coordinates: true,
        }
    }
}

/// Global creature modifiers; the base of every profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MobSettings {
    /// Lower bound of the random health multiplier.
    pub min_health_multiplier: f64,
    /// Upper bound of the random health multiplier.
    pub max_health_multiplier: f64,
    /// Health multiplier used when random health is off.
    pub fixed_health_multiplier: f64,
    /// Roll health in `[min, max]` instead of using the fixed value.
    pub use_random_health: bool,
    /// Attack damage multiplier for hostile creatures.
    pub damage_multiplier: f64,
}

impl Default for MobSettings {
    fn default() -> Self {
        Self {
            min_health_multiplier: 2.0,
            max_health_multiplier: 10.0,
            fixed_health_multiplier: 5.0,
            use_random_health: true,
            damage_multiplier: 3.0,
        }
    }
}

/// Gear handed to gear-compatible shinies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EquipmentSettings {
    /// Full netherite armor plus a weapon.
    pub equip_netherite: bool,
    /// Every slot gets its maximal enchantment set.
    pub max_enchantments: bool,
    /// Chance each equipped item drops on death.
    pub drop_chance_per_item: f64,
}

impl Default for EquipmentSettings {
    fn default() -> Self {
        Self {
            equip_netherite: true,
            max_enchantments: true,
            drop_chance_per_item: 0.2,
        }
    }
}

/// Glow and team color.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisualSettings {
    /// Outline the creature.
    pub use_glow: bool,
    /// Pick a random glow color per creature.
    pub random_team_color: bool,
    /// Color name used when `random_team_color` is off.
    pub fixed_team_color: String,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            use_glow: true,
            random_team_color: true,
            fixed_team_color: "gold".to_string(),
        }
    }
}

/// What the profile registry does for a creature type it has no entry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFallback {
    /// Unlisted types are never transformed.
    #[default]
    AllowList,
    /// Unlisted types use the profile built from the global settings.
    GlobalDefault,
}

/// Feature switch and global policies.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Master switch. When off the scheduler does nothing at all.
    pub enabled: bool,
    /// At most one live tracked shiny per player.
    pub one_shiny_per_player: bool,
    /// When off, shinies are made persistent.
    pub natural_despawn: bool,
    /// Handling of creature types without a profile.
    pub profile_fallback: ProfileFallback,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            one_shiny_per_player: true,
            natural_despawn: true,
            profile_fallback: ProfileFallback::AllowList,
        }
    }
}

/// Optional adjustments layered over a built-in (or base) profile.
///
/// Scales multiply the health/damage multipliers; the remaining fields
/// replace the profile's value when present.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileOverride {
    /// Multiplies all three health multipliers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_scale: Option<f64>,
    /// Multiplies the damage multiplier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_scale: Option<f64>,
    /// Replaces `use_random_health`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_random_health: Option<bool>,
    /// Replaces `hard_only`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_only: Option<bool>,
    /// Replaces `equip_netherite`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equip_netherite: Option<bool>,
    /// Replaces `max_enchantments`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_enchantments: Option<bool>,
    /// Replaces `drop_chance_per_item`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_chance_per_item: Option<f64>,
    /// Replaces `use_glow`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_glow: Option<bool>,
    /// Replaces `random_team_color`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_team_color: Option<bool>,
    /// Replaces `fixed_team_color`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_team_color: Option<String>,
    /// Loot table id granted on a player kill; bare paths get the mod namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_table: Option<String>,
    /// Drop the type from the registry entirely.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl ShinyConfig {
    /// Load from `path`, falling back to defaults when the file is missing or unparseable.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err:#}. Using defaults", path.display());
                    ShinyConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Shiny config not found at {}. Using defaults", path.display());
                ShinyConfig::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                ShinyConfig::default()
            }
        }
    }

    /// Parse TOML and clamp out-of-range values.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let mut cfg: ShinyConfig =
            toml::from_str(contents).context("invalid shiny config TOML")?;
        for problem in cfg.sanitize() {
            warn!(%problem, "Adjusted shiny config value");
        }
        Ok(cfg)
    }

    /// Write pretty TOML, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self).context("serialize shiny config")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Clamp every bounded value into range. Returns one entry per adjusted value.
    ///
    /// Unknown color names are reported but left alone; the transformer falls
    /// back to gold for them.
    pub fn sanitize(&mut self) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        clamp_u32(
            "spawn.min_spawn_minutes",
            &mut self.spawn.min_spawn_minutes,
            SPAWN_MINUTES_RANGE,
            &mut problems,
        );
        clamp_u32(
            "spawn.max_spawn_minutes",
            &mut self.spawn.max_spawn_minutes,
            SPAWN_MINUTES_RANGE,
            &mut problems,
        );
        clamp_u32(
            "spawn.spawn_distance",
            &mut self.spawn.spawn_distance,
            SPAWN_DISTANCE_RANGE,
            &mut problems,
        );

        clamp_f64(
            "mob.min_health_multiplier",
            &mut self.mob.min_health_multiplier,
            MULTIPLIER_RANGE,
            &mut problems,
        );
        clamp_f64(
            "mob.max_health_multiplier",
            &mut self.mob.max_health_multiplier,
            MULTIPLIER_RANGE,
            &mut problems,
        );
        clamp_f64(
            "mob.fixed_health_multiplier",
            &mut self.mob.fixed_health_multiplier,
            MULTIPLIER_RANGE,
            &mut problems,
        );
        clamp_f64(
            "mob.damage_multiplier",
            &mut self.mob.damage_multiplier,
            MULTIPLIER_RANGE,
            &mut problems,
        );
        clamp_f64(
            "equipment.drop_chance_per_item",
            &mut self.equipment.drop_chance_per_item,
            DROP_CHANCE_RANGE,
            &mut problems,
        );

        if shinymobs_core::ChatColor::parse(&self.visual.fixed_team_color).is_none() {
            problems.push(ConfigError::UnknownColor {
                key: "visual.fixed_team_color".to_string(),
                value: self.visual.fixed_team_color.clone(),
            });
        }

        for (kind, entry) in &mut self.profiles {
            if let Some(scale) = entry.health_scale.as_mut() {
                clamp_f64("profiles.*.health_scale", scale, PROFILE_SCALE_RANGE, &mut problems);
            }
            if let Some(scale) = entry.damage_scale.as_mut() {
                clamp_f64("profiles.*.damage_scale", scale, PROFILE_SCALE_RANGE, &mut problems);
            }
            if let Some(chance) = entry.drop_chance_per_item.as_mut() {
                clamp_f64(
                    "profiles.*.drop_chance_per_item",
                    chance,
                    DROP_CHANCE_RANGE,
                    &mut problems,
                );
            }
            if let Some(color) = &entry.fixed_team_color {
                if shinymobs_core::ChatColor::parse(color).is_none() {
                    problems.push(ConfigError::UnknownColor {
                        key: format!("profiles.{kind}.fixed_team_color"),
                        value: color.clone(),
                    });
                }
            }
        }

        problems
    }
}

fn clamp_u32(key: &'static str, value: &mut u32, range: (u32, u32), problems: &mut Vec<ConfigError>) {
    let (min, max) = range;
    if *value < min || *value > max {
        problems.push(ConfigError::OutOfRange {
            key,
            value: f64::from(*value),
            min: f64::from(min),
            max: f64::from(max),
        });
        *value = (*value).clamp(min, max);
    }
}

fn clamp_f64(key: &'static str, value: &mut f64, range: (f64, f64), problems: &mut Vec<ConfigError>) {
    let (min, max) = range;
    if !(min..=max).contains(&*value) {
        problems.push(ConfigError::OutOfRange {
            key,
            value: *value,
            min,
            max,
        });
        *value = if value.is_nan() { min } else { (*value).clamp(min, max) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = ShinyConfig::default();
        assert_eq!(cfg.spawn.min_spawn_minutes, 15);
        assert_eq!(cfg.spawn.max_spawn_minutes, 60);
        assert_eq!(cfg.spawn.spawn_distance, 50);
        assert_eq!(cfg.mob.min_health_multiplier, 2.0);
        assert_eq!(cfg.mob.max_health_multiplier, 10.0);
        assert_eq!(cfg.mob.fixed_health_multiplier, 5.0);
        assert_eq!(cfg.mob.damage_multiplier, 3.0);
        assert_eq!(cfg.equipment.drop_chance_per_item, 0.2);
        assert_eq!(cfg.visual.fixed_team_color, "gold");
        assert_eq!(cfg.general.profile_fallback, ProfileFallback::AllowList);
        assert!(cfg.general.natural_despawn);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ShinyConfig::from_toml_str(
            r#"
            [spawn]
            min_spawn_minutes = 1
            max_spawn_minutes = 2

            [general]
            profile_fallback = "global_default"

            [profiles.skeleton]
            health_scale = 2.0
            fixed_team_color = "red"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.spawn.min_spawn_minutes, 1);
        assert_eq!(cfg.spawn.max_spawn_minutes, 2);
        assert_eq!(cfg.spawn.spawn_distance, 50);
        assert_eq!(cfg.general.profile_fallback, ProfileFallback::GlobalDefault);
        let skeleton = &cfg.profiles["skeleton"];
        assert_eq!(skeleton.health_scale, Some(2.0));
        assert_eq!(skeleton.fixed_team_color.as_deref(), Some("red"));
        assert_eq!(skeleton.hard_only, None);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut cfg = ShinyConfig::default();
        cfg.spawn.min_spawn_minutes = 0;
        cfg.spawn.spawn_distance = 500;
        cfg.mob.damage_multiplier = 0.5;
        cfg.equipment.drop_chance_per_item = f64::NAN;
        let problems = cfg.sanitize();
        assert_eq!(problems.len(), 4);
        assert_eq!(cfg.spawn.min_spawn_minutes, 1);
        assert_eq!(cfg.spawn.spawn_distance, 200);
        assert_eq!(cfg.mob.damage_multiplier, 1.0);
        assert_eq!(cfg.equipment.drop_chance_per_item, 0.0);
    }

    #[test]
    fn profile_scales_are_clamped() {
        let cfg = ShinyConfig::from_toml_str(
            r#"
            [profiles.spider]
            health_scale = -1.0

            [profiles.zombie]
            health_scale = 1e300
            damage_scale = 0.0

            [profiles.husk]
            damage_scale = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.profiles["spider"].health_scale, Some(0.1));
        assert_eq!(cfg.profiles["zombie"].health_scale, Some(10.0));
        assert_eq!(cfg.profiles["zombie"].damage_scale, Some(0.1));
        assert_eq!(cfg.profiles["husk"].damage_scale, Some(2.5));

        let mut nan = ShinyConfig::default();
        nan.profiles.insert(
            "skeleton".into(),
            ProfileOverride {
                health_scale: Some(f64::NAN),
                ..ProfileOverride::default()
            },
        );
        assert_eq!(nan.sanitize().len(), 1);
        assert_eq!(nan.profiles["skeleton"].health_scale, Some(0.1));
    }

    #[test]
    fn unknown_color_is_reported_not_changed() {
        let mut cfg = ShinyConfig::default();
        cfg.visual.fixed_team_color = "chartreuse".into();
        let problems = cfg.sanitize();
        assert!(matches!(problems[..], [ConfigError::UnknownColor { .. }]));
        assert_eq!(cfg.visual.fixed_team_color, "chartreuse");
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ShinyConfig::load_from_path(&dir.path().join("nope.toml"));
        assert_eq!(cfg, ShinyConfig::default());
    }

    #[test]
    fn garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shiny.toml");
        fs::write(&path, "[spawn\nmin = ").unwrap();
        assert_eq!(ShinyConfig::load_from_path(&path), ShinyConfig::default());
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config/shiny.toml");
        let mut cfg = ShinyConfig::default();
        cfg.spawn.show_coordinates = false;
        cfg.profiles.insert(
            "minecraft:creeper".into(),
            ProfileOverride {
                disabled: true,
                ..ProfileOverride::default()
            },
        );
        cfg.save_to_path(&path).unwrap();
        assert_eq!(ShinyConfig::load_from_path(&path), cfg);
    }
}
