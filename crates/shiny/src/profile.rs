use crate::config::{ProfileOverride, ShinyConfig, MULTIPLIER_RANGE};
use rand::Rng;
use shinymobs_core::{ChatColor, RegistryKey};

/// Color used when a profile's fixed color name is not recognized.
pub const FALLBACK_TEAM_COLOR: ChatColor = ChatColor::Gold;

/// How one creature type is turned shiny.
///
/// Built once when the registry is constructed and never mutated afterwards;
/// per-type variants are derived from the base profile with the builder
/// methods below.
#[derive(Debug, Clone, PartialEq)]
pub struct ShinyProfile {
    /// Lower bound of the random health roll.
    pub min_health_multiplier: f64,
    /// Upper bound of the random health roll.
    pub max_health_multiplier: f64,
    /// Health multiplier when random health is off.
    pub fixed_health_multiplier: f64,
    /// Roll health instead of using the fixed multiplier.
    pub use_random_health: bool,
    /// Applied to attack damage of hostile creatures.
    pub damage_multiplier: f64,
    /// Only spawned for, and only applied on behalf of, players in hard mode.
    pub hard_only: bool,
    /// Hand out netherite gear (gear-compatible types only).
    pub equip_netherite: bool,
    /// Enchant every equipped slot to its maximum.
    pub max_enchantments: bool,
    /// Drop chance for each equipped item.
    pub drop_chance_per_item: f32,
    /// Glow and join a colored team.
    pub use_glow: bool,
    /// Random glow color per creature.
    pub random_team_color: bool,
    /// Color name used when random colors are off.
    pub fixed_team_color: String,
    /// Extra loot table granted to the player who kills the creature.
    pub reward_table: Option<RegistryKey>,
}

impl ShinyProfile {
    /// Profile built from the global settings.
    pub fn base(config: &ShinyConfig) -> Self {
        Self {
            min_health_multiplier: config.mob.min_health_multiplier,
            max_health_multiplier: config.mob.max_health_multiplier,
            fixed_health_multiplier: config.mob.fixed_health_multiplier,
            use_random_health: config.mob.use_random_health,
            damage_multiplier: config.mob.damage_multiplier,
            hard_only: false,
            equip_netherite: config.equipment.equip_netherite,
            max_enchantments: config.equipment.max_enchantments,
            drop_chance_per_item: config.equipment.drop_chance_per_item as f32,
            use_glow: config.visual.use_glow,
            random_team_color: config.visual.random_team_color,
            fixed_team_color: config.visual.fixed_team_color.clone(),
            reward_table: None,
        }
    }

    /// Copy with every health multiplier scaled by `health` and the damage multiplier by `damage`.
    pub fn derive(&self, health: f64, damage: f64) -> Self {
        Self {
            min_health_multiplier: self.min_health_multiplier * health,
            max_health_multiplier: self.max_health_multiplier * health,
            fixed_health_multiplier: self.fixed_health_multiplier * health,
            damage_multiplier: self.damage_multiplier * damage,
            ..self.clone()
        }
    }

    /// Mark as hard-mode only.
    pub fn hard_only(mut self) -> Self {
        self.hard_only = true;
        self
    }

    /// Override the netherite gear setting.
    pub fn with_netherite(mut self, equip: bool) -> Self {
        self.equip_netherite = equip;
        self
    }

    /// Fixed glow color (turns random colors off).
    pub fn with_color(mut self, color: ChatColor) -> Self {
        self.random_team_color = false;
        self.fixed_team_color = color.as_str().to_string();
        self
    }

    /// Extra loot table for the killer.
    pub fn with_reward(mut self, table: RegistryKey) -> Self {
        self.reward_table = Some(table);
        self
    }

    /// Layer configured adjustments on top of this profile.
    ///
    /// The resulting multipliers always stay inside [`MULTIPLIER_RANGE`].
    pub fn with_override(&self, adjust: &ProfileOverride) -> Self {
        let mut profile = self.derive(
            adjust.health_scale.unwrap_or(1.0),
            adjust.damage_scale.unwrap_or(1.0),
        );
        for value in [
            &mut profile.min_health_multiplier,
            &mut profile.max_health_multiplier,
            &mut profile.fixed_health_multiplier,
            &mut profile.damage_multiplier,
        ] {
            *value = clamp_multiplier(*value);
        }
        if let Some(v) = adjust.use_random_health {
            profile.use_random_health = v;
        }
        if let Some(v) = adjust.hard_only {
            profile.hard_only = v;
        }
        if let Some(v) = adjust.equip_netherite {
            profile.equip_netherite = v;
        }
        if let Some(v) = adjust.max_enchantments {
            profile.max_enchantments = v;
        }
        if let Some(v) = adjust.drop_chance_per_item {
            profile.drop_chance_per_item = v.clamp(0.0, 1.0) as f32;
        }
        if let Some(v) = adjust.use_glow {
            profile.use_glow = v;
        }
        if let Some(v) = adjust.random_team_color {
            profile.random_team_color = v;
        }
        if let Some(color) = &adjust.fixed_team_color {
            profile.fixed_team_color = color.clone();
        }
        if let Some(table) = &adjust.reward_table {
            match RegistryKey::parse_with_default_namespace(
                &table.to_ascii_lowercase(),
                shinymobs_core::registry::MOD_NAMESPACE,
            ) {
                Ok(key) => profile.reward_table = Some(key),
                Err(err) => tracing::warn!(table = %table, %err, "Ignoring invalid reward table id"),
            }
        }
        profile
    }

    /// The fixed team color, or gold when the name is not a known color.
    pub fn fixed_color(&self) -> ChatColor {
        ChatColor::parse(&self.fixed_team_color).unwrap_or(FALLBACK_TEAM_COLOR)
    }

    /// Health multiplier for one transformation.
    ///
    /// Uniform in `[min, max]` when random health is on, else the fixed value.
    /// A range with `max <= min` always yields `min`.
    pub fn health_multiplier<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !self.use_random_health {
            return self.fixed_health_multiplier;
        }
        let (min, max) = (self.min_health_multiplier, self.max_health_multiplier);
        if max > min && min.is_finite() && max.is_finite() {
            rng.gen_range(min..=max)
        } else {
            min
        }
    }
}

fn clamp_multiplier(value: f64) -> f64 {
    let (min, max) = MULTIPLIER_RANGE;
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
