//! Creature type → shiny profile table.
//!
//! Built once at startup from the global settings, the built-in per-type
//! table and any `[profiles.*]` adjustments. By default the table is an
//! allow-list: a type without an entry is never transformed.

use crate::config::{ProfileFallback, ShinyConfig};
use crate::error::ConfigError;
use crate::profile::ShinyProfile;
use rand::seq::SliceRandom;
use rand::Rng;
use shinymobs_core::{ChatColor, RegistryKey};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Creature type → [`ShinyProfile`], plus the base profile unlisted types may fall back to.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    base: ShinyProfile,
    profiles: BTreeMap<RegistryKey, ShinyProfile>,
    fallback: ProfileFallback,
}

/// Built-in per-type profiles derived from `base`.
pub fn builtin_profiles(base: &ShinyProfile) -> Vec<(RegistryKey, ShinyProfile)> {
    vec![
        (
            RegistryKey::vanilla("zombie"),
            base.derive(1.5, 1.25)
                .hard_only()
                .with_netherite(true)
                .with_color(ChatColor::DarkGreen)
                .with_reward(RegistryKey::modded("shiny/zombie")),
        ),
        (
            RegistryKey::vanilla("husk"),
            base.derive(1.5, 1.25).with_color(ChatColor::Gold),
        ),
        (
            RegistryKey::vanilla("skeleton"),
            base.clone().with_color(ChatColor::White),
        ),
        (
            RegistryKey::vanilla("stray"),
            base.clone().with_color(ChatColor::Aqua),
        ),
        (
            RegistryKey::vanilla("pillager"),
            base.derive(1.0, 1.25).with_color(ChatColor::DarkGray),
        ),
        (
            RegistryKey::vanilla("spider"),
            base.derive(1.25, 1.0).with_netherite(false),
        ),
        (
            RegistryKey::vanilla("creeper"),
            base.derive(2.0, 1.0)
                .with_netherite(false)
                .with_color(ChatColor::Green),
        ),
        (
            RegistryKey::vanilla("wither_skeleton"),
            base.derive(2.0, 1.5)
                .hard_only()
                .with_color(ChatColor::DarkGray),
        ),
        (
            RegistryKey::vanilla("wither"),
            base.derive(3.0, 2.0)
                .hard_only()
                .with_netherite(false)
                .with_color(ChatColor::DarkPurple)
                .with_reward(RegistryKey::modded("shiny/wither")),
        ),
    ]
}

impl ProfileRegistry {
    /// Registry with only a base profile and no per-type entries.
    pub fn empty(base: ShinyProfile, fallback: ProfileFallback) -> Self {
        Self {
            base,
            profiles: BTreeMap::new(),
            fallback,
        }
    }

    /// Base profile, built-in table, then configured adjustments.
    pub fn from_config(config: &ShinyConfig) -> Self {
        let base = ShinyProfile::base(config);
        let mut registry = Self::empty(base.clone(), config.general.profile_fallback);

        for (kind, profile) in builtin_profiles(&base) {
            registry.register(kind, profile);
        }

        for (raw, adjust) in &config.profiles {
            let kind = match RegistryKey::parse(&raw.to_ascii_lowercase()) {
                Ok(kind) => kind,
                Err(_) => {
                    let problem = ConfigError::BadProfileKey(raw.clone());
                    warn!(%problem, "Skipping profile adjustment");
                    continue;
                }
            };
            if adjust.disabled {
                registry.profiles.remove(&kind);
                debug!(%kind, "Shiny profile disabled by config");
                continue;
            }
            let start = registry.profiles.get(&kind).unwrap_or(&base);
            let profile = start.with_override(adjust);
            registry.register(kind, profile);
        }

        debug!(
            profiles = registry.profiles.len(),
            fallback = ?registry.fallback,
            "Built shiny profile registry"
        );
        registry
    }

    /// Profile built from the global settings alone.
    pub fn base(&self) -> &ShinyProfile {
        &self.base
    }

    /// What unlisted types get.
    pub fn fallback(&self) -> ProfileFallback {
        self.fallback
    }

    /// Profile for a creature type, or `None` when the type may not become shiny.
    pub fn profile_for(&self, kind: &RegistryKey) -> Option<&ShinyProfile> {
        match self.profiles.get(kind) {
            Some(profile) => Some(profile),
            None => match self.fallback {
                ProfileFallback::AllowList => None,
                ProfileFallback::GlobalDefault => Some(&self.base),
            },
        }
    }

    /// Whether `kind` may be spawned for a player with the given hard-mode setting.
    pub fn is_eligible(&self, kind: &RegistryKey, hard_mode: bool) -> bool {
        self.profile_for(kind)
            .is_some_and(|profile| !profile.hard_only || hard_mode)
    }

    /// Registered types a player may receive, in stable order.
    ///
    /// Hard mode adds the hard-only types to the pool; it never removes the others.
    pub fn eligible_types(&self, hard_mode: bool) -> Vec<&RegistryKey> {
        self.profiles
            .iter()
            .filter(|(_, profile)| !profile.hard_only || hard_mode)
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Uniform pick among [`Self::eligible_types`]. `None` when the pool is empty.
    pub fn random_eligible_type<R: Rng + ?Sized>(
        &self,
        hard_mode: bool,
        rng: &mut R,
    ) -> Option<RegistryKey> {
        self.eligible_types(hard_mode)
            .choose(rng)
            .map(|kind| (*kind).clone())
    }

    /// Insert or replace the profile for `kind`.
    pub fn register(&mut self, kind: RegistryKey, profile: ShinyProfile) {
        self.profiles.insert(kind, profile);
    }

    /// Registered types in key order.
    pub fn types(&self) -> impl Iterator<Item = &RegistryKey> {
        self.profiles.keys()
    }

    /// Number of registered types (fallback not counted).
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no type is registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
