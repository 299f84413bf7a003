//! Timer-driven shiny spawns.
//!
//! The scheduler owns every piece of mutable shiny state: per-player timers,
//! the tracking map, preferences and the RNG. The host calls [`SpawnScheduler::tick`]
//! once per simulation tick; real work happens on every 20th call.
//!
//! Per player, each second:
//! 1. Spawns disabled → nothing.
//! 2. Single-shiny policy and a live tracked creature → nothing (stale entries purged).
//! 3. No timer → assign a random interval.
//! 4. Otherwise count down; at zero try a spawn and assign a fresh interval
//!    whether or not the spawn worked.

use crate::config::ShinyConfig;
use crate::error::SpawnError;
use crate::preferences::PreferenceStore;
use crate::registry::ProfileRegistry;
use crate::tracking::ShinyTracker;
use crate::transform::{is_shiny, TransformOutcome, Transformer};
use rand::rngs::StdRng;
use rand::Rng;
use shinymobs_core::{
    scoped_rng, ChatColor, ChatMessage, PlayerId, RegistryKey, SimTick, TICKS_PER_MINUTE,
    TICKS_PER_SECOND,
};
use shinymobs_world::{find_spawn_position, BlockPos, CreatureHandle, PlayerInfo, ShinyWorld};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// RNG domain mixed into the world seed for scheduler randomness.
const SCHEDULER_RNG_DOMAIN: u64 = 0x5348_494e_5953_5057;

/// Uniform whole minutes in `[min, max]`; `min` when `max <= min`.
pub fn random_interval_minutes<R: Rng + ?Sized>(min: u32, max: u32, rng: &mut R) -> u32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// `m:ss` for a tick countdown. Negative values read as `0:00`.
pub fn format_countdown(ticks: i64) -> String {
    let seconds = ticks.max(0) / TICKS_PER_SECOND as i64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Where a player stands in the spawn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No timer yet; one is assigned on the next pass.
    Uninitialized,
    /// Running; the next spawn is due when it reaches zero.
    CountingDown {
        /// Ticks left, always positive.
        ticks_remaining: i64,
    },
    /// Expired; a spawn attempt is due.
    PendingSpawn,
}

/// Result of a successful spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnReport {
    /// Player the shiny was spawned for.
    pub player: PlayerId,
    /// The new shiny.
    pub creature: CreatureHandle,
    /// Its creature type.
    pub kind: RegistryKey,
    /// Where it was placed.
    pub position: BlockPos,
    /// Spawned under a hard-only profile.
    pub hard: bool,
    /// Whether the player was sent a chat notification.
    pub notified: bool,
}

/// Answer to a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShinyStatus {
    /// Timed spawns are on for the player.
    pub spawn_enabled: bool,
    /// Hard mode is on for the player.
    pub hard_mode: bool,
    /// Ticks until the next spawn, when spawns are enabled and a timer is running.
    pub countdown: Option<i64>,
    /// The live tracked shiny, if any.
    pub active_creature: Option<CreatureHandle>,
}

/// Result of [`SpawnScheduler::disable_spawns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisableReport {
    /// Spawns were on before the call.
    pub was_enabled: bool,
    /// Live creature that was despawned.
    pub removed: Option<CreatureHandle>,
}

/// Per-player timers and the spawn pipeline: placement, type choice, transformation, tracking.
pub struct SpawnScheduler {
    config: ShinyConfig,
    transformer: Transformer,
    preferences: PreferenceStore,
    timers: BTreeMap<PlayerId, i64>,
    tracker: ShinyTracker,
    tick: SimTick,
    rng: StdRng,
}

impl SpawnScheduler {
    /// Scheduler with a registry built from `config`.
    pub fn new(config: ShinyConfig, seed: u64) -> Self {
        let registry = ProfileRegistry::from_config(&config);
        Self::with_registry(config, registry, seed)
    }

    /// Scheduler with a prebuilt registry.
    pub fn with_registry(config: ShinyConfig, registry: ProfileRegistry, seed: u64) -> Self {
        let transformer = Transformer::new(registry, config.general.natural_despawn);
        Self {
            config,
            transformer,
            preferences: PreferenceStore::new(),
            timers: BTreeMap::new(),
            tracker: ShinyTracker::new(),
            tick: SimTick::ZERO,
            rng: scoped_rng(seed, SCHEDULER_RNG_DOMAIN, SimTick::ZERO),
        }
    }

    /// Settings the scheduler was built with.
    pub fn config(&self) -> &ShinyConfig {
        &self.config
    }

    /// Profiles used for type choice and transformation.
    pub fn registry(&self) -> &ProfileRegistry {
        self.transformer.registry()
    }

    /// Mutable profile table, e.g. to register extra types.
    pub fn registry_mut(&mut self) -> &mut ProfileRegistry {
        self.transformer.registry_mut()
    }

    /// The transformation engine.
    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Player flags.
    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Mutable player flags (loading at startup).
    pub fn preferences_mut(&mut self) -> &mut PreferenceStore {
        &mut self.preferences
    }

    /// Player → live shiny map.
    pub fn tracker(&self) -> &ShinyTracker {
        &self.tracker
    }

    /// Mutable tracking map.
    pub fn tracker_mut(&mut self) -> &mut ShinyTracker {
        &mut self.tracker
    }

    /// Raw ticks counted while the feature was enabled.
    pub fn current_tick(&self) -> SimTick {
        self.tick
    }

    /// The seeded RNG every roll draws from.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Timer state derived from the raw countdown.
    pub fn timer_state(&self, player: PlayerId) -> TimerState {
        match self.timers.get(&player) {
            None => TimerState::Uninitialized,
            Some(&ticks) if ticks <= 0 => TimerState::PendingSpawn,
            Some(&ticks) => TimerState::CountingDown {
                ticks_remaining: ticks,
            },
        }
    }

    /// Raw countdown in ticks, if a timer exists.
    pub fn timer_ticks(&self, player: PlayerId) -> Option<i64> {
        self.timers.get(&player).copied()
    }

    /// Overwrite a player's countdown.
    pub fn set_timer(&mut self, player: PlayerId, ticks: i64) {
        self.timers.insert(player, ticks);
    }

    /// Number of players with a running timer.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Advance one raw simulation tick. Returns the spawns made on this tick.
    pub fn tick<W: ShinyWorld + ?Sized>(&mut self, world: &mut W) -> Vec<SpawnReport> {
        if !self.config.general.enabled {
            return Vec::new();
        }
        self.tick = self.tick.advance(1);
        if !self.tick.is_second_boundary() {
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for player in world.online_players() {
            match self.process_player(world, &player) {
                Ok(Some(report)) => spawned.push(report),
                Ok(None) => {}
                Err(err) => warn!(player = %player.id, player_name = %player.name, %err, "Shiny spawn skipped"),
            }
        }
        spawned
    }

    /// One second of scheduler work for one player.
    pub fn process_player<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        player: &PlayerInfo,
    ) -> Result<Option<SpawnReport>, SpawnError> {
        if self.preferences.is_spawn_disabled(player.id) {
            return Ok(None);
        }

        if self.config.general.one_shiny_per_player
            && self.tracker.live_creature(world, player.id).is_some()
        {
            return Ok(None);
        }

        let Some(remaining) = self.timers.get(&player.id).copied() else {
            let minutes = self.reset_timer(player.id);
            debug!(player = %player.name, minutes, "Set shiny spawn timer");
            return Ok(None);
        };

        let remaining = remaining - TICKS_PER_SECOND as i64;
        self.timers.insert(player.id, remaining);
        if remaining > 0 {
            return Ok(None);
        }

        let result = self.spawn_at(world, player, None);
        self.reset_timer(player.id);
        result.map(Some)
    }

    /// Manual spawn for an online player, bypassing the timer and the single-shiny policy.
    ///
    /// A forced type must have a profile the player is eligible for.
    pub fn spawn_for<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        player: PlayerId,
        forced: Option<&RegistryKey>,
    ) -> Result<SpawnReport, SpawnError> {
        let info = world
            .player(player)
            .ok_or(SpawnError::PlayerOffline(player))?;
        self.spawn_at(world, &info, forced)
    }

    fn spawn_at<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        player: &PlayerInfo,
        forced: Option<&RegistryKey>,
    ) -> Result<SpawnReport, SpawnError> {
        let distance = self.config.spawn.spawn_distance;
        let position = find_spawn_position(world, player.position, distance, &mut self.rng)
            .ok_or(SpawnError::NoSpawnPosition {
                player: player.id,
                distance,
            })?;

        let hard_mode = self.preferences.is_hard_mode_enabled(player.id);
        let kind = self.choose_kind(hard_mode, forced)?;

        let creature = world
            .create_creature(&kind)
            .ok_or_else(|| SpawnError::CreationFailed(kind.clone()))?;

        let outcome = self
            .transformer
            .make_shiny(world, creature, hard_mode, &mut self.rng);
        let hard = match outcome {
            TransformOutcome::Transformed { hard, .. } => hard,
            TransformOutcome::Skipped(reason) => {
                world.discard(creature);
                return Err(SpawnError::Rejected { kind, reason });
            }
        };

        let yaw = self.rng.gen_range(0.0f32..360.0);
        world.add_to_world(creature, position.bottom_center(), yaw);
        self.tracker.track(player.id, creature);

        let notified = self.config.spawn.show_spawn_message;
        if notified {
            world.send_message(player.id, self.spawn_message(position));
        }

        info!(%kind, player = %player.name, %position, hard, "Spawned shiny creature");
        Ok(SpawnReport {
            player: player.id,
            creature,
            kind,
            position,
            hard,
            notified,
        })
    }

    fn choose_kind(
        &mut self,
        hard_mode: bool,
        forced: Option<&RegistryKey>,
    ) -> Result<RegistryKey, SpawnError> {
        let registry = self.transformer.registry();
        match forced {
            Some(kind) => {
                let profile = registry
                    .profile_for(kind)
                    .ok_or_else(|| SpawnError::UnknownCreatureType(kind.clone()))?;
                if profile.hard_only && !hard_mode {
                    return Err(SpawnError::NotEligible(kind.clone()));
                }
                Ok(kind.clone())
            }
            None => registry
                .random_eligible_type(hard_mode, &mut self.rng)
                .ok_or(SpawnError::NoEligibleType { hard_mode }),
        }
    }

    fn spawn_message(&self, position: BlockPos) -> ChatMessage {
        let text = if self.config.spawn.show_coordinates {
            format!(
                "⭐ A Shiny Mob has spawned at X: {}, Y: {}, Z: {}! ⭐",
                position.x, position.y, position.z
            )
        } else {
            "⭐ A Shiny Mob has spawned nearby! ⭐".to_string()
        };
        ChatMessage::new(text, ChatColor::Gold).bold()
    }

    /// Assign a fresh random countdown. Returns the interval in minutes.
    fn reset_timer(&mut self, player: PlayerId) -> u32 {
        let minutes = random_interval_minutes(
            self.config.spawn.min_spawn_minutes,
            self.config.spawn.max_spawn_minutes,
            &mut self.rng,
        );
        self.timers
            .insert(player, i64::from(minutes) * TICKS_PER_MINUTE as i64);
        minutes
    }

    /// Turn spawns on. Returns `false` when they already were; a fresh timer starts otherwise.
    pub fn enable_spawns(&mut self, player: PlayerId) -> bool {
        if !self.preferences.is_spawn_disabled(player) {
            return false;
        }
        self.preferences.set_spawn_enabled(player, true);
        let minutes = self.reset_timer(player);
        debug!(%player, minutes, "Shiny spawns enabled");
        true
    }

    /// Turn spawns off, clear the timer and despawn the player's live shiny.
    pub fn disable_spawns<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        player: PlayerId,
    ) -> DisableReport {
        let was_enabled = !self.preferences.is_spawn_disabled(player);
        self.preferences.set_spawn_enabled(player, false);
        self.timers.remove(&player);

        let removed = self.tracker.live_creature(world, player);
        if let Some(creature) = removed {
            world.discard(creature);
        }
        self.tracker.untrack(player);

        DisableReport {
            was_enabled,
            removed,
        }
    }

    /// Returns `false` when the flag already had that value.
    pub fn set_hard_mode(&mut self, player: PlayerId, enabled: bool) -> bool {
        if self.preferences.is_hard_mode_enabled(player) == enabled {
            return false;
        }
        self.preferences.set_hard_mode_enabled(player, enabled);
        true
    }

    /// Flags, countdown and live shiny for one player. Purges a stale tracking entry.
    pub fn status<W: ShinyWorld + ?Sized>(&mut self, world: &W, player: PlayerId) -> ShinyStatus {
        let spawn_enabled = !self.preferences.is_spawn_disabled(player);
        ShinyStatus {
            spawn_enabled,
            hard_mode: self.preferences.is_hard_mode_enabled(player),
            countdown: spawn_enabled
                .then(|| self.timers.get(&player).copied())
                .flatten(),
            active_creature: self.tracker.live_creature(world, player),
        }
    }

    /// Despawn every tracked live shiny and empty the tracking map. Timers are kept.
    pub fn clear_tracked<W: ShinyWorld + ?Sized>(&mut self, world: &mut W) -> usize {
        let mut removed = 0;
        for (_, creature) in self.tracker.drain() {
            if world.is_live(creature) {
                world.discard(creature);
                removed += 1;
            }
        }
        info!(removed, "Cleared tracked shiny creatures");
        removed
    }

    /// Despawn every marked creature in the world, tracked or not, then reset tracking and timers.
    pub fn kill_all<W: ShinyWorld + ?Sized>(&mut self, world: &mut W) -> usize {
        let mut removed = 0;
        for creature in world.live_creatures() {
            if is_shiny(world, creature) {
                world.discard(creature);
                removed += 1;
            }
        }
        for (_, creature) in self.tracker.drain() {
            if world.is_live(creature) {
                world.discard(creature);
                removed += 1;
            }
        }
        self.timers.clear();
        info!(removed, "Killed all shiny creatures");
        removed
    }

    /// Forget everything about a player: preferences, timer and tracked creature.
    pub fn purge_player<W: ShinyWorld + ?Sized>(&mut self, world: &mut W, player: PlayerId) {
        self.preferences.remove_player(player);
        self.timers.remove(&player);
        if let Some(creature) = self.tracker.untrack(player) {
            if world.is_live(creature) {
                world.discard(creature);
            }
        }
    }

    /// Drop in-memory session state (server stop). Preferences are kept.
    pub fn reset_session(&mut self) {
        self.tracker.drain();
        self.timers.clear();
        self.tick = SimTick::ZERO;
    }
}
