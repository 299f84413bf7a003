use crate::transform::SkipReason;
use shinymobs_core::{PlayerId, RegistryKey};
use thiserror::Error;

/// Why a spawn attempt produced no creature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The target player is not online.
    #[error("player {0} is not online")]
    PlayerOffline(PlayerId),
    /// Placement search found nothing.
    #[error("no valid spawn position within {distance} blocks of player {player}")]
    NoSpawnPosition {
        /// Player the search was centred on.
        player: PlayerId,
        /// Search radius.
        distance: u32,
    },
    /// The eligible pool is empty.
    #[error("no shiny profile is eligible (hard mode: {hard_mode})")]
    NoEligibleType {
        /// Hard-mode flag the pool was filtered with.
        hard_mode: bool,
    },
    /// Forced type with no profile.
    #[error("{0} has no shiny profile")]
    UnknownCreatureType(RegistryKey),
    /// Forced hard-only type for a player not in hard mode.
    #[error("{0} is hard-mode only; enable hard mode to spawn it")]
    NotEligible(RegistryKey),
    /// The host has no such creature type.
    #[error("the host could not create a {0}")]
    CreationFailed(RegistryKey),
    /// The transformation declined; the creature was discarded.
    #[error("{kind} cannot become shiny ({reason:?})")]
    Rejected {
        /// Creature type that was created.
        kind: RegistryKey,
        /// Why it was skipped.
        reason: SkipReason,
    },
}

/// Invalid configuration value found while loading settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A number outside its allowed range (clamped).
    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Dotted settings key.
        key: &'static str,
        /// Value as read.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// A color name no team color matches.
    #[error("{key} = {value:?} is not a valid color")]
    UnknownColor {
        /// Dotted settings key.
        key: String,
        /// Color name as read.
        value: String,
    },
    /// A `[profiles]` key that does not parse as a type id.
    #[error("[profiles] key {0:?} is not a valid creature type id")]
    BadProfileKey(String),
}
