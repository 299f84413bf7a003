#![warn(missing_docs)]
//! Shiny mob core: settings, per-type profiles, the transformation engine,
//! player preferences and the timer-driven spawn scheduler.
//!
//! Everything here talks to the host through the traits in
//! `shinymobs_world`, so the same code drives a real server adapter and the
//! in-memory test world.

mod config;
mod error;
mod events;
mod preferences;
mod profile;
mod registry;
mod scheduler;
mod tracking;
mod transform;

pub use config::*;
pub use error::{ConfigError, SpawnError};
pub use events::{DeathOutcome, ShinyEvents, KILL_EXPERIENCE, SHINY_FIRE_TICKS};
pub use preferences::*;
pub use profile::{ShinyProfile, FALLBACK_TEAM_COLOR};
pub use registry::{builtin_profiles, ProfileRegistry};
pub use scheduler::*;
pub use tracking::ShinyTracker;
pub use transform::*;
