#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod chat;
pub mod enchantment;
pub mod item;
pub mod player;
pub mod registry;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use chat::{ChatColor, ChatMessage, TEAM_PALETTE};
pub use enchantment::{Enchantment, EnchantmentType};
pub use item::{EquipmentSlot, ItemStack, ItemType};
pub use player::{PlayerId, PlayerIdError};
pub use registry::{RegistryKey, RegistryKeyError};

/// Simulation rate of the host server (20 TPS => 50 ms per tick).
pub const TICKS_PER_SECOND: u64 = 20;

/// Ticks in one in-game minute of wall-clock time.
pub const TICKS_PER_MINUTE: u64 = TICKS_PER_SECOND * 60;

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }

    /// True on the last raw tick of every simulated second.
    pub fn is_second_boundary(self) -> bool {
        self.0 > 0 && self.0 % TICKS_PER_SECOND == 0
    }
}

/// Helper to derive a reproducible RNG seeded by world + tick domains.
pub fn scoped_rng(world_seed: u64, domain: u64, tick: SimTick) -> StdRng {
    let seed = world_seed ^ domain ^ tick.0;
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn second_boundary_every_twenty_ticks() {
        assert!(!SimTick::ZERO.is_second_boundary());
        assert!(!SimTick(19).is_second_boundary());
        assert!(SimTick(20).is_second_boundary());
        assert!(SimTick(40).is_second_boundary());
        assert!(!SimTick(41).is_second_boundary());
    }

    #[test]
    fn scoped_rng_is_reproducible() {
        let a: u64 = scoped_rng(7, 3, SimTick(100)).gen();
        let b: u64 = scoped_rng(7, 3, SimTick(100)).gen();
        assert_eq!(a, b);
    }
}
