//! Creature handles and capability classification.
//!
//! The world owns every creature. The core only ever holds a
//! [`CreatureHandle`], and must ask the world whether it is still live before
//! touching it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a world-owned creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureHandle(pub u64);

impl fmt::Display for CreatureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Capability classification supplied by the host for a creature.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CreatureTraits: u8 {
        /// Controlled by a human player.
        const PLAYER = 0b0000_0001;
        /// Counts as a hostile monster (damage scaling applies).
        const HOSTILE = 0b0000_0010;
        /// Attacks with projectiles.
        const RANGED_ATTACKER = 0b0000_0100;
        /// Listed in the shiny gear allow-list tag.
        const GEAR_COMPATIBLE = 0b0000_1000;
        /// Has mob AI (equipment, drop chances, despawn rules).
        const MOB = 0b0001_0000;
    }
}

impl Default for CreatureTraits {
    fn default() -> Self {
        CreatureTraits::empty()
    }
}

/// Attributes the transformation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    MaxHealth,
    AttackDamage,
    MovementSpeed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_combine() {
        let skeleton = CreatureTraits::MOB
            | CreatureTraits::HOSTILE
            | CreatureTraits::RANGED_ATTACKER
            | CreatureTraits::GEAR_COMPATIBLE;
        assert!(skeleton.contains(CreatureTraits::RANGED_ATTACKER));
        assert!(!skeleton.contains(CreatureTraits::PLAYER));
        assert_eq!(CreatureTraits::default(), CreatureTraits::empty());
    }
}
