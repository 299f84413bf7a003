use serde::{Deserialize, Serialize};

/// Types of enchantments that can be applied to equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnchantmentType {
    // Weapon enchantments
    /// Increases attack damage
    Sharpness,
    /// Sets targets on fire
    FireAspect,
    /// Increases mob loot drops
    Looting,
    /// Increases sweep attack damage
    SweepingEdge,

    // Armor enchantments
    /// Reduces damage from all sources
    Protection,
    /// Reduces fall damage (boots)
    FeatherFalling,
    /// Extends underwater breathing (helmet)
    Respiration,
    /// Removes underwater mining speed penalty (helmet).
    AquaAffinity,
    /// Increases underwater movement speed (boots).
    DepthStrider,
    /// Damages attackers
    Thorns,

    // Universal enchantments
    /// Reduces durability loss
    Unbreaking,
    /// Repairs item using XP
    Mending,
}

impl EnchantmentType {
    /// Get the maximum level for this enchantment
    pub fn max_level(&self) -> u8 {
        match self {
            EnchantmentType::Sharpness => 5,
            EnchantmentType::FireAspect => 2,
            EnchantmentType::Looting => 3,
            EnchantmentType::SweepingEdge => 3,
            EnchantmentType::Protection => 4,
            EnchantmentType::FeatherFalling => 4,
            EnchantmentType::Respiration => 3,
            EnchantmentType::AquaAffinity => 1,
            EnchantmentType::DepthStrider => 3,
            EnchantmentType::Thorns => 3,
            EnchantmentType::Unbreaking => 3,
            EnchantmentType::Mending => 1,
        }
    }
}

/// An enchantment with a specific level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enchantment {
    /// The type of enchantment
    pub enchantment_type: EnchantmentType,
    /// The level of the enchantment (1 to max_level)
    pub level: u8,
}

impl Enchantment {
    /// Create a new enchantment
    pub fn new(enchantment_type: EnchantmentType, level: u8) -> Self {
        let max_level = enchantment_type.max_level();
        let level = level.clamp(1, max_level);
        Self {
            enchantment_type,
            level,
        }
    }

    /// The enchantment at its maximum level.
    pub fn max(enchantment_type: EnchantmentType) -> Self {
        Self::new(enchantment_type, enchantment_type.max_level())
    }
}
