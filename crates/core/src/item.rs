//! Equipment items handed to shiny creatures.

use crate::enchantment::{Enchantment, EnchantmentType};
use serde::{Deserialize, Serialize};

/// Item type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Top-tier helmet
    NetheriteHelmet,
    /// Top-tier chestplate
    NetheriteChestplate,
    /// Top-tier leggings
    NetheriteLeggings,
    /// Top-tier boots
    NetheriteBoots,
    /// Top-tier melee weapon
    NetheriteSword,
    /// Ranged weapon (arrows)
    Bow,
    /// Ranged weapon (bolts)
    Crossbow,
    /// Default zombie-ish melee weapons some hosts hand out
    IronSword,
}

impl ItemType {
    /// Maximum durability of a fresh item.
    pub fn durability(self) -> u32 {
        match self {
            ItemType::NetheriteHelmet => 407,
            ItemType::NetheriteChestplate => 592,
            ItemType::NetheriteLeggings => 555,
            ItemType::NetheriteBoots => 481,
            ItemType::NetheriteSword => 2031,
            ItemType::Bow => 384,
            ItemType::Crossbow => 465,
            ItemType::IronSword => 250,
        }
    }
}

/// Slots a creature can hold equipment in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    /// Helmet slot
    Head,
    /// Chestplate slot
    Chest,
    /// Leggings slot
    Legs,
    /// Boots slot
    Feet,
    /// Weapon hand
    MainHand,
    /// Shield hand
    OffHand,
}

/// A single equipped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Type of item
    pub item_type: ItemType,
    /// Quantity in stack
    pub count: u32,
    /// Remaining durability
    pub durability: u32,
    /// Enchantments applied to this item
    pub enchantments: Vec<Enchantment>,
}

impl ItemStack {
    /// Create a fresh, unenchanted single item.
    pub fn new(item_type: ItemType) -> Self {
        Self {
            item_type,
            count: 1,
            durability: item_type.durability(),
            enchantments: Vec::new(),
        }
    }

    /// Replace all enchantments, keeping the highest level per type.
    pub fn set_enchantments(&mut self, enchantments: impl IntoIterator<Item = Enchantment>) {
        self.enchantments.clear();
        for enchantment in enchantments {
            match self
                .enchantments
                .iter_mut()
                .find(|e| e.enchantment_type == enchantment.enchantment_type)
            {
                Some(existing) => existing.level = existing.level.max(enchantment.level),
                None => self.enchantments.push(enchantment),
            }
        }
    }

    /// Level of the given enchantment, or 0 when absent.
    pub fn enchantment_level(&self, enchantment_type: EnchantmentType) -> u8 {
        self.enchantments
            .iter()
            .filter(|e| e.enchantment_type == enchantment_type)
            .map(|e| e.level)
            .max()
            .unwrap_or(0)
    }
}
