//! Narrow interface the shiny core uses to talk to the host engine.
//!
//! Split by concern so placement search only needs [`Terrain`] and the
//! transformation only needs [`Creatures`]. [`ShinyWorld`] bundles all three
//! for the scheduler and is implemented automatically.

use crate::creature::{Attribute, CreatureHandle, CreatureTraits};
use crate::pos::{BlockPos, Vec3};
use shinymobs_core::{ChatColor, ChatMessage, EquipmentSlot, ItemStack, ItemType, PlayerId, RegistryKey};

/// Block queries used by placement search.
pub trait Terrain {
    /// True when an entity can occupy the cell (air).
    fn is_passable(&self, pos: BlockPos) -> bool;
    /// True when the top face of the block at `pos` can support a standing entity.
    fn is_sturdy_top(&self, pos: BlockPos) -> bool;
    /// Block light level (0-15) at the cell.
    fn block_light(&self, pos: BlockPos) -> u8;
    /// First free Y above the motion-blocking surface of the column (leaves ignored).
    fn surface_height(&self, x: i32, z: i32) -> i32;
}

/// Entity operations used by the transformation engine and scheduler.
pub trait Creatures {
    /// Instantiate a creature of `kind` outside the world. `None` if the type is unknown.
    fn create_creature(&mut self, kind: &RegistryKey) -> Option<CreatureHandle>;
    /// Place a created creature into the world at `pos` facing `yaw` degrees.
    fn add_to_world(&mut self, creature: CreatureHandle, pos: Vec3, yaw: f32);
    /// Whether the creature still exists and is alive.
    fn is_live(&self, creature: CreatureHandle) -> bool;
    /// Remove the creature without drops.
    fn discard(&mut self, creature: CreatureHandle);
    /// Every live creature currently in the world.
    fn live_creatures(&self) -> Vec<CreatureHandle>;

    fn kind(&self, creature: CreatureHandle) -> Option<RegistryKey>;
    fn traits(&self, creature: CreatureHandle) -> CreatureTraits;
    /// Localized display name of a creature type.
    fn type_display_name(&self, kind: &RegistryKey) -> String;
    fn position(&self, creature: CreatureHandle) -> Option<Vec3>;

    /// Boolean tag in the creature's persisted data; survives save/load.
    fn persistent_flag(&self, creature: CreatureHandle, key: &str) -> bool;
    fn set_persistent_flag(&mut self, creature: CreatureHandle, key: &str, value: bool);

    /// Base value of an attribute, or `None` if the creature lacks it.
    fn attribute_base(&self, creature: CreatureHandle, attribute: Attribute) -> Option<f64>;
    fn set_attribute_base(&mut self, creature: CreatureHandle, attribute: Attribute, value: f64);
    fn set_health(&mut self, creature: CreatureHandle, health: f32);

    fn held_item(&self, creature: CreatureHandle) -> Option<ItemType>;
    fn set_equipment(&mut self, creature: CreatureHandle, slot: EquipmentSlot, stack: ItemStack);
    fn set_drop_chance(&mut self, creature: CreatureHandle, slot: EquipmentSlot, chance: f32);

    fn set_glowing(&mut self, creature: CreatureHandle, glowing: bool);
    fn has_team(&self, name: &str) -> bool;
    fn create_team(&mut self, name: &str, color: ChatColor);
    fn join_team(&mut self, creature: CreatureHandle, team: &str);

    fn set_custom_name(&mut self, creature: CreatureHandle, name: ChatMessage, visible: bool);
    /// Opt the creature out of natural despawning.
    fn set_persistence_required(&mut self, creature: CreatureHandle);
}

/// Snapshot of an online player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec3,
}

/// Side effects granted to a player for defeating a shiny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub experience: u32,
    pub loot_table: Option<RegistryKey>,
}

/// Player-facing queries and side effects.
pub trait Players {
    fn online_players(&self) -> Vec<PlayerInfo>;
    fn player(&self, id: PlayerId) -> Option<PlayerInfo>;
    fn send_message(&mut self, id: PlayerId, message: ChatMessage);
    fn grant_reward(&mut self, id: PlayerId, reward: &Reward);
    fn set_player_on_fire(&mut self, id: PlayerId, ticks: u32);
}

/// Everything the spawn scheduler needs from the host.
pub trait ShinyWorld: Terrain + Creatures + Players {}

impl<T: Terrain + Creatures + Players> ShinyWorld for T {}
