//! In-memory host world.
//!
//! A sparse voxel map plus entity, scoreboard and player tables that
//! implements every collaborator trait. The headless driver runs on it and
//! the test suites use it as their world double.

use crate::access::{Creatures, PlayerInfo, Players, Reward, Terrain};
use crate::block::{BlockId, Voxel, BLOCK_STONE};
use crate::creature::{Attribute, CreatureHandle, CreatureTraits};
use crate::pos::{BlockPos, Vec3};
use shinymobs_core::{
    ChatColor, ChatMessage, EquipmentSlot, ItemStack, ItemType, PlayerId, RegistryKey,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Lowest Y reported by [`Terrain::surface_height`] for an empty column.
pub const WORLD_BOTTOM: i32 = -64;

/// Highest buildable Y.
pub const WORLD_TOP: i32 = 320;

/// Blueprint used by [`Creatures::create_creature`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureTemplate {
    pub display_name: String,
    pub traits: CreatureTraits,
    pub max_health: f64,
    /// `None` for creatures without a melee attack attribute.
    pub attack_damage: Option<f64>,
    pub movement_speed: f64,
    pub held_item: Option<ItemType>,
}

impl CreatureTemplate {
    fn new(display_name: &str, traits: CreatureTraits, max_health: f64, movement_speed: f64) -> Self {
        Self {
            display_name: display_name.to_string(),
            traits,
            max_health,
            attack_damage: None,
            movement_speed,
            held_item: None,
        }
    }

    fn attack(mut self, damage: f64) -> Self {
        self.attack_damage = Some(damage);
        self
    }

    fn holding(mut self, item: ItemType) -> Self {
        self.held_item = Some(item);
        self
    }
}

/// Vanilla creature blueprints keyed by type id.
pub fn vanilla_templates() -> BTreeMap<RegistryKey, CreatureTemplate> {
    let hostile = CreatureTraits::MOB | CreatureTraits::HOSTILE;
    let geared = hostile | CreatureTraits::GEAR_COMPATIBLE;
    let archer = geared | CreatureTraits::RANGED_ATTACKER;

    let mut templates = BTreeMap::new();
    templates.insert(
        RegistryKey::vanilla("zombie"),
        CreatureTemplate::new("Zombie", geared, 20.0, 0.23).attack(3.0),
    );
    templates.insert(
        RegistryKey::vanilla("husk"),
        CreatureTemplate::new("Husk", geared, 20.0, 0.23).attack(3.0),
    );
    templates.insert(
        RegistryKey::vanilla("skeleton"),
        CreatureTemplate::new("Skeleton", archer, 20.0, 0.25)
            .attack(2.0)
            .holding(ItemType::Bow),
    );
    templates.insert(
        RegistryKey::vanilla("stray"),
        CreatureTemplate::new("Stray", archer, 20.0, 0.25)
            .attack(2.0)
            .holding(ItemType::Bow),
    );
    templates.insert(
        RegistryKey::vanilla("pillager"),
        CreatureTemplate::new("Pillager", archer, 24.0, 0.35)
            .attack(5.0)
            .holding(ItemType::Crossbow),
    );
    templates.insert(
        RegistryKey::vanilla("wither_skeleton"),
        CreatureTemplate::new("Wither Skeleton", geared, 20.0, 0.25).attack(4.0),
    );
    templates.insert(
        RegistryKey::vanilla("spider"),
        CreatureTemplate::new("Spider", hostile, 16.0, 0.3).attack(2.0),
    );
    templates.insert(
        RegistryKey::vanilla("creeper"),
        CreatureTemplate::new("Creeper", hostile, 20.0, 0.25),
    );
    templates.insert(
        RegistryKey::vanilla("wither"),
        CreatureTemplate::new("Wither", hostile | CreatureTraits::RANGED_ATTACKER, 300.0, 0.6)
            .attack(2.0),
    );
    templates.insert(
        RegistryKey::vanilla("pig"),
        CreatureTemplate::new("Pig", CreatureTraits::MOB, 10.0, 0.25),
    );
    templates.insert(
        RegistryKey::vanilla("player"),
        CreatureTemplate::new("Player", CreatureTraits::PLAYER, 20.0, 0.1).attack(1.0),
    );
    templates
}

/// Full state of one creature.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatureState {
    pub kind: RegistryKey,
    pub traits: CreatureTraits,
    pub position: Option<Vec3>,
    pub yaw: f32,
    pub in_world: bool,
    pub alive: bool,
    pub flags: BTreeMap<String, bool>,
    pub attributes: BTreeMap<Attribute, f64>,
    pub health: f32,
    pub equipment: BTreeMap<EquipmentSlot, ItemStack>,
    pub drop_chances: BTreeMap<EquipmentSlot, f32>,
    pub glowing: bool,
    pub team: Option<String>,
    pub custom_name: Option<ChatMessage>,
    pub custom_name_visible: bool,
    pub persistence_required: bool,
}

/// Scoreboard team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub color: ChatColor,
    pub members: BTreeSet<CreatureHandle>,
}

/// Player record, including everything the core sent to them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub info: PlayerInfo,
    pub online: bool,
    pub inbox: Vec<ChatMessage>,
    pub experience: u32,
    pub loot_tables: Vec<RegistryKey>,
    pub fire_ticks: u32,
}

/// Sparse in-memory implementation of the host world.
#[derive(Debug, Clone)]
pub struct MemoryWorld {
    voxels: HashMap<BlockPos, Voxel>,
    /// Voxel reported for cells never written.
    fill: Voxel,
    templates: BTreeMap<RegistryKey, CreatureTemplate>,
    creatures: BTreeMap<CreatureHandle, CreatureState>,
    next_creature: u64,
    teams: BTreeMap<String, Team>,
    players: BTreeMap<PlayerId, PlayerState>,
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorld {
    /// Empty (all air) world with vanilla creature templates.
    pub fn new() -> Self {
        Self {
            voxels: HashMap::new(),
            fill: Voxel::default(),
            templates: vanilla_templates(),
            creatures: BTreeMap::new(),
            next_creature: 1,
            teams: BTreeMap::new(),
            players: BTreeMap::new(),
        }
    }

    /// World where every unset cell is solid stone.
    pub fn sealed() -> Self {
        Self {
            fill: Voxel::block(BLOCK_STONE),
            ..Self::new()
        }
    }

    // ---- terrain editing -------------------------------------------------

    pub fn voxel(&self, pos: BlockPos) -> Voxel {
        self.voxels.get(&pos).copied().unwrap_or(self.fill)
    }

    pub fn set_block(&mut self, pos: BlockPos, id: BlockId) {
        let light = self.voxel(pos).light_block;
        self.voxels.insert(
            pos,
            Voxel {
                id,
                light_block: light,
            },
        );
    }

    pub fn set_light(&mut self, pos: BlockPos, level: u8) {
        let mut voxel = self.voxel(pos);
        voxel.light_block = level.min(15);
        self.voxels.insert(pos, voxel);
    }

    /// Fill an inclusive box with one block id.
    pub fn fill(&mut self, min: BlockPos, max: BlockPos, id: BlockId) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_block(BlockPos::new(x, y, z), id);
                }
            }
        }
    }

    /// Light every cell of an inclusive box.
    pub fn fill_light(&mut self, min: BlockPos, max: BlockPos, level: u8) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_light(BlockPos::new(x, y, z), level);
                }
            }
        }
    }

    // ---- creatures -------------------------------------------------------

    pub fn creature(&self, handle: CreatureHandle) -> Option<&CreatureState> {
        self.creatures.get(&handle)
    }

    /// Simulate a death (the creature stays inspectable but is no longer live).
    pub fn kill(&mut self, handle: CreatureHandle) {
        if let Some(state) = self.creatures.get_mut(&handle) {
            state.alive = false;
        }
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// Create and place a creature in one step.
    pub fn spawn_creature(&mut self, kind: &RegistryKey, pos: Vec3) -> Option<CreatureHandle> {
        let handle = self.create_creature(kind)?;
        self.add_to_world(handle, pos, 0.0);
        Some(handle)
    }

    // ---- players ---------------------------------------------------------

    pub fn add_player(&mut self, id: PlayerId, name: impl Into<String>, position: Vec3) {
        self.players.insert(
            id,
            PlayerState {
                info: PlayerInfo {
                    id,
                    name: name.into(),
                    position,
                },
                online: true,
                inbox: Vec::new(),
                experience: 0,
                loot_tables: Vec::new(),
                fire_ticks: 0,
            },
        );
    }

    pub fn set_online(&mut self, id: PlayerId, online: bool) {
        if let Some(player) = self.players.get_mut(&id) {
            player.online = online;
        }
    }

    pub fn move_player(&mut self, id: PlayerId, position: Vec3) {
        if let Some(player) = self.players.get_mut(&id) {
            player.info.position = position;
        }
    }

    pub fn player_state(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn inbox(&self, id: PlayerId) -> &[ChatMessage] {
        self.players
            .get(&id)
            .map(|p| p.inbox.as_slice())
            .unwrap_or(&[])
    }
}

impl Terrain for MemoryWorld {
    fn is_passable(&self, pos: BlockPos) -> bool {
        self.voxel(pos).is_air()
    }

    fn is_sturdy_top(&self, pos: BlockPos) -> bool {
        self.voxel(pos).is_sturdy_top()
    }

    fn block_light(&self, pos: BlockPos) -> u8 {
        self.voxel(pos).light_block
    }

    fn surface_height(&self, x: i32, z: i32) -> i32 {
        if self.fill.is_motion_blocking_no_leaves() {
            return WORLD_TOP;
        }
        self.voxels
            .iter()
            .filter(|(pos, voxel)| pos.x == x && pos.z == z && voxel.is_motion_blocking_no_leaves())
            .map(|(pos, _)| pos.y + 1)
            .max()
            .unwrap_or(WORLD_BOTTOM)
    }
}

impl Creatures for MemoryWorld {
    fn create_creature(&mut self, kind: &RegistryKey) -> Option<CreatureHandle> {
        let template = self.templates.get(kind)?;

        let mut attributes = BTreeMap::new();
        attributes.insert(Attribute::MaxHealth, template.max_health);
        attributes.insert(Attribute::MovementSpeed, template.movement_speed);
        if let Some(damage) = template.attack_damage {
            attributes.insert(Attribute::AttackDamage, damage);
        }

        let mut equipment = BTreeMap::new();
        if let Some(item) = template.held_item {
            equipment.insert(EquipmentSlot::MainHand, ItemStack::new(item));
        }

        let state = CreatureState {
            kind: kind.clone(),
            traits: template.traits,
            position: None,
            yaw: 0.0,
            in_world: false,
            alive: true,
            flags: BTreeMap::new(),
            attributes,
            health: template.max_health as f32,
            equipment,
            drop_chances: BTreeMap::new(),
            glowing: false,
            team: None,
            custom_name: None,
            custom_name_visible: false,
            persistence_required: false,
        };

        let handle = CreatureHandle(self.next_creature);
        self.next_creature += 1;
        self.creatures.insert(handle, state);
        Some(handle)
    }

    fn add_to_world(&mut self, creature: CreatureHandle, pos: Vec3, yaw: f32) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.position = Some(pos);
            state.yaw = yaw;
            state.in_world = true;
        }
    }

    fn is_live(&self, creature: CreatureHandle) -> bool {
        self.creatures.get(&creature).is_some_and(|c| c.alive)
    }

    fn discard(&mut self, creature: CreatureHandle) {
        if let Some(state) = self.creatures.remove(&creature) {
            if let Some(team) = state.team.and_then(|name| self.teams.get_mut(&name)) {
                team.members.remove(&creature);
            }
        }
    }

    fn live_creatures(&self) -> Vec<CreatureHandle> {
        self.creatures
            .iter()
            .filter(|(_, c)| c.alive && c.in_world)
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn kind(&self, creature: CreatureHandle) -> Option<RegistryKey> {
        self.creatures.get(&creature).map(|c| c.kind.clone())
    }

    fn traits(&self, creature: CreatureHandle) -> CreatureTraits {
        self.creatures
            .get(&creature)
            .map(|c| c.traits)
            .unwrap_or_default()
    }

    fn type_display_name(&self, kind: &RegistryKey) -> String {
        self.templates
            .get(kind)
            .map(|t| t.display_name.clone())
            .unwrap_or_else(|| kind.path().to_string())
    }

    fn position(&self, creature: CreatureHandle) -> Option<Vec3> {
        self.creatures.get(&creature).and_then(|c| c.position)
    }

    fn persistent_flag(&self, creature: CreatureHandle, key: &str) -> bool {
        self.creatures
            .get(&creature)
            .and_then(|c| c.flags.get(key).copied())
            .unwrap_or(false)
    }

    fn set_persistent_flag(&mut self, creature: CreatureHandle, key: &str, value: bool) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.flags.insert(key.to_string(), value);
        }
    }

    fn attribute_base(&self, creature: CreatureHandle, attribute: Attribute) -> Option<f64> {
        self.creatures
            .get(&creature)
            .and_then(|c| c.attributes.get(&attribute).copied())
    }

    fn set_attribute_base(&mut self, creature: CreatureHandle, attribute: Attribute, value: f64) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.attributes.insert(attribute, value);
        }
    }

    fn set_health(&mut self, creature: CreatureHandle, health: f32) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            let max = state
                .attributes
                .get(&Attribute::MaxHealth)
                .copied()
                .unwrap_or(f64::from(health)) as f32;
            state.health = health.min(max).max(0.0);
        }
    }

    fn held_item(&self, creature: CreatureHandle) -> Option<ItemType> {
        self.creatures
            .get(&creature)
            .and_then(|c| c.equipment.get(&EquipmentSlot::MainHand))
            .map(|stack| stack.item_type)
    }

    fn set_equipment(&mut self, creature: CreatureHandle, slot: EquipmentSlot, stack: ItemStack) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.equipment.insert(slot, stack);
        }
    }

    fn set_drop_chance(&mut self, creature: CreatureHandle, slot: EquipmentSlot, chance: f32) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.drop_chances.insert(slot, chance.clamp(0.0, 1.0));
        }
    }

    fn set_glowing(&mut self, creature: CreatureHandle, glowing: bool) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.glowing = glowing;
        }
    }

    fn has_team(&self, name: &str) -> bool {
        self.teams.contains_key(name)
    }

    fn create_team(&mut self, name: &str, color: ChatColor) {
        self.teams.entry(name.to_string()).or_insert(Team {
            color,
            members: BTreeSet::new(),
        });
    }

    fn join_team(&mut self, creature: CreatureHandle, team: &str) {
        let Some(state) = self.creatures.get_mut(&creature) else {
            return;
        };
        let Some(target) = self.teams.get_mut(team) else {
            tracing::warn!(team, "Creature asked to join a team that does not exist");
            return;
        };
        target.members.insert(creature);
        if let Some(previous) = state.team.replace(team.to_string()) {
            if previous != team {
                if let Some(old) = self.teams.get_mut(&previous) {
                    old.members.remove(&creature);
                }
            }
        }
    }

    fn set_custom_name(&mut self, creature: CreatureHandle, name: ChatMessage, visible: bool) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.custom_name = Some(name);
            state.custom_name_visible = visible;
        }
    }

    fn set_persistence_required(&mut self, creature: CreatureHandle) {
        if let Some(state) = self.creatures.get_mut(&creature) {
            state.persistence_required = true;
        }
    }
}

impl Players for MemoryWorld {
    fn online_players(&self) -> Vec<PlayerInfo> {
        self.players
            .values()
            .filter(|p| p.online)
            .map(|p| p.info.clone())
            .collect()
    }

    fn player(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.players
            .get(&id)
            .filter(|p| p.online)
            .map(|p| p.info.clone())
    }

    fn send_message(&mut self, id: PlayerId, message: ChatMessage) {
        if let Some(player) = self.players.get_mut(&id) {
            player.inbox.push(message);
        }
    }

    fn grant_reward(&mut self, id: PlayerId, reward: &Reward) {
        if let Some(player) = self.players.get_mut(&id) {
            player.experience += reward.experience;
            if let Some(table) = &reward.loot_table {
                player.loot_tables.push(table.clone());
            }
        }
    }

    fn set_player_on_fire(&mut self, id: PlayerId, ticks: u32) {
        if let Some(player) = self.players.get_mut(&id) {
            player.fire_ticks = player.fire_ticks.max(ticks);
        }
    }
}
