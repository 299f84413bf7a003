//! Turns a plain creature into a shiny one.
//!
//! [`Transformer::make_shiny`] walks a fixed sequence of checks and
//! mutations. Any failed check returns before the first mutation, so a
//! skipped creature is left exactly as it was.

use crate::profile::ShinyProfile;
use crate::registry::ProfileRegistry;
use rand::seq::SliceRandom;
use rand::Rng;
use shinymobs_core::{
    ChatColor, ChatMessage, Enchantment, EnchantmentType, EquipmentSlot, ItemStack, ItemType,
    RegistryKey, TEAM_PALETTE,
};
use shinymobs_world::{Attribute, CreatureHandle, CreatureTraits, Creatures};

/// Persisted flag marking a shiny creature.
pub const SHINY_MARKER: &str = "IsShinyMob";

/// Persisted flag marking a shiny spawned under hard mode from a hard-only profile.
pub const HARD_SHINY_MARKER: &str = "IsHardShinyMob";

/// Prefix of the scoreboard teams used to color the glow outline.
pub const TEAM_PREFIX: &str = "shinymobs_";

/// Applied to every shiny regardless of profile.
pub const SHINY_SPEED_MULTIPLIER: f64 = 1.2;

/// Ranged creatures that default to a crossbow when not already holding a ranged weapon.
pub const CROSSBOW_ARCHETYPES: &[&str] = &["pillager"];

const ARMOR_PIECES: [(EquipmentSlot, ItemType); 4] = [
    (EquipmentSlot::Head, ItemType::NetheriteHelmet),
    (EquipmentSlot::Chest, ItemType::NetheriteChestplate),
    (EquipmentSlot::Legs, ItemType::NetheriteLeggings),
    (EquipmentSlot::Feet, ItemType::NetheriteBoots),
];

/// Result of [`Transformer::make_shiny`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOutcome {
    /// Every mutation was applied.
    Transformed {
        /// A hard-only profile was applied.
        hard: bool,
        /// Health multiplier that was rolled.
        health_multiplier: f64,
        /// Glow color, when the profile glows.
        team_color: Option<ChatColor>,
    },
    /// Nothing was changed.
    Skipped(SkipReason),
}

impl TransformOutcome {
    /// True for [`TransformOutcome::Transformed`].
    pub fn is_transformed(&self) -> bool {
        matches!(self, TransformOutcome::Transformed { .. })
    }
}

/// Why a creature was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The handle no longer refers to a live creature.
    NotLive,
    /// Human players are never transformed.
    Player,
    /// The marker is already set.
    AlreadyShiny,
    /// The creature type has no profile.
    NoProfile,
    /// Hard-only profile and the player is not in hard mode.
    HardOnly,
}

/// Name of the glow team for a color.
pub fn team_name(color: ChatColor) -> String {
    format!("{TEAM_PREFIX}{}", color.as_str())
}

/// Reads the marker only.
pub fn is_shiny<W: Creatures + ?Sized>(world: &W, creature: CreatureHandle) -> bool {
    world.persistent_flag(creature, SHINY_MARKER)
}

/// Reads the hard-mode marker only.
pub fn is_hard_shiny<W: Creatures + ?Sized>(world: &W, creature: CreatureHandle) -> bool {
    world.persistent_flag(creature, HARD_SHINY_MARKER)
}

/// Maximal enchantment set for an equipment slot (empty for the off hand).
pub fn max_enchantments(slot: EquipmentSlot) -> Vec<Enchantment> {
    use EnchantmentType::*;
    let types: &[EnchantmentType] = match slot {
        EquipmentSlot::Head => &[Protection, Unbreaking, Mending, Respiration, AquaAffinity],
        EquipmentSlot::Chest | EquipmentSlot::Legs => &[Protection, Unbreaking, Mending, Thorns],
        EquipmentSlot::Feet => &[
            Protection,
            Unbreaking,
            Mending,
            FeatherFalling,
            DepthStrider,
        ],
        EquipmentSlot::MainHand => &[
            Sharpness,
            Unbreaking,
            Mending,
            FireAspect,
            Looting,
            SweepingEdge,
        ],
        EquipmentSlot::OffHand => &[],
    };
    types.iter().copied().map(Enchantment::max).collect()
}

/// Applies profiles to creatures.
#[derive(Debug, Clone)]
pub struct Transformer {
    registry: ProfileRegistry,
    natural_despawn: bool,
}

impl Transformer {
    /// `natural_despawn = false` makes every shiny persistent.
    pub fn new(registry: ProfileRegistry, natural_despawn: bool) -> Self {
        Self {
            registry,
            natural_despawn,
        }
    }

    /// Profile table.
    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Mutable profile table.
    pub fn registry_mut(&mut self) -> &mut ProfileRegistry {
        &mut self.registry
    }

    /// Apply the creature's profile. Calling it again on a shiny creature does nothing.
    pub fn make_shiny<W, R>(
        &self,
        world: &mut W,
        creature: CreatureHandle,
        hard_mode: bool,
        rng: &mut R,
    ) -> TransformOutcome
    where
        W: Creatures + ?Sized,
        R: Rng + ?Sized,
    {
        if !world.is_live(creature) {
            return TransformOutcome::Skipped(SkipReason::NotLive);
        }
        let traits = world.traits(creature);
        if traits.contains(CreatureTraits::PLAYER) {
            return TransformOutcome::Skipped(SkipReason::Player);
        }
        if is_shiny(world, creature) {
            return TransformOutcome::Skipped(SkipReason::AlreadyShiny);
        }
        let Some(kind) = world.kind(creature) else {
            return TransformOutcome::Skipped(SkipReason::NotLive);
        };
        let Some(profile) = self.registry.profile_for(&kind) else {
            return TransformOutcome::Skipped(SkipReason::NoProfile);
        };
        if profile.hard_only && !hard_mode {
            return TransformOutcome::Skipped(SkipReason::HardOnly);
        }

        let hard = hard_mode && profile.hard_only;
        world.set_persistent_flag(creature, SHINY_MARKER, true);
        if hard {
            world.set_persistent_flag(creature, HARD_SHINY_MARKER, true);
        }

        let team_color = profile
            .use_glow
            .then(|| apply_glow(world, creature, profile, rng));

        let health_multiplier = profile.health_multiplier(rng);
        scale_attributes(world, creature, traits, profile, health_multiplier);

        if profile.equip_netherite
            && traits.contains(CreatureTraits::MOB | CreatureTraits::GEAR_COMPATIBLE)
        {
            equip_gear(world, creature, &kind, traits, profile);
        }

        let name = format!("★ Shiny {} ★", world.type_display_name(&kind));
        world.set_custom_name(creature, ChatMessage::new(name, ChatColor::Gold).bold(), true);

        if !self.natural_despawn && traits.contains(CreatureTraits::MOB) {
            world.set_persistence_required(creature);
        }

        tracing::debug!(
            %creature,
            %kind,
            hard,
            health_multiplier,
            "Creature made shiny"
        );
        TransformOutcome::Transformed {
            hard,
            health_multiplier,
            team_color,
        }
    }
}

fn apply_glow<W, R>(
    world: &mut W,
    creature: CreatureHandle,
    profile: &ShinyProfile,
    rng: &mut R,
) -> ChatColor
where
    W: Creatures + ?Sized,
    R: Rng + ?Sized,
{
    world.set_glowing(creature, true);

    let color = if profile.random_team_color {
        TEAM_PALETTE
            .choose(rng)
            .copied()
            .unwrap_or_else(|| profile.fixed_color())
    } else {
        profile.fixed_color()
    };

    let team = team_name(color);
    if !world.has_team(&team) {
        world.create_team(&team, color);
    }
    world.join_team(creature, &team);
    color
}

fn scale_attributes<W: Creatures + ?Sized>(
    world: &mut W,
    creature: CreatureHandle,
    traits: CreatureTraits,
    profile: &ShinyProfile,
    health_multiplier: f64,
) {
    if let Some(base) = world.attribute_base(creature, Attribute::MaxHealth) {
        let health = base * health_multiplier;
        world.set_attribute_base(creature, Attribute::MaxHealth, health);
        world.set_health(creature, health as f32);
    }

    if traits.contains(CreatureTraits::HOSTILE) {
        if let Some(damage) = world.attribute_base(creature, Attribute::AttackDamage) {
            world.set_attribute_base(
                creature,
                Attribute::AttackDamage,
                damage * profile.damage_multiplier,
            );
        }
    }

    if let Some(speed) = world.attribute_base(creature, Attribute::MovementSpeed) {
        world.set_attribute_base(
            creature,
            Attribute::MovementSpeed,
            speed * SHINY_SPEED_MULTIPLIER,
        );
    }
}

/// Main-hand weapon for a gear-compatible creature.
///
/// Ranged attackers keep the class of ranged weapon they already hold;
/// otherwise crossbow archetypes get a crossbow and the rest a bow. Melee
/// creatures get a netherite sword.
pub fn main_hand_weapon(
    kind: &RegistryKey,
    traits: CreatureTraits,
    held: Option<ItemType>,
) -> ItemType {
    if !traits.contains(CreatureTraits::RANGED_ATTACKER) {
        return ItemType::NetheriteSword;
    }
    match held {
        Some(ItemType::Bow) => ItemType::Bow,
        Some(ItemType::Crossbow) => ItemType::Crossbow,
        _ if CROSSBOW_ARCHETYPES.contains(&kind.path()) => ItemType::Crossbow,
        _ => ItemType::Bow,
    }
}

fn equip_gear<W: Creatures + ?Sized>(
    world: &mut W,
    creature: CreatureHandle,
    kind: &RegistryKey,
    traits: CreatureTraits,
    profile: &ShinyProfile,
) {
    let weapon = main_hand_weapon(kind, traits, world.held_item(creature));
    let pieces = ARMOR_PIECES
        .into_iter()
        .chain(std::iter::once((EquipmentSlot::MainHand, weapon)));

    for (slot, item) in pieces {
        let mut stack = ItemStack::new(item);
        if profile.max_enchantments {
            stack.set_enchantments(max_enchantments(slot));
        }
        world.set_equipment(creature, slot, stack);
        world.set_drop_chance(creature, slot, profile.drop_chance_per_item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProfileFallback, ShinyConfig};
    use rand::{rngs::StdRng, SeedableRng};
    use shinymobs_testkit::{dark_arena, seeded_rng, ARENA_CENTER};
    use shinymobs_world::MemoryWorld;

    fn transformer(config: &ShinyConfig) -> Transformer {
        Transformer::new(
            ProfileRegistry::from_config(config),
            config.general.natural_despawn,
        )
    }

    fn spawn(world: &mut MemoryWorld, path: &'static str) -> CreatureHandle {
        world
            .spawn_creature(&RegistryKey::vanilla(path), ARENA_CENTER)
            .expect("known creature type")
    }

    #[test]
    fn skeleton_gets_full_treatment() {
        let config = ShinyConfig::default();
        let transformer = transformer(&config);
        let mut world = dark_arena(4);
        let skeleton = spawn(&mut world, "skeleton");
        let mut rng = seeded_rng(1);

        let outcome = transformer.make_shiny(&mut world, skeleton, false, &mut rng);
        let TransformOutcome::Transformed {
            hard,
            health_multiplier,
            team_color,
        } = outcome
        else {
            panic!("expected transformation, got {outcome:?}");
        };
        assert!(!hard);
        assert!(is_shiny(&world, skeleton));
        assert!(!is_hard_shiny(&world, skeleton));
        assert_eq!(team_color, Some(ChatColor::White));

        let state = world.creature(skeleton).unwrap();
        assert!(state.glowing);
        assert_eq!(state.team.as_deref(), Some("shinymobs_white"));
        assert!((2.0..=10.0).contains(&health_multiplier));
        let max = state.attributes[&Attribute::MaxHealth];
        assert!((max - 20.0 * health_multiplier).abs() < 1e-9);
        assert_eq!(state.health, max as f32);
        assert!((state.attributes[&Attribute::AttackDamage] - 6.0).abs() < 1e-9);
        assert!((state.attributes[&Attribute::MovementSpeed] - 0.3).abs() < 1e-9);

        assert_eq!(
            state.equipment[&EquipmentSlot::MainHand].item_type,
            ItemType::Bow
        );
        assert_eq!(
            state.equipment[&EquipmentSlot::Head].item_type,
            ItemType::NetheriteHelmet
        );
        assert_eq!(
            state.equipment[&EquipmentSlot::Feet].enchantment_level(EnchantmentType::FeatherFalling),
            4
        );
        assert_eq!(state.drop_chances.len(), 5);
        assert!(state.drop_chances.values().all(|c| (*c - 0.2).abs() < 1e-6));

        let name = state.custom_name.as_ref().unwrap();
        assert_eq!(name.text, "★ Shiny Skeleton ★");
        assert_eq!(name.color, ChatColor::Gold);
        assert!(name.bold);
        assert!(state.custom_name_visible);
        assert!(!state.persistence_required);
    }

    #[test]
    fn second_call_changes_nothing() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let husk = spawn(&mut world, "husk");
        let mut rng = seeded_rng(2);

        assert!(transformer
            .make_shiny(&mut world, husk, false, &mut rng)
            .is_transformed());
        let after_first = world.creature(husk).cloned();
        assert_eq!(
            transformer.make_shiny(&mut world, husk, true, &mut rng),
            TransformOutcome::Skipped(SkipReason::AlreadyShiny)
        );
        assert_eq!(world.creature(husk).cloned(), after_first);
    }

    #[test]
    fn players_are_never_transformed() {
        let mut config = ShinyConfig::default();
        config.general.profile_fallback = ProfileFallback::GlobalDefault;
        let transformer = transformer(&config);
        let mut world = dark_arena(2);
        let player = spawn(&mut world, "player");
        let before = world.creature(player).cloned();

        let outcome = transformer.make_shiny(&mut world, player, true, &mut seeded_rng(3));
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::Player));
        assert_eq!(world.creature(player).cloned(), before);
    }

    #[test]
    fn hard_only_profile_needs_hard_mode() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let wither = spawn(&mut world, "wither");
        let before = world.creature(wither).cloned();

        let outcome = transformer.make_shiny(&mut world, wither, false, &mut seeded_rng(4));
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::HardOnly));
        assert!(!is_shiny(&world, wither));
        assert_eq!(world.creature(wither).cloned(), before);

        let outcome = transformer.make_shiny(&mut world, wither, true, &mut seeded_rng(4));
        assert!(matches!(outcome, TransformOutcome::Transformed { hard: true, .. }));
        assert!(is_hard_shiny(&world, wither));
        // No gear for the wither.
        assert!(world.creature(wither).unwrap().equipment.is_empty());
    }

    #[test]
    fn hard_marker_only_for_hard_only_profiles() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let spider = spawn(&mut world, "spider");
        let outcome = transformer.make_shiny(&mut world, spider, true, &mut seeded_rng(5));
        assert!(matches!(outcome, TransformOutcome::Transformed { hard: false, .. }));
        assert!(is_shiny(&world, spider));
        assert!(!is_hard_shiny(&world, spider));
    }

    #[test]
    fn unlisted_type_is_left_alone() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let pig = spawn(&mut world, "pig");
        let outcome = transformer.make_shiny(&mut world, pig, true, &mut seeded_rng(6));
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::NoProfile));
        assert!(world.creature(pig).unwrap().custom_name.is_none());
    }

    #[test]
    fn dead_creature_is_skipped() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let stray = spawn(&mut world, "stray");
        world.kill(stray);
        let outcome = transformer.make_shiny(&mut world, stray, false, &mut seeded_rng(7));
        assert_eq!(outcome, TransformOutcome::Skipped(SkipReason::NotLive));
    }

    #[test]
    fn fixed_health_is_exactly_five_times_base() {
        let mut config = ShinyConfig::default();
        config.mob.use_random_health = false;
        let transformer = transformer(&config);
        let mut world = dark_arena(2);
        let spider = spawn(&mut world, "spider");
        transformer.make_shiny(&mut world, spider, false, &mut seeded_rng(8));
        // Spider profile scales health by 1.25: 16 * 5 * 1.25.
        let state = world.creature(spider).unwrap();
        assert_eq!(state.attributes[&Attribute::MaxHealth], 100.0);
        assert_eq!(state.health, 100.0);
    }

    #[test]
    fn creeper_damage_untouched_without_attribute() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let creeper = spawn(&mut world, "creeper");
        transformer.make_shiny(&mut world, creeper, false, &mut seeded_rng(9));
        let state = world.creature(creeper).unwrap();
        assert!(!state.attributes.contains_key(&Attribute::AttackDamage));
        assert!(state.equipment.is_empty(), "creepers are not gear compatible");
    }

    #[test]
    fn pillager_defaults_to_crossbow() {
        let kind = RegistryKey::vanilla("pillager");
        let ranged = CreatureTraits::RANGED_ATTACKER;
        assert_eq!(main_hand_weapon(&kind, ranged, None), ItemType::Crossbow);
        assert_eq!(
            main_hand_weapon(&kind, ranged, Some(ItemType::Bow)),
            ItemType::Bow
        );
        let stray = RegistryKey::vanilla("stray");
        assert_eq!(
            main_hand_weapon(&stray, ranged, Some(ItemType::IronSword)),
            ItemType::Bow
        );
        assert_eq!(
            main_hand_weapon(&stray, CreatureTraits::HOSTILE, Some(ItemType::Bow)),
            ItemType::NetheriteSword
        );
    }

    #[test]
    fn zombie_gets_enchanted_sword() {
        let transformer = transformer(&ShinyConfig::default());
        let mut world = dark_arena(2);
        let zombie = spawn(&mut world, "zombie");
        transformer.make_shiny(&mut world, zombie, true, &mut seeded_rng(10));
        let sword = &world.creature(zombie).unwrap().equipment[&EquipmentSlot::MainHand];
        assert_eq!(sword.item_type, ItemType::NetheriteSword);
        assert_eq!(sword.enchantment_level(EnchantmentType::Sharpness), 5);
        assert_eq!(sword.enchantment_level(EnchantmentType::Looting), 3);
        assert_eq!(world.creature(zombie).unwrap().team.as_deref(), Some("shinymobs_dark_green"));
    }

    #[test]
    fn random_colors_come_from_palette_and_reuse_teams() {
        let mut config = ShinyConfig::default();
        config.general.profile_fallback = ProfileFallback::GlobalDefault;
        let transformer = transformer(&config);
        let mut world = dark_arena(2);
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..40 {
            let spider = spawn(&mut world, "spider");
            let outcome = transformer.make_shiny(&mut world, spider, false, &mut rng);
            let TransformOutcome::Transformed {
                team_color: Some(color),
                ..
            } = outcome
            else {
                panic!("spider should glow");
            };
            assert_ne!(color, ChatColor::Black);
        }
        assert!(world.team_count() <= TEAM_PALETTE.len());
        assert!(world.team_count() > 1);
    }

    #[test]
    fn persistence_when_despawn_disabled() {
        let mut config = ShinyConfig::default();
        config.general.natural_despawn = false;
        let transformer = transformer(&config);
        let mut world = dark_arena(2);
        let husk = spawn(&mut world, "husk");
        transformer.make_shiny(&mut world, husk, false, &mut seeded_rng(13));
        assert!(world.creature(husk).unwrap().persistence_required);
    }

    #[test]
    fn enchant_sets_per_slot() {
        assert_eq!(max_enchantments(EquipmentSlot::Head).len(), 5);
        assert_eq!(max_enchantments(EquipmentSlot::Chest).len(), 4);
        assert_eq!(max_enchantments(EquipmentSlot::Legs).len(), 4);
        assert_eq!(max_enchantments(EquipmentSlot::Feet).len(), 5);
        assert_eq!(max_enchantments(EquipmentSlot::MainHand).len(), 6);
        assert!(max_enchantments(EquipmentSlot::OffHand).is_empty());
        assert!(max_enchantments(EquipmentSlot::Chest)
            .iter()
            .any(|e| e.enchantment_type == EnchantmentType::Thorns && e.level == 3));
    }

    proptest::proptest! {
        #[test]
        fn random_health_scales_base_health(seed in proptest::prelude::any::<u64>()) {
            let config = ShinyConfig::default();
            let transformer = transformer(&config);
            let mut world = dark_arena(4);
            let skeleton = spawn(&mut world, "skeleton");
            let mut rng = StdRng::seed_from_u64(seed);

            let outcome = transformer.make_shiny(&mut world, skeleton, false, &mut rng);
            let TransformOutcome::Transformed { health_multiplier, .. } = outcome else {
                panic!("expected transformation, got {outcome:?}");
            };
            proptest::prop_assert!((2.0..=10.0).contains(&health_multiplier));
            let max = world.creature(skeleton).unwrap().attributes[&Attribute::MaxHealth];
            proptest::prop_assert!((max - 20.0 * health_multiplier).abs() < 1e-9);
        }
    }
}
