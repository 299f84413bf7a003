//! Gameplay hooks the host calls from its own event dispatch.

use crate::scheduler::SpawnScheduler;
use crate::transform::is_shiny;
use shinymobs_core::{ChatColor, ChatMessage, PlayerId};
use shinymobs_world::{CreatureHandle, PlayerInfo, Reward, ShinyWorld};
use tracing::debug;

/// Bonus experience for defeating a shiny.
pub const KILL_EXPERIENCE: u32 = 100;

/// Burn duration when a shiny hits a player.
pub const SHINY_FIRE_TICKS: u32 = 60;

/// What [`ShinyEvents::on_creature_death`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeathOutcome {
    /// Player whose tracking entry pointed at the creature.
    pub owner: Option<PlayerId>,
    /// Player who received the kill reward.
    pub rewarded: Option<PlayerId>,
}

/// Gameplay hooks. Each is a no-op for creatures without the shiny marker.
pub trait ShinyEvents {
    /// A creature died. `killer` is set when a player dealt the final blow.
    ///
    /// The kill reward is granted only for a shiny that was still tracked.
    fn on_creature_death<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        creature: CreatureHandle,
        killer: Option<PlayerId>,
    ) -> DeathOutcome;

    /// A creature damaged a player. Returns whether the player was set on fire.
    fn on_player_attacked<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        attacker: CreatureHandle,
        victim: PlayerId,
    ) -> bool;

    /// Returns whether the player was reminded of a live shiny.
    fn on_player_login<W: ShinyWorld + ?Sized>(&mut self, world: &mut W, player: PlayerId) -> bool;

    /// Timers and tracking are left untouched.
    fn on_player_logout(&mut self, player: &PlayerInfo);

    /// Whether a spawn cancelled by some other handler must go ahead anyway.
    fn should_force_spawn<W: ShinyWorld + ?Sized>(&self, world: &W, creature: CreatureHandle) -> bool;
}

impl ShinyEvents for SpawnScheduler {
    fn on_creature_death<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        creature: CreatureHandle,
        killer: Option<PlayerId>,
    ) -> DeathOutcome {
        if !is_shiny(world, creature) {
            return DeathOutcome::default();
        }

        let owner = self.tracker_mut().untrack_creature(creature);
        if let Some(owner) = owner {
            debug!(player = %owner, %creature, "Shiny creature died, tracking removed");
        }

        // Only a shiny still owned by some player pays out.
        let (Some(_), Some(killer)) = (owner, killer) else {
            return DeathOutcome {
                owner,
                rewarded: None,
            };
        };

        let loot_table = world
            .kind(creature)
            .and_then(|kind| self.registry().profile_for(&kind).cloned())
            .and_then(|profile| profile.reward_table);

        world.send_message(
            killer,
            ChatMessage::new("★ You defeated a Shiny Mob! ★", ChatColor::Gold).bold(),
        );
        world.grant_reward(
            killer,
            &Reward {
                experience: KILL_EXPERIENCE,
                loot_table,
            },
        );
        world.send_message(
            killer,
            ChatMessage::new(
                format!("+{KILL_EXPERIENCE} XP bonus for defeating a Shiny Mob!"),
                ChatColor::Yellow,
            ),
        );

        DeathOutcome {
            owner,
            rewarded: Some(killer),
        }
    }

    fn on_player_attacked<W: ShinyWorld + ?Sized>(
        &mut self,
        world: &mut W,
        attacker: CreatureHandle,
        victim: PlayerId,
    ) -> bool {
        if !is_shiny(world, attacker) || self.config().mob.damage_multiplier <= 1.0 {
            return false;
        }
        world.set_player_on_fire(victim, SHINY_FIRE_TICKS);
        true
    }

    fn on_player_login<W: ShinyWorld + ?Sized>(&mut self, world: &mut W, player: PlayerId) -> bool {
        if self.tracker_mut().live_creature(world, player).is_none() {
            return false;
        }
        world.send_message(
            player,
            ChatMessage::new("You still have an active Shiny Mob in the world!", ChatColor::Gold),
        );
        true
    }

    fn on_player_logout(&mut self, player: &PlayerInfo) {
        if self.timer_ticks(player.id).is_some() {
            debug!(player = %player.name, "Player logged out, pausing shiny spawn timer");
        }
    }

    fn should_force_spawn<W: ShinyWorld + ?Sized>(&self, world: &W, creature: CreatureHandle) -> bool {
        is_shiny(world, creature)
    }
}
