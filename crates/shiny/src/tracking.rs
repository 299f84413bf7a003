use shinymobs_core::PlayerId;
use shinymobs_world::{CreatureHandle, Creatures};
use std::collections::BTreeMap;

/// Player → shiny creature association.
///
/// The world owns the creatures; entries here are only handles. Every read
/// path that hands a creature out checks liveness first and drops the entry
/// when the creature is gone.
#[derive(Debug, Clone, Default)]
pub struct ShinyTracker {
    entries: BTreeMap<PlayerId, CreatureHandle>,
}

impl ShinyTracker {
    /// Empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The player's tracked creature if it is still live. Stale entries are purged.
    pub fn live_creature<W: Creatures + ?Sized>(
        &mut self,
        world: &W,
        player: PlayerId,
    ) -> Option<CreatureHandle> {
        let handle = *self.entries.get(&player)?;
        if world.is_live(handle) {
            Some(handle)
        } else {
            self.entries.remove(&player);
            tracing::debug!(%player, creature = %handle, "Purged stale shiny tracking entry");
            None
        }
    }

    /// Raw entry without a liveness check.
    pub fn get(&self, player: PlayerId) -> Option<CreatureHandle> {
        self.entries.get(&player).copied()
    }

    /// Associate `creature` with `player`, returning any previous entry.
    pub fn track(&mut self, player: PlayerId, creature: CreatureHandle) -> Option<CreatureHandle> {
        self.entries.insert(player, creature)
    }

    /// Drop the player's entry, returning it.
    pub fn untrack(&mut self, player: PlayerId) -> Option<CreatureHandle> {
        self.entries.remove(&player)
    }

    /// Remove whichever player owns `creature`.
    pub fn untrack_creature(&mut self, creature: CreatureHandle) -> Option<PlayerId> {
        let owner = self
            .entries
            .iter()
            .find_map(|(player, handle)| (*handle == creature).then_some(*player))?;
        self.entries.remove(&owner);
        Some(owner)
    }

    /// Take every entry, leaving the tracker empty.
    pub fn drain(&mut self) -> Vec<(PlayerId, CreatureHandle)> {
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    /// Tracked entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
