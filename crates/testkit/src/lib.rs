#![warn(missing_docs)]
//! Deterministic testing surfaces: world fixtures and seeded RNGs.

use rand::{rngs::StdRng, SeedableRng};
use shinymobs_core::PlayerId;
use shinymobs_world::{BlockPos, MemoryWorld, Vec3, BLOCK_STONE};

/// Y of the stone floor in arena fixtures. Creatures stand at `ARENA_FLOOR_Y + 1`.
pub const ARENA_FLOOR_Y: i32 = 63;

/// Where arena fixtures put their first player.
pub const ARENA_CENTER: Vec3 = Vec3::new(0.5, (ARENA_FLOOR_Y + 1) as f64, 0.5);

/// Flat unlit stone floor covering `-radius..=radius` on both axes.
pub fn dark_arena(radius: i32) -> MemoryWorld {
    let mut world = MemoryWorld::new();
    world.fill(
        BlockPos::new(-radius, ARENA_FLOOR_Y, -radius),
        BlockPos::new(radius, ARENA_FLOOR_Y, radius),
        BLOCK_STONE,
    );
    world
}

/// Same as [`dark_arena`] but the standing layer is fully lit.
pub fn lit_arena(radius: i32) -> MemoryWorld {
    let mut world = dark_arena(radius);
    world.fill_light(
        BlockPos::new(-radius, ARENA_FLOOR_Y + 1, -radius),
        BlockPos::new(radius, ARENA_FLOOR_Y + 1, radius),
        15,
    );
    world
}

/// Solid everywhere: no spawn position can ever be found.
pub fn sealed_world() -> MemoryWorld {
    MemoryWorld::sealed()
}

/// RNG with a fixed seed.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Stable player id for fixture number `n`.
pub fn player_id(n: u128) -> PlayerId {
    PlayerId::from_u128(n)
}

/// Add fixture player `n` named `Player<n>` at the arena center.
pub fn arena_player(world: &mut MemoryWorld, n: u128) -> PlayerId {
    let id = player_id(n);
    world.add_player(id, format!("Player{n}"), ARENA_CENTER);
    id
}
