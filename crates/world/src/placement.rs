//! Spawn position search around a player.
//!
//! Picks random columns on a ring at the requested distance and scans a
//! vertical band around the origin altitude, falling back to the column's
//! surface. Candidates must be two blocks of air over a sturdy top face and
//! dark enough for a hostile creature to exist naturally.

use crate::access::Terrain;
use crate::pos::{BlockPos, Vec3};
use rand::Rng;
use std::f64::consts::TAU;

/// Number of random columns tried before giving up.
pub const PLACEMENT_ATTEMPTS: u32 = 20;

/// Vertical band scanned around the origin altitude (inclusive, both ways).
pub const VERTICAL_SCAN: i32 = 10;

/// Highest block light a candidate cell may have.
pub const MAX_SPAWN_LIGHT: u8 = 7;

/// Search for a spawn cell exactly `distance` blocks (horizontally) from `origin`.
///
/// Returns `None` once every attempt and surface fallback has failed; callers
/// treat that as "skip this spawn cycle".
pub fn find_spawn_position<T, R>(
    terrain: &T,
    origin: Vec3,
    distance: u32,
    rng: &mut R,
) -> Option<BlockPos>
where
    T: Terrain + ?Sized,
    R: Rng + ?Sized,
{
    let origin_y = origin.y as i32;
    let distance = f64::from(distance);

    for attempt in 0..PLACEMENT_ATTEMPTS {
        let angle = rng.gen_range(0.0..TAU);
        let x = (origin.x + angle.cos() * distance) as i32;
        let z = (origin.z + angle.sin() * distance) as i32;

        for offset in -VERTICAL_SCAN..=VERTICAL_SCAN {
            let candidate = BlockPos::new(x, origin_y + offset, z);
            if is_valid_spawn_location(terrain, candidate) {
                tracing::trace!(attempt, %candidate, "Found shiny spawn cell in scan band");
                return Some(candidate);
            }
        }

        let surface = BlockPos::new(x, terrain.surface_height(x, z), z);
        if is_valid_spawn_location(terrain, surface) {
            tracing::trace!(attempt, %surface, "Found shiny spawn cell on surface");
            return Some(surface);
        }
    }

    None
}

/// Two passable cells over a sturdy top face, at or below [`MAX_SPAWN_LIGHT`].
pub fn is_valid_spawn_location<T: Terrain + ?Sized>(terrain: &T, pos: BlockPos) -> bool {
    if !terrain.is_passable(pos) || !terrain.is_passable(pos.above()) {
        return false;
    }

    if !terrain.is_sturdy_top(pos.below()) {
        return false;
    }

    terrain.block_light(pos) <= MAX_SPAWN_LIGHT
}
