//! Block ids and per-cell voxel data for the in-memory world.

/// Block identifier.
pub type BlockId = u16;

/// Reserved ID for air.
pub const BLOCK_AIR: BlockId = 0;

/// ID for stone block.
pub const BLOCK_STONE: BlockId = 1;

/// ID for grass block.
pub const BLOCK_GRASS: BlockId = 2;

/// ID for leaves (motion-blocking but ignored by the surface heightmap).
pub const BLOCK_LEAVES: BlockId = 3;

/// ID for glass pane (solid, but its top face cannot hold a creature).
pub const BLOCK_GLASS_PANE: BlockId = 4;

/// ID for a torch (not passable for spawning purposes, emits light).
pub const BLOCK_TORCH: BlockId = 5;

/// Per-voxel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Voxel {
    pub id: BlockId,
    pub light_block: u8,
}

impl Default for Voxel {
    fn default() -> Self {
        Self {
            id: BLOCK_AIR,
            light_block: 0,
        }
    }
}

impl Voxel {
    pub const fn block(id: BlockId) -> Self {
        Self { id, light_block: 0 }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.id == BLOCK_AIR
    }

    /// Whether the top face can support a standing creature.
    #[inline]
    pub fn is_sturdy_top(&self) -> bool {
        matches!(self.id, BLOCK_STONE | BLOCK_GRASS | BLOCK_LEAVES)
    }

    /// Counts toward the surface heightmap (solid, leaves excluded).
    #[inline]
    pub fn is_motion_blocking_no_leaves(&self) -> bool {
        !self.is_air() && self.id != BLOCK_LEAVES && self.id != BLOCK_TORCH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_classification() {
        assert!(Voxel::default().is_air());
        assert!(Voxel::block(BLOCK_STONE).is_sturdy_top());
        assert!(!Voxel::block(BLOCK_GLASS_PANE).is_sturdy_top());
        assert!(!Voxel::block(BLOCK_LEAVES).is_motion_blocking_no_leaves());
        assert!(Voxel::block(BLOCK_GLASS_PANE).is_motion_blocking_no_leaves());
    }
}
