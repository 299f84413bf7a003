//! World-facing half of the shiny mob system: positions, creature handles,
//! the host collaborator traits, spawn placement search and an in-memory host.

mod access;
mod block;
mod creature;
mod memory;
pub mod placement;
mod pos;

pub use access::*;
pub use block::*;
pub use creature::*;
pub use memory::*;
pub use placement::{find_spawn_position, is_valid_spawn_location};
pub use pos::*;
