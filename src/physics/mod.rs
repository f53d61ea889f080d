//! Player movement and collision against the voxel grid

pub mod collision;
pub mod player;

pub use collision::{resolve, BodyShape, CollisionResult};
pub use player::{MovementInput, MovementProfile, Player};
