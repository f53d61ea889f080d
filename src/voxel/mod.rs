//! Voxel data structures and queries

pub mod block;
pub mod chunk;
pub mod raycast;

pub use block::{BlockType, Direction};
pub use chunk::{Chunk, ChunkCoord, ChunkState, CHUNK_HEIGHT, CHUNK_WIDTH, CHUNK_VOLUME};
pub use raycast::{raycast, RayHit, VoxelOccupancy};
