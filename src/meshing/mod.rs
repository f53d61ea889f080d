//! Conversion of voxel data into renderable surfaces

pub mod face;
pub mod mesher;
pub mod surface;

pub use face::{atlas_tile, Face, ATLAS_TILE_SIZE, FACES};
pub use mesher::{MeshGenerationTask, Neighborhood};
pub use surface::{ChunkSurface, Vertex};
