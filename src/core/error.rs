//! Error types for the strata engine

use thiserror::Error;

use crate::voxel::block::Direction;
use crate::voxel::chunk::ChunkCoord;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Chunk {chunk} has no block data on its {direction:?} side")]
    MissingNeighbor {
        chunk: ChunkCoord,
        direction: Direction,
    },

    #[error("Voxel error: {0}")]
    Voxel(String),
}
