//! Resumable face-culled mesh generation
//!
//! A voxel's face is emitted only when the cell beyond it is not solid.
//! Cells across a lateral chunk boundary are read from the neighbor chunk,
//! so meshing needs all four neighbors to have finished block generation.
//! Cells above or below the vertical extent count as air.

use std::collections::HashMap;

use glam::{IVec3, Vec2};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::meshing::face::{atlas_tile, tile_uv, FACES};
use crate::meshing::surface::ChunkSurface;
use crate::streaming::budget::{Deadline, Step};
use crate::voxel::block::{BlockType, Direction};
use crate::voxel::chunk::{Chunk, ChunkCoord, CHUNK_HEIGHT, CHUNK_VOLUME, CHUNK_WIDTH};

/// A chunk together with its four lateral neighbors, all with block data
pub struct Neighborhood<'a> {
    pub center: &'a Chunk,
    /// Indexed by [`Direction::lateral_index`]
    pub neighbors: [&'a Chunk; 4],
}

impl<'a> Neighborhood<'a> {
    /// Borrow a chunk and its linked neighbors out of the chunk map.
    ///
    /// Fails with [`Error::MissingNeighbor`] if a neighbor is unlinked,
    /// absent, or still generating blocks.
    pub fn gather(chunks: &'a HashMap<ChunkCoord, Chunk>, coord: ChunkCoord) -> Result<Self> {
        let center = chunks
            .get(&coord)
            .ok_or_else(|| Error::Voxel(format!("No chunk at {coord}")))?;

        let mut neighbors = [center; 4];
        for (slot, dir) in neighbors.iter_mut().zip(Direction::LATERAL) {
            let neighbor = center
                .neighbor(dir)
                .and_then(|c| chunks.get(&c))
                .filter(|n| n.state().has_blocks())
                .ok_or(Error::MissingNeighbor { chunk: coord, direction: dir })?;
            *slot = neighbor;
        }

        Ok(Self { center, neighbors })
    }

    /// Block at a position relative to the center chunk's origin
    pub fn block_at(&self, local: IVec3) -> BlockType {
        if !(0..CHUNK_HEIGHT).contains(&local.y) {
            return BlockType::Air;
        }
        let outside_x = Direction::from_xz(edge(local.x), 0);
        let outside_z = Direction::from_xz(0, edge(local.z));
        let chunk = match (outside_x, outside_z) {
            (None, None) => self.center,
            (Some(dir), None) | (None, Some(dir)) => self.neighbor(dir),
            // Diagonal cells are never face-adjacent
            (Some(_), Some(_)) => return BlockType::Air,
        };
        chunk.block(
            local.x.rem_euclid(CHUNK_WIDTH),
            local.y,
            local.z.rem_euclid(CHUNK_WIDTH),
        )
    }

    fn neighbor(&self, dir: Direction) -> &'a Chunk {
        match dir.lateral_index() {
            Some(i) => self.neighbors[i],
            None => self.center,
        }
    }
}

/// -1 below the chunk, 1 past it, 0 inside
fn edge(v: i32) -> i32 {
    if v < 0 {
        -1
    } else if v >= CHUNK_WIDTH {
        1
    } else {
        0
    }
}

/// Resumable mesh build for one chunk.
///
/// Visits voxels in ascending (x, z, y) order and suspends only after a
/// solid voxel's faces have all been emitted. Nothing is attached to the
/// chunk until [`finish`](Self::finish).
#[derive(Debug)]
pub struct MeshGenerationTask {
    cursor: usize,
    surface: ChunkSurface,
}

impl MeshGenerationTask {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            cursor: 0,
            surface: ChunkSurface::new(coord.world_origin()),
        }
    }

    /// Number of voxels visited so far
    pub fn voxels_done(&self) -> usize {
        self.cursor
    }

    /// Emit faces until done or the deadline passes
    pub fn step(&mut self, hood: &Neighborhood<'_>, deadline: &Deadline) -> Step {
        const COLUMN: usize = CHUNK_HEIGHT as usize;
        const SLAB: usize = (CHUNK_WIDTH * CHUNK_HEIGHT) as usize;

        while self.cursor < CHUNK_VOLUME {
            let i = self.cursor;
            self.cursor += 1;

            let pos = IVec3::new((i / SLAB) as i32, (i % COLUMN) as i32, ((i / COLUMN) % CHUNK_WIDTH as usize) as i32);
            let block = hood.center.block(pos.x, pos.y, pos.z);
            if !block.is_solid() {
                continue;
            }
            self.emit_faces(hood, pos, block);

            if self.cursor < CHUNK_VOLUME && deadline.expired() {
                return Step::Suspended;
            }
        }
        Step::Finished
    }

    fn emit_faces(&mut self, hood: &Neighborhood<'_>, pos: IVec3, block: BlockType) {
        for face in &FACES {
            if hood.block_at(pos + face.direction.offset()).is_solid() {
                continue;
            }
            let Some(tile) = atlas_tile(block, face.direction) else {
                continue;
            };
            let corners = std::array::from_fn(|i| face.corner(pos, i));
            let uvs: [Vec2; 4] = std::array::from_fn(|i| tile_uv(tile, i));
            self.surface.push_quad(corners, face.normal(), uvs);
        }
    }

    /// Take the finished surface
    pub fn finish(self) -> ChunkSurface {
        self.surface
    }

    /// Build a chunk's whole surface in one call
    pub fn run_to_completion(hood: &Neighborhood<'_>) -> ChunkSurface {
        let mut task = Self::new(hood.center.coord);
        task.step(hood, &Deadline::unbounded());
        task.finish()
    }
}
