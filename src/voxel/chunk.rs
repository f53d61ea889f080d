//! Chunk system: fixed-size vertical columns of voxel data

use std::fmt;

use glam::{IVec3, Vec3};

use crate::meshing::surface::ChunkSurface;
use crate::voxel::block::{BlockType, Direction};

/// Width (X and Z) of a chunk in blocks
pub const CHUNK_WIDTH: i32 = 16;

/// Height (Y) of a chunk in blocks; the world's whole vertical extent
pub const CHUNK_HEIGHT: i32 = 256;

/// Number of blocks in a chunk
pub const CHUNK_VOLUME: usize = (CHUNK_WIDTH * CHUNK_WIDTH * CHUNK_HEIGHT) as usize;

/// Absolute origin of a chunk: both components are multiples of
/// [`CHUNK_WIDTH`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a chunk coordinate from an absolute origin
    pub fn new(x: i32, z: i32) -> Self {
        debug_assert!(
            x.rem_euclid(CHUNK_WIDTH) == 0 && z.rem_euclid(CHUNK_WIDTH) == 0,
            "chunk origin ({x}, {z}) is not aligned to the chunk width"
        );
        Self { x, z }
    }

    /// Chunk containing a world position
    pub fn from_world(x: f32, z: f32) -> Self {
        let w = CHUNK_WIDTH as f32;
        Self {
            x: (x / w).floor() as i32 * CHUNK_WIDTH,
            z: (z / w).floor() as i32 * CHUNK_WIDTH,
        }
    }

    /// Chunk containing a voxel
    pub fn from_voxel(voxel: IVec3) -> Self {
        Self {
            x: voxel.x.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
            z: voxel.z.div_euclid(CHUNK_WIDTH) * CHUNK_WIDTH,
        }
    }

    /// Chunk `dx`, `dz` chunk widths away
    pub fn offset_chunks(&self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx * CHUNK_WIDTH,
            z: self.z + dz * CHUNK_WIDTH,
        }
    }

    /// Adjacent chunk in a lateral direction (vertical directions map to self)
    pub fn neighbor(&self, direction: Direction) -> Self {
        let o = direction.offset();
        self.offset_chunks(o.x, o.z)
    }

    /// Get the world-space origin (minimum corner) of this chunk
    pub fn world_origin(&self) -> Vec3 {
        Vec3::new(self.x as f32, 0.0, self.z as f32)
    }

    /// Position of a voxel relative to the chunk containing it
    pub fn local_of(voxel: IVec3) -> IVec3 {
        IVec3::new(
            voxel.x.rem_euclid(CHUNK_WIDTH),
            voxel.y,
            voxel.z.rem_euclid(CHUNK_WIDTH),
        )
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Lifecycle of a chunk in the streaming pipeline.
///
/// Ordered: a state compares greater than every state it can follow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkState {
    /// Nothing generated yet
    Empty,
    /// In the block-generation queue
    BlocksPending,
    /// Block data complete, waiting for neighbors before meshing
    MeshPending,
    /// In the mesh-generation queue
    MeshQueued,
    /// Surface attached and visible
    Ready,
}

impl ChunkState {
    /// Whether the chunk's block array is complete
    pub fn has_blocks(self) -> bool {
        self >= ChunkState::MeshPending
    }
}

/// A 16x256x16 column of blocks.
///
/// Neighbor links are coordinate keys into the terrain's chunk map; a chunk
/// never owns its neighbors.
pub struct Chunk {
    /// Absolute origin of this chunk
    pub coord: ChunkCoord,
    blocks: Box<[BlockType]>,
    neighbors: [Option<ChunkCoord>; 4],
    state: ChunkState,
    surface: Option<ChunkSurface>,
    in_view: bool,
}

impl Chunk {
    /// Create a new empty chunk at the given coordinate
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![BlockType::Air; CHUNK_VOLUME].into_boxed_slice(),
            neighbors: [None; 4],
            state: ChunkState::Empty,
            surface: None,
            in_view: false,
        }
    }

    /// Flat index of a local position: `x + y*W + z*W*H`
    #[inline]
    pub fn index(x: i32, y: i32, z: i32) -> usize {
        (x + y * CHUNK_WIDTH + z * CHUNK_WIDTH * CHUNK_HEIGHT) as usize
    }

    /// Whether a local position lies inside the chunk
    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_WIDTH).contains(&x)
            && (0..CHUNK_HEIGHT).contains(&y)
            && (0..CHUNK_WIDTH).contains(&z)
    }

    /// Block at a local position. Panics when out of bounds.
    #[inline]
    pub fn block(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.blocks[Self::index(x, y, z)]
    }

    /// Block at a local position, or `None` outside the chunk
    pub fn get_block(&self, local: IVec3) -> Option<BlockType> {
        Self::in_bounds(local.x, local.y, local.z).then(|| self.block(local.x, local.y, local.z))
    }

    /// Set the block at a local position. Panics when out of bounds.
    #[inline]
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockType) {
        self.blocks[Self::index(x, y, z)] = block;
    }

    /// Reset every block to air
    pub fn clear_blocks(&mut self) {
        self.blocks.fill(BlockType::Air);
    }

    /// Number of solid blocks in the chunk
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_solid()).count()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// Move forward in the lifecycle
    pub(crate) fn advance_to(&mut self, next: ChunkState) {
        debug_assert!(next >= self.state, "{} cannot go from {:?} to {:?}", self.coord, self.state, next);
        self.state = next;
    }

    /// Move back in the lifecycle (eviction or a failed precondition)
    pub(crate) fn regress_to(&mut self, earlier: ChunkState) {
        debug_assert!(earlier <= self.state, "{} cannot regress from {:?} to {:?}", self.coord, self.state, earlier);
        self.state = earlier;
    }

    /// Whether the chunk is inside the current view window
    pub fn in_view(&self) -> bool {
        self.in_view
    }

    pub(crate) fn set_in_view(&mut self, in_view: bool) {
        self.in_view = in_view;
    }

    /// Linked neighbor in a lateral direction
    pub fn neighbor(&self, direction: Direction) -> Option<ChunkCoord> {
        direction.lateral_index().and_then(|i| self.neighbors[i])
    }

    pub(crate) fn set_neighbor(&mut self, direction: Direction, neighbor: Option<ChunkCoord>) {
        if let Some(i) = direction.lateral_index() {
            self.neighbors[i] = neighbor;
        }
    }

    /// Whether all four lateral neighbors are linked
    pub fn has_all_neighbors(&self) -> bool {
        self.neighbors.iter().all(Option::is_some)
    }

    /// Linked neighbors with their directions
    pub fn linked_neighbors(&self) -> impl Iterator<Item = (Direction, ChunkCoord)> + '_ {
        Direction::LATERAL
            .into_iter()
            .filter_map(|dir| self.neighbor(dir).map(|c| (dir, c)))
    }

    /// Attached surface, if meshed
    pub fn surface(&self) -> Option<&ChunkSurface> {
        self.surface.as_ref()
    }

    /// Attach a freshly built surface, returning the one it replaces
    pub(crate) fn attach_surface(&mut self, surface: ChunkSurface) -> Option<ChunkSurface> {
        self.surface.replace(surface)
    }

    /// Detach and return the surface so its resources can be freed
    pub(crate) fn release_surface(&mut self) -> Option<ChunkSurface> {
        self.surface.take()
    }
}
