//! Chunk lifecycle management
//!
//! [`Terrain`] owns every chunk and the two work queues. Each frame the
//! caller feeds it the view-window delta ([`Terrain::update`]) and then lets
//! it spend a slice of the frame on generation ([`Terrain::advance`]). At
//! most one block task and one mesh task are in flight at any time: the
//! head of each queue.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use glam::{IVec3, Vec3};

use crate::core::config::{EngineConfig, EvictionPolicy};
use crate::core::time::FrameTimer;
use crate::meshing::mesher::{MeshGenerationTask, Neighborhood};
use crate::meshing::surface::ChunkSurface;
use crate::streaming::budget::{Deadline, Step};
use crate::streaming::view_window::{ViewWindow, ViewWindowDelta};
use crate::terrain::generator::{BlockGenerationTask, TerrainGenerator};
use crate::voxel::block::{BlockType, Direction};
use crate::voxel::chunk::{Chunk, ChunkCoord, ChunkState, CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::voxel::raycast::{RayHit, VoxelOccupancy};

/// Result of a voxel edit
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// The block was written; lists the chunks that were re-meshed
    Applied { remeshed: Vec<ChunkCoord> },
    /// y outside the vertical extent; nothing written
    OutOfRange,
    /// No chunk is resident at that position
    NoChunk,
    /// The chunk exists but has no block data yet
    NotGenerated,
}

/// Surface lifecycle notifications for the renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A surface was attached to the chunk (upload it)
    Attached(ChunkCoord),
    /// The chunk's surface was released (free it)
    Detached(ChunkCoord),
}

/// Pipeline counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    pub chunks: usize,
    pub block_queue: usize,
    pub mesh_queue: usize,
    pub ready: usize,
    pub blocks_generated: u64,
    pub meshes_built: u64,
    pub evictions: u64,
}

struct BlockJob {
    coord: ChunkCoord,
    task: BlockGenerationTask,
}

struct MeshJob {
    coord: ChunkCoord,
    task: MeshGenerationTask,
}

/// Sole owner of all chunks and of the block and mesh queues
pub struct Terrain {
    generator: TerrainGenerator,
    chunks: HashMap<ChunkCoord, Chunk>,
    block_queue: VecDeque<BlockJob>,
    mesh_queue: VecDeque<MeshJob>,
    timer: FrameTimer,
    budget_ratio: f32,
    eviction: EvictionPolicy,
    events: Vec<SurfaceEvent>,
    blocks_generated: u64,
    meshes_built: u64,
    evictions: u64,
}

impl Terrain {
    /// Create an empty terrain using the configured noise
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_generator(TerrainGenerator::new(config.terrain.clone()), config)
    }

    /// Create an empty terrain with a custom generator
    pub fn with_generator(generator: TerrainGenerator, config: &EngineConfig) -> Self {
        Self {
            generator,
            chunks: HashMap::new(),
            block_queue: VecDeque::new(),
            mesh_queue: VecDeque::new(),
            timer: FrameTimer::new(config.max_frame_dt),
            budget_ratio: config.generation_budget_ratio,
            eviction: config.eviction,
            events: Vec::new(),
            blocks_generated: 0,
            meshes_built: 0,
            evictions: 0,
        }
    }

    /// Apply a view-window change: create or re-admit entering chunks,
    /// evict leaving ones.
    pub fn update(&mut self, entering: &[ChunkCoord], leaving: &[ChunkCoord]) {
        for &coord in entering {
            self.enter(coord);
        }
        for &coord in leaving {
            self.evict(coord);
        }
    }

    /// [`update`](Self::update) from an observer delta
    pub fn apply_delta(&mut self, delta: &ViewWindowDelta) {
        self.update(&delta.entering, &delta.leaving);
    }

    /// Queue every chunk in a filled circle around `center`, nearest first
    pub fn queue_chunks_circular(&mut self, center: Vec3, radius: i32) {
        let origin = ChunkCoord::from_world(center.x, center.z);
        let window = ViewWindow::new(radius);
        for coord in window.coords_around(origin) {
            self.enter(coord);
        }
        log::info!(
            "Queued {} chunks around {origin} (radius {radius})",
            window.len()
        );
    }

    fn enter(&mut self, coord: ChunkCoord) {
        if !self.chunks.contains_key(&coord) {
            self.create_chunk(coord);
        }
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        chunk.set_in_view(true);
        match chunk.state() {
            ChunkState::Empty => self.enqueue_blocks(coord),
            ChunkState::MeshPending => self.try_queue_mesh_around(coord),
            _ => {}
        }
    }

    /// Insert a new chunk and link it with whichever neighbors exist
    fn create_chunk(&mut self, coord: ChunkCoord) {
        let mut chunk = Chunk::new(coord);
        for dir in Direction::LATERAL {
            let other_coord = coord.neighbor(dir);
            if let Some(other) = self.chunks.get_mut(&other_coord) {
                other.set_neighbor(dir.opposite(), Some(coord));
                chunk.set_neighbor(dir, Some(other_coord));
            }
        }
        self.chunks.insert(coord, chunk);
        log::trace!("Created chunk {coord}");
    }

    fn enqueue_blocks(&mut self, coord: ChunkCoord) {
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.advance_to(ChunkState::BlocksPending);
            self.block_queue.push_back(BlockJob {
                coord,
                task: BlockGenerationTask::new(),
            });
        }
    }

    /// Admit a chunk to the mesh queue if it is in view, waiting, and every
    /// lateral neighbor has block data. Returns whether it was admitted.
    pub fn try_queue_mesh(&mut self, coord: ChunkCoord) -> bool {
        let Some(chunk) = self.chunks.get(&coord) else {
            return false;
        };
        if !chunk.in_view() || chunk.state() != ChunkState::MeshPending || !self.neighbors_have_blocks(chunk) {
            return false;
        }
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.advance_to(ChunkState::MeshQueued);
        }
        self.mesh_queue.push_back(MeshJob {
            coord,
            task: MeshGenerationTask::new(coord),
        });
        true
    }

    /// Try to admit a chunk and all its linked neighbors
    fn try_queue_mesh_around(&mut self, coord: ChunkCoord) {
        let mut candidates = vec![coord];
        if let Some(chunk) = self.chunks.get(&coord) {
            candidates.extend(chunk.linked_neighbors().map(|(_, c)| c));
        }
        for c in candidates {
            self.try_queue_mesh(c);
        }
    }

    fn neighbors_have_blocks(&self, chunk: &Chunk) -> bool {
        Direction::LATERAL.into_iter().all(|dir| {
            chunk
                .neighbor(dir)
                .and_then(|c| self.chunks.get(&c))
                .is_some_and(|n| n.state().has_blocks())
        })
    }

    /// Record the frame delta and spend the derived slice on generation
    pub fn advance(&mut self, dt: f32) {
        self.timer.record(dt);
        let slice = self.timer.task_slice(self.budget_ratio);
        self.advance_with_budget(slice);
    }

    /// Step the head block task and the head mesh task, each for at most
    /// `slice` (plus one unit of work)
    pub fn advance_with_budget(&mut self, slice: Duration) {
        self.step_block_queue(slice);
        self.step_mesh_queue(slice);
    }

    /// Run the queues to completion, at most `max_rounds` advance rounds.
    /// Returns the number of rounds used.
    pub fn advance_until_idle(&mut self, max_rounds: usize) -> usize {
        let mut rounds = 0;
        while !self.is_idle() && rounds < max_rounds {
            self.advance_with_budget(Duration::MAX);
            rounds += 1;
        }
        rounds
    }

    fn step_block_queue(&mut self, slice: Duration) {
        let Some(coord) = self.block_queue.front().map(|job| job.coord) else {
            return;
        };
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            log::warn!("Dropping block job for missing chunk {coord}");
            self.block_queue.pop_front();
            return;
        };
        let Some(job) = self.block_queue.front_mut() else {
            return;
        };

        let deadline = deadline_after(slice);
        if !job.task.step(&self.generator, chunk, &deadline).is_finished() {
            return;
        }

        self.block_queue.pop_front();
        chunk.advance_to(ChunkState::MeshPending);
        self.blocks_generated += 1;
        log::debug!("Generated blocks for chunk {coord}");

        self.try_queue_mesh_around(coord);
    }

    fn step_mesh_queue(&mut self, slice: Duration) {
        let Some(job) = self.mesh_queue.front_mut() else {
            return;
        };
        let coord = job.coord;
        let deadline = deadline_after(slice);
        let step = Neighborhood::gather(&self.chunks, coord).map(|hood| job.task.step(&hood, &deadline));

        match step {
            Ok(Step::Suspended) => {}
            Ok(Step::Finished) => {
                if let Some(job) = self.mesh_queue.pop_front() {
                    self.attach(coord, job.task.finish());
                    self.meshes_built += 1;
                    log::debug!("Meshed chunk {coord}");
                }
            }
            Err(err) => {
                log::error!("Meshing chunk {coord} aborted: {err}");
                self.mesh_queue.pop_front();
                if let Some(chunk) = self.chunks.get_mut(&coord) {
                    chunk.regress_to(ChunkState::MeshPending);
                }
            }
        }
    }

    fn attach(&mut self, coord: ChunkCoord, surface: ChunkSurface) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.attach_surface(surface).is_some() {
            self.events.push(SurfaceEvent::Detached(coord));
        }
        chunk.advance_to(ChunkState::Ready);
        self.events.push(SurfaceEvent::Attached(coord));
    }

    /// Evict a chunk that left the view window. Returns whether anything
    /// changed; evicting twice is a no-op the second time.
    pub fn evict(&mut self, coord: ChunkCoord) -> bool {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return false;
        };
        chunk.set_in_view(false);
        let state = chunk.state();
        if state == ChunkState::Empty {
            return false;
        }
        if state == ChunkState::MeshPending && self.eviction == EvictionPolicy::Retain {
            return false;
        }

        match state {
            ChunkState::BlocksPending => self.block_queue.retain(|job| job.coord != coord),
            ChunkState::MeshQueued => self.mesh_queue.retain(|job| job.coord != coord),
            _ => {}
        }

        if let Some(chunk) = self.chunks.get_mut(&coord) {
            if chunk.release_surface().is_some() {
                self.events.push(SurfaceEvent::Detached(coord));
            }
            if self.eviction == EvictionPolicy::Retain {
                if state == ChunkState::BlocksPending {
                    chunk.clear_blocks();
                    chunk.regress_to(ChunkState::Empty);
                } else {
                    chunk.regress_to(ChunkState::MeshPending);
                }
            }
        }
        if self.eviction == EvictionPolicy::Discard {
            self.discard(coord);
        }

        self.evictions += 1;
        log::debug!("Evicted chunk {coord} from {state:?}");
        true
    }

    /// Remove a chunk from the map and unlink it from its neighbors
    fn discard(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.remove(&coord) else {
            return;
        };
        for (dir, other_coord) in chunk.linked_neighbors() {
            let Some(other) = self.chunks.get_mut(&other_coord) else {
                continue;
            };
            other.set_neighbor(dir.opposite(), None);
            // A queued neighbor can no longer be meshed
            if other.state() == ChunkState::MeshQueued {
                other.regress_to(ChunkState::MeshPending);
                self.mesh_queue.retain(|job| job.coord != other_coord);
            }
        }
    }

    /// Rebuild a chunk's surface synchronously. Applies to chunks that are
    /// queued for meshing or already `Ready`; returns whether a surface was
    /// attached.
    pub fn remesh_now(&mut self, coord: ChunkCoord) -> bool {
        let Some(state) = self.chunks.get(&coord).map(Chunk::state) else {
            return false;
        };
        if state < ChunkState::MeshQueued {
            return false;
        }
        if state == ChunkState::MeshQueued {
            self.mesh_queue.retain(|job| job.coord != coord);
        }

        let surface = Neighborhood::gather(&self.chunks, coord).map(|hood| MeshGenerationTask::run_to_completion(&hood));
        match surface {
            Ok(surface) => {
                self.attach(coord, surface);
                self.meshes_built += 1;
                true
            }
            Err(err) => {
                log::error!("Re-meshing chunk {coord} failed: {err}");
                if state == ChunkState::MeshQueued {
                    if let Some(chunk) = self.chunks.get_mut(&coord) {
                        chunk.regress_to(ChunkState::MeshPending);
                    }
                }
                false
            }
        }
    }

    /// Write one voxel and re-mesh the owning chunk plus any neighbor that
    /// shares the edited cell's boundary.
    pub fn set_voxel(&mut self, voxel: IVec3, block: BlockType) -> EditOutcome {
        if !(0..CHUNK_HEIGHT).contains(&voxel.y) {
            log::warn!("Ignoring edit at {voxel}: y outside 0..{CHUNK_HEIGHT}");
            return EditOutcome::OutOfRange;
        }
        let coord = ChunkCoord::from_voxel(voxel);
        let local = ChunkCoord::local_of(voxel);

        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return EditOutcome::NoChunk;
        };
        if !chunk.state().has_blocks() {
            return EditOutcome::NotGenerated;
        }
        chunk.set_block(local.x, local.y, local.z, block);

        let mut affected = vec![coord];
        if local.x == 0 {
            affected.push(coord.neighbor(Direction::West));
        }
        if local.x == CHUNK_WIDTH - 1 {
            affected.push(coord.neighbor(Direction::East));
        }
        if local.z == 0 {
            affected.push(coord.neighbor(Direction::North));
        }
        if local.z == CHUNK_WIDTH - 1 {
            affected.push(coord.neighbor(Direction::South));
        }

        let remeshed: Vec<ChunkCoord> = affected.into_iter().filter(|c| self.remesh_now(*c)).collect();
        log::debug!("Set {voxel} to {block:?}, re-meshed {} chunks", remeshed.len());
        EditOutcome::Applied { remeshed }
    }

    /// Block at a world voxel, if its chunk has block data
    pub fn block_at(&self, voxel: IVec3) -> Option<BlockType> {
        if !(0..CHUNK_HEIGHT).contains(&voxel.y) {
            return None;
        }
        let chunk = self.chunks.get(&ChunkCoord::from_voxel(voxel))?;
        if !chunk.state().has_blocks() {
            return None;
        }
        chunk.get_block(ChunkCoord::local_of(voxel))
    }

    /// First solid voxel along a ray through generated chunks
    pub fn voxel_raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.raycast(origin, direction, max_distance)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Chunk containing a world position
    pub fn chunk_at_world(&self, x: f32, z: f32) -> Option<&Chunk> {
        self.chunks.get(&ChunkCoord::from_world(x, z))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn block_queue_len(&self) -> usize {
        self.block_queue.len()
    }

    pub fn mesh_queue_len(&self) -> usize {
        self.mesh_queue.len()
    }

    /// Whether both work queues are empty
    pub fn is_idle(&self) -> bool {
        self.block_queue.is_empty() && self.mesh_queue.is_empty()
    }

    /// Number of chunks currently holding a surface
    pub fn resident_surface_count(&self) -> usize {
        self.chunks.values().filter(|c| c.surface().is_some()).count()
    }

    /// Chunks with an attached surface
    pub fn visible_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks
            .values()
            .filter(|c| c.state() == ChunkState::Ready && c.surface().is_some())
    }

    /// Take the surface events recorded since the last call
    pub fn drain_surface_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn stats(&self) -> TerrainStats {
        TerrainStats {
            chunks: self.chunks.len(),
            block_queue: self.block_queue.len(),
            mesh_queue: self.mesh_queue.len(),
            ready: self.chunks.values().filter(|c| c.state() == ChunkState::Ready).count(),
            blocks_generated: self.blocks_generated,
            meshes_built: self.meshes_built,
            evictions: self.evictions,
        }
    }
}

impl VoxelOccupancy for Terrain {
    fn is_solid(&self, voxel: IVec3) -> bool {
        self.block_at(voxel).is_some_and(BlockType::is_solid)
    }
}

fn deadline_after(slice: Duration) -> Deadline {
    if slice == Duration::MAX {
        Deadline::unbounded()
    } else {
        Deadline::after(slice)
    }
}
