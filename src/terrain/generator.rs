//! Noise-based height-field terrain generation

use noise::{NoiseFn, Simplex};
use serde::{Deserialize, Serialize};

use crate::streaming::budget::{Deadline, Step};
use crate::voxel::block::BlockType;
use crate::voxel::chunk::{Chunk, CHUNK_HEIGHT, CHUNK_WIDTH};

/// Number of columns in one chunk
pub const CHUNK_COLUMNS: i32 = CHUNK_WIDTH * CHUNK_WIDTH;

/// Depth of the dirt layer under the grass
pub const DIRT_DEPTH: i32 = 3;

/// 2D noise source boxed for injection
pub type Noise2 = Box<dyn NoiseFn<f64, 2> + Send + Sync>;

/// Parameters controlling terrain generation
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub detail_seed: u32,
    pub base_seed: u32,
    pub detail_scale: f64,     // Fine noise frequency
    pub detail_amplitude: f64, // Fine noise maps to [-a, a]
    pub base_scale: f64,       // Coarse noise frequency
    pub base_min: f64,         // Coarse noise maps to [base_min, base_max]
    pub base_max: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            detail_seed: 0x7465_7272,
            base_seed: 0x6c61_7267,
            detail_scale: 0.02,
            detail_amplitude: 5.0,
            base_scale: 0.004,
            base_min: 50.0,
            base_max: 100.0,
        }
    }
}

/// Height-field terrain generator summing a fine and a coarse noise layer.
///
/// Seeds are fixed by the params, so a world coordinate always yields the
/// same column no matter which chunk asks first.
pub struct TerrainGenerator {
    params: TerrainParams,
    detail: Noise2,
    base: Noise2,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let detail = Box::new(Simplex::new(params.detail_seed));
        let base = Box::new(Simplex::new(params.base_seed));
        Self { params, detail, base }
    }

    /// Create a generator with custom noise layers (tests, tools)
    pub fn with_noise(params: TerrainParams, detail: Noise2, base: Noise2) -> Self {
        Self { params, detail, base }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Surface height (y of the grass block) of the column at world (x, z)
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        let p = &self.params;
        let detail = self.detail.get([x as f64 * p.detail_scale, z as f64 * p.detail_scale]);
        let base = self.base.get([x as f64 * p.base_scale, z as f64 * p.base_scale]);

        let height = map_range(detail, -1.0, 1.0, -p.detail_amplitude, p.detail_amplitude)
            + map_range(base, -1.0, 1.0, p.base_min, p.base_max);
        height.floor() as i32
    }

    /// Clear and fill one column of a chunk.
    ///
    /// Layers: bedrock at y=0, stone up to `height - 3`, dirt below the
    /// surface, grass at `height`, air above.
    pub fn fill_column(&self, chunk: &mut Chunk, local_x: i32, local_z: i32) {
        for y in 0..CHUNK_HEIGHT {
            chunk.set_block(local_x, y, local_z, BlockType::Air);
        }

        let x = chunk.coord.x + local_x;
        let z = chunk.coord.z + local_z;
        let height = self.column_height(x, z).clamp(1, CHUNK_HEIGHT - 1);

        chunk.set_block(local_x, 0, local_z, BlockType::Bedrock);
        for y in 1..height - DIRT_DEPTH {
            chunk.set_block(local_x, y, local_z, BlockType::Stone);
        }
        for y in (height - DIRT_DEPTH).max(1)..height {
            chunk.set_block(local_x, y, local_z, BlockType::Dirt);
        }
        chunk.set_block(local_x, height, local_z, BlockType::Grass);
    }

    /// Fill a whole chunk synchronously
    pub fn generate_chunk(&self, chunk: &mut Chunk) {
        let mut task = BlockGenerationTask::new();
        task.step(self, chunk, &Deadline::unbounded());
    }
}

/// Linearly remap `value` from one range to another
pub fn map_range(value: f64, from_min: f64, from_max: f64, to_min: f64, to_max: f64) -> f64 {
    to_min + (value - from_min) * (to_max - to_min) / (from_max - from_min)
}

/// Resumable block fill for one chunk.
///
/// The cursor is the index of the next column, visited x-major; the task
/// suspends only between columns.
#[derive(Clone, Debug, Default)]
pub struct BlockGenerationTask {
    column: i32,
}

impl BlockGenerationTask {
    /// Create a task positioned at the first column
    pub fn new() -> Self {
        Self { column: 0 }
    }

    /// Number of columns filled so far
    pub fn columns_done(&self) -> i32 {
        self.column
    }

    /// Fill columns until done or the deadline passes
    pub fn step(&mut self, generator: &TerrainGenerator, chunk: &mut Chunk, deadline: &Deadline) -> Step {
        while self.column < CHUNK_COLUMNS {
            let local_x = self.column / CHUNK_WIDTH;
            let local_z = self.column % CHUNK_WIDTH;
            generator.fill_column(chunk, local_x, local_z);
            self.column += 1;

            if self.column < CHUNK_COLUMNS && deadline.expired() {
                return Step::Suspended;
            }
        }
        Step::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::chunk::ChunkCoord;
    use noise::Constant;
    use std::time::Duration;

    fn flat_generator(value: f64) -> TerrainGenerator {
        TerrainGenerator::with_noise(
            TerrainParams::default(),
            Box::new(Constant::new(value)),
            Box::new(Constant::new(value)),
        )
    }

    #[test]
    fn test_terrain_params_default() {
        let params = TerrainParams::default();
        assert_eq!(params.detail_scale, 0.02);
        assert_eq!(params.base_scale, 0.004);
        assert_eq!(params.detail_amplitude, 5.0);
        assert_eq!(params.base_min, 50.0);
        assert_eq!(params.base_max, 100.0);
    }

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(0.0, -1.0, 1.0, -5.0, 5.0), 0.0);
        assert_eq!(map_range(0.0, -1.0, 1.0, 50.0, 100.0), 75.0);
        assert_eq!(map_range(-1.0, -1.0, 1.0, 50.0, 100.0), 50.0);
        assert_eq!(map_range(1.0, -1.0, 1.0, -5.0, 5.0), 5.0);
    }

    #[test]
    fn test_zero_noise_column_layers() {
        let generator = flat_generator(0.0);
        assert_eq!(generator.column_height(123, -456), 75);

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        generator.generate_chunk(&mut chunk);

        for (x, z) in [(0, 0), (15, 15), (7, 3)] {
            assert_eq!(chunk.block(x, 0, z), BlockType::Bedrock);
            for y in 1..=71 {
                assert_eq!(chunk.block(x, y, z), BlockType::Stone, "y={y}");
            }
            for y in 72..=74 {
                assert_eq!(chunk.block(x, y, z), BlockType::Dirt, "y={y}");
            }
            assert_eq!(chunk.block(x, 75, z), BlockType::Grass);
            for y in 76..CHUNK_HEIGHT {
                assert_eq!(chunk.block(x, y, z), BlockType::Air, "y={y}");
            }
        }
    }

    #[test]
    fn test_extreme_noise_stays_in_bounds() {
        let mut params = TerrainParams::default();
        params.base_min = 400.0;
        params.base_max = 500.0;
        let high = TerrainGenerator::with_noise(params, Box::new(Constant::new(1.0)), Box::new(Constant::new(1.0)));
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        high.generate_chunk(&mut chunk);
        assert_eq!(chunk.block(0, CHUNK_HEIGHT - 1, 0), BlockType::Grass);

        let mut params = TerrainParams::default();
        params.base_min = -50.0;
        params.base_max = -40.0;
        let low = TerrainGenerator::with_noise(params, Box::new(Constant::new(0.0)), Box::new(Constant::new(0.0)));
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        low.generate_chunk(&mut chunk);
        assert_eq!(chunk.block(0, 0, 0), BlockType::Bedrock);
        assert_eq!(chunk.block(0, 1, 0), BlockType::Grass);
        assert_eq!(chunk.block(0, 2, 0), BlockType::Air);
    }

    #[test]
    fn test_height_in_expected_range() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        for (x, z) in [(0, 0), (100, -100), (-5000, 7000), (31, 17)] {
            let h = generator.column_height(x, z);
            assert!((45..=105).contains(&h), "height {h} at ({x}, {z})");
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = TerrainGenerator::new(TerrainParams::default());
        let b = TerrainGenerator::new(TerrainParams::default());

        let coord = ChunkCoord::new(-32, 48);
        let mut first = Chunk::new(coord);
        let mut second = Chunk::new(coord);
        a.generate_chunk(&mut first);
        // Generate an unrelated chunk in between; order must not matter
        b.generate_chunk(&mut Chunk::new(ChunkCoord::new(160, 0)));
        b.generate_chunk(&mut second);

        for x in 0..CHUNK_WIDTH {
            for z in 0..CHUNK_WIDTH {
                for y in 0..CHUNK_HEIGHT {
                    assert_eq!(first.block(x, y, z), second.block(x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_shared_edge_matches_world_height() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        let mut west = Chunk::new(ChunkCoord::new(0, 0));
        generator.generate_chunk(&mut west);

        let h = generator.column_height(15, 4);
        assert_eq!(west.block(15, h, 4), BlockType::Grass);
        assert_eq!(west.block(15, h + 1, 4), BlockType::Air);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = TerrainGenerator::new(TerrainParams::default());
        let b = TerrainGenerator::new(TerrainParams { base_seed: 1, detail_seed: 2, ..Default::default() });
        let differs = (0..64).any(|i| a.column_height(i * 37, i * 11) != b.column_height(i * 37, i * 11));
        assert!(differs);
    }

    #[test]
    fn test_task_suspends_and_resumes() {
        let generator = flat_generator(0.0);
        let mut chunk = Chunk::new(ChunkCoord::new(16, 16));
        let mut task = BlockGenerationTask::new();

        // An already-expired deadline allows exactly one column per step
        let expired = Deadline::after(Duration::ZERO);
        assert_eq!(task.step(&generator, &mut chunk, &expired), Step::Suspended);
        assert_eq!(task.columns_done(), 1);
        assert_eq!(chunk.block(0, 75, 0), BlockType::Grass);
        assert_eq!(chunk.block(0, 75, 1), BlockType::Air);

        assert_eq!(task.step(&generator, &mut chunk, &expired), Step::Suspended);
        assert_eq!(task.columns_done(), 2);
        assert_eq!(chunk.block(0, 75, 1), BlockType::Grass);

        assert_eq!(task.step(&generator, &mut chunk, &Deadline::after(Duration::from_secs(60))), Step::Finished);
        assert_eq!(task.columns_done(), CHUNK_COLUMNS);
        assert_eq!(chunk.block(15, 75, 15), BlockType::Grass);
    }

    #[test]
    fn test_fill_column_clears_previous_content() {
        let generator = flat_generator(0.0);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_block(2, 200, 2, BlockType::Stone);
        generator.fill_column(&mut chunk, 2, 2);
        assert_eq!(chunk.block(2, 200, 2), BlockType::Air);
        assert_eq!(chunk.block(2, 75, 2), BlockType::Grass);
    }
}
