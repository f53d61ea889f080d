use criterion::{criterion_group, criterion_main, Criterion, black_box};

use strata::core::EngineConfig;
use strata::streaming::{Observer, Terrain};
use strata::terrain::{TerrainGenerator, TerrainParams};
use strata::voxel::{Chunk, ChunkCoord};

use glam::Vec3;

fn bench_block_generation(c: &mut Criterion) {
    let generator = TerrainGenerator::new(TerrainParams::default());

    c.bench_function("block_generation_chunk", |b| {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        b.iter(|| {
            generator.generate_chunk(black_box(&mut chunk));
        });
    });
}

fn bench_remesh(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut terrain = Terrain::new(&config);
    terrain.queue_chunks_circular(Vec3::new(8.0, 0.0, 8.0), 1);
    terrain.advance_until_idle(1000);
    let center = ChunkCoord::new(0, 0);

    c.bench_function("mesh_generation_chunk", |b| {
        b.iter(|| {
            black_box(terrain.remesh_now(black_box(center)));
            terrain.drain_surface_events();
        });
    });
}

fn bench_voxel_raycast(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut terrain = Terrain::new(&config);
    terrain.queue_chunks_circular(Vec3::new(8.0, 0.0, 8.0), 2);
    terrain.advance_until_idle(1000);

    c.bench_function("voxel_raycast_down", |b| {
        b.iter(|| terrain.voxel_raycast(black_box(Vec3::new(8.5, 200.0, 8.5)), Vec3::NEG_Y, 256.0));
    });

    c.bench_function("voxel_raycast_shallow", |b| {
        let dir = Vec3::new(1.0, -0.05, 0.3);
        b.iter(|| terrain.voxel_raycast(black_box(Vec3::new(-20.5, 110.0, -7.5)), dir, 64.0));
    });
}

fn bench_view_window_delta(c: &mut Criterion) {
    c.bench_function("view_window_delta_r12", |b| {
        let mut observer = Observer::new(12);
        let mut x = 0.0f32;
        b.iter(|| {
            x += 16.0;
            black_box(observer.compute_delta(Vec3::new(x, 0.0, 0.0)))
        });
    });
}

criterion_group!(
    benches,
    bench_block_generation,
    bench_remesh,
    bench_voxel_raycast,
    bench_view_window_delta,
);
criterion_main!(benches);
