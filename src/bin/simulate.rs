//! Headless simulation: walks a player through streaming terrain and logs
//! pipeline statistics.
//!
//! Usage: cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>         JSON engine config (default: built-in defaults)
//!   --frames <N>            Frames to simulate (default: 1200)
//!   --dt <SECONDS>          Frame delta fed to the pipeline (default: 1/60)
//!   --render-distance <N>   Override the configured render distance
//!   --dig-every <N>         Remove the targeted block every N frames (default: 120)

use std::process::ExitCode;
use std::time::{Duration, Instant};

use glam::Vec3;

use strata::core::{logging, EngineConfig};
use strata::physics::{MovementInput, Player};
use strata::streaming::{EditOutcome, SurfaceEvent, Terrain};
use strata::voxel::BlockType;

/// Rounds spent generating the spawn chunk before the player drops in
const MAX_BOOT_ROUNDS: usize = 10_000;

/// Reach of the dig ray
const REACH: f32 = 5.0;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };
    if let Some(distance) = parse_i32_arg(&args, "--render-distance") {
        config.render_distance = distance.max(1);
    }
    let frames = parse_usize_arg(&args, "--frames").unwrap_or(1200);
    let dt = parse_f32_arg(&args, "--dt").unwrap_or(1.0 / 60.0);
    let dig_every = parse_usize_arg(&args, "--dig-every").unwrap_or(120).max(1);

    println!("=== Strata Simulation ===");
    println!("Render distance: {} chunks", config.render_distance);
    println!("Frames: {} at dt {:.4}s", frames, dt);
    println!("Eviction: {:?}", config.eviction);
    println!();

    let mut terrain = Terrain::new(&config);
    let ground = terrain.generator().column_height(8, 8);
    let spawn = Vec3::new(8.5, ground as f32 + 3.0, 8.5);

    let start = Instant::now();
    terrain.queue_chunks_circular(spawn, config.render_distance + 1);
    if !boot_spawn_chunk(&mut terrain, spawn) {
        log::error!("Spawn chunk did not finish generating");
        return ExitCode::FAILURE;
    }
    log::info!("Spawn chunk ready after {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    let mut player = Player::new(spawn, &config);
    let walk = MovementInput::from_keys(true, false, false, false, false);
    let mut attached = 0usize;
    let mut detached = 0usize;
    let mut dug = 0usize;

    for frame in 1..=frames {
        let input = MovementInput {
            jump: frame % 45 == 0,
            ..walk
        };
        // Slow left turn so the walk curves through fresh chunks
        player.look(0.5, 0.0);

        let delta = player.update(dt, &input, &terrain);
        terrain.apply_delta(&delta);
        terrain.advance(dt);

        if frame % dig_every == 0 {
            player.look(0.0, 400.0);
            if let Some(hit) = player.target(&terrain, REACH) {
                if let EditOutcome::Applied { remeshed } = terrain.set_voxel(hit.voxel, BlockType::Air) {
                    dug += 1;
                    log::debug!("Dug {} (re-meshed {} chunks)", hit.voxel, remeshed.len());
                }
            }
            player.look(0.0, -400.0);
        }

        for event in terrain.drain_surface_events() {
            match event {
                SurfaceEvent::Attached(_) => attached += 1,
                SurfaceEvent::Detached(_) => detached += 1,
            }
        }

        if frame % 300 == 0 {
            let stats = terrain.stats();
            log::info!(
                "Frame {}: player at {:.1}, chunks {} (ready {}), queues {}/{}, avg frame {:.2}ms",
                frame,
                player.position,
                stats.chunks,
                stats.ready,
                stats.block_queue,
                stats.mesh_queue,
                terrain.timer().average_secs() * 1000.0,
            );
        }
    }

    let stats = terrain.stats();
    let elapsed = start.elapsed();
    println!();
    println!("=== Done in {:.2}s ===", elapsed.as_secs_f64());
    println!("Player:            {:.2} (chunk {})", player.position, player.chunk());
    println!("Chunks resident:   {}", stats.chunks);
    println!("Chunks ready:      {}", stats.ready);
    println!("Blocks generated:  {}", stats.blocks_generated);
    println!("Meshes built:      {}", stats.meshes_built);
    println!("Evictions:         {}", stats.evictions);
    println!("Surfaces attached: {} / detached: {}", attached, detached);
    println!("Resident surfaces: {}", terrain.resident_surface_count());
    println!("Blocks dug:        {}", dug);

    ExitCode::SUCCESS
}

/// Generate until the chunk under the spawn point has block data
fn boot_spawn_chunk(terrain: &mut Terrain, spawn: Vec3) -> bool {
    for _ in 0..MAX_BOOT_ROUNDS {
        if terrain
            .chunk_at_world(spawn.x, spawn.z)
            .is_some_and(|c| c.state().has_blocks())
        {
            return true;
        }
        terrain.advance_with_budget(Duration::from_millis(8));
    }
    false
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
