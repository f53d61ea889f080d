//! Strata - streaming voxel terrain
//!
//! Chunks of a height-field world are created around a moving observer,
//! filled and meshed by time-sliced tasks that never take more than a share
//! of a frame, and evicted when the observer moves away. The same chunk map
//! answers voxel raycasts and drives swept collision for the player.
//!
//! ```no_run
//! use strata::core::EngineConfig;
//! use strata::physics::{MovementInput, Player};
//! use strata::streaming::Terrain;
//! use glam::Vec3;
//!
//! let config = EngineConfig::default();
//! let mut terrain = Terrain::new(&config);
//! let spawn = Vec3::new(8.5, 90.0, 8.5);
//! terrain.queue_chunks_circular(spawn, config.render_distance + 1);
//!
//! let mut player = Player::new(spawn, &config);
//! loop {
//!     let dt = 1.0 / 60.0;
//!     let delta = player.update(dt, &MovementInput::default(), &terrain);
//!     terrain.apply_delta(&delta);
//!     terrain.advance(dt);
//! }
//! ```

pub mod core;
pub mod math;
pub mod voxel;
pub mod terrain;
pub mod meshing;
pub mod streaming;
pub mod physics;
