//! Procedural terrain generation

pub mod generator;
pub use generator::{BlockGenerationTask, TerrainGenerator, TerrainParams};
