//! Engine configuration, loadable from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::time::DEFAULT_MAX_FRAME_SECS;
use crate::core::types::Result;
use crate::physics::collision::BodyShape;
use crate::physics::player::MovementProfile;
use crate::terrain::generator::TerrainParams;

/// What happens to a chunk that leaves the view window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Release the surface and regress the state, keeping block data for a
    /// cheap reload when the observer comes back. The chunk map only grows
    /// under this policy: every chunk ever visited keeps its 64 KiB of blocks.
    #[default]
    Retain,
    /// Drop the chunk from the map entirely and unlink its neighbors.
    Discard,
}

/// Top-level configuration for the terrain pipeline and the player
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// View window radius in chunks
    pub render_distance: i32,
    /// Share of an averaged frame the chunk pipeline may spend per frame
    pub generation_budget_ratio: f32,
    /// Clamp on a single frame delta, in seconds
    pub max_frame_dt: f32,
    /// Eviction behavior for chunks leaving the view window
    pub eviction: EvictionPolicy,
    /// Terrain noise parameters
    pub terrain: TerrainParams,
    /// Player movement numbers
    pub movement: MovementProfile,
    /// Player collision volume
    pub body: BodyShape,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render_distance: 12,
            generation_budget_ratio: 0.5,
            max_frame_dt: DEFAULT_MAX_FRAME_SECS,
            eviction: EvictionPolicy::Retain,
            terrain: TerrainParams::default(),
            movement: MovementProfile::default(),
            body: BodyShape::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Clamp values that would stall or break the pipeline
    fn sanitized(mut self) -> Self {
        if self.render_distance < 1 {
            log::warn!("render_distance {} raised to 1", self.render_distance);
            self.render_distance = 1;
        }
        if !(self.generation_budget_ratio > 0.0) {
            log::warn!(
                "generation_budget_ratio {} reset to default",
                self.generation_budget_ratio
            );
            self.generation_budget_ratio = Self::default().generation_budget_ratio;
        } else if self.generation_budget_ratio > 1.0 {
            log::warn!("generation_budget_ratio {} lowered to 1", self.generation_budget_ratio);
            self.generation_budget_ratio = 1.0;
        }
        if !(self.max_frame_dt > 0.0) || !self.max_frame_dt.is_finite() {
            self.max_frame_dt = DEFAULT_MAX_FRAME_SECS;
        }
        self
    }
}
