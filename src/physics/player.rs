//! First-person player: mouse look, walking, gravity and jumping

use std::f32::consts::{FRAC_PI_2, SQRT_2, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::physics::collision::{self, BodyShape};
use crate::streaming::view_window::{Observer, ViewWindowDelta};
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::raycast::{RayHit, VoxelOccupancy};

/// Movement numbers for the player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementProfile {
    /// Horizontal acceleration from input (units/s^2)
    pub acceleration: f32,
    /// Fraction of horizontal velocity kept after one second
    pub damping: f32,
    pub gravity: f32,
    /// Upward velocity set by a jump from the ground
    pub jump_velocity: f32,
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Camera height above the feet
    pub eye_height: f32,
}

impl Default for MovementProfile {
    fn default() -> Self {
        Self {
            acceleration: 45.0,
            damping: 0.03,
            gravity: 32.0,
            jump_velocity: 9.0,
            mouse_sensitivity: 0.005,
            eye_height: 1.75,
        }
    }
}

/// Movement intent for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementInput {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 right, -1 left
    pub right: f32,
    pub jump: bool,
}

impl MovementInput {
    /// Build from the state of the movement keys
    pub fn from_keys(forward: bool, back: bool, left: bool, right: bool, jump: bool) -> Self {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        Self {
            forward: axis(forward, back),
            right: axis(right, left),
            jump,
        }
    }
}

/// Player body with its view window
pub struct Player {
    /// Feet position
    pub position: Vec3,
    pub velocity: Vec3,
    yaw: f32,
    pitch: f32,
    grounded: bool,
    profile: MovementProfile,
    body: BodyShape,
    observer: Observer,
}

impl Player {
    /// Create a player at `position` whose window is already centered there
    pub fn new(position: Vec3, config: &EngineConfig) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            grounded: false,
            profile: config.movement.clone(),
            body: config.body,
            observer: Observer::at(config.render_distance, position),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Apply mouse motion in pixels
    pub fn look(&mut self, dx: f32, dy: f32) {
        let s = self.profile.mouse_sensitivity;
        self.yaw = (self.yaw - s * dx) % TAU;
        self.pitch = (self.pitch - s * dy).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Camera position
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.profile.eye_height
    }

    /// Unit view direction; yaw 0 looks down -Z
    pub fn look_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Horizontal movement direction for an input, scaled down on diagonals
    pub fn wish_direction(&self, input: &MovementInput) -> Vec3 {
        let (mut forward, mut right) = (input.forward, input.right);
        if forward.abs() + right.abs() > 1.0 {
            forward *= SQRT_2 / 2.0;
            right *= SQRT_2 / 2.0;
        }
        let (sy, cy) = self.yaw.sin_cos();
        let ahead = Vec3::new(-sy, 0.0, -cy);
        let side = Vec3::new(cy, 0.0, -sy);
        ahead * forward + side * right
    }

    /// Advance one physics step and return the view-window change
    pub fn update(&mut self, dt: f32, input: &MovementInput, world: &impl VoxelOccupancy) -> ViewWindowDelta {
        let p = &self.profile;

        self.velocity += self.wish_direction(input) * p.acceleration * dt;
        let keep = p.damping.powf(dt);
        self.velocity.x *= keep;
        self.velocity.z *= keep;

        if input.jump && self.grounded {
            self.velocity.y = p.jump_velocity;
        }
        self.velocity.y -= p.gravity * dt;

        let result = collision::resolve(world, &self.body, self.position, self.velocity, self.velocity * dt);
        self.position = result.position;
        self.velocity = result.velocity;
        self.grounded = result.grounded;

        self.observer.compute_delta(self.position)
    }

    /// Voxel under the crosshair, within `reach`
    pub fn target(&self, world: &impl VoxelOccupancy, reach: f32) -> Option<RayHit> {
        world.raycast(self.eye_position(), self.look_direction(), reach)
    }

    /// Chunk the player stands in
    pub fn chunk(&self) -> ChunkCoord {
        ChunkCoord::from_world(self.position.x, self.position.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    struct Floor;

    impl VoxelOccupancy for Floor {
        fn is_solid(&self, v: IVec3) -> bool {
            v.y <= 75
        }
    }

    fn player_at(position: Vec3) -> Player {
        let config = EngineConfig {
            render_distance: 2,
            ..Default::default()
        };
        Player::new(position, &config)
    }

    fn settle(player: &mut Player) {
        for _ in 0..120 {
            player.update(1.0 / 60.0, &MovementInput::default(), &Floor);
        }
    }

    #[test]
    fn test_look_clamps_pitch() {
        let mut player = player_at(Vec3::ZERO);
        player.look(0.0, -10_000.0);
        assert_eq!(player.pitch(), FRAC_PI_2);
        player.look(0.0, 20_000.0);
        assert_eq!(player.pitch(), -FRAC_PI_2);

        player.look(100.0, 0.0);
        assert!((player.yaw() + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wish_direction() {
        let player = player_at(Vec3::ZERO);
        let forward = player.wish_direction(&MovementInput::from_keys(true, false, false, false, false));
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);

        let right = player.wish_direction(&MovementInput::from_keys(false, false, false, true, false));
        assert!((right - Vec3::X).length() < 1e-6);

        let diagonal = player.wish_direction(&MovementInput::from_keys(true, false, true, false, false));
        assert!((diagonal.length() - 1.0).abs() < 1e-5);

        let none = player.wish_direction(&MovementInput::from_keys(true, true, true, true, false));
        assert_eq!(none, Vec3::ZERO);
    }

    #[test]
    fn test_look_direction_matches_wish_at_level_pitch() {
        let mut player = player_at(Vec3::ZERO);
        player.look(123.0, 0.0);
        let wish = player.wish_direction(&MovementInput { forward: 1.0, right: 0.0, jump: false });
        assert!((player.look_direction() - wish).length() < 1e-5);
    }

    #[test]
    fn test_falls_and_lands_on_floor() {
        let mut player = player_at(Vec3::new(8.5, 90.0, 8.5));
        settle(&mut player);
        assert!(player.is_grounded());
        assert!(player.position.y >= 76.0 && player.position.y < 76.01);
        assert!(player.velocity.y.abs() < 1.0);
        assert!((player.eye_position().y - player.position.y - 1.75).abs() < 1e-5);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut player = player_at(Vec3::new(8.5, 90.0, 8.5));
        let jump = MovementInput { jump: true, ..Default::default() };

        player.update(1.0 / 60.0, &jump, &Floor);
        assert!(player.velocity.y < 0.0);

        settle(&mut player);
        player.update(1.0 / 60.0, &jump, &Floor);
        assert!(player.velocity.y > 0.0);
        assert!(!player.is_grounded());
        assert!(player.position.y > 76.01);
    }

    #[test]
    fn test_damping_stops_walking() {
        let mut player = player_at(Vec3::new(8.5, 76.001, 8.5));
        let walk = MovementInput { forward: 1.0, ..Default::default() };
        for _ in 0..60 {
            player.update(1.0 / 60.0, &walk, &Floor);
        }
        assert!(player.position.z < 8.5);
        let speed = player.velocity.length();
        assert!(speed > 1.0);

        for _ in 0..300 {
            player.update(1.0 / 60.0, &MovementInput::default(), &Floor);
        }
        assert!(player.velocity.x.abs() + player.velocity.z.abs() < 1e-3);
    }

    #[test]
    fn test_crossing_chunk_reports_delta() {
        let mut player = player_at(Vec3::new(15.0, 76.001, 8.0));
        player.velocity = Vec3::new(120.0, 0.0, 0.0);
        let delta = player.update(1.0 / 60.0, &MovementInput::default(), &Floor);
        assert_eq!(player.chunk(), ChunkCoord::new(16, 0));
        assert!(!delta.is_empty());
        assert!(player.observer().is_chunk_in_view_window(ChunkCoord::new(48, 0)));
    }

    #[test]
    fn test_target_block_below() {
        let mut player = player_at(Vec3::new(8.5, 76.001, 8.5));
        player.look(0.0, 10_000.0);
        let hit = player.target(&Floor, 5.0).unwrap();
        assert_eq!(hit.voxel, IVec3::new(8, 75, 8));
        assert_eq!(hit.normal, Vec3::Y);
    }
}
