//! Swept collision of a body against the voxel grid
//!
//! The body is approximated by a few sample points. Each iteration casts a
//! ray from every sample along the remaining displacement, moves up to the
//! nearest hit and slides the rest of the way along the hit face.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Aabb;
use crate::voxel::raycast::{RayHit, VoxelOccupancy};

/// Upper bound on slide iterations per resolve (one per axis plus slack)
pub const MAX_ITERATIONS: usize = 4;

/// Distance kept between the body and a surface it ran into
pub const BUMP_DISTANCE: f32 = 1e-3;

/// Displacement shorter than this is treated as zero
pub const MIN_DISPLACEMENT: f32 = 1e-5;

/// Hit normals with a larger vertical component count as ground
pub const GROUND_NORMAL_Y: f32 = 0.7;

/// Collision volume of an upright body, anchored at its feet
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyShape {
    pub half_width: f32,
    pub height: f32,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self {
            half_width: 0.3,
            height: 1.8,
        }
    }
}

impl BodyShape {
    /// Bounding box relative to the feet
    pub fn local_bounds(&self) -> Aabb {
        let hw = self.half_width;
        Aabb::new(Vec3::new(-hw, 0.0, -hw), Vec3::new(hw, self.height, hw))
    }

    /// Sample offsets relative to the feet: feet, waist and head height at
    /// two opposite corners of the footprint
    pub fn sample_offsets(&self) -> [Vec3; 6] {
        let local = self.local_bounds();
        let mid = local.center().y;
        let mut out = [Vec3::ZERO; 6];
        for (i, y) in [local.min.y, mid, local.max.y].into_iter().enumerate() {
            out[i * 2] = Vec3::new(local.min.x, y, local.min.z);
            out[i * 2 + 1] = Vec3::new(local.max.x, y, local.max.z);
        }
        out
    }
}

/// Outcome of resolving one movement step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResult {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Whether the body landed on or is resting on ground this step
    pub grounded: bool,
}

/// Move a body by `displacement`, stopping at and sliding along solid
/// voxels. `velocity` loses its component along every face hit.
pub fn resolve(
    world: &impl VoxelOccupancy,
    shape: &BodyShape,
    position: Vec3,
    velocity: Vec3,
    displacement: Vec3,
) -> CollisionResult {
    let samples = shape.sample_offsets();
    let mut position = position;
    let mut velocity = velocity;
    let mut remaining = displacement;
    let mut grounded = false;

    for _ in 0..MAX_ITERATIONS {
        let distance = remaining.length();
        if distance < MIN_DISPLACEMENT {
            break;
        }
        let direction = remaining / distance;

        let Some(hit) = nearest_hit(world, &samples, position, direction, distance) else {
            position += remaining;
            remaining = Vec3::ZERO;
            break;
        };

        position += direction * hit.distance + hit.normal * BUMP_DISTANCE;
        remaining -= direction * hit.distance;
        remaining -= hit.normal * remaining.dot(hit.normal);
        velocity -= hit.normal * velocity.dot(hit.normal);

        if hit.normal.y > GROUND_NORMAL_Y {
            grounded = true;
        }
    }

    if remaining.length() >= MIN_DISPLACEMENT {
        log::trace!("Collision resolve stopped with {remaining} left");
    }

    CollisionResult {
        position,
        velocity,
        grounded,
    }
}

/// Closest face hit over all samples. Rays that start inside a solid
/// voxel report no face and are skipped so an embedded body can move out.
fn nearest_hit(
    world: &impl VoxelOccupancy,
    samples: &[Vec3],
    position: Vec3,
    direction: Vec3,
    distance: f32,
) -> Option<RayHit> {
    samples
        .iter()
        .filter_map(|offset| world.raycast(position + *offset, direction, distance))
        .filter(|hit| hit.normal != Vec3::ZERO)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    /// Solid at and below `top`, plus an optional wall at x >= `wall_x`
    struct World {
        top: i32,
        wall_x: Option<i32>,
    }

    impl VoxelOccupancy for World {
        fn is_solid(&self, v: IVec3) -> bool {
            v.y <= self.top || self.wall_x.is_some_and(|x| v.x >= x)
        }
    }

    fn floor() -> World {
        World { top: 75, wall_x: None }
    }

    #[test]
    fn test_sample_offsets_span_body() {
        let shape = BodyShape::default();
        let samples = shape.sample_offsets();
        assert_eq!(samples[0], Vec3::new(-0.3, 0.0, -0.3));
        assert_eq!(samples[1], Vec3::new(0.3, 0.0, 0.3));
        assert!((samples[2].y - 0.9).abs() < 1e-6);
        assert!((samples[5].y - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_local_bounds_start_at_feet() {
        let shape = BodyShape::default();
        let bounds = shape.local_bounds();
        assert!(bounds.contains_point(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!bounds.contains_point(Vec3::new(0.0, -0.1, 0.0)));
        assert!((bounds.size() - Vec3::new(0.6, 1.8, 0.6)).length() < 1e-5);
        for offset in shape.sample_offsets() {
            assert!(shape.local_bounds().contains_point(offset));
        }
    }

    #[test]
    fn test_free_fall_without_obstacles() {
        let result = resolve(&floor(), &BodyShape::default(), Vec3::new(0.5, 100.0, 0.5), Vec3::NEG_Y, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(result.position, Vec3::new(0.5, 98.0, 0.5));
        assert_eq!(result.velocity, Vec3::NEG_Y);
        assert!(!result.grounded);
    }

    #[test]
    fn test_falling_onto_floor_grounds() {
        let velocity = Vec3::new(0.0, -10.0, 0.0);
        let result = resolve(&floor(), &BodyShape::default(), Vec3::new(8.5, 80.0, 8.5), velocity, velocity);

        assert!(result.grounded);
        assert_eq!(result.velocity.y, 0.0);
        assert!(result.position.y >= 76.0);
        assert!(result.position.y < 76.01);
    }

    #[test]
    fn test_resting_contact_stays_grounded() {
        let shape = BodyShape::default();
        let mut position = Vec3::new(8.5, 80.0, 8.5);
        let mut velocity = Vec3::ZERO;
        let dt = 1.0 / 60.0;
        let mut grounded = false;

        for _ in 0..240 {
            velocity.y -= 32.0 * dt;
            let result = resolve(&floor(), &shape, position, velocity, velocity * dt);
            position = result.position;
            velocity = result.velocity;
            grounded = result.grounded;
            assert!(position.y >= 76.0, "sank to {}", position.y);
        }
        assert!(grounded);
        assert!(position.y < 76.01);
    }

    #[test]
    fn test_slides_along_wall() {
        let world = World { top: 0, wall_x: Some(10) };
        let velocity = Vec3::new(4.0, 0.0, 3.0);
        let result = resolve(&world, &BodyShape::default(), Vec3::new(8.0, 5.0, 0.5), velocity, velocity);

        // Body edge is at x + 0.3; it stops just short of x = 10
        assert!(result.position.x <= 9.7);
        assert!(result.position.x > 9.69);
        assert!((result.position.z - 3.5).abs() < 1e-3);
        assert_eq!(result.velocity.x, 0.0);
        assert_eq!(result.velocity.z, 3.0);
        assert!(!result.grounded);
    }

    #[test]
    fn test_zero_displacement_is_noop() {
        let start = Vec3::new(1.0, 90.0, 1.0);
        let result = resolve(&floor(), &BodyShape::default(), start, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(result.position, start);
        assert!(!result.grounded);
    }

    #[test]
    fn test_embedded_body_can_move_out() {
        let start = Vec3::new(0.5, 75.5, 0.5);
        let result = resolve(&floor(), &BodyShape::default(), start, Vec3::Y, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(result.position, Vec3::new(0.5, 76.5, 0.5));
    }
}
