//! Voxel grid traversal (Amanatides & Woo)
//!
//! Walks every cell a ray passes through, in order, until an occupied cell
//! is found or the distance runs out. Cost is linear in the number of cells
//! crossed, independent of how many are occupied.

use glam::{IVec3, Vec3};

use crate::math::Ray;
use crate::voxel::block::Direction;

/// Anything that can answer "is this voxel solid?"
pub trait VoxelOccupancy {
    /// Whether the voxel at integer world coordinates is occupied
    fn is_solid(&self, voxel: IVec3) -> bool;

    /// Cast a ray against this occupancy grid
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        raycast(origin, direction, max_distance, |v| self.is_solid(v))
    }
}

/// First occupied voxel along a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Integer coordinates of the occupied voxel
    pub voxel: IVec3,
    /// Exact point where the ray enters the voxel
    pub position: Vec3,
    /// Outward normal of the face that was hit; zero when the ray starts
    /// inside the voxel
    pub normal: Vec3,
    /// Distance travelled along the (normalized) ray
    pub distance: f32,
}

impl RayHit {
    /// Face of the voxel that was hit
    pub fn face(&self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| d.offset().as_vec3() == self.normal)
    }

    /// The empty cell in front of the hit face (where a placed block goes)
    pub fn adjacent(&self) -> IVec3 {
        self.voxel + self.normal.as_ivec3()
    }
}

/// Traverse the grid from `origin` along `direction` for at most
/// `max_distance` units, returning the first voxel for which `is_solid`
/// holds.
pub fn raycast(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    mut is_solid: impl FnMut(IVec3) -> bool,
) -> Option<RayHit> {
    if !max_distance.is_finite() || max_distance < 0.0 {
        return None;
    }
    let ray = Ray::new(origin, direction)?;
    let d = ray.direction;

    let mut cell = origin.floor().as_ivec3();
    let step = IVec3::new(step_of(d.x), step_of(d.y), step_of(d.z));
    let t_delta = ray.inv_direction.abs();

    // Distance along the ray to the first boundary crossing on each axis
    let mut t_max = Vec3::ZERO;
    for axis in 0..3 {
        t_max[axis] = if step[axis] == 0 {
            f32::INFINITY
        } else {
            let boundary = if step[axis] > 0 { cell[axis] as f32 + 1.0 } else { cell[axis] as f32 };
            (boundary - origin[axis]) / d[axis]
        };
    }

    let mut t = 0.0f32;
    let mut crossed: Option<usize> = None;

    while t <= max_distance {
        if is_solid(cell) {
            let mut position = ray.at(t);
            let mut normal = Vec3::ZERO;
            if let Some(axis) = crossed {
                position[axis] = if step[axis] > 0 { cell[axis] as f32 } else { cell[axis] as f32 + 1.0 };
                normal[axis] = -step[axis] as f32;
            }
            return Some(RayHit { voxel: cell, position, normal, distance: t });
        }

        let axis = if t_max.x < t_max.y {
            if t_max.x < t_max.z { 0 } else { 2 }
        } else if t_max.y < t_max.z {
            1
        } else {
            2
        };

        t = t_max[axis];
        cell[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        crossed = Some(axis);
    }

    None
}

fn step_of(component: f32) -> i32 {
    if component > 0.0 {
        1
    } else if component < 0.0 {
        -1
    } else {
        0
    }
}
