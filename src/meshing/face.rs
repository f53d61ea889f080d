//! Per-direction face geometry and texture atlas lookup

use glam::{IVec3, UVec2, Vec2, Vec3};

use crate::voxel::block::{BlockType, Direction};

/// Tiles per atlas row/column
pub const ATLAS_TILES: u32 = 16;

/// Size of one atlas tile in UV units
pub const ATLAS_TILE_SIZE: f32 = 1.0 / ATLAS_TILES as f32;

/// Geometry of one cube face relative to the voxel's minimum corner
#[derive(Clone, Copy, Debug)]
pub struct Face {
    pub direction: Direction,
    /// Corner offsets in emission order; counter-clockwise seen from outside
    pub corners: [IVec3; 4],
}

/// Two triangles per quad, as offsets into the quad's four vertices
pub const QUAD_TRIANGLES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Face table in [`Direction::ALL`] order
pub const FACES: [Face; 6] = [
    Face {
        direction: Direction::East,
        corners: [
            IVec3::new(1, 0, 1),
            IVec3::new(1, 0, 0),
            IVec3::new(1, 1, 0),
            IVec3::new(1, 1, 1),
        ],
    },
    Face {
        direction: Direction::West,
        corners: [
            IVec3::new(0, 0, 0),
            IVec3::new(0, 0, 1),
            IVec3::new(0, 1, 1),
            IVec3::new(0, 1, 0),
        ],
    },
    Face {
        direction: Direction::Up,
        corners: [
            IVec3::new(0, 1, 0),
            IVec3::new(0, 1, 1),
            IVec3::new(1, 1, 1),
            IVec3::new(1, 1, 0),
        ],
    },
    Face {
        direction: Direction::Down,
        corners: [
            IVec3::new(0, 0, 0),
            IVec3::new(1, 0, 0),
            IVec3::new(1, 0, 1),
            IVec3::new(0, 0, 1),
        ],
    },
    Face {
        direction: Direction::South,
        corners: [
            IVec3::new(0, 0, 1),
            IVec3::new(1, 0, 1),
            IVec3::new(1, 1, 1),
            IVec3::new(0, 1, 1),
        ],
    },
    Face {
        direction: Direction::North,
        corners: [
            IVec3::new(1, 0, 0),
            IVec3::new(0, 0, 0),
            IVec3::new(0, 1, 0),
            IVec3::new(1, 1, 0),
        ],
    },
];

impl Face {
    /// Outward unit normal
    pub fn normal(&self) -> Vec3 {
        self.direction.offset().as_vec3()
    }

    /// Corner `i` placed at voxel `origin`
    pub fn corner(&self, origin: IVec3, i: usize) -> Vec3 {
        (origin + self.corners[i]).as_vec3()
    }
}

/// Atlas tile (column, row) for a block face; `None` for air
pub fn atlas_tile(block: BlockType, direction: Direction) -> Option<UVec2> {
    let tile = match (block, direction) {
        (BlockType::Air, _) => return None,
        (BlockType::Bedrock, _) => UVec2::new(1, 14),
        (BlockType::Stone, _) => UVec2::new(1, 15),
        (BlockType::Dirt, _) => UVec2::new(2, 15),
        (BlockType::Grass, Direction::Up) => UVec2::new(8, 13),
        (BlockType::Grass, Direction::Down) => UVec2::new(2, 15),
        (BlockType::Grass, _) => UVec2::new(3, 15),
    };
    Some(tile)
}

/// UV of quad vertex `i` (0..4) on an atlas tile
pub fn tile_uv(tile: UVec2, i: usize) -> Vec2 {
    let u = if (1..=2).contains(&i) { 1 } else { 0 };
    let v = if i >= 2 { 1 } else { 0 };
    Vec2::new((tile.x + u) as f32, (tile.y + v) as f32) * ATLAS_TILE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_direction_order() {
        for (face, dir) in FACES.iter().zip(Direction::ALL) {
            assert_eq!(face.direction, dir);
        }
    }

    #[test]
    fn test_corners_lie_on_face_plane() {
        for face in &FACES {
            let n = face.direction.offset();
            let axis = (0..3).find(|&a| n[a] != 0).unwrap();
            let plane = if n[axis] > 0 { 1 } else { 0 };
            for c in face.corners {
                assert_eq!(c[axis], plane, "{:?}", face.direction);
            }
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for face in &FACES {
            let p: Vec<Vec3> = (0..4).map(|i| face.corner(IVec3::ZERO, i)).collect();
            let cross = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(cross.dot(face.normal()) > 0.0, "{:?}", face.direction);
        }
    }

    #[test]
    fn test_atlas_tiles() {
        assert_eq!(atlas_tile(BlockType::Air, Direction::Up), None);
        assert_eq!(atlas_tile(BlockType::Bedrock, Direction::East), Some(UVec2::new(1, 14)));
        assert_eq!(atlas_tile(BlockType::Stone, Direction::Down), Some(UVec2::new(1, 15)));
        assert_eq!(atlas_tile(BlockType::Dirt, Direction::Up), Some(UVec2::new(2, 15)));
        assert_eq!(atlas_tile(BlockType::Grass, Direction::Up), Some(UVec2::new(8, 13)));
        assert_eq!(atlas_tile(BlockType::Grass, Direction::Down), Some(UVec2::new(2, 15)));
        for dir in Direction::LATERAL {
            assert_eq!(atlas_tile(BlockType::Grass, dir), Some(UVec2::new(3, 15)));
        }
    }

    #[test]
    fn test_tile_uv_corners() {
        let tile = UVec2::new(2, 15);
        assert_eq!(tile_uv(tile, 0), Vec2::new(2.0, 15.0) / 16.0);
        assert_eq!(tile_uv(tile, 1), Vec2::new(3.0, 15.0) / 16.0);
        assert_eq!(tile_uv(tile, 2), Vec2::new(3.0, 16.0) / 16.0);
        assert_eq!(tile_uv(tile, 3), Vec2::new(2.0, 16.0) / 16.0);
    }
}
