//! Block kinds and axis directions

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Kind of block stored in a voxel cell
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Air = 0,
    Grass = 1,
    Dirt = 2,
    Stone = 3,
    Bedrock = 4,
}

impl BlockType {
    /// All block kinds, in discriminant order
    pub const ALL: [BlockType; 5] = [
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Bedrock,
    ];

    /// Whether the block occupies its cell (anything but air)
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }
}

/// One of the six axis-aligned directions.
///
/// Lateral directions name chunk neighbors: East is +X, West is -X,
/// South is +Z and North is -Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    Up,
    Down,
    South,
    North,
}

impl Direction {
    /// All six directions, in face-table order
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
        Direction::South,
        Direction::North,
    ];

    /// The four horizontal directions that link neighboring chunks
    pub const LATERAL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Unit offset of this direction
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::East => IVec3::X,
            Direction::West => IVec3::NEG_X,
            Direction::Up => IVec3::Y,
            Direction::Down => IVec3::NEG_Y,
            Direction::South => IVec3::Z,
            Direction::North => IVec3::NEG_Z,
        }
    }

    /// The direction pointing the other way
    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::South => Direction::North,
            Direction::North => Direction::South,
        }
    }

    /// Slot of a lateral direction in a four-element neighbor array
    pub fn lateral_index(self) -> Option<usize> {
        match self {
            Direction::East => Some(0),
            Direction::West => Some(1),
            Direction::South => Some(2),
            Direction::North => Some(3),
            Direction::Up | Direction::Down => None,
        }
    }

    /// Lateral direction of a horizontal offset; X wins over Z
    pub fn from_xz(x: i32, z: i32) -> Option<Direction> {
        if x > 0 {
            Some(Direction::East)
        } else if x < 0 {
            Some(Direction::West)
        } else if z > 0 {
            Some(Direction::South)
        } else if z < 0 {
            Some(Direction::North)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_air_is_not_solid() {
        for block in BlockType::ALL {
            assert_eq!(block.is_solid(), block != BlockType::Air);
        }
        assert_eq!(BlockType::default(), BlockType::Air);
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec3::ZERO);
        }
    }

    #[test]
    fn test_lateral_indices_are_distinct() {
        let mut seen = [false; 4];
        for dir in Direction::LATERAL {
            let i = dir.lateral_index().unwrap();
            assert!(!seen[i]);
            seen[i] = true;
            assert_eq!(dir.offset().y, 0);
        }
        assert!(Direction::Up.lateral_index().is_none());
        assert!(Direction::Down.lateral_index().is_none());
    }

    #[test]
    fn test_from_xz() {
        assert_eq!(Direction::from_xz(1, 0), Some(Direction::East));
        assert_eq!(Direction::from_xz(-1, 0), Some(Direction::West));
        assert_eq!(Direction::from_xz(0, 1), Some(Direction::South));
        assert_eq!(Direction::from_xz(0, -1), Some(Direction::North));
        assert_eq!(Direction::from_xz(0, 0), None);
        for dir in Direction::LATERAL {
            let o = dir.offset();
            assert_eq!(Direction::from_xz(o.x, o.z), Some(dir));
        }
    }
}
