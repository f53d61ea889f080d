//! Renderable chunk surfaces

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::meshing::face::QUAD_TRIANGLES;

/// Surface vertex (32 bytes, tightly packed for upload)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Chunk-local position
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture atlas coordinate
    pub uv: [f32; 2],
}

/// Triangle mesh of one chunk's visible faces.
///
/// Vertex positions are relative to `origin`, the chunk's world-space
/// minimum corner.
#[derive(Clone, Debug, Default)]
pub struct ChunkSurface {
    pub origin: Vec3,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ChunkSurface {
    /// Create an empty surface anchored at `origin`
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append one quad (four vertices, two triangles)
    pub fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uvs: [Vec2; 4]) {
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.vertices.push(Vertex {
                position: corner.to_array(),
                normal: normal.to_array(),
                uv: uv.to_array(),
            });
        }
        self.indices.extend(QUAD_TRIANGLES.iter().map(|i| base + i));
    }

    /// Number of quads
    pub fn quad_count(&self) -> usize {
        self.indices.len() / QUAD_TRIANGLES.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Approximate memory used by the buffers
    pub fn memory_usage(&self) -> usize {
        self.vertex_bytes().len() + self.index_bytes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn test_push_quad_indices() {
        let mut surface = ChunkSurface::new(Vec3::new(16.0, 0.0, 0.0));
        assert!(surface.is_empty());

        let corners = [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y];
        surface.push_quad(corners, Vec3::NEG_Z, [Vec2::ZERO; 4]);
        surface.push_quad(corners, Vec3::NEG_Z, [Vec2::ZERO; 4]);

        assert_eq!(surface.quad_count(), 2);
        assert_eq!(surface.vertices.len(), 8);
        assert_eq!(surface.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(surface.vertices[5].position, [1.0, 0.0, 0.0]);
        assert_eq!(surface.vertices[5].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_byte_views() {
        let mut surface = ChunkSurface::new(Vec3::ZERO);
        surface.push_quad([Vec3::ZERO; 4], Vec3::Y, [Vec2::ONE; 4]);
        assert_eq!(surface.vertex_bytes().len(), 4 * 32);
        assert_eq!(surface.index_bytes().len(), 6 * 4);
        assert_eq!(surface.memory_usage(), 4 * 32 + 6 * 4);
    }
}
