//! Observer view window: which chunks should be resident
//!
//! The window is a filled circle of chunk offsets around the observer's
//! chunk, sorted nearest first so that loading order follows proximity.

use glam::{IVec2, Vec3};

use crate::voxel::chunk::ChunkCoord;

/// Distance-sorted set of chunk offsets forming a filled circle
#[derive(Clone, Debug)]
pub struct ViewWindow {
    radius: i32,
    offsets: Vec<IVec2>,
}

impl ViewWindow {
    /// Build the pattern for a radius in chunks
    pub fn new(radius: i32) -> Self {
        let radius = radius.max(0);
        let mut offsets = Vec::new();
        for dx in -radius..=radius {
            let extent = z_extent(radius, dx);
            for dz in -extent..=extent {
                offsets.push(IVec2::new(dx, dz));
            }
        }
        // Stable: equal distances keep (dx, dz) order
        offsets.sort_by_key(|o| o.length_squared());
        Self { radius, offsets }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Offsets in chunk units, nearest first
    pub fn offsets(&self) -> &[IVec2] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Whether a chunk offset lies inside the window
    pub fn contains(&self, offset: IVec2) -> bool {
        offset.x.abs() <= self.radius && offset.y.abs() <= z_extent(self.radius, offset.x)
    }

    /// Chunk coordinates of the window around `center`, nearest first
    pub fn coords_around(&self, center: ChunkCoord) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.offsets.iter().map(move |o| center.offset_chunks(o.x, o.y))
    }

    /// Whether `coord` is inside the window centered on `center`
    pub fn contains_coord(&self, center: ChunkCoord, coord: ChunkCoord) -> bool {
        self.contains(chunk_offset(center, coord))
    }
}

/// Half-length of the window's row at `dx`
fn z_extent(radius: i32, dx: i32) -> i32 {
    let r2 = (radius * radius - dx * dx).max(0);
    (r2 as f64).sqrt().ceil() as i32
}

/// Offset from one chunk to another, in chunk units
fn chunk_offset(from: ChunkCoord, to: ChunkCoord) -> IVec2 {
    let w = crate::voxel::chunk::CHUNK_WIDTH;
    IVec2::new((to.x - from.x) / w, (to.z - from.z) / w)
}

/// Chunks that entered and left the window since the last observation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewWindowDelta {
    /// Nearest first
    pub entering: Vec<ChunkCoord>,
    pub leaving: Vec<ChunkCoord>,
}

impl ViewWindowDelta {
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.leaving.is_empty()
    }
}

/// Tracks the observer's chunk and reports window changes as it moves
#[derive(Clone, Debug)]
pub struct Observer {
    window: ViewWindow,
    center: Option<ChunkCoord>,
}

impl Observer {
    /// Observer with no position yet; the first delta contains the whole
    /// window as entering.
    pub fn new(render_distance: i32) -> Self {
        Self {
            window: ViewWindow::new(render_distance),
            center: None,
        }
    }

    /// Observer already centered at `position` (terrain booted around it)
    pub fn at(render_distance: i32, position: Vec3) -> Self {
        Self {
            window: ViewWindow::new(render_distance),
            center: Some(ChunkCoord::from_world(position.x, position.z)),
        }
    }

    pub fn window(&self) -> &ViewWindow {
        &self.window
    }

    /// Chunk the observer was last seen in
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Move the observer and return which chunks entered and left the
    /// window. Empty unless the observer changed chunks.
    pub fn compute_delta(&mut self, position: Vec3) -> ViewWindowDelta {
        let next = ChunkCoord::from_world(position.x, position.z);
        if self.center == Some(next) {
            return ViewWindowDelta::default();
        }

        let window = &self.window;
        let delta = match self.center {
            None => ViewWindowDelta {
                entering: window.coords_around(next).collect(),
                leaving: Vec::new(),
            },
            Some(prev) => ViewWindowDelta {
                entering: window
                    .coords_around(next)
                    .filter(|c| !window.contains_coord(prev, *c))
                    .collect(),
                leaving: window
                    .coords_around(prev)
                    .filter(|c| !window.contains_coord(next, *c))
                    .collect(),
            },
        };

        log::trace!(
            "Observer moved to chunk {next}: {} entering, {} leaving",
            delta.entering.len(),
            delta.leaving.len()
        );
        self.center = Some(next);
        delta
    }

    /// Whether a chunk is inside the window around the observer's chunk
    pub fn is_chunk_in_view_window(&self, coord: ChunkCoord) -> bool {
        self.center
            .is_some_and(|center| self.window.contains_coord(center, coord))
    }
}
