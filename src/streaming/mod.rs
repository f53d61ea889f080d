//! Chunk streaming: view window tracking and the time-sliced chunk pipeline

pub mod budget;
pub mod terrain;
pub mod view_window;

pub use budget::{Deadline, Step};
pub use terrain::{EditOutcome, SurfaceEvent, Terrain, TerrainStats};
pub use view_window::{Observer, ViewWindow, ViewWindowDelta};
