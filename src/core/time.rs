//! Frame timing utilities

use std::time::{Duration, Instant};

/// Frame interval assumed before any frame has been recorded (60 fps)
pub const INITIAL_FRAME_SECS: f32 = 1.0 / 60.0;

/// Default clamp on a single frame delta (a "minimum frame rate" of 30 fps)
pub const DEFAULT_MAX_FRAME_SECS: f32 = 0.033;

/// Tracks frame timing and derives the generation time slice.
///
/// The average is a cheap exponential blend, `avg = (avg + dt) / 2`, so a
/// handful of slow frames quickly shrink the slice handed to the chunk
/// pipeline and fast frames let it grow back.
#[derive(Clone, Debug)]
pub struct FrameTimer {
    last_frame: Instant,
    delta: f32,
    average: f32,
    max_delta: f32,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a new frame timer clamping deltas to `max_delta` seconds
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta: 0.0,
            average: INITIAL_FRAME_SECS,
            max_delta,
            frame_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous tick and record it.
    /// Returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt)
    }

    /// Record an externally measured frame delta. Returns the clamped delta.
    pub fn record(&mut self, dt: f32) -> f32 {
        // NaN would poison the running average for good
        let dt = if dt.is_finite() { dt.clamp(0.0, self.max_delta) } else { 0.0 };
        self.delta = dt;
        self.average = (self.average + dt) / 2.0;
        self.frame_count += 1;
        dt
    }

    /// Clamped delta of the most recent frame, in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    /// Running average frame interval, in seconds
    pub fn average_secs(&self) -> f32 {
        self.average
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Time slice for one generation task.
    ///
    /// `ratio` is the share of an averaged frame the whole pipeline may use;
    /// the block task and the mesh task each get half of it.
    pub fn task_slice(&self, ratio: f32) -> Duration {
        Duration::try_from_secs_f32(self.average * ratio * 0.5).unwrap_or(Duration::ZERO)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_SECS)
    }
}
