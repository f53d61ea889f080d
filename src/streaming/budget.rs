//! Time budgets for resumable pipeline tasks
//!
//! Long tasks (block fill, meshing) are split into steps. Each step gets a
//! [`Deadline`] and checks it only at its own suspension points, so a step
//! may overrun its deadline by at most one unit of work (one column, one
//! voxel).

use std::time::{Duration, Instant};

/// Point in time after which a task step should suspend
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    end: Option<Instant>,
}

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            end: Some(Instant::now() + budget),
        }
    }

    /// A deadline that never expires (synchronous, run-to-completion work)
    pub fn unbounded() -> Self {
        Self { end: None }
    }

    /// Check if the deadline has passed
    pub fn expired(&self) -> bool {
        self.end.is_some_and(|end| Instant::now() >= end)
    }

    /// Time left before the deadline (`Duration::MAX` when unbounded)
    pub fn remaining(&self) -> Duration {
        match self.end {
            Some(end) => end.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        }
    }
}

/// Outcome of one step of a resumable task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Budget ran out; call again to resume where the task left off
    Suspended,
    /// The task is complete
    Finished,
}

impl Step {
    /// Check if the task is complete
    pub fn is_finished(self) -> bool {
        self == Step::Finished
    }
}
