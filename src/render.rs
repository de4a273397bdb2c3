//! Render updates queued by tiles and replayed by step progress.
//!
//! Tiles sometimes need a visual side effect partway through a step: a goal
//! loses one of its target markers when a train arrives, a double rail
//! swaps which path is drawn on top. Tiles push a [`RenderUpdate`] stamped
//! with an in-step progress value; the [`RenderQueue`] hands them back in
//! progress order as the renderer reports how far into the step it is.
//!
//! The core never draws anything itself.
//!
//! ```rust
//! use rs_trainyard::render::{RenderEvent, RenderQueue, RenderUpdate};
//! use rs_trainyard::Color;
//!
//! let mut queue = RenderQueue::new();
//! queue.load(vec![
//!     RenderUpdate::new(3, 0.75, RenderEvent::PathsSwapped { top_index: 1 }),
//!     RenderUpdate::new(5, 0.5, RenderEvent::GoalTargetConsumed { color: Color::Red }),
//! ]);
//!
//! assert!(queue.advance(0.25).is_empty());
//! assert_eq!(queue.advance(0.6)[0].tile, 5);
//! assert_eq!(queue.flush().len(), 1);
//! ```

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::color::Color;
use crate::config::RenderConfig;

/// Visual side effect requested by a tile.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum RenderEvent {
    /// A goal accepted a train and one target marker should disappear.
    GoalTargetConsumed {
        /// Color of the consumed target.
        color: Color,
    },
    /// A double rail changed which path is drawn on top.
    PathsSwapped {
        /// Index of the path now on top.
        top_index: u8,
    },
    /// A train crashed on (or leaving) this tile.
    Crash,
}

impl RenderEvent {
    /// Progress within the step at which this event should be shown.
    pub fn progress(&self, config: &RenderConfig) -> f32 {
        match self {
            RenderEvent::GoalTargetConsumed { .. } => config.goal_marker_progress,
            RenderEvent::PathsSwapped { .. } => config.swap_progress,
            RenderEvent::Crash => 1.0,
        }
    }
}

/// A render event for one tile, stamped with its in-step progress.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderUpdate {
    /// Cell index of the tile the update belongs to.
    pub tile: usize,
    /// Progress in `[0, 1]` at which to apply it.
    pub progress: f32,
    /// What to do.
    pub event: RenderEvent,
}

impl RenderUpdate {
    /// Creates an update; progress is clamped into `[0, 1]`.
    pub fn new(tile: usize, progress: f32, event: RenderEvent) -> Self {
        Self {
            tile,
            progress: progress.clamp(0.0, 1.0),
            event,
        }
    }
}

/// Progress-ordered queue of the current step's render updates.
#[derive(Debug, Default)]
pub struct RenderQueue {
    pending: VecDeque<RenderUpdate>,
    progress: f32,
}

impl RenderQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue with a new step's updates.
    ///
    /// Updates are sorted by progress; equal progress keeps insertion order.
    /// Call [`flush`](Self::flush) first if leftovers must not be lost.
    pub fn load(&mut self, mut updates: Vec<RenderUpdate>) {
        updates.sort_by(|a, b| a.progress.total_cmp(&b.progress));
        self.pending = updates.into();
        self.progress = 0.0;
    }

    /// Release every update due at or before `progress`.
    ///
    /// Progress never moves backwards; a smaller value than last time
    /// releases nothing.
    pub fn advance(&mut self, progress: f32) -> Vec<RenderUpdate> {
        self.progress = self.progress.max(progress.clamp(0.0, 1.0));
        let mut due = Vec::new();
        while let Some(next) = self.pending.front() {
            if next.progress > self.progress {
                break;
            }
            if let Some(update) = self.pending.pop_front() {
                due.push(update);
            }
        }
        due
    }

    /// Release everything still queued.
    pub fn flush(&mut self) -> Vec<RenderUpdate> {
        self.progress = 1.0;
        self.pending.drain(..).collect()
    }

    /// Furthest progress reported so far for the current step.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Number of updates not yet released.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
