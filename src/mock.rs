//! Test doubles for the observer seam.
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`RecordingObserver`] | [`SimObserver`] | Records every notification |
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::mock::{ModeEvent, RecordingObserver};
//! use rs_trainyard::{EditMode, Grid, TileGrid};
//!
//! let mut tg = TileGrid::new(Grid::new(2, 2), RecordingObserver::new());
//! tg.set_edit_mode(EditMode::Draw);
//!
//! assert_eq!(
//!     tg.observer().mode_events,
//!     vec![ModeEvent::Exit(EditMode::Off), ModeEvent::Enter(EditMode::Draw)]
//! );
//! ```
//!
//! [`SimObserver`]: crate::traits::SimObserver

use alloc::vec::Vec;

use crate::render::RenderUpdate;
use crate::tile_grid::{EditMode, SimOutcome};
use crate::traits::SimObserver;
use crate::train::GridStep;

/// An edit-mode notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
    /// `on_edit_mode_enter`
    Enter(EditMode),
    /// `on_edit_mode_exit`
    Exit(EditMode),
}

/// Observer that keeps everything it is told.
///
/// Inspect the public fields after driving a [`TileGrid`](crate::TileGrid).
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    /// Steps in the order they were consumed.
    pub steps: Vec<GridStep>,
    /// Every progress value reported.
    pub progress: Vec<f32>,
    /// Render updates in the order they came due.
    pub render_updates: Vec<RenderUpdate>,
    /// Number of `on_fail` calls.
    pub fail_count: usize,
    /// Outcomes passed to `on_finish`.
    pub outcomes: Vec<SimOutcome>,
    /// Edit-mode transitions.
    pub mode_events: Vec<ModeEvent>,
}

impl RecordingObserver {
    /// Creates an observer with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total number of moves across all recorded steps.
    pub fn move_count(&self) -> usize {
        self.steps.iter().map(GridStep::move_count).sum()
    }
}

impl SimObserver for RecordingObserver {
    fn on_step(&mut self, step: &GridStep) {
        self.steps.push(step.clone());
    }

    fn on_progress(&mut self, progress: f32) {
        self.progress.push(progress);
    }

    fn on_render_update(&mut self, update: &RenderUpdate) {
        self.render_updates.push(*update);
    }

    fn on_fail(&mut self) {
        self.fail_count += 1;
    }

    fn on_finish(&mut self, outcome: SimOutcome) {
        self.outcomes.push(outcome);
    }

    fn on_edit_mode_enter(&mut self, mode: EditMode) {
        self.mode_events.push(ModeEvent::Enter(mode));
    }

    fn on_edit_mode_exit(&mut self, mode: EditMode) {
        self.mode_events.push(ModeEvent::Exit(mode));
    }
}
