//! Observer seam between the simulation core and its embedding application.
//!
//! The core never renders, plays sounds or shows dialogs. It reports what
//! happened through [`SimObserver`] and leaves the reaction to the
//! implementor. Every method has a no-op default, so an observer only
//! overrides what it cares about.
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::traits::SimObserver;
//! use rs_trainyard::GridStep;
//!
//! #[derive(Default)]
//! struct StepCounter(usize);
//!
//! impl SimObserver for StepCounter {
//!     fn on_step(&mut self, _step: &GridStep) {
//!         self.0 += 1;
//!     }
//! }
//! ```

use alloc::boxed::Box;

use crate::render::RenderUpdate;
use crate::tile_grid::{EditMode, SimOutcome};
use crate::train::GridStep;

/// Receives simulation and editing notifications from a
/// [`TileGrid`](crate::TileGrid).
pub trait SimObserver {
    /// A step was consumed.
    fn on_step(&mut self, _step: &GridStep) {}

    /// The renderer reported progress within the current step.
    fn on_progress(&mut self, _progress: f32) {}

    /// A render update came due.
    fn on_render_update(&mut self, _update: &RenderUpdate) {}

    /// The first crash of the run. Fires at most once per run.
    fn on_fail(&mut self) {}

    /// The run ended. Fires at most once per run.
    fn on_finish(&mut self, _outcome: SimOutcome) {}

    /// Edit mode `mode` became active.
    fn on_edit_mode_enter(&mut self, _mode: EditMode) {}

    /// Edit mode `mode` was left.
    fn on_edit_mode_exit(&mut self, _mode: EditMode) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullObserver;

impl SimObserver for NullObserver {}

impl<O: SimObserver + ?Sized> SimObserver for Box<O> {
    fn on_step(&mut self, step: &GridStep) {
        (**self).on_step(step)
    }

    fn on_progress(&mut self, progress: f32) {
        (**self).on_progress(progress)
    }

    fn on_render_update(&mut self, update: &RenderUpdate) {
        (**self).on_render_update(update)
    }

    fn on_fail(&mut self) {
        (**self).on_fail()
    }

    fn on_finish(&mut self, outcome: SimOutcome) {
        (**self).on_finish(outcome)
    }

    fn on_edit_mode_enter(&mut self, mode: EditMode) {
        (**self).on_edit_mode_enter(mode)
    }

    fn on_edit_mode_exit(&mut self, mode: EditMode) {
        (**self).on_edit_mode_exit(mode)
    }
}
