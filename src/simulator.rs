//! Pull-based step driver.
//!
//! [`Simulator::next`] computes one step over the grid it is handed: every
//! tile holding resident trains steps once, in row-major order, then every
//! pending train is promoted. The simulation is done once a scan finds no
//! tile holding trains.
//!
//! [`Simulator::peek`] computes future steps on copies of the grid and
//! parks each step with the grid it leaves behind. `next` drains that
//! buffer first, swapping the parked grid in, so the grid handed to the
//! simulator only ever shows consumed steps.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::config::{RenderConfig, SimConfig};
use crate::grid::Grid;
use crate::render::{RenderQueue, RenderUpdate};
use crate::train::GridStep;

#[derive(Debug)]
struct PlannedStep {
    step: GridStep,
    renders: Vec<RenderUpdate>,
    after: Option<Grid>,
}

/// What one consumed step produced.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Moves per cell index.
    pub step: GridStep,
    /// True if this step holds the first crash of the run.
    pub newly_failed: bool,
    /// Render updates of the previous step that were never replayed.
    pub flushed: Vec<RenderUpdate>,
}

/// Step iterator state for one simulation run.
#[derive(Debug)]
pub struct Simulator {
    sim: SimConfig,
    render_config: RenderConfig,
    lookahead: VecDeque<PlannedStep>,
    exhausted: bool,
    failed: bool,
    render: RenderQueue,
    steps: u32,
}

impl Simulator {
    /// Fresh simulator. The grid must already have its run state.
    pub fn new(sim: SimConfig, render_config: RenderConfig) -> Self {
        Self {
            sim,
            render_config,
            lookahead: VecDeque::new(),
            exhausted: false,
            failed: false,
            render: RenderQueue::new(),
            steps: 0,
        }
    }

    /// Consume the next step, or `None` once the simulation is done.
    ///
    /// Render updates left over from the previous step are returned in
    /// [`StepReport::flushed`] before this step's updates are queued.
    pub fn next(&mut self, grid: &mut Grid) -> Option<StepReport> {
        let planned = match self.lookahead.pop_front() {
            Some(mut planned) => {
                if let Some(after) = planned.after.take() {
                    *grid = after;
                }
                planned
            }
            None => self.compute(grid)?,
        };

        let flushed = self.render.flush();
        self.render.load(planned.renders);
        self.steps += 1;

        let newly_failed = !self.failed && planned.step.has_crash();
        if newly_failed {
            self.failed = true;
            if let Some((index, _)) = planned.step.crashes().next() {
                log::warn!("step {}: first crash at cell {}", self.steps, index);
            }
        }

        log::trace!(
            "step {}: {} tiles moved, {} moves",
            self.steps,
            planned.step.len(),
            planned.step.move_count()
        );

        Some(StepReport {
            step: planned.step,
            newly_failed,
            flushed,
        })
    }

    /// Look up to `n` steps ahead without consuming them.
    ///
    /// `n` is capped by [`SimConfig::peek_limit`]. Fewer steps come back if
    /// the simulation finishes sooner. `grid` is left untouched.
    pub fn peek(&mut self, grid: &Grid, n: usize) -> Vec<&GridStep> {
        let n = n.min(self.sim.peek_limit);
        while self.lookahead.len() < n {
            let mut ahead = match self.lookahead.back().and_then(|p| p.after.as_ref()) {
                Some(last) => last.clone(),
                None => grid.clone(),
            };
            match self.compute(&mut ahead) {
                Some(mut planned) => {
                    planned.after = Some(ahead);
                    self.lookahead.push_back(planned);
                }
                None => break,
            }
        }
        self.lookahead.iter().take(n).map(|p| &p.step).collect()
    }

    /// Report progress within the current step; returns the render updates now due.
    pub fn step_partial(&mut self, progress: f32) -> Vec<RenderUpdate> {
        self.render.advance(progress)
    }

    /// True once no step is left to consume.
    pub fn is_done(&self) -> bool {
        self.exhausted && self.lookahead.is_empty()
    }

    /// True once a consumed step contained a crash.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Number of steps consumed.
    pub fn steps_taken(&self) -> u32 {
        self.steps
    }

    fn compute(&mut self, grid: &mut Grid) -> Option<PlannedStep> {
        if self.exhausted {
            return None;
        }
        let occupied = grid.occupied();
        if occupied.is_empty() {
            self.exhausted = true;
            return None;
        }

        let mut renders = Vec::new();
        for index in occupied {
            grid.step_tile(index, &mut renders, &self.render_config);
        }
        let step = grid.collect_moves();
        grid.finalize();
        Some(PlannedStep {
            step,
            renders,
            after: None,
        })
    }
}
