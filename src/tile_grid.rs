//! The grid owner that ties simulation, editing and notification together.
//!
//! This module provides [`TileGrid`], the central component an application
//! talks to.
//!
//! # Overview
//!
//! The tile grid:
//! - Owns the [`Grid`] and, during a run, its [`Simulator`]
//! - Forwards steps, render updates and the one-shot fail signal to a
//!   [`SimObserver`]
//! - Edits rails between runs, with an undo stack
//! - Dispatches edit-mode enter/exit notifications
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::{
//!     Color, Dir, DirFlags, Goal, Grid, Outlet, SimOutcome, Tile, TileGrid,
//!     traits::NullObserver,
//! };
//!
//! let mut grid = Grid::new(3, 1);
//! grid.set(0, 0, Tile::Outlet(Outlet::new(Dir::Right, [Color::Red]))).unwrap();
//! let goal = Goal::new([Color::Red], DirFlags::from_dir(Dir::Left)).unwrap();
//! grid.set(2, 0, Tile::Goal(goal)).unwrap();
//!
//! let mut tg = TileGrid::new(grid, NullObserver);
//! tg.draw_rail(1, 0, Dir::Left, Dir::Right).unwrap();
//!
//! assert_eq!(tg.run(), SimOutcome::Solved);
//! ```

use alloc::vec::Vec;

use crate::config::Config;
use crate::direction::{Dir, DirFlags};
use crate::error::{Error, Result};
use crate::grid::{Grid, Position};
use crate::render::RenderUpdate;
use crate::simulator::Simulator;
use crate::tiles::{DoubleRail, SingleRail, Tile};
use crate::traits::{NullObserver, SimObserver};
use crate::train::GridStep;

/// What a pointer gesture on the grid currently does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EditMode {
    /// Not editing.
    #[default]
    Off,
    /// Drawing rails.
    Draw,
    /// Erasing rails.
    Erase,
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SimOutcome {
    /// Every train arrived, every goal is satisfied, nothing crashed.
    Solved,
    /// At least one train crashed.
    Failed,
    /// Nothing crashed but some goal is still waiting.
    Incomplete,
    /// The step ceiling was reached first.
    StepLimit,
}

#[derive(Clone, Debug)]
struct EditAction {
    index: usize,
    previous: Tile,
}

/// Grid owner driving one simulation run at a time.
///
/// # Type Parameter
///
/// - `O`: the notification sink ([`SimObserver`] trait)
pub struct TileGrid<O: SimObserver = NullObserver> {
    grid: Grid,
    observer: O,
    config: Config,
    simulator: Option<Simulator>,
    edit_mode: EditMode,
    actions: Vec<EditAction>,
    failed: bool,
    finished: bool,
}

impl<O: SimObserver> TileGrid<O> {
    /// Take ownership of `grid`, reporting to `observer`.
    pub fn new(grid: Grid, observer: O) -> Self {
        Self {
            grid,
            observer,
            config: Config::default(),
            simulator: None,
            edit_mode: EditMode::Off,
            actions: Vec::new(),
            failed: false,
            finished: false,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The underlying grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tile at `(x, y)`; `None` only outside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.grid.tile(x, y)
    }

    /// Stateful tiles with their positions.
    pub fn stateful_tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.grid.stateful_tiles()
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Begin a fresh run, discarding any current one.
    ///
    /// Leaves edit mode.
    pub fn start_sim(&mut self) {
        self.close_sim();
        self.set_edit_mode(EditMode::Off);
        self.grid.init_state();
        self.simulator = Some(Simulator::new(self.config.sim, self.config.render));
        self.failed = false;
        self.finished = false;
        log::debug!(
            "simulation started on {}x{} grid",
            self.grid.width(),
            self.grid.height()
        );
    }

    /// End the current run and discard all run state.
    pub fn close_sim(&mut self) {
        if let Some(sim) = self.simulator.take() {
            self.grid.close();
            log::debug!("simulation closed after {} steps", sim.steps_taken());
        }
    }

    /// True while a run is active.
    pub fn is_running(&self) -> bool {
        self.simulator.is_some()
    }

    /// Consume the next step.
    ///
    /// Returns `None` when no run is active or the run is done; the first
    /// `None` of a run also reports its outcome to the observer.
    pub fn step(&mut self) -> Option<GridStep> {
        let sim = self.simulator.as_mut()?;
        let Some(report) = sim.next(&mut self.grid) else {
            let outcome = self.settled_outcome();
            self.finish(outcome);
            return None;
        };

        for update in &report.flushed {
            self.observer.on_render_update(update);
        }
        self.observer.on_step(&report.step);
        if report.newly_failed {
            self.failed = true;
            self.observer.on_fail();
        }
        Some(report.step)
    }

    /// Report progress in `[0, 1]` within the current step.
    ///
    /// Returns the render updates that came due, which are also forwarded
    /// to the observer.
    pub fn step_partial(&mut self, progress: f32) -> Vec<RenderUpdate> {
        let Some(sim) = self.simulator.as_mut() else {
            return Vec::new();
        };
        let due = sim.step_partial(progress);
        self.observer.on_progress(progress);
        for update in &due {
            self.observer.on_render_update(update);
        }
        due
    }

    /// Up to `n` future steps, computed but not consumed.
    pub fn peek(&mut self, n: usize) -> Vec<&GridStep> {
        match self.simulator.as_mut() {
            Some(sim) => sim.peek(&self.grid, n),
            None => Vec::new(),
        }
    }

    /// True once a consumed step of the current run crashed a train.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// True if a run is active and every goal has received all its targets.
    pub fn is_solved(&self) -> bool {
        self.is_running()
            && self.grid.tiles().iter().all(|tile| match tile {
                Tile::Goal(goal) => goal.is_satisfied(),
                _ => true,
            })
    }

    /// Step until the run ends, starting one if needed.
    ///
    /// Stops early at the first crash when
    /// [`SimConfig::halt_on_crash`](crate::config::SimConfig::halt_on_crash)
    /// is set, and after `max_steps` steps in any case.
    pub fn run(&mut self) -> SimOutcome {
        if !self.is_running() {
            self.start_sim();
        }
        let mut taken = 0u32;
        loop {
            if self.failed && self.config.sim.halt_on_crash {
                return self.finish(SimOutcome::Failed);
            }
            if taken >= self.config.sim.max_steps {
                return self.finish(SimOutcome::StepLimit);
            }
            if self.step().is_none() {
                return self.settled_outcome();
            }
            taken += 1;
        }
    }

    fn settled_outcome(&self) -> SimOutcome {
        if self.failed {
            SimOutcome::Failed
        } else if self.is_solved() {
            SimOutcome::Solved
        } else {
            SimOutcome::Incomplete
        }
    }

    /// Report `outcome` once per run. A step limit leaves the run open, so
    /// it is reported without latching.
    fn finish(&mut self, outcome: SimOutcome) -> SimOutcome {
        if !self.finished {
            self.finished = outcome != SimOutcome::StepLimit;
            log::info!("simulation finished: {outcome:?}");
            self.observer.on_finish(outcome);
        }
        outcome
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Current edit mode.
    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    /// Switch edit mode, notifying the observer of the exit and the entry.
    ///
    /// Setting the current mode again does nothing.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        if mode == self.edit_mode {
            return;
        }
        let old = core::mem::replace(&mut self.edit_mode, mode);
        log::debug!("edit mode {old:?} -> {mode:?}");
        self.observer.on_edit_mode_exit(old);
        self.observer.on_edit_mode_enter(mode);
    }

    /// Draw a rail path between sides `a` and `b` of cell `(x, y)`.
    ///
    /// A blank cell gets a single rail. A single rail with another path
    /// becomes a double rail; a double rail replaces its older path.
    /// Returns `Ok(false)` if the path is already there.
    pub fn draw_rail(&mut self, x: usize, y: usize, a: Dir, b: Dir) -> Result<bool> {
        self.ensure_editable()?;
        let rail = SingleRail::new(a, b)?;
        let path = rail.ends();
        let current = self.grid.tile(x, y).ok_or(Error::OutOfBounds { x, y })?;

        let next = match current {
            Tile::Blank => Tile::SingleRail(rail),
            Tile::SingleRail(old) if old.ends() == path => return Ok(false),
            Tile::SingleRail(old) => Tile::DoubleRail(DoubleRail::new(old.ends(), path)?),
            Tile::DoubleRail(old) if old.paths().contains(&path) => return Ok(false),
            Tile::DoubleRail(old) => {
                let [_, newer] = old.paths();
                Tile::DoubleRail(DoubleRail::new(newer, path)?)
            }
            _ => return Err(Error::NotDrawable { x, y }),
        };
        self.apply_edit(x, y, next)?;
        Ok(true)
    }

    /// Remove the rails from cell `(x, y)`.
    ///
    /// Returns `Ok(false)` for a blank cell.
    pub fn erase(&mut self, x: usize, y: usize) -> Result<bool> {
        self.ensure_editable()?;
        let tile = self.grid.tile(x, y).ok_or(Error::OutOfBounds { x, y })?;
        if matches!(tile, Tile::Blank) {
            return Ok(false);
        }
        if !tile.is_rail() {
            return Err(Error::NotDrawable { x, y });
        }
        self.apply_edit(x, y, Tile::Blank)?;
        Ok(true)
    }

    /// Revert the most recent edit. Returns false if there is none or a
    /// run is active.
    pub fn undo(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        let Some(action) = self.actions.pop() else {
            return false;
        };
        let Some(pos) = self.grid.position(action.index) else {
            return false;
        };
        self.grid.set(pos.x, pos.y, action.previous).is_ok()
    }

    /// True if an edit can be undone.
    pub fn can_undo(&self) -> bool {
        !self.is_running() && !self.actions.is_empty()
    }

    /// Rail directions drawn at `(x, y)`, as a union of every path.
    pub fn rail_ends(&self, x: usize, y: usize) -> DirFlags {
        match self.grid.tile(x, y) {
            Some(Tile::SingleRail(rail)) => rail.ends(),
            Some(Tile::DoubleRail(rail)) => {
                let [first, second] = rail.paths();
                first | second
            }
            _ => DirFlags::EMPTY,
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_running() {
            return Err(Error::SimulationRunning);
        }
        Ok(())
    }

    fn apply_edit(&mut self, x: usize, y: usize, tile: Tile) -> Result<()> {
        let index = self.grid.index(x, y).ok_or(Error::OutOfBounds { x, y })?;
        let previous = self.grid.set(x, y, tile)?;
        self.actions.push(EditAction { index, previous });
        Ok(())
    }
}

impl<O: SimObserver> core::fmt::Debug for TileGrid<O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileGrid")
            .field("width", &self.grid.width())
            .field("height", &self.grid.height())
            .field("running", &self.is_running())
            .field("edit_mode", &self.edit_mode)
            .field("undo_depth", &self.actions.len())
            .finish()
    }
}
