//! Tile variants and their shared behavior.
//!
//! [`Tile`] is a closed sum type. Each capability (acceptance, stepping,
//! state lifecycle) is an exhaustive match that forwards to the variant's
//! own type, so adding a variant is a compile error until every capability
//! handles it.
//!
//! Lifecycle of every stateful tile:
//!
//! ```text
//! Uninitialized --init_state()--> Running --close()--> Uninitialized
//! ```

mod endpoints;
mod modifiers;
mod rail;

pub use endpoints::{Goal, Outlet};
pub use modifiers::{Painter, Splitter};
pub use rail::{DoubleRail, SingleRail};

use alloc::vec::Vec;

use crate::grid::Cursor;
use crate::render::RenderEvent;
use crate::state::TrainState;
use crate::train::{Move, Train};

/// One cell of the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Tile {
    /// Empty ground. Trains crash here; rails can be drawn over it.
    #[default]
    Blank,
    /// Obstacle. Trains crash here; rails cannot be drawn over it.
    Rock,
    /// Train source.
    Outlet(Outlet),
    /// Train sink.
    Goal(Goal),
    /// Recolors trains.
    Painter(Painter),
    /// Halves trains.
    Splitter(Splitter),
    /// One rail path.
    SingleRail(SingleRail),
    /// Two rail paths.
    DoubleRail(DoubleRail),
}

impl Tile {
    /// Board character used by the level format.
    ///
    /// Rails share `' '` with [`Tile::Blank`]; their shape lives in the
    /// per-cell tile data.
    pub fn symbol(&self) -> char {
        match self {
            Tile::Blank | Tile::SingleRail(_) | Tile::DoubleRail(_) => ' ',
            Tile::Rock => 'r',
            Tile::Outlet(_) => '+',
            Tile::Goal(_) => 'o',
            Tile::Painter(_) => 'p',
            Tile::Splitter(_) => 's',
        }
    }

    /// True for tiles that hold trains during a run.
    pub fn is_stateful(&self) -> bool {
        !matches!(self, Tile::Blank | Tile::Rock)
    }

    /// True for single and double rails.
    pub fn is_rail(&self) -> bool {
        matches!(self, Tile::SingleRail(_) | Tile::DoubleRail(_))
    }

    /// Whether `train` may enter this tile.
    ///
    /// Pure: tests the side the train would come in through against the
    /// tile's entrances.
    pub fn accepts(&self, train: &Train) -> bool {
        match self {
            Tile::Blank | Tile::Rock | Tile::Outlet(_) => false,
            Tile::Goal(goal) => goal.accepts(train),
            Tile::Painter(painter) => painter.accepts(train),
            Tile::Splitter(splitter) => splitter.accepts(train),
            Tile::SingleRail(rail) => rail.accepts(train),
            Tile::DoubleRail(rail) => rail.accepts(train),
        }
    }

    /// Allocate run state.
    pub fn init_state(&mut self) {
        match self {
            Tile::Blank | Tile::Rock => {}
            Tile::Outlet(t) => t.init_state(),
            Tile::Goal(t) => t.init_state(),
            Tile::Painter(t) => t.init_state(),
            Tile::Splitter(t) => t.init_state(),
            Tile::SingleRail(t) => t.init_state(),
            Tile::DoubleRail(t) => t.init_state(),
        }
    }

    /// Discard run state.
    pub fn close(&mut self) {
        match self {
            Tile::Blank | Tile::Rock => {}
            Tile::Outlet(t) => t.close(),
            Tile::Goal(t) => t.close(),
            Tile::Painter(t) => t.close(),
            Tile::Splitter(t) => t.close(),
            Tile::SingleRail(t) => t.close(),
            Tile::DoubleRail(t) => t.close(),
        }
    }

    /// Train bookkeeping of the current run, if any.
    pub fn train_state(&self) -> Option<&TrainState> {
        match self {
            Tile::Blank | Tile::Rock => None,
            Tile::Outlet(t) => t.state(),
            Tile::Goal(t) => t.state(),
            Tile::Painter(t) => t.state(),
            Tile::Splitter(t) => t.state(),
            Tile::SingleRail(t) => t.state(),
            Tile::DoubleRail(t) => t.state(),
        }
    }

    fn train_state_mut(&mut self) -> Option<&mut TrainState> {
        match self {
            Tile::Blank | Tile::Rock => None,
            Tile::Outlet(t) => t.state_mut(),
            Tile::Goal(t) => t.state_mut(),
            Tile::Painter(t) => t.state_mut(),
            Tile::Splitter(t) => t.state_mut(),
            Tile::SingleRail(t) => t.state_mut(),
            Tile::DoubleRail(t) => t.state_mut(),
        }
    }

    /// True if the tile holds resident trains.
    pub fn has_trains(&self) -> bool {
        self.train_state().is_some_and(TrainState::has_trains)
    }

    /// Move this tile's resident trains on.
    ///
    /// Goals consume trains on arrival, so stepping one does nothing.
    pub fn step(&mut self, cursor: &mut Cursor<'_>) {
        match self {
            Tile::Blank | Tile::Rock | Tile::Goal(_) => {}
            Tile::Outlet(t) => t.step(cursor),
            Tile::Painter(t) => t.step(cursor),
            Tile::Splitter(t) => t.step(cursor),
            Tile::SingleRail(t) => t.step(cursor),
            Tile::DoubleRail(t) => t.step(cursor),
        }
    }

    /// Hand an accepted train to this tile.
    ///
    /// Goals settle the train immediately and may return a render event;
    /// every other tile queues it as pending.
    pub(crate) fn receive(&mut self, train: Train) -> Option<RenderEvent> {
        if let Tile::Goal(goal) = self {
            return goal.receive(train);
        }
        if let Some(state) = self.train_state_mut() {
            state.receive(train);
        }
        None
    }

    pub(crate) fn finalize(&mut self) {
        if let Some(state) = self.train_state_mut() {
            state.finalize();
        }
    }

    pub(crate) fn take_moves(&mut self) -> Vec<Move> {
        self.train_state_mut()
            .map(TrainState::take_deployed)
            .unwrap_or_default()
    }
}
