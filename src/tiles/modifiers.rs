//! Tiles that change a train's color: painters recolor, splitters halve.

use alloc::format;

use crate::color::Color;
use crate::direction::{Dir, DirFlags};
use crate::error::{Error, Result};
use crate::grid::Cursor;
use crate::state::{one, pair, Images, TrainState};
use crate::train::Train;

/// Repaints every train passing between its two active sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Painter {
    color: Color,
    actives: DirFlags,
    state: Option<TrainState>,
}

impl Painter {
    /// Painter applying `color` on a path through exactly two sides.
    pub fn new(color: Color, actives: DirFlags) -> Result<Self> {
        if actives.len() != 2 {
            return Err(Error::malformed(format!(
                "painter needs exactly 2 active sides, got {}",
                actives.len()
            )));
        }
        Ok(Self {
            color,
            actives,
            state: None,
        })
    }

    /// Paint color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// The two active sides.
    pub fn actives(&self) -> DirFlags {
        self.actives
    }

    /// Where `train` ends up after passing through, if it entered on an active side.
    pub fn repaint(&self, train: Train) -> Option<Train> {
        self.actives
            .dir_excluding(train.entry())
            .map(|exit| Train::new(self.color, exit))
    }

    pub(crate) fn accepts(&self, train: &Train) -> bool {
        self.actives.contains(train.entry())
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut()
    }

    pub(crate) fn init_state(&mut self) {
        self.state = Some(TrainState::new());
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) {
        let (color, actives) = (self.color, self.actives);
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.deploy_all(cursor, |train| {
            actives
                .dir_excluding(train.entry())
                .map(|exit| one(Train::new(color, exit)))
                .unwrap_or_default()
        });
    }
}

/// Splits a train entering its active side into two trains leaving at
/// right angles, one on each side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Splitter {
    active: Dir,
    state: Option<TrainState>,
}

impl Splitter {
    /// Splitter whose entrance is `active`.
    pub fn new(active: Dir) -> Self {
        Self {
            active,
            state: None,
        }
    }

    /// Splitter from a one-direction mask, as stored in level files.
    pub fn from_flags(actives: DirFlags) -> Result<Self> {
        match actives.dirs().as_slice() {
            [active] => Ok(Self::new(*active)),
            other => Err(Error::malformed(format!(
                "splitter needs exactly 1 active side, got {}",
                other.len()
            ))),
        }
    }

    /// The entrance side.
    pub fn active(&self) -> Dir {
        self.active
    }

    /// Entrance as a direction mask.
    pub fn actives(&self) -> DirFlags {
        DirFlags::from_dir(self.active)
    }

    /// The two halves of `train`.
    ///
    /// The first half of [`Color::split`] heads a quarter turn
    /// counterclockwise of the entrance, the second a quarter turn
    /// clockwise. Trains that did not come in through the entrance produce
    /// nothing.
    pub fn split(&self, train: Train) -> Images {
        split_through(self.active, train)
    }

    pub(crate) fn accepts(&self, train: &Train) -> bool {
        train.entry() == self.active
    }

    pub(crate) fn state(&self) -> Option<&TrainState> {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> Option<&mut TrainState> {
        self.state.as_mut()
    }

    pub(crate) fn init_state(&mut self) {
        self.state = Some(TrainState::new());
    }

    pub(crate) fn close(&mut self) {
        self.state = None;
    }

    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) {
        let active = self.active;
        if let Some(state) = self.state.as_mut() {
            state.deploy_all(cursor, |train| split_through(active, train));
        }
    }
}

fn split_through(active: Dir, train: Train) -> Images {
    if train.entry() != active {
        return Images::new();
    }
    let (first, second) = train.color.split();
    pair(
        Train::new(first, active.rotate(1)),
        Train::new(second, active.rotate(-1)),
    )
}
