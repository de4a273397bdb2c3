//! Trains and the move records produced by each simulation step.
//!
//! A [`GridStep`] is the only thing a renderer needs to animate a step: for
//! every tile that did something it lists the [`Move`]s that tile made.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::color::Color;
use crate::direction::Dir;

/// A single colored token moving across the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Train {
    /// Current color.
    pub color: Color,
    /// Direction of travel.
    pub dir: Dir,
}

impl Train {
    /// Creates a train.
    #[inline]
    pub const fn new(color: Color, dir: Dir) -> Self {
        Self { color, dir }
    }

    /// Side of the tile this train enters through.
    #[inline]
    pub const fn entry(&self) -> Dir {
        self.dir.flip()
    }

    /// Same train, different color.
    #[inline]
    pub const fn painted(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Same color, new heading.
    #[inline]
    pub const fn heading(self, dir: Dir) -> Self {
        Self { dir, ..self }
    }
}

/// What happened to one train (or a group of trains) during a step.
///
/// `preimage` is the train as it sat on the tile at the start of the step,
/// `image` is what left the tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Move {
    /// One train in, one train out.
    Pass {
        /// Train before the step.
        preimage: Train,
        /// Train after the step.
        image: Train,
    },
    /// One train in, several out.
    Split {
        /// Train before the step.
        preimage: Train,
        /// Trains after the step.
        image: Vec<Train>,
    },
    /// Several trains in, one out.
    Merge {
        /// Trains before the step.
        preimage: Vec<Train>,
        /// Train after the step.
        image: Train,
    },
    /// The train is gone.
    Destroy {
        /// Train that disappeared.
        preimage: Train,
        /// True when it crashed (bad entry, unwanted color), false when it
        /// was delivered or quietly removed.
        crashed: bool,
    },
}

impl Move {
    /// True for `Destroy { crashed: true }`.
    #[inline]
    pub fn is_crash(&self) -> bool {
        matches!(self, Move::Destroy { crashed: true, .. })
    }

    /// Trains that left the tile under this move.
    pub fn images(&self) -> &[Train] {
        match self {
            Move::Pass { image, .. } | Move::Merge { image, .. } => core::slice::from_ref(image),
            Move::Split { image, .. } => image,
            Move::Destroy { .. } => &[],
        }
    }
}

/// Moves produced by every tile during one step, keyed by cell index.
///
/// Cells with no moves are absent. Iteration follows cell index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStep {
    moves: BTreeMap<usize, Vec<Move>>,
}

impl GridStep {
    /// Creates an empty step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append moves for a cell. Empty lists are ignored.
    pub fn extend(&mut self, index: usize, moves: Vec<Move>) {
        if moves.is_empty() {
            return;
        }
        self.moves.entry(index).or_default().extend(moves);
    }

    /// Moves made by the tile at `index`.
    pub fn moves_at(&self, index: usize) -> &[Move] {
        self.moves.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(cell index, moves)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Move])> {
        self.moves.iter().map(|(i, m)| (*i, m.as_slice()))
    }

    /// Number of cells that recorded at least one move.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True if nothing moved.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Total number of moves across all cells.
    pub fn move_count(&self) -> usize {
        self.moves.values().map(Vec::len).sum()
    }

    /// True if any move in this step is a crash.
    pub fn has_crash(&self) -> bool {
        self.crashes().next().is_some()
    }

    /// Every crash, with the cell that recorded it.
    pub fn crashes(&self) -> impl Iterator<Item = (usize, &Move)> {
        self.moves
            .iter()
            .flat_map(|(i, ms)| ms.iter().map(move |m| (*i, m)))
            .filter(|(_, m)| m.is_crash())
    }
}
