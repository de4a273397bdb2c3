//! The tile grid and the cursor tiles use to reach their neighbours.
//!
//! Cells are stored row-major; a cell index is `y * width + x`, the same
//! key the level format uses for its tile-data map.

use alloc::vec::Vec;
use core::mem;

use crate::config::RenderConfig;
use crate::direction::Dir;
use crate::error::{Error, Result};
use crate::render::{RenderEvent, RenderUpdate};
use crate::tiles::Tile;
use crate::train::{GridStep, Train};

/// Column and row of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Column, growing right.
    pub x: usize,
    /// Row, growing down.
    pub y: usize,
}

impl Position {
    /// Position at column `x`, row `y`.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Rectangular array of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// All-blank grid.
    pub fn new(width: usize, height: usize) -> Self {
        let mut tiles = Vec::new();
        tiles.resize(width * height, Tile::Blank);
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Grid from rows of tiles; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(Error::BoardShape {
                    expected: width,
                    row,
                    found: cells.len(),
                });
            }
            tiles.extend(cells);
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cell index of `(x, y)`, if inside the grid.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Position of a cell index.
    pub fn position(&self, index: usize) -> Option<Position> {
        (index < self.tiles.len()).then(|| Position::new(index % self.width, index / self.width))
    }

    /// Tile at `(x, y)`; `None` only outside the grid.
    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.index(x, y).and_then(|i| self.tiles.get(i))
    }

    /// Mutable tile at `(x, y)`.
    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut Tile> {
        self.index(x, y).and_then(|i| self.tiles.get_mut(i))
    }

    /// Tile at a cell index.
    pub fn tile_at(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Replace the tile at `(x, y)`, returning the old one.
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) -> Result<Tile> {
        let slot = self.tile_mut(x, y).ok_or(Error::OutOfBounds { x, y })?;
        Ok(mem::replace(slot, tile))
    }

    /// All tiles, row-major.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Every tile that holds trains during a run, with its position.
    pub fn stateful_tiles(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_stateful())
            .map(move |(i, t)| (Position::new(i % width, i / width), t))
    }

    /// Index of the cell next to `index` in direction `dir`.
    pub fn neighbor(&self, index: usize, dir: Dir) -> Option<usize> {
        neighbor_of(self.width, self.height, index, dir)
    }

    /// Indices of tiles currently holding resident trains, row-major.
    pub fn occupied(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_trains())
            .map(|(i, _)| i)
            .collect()
    }

    /// Allocate run state on every tile.
    pub fn init_state(&mut self) {
        self.tiles.iter_mut().for_each(Tile::init_state);
    }

    /// Discard run state on every tile.
    pub fn close(&mut self) {
        self.tiles.iter_mut().for_each(Tile::close);
    }

    /// True while tiles carry run state.
    pub fn is_running(&self) -> bool {
        self.tiles.iter().any(|t| t.train_state().is_some())
    }

    /// Promote every tile's pending trains.
    pub fn finalize(&mut self) {
        self.tiles.iter_mut().for_each(Tile::finalize);
    }

    /// Cursor for the tile at `origin`, collecting render updates into `renders`.
    pub fn cursor<'a>(
        &'a mut self,
        origin: usize,
        renders: &'a mut Vec<RenderUpdate>,
        config: &'a RenderConfig,
    ) -> Cursor<'a> {
        Cursor {
            tiles: &mut self.tiles,
            width: self.width,
            height: self.height,
            origin,
            renders,
            config,
        }
    }

    /// Step the tile at `index`.
    ///
    /// The tile is taken out of its cell for the duration, leaving a blank
    /// behind, so that it can mutate itself while the cursor mutates its
    /// neighbours.
    pub(crate) fn step_tile(
        &mut self,
        index: usize,
        renders: &mut Vec<RenderUpdate>,
        config: &RenderConfig,
    ) {
        let Some(slot) = self.tiles.get_mut(index) else {
            return;
        };
        let mut tile = mem::take(slot);
        tile.step(&mut self.cursor(index, renders, config));
        self.tiles[index] = tile;
    }

    /// Drain every tile's move log into one step record.
    pub(crate) fn collect_moves(&mut self) -> GridStep {
        let mut step = GridStep::new();
        for (index, tile) in self.tiles.iter_mut().enumerate() {
            step.extend(index, tile.take_moves());
        }
        step
    }
}

fn neighbor_of(width: usize, height: usize, index: usize, dir: Dir) -> Option<usize> {
    if width == 0 || index >= width * height {
        return None;
    }
    let (dx, dy) = dir.offset();
    let x = (index % width).checked_add_signed(dx)?;
    let y = (index / width).checked_add_signed(dy)?;
    (x < width && y < height).then(|| y * width + x)
}

/// A tile's view of the grid while it steps.
///
/// Gives access to the neighbours of the origin cell only through
/// [`send`](Cursor::send), which enforces their acceptance rules.
pub struct Cursor<'a> {
    tiles: &'a mut [Tile],
    width: usize,
    height: usize,
    origin: usize,
    renders: &'a mut Vec<RenderUpdate>,
    config: &'a RenderConfig,
}

impl Cursor<'_> {
    /// Cell index of the stepping tile.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Position of the stepping tile.
    pub fn position(&self) -> Position {
        Position::new(self.origin % self.width, self.origin / self.width)
    }

    /// Index of the neighbour in direction `dir`.
    pub fn neighbor(&self, dir: Dir) -> Option<usize> {
        neighbor_of(self.width, self.height, self.origin, dir)
    }

    /// Queue a render event on the stepping tile.
    pub fn render(&mut self, event: RenderEvent) {
        self.push_render(self.origin, event);
    }

    /// Move `train` into the neighbour it is heading for.
    ///
    /// Returns false, and queues a crash render on the stepping tile, when
    /// the train would leave the grid or the neighbour refuses it.
    pub fn send(&mut self, train: Train) -> bool {
        let target = self
            .neighbor(train.dir)
            .filter(|&i| self.tiles.get(i).is_some_and(|t| t.accepts(&train)));
        let Some(index) = target else {
            self.render(RenderEvent::Crash);
            return false;
        };
        if let Some(event) = self.tiles[index].receive(train) {
            self.push_render(index, event);
        }
        true
    }

    fn push_render(&mut self, tile: usize, event: RenderEvent) {
        let progress = event.progress(self.config);
        self.renders.push(RenderUpdate::new(tile, progress, event));
    }
}
