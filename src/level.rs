//! JSON level schema.
//!
//! A level is a square board of `N` strings of `N` characters, one per
//! cell, plus a map from cell index (`row * N + col`, as a string key) to
//! the payload of tiles whose shape the character cannot express.
//!
//! | Char | Tile | Payload |
//! |------|------|---------|
//! | `' '` | Blank, or a rail if the cell has `paths` | `{ "paths": [mask] }` or `[mask, mask]` |
//! | `'+'` | Outlet | `{ "out": dir, "colors": [color] }` |
//! | `'o'` | Goal | `{ "targets": [color], "actives": mask }` |
//! | `'p'` | Painter | `{ "actives": mask, "color": color }` |
//! | `'s'` | Splitter | `{ "actives": mask }` |
//! | `'r'` | Rock | none |
//!
//! Colors and directions are stored by lowercase name and validated on
//! load; an unknown name fails with [`Error::InvalidValue`].
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::level::Level;
//!
//! let json = r#"{
//!     "name": "First Light",
//!     "board": ["+ o", "   ", "   "],
//!     "tiles": {
//!         "0": { "out": "right", "colors": ["red"] },
//!         "1": { "paths": [5] },
//!         "2": { "targets": ["red"], "actives": 4 }
//!     }
//! }"#;
//!
//! let level = Level::from_json(json).unwrap();
//! let grid = level.to_grid().unwrap();
//! assert_eq!(grid.width(), 3);
//! assert_eq!(Level::from_grid(&grid).to_grid().unwrap(), grid);
//! ```

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::Config;
use crate::direction::{Dir, DirFlags};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::tile_grid::TileGrid;
use crate::tiles::{DoubleRail, Goal, Outlet, Painter, SingleRail, Splitter, Tile};
use crate::traits::SimObserver;

/// Variant-specific payload of one cell.
///
/// Every field is optional on the wire; which ones are required depends on
/// the board character of the cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileData {
    /// Outlet exit direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    /// Outlet departures, in order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    /// Goal targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    /// Active sides of a goal, painter or splitter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actives: Option<u8>,
    /// Painter color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Rail paths, one mask per path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<u8>>,
}

/// A serialized level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Display title, any length; the config title keeps a truncated copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Board rows, top to bottom.
    pub board: Vec<String>,
    /// Payload per cell index.
    #[serde(default)]
    pub tiles: BTreeMap<String, TileData>,
}

impl Level {
    /// Parse a level from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Set the display title.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Build the grid, validating every cell.
    pub fn to_grid(&self) -> Result<Grid> {
        let n = self.board.len();
        let data = self.indexed_tiles(n)?;

        let mut rows = Vec::with_capacity(n);
        for (row, line) in self.board.iter().enumerate() {
            let found = line.chars().count();
            if found != n {
                return Err(Error::BoardShape {
                    expected: n,
                    row,
                    found,
                });
            }
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    let index = row * n + col;
                    build_tile(index, ch, data.get(&index).copied())
                })
                .collect::<Result<Vec<Tile>>>()?;
            rows.push(cells);
        }

        let grid = Grid::from_rows(rows)?;
        log::debug!(
            "loaded level {:?}: {}x{}, {} stateful tiles",
            self.name.as_deref().unwrap_or(""),
            n,
            n,
            grid.stateful_tiles().count()
        );
        Ok(grid)
    }

    /// Describe `grid` as a level.
    ///
    /// Run state is not saved. A grid that is not square produces a level
    /// that [`to_grid`](Self::to_grid) rejects.
    pub fn from_grid(grid: &Grid) -> Self {
        let board = grid
            .tiles()
            .chunks(grid.width().max(1))
            .map(|row| row.iter().map(Tile::symbol).collect())
            .collect();
        let tiles = grid
            .tiles()
            .iter()
            .enumerate()
            .filter_map(|(i, tile)| tile_data(tile).map(|d| (i.to_string(), d)))
            .collect();
        Self {
            name: None,
            board,
            tiles,
        }
    }

    fn indexed_tiles(&self, n: usize) -> Result<BTreeMap<usize, &TileData>> {
        self.tiles
            .iter()
            .map(|(key, data)| match key.trim().parse::<usize>() {
                Ok(index) if index < n * n => Ok((index, data)),
                _ => Err(Error::invalid("cell index", key.as_str())),
            })
            .collect()
    }
}

impl<O: SimObserver> TileGrid<O> {
    /// Build a tile grid from a level, titling the config after it.
    pub fn from_level(level: &Level, observer: O) -> Result<Self> {
        let grid = level.to_grid()?;
        let title = level.name.as_deref().unwrap_or("");
        Ok(TileGrid::new(grid, observer).with_config(Config::default().with_title(title)))
    }
}

// ============================================================================
// Cell decoding
// ============================================================================

fn build_tile(index: usize, ch: char, data: Option<&TileData>) -> Result<Tile> {
    let tile = match ch {
        ' ' => match data.and_then(|d| d.paths.as_deref()) {
            None => Tile::Blank,
            Some(paths) => rail(paths)?,
        },
        'r' => Tile::Rock,
        '+' => {
            let data = data.ok_or(Error::MissingTileData { index })?;
            let out = Dir::from_name(required(&data.out, index, "out")?)?;
            let colors = colors(data.colors.as_deref().unwrap_or_default())?;
            Tile::Outlet(Outlet::new(out, colors))
        }
        'o' => {
            let data = data.ok_or(Error::MissingTileData { index })?;
            let targets = colors(data.targets.as_deref().unwrap_or_default())?;
            Tile::Goal(Goal::new(targets, actives(data, index)?)?)
        }
        'p' => {
            let data = data.ok_or(Error::MissingTileData { index })?;
            let color = Color::from_name(required(&data.color, index, "color")?)?;
            Tile::Painter(Painter::new(color, actives(data, index)?)?)
        }
        's' => {
            let data = data.ok_or(Error::MissingTileData { index })?;
            Tile::Splitter(Splitter::from_flags(actives(data, index)?)?)
        }
        other => return Err(Error::UnknownTileChar { index, ch: other }),
    };
    Ok(tile)
}

fn required<'a>(field: &'a Option<String>, index: usize, name: &str) -> Result<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| Error::malformed(format!("cell {index} has no `{name}`")))
}

fn actives(data: &TileData, index: usize) -> Result<DirFlags> {
    let bits = data
        .actives
        .ok_or_else(|| Error::malformed(format!("cell {index} has no `actives`")))?;
    DirFlags::new(bits)
}

fn colors(names: &[String]) -> Result<Vec<Color>> {
    names.iter().map(|n| Color::from_name(n)).collect()
}

fn rail(paths: &[u8]) -> Result<Tile> {
    match paths {
        [only] => Ok(Tile::SingleRail(SingleRail::from_flags(DirFlags::new(*only)?)?)),
        [first, second] => Ok(Tile::DoubleRail(DoubleRail::new(
            DirFlags::new(*first)?,
            DirFlags::new(*second)?,
        )?)),
        other => Err(Error::malformed(format!(
            "rail needs 1 or 2 paths, got {}",
            other.len()
        ))),
    }
}

// ============================================================================
// Cell encoding
// ============================================================================

fn names(colors: &[Color]) -> Vec<String> {
    colors.iter().map(|c| c.as_str().to_string()).collect()
}

fn tile_data(tile: &Tile) -> Option<TileData> {
    let data = match tile {
        Tile::Blank | Tile::Rock => return None,
        Tile::Outlet(outlet) => TileData {
            out: Some(outlet.out().as_str().to_string()),
            colors: Some(names(outlet.colors())),
            ..TileData::default()
        },
        Tile::Goal(goal) => TileData {
            targets: Some(names(goal.targets())),
            actives: Some(goal.entrances().bits()),
            ..TileData::default()
        },
        Tile::Painter(painter) => TileData {
            actives: Some(painter.actives().bits()),
            color: Some(painter.color().as_str().to_string()),
            ..TileData::default()
        },
        Tile::Splitter(splitter) => TileData {
            actives: Some(splitter.actives().bits()),
            ..TileData::default()
        },
        Tile::SingleRail(rail) => TileData {
            paths: Some(Vec::from([rail.ends().bits()])),
            ..TileData::default()
        },
        Tile::DoubleRail(rail) => TileData {
            paths: Some(rail.paths().iter().map(|p| p.bits()).collect()),
            ..TileData::default()
        },
    };
    Some(data)
}
