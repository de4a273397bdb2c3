//! # rs-trainyard
//!
//! Simulation core of a tile-based train routing puzzle. Colored trains
//! leave outlets, travel along rails drawn by the player, get repainted,
//! split and merged, and must reach goals wanting their color without
//! crashing.
//!
//! ## Features
//!
//! - **Color algebra**: three primaries, their mixes, and brown for anything muddier
//! - **Tiles**: outlets, goals, painters, splitters, single and double rails, rocks
//! - **Deterministic stepping**: trains delivered during a step only move on the next one,
//!   so the scan order of the grid never changes the result
//! - **Renderer hooks**: per-step move records, look-ahead, and progress-timed render updates
//! - **Editing**: rail drawing and erasing with undo, edit-mode notifications
//! - **Levels**: JSON level schema (`serde` feature, on by default)
//!
//! ## Architecture
//!
//! - `color`, `direction` - Color mixing and direction sets
//! - `train` - Trains, moves and per-step move records
//! - `state` - Per-tile resident/pending train bookkeeping
//! - `tiles` - Tile variants
//! - `grid` - Tile storage and neighbour access
//! - `simulator` - Step iterator with look-ahead
//! - `tile_grid` - Owner of grid and simulator; editing and notification
//! - `traits` - Observer seam for the embedding application
//!
//! ## Example
//!
//! ```rust
//! use rs_trainyard::{
//!     Color, Dir, DirFlags, Goal, Grid, Move, Outlet, SingleRail, Tile, TileGrid,
//!     mock::RecordingObserver,
//! };
//!
//! let mut grid = Grid::new(3, 1);
//! grid.set(0, 0, Tile::Outlet(Outlet::new(Dir::Right, [Color::Red]))).unwrap();
//! grid.set(1, 0, Tile::SingleRail(SingleRail::new(Dir::Left, Dir::Right).unwrap())).unwrap();
//! let goal = Goal::new([Color::Red], DirFlags::from_dir(Dir::Left)).unwrap();
//! grid.set(2, 0, Tile::Goal(goal)).unwrap();
//!
//! let mut tg = TileGrid::new(grid, RecordingObserver::new());
//! tg.start_sim();
//!
//! // Step 1: the outlet releases its train onto the rail.
//! let step = tg.step().unwrap();
//! assert!(matches!(step.moves_at(0), [Move::Pass { .. }]));
//!
//! // Step 2: the rail hands it to the goal, which consumes it.
//! let step = tg.step().unwrap();
//! assert!(!step.has_crash());
//! assert!(tg.is_solved());
//!
//! // Step 3: nothing left to move.
//! assert!(tg.step().is_none());
//! ```

#![warn(missing_docs)]

extern crate alloc;

/// Color values and mixing.
pub mod color;
/// Simulation and render-timing configuration.
pub mod config;
/// Directions and direction sets.
pub mod direction;
/// Crate error type.
pub mod error;
/// Grid storage and the neighbour cursor.
pub mod grid;
/// JSON level schema.
#[cfg(feature = "serde")]
pub mod level;
/// Recording observer for tests.
pub mod mock;
/// Progress-ordered render updates.
pub mod render;
/// Step iterator with look-ahead.
pub mod simulator;
/// Per-tile train bookkeeping.
pub mod state;
/// Grid owner: simulation runs, editing, notifications.
pub mod tile_grid;
/// Tile variants.
pub mod tiles;
/// Trait seams for the embedding application.
pub mod traits;
/// Trains, moves and step records.
pub mod train;

// Re-exports for convenience
pub use color::Color;
pub use config::{Config, RenderConfig, SimConfig};
pub use direction::{Dir, DirFlags};
pub use error::{Error, Result};
pub use grid::{Cursor, Grid, Position};
pub use render::{RenderEvent, RenderQueue, RenderUpdate};
pub use simulator::{Simulator, StepReport};
pub use state::TrainState;
pub use tile_grid::{EditMode, SimOutcome, TileGrid};
pub use tiles::{DoubleRail, Goal, Outlet, Painter, SingleRail, Splitter, Tile};
pub use traits::{NullObserver, SimObserver};
pub use train::{GridStep, Move, Train};

#[cfg(feature = "serde")]
pub use level::{Level, TileData};
