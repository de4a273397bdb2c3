//! Error types for level construction, editing and value parsing.
//!
//! Crashes are not errors. A train running into a tile that refuses it is a
//! normal simulation outcome and shows up as [`Move::Destroy`] with
//! `crashed: true`. The variants here cover malformed input and invalid
//! requests only.
//!
//! [`Move::Destroy`]: crate::train::Move::Destroy

use alloc::string::String;

/// Errors returned by fallible operations in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A color, direction, bitmask or cell key could not be parsed.
    #[error("invalid {kind}: {value:?}")]
    InvalidValue {
        /// What was being parsed (e.g. `"color"`, `"direction"`).
        kind: &'static str,
        /// The offending input.
        value: String,
    },

    /// `Color::mix_many` was called with no colors.
    #[error("cannot mix an empty list of colors")]
    EmptyMix,

    /// A tile was constructed with a structurally invalid shape.
    #[error("malformed tile: {reason}")]
    MalformedTile {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The board rows do not form the expected grid.
    #[error("board must be {expected}x{expected}, found row {row} with {found} cells")]
    BoardShape {
        /// Expected side length.
        expected: usize,
        /// Index of the offending row.
        row: usize,
        /// Number of cells found in that row.
        found: usize,
    },

    /// A board character outside the level alphabet.
    #[error("unknown tile character {ch:?} at cell {index}")]
    UnknownTileChar {
        /// Cell index (`row * N + col`).
        index: usize,
        /// The character found.
        ch: char,
    },

    /// A tile that needs a payload has no entry in the tile-data map.
    #[error("missing tile data for cell {index}")]
    MissingTileData {
        /// Cell index (`row * N + col`).
        index: usize,
    },

    /// Coordinates outside the grid.
    #[error("position ({x}, {y}) is outside the grid")]
    OutOfBounds {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// Rails cannot be drawn on (or erased from) this cell.
    #[error("cannot edit rails at ({x}, {y})")]
    NotDrawable {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// The grid cannot be edited while a simulation run is active.
    #[error("simulation is running")]
    SimulationRunning,

    /// JSON (de)serialization failure.
    #[cfg(feature = "serde")]
    #[error("level json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Error::InvalidValue {
            kind,
            value: value.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedTile {
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn invalid_value_message() {
        let err = Error::invalid("color", "pink");
        assert_eq!(err.to_string(), "invalid color: \"pink\"");
    }

    #[test]
    fn board_shape_message() {
        let err = Error::BoardShape {
            expected: 3,
            row: 1,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "board must be 3x3, found row 1 with 2 cells"
        );
    }

    #[test]
    fn malformed_tile_message() {
        let err = Error::malformed("rail ends must differ");
        assert!(matches!(err, Error::MalformedTile { .. }));
        assert_eq!(err.to_string(), "malformed tile: rail ends must differ");
    }
}
