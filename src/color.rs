//! Train colors and the mixing algebra.
//!
//! Colors are encoded as a 4-bit mask. The low three bits mark which
//! primaries are present and bit 3 marks a secondary color:
//!
//! | Color | Bits |
//! |-------|------|
//! | Red | `0b0001` |
//! | Yellow | `0b0010` |
//! | Blue | `0b0100` |
//! | Orange | `0b1011` |
//! | Purple | `0b1101` |
//! | Green | `0b1110` |
//! | Brown | `0b1111` |
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::Color;
//!
//! assert_eq!(Color::Red.mix(Color::Blue), Color::Purple);
//! assert_eq!(Color::Purple.mix(Color::Red), Color::Brown);
//! assert_eq!(Color::Green.split(), (Color::Blue, Color::Yellow));
//! ```

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

const SECONDARY: u8 = 0b1000;
const PRIMARY_MASK: u8 = 0b0111;

/// Color of a train, painter or goal target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Color {
    /// Primary red.
    Red = 0b0001,
    /// Primary yellow.
    Yellow = 0b0010,
    /// Primary blue.
    Blue = 0b0100,
    /// Red + yellow.
    Orange = 0b1011,
    /// Red + blue.
    Purple = 0b1101,
    /// Yellow + blue.
    Green = 0b1110,
    /// Anything that mixes more than two primaries or two secondaries.
    Brown = 0b1111,
}

impl Color {
    /// Every color, primaries first.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Yellow,
        Color::Blue,
        Color::Orange,
        Color::Purple,
        Color::Green,
        Color::Brown,
    ];

    /// Raw 4-bit mask.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a 4-bit mask, rejecting anything that is not one of the seven colors.
    pub fn from_bits(bits: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.bits() == bits)
            .ok_or_else(|| Error::invalid("color bits", alloc::format!("{bits:#06b}")))
    }

    /// True for red, yellow and blue.
    #[inline]
    pub const fn is_primary(self) -> bool {
        self.bits() & SECONDARY == 0
    }

    /// True for orange, purple, green and brown.
    #[inline]
    pub const fn is_secondary(self) -> bool {
        !self.is_primary()
    }

    /// Mix two colors.
    ///
    /// Equal colors mix to themselves. Two distinct primaries make their
    /// secondary. Anything else involving a secondary is brown.
    pub fn mix(self, other: Color) -> Color {
        if self == other {
            return self;
        }
        if self.is_secondary() || other.is_secondary() {
            return Color::Brown;
        }
        let bits = SECONDARY | ((self.bits() | other.bits()) & PRIMARY_MASK);
        Color::from_bits(bits).unwrap_or(Color::Brown)
    }

    /// Mix any number of colors.
    ///
    /// A single color is returned unchanged and a pair goes through
    /// [`mix`](Self::mix). Three or more colors stay the same only when
    /// they are all equal, otherwise they turn brown.
    ///
    /// ```rust
    /// use rs_trainyard::Color;
    ///
    /// assert_eq!(Color::mix_many(&[Color::Blue]).unwrap(), Color::Blue);
    /// assert_eq!(Color::mix_many(&[Color::Blue, Color::Yellow]).unwrap(), Color::Green);
    /// assert_eq!(
    ///     Color::mix_many(&[Color::Red, Color::Red, Color::Blue]).unwrap(),
    ///     Color::Brown
    /// );
    /// assert!(Color::mix_many(&[]).is_err());
    /// ```
    pub fn mix_many(colors: &[Color]) -> Result<Color> {
        match colors {
            [] => Err(Error::EmptyMix),
            [only] => Ok(*only),
            [a, b] => Ok(a.mix(*b)),
            [first, rest @ ..] => {
                if rest.iter().all(|c| c == first) {
                    Ok(*first)
                } else {
                    Ok(Color::Brown)
                }
            }
        }
    }

    /// Split a secondary color into the pair of primaries a splitter emits.
    ///
    /// Primaries (and brown) split into two copies of themselves.
    pub const fn split(self) -> (Color, Color) {
        match self {
            Color::Purple => (Color::Blue, Color::Red),
            Color::Green => (Color::Blue, Color::Yellow),
            Color::Orange => (Color::Yellow, Color::Red),
            other => (other, other),
        }
    }

    /// Lowercase name used in level files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Orange => "orange",
            Color::Purple => "purple",
            Color::Green => "green",
            Color::Brown => "brown",
        }
    }

    /// Parse a color name exactly as [`Color::as_str`] writes it.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| Error::invalid("color", name))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::from_name(s)
    }
}
