//! Grid directions and direction sets.
//!
//! [`Dir`] values are ordered counterclockwise starting from [`Dir::Right`],
//! so rotating by `n` is just `(d + n) mod 4` and the opposite direction is
//! a rotation by two. [`DirFlags`] is a 4-bit set of directions used for
//! tile entrances and rail paths.
//!
//! # Example
//!
//! ```rust
//! use rs_trainyard::{Dir, DirFlags};
//!
//! assert_eq!(Dir::Right.rotate(1), Dir::Up);
//! assert_eq!(Dir::Up.flip(), Dir::Down);
//!
//! let rail = DirFlags::from_dirs(&[Dir::Left, Dir::Up]);
//! assert_eq!(rail.dir_excluding(Dir::Left), Some(Dir::Up));
//! ```

use core::fmt;
use core::ops::{BitAnd, BitOr};
use core::str::FromStr;

use heapless::Vec as HVec;

use crate::error::{Error, Result};

/// One of the four grid directions.
///
/// A train's direction is the way it is travelling: it leaves its tile
/// through that side and enters the next tile through the opposite side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Dir {
    /// +x.
    Right = 0,
    /// -y (rows grow downwards).
    Up = 1,
    /// -x.
    Left = 2,
    /// +y.
    Down = 3,
}

impl Dir {
    /// All directions in counterclockwise order.
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Up, Dir::Left, Dir::Down];

    /// Direction with the given index, wrapping modulo 4.
    #[inline]
    pub const fn from_index(index: u8) -> Dir {
        match index % 4 {
            0 => Dir::Right,
            1 => Dir::Up,
            2 => Dir::Left,
            _ => Dir::Down,
        }
    }

    /// Index in `0..4`.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Rotate counterclockwise by `n` quarter turns (negative turns clockwise).
    #[inline]
    pub const fn rotate(self, n: i32) -> Dir {
        Dir::from_index(((self as i32 + n.rem_euclid(4)) % 4) as u8)
    }

    /// The opposite direction.
    #[inline]
    pub const fn flip(self) -> Dir {
        self.rotate(2)
    }

    /// Column/row offset of a single step in this direction.
    #[inline]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Dir::Right => (1, 0),
            Dir::Up => (0, -1),
            Dir::Left => (-1, 0),
            Dir::Down => (0, 1),
        }
    }

    /// Lowercase name used in level files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Dir::Right => "right",
            Dir::Up => "up",
            Dir::Left => "left",
            Dir::Down => "down",
        }
    }

    /// Parse a direction name exactly as [`Dir::as_str`] writes it.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == name)
            .ok_or_else(|| Error::invalid("direction", name))
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dir::from_name(s)
    }
}

/// A set of directions packed into four bits (bit `i` is `Dir::from_index(i)`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct DirFlags(u8);

impl DirFlags {
    /// The empty set.
    pub const EMPTY: DirFlags = DirFlags(0);
    /// All four directions.
    pub const ALL: DirFlags = DirFlags(0b1111);
    /// Left and right.
    pub const HORIZONTAL: DirFlags = DirFlags(0b0101);
    /// Up and down.
    pub const VERTICAL: DirFlags = DirFlags(0b1010);

    /// Build from a raw mask; anything above four bits is rejected.
    pub fn new(bits: u8) -> Result<Self> {
        if bits > Self::ALL.0 {
            return Err(Error::invalid("direction mask", alloc::format!("{bits}")));
        }
        Ok(DirFlags(bits))
    }

    /// Set with a single direction.
    #[inline]
    pub const fn from_dir(dir: Dir) -> Self {
        DirFlags(1 << dir as u8)
    }

    /// Set containing every listed direction.
    pub fn from_dirs(dirs: &[Dir]) -> Self {
        dirs.iter()
            .fold(DirFlags::EMPTY, |acc, d| acc | DirFlags::from_dir(*d))
    }

    /// Raw mask.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Membership test.
    #[inline]
    pub const fn contains(self, dir: Dir) -> bool {
        self.0 & (1 << dir as u8) != 0
    }

    /// Number of directions in the set.
    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if no direction is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The other member of a two-direction set.
    ///
    /// Returns `None` unless the set holds exactly two directions and one
    /// of them is `dir`.
    pub fn dir_excluding(self, dir: Dir) -> Option<Dir> {
        if self.len() != 2 || !self.contains(dir) {
            return None;
        }
        let rest = self.0 & !(1 << dir as u8);
        Some(Dir::from_index(rest.trailing_zeros() as u8))
    }

    /// True if the sets share no direction.
    #[inline]
    pub const fn is_disjoint(self, other: DirFlags) -> bool {
        self.0 & other.0 == 0
    }

    /// True for `{Left, Right}` and `{Up, Down}`.
    #[inline]
    pub const fn is_straight(self) -> bool {
        self.0 == Self::HORIZONTAL.0 || self.0 == Self::VERTICAL.0
    }

    /// Every direction rotated by `n` quarter turns.
    pub fn rotate(self, n: i32) -> DirFlags {
        self.iter()
            .fold(DirFlags::EMPTY, |acc, d| acc | DirFlags::from_dir(d.rotate(n)))
    }

    /// Members in ascending bit order.
    pub fn dirs(self) -> HVec<Dir, 4> {
        let mut out = HVec::new();
        for d in Dir::ALL.into_iter().filter(|d| self.contains(*d)) {
            let _ = out.push(d);
        }
        out
    }

    /// Iterate members in ascending bit order.
    pub fn iter(self) -> impl Iterator<Item = Dir> {
        Dir::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl BitOr for DirFlags {
    type Output = DirFlags;

    fn bitor(self, rhs: DirFlags) -> DirFlags {
        DirFlags(self.0 | rhs.0)
    }
}

impl BitAnd for DirFlags {
    type Output = DirFlags;

    fn bitand(self, rhs: DirFlags) -> DirFlags {
        DirFlags(self.0 & rhs.0)
    }
}

impl From<Dir> for DirFlags {
    fn from(dir: Dir) -> Self {
        DirFlags::from_dir(dir)
    }
}

impl TryFrom<u8> for DirFlags {
    type Error = Error;

    fn try_from(bits: u8) -> Result<Self> {
        DirFlags::new(bits)
    }
}

impl From<DirFlags> for u8 {
    fn from(flags: DirFlags) -> u8 {
        flags.0
    }
}
