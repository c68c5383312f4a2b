//! Squares are one of the two data types we use to denote positions on the
//! board, the other being Bitboards.
//!
//! A Square always denotes a single location, where a Bitboard represents an
//! _unordered set_ of locations at once.

use anyhow::anyhow;
use std::fmt::Display;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

#[rustfmt::skip]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash)]
/// A board square, numbered from A1 = 0 up to H8 = 63, rank-major.
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

use Square::*;

impl Square {
    pub const COUNT: usize = 64;

    #[rustfmt::skip]
    pub const ALL: [Self; Self::COUNT] = [
        A1, B1, C1, D1, E1, F1, G1, H1,
        A2, B2, C2, D2, E2, F2, G2, H2,
        A3, B3, C3, D3, E3, F3, G3, H3,
        A4, B4, C4, D4, E4, F4, G4, H4,
        A5, B5, C5, D5, E5, F5, G5, H5,
        A6, B6, C6, D6, E6, F6, G6, H6,
        A7, B7, C7, D7, E7, F7, G7, H7,
        A8, B8, C8, D8, E8, F8, G8, H8,
    ];

    #[rustfmt::skip]
    pub const NAMES: [&'static str; Self::COUNT] = [
        "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1",
        "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
        "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3",
        "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
        "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5",
        "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
        "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7",
        "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
    ];

    pub fn new(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    pub fn try_from_usize(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn file(self) -> u8 {
        self as u8 % 8
    }

    pub fn rank(self) -> u8 {
        self as u8 / 8
    }

    /// Manhattan-ish king-step distance between two squares, used by history
    /// and evaluation heuristics that care about "closeness".
    pub fn distance(self, other: Self) -> u8 {
        let df = (self.file() as i8 - other.file() as i8).unsigned_abs();
        let dr = (self.rank() as i8 - other.rank() as i8).unsigned_abs();
        df.max(dr)
    }

    /// The square one rank "forward" for `color`, if it exists on the board.
    pub fn forward(self, color: super::piece::Color) -> Option<Self> {
        let offset: i8 = if color.is_white() { 8 } else { -8 };
        let idx = self as i8 + offset;
        (0..64).contains(&idx).then(|| Self::ALL[idx as usize])
    }

    /// The square one rank "backward" for `color`, if it exists on the board.
    pub fn backward(self, color: super::piece::Color) -> Option<Self> {
        self.forward(!color)
    }

    pub fn is_promo_rank(self, color: super::piece::Color) -> bool {
        match color {
            super::piece::Color::White => self.rank() == 7,
            super::piece::Color::Black => self.rank() == 0,
        }
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Self::NAMES[*self as usize])
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let idx = Self::NAMES
            .iter()
            .position(|&name| name.eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("'{s}' is not a valid square label"))?;

        Ok(Self::ALL[idx])
    }
}

impl From<usize> for Square {
    fn from(idx: usize) -> Self {
        Self::ALL[idx]
    }
}

impl From<Square> for usize {
    fn from(sq: Square) -> Self {
        sq as usize
    }
}

impl<T> Index<Square> for [T; 64] {
    type Output = T;

    fn index(&self, index: Square) -> &Self::Output {
        &self[index as usize]
    }
}

impl<T> IndexMut<Square> for [T; 64] {
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index as usize]
    }
}
