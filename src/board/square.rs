/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::Side;

/// Offsets to the four orthogonally-adjacent squares.
///
/// These are the King's steps, the Chariot/Cannon ray directions, and the "legs" of a Horse.
pub const KING_DELTA: [i16; 4] = [-16, -1, 1, 16];

/// Offsets to the four diagonally-adjacent squares.
///
/// These are the Advisor's steps and, doubled, the Elephant's.
pub const ADVISOR_DELTA: [i16; 4] = [-17, -15, 15, 17];

/// Horse jumps, grouped by the leg in [`KING_DELTA`] that must be empty for them to be possible.
pub const KNIGHT_DELTA: [[i16; 2]; 4] = [[-33, -31], [-18, 14], [-14, 18], [31, 33]];

/// Squares a Horse could attack a King from, grouped by the diagonal in [`ADVISOR_DELTA`]
/// (relative to the King) that must be empty for the attack to land.
pub const KNIGHT_CHECK_DELTA: [[i16; 2]; 4] = [[-33, -18], [-31, -14], [14, 31], [18, 33]];

/// A square on the board.
///
/// The 9x10 playing area is embedded in a 16x16 grid so that every piece can step off the
/// board without wrapping around; the surrounding squares are always empty and never
/// [`Square::is_on_board`]. The grid is laid out with Black's back rank at the top (rank 3)
/// and Red's back rank at the bottom (rank 12).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// Number of cells in the grid, including the off-board padding.
    pub const COUNT: usize = 256;

    /// Top-most rank of the playing area (Black's back rank).
    pub const RANK_TOP: u8 = 3;

    /// Bottom-most rank of the playing area (Red's back rank).
    pub const RANK_BOTTOM: u8 = 12;

    /// Left-most file of the playing area, from Red's point of view.
    pub const FILE_LEFT: u8 = 3;

    /// Right-most file of the playing area, from Red's point of view.
    pub const FILE_RIGHT: u8 = 11;

    /// Creates a [`Square`] from its grid `file` (x) and `rank` (y).
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Self {
        Self((rank << 4) | (file & 0x0f))
    }

    /// Creates a [`Square`] from a raw index into the 16x16 grid.
    #[inline(always)]
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    /// Creates a [`Square`] from ICCS coordinates, where `file` is `0..=8` (`a..=i`) and
    /// `rank` is `0..=9`, counted from Red's back rank.
    #[inline(always)]
    pub const fn from_iccs(file: u8, rank: u8) -> Self {
        Self::new(Self::FILE_LEFT + file, Self::RANK_BOTTOM - rank)
    }

    /// Raw index of this square into a 256-element table.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Grid file (x coordinate) of this square.
    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 0x0f
    }

    /// Grid rank (y coordinate) of this square.
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 4
    }

    /// Returns `true` if this square lies within the 9x10 playing area.
    #[inline(always)]
    pub const fn is_on_board(self) -> bool {
        let (file, rank) = (self.file(), self.rank());
        file >= Self::FILE_LEFT
            && file <= Self::FILE_RIGHT
            && rank >= Self::RANK_TOP
            && rank <= Self::RANK_BOTTOM
    }

    /// Returns `true` if this square lies within either palace.
    #[inline(always)]
    pub const fn in_palace(self) -> bool {
        let (file, rank) = (self.file(), self.rank());
        file >= 6 && file <= 8 && ((rank >= 3 && rank <= 5) || (rank >= 10 && rank <= 12))
    }

    /// Shifts this square by `delta` grid cells.
    ///
    /// Every offset used by move generation stays within the grid for on-board squares.
    #[inline(always)]
    pub const fn offset(self, delta: i16) -> Self {
        Self((self.0 as i16 + delta) as u8)
    }

    /// The square one step "forward" from `side`'s point of view.
    #[inline(always)]
    pub const fn forward(self, side: Side) -> Self {
        self.offset(-16 + ((side as i16) << 5))
    }

    /// Returns `true` if this square lies on `side`'s half of the river.
    #[inline(always)]
    pub const fn on_home_half(self, side: Side) -> bool {
        (self.0 & 0x80) != ((side as u8) << 7)
    }

    /// Returns `true` if this square lies across the river from `side`.
    #[inline(always)]
    pub const fn across_river(self, side: Side) -> bool {
        !self.on_home_half(side)
    }

    /// Returns `true` if both squares are on the same half of the river.
    #[inline(always)]
    pub const fn same_half(self, other: Self) -> bool {
        ((self.0 ^ other.0) & 0x80) == 0
    }

    /// Returns `true` if both squares share a rank.
    #[inline(always)]
    pub const fn same_rank(self, other: Self) -> bool {
        ((self.0 ^ other.0) & 0xf0) == 0
    }

    /// Returns `true` if both squares share a file.
    #[inline(always)]
    pub const fn same_file(self, other: Self) -> bool {
        ((self.0 ^ other.0) & 0x0f) == 0
    }

    /// Rotates this square 180 degrees, swapping Red's and Black's sides of the board.
    #[inline(always)]
    pub const fn flip(self) -> Self {
        Self(254 - self.0)
    }

    /// Reflects this square left-to-right.
    #[inline(always)]
    pub const fn mirror(self) -> Self {
        Self::new(14 - self.file(), self.rank())
    }

    /// Iterates over every on-board square, in board-scan order (top-left to bottom-right).
    #[inline(always)]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).map(Self).filter(|sq| sq.is_on_board())
    }

    /// Returns the single orthogonal direction leading from `self` to `other`, if one exists.
    #[inline(always)]
    pub fn direction_to(self, other: Self) -> Option<i16> {
        if self == other {
            None
        } else if self.same_rank(other) {
            Some(if other < self { -1 } else { 1 })
        } else if self.same_file(other) {
            Some(if other < self { -16 } else { 16 })
        } else {
            None
        }
    }

    /// ICCS file character (`a..=i`) of this square.
    #[inline(always)]
    fn file_char(self) -> char {
        (b'a' + self.file().wrapping_sub(Self::FILE_LEFT)) as char
    }

    /// ICCS rank character (`0..=9`) of this square.
    #[inline(always)]
    fn rank_char(self) -> char {
        (b'0' + Self::RANK_BOTTOM.wrapping_sub(self.rank())) as char
    }
}

/// Returns `true` if `src -> dst` is a single orthogonal step.
#[inline(always)]
pub const fn king_span(src: Square, dst: Square) -> bool {
    matches!(dst.0 as i16 - src.0 as i16, -16 | -1 | 1 | 16)
}

/// Returns `true` if `src -> dst` is a single diagonal step.
#[inline(always)]
pub const fn advisor_span(src: Square, dst: Square) -> bool {
    matches!(dst.0 as i16 - src.0 as i16, -17 | -15 | 15 | 17)
}

/// Returns `true` if `src -> dst` is a double diagonal step.
#[inline(always)]
pub const fn elephant_span(src: Square, dst: Square) -> bool {
    matches!(dst.0 as i16 - src.0 as i16, -34 | -30 | 30 | 34)
}

/// The "eye" of an Elephant move: the square halfway between `src` and `dst`.
#[inline(always)]
pub const fn elephant_eye(src: Square, dst: Square) -> Square {
    // Red's half sits above 0x80, so the sum needs more than a byte
    Square(((src.0 as u16 + dst.0 as u16) >> 1) as u8)
}

/// The "leg" of a Horse move: the orthogonally-adjacent square that must be empty.
///
/// Returns `None` if `src -> dst` is not a Horse jump at all.
#[inline(always)]
pub const fn knight_leg(src: Square, dst: Square) -> Option<Square> {
    let leg = match dst.0 as i16 - src.0 as i16 {
        -33 | -31 => -16,
        -18 | 14 => -1,
        -14 | 18 => 1,
        31 | 33 => 16,
        _ => return None,
    };

    Some(src.offset(leg))
}

impl FromStr for Square {
    type Err = anyhow::Error;

    /// Parses an ICCS square, such as `e0` or `h7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            bail!("Invalid square {s:?}: expected a file (a-i) followed by a rank (0-9)");
        }

        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'i').contains(&file) {
            bail!("Invalid file {:?} in square {s:?}", file as char);
        }
        if !rank.is_ascii_digit() {
            bail!("Invalid rank {:?} in square {s:?}", rank as char);
        }

        Ok(Self::from_iccs(file - b'a', rank - b'0'))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{self} ({:#04x})", self.0)
        } else {
            write!(f, "off-board ({:#04x})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_dimensions() {
        assert_eq!(Square::iter().count(), 90);
        assert_eq!(Square::iter().filter(|sq| sq.in_palace()).count(), 18);
    }

    #[test]
    fn test_iccs_round_trip() {
        for sq in Square::iter() {
            let parsed: Square = sq.to_string().parse().unwrap();
            assert_eq!(parsed, sq);
        }

        let e0: Square = "e0".parse().unwrap();
        assert_eq!(e0, Square::new(7, 12));
        assert!("j0".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
    }

    #[test]
    fn test_river_and_forward() {
        let red_soldier = Square::from_iccs(4, 3);
        assert!(red_soldier.on_home_half(Side::Red));
        assert_eq!(red_soldier.forward(Side::Red), Square::from_iccs(4, 4));
        assert!(red_soldier.forward(Side::Red).forward(Side::Red).across_river(Side::Red));

        let black_soldier = Square::from_iccs(4, 6);
        assert!(black_soldier.on_home_half(Side::Black));
        assert_eq!(black_soldier.forward(Side::Black), Square::from_iccs(4, 5));
    }

    #[test]
    fn test_flip_and_mirror() {
        let a0 = Square::from_iccs(0, 0);
        assert_eq!(a0.flip(), Square::from_iccs(8, 9));
        assert_eq!(a0.mirror(), Square::from_iccs(8, 0));
        assert_eq!(a0.mirror().mirror(), a0);
        assert!(Square::iter().all(|sq| sq.flip().is_on_board() && sq.mirror().is_on_board()));
    }

    #[test]
    fn test_knight_leg() {
        let src = Square::from_iccs(1, 0);
        let dst = Square::from_iccs(2, 2);
        assert_eq!(knight_leg(src, dst), Some(Square::from_iccs(1, 1)));
        assert_eq!(knight_leg(src, Square::from_iccs(1, 2)), None);
    }
}
