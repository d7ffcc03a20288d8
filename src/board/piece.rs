/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Not, str::FromStr};

use anyhow::{bail, Result};

/// One of the two players.
///
/// Red always moves first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum Side {
    #[default]
    Red = 0,
    Black = 1,
}

impl Side {
    /// Number of sides.
    pub const COUNT: usize = 2;

    /// Creates a [`Side`] from a `0` (Red) or `1` (Black).
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Red
        } else {
            Self::Black
        }
    }

    /// Returns `0` for Red and `1` for Black.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The other side.
    #[inline(always)]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    /// Tag bit shared by every piece of this side: `8` for Red, `16` for Black.
    #[inline(always)]
    pub const fn tag(self) -> u8 {
        8 + ((self as u8) << 3)
    }

    /// Name of this side, as it appears in logs and board diagrams.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Black => "Black",
        }
    }
}

impl Not for Side {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The seven kinds of Xiangqi pieces.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum PieceKind {
    King = 0,
    Advisor = 1,
    Elephant = 2,
    Horse = 3,
    Chariot = 4,
    Cannon = 5,
    Soldier = 6,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 7;

    /// Every piece kind, in ascending order.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        use PieceKind::*;
        [King, Advisor, Elephant, Horse, Chariot, Cannon, Soldier]
    }

    /// Creates a [`PieceKind`] from its low three bits.
    ///
    /// Returns `None` for `7`, which is not a valid kind.
    #[inline(always)]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        use PieceKind::*;
        Some(match bits & 7 {
            0 => King,
            1 => Advisor,
            2 => Elephant,
            3 => Horse,
            4 => Chariot,
            5 => Cannon,
            6 => Soldier,
            _ => return None,
        })
    }

    /// Index of this kind into per-kind tables.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rough exchange value of this kind, used to order captures.
    #[inline(always)]
    pub const fn value(self) -> i32 {
        match self {
            Self::King => 5,
            Self::Advisor | Self::Elephant => 1,
            Self::Horse | Self::Cannon => 3,
            Self::Chariot => 4,
            Self::Soldier => 2,
        }
    }

    /// How many pieces of this kind each side starts the game with.
    #[inline(always)]
    pub const fn max_count(self) -> usize {
        match self {
            Self::King => 1,
            Self::Soldier => 5,
            _ => 2,
        }
    }

    /// Lowercase FEN character for this kind.
    #[inline(always)]
    pub const fn char(self) -> char {
        match self {
            Self::King => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'b',
            Self::Horse => 'n',
            Self::Chariot => 'r',
            Self::Cannon => 'c',
            Self::Soldier => 'p',
        }
    }

    /// Parses a FEN character, in either case.
    ///
    /// Both the Western (`n`/`b`) and traditional (`h`/`e`) letters are accepted for Horse and Elephant.
    #[inline(always)]
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c.to_ascii_lowercase() {
            'k' => Self::King,
            'a' => Self::Advisor,
            'b' | 'e' => Self::Elephant,
            'n' | 'h' => Self::Horse,
            'r' => Self::Chariot,
            'c' => Self::Cannon,
            'p' => Self::Soldier,
            _ => return None,
        })
    }
}

/// A piece on the board, encoded as `side tag + kind`.
///
/// The empty square is [`Piece::NONE`] (code `0`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Piece(u8);

impl Piece {
    /// No piece.
    pub const NONE: Self = Self(0);

    /// Creates a new [`Piece`] of the provided side and kind.
    #[inline(always)]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self(side.tag() + kind as u8)
    }

    /// Raw piece code.
    #[inline(always)]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Returns `true` if this is [`Piece::NONE`].
    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if this piece belongs to `side`.
    #[inline(always)]
    pub const fn is_side(self, side: Side) -> bool {
        (self.0 & side.tag()) != 0
    }

    /// The side this piece belongs to, if it is not empty.
    #[inline(always)]
    pub const fn side(self) -> Option<Side> {
        if self.is_side(Side::Red) {
            Some(Side::Red)
        } else if self.is_side(Side::Black) {
            Some(Side::Black)
        } else {
            None
        }
    }

    /// The kind of this piece, if it is not empty.
    #[inline(always)]
    pub const fn kind(self) -> Option<PieceKind> {
        if self.is_empty() {
            None
        } else {
            PieceKind::from_bits(self.0)
        }
    }

    /// Index of this piece into the Zobrist piece table: Red kinds are `0..=6`, Black kinds are `7..=13`.
    #[inline(always)]
    pub const fn zobrist_index(self) -> usize {
        let kind = (self.0 & 7) as usize;
        if self.is_side(Side::Red) {
            kind
        } else {
            kind + PieceKind::COUNT
        }
    }

    /// FEN character of this piece: uppercase for Red, lowercase for Black, `.` for empty.
    #[inline(always)]
    pub const fn char(self) -> char {
        match (self.side(), self.kind()) {
            (Some(Side::Red), Some(kind)) => kind.char().to_ascii_uppercase(),
            (Some(Side::Black), Some(kind)) => kind.char(),
            _ => '.',
        }
    }

    /// Parses a FEN character: uppercase for Red, lowercase for Black.
    #[inline(always)]
    pub const fn from_char(c: char) -> Option<Self> {
        let Some(kind) = PieceKind::from_char(c) else {
            return None;
        };

        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };

        Some(Self::new(side, kind))
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => match Self::from_char(c) {
                Some(piece) => Ok(piece),
                None => bail!("Invalid piece character {c:?}"),
            },
            _ => bail!("Pieces must be a single character, got {s:?}"),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.side(), self.kind()) {
            (Some(side), Some(kind)) => write!(f, "{side} {kind:?}"),
            _ => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_codes() {
        let red_king = Piece::new(Side::Red, PieceKind::King);
        let black_soldier = Piece::new(Side::Black, PieceKind::Soldier);

        assert_eq!(red_king.code(), 8);
        assert_eq!(black_soldier.code(), 22);
        assert!(red_king.is_side(Side::Red));
        assert!(!red_king.is_side(Side::Black));
        assert!(black_soldier.is_side(Side::Black));
        assert_eq!(black_soldier.kind(), Some(PieceKind::Soldier));
        assert_eq!(Piece::NONE.side(), None);
        assert_eq!(Piece::NONE.kind(), None);
    }

    #[test]
    fn test_zobrist_indices_are_distinct() {
        let mut seen = [false; 14];
        for side in [Side::Red, Side::Black] {
            for kind in PieceKind::all() {
                let index = Piece::new(side, kind).zobrist_index();
                assert!(!seen[index], "{index} used twice");
                seen[index] = true;
            }
        }
    }

    #[test]
    fn test_piece_chars() {
        for side in [Side::Red, Side::Black] {
            for kind in PieceKind::all() {
                let piece = Piece::new(side, kind);
                assert_eq!(Piece::from_char(piece.char()), Some(piece));
            }
        }

        assert_eq!("H".parse::<Piece>().unwrap(), Piece::new(Side::Red, PieceKind::Horse));
        assert!("x".parse::<Piece>().is_err());
    }
}
