/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};

use super::Square;

/// Upper bound on the number of pseudo-legal moves in any Xiangqi position.
pub const MAX_NUM_MOVES: usize = 128;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// A move from one square to another.
///
/// Encoded as `src | dst << 8`, so every move fits in 16 bits and can index a 65 536-entry table.
/// Captures are not flagged; they are determined by whatever occupies `dst` when the move is made.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    /// The null move. Never legal on the board; used as "no move" in tables.
    pub const NULL: Self = Self(0);

    /// Creates a new [`Move`] from `src` to `dst`.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::{Move, Square};
    /// let mv = Move::new(Square::from_iccs(7, 2), Square::from_iccs(4, 2));
    /// assert_eq!(mv.to_string(), "h2e2");
    /// ```
    #[inline(always)]
    pub const fn new(src: Square, dst: Square) -> Self {
        Self(src.index() as u16 | ((dst.index() as u16) << 8))
    }

    /// Creates a [`Move`] from its raw 16-bit encoding.
    #[inline(always)]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw 16-bit encoding of this move.
    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Index of this move into a 65 536-entry table.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The square this move starts on.
    #[inline(always)]
    pub const fn src(self) -> Square {
        Square::from_index((self.0 & 0xff) as u8)
    }

    /// The square this move ends on.
    #[inline(always)]
    pub const fn dst(self) -> Square {
        Square::from_index((self.0 >> 8) as u8)
    }

    /// Returns `true` if this is [`Move::NULL`].
    #[inline(always)]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Reflects both endpoints of this move left-to-right.
    #[inline(always)]
    pub const fn mirror(self) -> Self {
        Self::new(self.src().mirror(), self.dst().mirror())
    }

    /// Parses a move in ICCS coordinate notation, such as `h2e2`.
    ///
    /// A hyphen between the squares (`h2-e2`) is accepted as well.
    pub fn from_iccs(iccs: &str) -> Result<Self> {
        let iccs = iccs.trim();
        let (src, dst) = match iccs.len() {
            4 => (&iccs[..2], &iccs[2..]),
            5 => iccs
                .split_once('-')
                .ok_or_else(|| anyhow!("Invalid move {iccs:?}: expected a hyphen separator"))?,
            _ => bail!("Invalid move {iccs:?}: expected ICCS coordinates like \"h2e2\""),
        };

        let src: Square = src.parse().context("Failed to parse source square")?;
        let dst: Square = dst.parse().context("Failed to parse destination square")?;

        Ok(Self::new(src, dst))
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iccs(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "0000")
        } else {
            write!(f, "{}{}", self.src(), self.dst())
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({:#06x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_encoding() {
        let src = Square::from_iccs(1, 0);
        let dst = Square::from_iccs(2, 2);
        let mv = Move::new(src, dst);

        assert_eq!(mv.src(), src);
        assert_eq!(mv.dst(), dst);
        assert_eq!(mv.bits(), src.index() as u16 | (dst.index() as u16) << 8);
        assert!(!mv.is_null());
        assert!(Move::NULL.is_null());
    }

    #[test]
    fn test_move_parsing() {
        let mv: Move = "h2e2".parse().unwrap();
        assert_eq!(mv.src(), Square::from_iccs(7, 2));
        assert_eq!(mv.dst(), Square::from_iccs(4, 2));
        assert_eq!(Move::from_iccs("h2-e2").unwrap(), mv);

        assert!(Move::from_iccs("h2e").is_err());
        assert!(Move::from_iccs("z2e2").is_err());
        assert_eq!(Move::NULL.to_string(), "0000");
    }

    #[test]
    fn test_move_mirror() {
        let mv = Move::from_iccs("h2e2").unwrap();
        assert_eq!(mv.mirror().to_string(), "b2e2");
        assert_eq!(mv.mirror().mirror(), mv);
    }
}
