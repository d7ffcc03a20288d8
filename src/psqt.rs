/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Piece, PieceKind, Side, Square};

/// Number of files on the playing area.
const FILES: usize = 9;

/// Number of ranks on the playing area.
const RANKS: usize = 10;

// Tables are written from Red's point of view: the first row is Black's back rank,
// the last row is Red's. Material is folded into every entry.

#[rustfmt::skip]
const KING: Psqt = Psqt::new([
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  1,  1,  1,  0,  0,  0,
     0,  0,  0,  2,  2,  2,  0,  0,  0,
     0,  0,  0, 11, 15, 11,  0,  0,  0,
]);

#[rustfmt::skip]
const ADVISOR: Psqt = Psqt::new([
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0, 20,  0, 20,  0,  0,  0,
     0,  0,  0,  0, 23,  0,  0,  0,  0,
     0,  0,  0, 20,  0, 20,  0,  0,  0,
]);

#[rustfmt::skip]
const ELEPHANT: Psqt = Psqt::new([
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0, 20,  0,  0,  0, 20,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
    18,  0,  0,  0, 23,  0,  0,  0, 18,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0, 20,  0,  0,  0, 20,  0,  0,
]);

#[rustfmt::skip]
const HORSE: Psqt = Psqt::new([
    90, 90, 90, 96, 90, 96, 90, 90, 90,
    90, 96,103, 97, 94, 97,103, 96, 90,
    92, 98, 99,103, 99,103, 99, 98, 92,
    93,108,100,107,100,107,100,108, 93,
    90,100, 99,103,104,103, 99,100, 90,
    90, 98,101,102,103,102,101, 98, 90,
    92, 94, 98, 95, 98, 95, 98, 94, 92,
    93, 92, 94, 95, 92, 95, 94, 92, 93,
    85, 90, 92, 93, 78, 93, 92, 90, 85,
    88, 85, 90, 88, 90, 88, 90, 85, 88,
]);

#[rustfmt::skip]
const CHARIOT: Psqt = Psqt::new([
    206,208,207,213,214,213,207,208,206,
    206,212,209,216,233,216,209,212,206,
    206,208,207,214,216,214,207,208,206,
    206,213,213,216,216,216,213,213,206,
    208,211,211,214,215,214,211,211,208,
    208,212,212,214,215,214,212,212,208,
    204,209,204,212,214,212,204,209,204,
    198,208,204,212,212,212,204,208,198,
    200,208,206,212,200,212,206,208,200,
    194,206,204,212,200,212,204,206,194,
]);

#[rustfmt::skip]
const CANNON: Psqt = Psqt::new([
    100,100, 96, 91, 90, 91, 96,100,100,
     98, 98, 96, 92, 89, 92, 96, 98, 98,
     97, 97, 96, 91, 92, 91, 96, 97, 97,
     96, 99, 99, 98,100, 98, 99, 99, 96,
     96, 96, 96, 96,100, 96, 96, 96, 96,
     95, 96, 99, 96,100, 96, 99, 96, 95,
     96, 96, 96, 96, 96, 96, 96, 96, 96,
     97, 96,100, 99,101, 99,100, 96, 97,
     96, 97, 98, 98, 98, 98, 98, 97, 96,
     96, 96, 97, 99, 99, 99, 97, 96, 96,
]);

#[rustfmt::skip]
const SOLDIER: Psqt = Psqt::new([
     9,  9,  9, 11, 13, 11,  9,  9,  9,
    19, 24, 34, 42, 44, 42, 34, 24, 19,
    19, 24, 32, 37, 37, 37, 32, 24, 19,
    19, 23, 27, 29, 30, 29, 27, 23, 19,
    14, 18, 20, 27, 29, 27, 20, 18, 14,
     7,  0, 13,  0, 16,  0, 13,  0,  7,
     7,  0,  7,  0, 15,  0,  7,  0,  7,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
     0,  0,  0,  0,  0,  0,  0,  0,  0,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Stored over the full 16x16 grid so it can be indexed directly by [`Square::index`].
#[derive(Debug)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Fetch the Piece-Square Table value for `piece` at `square`.
    ///
    /// Black pieces read the table rotated 180 degrees, so both sides see it from their own end.
    #[inline(always)]
    pub fn eval(piece: Piece, square: Square) -> i32 {
        let (Some(side), Some(kind)) = (piece.side(), piece.kind()) else {
            return 0;
        };

        Self::get_table_for(kind).get_relative(square, side)
    }

    /// Fetch the Piece-Square Table for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_table_for(kind: PieceKind) -> &'static Self {
        match kind {
            PieceKind::King => &KING,
            PieceKind::Advisor => &ADVISOR,
            PieceKind::Elephant => &ELEPHANT,
            PieceKind::Horse => &HORSE,
            PieceKind::Chariot => &CHARIOT,
            PieceKind::Cannon => &CANNON,
            PieceKind::Soldier => &SOLDIER,
        }
    }

    /// Spreads a 9x10 table over the 16x16 grid.
    const fn new(psqt: [i32; FILES * RANKS]) -> Self {
        let mut grid = [0; Square::COUNT];

        let mut i = 0;
        while i < psqt.len() {
            let file = Square::FILE_LEFT + (i % FILES) as u8;
            let rank = Square::RANK_TOP + (i / FILES) as u8;
            grid[Square::new(file, rank).index()] = psqt[i];
            i += 1;
        }

        Self(grid)
    }

    /// Get the value of this PSQT at the provided square, from Red's point of view.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `side`.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, side: Side) -> i32 {
        match side {
            Side::Red => self.get(square),
            Side::Black => self.get(square.flip()),
        }
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] displays it the way it is written in the code (Red's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let side = if f.alternate() { Side::Black } else { Side::Red };

        for rank in Square::RANK_TOP..=Square::RANK_BOTTOM {
            write!(f, "{}| ", Square::RANK_BOTTOM - rank)?;
            for file in Square::FILE_LEFT..=Square::FILE_RIGHT {
                let value = self.get_relative(Square::new(file, rank), side);
                write!(f, "{value:3} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..FILES {
            write!(f, "----")?;
        }
        write!(f, "\n   ")?;
        for file in 'a'..='i' {
            write!(f, "{file}   ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_is_correct_for_sides() {
        for square in Square::iter() {
            for kind in PieceKind::all() {
                let red = Psqt::eval(Piece::new(Side::Red, kind), square);
                let black = Psqt::eval(Piece::new(Side::Black, kind), square.flip());
                assert_eq!(red, black, "{kind:?} on {square}: {red} (red) != {black} (black)");
            }
        }
    }

    #[test]
    fn test_padding_is_zero() {
        for index in 0..=u8::MAX {
            let square = Square::from_index(index);
            if !square.is_on_board() {
                for kind in PieceKind::all() {
                    assert_eq!(Psqt::get_table_for(kind).get(square), 0);
                }
            }
        }
    }

    #[test]
    fn test_known_values() {
        // Red Chariot in its corner, Black Chariot in its corner
        let a0 = Square::from_iccs(0, 0);
        let i9 = Square::from_iccs(8, 9);
        assert_eq!(Psqt::eval(Piece::new(Side::Red, PieceKind::Chariot), a0), 194);
        assert_eq!(Psqt::eval(Piece::new(Side::Black, PieceKind::Chariot), i9), 194);

        // Central Red Soldier that has crossed the river
        let e5 = Square::from_iccs(4, 5);
        assert_eq!(Psqt::eval(Piece::new(Side::Red, PieceKind::Soldier), e5), 29);
    }
}
