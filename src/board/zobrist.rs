/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, sync::LazyLock};

use rand::RngCore;

use super::{Piece, Rc4, Square};

/// Number of distinct pieces that receive Zobrist keys (7 kinds for each side).
const NUM_HASHED_PIECES: usize = 14;

/// Stores Zobrist hash keys, for hashing [`Position`](super::Position)s.
///
/// Drawn once, on first use, from a zero-keyed [`Rc4`] stream so that keys (and therefore
/// opening book locks) are identical between runs.
static ZOBRIST_TABLE: LazyLock<ZobristHashTable> = LazyLock::new(ZobristHashTable::new);

/// A Zobrist hash of a position.
///
/// `key` selects the transposition table slot while `lock0` and `lock1` verify that a stored
/// entry really belongs to this position. Opening book entries are keyed by `lock1`.
#[derive(Default, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ZobristKey {
    key: u32,
    lock0: u32,
    lock1: u32,
}

impl ZobristKey {
    /// Draws a fresh triple from `rng`, in `key`, `lock0`, `lock1` order.
    #[inline(always)]
    pub fn from_rng(rng: &mut impl RngCore) -> Self {
        let key = rng.next_u32();
        let lock0 = rng.next_u32();
        let lock1 = rng.next_u32();
        Self { key, lock0, lock1 }
    }

    /// Index half of the hash.
    #[inline(always)]
    pub const fn key(&self) -> u32 {
        self.key
    }

    /// First verification word.
    #[inline(always)]
    pub const fn lock0(&self) -> u32 {
        self.lock0
    }

    /// Second verification word; also the opening book lookup key.
    #[inline(always)]
    pub const fn lock1(&self) -> u32 {
        self.lock1
    }

    /// Adds/removes `other` to this [`ZobristKey`].
    ///
    /// This is done internally with the XOR operator, so hashing twice is a no-op.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::*;
    /// let zero = ZobristKey::default();
    /// let mut key = ZobristKey::default();
    ///
    /// key.hash_side_to_move();
    /// assert_ne!(key, zero);
    ///
    /// key.hash_side_to_move();
    /// assert_eq!(key, zero);
    /// ```
    #[inline(always)]
    pub fn hash(&mut self, other: Self) {
        self.key ^= other.key;
        self.lock0 ^= other.lock0;
        self.lock1 ^= other.lock1;
    }

    /// Adds/removes the hash for `piece` standing on `square`.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::*;
    /// let red_horse = Piece::new(Side::Red, PieceKind::Horse);
    /// let black_horse = Piece::new(Side::Black, PieceKind::Horse);
    ///
    /// let mut a = ZobristKey::default();
    /// a.hash_piece(Square::from_iccs(1, 0), red_horse);
    ///
    /// let mut b = ZobristKey::default();
    /// b.hash_piece(Square::from_iccs(1, 0), black_horse);
    /// assert_ne!(a, b);
    /// ```
    #[inline(always)]
    pub fn hash_piece(&mut self, square: Square, piece: Piece) {
        self.hash(ZOBRIST_TABLE.pieces[piece.zobrist_index()][square.index()]);
    }

    /// Adds/removes the hash for a change of side to move.
    #[inline(always)]
    pub fn hash_side_to_move(&mut self) {
        self.hash(ZOBRIST_TABLE.side_to_move);
    }
}

impl fmt::Debug for ZobristKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08x}:{:08x}:{:08x}",
            self.key, self.lock0, self.lock1
        )
    }
}

/// Inner struct for storing the hash keys of every piece on every square.
struct ZobristHashTable {
    side_to_move: ZobristKey,
    pieces: [[ZobristKey; Square::COUNT]; NUM_HASHED_PIECES],
}

impl ZobristHashTable {
    /// Draws the side-to-move key first, then every piece on every grid cell.
    fn new() -> Self {
        let mut rng = Rc4::new();

        let side_to_move = ZobristKey::from_rng(&mut rng);
        let mut pieces = [[ZobristKey::default(); Square::COUNT]; NUM_HASHED_PIECES];
        for table in pieces.iter_mut() {
            for key in table.iter_mut() {
                *key = ZobristKey::from_rng(&mut rng);
            }
        }

        Self {
            side_to_move,
            pieces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, Side};

    #[test]
    fn test_keys_are_deterministic() {
        let a = ZobristHashTable::new();
        let b = ZobristHashTable::new();
        assert_eq!(a.side_to_move, b.side_to_move);
        assert_eq!(a.pieces[3][0x37], b.pieces[3][0x37]);
    }

    #[test]
    fn test_side_to_move_is_first_draw() {
        let mut rng = Rc4::new();
        let expected = ZobristKey::from_rng(&mut rng);
        assert_eq!(ZOBRIST_TABLE.side_to_move, expected);

        // The very next triple belongs to the Red King on grid cell 0
        let next = ZobristKey::from_rng(&mut rng);
        assert_eq!(ZOBRIST_TABLE.pieces[0][0], next);
    }

    #[test]
    fn test_hash_piece_is_reversible() {
        let piece = Piece::new(Side::Black, PieceKind::Cannon);
        let square = Square::from_iccs(7, 7);

        let mut key = ZobristKey::default();
        key.hash_piece(square, piece);
        assert_ne!(key, ZobristKey::default());
        key.hash_piece(square, piece);
        assert_eq!(key, ZobristKey::default());
    }
}
