/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Move generation and legality checks.
mod movegen;

/// A single move, encoded as a pair of squares.
mod moves;

/// Performance testing of move generation.
mod perft;

/// Pieces, their kinds, and the two sides.
mod piece;

/// The board itself, with make/undo and repetition detection.
mod position;

/// Keystream generator used for hashing and randomized choices.
mod prng;

/// Squares on the padded 16x16 grid, and their geometry.
mod square;

/// Zobrist hashing of positions.
mod zobrist;

pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use prng::*;
pub use square::*;
pub use zobrist::*;
