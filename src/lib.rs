/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation, move generation, and hashing.
mod board;

/// Opening book lookup.
mod book;

/// Command-line arguments and the text commands the engine understands.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of Xiangqi positions.
mod eval;

/// Game flow: playing moves, asking the engine for one, and deciding when the game is over.
mod game;

/// History and killer heuristics for move ordering.
mod history;

/// Ordering of moves during search.
mod movepicker;

/// Piece-Square tables.
mod psqt;

/// Scores of positions, including mate and perpetual-check scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Transposition table.
mod ttable;

/// Tunable constants of the evaluation and search.
mod tune;

pub use board::*;
pub use book::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use game::*;
pub use history::*;
pub use movepicker::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use ttable::*;
