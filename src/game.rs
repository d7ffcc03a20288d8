/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    tune, Move, OpeningBook, Position, Search, SearchConfig, SearchContext, SearchResult, Square,
};

/// How a game stands, from the perspective of the side that made the last move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Terminal {
    /// The game goes on.
    #[default]
    None,

    /// The last mover won, by mate or by the opponent's perpetual check.
    Win,

    /// The last mover lost by perpetual check.
    Loss,

    /// Drawn, by repetition or by too many moves without a capture.
    Draw,
}

impl Terminal {
    /// Returns `true` if the game is over.
    #[inline(always)]
    pub const fn is_over(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "ongoing",
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Draw => "draw",
        };
        write!(f, "{s}")
    }
}

/// Result of trying to play a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveOutcome {
    /// Whether the move was played.
    pub accepted: bool,

    /// Status of the game afterwards.
    pub status: Terminal,
}

/// A game of Xiangqi: the current position, plus everything the engine needs to move in it.
#[derive(Debug)]
pub struct Game {
    /// The position being played.
    position: Position,

    /// Status as of the last move.
    status: Terminal,

    /// Tables used by the engine's searches.
    ctx: SearchContext,

    /// Book consulted before searching.
    book: OpeningBook,

    /// Limits for the engine's searches.
    config: SearchConfig,
}

impl Game {
    /// Starts a new game from the starting position.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            position: Position::startpos(),
            status: Terminal::None,
            ctx: SearchContext::new(config.hash_size),
            book: OpeningBook::default(),
            config,
        }
    }

    /// Consult `book` for the engine's moves.
    pub fn with_book(mut self, book: OpeningBook) -> Self {
        self.book = book;
        self
    }

    /// Resets to the starting position.
    pub fn new_game(&mut self) {
        self.set_position(Position::startpos());
    }

    /// The position being played.
    #[inline(always)]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Replaces the position being played.
    ///
    /// If the side to move in `position` has no legal moves, the game is already won.
    pub fn set_position(&mut self, mut position: Position) {
        position.reset_distance();
        self.status = if position.is_mate() {
            Terminal::Win
        } else {
            Terminal::None
        };
        self.position = position;
    }

    /// Status of the game, from the perspective of the side that made the last move.
    #[inline(always)]
    pub fn status(&self) -> Terminal {
        self.status
    }

    /// The opening book in use.
    #[inline(always)]
    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    /// Replaces the opening book.
    #[inline(always)]
    pub fn set_book(&mut self, book: OpeningBook) {
        self.book = book;
    }

    /// Limits for the engine's searches.
    #[inline(always)]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Replaces the search limits. A new hash size takes effect immediately.
    pub fn set_config(&mut self, config: SearchConfig) {
        if config.hash_size != self.config.hash_size {
            self.ctx = SearchContext::new(config.hash_size);
        }
        self.config = config;
    }

    /// Tries to move the piece on `src` to `dst`.
    #[inline(always)]
    pub fn attempt_move(&mut self, src: Square, dst: Square) -> MoveOutcome {
        self.play(Move::new(src, dst))
    }

    /// Tries to play `mv`.
    ///
    /// The move is rejected if the game is over, if it is not a legal move for the side to
    /// move, or if it would leave that side's King in check.
    pub fn play(&mut self, mv: Move) -> MoveOutcome {
        let rejected = MoveOutcome {
            accepted: false,
            status: self.status,
        };

        if self.status.is_over() || !self.position.legal_move(mv) || !self.position.make_move(mv)
        {
            return rejected;
        }

        self.position.reset_distance();
        self.status = self.classify();

        // Nothing before a capture can ever repeat
        if !self.status.is_over() && self.position.captured() {
            self.position.reset_history();
        }

        MoveOutcome {
            accepted: true,
            status: self.status,
        }
    }

    /// Searches the current position without playing anything.
    pub fn search(&mut self) -> SearchResult {
        let search = Search::new(&mut self.position, &mut self.ctx, self.config);
        search.with_book(&self.book).start()
    }

    /// Searches the current position and plays the best move found.
    ///
    /// Returns `None` if the game is already over.
    pub fn request_engine_move(&mut self) -> Option<Move> {
        if self.status.is_over() {
            return None;
        }

        let mv = self.search().bestmove?;
        self.play(mv).accepted.then_some(mv)
    }

    /// Works out the status of the game right after a move.
    fn classify(&mut self) -> Terminal {
        // No legal reply, whether in check or not
        if self.position.is_mate() {
            return Terminal::Win;
        }

        // The side now to move is "own"; the last mover is "opp"
        let repetition = self.position.repetition_status(3);
        if repetition.is_repetition() {
            return match (repetition.own_perpetual(), repetition.opp_perpetual()) {
                (true, false) => Terminal::Win,
                (false, true) => Terminal::Loss,
                _ => Terminal::Draw,
            };
        }

        if self.position.history().len() > tune::natural_limit!() {
            return Terminal::Draw;
        }

        Terminal::None
    }
}

impl Default for Game {
    #[inline(always)]
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iccs(s: &str) -> Move {
        Move::from_iccs(s).unwrap()
    }

    fn small_game() -> Game {
        Game::new(SearchConfig {
            max_depth: 4,
            hash_size: 1,
            ..Default::default()
        })
    }

    #[test]
    fn test_illegal_moves_are_rejected() {
        let mut game = small_game();

        // Black piece, while Red is to move
        assert!(!game.play(iccs("h7e7")).accepted);
        // Horse can't move like that
        assert!(!game.play(iccs("b0b2")).accepted);
        assert_eq!(game.position(), &Position::startpos());

        let outcome = game.play(iccs("h2e2"));
        assert!(outcome.accepted);
        assert_eq!(outcome.status, Terminal::None);
    }

    #[test]
    fn test_capture_resets_history() {
        let mut game = small_game();
        assert!(game.play(iccs("h2e2")).accepted);
        assert_eq!(game.position().history().len(), 2);

        // Cannon takes Horse, over the Red Cannon on b2
        assert!(game.play(iccs("b7b0")).accepted);
        assert_eq!(game.position().history().len(), 1);
    }

    #[test]
    fn test_mate_ends_the_game() {
        let mut game = small_game();
        game.set_position(Position::from_fen("3k5/R8/9/9/9/9/9/9/9/1R2K4 w - - 0 1").unwrap());

        let outcome = game.play(iccs("b0d0"));
        assert_eq!(
            outcome,
            MoveOutcome {
                accepted: true,
                status: Terminal::Win
            }
        );

        // Nothing else can be played
        assert!(!game.play(iccs("d9e9")).accepted);
        assert_eq!(game.request_engine_move(), None);

        game.new_game();
        assert_eq!(game.status(), Terminal::None);
    }

    #[test]
    fn test_set_position_without_moves() {
        let mut game = small_game();
        game.set_position(Position::from_fen("3k5/R8/9/9/9/9/9/9/9/3RK4 b - - 0 1").unwrap());
        assert_eq!(game.status(), Terminal::Win);
    }
}
