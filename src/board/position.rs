/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

use super::{
    Move, Piece, PieceKind, Side, Square, ZobristKey, ADVISOR_DELTA, KING_DELTA,
    KNIGHT_CHECK_DELTA,
};
use crate::{tune, Psqt, Score};

/// FEN string of the standard starting position.
pub const FEN_STARTPOS: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1";

/// Everything needed to take back one ply.
///
/// The first frame of a history is a sentinel holding [`Move::NULL`]; null moves push one too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoFrame {
    /// Move that was played (or [`Move::NULL`]).
    pub mv: Move,

    /// Piece that stood on the destination square before the move.
    pub captured: Piece,

    /// Whether the move left the side now to move in check.
    pub check: bool,

    /// Key of the position before the move was played.
    pub key: ZobristKey,
}

/// Result of scanning the move history for repeated positions.
///
/// Bit 0 is set when a repetition was found. Bit 1 is set when every move the side to move
/// made along the repeating cycle gave check, bit 2 when every move its opponent made did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepetitionStatus(u8);

impl RepetitionStatus {
    /// No repetition.
    pub const NONE: Self = Self(0);

    #[inline(always)]
    const fn found(own_perpetual: bool, opp_perpetual: bool) -> Self {
        Self(1 | (own_perpetual as u8) << 1 | (opp_perpetual as u8) << 2)
    }

    /// Raw bitmask.
    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if the position has repeated.
    #[inline(always)]
    pub const fn is_repetition(self) -> bool {
        self.0 != 0
    }

    /// Returns `true` if the side to move has been checking on every move of the cycle.
    #[inline(always)]
    pub const fn own_perpetual(self) -> bool {
        self.0 & 2 != 0
    }

    /// Returns `true` if the opponent has been checking on every move of the cycle.
    #[inline(always)]
    pub const fn opp_perpetual(self) -> bool {
        self.0 & 4 != 0
    }
}

/// A Xiangqi position, with enough history to undo moves and detect repetitions.
///
/// Material and the Zobrist key are maintained incrementally as pieces are added and removed.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    /// Occupant of every grid cell.
    squares: [Piece; Square::COUNT],

    /// Side whose turn it is.
    side_to_move: Side,

    /// Sum of piece-square values for each side, indexed by [`Side::index`].
    material: [i32; Side::COUNT],

    /// Incrementally-updated hash of this position.
    key: ZobristKey,

    /// Plies made since the search root.
    distance: usize,

    /// Frames of every move made since the position last became irreversible.
    history: Vec<UndoFrame>,
}

impl Position {
    /// Creates an empty board with Red to move.
    pub fn empty() -> Self {
        let mut pos = Self {
            squares: [Piece::NONE; Square::COUNT],
            side_to_move: Side::Red,
            material: [0; Side::COUNT],
            key: ZobristKey::default(),
            distance: 0,
            history: Vec::with_capacity(tune::natural_limit!() + 1),
        };
        pos.reset_history();
        pos
    }

    /// Creates the standard starting position.
    ///
    /// # Example
    /// ```
    /// # use xiangqi::*;
    /// let pos = Position::startpos();
    /// assert_eq!(pos.side_to_move(), Side::Red);
    /// assert_eq!(pos.to_fen(), FEN_STARTPOS);
    /// ```
    pub fn startpos() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 9] = [
            Chariot, Horse, Elephant, Advisor, King, Advisor, Elephant, Horse, Chariot,
        ];

        let mut pos = Self::empty();
        for side in [Side::Red, Side::Black] {
            // The setup is symmetric, so Black's half is Red's rotated
            let mut place = |file: u8, rank: u8, kind: PieceKind| {
                let square = Square::from_iccs(file, rank);
                let square = if side == Side::Red { square } else { square.flip() };
                pos.add_piece(square, Piece::new(side, kind));
            };

            for (file, kind) in BACK_RANK.into_iter().enumerate() {
                place(file as u8, 0, kind);
            }
            place(1, 2, Cannon);
            place(7, 2, Cannon);
            for file in (0..9).step_by(2) {
                place(file, 3, Soldier);
            }
        }

        pos.reset_history();
        pos
    }

    /// Parses a position from a FEN string.
    ///
    /// Only the placement and side-to-move fields are read; the rest are optional and ignored.
    /// Either `w` or `r` denotes Red to move.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut parts = fen.split_ascii_whitespace();
        let placements = parts.next().context("FEN string is empty")?;

        let mut pos = Self::empty();
        pos.place_fen_pieces(placements)
            .with_context(|| format!("Invalid placements in FEN {fen:?}"))?;

        for side in [Side::Red, Side::Black] {
            for kind in PieceKind::all() {
                let piece = Piece::new(side, kind);
                let count = Square::iter().filter(|&sq| pos.piece_at(sq) == piece).count();

                if kind == PieceKind::King && count != 1 {
                    bail!("FEN {fen:?} must have exactly one {side} King, found {count}");
                }
                if count > kind.max_count() {
                    bail!(
                        "FEN {fen:?} has {count} {side} {kind:?} pieces, but at most {} are allowed",
                        kind.max_count()
                    );
                }
            }
        }

        match parts.next().unwrap_or("w") {
            "w" | "r" => {}
            "b" => pos.toggle_side(),
            other => bail!("Invalid side to move {other:?} in FEN {fen:?}"),
        }

        pos.reset_history();
        Ok(pos)
    }

    /// Places the pieces of a FEN placement field onto this (empty) board.
    fn place_fen_pieces(&mut self, placements: &str) -> Result<()> {
        let ranks = placements.split('/').collect::<Vec<_>>();
        if ranks.len() != 10 {
            bail!("Expected 10 ranks, found {}", ranks.len());
        }

        for (i, rank_str) in ranks.into_iter().enumerate() {
            let rank = Square::RANK_TOP + i as u8;
            let mut file = Square::FILE_LEFT;

            for c in rank_str.chars() {
                if let Some(empty) = c.to_digit(10) {
                    file = file.saturating_add(empty as u8);
                    continue;
                }

                let piece: Piece = c.to_string().parse()?;
                if file > Square::FILE_RIGHT {
                    bail!("Rank {rank_str:?} has more than 9 files");
                }

                self.add_piece(Square::new(file, rank), piece);
                file += 1;
            }

            if file != Square::FILE_RIGHT + 1 {
                bail!("Rank {rank_str:?} does not describe exactly 9 files");
            }
        }

        Ok(())
    }

    /// Generates a FEN string of this position.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(64);

        for rank in Square::RANK_TOP..=Square::RANK_BOTTOM {
            let mut empty = 0;
            for file in Square::FILE_LEFT..=Square::FILE_RIGHT {
                let piece = self.piece_at(Square::new(file, rank));
                if piece.is_empty() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.char());
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank != Square::RANK_BOTTOM {
                fen.push('/');
            }
        }

        let side = match self.side_to_move {
            Side::Red => 'w',
            Side::Black => 'b',
        };

        format!("{fen} {side} - - 0 1")
    }

    /// Returns a copy of this position reflected left-to-right.
    ///
    /// The history of the copy is reset.
    pub fn mirror(&self) -> Self {
        let mut mirrored = Self::empty();
        for (square, piece) in self.iter() {
            mirrored.add_piece(square.mirror(), piece);
        }
        if self.side_to_move == Side::Black {
            mirrored.toggle_side();
        }
        mirrored.reset_history();
        mirrored
    }

    /// Occupant of `square`, which is [`Piece::NONE`] for empty and off-board squares.
    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Piece {
        self.squares[square.index()]
    }

    /// Iterates over every occupied square and its occupant.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter()
            .map(|sq| (sq, self.piece_at(sq)))
            .filter(|(_, piece)| !piece.is_empty())
    }

    /// Location of `side`'s King, if it is on the board.
    #[inline(always)]
    pub fn king_square(&self, side: Side) -> Option<Square> {
        let king = Piece::new(side, PieceKind::King);
        Square::iter().find(|&sq| self.piece_at(sq) == king)
    }

    /// Side whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Zobrist key of this position.
    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// Sum of piece-square values of `side`'s pieces.
    #[inline(always)]
    pub const fn material(&self, side: Side) -> i32 {
        self.material[side.index()]
    }

    /// Plies made since the search root.
    #[inline(always)]
    pub const fn distance(&self) -> usize {
        self.distance
    }

    /// Marks the current position as the search root.
    #[inline(always)]
    pub fn reset_distance(&mut self) {
        self.distance = 0;
    }

    /// Move history since the position last became irreversible, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[UndoFrame] {
        &self.history
    }

    /// The most recently played move, if any.
    #[inline(always)]
    pub fn last_move(&self) -> Option<Move> {
        self.history
            .last()
            .map(|frame| frame.mv)
            .filter(|mv| !mv.is_null())
    }

    /// Returns `true` if the most recent move captured a piece.
    #[inline(always)]
    pub fn captured(&self) -> bool {
        self.history
            .last()
            .is_some_and(|frame| !frame.captured.is_empty())
    }

    /// Returns `true` if the side to move was put in check by the most recent move.
    ///
    /// This is the cached answer of [`Position::checked`] at the time the move was made.
    #[inline(always)]
    pub fn in_check(&self) -> bool {
        self.history.last().is_some_and(|frame| frame.check)
    }

    /// Places `piece` on `square`, updating material and the key.
    pub fn add_piece(&mut self, square: Square, piece: Piece) {
        let Some(side) = piece.side() else {
            return;
        };

        self.squares[square.index()] = piece;
        self.material[side.index()] += Psqt::eval(piece, square);
        self.key.hash_piece(square, piece);
    }

    /// Removes `piece` from `square`, updating material and the key.
    pub fn remove_piece(&mut self, square: Square, piece: Piece) {
        let Some(side) = piece.side() else {
            return;
        };

        self.squares[square.index()] = Piece::NONE;
        self.material[side.index()] -= Psqt::eval(piece, square);
        self.key.hash_piece(square, piece);
    }

    /// Hands the move to the other side.
    #[inline(always)]
    fn toggle_side(&mut self) {
        self.side_to_move = !self.side_to_move;
        self.key.hash_side_to_move();
    }

    /// Moves a piece without any checks, returning whatever stood on the destination.
    fn move_piece(&mut self, mv: Move) -> Piece {
        let (src, dst) = (mv.src(), mv.dst());

        let captured = self.piece_at(dst);
        self.remove_piece(dst, captured);

        let piece = self.piece_at(src);
        self.remove_piece(src, piece);
        self.add_piece(dst, piece);

        captured
    }

    /// Reverses [`Position::move_piece`].
    fn undo_move_piece(&mut self, mv: Move, captured: Piece) {
        let (src, dst) = (mv.src(), mv.dst());

        let piece = self.piece_at(dst);
        self.remove_piece(dst, piece);
        self.add_piece(src, piece);
        self.add_piece(dst, captured);
    }

    /// Plays `mv`.
    ///
    /// If the move would leave the mover's King in check, the board is restored and `false`
    /// is returned. The move is assumed to be pseudo-legal.
    pub fn make_move(&mut self, mv: Move) -> bool {
        let key = self.key;
        let captured = self.move_piece(mv);
        if self.checked() {
            self.undo_move_piece(mv, captured);
            return false;
        }

        self.toggle_side();
        let check = self.checked();
        self.history.push(UndoFrame {
            mv,
            captured,
            check,
            key,
        });
        self.distance += 1;

        true
    }

    /// Takes back the most recent [`Position::make_move`].
    pub fn undo_make_move(&mut self) {
        // The sentinel frame is never popped
        if self.history.len() <= 1 {
            return;
        }

        if let Some(frame) = self.history.pop() {
            self.distance = self.distance.saturating_sub(1);
            self.toggle_side();
            self.undo_move_piece(frame.mv, frame.captured);
        }
    }

    /// Passes the turn without moving.
    pub fn null_move(&mut self) {
        self.history.push(UndoFrame {
            mv: Move::NULL,
            captured: Piece::NONE,
            check: false,
            key: self.key,
        });
        self.toggle_side();
        self.distance += 1;
    }

    /// Takes back the most recent [`Position::null_move`].
    pub fn undo_null_move(&mut self) {
        if self.history.len() <= 1 {
            return;
        }

        self.history.pop();
        self.distance = self.distance.saturating_sub(1);
        self.toggle_side();
    }

    /// Discards the move history, making the current position irreversible.
    ///
    /// Called after captures, since no earlier position can ever repeat.
    pub fn reset_history(&mut self) {
        let check = self.checked();
        self.history.clear();
        self.history.push(UndoFrame {
            mv: Move::NULL,
            captured: Piece::NONE,
            check,
            key: self.key,
        });
    }

    /// Returns `true` if the side to move's King is attacked.
    ///
    /// Facing Kings count as check, so a move that exposes one King to the other is rejected
    /// by [`Position::make_move`].
    pub fn checked(&self) -> bool {
        let side = self.side_to_move;
        let opp = !side;
        let Some(king) = self.king_square(side) else {
            return false;
        };

        // Soldiers attack forward, and sideways once across the river
        let soldier = Piece::new(opp, PieceKind::Soldier);
        if self.piece_at(king.forward(side)) == soldier
            || self.piece_at(king.offset(-1)) == soldier
            || self.piece_at(king.offset(1)) == soldier
        {
            return true;
        }

        // Horses, unless their leg is blocked
        let horse = Piece::new(opp, PieceKind::Horse);
        for (i, pin) in ADVISOR_DELTA.iter().enumerate() {
            if !self.piece_at(king.offset(*pin)).is_empty() {
                continue;
            }

            if KNIGHT_CHECK_DELTA[i]
                .iter()
                .any(|&delta| self.piece_at(king.offset(delta)) == horse)
            {
                return true;
            }
        }

        // Chariots and the enemy King along open lines; Cannons over exactly one screen
        let chariot = Piece::new(opp, PieceKind::Chariot);
        let cannon = Piece::new(opp, PieceKind::Cannon);
        let opp_king = Piece::new(opp, PieceKind::King);
        for delta in KING_DELTA {
            let mut sq = king.offset(delta);
            while sq.is_on_board() {
                let piece = self.piece_at(sq);
                if !piece.is_empty() {
                    if piece == chariot || piece == opp_king {
                        return true;
                    }
                    break;
                }
                sq = sq.offset(delta);
            }

            sq = sq.offset(delta);
            while sq.is_on_board() {
                let piece = self.piece_at(sq);
                if !piece.is_empty() {
                    if piece == cannon {
                        return true;
                    }
                    break;
                }
                sq = sq.offset(delta);
            }
        }

        false
    }

    /// Returns `true` if the side to move has enough material for null move pruning to be safe.
    #[inline(always)]
    pub fn null_okay(&self) -> bool {
        self.material(self.side_to_move) > tune::null_margin!()
    }

    /// Score of a draw for the side to move.
    ///
    /// Whoever is to move at an even distance from the root pays the contempt.
    #[inline(always)]
    pub fn draw_score(&self) -> Score {
        if self.distance & 1 == 0 {
            Score::new(-tune::draw_value!())
        } else {
            Score::new(tune::draw_value!())
        }
    }

    /// Looks for the current position `required` times earlier in the history.
    ///
    /// Only reversible moves are scanned; a capture or null move ends the search.
    pub fn repetition_status(&self, required: usize) -> RepetitionStatus {
        let mut remaining = required;
        let mut own_side = false;
        let mut own_perpetual = true;
        let mut opp_perpetual = true;

        for frame in self.history.iter().rev() {
            if frame.mv.is_null() || !frame.captured.is_empty() {
                break;
            }

            if own_side {
                own_perpetual &= frame.check;
                if frame.key == self.key {
                    remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        return RepetitionStatus::found(own_perpetual, opp_perpetual);
                    }
                }
            } else {
                opp_perpetual &= frame.check;
            }

            own_side = !own_side;
        }

        RepetitionStatus::NONE
    }

    /// Converts a repetition into a score for the side to move.
    ///
    /// Perpetual check loses for the checking side; any other repetition is a draw.
    pub fn repetition_score(&self, status: RepetitionStatus) -> Score {
        let ban = Score::BAN.inner();
        let distance = self.distance as i32;

        let mut score = 0;
        if status.own_perpetual() {
            score += distance - ban;
        }
        if status.opp_perpetual() {
            score += ban - distance;
        }

        if score == 0 {
            self.draw_score()
        } else {
            Score::new(score)
        }
    }
}

impl Default for Position {
    #[inline(always)]
    fn default() -> Self {
        Self::startpos()
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Position {
    /// Draws the board from Red's side, with Red pieces in uppercase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Square::RANK_TOP..=Square::RANK_BOTTOM {
            write!(f, "{}|", Square::RANK_BOTTOM - rank)?;
            for file in Square::FILE_LEFT..=Square::FILE_RIGHT {
                write!(f, " {}", self.piece_at(Square::new(file, rank)))?;
            }

            if rank == Square::RANK_TOP {
                write!(f, "      Side: {}", self.side_to_move)?;
            } else if rank == Square::RANK_TOP + 1 {
                write!(f, "     Moves: {}", self.history.len().saturating_sub(1))?;
            } else if rank == Square::RANK_TOP + 2 {
                let last = self
                    .last_move()
                    .map(|mv| mv.to_string())
                    .unwrap_or(String::from("-"));
                write!(f, "      Last: {last}")?;
            } else if rank == Square::RANK_TOP + 3 && self.in_check() {
                write!(f, "     Check!")?;
            }
            writeln!(f)?;

            if rank == Square::RANK_TOP + 4 {
                writeln!(f, " |   ~~~~~~ river ~~~~~~")?;
            }
        }

        write!(f, " +")?;
        for _ in Square::FILE_LEFT..=Square::FILE_RIGHT {
            write!(f, "--")?;
        }
        write!(f, "\n  ")?;
        for file in 'a'..='i' {
            write!(f, " {file}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        writeln!(f, "Key: {:?}", self.key)?;
        write!(
            f,
            "Material: {} (Red) {} (Black), distance {}",
            self.material(Side::Red),
            self.material(Side::Black),
            self.distance
        )
    }
}
