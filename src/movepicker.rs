/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use arrayvec::ArrayVec;

use crate::{HistoryTable, Move, MoveList, PieceKind, Position, MAX_NUM_MOVES};

/// Ordering score of the transposition table's move.
const HASH_MOVE_SCORE: i32 = i32::MAX;

/// Ordering score of the newest killer.
const KILLER_1_SCORE: i32 = i32::MAX - 1;

/// Ordering score of the older killer.
const KILLER_2_SCORE: i32 = i32::MAX - 2;

/// Added to the MVV-LVA score of every capture, so captures are tried before any quiet move.
const CAPTURE_BASE_SCORE: i32 = 1 << 24;

/// Lazily sorts a list of moves by a score, yielding the highest-scored move first.
///
/// Selection sort is used since a cutoff usually happens within the first few moves,
/// so sorting the whole list up front is wasted work.
pub struct MovePicker {
    moves: MoveList,
    scores: ArrayVec<i32, MAX_NUM_MOVES>,
    current: usize,
}

impl MovePicker {
    /// Scores every move with `score_fn`.
    pub fn new(moves: MoveList, score_fn: impl Fn(Move) -> i32) -> Self {
        let scores = moves.iter().map(|&mv| score_fn(mv)).collect();

        Self {
            moves,
            scores,
            current: 0,
        }
    }

    /// Orders moves for a full-width node: hash move, killers, captures by MVV-LVA, then
    /// quiet moves by history.
    pub fn for_main_search(
        position: &Position,
        moves: MoveList,
        hash_move: Move,
        killers: [Move; 2],
        history: &HistoryTable,
    ) -> Self {
        Self::new(moves, |mv| {
            if mv == hash_move {
                HASH_MOVE_SCORE
            } else if mv == killers[0] {
                KILLER_1_SCORE
            } else if mv == killers[1] {
                KILLER_2_SCORE
            } else if !position.piece_at(mv.dst()).is_empty() {
                CAPTURE_BASE_SCORE + mvv_lva(position, mv)
            } else {
                history[mv].clamp(0, CAPTURE_BASE_SCORE - 1)
            }
        })
    }

    /// Orders captures by MVV-LVA alone.
    pub fn for_captures(position: &Position, moves: MoveList) -> Self {
        Self::new(moves, |mv| mvv_lva(position, mv))
    }

    /// Orders moves by history alone, for check evasions in quiescence.
    pub fn for_evasions(moves: MoveList, history: &HistoryTable) -> Self {
        Self::new(moves, |mv| history[mv])
    }
}

impl Iterator for MovePicker {
    type Item = (Move, i32);

    fn next(&mut self) -> Option<Self::Item> {
        // No more moves left
        if self.current >= self.moves.len() {
            return None;
        }

        // Fetch the current best
        let mut best_index = self.current;
        let mut best_score = self.scores[best_index];

        // Find the index of the next highest score
        for i in (self.current + 1)..self.moves.len() {
            if self.scores[i] > best_score {
                best_index = i;
                best_score = self.scores[i];
            }
        }

        // Swap, if necessary
        if best_index != self.current {
            self.moves.swap(self.current, best_index);
            self.scores.swap(self.current, best_index);
        }

        // Get the move/score at this index
        let mv = self.moves[self.current];
        let score = self.scores[self.current];

        // Increment for next call
        self.current += 1;

        Some((mv, score))
    }
}

/// [MVV-LVA](https://www.chessprogramming.org/MVV-LVA) score of `mv`.
///
/// The victim's value dominates (it is scaled by 8), and the attacker's value breaks ties,
/// so a Soldier taking a Chariot is tried before a Chariot taking a Chariot.
#[inline(always)]
pub fn mvv_lva(position: &Position, mv: Move) -> i32 {
    let value = |kind: Option<PieceKind>| kind.map_or(0, PieceKind::value);
    let victim = value(position.piece_at(mv.dst()).kind());
    let attacker = value(position.piece_at(mv.src()).kind());

    (victim << 3) - attacker
}
