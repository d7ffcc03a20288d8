/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Index};

use crate::{Move, LIMIT_DEPTH};

/// Number of distinct move encodings.
const NUM_MOVE_ENCODINGS: usize = u16::MAX as usize + 1;

/// Stores bonuses for moves that caused a cutoff or raised alpha during search.
///
/// Indexed directly by the move's encoding, so the same from/to pair shares a counter
/// regardless of which piece made it.
#[derive(Clone)]
pub struct HistoryTable(Box<[i32]>);

impl HistoryTable {
    /// Clear the history table, removing all scores.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|score| *score = 0);
    }

    /// Rewards `mv` for being the best move of a node searched at `depth`.
    ///
    /// The bonus is `depth * depth`, so that results from deep searches dominate.
    #[inline(always)]
    pub fn update(&mut self, mv: Move, depth: i32) {
        let bonus = depth.saturating_mul(depth);
        let score = &mut self.0[mv.index()];
        *score = score.saturating_add(bonus);
    }
}

impl Default for HistoryTable {
    #[inline(always)]
    fn default() -> Self {
        Self(vec![0; NUM_MOVE_ENCODINGS].into_boxed_slice())
    }
}

impl Index<Move> for HistoryTable {
    type Output = i32;
    #[inline(always)]
    fn index(&self, mv: Move) -> &Self::Output {
        &self.0[mv.index()]
    }
}

impl fmt::Debug for HistoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nonzero = self.0.iter().filter(|&&score| score != 0).count();
        f.debug_struct("HistoryTable")
            .field("nonzero", &nonzero)
            .finish()
    }
}

/// Two [killer moves](https://www.chessprogramming.org/Killer_Move) per ply.
///
/// A killer is a quiet move that was best in a sibling node, so it is likely to be good here too.
#[derive(Debug, Clone)]
pub struct KillerTable([[Move; 2]; LIMIT_DEPTH]);

impl KillerTable {
    /// Forget all killers.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Both killers at `ply`, newest first.
    ///
    /// Plies past the end of the table have no killers.
    #[inline(always)]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.0.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    /// Records `mv` as the newest killer at `ply`, demoting the previous one.
    #[inline(always)]
    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(killers) = self.0.get_mut(ply) else {
            return;
        };

        if killers[0] != mv {
            killers[1] = killers[0];
            killers[0] = mv;
        }
    }
}

impl Default for KillerTable {
    #[inline(always)]
    fn default() -> Self {
        Self([[Move::NULL; 2]; LIMIT_DEPTH])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_bonus_is_depth_squared() {
        let mv = Move::from_iccs("h2e2").unwrap();
        let mut history = HistoryTable::default();

        history.update(mv, 3);
        assert_eq!(history[mv], 9);

        history.update(mv, 2);
        assert_eq!(history[mv], 13);

        history.clear();
        assert_eq!(history[mv], 0);
    }

    #[test]
    fn test_killers_shift() {
        let a = Move::from_iccs("h2e2").unwrap();
        let b = Move::from_iccs("b0c2").unwrap();
        let mut killers = KillerTable::default();

        killers.update(3, a);
        assert_eq!(killers.get(3), [a, Move::NULL]);

        // Re-recording the newest killer changes nothing
        killers.update(3, a);
        assert_eq!(killers.get(3), [a, Move::NULL]);

        killers.update(3, b);
        assert_eq!(killers.get(3), [b, a]);
        assert_eq!(killers.get(2), [Move::NULL; 2]);

        // Out of range plies are ignored
        killers.update(LIMIT_DEPTH, a);
        assert_eq!(killers.get(LIMIT_DEPTH), [Move::NULL; 2]);
    }
}
