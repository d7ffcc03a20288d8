/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Move, Position, Score};

/// Number of bytes in a megabyte
const BYTES_IN_MB: usize = 1024 * 1024;

/// What a stored score says about the true value of a node.
///
/// See [CPW](https://www.chessprogramming.org/Node_Types) for more.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Bound {
    /// The score is at most this value (no move raised alpha).
    Upper,

    /// The score is at least this value (a move failed high).
    Lower,

    /// The score is exact.
    Exact,
}

/// An entry into a hash table
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TTableEntry {
    /// Depth at which the data for this entry was found.
    pub depth: u8,

    /// Kind of bound `score` represents.
    pub bound: Bound,

    /// Best score found for this position, with mate scores stored relative to this node.
    pub score: Score,

    /// Best move found for this position.
    pub bestmove: Move,

    /// First verification word of the position's key.
    pub lock0: u32,

    /// Second verification word of the position's key.
    pub lock1: u32,
}

impl TTableEntry {
    /// Returns `true` if this entry was stored for `position`.
    #[inline(always)]
    fn matches(&self, position: &Position) -> bool {
        let key = position.key();
        self.lock0 == key.lock0() && self.lock1 == key.lock1()
    }
}

/// Transposition Table.
///
/// Used during a search to keep track of previous search results on positions,
/// avoiding unnecessary re-computations. Each slot holds one entry, and a new entry
/// only replaces an old one if it was searched at least as deeply.
#[derive(Debug)]
pub struct TTable {
    /// Internal cache of the TTable.
    cache: Vec<Option<TTableEntry>>,
}

impl TTable {
    /// Default size of the Transposition Table, in megabytes.
    pub const DEFAULT_SIZE: usize = 16;

    /// Minimum size of the Transposition Table, in megabytes.
    pub const MIN_SIZE: usize = 1;

    /// Maximum size of the Transposition Table, in megabytes.
    pub const MAX_SIZE: usize = 1_024;

    /// Create a new [`TTable`] that is at most `size` megabytes.
    ///
    /// The number of entries is rounded down to a power of two.
    #[inline(always)]
    pub fn new(size: usize) -> Self {
        let size = size.clamp(Self::MIN_SIZE, Self::MAX_SIZE);
        Self::from_capacity((size * BYTES_IN_MB) / size_of::<Option<TTableEntry>>())
    }

    /// Create a new [`TTable`] that can hold `capacity` entries.
    ///
    /// `capacity` is rounded down to a power of two (and is at least 1), so that indexing is a mask.
    #[inline(always)]
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = match capacity {
            0 => 1,
            n if n.is_power_of_two() => n,
            n => n.next_power_of_two() >> 1,
        };

        Self {
            cache: vec![None; capacity],
        }
    }

    /// Clears the entries of this [`TTable`].
    #[inline(always)]
    pub fn clear(&mut self) {
        self.cache.iter_mut().for_each(|entry| *entry = None);
    }

    /// Returns the number of entries that can fit within this [`TTable`]
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cache.len()
    }

    /// Returns the size of this [`TTable`], in megabytes.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.cache.len() * size_of::<Option<TTableEntry>>() / BYTES_IN_MB
    }

    /// Returns the number of `Some` entries in this [`TTable`].
    #[inline(always)]
    pub fn num_entries(&self) -> usize {
        self.cache.iter().filter(|entry| entry.is_some()).count()
    }

    /// Map `position`'s key to an index into this [`TTable`].
    #[inline(always)]
    pub fn index(&self, position: &Position) -> usize {
        position.key().key() as usize & (self.capacity() - 1)
    }

    /// Get the entry if and only if it was stored for `position`.
    #[inline(always)]
    pub fn get(&self, position: &Position) -> Option<&TTableEntry> {
        self.cache[self.index(position)]
            .as_ref()
            .filter(|entry| entry.matches(position))
    }

    /// Looks up `position`, returning a usable score (if any) and the stored best move.
    ///
    /// The move is [`Move::NULL`] on a miss. A score is returned if and only if:
    ///     1. The score is a mate, which holds at any depth.
    ///     2. The entry is at least `depth` deep, and
    ///         a. is exact, or
    ///         b. is an upper bound whose score is `<= alpha`, or
    ///         c. is a lower bound whose score is `>= beta`.
    ///
    /// Perpetual-check scores depend on how the position was reached, so they only yield a move.
    pub fn probe(
        &self,
        position: &Position,
        alpha: Score,
        beta: Score,
        depth: i32,
    ) -> (Option<Score>, Move) {
        let Some(entry) = self.get(position) else {
            return (None, Move::NULL);
        };

        let mv = entry.bestmove;
        if entry.score.is_ban() {
            return (None, mv);
        }

        let mate = entry.score.is_mate();
        let score = entry.score.absolute(position.distance());
        if !mate && (entry.depth as i32) < depth {
            return (None, mv);
        }

        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
        };

        (usable.then_some(score), mv)
    }

    /// Stores a search result for `position`, unless a deeper result is already in its slot.
    ///
    /// Mate scores are rebased to be relative to `position` so they stay valid at any ply.
    pub fn record(
        &mut self,
        position: &Position,
        bound: Bound,
        score: Score,
        depth: i32,
        bestmove: Move,
    ) {
        let index = self.index(position);
        let depth = depth.clamp(0, u8::MAX as i32) as u8;

        if self.cache[index].is_some_and(|old| old.depth > depth) {
            return;
        }

        if score.is_ban() && bestmove.is_null() {
            return;
        }

        let key = position.key();
        self.cache[index] = Some(TTableEntry {
            depth,
            bound,
            score: score.relative(position.distance()),
            bestmove,
            lock0: key.lock0(),
            lock1: key.lock1(),
        });
    }
}

impl Default for TTable {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn h0g2() -> Move {
        Move::from_iccs("h0g2").unwrap()
    }

    #[test]
    fn test_capacity_is_power_of_two() {
        assert_eq!(TTable::from_capacity(0).capacity(), 1);
        assert_eq!(TTable::from_capacity(1000).capacity(), 512);
        assert_eq!(TTable::from_capacity(1024).capacity(), 1024);
        assert!(TTable::new(1).capacity().is_power_of_two());
        assert_eq!(TTable::new(1).num_entries(), 0);
    }

    #[test]
    fn test_exact_round_trip() {
        let pos = Position::startpos();
        let mut tt = TTable::from_capacity(1024);

        tt.record(&pos, Bound::Exact, Score::new(500), 4, h0g2());
        assert_eq!(tt.num_entries(), 1);

        for depth in 0..=4 {
            let (score, mv) = tt.probe(&pos, Score::new(-1000), Score::new(1000), depth);
            assert_eq!(score, Some(Score::new(500)));
            assert_eq!(mv, h0g2());
        }

        // Too shallow for a deeper request, but the move is still offered
        let (score, mv) = tt.probe(&pos, Score::new(-1000), Score::new(1000), 5);
        assert_eq!(score, None);
        assert_eq!(mv, h0g2());
    }

    #[test]
    fn test_bounds_are_respected() {
        let pos = Position::startpos();
        let mut tt = TTable::from_capacity(1024);

        tt.record(&pos, Bound::Lower, Score::new(300), 3, h0g2());
        assert_eq!(tt.probe(&pos, Score::new(0), Score::new(200), 3).0, Some(Score::new(300)));
        assert_eq!(tt.probe(&pos, Score::new(0), Score::new(400), 3).0, None);

        tt.record(&pos, Bound::Upper, Score::new(-300), 3, Move::NULL);
        assert_eq!(tt.probe(&pos, Score::new(-200), Score::new(0), 3).0, Some(Score::new(-300)));
        assert_eq!(tt.probe(&pos, Score::new(-400), Score::new(0), 3).0, None);
    }

    #[test]
    fn test_shallower_results_do_not_replace() {
        let pos = Position::startpos();
        let mut tt = TTable::from_capacity(1024);

        tt.record(&pos, Bound::Exact, Score::new(100), 6, h0g2());
        tt.record(&pos, Bound::Exact, Score::new(-100), 2, Move::NULL);

        let entry = tt.get(&pos).unwrap();
        assert_eq!(entry.depth, 6);
        assert_eq!(entry.score, Score::new(100));
    }

    #[test]
    fn test_mate_scores_are_rebased() {
        let mut pos = Position::startpos();
        let mut tt = TTable::from_capacity(1024);

        // Found 2 plies from the root: mate 5 plies from the root
        pos.null_move();
        pos.null_move();
        let found = Score::MATE - 5;
        tt.record(&pos, Bound::Exact, found, 1, h0g2());
        assert_eq!(tt.get(&pos).unwrap().score, Score::MATE - 3);

        // Seen again at the root, the same node is mate in 3, even at a greater depth
        pos.reset_distance();
        let (score, _) = tt.probe(&pos, Score::ALPHA, Score::BETA, 10);
        assert_eq!(score, Some(Score::MATE - 3));
    }

    #[test]
    fn test_ban_scores_only_give_moves() {
        let pos = Position::startpos();
        let mut tt = TTable::from_capacity(1024);

        // Never stored without a move
        tt.record(&pos, Bound::Exact, Score::BAN - 4, 3, Move::NULL);
        assert_eq!(tt.num_entries(), 0);

        tt.record(&pos, Bound::Exact, Score::BAN - 4, 3, h0g2());
        assert_eq!(tt.probe(&pos, Score::ALPHA, Score::BETA, 0), (None, h0g2()));
    }

    #[test]
    fn test_collision_is_a_miss() {
        let pos = Position::startpos();
        let mut other = Position::startpos();
        assert!(other.make_move(h0g2()));

        // A single slot, so both positions share it
        let mut tt = TTable::from_capacity(1);
        tt.record(&pos, Bound::Exact, Score::new(42), 1, h0g2());
        assert_eq!(tt.probe(&other, Score::ALPHA, Score::BETA, 0), (None, Move::NULL));
    }
}
