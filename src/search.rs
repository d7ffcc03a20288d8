/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    ops::Neg,
    time::{Duration, Instant},
};

use rand::{RngCore, SeedableRng};

use crate::{
    tune, Bound, HistoryTable, KillerTable, Move, MovePicker, OpeningBook, Position, Rc4, Score,
    TTable,
};

/// Maximum number of plies from the root that can be searched.
pub const LIMIT_DEPTH: usize = 64;

/// Bounds within an alpha-beta search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBounds {
    /// Lower bound.
    ///
    /// We are guaranteed a score that is AT LEAST `alpha`.
    /// During search, if no move can raise `alpha`, we are said to have "failed low."
    pub alpha: Score,

    /// Upper bound.
    ///
    /// Our opponent is guaranteed a score that is AT MOST `beta`.
    /// During search, if a move scores higher than `beta`, we are said to have "failed high."
    pub beta: Score,
}

impl SearchBounds {
    /// Create a new [`SearchBounds`] from the provided `alpha` and `beta` values.
    #[inline(always)]
    pub const fn new(alpha: Score, beta: Score) -> Self {
        Self { alpha, beta }
    }

    /// Create a "null window" around `alpha`.
    #[inline(always)]
    fn null_alpha(self) -> Self {
        Self::new(self.alpha, self.alpha + 1)
    }

    /// Create a "null window" around `beta`.
    #[inline(always)]
    fn null_beta(self) -> Self {
        Self::new(self.beta - 1, self.beta)
    }
}

impl Neg for SearchBounds {
    type Output = Self;
    /// Negating a [`SearchBounds`] swaps the `alpha` and `beta` fields and negates them both.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self {
            alpha: -self.beta,
            beta: -self.alpha,
        }
    }
}

impl Default for SearchBounds {
    /// Default [`SearchBounds`] are `(-MATE, MATE)`.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Score::ALPHA, Score::BETA)
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search, or `None` if there were no legal moves.
    pub bestmove: Option<Move>,

    /// Evaluation of the position, from the side-to-move's perspective.
    pub score: Score,

    /// The deepest iteration that completed.
    pub depth: usize,

    /// Whether `bestmove` came straight from the opening book.
    pub from_book: bool,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: Score::ALPHA,
            depth: 0,
            from_book: false,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: usize,

    /// Soft limit on search time.
    ///
    /// Checked between iterations of iterative deepening: once exceeded, no deeper iteration
    /// is started. The iteration in progress always runs to completion.
    pub soft_timeout: Duration,

    /// Size of the transposition table, in megabytes.
    pub hash_size: usize,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: LIMIT_DEPTH,
            soft_timeout: Duration::from_millis(tune::soft_timeout_ms!()),
            hash_size: TTable::DEFAULT_SIZE,
        }
    }
}

/// Tables and counters a search reads and writes, owned by the caller.
///
/// Everything here is reset at the start of every [`Search::start`], so results only depend
/// on the position searched (and the random jitter applied at the root).
#[derive(Debug)]
pub struct SearchContext {
    /// Transposition table used to cache information during search.
    pub ttable: TTable,

    /// Storage for moves that were best in previous nodes.
    pub history: HistoryTable,

    /// Quiet moves that were best in sibling nodes, per ply.
    pub killers: KillerTable,

    /// Source of randomness for root jitter and book sampling.
    pub rng: Rc4,

    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found at the root so far.
    pub best_move: Move,
}

impl SearchContext {
    /// Creates a context with a transposition table of `hash_size` megabytes.
    pub fn new(hash_size: usize) -> Self {
        Self {
            ttable: TTable::new(hash_size),
            history: HistoryTable::default(),
            killers: KillerTable::default(),
            rng: Rc4::new(),
            nodes: 0,
            best_move: Move::NULL,
        }
    }

    /// Forgets everything learned by previous searches, and reseeds the random generator.
    pub fn clear(&mut self) {
        self.ttable.clear();
        self.history.clear();
        self.killers.clear();
        self.rng = Rc4::from_rng(&mut rand::rng());
        self.nodes = 0;
        self.best_move = Move::NULL;
    }
}

impl Default for SearchContext {
    #[inline(always)]
    fn default() -> Self {
        Self::new(TTable::DEFAULT_SIZE)
    }
}

/// Executes a search on a Xiangqi position.
///
/// Moves are made and unmade on the position in place; every successful
/// [`Position::make_move`] is matched by exactly one [`Position::undo_make_move`] before the
/// node that made it returns, so the position is unchanged once the search is over.
pub struct Search<'a> {
    /// The position to search on.
    position: &'a mut Position,

    /// Tables shared by every node of the search.
    ctx: &'a mut SearchContext,

    /// Opening book consulted before searching, if any.
    book: Option<&'a OpeningBook>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute.
    #[inline(always)]
    pub fn new(
        position: &'a mut Position,
        ctx: &'a mut SearchContext,
        config: SearchConfig,
    ) -> Self {
        Self {
            position,
            ctx,
            book: None,
            config,
        }
    }

    /// Consult `book` before searching.
    #[inline(always)]
    pub fn with_book(mut self, book: &'a OpeningBook) -> Self {
        self.book = Some(book);
        self
    }

    /// Start the search, returning a [`SearchResult`].
    ///
    /// This is the entrypoint of the search. The tables are cleared and the opening book is
    /// tried first. A position with a single legal move is answered without searching.
    pub fn start(mut self) -> SearchResult {
        let starttime = Instant::now();

        self.ctx.clear();
        self.position.reset_distance();

        log::debug!("Starting search on {:?}", self.position.to_fen());
        log::debug!(
            "Max depth := {}, soft timeout := {}ms",
            self.config.max_depth,
            self.config.soft_timeout.as_millis()
        );

        if let Some(mv) = self.book_move() {
            log::info!("Playing book move {mv}");
            return SearchResult {
                bestmove: Some(mv),
                score: Score::DRAW,
                from_book: true,
                ..Default::default()
            };
        }

        let moves = self.position.legal_moves();
        match moves.as_slice() {
            [] => {
                log::debug!("No legal moves in {:?}", self.position.to_fen());
                SearchResult {
                    score: Score::mated_in(0),
                    ..Default::default()
                }
            }

            [only] => {
                log::debug!("Only one legal move: {only}");
                SearchResult {
                    bestmove: Some(*only),
                    score: self.position.evaluate(),
                    ..Default::default()
                }
            }

            _ => self.iterative_deepening(starttime),
        }
    }

    /// Fetches a move from the opening book, if it is legal and does not walk into a repetition.
    fn book_move(&mut self) -> Option<Move> {
        let mv = self.book?.probe(self.position, &mut self.ctx.rng)?;

        if !self.position.make_move(mv) {
            return None;
        }
        let repeats = self.position.repetition_status(3).is_repetition();
        self.position.undo_make_move();

        (!repeats).then_some(mv)
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) (ID) on the Search's position.
    ///
    /// ID is a basic time management strategy for engines.
    /// It involves performing a search at depth `n`, then, if there is enough time remaining, performing a search at depth `n + 1`.
    /// Results of each iteration seed the move ordering of the next through the transposition, history, and killer tables.
    ///
    /// After each iteration, we stop if a decisive score was found or if we've exceeded our `soft_timeout`.
    fn iterative_deepening(&mut self, starttime: Instant) -> SearchResult {
        let mut result = SearchResult::default();
        let max_depth = self.config.max_depth.clamp(1, LIMIT_DEPTH);

        /****************************************************************************************************
         * Iterative Deepening: https://www.chessprogramming.org/Iterative_Deepening
         ****************************************************************************************************/
        for depth in 1..=max_depth {
            let score = self.search_root(depth as i32);

            result.score = score;
            result.depth = depth;
            result.bestmove = Some(self.ctx.best_move).filter(|mv| !mv.is_null());
            result.nodes = self.ctx.nodes;

            let elapsed = starttime.elapsed();
            log::info!(
                "depth {depth} score {score:?} nodes {} nps {} time {}ms bestmove {}",
                result.nodes,
                (result.nodes as f32 / elapsed.as_secs_f32().max(f32::EPSILON)).trunc(),
                elapsed.as_millis(),
                self.ctx.best_move,
            );

            if score.is_decisive() {
                log::debug!("Decisive score {score:?} found at depth {depth}");
                break;
            }

            if elapsed > self.config.soft_timeout {
                log::debug!(
                    "Soft timeout of {}ms exceeded after depth {depth}",
                    self.config.soft_timeout.as_millis()
                );
                break;
            }
        }

        result
    }

    /// Search of the root node.
    ///
    /// Like [`Search::negamax`], but it always tracks the best move in the context, and it adds a
    /// small random amount to non-decisive scores so equal moves are not always chosen the same way.
    fn search_root(&mut self, depth: i32) -> Score {
        let mut best = Score::ALPHA;

        let picker = MovePicker::for_main_search(
            self.position,
            self.position.generate_moves(false),
            self.ctx.best_move,
            self.ctx.killers.get(0),
            &self.ctx.history,
        );

        for (mv, _) in picker {
            if !self.position.make_move(mv) {
                continue;
            }

            let new_depth = self.new_depth(depth);

            let score = if best == Score::ALPHA {
                -self.negamax(SearchBounds::default(), new_depth, true)
            } else {
                let score = -self.negamax(-SearchBounds::new(best, best + 1), new_depth, false);
                if score > best {
                    -self.negamax(-SearchBounds::new(best, Score::BETA), new_depth, true)
                } else {
                    score
                }
            };

            self.position.undo_make_move();

            if score > best {
                best = score;
                self.ctx.best_move = mv;

                if !best.is_decisive() {
                    best += self.jitter();
                }
            }
        }

        let bestmove = self.ctx.best_move;
        self.ctx
            .ttable
            .record(self.position, Bound::Exact, best, depth, bestmove);
        self.set_best_move(bestmove, depth);

        best
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm in a [fail soft](https://www.chessprogramming.org/Alpha-Beta#Negamax_Framework) framework.
    fn negamax(&mut self, mut bounds: SearchBounds, depth: i32, no_null: bool) -> Score {
        /****************************************************************************************************
         * Quiescence Search: https://www.chessprogramming.org/Quiescence_Search
         ****************************************************************************************************/
        if depth <= 0 {
            return self.quiescence(bounds);
        }

        self.ctx.nodes += 1;

        let repetition = self.position.repetition_status(1);
        if repetition.is_repetition() {
            return self.position.repetition_score(repetition);
        }

        if self.position.distance() >= LIMIT_DEPTH {
            return self.position.evaluate();
        }

        /****************************************************************************************************
         * TT Cutoffs: https://www.chessprogramming.org/Transposition_Table#Transposition_Table_Cutoffs
         *
         * If we've already evaluated this position before at a higher depth, we can avoid re-doing a lot of
         * work by just returning the evaluation stored in the transposition table.
         ****************************************************************************************************/
        let (tt_score, hash_move) =
            self.ctx
                .ttable
                .probe(self.position, bounds.alpha, bounds.beta, depth);
        if let Some(score) = tt_score {
            return score;
        }

        /****************************************************************************************************
         * Null Move Pruning: https://www.chessprogramming.org/Null_Move_Pruning
         *
         * If we can afford to skip our turn and give our opponent two moves in a row while maintaining a high
         * enough score, we can prune this branch as our opponent would likely never let us reach it anyway.
         ****************************************************************************************************/
        if !no_null && !self.position.in_check() && self.position.null_okay() {
            self.position.null_move();
            let null_depth = depth - tune::null_depth!() - 1;
            let score = -self.negamax(-bounds.null_beta(), null_depth, true);
            self.position.undo_null_move();

            if score >= bounds.beta {
                return score;
            }
        }

        let picker = MovePicker::for_main_search(
            self.position,
            self.position.generate_moves(false),
            hash_move,
            self.ctx.killers.get(self.position.distance()),
            &self.ctx.history,
        );

        let mut bound = Bound::Upper;
        let mut best = Score::ALPHA;
        let mut bestmove = Move::NULL;

        /****************************************************************************************************
         * Primary move loop
         ****************************************************************************************************/
        for (mv, _) in picker {
            // Moves that leave our King in check are rejected here
            if !self.position.make_move(mv) {
                continue;
            }

            let new_depth = self.new_depth(depth);

            /****************************************************************************************************
             * Principal Variation Search: https://en.wikipedia.org/wiki/Principal_variation_search#Pseudocode
             *
             * We assume our move ordering is so good that the first move searched is the best available. So,
             * for every other move, we search with a null window and thus prune nodes easier. If we find
             * something that beats the null window, we have to do a costly re-search.
             ****************************************************************************************************/
            let score = if best == Score::ALPHA {
                -self.negamax(-bounds, new_depth, false)
            } else {
                let score = -self.negamax(-bounds.null_alpha(), new_depth, false);
                if score > bounds.alpha && score < bounds.beta {
                    -self.negamax(-bounds, new_depth, false)
                } else {
                    score
                }
            };

            self.position.undo_make_move();

            /****************************************************************************************************
             * Score evaluation & bounds adjustments
             ****************************************************************************************************/
            if score > best {
                best = score;

                // Fail high
                if score >= bounds.beta {
                    bound = Bound::Lower;
                    bestmove = mv;
                    break;
                }

                // PV found
                if score > bounds.alpha {
                    bound = Bound::Exact;
                    bestmove = mv;
                    bounds.alpha = score;
                }
            }
        }

        // Every move left our King in check
        if best == Score::ALPHA {
            return Score::mated_in(self.position.distance());
        }

        // Save this node to the TTable
        self.ctx
            .ttable
            .record(self.position, bound, best, depth, bestmove);

        if !bestmove.is_null() {
            self.set_best_move(bestmove, depth);
        }

        best
    }

    /// Quiescence Search (QSearch)
    ///
    /// A search that looks at only captures, or at every move when in check, so that positions are only
    /// evaluated once they are quiet. Has no depth limit other than [`LIMIT_DEPTH`].
    fn quiescence(&mut self, mut bounds: SearchBounds) -> Score {
        self.ctx.nodes += 1;

        let repetition = self.position.repetition_status(1);
        if repetition.is_repetition() {
            return self.position.repetition_score(repetition);
        }

        if self.position.distance() >= LIMIT_DEPTH {
            return self.position.evaluate();
        }

        let mut best = Score::ALPHA;

        let picker = if self.position.in_check() {
            // Every evasion must be considered to know whether we're mated
            MovePicker::for_evasions(self.position.generate_moves(false), &self.ctx.history)
        } else {
            // Evaluate the current position, to serve as our baseline
            let stand_pat = self.position.evaluate();
            if stand_pat > best {
                best = stand_pat;

                // Beta cutoff; this position is "too good" and our opponent would never let us get here
                if stand_pat >= bounds.beta {
                    return stand_pat;
                }
                if stand_pat > bounds.alpha {
                    bounds.alpha = stand_pat;
                }
            }

            MovePicker::for_captures(self.position, self.position.generate_moves(true))
        };

        for (mv, _) in picker {
            if !self.position.make_move(mv) {
                continue;
            }

            let score = -self.quiescence(-bounds);
            self.position.undo_make_move();

            if score > best {
                best = score;

                if score >= bounds.beta {
                    return score;
                }
                if score > bounds.alpha {
                    bounds.alpha = score;
                }
            }
        }

        if best == Score::ALPHA {
            Score::mated_in(self.position.distance())
        } else {
            best
        }
    }

    /****************************************************************************************************
     * Check Extensions: https://www.chessprogramming.org/Check_Extensions
     *
     * A move that gives check is searched to the same depth, so forcing lines are not cut short.
     ****************************************************************************************************/
    #[inline(always)]
    fn new_depth(&self, depth: i32) -> i32 {
        if self.position.in_check() {
            depth
        } else {
            depth - 1
        }
    }

    /// Rewards `mv` for being best at the current ply, if it is a quiet move.
    ///
    /// Must be called with `mv` unmade, so its destination tells whether it captures.
    #[inline(always)]
    fn set_best_move(&mut self, mv: Move, depth: i32) {
        if mv.is_null() || !self.position.piece_at(mv.dst()).is_empty() {
            return;
        }

        self.ctx.history.update(mv, depth);
        self.ctx.killers.update(self.position.distance(), mv);
    }

    /// A small random offset in `[-RANDOM_MASK, RANDOM_MASK]`.
    #[inline(always)]
    fn jitter(&mut self) -> i32 {
        let up = self.ctx.rng.next_u32() & tune::random_mask!();
        let down = self.ctx.rng.next_u32() & tune::random_mask!();
        up as i32 - down as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BookEntry;

    fn run_search(position: &mut Position, config: SearchConfig) -> (SearchResult, SearchContext) {
        let mut ctx = SearchContext::new(1);
        let result = Search::new(position, &mut ctx, config).start();
        (result, ctx)
    }

    fn config(max_depth: usize) -> SearchConfig {
        SearchConfig {
            max_depth,
            soft_timeout: Duration::from_secs(60),
            hash_size: 1,
        }
    }

    #[test]
    fn test_bounds_negation() {
        let bounds = SearchBounds::new(Score::new(-50), Score::new(80));
        assert_eq!(-bounds, SearchBounds::new(Score::new(-80), Score::new(50)));
        assert_eq!(-SearchBounds::default(), SearchBounds::default());
        assert_eq!(bounds.null_alpha(), SearchBounds::new(Score::new(-50), Score::new(-49)));
        assert_eq!(bounds.null_beta(), SearchBounds::new(Score::new(79), Score::new(80)));
    }

    #[test]
    fn test_red_mate_in_1() {
        // Either Chariot move to the d-file or the back rank mates
        let mut pos = Position::from_fen("3k5/R8/9/9/9/9/9/9/9/1R2K4 w - - 0 1").unwrap();
        let before = pos.clone();

        let (res, _) = run_search(&mut pos, config(4));
        assert_eq!(res.score, Score::MATE - 1, "{res:#?}");
        assert_eq!(res.depth, 1);
        assert_eq!(pos, before, "Search must leave the position unchanged");

        let mv = res.bestmove.unwrap();
        assert!(pos.make_move(mv));
        assert!(pos.is_mate());
    }

    #[test]
    fn test_mated_side_has_no_move() {
        let mut pos = Position::from_fen("3k5/R8/9/9/9/9/9/9/9/3RK4 b - - 0 1").unwrap();
        let (res, _) = run_search(&mut pos, config(4));
        assert_eq!(res.bestmove, None);
        assert!(res.score.is_mate());
    }

    #[test]
    fn test_single_legal_move_skips_search() {
        // The Black Chariot on e5 keeps the Red King off the e-file
        let mut pos = Position::from_fen("3k5/9/9/9/4r4/9/9/9/9/5K3 w - - 0 1").unwrap();
        let (res, ctx) = run_search(&mut pos, config(8));

        assert_eq!(res.bestmove, Some(Move::from_iccs("f0f1").unwrap()));
        assert_eq!(res.nodes, 0);
        assert_eq!(ctx.ttable.num_entries(), 0);
    }

    #[test]
    fn test_takes_hanging_chariot() {
        let mut pos = Position::from_fen("5k3/9/9/9/9/4r4/9/9/9/3KR4 w - - 0 1").unwrap();
        let (res, ctx) = run_search(&mut pos, config(3));

        assert_eq!(res.bestmove, Some(Move::from_iccs("e0e4").unwrap()));
        assert!(res.score > Score::new(100));
        assert!(ctx.ttable.num_entries() > 0);
    }

    #[test]
    fn test_book_move_is_played() {
        let mut pos = Position::startpos();
        let mv = Move::from_iccs("h2e2").unwrap();
        let book = OpeningBook::from_entries([BookEntry {
            lock: pos.key().lock1(),
            mv,
            weight: 1,
        }]);

        let mut ctx = SearchContext::new(1);
        let res = Search::new(&mut pos, &mut ctx, config(4))
            .with_book(&book)
            .start();

        assert!(res.from_book);
        assert_eq!(res.bestmove, Some(mv));
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn test_depth_limit_is_respected() {
        let mut pos = Position::startpos();
        let (res, _) = run_search(&mut pos, config(2));

        assert_eq!(res.depth, 2);
        let mv = res.bestmove.unwrap();
        assert!(pos.legal_moves().contains(&mv));
    }
}
