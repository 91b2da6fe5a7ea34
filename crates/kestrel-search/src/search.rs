//! Iterative-deepening principal variation search.
//!
//! Each iteration runs a negamax alpha-beta search inside an aspiration
//! window around the previous score. Inside the tree:
//!
//! - nodes in check are searched one ply deeper
//! - repetitions, the fifty-move rule and dead positions score as draws
//! - the transposition table supplies cutoffs and the first move to try
//! - the first move gets the full window, later ones a null window, and late
//!   quiet moves are also searched shallower; a reduced search that beats alpha is
//!   re-searched at full depth and width
//! - at the horizon a capture-only quiescence search settles exchanges
//!
//! The clock is polled at every node. Once the budget is spent and a
//! completed iteration has produced a move, the search unwinds and reports
//! that iteration's result.

use crate::config::SearchConfig;
use crate::eval::{Evaluator, PieceSquareEvaluator};
use crate::ordering::MoveOrderer;
use crate::tt::{Bound, TranspositionTable};
use kestrel_core::Move;
use kestrel_engine::{generate_captures, generate_moves, Position};
use std::time::{Duration, Instant};

/// Score of being checkmated at the root. A mate `n` plies away scores
/// `MATE - n` for the winner.
pub const MATE: i32 = 100_000;

/// Bound outside every reachable score.
pub const INFINITY: i32 = MATE + 1;

/// Deepest ply the search recurses to.
pub const MAX_PLY: usize = 128;

/// Scores at least this far from zero are mate scores.
pub const MATE_THRESHOLD: i32 = MATE - MAX_PLY as i32;

/// Returns true if `score` announces a forced mate for either side.
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

/// Plies until mate for a mate score, `None` otherwise.
#[inline]
pub fn mate_in_plies(score: i32) -> Option<u32> {
    is_mate_score(score).then(|| (MATE - score.abs()) as u32)
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move of the last completed iteration; [`Move::NULL`] when the
    /// side to move has no legal move.
    pub best_move: Move,
    /// Score of `best_move` from the side to move's perspective.
    pub score: i32,
    /// Depth of the last completed iteration.
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Principal variation read back from the transposition table, starting
    /// with `best_move`.
    pub pv: Vec<Move>,
}

/// Search state kept between searches: the transposition table and the
/// ordering heuristics.
pub struct Searcher<E = PieceSquareEvaluator> {
    evaluator: E,
    config: SearchConfig,
    tt: TranspositionTable,
    orderer: MoveOrderer,
    nodes: u64,
    start: Instant,
    budget: Option<Duration>,
    stopped: bool,
    /// Result of the last completed iteration.
    best_move: Move,
    best_score: i32,
    /// Best root move of the iteration in progress.
    root_move: Move,
}

impl Searcher<PieceSquareEvaluator> {
    /// Creates a searcher with the stock evaluator.
    pub fn with_config(config: SearchConfig) -> Self {
        Self::new(PieceSquareEvaluator, config)
    }
}

impl Default for Searcher<PieceSquareEvaluator> {
    fn default() -> Self {
        Self::with_config(SearchConfig::default())
    }
}

impl<E: Evaluator> Searcher<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        let tt = TranspositionTable::new(config.hash_size_mb, config.replacement);
        Searcher {
            evaluator,
            config,
            tt,
            orderer: MoveOrderer::new(),
            nodes: 0,
            start: Instant::now(),
            budget: None,
            stopped: false,
            best_move: Move::NULL,
            best_score: 0,
            root_move: Move::NULL,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forgets everything learned from earlier games.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.orderer.reset_killers();
        self.orderer.reset_history();
    }

    /// Searches until `budget` is spent or the configured depth limit is hit.
    ///
    /// The first iteration always completes, so a position with legal moves
    /// always yields one. `position` is restored before returning.
    pub fn search(&mut self, position: &mut Position, budget: Duration) -> SearchResult {
        self.budget = Some(budget);
        self.iterative_deepening(position, self.config.max_depth)
    }

    /// Searches to exactly `depth` plies with no time limit.
    pub fn search_depth(&mut self, position: &mut Position, depth: u32) -> SearchResult {
        self.budget = None;
        self.iterative_deepening(position, depth.min(self.config.max_depth))
    }

    fn iterative_deepening(&mut self, position: &mut Position, max_depth: u32) -> SearchResult {
        self.start = Instant::now();
        self.nodes = 0;
        self.stopped = false;
        self.best_move = Move::NULL;
        self.best_score = 0;
        self.orderer.reset_killers();
        self.orderer.reset_history();

        let root_moves = generate_moves(position);
        if root_moves.is_empty() {
            let score = if position.in_check() { -MATE } else { 0 };
            tracing::info!(score, "No legal moves at the root");
            return self.result(position, score, 0);
        }

        let window = self.config.aspiration_window;
        let step = self.config.aspiration_step;
        let mut alpha = -INFINITY;
        let mut beta = INFINITY;
        let mut fails = 0;
        let mut completed = 0;
        let mut depth = max_depth.clamp(1, 2);

        while depth <= max_depth {
            self.root_move = Move::NULL;
            let score = self.negamax(position, depth as i32, alpha, beta, 0);
            if self.stopped {
                break;
            }

            if alpha < score && score < beta {
                self.best_move = self.root_move;
                self.best_score = score;
                completed = depth;
                tracing::debug!(
                    depth,
                    score,
                    nodes = self.nodes,
                    best = %self.best_move,
                    elapsed_ms = self.start.elapsed().as_millis(),
                    "Iteration complete"
                );

                alpha = score.saturating_sub(window / 2).max(-INFINITY);
                beta = score.saturating_add(window / 2).min(INFINITY);
                fails = 0;
                depth += 1;
            } else {
                fails += 1;
                if score <= alpha {
                    alpha = alpha.saturating_sub(step * fails).max(-INFINITY);
                } else {
                    beta = beta.saturating_add(step * fails).min(INFINITY);
                }
                tracing::trace!(depth, score, alpha, beta, "Aspiration re-search");
            }

            if self.out_of_time() {
                break;
            }
        }

        if self.best_move.is_null() {
            // Only reachable with a zero depth limit
            self.best_move = root_moves[0];
        }

        let result = self.result(position, self.best_score, completed);
        tracing::info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            best = %result.best_move,
            elapsed_ms = result.elapsed.as_millis(),
            "Search finished"
        );
        result
    }

    fn result(&self, position: &mut Position, score: i32, depth: u32) -> SearchResult {
        SearchResult {
            best_move: self.best_move,
            score,
            depth,
            nodes: self.nodes,
            elapsed: self.start.elapsed(),
            pv: self.principal_variation(position, depth.max(1) as usize),
        }
    }

    #[inline]
    fn out_of_time(&self) -> bool {
        self.budget.is_some_and(|budget| self.start.elapsed() > budget)
    }

    /// Polls the clock. Stopping needs a completed iteration to fall back on.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if !self.stopped && !self.best_move.is_null() && self.out_of_time() {
            self.stopped = true;
        }
        self.stopped
    }

    /// Score of a draw at `ply`, seen from the side to move there.
    ///
    /// From the root's point of view every draw is slightly negative, and more
    /// so the further away it is, so an equal position is preferred over a
    /// distant draw and a nearer draw over a farther one.
    #[inline]
    fn draw_score(ply: usize) -> i32 {
        let bias = (ply / 4) as i32;
        if ply % 2 == 0 {
            -bias
        } else {
            bias
        }
    }

    fn negamax(
        &mut self,
        position: &mut Position,
        mut depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: usize,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let root = ply == 0;
        if !root {
            if position.is_draw() {
                return Self::draw_score(ply);
            }
            if ply >= MAX_PLY {
                return self.evaluator.evaluate(position);
            }
        }

        let in_check = position.in_check();
        if in_check {
            depth += 1;
        }
        if depth <= 0 {
            return self.quiescence(position, alpha, beta, ply);
        }

        let key = position.key();
        if !root {
            if let Some(score) = self.tt.probe_score(key, depth, alpha, beta, ply) {
                return score;
            }
        }

        let mut moves = generate_moves(position);
        if moves.is_empty() {
            return if in_check {
                -MATE + ply as i32
            } else {
                Self::draw_score(ply)
            };
        }

        let tt_move = self.tt.best_move(key);
        self.orderer.order(position, moves.as_mut_slice(), tt_move, ply);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::NULL;

        for (index, &m) in moves.iter().enumerate() {
            if self.should_stop() {
                return 0;
            }

            position.make_move(m);
            let score = if index == 0 {
                -self.negamax(position, depth - 1, -beta, -alpha, ply + 1)
            } else {
                let reduction = self.reduction(position, m, index, depth, in_check);
                let mut score =
                    -self.negamax(position, depth - 1 - reduction, -alpha - 1, -alpha, ply + 1);
                if score > alpha && (reduction > 0 || score < beta) {
                    score = -self.negamax(position, depth - 1, -beta, -alpha, ply + 1);
                }
                score
            };
            position.undo_move(m);

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    alpha = score;
                    if root {
                        self.root_move = m;
                    }
                }
            }

            if alpha >= beta {
                self.orderer.store_cutoff(position, m, depth, ply);
                break;
            }
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score <= original_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.tt.store(key, depth, best_score, best_move, bound, ply);

        best_score
    }

    /// Plies to cut from a late quiet move, which has just been made.
    fn reduction(
        &self,
        position: &Position,
        m: Move,
        index: usize,
        depth: i32,
        in_check: bool,
    ) -> i32 {
        if index < self.config.lmr_min_move_index
            || depth < self.config.lmr_min_depth
            || in_check
            || m.is_capture()
            || m.is_promotion()
            || position.in_check()
        {
            return 0;
        }
        let late = (index - self.config.lmr_min_move_index) as i32;
        (1 + late / 6 + depth / 6).min(depth - 2).max(0)
    }

    fn quiescence(
        &mut self,
        position: &mut Position,
        mut alpha: i32,
        beta: i32,
        ply: usize,
    ) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let stand_pat = self.evaluator.evaluate(position);
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if ply >= MAX_PLY {
            return alpha;
        }

        let mut moves = generate_captures(position);
        self.orderer.order(position, moves.as_mut_slice(), Move::NULL, ply);

        for &m in &moves {
            position.make_move(m);
            let score = -self.quiescence(position, -beta, -alpha, ply + 1);
            position.undo_move(m);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return score;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    /// Follows stored best moves from the root while they stay legal.
    fn principal_variation(&self, position: &mut Position, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut next = self.best_move;

        while !next.is_null() && pv.len() < max_len && generate_moves(position).contains(next) {
            position.make_move(next);
            pv.push(next);
            if position.is_repetition() {
                break;
            }
            next = self.tt.best_move(position.key());
        }

        for &m in pv.iter().rev() {
            position.undo_move(m);
        }
        pv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher() -> Searcher {
        Searcher::with_config(SearchConfig {
            hash_size_mb: 4,
            ..SearchConfig::default()
        })
    }

    #[test]
    fn mate_score_helpers() {
        assert!(is_mate_score(MATE - 3));
        assert!(is_mate_score(-MATE + 10));
        assert!(!is_mate_score(900));
        assert_eq!(mate_in_plies(MATE - 3), Some(3));
        assert_eq!(mate_in_plies(-MATE + 4), Some(4));
        assert_eq!(mate_in_plies(250), None);
    }

    #[test]
    fn draw_score_is_negative_for_the_root() {
        for ply in 1..20 {
            let from_root = if ply % 2 == 0 {
                Searcher::<PieceSquareEvaluator>::draw_score(ply)
            } else {
                -Searcher::<PieceSquareEvaluator>::draw_score(ply)
            };
            assert_eq!(from_root, -((ply / 4) as i32));
        }
    }

    #[test]
    fn finds_mate_in_one() {
        let mut position = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1").unwrap();
        let result = searcher().search_depth(&mut position, 3);
        assert_eq!(result.best_move.to_uci(), "d1d8");
        assert_eq!(mate_in_plies(result.score), Some(1));
        assert_eq!(result.pv.first(), Some(&result.best_move));
    }

    #[test]
    fn wins_hanging_queen() {
        let mut position = Position::from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1").unwrap();
        let result = searcher().search_depth(&mut position, 4);
        assert_eq!(result.best_move.to_uci(), "d2d5");
        assert!(result.score > 300);
    }

    #[test]
    fn no_legal_moves_returns_null() {
        let mut mated = Position::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        let result = searcher().search(&mut mated, Duration::from_millis(50));
        assert!(result.best_move.is_null());
        assert_eq!(result.score, -MATE);
        assert!(result.pv.is_empty());

        let mut stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let result = searcher().search(&mut stalemate, Duration::from_millis(50));
        assert!(result.best_move.is_null());
        assert_eq!(result.score, 0);
    }

    #[test]
    fn search_restores_position() {
        let mut position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = position.clone();
        let result = searcher().search_depth(&mut position, 3);
        assert_eq!(position, before);
        assert_eq!(result.depth, 3);
        assert!(result.nodes > 0);
        assert!(generate_moves(&position).contains(result.best_move));
    }

    #[test]
    fn pv_is_a_legal_line() {
        let mut position = Position::startpos();
        let result = searcher().search_depth(&mut position, 4);
        assert!(!result.pv.is_empty());
        assert_eq!(result.pv[0], result.best_move);
        for &m in &result.pv {
            assert!(generate_moves(&position).contains(m));
            position.make_move(m);
        }
    }

    #[test]
    fn closure_evaluator_drives_the_search() {
        // Piece count difference, every piece worth the same
        let evaluator = |position: &Position| {
            let us = position.side_to_move();
            position.colors(us).count() as i32 - position.colors(us.opposite()).count() as i32
        };
        let mut searcher = Searcher::new(
            evaluator,
            SearchConfig {
                hash_size_mb: 1,
                ..SearchConfig::default()
            },
        );
        let mut position = Position::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let result = searcher.search_depth(&mut position, 2);
        assert_eq!(result.best_move.to_uci(), "e4d5");
    }
}
