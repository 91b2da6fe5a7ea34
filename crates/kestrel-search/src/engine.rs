//! The entry points a protocol front end drives: load a position, apply the
//! moves played since, search, and read back the chosen move.

use crate::config::SearchConfig;
use crate::error::EngineError;
use crate::eval::{Evaluator, PieceSquareEvaluator};
use crate::search::{SearchResult, Searcher};
use kestrel_core::Move;
use kestrel_engine::Position;
use std::time::Duration;

/// Milliseconds to spend on one move.
///
/// A thirtieth of the remaining time plus half the increment, but never less
/// than 50ms (or a quarter of the remaining time when that is smaller). The
/// overhead is then subtracted, and the result is at least 1ms.
pub fn time_budget(remaining_ms: u64, increment_ms: u64, move_overhead_ms: u64) -> u64 {
    let floor = (remaining_ms / 4).min(50);
    let budget = (remaining_ms / 30 + increment_ms / 2).max(floor);
    budget.saturating_sub(move_overhead_ms).max(1)
}

/// A game in progress plus the searcher that plays it.
pub struct Engine<E = PieceSquareEvaluator> {
    position: Position,
    searcher: Searcher<E>,
    best_move: Move,
}

impl Engine<PieceSquareEvaluator> {
    /// Creates an engine at the starting position with the stock evaluator
    /// and default configuration.
    pub fn new() -> Self {
        Self::with_evaluator(PieceSquareEvaluator, SearchConfig::default())
    }
}

impl Default for Engine<PieceSquareEvaluator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> Engine<E> {
    pub fn with_evaluator(evaluator: E, config: SearchConfig) -> Self {
        Engine {
            position: Position::startpos(),
            searcher: Searcher::new(evaluator, config),
            best_move: Move::NULL,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn searcher(&self) -> &Searcher<E> {
        &self.searcher
    }

    /// Loads a FEN, or the starting position for `None`, and forgets all
    /// search state so entries from an earlier game cannot produce cutoffs.
    ///
    /// On error the current position and search state are kept.
    pub fn set_position(&mut self, fen: Option<&str>) -> Result<(), EngineError> {
        match fen {
            Some(fen) => self.position.set_fen(fen)?,
            None => self.position = Position::startpos(),
        }
        self.searcher.new_game();
        self.best_move = Move::NULL;
        tracing::debug!(fen = %self.position.to_fen(), "Position loaded");
        Ok(())
    }

    /// Applies a move in UCI notation ("e2e4", "e7e8q").
    ///
    /// The move is assumed legal; only its notation and the moving piece are
    /// checked.
    pub fn play_move(&mut self, uci: &str) -> Result<(), EngineError> {
        let m = self.position.parse_uci_move(uci)?;
        self.position.make_move(m);
        Ok(())
    }

    /// Searches the current position for `budget_ms` milliseconds.
    pub fn start_search(&mut self, budget_ms: u64) -> SearchResult {
        let result = self
            .searcher
            .search(&mut self.position, Duration::from_millis(budget_ms));
        self.best_move = result.best_move;
        result
    }

    /// Searches the current position to a fixed depth.
    pub fn search_depth(&mut self, depth: u32) -> SearchResult {
        let result = self.searcher.search_depth(&mut self.position, depth);
        self.best_move = result.best_move;
        result
    }

    /// Searches with a budget derived from the clock, less the configured
    /// move overhead.
    pub fn search_clock(&mut self, remaining_ms: u64, increment_ms: u64) -> SearchResult {
        let overhead = self.searcher.config().move_overhead_ms;
        self.start_search(time_budget(remaining_ms, increment_ms, overhead))
    }

    /// The last search's move in UCI notation; "0000" when there is none.
    pub fn best_move(&self) -> String {
        self.best_move.to_uci()
    }

    /// Resets to the starting position and forgets all search state.
    pub fn new_game(&mut self) {
        self.position = Position::startpos();
        self.searcher.new_game();
        self.best_move = Move::NULL;
        tracing::debug!("New game");
    }
}
