//! Search for the kestrel engine.
//!
//! This crate provides:
//! - [`Searcher`] - iterative deepening PVS with aspiration windows, late move
//!   reductions, check extensions and quiescence search
//! - [`TranspositionTable`] - two-tier or always-replace result cache
//! - [`MoveOrderer`] - transposition move, MVV-LVA, killer and history ordering
//! - [`Evaluator`] - the static evaluation seam, with [`PieceSquareEvaluator`]
//!   as the stock implementation
//! - [`Engine`] - position, move and search entry points for a protocol layer
//!
//! # Example
//!
//! ```
//! use kestrel_search::Engine;
//!
//! let mut engine = Engine::new();
//! engine.set_position(None).unwrap();
//! engine.play_move("e2e4").unwrap();
//! let result = engine.search_depth(3);
//! assert!(!result.best_move.is_null());
//! println!("bestmove {}", engine.best_move());
//! ```

mod config;
mod engine;
mod error;
mod eval;
mod ordering;
mod search;
mod tt;

pub use config::{ConfigError, ReplacementPolicy, SearchConfig};
pub use engine::{time_budget, Engine};
pub use error::EngineError;
pub use eval::{Evaluator, PieceSquareEvaluator, PIECE_VALUES};
pub use ordering::MoveOrderer;
pub use search::{
    is_mate_score, mate_in_plies, SearchResult, Searcher, INFINITY, MATE, MATE_THRESHOLD, MAX_PLY,
};
pub use tt::{Bound, TranspositionTable, TtEntry};
