//! Board representation and legal move generation for the kestrel engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets with the usual bitwise operations
//! - [`Position`] - mutable game state with incremental make/undo and hashing
//! - [`generate_moves`] / [`generate_captures`] - single-pass legal move generation
//! - [`ZOBRIST`] - the fixed Zobrist key tables
//!
//! # Architecture
//!
//! Each piece type and color has its own bitboard, mirrored by a 64-entry
//! mailbox for direct lookups. Sliding attacks come from magic bitboard tables
//! built once per process; leaper attacks and rays are compile-time tables.
//!
//! # Example
//!
//! ```
//! use kestrel_engine::{generate_moves, Position};
//!
//! let mut position = Position::startpos();
//! let moves = generate_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! let m = position.parse_uci_move("e2e4").unwrap();
//! position.make_move(m);
//! assert_eq!(
//!     position.to_fen(),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
//! );
//! position.undo_move(m);
//! assert_eq!(position, Position::startpos());
//! ```

mod bitboard;
pub mod movegen;
mod position;
mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::{
    bishop_attacks, generate_captures, generate_moves, king_attacks, knight_attacks, line,
    pawn_attacks, queen_attacks, rook_attacks, MoveList,
};
pub use position::{CastlingRights, GameState, MoveParseError, Position};
pub use zobrist::{ZobristKeys, ZOBRIST};
