//! Core value types for the kestrel engine.
//!
//! This crate provides the fundamental types shared by move generation and search:
//! - [`Color`], [`Piece`] and the packed 4-bit [`ColoredPiece`]
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] and [`MoveFlag`], the 16-bit move encoding
//! - FEN field parsing and validation

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveFlag};
pub use piece::{ColoredPiece, Piece};
pub use square::{File, Rank, Square};
