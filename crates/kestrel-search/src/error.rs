//! Errors surfaced by the [`Engine`](crate::Engine) facade.

use kestrel_core::FenError;
use kestrel_engine::MoveParseError;
use thiserror::Error;

/// Errors from feeding positions and moves to the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid position: {0}")]
    Fen(#[from] FenError),

    #[error("invalid move: {0}")]
    Move(#[from] MoveParseError),
}
