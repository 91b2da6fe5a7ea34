//! FEN output, UCI move input and a printable board.

use super::Position;
use kestrel_core::{Move, MoveFlag, Piece, Square};
use std::fmt;
use thiserror::Error;

/// Errors from turning UCI move text into a [`Move`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("no piece on {0}")]
    EmptySquare(String),

    #[error("piece on {0} belongs to the side not to move")]
    WrongSide(String),
}

impl Position {
    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8u8).rev() {
            let mut empty_count = 0;
            for file in 0..8u8 {
                let square = Square::from_index_wrapping(rank * 8 + file);
                match self.piece_at(square).to_fen_char() {
                    Some(c) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(c);
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let en_passant = self
            .en_passant_square()
            .map_or_else(|| "-".to_string(), |square| square.to_algebraic());

        format!(
            "{} {} {} {} {} {}",
            fen,
            self.side_to_move.to_fen_char(),
            self.castling_rights().to_fen(),
            en_passant,
            self.halfmove_clock(),
            self.fullmove_number()
        )
    }

    /// Reads a UCI move ("e2e4", "e7e8q") and infers its flag from the board.
    ///
    /// Only the notation and the moving piece are checked. Whether the move is
    /// legal is the caller's responsibility; applying an illegal move leaves
    /// the position in an unspecified state.
    pub fn parse_uci_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        let parsed =
            Move::from_uci(uci).ok_or_else(|| MoveParseError::InvalidNotation(uci.to_string()))?;
        let from = parsed.from();
        let to = parsed.to();

        let moving = self.piece_at(from);
        let Some(piece) = moving.piece() else {
            return Err(MoveParseError::EmptySquare(from.to_algebraic()));
        };
        if moving.color() != self.side_to_move {
            return Err(MoveParseError::WrongSide(from.to_algebraic()));
        }

        let capture = !self.piece_at(to).is_none();
        let file_distance = (from.file().index() as i8 - to.file().index() as i8).abs();
        let rank_distance = (from.rank().index() as i8 - to.rank().index() as i8).abs();

        let flag = if let Some(promotion) = parsed.flag().promotion_piece() {
            MoveFlag::promotion(promotion, capture)
                .ok_or_else(|| MoveParseError::InvalidNotation(uci.to_string()))?
        } else if piece == Piece::King && file_distance == 2 {
            if to.file().index() > from.file().index() {
                MoveFlag::CastleKingside
            } else {
                MoveFlag::CastleQueenside
            }
        } else if piece == Piece::Pawn && rank_distance == 2 {
            MoveFlag::DoublePush
        } else if piece == Piece::Pawn && file_distance == 1 && !capture {
            MoveFlag::EnPassant
        } else if capture {
            MoveFlag::Capture
        } else {
            MoveFlag::Quiet
        };

        Ok(Move::new(from, to, flag))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let square = Square::from_index_wrapping(rank * 8 + file);
                write!(f, "{} ", self.piece_at(square).to_fen_char().unwrap_or('.'))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}
