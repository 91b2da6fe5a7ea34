//! FEN (Forsyth-Edwards Notation) field parsing.
//!
//! [`FenParser::parse`] checks the syntax of all six fields and decodes the
//! piece placement. Whether the result is a playable position (one king per
//! side, rights matching the board) is for the position type to decide.

use crate::{Color, Piece, Square};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six fields of a syntactically valid FEN record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// First field as written, e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".
    pub piece_placement: String,
    pub active_color: Color,
    /// "-" or a subset of "KQkq".
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    placed: Vec<(Square, Piece, Color)>,
}

impl FenParser {
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Largest accepted halfmove clock or fullmove number. Keeps ply counts
    /// and clocks far from `u32` overflow for any reachable game length.
    pub const MAX_COUNTER: u32 = u16::MAX as u32;

    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let [placement, color, castling, en_passant, halfmove, fullmove] = fields[..] else {
            return Err(FenError::InvalidPartCount(fields.len()));
        };

        Ok(FenParser {
            piece_placement: placement.to_string(),
            placed: parse_placement(placement)?,
            active_color: parse_color(color)?,
            castling: parse_castling(castling)?.to_string(),
            en_passant: parse_en_passant(en_passant)?,
            halfmove_clock: parse_counter(halfmove)
                .ok_or_else(|| FenError::InvalidHalfmoveClock(halfmove.to_string()))?,
            fullmove_number: parse_counter(fullmove)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(fullmove.to_string()))?,
        })
    }

    /// The placed pieces, rank 8 first and a to h within a rank.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        self.placed.iter().copied()
    }

    /// Half-moves played since the start of the game.
    pub fn ply_count(&self) -> u32 {
        let black = u32::from(self.active_color == Color::Black);
        2 * self.fullmove_number.saturating_sub(1) + black
    }

    pub fn to_fen(&self) -> String {
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), Square::to_algebraic);
        format!(
            "{} {} {} {} {} {}",
            self.piece_placement,
            self.active_color.to_fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for FenParser {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}

fn placement_error(rank: usize, what: impl std::fmt::Display) -> FenError {
    FenError::InvalidPiecePlacement(format!("rank {}: {}", 8 - rank, what))
}

/// Decodes the placement field. Runs of empty squares must be single digits
/// 1-8 and never adjacent, and every rank must cover exactly eight files.
fn parse_placement(placement: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut placed = Vec::with_capacity(32);
    for (row, text) in rows.iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        let mut after_digit = false;

        for c in text.chars() {
            if file >= 8 {
                return Err(placement_error(row, "more than 8 squares"));
            }
            match c.to_digit(10) {
                Some(_) if after_digit => {
                    return Err(placement_error(row, "consecutive digits"));
                }
                Some(run @ 1..=8) => {
                    file += run as u8;
                    after_digit = true;
                }
                _ => {
                    let (piece, color) = Piece::from_fen_char(c)
                        .ok_or_else(|| placement_error(row, format!("invalid character '{c}'")))?;
                    placed.push((Square::from_index_wrapping(rank * 8 + file), piece, color));
                    file += 1;
                    after_digit = false;
                }
            }
        }

        if file != 8 {
            return Err(placement_error(row, format!("{file} squares, expected 8")));
        }
    }
    Ok(placed)
}

fn parse_counter(field: &str) -> Option<u32> {
    field
        .parse::<u32>()
        .ok()
        .filter(|&value| value <= FenParser::MAX_COUNTER)
}

fn parse_color(field: &str) -> Result<Color, FenError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        other => Err(FenError::InvalidActiveColor(other.to_string())),
    }
}

fn parse_castling(field: &str) -> Result<&str, FenError> {
    if field == "-" {
        return Ok(field);
    }
    let mut seen = String::with_capacity(4);
    for c in field.chars() {
        if !"KQkq".contains(c) {
            return Err(FenError::InvalidCastlingRights(format!(
                "invalid character '{c}'"
            )));
        }
        if seen.contains(c) {
            return Err(FenError::InvalidCastlingRights(format!(
                "duplicate '{c}' in {field}"
            )));
        }
        seen.push(c);
    }
    Ok(field)
}

/// The target square must be on the third or sixth rank.
fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(field) {
        Some(square) if matches!(square.rank().index(), 2 | 5) => Ok(Some(square)),
        _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
    }
}
