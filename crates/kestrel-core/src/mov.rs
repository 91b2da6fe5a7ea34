//! Move representation.

use crate::{Piece, Square};
use std::fmt;

/// The 4-bit move kind stored in the top bits of a [`Move`].
///
/// Bit 2 marks captures and bit 3 marks promotions, so the capture-promotion
/// variants are the plain promotions with the capture bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Non-capturing move with no side effects.
    Quiet = 0,
    /// Pawn push of two squares from its start rank.
    DoublePush = 1,
    /// Kingside castling (O-O).
    CastleKingside = 2,
    /// Queenside castling (O-O-O).
    CastleQueenside = 3,
    /// Ordinary capture on the destination square.
    Capture = 4,
    /// En passant capture.
    EnPassant = 5,
    PromoteKnight = 8,
    PromoteBishop = 9,
    PromoteRook = 10,
    PromoteQueen = 11,
    PromoteKnightCapture = 12,
    PromoteBishopCapture = 13,
    PromoteRookCapture = 14,
    PromoteQueenCapture = 15,
}

impl MoveFlag {
    const CAPTURE_BIT: u8 = 0b0100;
    const PROMOTION_BIT: u8 = 0b1000;

    /// Decodes a 4-bit flag value. Values 6 and 7 are unused.
    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(MoveFlag::Quiet),
            1 => Some(MoveFlag::DoublePush),
            2 => Some(MoveFlag::CastleKingside),
            3 => Some(MoveFlag::CastleQueenside),
            4 => Some(MoveFlag::Capture),
            5 => Some(MoveFlag::EnPassant),
            8 => Some(MoveFlag::PromoteKnight),
            9 => Some(MoveFlag::PromoteBishop),
            10 => Some(MoveFlag::PromoteRook),
            11 => Some(MoveFlag::PromoteQueen),
            12 => Some(MoveFlag::PromoteKnightCapture),
            13 => Some(MoveFlag::PromoteBishopCapture),
            14 => Some(MoveFlag::PromoteRookCapture),
            15 => Some(MoveFlag::PromoteQueenCapture),
            _ => None,
        }
    }

    /// Returns the promotion flag for `piece`, with or without capture.
    ///
    /// Returns `None` for pawns and kings.
    #[inline]
    pub const fn promotion(piece: Piece, capture: bool) -> Option<Self> {
        let base = match piece {
            Piece::Knight => 8,
            Piece::Bishop => 9,
            Piece::Rook => 10,
            Piece::Queen => 11,
            Piece::Pawn | Piece::King => return None,
        };
        let bits = if capture { base | Self::CAPTURE_BIT } else { base };
        Self::from_bits(bits)
    }

    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        if !self.is_promotion() {
            return None;
        }
        match self as u8 & 0b11 {
            0 => Some(Piece::Knight),
            1 => Some(Piece::Bishop),
            2 => Some(Piece::Rook),
            _ => Some(Piece::Queen),
        }
    }

    /// Returns true for every capturing flag, including en passant.
    #[inline]
    pub const fn is_capture(self) -> bool {
        self as u8 & Self::CAPTURE_BIT != 0
    }

    /// Returns true if this is a promotion move.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        self as u8 & Self::PROMOTION_BIT != 0
    }

    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// A move.
///
/// Encoded compactly: 6 bits from, 6 bits to, 4 bits flag = 16 bits total.
/// The all-zero value is [`Move::NULL`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(u16);

impl Move {
    /// The "no move" sentinel.
    pub const NULL: Move = Move(0);

    /// Creates a new move.
    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        let encoded = (from.index() as u16) | ((to.index() as u16) << 6) | ((flag as u16) << 12);
        Move(encoded)
    }

    /// Creates a quiet move.
    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Quiet)
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_wrapping(self.0 as u8)
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_wrapping((self.0 >> 6) as u8)
    }

    /// Returns the move flag.
    #[inline]
    pub const fn flag(self) -> MoveFlag {
        match MoveFlag::from_bits((self.0 >> 12) as u8) {
            Some(flag) => flag,
            None => MoveFlag::Quiet,
        }
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_capture(self) -> bool {
        self.flag().is_capture()
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.flag().is_promotion()
    }

    /// Returns the raw 16-bit encoding.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q").
    ///
    /// The null move renders as "0000".
    pub fn to_uci(self) -> String {
        if self.is_null() {
            return "0000".to_string();
        }
        match self.flag().promotion_piece() {
            Some(piece) => format!("{}{}{}", self.from(), self.to(), piece.to_lower_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses a move from UCI notation.
    ///
    /// The result carries only what the text says: quiet or a non-capturing
    /// promotion. Captures, castling and en passant depend on the board, so
    /// positions infer the real flag when applying external moves.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let flag = match s[4..].chars().next() {
            Some(c) => MoveFlag::promotion(Piece::from_promotion_char(c)?, false)?,
            None => MoveFlag::Quiet,
        };
        Some(Move::new(from, to, flag))
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
