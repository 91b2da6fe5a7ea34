//! Piece types and the packed colored-piece value.

use crate::Color;
use std::fmt;

/// The six piece types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece types in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Returns the index of this piece type (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the piece type for an index (0-5).
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Piece::Pawn),
            1 => Some(Piece::Knight),
            2 => Some(Piece::Bishop),
            3 => Some(Piece::Rook),
            4 => Some(Piece::Queen),
            5 => Some(Piece::King),
            _ => None,
        }
    }

    /// Returns the FEN character for this piece with the given color.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = self.to_lower_char();
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Lowercase letter, as used for UCI promotion suffixes.
    pub const fn to_lower_char(self) -> char {
        match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        }
    }

    /// Parses a FEN character into a piece and color.
    pub const fn from_fen_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, color))
    }

    /// Parses a promotion suffix (`n`, `b`, `r`, `q`, either case).
    pub const fn from_promotion_char(c: char) -> Option<Piece> {
        match c.to_ascii_lowercase() {
            'n' => Some(Piece::Knight),
            'b' => Some(Piece::Bishop),
            'r' => Some(Piece::Rook),
            'q' => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns true if this piece is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A piece type and color packed into 4 bits, or the empty square.
///
/// Bits 0-2 hold the piece type plus one (0 means empty), bit 3 holds the color.
/// This is the value stored in the board's square-indexed mailbox.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColoredPiece(u8);

impl ColoredPiece {
    /// The empty square.
    pub const NONE: ColoredPiece = ColoredPiece(0);

    const TYPE_MASK: u8 = 0b0111;
    const COLOR_BIT: u8 = 0b1000;

    /// Packs a piece type and color.
    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        ColoredPiece((piece as u8 + 1) | ((color as u8) << 3))
    }

    /// Returns true for the empty square.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 & Self::TYPE_MASK == 0
    }

    /// Returns the piece type, or `None` for the empty square.
    #[inline]
    pub const fn piece(self) -> Option<Piece> {
        match self.0 & Self::TYPE_MASK {
            1 => Some(Piece::Pawn),
            2 => Some(Piece::Knight),
            3 => Some(Piece::Bishop),
            4 => Some(Piece::Rook),
            5 => Some(Piece::Queen),
            6 => Some(Piece::King),
            _ => None,
        }
    }

    /// Returns the color. Meaningless for [`ColoredPiece::NONE`].
    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & Self::COLOR_BIT == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Returns true if this is a piece of the given type and color.
    #[inline]
    pub const fn is(self, piece: Piece, color: Color) -> bool {
        self.0 == Self::new(piece, color).0
    }

    /// Dense index 0-11 (`color * 6 + piece`), for tables keyed by colored piece.
    ///
    /// Must not be called on [`ColoredPiece::NONE`].
    #[inline]
    pub const fn index(self) -> usize {
        debug_assert!(!self.is_none());
        let color = (self.0 >> 3) as usize;
        color * 6 + (self.0 & Self::TYPE_MASK) as usize - 1
    }

    /// Raw 4-bit value.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// FEN letter, or `None` for the empty square.
    pub const fn to_fen_char(self) -> Option<char> {
        match self.piece() {
            Some(piece) => Some(piece.to_fen_char(self.color())),
            None => None,
        }
    }
}

impl fmt::Debug for ColoredPiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.piece() {
            Some(piece) => write!(f, "ColoredPiece({} {})", self.color(), piece),
            None => write!(f, "ColoredPiece(none)"),
        }
    }
}
