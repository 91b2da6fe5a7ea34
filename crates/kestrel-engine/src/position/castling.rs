//! Castling rights and castling geometry.

use kestrel_core::{Color, Square};

/// The four castling rights packed into 4 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

/// Rights kept after a move touches a square, indexed by square.
///
/// Only the king and rook home squares clear anything; every other entry
/// keeps all four bits.
const KEEP_ON_TOUCH: [u8; 64] = {
    let mut keep = [0b1111u8; 64];
    keep[Square::A1.index() as usize] = !CastlingRights::WHITE_QUEENSIDE & 0b1111;
    keep[Square::E1.index() as usize] =
        !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE) & 0b1111;
    keep[Square::H1.index() as usize] = !CastlingRights::WHITE_KINGSIDE & 0b1111;
    keep[Square::A8.index() as usize] = !CastlingRights::BLACK_QUEENSIDE & 0b1111;
    keep[Square::E8.index() as usize] =
        !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE) & 0b1111;
    keep[Square::H8.index() as usize] = !CastlingRights::BLACK_KINGSIDE & 0b1111;
    keep
};

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    /// Parses the FEN castling field ("KQkq", "-", or any subset).
    pub fn from_fen(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |flags, c| {
            flags
                | match c {
                    'K' => Self::WHITE_KINGSIDE,
                    'Q' => Self::WHITE_QUEENSIDE,
                    'k' => Self::BLACK_KINGSIDE,
                    'q' => Self::BLACK_QUEENSIDE,
                    _ => 0,
                }
        });
        CastlingRights(flags)
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        (self.0 & flag) != 0
    }

    /// Rights remaining after a move from `from` to `to`.
    ///
    /// A king leaving its home square or anything leaving or landing on a
    /// rook corner clears the matching bits.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(
            self.0 & KEEP_ON_TOUCH[from.index() as usize] & KEEP_ON_TOUCH[to.index() as usize],
        )
    }

    /// Returns the subset of `flags` held.
    #[inline]
    pub const fn intersect(self, flags: u8) -> Self {
        CastlingRights(self.0 & flags)
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// FEN castling field.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ]
        .iter()
        .filter(|(flag, _)| self.0 & flag != 0)
        .map(|(_, c)| *c)
        .collect()
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
#[inline]
pub(crate) const fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.index() {
        6 => (Square::H1, Square::F1),
        2 => (Square::A1, Square::D1),
        62 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castling_rights() {
        let rights = CastlingRights::ALL;
        assert!(rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_queenside(Color::Black));

        let rights = rights.after_move(Square::H1, Square::H1);
        assert!(!rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_queenside(Color::White));
    }

    #[test]
    fn king_move_clears_both_sides() {
        let rights = CastlingRights::ALL.after_move(Square::E8, Square::F8);
        assert!(!rights.can_castle_kingside(Color::Black));
        assert!(!rights.can_castle_queenside(Color::Black));
        assert!(rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_queenside(Color::White));
    }

    #[test]
    fn capture_on_corner_clears_victim_right() {
        let b7 = Square::from_algebraic("b7").unwrap();
        let rights = CastlingRights::ALL.after_move(b7, Square::A8);
        assert!(!rights.can_castle_queenside(Color::Black));
        assert!(rights.can_castle_kingside(Color::Black));
        assert_eq!(rights.raw(), 0b0111);
    }

    #[test]
    fn unrelated_squares_keep_rights() {
        let e2 = Square::from_algebraic("e2").unwrap();
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(CastlingRights::ALL.after_move(e2, e4), CastlingRights::ALL);
    }

    #[test]
    fn fen_field_roundtrip() {
        for field in ["KQkq", "Kq", "-", "k", "KQ"] {
            assert_eq!(CastlingRights::from_fen(field).to_fen(), field);
        }
        assert_eq!(CastlingRights::from_fen("-"), CastlingRights::NONE);
        assert_eq!(CastlingRights::from_fen("qkQK"), CastlingRights::ALL);
    }

    #[test]
    fn castling_rooks() {
        assert_eq!(castling_rook_squares(Square::G1), (Square::H1, Square::F1));
        assert_eq!(castling_rook_squares(Square::C1), (Square::A1, Square::D1));
        assert_eq!(castling_rook_squares(Square::G8), (Square::H8, Square::F8));
        assert_eq!(castling_rook_squares(Square::C8), (Square::A8, Square::D8));
    }
}
