//! Mutable board state with incremental make/undo.
//!
//! A [`Position`] keeps the same placement in two shapes: twelve piece
//! bitboards (plus per-color and total occupancy) for set queries, and a
//! square-indexed mailbox for "what stands here" lookups. Both are updated
//! together by [`Position::make_move`] and [`Position::undo_move`], along with
//! the Zobrist key. Undo is exact because every move first pushes the
//! irreversible [`GameState`] and any captured piece onto stacks.

mod castling;
mod make;
mod notation;

pub use castling::CastlingRights;
pub(crate) use castling::castling_rook_squares;
pub use notation::MoveParseError;

use crate::movegen::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::zobrist::ZOBRIST;
use crate::Bitboard;
use kestrel_core::{Color, ColoredPiece, FenError, FenParser, File, Piece, Square};
use std::cell::Cell;

/// Initial capacity of the undo stacks; deeper games grow them.
const HISTORY_CAPACITY: usize = 512;

/// The part of a position that a move cannot recompute when undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    pub castling: CastlingRights,
    /// File of the pawn that just made a double push, if any.
    pub en_passant: Option<File>,
    /// Full Zobrist key of the position.
    pub key: u64,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
}

/// Complete game position with undo history.
#[derive(Debug, Clone)]
pub struct Position {
    /// Bitboards indexed by [`ColoredPiece::index`].
    pieces: [Bitboard; 12],
    colors: [Bitboard; 2],
    occupied: Bitboard,
    mailbox: [ColoredPiece; 64],
    side_to_move: Color,
    /// Half-moves since the start of the game.
    ply: u32,
    state: GameState,
    history: Vec<GameState>,
    captures: Vec<ColoredPiece>,
    /// Whether the side to move is in check, computed on first request.
    in_check: Cell<Option<bool>>,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.colors == other.colors
            && self.occupied == other.occupied
            && self.mailbox == other.mailbox
            && self.side_to_move == other.side_to_move
            && self.ply == other.ply
            && self.state == other.state
            && self.history == other.history
            && self.captures == other.captures
    }
}

impl Eq for Position {}

impl Position {
    fn empty() -> Self {
        Position {
            pieces: [Bitboard::EMPTY; 12],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            mailbox: [ColoredPiece::NONE; 64],
            side_to_move: Color::White,
            ply: 0,
            state: GameState {
                castling: CastlingRights::NONE,
                en_passant: None,
                key: 0,
                halfmove_clock: 0,
            },
            history: Vec::with_capacity(HISTORY_CAPACITY),
            captures: Vec::with_capacity(HISTORY_CAPACITY),
            in_check: Cell::new(None),
        }
    }

    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("STARTPOS is valid")
    }

    /// Creates a position from a FEN string.
    ///
    /// Beyond FEN syntax this requires exactly one king per side and no pawns
    /// on the first or last rank. Castling rights whose king or rook is not on
    /// its home square are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        crate::movegen::init();
        let parsed = FenParser::parse(fen)?;
        let mut position = Position::empty();

        for (square, piece, color) in parsed.pieces() {
            position.put_piece(ColoredPiece::new(piece, color), square);
        }

        for color in Color::ALL {
            let kings = position.pieces(Piece::King, color).count();
            if kings != 1 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }
        let pawns =
            position.pieces(Piece::Pawn, Color::White) | position.pieces(Piece::Pawn, Color::Black);
        if (pawns & (Bitboard::RANK_1 | Bitboard::RANK_8)).is_not_empty() {
            return Err(FenError::InvalidPiecePlacement(
                "pawn on first or last rank".to_string(),
            ));
        }

        position.side_to_move = parsed.active_color;

        let en_passant = match parsed.en_passant {
            Some(square) if square.rank().index() != parsed.active_color.en_passant_rank() => {
                return Err(FenError::InvalidEnPassantSquare(square.to_algebraic()));
            }
            Some(square) => Some(square.file()),
            None => None,
        };

        position.ply = parsed.ply_count();
        position.state = GameState {
            castling: position.supported_castling(CastlingRights::from_fen(&parsed.castling)),
            en_passant,
            key: 0,
            halfmove_clock: parsed.halfmove_clock,
        };
        position.state.key = position.compute_key();

        Ok(position)
    }

    /// Replaces this position with one loaded from FEN.
    ///
    /// On error the current position is left untouched.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    /// Keeps only the castling rights whose king and rook are on their home squares.
    fn supported_castling(&self, rights: CastlingRights) -> CastlingRights {
        let mut flags = 0;
        let homes = [
            (CastlingRights::WHITE_KINGSIDE, Color::White, Square::E1, Square::H1),
            (CastlingRights::WHITE_QUEENSIDE, Color::White, Square::E1, Square::A1),
            (CastlingRights::BLACK_KINGSIDE, Color::Black, Square::E8, Square::H8),
            (CastlingRights::BLACK_QUEENSIDE, Color::Black, Square::E8, Square::A8),
        ];
        for (flag, color, king, rook) in homes {
            if self.piece_at(king).is(Piece::King, color)
                && self.piece_at(rook).is(Piece::Rook, color)
            {
                flags |= flag;
            }
        }
        rights.intersect(flags)
    }

    /// Computes the Zobrist key from scratch.
    pub fn compute_key(&self) -> u64 {
        let mut key = 0;
        for square in self.occupied {
            key ^= ZOBRIST.piece(self.piece_at(square), square);
        }
        if self.side_to_move == Color::Black {
            key ^= ZOBRIST.black_to_move();
        }
        key ^ ZOBRIST.game_state(self.state.castling, self.state.en_passant)
    }

    #[inline]
    fn put_piece(&mut self, piece: ColoredPiece, square: Square) {
        if piece.is_none() {
            return;
        }
        let bb = Bitboard::from_square(square);
        self.pieces[piece.index()] |= bb;
        self.colors[piece.color().index()] |= bb;
        self.occupied |= bb;
        self.mailbox[square.index() as usize] = piece;
    }

    #[inline]
    fn remove_piece(&mut self, square: Square) -> ColoredPiece {
        let piece = self.mailbox[square.index() as usize];
        if piece.is_none() {
            return piece;
        }
        let bb = !Bitboard::from_square(square);
        self.pieces[piece.index()] &= bb;
        self.colors[piece.color().index()] &= bb;
        self.occupied &= bb;
        self.mailbox[square.index() as usize] = ColoredPiece::NONE;
        piece
    }

    /// Returns the side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the current castling rights.
    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.state.castling
    }

    /// Returns the en passant file, if the last move was a double push.
    #[inline]
    pub fn en_passant_file(&self) -> Option<File> {
        self.state.en_passant
    }

    /// Returns the en passant target square for the side to move.
    pub fn en_passant_square(&self) -> Option<Square> {
        let file = self.state.en_passant?;
        Square::from_index(self.side_to_move.en_passant_rank() * 8 + file.index())
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    /// Half-moves played since the start of the game.
    #[inline]
    pub fn ply_count(&self) -> u32 {
        self.ply
    }

    /// Full-move number as written in FEN.
    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }

    /// Returns the incrementally maintained Zobrist key.
    #[inline]
    pub fn key(&self) -> u64 {
        self.state.key
    }

    /// Returns the current irreversible state.
    #[inline]
    pub fn game_state(&self) -> GameState {
        self.state
    }

    /// Returns the piece on a square, or [`ColoredPiece::NONE`].
    #[inline]
    pub fn piece_at(&self, square: Square) -> ColoredPiece {
        self.mailbox[square.index() as usize]
    }

    /// Returns a bitboard of pieces of the given type and color.
    #[inline]
    pub fn pieces(&self, piece: Piece, color: Color) -> Bitboard {
        self.pieces[ColoredPiece::new(piece, color).index()]
    }

    /// Returns all pieces of one color.
    #[inline]
    pub fn colors(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    /// Returns a bitboard of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// Bishops and queens of one color.
    #[inline]
    pub fn diagonal_sliders(&self, color: Color) -> Bitboard {
        self.pieces(Piece::Bishop, color) | self.pieces(Piece::Queen, color)
    }

    /// Rooks and queens of one color.
    #[inline]
    pub fn orthogonal_sliders(&self, color: Color) -> Bitboard {
        self.pieces(Piece::Rook, color) | self.pieces(Piece::Queen, color)
    }

    /// Returns the king square of one color.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces(Piece::King, color).first_square()
    }

    /// Pieces of `by` attacking `square`, with sliders seeing through `occupied`.
    pub fn attackers_to(&self, square: Square, by: Color, occupied: Bitboard) -> Bitboard {
        (pawn_attacks(square, by.opposite()) & self.pieces(Piece::Pawn, by))
            | (knight_attacks(square) & self.pieces(Piece::Knight, by))
            | (king_attacks(square) & self.pieces(Piece::King, by))
            | (bishop_attacks(square, occupied) & self.diagonal_sliders(by))
            | (rook_attacks(square, occupied) & self.orthogonal_sliders(by))
    }

    /// Returns true if `square` is attacked by any piece of `by`.
    #[inline]
    pub fn is_square_attacked(&self, square: Square, by: Color) -> bool {
        self.attackers_to(square, by, self.occupied).is_not_empty()
    }

    /// Returns true if the side to move is in check.
    ///
    /// Computed once per ply and cached until the next make or undo.
    pub fn in_check(&self) -> bool {
        if let Some(cached) = self.in_check.get() {
            return cached;
        }
        let us = self.side_to_move;
        let check = self.is_square_attacked(self.king_square(us), us.opposite());
        self.in_check.set(Some(check));
        check
    }

    /// Returns true if the current position occurred earlier with the same
    /// side to move, castling rights and en-passant file.
    ///
    /// Only positions since the last capture or pawn move are scanned; older
    /// ones cannot recur.
    #[inline]
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() > 0
    }

    /// Returns how many earlier occurrences the current position has.
    pub fn repetition_count(&self) -> usize {
        let window = (self.state.halfmove_clock as usize).min(self.history.len());
        let start = self.history.len() - window;
        self.history[start..]
            .iter()
            .rev()
            .skip(1)
            .step_by(2)
            .filter(|past| {
                past.key == self.state.key
                    && past.castling == self.state.castling
                    && past.en_passant == self.state.en_passant
            })
            .count()
    }

    /// Returns true once the position has occurred three times.
    #[inline]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// Returns true when 100 half-moves passed without a capture or pawn move.
    #[inline]
    pub fn is_fifty_move_draw(&self) -> bool {
        self.state.halfmove_clock >= 100
    }

    /// Returns true if neither side can possibly deliver mate.
    ///
    /// That is: no pawns, rooks or queens, and either every bishop stands on
    /// one square color with no knights around, or each side has at most one
    /// minor piece.
    pub fn is_insufficient_material(&self) -> bool {
        let both = |piece| self.pieces(piece, Color::White) | self.pieces(piece, Color::Black);
        if [Piece::Pawn, Piece::Rook, Piece::Queen]
            .into_iter()
            .any(|piece| both(piece).is_not_empty())
        {
            return false;
        }

        let bishops = both(Piece::Bishop);
        let knights = both(Piece::Knight);
        let same_colored_bishops = (bishops & Bitboard::LIGHT_SQUARES).is_empty()
            || (bishops & Bitboard::DARK_SQUARES).is_empty();
        if knights.is_empty() && same_colored_bishops {
            return true;
        }

        Color::ALL.iter().all(|&color| {
            let minors = self.pieces(Piece::Bishop, color) | self.pieces(Piece::Knight, color);
            !minors.more_than_one()
        })
    }

    /// Returns true for any of the automatic draws: repetition, fifty-move
    /// rule or insufficient material.
    pub fn is_draw(&self) -> bool {
        self.is_fifty_move_draw() || self.is_repetition() || self.is_insufficient_material()
    }

    /// Checks that bitboards, mailbox, occupancy and key agree with each other.
    pub fn is_consistent(&self) -> bool {
        let mut union = Bitboard::EMPTY;
        let mut by_color = [Bitboard::EMPTY; 2];
        for color in Color::ALL {
            for piece in Piece::ALL {
                let bb = self.pieces(piece, color);
                if (union & bb).is_not_empty() {
                    return false;
                }
                union |= bb;
                by_color[color.index()] |= bb;
                for square in bb {
                    if !self.piece_at(square).is(piece, color) {
                        return false;
                    }
                }
            }
            if self.pieces(Piece::King, color).count() != 1 {
                return false;
            }
        }

        let mailbox_matches =
            Square::all().all(|square| self.piece_at(square).is_none() != union.contains(square));

        mailbox_matches
            && union == self.occupied
            && by_color == self.colors
            && self.compute_key() == self.state.key
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_fen_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), FenParser::STARTPOS);
        assert!(pos.is_consistent());
    }

    #[test]
    fn custom_fen_roundtrip() {
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen);
        assert_eq!(pos.ply_count(), 4);
        assert_eq!(pos.fullmove_number(), 3);
    }

    #[test]
    fn piece_at() {
        let pos = Position::startpos();
        assert!(pos.piece_at(Square::E1).is(Piece::King, Color::White));
        assert!(pos.piece_at(Square::E8).is(Piece::King, Color::Black));
        assert!(pos.piece_at(Square::E4).is_none());
    }

    #[test]
    fn occupancy_and_piece_sets() {
        let pos = Position::startpos();
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.colors(Color::White).count(), 16);
        assert_eq!(pos.pieces(Piece::Pawn, Color::Black).count(), 8);
        assert_eq!(pos.orthogonal_sliders(Color::White).count(), 3);
        assert_eq!(pos.diagonal_sliders(Color::Black).count(), 3);
        assert_eq!(pos.king_square(Color::Black), Square::E8);
    }

    #[test]
    fn position_with_en_passant() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.en_passant_file(), Some(File::E));
        assert_eq!(pos.en_passant_square(), Some(sq("e3")));
        assert_eq!(pos.ply_count(), 1);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn en_passant_rank_must_match_side() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e3 0 1";
        assert!(matches!(
            Position::from_fen(fen),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn kings_are_required() {
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Position::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn failed_load_keeps_previous_position() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let before = pos.clone();
        assert!(pos.set_fen("4k3/8/8/8/8/8/8/R3K3 w Q - zero 1").is_err());
        assert!(pos.set_fen("not a fen").is_err());
        assert_eq!(pos, before);
        assert!(pos.set_fen(FenParser::STARTPOS).is_ok());
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn unsupported_castling_rights_are_dropped() {
        let pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(pos.castling_rights().to_fen(), "Kq");
    }

    #[test]
    fn key_depends_on_side_castling_and_en_passant() {
        let white = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b Q - 0 1").unwrap();
        let no_rights = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert_ne!(white.key(), black.key());
        assert_ne!(white.key(), no_rights.key());
        assert_eq!(white.key() ^ black.key(), ZOBRIST.black_to_move());

        let with_ep = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let without_ep = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2").unwrap();
        assert_eq!(with_ep.key() ^ without_ep.key(), ZOBRIST.en_passant(File::D));
    }

    #[test]
    fn in_check_detects_each_attacker_kind() {
        let checks = [
            "4k3/8/8/8/8/8/3p4/4K3 w - - 0 1",
            "4k3/8/8/8/8/5n2/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/r3K3 w - - 0 1",
            "4k3/8/8/8/1b6/8/8/4K3 w - - 0 1",
            "4k3/4q3/8/8/8/8/8/4K3 w - - 0 1",
        ];
        for fen in checks {
            assert!(Position::from_fen(fen).unwrap().in_check(), "{}", fen);
        }
        let quiet = [
            FenParser::STARTPOS,
            "4k3/8/8/8/8/8/4p3/4K3 w - - 0 1",
            "4k3/4q3/8/8/8/8/4P3/4K3 w - - 0 1",
        ];
        for fen in quiet {
            assert!(!Position::from_fen(fen).unwrap().in_check(), "{}", fen);
        }
    }

    #[test]
    fn insufficient_material() {
        let drawn = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4KB2 w - - 0 1",
            // Both bishops on light squares
            "4k3/8/8/8/8/8/6B1/4KB2 w - - 0 1",
            "4kb2/8/8/8/8/8/8/4KB2 w - - 0 1",
            "4kn2/8/8/8/8/8/8/4KB2 w - - 0 1",
        ];
        for fen in drawn {
            let pos = Position::from_fen(fen).unwrap();
            assert!(pos.is_insufficient_material(), "{}", fen);
        }

        let playable = [
            // Bishops on both square colors
            "4k3/8/8/8/8/8/8/2B1KB2 w - - 0 1",
            "4k3/8/8/8/8/8/8/3NKB2 w - - 0 1",
            "4k3/8/8/8/8/8/P7/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/R3K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/3QK3 w - - 0 1",
        ];
        for fen in playable {
            let pos = Position::from_fen(fen).unwrap();
            assert!(!pos.is_insufficient_material(), "{}", fen);
        }
    }

    #[test]
    fn fifty_move_draw() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        assert!(!pos.is_fifty_move_draw());
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 100 80").unwrap();
        assert!(pos.is_fifty_move_draw());
        assert!(pos.is_draw());
    }
}
