//! Static evaluation.
//!
//! The search only needs a score for the side to move. Any pure function of
//! the board works; [`PieceSquareEvaluator`] is the stock tapered material,
//! piece-square and pawn-structure evaluation.

use kestrel_core::{Color, Piece, Square};
use kestrel_engine::{Bitboard, Position};

/// Scores a position in centipawns from the side to move's perspective.
///
/// Implementations must depend on the board alone, with no hidden state,
/// because scores are cached in the transposition table by position key.
pub trait Evaluator {
    fn evaluate(&self, position: &Position) -> i32;
}

impl<F> Evaluator for F
where
    F: Fn(&Position) -> i32,
{
    #[inline]
    fn evaluate(&self, position: &Position) -> i32 {
        self(position)
    }
}

/// Middlegame piece values in centipawns, indexed by [`Piece::index`].
pub const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

/// Piece-square tables, written rank 8 first as seen from White's side.
const PAWN_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 50, 50, 50, 50, 50, 50, 50, 50, 10, 10, 20, 30, 30, 20, 10, 10, 5, 5,
    10, 25, 25, 10, 5, 5, 0, 0, 0, 20, 20, 0, 0, 0, 5, -5, -10, 0, 0, -10, -5, 5, 5, 10, 10, -20,
    -20, 10, 10, 5, 0, 0, 0, 0, 0, 0, 0, 0,
];

const KNIGHT_PST: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15, 10,
    0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 10, 15, 15, 10,
    5, -30, -40, -20, 0, 5, 5, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
];

const BISHOP_PST: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 10, 10, 5, 0,
    -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 10, 10, 10, 10, 10, 10,
    -10, -10, 5, 0, 0, 0, 0, 5, -10, -20, -10, -10, -10, -10, -10, -10, -20,
];

const ROOK_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 5, 10, 10, 10, 10, 10, 10, 5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0,
    0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, 0, 0,
    0, 5, 5, 0, 0, 0,
];

const QUEEN_PST: [i32; 64] = [
    -20, -10, -10, -5, -5, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 5, 5, 5, 0, -10,
    -5, 0, 5, 5, 5, 5, 0, -5, 0, 0, 5, 5, 5, 5, 0, -5, -10, 5, 5, 5, 5, 5, 0, -10, -10, 0, 5, 0, 0,
    0, 0, -10, -20, -10, -10, -5, -5, -10, -10, -20,
];

const KING_MIDDLEGAME_PST: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40,
    -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -20, -30, -30, -40, -40, -30,
    -30, -20, -10, -20, -20, -20, -20, -20, -20, -10, 20, 20, 0, 0, 0, 0, 20, 20, 20, 30, 10, 0, 0,
    10, 30, 20,
];

/// Endgame king: head for the centre.
const KING_ENDGAME_PST: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50, -30, -20, -10, 0, 0, -10, -20, -30, -30, -10, 20, 30,
    30, 20, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30, -10, 30, 40, 40, 30, -10, -30, -30,
    -10, 20, 30, 30, 20, -10, -30, -30, -30, 0, 0, 0, 0, -30, -30, -50, -30, -30, -30, -30, -30,
    -30, -50,
];

/// Endgame pawns: the closer to promotion the better.
const PAWN_ENDGAME_PST: [i32; 64] = [
    0, 0, 0, 0, 0, 0, 0, 0, 80, 80, 80, 80, 80, 80, 80, 80, 50, 50, 50, 50, 50, 50, 50, 50, 30, 30,
    30, 30, 30, 30, 30, 30, 15, 15, 15, 15, 15, 15, 15, 15, 5, 5, 5, 5, 5, 5, 5, 5, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

const MIDDLEGAME_TABLES: [&[i32; 64]; 6] = [
    &PAWN_PST,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_MIDDLEGAME_PST,
];

const ENDGAME_TABLES: [&[i32; 64]; 6] = [
    &PAWN_ENDGAME_PST,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_ENDGAME_PST,
];

/// Endgame piece values; minor pieces lose a little, rooks and queens gain.
const ENDGAME_VALUES: [i32; 6] = [90, 310, 310, 550, 1000, 0];

/// Phase weight per piece. The starting position sums to [`FULL_PHASE`].
const PHASE_WEIGHTS: [i32; 6] = [0, 1, 1, 2, 4, 0];
const FULL_PHASE: i32 = 24;

const BISHOP_PAIR_BONUS: i32 = 20;
const KNIGHT_PAIR_PENALTY: i32 = 10;
const ROOK_PAIR_PENALTY: i32 = 10;
const DOUBLED_PAWN_PENALTY: i32 = 10;
const ISOLATED_PAWN_PENALTY: i32 = 20;
const PASSED_PAWN_BONUS: i32 = 20;
const UNDEVELOPED_PIECE_PENALTY: i32 = 10;

/// Per knight and rook, indexed by the owner's pawn count: knights gain in
/// closed positions, rooks in open ones.
const KNIGHT_PAWN_ADJUSTMENT: [i32; 9] = [-20, -16, -12, -8, -4, 0, 4, 8, 12];
const ROOK_PAWN_ADJUSTMENT: [i32; 9] = [15, 12, 9, 6, 3, 0, -3, -6, -9];

#[inline]
fn file_mask(file: u8) -> Bitboard {
    Bitboard::new(Bitboard::FILE_A.0 << file)
}

#[inline]
fn adjacent_files(file: u8) -> Bitboard {
    let west = if file > 0 { file_mask(file - 1) } else { Bitboard::EMPTY };
    let east = if file < 7 { file_mask(file + 1) } else { Bitboard::EMPTY };
    west | east
}

/// Every square on ranks strictly ahead of `rank` from `color`'s side.
#[inline]
fn ranks_ahead(color: Color, rank: u8) -> Bitboard {
    match color {
        Color::White if rank >= 7 => Bitboard::EMPTY,
        Color::White => Bitboard::new(!0u64 << ((rank + 1) * 8)),
        Color::Black => Bitboard::new((1u64 << (rank * 8)) - 1),
    }
}

/// Material plus piece-square tables, tapered between middlegame and
/// endgame by the remaining non-pawn material, with pawn-structure and
/// piece-pair terms on top.
#[derive(Debug, Clone, Copy, Default)]
pub struct PieceSquareEvaluator;

impl PieceSquareEvaluator {
    /// Table index of `square` for a piece of `color`.
    ///
    /// The tables are laid out from White's side with rank 8 first, so White
    /// flips the rank and Black reads the square index directly.
    #[inline]
    fn table_index(square: Square, color: Color) -> usize {
        match color {
            Color::White => square.flip_rank().index() as usize,
            Color::Black => square.index() as usize,
        }
    }

    /// 0 with bare kings and pawns, [`FULL_PHASE`] with all pieces on.
    pub fn phase(&self, position: &Position) -> i32 {
        let weight: i32 = Piece::ALL
            .iter()
            .map(|&piece| {
                let count = position.pieces(piece, Color::White).count()
                    + position.pieces(piece, Color::Black).count();
                PHASE_WEIGHTS[piece.index()] * count as i32
            })
            .sum();
        weight.min(FULL_PHASE)
    }

    /// Doubled, isolated and passed pawn terms for `color`'s pawns.
    pub fn pawn_structure(&self, position: &Position, color: Color) -> i32 {
        let own = position.pieces(Piece::Pawn, color);
        let enemy = position.pieces(Piece::Pawn, color.opposite());

        let mut score = 0;
        for sq in own {
            let file = sq.file().index();
            let ahead = ranks_ahead(color, sq.rank().index());
            let neighbours = adjacent_files(file);

            if (own & file_mask(file) & ahead).is_not_empty() {
                score -= DOUBLED_PAWN_PENALTY;
            }
            if (own & neighbours).is_empty() {
                score -= ISOLATED_PAWN_PENALTY;
            }
            if (enemy & (file_mask(file) | neighbours) & ahead).is_empty() {
                score += PASSED_PAWN_BONUS;
            }
        }
        score
    }

    /// Untapered piece terms for `color`: pairs, pawn-count adjustments and
    /// minor pieces still at home while castling is possible.
    fn piece_terms(&self, position: &Position, color: Color) -> i32 {
        let count = |piece| position.pieces(piece, color).count() as i32;
        let pawns = (count(Piece::Pawn) as usize).min(8);
        let mut score = 0;

        if count(Piece::Bishop) >= 2 {
            score += BISHOP_PAIR_BONUS;
        }
        if count(Piece::Knight) >= 2 {
            score -= KNIGHT_PAIR_PENALTY;
        }
        if count(Piece::Rook) >= 2 {
            score -= ROOK_PAIR_PENALTY;
        }
        score += count(Piece::Knight) * KNIGHT_PAWN_ADJUSTMENT[pawns];
        score += count(Piece::Rook) * ROOK_PAWN_ADJUSTMENT[pawns];

        let rights = position.castling_rights();
        if rights.can_castle_kingside(color) || rights.can_castle_queenside(color) {
            // b and g files for knights, c and f for bishops
            let home = [(Piece::Knight, 0b0100_0010u64), (Piece::Bishop, 0b0010_0100u64)];
            for (piece, files) in home {
                let squares = Bitboard::new(files << (color.back_rank() * 8));
                score -= UNDEVELOPED_PIECE_PENALTY
                    * (position.pieces(piece, color) & squares).count() as i32;
            }
        }
        score
    }

    /// Score from White's point of view.
    pub fn white_score(&self, position: &Position) -> i32 {
        let (mut middlegame, mut endgame, mut flat) = (0i32, 0i32, 0i32);
        for color in Color::ALL {
            let sign = if color == Color::White { 1 } else { -1 };
            for piece in Piece::ALL {
                let i = piece.index();
                for sq in position.pieces(piece, color) {
                    let t = Self::table_index(sq, color);
                    middlegame += sign * (PIECE_VALUES[i] + MIDDLEGAME_TABLES[i][t]);
                    endgame += sign * (ENDGAME_VALUES[i] + ENDGAME_TABLES[i][t]);
                }
            }
            flat += sign * (self.pawn_structure(position, color) + self.piece_terms(position, color));
        }

        let phase = self.phase(position);
        flat + (middlegame * phase + endgame * (FULL_PHASE - phase)) / FULL_PHASE
    }
}

impl Evaluator for PieceSquareEvaluator {
    fn evaluate(&self, position: &Position) -> i32 {
        let score = self.white_score(position);
        if position.side_to_move() == Color::White {
            score
        } else {
            -score
        }
    }
}
