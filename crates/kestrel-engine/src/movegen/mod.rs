//! Move generation.
//!
//! Moves are generated strictly legal in a single pass. Before any move is
//! emitted the generator works out:
//!
//! - every square the opponent attacks, with our king lifted off the board so
//!   that stepping back along a checking ray is seen as unsafe
//! - the checking pieces and the squares that would block or capture them
//! - our pinned pieces, found by walking the eight rays out from the king
//!
//! Pinned pieces are then restricted to the line through king and pin, and
//! every non-king move is restricted to the check-block mask. Nothing is made
//! and unmade to test legality. En passant is the one case re-checked against
//! the board, because removing two pawns from one rank can expose the king.

mod attacks;
mod magics;
pub mod perft;

use crate::{Bitboard, Position};
use kestrel_core::{Color, Move, MoveFlag, Piece, Square};

pub use attacks::{
    bishop_attacks, first_blocker, init, king_attacks, knight_attacks, line, pawn_attacks,
    queen_attacks, ray, rook_attacks, Direction,
};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list can hold.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Returns the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a slice of the moves.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    /// Returns a mutable slice of the moves, for in-place ordering.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    /// Returns true if the list holds `m`.
    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    /// Iterates over the moves.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    /// Clears the move list.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates all legal moves for the side to move.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    Generator::new(position, true).generate(&mut moves);
    moves
}

/// Generates the legal captures and promotions for the side to move.
///
/// Used by quiescence search. Push promotions are included even though they
/// capture nothing.
pub fn generate_captures(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    Generator::new(position, false).generate(&mut moves);
    moves
}

/// Per-position facts shared by every piece's generation.
struct Generator<'a> {
    position: &'a Position,
    us: Color,
    them: Color,
    king: Square,
    friendly: Bitboard,
    enemy: Bitboard,
    occupied: Bitboard,
    /// Squares the opponent attacks, computed with our king removed.
    attacked: Bitboard,
    /// Squares a non-king move must land on. Full when not in check.
    check_block: Bitboard,
    pinned: Bitboard,
    in_check: bool,
    double_check: bool,
    quiets: bool,
}

impl<'a> Generator<'a> {
    fn new(position: &'a Position, quiets: bool) -> Self {
        let us = position.side_to_move();
        let them = us.opposite();
        let king = position.king_square(us);
        let friendly = position.colors(us);
        let enemy = position.colors(them);
        let occupied = position.occupied();

        let attacked = opponent_attacks(position, them, occupied & !Bitboard::from_square(king));

        let mut check_block = Bitboard::EMPTY;
        let mut checkers = 0u32;

        let leaper_checkers = (pawn_attacks(king, us) & position.pieces(Piece::Pawn, them))
            | (knight_attacks(king) & position.pieces(Piece::Knight, them));
        for checker in leaper_checkers {
            checkers += 1;
            check_block.set(checker);
        }

        let diagonal = position.diagonal_sliders(them);
        let orthogonal = position.orthogonal_sliders(them);
        let mut pinned = Bitboard::EMPTY;

        for dir in Direction::ALL {
            let sliders = if dir.is_diagonal() {
                diagonal
            } else {
                orthogonal
            };
            if (ray(dir, king) & sliders).is_empty() {
                continue;
            }
            let Some(first) = first_blocker(dir, king, occupied) else {
                continue;
            };
            if sliders.contains(first) {
                checkers += 1;
                check_block |= ray(dir, king) & !ray(dir, first);
            } else if friendly.contains(first) {
                if let Some(second) = first_blocker(dir, first, occupied) {
                    if sliders.contains(second) {
                        pinned.set(first);
                    }
                }
            }
        }

        let in_check = checkers > 0;
        if !in_check {
            check_block = Bitboard::FULL;
        }

        Generator {
            position,
            us,
            them,
            king,
            friendly,
            enemy,
            occupied,
            attacked,
            check_block,
            pinned,
            in_check,
            double_check: checkers > 1,
            quiets,
        }
    }

    fn generate(&self, moves: &mut MoveList) {
        self.king_moves(moves);
        if self.double_check {
            return;
        }
        self.pawn_moves(moves);
        self.knight_moves(moves);
        self.slider_moves(moves);
        if self.quiets && !self.in_check {
            self.castling_moves(moves);
        }
    }

    /// Destinations a non-king, non-pawn piece may reach.
    #[inline]
    fn targets(&self) -> Bitboard {
        let targets = !self.friendly & self.check_block;
        if self.quiets {
            targets
        } else {
            targets & self.enemy
        }
    }

    /// Restricts a pinned piece on `from` to its pin line.
    #[inline]
    fn pin_mask(&self, from: Square) -> Bitboard {
        if self.pinned.contains(from) {
            line(self.king, from)
        } else {
            Bitboard::FULL
        }
    }

    fn push_targets(&self, from: Square, targets: Bitboard, moves: &mut MoveList) {
        for to in targets {
            let flag = if self.enemy.contains(to) {
                MoveFlag::Capture
            } else {
                MoveFlag::Quiet
            };
            moves.push(Move::new(from, to, flag));
        }
    }

    fn king_moves(&self, moves: &mut MoveList) {
        let mut targets = king_attacks(self.king) & !self.friendly & !self.attacked;
        if !self.quiets {
            targets &= self.enemy;
        }
        self.push_targets(self.king, targets, moves);
    }

    fn knight_moves(&self, moves: &mut MoveList) {
        // A pinned knight can never stay on its pin line.
        let knights = self.position.pieces(Piece::Knight, self.us) & !self.pinned;
        let targets = self.targets();
        for from in knights {
            self.push_targets(from, knight_attacks(from) & targets, moves);
        }
    }

    fn slider_moves(&self, moves: &mut MoveList) {
        let targets = self.targets();
        for from in self.position.diagonal_sliders(self.us) {
            let attacks = bishop_attacks(from, self.occupied) & targets & self.pin_mask(from);
            self.push_targets(from, attacks, moves);
        }
        for from in self.position.orthogonal_sliders(self.us) {
            let attacks = rook_attacks(from, self.occupied) & targets & self.pin_mask(from);
            self.push_targets(from, attacks, moves);
        }
    }

    fn pawn_moves(&self, moves: &mut MoveList) {
        let push = self.us.pawn_push();
        let pawns = self.position.pieces(Piece::Pawn, self.us);

        for from in pawns {
            let allowed = self.check_block & self.pin_mask(from);

            if let Some(one) = from.offset(push) {
                if !self.occupied.contains(one) {
                    if allowed.contains(one) {
                        self.push_pawn_move(from, one, false, moves);
                    }
                    if self.quiets && from.rank().index() == self.us.pawn_rank() {
                        if let Some(two) = one.offset(push) {
                            if !self.occupied.contains(two) && allowed.contains(two) {
                                moves.push(Move::new(from, two, MoveFlag::DoublePush));
                            }
                        }
                    }
                }
            }

            for to in pawn_attacks(from, self.us) & self.enemy & allowed {
                self.push_pawn_move(from, to, true, moves);
            }
        }

        self.en_passant_moves(pawns, moves);
    }

    /// Pushes a pawn move, expanding it into the four promotions on the last rank.
    fn push_pawn_move(&self, from: Square, to: Square, capture: bool, moves: &mut MoveList) {
        if to.rank().index() == self.them.back_rank() {
            for piece in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
                if let Some(flag) = MoveFlag::promotion(piece, capture) {
                    moves.push(Move::new(from, to, flag));
                }
            }
        } else if capture {
            moves.push(Move::new(from, to, MoveFlag::Capture));
        } else if self.quiets {
            moves.push(Move::quiet(from, to));
        }
    }

    fn en_passant_moves(&self, pawns: Bitboard, moves: &mut MoveList) {
        let Some(target) = self.position.en_passant_square() else {
            return;
        };
        let Some(victim) = target.offset(-self.us.pawn_push()) else {
            return;
        };
        if !self.position.piece_at(victim).is(Piece::Pawn, self.them) {
            return;
        }
        // Either the target square blocks the check or the double-pushed
        // pawn is the checker.
        if !self.check_block.contains(target) && !self.check_block.contains(victim) {
            return;
        }

        for from in pawn_attacks(target, self.them) & pawns {
            if !self.pin_mask(from).contains(target) {
                continue;
            }
            let after = (self.occupied
                ^ Bitboard::from_square(from)
                ^ Bitboard::from_square(victim))
                | Bitboard::from_square(target);
            let exposed = (rook_attacks(self.king, after)
                & self.position.orthogonal_sliders(self.them))
                | (bishop_attacks(self.king, after) & self.position.diagonal_sliders(self.them));
            if exposed.is_not_empty() {
                continue;
            }
            moves.push(Move::new(from, target, MoveFlag::EnPassant));
        }
    }

    fn castling_moves(&self, moves: &mut MoveList) {
        let rights = self.position.castling_rights();
        let shift = self.us.back_rank() * 8;

        // f and g files must be empty and safe.
        let kingside_path = Bitboard::new(0x60 << shift);
        // b, c and d files must be empty; only c and d must be safe.
        let queenside_empty = Bitboard::new(0x0E << shift);
        let queenside_safe = Bitboard::new(0x0C << shift);

        if rights.can_castle_kingside(self.us)
            && (self.occupied & kingside_path).is_empty()
            && (self.attacked & kingside_path).is_empty()
        {
            if let Some(to) = self.king.offset(2) {
                moves.push(Move::new(self.king, to, MoveFlag::CastleKingside));
            }
        }

        if rights.can_castle_queenside(self.us)
            && (self.occupied & queenside_empty).is_empty()
            && (self.attacked & queenside_safe).is_empty()
        {
            if let Some(to) = self.king.offset(-2) {
                moves.push(Move::new(self.king, to, MoveFlag::CastleQueenside));
            }
        }
    }
}

/// Every square attacked by `them`, with sliders seeing through `occupied`.
fn opponent_attacks(position: &Position, them: Color, occupied: Bitboard) -> Bitboard {
    let pawns = position.pieces(Piece::Pawn, them);
    let mut attacked = match them {
        Color::White => pawns.north_east() | pawns.north_west(),
        Color::Black => pawns.south_east() | pawns.south_west(),
    };
    for sq in position.pieces(Piece::Knight, them) {
        attacked |= knight_attacks(sq);
    }
    attacked |= king_attacks(position.king_square(them));
    for sq in position.diagonal_sliders(them) {
        attacked |= bishop_attacks(sq, occupied);
    }
    for sq in position.orthogonal_sliders(them) {
        attacked |= rook_attacks(sq, occupied);
    }
    attacked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn ucis(moves: &MoveList) -> Vec<String> {
        let mut list: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        list.sort();
        list
    }

    #[test]
    fn movelist_push_and_iterate() {
        let mut list = MoveList::new();
        assert!(list.is_empty());

        let m1 = Move::quiet(Square::E2, Square::E4);
        let m2 = Move::quiet(Square::D5, Square::E4);
        list.push(m1);
        list.push(m2);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0], m1);
        assert_eq!(list[1], m2);
        assert!(list.contains(m2));

        let collected: Vec<_> = list.iter().copied().collect();
        assert_eq!(collected, vec![m1, m2]);
    }

    #[test]
    fn movelist_default_and_clear() {
        let mut list = MoveList::default();
        assert!(list.is_empty());
        list.push(Move::quiet(Square::E2, Square::E4));
        list.as_mut_slice()[0] = Move::quiet(Square::E7, Square::E4);
        assert_eq!(list[0].from(), Square::E7);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let position = Position::startpos();
        let moves = generate_moves(&position);
        assert_eq!(moves.len(), 20);
        assert_eq!(
            moves.iter().filter(|m| m.flag() == MoveFlag::DoublePush).count(),
            8
        );
        assert!(generate_captures(&position).is_empty());
    }

    #[test]
    fn pinned_rook_slides_along_pin() {
        let position = Position::from_fen("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1").unwrap();
        let rook_moves: Vec<Move> = generate_moves(&position)
            .iter()
            .copied()
            .filter(|m| m.from() == sq("e2"))
            .collect();
        assert_eq!(rook_moves.len(), 5);
        assert!(rook_moves.iter().all(|m| m.to().file() == sq("e2").file()));
        assert!(rook_moves.contains(&Move::new(sq("e2"), sq("e7"), MoveFlag::Capture)));
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let position = Position::from_fen("4k3/8/8/b7/8/8/3N4/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(moves.iter().all(|m| m.from() != sq("d2")));
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        let position = Position::from_fen("4k3/8/8/8/8/5n2/R7/r3K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert_eq!(ucis(&moves), vec!["e1e2", "e1f2"]);
    }

    #[test]
    fn single_check_can_be_blocked_or_captured() {
        // Rook on e8 checks. The bishop blocks on e5, the knight captures.
        let position = Position::from_fen("4r1k1/8/5N2/8/8/2B5/8/4K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        for m in &moves {
            let mut after = position.clone();
            after.make_move(*m);
            assert!(!after.is_square_attacked(after.king_square(Color::White), Color::Black));
        }
        assert!(moves.contains(Move::new(sq("f6"), sq("e8"), MoveFlag::Capture)));
        assert!(moves.contains(Move::quiet(sq("c3"), sq("e5"))));
        assert!(!moves.contains(Move::quiet(sq("c3"), sq("d4"))));
    }

    #[test]
    fn king_cannot_retreat_along_checking_ray() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!moves.contains(Move::quiet(sq("e1"), sq("f1"))));
        assert!(!moves.contains(Move::quiet(sq("e1"), sq("d1"))));
        assert_eq!(moves.len(), 3);
    }

    #[test]
    fn en_passant_exposing_king_on_rank_is_illegal() {
        let position = Position::from_fen("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(moves.iter().all(|m| m.flag() != MoveFlag::EnPassant));
        assert!(moves.contains(Move::quiet(sq("b5"), sq("b6"))));
    }

    #[test]
    fn en_passant_captures_checking_pawn() {
        let position = Position::from_fen("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1").unwrap();
        assert!(position.in_check());
        let moves = generate_moves(&position);
        assert!(moves.contains(Move::new(sq("e4"), sq("d3"), MoveFlag::EnPassant)));
    }

    #[test]
    fn castling_blocked_by_attacked_transit_square() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!moves.contains(Move::new(sq("e1"), sq("g1"), MoveFlag::CastleKingside)));
        assert!(moves.contains(Move::new(sq("e1"), sq("c1"), MoveFlag::CastleQueenside)));
    }

    #[test]
    fn queenside_castling_needs_empty_b_file() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(!moves.contains(Move::new(sq("e1"), sq("c1"), MoveFlag::CastleQueenside)));
        assert!(moves.contains(Move::new(sq("e1"), sq("g1"), MoveFlag::CastleKingside)));
    }

    #[test]
    fn no_castling_out_of_check() {
        let position = Position::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert!(moves.iter().all(|m| !m.flag().is_castling()));
    }

    #[test]
    fn promotions_expand_to_four_pieces() {
        let position = Position::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let moves = generate_moves(&position);
        assert_eq!(moves.iter().filter(|m| m.is_promotion()).count(), 4);
        assert_eq!(moves.len(), 7);

        let captures = generate_captures(&position);
        assert_eq!(ucis(&captures), vec!["a7a8b", "a7a8n", "a7a8q", "a7a8r"]);
    }

    #[test]
    fn captures_are_the_tactical_subset() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = generate_moves(&position);
        let captures = generate_captures(&position);

        let mut expected: Vec<String> = all
            .iter()
            .filter(|m| m.is_capture() || m.is_promotion())
            .map(|m| m.to_uci())
            .collect();
        expected.sort();
        assert_eq!(ucis(&captures), expected);
        assert_eq!(captures.len(), 8);
    }

    #[test]
    fn generated_moves_never_leave_king_attacked() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ];
        for fen in fens {
            let position = Position::from_fen(fen).unwrap();
            let us = position.side_to_move();
            for m in &generate_moves(&position) {
                let mut after = position.clone();
                after.make_move(*m);
                assert!(
                    !after.is_square_attacked(after.king_square(us), us.opposite()),
                    "{} leaves the king attacked in {}",
                    m,
                    fen
                );
            }
        }
    }
}
