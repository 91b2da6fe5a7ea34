//! Make and undo.

use super::{castling_rook_squares, GameState, Position};
use crate::zobrist::ZOBRIST;
use kestrel_core::{Color, ColoredPiece, Move, MoveFlag, Piece, Square};

/// The square of the pawn captured en passant by `mover` landing on `to`.
#[inline]
fn en_passant_victim(to: Square, mover: Color) -> Square {
    let index = (to.index() as i8 - mover.pawn_push()) as u8;
    Square::from_index_wrapping(index)
}

impl Position {
    /// Applies a move for the side to move.
    ///
    /// The move must be legal in this position (as produced by the move
    /// generator or by [`Position::parse_uci_move`] for a legal move). Runs in
    /// constant time and does not allocate while the history stacks are within
    /// their reserved capacity.
    pub fn make_move(&mut self, m: Move) {
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let flag = m.flag();
        let moving = self.piece_at(from);
        debug_assert!(!moving.is_none(), "no piece on {} for {}", from, m);
        debug_assert_eq!(moving.color(), us);

        let mut key = self.state.key
            ^ ZOBRIST.game_state(self.state.castling, self.state.en_passant)
            ^ ZOBRIST.black_to_move();
        self.history.push(self.state);

        if flag.is_capture() {
            let victim_square = if flag == MoveFlag::EnPassant {
                en_passant_victim(to, us)
            } else {
                to
            };
            let captured = self.remove_piece(victim_square);
            debug_assert!(!captured.is_none(), "capture {} hits an empty square", m);
            key ^= ZOBRIST.piece(captured, victim_square);
            self.captures.push(captured);
        }

        self.remove_piece(from);
        key ^= ZOBRIST.piece(moving, from);
        let placed = match flag.promotion_piece() {
            Some(piece) => ColoredPiece::new(piece, us),
            None => moving,
        };
        self.put_piece(placed, to);
        key ^= ZOBRIST.piece(placed, to);

        if flag.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            let rook = self.remove_piece(rook_from);
            self.put_piece(rook, rook_to);
            key ^= ZOBRIST.piece(rook, rook_from) ^ ZOBRIST.piece(rook, rook_to);
        }

        let castling = self.state.castling.after_move(from, to);
        let en_passant = (flag == MoveFlag::DoublePush).then(|| from.file());
        let halfmove_clock = if flag.is_capture() || moving.piece() == Some(Piece::Pawn) {
            0
        } else {
            self.state.halfmove_clock.saturating_add(1)
        };
        key ^= ZOBRIST.game_state(castling, en_passant);

        self.state = GameState {
            castling,
            en_passant,
            key,
            halfmove_clock,
        };
        self.side_to_move = us.opposite();
        self.ply += 1;
        self.in_check.set(None);
    }

    /// Reverts the most recent [`Position::make_move`], which must have been
    /// called with the same move.
    pub fn undo_move(&mut self, m: Move) {
        let us = self.side_to_move.opposite();
        let from = m.from();
        let to = m.to();
        let flag = m.flag();

        let placed = self.remove_piece(to);
        let original = if flag.is_promotion() {
            ColoredPiece::new(Piece::Pawn, us)
        } else {
            placed
        };
        self.put_piece(original, from);

        if flag.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(to);
            let rook = self.remove_piece(rook_to);
            self.put_piece(rook, rook_from);
        }

        if flag.is_capture() {
            let victim_square = if flag == MoveFlag::EnPassant {
                en_passant_victim(to, us)
            } else {
                to
            };
            if let Some(captured) = self.captures.pop() {
                self.put_piece(captured, victim_square);
            }
        }

        if let Some(previous) = self.history.pop() {
            self.state = previous;
        }
        self.side_to_move = us;
        self.ply = self.ply.saturating_sub(1);
        self.in_check.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::FenParser;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn play(pos: &mut Position, moves: &[&str]) -> Vec<Move> {
        moves
            .iter()
            .map(|uci| {
                let m = pos.parse_uci_move(uci).unwrap();
                pos.make_move(m);
                assert!(pos.is_consistent(), "inconsistent after {}", uci);
                m
            })
            .collect()
    }

    #[test]
    fn quiet_move_and_undo() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        let m = Move::quiet(sq("g1"), sq("f3"));
        pos.make_move(m);
        assert!(pos.piece_at(sq("f3")).is(Piece::Knight, Color::White));
        assert!(pos.piece_at(sq("g1")).is_none());
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.halfmove_clock(), 1);
        assert_eq!(pos.ply_count(), 1);
        assert!(pos.is_consistent());
        pos.undo_move(m);
        assert_eq!(pos, before);
    }

    #[test]
    fn counters_at_the_limit_keep_counting() {
        let fen = "4k3/8/8/8/8/8/8/4K2R w - - 65535 65535";
        let mut pos = Position::from_fen(fen).unwrap();
        let m = Move::quiet(sq("h1"), sq("h2"));
        pos.make_move(m);
        assert_eq!(pos.halfmove_clock(), 65536);
        assert!(pos.is_fifty_move_draw());
        pos.undo_move(m);
        assert_eq!(pos.to_fen(), fen);

        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 3000000000"),
            Err(kestrel_core::FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 4294967295 1"),
            Err(kestrel_core::FenError::InvalidHalfmoveClock(_))
        ));
    }

    #[test]
    fn double_push_sets_en_passant_file() {
        let mut pos = Position::startpos();
        play(&mut pos, &["e2e4"]);
        assert_eq!(pos.en_passant_square(), Some(sq("e3")));
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        play(&mut pos, &["g8f6"]);
        assert_eq!(pos.en_passant_file(), None);
    }

    #[test]
    fn en_passant_removes_pawn_behind_target() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let before = pos.clone();
        let moves = play(&mut pos, &["e5f6"]);
        assert_eq!(moves[0].flag(), MoveFlag::EnPassant);
        assert!(pos.piece_at(sq("f6")).is(Piece::Pawn, Color::White));
        assert!(pos.piece_at(sq("f5")).is_none());
        assert!(pos.piece_at(sq("d5")).is(Piece::Pawn, Color::Black));
        pos.undo_move(moves[0]);
        assert_eq!(pos, before);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = pos.clone();
        let moves = play(&mut pos, &["e1g1", "e8c8"]);
        assert_eq!(moves[0].flag(), MoveFlag::CastleKingside);
        assert_eq!(moves[1].flag(), MoveFlag::CastleQueenside);
        assert!(pos.piece_at(sq("f1")).is(Piece::Rook, Color::White));
        assert!(pos.piece_at(sq("h1")).is_none());
        assert!(pos.piece_at(sq("d8")).is(Piece::Rook, Color::Black));
        assert!(pos.piece_at(sq("a8")).is_none());
        assert_eq!(pos.castling_rights().to_fen(), "-");
        assert_eq!(pos.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");

        pos.undo_move(moves[1]);
        pos.undo_move(moves[0]);
        assert_eq!(pos, before);
    }

    #[test]
    fn rook_capture_on_corner_clears_right() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut pos, &["a1a8"]);
        assert_eq!(pos.castling_rights().to_fen(), "Kk");
    }

    #[test]
    fn promotion_capture_and_undo() {
        let mut pos = Position::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 5 40").unwrap();
        let before = pos.clone();
        let moves = play(&mut pos, &["a7b8n"]);
        assert_eq!(moves[0].flag(), MoveFlag::PromoteKnightCapture);
        assert!(pos.piece_at(sq("b8")).is(Piece::Knight, Color::White));
        assert!(pos.pieces(Piece::Pawn, Color::White).is_empty());
        assert!(pos.pieces(Piece::Rook, Color::Black).is_empty());
        assert_eq!(pos.halfmove_clock(), 0);
        pos.undo_move(moves[0]);
        assert_eq!(pos, before);
    }

    #[test]
    fn incremental_key_matches_recomputed_key() {
        let mut pos = Position::startpos();
        play(
            &mut pos,
            &["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6", "d5c6", "d8d2", "b1d2", "e7e5"],
        );
        assert_eq!(pos.key(), pos.compute_key());
    }

    #[test]
    fn transposition_reaches_same_key() {
        let mut a = Position::startpos();
        let mut b = Position::startpos();
        play(&mut a, &["g1f3", "g8f6", "b1c3"]);
        play(&mut b, &["b1c3", "g8f6", "g1f3"]);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn repetition_after_knight_shuffle() {
        let mut pos = Position::startpos();
        assert!(!pos.is_repetition());
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_repetition());
        assert!(!pos.is_threefold_repetition());
        play(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
        assert!(pos.is_threefold_repetition());
        assert_eq!(pos.repetition_count(), 2);
    }

    #[test]
    fn lost_castling_right_breaks_repetition() {
        let mut pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K2R w Kq - 0 1").unwrap();
        play(&mut pos, &["h1h2", "e8d8", "h2h1", "d8e8"]);
        // Same placement, but both sides lost rights on the way
        assert!(!pos.is_repetition());
        play(&mut pos, &["h1h2", "e8d8", "h2h1", "d8e8"]);
        assert!(pos.is_repetition());
    }

    #[test]
    fn undo_restores_start_after_game() {
        let mut pos = Position::startpos();
        let moves = play(
            &mut pos,
            &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6", "e1g1", "f6e4"],
        );
        for m in moves.iter().rev() {
            pos.undo_move(*m);
        }
        assert_eq!(pos, Position::startpos());
        assert_eq!(pos.to_fen(), FenParser::STARTPOS);
    }
}
