//! Move ordering.
//!
//! Moves are sorted by a single score, highest first:
//!
//! | band                 | score                                     |
//! |----------------------|-------------------------------------------|
//! | transposition move   | 10 000 000                                |
//! | captures, promotions | 1 000 000 + victim value - attacker value |
//! | first killer         | 900 001                                   |
//! | second killer        | 900 000                                   |
//! | other quiet moves    | history, below the killer band            |

use crate::eval::PIECE_VALUES;
use crate::search::MAX_PLY;
use kestrel_core::{Color, Move, Piece};
use kestrel_engine::Position;
use std::cmp::Reverse;

const TT_MOVE_SCORE: i32 = 10_000_000;
const CAPTURE_SCORE: i32 = 1_000_000;
const FIRST_KILLER_SCORE: i32 = 900_001;
const SECOND_KILLER_SCORE: i32 = 900_000;

/// Killer moves and history counters gathered from beta cutoffs.
pub struct MoveOrderer {
    /// Two most recent cutoff quiets per ply, newest first.
    killers: [[Move; 2]; MAX_PLY],
    /// Cutoff counters indexed by [side][piece][to-square].
    history: [[[i32; 64]; 6]; 2],
}

impl MoveOrderer {
    pub fn new() -> Self {
        MoveOrderer {
            killers: [[Move::NULL; 2]; MAX_PLY],
            history: [[[0; 64]; 6]; 2],
        }
    }

    pub fn reset_history(&mut self) {
        self.history = [[[0; 64]; 6]; 2];
    }

    pub fn reset_killers(&mut self) {
        self.killers = [[Move::NULL; 2]; MAX_PLY];
    }

    /// Killer moves recorded at `ply`, newest first.
    #[inline]
    pub fn killers(&self, ply: usize) -> [Move; 2] {
        self.killers[ply % MAX_PLY]
    }

    /// History counter for `piece` of `side` moving to the square of index `to`.
    #[inline]
    pub fn history(&self, side: Color, piece: Piece, to: u8) -> i32 {
        self.history[side.index()][piece.index()][to as usize]
    }

    /// Records a move that caused a beta cutoff at `ply`.
    ///
    /// Quiet moves become the first killer (the old first killer moves down
    /// unless it is the same move) and their history counter grows by
    /// depth². Captures and promotions already sort above the killers and
    /// are ignored.
    pub fn store_cutoff(&mut self, position: &Position, m: Move, depth: i32, ply: usize) {
        if m.is_capture() || m.is_promotion() {
            return;
        }

        let slot = &mut self.killers[ply % MAX_PLY];
        if slot[0] != m {
            slot[1] = slot[0];
            slot[0] = m;
        }

        let moving = position.piece_at(m.from());
        if let Some(piece) = moving.piece() {
            let counter =
                &mut self.history[moving.color().index()][piece.index()][m.to().index() as usize];
            *counter = counter.saturating_add(depth * depth);
        }
    }

    /// Ordering score of `m` in `position`.
    pub fn score(&self, position: &Position, m: Move, tt_move: Move, ply: usize) -> i32 {
        if m == tt_move {
            return TT_MOVE_SCORE;
        }

        let moving = position.piece_at(m.from());
        let attacker = moving.piece().map_or(0, |piece| PIECE_VALUES[piece.index()]);

        if m.is_capture() || m.is_promotion() {
            // En passant lands on an empty square; the victim is a pawn.
            let victim = match position.piece_at(m.to()).piece() {
                Some(piece) => PIECE_VALUES[piece.index()],
                None if m.is_capture() => PIECE_VALUES[Piece::Pawn.index()],
                None => 0,
            };
            let promotion = m
                .flag()
                .promotion_piece()
                .map_or(0, |piece| PIECE_VALUES[piece.index()]);
            return CAPTURE_SCORE + victim + promotion - attacker;
        }

        let [first, second] = self.killers(ply);
        if m == first {
            return FIRST_KILLER_SCORE;
        }
        if m == second {
            return SECOND_KILLER_SCORE;
        }

        moving.piece().map_or(0, |piece| {
            self.history(moving.color(), piece, m.to().index())
                .min(SECOND_KILLER_SCORE - 1)
        })
    }

    /// Sorts `moves` best first.
    pub fn order(&self, position: &Position, moves: &mut [Move], tt_move: Move, ply: usize) {
        moves.sort_unstable_by_key(|&m| Reverse(self.score(position, m, tt_move, ply)));
    }
}

impl Default for MoveOrderer {
    fn default() -> Self {
        Self::new()
    }
}
