//! Zobrist hashing for position identification.
//!
//! A position's key is the XOR of:
//! - one random value per (colored piece, square) pair on the board
//! - the side-to-move value when Black is to move
//! - one value for the 4-bit castling-rights set (16 entries)
//! - one value for the en-passant file, if any
//!
//! The first two make up the pieces key and the last two the game-state key.
//! Positions update the key incrementally; a full recomputation only happens
//! when a position is loaded.

use crate::position::CastlingRights;
use kestrel_core::{ColoredPiece, File, Square};

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed, so keys are stable across runs.
pub struct ZobristKeys {
    /// Keys for pieces: [colored piece index][square]
    pieces: [[u64; 64]; 12],
    /// XORed in when Black is to move.
    black_to_move: u64,
    /// Keys indexed by the raw castling-rights value.
    castling: [u64; 16],
    /// Keys for en passant file.
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Builds the key tables with a const xorshift64 generator.
    pub const fn new() -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E3779B97F4A7C15u64;
        let mut pieces = [[0u64; 64]; 12];
        let mut castling = [0u64; 16];
        let mut en_passant = [0u64; 8];

        let mut piece = 0;
        while piece < 12 {
            let mut square = 0;
            while square < 64 {
                state = next_random(state);
                pieces[piece][square] = state;
                square += 1;
            }
            piece += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 16 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Returns the key for a piece on a square. The empty square hashes to 0.
    #[inline]
    pub const fn piece(&self, piece: ColoredPiece, square: Square) -> u64 {
        if piece.is_none() {
            return 0;
        }
        self.pieces[piece.index()][square.index() as usize]
    }

    /// Returns the side-to-move key.
    #[inline]
    pub const fn black_to_move(&self) -> u64 {
        self.black_to_move
    }

    /// Returns the key for a castling-rights set.
    #[inline]
    pub const fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.raw() as usize]
    }

    /// Returns the key for an en passant file.
    #[inline]
    pub const fn en_passant(&self, file: File) -> u64 {
        self.en_passant[file.index() as usize]
    }

    /// Castling and en-passant contribution to a key.
    #[inline]
    pub const fn game_state(&self, rights: CastlingRights, en_passant: Option<File>) -> u64 {
        let ep = match en_passant {
            Some(file) => self.en_passant(file),
            None => 0,
        };
        self.castling(rights) ^ ep
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
