//! Attack tables for leaper pieces and the ray geometry used by pin detection.
//!
//! Knight, king and pawn tables and the eight directional ray tables are built
//! at compile time. Sliding-piece lookups live in [`super::magics`].

use crate::Bitboard;
use kestrel_core::{Color, Square};

pub use super::magics::{bishop_attacks, init, line, queen_attacks, rook_attacks};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];
const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_DELTAS);
/// Indexed by [color][square]; pawns capture one rank towards the enemy.
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(1, 1), (1, -1)]),
    leaper_table(&[(-1, 1), (-1, -1)]),
];

/// Squares from a square to the board edge, exclusive, per [`Direction`].
static RAYS: [[Bitboard; 64]; 8] = compute_rays();

/// The eight compass directions a slider moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North = 0,
    East = 1,
    NorthEast = 2,
    NorthWest = 3,
    South = 4,
    West = 5,
    SouthWest = 6,
    SouthEast = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::South,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// (rank, file) step.
    const fn delta(self) -> (i8, i8) {
        match self {
            Direction::North => (1, 0),
            Direction::East => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (1, -1),
            Direction::South => (-1, 0),
            Direction::West => (0, -1),
            Direction::SouthWest => (-1, -1),
            Direction::SouthEast => (-1, 1),
        }
    }

    /// True for directions along which square indices grow, so the
    /// nearest square on a ray is its lowest set bit.
    #[inline]
    pub const fn is_increasing(self) -> bool {
        (self as u8) < 4
    }

    /// True for bishop-like directions.
    #[inline]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::NorthWest
                | Direction::SouthWest
                | Direction::SouthEast
        )
    }
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns pawn attacks from the given square for the given color.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Returns the squares from `sq` to the edge in direction `dir`, excluding `sq`.
#[inline]
pub fn ray(dir: Direction, sq: Square) -> Bitboard {
    RAYS[dir as usize][sq.index() as usize]
}

/// Returns the nearest occupied square along `dir` from `sq`.
#[inline]
pub fn first_blocker(dir: Direction, sq: Square, occupied: Bitboard) -> Option<Square> {
    let blockers = ray(dir, sq) & occupied;
    if dir.is_increasing() {
        blockers.lsb()
    } else {
        blockers.msb()
    }
}

const fn compute_rays() -> [[Bitboard; 64]; 8] {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut d = 0;
    while d < 8 {
        let (dr, df) = Direction::ALL[d].delta();
        let mut sq = 0u8;
        while sq < 64 {
            let mut r = (sq / 8) as i8 + dr;
            let mut f = (sq % 8) as i8 + df;
            let mut bb = 0u64;
            while r >= 0 && r < 8 && f >= 0 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
                r += dr;
                f += df;
            }
            rays[d][sq as usize] = Bitboard(bb);
            sq += 1;
        }
        d += 1;
    }
    rays
}

/// For every square, the on-board squares one (rank, file) step away.
const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let mut bb = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            let r = (sq / 8) as i8 + deltas[i].0;
            let f = (sq % 8) as i8 + deltas[i].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bb |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = Bitboard(bb);
        sq += 1;
    }
    table
}
