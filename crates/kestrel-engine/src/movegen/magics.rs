//! Magic bitboard tables for sliding piece attack generation.
//!
//! Each square owns an attack array with one slot per subset of its relevant
//! occupancy mask. A subset is hashed into its slot by multiplying with the
//! square's magic constant and keeping the top bits. The constants below were
//! found offline and are collision-free for every subset.

use super::attacks::{ray, Direction};
use crate::Bitboard;
use kestrel_core::Square;
use std::sync::OnceLock;

/// Magic lookup data for a single square.
struct Magic {
    /// Relevant blocker squares (edges beyond the last blocker excluded).
    mask: Bitboard,
    magic: u64,
    /// 64 minus the number of bits in `mask`.
    shift: u32,
    /// Attack sets indexed by hashed occupancy.
    attacks: Box<[Bitboard]>,
}

impl Magic {
    fn new(sq: Square, multiplier: u64, directions: [Direction; 4]) -> Self {
        let mask = relevant_mask(sq, directions);
        let bits = mask.count();
        let mut magic = Magic {
            mask,
            magic: multiplier,
            shift: 64 - bits,
            attacks: vec![Bitboard::EMPTY; 1 << bits].into_boxed_slice(),
        };

        // Carry-rippler walk over every subset of the mask
        let mut blockers = Bitboard::EMPTY;
        loop {
            let index = magic.index(blockers);
            magic.attacks[index] = slider_attacks_slow(sq, blockers, directions);
            blockers = Bitboard(blockers.0.wrapping_sub(mask.0) & mask.0);
            if blockers.is_empty() {
                break;
            }
        }
        magic
    }

    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }

    #[inline]
    fn attacks(&self, occupied: Bitboard) -> Bitboard {
        self.attacks[self.index(occupied)]
    }
}

/// Process-wide slider attack tables and square-pair line masks.
struct AttackTables {
    rook: Vec<Magic>,
    bishop: Vec<Magic>,
    /// Full board-edge to board-edge line through two aligned squares.
    lines: Box<[[Bitboard; 64]]>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

const ORTHOGONAL: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

const DIAGONAL: [Direction; 4] = [
    Direction::NorthEast,
    Direction::NorthWest,
    Direction::SouthWest,
    Direction::SouthEast,
];

impl AttackTables {
    fn new() -> Self {
        let rook = Square::all()
            .map(|sq| Magic::new(sq, ROOK_MAGICS[sq.index() as usize], ORTHOGONAL))
            .collect();
        let bishop = Square::all()
            .map(|sq| Magic::new(sq, BISHOP_MAGICS[sq.index() as usize], DIAGONAL))
            .collect();

        let mut lines = vec![[Bitboard::EMPTY; 64]; 64].into_boxed_slice();
        for from in Square::all() {
            for dir in Direction::ALL {
                let opposite = Direction::ALL[(dir as usize + 4) % 8];
                let full = ray(dir, from) | ray(opposite, from) | Bitboard::from_square(from);
                for to in ray(dir, from) {
                    lines[from.index() as usize][to.index() as usize] = full;
                }
            }
        }

        AttackTables {
            rook,
            bishop,
            lines,
        }
    }
}

#[inline]
fn tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(AttackTables::new)
}

/// Builds the slider tables if they have not been built yet.
///
/// Lookups build them lazily too; calling this up front keeps the one-time
/// cost out of the first search.
pub fn init() {
    tables();
}

/// Returns bishop attacks for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().bishop[sq.index() as usize].attacks(occupied)
}

/// Returns rook attacks for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().rook[sq.index() as usize].attacks(occupied)
}

/// Returns queen attacks (bishop + rook).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

/// Returns the full line through two squares on a shared rank, file or
/// diagonal, or an empty bitboard if they are not aligned.
#[inline]
pub fn line(a: Square, b: Square) -> Bitboard {
    tables().lines[a.index() as usize][b.index() as usize]
}

/// Ray squares a blocker can stand on and still change the attack set:
/// the last square before each board edge is dropped.
fn relevant_mask(sq: Square, directions: [Direction; 4]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for dir in directions {
        let squares = ray(dir, sq);
        let edge = if dir.is_increasing() {
            squares.msb()
        } else {
            squares.lsb()
        };
        mask |= squares;
        if let Some(edge) = edge {
            mask.clear(edge);
        }
    }
    mask
}

/// Ray-casting attack generation, used only to fill the tables.
fn slider_attacks_slow(sq: Square, blockers: Bitboard, directions: [Direction; 4]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for dir in directions {
        let squares = ray(dir, sq);
        let nearest = if dir.is_increasing() {
            (squares & blockers).lsb()
        } else {
            (squares & blockers).msb()
        };
        attacks |= match nearest {
            Some(blocker) => squares & !ray(dir, blocker),
            None => squares,
        };
    }
    attacks
}

const ROOK_MAGICS: [u64; 64] = [
    0x4080004004201080,
    0x8440001000200042,
    0x02001020802a0040,
    0x0080048090010800,
    0x12000c8820100200,
    0x010001000884004a,
    0x1480048002000900,
    0x0980110003402080,
    0x0002800240008120,
    0x1600401000600240,
    0x8013001020030040,
    0x00090009e1009000,
    0x8010800400820801,
    0x0104010814001020,
    0x0024000210044801,
    0x8201000210804300,
    0x0000818000604000,
    0x00100040006010c0,
    0x0a02020020804010,
    0x0188490010030060,
    0x0000808008022400,
    0x4752008002840080,
    0x00c00c0010080203,
    0x0020020000cb0184,
    0x0140400080008024,
    0x0040400080802000,
    0xc011001100402000,
    0x0a85100080080080,
    0x00000800800c0080,
    0x0080240080020080,
    0x0c32002a00080405,
    0x0000004200030194,
    0x4148400080800060,
    0x0040400080802000,
    0xc021421101002004,
    0x00002a00420011a0,
    0x8004880080804400,
    0x2816120080800400,
    0x0000080254000530,
    0x01400104a2000244,
    0x2080802140108000,
    0x4060100048204001,
    0x8013001020030040,
    0x0402100008008080,
    0x0004004800808034,
    0x9402008810320004,
    0x0000100312440018,
    0x00040c40a1120004,
    0x0409408201106200,
    0x00100040006010c0,
    0x0409408201106200,
    0x0008008508500080,
    0x00000800800c0080,
    0x0080240080020080,
    0x0340020110482400,
    0x0214609444030200,
    0x0111008004214211,
    0x1000804000110429,
    0x0101002000400831,
    0x0000050010010821,
    0x2002000420105806,
    0x4109006804005201,
    0x1001300803189604,
    0x2004048104006846,
];

const BISHOP_MAGICS: [u64; 64] = [
    0x4204040082040107,
    0x0108a1030a021100,
    0x4204040082040107,
    0x4204040082040107,
    0x1041114000020800,
    0x1086010420080042,
    0x0e22021002088844,
    0x00018200808440b0,
    0x0420400902040340,
    0x0200304102009204,
    0x0082084206420040,
    0x0002680849000004,
    0x0001011040000004,
    0x010101112840000a,
    0x0000210188200b00,
    0x4800020101013008,
    0x43088a0420380204,
    0x0208000410808a00,
    0x141000080040c088,
    0x5008000c02102065,
    0x80150004904000a8,
    0x24220082a0900806,
    0x0214002105080702,
    0x0400400201008802,
    0x0008096440508100,
    0x0c88200002048100,
    0x013804020840c200,
    0x0000480000820040,
    0x0019001001014000,
    0x028400c028081200,
    0x0408004246010400,
    0x1404410040441202,
    0x200b184205200414,
    0x200b184205200414,
    0x8002009000121020,
    0x0812010040040040,
    0x0001050400060020,
    0x5010004080011002,
    0x0205110200040242,
    0x1000840310014110,
    0x90b310626000d000,
    0x0410460220805100,
    0xc0000a0382005000,
    0x8400902038000500,
    0x0400200c10441400,
    0x0020410202000820,
    0x0028100444400881,
    0x01d8180040501084,
    0x0e22021002088844,
    0xc14101c24a200900,
    0x0400810588110001,
    0x04b000c042022110,
    0x0010004008a20004,
    0x0840411002008240,
    0x0108a1030a021100,
    0x0108a1030a021100,
    0x00018200808440b0,
    0x4800020101013008,
    0x844011008c1c8804,
    0x0084500000208800,
    0x0848090040082200,
    0x0801004004082090,
    0x0420400902040340,
    0x4204040082040107,
];
