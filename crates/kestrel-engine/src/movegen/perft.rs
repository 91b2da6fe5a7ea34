//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth. The
//! counts for the standard test positions are well known, so any mismatch
//! points at a generator or make/undo bug.

use super::generate_moves;
use crate::Position;

/// Counts the leaf nodes at the given depth.
///
/// The position is walked with make/undo and is unchanged on return.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        position.make_move(m);
        nodes += perft(position, depth - 1);
        position.undo_move(m);
    }
    nodes
}

/// Leaf counts below each root move, sorted by UCI text.
///
/// Useful for narrowing a perft mismatch down to one move.
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(position);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        position.make_move(m);
        let nodes = perft(position, depth.saturating_sub(1));
        position.undo_move(m);
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
    const POSITION_6: &str =
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

    /// Checks `expected[i]` against perft at depth `i + 1`.
    fn check(fen: &str, expected: &[u64]) {
        let mut position = Position::from_fen(fen).unwrap();
        let before = position.clone();
        for (depth, &count) in (1..).zip(expected) {
            assert_eq!(perft(&mut position, depth), count, "{} at depth {}", fen, depth);
        }
        assert_eq!(position, before);
    }

    #[test]
    fn perft_startpos() {
        check(kestrel_core::FenParser::STARTPOS, &[20, 400, 8902]);
    }

    #[test]
    fn perft_kiwipete() {
        check(KIWIPETE, &[48, 2039]);
    }

    #[test]
    fn perft_position3() {
        check(POSITION_3, &[14, 191, 2812]);
    }

    #[test]
    fn perft_position4() {
        check(POSITION_4, &[6, 264, 9467]);
    }

    #[test]
    fn perft_position4_mirrored() {
        check(
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            &[6, 264, 9467],
        );
    }

    #[test]
    fn perft_position5() {
        check(POSITION_5, &[44, 1486]);
    }

    #[test]
    fn perft_position6() {
        check(POSITION_6, &[46, 2079]);
    }

    // Deeper counts take a few seconds in debug builds
    #[test]
    #[ignore]
    fn perft_deep() {
        check(kestrel_core::FenParser::STARTPOS, &[20, 400, 8902, 197_281, 4_865_609]);
        check(KIWIPETE, &[48, 2039, 97_862, 4_085_603]);
        check(POSITION_3, &[14, 191, 2812, 43_238, 674_624]);
        check(POSITION_4, &[6, 264, 9467, 422_333]);
        check(POSITION_5, &[44, 1486, 62_379, 2_103_487]);
        check(POSITION_6, &[46, 2079, 89_890]);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let mut position = Position::from_fen(KIWIPETE).unwrap();
        let results = perft_divide(&mut position, 2);
        assert_eq!(results.len(), 48);
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 2039);
        assert!(results.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
