//! Transposition table.
//!
//! A fixed array of buckets indexed by `key % len`. Under the two-tier policy
//! each bucket holds a depth-preferred slot, replaced only by an entry at
//! least as deep (or for the same position), and an always-replace slot that
//! takes everything else. Under the always-replace policy only the first slot
//! is used and every store overwrites it.
//!
//! Mate scores are stored relative to the node rather than the root, so a
//! mate found at one ply is still correct when the position is reached at
//! another.

use crate::config::ReplacementPolicy;
use crate::search::MATE_THRESHOLD;
use kestrel_core::Move;

/// What a stored score says about the true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is exact.
    Exact,
    /// The search failed high; the true score is at least this.
    Lower,
    /// No move raised alpha; the true score is at most this.
    Upper,
}

/// One cached search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    pub key: u64,
    pub best_move: Move,
    /// Node-relative score.
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
}

type Bucket = [Option<TtEntry>; 2];

/// Fixed-size hash table of search results.
pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    policy: ReplacementPolicy,
}

impl TranspositionTable {
    /// Creates a table using about `size_mb` megabytes. Always holds at least
    /// one bucket.
    pub fn new(size_mb: usize, policy: ReplacementPolicy) -> Self {
        let bytes = size_mb.saturating_mul(1024 * 1024);
        let len = (bytes / std::mem::size_of::<Bucket>()).max(1);
        TranspositionTable {
            buckets: vec![[None; 2]; len],
            policy,
        }
    }

    /// Number of buckets.
    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.iter().all(Option::is_none))
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.buckets.fill([None; 2]);
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key % self.buckets.len() as u64) as usize
    }

    /// Returns the entry stored for `key`, preferring the depth slot.
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        self.buckets[self.index(key)]
            .iter()
            .flatten()
            .find(|entry| entry.key == key)
            .copied()
    }

    /// Returns a score usable as-is at a node searched to `depth` with the
    /// window (`alpha`, `beta`), if the table has one.
    ///
    /// Exact entries always qualify; bound entries only when they already
    /// fall outside the window on their side.
    pub fn probe_score(
        &self,
        key: u64,
        depth: i32,
        alpha: i32,
        beta: i32,
        ply: usize,
    ) -> Option<i32> {
        let entry = self.probe(key)?;
        if i32::from(entry.depth) < depth {
            return None;
        }
        let score = score_from_tt(entry.score, ply);
        match entry.bound {
            Bound::Exact => Some(score),
            Bound::Lower if score >= beta => Some(score),
            Bound::Upper if score <= alpha => Some(score),
            _ => None,
        }
    }

    /// Returns the stored best move for `key`, or [`Move::NULL`].
    ///
    /// Available even when the entry is too shallow for a score cutoff.
    pub fn best_move(&self, key: u64) -> Move {
        self.probe(key).map_or(Move::NULL, |entry| entry.best_move)
    }

    /// Stores a result for the position `key`, searched at `ply` from the root.
    pub fn store(
        &mut self,
        key: u64,
        depth: i32,
        score: i32,
        best_move: Move,
        bound: Bound,
        ply: usize,
    ) {
        let entry = TtEntry {
            key,
            best_move,
            score: score_to_tt(score, ply),
            depth: depth.clamp(0, i32::from(u8::MAX)) as u8,
            bound,
        };
        let index = self.index(key);
        let bucket = &mut self.buckets[index];

        match self.policy {
            ReplacementPolicy::AlwaysReplace => bucket[0] = Some(entry),
            ReplacementPolicy::TwoTier => {
                let replace_deep = match bucket[0] {
                    None => true,
                    Some(stored) => stored.key == key || entry.depth >= stored.depth,
                };
                if replace_deep {
                    bucket[0] = Some(entry);
                    if bucket[1].is_some_and(|stored| stored.key == key) {
                        bucket[1] = None;
                    }
                } else {
                    bucket[1] = Some(entry);
                }
            }
        }
    }
}

/// Converts a root-relative mate score to a node-relative one.
#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}
