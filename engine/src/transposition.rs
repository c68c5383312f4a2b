//! The transposition table: a fixed-size, bucketed cache mapping Zobrist
//! keys to previously searched results.
//!
//! As the search walks the game tree it's bound to come across duplicate
//! positions -- transpositions -- reached by different move orders.
//! Rather than redo that work, each node that finishes a search stores
//! its result here, keyed by [`ZHash`], so a later node reaching the same
//! position can reuse it outright or at least seed its move ordering with
//! the previous best move.
//!
//! Two collision risks come with the territory. A full 64-bit Zobrist
//! collision (two distinct positions hashing identically) is accepted as
//! vanishingly rare and not guarded against. A *bucket* collision (two
//! positions whose hashes share the same low bits, since we only index by
//! `hash mod N`) is far more common and is resolved by storing the full
//! key alongside the entry and checking it on every probe.

use std::mem::size_of;

use anyhow::{anyhow, Result};
use chess::board::Board;
use chess::movegen::moves::Move;
use chess::zobrist::ZHash;

use crate::params::GEN_LIMIT;
use crate::position::Position;

/// The number of entries sharing a bucket. Four is the classic choice:
/// wide enough to absorb bucket collisions without a linear scan getting
/// expensive, narrow enough to keep a bucket in a cache line or two.
pub const BUCKET_SIZE: usize = 4;

/// The smallest table we're willing to allocate. Anything smaller isn't
/// worth the bookkeeping and is almost certainly a caller error (e.g. a
/// byte/megabyte unit mixup).
const MIN_BYTES: usize = 1024;

/// Whether a stored score is exact, or a bound established by a cutoff.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScoreType {
    /// The search completed within the window: `score` is the position's
    /// true value.
    Exact,
    /// The search failed low: the true value is at most `score`.
    Upper,
    /// The search failed high (a beta cutoff): the true value is at
    /// least `score`.
    Lower,
}

/// A single transposition table entry. An entry with `key == 0` is
/// considered empty; the hasher treats an all-zero hash as a legitimate
/// (if astronomically unlikely) position, so this is a calculated risk
/// rather than a true reserved value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct TTEntry {
    key: u64,
    best_move: Move,
    score: i16,
    depth: u8,
    age: u8,
    score_type: ScoreType,
}

impl TTEntry {
    const EMPTY: TTEntry = TTEntry {
        key: 0,
        best_move: Move::NULL,
        score: 0,
        depth: 0,
        age: 0,
        score_type: ScoreType::Exact,
    };

    fn is_empty(&self) -> bool {
        self.key == 0
    }
}

impl Default for TTEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A probe result: everything a caller needs to decide whether (and how)
/// to use a cached search result.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub best_move: Move,
    pub score: i16,
    pub depth: u8,
    pub score_type: ScoreType,
    pub age: u8,
}

#[derive(Debug, Default, Clone, Copy)]
struct Stats {
    probes: u64,
    hits: u64,
    stores: u64,
    overwrites: u64,
}

/// The transposition table itself: `N` buckets of [`BUCKET_SIZE`] entries
/// each, `N` a power of two chosen so the table fits the requested byte
/// budget.
pub struct TranspositionTable {
    buckets: Vec<[TTEntry; BUCKET_SIZE]>,
    generation: u8,
    /// `age_score[i]` is the replacement cost of an entry last touched
    /// `i` generations ago, recomputed whenever the generation advances.
    /// Entries from the current generation carry the highest cost, so
    /// they're the last to be evicted.
    age_score: [i32; GEN_LIMIT as usize],
    stats: Stats,
}

impl TranspositionTable {
    /// Allocate a table sized to fit within `max_bytes`, choosing the
    /// largest power-of-two bucket count that does. Rejects requests
    /// smaller than 1 KiB, on the assumption that anything that small is
    /// a caller mistake rather than an intentionally tiny table.
    pub fn init(max_bytes: usize) -> Result<Self> {
        if max_bytes < MIN_BYTES {
            return Err(anyhow!(
                "transposition table size {max_bytes} bytes is below the {MIN_BYTES}-byte minimum"
            ));
        }

        let bucket_bytes = BUCKET_SIZE * size_of::<TTEntry>();
        let mut bucket_count = (max_bytes / bucket_bytes).next_power_of_two();
        // `next_power_of_two` rounds up; if that overshoots the budget,
        // step back down to the next power of two.
        if bucket_count * bucket_bytes > max_bytes {
            bucket_count /= 2;
        }
        bucket_count = bucket_count.max(1);

        Ok(Self {
            buckets: vec![[TTEntry::EMPTY; BUCKET_SIZE]; bucket_count],
            generation: 0,
            age_score: Self::compute_age_scores(0),
            stats: Stats::default(),
        })
    }

    fn compute_age_scores(generation: u8) -> [i32; GEN_LIMIT as usize] {
        std::array::from_fn(|i| {
            let age_distance = (generation as i32 - i as i32).rem_euclid(GEN_LIMIT as i32);
            age_distance * 128
        })
    }

    /// Zero every entry and reset the hit/store statistics. Does not
    /// affect the generation counter.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            *bucket = [TTEntry::EMPTY; BUCKET_SIZE];
        }
        self.stats = Stats::default();
    }

    /// Advance the generation counter, wrapping modulo [`GEN_LIMIT`], and
    /// recompute the replacement-score table so entries from the new
    /// generation become the most expensive to evict.
    pub fn increment_age(&mut self) {
        self.generation = (self.generation + 1) % GEN_LIMIT;
        self.age_score = Self::compute_age_scores(self.generation);
    }

    pub fn generation(&self) -> u8 {
        self.generation
    }

    fn bucket_index(&self, key: ZHash) -> usize {
        key.index(self.buckets.len())
    }

    /// Look up `key`. A hit refreshes the entry's age to the current
    /// generation, since a read is evidence the position is still
    /// relevant to the search.
    pub fn probe(&mut self, key: ZHash) -> Option<ProbeResult> {
        self.stats.probes += 1;
        let idx = self.bucket_index(key);
        let generation = self.generation;

        let entry = self.buckets[idx].iter_mut().find(|e| !e.is_empty() && e.key == key.0)?;

        entry.age = generation;
        self.stats.hits += 1;

        Some(ProbeResult {
            best_move: entry.best_move,
            score: entry.score,
            depth: entry.depth,
            score_type: entry.score_type,
            age: entry.age,
        })
    }

    /// Insert or update the entry for `key`. An existing entry for the
    /// same key is always overwritten and its age refreshed. Otherwise
    /// the *victim* -- the entry maximizing `age_score[age] - depth` --
    /// is replaced; empty slots have `age == 0` and `depth == 0`, which
    /// gives them the highest possible replacement score, so they're
    /// chosen first whenever one is free.
    pub fn store(&mut self, key: ZHash, best_move: Move, depth: u8, score: i16, score_type: ScoreType) {
        let idx = self.bucket_index(key);
        let generation = self.generation;
        let bucket = &mut self.buckets[idx];

        if let Some(entry) = bucket.iter_mut().find(|e| !e.is_empty() && e.key == key.0) {
            entry.best_move = best_move;
            entry.depth = depth;
            entry.score = score;
            entry.score_type = score_type;
            entry.age = generation;
            self.stats.stores += 1;
            return;
        }

        let age_score = self.age_score;
        let victim = bucket
            .iter_mut()
            .max_by_key(|e| age_score[e.age as usize] - e.depth as i32)
            .expect("bucket has at least one entry");

        let was_occupied = !victim.is_empty();

        *victim = TTEntry { key: key.0, best_move, score, depth, age: generation, score_type };

        self.stats.stores += 1;
        if was_occupied {
            self.stats.overwrites += 1;
        }
    }

    /// Refresh a principal variation after an iteration completes, so its
    /// moves aren't lost to replacement pressure before the next
    /// iteration can use them. Plays the line on a scratch position and
    /// stores each prefix as an exact score at a decreasing depth,
    /// undoing as it unwinds so the caller's position is untouched.
    pub fn store_line(&mut self, position: &mut Position, pv: &[Move], depth: u8, score: i16) {
        let mut undos = Vec::with_capacity(pv.len());

        for (i, &mv) in pv.iter().enumerate() {
            let remaining = depth.saturating_sub(i as u8);
            self.store(position.hash, mv, remaining, score, ScoreType::Exact);
            undos.push(position.do_move(mv));
        }

        for (&mv, undo) in pv.iter().zip(undos).rev() {
            position.undo_move(mv, undo);
        }
    }

    /// Fraction of slots currently occupied, in `0..=1`. Matches the
    /// definition UCI's `hashfull` wants, just not yet scaled to
    /// per-mille.
    pub fn occupancy(&self) -> f64 {
        let occupied: usize = self.buckets.iter().flatten().filter(|e| !e.is_empty()).count();
        let total = self.buckets.len() * BUCKET_SIZE;
        occupied as f64 / total as f64
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// A human-readable report of hit/miss/fill/eviction counts, in the
    /// same terse style the rest of the engine prints its diagnostics in.
    pub fn print_stats(&self) {
        use colored::Colorize;

        let misses = self.stats.probes - self.stats.hits;
        println!("{:17} {}", "TT probes".purple(), self.stats.probes);
        println!("{:17} {}", "TT hits".purple(), self.stats.hits);
        println!("{:17} {}", "TT misses".purple(), misses);
        println!("{:17} {:.1}%", "TT fill".purple(), 100.0 * self.occupancy());
        println!("{:17} {}", "TT stores".purple(), self.stats.stores);
        println!("{:17} {}", "TT evictions".purple(), self.stats.overwrites);
    }

    /// Zobrist hash `Board` bridges to `ZHash` directly: a convenience
    /// constructor for callers that only have a bare board, not a
    /// [`Position`].
    pub fn hash_of(board: &Board) -> ZHash {
        ZHash::from(board)
    }
}
