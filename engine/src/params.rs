//! Tuning constants shared by the history table, move scorer and
//! transposition table. Grouped here so the magic numbers that define the
//! score layering (see [`crate::scoring`]) live next to each other.

/// The grain that separates the score layers in move ordering: hash move,
/// mate killer, good tactics, killers, quiets and bad tactics each occupy
/// their own multiple of `G`, wide enough that a quiet move's history
/// score (bounded by `MAX_HISTORY`) can never spill into a neighboring
/// layer.
pub const G: i32 = MAX_HISTORY;

/// Saturating bound on a history table entry.
pub const MAX_HISTORY: i32 = 1 << 14;

/// Number of killer-move slots tracked per search node, plus the separate
/// mate-killer slot.
pub const MAX_KILLERS: usize = 5;

/// Upper bound on search depth, used to size the per-ply killer table.
pub const MAX_DEPTH: usize = 128;

/// Transposition table age counter wraps modulo this value.
pub const GEN_LIMIT: u8 = 8;

/// Size, in plies, of the ordered-prefix best-first selection before a
/// phase falls back to plain generation order.
pub mod ordered_prefix {
    pub const ROOT: usize = 0;
    pub const PV: usize = 256;
    pub const NON_PV: usize = 256;
    pub const ESCAPE: usize = 16;
    pub const Q: usize = 4;
    pub const Q_CHECK: usize = 4;
}
