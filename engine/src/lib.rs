//! Search-support core for the Harrier chess engine: move ordering and
//! the transposition table.
//!
//! This crate sits directly on top of `harrier-chess` (board
//! representation, move generation, SEE) and provides the two pieces of
//! state an alpha-beta search loop needs at every node: a [`selector`]
//! that decides which move to try next, and a [`transposition`] table
//! that remembers what earlier search already learned about a position.
//! It does not itself search, evaluate or speak UCI.

pub mod history_tables;
pub mod params;
pub mod position;
pub mod root_moves;
pub mod scoring;
pub mod selector;
pub mod transposition;

pub use history_tables::{History, Killers, SearchStack};
pub use position::{Position, PositionUndo};
pub use root_moves::{RootMove, RootMoveList};
pub use selector::{Generator, KillerContext, MoveSelector};
pub use transposition::{ProbeResult, ScoreType, TranspositionTable};
