//! Pure scoring functions for move ordering.
//!
//! Every phase of the move selector eventually needs an integer score to
//! rank its candidates. The score layers are kept well apart by the
//! common grain `G` (see [`crate::params`]) so that, were every candidate
//! ever pooled into one list and sorted, a hash move would always come
//! out on top, a mate killer just below it, then good tactics, ordinary
//! killers, quiets and finally bad tactics -- in that order. The staged
//! selector doesn't actually need that global property (phase order
//! already enforces it), but quiescence search does pool tactics and
//! quiet checks into a single phase, and relies on it there (see
//! [`crate::selector`]'s `QSEARCH` handling).

use chess::board::Board;
use chess::movegen::moves::Move;
use chess::piece::PieceType;
use chess::see::piece_value;

use crate::params::G;

/// The piece standing on a move's capture square, if any. For en passant
/// this is the captured pawn, not whatever (nothing) sits on the target
/// square.
pub fn captured_piece_type(board: &Board, mv: Move) -> Option<PieceType> {
    if mv.is_en_passant() {
        Some(PieceType::Pawn)
    } else if mv.is_capture() {
        board.get_at(mv.get_capture_sq()).map(|p| p.piece_type())
    } else {
        None
    }
}

pub fn score_hash_move() -> i32 {
    1000 * G
}

pub fn score_mate_killer() -> i32 {
    1000 * G - 1
}

/// The class score of a capture/promotion once it's known to be a *good*
/// tactic (non-negative SEE, or a queen promotion).
pub fn score_good_tactic(capture_value: i32, piece_value: i32) -> i32 {
    800 * G + 6 * capture_value - piece_value + 5
}

/// The mirror image of [`score_good_tactic`] for tactics whose exchange
/// loses material.
pub fn score_bad_tactic(capture_value: i32, piece_value: i32) -> i32 {
    -800 * G + 6 * capture_value - piece_value + 5
}

pub fn score_killer(slot: usize) -> i32 {
    700 * G - slot as i32
}

/// A quiet move's score is simply its history value, already bounded to
/// `±MAX_HISTORY` by [`crate::history_tables::History::bump`].
pub fn score_quiet(history_value: i32) -> i32 {
    history_value
}

/// The cheap ordering proxy used by the `GOOD_TACTICS` phase to decide
/// which candidate to try (and hence SEE-check) next, in place of sorting
/// by SEE directly. `capture_value`/`piece_value` are the material values
/// of the captured piece (0 if none) and the moving piece.
pub fn good_tactics_proxy(board: &Board, mv: Move) -> i32 {
    let piece = board.get_at(mv.src()).expect("move source holds a piece").piece_type();
    let piece_val = piece_value(piece);
    let victim = captured_piece_type(board, mv);
    let capture_val = victim.map(piece_value).unwrap_or(0);

    let bonus = match mv.get_promo_type() {
        Some(promo) if promo != PieceType::Queen => -1000,
        _ => match victim {
            Some(v) if v as usize >= piece as usize => piece_value(v) - piece_val,
            _ => 0,
        },
    };

    6 * capture_val - piece_val + bonus
}

/// A generic, single-pass scorer used by the `EVASIONS` phase, which
/// doesn't separate tactics from quiets into their own stages: captures
/// and promotions are scored with the same proxy `GOOD_TACTICS` uses,
/// everything else falls back to history.
pub fn score_generic(board: &Board, mv: Move, history_value: i32) -> i32 {
    if mv.is_tactical() {
        good_tactics_proxy(board, mv)
    } else {
        score_quiet(history_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_strictly_ordered() {
        // Comfortably worst-case values for each layer: a bad tactic that
        // captures nothing of note, a quiet move saturated at
        // `MAX_HISTORY`, and a killer in the last slot.
        let bad = score_bad_tactic(0, piece_value(PieceType::Queen));
        let quiet = score_quiet(crate::params::MAX_HISTORY);
        let killer = score_killer(crate::params::MAX_KILLERS - 1);
        let good = score_good_tactic(0, piece_value(PieceType::Pawn));
        let mate_killer = score_mate_killer();
        let hash = score_hash_move();

        assert!(bad < quiet);
        assert!(quiet < killer);
        assert!(killer < good);
        assert!(good < mate_killer);
        assert!(mate_killer < hash);
    }

    #[test]
    fn good_tactics_proxy_prefers_valuable_victims() {
        let board: Board = "3r4/8/8/8/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let rook_capture: Move = "d1d8".parse::<Move>().unwrap();
        // A made-up, much less valuable capture for comparison.
        let board2: Board = "8/8/8/3n4/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let knight_capture: Move = "d1d5".parse::<Move>().unwrap();

        assert!(good_tactics_proxy(&board, rook_capture) > good_tactics_proxy(&board2, knight_capture));
    }

    #[test]
    fn underpromotion_is_penalized() {
        let board: Board = "8/3P4/8/8/4k3/8/8/4K3 w - - 0 1".parse().unwrap();
        let queen_promo: Move = "d7d8q".parse().unwrap();
        let knight_promo: Move = "d7d8n".parse().unwrap();

        assert!(good_tactics_proxy(&board, queen_promo) > good_tactics_proxy(&board, knight_promo));
    }
}
