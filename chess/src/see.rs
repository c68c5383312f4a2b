//! Static exchange evaluation: the material balance of a capture sequence
//! on a single square, assuming both sides keep recapturing with their
//! least valuable attacker.
//!
//! This lives in the board crate (rather than a full evaluator) because it
//! only needs attack generation and piece values, not positional
//! knowledge. The search layer uses the sign and magnitude of the result
//! to decide whether a capture is worth searching deeply.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen::moves::Move;
use crate::piece::{Piece, PieceType};
use crate::square::Square;

/// Ordering-only piece values; not meant to double as evaluation terms.
pub fn piece_value(ptype: PieceType) -> i32 {
    match ptype {
        PieceType::Pawn => 100,
        PieceType::Knight => 320,
        PieceType::Bishop => 330,
        PieceType::Rook => 500,
        PieceType::Queen => 900,
        PieceType::King => 20_000,
    }
}

/// The net material swing of playing `mv` through to the end of the
/// exchange on its target square, from the mover's perspective. Positive
/// means the exchange wins material.
///
/// Quiet moves that don't capture or promote trivially exchange nothing
/// and evaluate to zero.
pub fn static_exchange_eval(board: &Board, mv: Move) -> i32 {
    if !mv.is_tactical() {
        return 0;
    }

    const MAX_DEPTH: usize = 32;

    let tgt = mv.tgt();
    let us = board.current;
    let mut occupied = board.all_occupied();

    let mover = board.get_at(mv.src()).expect("see: move source holds a piece");
    let captured = if mv.is_en_passant() {
        Some(Piece::new(PieceType::Pawn, !us))
    } else {
        board.get_at(tgt)
    };

    let mut gains = [0i32; MAX_DEPTH];
    let mut depth = 0;
    gains[0] = captured.map(|p| piece_value(p.piece_type())).unwrap_or(0);

    let mut moving_value = piece_value(mover.piece_type());
    if let Some(promo) = mv.get_promo_type() {
        let bonus = piece_value(promo) - piece_value(PieceType::Pawn);
        gains[0] += bonus;
        moving_value += bonus;
    }

    occupied.clear(mv.src());
    if mv.is_en_passant() {
        occupied.clear(mv.get_capture_sq());
    }

    let mut side = !us;

    while depth + 1 < MAX_DEPTH {
        let attackers = board.attackers(tgt, occupied) & board.occupied_by(side);

        let Some((sq, value)) = least_valuable_attacker(board, attackers) else { break };

        depth += 1;
        gains[depth] = moving_value - gains[depth - 1];
        moving_value = value;
        occupied.clear(sq);
        side = !side;
    }

    while depth > 0 {
        gains[depth - 1] = -(-gains[depth - 1]).max(gains[depth]);
        depth -= 1;
    }

    gains[0]
}

/// Whether `mv`'s exchange sequence meets or beats `threshold`. A thin
/// wrapper over [`static_exchange_eval`] for call sites that only care
/// about a pass/fail cutoff (e.g. pruning losing captures).
pub fn see_above(board: &Board, mv: Move, threshold: i32) -> bool {
    static_exchange_eval(board, mv) >= threshold
}

fn least_valuable_attacker(board: &Board, attackers: Bitboard) -> Option<(Square, i32)> {
    attackers
        .into_iter()
        .filter_map(|sq| board.get_at(sq).map(|p| (sq, piece_value(p.piece_type()))))
        .min_by_key(|&(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn losing_queen_trade_is_negative() {
        // White queen takes a pawn defended by a black rook: loses the
        // queen for a pawn.
        let board: Board = "4r3/8/8/3p4/8/8/8/3Q4 w - - 0 1".parse().unwrap();
        let mv: Move = "d1d5".parse().unwrap();
        assert!(static_exchange_eval(&board, mv) < 0);
    }

    #[test]
    fn winning_pawn_capture_is_positive() {
        // Undefended pawn: a clean win of a pawn.
        let board: Board = "8/8/8/3p4/4P3/8/8/4K2k w - - 0 1".parse().unwrap();
        let mv: Move = "e4d5".parse().unwrap();
        assert_eq!(static_exchange_eval(&board, mv), piece_value(PieceType::Pawn));
    }
}
