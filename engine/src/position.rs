//! A `Position` wraps a [`Board`] with the one piece of metadata this core
//! actually needs: its Zobrist hash, updated incrementally on every move so
//! hashing a position from scratch is never on the hot path.
//!
//! Unlike the richer `Position` types search engines tend to carry (pawn
//! hash, correction hashes, repetition history), this one restricts itself
//! to what the transposition table and move selector read: `hash`,
//! `side_to_move`, `in_check`, and do/undo.

use chess::board::{Board, Undo};
use chess::movegen::moves::Move;
use chess::zobrist::ZHash;

/// The state needed to undo a move played via [`Position::do_move`].
pub struct PositionUndo {
    board_undo: Undo,
    hash: ZHash,
}

#[derive(Debug, Clone)]
pub struct Position {
    pub board: Board,
    pub hash: ZHash,
}

impl Position {
    pub fn new(board: Board) -> Self {
        let hash = ZHash::from(&board);
        Self { board, hash }
    }

    pub fn side_to_move(&self) -> chess::piece::Color {
        self.board.current
    }

    pub fn in_check(&self) -> bool {
        self.board.in_check()
    }

    /// Play `mv`, updating the board and hash in place, and return the
    /// state required to undo it.
    pub fn do_move(&mut self, mv: Move) -> PositionUndo {
        let prev_hash = self.hash;
        let us = self.board.current;

        if let Some(captured) = self.captured_piece(mv) {
            self.hash.toggle_piece(captured, mv.get_capture_sq());
        }

        let moved = self.board.get_at(mv.src()).expect("move source holds a piece");
        self.hash.toggle_piece(moved, mv.src());

        let placed = mv.get_promo_piece(us).unwrap_or(moved);
        self.hash.toggle_piece(placed, mv.tgt());

        if mv.is_castle() {
            let (rook_src, rook_tgt) = castle_rook_squares(mv, us);
            let rook = self.board.get_at(rook_src).expect("castling rook");
            self.hash.toggle_piece(rook, rook_src);
            self.hash.toggle_piece(rook, rook_tgt);
        }

        self.hash.toggle_castling(self.board.castling_rights);

        if let Some(ep) = self.board.en_passant {
            self.hash.toggle_ep(ep);
        }

        let board_undo = self.board.do_move(mv);

        self.hash.toggle_castling(self.board.castling_rights);

        if let Some(ep) = self.board.en_passant {
            self.hash.toggle_ep(ep);
        }

        self.hash.toggle_side();

        PositionUndo { board_undo, hash: prev_hash }
    }

    pub fn undo_move(&mut self, mv: Move, undo: PositionUndo) {
        self.board.undo_move(mv, undo.board_undo);
        self.hash = undo.hash;
    }

    fn captured_piece(&self, mv: Move) -> Option<chess::piece::Piece> {
        if mv.is_en_passant() {
            self.board.get_at(mv.get_capture_sq())
        } else if mv.is_capture() {
            self.board.get_at(mv.tgt())
        } else {
            None
        }
    }
}

fn castle_rook_squares(mv: Move, us: chess::piece::Color) -> (chess::square::Square, chess::square::Square) {
    use chess::movegen::moves::MoveType;
    use chess::piece::Color;
    use chess::square::Square;

    match (mv.get_type(), us) {
        (MoveType::KingCastle, Color::White) => (Square::H1, Square::F1),
        (MoveType::QueenCastle, Color::White) => (Square::A1, Square::D1),
        (MoveType::KingCastle, Color::Black) => (Square::H8, Square::F8),
        (MoveType::QueenCastle, Color::Black) => (Square::A8, Square::D8),
        _ => unreachable!("not a castling move"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::movegen::moves::MoveType;
    use chess::square::Square;

    #[test]
    fn incremental_hash_matches_from_scratch() {
        let board: Board = chess::fen::STARTPOS.parse().unwrap();
        let mut position = Position::new(board);

        let mv: Move = "e2e4".parse().unwrap();
        let undo = position.do_move(mv);

        let expected = ZHash::from(&position.board);
        assert_eq!(position.hash, expected);

        position.undo_move(mv, undo);
        assert_eq!(position.hash, ZHash::from(&position.board));
    }

    #[test]
    fn capture_toggles_the_captured_piece_out_of_the_hash() {
        let board: Board = "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut position = Position::new(board);

        let mv = Move::new(Square::E4, Square::D5, MoveType::Capture);
        let undo = position.do_move(mv);

        assert_eq!(position.hash, ZHash::from(&position.board));

        position.undo_move(mv, undo);
        assert_eq!(position.hash, ZHash::from(&position.board));
    }

    #[test]
    fn castling_toggles_the_rook_in_the_hash_too() {
        let board: Board = "4k3/8/8/8/8/8/8/4K2R w K - 0 1".parse().unwrap();
        let mut position = Position::new(board);
        let before = position.hash;

        let mv = Move::new(Square::E1, Square::G1, MoveType::KingCastle);
        let undo = position.do_move(mv);

        assert_eq!(position.hash, ZHash::from(&position.board));
        assert_ne!(position.hash, before, "castling must change the hash (king and rook both moved)");

        position.undo_move(mv, undo);
        assert_eq!(position.hash, before);
    }

    #[test]
    fn promotion_toggles_the_promoted_piece_not_the_pawn() {
        let board: Board = "4k3/3P4/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let mut position = Position::new(board);

        let mv = Move::new(Square::D7, Square::D8, MoveType::QueenPromo);
        let undo = position.do_move(mv);

        assert_eq!(position.hash, ZHash::from(&position.board));

        position.undo_move(mv, undo);
        assert_eq!(position.hash, ZHash::from(&position.board));
    }
}
