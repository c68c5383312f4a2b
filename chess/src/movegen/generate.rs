//! Pseudo-legal move generators.
//!
//! Every generator here produces *pseudo-legal* moves: they obey the
//! movement rules for each piece, but may leave the mover's own king in
//! check. Full legality is established by trying the move via
//! [`Board::do_move`] and testing [`Board::in_check`] afterwards -- a
//! concern that lives with the search driver, not the generator. The one
//! exception is [`generate_evasions`], which the specification calls for
//! as a fully-legal set, since evasion nodes are small and benefit from
//! being exact.

use crate::bitboard::Bitboard;
use crate::board::{Board, CastlingRights};
use crate::movegen::lookups::*;
use crate::movegen::moves::{Move, MoveList, MoveType};
use crate::piece::{Color, PieceType};
use crate::square::Square;

/// Marker type selecting the tactical (captures + promotions) generator.
pub struct Tacticals;
/// Marker type selecting the quiet-move generator.
pub struct Quiets;
/// Marker type selecting the evasion generator.
pub struct Evasions;
/// Marker type selecting the quiescence generator without checks.
pub struct QSearch;
/// Marker type selecting the quiescence generator with checks.
pub struct QSearchChecks;

impl Board {
    pub fn generate_pseudo_tactical_moves(&self, out: &mut MoveList) -> usize {
        let start = out.len();
        let us = self.current;
        self.pawn_captures_and_promos(us, out);

        for sq in self.get_bb(PieceType::Knight, us) {
            push_captures(knight_attacks(sq), self.occupied_by(!us), sq, out);
        }
        for sq in self.get_bb(PieceType::Bishop, us) {
            push_captures(bishop_attacks(sq, self.all_occupied()), self.occupied_by(!us), sq, out);
        }
        for sq in self.get_bb(PieceType::Rook, us) {
            push_captures(rook_attacks(sq, self.all_occupied()), self.occupied_by(!us), sq, out);
        }
        for sq in self.get_bb(PieceType::Queen, us) {
            push_captures(queen_attacks(sq, self.all_occupied()), self.occupied_by(!us), sq, out);
        }
        for sq in self.get_bb(PieceType::King, us) {
            push_captures(king_attacks(sq), self.occupied_by(!us), sq, out);
        }

        out.len() - start
    }

    pub fn generate_pseudo_quiet_moves(&self, out: &mut MoveList) -> usize {
        let start = out.len();
        let us = self.current;
        let blockers = self.all_occupied();

        self.pawn_quiets(us, out);

        for sq in self.get_bb(PieceType::Knight, us) {
            push_quiets(knight_attacks(sq), blockers, sq, out);
        }
        for sq in self.get_bb(PieceType::Bishop, us) {
            push_quiets(bishop_attacks(sq, blockers), blockers, sq, out);
        }
        for sq in self.get_bb(PieceType::Rook, us) {
            push_quiets(rook_attacks(sq, blockers), blockers, sq, out);
        }
        for sq in self.get_bb(PieceType::Queen, us) {
            push_quiets(queen_attacks(sq, blockers), blockers, sq, out);
        }
        for sq in self.get_bb(PieceType::King, us) {
            push_quiets(king_attacks(sq), blockers, sq, out);
        }

        self.castle_moves(us, out);

        out.len() - start
    }

    pub fn generate_quiescence_moves(&self, out: &mut MoveList, include_checks: bool) -> usize {
        let start = out.len();
        self.generate_pseudo_tactical_moves(out);

        if include_checks {
            let mut quiets = MoveList::new();
            self.generate_pseudo_quiet_moves(&mut quiets);

            for &mv in quiets.iter() {
                if !mv.is_quiet() {
                    continue;
                }
                if self.gives_check(mv) {
                    out.push(mv);
                }
            }
        }

        out.len() - start
    }

    /// All *legal* responses to being in check: king steps, captures of the
    /// checking piece, and (for a single sliding checker) interpositions.
    pub fn generate_evasions(&self, out: &mut MoveList) -> usize {
        let start = out.len();
        let us = self.current;
        let king_sq = self.king_sq(us);
        let checkers = self.checkers();
        let blockers = self.all_occupied();

        // King moves, including captures: always available regardless of
        // single/double check.
        let king_targets = king_attacks(king_sq) & !self.occupied_by(us);
        for tgt in king_targets {
            let mtype = if self.occupied_by(!us).contains(tgt) { MoveType::Capture } else { MoveType::Quiet };
            let mv = Move::new(king_sq, tgt, mtype);
            if self.is_legal_candidate(mv) {
                out.push(mv);
            }
        }

        // Double check: only the king can move.
        if checkers.count() > 1 {
            return out.len() - start;
        }

        let mut candidates = MoveList::new();
        self.generate_pseudo_tactical_moves(&mut candidates);
        self.generate_pseudo_quiet_moves(&mut candidates);

        let checker_sq = checkers.first();
        let checker = self.get_at(checker_sq).expect("checker exists");
        let block_squares = if checker.is_hv_slider() || checker.is_diag_slider() {
            between(king_sq, checker_sq)
        } else {
            Bitboard::EMPTY
        };

        for &mv in candidates.iter() {
            if mv.src() == king_sq || mv.is_castle() {
                continue;
            }

            let resolves = mv.tgt() == checker_sq
                || (mv.is_en_passant() && mv.get_capture_sq() == checker_sq)
                || block_squares.contains(mv.tgt());

            if resolves && self.is_legal_candidate(mv) {
                out.push(mv);
            }
        }

        out.len() - start
    }

    /// Try the move and see whether it leaves the mover's own king in
    /// check; the one place this module pays for full legality, since
    /// evasion generation is specified to be exact.
    fn is_legal_candidate(&self, mv: Move) -> bool {
        let mut board = self.clone();
        let us = board.current;
        board.do_move(mv);
        !board.is_square_attacked_by(board.king_sq(us), board.current)
    }

    /// Whether playing `mv` gives check to the opponent. Used to build the
    /// "checks" subset of quiescence moves.
    fn gives_check(&self, mv: Move) -> bool {
        let mut board = self.clone();
        board.do_move(mv);
        board.in_check()
    }

    fn pawn_captures_and_promos(&self, us: Color, out: &mut MoveList) {
        use MoveType::*;

        for sq in self.get_bb(PieceType::Pawn, us) {
            let attacks = pawn_attacks(sq, us) & self.occupied_by(!us);

            for tgt in attacks {
                if tgt.is_promo_rank(us) {
                    for mtype in [QueenPromoCapture, RookPromoCapture, BishopPromoCapture, KnightPromoCapture] {
                        out.push(Move::new(sq, tgt, mtype));
                    }
                } else {
                    out.push(Move::new(sq, tgt, Capture));
                }
            }

            if let Some(ep) = self.en_passant {
                if pawn_attacks(sq, us).contains(ep) {
                    out.push(Move::new(sq, ep, EnPassant));
                }
            }

            if let Some(fwd) = sq.forward(us) {
                if fwd.is_promo_rank(us) && !self.all_occupied().contains(fwd) {
                    for mtype in [QueenPromo, RookPromo, BishopPromo, KnightPromo] {
                        out.push(Move::new(sq, fwd, mtype));
                    }
                }
            }
        }
    }

    fn pawn_quiets(&self, us: Color, out: &mut MoveList) {
        use MoveType::*;
        let blockers = self.all_occupied();

        for sq in self.get_bb(PieceType::Pawn, us) {
            let Some(fwd) = sq.forward(us) else { continue };

            if blockers.contains(fwd) || fwd.is_promo_rank(us) {
                continue;
            }

            out.push(Move::new(sq, fwd, Quiet));

            if sq.rank() == home_pawn_rank(us) {
                if let Some(dbl) = fwd.forward(us) {
                    if !blockers.contains(dbl) {
                        out.push(Move::new(sq, dbl, DoublePush));
                    }
                }
            }
        }
    }

    fn castle_moves(&self, us: Color, out: &mut MoveList) {
        use MoveType::*;

        if self.in_check() {
            return;
        }

        let (king_flag, queen_flag, king_mv, queen_mv) = match us {
            Color::White => (CastlingRights::WK, CastlingRights::WQ, Move::new(Square::E1, Square::G1, KingCastle), Move::new(Square::E1, Square::C1, QueenCastle)),
            Color::Black => (CastlingRights::BK, CastlingRights::BQ, Move::new(Square::E8, Square::G8, KingCastle), Move::new(Square::E8, Square::C8, QueenCastle)),
        };

        if self.castling_rights.has(king_flag) && self.is_pseudo_move_legal(king_mv) {
            out.push(king_mv);
        }
        if self.castling_rights.has(queen_flag) && self.is_pseudo_move_legal(queen_mv) {
            out.push(queen_mv);
        }
    }
}

fn push_captures(attacks: Bitboard, enemies: Bitboard, src: Square, out: &mut MoveList) {
    for tgt in attacks & enemies {
        out.push(Move::new(src, tgt, MoveType::Capture));
    }
}

fn push_quiets(attacks: Bitboard, blockers: Bitboard, src: Square, out: &mut MoveList) {
    for tgt in attacks & !blockers {
        out.push(Move::new(src, tgt, MoveType::Quiet));
    }
}

fn home_pawn_rank(color: Color) -> u8 {
    if color.is_white() { 1 } else { 6 }
}

/// Squares strictly between `a` and `b`, assuming they lie on a shared
/// rank, file or diagonal (true of any king/slider-checker pair).
fn between(a: Square, b: Square) -> Bitboard {
    let (af, ar) = (a.file() as i8, a.rank() as i8);
    let (bf, br) = (b.file() as i8, b.rank() as i8);
    let (df, dr) = ((bf - af).signum(), (br - ar).signum());

    let mut bb = Bitboard::EMPTY;
    let (mut f, mut r) = (af + df, ar + dr);

    while (f, r) != (bf, br) {
        if !(0..8).contains(&f) || !(0..8).contains(&r) {
            break;
        }
        bb.set(Square::ALL[(r * 8 + f) as usize]);
        f += df;
        r += dr;
    }

    bb
}
