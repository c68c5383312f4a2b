//! Precomputed attack tables for the non-sliding pieces, plus the step
//! vectors sliders walk along. Sliding attacks themselves are computed by
//! ray-walking rather than via magic bitboards; see [`crate::board`].

use crate::bitboard::Bitboard;
use crate::piece::Color;
use crate::square::Square;
use std::sync::OnceLock;

const KNIGHT_STEPS: [(i8, i8); 8] =
    [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];

const KING_STEPS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

/// The four diagonal and four horizontal/vertical ray directions, as
/// (file, rank) steps.
pub const DIAG_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const HV_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn step_attacks(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];

    for (idx, sq) in Square::ALL.iter().enumerate() {
        let file = sq.file() as i8;
        let rank = sq.rank() as i8;
        let mut bb = Bitboard::EMPTY;

        for &(df, dr) in steps {
            let (f, r) = (file + df, rank + dr);
            if (0..8).contains(&f) && (0..8).contains(&r) {
                bb.set(Square::ALL[(r * 8 + f) as usize]);
            }
        }

        table[idx] = bb;
    }

    table
}

pub fn knight_attacks(sq: Square) -> Bitboard {
    static TABLE: OnceLock<[Bitboard; 64]> = OnceLock::new();
    TABLE.get_or_init(|| step_attacks(&KNIGHT_STEPS))[sq as usize]
}

pub fn king_attacks(sq: Square) -> Bitboard {
    static TABLE: OnceLock<[Bitboard; 64]> = OnceLock::new();
    TABLE.get_or_init(|| step_attacks(&KING_STEPS))[sq as usize]
}

/// Squares a pawn of `color` on `sq` attacks (diagonal captures only).
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    let file = sq.file() as i8;
    let rank = sq.rank() as i8;
    let dr: i8 = if color.is_white() { 1 } else { -1 };
    let mut bb = Bitboard::EMPTY;

    for df in [-1, 1] {
        let (f, r) = (file + df, rank + dr);
        if (0..8).contains(&f) && (0..8).contains(&r) {
            bb.set(Square::ALL[(r * 8 + f) as usize]);
        }
    }

    bb
}

/// Walk a ray from `sq` in direction `(df, dr)`, stopping at (and
/// including) the first blocker.
pub fn ray_attacks(sq: Square, dir: (i8, i8), blockers: Bitboard) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    let mut file = sq.file() as i8;
    let mut rank = sq.rank() as i8;

    loop {
        file += dir.0;
        rank += dir.1;

        if !(0..8).contains(&file) || !(0..8).contains(&rank) {
            break;
        }

        let target = Square::ALL[(rank * 8 + file) as usize];
        bb.set(target);

        if blockers.contains(target) {
            break;
        }
    }

    bb
}

pub fn bishop_attacks(sq: Square, blockers: Bitboard) -> Bitboard {
    DIAG_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(sq, dir, blockers))
}

pub fn rook_attacks(sq: Square, blockers: Bitboard) -> Bitboard {
    HV_DIRS
        .iter()
        .fold(Bitboard::EMPTY, |acc, &dir| acc | ray_attacks(sq, dir, blockers))
}

pub fn queen_attacks(sq: Square, blockers: Bitboard) -> Bitboard {
    bishop_attacks(sq, blockers) | rook_attacks(sq, blockers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square::*;

    // Expected bitmasks are pure board geometry (which squares a knight,
    // king or pawn attacks from a given square), so they hold regardless
    // of whether the table backing them is a static array or, as here, a
    // memoized function.
    #[test]
    fn test_knight_attacks() {
        assert_eq!(knight_attacks(E5), Bitboard(0x28440044280000));
        assert_eq!(knight_attacks(B7), Bitboard(0x800080500000000));
        assert_eq!(knight_attacks(G2), Bitboard(0xa0100010));
    }

    #[test]
    fn test_king_attacks() {
        assert_eq!(king_attacks(E5), Bitboard(0x382838000000));
        assert_eq!(king_attacks(A8), Bitboard(0x203000000000000));
    }

    #[test]
    fn test_pawn_attacks() {
        assert_eq!(pawn_attacks(E5, Color::White), Bitboard(0x280000000000));
        assert_eq!(pawn_attacks(A5, Color::White), Bitboard(0x20000000000));
        assert_eq!(pawn_attacks(H5, Color::White), Bitboard(0x400000000000));
        assert_eq!(pawn_attacks(E8, Color::White), Bitboard(0x00));

        assert_eq!(pawn_attacks(E5, Color::Black), Bitboard(0x28000000));
        assert_eq!(pawn_attacks(A5, Color::Black), Bitboard(0x2000000));
        assert_eq!(pawn_attacks(H5, Color::Black), Bitboard(0x40000000));
        assert_eq!(pawn_attacks(E1, Color::Black), Bitboard(0x00));
    }

    #[test]
    fn sliding_attacks_stop_at_the_first_blocker() {
        let blockers = Bitboard::from(E4);
        // Rook on A4 is blocked by the piece on E4: it can reach B4..E4
        // inclusive, but not F4 and beyond.
        let attacks = rook_attacks(A4, blockers);
        assert!(attacks.contains(E4));
        assert!(!attacks.contains(F4));

        let attacks = bishop_attacks(A1, Bitboard::from(D4));
        assert!(attacks.contains(D4));
        assert!(!attacks.contains(E5));
    }
}
