//! Forsyth-Edwards Notation parsing and printing.

use crate::board::{Board, CastlingRights};
use crate::piece::{Color, Piece};
use crate::square::Square;
use anyhow::{anyhow, Context};
use std::fmt::Display;
use std::str::FromStr;

pub const STARTPOS: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        let mut parts = fen.split_whitespace();

        let placement = parts.next().context("FEN is missing piece placement")?;
        let side = parts.next().unwrap_or("w");
        let castling = parts.next().unwrap_or("-");
        let ep = parts.next().unwrap_or("-");
        let half_moves = parts.next().unwrap_or("0");
        let full_moves = parts.next().unwrap_or("1");

        let mut board = Board::empty();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(anyhow!("FEN piece placement must have 8 ranks"));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;

            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| anyhow!("'{c}' is not a valid FEN piece"))?;
                    let sq = Square::ALL[(rank * 8 + file) as usize];
                    board.add_at(sq, piece);
                    file += 1;
                }
            }
        }

        board.current = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(anyhow!("'{other}' is not a valid side to move")),
        };

        let mut rights = CastlingRights::NONE;
        for c in castling.chars() {
            match c {
                'K' => rights.set(CastlingRights::WK),
                'Q' => rights.set(CastlingRights::WQ),
                'k' => rights.set(CastlingRights::BK),
                'q' => rights.set(CastlingRights::BQ),
                '-' => {}
                other => return Err(anyhow!("'{other}' is not a valid castling flag")),
            }
        }
        board.castling_rights = rights;

        board.en_passant = if ep == "-" { None } else { Some(ep.parse()?) };
        board.half_moves = half_moves.parse().context("invalid half-move counter")?;
        board.full_moves = full_moves.parse().context("invalid full-move counter")?;

        Ok(board)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            let mut empty = 0;

            for file in 0..8 {
                let sq = Square::ALL[(rank * 8 + file) as usize];

                match self.get_at(sq) {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{empty}")?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.to_char())?;
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                write!(f, "{empty}")?;
            }

            if rank > 0 {
                write!(f, "/")?;
            }
        }

        write!(
            f,
            " {} ",
            if self.current.is_white() { "w" } else { "b" }
        )?;

        let rights = self.castling_rights;
        let mut any = false;
        for (flag, ch) in [
            (CastlingRights::WK, 'K'),
            (CastlingRights::WQ, 'Q'),
            (CastlingRights::BK, 'k'),
            (CastlingRights::BQ, 'q'),
        ] {
            if rights.has(flag) {
                write!(f, "{ch}")?;
                any = true;
            }
        }
        if !any {
            write!(f, "-")?;
        }

        match self.en_passant {
            Some(sq) => write!(f, " {sq} {} {}", self.half_moves, self.full_moves),
            None => write!(f, " - {} {}", self.half_moves, self.full_moves),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_startpos() {
        let board: Board = STARTPOS.parse().unwrap();
        assert_eq!(board.all_occupied().count(), 32);
        assert!(board.current.is_white());
    }

    #[test]
    fn round_trips_kiwipete() {
        let kiwipete = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = kiwipete.parse().unwrap();
        assert_eq!(board.to_string(), kiwipete);
    }
}
