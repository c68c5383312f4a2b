//! The staged move selector: a per-node state machine that lazily
//! generates, scores and yields pseudo-legal moves one at a time, in an
//! order chosen to make alpha-beta cut off as early as possible.
//!
//! A selector walks a fixed list of *phases*, determined by its
//! [`Generator`] kind. Each phase is entered at most once, generates or
//! enumerates its own candidate set, scores it, and yields moves
//! best-first for an "ordered prefix" of the phase before falling back to
//! plain generation order -- cheaper once the best candidates are
//! unlikely to still be waiting further down the list. The same move is
//! never yielded twice: later phases filter out anything an earlier
//! phase could have already returned.

use arrayvec::ArrayVec;
use chess::board::Board;
use chess::movegen::moves::{Move, MoveList, MAX_MOVES};
use chess::piece::PieceType;
use chess::see::{piece_value, static_exchange_eval};

use crate::history_tables::{History, Killers};
use crate::params::{ordered_prefix, MAX_HISTORY, MAX_KILLERS};
use crate::root_moves::RootMoveList;
use crate::scoring::{captured_piece_type, good_tactics_proxy, score_bad_tactic, score_generic, score_good_tactic, score_killer, score_mate_killer};

/// The kind of node a selector is ordering moves for. `Pv` and `NonPv`
/// share a phase list; the only distinction the selector itself makes
/// between them is their (identical) ordered-prefix count, so they're
/// kept as separate variants purely so callers can express intent and so
/// a future tuning pass could split their prefixes without touching the
/// phase-list wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    Root,
    Pv,
    NonPv,
    Escape,
    Q,
    QCheck,
}

impl Generator {
    fn phases(self) -> &'static [Phase] {
        use Phase::*;
        match self {
            Generator::Root => &[Phase::Root],
            Generator::Pv | Generator::NonPv => &[Trans, GoodTactics, Killers, Quiet, BadTactics],
            Generator::Escape => &[Evasions],
            Generator::Q => &[Trans, QSearch],
            Generator::QCheck => &[Trans, QSearchChecks],
        }
    }

    fn ordered_prefix(self) -> usize {
        match self {
            Generator::Root => ordered_prefix::ROOT,
            Generator::Pv => ordered_prefix::PV,
            Generator::NonPv => ordered_prefix::NON_PV,
            Generator::Escape => ordered_prefix::ESCAPE,
            Generator::Q => ordered_prefix::Q,
            Generator::QCheck => ordered_prefix::Q_CHECK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Trans,
    Root,
    GoodTactics,
    Killers,
    Quiet,
    BadTactics,
    Evasions,
    QSearch,
    QSearchChecks,
}

/// The ancestor context a selector needs to build its `KILLERS` phase:
/// the current node's own killers (and mate killer), plus the
/// grandparent's killers if the ply is deep enough to have one. Mirrors
/// [`crate::history_tables::SearchStack`]'s layout without borrowing it,
/// since `Killers` is small and `Copy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillerContext {
    pub own: Killers,
    pub ancestor: Option<Killers>,
}

/// Per-node move ordering state. A selector is constructed at entry to a
/// search node, consumed by repeated calls to [`MoveSelector::next`]
/// until it returns `None`, then discarded; it owns no heap memory.
pub struct MoveSelector<'a> {
    board: &'a Board,
    history: Option<&'a History>,
    generator: Generator,
    phases: &'static [Phase],
    phase_idx: usize,
    phase_entered: bool,

    moves: MoveList,
    scores: [i32; MAX_MOVES],
    cursor: usize,
    phase_yielded: usize,

    bad_tactics: MoveList,
    bad_scores: [i32; MAX_MOVES],
    bad_cursor: usize,

    hash_move: Option<Move>,
    killers: KillerContext,

    single_reply: bool,
    yielded: usize,

    root_moves: Option<&'a mut RootMoveList>,
    root_cursor: usize,
    depth: i32,
    multi_pv: usize,
}

impl<'a> MoveSelector<'a> {
    /// Construct a selector for a search node (any generator but `Root`).
    /// If the position is in check, the requested generator is
    /// overridden to [`Generator::Escape`], per the specification: the
    /// caller asks for `Pv`/`NonPv`/quiescence ordering, but a node in
    /// check always gets the evasion phase list instead.
    pub fn new(
        board: &'a Board,
        generator: Generator,
        history: &'a History,
        killers: KillerContext,
        ply: usize,
        hash_move: Option<Move>,
        depth: i32,
    ) -> Self {
        debug_assert_ne!(generator, Generator::Root, "use MoveSelector::new_root for root nodes");

        let effective = if board.in_check() { Generator::Escape } else { generator };

        let mut selector = Self {
            board,
            history: Some(history),
            generator: effective,
            phases: effective.phases(),
            phase_idx: 0,
            phase_entered: false,
            moves: MoveList::new(),
            scores: [0; MAX_MOVES],
            cursor: 0,
            phase_yielded: 0,
            bad_tactics: MoveList::new(),
            bad_scores: [0; MAX_MOVES],
            bad_cursor: 0,
            hash_move,
            killers,
            single_reply: false,
            yielded: 0,
            root_moves: None,
            root_cursor: 0,
            depth,
            multi_pv: 1,
        };

        // `single_reply` must be valid immediately after construction
        // (before the first `next()` call), so evasions are generated
        // eagerly rather than lazily on first entry, unlike every other
        // phase.
        if effective == Generator::Escape {
            selector.enter_evasions();
            selector.phase_entered = true;
        }

        let _ = ply; // reserved: ancestor killers are resolved by the caller via `KillerContext`.
        selector
    }

    /// Construct a selector for the root node. Root moves are owned by
    /// the search driver across iterations; the selector only sorts and
    /// walks them.
    pub fn new_root(board: &'a Board, root_moves: &'a mut RootMoveList, hash_move: Option<Move>, depth: i32, multi_pv: usize) -> Self {
        Self {
            board,
            history: None,
            generator: Generator::Root,
            phases: Generator::Root.phases(),
            phase_idx: 0,
            phase_entered: false,
            moves: MoveList::new(),
            scores: [0; MAX_MOVES],
            cursor: 0,
            phase_yielded: 0,
            bad_tactics: MoveList::new(),
            bad_scores: [0; MAX_MOVES],
            bad_cursor: 0,
            hash_move,
            killers: KillerContext::default(),
            single_reply: false,
            yielded: 0,
            root_moves: Some(root_moves),
            root_cursor: 0,
            depth,
            multi_pv,
        }
    }

    /// Valid immediately after construction when the (possibly
    /// in-check-overridden) generator is [`Generator::Escape`]: whether
    /// the position has exactly one legal evasion. Search uses this to
    /// grant a one-ply extension, on the theory that forced moves don't
    /// expand the tree.
    pub fn single_reply(&self) -> bool {
        self.single_reply
    }

    /// The number of moves already returned by this selector.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    pub fn generator(&self) -> Generator {
        self.generator
    }

    /// Return the next move to try, or `None` once every phase is
    /// exhausted.
    pub fn next(&mut self) -> Option<Move> {
        loop {
            let phase = *self.phases.get(self.phase_idx)?;

            let yielded = match phase {
                Phase::Trans => self.next_trans(),
                Phase::Root => self.next_root(),
                Phase::GoodTactics => self.next_good_tactic(),
                Phase::Killers => self.next_killer(),
                Phase::Quiet => self.next_quiet(),
                Phase::BadTactics => self.next_bad_tactic(),
                Phase::Evasions => self.next_evasion(),
                Phase::QSearch => self.next_qsearch(false),
                Phase::QSearchChecks => self.next_qsearch(true),
            };

            if let Some(mv) = yielded {
                self.yielded += 1;
                return Some(mv);
            }

            self.advance_phase();
        }
    }

    fn advance_phase(&mut self) {
        self.phase_idx += 1;
        self.phase_entered = false;
        self.cursor = 0;
        self.phase_yielded = 0;
    }

    /// The history score for a quiet move. Every generator but `Root`
    /// (which never calls this, since root moves are quiet-scored by the
    /// search driver, not by history) carries a history table.
    fn history_value(&self, mv: Move) -> i32 {
        self.history.expect("non-root selector always carries a history table").get(self.board, mv)
    }

    /// Take the best-scoring remaining candidate from `self.moves` while
    /// still within the generator's ordered prefix, or simply the next
    /// one in generation order beyond it.
    fn take_best_first(&mut self) -> Option<Move> {
        if self.cursor >= self.moves.len() {
            return None;
        }

        if self.phase_yielded < self.generator.ordered_prefix() {
            let mut best = self.cursor;
            for i in self.cursor + 1..self.moves.len() {
                if self.scores[i] > self.scores[best] {
                    best = i;
                }
            }
            self.moves.swap(self.cursor, best);
            self.scores.swap(self.cursor, best);
        }

        let mv = self.moves[self.cursor];
        self.cursor += 1;
        self.phase_yielded += 1;
        Some(mv)
    }

    ////////////////////////////////////////////////////////////////////
    //
    // TRANS
    //
    ////////////////////////////////////////////////////////////////////

    fn next_trans(&mut self) -> Option<Move> {
        // TRANS yields at most one move; whether it fires or not, the
        // phase is done after one call.
        self.phase_entered = true;

        let hash_move = self.hash_move?;
        self.board.is_plausible_move_legal(hash_move).then_some(hash_move)
    }

    ////////////////////////////////////////////////////////////////////
    //
    // ROOT
    //
    ////////////////////////////////////////////////////////////////////

    fn next_root(&mut self) -> Option<Move> {
        if !self.phase_entered {
            if let Some(root_moves) = self.root_moves.as_deref_mut() {
                root_moves.sort_for_iteration(self.hash_move, self.depth, self.multi_pv);
            }
            self.phase_entered = true;
        }

        let root_moves = self.root_moves.as_deref()?;
        if self.root_cursor >= root_moves.len() {
            return None;
        }

        let mv = root_moves.get(self.root_cursor).mv;
        self.root_cursor += 1;
        Some(mv)
    }

    ////////////////////////////////////////////////////////////////////
    //
    // GOOD_TACTICS / BAD_TACTICS
    //
    ////////////////////////////////////////////////////////////////////

    fn enter_good_tactics(&mut self) {
        self.moves.clear();
        self.board.generate_pseudo_tactical_moves(&mut self.moves);

        for i in 0..self.moves.len() {
            self.scores[i] = good_tactics_proxy(self.board, self.moves[i]);
        }
    }

    fn next_good_tactic(&mut self) -> Option<Move> {
        if !self.phase_entered {
            self.enter_good_tactics();
            self.phase_entered = true;
        }

        loop {
            let mv = self.take_best_first()?;

            if Some(mv) == self.hash_move {
                continue;
            }
            if !self.board.is_pseudo_move_legal(mv) {
                continue;
            }

            let see = static_exchange_eval(self.board, mv);
            if see < 0 {
                let idx = self.bad_tactics.len();
                self.bad_tactics.push(mv);
                self.bad_scores[idx] = see;
                continue;
            }

            return Some(mv);
        }
    }

    fn next_bad_tactic(&mut self) -> Option<Move> {
        // Deliberately unsorted: the specification leaves bad-tactic
        // ordering as a future experiment (sort by SEE), so this yields
        // strictly in the order GOOD_TACTICS demoted them.
        if self.bad_cursor >= self.bad_tactics.len() {
            return None;
        }

        let mv = self.bad_tactics[self.bad_cursor];
        self.bad_cursor += 1;
        Some(mv)
    }

    ////////////////////////////////////////////////////////////////////
    //
    // KILLERS
    //
    ////////////////////////////////////////////////////////////////////

    fn enter_killers(&mut self) {
        self.moves.clear();

        if let Some(mate_killer) = self.killers.own.mate_killer() {
            if Some(mate_killer) != self.hash_move && self.board.is_plausible_move_legal(mate_killer) {
                let idx = self.moves.len();
                self.moves.push(mate_killer);
                self.scores[idx] = score_mate_killer();
            }
        }

        let mut merged: ArrayVec<Move, MAX_KILLERS> = ArrayVec::new();
        for &mv in self.killers.own.moves() {
            if merged.len() >= MAX_KILLERS {
                break;
            }
            merged.push(mv);
        }
        if let Some(ancestor) = self.killers.ancestor {
            for &mv in ancestor.moves() {
                if merged.len() >= MAX_KILLERS {
                    break;
                }
                if !merged.contains(&mv) {
                    merged.push(mv);
                }
            }
        }

        for (slot, &mv) in merged.iter().enumerate() {
            if Some(mv) == self.hash_move {
                continue;
            }
            if !self.board.is_plausible_move_legal(mv) {
                continue;
            }
            let idx = self.moves.len();
            self.moves.push(mv);
            self.scores[idx] = score_killer(slot);
        }
    }

    fn next_killer(&mut self) -> Option<Move> {
        if !self.phase_entered {
            self.enter_killers();
            self.phase_entered = true;
        }
        self.take_best_first()
    }

    /// All killer moves this node would yield, for callers (chiefly the
    /// `QUIET` phase) that need to exclude them without driving the
    /// selector through them.
    fn killer_moves(&self) -> ArrayVec<Move, { MAX_KILLERS + 1 }> {
        let mut out = ArrayVec::new();
        if let Some(mate_killer) = self.killers.own.mate_killer() {
            let _ = out.try_push(mate_killer);
        }
        for &mv in self.killers.own.moves() {
            let _ = out.try_push(mv);
        }
        if let Some(ancestor) = self.killers.ancestor {
            for &mv in ancestor.moves() {
                if !out.contains(&mv) {
                    let _ = out.try_push(mv);
                }
            }
        }
        out
    }

    ////////////////////////////////////////////////////////////////////
    //
    // QUIET
    //
    ////////////////////////////////////////////////////////////////////

    fn enter_quiet(&mut self) {
        let mut raw = MoveList::new();
        self.board.generate_pseudo_quiet_moves(&mut raw);

        let killers = self.killer_moves();

        self.moves.clear();
        for &mv in raw.iter() {
            if Some(mv) == self.hash_move {
                continue;
            }
            if killers.contains(&mv) {
                continue;
            }
            if !self.board.is_pseudo_move_legal(mv) {
                continue;
            }

            let idx = self.moves.len();
            self.moves.push(mv);
            self.scores[idx] = self.history_value(mv);
        }
    }

    fn next_quiet(&mut self) -> Option<Move> {
        if !self.phase_entered {
            self.enter_quiet();
            self.phase_entered = true;
        }
        self.take_best_first()
    }

    ////////////////////////////////////////////////////////////////////
    //
    // EVASIONS
    //
    ////////////////////////////////////////////////////////////////////

    fn enter_evasions(&mut self) {
        self.moves.clear();
        self.board.generate_evasions(&mut self.moves);
        self.single_reply = self.moves.len() == 1;

        for i in 0..self.moves.len() {
            let mv = self.moves[i];
            let history_value = if mv.is_tactical() { 0 } else { self.history_value(mv) };
            self.scores[i] = score_generic(self.board, mv, history_value);
        }
    }

    fn next_evasion(&mut self) -> Option<Move> {
        if !self.phase_entered {
            self.enter_evasions();
            self.phase_entered = true;
        }
        self.take_best_first()
    }

    ////////////////////////////////////////////////////////////////////
    //
    // QSEARCH / QSEARCH_CH
    //
    ////////////////////////////////////////////////////////////////////

    fn enter_qsearch(&mut self, include_checks: bool) {
        let mut raw = MoveList::new();
        self.board.generate_quiescence_moves(&mut raw, include_checks);

        self.moves.clear();
        for &mv in raw.iter() {
            if Some(mv) == self.hash_move {
                continue;
            }
            if !self.board.is_pseudo_move_legal(mv) {
                continue;
            }

            let is_queen_promo = mv.get_promo_type() == Some(PieceType::Queen);

            let score = if mv.is_tactical() {
                let piece = self.board.get_at(mv.src()).expect("move source holds a piece").piece_type();
                let piece_val = piece_value(piece);
                let capture_val = captured_piece_type(self.board, mv).map(piece_value).unwrap_or(0);

                if static_exchange_eval(self.board, mv) >= 0 {
                    score_good_tactic(capture_val, piece_val)
                } else {
                    score_bad_tactic(capture_val, piece_val)
                }
            } else {
                self.history_value(mv)
            };

            // Gates late, low-scoring quiet checks (the `_CH` variant's
            // only source of non-tactical candidates) out of
            // quiescence, while every tactical move -- scored far above
            // `MAX_HISTORY` by construction -- always passes. Queen
            // promotions are let through regardless of score.
            if score < MAX_HISTORY && !is_queen_promo {
                continue;
            }

            let idx = self.moves.len();
            self.moves.push(mv);
            self.scores[idx] = score;
        }
    }

    fn next_qsearch(&mut self, include_checks: bool) -> Option<Move> {
        if !self.phase_entered {
            self.enter_qsearch(include_checks);
            self.phase_entered = true;
        }
        self.take_best_first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::board::Board;
    use chess::fen::STARTPOS;

    fn no_killers() -> KillerContext {
        KillerContext::default()
    }

    #[test]
    fn startpos_pv_yields_exactly_twenty_moves_once_each() {
        let board: Board = STARTPOS.parse().unwrap();
        let history = History::new();
        let mut selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, None, 10);

        let mut seen = Vec::new();
        while let Some(mv) = selector.next() {
            assert!(!seen.contains(&mv), "move {mv} yielded twice");
            seen.push(mv);
        }

        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn hash_move_is_returned_first() {
        // Kiwipete.
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".parse().unwrap();
        let history = History::new();
        let hash_move: Move = "e2a6".parse().unwrap();
        let mut selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, Some(hash_move), 10);

        assert_eq!(selector.next(), Some(hash_move));
        while let Some(mv) = selector.next() {
            assert_ne!(mv, hash_move);
        }
    }

    #[test]
    fn escape_overrides_the_requested_generator_when_in_check() {
        let board: Board = "8/8/8/8/8/4k3/4q3/4K3 w - - 0 1".parse().unwrap();
        let history = History::new();
        let mut selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, None, 5);

        assert_eq!(selector.generator(), Generator::Escape);

        let mut legal_evasions = MoveList::new();
        board.generate_evasions(&mut legal_evasions);

        while let Some(mv) = selector.next() {
            assert!(legal_evasions.contains(mv), "selector yielded a move outside the legal evasion set");
        }
    }

    #[test]
    fn escape_with_one_legal_move_sets_single_reply() {
        // Black king cornered on a8: an unblockable knight check from c7,
        // its own pawn fills b7, and a bishop on the long diagonal covers
        // a7, leaving b8 as the only legal evasion.
        let board: Board = "k7/1pn5/8/8/8/8/8/4K1B1 b - - 0 1".parse().unwrap();
        assert!(board.in_check());

        let mut evasions = MoveList::new();
        board.generate_evasions(&mut evasions);
        assert_eq!(evasions.len(), 1, "test position should have exactly one legal evasion");

        let history = History::new();
        let selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, None, 5);
        assert!(selector.single_reply());
    }

    #[test]
    fn good_tactics_precede_bad_tactics() {
        // White queen on d1 can capture a defended pawn on d7 (losing
        // the queen) or an undefended rook on a8 isn't reachable, so set
        // up: Qd1 can take a pawn on h5 for free (good) and a
        // rook-defended pawn on d7 for a loss (bad).
        let board: Board = "r3k3/3p4/8/7p/8/8/8/3QK3 w - - 0 1".parse().unwrap();
        let history = History::new();
        let mut selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, None, 10);

        let good_capture: Move = "d1h5".parse().unwrap();
        let bad_capture: Move = "d1d7".parse().unwrap();

        let mut order = Vec::new();
        while let Some(mv) = selector.next() {
            if mv == good_capture || mv == bad_capture {
                order.push(mv);
            }
        }

        let good_pos = order.iter().position(|&m| m == good_capture).unwrap();
        let bad_pos = order.iter().position(|&m| m == bad_capture).unwrap();
        assert!(good_pos < bad_pos);
    }

    #[test]
    fn killers_come_after_tactics_and_before_other_quiets() {
        let board: Board = STARTPOS.parse().unwrap();
        let history = History::new();

        let killer: Move = "g1f3".parse().unwrap();
        let mut killers = Killers::new();
        killers.add(killer);
        let ctx = KillerContext { own: killers, ancestor: None };

        let mut selector = MoveSelector::new(&board, Generator::Pv, &history, ctx, 0, None, 10);

        let mut order = Vec::new();
        while let Some(mv) = selector.next() {
            order.push(mv);
        }

        let killer_pos = order.iter().position(|&m| m == killer).unwrap();
        // Startpos has no tactics, so the killer should be the very
        // first move returned.
        assert_eq!(killer_pos, 0);

        let other_quiet: Move = "b1c3".parse().unwrap();
        let other_pos = order.iter().position(|&m| m == other_quiet).unwrap();
        assert!(killer_pos < other_pos);
    }

    #[test]
    fn quiescence_without_checks_only_returns_winning_captures() {
        // A queen that can win an undefended pawn for free, alongside a
        // knight that could capture a rook-defended pawn and come out
        // material-down.
        let board: Board = "2r1k3/8/2p1p3/3Q4/1N6/8/8/4K3 w - - 0 1".parse().unwrap();
        let history = History::new();
        let mut selector = MoveSelector::new(&board, Generator::Q, &history, no_killers(), 0, None, 0);

        let winning: Move = "d5e6".parse().unwrap();
        let losing_knight: Move = "b4c6".parse().unwrap();
        let losing_queen: Move = "d5c6".parse().unwrap();

        let mut seen = Vec::new();
        while let Some(mv) = selector.next() {
            seen.push(mv);
        }

        assert!(seen.contains(&winning));
        assert!(!seen.contains(&losing_knight), "losing captures must be gated out of quiescence");
        assert!(!seen.contains(&losing_queen), "losing captures must be gated out of quiescence");
        for mv in seen {
            assert!(static_exchange_eval(&board, mv) >= 0, "qsearch should filter out losing captures");
        }
    }

    #[test]
    fn determinism_same_inputs_yield_same_sequence() {
        let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1".parse().unwrap();
        let history = History::new();
        let hash_move: Move = "e2a6".parse().unwrap();

        let collect = || {
            let mut selector = MoveSelector::new(&board, Generator::Pv, &history, no_killers(), 0, Some(hash_move), 10);
            let mut moves = Vec::new();
            while let Some(mv) = selector.next() {
                moves.push(mv);
            }
            moves
        };

        assert_eq!(collect(), collect());
    }

    #[test]
    fn root_sorts_hash_move_first_then_walks_in_order() {
        let board: Board = STARTPOS.parse().unwrap();
        let mut root_moves = RootMoveList::new();
        let a: Move = "e2e4".parse().unwrap();
        let b: Move = "d2d4".parse().unwrap();
        let c: Move = "g1f3".parse().unwrap();
        root_moves.push(a);
        root_moves.push(b);
        root_moves.push(c);
        root_moves.find_mut(c).unwrap().nodes = 1000;

        let mut selector = MoveSelector::new_root(&board, &mut root_moves, Some(b), 10, 1);

        assert_eq!(selector.next(), Some(b));
        assert_eq!(selector.next(), Some(c));
        assert_eq!(selector.next(), Some(a));
        assert_eq!(selector.next(), None);
    }
}
