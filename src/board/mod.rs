//! The board: piece bitboards plus a mailbox, with incrementally maintained
//! Zobrist hash, material/positional scores and game phase. Two apply paths
//! exist, one for committed game moves and a reversible one for search.

pub mod castle_bits;
mod fen;

pub use castle_bits::*;

use crate::bitboard::{BitboardExt, ALL_SQUARES};
use crate::moves::movegen;
use crate::moves::types::{Move, MoveKind, UndoInfo};
use crate::square::Square;
use crate::tables::scoring::{
    self, FULL_RECALC_THRESHOLD, MAX_GAME_PHASE, MAX_SEARCH_DEPTH, PIECE_VALUES,
};
use crate::tables::zobrist;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Piece encoding, 4 bits in the packed move word. EMPTY doubles as the
/// mailbox sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
    Empty = 6,
}

impl PieceType {
    #[inline(always)]
    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            0 => PieceType::Pawn,
            1 => PieceType::Knight,
            2 => PieceType::Bishop,
            3 => PieceType::Rook,
            4 => PieceType::Queen,
            5 => PieceType::King,
            6 => PieceType::Empty,
            _ => panic!("invalid piece encoding: {}", v),
        }
    }

    #[inline(always)]
    pub fn value(self) -> i32 {
        PIECE_VALUES[self as usize]
    }

    /// Contribution to the game phase accumulator.
    #[inline(always)]
    pub fn phase_weight(self) -> i32 {
        match self {
            PieceType::Queen => 4,
            PieceType::Rook => 2,
            PieceType::Knight | PieceType::Bishop => 1,
            _ => 0,
        }
    }
}

/// Derived game-state flags, recomputed after every applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardState {
    pub flags: u8,
}

impl BoardState {
    pub const CHECK_WHITE: u8 = 1 << 0;
    pub const CHECK_BLACK: u8 = 1 << 1;
    pub const STALEMATE: u8 = 1 << 2;
    pub const CHECKMATE_WHITE: u8 = 1 << 3;
    pub const CHECKMATE_BLACK: u8 = 1 << 4;
    pub const DRAW_REPETITION: u8 = 1 << 5;
    pub const DRAW_50: u8 = 1 << 6;
    pub const DRAW_INSUFFICIENT: u8 = 1 << 7;

    #[inline(always)]
    pub fn is_check_white(self) -> bool {
        self.flags & Self::CHECK_WHITE != 0
    }

    #[inline(always)]
    pub fn is_check_black(self) -> bool {
        self.flags & Self::CHECK_BLACK != 0
    }

    #[inline(always)]
    pub fn is_check(self, white: bool) -> bool {
        if white {
            self.is_check_white()
        } else {
            self.is_check_black()
        }
    }

    #[inline(always)]
    pub fn is_stalemate(self) -> bool {
        self.flags & Self::STALEMATE != 0
    }

    #[inline(always)]
    pub fn is_checkmate_white(self) -> bool {
        self.flags & Self::CHECKMATE_WHITE != 0
    }

    #[inline(always)]
    pub fn is_checkmate_black(self) -> bool {
        self.flags & Self::CHECKMATE_BLACK != 0
    }

    #[inline(always)]
    pub fn is_draw(self) -> bool {
        self.flags & (Self::DRAW_REPETITION | Self::DRAW_50 | Self::DRAW_INSUFFICIENT) != 0
    }
}

/// Pinned friendly pieces and the ray each one is confined to. Rays default
/// to all-ones so unpinned squares never restrict a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinData {
    pub pinned: u64,
    pub pin_rays: [u64; 64],
}

impl Default for PinData {
    fn default() -> Self {
        PinData {
            pinned: 0,
            pin_rays: [ALL_SQUARES; 64],
        }
    }
}

/// Squares attacked by the side that just moved, plus the check intercept
/// mask: all-ones when the side to move is not in check, the
/// attacker/between/king set under a single check, empty under double check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackData {
    pub attack_squares: u64,
    pub attack_ray: u64,
}

impl Default for AttackData {
    fn default() -> Self {
        AttackData {
            attack_squares: 0,
            attack_ray: ALL_SQUARES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Bitboard per [color][piece] with Black = 0, White = 1.
    pub pieces: [[u64; 6]; 2],
    pub occ_white: u64,
    pub occ_black: u64,
    pub occ_all: u64,
    /// Piece type at each square; color comes from the occupancy boards.
    pub mailbox: [PieceType; 64],
    pub castling_rights: u8,
    pub ep_target: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub half_moves: u32,
    pub ply_count: u32,
    pub state: BoardState,
    /// Incremental Zobrist key.
    pub hash: u64,
    /// White-perspective centipawn totals, maintained incrementally.
    pub material_score: i32,
    pub positional_score: i32,
    /// Queen 4, rook 2, minor 1, accumulated over all pieces.
    pub game_phase_score: i32,
    pub undo_stack: Vec<UndoInfo>,
    /// Hashes along the current search path, for threefold-in-path detection.
    pub search_history: Vec<u64>,
    /// Hash occurrence counts for the whole game, reset at irreversible moves.
    pub position_history: HashMap<u64, u32>,
    pub pin_data: PinData,
    pub attack_data: AttackData,
}

#[inline(always)]
fn side(white: bool) -> usize {
    white as usize
}

impl Board {
    pub fn new_empty() -> Self {
        Board {
            pieces: [[0; 6]; 2],
            occ_white: 0,
            occ_black: 0,
            occ_all: 0,
            mailbox: [PieceType::Empty; 64],
            castling_rights: 0,
            ep_target: None,
            half_moves: 0,
            ply_count: 0,
            state: BoardState::default(),
            hash: 0,
            material_score: 0,
            positional_score: 0,
            game_phase_score: 0,
            undo_stack: Vec::with_capacity(MAX_SEARCH_DEPTH),
            search_history: Vec::with_capacity(MAX_SEARCH_DEPTH),
            position_history: HashMap::new(),
            pin_data: PinData::default(),
            attack_data: AttackData::default(),
        }
    }

    /// Standard starting position.
    pub fn new() -> Self {
        let mut board = Board::new_empty();

        for (sq, piece) in [
            (0u8, PieceType::Rook),
            (1, PieceType::Knight),
            (2, PieceType::Bishop),
            (3, PieceType::Queen),
            (4, PieceType::King),
            (5, PieceType::Bishop),
            (6, PieceType::Knight),
            (7, PieceType::Rook),
        ] {
            board.place_piece(true, piece, sq as usize);
            board.place_piece(false, piece, (56 + sq) as usize);
        }
        for file in 0..8usize {
            board.place_piece(true, PieceType::Pawn, 8 + file);
            board.place_piece(false, PieceType::Pawn, 48 + file);
        }

        board.castling_rights = CASTLE_ALL;
        board.game_phase_score = MAX_GAME_PHASE;
        board.hash = board.compute_zobrist_full();
        board.position_history.insert(board.hash, 1);
        // Attack and pin data for White's first move.
        board.update_board_state(false);
        board
    }

    // --- Accessors --------------------------------------------------------

    #[inline(always)]
    pub fn bb(&self, white: bool, piece: PieceType) -> u64 {
        self.pieces[side(white)][piece as usize]
    }

    #[inline(always)]
    pub fn occupancy(&self, white: bool) -> u64 {
        if white {
            self.occ_white
        } else {
            self.occ_black
        }
    }

    #[inline(always)]
    pub fn occupied(&self) -> u64 {
        self.occ_all
    }

    #[inline(always)]
    pub fn piece_at(&self, sq: usize) -> PieceType {
        self.mailbox[sq]
    }

    #[inline(always)]
    pub fn white_at(&self, sq: usize) -> bool {
        self.occ_white & (1u64 << sq) != 0
    }

    #[inline(always)]
    pub fn king_square(&self, white: bool) -> usize {
        let king_bb = self.bb(white, PieceType::King);
        if king_bb == 0 {
            panic!(
                "king missing for {}\nFEN: {}",
                if white { "White" } else { "Black" },
                self.to_fen()
            );
        }
        king_bb.lsb() as usize
    }

    #[inline(always)]
    pub fn has_castling(&self, flag: u8) -> bool {
        self.castling_rights & flag != 0
    }

    /// Clamped phase fraction: 1.0 = full middlegame material, 0.0 = bare.
    #[inline(always)]
    pub fn phase_fraction(&self) -> f32 {
        (self.game_phase_score as f32 / MAX_GAME_PHASE as f32).clamp(0.0, 1.0)
    }

    // --- Placement helpers ------------------------------------------------
    //
    // Every piece placement and removal goes through this pair so that the
    // bitboards, occupancy, mailbox and hash can never disagree.

    #[inline(always)]
    pub(crate) fn place_piece(&mut self, white: bool, piece: PieceType, sq: usize) {
        debug_assert!(piece != PieceType::Empty);
        debug_assert!(
            self.mailbox[sq] == PieceType::Empty,
            "placing {:?} on occupied square {}",
            piece,
            sq
        );
        let bb = 1u64 << sq;
        self.pieces[side(white)][piece as usize] |= bb;
        if white {
            self.occ_white |= bb;
        } else {
            self.occ_black |= bb;
        }
        self.occ_all |= bb;
        self.mailbox[sq] = piece;
        self.hash ^= zobrist::keys().piece[side(white)][piece as usize][sq];
    }

    #[inline(always)]
    pub(crate) fn remove_piece(&mut self, white: bool, piece: PieceType, sq: usize) {
        debug_assert!(
            self.mailbox[sq] == piece,
            "removing {:?} from square {} holding {:?}",
            piece,
            sq,
            self.mailbox[sq]
        );
        let bb = 1u64 << sq;
        self.pieces[side(white)][piece as usize] &= !bb;
        if white {
            self.occ_white &= !bb;
        } else {
            self.occ_black &= !bb;
        }
        self.occ_all &= !bb;
        self.mailbox[sq] = PieceType::Empty;
        self.hash ^= zobrist::keys().piece[side(white)][piece as usize][sq];
    }

    // --- Hashing ----------------------------------------------------------

    /// Full recompute from current state. Must match the incremental hash at
    /// every quiescent boundary.
    pub fn compute_zobrist_full(&self) -> u64 {
        let keys = zobrist::keys();
        let mut hash = 0u64;

        for color in 0..2 {
            for piece in 0..6 {
                let mut bb = self.pieces[color][piece];
                while bb != 0 {
                    let sq = bb.trailing_zeros() as usize;
                    hash ^= keys.piece[color][piece][sq];
                    bb &= bb - 1;
                }
            }
        }

        hash ^= keys.castling[self.castling_rights as usize];

        if let Some(ep) = self.ep_target {
            hash ^= keys.ep_file[ep.file() as usize];
        }

        // Side key is toggled once per applied move; it is present exactly
        // when Black is to move.
        if self.ply_count % 2 == 1 {
            hash ^= keys.side_to_move;
        }

        hash
    }

    #[cfg(debug_assertions)]
    #[inline]
    pub fn assert_hash(&self) {
        let full = self.compute_zobrist_full();
        debug_assert_eq!(
            self.hash, full,
            "zobrist parity mismatch: stored={:#018x}, full={:#018x}",
            self.hash, full
        );
    }

    // --- Scores -----------------------------------------------------------

    /// Recount the positional sum from scratch at the current phase.
    pub fn update_positional_score(&mut self) {
        let phase = self.phase_fraction();
        let mut score = 0i32;

        let mut white = self.occ_white;
        while white != 0 {
            let sq = white.trailing_zeros() as usize;
            white &= white - 1;
            score += scoring::pst_value(sq, phase, self.mailbox[sq] as usize, true);
        }
        let mut black = self.occ_black;
        while black != 0 {
            let sq = black.trailing_zeros() as usize;
            black &= black - 1;
            score -= scoring::pst_value(sq, phase, self.mailbox[sq] as usize, false);
        }

        self.positional_score = score;
    }

    /// Material recount used when loading a position.
    pub(crate) fn recount_material_and_phase(&mut self) {
        let mut material = 0i32;
        let mut phase = 0i32;
        for piece in 0..6 {
            let piece_type = PieceType::from_u8(piece);
            let white_count = self.pieces[1][piece as usize].count_ones() as i32;
            let black_count = self.pieces[0][piece as usize].count_ones() as i32;
            material += piece_type.value() * (white_count - black_count);
            phase += piece_type.phase_weight() * (white_count + black_count);
        }
        self.material_score = material;
        self.game_phase_score = phase.min(MAX_GAME_PHASE);
    }

    // --- Move classification ----------------------------------------------

    pub fn move_kind(
        &self,
        from: u8,
        to: u8,
        piece: PieceType,
        captured: PieceType,
        white: bool,
    ) -> MoveKind {
        if piece == PieceType::Pawn {
            if self.ep_target.map(|s| s.index()) == Some(to) {
                return MoveKind::EnPassant;
            }
            if (white && to >= 56) || (!white && to <= 7) {
                return if captured == PieceType::Empty {
                    MoveKind::Promotion
                } else {
                    MoveKind::PromotionCapture
                };
            }
            if from.abs_diff(to) == 16 {
                return MoveKind::PawnDoublePush;
            }
        }
        if piece == PieceType::King && from.abs_diff(to) == 2 {
            return MoveKind::Castling;
        }
        if captured != PieceType::Empty {
            return MoveKind::Capture;
        }
        MoveKind::Normal
    }

    // --- Apply / undo -----------------------------------------------------

    /// Shared mutation core: pieces, hash, castling rights, en passant and
    /// the incremental scores. Score deltas use the pre-move phase for every
    /// table lookup within the move.
    fn apply_core(&mut self, mv: Move, white: bool, phase: f32) {
        let from = mv.from_sq() as usize;
        let to = mv.to_sq() as usize;
        let piece = mv.piece();
        let kind = mv.kind();

        let mut material_delta = 0i32;
        let mut positional_delta = 0i32;
        let mut phase_delta = 0i32;

        self.remove_piece(white, piece, from);
        positional_delta -= scoring::pst_value(from, phase, piece as usize, white);

        // Rights are XOR-ed out once, mutated freely, XOR-ed back in below.
        self.hash ^= zobrist::keys().castling[self.castling_rights as usize];

        if piece == PieceType::King {
            self.castling_rights &= !if white { CASTLE_WHITE } else { CASTLE_BLACK };
        } else if piece == PieceType::Rook {
            self.castling_rights &= !rook_rights_mask(white, mv.from_sq());
        }

        match kind {
            MoveKind::Capture | MoveKind::PromotionCapture => {
                let captured = mv.captured();
                self.remove_piece(!white, captured, to);
                if captured == PieceType::Rook {
                    self.castling_rights &= !rook_rights_mask(!white, mv.to_sq());
                }
                phase_delta -= captured.phase_weight();
                material_delta += captured.value();
                positional_delta += scoring::pst_value(to, phase, captured as usize, !white);
            }
            MoveKind::EnPassant => {
                let cap_sq = if white { to - 8 } else { to + 8 };
                self.remove_piece(!white, PieceType::Pawn, cap_sq);
                material_delta += PieceType::Pawn.value();
                positional_delta +=
                    scoring::pst_value(cap_sq, phase, PieceType::Pawn as usize, !white);
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = castle_rook_squares(mv.to_sq());
                self.remove_piece(white, PieceType::Rook, rook_from as usize);
                self.place_piece(white, PieceType::Rook, rook_to as usize);
                positional_delta += scoring::pst_value(
                    rook_to as usize,
                    phase,
                    PieceType::Rook as usize,
                    white,
                ) - scoring::pst_value(
                    rook_from as usize,
                    phase,
                    PieceType::Rook as usize,
                    white,
                );
            }
            _ => {}
        }

        if mv.is_promotion() {
            let promo = mv.promotion();
            self.place_piece(white, promo, to);
            phase_delta += promo.phase_weight();
            material_delta += promo.value() - PieceType::Pawn.value();
            positional_delta += scoring::pst_value(to, phase, promo as usize, white);
        } else {
            self.place_piece(white, piece, to);
            positional_delta += scoring::pst_value(to, phase, piece as usize, white);
        }

        // Clear the previous en passant file from the hash.
        if let Some(ep) = self.ep_target {
            self.hash ^= zobrist::keys().ep_file[ep.file() as usize];
        }

        self.hash ^= zobrist::keys().castling[self.castling_rights as usize];

        if kind == MoveKind::PawnDoublePush {
            let ep_sq = if white { from + 8 } else { from - 8 };
            self.ep_target = Some(Square::from_index(ep_sq as u8));
            self.hash ^= zobrist::keys().ep_file[ep_sq & 7];
        } else {
            self.ep_target = None;
        }

        self.hash ^= zobrist::keys().side_to_move;

        if !white {
            material_delta = -material_delta;
            positional_delta = -positional_delta;
        }
        self.material_score += material_delta;
        self.positional_score += positional_delta;
        self.game_phase_score += phase_delta;
    }

    /// Reversible apply for search. Pushes undo data and the prior hash.
    pub fn apply_move_search(&mut self, mv: Move, white: bool) {
        let mut undo = UndoInfo {
            castling_rights: self.castling_rights,
            ep_target: self.ep_target,
            flags: self.state.flags,
            half_moves: self.half_moves,
            material_delta: 0,
            positional_delta: 0,
            phase_delta: 0,
        };

        self.search_history.push(self.hash);

        let prev_phase = self.phase_fraction();
        let prev_material = self.material_score;
        let prev_positional = self.positional_score;
        let prev_phase_score = self.game_phase_score;

        self.apply_core(mv, white, prev_phase);

        if mv.piece() == PieceType::Pawn || mv.is_capture() {
            self.half_moves = 0;
        } else {
            self.half_moves += 1;
        }

        // Interpolation drifts when the phase jumps; recount past the
        // threshold, otherwise trust the delta.
        if (self.phase_fraction() - prev_phase).abs() >= FULL_RECALC_THRESHOLD {
            self.update_positional_score();
        }

        // Net changes, so undo restores the scores bit-exactly even after a
        // full recount.
        undo.material_delta = self.material_score - prev_material;
        undo.positional_delta = self.positional_score - prev_positional;
        undo.phase_delta = self.game_phase_score - prev_phase_score;
        self.undo_stack.push(undo);

        self.update_board_state(white);
        self.ply_count += 1;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Exact inverse of `apply_move_search`.
    pub fn undo_move_search(&mut self, mv: Move, white: bool) {
        let undo = self
            .undo_stack
            .pop()
            .expect("undo without a matching apply");

        self.hash ^= zobrist::keys().side_to_move;

        if let Some(ep) = self.ep_target {
            self.hash ^= zobrist::keys().ep_file[ep.file() as usize];
        }
        self.hash ^= zobrist::keys().castling[self.castling_rights as usize];

        self.castling_rights = undo.castling_rights;
        self.ep_target = undo.ep_target;
        self.state.flags = undo.flags;
        self.half_moves = undo.half_moves;
        self.material_score -= undo.material_delta;
        self.positional_score -= undo.positional_delta;
        self.game_phase_score -= undo.phase_delta;

        self.hash ^= zobrist::keys().castling[self.castling_rights as usize];
        if let Some(ep) = self.ep_target {
            self.hash ^= zobrist::keys().ep_file[ep.file() as usize];
        }

        let from = mv.from_sq() as usize;
        let to = mv.to_sq() as usize;

        if mv.is_promotion() {
            self.remove_piece(white, mv.promotion(), to);
            self.place_piece(white, PieceType::Pawn, from);
        } else {
            self.remove_piece(white, mv.piece(), to);
            self.place_piece(white, mv.piece(), from);
        }

        match mv.kind() {
            MoveKind::Capture | MoveKind::PromotionCapture => {
                self.place_piece(!white, mv.captured(), to);
            }
            MoveKind::EnPassant => {
                let cap_sq = if white { to - 8 } else { to + 8 };
                self.place_piece(!white, PieceType::Pawn, cap_sq);
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = castle_rook_squares(mv.to_sq());
                self.remove_piece(white, PieceType::Rook, rook_to as usize);
                self.place_piece(white, PieceType::Rook, rook_from as usize);
            }
            _ => {}
        }

        self.search_history.pop();
        self.ply_count -= 1;

        #[cfg(debug_assertions)]
        self.assert_hash();
    }

    /// Committed game move: classifies the move, applies it, records the new
    /// position in the game history and refreshes the draw flags. The caller
    /// guarantees legality (via `legal_moves_from`).
    pub fn apply_move_played(
        &mut self,
        from: u8,
        to: u8,
        promotion: PieceType,
        white: bool,
    ) -> Move {
        let piece = self.mailbox[from as usize];
        let captured = self.mailbox[to as usize];
        let kind = self.move_kind(from, to, piece, captured, white);

        let promo_piece = match kind {
            MoveKind::Promotion | MoveKind::PromotionCapture => {
                if promotion == PieceType::Empty {
                    PieceType::Queen
                } else {
                    promotion
                }
            }
            _ => PieceType::Empty,
        };

        let mv = Move::encode(from, to, piece, captured, kind, promo_piece, false);

        let prev_phase = self.phase_fraction();
        self.apply_core(mv, white, prev_phase);

        if piece == PieceType::Pawn || mv.is_capture() {
            self.half_moves = 0;
            self.position_history.clear();
        } else {
            self.half_moves += 1;
        }

        // Game moves are rare next to search moves; recount outright.
        self.update_positional_score();
        self.update_board_state(white);

        *self.position_history.entry(self.hash).or_insert(0) += 1;
        self.update_draw_flags();

        self.ply_count += 1;

        #[cfg(debug_assertions)]
        self.assert_hash();

        mv
    }

    // --- Derived state ----------------------------------------------------

    /// Recompute pins, attack data, check flags and terminal flags after
    /// `mover_white` has moved.
    pub fn update_board_state(&mut self, mover_white: bool) {
        self.state.flags = 0;

        let defender_white = !mover_white;
        let defender_king = self.king_square(defender_white);

        movegen::compute_pins(self, defender_king, mover_white);
        movegen::compute_attacks(self, mover_white, defender_king);

        let in_check = self.state.is_check(defender_white);
        if !self.has_any_legal_move(defender_white) {
            if in_check {
                self.state.flags |= if defender_white {
                    BoardState::CHECKMATE_WHITE
                } else {
                    BoardState::CHECKMATE_BLACK
                };
            } else {
                self.state.flags |= BoardState::STALEMATE;
            }
        }
    }

    fn has_any_legal_move(&self, white: bool) -> bool {
        let mut friendly = self.occupancy(white);
        while friendly != 0 {
            let sq = friendly.trailing_zeros() as usize;
            friendly &= friendly - 1;
            if movegen::legal_moves_from(self, sq, white) != 0 {
                return true;
            }
        }
        false
    }

    /// Game-level draw flags: threefold over the game history, the 50-move
    /// rule, and dead material.
    pub fn update_draw_flags(&mut self) {
        if self.position_history.get(&self.hash).copied().unwrap_or(0) >= 3 {
            self.state.flags |= BoardState::DRAW_REPETITION;
        } else if self.half_moves >= 50 {
            self.state.flags |= BoardState::DRAW_50;
        } else if self.is_insufficient_material() {
            self.state.flags |= BoardState::DRAW_INSUFFICIENT;
        }
    }

    /// Neither side can force mate: K vs K, a lone minor, two knights against
    /// a bare king, or one minor each.
    pub fn is_insufficient_material(&self) -> bool {
        let heavy = self.bb(true, PieceType::Pawn)
            | self.bb(false, PieceType::Pawn)
            | self.bb(true, PieceType::Rook)
            | self.bb(false, PieceType::Rook)
            | self.bb(true, PieceType::Queen)
            | self.bb(false, PieceType::Queen);
        if heavy != 0 {
            return false;
        }

        let white_knights = self.bb(true, PieceType::Knight).count_ones();
        let black_knights = self.bb(false, PieceType::Knight).count_ones();
        let white_minors = white_knights + self.bb(true, PieceType::Bishop).count_ones();
        let black_minors = black_knights + self.bb(false, PieceType::Bishop).count_ones();

        match white_minors + black_minors {
            0 | 1 => true,
            2 => {
                white_knights == 2 || black_knights == 2 || (white_minors == 1 && black_minors == 1)
            }
            _ => false,
        }
    }

    /// Threefold detection along the current search path: the current hash
    /// seen twice before within the reversible-move window.
    pub fn is_draw_by_repetition_in_path(&self) -> bool {
        let mut count = 0;
        let len = self.search_history.len();
        let window = (self.half_moves as usize).min(len);
        for i in 1..=window {
            if self.search_history[len - i] == self.hash {
                count += 1;
                if count >= 2 {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_checkmate_white()
            || self.state.is_checkmate_black()
            || self.state.is_stalemate()
            || self.state.is_draw()
    }

    /// Endgame trigger: at most one queen on the board, few non-pawn pieces,
    /// or a pure pawn ending.
    pub fn is_endgame(&self) -> bool {
        let queens = self.bb(true, PieceType::Queen).count_ones()
            + self.bb(false, PieceType::Queen).count_ones();
        if queens <= 1 {
            return true;
        }

        let total = self.occ_all.count_ones();
        let pawns = self.bb(true, PieceType::Pawn).count_ones()
            + self.bb(false, PieceType::Pawn).count_ones();
        if total - pawns - 2 <= 4 {
            return true;
        }

        total == pawns + 2
    }

    /// Clear the per-search stacks before a new root search.
    pub fn start_new_search(&mut self) {
        self.undo_stack.clear();
        self.search_history.clear();
        self.undo_stack.reserve(MAX_SEARCH_DEPTH);
        self.search_history.reserve(MAX_SEARCH_DEPTH);
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl FromStr for Board {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::new_empty();
        board.set_fen(s)?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
