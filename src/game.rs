//! Game wrapper around the board: turn bookkeeping, the engine API the
//! front end consumes, algebraic notation for the last move, and the sticky
//! endgame search switch.

use crate::board::{Board, PieceType};
use crate::moves::movegen;
use crate::moves::types::{Move, MoveKind};
use crate::search::context::SearchContext;
use crate::search::endgame::find_best_endgame_move;
use crate::search::search::find_best_move;
use crate::search::tt::TranspositionTable;
use crate::square::Square;
use crate::tables::scoring::DESIRED_TT_SIZE_MB;
use serde::Serialize;

/// Snapshot of the game outcome after the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Check,
    Mate,
    Stalemate,
    DrawRepetition,
    Draw50,
    DrawInsufficient,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Mate => "mate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::DrawRepetition => "draw_repetition",
            GameStatus::Draw50 => "draw_50",
            GameStatus::DrawInsufficient => "draw_insufficient",
        }
    }
}

pub struct Game {
    board: Board,
    white_to_move: bool,
    /// Once the position reads as an endgame the endgame search stays on.
    endgame: bool,
    prev_move: String,
    ctx: SearchContext,
    tt: TranspositionTable,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// Fresh game at the standard start with the default transposition table.
    pub fn new() -> Self {
        Game::with_tt_size(DESIRED_TT_SIZE_MB)
    }

    pub fn with_tt_size(size_mb: usize) -> Self {
        Game {
            board: Board::new(),
            white_to_move: true,
            endgame: false,
            prev_move: String::new(),
            ctx: SearchContext::new(),
            tt: TranspositionTable::new(size_mb),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let mut game = Game::new();
        game.set_fen(fen)?;
        Ok(game)
    }

    /// Replace the position; search state carries over harmlessly (the TT is
    /// keyed by hash).
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        self.board.set_fen(fen)?;
        self.white_to_move = self.board.ply_count % 2 == 0;
        self.endgame = self.board.is_endgame();
        self.prev_move.clear();
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    pub fn endgame_search(&self) -> bool {
        self.endgame
    }

    /// Legal destination bitboard for the piece on `square`. Empty for an
    /// out-of-range square, an empty square, or an opponent piece.
    pub fn legal_moves(&self, square: u8) -> u64 {
        if square > 63 {
            return 0;
        }
        movegen::legal_moves_from(&self.board, square as usize, self.white_to_move)
    }

    /// Apply a user move. The caller validates legality beforehand via
    /// `legal_moves`; invalid input is a silent no-op.
    pub fn make_move(&mut self, from: u8, to: u8, promotion: char) {
        if from > 63 || to > 63 {
            return;
        }
        if self.board.occupancy(self.white_to_move) & (1u64 << from) == 0 {
            return;
        }

        let promo_piece = match promotion {
            'q' => PieceType::Queen,
            'r' => PieceType::Rook,
            'b' => PieceType::Bishop,
            'n' => PieceType::Knight,
            _ => PieceType::Empty,
        };

        let mv = self
            .board
            .apply_move_played(from, to, promo_piece, self.white_to_move);
        self.prev_move = self.notation(mv);
        self.white_to_move = !self.white_to_move;

        if !self.endgame {
            self.endgame = self.board.is_endgame();
        }
    }

    /// Run the root search to `depth` for the side given by `maximizing`
    /// (true = White) and apply the chosen move. With no legal move this is a
    /// no-op and `prev_move` is cleared; the game-state flags carry the
    /// mate/stalemate verdict.
    pub fn make_best_move(&mut self, depth: i32, maximizing: bool) {
        let (best, _score) = if self.endgame {
            find_best_endgame_move(&mut self.board, &mut self.ctx, &mut self.tt, depth, maximizing)
        } else {
            find_best_move(&mut self.board, &mut self.ctx, &mut self.tt, depth, maximizing)
        };

        let Some(mv) = best else {
            self.prev_move.clear();
            return;
        };

        let promo = if mv.is_promotion() {
            mv.promotion()
        } else {
            PieceType::Empty
        };
        let applied = self
            .board
            .apply_move_played(mv.from_sq(), mv.to_sq(), promo, maximizing);
        self.prev_move = self.notation(applied);
        self.white_to_move = !maximizing;

        if !self.endgame {
            self.endgame = self.board.is_endgame();
        }
    }

    pub fn fen(&self) -> String {
        self.board.to_fen()
    }

    pub fn prev_move(&self) -> &str {
        &self.prev_move
    }

    pub fn game_state(&self) -> GameStatus {
        let state = self.board.state;
        if state.is_checkmate_white() || state.is_checkmate_black() {
            GameStatus::Mate
        } else if state.is_check_white() || state.is_check_black() {
            GameStatus::Check
        } else if state.is_stalemate() {
            GameStatus::Stalemate
        } else if state.flags & crate::board::BoardState::DRAW_REPETITION != 0 {
            GameStatus::DrawRepetition
        } else if state.flags & crate::board::BoardState::DRAW_50 != 0 {
            GameStatus::Draw50
        } else if state.flags & crate::board::BoardState::DRAW_INSUFFICIENT != 0 {
            GameStatus::DrawInsufficient
        } else {
            GameStatus::Ongoing
        }
    }

    fn piece_letter(piece: PieceType) -> char {
        match piece {
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
            _ => '-',
        }
    }

    /// Algebraic notation for an already-applied move; check and mate
    /// suffixes come from the board state after it.
    fn notation(&self, mv: Move) -> String {
        let mut text = String::new();

        if mv.kind() == MoveKind::Castling {
            text.push_str(if mv.to_sq() > mv.from_sq() { "O-O" } else { "O-O-O" });
        } else {
            let piece = mv.piece();
            if piece != PieceType::Pawn {
                text.push(Self::piece_letter(piece));
            }

            if mv.is_capture() {
                if piece == PieceType::Pawn {
                    text.push((b'a' + (mv.from_sq() & 7)) as char);
                }
                text.push('x');
            }

            text.push_str(&Square::from_index(mv.to_sq()).to_string());

            if mv.is_promotion() {
                text.push(Self::piece_letter(mv.promotion()));
            }

            if mv.kind() == MoveKind::EnPassant {
                text.push_str(" e.p.");
            }
        }

        let state = self.board.state;
        if state.is_checkmate_white() || state.is_checkmate_black() {
            text.push('#');
        } else if state.is_check_white() || state.is_check_black() {
            text.push('+');
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_moves_and_notation() {
        let mut game = Game::with_tt_size(1);
        game.make_move(12, 28, '-'); // e2e4
        assert_eq!(game.prev_move(), "e4");
        assert!(!game.white_to_move());
        game.make_move(52, 36, '-'); // e7e5
        assert_eq!(game.prev_move(), "e5");
        assert_eq!(game.game_state(), GameStatus::Ongoing);
    }

    #[test]
    fn out_of_range_and_wrong_side_are_no_ops() {
        let mut game = Game::with_tt_size(1);
        let fen = game.fen();
        game.make_move(64, 0, '-');
        game.make_move(52, 36, '-'); // black pawn, but it is White's turn
        assert_eq!(game.fen(), fen);
        assert_eq!(game.legal_moves(64), 0);
        assert_eq!(game.legal_moves(52), 0);
    }

    #[test]
    fn capture_notation_includes_file_for_pawns() {
        let mut game = Game::with_tt_size(1);
        game.make_move(12, 28, '-'); // e4
        game.make_move(51, 35, '-'); // d5
        game.make_move(28, 35, '-'); // exd5
        assert_eq!(game.prev_move(), "exd5");
    }

    #[test]
    fn castling_notation() {
        let mut game = Game::with_tt_size(1);
        game.set_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        game.make_move(4, 6, '-');
        assert_eq!(game.prev_move(), "O-O");
    }

    #[test]
    fn sticky_endgame_switch() {
        let mut game = Game::with_tt_size(1);
        game.set_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(game.endgame_search());
    }
}
