//! FEN parsing and serialization for the board. The wrapper and the test
//! fixtures construct positions through this path.

use super::{Board, PieceType, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::square::Square;
use std::str::FromStr;

fn piece_from_char(c: char) -> Option<(bool, PieceType)> {
    let piece = match c.to_ascii_lowercase() {
        'p' => PieceType::Pawn,
        'n' => PieceType::Knight,
        'b' => PieceType::Bishop,
        'r' => PieceType::Rook,
        'q' => PieceType::Queen,
        'k' => PieceType::King,
        _ => return None,
    };
    Some((c.is_ascii_uppercase(), piece))
}

fn piece_to_char(white: bool, piece: PieceType) -> char {
    let c = match piece {
        PieceType::Pawn => 'p',
        PieceType::Knight => 'n',
        PieceType::Bishop => 'b',
        PieceType::Rook => 'r',
        PieceType::Queen => 'q',
        PieceType::King => 'k',
        PieceType::Empty => return ' ',
    };
    if white {
        c.to_ascii_uppercase()
    } else {
        c
    }
}

impl Board {
    /// Load a position from a FEN string, replacing the current state. The
    /// halfmove clock and fullmove fields are optional and default to "0 1".
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(format!("FEN needs at least 4 fields: {}", fen));
        }

        let mut board = Board::new_empty();

        // 1. Piece placement, rank 8 down to rank 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN board must have 8 ranks: {}", fields[0]));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else if let Some((white, piece)) = piece_from_char(c) {
                    if file > 7 {
                        return Err(format!("rank overflow in FEN: {}", rank_str));
                    }
                    board.place_piece(white, piece, rank * 8 + file);
                    file += 1;
                } else {
                    return Err(format!("invalid FEN piece char: {}", c));
                }
            }
            if file != 8 {
                return Err(format!("rank underflow in FEN: {}", rank_str));
            }
        }

        // 2. Side to move.
        let white_to_move = match fields[1] {
            "w" => true,
            "b" => false,
            other => return Err(format!("invalid side to move: {}", other)),
        };

        // 3. Castling rights.
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("invalid castling flag: {}", other)),
                };
            }
        }

        // 4. En passant target.
        if fields[3] != "-" {
            board.ep_target = Some(Square::from_str(fields[3])?);
        }

        // 5-6. Clocks.
        if fields.len() > 4 {
            board.half_moves = fields[4]
                .parse()
                .map_err(|_| format!("invalid halfmove clock: {}", fields[4]))?;
        }
        let fullmoves: u32 = if fields.len() > 5 {
            fields[5]
                .parse()
                .map_err(|_| format!("invalid fullmove number: {}", fields[5]))?
        } else {
            1
        };
        // Side-to-move parity is carried by the ply count.
        board.ply_count = (fullmoves.max(1) - 1) * 2 + u32::from(!white_to_move);

        if board.bb(true, PieceType::King).count_ones() != 1
            || board.bb(false, PieceType::King).count_ones() != 1
        {
            return Err(format!("FEN must have exactly one king per side: {}", fen));
        }

        board.recount_material_and_phase();
        board.update_positional_score();
        board.hash = board.compute_zobrist_full();
        board.position_history.insert(board.hash, 1);
        // Pins, attack data and check/terminal flags for the side to move.
        board.update_board_state(!white_to_move);
        board.update_draw_flags();

        *self = board;
        Ok(())
    }

    /// Serialize the current position. Side to move and the fullmove number
    /// are derived from the ply count.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let sq = rank * 8 + file;
                let piece = self.mailbox[sq];
                if piece == PieceType::Empty {
                    empty += 1;
                    continue;
                }
                if empty > 0 {
                    fen.push(char::from_digit(empty, 10).unwrap_or('0'));
                    empty = 0;
                }
                fen.push(piece_to_char(self.white_at(sq), piece));
            }
            if empty > 0 {
                fen.push(char::from_digit(empty, 10).unwrap_or('0'));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        let white_to_move = self.ply_count % 2 == 0;
        fen.push(' ');
        fen.push(if white_to_move { 'w' } else { 'b' });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.has_castling(CASTLE_WK) {
                fen.push('K');
            }
            if self.has_castling(CASTLE_WQ) {
                fen.push('Q');
            }
            if self.has_castling(CASTLE_BK) {
                fen.push('k');
            }
            if self.has_castling(CASTLE_BQ) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.ep_target {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.half_moves, self.ply_count / 2 + 1));
        fen
    }
}
