//! Perft: exhaustive legal move walk used to validate move generation and
//! the apply/undo machinery against the known node counts.

use crate::bitboard::pop_lsb;
use crate::board::{Board, PieceType};
use crate::moves::movegen;
use crate::moves::types::{Move, MoveKind};
use tracing::trace;

const PERFT_PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// All legal moves of the side to move, with every promotion piece expanded.
pub fn root_moves(board: &Board) -> Vec<Move> {
    let white = board.ply_count % 2 == 0;
    let mut moves = Vec::with_capacity(64);

    let mut friendly = board.occupancy(white);
    while friendly != 0 {
        let from = pop_lsb(&mut friendly);
        let piece = board.piece_at(from as usize);
        let mut targets = movegen::legal_moves_from(board, from as usize, white);
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            let captured = board.piece_at(to as usize);
            let kind = board.move_kind(from, to, piece, captured, white);
            match kind {
                MoveKind::Promotion | MoveKind::PromotionCapture => {
                    for promo in PERFT_PROMOTIONS {
                        moves.push(Move::encode(from, to, piece, captured, kind, promo, false));
                    }
                }
                _ => moves.push(Move::encode(
                    from,
                    to,
                    piece,
                    captured,
                    kind,
                    PieceType::Empty,
                    false,
                )),
            }
        }
    }

    moves
}

/// Leaf node count at the given depth.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let white = board.ply_count % 2 == 0;
    let moves = root_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in moves {
        board.apply_move_search(mv, white);
        nodes += perft(board, depth - 1);
        board.undo_move_search(mv, white);
    }
    nodes
}

/// Per-root-move node counts, traced and returned for divide-style debugging.
pub fn perft_divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let white = board.ply_count % 2 == 0;
    let mut rows = Vec::new();
    let mut total = 0u64;

    for mv in root_moves(board) {
        board.apply_move_search(mv, white);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.undo_move_search(mv, white);
        trace!(%mv, nodes, "divide");
        total += nodes;
        rows.push((mv, nodes));
    }

    trace!(total, depth, "divide complete");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_shallow_counts() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8_902);
    }

    #[test]
    fn divide_totals_match_perft() {
        let mut board = Board::new();
        let rows = perft_divide(&mut board, 2);
        let total: u64 = rows.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 400);
        assert_eq!(rows.len(), 20);
    }

    #[test]
    fn promotion_positions_expand_all_pieces() {
        let mut board: Board = "8/P6k/8/8/8/8/8/7K w - - 0 1".parse().unwrap();
        // Four promotions plus three king moves.
        assert_eq!(perft(&mut board, 1), 7);
    }
}
