//! The four scored move generators. Each one emits (move, score) pairs into a
//! fixed-capacity buffer, sorts descending by score and returns the bare
//! moves; the search walks them in order.

use crate::bitboard::pop_lsb;
use crate::board::{Board, PieceType};
use crate::moves::movegen::{self, is_check_move};
use crate::moves::types::{Move, MoveKind};
use crate::search::context::SearchContext;
use crate::search::eval::is_passed_pawn;
use crate::tables::scoring::{
    BN_PROMOTION, CENTRALITY_DISTANCE, CHECK_MOVE_SCORE, ENDGAME_KILLER_SCORE,
    HISTORY_SCORE_SCALEFACTOR, KILLER_SCORE, KING_KILLER_SCORE, LOSING_TRADE_PENALTY, MAX_MOVES,
    MVV_LVA, MVV_LVA_ENDGAME, PASSED_PAWN_RANK_MULTIPLIER, PASSED_PAWN_SCORE, PAWN_KILLER_SCORE,
    PROMOTION_SCORE, QUEEN_PROMOTION, ROOK_PROMOTION, TT_MOVE_SCORE,
};
use arrayvec::ArrayVec;

pub type MoveList = ArrayVec<Move, MAX_MOVES>;
type ScoredList = ArrayVec<(Move, i32), MAX_MOVES>;

const ENDGAME_PROMOTIONS: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

#[inline(always)]
fn promotion_bonus(piece: PieceType) -> i32 {
    match piece {
        PieceType::Queen => QUEEN_PROMOTION,
        PieceType::Rook => ROOK_PROMOTION,
        _ => BN_PROMOTION,
    }
}

#[inline(always)]
fn relative_rank(sq: u8, white: bool) -> i32 {
    if white {
        (sq >> 3) as i32
    } else {
        7 - (sq >> 3) as i32
    }
}

fn finish(mut scored: ScoredList) -> MoveList {
    scored.sort_unstable_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(mv, _)| mv).collect()
}

/// Every legal move of `white`, ordered TT hint > captures (MVV/LVA) >
/// promotions > killers > history. Promotions are queen-only here; the
/// endgame generator handles under-promotion.
pub fn generate_all(
    board: &Board,
    ctx: &SearchContext,
    depth: i32,
    white: bool,
    tt_hint: Move,
) -> MoveList {
    let mut scored = ScoredList::new();

    let mut friendly = board.occupancy(white);
    while friendly != 0 {
        let from = pop_lsb(&mut friendly);
        let piece = board.piece_at(from as usize);
        let mut targets = movegen::legal_moves_from(board, from as usize, white);

        while targets != 0 {
            let to = pop_lsb(&mut targets);
            let captured = board.piece_at(to as usize);
            let kind = board.move_kind(from, to, piece, captured, white);
            let promotion = match kind {
                MoveKind::Promotion | MoveKind::PromotionCapture => PieceType::Queen,
                _ => PieceType::Empty,
            };
            let mv = Move::encode(from, to, piece, captured, kind, promotion, false);

            let score = if !tt_hint.is_null() && mv == tt_hint {
                TT_MOVE_SCORE
            } else {
                let mut score = 0;
                if mv.is_capture() {
                    let victim = if kind == MoveKind::EnPassant {
                        PieceType::Pawn
                    } else {
                        captured
                    };
                    score = MVV_LVA[victim as usize][piece as usize];
                } else if depth > 0 {
                    score = if ctx.is_killer(depth, mv.key()) {
                        KILLER_SCORE
                    } else {
                        ctx.history_score(mv.key())
                    };
                }
                if mv.is_promotion() {
                    score += QUEEN_PROMOTION;
                }
                score
            };

            scored.push((mv, score));
        }
    }

    finish(scored)
}

/// Quiescence input: captures, en passant and queen promotions only.
pub fn generate_noisy(board: &Board, white: bool) -> MoveList {
    let mut scored = ScoredList::new();
    let opponent = board.occupancy(!white);

    let mut friendly = board.occupancy(white);
    while friendly != 0 {
        let from = pop_lsb(&mut friendly);
        let piece = board.piece_at(from as usize);
        let legal = movegen::legal_moves_from(board, from as usize, white);

        let mut captures = legal & opponent;
        while captures != 0 {
            let to = pop_lsb(&mut captures);
            let captured = board.piece_at(to as usize);
            let kind = board.move_kind(from, to, piece, captured, white);
            let promotion = if kind == MoveKind::PromotionCapture {
                PieceType::Queen
            } else {
                PieceType::Empty
            };
            let mut score = MVV_LVA[captured as usize][piece as usize];
            if kind == MoveKind::PromotionCapture {
                score += QUEEN_PROMOTION;
            }
            scored.push((
                Move::encode(from, to, piece, captured, kind, promotion, false),
                score,
            ));
        }

        if piece == PieceType::Pawn {
            if let Some(ep) = board.ep_target {
                if legal & ep.bb() != 0 {
                    scored.push((
                        Move::encode(
                            from,
                            ep.index(),
                            PieceType::Pawn,
                            PieceType::Empty,
                            MoveKind::EnPassant,
                            PieceType::Empty,
                            false,
                        ),
                        MVV_LVA[PieceType::Pawn as usize][PieceType::Pawn as usize],
                    ));
                }
            }

            // Quiet queen promotions.
            let promo_rank = if white {
                crate::bitboard::RANK_8
            } else {
                crate::bitboard::RANK_1
            };
            let mut pushes = legal & promo_rank & !opponent;
            while pushes != 0 {
                let to = pop_lsb(&mut pushes);
                scored.push((
                    Move::encode(
                        from,
                        to,
                        PieceType::Pawn,
                        PieceType::Empty,
                        MoveKind::Promotion,
                        PieceType::Queen,
                        false,
                    ),
                    QUEEN_PROMOTION,
                ));
            }
        }
    }

    finish(scored)
}

/// Endgame ordering favours checks, keeps material when ahead, pushes passed
/// pawns, activates the king and generates every promotion piece.
pub fn generate_endgame(
    board: &Board,
    ctx: &SearchContext,
    depth: i32,
    white: bool,
    tt_hint: Move,
) -> MoveList {
    let mut scored = ScoredList::new();

    let eval = board.material_score + board.positional_score;
    let winning = if white { eval >= 0 } else { eval < 0 };

    let enemy_king = board.king_square(!white);
    let danger = movegen::compute_king_danger(enemy_king, board.occupied(), white);

    let mut friendly = board.occupancy(white);
    while friendly != 0 {
        let from = pop_lsb(&mut friendly);
        let piece = board.piece_at(from as usize);
        let mut targets = movegen::legal_moves_from(board, from as usize, white);

        while targets != 0 {
            let to = pop_lsb(&mut targets);
            let captured = board.piece_at(to as usize);
            let kind = board.move_kind(from, to, piece, captured, white);
            let check = is_check_move(&danger, to as usize, piece);

            let mut score = 0;
            if check {
                score += CHECK_MOVE_SCORE;
            }

            if mv_kind_is_capture(kind) {
                let victim = if kind == MoveKind::EnPassant {
                    PieceType::Pawn
                } else {
                    captured
                };
                score += MVV_LVA_ENDGAME[victim as usize][piece as usize];
                if winning && piece.value() > victim.value() {
                    score -= LOSING_TRADE_PENALTY;
                }
            } else if depth > 0 {
                if ctx.is_killer(depth, crate::moves::types::move_key(from, to, piece)) {
                    score += match piece {
                        PieceType::Pawn => PAWN_KILLER_SCORE,
                        PieceType::King => KING_KILLER_SCORE,
                        _ => ENDGAME_KILLER_SCORE,
                    };
                }
                score += ctx.history_score(crate::moves::types::move_key(from, to, piece))
                    / HISTORY_SCORE_SCALEFACTOR;
            }

            if piece == PieceType::Pawn && is_passed_pawn(board, to as usize, white) {
                score += PASSED_PAWN_SCORE + PASSED_PAWN_RANK_MULTIPLIER * relative_rank(to, white);
            }

            if piece == PieceType::King {
                score += 600 * (4 - CENTRALITY_DISTANCE[to as usize]);
            }

            match kind {
                MoveKind::Promotion | MoveKind::PromotionCapture => {
                    let base = score + PROMOTION_SCORE;
                    for promo in ENDGAME_PROMOTIONS {
                        let mv = Move::encode(from, to, piece, captured, kind, promo, check);
                        let final_score = if !tt_hint.is_null() && mv == tt_hint {
                            TT_MOVE_SCORE
                        } else {
                            base + promotion_bonus(promo)
                        };
                        scored.push((mv, final_score));
                    }
                }
                _ => {
                    let mv = Move::encode(from, to, piece, captured, kind, PieceType::Empty, check);
                    let final_score = if !tt_hint.is_null() && mv == tt_hint {
                        TT_MOVE_SCORE
                    } else {
                        score
                    };
                    scored.push((mv, final_score));
                }
            }
        }
    }

    finish(scored)
}

/// Endgame quiescence input: captures, promotions and checking moves; quiet
/// non-checks are skipped.
pub fn generate_endgame_noisy(board: &Board, white: bool) -> MoveList {
    let mut scored = ScoredList::new();

    let eval = board.material_score + board.positional_score;
    let winning = if white { eval >= 0 } else { eval < 0 };

    let enemy_king = board.king_square(!white);
    let danger = movegen::compute_king_danger(enemy_king, board.occupied(), white);

    let mut friendly = board.occupancy(white);
    while friendly != 0 {
        let from = pop_lsb(&mut friendly);
        let piece = board.piece_at(from as usize);
        let mut targets = movegen::legal_moves_from(board, from as usize, white);

        while targets != 0 {
            let to = pop_lsb(&mut targets);
            let captured = board.piece_at(to as usize);
            let kind = board.move_kind(from, to, piece, captured, white);
            let check = is_check_move(&danger, to as usize, piece);

            let quiet = matches!(kind, MoveKind::Normal | MoveKind::Castling);
            if quiet && !check {
                continue;
            }

            let mut score = 0;
            if check {
                score += CHECK_MOVE_SCORE;
            }

            if matches!(kind, MoveKind::Promotion | MoveKind::PromotionCapture) {
                score += PROMOTION_SCORE;
                if is_passed_pawn(board, from as usize, white) {
                    score +=
                        PASSED_PAWN_SCORE + PASSED_PAWN_RANK_MULTIPLIER * relative_rank(to, white);
                }
            }

            if mv_kind_is_capture(kind) {
                let victim = if kind == MoveKind::EnPassant {
                    PieceType::Pawn
                } else {
                    captured
                };
                score += MVV_LVA_ENDGAME[victim as usize][piece as usize];
                if winning && piece.value() > victim.value() {
                    score -= LOSING_TRADE_PENALTY;
                }
            }

            if piece == PieceType::King {
                score += 200 * (4 - CENTRALITY_DISTANCE[to as usize]);
            }

            match kind {
                MoveKind::Promotion | MoveKind::PromotionCapture => {
                    for promo in ENDGAME_PROMOTIONS {
                        scored.push((
                            Move::encode(from, to, piece, captured, kind, promo, check),
                            score + promotion_bonus(promo),
                        ));
                    }
                }
                _ => {
                    scored.push((
                        Move::encode(from, to, piece, captured, kind, PieceType::Empty, check),
                        score,
                    ));
                }
            }
        }
    }

    finish(scored)
}

#[inline(always)]
fn mv_kind_is_capture(kind: MoveKind) -> bool {
    matches!(
        kind,
        MoveKind::Capture | MoveKind::PromotionCapture | MoveKind::EnPassant
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_moves() {
        let board = Board::new();
        let ctx = SearchContext::new();
        let moves = generate_all(&board, &ctx, 1, true, Move::NULL);
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn tt_hint_sorts_first() {
        let board = Board::new();
        let ctx = SearchContext::new();
        // Pick an arbitrary quiet knight move as hint.
        let hint = Move::encode(
            6,
            21,
            PieceType::Knight,
            PieceType::Empty,
            MoveKind::Normal,
            PieceType::Empty,
            false,
        );
        let moves = generate_all(&board, &ctx, 3, true, hint);
        assert_eq!(moves[0], hint);
    }

    #[test]
    fn captures_outrank_quiet_moves() {
        // White to move can take the d5 pawn with the e4 pawn.
        let board: Board =
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
                .parse()
                .unwrap();
        let ctx = SearchContext::new();
        let moves = generate_all(&board, &ctx, 1, true, Move::NULL);
        assert!(moves[0].is_capture(), "capture should sort first");
    }

    #[test]
    fn noisy_keeps_only_captures_and_promotions() {
        let board: Board = "8/P6k/8/8/3p4/4P3/8/7K w - - 0 1".parse().unwrap();
        let moves = generate_noisy(&board, true);
        assert!(!moves.is_empty());
        for mv in &moves {
            assert!(mv.is_capture() || mv.is_promotion(), "unexpected {}", mv);
        }
        // The quiet a7a8 queen promotion must be present.
        assert!(moves.iter().any(|m| m.kind() == MoveKind::Promotion));
    }

    #[test]
    fn endgame_generates_under_promotions() {
        let board: Board = "8/P6k/8/8/8/8/8/7K w - - 0 1".parse().unwrap();
        let ctx = SearchContext::new();
        let moves = generate_endgame(&board, &ctx, 1, true, Move::NULL);
        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
        // Queen promotion ordered ahead of the under-promotions.
        assert_eq!(promos[0].promotion(), PieceType::Queen);
    }

    #[test]
    fn endgame_noisy_keeps_checks() {
        // Rook b1 can check the king on h8 by moving to b8; quiet non-checks
        // must be filtered out.
        let board: Board = "7k/8/8/8/8/8/8/KR6 w - - 0 1".parse().unwrap();
        let moves = generate_endgame_noisy(&board, true);
        assert!(!moves.is_empty());
        for mv in &moves {
            assert!(mv.is_check() || mv.is_capture() || mv.is_promotion());
        }
        assert!(moves.iter().any(|m| m.to_sq() == 57 && m.is_check()));
    }
}
