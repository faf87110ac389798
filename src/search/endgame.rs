//! Endgame search: structurally the midgame minimax, with a one-ply check
//! extension, the endgame generators and evaluator, and recursion kept
//! entirely inside the endgame routines.

use crate::board::Board;
use crate::moves::generate::{generate_endgame, generate_endgame_noisy};
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::eval::{estimate_endgame_capture_value, evaluate_endgame};
use crate::search::search::{SearchStats, INF};
use crate::search::tt::{TranspositionTable, FLAG_EXACT, FLAG_LOWERBOUND, FLAG_UPPERBOUND};
use crate::tables::scoring::{DELTA_MARGIN_ENDGAME, MAX_DEPTH, MAX_SEARCH_DEPTH};
use tracing::debug;

/// Endgame root search, mirroring `find_best_move`.
pub fn find_best_endgame_move(
    board: &mut Board,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    depth: i32,
    maximizing: bool,
) -> (Option<Move>, i32) {
    board.start_new_search();

    let moves = generate_endgame(board, ctx, 0, maximizing, Move::NULL);
    if moves.is_empty() {
        return (None, 0);
    }

    let mut stats = SearchStats::default();
    let mut best_move = None;
    let mut best_score = if maximizing { -INF } else { INF };

    for mv in moves {
        board.apply_move_search(mv, maximizing);
        let score = if board.state.is_draw() {
            0
        } else {
            endgame_minimax(board, ctx, tt, depth - 1, -INF, INF, !maximizing, &mut stats)
        };
        board.undo_move_search(mv, maximizing);

        let improved = if maximizing {
            score > best_score
        } else {
            score < best_score
        };
        if improved || best_move.is_none() {
            best_score = score;
            best_move = Some(mv);
        }
    }

    debug!(
        depth,
        nodes = stats.nodes,
        score = best_score,
        best = %best_move.unwrap_or(Move::NULL),
        "endgame search complete"
    );

    (best_move, best_score)
}

#[allow(clippy::too_many_arguments)]
pub fn endgame_minimax(
    board: &mut Board,
    ctx: &mut SearchContext,
    tt: &mut TranspositionTable,
    mut depth: i32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    if board.half_moves >= 50 {
        return 0;
    }
    if board.is_draw_by_repetition_in_path() {
        return 0;
    }

    let key = board.hash;
    let mut tt_hint = Move::NULL;

    if let Some(entry) = tt.probe(key) {
        tt_hint = Move::from_raw(entry.best_move);

        if entry.depth as i32 >= depth {
            let stored = entry.score as i32;
            match entry.flag {
                FLAG_EXACT => return stored,
                FLAG_LOWERBOUND => {
                    if stored >= beta {
                        if !tt_hint.is_null() && !tt_hint.is_capture() {
                            ctx.update_killer(depth, tt_hint.key());
                        }
                        return stored;
                    }
                    alpha = alpha.max(stored);
                }
                FLAG_UPPERBOUND => {
                    if stored <= alpha {
                        if !tt_hint.is_null() && !tt_hint.is_capture() {
                            ctx.update_killer(depth, tt_hint.key());
                        }
                        return stored;
                    }
                    beta = beta.min(stored);
                }
                _ => {}
            }
            if alpha >= beta {
                return alpha;
            }
        }
    }

    let ply = board.search_history.len() as i32;

    if board.is_game_over() {
        return evaluate_endgame(board, ply);
    }

    if depth <= 0 {
        return if maximizing {
            endgame_quiescence(board, alpha, beta, true, stats)
        } else {
            -endgame_quiescence(board, -beta, -alpha, false, stats)
        };
    }

    // Forced sequences resolve a ply deeper when the mover is in check; the
    // depth budget caps the total extension.
    if board.state.is_check(maximizing) && ply < MAX_DEPTH as i32 {
        depth += 1;
    }

    let moves = generate_endgame(board, ctx, depth, maximizing, tt_hint);
    if moves.is_empty() {
        return evaluate_endgame(board, ply);
    }

    let mut best_move = Move::NULL;
    let mut flag = FLAG_UPPERBOUND;

    if maximizing {
        let mut best_eval = -INF;
        for mv in moves {
            board.apply_move_search(mv, true);
            let eval = if board.state.is_draw() {
                0
            } else {
                endgame_minimax(board, ctx, tt, depth - 1, alpha, beta, false, stats)
            };
            board.undo_move_search(mv, true);

            if eval > best_eval {
                best_eval = eval;
                best_move = mv;
                if best_eval > alpha {
                    alpha = best_eval;
                    flag = FLAG_EXACT;
                    if !mv.is_capture() {
                        ctx.update_history(mv.key(), depth);
                    }
                }
            }

            if alpha >= beta {
                if !mv.is_capture() {
                    ctx.update_killer(depth, mv.key());
                }
                tt.store(key, mv, beta, depth, FLAG_LOWERBOUND);
                return beta;
            }
        }
        tt.store(key, best_move, best_eval, depth, flag);
        best_eval
    } else {
        let mut best_eval = INF;
        for mv in moves {
            board.apply_move_search(mv, false);
            let eval = if board.state.is_draw() {
                0
            } else {
                endgame_minimax(board, ctx, tt, depth - 1, alpha, beta, true, stats)
            };
            board.undo_move_search(mv, false);

            if eval < best_eval {
                best_eval = eval;
                best_move = mv;
                if best_eval < beta {
                    beta = best_eval;
                    flag = FLAG_EXACT;
                    if !mv.is_capture() {
                        ctx.update_history(mv.key(), depth);
                    }
                }
            }

            if alpha >= beta {
                if !mv.is_capture() {
                    ctx.update_killer(depth, mv.key());
                }
                tt.store(key, mv, alpha, depth, FLAG_UPPERBOUND);
                return alpha;
            }
        }
        tt.store(key, best_move, best_eval, depth, flag);
        best_eval
    }
}

/// Endgame quiescence: noisy moves include checks, and checks are exempt
/// from delta pruning alongside promotions.
pub fn endgame_quiescence(
    board: &mut Board,
    mut alpha: i32,
    beta: i32,
    maximizing: bool,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    if board.half_moves >= 50 {
        return 0;
    }
    if board.is_draw_by_repetition_in_path() {
        return 0;
    }

    let ply = board.search_history.len() as i32;
    let white_eval = evaluate_endgame(board, ply);
    let stand_pat = if maximizing { white_eval } else { -white_eval };

    // Checking moves keep this search alive; brake on runaway lines.
    if ply >= MAX_SEARCH_DEPTH as i32 {
        return stand_pat;
    }

    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    for mv in generate_endgame_noisy(board, maximizing) {
        let move_value = estimate_endgame_capture_value(board, mv, maximizing);
        if !mv.is_promotion()
            && !mv.is_check()
            && stand_pat + move_value + DELTA_MARGIN_ENDGAME <= alpha
        {
            continue;
        }

        board.apply_move_search(mv, maximizing);
        let score = -endgame_quiescence(board, -beta, -alpha, !maximizing, stats);
        board.undo_move_search(mv, maximizing);

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}
