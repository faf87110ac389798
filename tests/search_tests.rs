//! Search behaviour: mate finding for both sides, transposition table
//! consistency, draw gates and the endgame variant.

use outpost::board::Board;
use outpost::search::context::SearchContext;
use outpost::search::endgame::find_best_endgame_move;
use outpost::search::search::{find_best_move, minimax, SearchStats, INF};
use outpost::search::tt::{TranspositionTable, FLAG_EXACT};

fn search_setup() -> (SearchContext, TranspositionTable) {
    (SearchContext::new(), TranspositionTable::new(8))
}

#[test]
fn white_finds_mate_in_one() {
    // Back-rank mate: Ra1-a8#.
    let mut board: Board = "6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, score) = find_best_move(&mut board, &mut ctx, &mut tt, 3, true);
    assert_eq!(best.expect("a move").to_string(), "a1a8");
    assert!(score > 90_000, "mate score expected, got {}", score);
}

#[test]
fn black_finds_mate_in_one() {
    // Mirrored back-rank mate for the minimizing side.
    let mut board: Board = "r3k3/8/8/8/8/8/5PPP/6K1 b - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, score) = find_best_move(&mut board, &mut ctx, &mut tt, 3, false);
    assert_eq!(best.expect("a move").to_string(), "a8a1");
    assert!(score < -90_000, "mate score expected, got {}", score);
}

#[test]
fn search_prefers_the_hanging_queen() {
    // White can simply take an undefended queen.
    let mut board: Board = "3q1k2/8/8/8/8/8/8/3RK3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, score) = find_best_move(&mut board, &mut ctx, &mut tt, 4, true);
    assert_eq!(best.expect("a move").to_string(), "d1d8");
    assert!(score > 300);
}

#[test]
fn root_with_no_legal_moves_returns_none() {
    // Stalemate position, Black to move.
    let mut board: Board = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, _) = find_best_move(&mut board, &mut ctx, &mut tt, 3, false);
    assert!(best.is_none());
}

#[test]
fn fifty_move_gate_zeroes_the_score() {
    // White is a rook up, but the clock already shows 50 reversible plies.
    let mut board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 50 80".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();
    let mut stats = SearchStats::default();

    let score = minimax(&mut board, &mut ctx, &mut tt, 3, -INF, INF, true, &mut stats);
    assert_eq!(score, 0);
}

#[test]
fn tt_stores_and_reuses_exact_scores() {
    let mut board: Board = "3q1k2/8/8/8/8/8/8/3RK3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();
    let mut stats = SearchStats::default();

    let deep = minimax(&mut board, &mut ctx, &mut tt, 4, -INF, INF, true, &mut stats);

    // The root entry must be exact and match the returned score.
    let entry = tt.probe(board.hash).expect("root entry cached");
    assert_eq!(entry.flag, FLAG_EXACT);
    assert_eq!(entry.score as i32, deep);
    assert!(entry.depth >= 4);

    // A shallower re-search hits the deeper entry and returns the same score.
    let shallow = minimax(&mut board, &mut ctx, &mut tt, 2, -INF, INF, true, &mut stats);
    assert_eq!(shallow, deep);
}

#[test]
fn tt_hint_survives_between_searches() {
    let mut board: Board = "3q1k2/8/8/8/8/8/8/3RK3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (first, _) = find_best_move(&mut board, &mut ctx, &mut tt, 4, true);
    let (second, _) = find_best_move(&mut board, &mut ctx, &mut tt, 4, true);
    assert_eq!(first, second);
}

#[test]
fn endgame_search_finds_mate_with_the_check_extension() {
    // King + queen vs king: Qb7 ideas; at depth 3 the endgame search must
    // already corner the king or give a mating check.
    let mut board: Board = "7k/8/5K2/8/8/8/1Q6/8 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, score) = find_best_endgame_move(&mut board, &mut ctx, &mut tt, 4, true);
    let best = best.expect("a move");
    assert!(score > 90_000, "expected a mate score, got {} ({})", score, best);
}

#[test]
fn endgame_search_pushes_the_passer() {
    // Lone passed pawn one step from promotion.
    let mut board: Board = "8/4P3/8/8/7k/8/8/4K3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (best, score) = find_best_endgame_move(&mut board, &mut ctx, &mut tt, 4, true);
    let best = best.expect("a move");
    // Every good line promotes within the horizon; a queen must be on the
    // board by the leaves.
    assert!(score > 700, "promotion missed: {} ({})", score, best);
    if best.is_promotion() {
        assert_eq!(best.promotion(), outpost::board::PieceType::Queen);
    }
}

#[test]
fn deeper_search_never_worsens_a_forced_mate() {
    let mut board: Board = "6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
    let (mut ctx, mut tt) = search_setup();

    let (_, d2) = find_best_move(&mut board, &mut ctx, &mut tt, 2, true);
    let (_, d4) = find_best_move(&mut board, &mut ctx, &mut tt, 4, true);
    assert!(d2 > 90_000);
    assert!(d4 > 90_000);
}
