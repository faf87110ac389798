//! Apply/undo round trips must restore the board bit-exactly: bitboards,
//! mailbox, castling, en passant, clocks, hash, scores and both stacks.

use outpost::board::Board;
use outpost::moves::perft::root_moves;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    // En passant available immediately.
    "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
    // Promotions on the next move.
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    // Sparse endgame.
    "8/5k2/8/3pP3/8/8/3K4/8 w - d6 0 1",
];

fn assert_restored(before: &Board, after: &Board, context: &str) {
    assert_eq!(before.pieces, after.pieces, "{}: piece bitboards", context);
    assert_eq!(before.occ_white, after.occ_white, "{}: occ_white", context);
    assert_eq!(before.occ_black, after.occ_black, "{}: occ_black", context);
    assert_eq!(before.occ_all, after.occ_all, "{}: occ_all", context);
    assert_eq!(before.mailbox, after.mailbox, "{}: mailbox", context);
    assert_eq!(
        before.castling_rights, after.castling_rights,
        "{}: castling",
        context
    );
    assert_eq!(before.ep_target, after.ep_target, "{}: ep", context);
    assert_eq!(before.half_moves, after.half_moves, "{}: halfmove", context);
    assert_eq!(before.ply_count, after.ply_count, "{}: ply", context);
    assert_eq!(before.state, after.state, "{}: state flags", context);
    assert_eq!(before.hash, after.hash, "{}: hash", context);
    assert_eq!(
        before.material_score, after.material_score,
        "{}: material",
        context
    );
    assert_eq!(
        before.positional_score, after.positional_score,
        "{}: positional",
        context
    );
    assert_eq!(
        before.game_phase_score, after.game_phase_score,
        "{}: phase",
        context
    );
    assert_eq!(
        before.undo_stack, after.undo_stack,
        "{}: undo stack",
        context
    );
    assert_eq!(
        before.search_history, after.search_history,
        "{}: search history",
        context
    );
}

#[test]
fn every_first_move_round_trips() {
    for fen in FENS {
        let mut board: Board = fen.parse().unwrap();
        let white = board.ply_count % 2 == 0;
        let snapshot = board.clone();

        for mv in root_moves(&board) {
            board.apply_move_search(mv, white);
            assert_eq!(
                board.hash,
                board.compute_zobrist_full(),
                "hash drift after {} in {}",
                mv,
                fen
            );
            board.undo_move_search(mv, white);
            assert_restored(&snapshot, &board, &format!("{} in {}", mv, fen));
        }
    }
}

#[test]
fn random_walk_with_nested_undo() {
    for &seed in &[1u64, 7, 42, 99] {
        for fen in FENS {
            let mut board: Board = fen.parse().unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut applied: Vec<(outpost::moves::types::Move, bool)> = Vec::new();
            let mut snapshots = vec![board.clone()];

            for _ in 0..60 {
                let moves = root_moves(&board);
                if moves.is_empty() {
                    break;
                }
                let white = board.ply_count % 2 == 0;
                let mv = moves[rng.gen_range(0..moves.len())];

                board.apply_move_search(mv, white);
                assert_eq!(board.hash, board.compute_zobrist_full());
                applied.push((mv, white));
                snapshots.push(board.clone());
            }

            // Unwind the whole line, checking each intermediate state.
            while let Some((mv, white)) = applied.pop() {
                snapshots.pop();
                board.undo_move_search(mv, white);
                let expected = snapshots.last().unwrap();
                assert_restored(expected, &board, &format!("unwind in {}", fen));
            }
        }
    }
}

#[test]
fn mailbox_and_bitboards_agree_along_a_game() {
    use outpost::board::PieceType;

    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..120 {
        for sq in 0..64usize {
            let piece = board.piece_at(sq);
            let bit = 1u64 << sq;
            if piece == PieceType::Empty {
                assert_eq!(board.occ_all & bit, 0, "ghost piece on {}", sq);
            } else {
                let white = board.white_at(sq);
                assert_ne!(board.bb(white, piece) & bit, 0, "mailbox mismatch on {}", sq);
            }
        }
        // Exactly one king each (kings are never captured).
        assert_eq!(board.bb(true, PieceType::King).count_ones(), 1);
        assert_eq!(board.bb(false, PieceType::King).count_ones(), 1);

        let moves = root_moves(&board);
        if moves.is_empty() {
            break;
        }
        let white = board.ply_count % 2 == 0;
        let mv = moves[rng.gen_range(0..moves.len())];
        board.apply_move_search(mv, white);
    }
}

#[test]
fn full_recalc_threshold_still_round_trips() {
    // Capturing a queen swings the phase fraction by more than 0.1 and
    // triggers the positional recount; undo must still restore exactly.
    let fen = "3qk3/4p3/8/8/8/8/4P3/3QK3 w - - 0 1";
    let mut board: Board = fen.parse().unwrap();
    let snapshot = board.clone();

    let mv = root_moves(&board)
        .into_iter()
        .find(|m| m.is_capture() && m.captured() == outpost::board::PieceType::Queen)
        .expect("queen capture available");

    board.apply_move_search(mv, true);
    assert_eq!(board.hash, board.compute_zobrist_full());
    board.undo_move_search(mv, true);
    assert_restored(&snapshot, &board, "queen trade");
}
