//! Game-level draw detection: threefold repetition, the 50-ply rule and dead
//! material, plus the in-path repetition gate the search uses.

use outpost::board::Board;
use outpost::game::{Game, GameStatus};
use outpost::moves::perft::root_moves;

#[test]
fn knight_shuffle_is_a_threefold_draw() {
    let mut game = Game::with_tt_size(1);

    // Nf3 Nf6 Ng1 Ng8, twice: the start position occurs for the third time.
    let shuffle = [
        (6u8, 21u8),
        (62, 45),
        (21, 6),
        (45, 62),
        (6, 21),
        (62, 45),
        (21, 6),
        (45, 62),
    ];
    for (i, (from, to)) in shuffle.iter().enumerate() {
        assert_eq!(
            game.game_state(),
            GameStatus::Ongoing,
            "draw flagged too early at move {}",
            i
        );
        game.make_move(*from, *to, '-');
    }

    assert_eq!(game.game_state(), GameStatus::DrawRepetition);
}

#[test]
fn repetition_counter_resets_on_pawn_moves() {
    let mut game = Game::with_tt_size(1);
    for (from, to) in [(6u8, 21u8), (62, 45), (21, 6), (45, 62)] {
        game.make_move(from, to, '-');
    }
    // A pawn push wipes the repetition history.
    game.make_move(12, 28, '-');
    for (from, to) in [(62u8, 45u8), (6, 21), (45, 62), (21, 6)] {
        game.make_move(from, to, '-');
    }
    assert_eq!(game.game_state(), GameStatus::Ongoing);
}

#[test]
fn fifty_ply_boundary() {
    // 49 reversible plies: not yet a draw.
    let mut game = Game::with_tt_size(1);
    game.set_fen("4k3/8/8/8/8/8/8/R3K3 w - - 48 40").unwrap();
    game.make_move(0, 8, '-'); // Ra1a2, reversible, clock hits 49
    assert_eq!(game.board().half_moves, 49);
    assert_ne!(game.game_state(), GameStatus::Draw50);

    // One more reversible ply reaches 50.
    game.make_move(60, 59, '-');
    assert_eq!(game.board().half_moves, 50);
    assert_eq!(game.game_state(), GameStatus::Draw50);
}

#[test]
fn pawn_moves_and_captures_reset_the_clock() {
    let mut game = Game::with_tt_size(1);
    game.set_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 30 40").unwrap();
    game.make_move(28, 35, '-'); // exd5
    assert_eq!(game.board().half_moves, 0);
}

#[test]
fn castling_counts_as_a_reversible_ply() {
    // The corrected 50-move rule: castling increments the clock.
    let mut game = Game::with_tt_size(1);
    game.set_fen("4k3/8/8/8/8/8/8/4K2R w K - 10 20").unwrap();
    game.make_move(4, 6, '-');
    assert_eq!(game.board().half_moves, 11);
}

#[test]
fn bare_kings_are_a_dead_draw() {
    let mut game = Game::with_tt_size(1);
    game.set_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
    assert_eq!(game.game_state(), GameStatus::Ongoing);
    game.make_move(3, 59, '-'); // Qxd8
    // Board is K vs K after the recapture.
    game.make_move(60, 59, '-'); // Kxd8
    assert_eq!(game.game_state(), GameStatus::DrawInsufficient);
}

#[test]
fn lone_minor_is_insufficient() {
    let board: Board = "4k3/8/8/8/8/8/8/2B1K3 w - - 0 1".parse().unwrap();
    assert!(board.is_insufficient_material());
    let board: Board = "4k3/8/8/8/8/8/8/1N2K3 w - - 0 1".parse().unwrap();
    assert!(board.is_insufficient_material());
    // A single rook can mate.
    let board: Board = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1".parse().unwrap();
    assert!(!board.is_insufficient_material());
    // Two bishops can mate.
    let board: Board = "4k3/8/8/8/8/8/8/1BB1K3 w - - 0 1".parse().unwrap();
    assert!(!board.is_insufficient_material());
}

#[test]
fn in_path_repetition_gate_fires_on_the_third_occurrence() {
    let mut board = Board::new();

    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"];
    for (i, text) in shuffle.iter().enumerate() {
        assert!(
            !board.is_draw_by_repetition_in_path(),
            "gate fired early at ply {}",
            i
        );
        let white = board.ply_count % 2 == 0;
        let mv = root_moves(&board)
            .into_iter()
            .find(|m| m.to_string() == *text)
            .unwrap();
        board.apply_move_search(mv, white);
    }

    // The start position has now been seen twice before along the path.
    assert!(board.is_draw_by_repetition_in_path());
}
