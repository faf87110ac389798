//! Interactive driver: play moves against the engine, inspect legal moves,
//! run perft, dump the FEN and game state.

use outpost::board::Board;
use outpost::game::Game;
use outpost::logger::init_logging;
use outpost::moves::perft::{perft, perft_divide};
use outpost::square::Square;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

fn main() {
    if let Err(e) = init_logging("logs/outpost.log") {
        eprintln!("logging disabled: {}", e);
    }

    let mut game = Game::new();
    println!("outpost — type 'help' for commands");

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            continue;
        };

        match command {
            "help" => print_help(),
            "new" => {
                game = Game::new();
                println!("new game");
            }
            "fen" => {
                if parts.len() > 1 {
                    let fen = parts[1..].join(" ");
                    match game.set_fen(&fen) {
                        Ok(()) => println!("position set"),
                        Err(e) => println!("error: {}", e),
                    }
                } else {
                    println!("{}", game.fen());
                }
            }
            "d" | "display" => print_board(game.board()),
            "moves" => {
                let Some(sq) = parts.get(1).and_then(|s| s.parse::<Square>().ok()) else {
                    println!("usage: moves <square>");
                    continue;
                };
                let mut targets = game.legal_moves(sq.index());
                let mut list = Vec::new();
                while targets != 0 {
                    let to = outpost::bitboard::pop_lsb(&mut targets);
                    list.push(Square::from_index(to).to_string());
                }
                println!("{}", if list.is_empty() { "(none)".to_string() } else { list.join(" ") });
            }
            "move" => {
                let Some(&arg) = parts.get(1) else {
                    println!("usage: move e2e4[q]");
                    continue;
                };
                match parse_coordinate_move(arg) {
                    Some((from, to, promo)) => {
                        if game.legal_moves(from) & (1u64 << to) == 0 {
                            println!("illegal move");
                            continue;
                        }
                        game.make_move(from, to, promo);
                        println!("{} ({})", game.prev_move(), game.game_state().as_str());
                    }
                    None => println!("cannot parse '{}'", arg),
                }
            }
            "go" => {
                let depth = parts
                    .get(1)
                    .and_then(|s| s.parse::<i32>().ok())
                    .unwrap_or(5);
                let start = Instant::now();
                game.make_best_move(depth, game.white_to_move());
                if game.prev_move().is_empty() {
                    println!("no legal move ({})", game.game_state().as_str());
                } else {
                    println!(
                        "{} ({}) in {:.2}s",
                        game.prev_move(),
                        game.game_state().as_str(),
                        start.elapsed().as_secs_f64()
                    );
                }
            }
            "perft" => {
                let depth = parts
                    .get(1)
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(4);
                let mut board = game.board().clone();
                let start = Instant::now();
                let nodes = perft(&mut board, depth);
                let secs = start.elapsed().as_secs_f64().max(1e-9);
                println!(
                    "perft({}) = {} ({:.0} nps)",
                    depth,
                    nodes,
                    nodes as f64 / secs
                );
            }
            "divide" => {
                let depth = parts
                    .get(1)
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(2);
                let mut board = game.board().clone();
                for (mv, nodes) in perft_divide(&mut board, depth) {
                    println!("{}: {}", mv, nodes);
                }
            }
            "state" => println!("{}", game.game_state().as_str()),
            "quit" | "exit" => break,
            _ => println!("unknown command '{}' — try 'help'", command),
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  new              start a fresh game");
    println!("  fen [FEN]        print or set the position");
    println!("  display          ascii board");
    println!("  moves <sq>       legal destinations for the piece on <sq>");
    println!("  move <uci>       play a move, e.g. move e2e4 or move a7a8q");
    println!("  go [depth]       let the engine move (default depth 5)");
    println!("  perft [depth]    node count from the current position");
    println!("  divide [depth]   per-move perft breakdown");
    println!("  state            current game state");
    println!("  quit");
}

fn parse_coordinate_move(text: &str) -> Option<(u8, u8, char)> {
    if text.len() < 4 {
        return None;
    }
    let from = Square::from_str(&text[0..2]).ok()?;
    let to = Square::from_str(&text[2..4]).ok()?;
    let promo = text.chars().nth(4).unwrap_or('-');
    Some((from.index(), to.index(), promo))
}

fn print_board(board: &Board) {
    use outpost::board::PieceType;

    for rank in (0..8).rev() {
        print!("{} ", rank + 1);
        for file in 0..8 {
            let sq = rank * 8 + file;
            let piece = board.piece_at(sq);
            let c = match piece {
                PieceType::Pawn => 'p',
                PieceType::Knight => 'n',
                PieceType::Bishop => 'b',
                PieceType::Rook => 'r',
                PieceType::Queen => 'q',
                PieceType::King => 'k',
                PieceType::Empty => '.',
            };
            let c = if board.white_at(sq) {
                c.to_ascii_uppercase()
            } else {
                c
            };
            print!("{} ", c);
        }
        println!();
    }
    println!("  a b c d e f g h");
}
