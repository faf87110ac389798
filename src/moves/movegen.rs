//! Legal move bitboards. Moves come from the precomputed jump tables and the
//! magic sliders, then pass the pin-ray / check-ray filters computed after
//! the previous move.

use crate::bitboard::{pop_lsb, ALL_SQUARES};
use crate::board::{Board, BoardState, PieceType};
use crate::moves::magic::magics;
use crate::tables::{self, jump_tables};

/// Pseudo-legal destination set for every piece but the pawn (pawns are
/// side-dependent and handled separately).
#[inline]
pub fn pseudo_moves(piece: PieceType, square: usize, occupied: u64) -> u64 {
    let t = jump_tables();
    match piece {
        PieceType::Knight => t.knight[square],
        PieceType::King => t.king[square],
        PieceType::Bishop => magics().bishop_attacks(square, occupied),
        PieceType::Rook => magics().rook_attacks(square, occupied),
        PieceType::Queen => magics().queen_attacks(square, occupied),
        _ => panic!("pawn moves are side-dependent"),
    }
}

/// Squares a pawn of the given color attacks from `square`.
#[inline(always)]
pub fn pawn_attacks(square: usize, white: bool) -> u64 {
    let t = jump_tables();
    if white {
        t.white_pawn[square].captures
    } else {
        t.black_pawn[square].captures
    }
}

/// Recompute which of the defender's pieces are pinned to their king by the
/// attacker's sliders, and the ray each pinned piece is confined to.
pub fn compute_pins(board: &mut Board, king_sq: usize, attacker_white: bool) {
    board.pin_data.pinned = 0;
    board.pin_data.pin_rays = [ALL_SQUARES; 64];

    let bishops = board.bb(attacker_white, PieceType::Bishop);
    let rooks = board.bb(attacker_white, PieceType::Rook);
    let queens = board.bb(attacker_white, PieceType::Queen);
    let t = jump_tables();

    let mut sliders = bishops | rooks | queens;
    while sliders != 0 {
        let slider_sq = pop_lsb(&mut sliders) as usize;
        let dir = t.dir[king_sq][slider_sq];
        if dir == tables::NONE {
            continue;
        }

        let slider_bb = 1u64 << slider_sq;
        let orthogonal = matches!(dir, tables::NORTH | tables::SOUTH | tables::EAST | tables::WEST);
        // A bishop cannot pin along a file or rank, a rook not along a
        // diagonal; queens pin everywhere.
        if orthogonal && bishops & slider_bb != 0 {
            continue;
        }
        if !orthogonal && rooks & slider_bb != 0 {
            continue;
        }

        let blockers = t.between[king_sq][slider_sq] & board.occupied();
        if blockers.count_ones() == 1 {
            let pinned_sq = blockers.trailing_zeros() as usize;
            board.pin_data.pinned |= blockers;
            board.pin_data.pin_rays[pinned_sq] = t.line[king_sq][slider_sq];
        }
    }
}

/// Recompute the attack squares of the side that just moved, flag checks on
/// the defender and derive the check intercept ray. The defender's king is
/// removed from the occupancy so rays extend through it; a king may not step
/// backwards along the line of the attacker.
pub fn compute_attacks(board: &mut Board, mover_white: bool, defender_king: usize) {
    let king_bb = 1u64 << defender_king;
    let occupied = board.occupied() & !king_bb;
    let t = jump_tables();

    let mut attack_squares = 0u64;
    let mut checkers = 0u32;
    let mut check_ray = ALL_SQUARES;

    let mut friendly = board.occupancy(mover_white);
    while friendly != 0 {
        let sq = pop_lsb(&mut friendly) as usize;
        let piece = board.piece_at(sq);
        let moves = if piece == PieceType::Pawn {
            pawn_attacks(sq, mover_white)
        } else {
            pseudo_moves(piece, sq, occupied)
        };

        if moves & king_bb != 0 {
            checkers += 1;
            check_ray = t.between[sq][defender_king] | (1u64 << sq) | king_bb;
            board.state.flags |= if mover_white {
                BoardState::CHECK_BLACK
            } else {
                BoardState::CHECK_WHITE
            };
        }
        attack_squares |= moves;
    }

    board.attack_data.attack_squares = attack_squares;
    board.attack_data.attack_ray = match checkers {
        0 => ALL_SQUARES,
        // Double check: no interception exists, only the king may move.
        1 => check_ray,
        _ => 0,
    };
}

/// Castling destinations for the side to move. Rights, an unchecked king, an
/// empty path and unattacked transit squares are all required; the rook path
/// square b1/b8 may be attacked (it is not crossed by the king).
pub fn castling_moves(board: &Board, white: bool) -> u64 {
    use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};

    if board.state.is_check(white) {
        return 0;
    }

    let occupied = board.occupied();
    let attacks = board.attack_data.attack_squares;
    let mut moves = 0u64;

    let (kingside_right, queenside_right) = if white {
        (CASTLE_WK, CASTLE_WQ)
    } else {
        (CASTLE_BK, CASTLE_BQ)
    };
    let base: u64 = if white { 0 } else { 56 };

    let kingside_path = (1u64 << (base + 5)) | (1u64 << (base + 6));
    if board.has_castling(kingside_right)
        && occupied & kingside_path == 0
        && attacks & kingside_path == 0
    {
        moves |= 1u64 << (base + 6);
    }

    let queenside_empty = (1u64 << (base + 1)) | (1u64 << (base + 2)) | (1u64 << (base + 3));
    let queenside_path = (1u64 << (base + 2)) | (1u64 << (base + 3));
    if board.has_castling(queenside_right)
        && occupied & queenside_empty == 0
        && attacks & queenside_path == 0
    {
        moves |= 1u64 << (base + 2);
    }

    moves
}

/// An en passant capture removes two pawns from the fourth/fifth rank at
/// once; probe the resulting occupancy for a discovered slider attack on the
/// own king.
pub fn ep_capture_is_legal(board: &Board, from: usize, ep_sq: usize, white: bool) -> bool {
    let cap_sq = if white { ep_sq - 8 } else { ep_sq + 8 };
    let occupied =
        (board.occupied() & !(1u64 << from) & !(1u64 << cap_sq)) | (1u64 << ep_sq);
    let king_sq = board.king_square(white);
    let m = magics();

    let rooks_queens = board.bb(!white, PieceType::Rook) | board.bb(!white, PieceType::Queen);
    if m.rook_attacks(king_sq, occupied) & rooks_queens != 0 {
        return false;
    }

    let bishops_queens = board.bb(!white, PieceType::Bishop) | board.bb(!white, PieceType::Queen);
    if m.bishop_attacks(king_sq, occupied) & bishops_queens != 0 {
        return false;
    }

    true
}

/// Legal destination bitboard for the piece on `from`. Empty when the square
/// holds no piece of the given side.
pub fn legal_moves_from(board: &Board, from: usize, white: bool) -> u64 {
    let from_bb = 1u64 << from;
    if board.occupancy(white) & from_bb == 0 {
        return 0;
    }

    let piece = board.piece_at(from);
    let enemy_king_bb = board.bb(!white, PieceType::King);
    let t = jump_tables();

    let moves = match piece {
        PieceType::Pawn => {
            let entry = if white {
                &t.white_pawn[from]
            } else {
                &t.black_pawn[from]
            };
            let occupied = board.occupied();
            let single = entry.single_push & !occupied;
            let double = entry.double_push
                & !occupied
                & if white { single << 8 } else { single >> 8 };
            let captures = entry.captures & board.occupancy(!white);

            let mut moves = single | double | captures;
            if board.pin_data.pinned & from_bb != 0 {
                moves &= board.pin_data.pin_rays[from];
            }
            moves &= board.attack_data.attack_ray;

            if let Some(ep) = board.ep_target {
                let ep_bb = ep.bb();
                if entry.captures & ep_bb != 0 {
                    let cap_sq = if white {
                        ep.index() as usize - 8
                    } else {
                        ep.index() as usize + 8
                    };
                    // The landing square blocks the ray, or the captured pawn
                    // is itself the checker.
                    let ray = board.attack_data.attack_ray;
                    let ray_ok =
                        ray == ALL_SQUARES || ray & (1u64 << cap_sq) != 0 || ray & ep_bb != 0;
                    let pin_ok = board.pin_data.pinned & from_bb == 0
                        || board.pin_data.pin_rays[from] & ep_bb != 0;
                    if ray_ok
                        && pin_ok
                        && ep_capture_is_legal(board, from, ep.index() as usize, white)
                    {
                        moves |= ep_bb;
                    }
                }
            }
            moves
        }
        PieceType::King => {
            let mut moves = t.king[from] & !board.occupancy(white);
            let enemy_king_sq = board.king_square(!white);
            moves &= !(board.attack_data.attack_squares | t.king[enemy_king_sq]);

            let rights = if white {
                crate::board::CASTLE_WHITE
            } else {
                crate::board::CASTLE_BLACK
            };
            let home = if white { 4 } else { 60 };
            if board.castling_rights & rights != 0 && from == home {
                moves |= castling_moves(board, white);
            }
            moves
        }
        PieceType::Empty => return 0,
        _ => {
            let mut moves = pseudo_moves(piece, from, board.occupied()) & !board.occupancy(white);
            if board.pin_data.pinned & from_bb != 0 {
                moves &= board.pin_data.pin_rays[from];
            }
            moves &= board.attack_data.attack_ray;
            moves
        }
    };

    moves & !enemy_king_bb
}

/// Enemy-king reachability sets used by the endgame generators to flag
/// checking moves without applying them.
pub struct KingDanger {
    pub pawn: u64,
    pub knight: u64,
    pub diagonal: u64,
    pub orthogonal: u64,
}

/// Squares from which a piece of `white`'s side would give check to the king
/// on `king_sq`.
pub fn compute_king_danger(king_sq: usize, occupied: u64, white: bool) -> KingDanger {
    let t = jump_tables();
    let m = magics();
    KingDanger {
        // Mirror trick: a white pawn checks from the squares a black pawn on
        // the king's seat would capture towards.
        pawn: if white {
            t.black_pawn[king_sq].captures
        } else {
            t.white_pawn[king_sq].captures
        },
        knight: t.knight[king_sq],
        diagonal: m.bishop_attacks(king_sq, occupied),
        orthogonal: m.rook_attacks(king_sq, occupied),
    }
}

#[inline]
pub fn is_check_move(danger: &KingDanger, to: usize, piece: PieceType) -> bool {
    let to_bb = 1u64 << to;
    match piece {
        PieceType::Pawn => danger.pawn & to_bb != 0,
        PieceType::Knight => danger.knight & to_bb != 0,
        PieceType::Bishop => danger.diagonal & to_bb != 0,
        PieceType::Rook => danger.orthogonal & to_bb != 0,
        PieceType::Queen => (danger.diagonal | danger.orthogonal) & to_bb != 0,
        // Direct checks only; the king itself never checks.
        _ => false,
    }
}
