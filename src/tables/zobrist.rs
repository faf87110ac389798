//! Zobrist hashing keys, generated once from a fixed seed so hashes are
//! reproducible across runs.

use once_cell::sync::OnceCell;
use rand::{rngs::StdRng, RngCore, SeedableRng};

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// [color][piece][square] with {Black=0, White=1} and {P,N,B,R,Q,K}={0..5}.
    pub piece: [[[u64; 64]; 6]; 2],
    /// XOR-ed once per applied move.
    pub side_to_move: u64,
    /// Indexed by the full 4-bit castling rights mask.
    pub castling: [u64; 16],
    /// Indexed by the en passant target file; nothing is XOR-ed when no target.
    pub ep_file: [u64; 8],
}

/// Shared keys, initialized on first use.
pub fn keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(generate_keys)
}

fn generate_keys() -> ZobristKeys {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    // Avoid zero keys to reduce degenerate collisions.
    fn non_zero(rng: &mut StdRng) -> u64 {
        let mut v = rng.next_u64();
        while v == 0 {
            v = rng.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0; 64]; 6]; 2],
        side_to_move: 0,
        castling: [0; 16],
        ep_file: [0; 8],
    };

    for color in 0..2 {
        for piece in 0..6 {
            for sq in 0..64 {
                keys.piece[color][piece][sq] = non_zero(&mut rng);
            }
        }
    }

    for i in 0..16 {
        keys.castling[i] = non_zero(&mut rng);
    }

    for f in 0..8 {
        keys.ep_file[f] = non_zero(&mut rng);
    }

    keys.side_to_move = non_zero(&mut rng);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_and_distinct() {
        let a = keys();
        let b = keys();
        assert!(std::ptr::eq(a, b));

        assert_ne!(a.piece[0][0][0], a.piece[1][0][0]);
        assert_ne!(a.castling[1], a.castling[2]);
        assert_ne!(a.ep_file[0], a.ep_file[7]);
        assert_ne!(a.side_to_move, 0);
    }
}
