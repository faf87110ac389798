//! Magic bitboards for the sliding pieces. Tables are generated once at first
//! use from a fixed seed, so the constants are reproducible across runs.

pub mod attacks;
pub mod search;
pub mod structs;

pub use structs::{MagicEntry, MagicTables};

use attacks::{
    bishop_attacks_per_square, bishop_relevant_mask, occupancy_subset, rook_attacks_per_square,
    rook_relevant_mask,
};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use search::find_magic;

const MAGIC_SEED: u64 = 0xB1A5_ED5E_ED00_0042;

/// Shared slider tables, generated on first use.
pub fn magics() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| build_magic_tables(MAGIC_SEED).expect("magic table generation failed"))
}

fn build_entry(
    square: usize,
    mask: u64,
    attack_fn: fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let bits = mask.count_ones();
    let shift = 64 - bits;

    let blockers: Vec<u64> = (0..(1usize << bits))
        .map(|i| occupancy_subset(i, mask))
        .collect();
    let attack_sets: Vec<u64> = blockers.iter().map(|&b| attack_fn(square, b)).collect();

    let (magic, table) = find_magic(&blockers, &attack_sets, shift, rng)?;

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

pub fn build_magic_tables(seed: u64) -> Result<MagicTables, String> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rook = Vec::with_capacity(64);
    let mut bishop = Vec::with_capacity(64);

    for square in 0..64 {
        rook.push(build_entry(
            square,
            rook_relevant_mask(square),
            rook_attacks_per_square,
            &mut rng,
        )?);
    }
    for square in 0..64 {
        bishop.push(build_entry(
            square,
            bishop_relevant_mask(square),
            bishop_attacks_per_square,
            &mut rng,
        )?);
    }

    Ok(MagicTables { rook, bishop })
}
