//! Magic number search: seeded random trials validated against the scan
//! generator until a collision-free multiplier is found for each square.

use rand::RngCore;

/// Sparse 64-bit candidates (three random words AND-ed together) collide far
/// less often in the magic index space.
#[inline(always)]
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Try to fill an attack table with this candidate. Two blocker subsets may
/// share an index only when they produce the same attack set.
pub fn try_fill_table(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
) -> Option<Box<[u64]>> {
    let size = 1usize << (64 - shift);
    let mut table = vec![0u64; size].into_boxed_slice();

    for (&blocker, &attack) in blockers.iter().zip(attacks.iter()) {
        debug_assert!(attack != 0, "slider attack sets are never empty");
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if table[index] == 0 {
            table[index] = attack;
        } else if table[index] != attack {
            return None;
        }
    }

    Some(table)
}

/// Search for a valid magic for one square, returning the constant and its
/// filled attack table.
pub fn find_magic<R: RngCore>(
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<(u64, Box<[u64]>), String> {
    for _ in 0..1_000_000 {
        let magic = random_sparse_u64(rng);
        if let Some(table) = try_fill_table(blockers, attacks, magic, shift) {
            return Ok((magic, table));
        }
    }
    Err("no valid magic number found after 1,000,000 attempts".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::attacks::{occupancy_subset, rook_attacks_per_square, rook_relevant_mask};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn finds_a_magic_for_a_corner_rook() {
        let square = 0;
        let mask = rook_relevant_mask(square);
        let bits = mask.count_ones();
        let shift = 64 - bits;

        let subsets: Vec<u64> = (0..(1usize << bits))
            .map(|i| occupancy_subset(i, mask))
            .collect();
        let attacks: Vec<u64> = subsets
            .iter()
            .map(|&b| rook_attacks_per_square(square, b))
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        let (magic, table) = find_magic(&subsets, &attacks, shift, &mut rng).unwrap();

        for (&blocker, &attack) in subsets.iter().zip(attacks.iter()) {
            let index = (blocker.wrapping_mul(magic) >> shift) as usize;
            assert_eq!(table[index], attack);
        }
    }
}
