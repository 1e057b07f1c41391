//! Hashing of sandpile state for determinism comparisons.
//!
//! Uses FNV-1a: fast and stable across runs and platforms. Not
//! cryptographically secure; only used to compare final grids.

use crate::state::State;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash the grid size, threshold, and every cell's mass in row-major order.
///
/// Two states with identical masses on identical grids hash equal
/// regardless of the order in which their cells were first touched.
/// `-0.0` is folded into `0.0` so a cell that toppled back to empty
/// matches one that was never touched.
pub fn fingerprint(state: &State) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, state.grid_size() as u64);
    hash = fnv1a_u64(hash, state.threshold().to_bits());
    for &m in state.density_field().as_slice() {
        let m = if m == 0.0 { 0.0 } else { m };
        hash = fnv1a_u64(hash, m.to_bits());
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use topple_core::{Cell, Deltas};
    use topple_space::Square4;

    fn seeded(size: u32, chips: f64) -> State {
        State::seeded(Square4::new(size).unwrap(), 4.0, chips)
    }

    #[test]
    fn identical_states_hash_equal() {
        assert_eq!(fingerprint(&seeded(5, 4.0)), fingerprint(&seeded(5, 4.0)));
    }

    #[test]
    fn different_mass_hashes_differ() {
        assert_ne!(fingerprint(&seeded(5, 4.0)), fingerprint(&seeded(5, 5.0)));
    }

    #[test]
    fn different_grid_size_hashes_differ() {
        assert_ne!(fingerprint(&seeded(5, 4.0)), fingerprint(&seeded(7, 4.0)));
    }

    #[test]
    fn touched_zero_cell_matches_untouched() {
        let mut a = seeded(5, 4.0);
        let b = seeded(5, 4.0);
        let mut d = Deltas::new();
        d.add(Cell::new(0, 0), 1.0);
        d.add(Cell::new(0, 0), -1.0);
        a.apply_updates(&d).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}
