//! Benchmark profiles for the Topple sandpile engine.
//!
//! - [`reference_profile`]: 101x101 grid seeded with 4096 chips
//! - [`stress_profile`]: 301x301 grid seeded with 65536 chips
//! - [`scattered_masses`]: deterministic sub-threshold background noise

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use topple_core::{Cell, StateError, ToppleKind};
use topple_engine::{ConfigError, SandpileConfig};
use topple_space::Square4;
use topple_state::State;

fn profile(
    kind: ToppleKind,
    size: u32,
    chips: f64,
    seed: u64,
) -> Result<SandpileConfig, ConfigError> {
    let mut builder = SandpileConfig::builder()
        .grid_size(size)
        .threshold(4.0)
        .toppling_kind(kind)
        .initial_chips(chips)
        .seed(seed);
    if kind.requires_interaction_radius() {
        builder = builder.interaction_radius(size / 10 + 1);
    }
    builder.build()
}

/// Reference benchmark profile: 101x101 grid, 4096 chips at the center.
///
/// Small enough that a symmetric avalanche stays clear of the boundary.
pub fn reference_profile(kind: ToppleKind, seed: u64) -> Result<SandpileConfig, ConfigError> {
    profile(kind, 101, 4096.0, seed)
}

/// Stress profile: 301x301 grid, 65536 chips at the center.
pub fn stress_profile(kind: ToppleKind, seed: u64) -> Result<SandpileConfig, ConfigError> {
    profile(kind, 301, 65536.0, seed)
}

/// A pile with `n` cells of sub-threshold mass scattered deterministically
/// from `seed`, plus `center_chips` on the center cell.
///
/// Collisions accumulate, so a cell may end up over threshold.
pub fn scattered_masses(
    space: Square4,
    n: usize,
    center_chips: f64,
    seed: u64,
) -> Result<State, StateError> {
    let size = space.size() as u64;
    let mut masses = Vec::with_capacity(n + 1);
    masses.push((space.center(), center_chips));
    for i in 0..n as u64 {
        let h = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(i.wrapping_mul(1442695040888963407));
        let row = ((h >> 33) % size) as i32;
        let col = ((h >> 7) % size) as i32;
        let mass = (h % 3 + 1) as f64;
        masses.push((Cell::new(row, col), mass));
    }
    State::from_masses(space, 4.0, masses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate_for_every_implemented_kind() {
        for kind in [ToppleKind::Symmetric, ToppleKind::Random, ToppleKind::MeanField] {
            reference_profile(kind, 42).unwrap().build_rule().unwrap();
            stress_profile(kind, 42).unwrap().build_rule().unwrap();
        }
    }

    #[test]
    fn scattered_masses_is_deterministic_and_in_bounds() {
        let space = Square4::new(50).unwrap();
        let a = scattered_masses(space, 200, 16.0, 7).unwrap();
        let b = scattered_masses(space, 200, 16.0, 7).unwrap();
        assert_eq!(a.grid(), b.grid());
        assert!(a.grid().keys().all(|&c| space.contains(c)));
        assert!(a.total_mass() >= 16.0 + 200.0);
    }
}
