//! Threshold quantization shared by the discrete rules.
//!
//! One topple event removes exactly `threshold` mass from a cell and cuts
//! it into [`Square4::DEGREE`] grains, one per lattice direction. An
//! interior cell hands one grain to each neighbour; an edge or corner cell
//! has fewer in-bounds neighbours, and the grains meant for the missing
//! ones leave the grid.

use topple_space::Square4;

/// Number of whole topple events `mass` supports at `threshold`.
///
/// Returned as an `f64` holding an integer value so that masses far past
/// `u64::MAX × threshold` still topple in full. Zero for masses below
/// threshold, negative masses, and NaN.
pub fn topple_count(mass: f64, threshold: f64) -> f64 {
    let n = (mass / threshold).floor();
    if n.is_nan() || n < 1.0 {
        0.0
    } else {
        n
    }
}

/// Mass carried by one grain.
pub fn grain_size(threshold: f64) -> f64 {
    threshold / Square4::DEGREE as f64
}
