//! Test utilities and mock types for Topple development.
//!
//! Provides [`MockPile`], a `HashMap`-backed [`PileReader`] for unit-testing
//! rules without a full [`State`](topple_state::State), plus reusable
//! state and rule fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use topple_core::{Cell, PileReader};

/// Mock implementation of [`PileReader`].
///
/// Cells outside `0..size` are accepted; rules under test only read the
/// cells they are handed.
#[derive(Clone, Debug)]
pub struct MockPile {
    size: u32,
    threshold: f64,
    masses: HashMap<Cell, f64>,
}

impl MockPile {
    pub fn new(size: u32, threshold: f64) -> Self {
        Self {
            size,
            threshold,
            masses: HashMap::new(),
        }
    }

    /// Builder-style variant of [`set_mass`](MockPile::set_mass).
    pub fn with_mass(mut self, cell: Cell, mass: f64) -> Self {
        self.set_mass(cell, mass);
        self
    }

    pub fn set_mass(&mut self, cell: Cell, mass: f64) {
        self.masses.insert(cell, mass);
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl PileReader for MockPile {
    fn grid_size(&self) -> u32 {
        self.size
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn mass(&self, cell: Cell) -> f64 {
        self.masses.get(&cell).copied().unwrap_or(0.0)
    }

    fn for_each_mass(&self, f: &mut dyn FnMut(Cell, f64)) {
        // Sorted so centroid sums are reproducible across runs.
        let mut cells: Vec<_> = self.masses.iter().map(|(&c, &m)| (c, m)).collect();
        cells.sort_by_key(|&(c, _)| c);
        for (c, m) in cells {
            f(c, m);
        }
    }
}
