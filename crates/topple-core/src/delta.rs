//! Additive per-cell mass deltas.
//!
//! A [`Deltas`] batch is what a toppling rule returns for one cell and what
//! the engine merges across every active cell before handing the result to
//! the state in a single update. Entries accumulate: adding to a cell that
//! is already present sums the two values, so a cell that both topples and
//! receives grains in the same step ends up with its net change.

use indexmap::IndexMap;

use crate::id::Cell;

/// A batch of signed mass changes keyed by cell.
///
/// Iteration follows insertion order, which keeps batch application
/// deterministic for identical inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deltas {
    entries: IndexMap<Cell, f64>,
}

impl Deltas {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty batch with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Add `delta` to the entry for `cell`, creating it if absent.
    pub fn add(&mut self, cell: Cell, delta: f64) {
        *self.entries.entry(cell).or_insert(0.0) += delta;
    }

    /// Fold every entry of `other` into `self` additively.
    pub fn merge(&mut self, other: Deltas) {
        for (cell, delta) in other.entries {
            self.add(cell, delta);
        }
    }

    /// Net change recorded for `cell` (0.0 when absent).
    pub fn get(&self, cell: Cell) -> f64 {
        self.entries.get(&cell).copied().unwrap_or(0.0)
    }

    /// Whether `cell` has an entry, even a zero one.
    pub fn contains(&self, cell: Cell) -> bool {
        self.entries.contains_key(&cell)
    }

    /// Number of cells touched by the batch.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the batch touches no cell.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(cell, delta)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, f64)> + '_ {
        self.entries.iter().map(|(&cell, &delta)| (cell, delta))
    }

    /// Sum of all deltas. Zero for a mass-conserving batch.
    pub fn net(&self) -> f64 {
        self.entries.values().sum()
    }
}

impl FromIterator<(Cell, f64)> for Deltas {
    fn from_iter<I: IntoIterator<Item = (Cell, f64)>>(iter: I) -> Self {
        let mut out = Deltas::new();
        for (cell, delta) in iter {
            out.add(cell, delta);
        }
        out
    }
}

impl IntoIterator for Deltas {
    type Item = (Cell, f64);
    type IntoIter = indexmap::map::IntoIter<Cell, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_accumulates_on_same_cell() {
        let mut d = Deltas::new();
        d.add(Cell::new(1, 1), -4.0);
        d.add(Cell::new(1, 1), 1.0);
        assert_eq!(d.len(), 1);
        assert_eq!(d.get(Cell::new(1, 1)), -3.0);
    }

    #[test]
    fn merge_sums_source_and_destination() {
        // (2,2) topples into (2,3) while (2,3) topples back into (2,2).
        let mut a: Deltas = [(Cell::new(2, 2), -4.0), (Cell::new(2, 3), 1.0)]
            .into_iter()
            .collect();
        let b: Deltas = [(Cell::new(2, 3), -4.0), (Cell::new(2, 2), 1.0)]
            .into_iter()
            .collect();
        a.merge(b);
        assert_eq!(a.get(Cell::new(2, 2)), -3.0);
        assert_eq!(a.get(Cell::new(2, 3)), -3.0);
    }

    #[test]
    fn absent_cell_reads_zero() {
        let d = Deltas::new();
        assert!(d.is_empty());
        assert_eq!(d.get(Cell::new(0, 0)), 0.0);
        assert!(!d.contains(Cell::new(0, 0)));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut d = Deltas::new();
        d.add(Cell::new(3, 0), 1.0);
        d.add(Cell::new(0, 0), 1.0);
        d.add(Cell::new(3, 0), 1.0);
        let cells: Vec<Cell> = d.iter().map(|(c, _)| c).collect();
        assert_eq!(cells, vec![Cell::new(3, 0), Cell::new(0, 0)]);
    }

    proptest! {
        #[test]
        fn merge_preserves_net(
            a in proptest::collection::vec((0i32..5, 0i32..5, -10i32..10), 0..20),
            b in proptest::collection::vec((0i32..5, 0i32..5, -10i32..10), 0..20),
        ) {
            let to_deltas = |v: &[(i32, i32, i32)]| -> Deltas {
                v.iter().map(|&(r, c, d)| (Cell::new(r, c), d as f64)).collect()
            };
            let mut left = to_deltas(&a);
            let right = to_deltas(&b);
            let expected = left.net() + right.net();
            left.merge(right);
            prop_assert!((left.net() - expected).abs() < 1e-9);
        }
    }
}
