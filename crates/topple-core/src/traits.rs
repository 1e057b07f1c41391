//! Read-only access to a sandpile.

use crate::id::Cell;

/// Read-only view of a pile, as seen by toppling rules.
///
/// Implemented by `topple_state::State` and by test mocks. Rules never
/// mutate through this trait; every change goes back to the engine as a
/// [`Deltas`](crate::Deltas) batch.
///
/// The provided methods derive pile-wide statistics from
/// [`for_each_mass`](PileReader::for_each_mass), so every implementor
/// agrees on them.
pub trait PileReader {
    /// Side length of the square grid.
    fn grid_size(&self) -> u32;

    /// Mass at or above which a cell topples.
    fn threshold(&self) -> f64;

    /// Mass held by `cell`; 0.0 for cells never touched.
    fn mass(&self, cell: Cell) -> f64;

    /// Visit every materialized cell with its mass.
    fn for_each_mass(&self, f: &mut dyn FnMut(Cell, f64));

    /// Sum of mass over the grid.
    fn total_mass(&self) -> f64 {
        let mut total = 0.0;
        self.for_each_mass(&mut |_, m| total += m);
        total
    }

    /// Mass-weighted centroid as `(row, col)`.
    ///
    /// An empty pile has no centroid; it reports the geometric center
    /// `(grid_size / 2, grid_size / 2)` instead of dividing by zero.
    fn center_of_mass(&self) -> (f64, f64) {
        let mut total = 0.0;
        let mut row_moment = 0.0;
        let mut col_moment = 0.0;
        self.for_each_mass(&mut |cell, m| {
            total += m;
            row_moment += m * cell.row as f64;
            col_moment += m * cell.col as f64;
        });
        if total == 0.0 {
            let mid = (self.grid_size() / 2) as f64;
            return (mid, mid);
        }
        (row_moment / total, col_moment / total)
    }
}
