//! Strongly-typed identifiers and the [`Cell`] coordinate type.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A lattice coordinate `(row, col)`.
///
/// Coordinates are signed so that a rule bug producing an off-grid cell
/// (e.g. `row = -1`) is representable and can be rejected with
/// [`StateError::OutOfBounds`](crate::StateError::OutOfBounds) instead of
/// wrapping around silently.
///
/// Ordering is row-major: `(0, 0) < (0, 1) < (1, 0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, `0 <= row < grid_size` for in-bounds cells.
    pub row: i32,
    /// Column index, `0 <= col < grid_size` for in-bounds cells.
    pub col: i32,
}

impl Cell {
    /// Create a cell from its row and column.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position as an `(row, col)` pair of floats.
    pub fn position(self) -> (f64, f64) {
        (self.row as f64, self.col as f64)
    }

    /// Offset of `other` relative to `self`, as `(d_row, d_col)`.
    pub fn offset_to(self, other: Cell) -> (f64, f64) {
        (
            (other.row - self.row) as f64,
            (other.col - self.col) as f64,
        )
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// In-bounds neighbour list for one cell.
///
/// Inline capacity 4 covers the von Neumann neighbourhood without
/// allocating.
pub type Neighbours = SmallVec<[Cell; 4]>;

/// Monotonically increasing relaxation step counter.
///
/// Incremented each time the engine applies one batch of topples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_ordering_is_row_major() {
        let mut cells = vec![Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)];
        cells.sort();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn offset_points_from_self_to_other() {
        let a = Cell::new(2, 2);
        assert_eq!(a.offset_to(Cell::new(1, 2)), (-1.0, 0.0));
        assert_eq!(a.offset_to(Cell::new(2, 3)), (0.0, 1.0));
    }

    #[test]
    fn cell_from_tuple_and_display() {
        let c: Cell = (3, -1).into();
        assert_eq!(c, Cell::new(3, -1));
        assert_eq!(c.to_string(), "(3, -1)");
    }
}
