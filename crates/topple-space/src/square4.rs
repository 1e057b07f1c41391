//! Square grid with 4-connected neighbourhood (N/S/W/E) and absorbing edges.

use crate::error::SpaceError;
use topple_core::{Cell, Neighbours};

/// North, south, west, east.
const VON_NEUMANN: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A `size × size` square lattice with von Neumann adjacency.
///
/// Each cell has coordinate `(row, col)` where `0 <= row, col < size`.
/// Edges absorb: corner cells have 2 neighbours, other edge cells 3, and
/// interior cells 4. Distance is Manhattan (L1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square4 {
    size: u32,
}

impl Square4 {
    /// Maximum side length: coordinates use `i32`.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Number of lattice directions, i.e. the neighbour count of an
    /// interior cell.
    pub const DEGREE: usize = VON_NEUMANN.len();

    /// Create a `size × size` lattice.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` for `size == 0` and
    /// `Err(SpaceError::DimensionTooLarge)` above [`Square4::MAX_DIM`].
    ///
    /// # Examples
    ///
    /// ```
    /// use topple_core::Cell;
    /// use topple_space::Square4;
    ///
    /// let grid = Square4::new(5).unwrap();
    /// assert_eq!(grid.cell_count(), 25);
    /// assert_eq!(grid.center(), Cell::new(2, 2));
    ///
    /// // Corner cells keep only their two in-bounds neighbours.
    /// assert_eq!(grid.neighbours(Cell::new(0, 0)).len(), 2);
    /// ```
    pub fn new(size: u32) -> Result<Self, SpaceError> {
        if size == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if size > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                value: size,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self { size })
    }

    /// Side length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }

    /// The center cell `(size / 2, size / 2)`.
    pub fn center(&self) -> Cell {
        let mid = (self.size / 2) as i32;
        Cell::new(mid, mid)
    }

    /// Whether `cell` lies on the lattice.
    pub fn contains(&self, cell: Cell) -> bool {
        let n = self.size as i32;
        (0..n).contains(&cell.row) && (0..n).contains(&cell.col)
    }

    /// Check that `cell` lies on the lattice.
    pub fn check_bounds(&self, cell: Cell) -> Result<(), SpaceError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(SpaceError::CellOutOfBounds {
                cell,
                size: self.size,
            })
        }
    }

    /// In-bounds von Neumann neighbours of `cell`, in N/S/W/E order.
    ///
    /// Off-lattice neighbours are omitted rather than clamped or wrapped.
    pub fn neighbours(&self, cell: Cell) -> Neighbours {
        let mut out = Neighbours::new();
        for (dr, dc) in VON_NEUMANN {
            let nb = Cell::new(cell.row + dr, cell.col + dc);
            if self.contains(nb) {
                out.push(nb);
            }
        }
        out
    }

    /// Manhattan distance between two cells.
    pub fn distance(&self, a: Cell, b: Cell) -> f64 {
        ((a.row - b.row).unsigned_abs() + (a.col - b.col).unsigned_abs()) as f64
    }

    /// Row-major index of `cell`, or `None` when off the lattice.
    pub fn rank(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some((cell.row as usize) * (self.size as usize) + cell.col as usize)
    }

    /// Row-major canonical ordering: `(0,0), (0,1), ..., (size-1, size-1)`.
    pub fn canonical_ordering(&self) -> Vec<Cell> {
        let n = self.size as i32;
        let mut out = Vec::with_capacity(self.cell_count());
        for r in 0..n {
            for c in 0..n {
                out.push(Cell::new(r, c));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(r: i32, col: i32) -> Cell {
        Cell::new(r, col)
    }

    // ── Neighbour tests ─────────────────────────────────────────

    #[test]
    fn neighbours_interior() {
        let s = Square4::new(5).unwrap();
        let n = s.neighbours(c(2, 2));
        assert_eq!(n.len(), 4);
        assert!(n.contains(&c(1, 2))); // north
        assert!(n.contains(&c(3, 2))); // south
        assert!(n.contains(&c(2, 1))); // west
        assert!(n.contains(&c(2, 3))); // east
    }

    #[test]
    fn neighbours_corner() {
        let s = Square4::new(5).unwrap();
        let n = s.neighbours(c(0, 0));
        assert_eq!(n.len(), 2);
        assert!(n.contains(&c(1, 0)));
        assert!(n.contains(&c(0, 1)));
    }

    #[test]
    fn neighbours_edge() {
        let s = Square4::new(5).unwrap();
        let n = s.neighbours(c(0, 2));
        assert_eq!(n.len(), 3);
        assert!(n.contains(&c(1, 2)));
        assert!(n.contains(&c(0, 1)));
        assert!(n.contains(&c(0, 3)));
    }

    #[test]
    fn neighbours_opposite_corner() {
        let s = Square4::new(5).unwrap();
        let n = s.neighbours(c(4, 4));
        assert_eq!(n.as_slice(), &[c(3, 4), c(4, 3)]);
    }

    #[test]
    fn single_cell_has_no_neighbours() {
        let s = Square4::new(1).unwrap();
        assert!(s.neighbours(c(0, 0)).is_empty());
    }

    // ── Bounds and ordering ─────────────────────────────────────

    #[test]
    fn check_bounds_rejects_negative_and_overflow() {
        let s = Square4::new(4).unwrap();
        assert!(s.check_bounds(c(3, 3)).is_ok());
        assert_eq!(
            s.check_bounds(c(-1, 0)),
            Err(SpaceError::CellOutOfBounds {
                cell: c(-1, 0),
                size: 4
            })
        );
        assert!(s.check_bounds(c(0, 4)).is_err());
    }

    #[test]
    fn center_uses_integer_half() {
        assert_eq!(Square4::new(5).unwrap().center(), c(2, 2));
        assert_eq!(Square4::new(4).unwrap().center(), c(2, 2));
        assert_eq!(Square4::new(1).unwrap().center(), c(0, 0));
    }

    #[test]
    fn canonical_ordering_matches_rank() {
        let s = Square4::new(3).unwrap();
        let order = s.canonical_ordering();
        assert_eq!(order.len(), 9);
        for (i, cell) in order.iter().enumerate() {
            assert_eq!(s.rank(*cell), Some(i));
        }
        assert_eq!(s.rank(c(3, 0)), None);
    }

    #[test]
    fn distance_manhattan() {
        let s = Square4::new(10).unwrap();
        assert_eq!(s.distance(c(0, 0), c(3, 4)), 7.0);
        assert_eq!(s.distance(c(5, 7), c(2, 3)), 7.0);
    }

    // ── Constructor tests ───────────────────────────────────────

    #[test]
    fn new_zero_returns_error() {
        assert_eq!(Square4::new(0), Err(SpaceError::EmptySpace));
    }

    #[test]
    fn new_rejects_size_exceeding_i32_max() {
        let big = i32::MAX as u32 + 1;
        assert!(matches!(
            Square4::new(big),
            Err(SpaceError::DimensionTooLarge { .. })
        ));
        assert!(Square4::new(i32::MAX as u32).is_ok());
    }

    // ── Property tests ──────────────────────────────────────────

    proptest! {
        #[test]
        fn neighbours_symmetric(size in 1u32..10, r in 0i32..10, col in 0i32..10) {
            let r = r % size as i32;
            let col = col % size as i32;
            let s = Square4::new(size).unwrap();
            let cell = c(r, col);
            for nb in s.neighbours(cell) {
                prop_assert!(
                    s.neighbours(nb).contains(&cell),
                    "neighbour symmetry violated: {:?} in N({:?}) but not vice versa",
                    nb, cell,
                );
            }
        }

        #[test]
        fn neighbours_are_in_bounds_and_adjacent(size in 1u32..10, r in 0i32..10, col in 0i32..10) {
            let r = r % size as i32;
            let col = col % size as i32;
            let s = Square4::new(size).unwrap();
            let cell = c(r, col);
            let n = s.neighbours(cell);
            prop_assert!(n.len() <= Square4::DEGREE);
            for nb in n {
                prop_assert!(s.contains(nb));
                prop_assert_eq!(s.distance(cell, nb), 1.0);
            }
        }
    }
}
