//! Dense row-major fields over the whole grid.

use topple_core::Cell;

/// Per-cell force vector as `[d_row, d_col]`.
pub type ForceVector = [f64; 2];

/// A dense `size × size` array in row-major order.
///
/// Used for the observation snapshots (`density`, `force`) that external
/// consumers read as full arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseField<T> {
    size: u32,
    data: Vec<T>,
}

impl<T: Copy + Default> DenseField<T> {
    /// A field of `size × size` default values.
    pub fn new(size: u32) -> Self {
        let n = (size as usize) * (size as usize);
        Self {
            size,
            data: vec![T::default(); n],
        }
    }

    /// Reset every entry to the default value.
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }

    /// Side length.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Value at `(row, col)`, or `None` off the grid.
    pub fn get(&self, row: u32, col: u32) -> Option<T> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.data
            .get((row as usize) * (self.size as usize) + col as usize)
            .copied()
    }

    /// Value at `cell`, or `None` off the grid.
    pub fn at(&self, cell: Cell) -> Option<T> {
        let row = u32::try_from(cell.row).ok()?;
        let col = u32::try_from(cell.col).ok()?;
        self.get(row, col)
    }

    /// Overwrite the value at `cell`. Returns `false` (and writes nothing)
    /// when `cell` is off the grid.
    pub fn set(&mut self, cell: Cell, value: T) -> bool {
        let (Ok(row), Ok(col)) = (u32::try_from(cell.row), u32::try_from(cell.col)) else {
            return false;
        };
        if row >= self.size || col >= self.size {
            return false;
        }
        self.data[(row as usize) * (self.size as usize) + col as usize] = value;
        true
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate rows as slices of length `size`.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.size.max(1) as usize)
    }
}
