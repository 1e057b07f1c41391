//! Error types for lattice construction and coordinate checks.

use std::fmt;
use topple_core::Cell;

/// Errors arising from lattice construction or coordinate queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// A cell is outside the lattice.
    CellOutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Side length of the lattice.
        size: u32,
    },
    /// Attempted to construct a lattice with zero cells.
    EmptySpace,
    /// The side length does not fit in the `i32` coordinate range.
    DimensionTooLarge {
        /// The requested side length.
        value: u32,
        /// Largest accepted side length.
        max: u32,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellOutOfBounds { cell, size } => {
                write!(f, "cell {cell} out of bounds: [0, {size}) x [0, {size})")
            }
            Self::EmptySpace => write!(f, "lattice must have at least one cell"),
            Self::DimensionTooLarge { value, max } => {
                write!(f, "side length {value} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
