//! Error types for the Topple simulator.
//!
//! Organized by subsystem: state mutation, toppling rules, and the
//! relaxation loop that ties them together. Configuration errors live
//! with the configuration type in `topple-engine`.

use std::error::Error;
use std::fmt;

use crate::id::Cell;
use crate::kind::ToppleKind;

/// Errors from `State::apply_updates` (`topple-state`).
///
/// Every variant indicates a contract violation by whoever produced the
/// input. The batch is rejected whole; the state is left untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    /// A delta referenced a cell outside `[0, grid_size)²`.
    OutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Side length of the grid.
        grid_size: u32,
    },
    /// A delta was NaN or infinite.
    NonFiniteDelta {
        /// The cell the delta was addressed to.
        cell: Cell,
        /// The offending value.
        value: f64,
    },
    /// A replacement dense field does not match the grid's side length.
    FieldShapeMismatch {
        /// Side length of the grid.
        expected: u32,
        /// Side length of the supplied field.
        actual: u32,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { cell, grid_size } => {
                write!(f, "cell {cell} out of bounds for {grid_size}x{grid_size} grid")
            }
            Self::NonFiniteDelta { cell, value } => {
                write!(f, "non-finite delta {value} for cell {cell}")
            }
            Self::FieldShapeMismatch { expected, actual } => {
                write!(f, "field side length {actual} does not match grid side {expected}")
            }
        }
    }
}

impl Error for StateError {}

/// Errors from toppling-rule construction or execution.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleError {
    /// No rule implements the requested kind.
    UnsupportedRule {
        /// The kind that was requested.
        kind: ToppleKind,
    },
    /// The cell being toppled holds a NaN or infinite mass.
    NonFiniteMass {
        /// The cell being toppled.
        cell: Cell,
    },
    /// Rule parameters are unusable.
    InvalidParameter {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRule { kind } => {
                write!(f, "toppling kind '{kind}' has no implemented rule")
            }
            Self::NonFiniteMass { cell } => write!(f, "non-finite mass at cell {cell}"),
            Self::InvalidParameter { reason } => write!(f, "invalid rule parameter: {reason}"),
        }
    }
}

impl Error for RuleError {}

/// Errors from a single relaxation step.
///
/// A failed step applies nothing: rule failures abort before the batch is
/// built, and state rejections leave the grid as it was.
#[derive(Clone, Debug, PartialEq)]
pub enum RelaxError {
    /// The toppling rule failed on one of the active cells.
    RuleFailed {
        /// Name of the failing rule.
        name: String,
        /// The underlying rule error.
        reason: RuleError,
    },
    /// The merged batch was rejected by the state.
    State(StateError),
}

impl fmt::Display for RelaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleFailed { name, reason } => write!(f, "rule '{name}' failed: {reason}"),
            Self::State(e) => write!(f, "state rejected update: {e}"),
        }
    }
}

impl Error for RelaxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RuleFailed { reason, .. } => Some(reason),
            Self::State(e) => Some(e),
        }
    }
}

impl From<StateError> for RelaxError {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}
