//! Sandpile state for Topple simulations.
//!
//! [`State`] owns the sparse mass grid, the active-cell set, and two dense
//! snapshots derived from them: the density field (a copy of the grid) and
//! the force field (filled in by rules that need one). All mutation goes
//! through [`State::apply_updates`], which rebuilds the active set and the
//! density field wholesale after every batch.
//!
//! [`fingerprint`] hashes a state for cheap determinism checks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
pub mod hash;
pub mod state;

pub use field::{DenseField, ForceVector};
pub use hash::fingerprint;
pub use state::State;
