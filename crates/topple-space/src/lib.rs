//! Lattice topology for Topple sandpiles.
//!
//! The only backend is [`Square4`]: a fixed-size square grid with
//! 4-connected (von Neumann) adjacency and absorbing edges. Neighbours
//! that would fall off the grid are dropped, so mass sent towards them
//! leaves the system.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod square4;

pub use error::SpaceError;
pub use square4::Square4;
