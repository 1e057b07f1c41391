//! Core types and traits for the Topple sandpile simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Topple workspace:
//! cell coordinates, delta batches, toppling kinds, error types, and the
//! read-only [`PileReader`] trait through which toppling rules see a pile.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod delta;
pub mod error;
pub mod id;
pub mod kind;
pub mod traits;

pub use delta::Deltas;
pub use error::{RelaxError, RuleError, StateError};
pub use id::{Cell, Neighbours, StepId};
pub use kind::{ParseToppleKindError, ToppleKind};
pub use traits::PileReader;
