//! Toppling rules for Topple sandpiles.
//!
//! A rule looks at one active cell and its in-bounds neighbours and returns
//! the mass changes that toppling it would cause. Rules never mutate the
//! pile; the engine merges every active cell's [`Deltas`](topple_core::Deltas)
//! and applies the batch once per step.
//!
//! # Rules
//!
//! - [`Symmetric`]: `floor(mass / threshold)` topples, equal grains to each
//!   neighbour.
//! - [`RandomToppling`]: same topple count and grain total, split across
//!   neighbours by a seeded multinomial draw.
//! - [`MeanField`]: moves the whole mass, weighted towards the neighbours
//!   that lie outward from the pile's center of mass.
//!
//! [`build_rule`] maps a [`ToppleKind`](topple_core::ToppleKind) to a boxed
//! rule; the reserved `Potential` kind fails with `UnsupportedRule`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod build;
pub mod context;
pub mod grain;
pub mod mean_field;
pub mod random;
pub mod rule;
pub mod symmetric;

pub use build::{build_rule, RuleParams};
pub use context::ToppleContext;
pub use mean_field::MeanField;
pub use random::RandomToppling;
pub use rule::ToppleRule;
pub use symmetric::Symmetric;
