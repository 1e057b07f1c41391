//! Topple: a sandpile relaxation engine for self-organized-criticality
//! experiments.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Topple sub-crates. For most users, adding `topple` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use topple::prelude::*;
//!
//! let config = SandpileConfig::builder()
//!     .grid_size(5)
//!     .threshold(4.0)
//!     .toppling_kind(ToppleKind::Symmetric)
//!     .initial_chips(4.0)
//!     .build()
//!     .unwrap();
//!
//! let mut engine = RelaxationEngine::new(&config, 100).unwrap();
//! let report = engine.run().unwrap();
//! assert_eq!(report.termination, Termination::Stable);
//! assert_eq!(report.steps, 1);
//!
//! // All four chips moved to the center's neighbours.
//! let state = engine.into_state();
//! assert_eq!(state.mass(Cell::new(1, 2)), 1.0);
//! assert_eq!(state.total_mass(), 4.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `topple-core` | Cells, delta batches, kinds, errors, `PileReader` |
//! | [`space`] | `topple-space` | The `Square4` lattice |
//! | [`state`] | `topple-state` | Pile state, dense fields, fingerprints |
//! | [`rules`] | `topple-rules` | Toppling rules and the rule factory |
//! | [`engine`] | `topple-engine` | Configuration, relaxation engine, sweeps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and errors (`topple-core`).
pub use topple_core as types;

/// The square lattice with absorbing edges (`topple-space`).
pub use topple_space as space;

/// Pile state and dense observation fields (`topple-state`).
///
/// [`state::fingerprint`] gives a cheap hash for comparing runs.
pub use topple_state as state;

/// Toppling rules (`topple-rules`).
///
/// Implement [`rules::ToppleRule`] to plug a custom rule into
/// [`engine::RelaxationEngine::from_parts`].
pub use topple_rules as rules;

/// Configuration, relaxation engine, and parameter sweeps (`topple-engine`).
pub use topple_engine as engine;

/// Common imports for typical Topple usage.
///
/// ```rust
/// use topple::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use topple_core::{Cell, Deltas, PileReader, StepId, ToppleKind};

    // Errors
    pub use topple_core::{RelaxError, RuleError, StateError};

    // Space and state
    pub use topple_space::Square4;
    pub use topple_state::{fingerprint, DenseField, State};

    // Rules
    pub use topple_rules::{ToppleContext, ToppleRule};

    // Engine
    pub use topple_engine::{
        ConfigError, RelaxReport, RelaxationEngine, SandpileConfig, StepOutcome, Termination,
    };
}
