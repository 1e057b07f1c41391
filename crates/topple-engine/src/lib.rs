//! Relaxation engine orchestrating Topple sandpile runs.
//!
//! [`SandpileConfig`] validates the run's parameters, [`RelaxationEngine`]
//! drives the avalanche in synchronous batches, and [`run_sweep`] fans
//! independent runs out over worker threads.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod metrics;
pub mod sweep;

pub use config::{ConfigError, SandpileConfig, SandpileConfigBuilder};
pub use engine::{RelaxationEngine, StepOutcome};
pub use metrics::{RelaxReport, StepMetrics, Termination};
pub use sweep::{run_one, run_sweep, SweepError};
