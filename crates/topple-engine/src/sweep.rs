//! Parallel parameter sweeps over independent sandpile runs.
//!
//! Each configuration gets its own [`RelaxationEngine`] on a worker
//! thread; nothing is shared between runs. Workers pull job indices from a
//! crossbeam channel and send `(index, result)` pairs back on another.

use std::error::Error;
use std::fmt;
use std::thread;

use topple_core::RelaxError;

use crate::config::{ConfigError, SandpileConfig};
use crate::engine::RelaxationEngine;
use crate::metrics::RelaxReport;

/// Why one run of a sweep failed. Other runs are unaffected.
#[derive(Clone, Debug, PartialEq)]
pub enum SweepError {
    /// The engine could not be built.
    Config(ConfigError),
    /// The run failed mid-avalanche.
    Relax(RelaxError),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "engine construction failed: {e}"),
            Self::Relax(e) => write!(f, "relaxation failed: {e}"),
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Relax(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<RelaxError> for SweepError {
    fn from(e: RelaxError) -> Self {
        Self::Relax(e)
    }
}

/// One run, start to finish.
pub fn run_one(config: &SandpileConfig, max_steps: u64) -> Result<RelaxReport, SweepError> {
    let mut engine = RelaxationEngine::new(config, max_steps)?;
    Ok(engine.run()?)
}

/// Run every configuration with the same step cap on up to `workers`
/// threads.
///
/// Results come back in input order, tagged with their index. `workers`
/// is clamped to `[1, configs.len()]`.
pub fn run_sweep(
    configs: &[SandpileConfig],
    max_steps: u64,
    workers: usize,
) -> Vec<(usize, Result<RelaxReport, SweepError>)> {
    if configs.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, configs.len());
    tracing::info!(runs = configs.len(), workers, max_steps, "starting sweep");

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded();
    for index in 0..configs.len() {
        // Receiver is alive in this scope; send cannot fail.
        let _ = job_tx.send(index);
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                while let Ok(index) = job_rx.recv() {
                    let result = run_one(&configs[index], max_steps);
                    if let Err(e) = &result {
                        tracing::warn!(index, error = %e, "sweep run failed");
                    }
                    let _ = result_tx.send((index, result));
                }
            });
        }
    });
    drop(result_tx);

    let mut results: Vec<_> = result_rx.iter().collect();
    results.sort_by_key(|&(index, _)| index);
    results
}
