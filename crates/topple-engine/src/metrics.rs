//! Per-step metrics and whole-run avalanche statistics.
//!
//! [`StepMetrics`] describes one relaxation step; [`RelaxReport`]
//! accumulates them over a run and records why the run ended.

use std::fmt;

use serde::Serialize;

/// Why a relaxation run stopped. Both are normal outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The active set emptied: the pile is stable.
    Stable,
    /// The step cap was hit with cells still active. The final state is a
    /// snapshot of an unfinished avalanche.
    StepCapReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("stable"),
            Self::StepCapReached => f.write_str("step cap reached"),
        }
    }
}

/// Metrics collected during a single relaxation step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StepMetrics {
    /// Cells in the active-set snapshot the step processed.
    pub active_cells: usize,
    /// Active cells that shed mass this step.
    pub topples: u64,
    /// Mass that left the grid through the boundary this step.
    pub mass_lost: f64,
    /// Cells active after the step's batch was applied.
    pub next_active: usize,
    /// Wall-clock time for the step, in microseconds.
    pub total_us: u64,
}

/// Summary of a finished (or capped) relaxation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RelaxReport {
    /// Why the run stopped.
    pub termination: Termination,
    /// Steps actually executed.
    pub steps: u64,
    /// Topple events over the run, one per active cell per step that shed mass.
    pub total_topples: u64,
    /// Distinct cells that toppled at least once.
    pub avalanche_size: usize,
    /// Total mass absorbed by the boundary.
    pub mass_lost: f64,
    /// Total grid mass before the first step.
    pub initial_mass: f64,
    /// Total grid mass at the end.
    pub final_mass: f64,
}

impl RelaxReport {
    /// `true` if the run converged rather than being capped.
    pub fn is_stable(&self) -> bool {
        self.termination == Termination::Stable
    }
}
