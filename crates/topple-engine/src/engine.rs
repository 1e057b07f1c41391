//! The avalanche driver.
//!
//! [`RelaxationEngine`] owns one [`State`] for the lifetime of a run and
//! advances it in synchronous batches: every cell active at the start of a
//! step topples against the same read-only pile, the resulting deltas are
//! merged, and the merged batch is applied once. Cells that become active
//! during a step wait for the next one, which makes each step independent
//! of the order in which active cells are visited.

use std::time::Instant;

use indexmap::IndexSet;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use topple_core::{Cell, Deltas, RelaxError, StepId};
use topple_rules::{ToppleContext, ToppleRule};
use topple_state::State;

use crate::config::{ConfigError, SandpileConfig};
use crate::metrics::{RelaxReport, StepMetrics, Termination};

// Compile-time assertion: an engine can be moved onto a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<RelaxationEngine>();
    }
};

// ── StepOutcome ────────────────────────────────────────────────────

/// Result of one call to [`RelaxationEngine::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// A batch was applied.
    Advanced(StepMetrics),
    /// Nothing was applied; the run is over. Repeated calls keep
    /// returning the same reason.
    Finished(Termination),
}

// ── RelaxationEngine ───────────────────────────────────────────────

/// Drives a pile from its seeded state to stability or a step cap.
///
/// The rule is constructed once from the configuration. Rule randomness
/// comes from the engine's RNG, a [`ChaCha8Rng`] seeded from
/// [`SandpileConfig::seed`] unless one is injected with
/// [`with_rng`](Self::with_rng).
pub struct RelaxationEngine {
    state: State,
    rule: Box<dyn ToppleRule>,
    rng: Box<dyn RngCore + Send>,
    max_steps: u64,
    steps: u64,
    finished: Option<Termination>,
    total_topples: u64,
    toppled: IndexSet<Cell>,
    mass_lost: f64,
    initial_mass: f64,
    last_metrics: StepMetrics,
}

impl RelaxationEngine {
    /// Build the rule and initial state for `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Rule`] if the configured kind has no rule
    /// (`Potential`).
    pub fn new(config: &SandpileConfig, max_steps: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, max_steps, ChaCha8Rng::seed_from_u64(config.seed()))
    }

    /// Like [`new`](Self::new) with a caller-supplied random source.
    pub fn with_rng(
        config: &SandpileConfig,
        max_steps: u64,
        rng: impl RngCore + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let rule = config.build_rule()?;
        Ok(Self::from_parts(
            config.initial_state(),
            rule,
            Box::new(rng),
            max_steps,
        ))
    }

    /// Assemble an engine from an existing state and rule.
    pub fn from_parts(
        state: State,
        rule: Box<dyn ToppleRule>,
        rng: Box<dyn RngCore + Send>,
        max_steps: u64,
    ) -> Self {
        let initial_mass = state.total_mass();
        Self {
            state,
            rule,
            rng,
            max_steps,
            steps: 0,
            finished: None,
            total_topples: 0,
            toppled: IndexSet::new(),
            mass_lost: 0.0,
            initial_mass,
            last_metrics: StepMetrics::default(),
        }
    }

    /// Execute one relaxation step.
    ///
    /// Termination is checked before any work: an empty active set ends
    /// the run as [`Termination::Stable`] even when the step cap is also
    /// exhausted.
    ///
    /// # Errors
    ///
    /// [`RelaxError::RuleFailed`] if the rule rejects a cell, or
    /// [`RelaxError::State`] if the merged batch is rejected. In both
    /// cases the pile and the step counter are left as they were before
    /// the step. The RNG is not rewound: draws made by cells visited
    /// before the failure are consumed, so retrying the step on a seeded
    /// engine does not reproduce the run an uninterrupted engine would
    /// have taken.
    pub fn step(&mut self) -> Result<StepOutcome, RelaxError> {
        if let Some(termination) = self.finished {
            return Ok(StepOutcome::Finished(termination));
        }
        if self.state.is_stable() {
            return Ok(self.finish(Termination::Stable));
        }
        if self.steps >= self.max_steps {
            return Ok(self.finish(Termination::StepCapReached));
        }

        let start = Instant::now();
        let step_id = StepId(self.steps + 1);
        let active: Vec<Cell> = self.state.active_cells().iter().copied().collect();

        let mut batch = Deltas::new();
        let mut toppled_now = Vec::new();
        {
            let space = *self.state.space();
            let mut ctx = ToppleContext::new(&self.state, &mut *self.rng, step_id);
            for &cell in &active {
                let neighbours = space.neighbours(cell);
                let deltas = self
                    .rule
                    .topple(&mut ctx, cell, &neighbours)
                    .map_err(|reason| RelaxError::RuleFailed {
                        name: self.rule.name().to_string(),
                        reason,
                    })?;
                if deltas.get(cell) < 0.0 {
                    toppled_now.push(cell);
                }
                batch.merge(deltas);
            }
        }

        let mass_lost = -batch.net();
        self.state.apply_updates(&batch)?;
        if let Some(field) = self.rule.force_field(&self.state) {
            self.state.replace_force_field(field)?;
        }

        self.steps = step_id.0;
        self.total_topples += toppled_now.len() as u64;
        self.toppled.extend(toppled_now.iter().copied());
        self.mass_lost += mass_lost;

        let metrics = StepMetrics {
            active_cells: active.len(),
            topples: toppled_now.len() as u64,
            mass_lost,
            next_active: self.state.active_cells().len(),
            total_us: start.elapsed().as_micros() as u64,
        };
        tracing::debug!(
            step = step_id.0,
            active = metrics.active_cells,
            topples = metrics.topples,
            mass_lost = metrics.mass_lost,
            next_active = metrics.next_active,
            "relaxation step"
        );
        self.last_metrics = metrics.clone();
        Ok(StepOutcome::Advanced(metrics))
    }

    /// Step until the run terminates.
    ///
    /// # Errors
    ///
    /// The first error returned by [`step`](Self::step).
    pub fn run(&mut self) -> Result<RelaxReport, RelaxError> {
        loop {
            if let StepOutcome::Finished(termination) = self.step()? {
                return Ok(self.build_report(termination));
            }
        }
    }

    /// Run statistics, once the run has terminated.
    pub fn report(&self) -> Option<RelaxReport> {
        self.finished.map(|t| self.build_report(t))
    }

    fn finish(&mut self, termination: Termination) -> StepOutcome {
        self.finished = Some(termination);
        match termination {
            Termination::Stable => tracing::info!(
                steps = self.steps,
                topples = self.total_topples,
                avalanche_size = self.toppled.len(),
                mass_lost = self.mass_lost,
                "pile relaxed"
            ),
            Termination::StepCapReached => tracing::warn!(
                steps = self.steps,
                max_steps = self.max_steps,
                still_active = self.state.active_cells().len(),
                "step cap reached before pile relaxed"
            ),
        }
        StepOutcome::Finished(termination)
    }

    fn build_report(&self, termination: Termination) -> RelaxReport {
        RelaxReport {
            termination,
            steps: self.steps,
            total_topples: self.total_topples,
            avalanche_size: self.toppled.len(),
            mass_lost: self.mass_lost,
            initial_mass: self.initial_mass,
            final_mass: self.state.total_mass(),
        }
    }

    /// Current pile.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Give up the engine and keep the pile.
    pub fn into_state(self) -> State {
        self.state
    }

    /// The configured rule.
    pub fn rule(&self) -> &dyn ToppleRule {
        self.rule.as_ref()
    }

    /// Steps executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Step cap.
    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Termination reason, if the run has ended.
    pub fn termination(&self) -> Option<Termination> {
        self.finished
    }

    /// Metrics from the most recent advancing step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topple_core::{RuleError, StateError, ToppleKind};
    use topple_rules::Symmetric;
    use topple_state::fingerprint;
    use topple_test_utils::fixtures::{self, FailingRule, NonFiniteRule, OutOfBoundsRule};

    fn engine(state: State, rule: Box<dyn ToppleRule>, max_steps: u64) -> RelaxationEngine {
        RelaxationEngine::from_parts(
            state,
            rule,
            Box::new(ChaCha8Rng::seed_from_u64(0)),
            max_steps,
        )
    }

    fn config(kind: ToppleKind, size: u32, chips: f64) -> SandpileConfig {
        let mut b = SandpileConfig::builder()
            .grid_size(size)
            .threshold(4.0)
            .toppling_kind(kind)
            .initial_chips(chips);
        if kind.requires_interaction_radius() {
            b = b.interaction_radius(2);
        }
        b.build().unwrap()
    }

    // ── Termination ────────────────────────────────────────────

    #[test]
    fn single_topple_is_stable_after_one_step() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 5, 4.0), 100).unwrap();
        let report = e.run().unwrap();
        assert_eq!(report.termination, Termination::Stable);
        assert_eq!(report.steps, 1);
        assert_eq!(report.total_topples, 1);
        assert_eq!(report.avalanche_size, 1);
        let s = e.state();
        assert_eq!(s.mass(Cell::new(2, 2)), 0.0);
        for nb in [Cell::new(1, 2), Cell::new(3, 2), Cell::new(2, 1), Cell::new(2, 3)] {
            assert_eq!(s.mass(nb), 1.0);
        }
    }

    #[test]
    fn zero_step_cap_leaves_state_untouched() {
        let cfg = config(ToppleKind::Symmetric, 5, 40.0);
        let mut e = RelaxationEngine::new(&cfg, 0).unwrap();
        let before = e.state().clone();
        assert_eq!(
            e.step().unwrap(),
            StepOutcome::Finished(Termination::StepCapReached)
        );
        assert_eq!(e.state().grid(), before.grid());
        assert_eq!(e.steps(), 0);
    }

    #[test]
    fn below_threshold_seed_finishes_after_an_empty_step() {
        // The seeded center is active even below threshold; it sheds nothing.
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 5, 1.0), 10).unwrap();
        let report = e.run().unwrap();
        assert_eq!(report.termination, Termination::Stable);
        assert_eq!(report.steps, 1);
        assert_eq!(report.total_topples, 0);
        assert_eq!(e.state().mass(Cell::new(2, 2)), 1.0);
    }

    #[test]
    fn finished_engine_keeps_reporting_termination() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 5, 4.0), 10).unwrap();
        e.run().unwrap();
        assert_eq!(e.step().unwrap(), StepOutcome::Finished(Termination::Stable));
        assert_eq!(e.steps(), 1);
        assert!(e.report().unwrap().is_stable());
    }

    #[test]
    fn report_is_none_while_running() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 9, 64.0), 100).unwrap();
        assert!(e.report().is_none());
        assert!(matches!(e.step().unwrap(), StepOutcome::Advanced(_)));
        assert!(e.report().is_none());
    }

    #[test]
    fn cap_reached_with_cells_still_active() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 21, 400.0), 3).unwrap();
        let report = e.run().unwrap();
        assert_eq!(report.termination, Termination::StepCapReached);
        assert_eq!(report.steps, 3);
        assert!(!e.state().is_stable());
    }

    // ── Batching ───────────────────────────────────────────────

    #[test]
    fn cells_activated_mid_step_wait_for_next_step() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 9, 16.0), 100).unwrap();
        match e.step().unwrap() {
            StepOutcome::Advanced(m) => {
                assert_eq!(m.active_cells, 1);
                assert_eq!(m.topples, 1);
                // 16 chips → 4 topples → 4 chips on each neighbour.
                assert_eq!(m.next_active, 4);
            }
            other => panic!("expected Advanced, got {other:?}"),
        }
        assert_eq!(e.state().mass(Cell::new(4, 4)), 0.0);
    }

    #[test]
    fn boundary_loss_is_accounted() {
        let state = fixtures::pile_from(3, 4.0, &[((0, 0), 4.0)]);
        let mut e = engine(state, Box::new(Symmetric::new()), 10);
        let report = e.run().unwrap();
        assert_eq!(report.mass_lost, 2.0);
        assert_eq!(report.initial_mass, 4.0);
        assert_eq!(report.final_mass, 2.0);
    }

    #[test]
    fn from_parts_matches_config_construction() {
        let mut a = engine(fixtures::seeded(9, 4.0, 64.0), Box::new(Symmetric::new()), 1000);
        let mut b = RelaxationEngine::new(&config(ToppleKind::Symmetric, 9, 64.0), 1000).unwrap();
        assert_eq!(a.run().unwrap(), b.run().unwrap());
        assert_eq!(fingerprint(a.state()), fingerprint(b.state()));
    }

    // ── Errors ─────────────────────────────────────────────────

    #[test]
    fn out_of_bounds_delta_is_surfaced_and_state_kept() {
        let state = fixtures::pile_from(5, 4.0, &[((0, 2), 8.0)]);
        let before = state.clone();
        let mut e = engine(state, Box::new(OutOfBoundsRule), 10);
        match e.step() {
            Err(RelaxError::State(StateError::OutOfBounds { cell, grid_size })) => {
                assert_eq!(cell, Cell::new(-1, 2));
                assert_eq!(grid_size, 5);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
        assert_eq!(e.state().grid(), before.grid());
        assert_eq!(e.steps(), 0);
    }

    #[test]
    fn non_finite_delta_is_surfaced() {
        let state = fixtures::pile_from(5, 4.0, &[((2, 2), 8.0)]);
        let mut e = engine(state, Box::new(NonFiniteRule), 10);
        assert!(matches!(
            e.step(),
            Err(RelaxError::State(StateError::NonFiniteDelta { .. }))
        ));
    }

    #[test]
    fn rule_failure_names_the_rule() {
        let state = fixtures::pile_from(9, 4.0, &[((4, 4), 64.0)]);
        let mut e = engine(state, Box::new(FailingRule::new(1)), 10);
        assert!(matches!(e.step().unwrap(), StepOutcome::Advanced(_)));
        let before = e.state().clone();
        match e.step() {
            Err(RelaxError::RuleFailed { name, reason }) => {
                assert_eq!(name, "failing");
                assert!(matches!(reason, RuleError::InvalidParameter { .. }));
            }
            other => panic!("expected RuleFailed, got {other:?}"),
        }
        assert_eq!(e.steps(), 1);
        assert_eq!(e.state().grid(), before.grid());
        assert_eq!(e.state().active_cells(), before.active_cells());
        assert_eq!(e.termination(), None);
    }

    #[test]
    fn potential_engine_cannot_be_built() {
        let cfg = config(ToppleKind::Potential, 5, 4.0);
        assert!(matches!(
            RelaxationEngine::new(&cfg, 10),
            Err(ConfigError::Rule(_))
        ));
    }

    #[test]
    fn below_threshold_mean_field_seed_moves_in_the_first_step() {
        // MeanField has no threshold gate: the seeded center is active and
        // its whole mass moves even though it is below threshold.
        let mut e = RelaxationEngine::new(&config(ToppleKind::MeanField, 7, 2.0), 10).unwrap();
        match e.step().unwrap() {
            StepOutcome::Advanced(m) => assert_eq!(m.topples, 1),
            other => panic!("expected Advanced, got {other:?}"),
        }
        let s = e.state();
        assert_eq!(s.mass(Cell::new(3, 3)), 0.0);
        assert_eq!(s.mass(Cell::new(2, 3)), 0.5);
        assert_eq!(s.total_mass(), 2.0);
        let report = e.run().unwrap();
        assert_eq!(report.termination, Termination::Stable);
        assert_eq!(report.steps, 1);
    }

    // ── Large masses ───────────────────────────────────────────

    #[test]
    fn huge_symmetric_seed_topples_in_full() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::Symmetric, 5, 1e20), 1).unwrap();
        assert!(matches!(e.step().unwrap(), StepOutcome::Advanced(_)));
        let left = e.state().mass(Cell::new(2, 2));
        assert!(left < 1.0, "center kept {left}");
    }

    #[test]
    fn huge_random_seed_steps_without_overflow() {
        let cfg = SandpileConfig::builder()
            .grid_size(5)
            .threshold(1.0)
            .toppling_kind(ToppleKind::Random)
            .initial_chips(1e20)
            .build()
            .unwrap();
        let mut e = RelaxationEngine::new(&cfg, 1).unwrap();
        assert!(matches!(e.step().unwrap(), StepOutcome::Advanced(_)));
        let s = e.state();
        assert!(s.mass(Cell::new(2, 2)) < 1.0);
        assert!((s.total_mass() - 1e20).abs() / 1e20 < 1e-12);
    }

    // ── MeanField ──────────────────────────────────────────────

    #[test]
    fn mean_field_step_publishes_force_field() {
        let mut e = RelaxationEngine::new(&config(ToppleKind::MeanField, 7, 8.0), 1).unwrap();
        assert!(matches!(e.step().unwrap(), StepOutcome::Advanced(_)));
        // Centered seed falls back to uniform: 2.0 on each neighbour.
        let s = e.state();
        assert_eq!(s.mass(Cell::new(2, 3)), 2.0);
        let f = s.force_field();
        assert_eq!(f.at(Cell::new(2, 3)), Some([-2.0, 0.0]));
        assert_eq!(f.at(Cell::new(3, 4)), Some([0.0, 2.0]));
    }
}
