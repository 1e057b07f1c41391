//! Execution context passed to rules during a relaxation step.

use std::cell::OnceCell;

use rand::RngCore;
use topple_core::{PileReader, StepId};

/// Everything a rule may consult while toppling one cell.
///
/// One context is built per step and shared by every active cell in that
/// step, so pile-wide statistics such as the center of mass are computed
/// at most once per batch. The pile does not change within a step: the
/// engine only applies deltas after every active cell has been visited.
pub struct ToppleContext<'a> {
    pile: &'a dyn PileReader,
    rng: &'a mut dyn RngCore,
    step: StepId,
    center_of_mass: OnceCell<(f64, f64)>,
}

impl<'a> ToppleContext<'a> {
    /// Construct a context for one step.
    ///
    /// Typically called by the engine. For testing, pass a mock pile from
    /// `topple-test-utils` and a seeded RNG.
    pub fn new(pile: &'a dyn PileReader, rng: &'a mut dyn RngCore, step: StepId) -> Self {
        Self {
            pile,
            rng,
            step,
            center_of_mass: OnceCell::new(),
        }
    }

    /// Read-only pile as of the start of the step.
    pub fn pile(&self) -> &dyn PileReader {
        self.pile
    }

    /// Random source for stochastic rules.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        self.rng
    }

    /// Index of the step being computed (1-based).
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Pile center of mass at step start, computed on first use.
    pub fn center_of_mass(&self) -> (f64, f64) {
        *self
            .center_of_mass
            .get_or_init(|| self.pile.center_of_mass())
    }
}
