//! Reusable state and rule fixtures.
//!
//! - [`seeded`] / [`pile_from`]: quick [`State`] construction.
//! - [`OutOfBoundsRule`]: emits a delta for a cell off the grid.
//! - [`FailingRule`]: symmetric toppling that fails after N calls.
//! - [`NonFiniteRule`]: emits a NaN delta.

use std::sync::atomic::{AtomicUsize, Ordering};

use topple_core::{Cell, Deltas, RuleError, ToppleKind};
use topple_rules::{Symmetric, ToppleContext, ToppleRule};
use topple_space::Square4;
use topple_state::State;

/// A `size × size` pile seeded with `chips` at the center.
///
/// # Panics
///
/// If `size` is not a valid grid dimension.
pub fn seeded(size: u32, threshold: f64, chips: f64) -> State {
    let space = Square4::new(size).expect("valid test grid size");
    State::seeded(space, threshold, chips)
}

/// A pile with the given masses.
///
/// # Panics
///
/// If `size` is invalid or a cell is out of bounds.
pub fn pile_from(size: u32, threshold: f64, masses: &[((i32, i32), f64)]) -> State {
    let space = Square4::new(size).expect("valid test grid size");
    State::from_masses(
        space,
        threshold,
        masses.iter().map(|&(rc, m)| (Cell::from(rc), m)),
    )
    .expect("in-bounds test masses")
}

/// Moves the toppling cell's mass to a cell one row above the grid.
pub struct OutOfBoundsRule;

impl ToppleRule for OutOfBoundsRule {
    fn name(&self) -> &str {
        "out_of_bounds"
    }

    fn kind(&self) -> ToppleKind {
        ToppleKind::Symmetric
    }

    fn topple(
        &self,
        ctx: &mut ToppleContext<'_>,
        cell: Cell,
        _neighbours: &[Cell],
    ) -> Result<Deltas, RuleError> {
        let mass = ctx.pile().mass(cell);
        let mut out = Deltas::new();
        out.add(cell, -mass);
        out.add(Cell::new(-1, cell.col), mass);
        Ok(out)
    }
}

/// Adds NaN to the toppling cell.
pub struct NonFiniteRule;

impl ToppleRule for NonFiniteRule {
    fn name(&self) -> &str {
        "non_finite"
    }

    fn kind(&self) -> ToppleKind {
        ToppleKind::Symmetric
    }

    fn topple(
        &self,
        _ctx: &mut ToppleContext<'_>,
        cell: Cell,
        _neighbours: &[Cell],
    ) -> Result<Deltas, RuleError> {
        let mut out = Deltas::new();
        out.add(cell, f64::NAN);
        Ok(out)
    }
}

/// Topples symmetrically until `succeed_count` calls, then fails.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send`.
pub struct FailingRule {
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingRule {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `topple()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl ToppleRule for FailingRule {
    fn name(&self) -> &str {
        "failing"
    }

    fn kind(&self) -> ToppleKind {
        ToppleKind::Symmetric
    }

    fn topple(
        &self,
        ctx: &mut ToppleContext<'_>,
        cell: Cell,
        neighbours: &[Cell],
    ) -> Result<Deltas, RuleError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(RuleError::InvalidParameter {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Symmetric::new().topple(ctx, cell, neighbours)
    }
}
