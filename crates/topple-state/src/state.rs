//! The mutable sandpile: sparse grid, active set, and derived fields.

use indexmap::{IndexMap, IndexSet};
use topple_core::{Cell, Deltas, PileReader, StateError};
use topple_space::Square4;

use crate::field::{DenseField, ForceVector};

/// Mutable state of one sandpile run.
///
/// # Invariants
///
/// - `grid` holds only in-bounds cells; absent cells have mass 0.
/// - After construction from [`State::from_masses`] and after every
///   successful [`apply_updates`](State::apply_updates), `active` is
///   exactly `{c : grid[c] >= threshold}`, sorted row-major.
/// - `density` mirrors `grid` as of the last update.
///
/// [`State::seeded`] is the one exception to the active-set rule: the
/// center cell starts active even when the initial chips are below
/// threshold, so the first relaxation step always examines it. What that
/// step does depends on the rule: the threshold-quantized rules shed
/// nothing from a below-threshold cell, while mean-field toppling moves
/// the cell's whole mass regardless of threshold.
#[derive(Clone, Debug)]
pub struct State {
    space: Square4,
    threshold: f64,
    grid: IndexMap<Cell, f64>,
    active: IndexSet<Cell>,
    density: DenseField<f64>,
    force: DenseField<ForceVector>,
}

impl State {
    /// A pile with `initial_chips` on the center cell, which is marked
    /// active.
    ///
    /// The caller is responsible for a positive, finite `threshold`; the
    /// engine's configuration type validates it before calling here.
    pub fn seeded(space: Square4, threshold: f64, initial_chips: f64) -> Self {
        let center = space.center();
        let mut grid = IndexMap::new();
        grid.insert(center, initial_chips);
        let mut active = IndexSet::new();
        active.insert(center);
        let mut state = Self {
            space,
            threshold,
            grid,
            active,
            density: DenseField::new(space.size()),
            force: DenseField::new(space.size()),
        };
        state.refresh_density();
        state
    }

    /// A pile with arbitrary initial masses.
    ///
    /// Repeated cells accumulate. The active set follows the threshold rule.
    ///
    /// # Errors
    ///
    /// Same as [`apply_updates`](State::apply_updates).
    pub fn from_masses(
        space: Square4,
        threshold: f64,
        masses: impl IntoIterator<Item = (Cell, f64)>,
    ) -> Result<Self, StateError> {
        let mut state = Self {
            space,
            threshold,
            grid: IndexMap::new(),
            active: IndexSet::new(),
            density: DenseField::new(space.size()),
            force: DenseField::new(space.size()),
        };
        let deltas: Deltas = masses.into_iter().collect();
        state.apply_updates(&deltas)?;
        Ok(state)
    }

    /// Apply a batch of signed mass changes.
    ///
    /// Every delta is added to its cell (creating the entry if absent).
    /// Afterwards the active set is rebuilt from scratch as every cell at
    /// or above threshold, and the density field is recomputed from the
    /// full grid.
    ///
    /// # Errors
    ///
    /// The batch is validated before anything is written:
    /// - [`StateError::OutOfBounds`] if any delta addresses a cell off the
    ///   grid. Rules must drop off-grid neighbours themselves; the state
    ///   never clips.
    /// - [`StateError::NonFiniteDelta`] if any delta is NaN or infinite.
    ///
    /// On error the state is unchanged.
    pub fn apply_updates(&mut self, deltas: &Deltas) -> Result<(), StateError> {
        for (cell, delta) in deltas.iter() {
            if !self.space.contains(cell) {
                return Err(StateError::OutOfBounds {
                    cell,
                    grid_size: self.space.size(),
                });
            }
            if !delta.is_finite() {
                return Err(StateError::NonFiniteDelta { cell, value: delta });
            }
        }

        for (cell, delta) in deltas.iter() {
            *self.grid.entry(cell).or_insert(0.0) += delta;
        }

        self.refresh_active();
        self.refresh_density();
        Ok(())
    }

    /// Replace the force field wholesale.
    ///
    /// # Errors
    ///
    /// [`StateError::FieldShapeMismatch`] if `field` has a different side
    /// length than the grid.
    pub fn replace_force_field(&mut self, field: DenseField<ForceVector>) -> Result<(), StateError> {
        if field.size() != self.space.size() {
            return Err(StateError::FieldShapeMismatch {
                expected: self.space.size(),
                actual: field.size(),
            });
        }
        self.force = field;
        Ok(())
    }

    fn refresh_active(&mut self) {
        let threshold = self.threshold;
        let mut active: IndexSet<Cell> = self
            .grid
            .iter()
            .filter(|&(_, &m)| m >= threshold)
            .map(|(&c, _)| c)
            .collect();
        active.sort();
        self.active = active;
    }

    fn refresh_density(&mut self) {
        self.density.clear();
        for (&cell, &m) in &self.grid {
            self.density.set(cell, m);
        }
    }

    // ── Observation surface ─────────────────────────────────────

    /// The lattice this pile lives on.
    pub fn space(&self) -> &Square4 {
        &self.space
    }

    /// Side length of the grid.
    pub fn grid_size(&self) -> u32 {
        self.space.size()
    }

    /// Toppling threshold, fixed at construction.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Sparse mass grid. Cells never touched are absent.
    pub fn grid(&self) -> &IndexMap<Cell, f64> {
        &self.grid
    }

    /// Mass at `cell`; 0.0 when absent.
    pub fn mass(&self, cell: Cell) -> f64 {
        self.grid.get(&cell).copied().unwrap_or(0.0)
    }

    /// Cells due to topple on the next step, in row-major order.
    pub fn active_cells(&self) -> &IndexSet<Cell> {
        &self.active
    }

    /// Whether no cell is active.
    pub fn is_stable(&self) -> bool {
        self.active.is_empty()
    }

    /// Dense copy of the grid as of the last update.
    pub fn density_field(&self) -> &DenseField<f64> {
        &self.density
    }

    /// Per-cell force vectors, as last supplied by a rule.
    pub fn force_field(&self) -> &DenseField<ForceVector> {
        &self.force
    }

    /// Mass-weighted centroid as `(row, col)`; the grid center when empty.
    pub fn center_of_mass(&self) -> (f64, f64) {
        PileReader::center_of_mass(self)
    }

    /// Sum of mass over the grid.
    pub fn total_mass(&self) -> f64 {
        PileReader::total_mass(self)
    }
}

impl PileReader for State {
    fn grid_size(&self) -> u32 {
        self.space.size()
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn mass(&self, cell: Cell) -> f64 {
        State::mass(self, cell)
    }

    fn for_each_mass(&self, f: &mut dyn FnMut(Cell, f64)) {
        for (&cell, &m) in &self.grid {
            f(cell, m);
        }
    }
}
