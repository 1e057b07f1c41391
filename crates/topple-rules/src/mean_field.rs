//! Mean-field toppling weighted by the outward direction from the pile's
//! center of mass.

use smallvec::SmallVec;

use crate::context::ToppleContext;
use crate::rule::ToppleRule;
use topple_core::{Cell, Deltas, PileReader, RuleError, ToppleKind};
use topple_state::{DenseField, ForceVector};

/// Full-mass transfer biased away from the center of mass.
///
/// For an active cell at position `p` and pile centroid `c`, the outward
/// direction is the unit vector `(p - c) / |p - c|` (zero when `p == c`).
/// Each neighbour `n` gets weight `max(0, outward · (n - p))`; the weights
/// are normalized to sum to one and the cell's entire mass is split
/// accordingly.
///
/// There is no threshold gate: whatever cell the engine hands over moves
/// its whole mass, including a seeded center that starts below threshold.
///
/// When no neighbour has positive weight (the cell sits on the centroid,
/// or every neighbour lies behind it) the mass is split uniformly across
/// the in-bounds neighbours instead, so it is never deleted outright.
///
/// The rule also publishes a force field: cells within
/// `interaction_radius` of the centroid carry their mass times the outward
/// unit vector.
#[derive(Clone, Copy, Debug)]
pub struct MeanField {
    interaction_radius: u32,
}

impl MeanField {
    /// Create the rule.
    ///
    /// # Errors
    ///
    /// [`RuleError::InvalidParameter`] if `interaction_radius` is zero.
    pub fn new(interaction_radius: u32) -> Result<Self, RuleError> {
        if interaction_radius == 0 {
            return Err(RuleError::InvalidParameter {
                reason: "interaction_radius must be at least 1".to_string(),
            });
        }
        Ok(Self { interaction_radius })
    }

    /// Radius (in cells) of the force-field neighbourhood around the centroid.
    pub fn interaction_radius(&self) -> u32 {
        self.interaction_radius
    }

    /// Normalized neighbour weights for `cell`, given the pile centroid.
    ///
    /// Sums to one whenever `neighbours` is non-empty.
    pub fn weights(
        center_of_mass: (f64, f64),
        cell: Cell,
        neighbours: &[Cell],
    ) -> SmallVec<[f64; 4]> {
        let outward = outward_unit(center_of_mass, cell);
        let mut weights: SmallVec<[f64; 4]> = neighbours
            .iter()
            .map(|&nb| {
                let (dr, dc) = cell.offset_to(nb);
                (outward.0 * dr + outward.1 * dc).max(0.0)
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            for w in &mut weights {
                *w /= total;
            }
        } else if !weights.is_empty() {
            let uniform = 1.0 / weights.len() as f64;
            weights.fill(uniform);
        }
        weights
    }
}

/// Unit vector from `from` towards `cell`; zero when they coincide.
fn outward_unit(from: (f64, f64), cell: Cell) -> (f64, f64) {
    let (r, c) = cell.position();
    let (dr, dc) = (r - from.0, c - from.1);
    let norm = dr.hypot(dc);
    if norm > 0.0 {
        (dr / norm, dc / norm)
    } else {
        (0.0, 0.0)
    }
}

impl ToppleRule for MeanField {
    fn name(&self) -> &str {
        "mean_field"
    }

    fn kind(&self) -> ToppleKind {
        ToppleKind::MeanField
    }

    fn topple(
        &self,
        ctx: &mut ToppleContext<'_>,
        cell: Cell,
        neighbours: &[Cell],
    ) -> Result<Deltas, RuleError> {
        let mass = ctx.pile().mass(cell);
        if !mass.is_finite() {
            return Err(RuleError::NonFiniteMass { cell });
        }

        let weights = Self::weights(ctx.center_of_mass(), cell, neighbours);
        let mut out = Deltas::with_capacity(neighbours.len() + 1);
        out.add(cell, -mass);
        for (&nb, &w) in neighbours.iter().zip(weights.iter()) {
            out.add(nb, mass * w);
        }
        Ok(out)
    }

    fn force_field(&self, pile: &dyn PileReader) -> Option<DenseField<ForceVector>> {
        let com = pile.center_of_mass();
        let radius = self.interaction_radius as f64;
        let mut field = DenseField::new(pile.grid_size());
        pile.for_each_mass(&mut |cell, m| {
            let (r, c) = cell.position();
            if (r - com.0).hypot(c - com.1) <= radius {
                let (ur, uc) = outward_unit(com, cell);
                field.set(cell, [m * ur, m * uc]);
            }
        });
        Some(field)
    }
}
