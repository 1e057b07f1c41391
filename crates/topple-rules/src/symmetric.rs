//! Deterministic symmetric toppling.

use crate::context::ToppleContext;
use crate::grain::{grain_size, topple_count};
use crate::rule::ToppleRule;
use topple_core::{Cell, Deltas, RuleError, ToppleKind};

/// Classic Bak–Tang–Wiesenfeld toppling.
///
/// With `topples = floor(mass / threshold)`, the cell loses
/// `topples × threshold` and every in-bounds neighbour gains
/// `topples × threshold / 4`. With the classic threshold of 4 that is one
/// chip per neighbour per topple.
///
/// The output depends only on the cell's own mass, so the order in which
/// active cells are visited within a step does not matter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Symmetric;

impl Symmetric {
    /// Create the rule.
    pub fn new() -> Self {
        Self
    }
}

impl ToppleRule for Symmetric {
    fn name(&self) -> &str {
        "symmetric"
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
        let pile = ctx.pile();
        let mass = pile.mass(cell);
        if !mass.is_finite() {
            return Err(RuleError::NonFiniteMass { cell });
        }
        let threshold = pile.threshold();
        let topples = topple_count(mass, threshold);
        if topples == 0.0 {
            return Ok(Deltas::new());
        }

        let mut out = Deltas::with_capacity(neighbours.len() + 1);
        out.add(cell, -topples * threshold);
        let share = topples * grain_size(threshold);
        for &nb in neighbours {
            out.add(nb, share);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use topple_core::StepId;
    use topple_space::Square4;
    use topple_test_utils::MockPile;

    fn run(pile: &MockPile, cell: Cell) -> Deltas {
        let space = Square4::new(pile.size()).unwrap();
        let neighbours = space.neighbours(cell);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = ToppleContext::new(pile, &mut rng, StepId(1));
        Symmetric::new().topple(&mut ctx, cell, &neighbours).unwrap()
    }

    #[test]
    fn single_topple_sends_one_chip_to_each_neighbour() {
        let center = Cell::new(2, 2);
        let pile = MockPile::new(5, 4.0).with_mass(center, 4.0);
        let d = run(&pile, center);
        assert_eq!(d.get(center), -4.0);
        for nb in [Cell::new(1, 2), Cell::new(3, 2), Cell::new(2, 1), Cell::new(2, 3)] {
            assert_eq!(d.get(nb), 1.0);
        }
        assert_eq!(d.len(), 5);
        assert_eq!(d.net(), 0.0);
    }

    #[test]
    fn multiple_topples_scale_every_share() {
        let center = Cell::new(2, 2);
        let pile = MockPile::new(5, 4.0).with_mass(center, 13.0);
        let d = run(&pile, center);
        assert_eq!(d.get(center), -12.0);
        assert_eq!(d.get(Cell::new(1, 2)), 3.0);
    }

    #[test]
    fn non_classic_threshold_still_conserves_in_interior() {
        let center = Cell::new(2, 2);
        let pile = MockPile::new(5, 3.0).with_mass(center, 7.0);
        let d = run(&pile, center);
        assert_eq!(d.get(center), -6.0);
        assert_eq!(d.get(Cell::new(2, 3)), 1.5);
        assert!(d.net().abs() < 1e-12);
    }

    #[test]
    fn corner_cell_loses_the_off_grid_grains() {
        let corner = Cell::new(0, 0);
        let pile = MockPile::new(5, 4.0).with_mass(corner, 4.0);
        let d = run(&pile, corner);
        assert_eq!(d.get(corner), -4.0);
        assert_eq!(d.len(), 3);
        assert_eq!(d.net(), -2.0);
    }

    #[test]
    fn below_threshold_produces_no_deltas() {
        let center = Cell::new(2, 2);
        let pile = MockPile::new(5, 4.0).with_mass(center, 3.0);
        assert!(run(&pile, center).is_empty());
    }

    #[test]
    fn huge_mass_topples_in_full() {
        let center = Cell::new(2, 2);
        let pile = MockPile::new(5, 1.0).with_mass(center, 1e20);
        let d = run(&pile, center);
        assert_eq!(d.get(center), -1e20);
        assert_eq!(d.get(Cell::new(1, 2)), 2.5e19);
        let left = 1e20 + d.get(center);
        assert!(left < 1.0, "center kept {left}");
    }

    #[test]
    fn non_finite_mass_is_an_error() {
        let center = Cell::new(1, 1);
        let pile = MockPile::new(3, 4.0).with_mass(center, f64::INFINITY);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = ToppleContext::new(&pile, &mut rng, StepId(1));
        let err = Symmetric
            .topple(&mut ctx, center, &[Cell::new(0, 1)])
            .unwrap_err();
        assert_eq!(err, RuleError::NonFiniteMass { cell: center });
    }
}
