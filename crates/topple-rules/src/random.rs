//! Stochastic toppling with a seeded multinomial split.

use rand::RngCore;
use rand_distr::{Binomial, Distribution, StandardNormal};
use smallvec::SmallVec;

use crate::context::ToppleContext;
use crate::grain::{grain_size, topple_count};
use crate::rule::ToppleRule;
use topple_core::{Cell, Deltas, RuleError, ToppleKind};

/// Largest grain count drawn with an exact binomial. Beyond it an `f64`
/// no longer holds every integer, so the split uses the normal
/// approximation instead.
const EXACT_GRAINS: f64 = 9_007_199_254_740_992.0; // 2^53

/// Symmetric toppling with randomized grain placement.
///
/// The topple count, the cell's loss, and the number of grains handed out
/// (`topples × neighbours.len()`) are the same as for
/// [`Symmetric`](crate::Symmetric). Each grain then lands on a neighbour
/// drawn uniformly at random, so the expected split matches `Symmetric`
/// while any single realization varies.
///
/// The multinomial is sampled as a chain of binomials, one per neighbour,
/// so the cost of a topple does not grow with the cell's mass.
///
/// All randomness comes from the context RNG. The engine seeds it from the
/// configuration, so runs are reproducible under a fixed seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomToppling;

impl RandomToppling {
    /// Create the rule.
    pub fn new() -> Self {
        Self
    }

    /// Split `grains` uniformly across `slots` bins.
    ///
    /// Each bin in turn takes `Binomial(remaining, 1 / bins_left)`; the last
    /// bin takes whatever remains, so the counts always sum to `grains`.
    pub fn split(
        rng: &mut dyn RngCore,
        grains: f64,
        slots: usize,
    ) -> Result<SmallVec<[f64; 4]>, RuleError> {
        let mut counts: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, slots);
        let mut remaining = grains;
        for (i, count) in counts.iter_mut().enumerate() {
            let left = slots - i;
            if left == 1 {
                *count = remaining;
                break;
            }
            if remaining <= 0.0 {
                break;
            }
            let p = 1.0 / left as f64;
            let drawn = if remaining <= EXACT_GRAINS {
                let binomial = Binomial::new(remaining as u64, p).map_err(|e| {
                    RuleError::InvalidParameter {
                        reason: format!("binomial split: {e}"),
                    }
                })?;
                binomial.sample(rng) as f64
            } else {
                let mean = remaining * p;
                let sd = (remaining * p * (1.0 - p)).sqrt();
                let z: f64 = StandardNormal.sample(rng);
                (mean + sd * z).round().clamp(0.0, remaining)
            };
            *count = drawn;
            remaining -= drawn;
        }
        Ok(counts)
    }
}

impl ToppleRule for RandomToppling {
    fn name(&self) -> &str {
        "random"
    }

    fn kind(&self) -> ToppleKind {
        ToppleKind::Random
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
        let threshold = ctx.pile().threshold();
        let topples = topple_count(mass, threshold);
        if topples == 0.0 {
            return Ok(Deltas::new());
        }

        let mut out = Deltas::with_capacity(neighbours.len() + 1);
        out.add(cell, -topples * threshold);
        if neighbours.is_empty() {
            return Ok(out);
        }

        let grains = topples * neighbours.len() as f64;
        let counts = Self::split(ctx.rng(), grains, neighbours.len())?;

        let grain = grain_size(threshold);
        for (&nb, &n) in neighbours.iter().zip(counts.iter()) {
            out.add(nb, n * grain);
        }
        Ok(out)
    }
}
