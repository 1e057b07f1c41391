//! The [`ToppleRule`] trait.

use crate::context::ToppleContext;
use topple_core::{Cell, Deltas, PileReader, RuleError, ToppleKind};
use topple_state::{DenseField, ForceVector};

/// A strategy for redistributing the mass of one toppling cell.
///
/// # Contract
///
/// - `topple()` reads the pile through the context and returns deltas; it
///   never mutates the pile.
/// - Every cell in the returned [`Deltas`] is either `cell` or one of
///   `neighbours`. The engine passes only in-bounds neighbours, so a rule
///   that respects this never produces an out-of-bounds delta.
/// - Given the same pile, cell, neighbours, and RNG state, the output is
///   identical.
/// - `&self`: rules are stateless after construction; randomness comes
///   from the context's RNG.
///
/// # Object safety
///
/// The engine stores its rule as `Box<dyn ToppleRule>`.
///
/// # Examples
///
/// A rule that dumps the whole cell onto its first neighbour:
///
/// ```
/// use topple_core::{Cell, Deltas, RuleError, ToppleKind};
/// use topple_rules::{ToppleContext, ToppleRule};
///
/// struct DumpNorth;
///
/// impl ToppleRule for DumpNorth {
///     fn name(&self) -> &str { "dump_north" }
///
///     fn kind(&self) -> ToppleKind { ToppleKind::Symmetric }
///
///     fn topple(
///         &self,
///         ctx: &mut ToppleContext<'_>,
///         cell: Cell,
///         neighbours: &[Cell],
///     ) -> Result<Deltas, RuleError> {
///         let mass = ctx.pile().mass(cell);
///         let mut out = Deltas::new();
///         out.add(cell, -mass);
///         if let Some(&nb) = neighbours.first() {
///             out.add(nb, mass);
///         }
///         Ok(out)
///     }
/// }
///
/// assert_eq!(DumpNorth.name(), "dump_north");
/// ```
pub trait ToppleRule: Send + 'static {
    /// Human-readable name for error reporting and logs.
    fn name(&self) -> &str;

    /// The kind this rule implements.
    fn kind(&self) -> ToppleKind;

    /// Compute the mass changes caused by toppling `cell`.
    ///
    /// `neighbours` are the in-bounds von Neumann neighbours of `cell`.
    fn topple(
        &self,
        ctx: &mut ToppleContext<'_>,
        cell: Cell,
        neighbours: &[Cell],
    ) -> Result<Deltas, RuleError>;

    /// Force field to publish after a batch, if this rule maintains one.
    ///
    /// Called by the engine once per step after the batch is applied.
    /// Default: `None` (the state's force field stays as it is).
    fn force_field(&self, _pile: &dyn PileReader) -> Option<DenseField<ForceVector>> {
        None
    }
}
