//! Rule factory keyed by [`ToppleKind`].

use crate::mean_field::MeanField;
use crate::random::RandomToppling;
use crate::rule::ToppleRule;
use crate::symmetric::Symmetric;
use topple_core::{RuleError, ToppleKind};

/// Rule parameters that only some kinds use.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleParams {
    /// Force-field radius, required by [`ToppleKind::MeanField`].
    pub interaction_radius: Option<u32>,
}

/// Build the rule for `kind`.
///
/// # Errors
///
/// - [`RuleError::UnsupportedRule`] for [`ToppleKind::Potential`], which is
///   a reserved name with no behavior.
/// - [`RuleError::InvalidParameter`] when `MeanField` is requested without
///   an interaction radius or with a zero radius.
pub fn build_rule(kind: ToppleKind, params: &RuleParams) -> Result<Box<dyn ToppleRule>, RuleError> {
    match kind {
        ToppleKind::Symmetric => Ok(Box::new(Symmetric::new())),
        ToppleKind::Random => Ok(Box::new(RandomToppling::new())),
        ToppleKind::MeanField => {
            let radius = params
                .interaction_radius
                .ok_or_else(|| RuleError::InvalidParameter {
                    reason: "mean_field requires interaction_radius".to_string(),
                })?;
            Ok(Box::new(MeanField::new(radius)?))
        }
        ToppleKind::Potential => Err(RuleError::UnsupportedRule { kind }),
    }
}
