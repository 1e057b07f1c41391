//! Toppling-rule kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which toppling rule a simulation uses.
///
/// Parsed from short or long names (`"sym"` / `"symmetric"`,
/// `"rnd"` / `"random"`, `"mf"` / `"mean_field"`, `"potential"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToppleKind {
    /// Deterministic, threshold-quantized, equal share per neighbour.
    #[serde(alias = "sym")]
    Symmetric,
    /// Threshold-quantized with a seeded multinomial split across neighbours.
    #[serde(alias = "rnd")]
    Random,
    /// Full-mass transfer weighted by alignment with the outward direction
    /// from the pile's center of mass.
    #[serde(alias = "mf")]
    MeanField,
    /// Reserved. No rule implements it yet.
    Potential,
}

impl ToppleKind {
    /// Every kind, in declaration order.
    pub const ALL: [ToppleKind; 4] = [
        ToppleKind::Symmetric,
        ToppleKind::Random,
        ToppleKind::MeanField,
        ToppleKind::Potential,
    ];

    /// Canonical name, as accepted by [`FromStr`] and serde.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symmetric => "symmetric",
            Self::Random => "random",
            Self::MeanField => "mean_field",
            Self::Potential => "potential",
        }
    }

    /// Whether a configuration of this kind must carry an interaction radius.
    pub fn requires_interaction_radius(self) -> bool {
        matches!(self, Self::MeanField | Self::Potential)
    }
}

impl fmt::Display for ToppleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name matches no [`ToppleKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseToppleKindError {
    /// The unrecognised name.
    pub name: String,
}

impl fmt::Display for ParseToppleKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown toppling kind '{}' (expected symmetric, random, mean_field or potential)",
            self.name
        )
    }
}

impl std::error::Error for ParseToppleKindError {}

impl FromStr for ToppleKind {
    type Err = ParseToppleKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sym" | "symmetric" => Ok(Self::Symmetric),
            "rnd" | "random" => Ok(Self::Random),
            "mf" | "mean_field" | "meanfield" => Ok(Self::MeanField),
            "potential" => Ok(Self::Potential),
            _ => Err(ParseToppleKindError {
                name: s.to_string(),
            }),
        }
    }
}
