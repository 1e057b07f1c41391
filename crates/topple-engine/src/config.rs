//! Sandpile configuration, validation, and error types.
//!
//! [`SandpileConfig`] is immutable once built. Every construction path,
//! including deserialization, goes through
//! [`SandpileConfigBuilder::build`], so an invalid configuration never
//! exists.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use topple_core::{RuleError, ToppleKind};
use topple_rules::{build_rule, RuleParams, ToppleRule};
use topple_space::{SpaceError, Square4};
use topple_state::State;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a [`SandpileConfig`] or the rule it names.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// A required field was never set.
    MissingField {
        /// Field name as it appears in serialized form.
        field: &'static str,
    },
    /// `grid_size` is zero or exceeds the lattice limit.
    InvalidGridSize {
        /// The rejected size.
        value: u32,
        /// Why the lattice rejected it.
        reason: SpaceError,
    },
    /// `threshold` is NaN, infinite, zero, or negative.
    InvalidThreshold {
        /// The rejected value.
        value: f64,
    },
    /// `initial_chips` is NaN, infinite, zero, or negative.
    InvalidInitialChips {
        /// The rejected value.
        value: f64,
    },
    /// `toppling_kind` names no known kind.
    UnknownToppleKind {
        /// The unrecognized name.
        name: String,
    },
    /// The kind needs a positive `interaction_radius` and none was given.
    MissingInteractionRadius {
        /// The kind that needs it.
        kind: ToppleKind,
    },
    /// The rule for a valid kind could not be constructed.
    Rule(RuleError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::InvalidGridSize { value, reason } => {
                write!(f, "invalid grid_size {value}: {reason}")
            }
            Self::InvalidThreshold { value } => {
                write!(f, "threshold must be finite and positive, got {value}")
            }
            Self::InvalidInitialChips { value } => {
                write!(f, "initial_chips must be finite and positive, got {value}")
            }
            Self::UnknownToppleKind { name } => write!(f, "unknown toppling kind '{name}'"),
            Self::MissingInteractionRadius { kind } => {
                write!(f, "toppling kind '{kind}' requires a positive interaction_radius")
            }
            Self::Rule(e) => write!(f, "rule construction failed: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidGridSize { reason, .. } => Some(reason),
            Self::Rule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RuleError> for ConfigError {
    fn from(e: RuleError) -> Self {
        Self::Rule(e)
    }
}

// ── SandpileConfigBuilder ──────────────────────────────────────────

/// Unvalidated configuration input.
///
/// This is also the serialized form of [`SandpileConfig`]. `toppling_kind`
/// is kept as a name so that an unknown kind surfaces as
/// [`ConfigError::UnknownToppleKind`] from [`build`](Self::build).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandpileConfigBuilder {
    grid_size: Option<u32>,
    threshold: Option<f64>,
    toppling_kind: Option<String>,
    initial_chips: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interaction_radius: Option<u32>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    potential_params: BTreeMap<String, serde_json::Value>,
    seed: u64,
}

impl SandpileConfigBuilder {
    /// Side length of the square grid.
    pub fn grid_size(mut self, size: u32) -> Self {
        self.grid_size = Some(size);
        self
    }

    /// Mass at or above which a cell topples.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Toppling rule variant.
    pub fn toppling_kind(mut self, kind: ToppleKind) -> Self {
        self.toppling_kind = Some(kind.as_str().to_string());
        self
    }

    /// Toppling rule variant by name (`"sym"`, `"random"`, `"mf"`, ...).
    pub fn toppling_kind_name(mut self, name: impl Into<String>) -> Self {
        self.toppling_kind = Some(name.into());
        self
    }

    /// Mass placed on the center cell at time zero.
    pub fn initial_chips(mut self, chips: f64) -> Self {
        self.initial_chips = Some(chips);
        self
    }

    /// Force-field radius for `MeanField` and `Potential`.
    pub fn interaction_radius(mut self, radius: u32) -> Self {
        self.interaction_radius = Some(radius);
        self
    }

    /// Add one `Potential` tuning parameter.
    pub fn potential_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.potential_params.insert(key.into(), value);
        self
    }

    /// Seed for the engine RNG. Default: 0.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate and freeze.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, checked in field order:
    /// grid size, threshold, kind, initial chips, interaction radius.
    pub fn build(self) -> Result<SandpileConfig, ConfigError> {
        let grid_size = self.grid_size.ok_or(ConfigError::MissingField { field: "grid_size" })?;
        let space = Square4::new(grid_size).map_err(|reason| ConfigError::InvalidGridSize {
            value: grid_size,
            reason,
        })?;

        let threshold = self.threshold.ok_or(ConfigError::MissingField { field: "threshold" })?;
        if !is_positive_finite(threshold) {
            return Err(ConfigError::InvalidThreshold { value: threshold });
        }

        let name = self
            .toppling_kind
            .ok_or(ConfigError::MissingField { field: "toppling_kind" })?;
        let kind: ToppleKind = name
            .parse()
            .map_err(|_| ConfigError::UnknownToppleKind { name })?;

        let initial_chips = self
            .initial_chips
            .ok_or(ConfigError::MissingField { field: "initial_chips" })?;
        if !is_positive_finite(initial_chips) {
            return Err(ConfigError::InvalidInitialChips {
                value: initial_chips,
            });
        }

        let interaction_radius = self.interaction_radius.filter(|&r| r > 0);
        if kind.requires_interaction_radius() && interaction_radius.is_none() {
            return Err(ConfigError::MissingInteractionRadius { kind });
        }

        Ok(SandpileConfig {
            space,
            threshold,
            kind,
            initial_chips,
            interaction_radius,
            potential_params: self.potential_params,
            seed: self.seed,
        })
    }
}

fn is_positive_finite(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

// ── SandpileConfig ─────────────────────────────────────────────────

/// Validated, immutable description of one sandpile run.
///
/// ```
/// use topple_core::ToppleKind;
/// use topple_engine::SandpileConfig;
///
/// let config = SandpileConfig::builder()
///     .grid_size(11)
///     .threshold(4.0)
///     .toppling_kind(ToppleKind::Symmetric)
///     .initial_chips(64.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.grid_size(), 11);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SandpileConfigBuilder", into = "SandpileConfigBuilder")]
pub struct SandpileConfig {
    space: Square4,
    threshold: f64,
    kind: ToppleKind,
    initial_chips: f64,
    interaction_radius: Option<u32>,
    potential_params: BTreeMap<String, serde_json::Value>,
    seed: u64,
}

impl SandpileConfig {
    /// Start an empty builder.
    pub fn builder() -> SandpileConfigBuilder {
        SandpileConfigBuilder::default()
    }

    /// The lattice the pile lives on.
    pub fn space(&self) -> Square4 {
        self.space
    }

    /// Side length of the square grid.
    pub fn grid_size(&self) -> u32 {
        self.space.size()
    }

    /// Toppling threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Which rule variant runs.
    pub fn toppling_kind(&self) -> ToppleKind {
        self.kind
    }

    /// Mass seeded on the center cell.
    pub fn initial_chips(&self) -> f64 {
        self.initial_chips
    }

    /// Present (and positive) whenever the kind requires it.
    pub fn interaction_radius(&self) -> Option<u32> {
        self.interaction_radius
    }

    /// Opaque tuning values, only meaningful for `Potential`.
    pub fn potential_params(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.potential_params
    }

    /// Engine RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fresh pile with `initial_chips` on the center cell, which is active.
    pub fn initial_state(&self) -> State {
        State::seeded(self.space, self.threshold, self.initial_chips)
    }

    /// Construct the rule this configuration names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Rule`] wrapping
    /// [`RuleError::UnsupportedRule`] for `Potential`.
    pub fn build_rule(&self) -> Result<Box<dyn ToppleRule>, ConfigError> {
        let params = RuleParams {
            interaction_radius: self.interaction_radius,
        };
        Ok(build_rule(self.kind, &params)?)
    }
}

impl TryFrom<SandpileConfigBuilder> for SandpileConfig {
    type Error = ConfigError;

    fn try_from(builder: SandpileConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

impl From<SandpileConfig> for SandpileConfigBuilder {
    fn from(config: SandpileConfig) -> Self {
        Self {
            grid_size: Some(config.space.size()),
            threshold: Some(config.threshold),
            toppling_kind: Some(config.kind.as_str().to_string()),
            initial_chips: Some(config.initial_chips),
            interaction_radius: config.interaction_radius,
            potential_params: config.potential_params,
            seed: config.seed,
        }
    }
}
