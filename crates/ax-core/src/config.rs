//! Engine configuration.
//!
//! One explicit [`EngineConfig`] value is built by the application (from
//! defaults, a JSON file and command-line overrides) and passed by reference
//! to every component.  There is no process-wide configuration state.

use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

// ── Weight ────────────────────────────────────────────────────────────────────

/// Which edge attribute is used as the shortest-path cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Weight {
    /// `time_weighted` column, minutes.
    #[default]
    Time,
    /// `length` column, metres.
    Length,
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Weight::Time   => "time",
            Weight::Length => "length",
        })
    }
}

impl FromStr for Weight {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "time" | "time_weighted" => Ok(Weight::Time),
            "length" | "distance"    => Ok(Weight::Length),
            other => Err(CoreError::Parse(format!(
                "invalid weight {other:?}: expected \"time\" or \"length\""
            ))),
        }
    }
}

// ── EstimateMode ──────────────────────────────────────────────────────────────

/// How the reachability estimator pairs sources with required targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EstimateMode {
    /// Each source requires its own k nearest targets.
    SourceNearest,
    /// Each target claims its k nearest sources; a source requires every
    /// target that claimed it.
    #[default]
    TargetClaims,
}

impl FromStr for EstimateMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "source_nearest" | "source-nearest" => Ok(EstimateMode::SourceNearest),
            "target_claims"  | "target-claims"  => Ok(EstimateMode::TargetClaims),
            other => Err(CoreError::Parse(format!(
                "invalid estimate mode {other:?}: expected \"source_nearest\" or \"target_claims\""
            ))),
        }
    }
}

// ── BufferGrowth ──────────────────────────────────────────────────────────────

/// Policy for enlarging a search radius after an insufficient attempt.
///
/// Radii below `small_radius` are padded before multiplying so that tiny
/// starting buffers reach a useful size in a few steps.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferGrowth {
    pub factor:           f64,
    pub small_radius:     f64,
    pub small_radius_pad: f64,
}

impl Default for BufferGrowth {
    fn default() -> Self {
        Self { factor: 2.0, small_radius: 1_000.0, small_radius_pad: 100.0 }
    }
}

impl BufferGrowth {
    /// Unclamped successor of `radius`.
    #[inline]
    pub fn grow(&self, radius: f64) -> f64 {
        if radius < self.small_radius {
            (radius + self.small_radius_pad) * self.factor
        } else {
            radius * self.factor
        }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// All tunable knobs of the routing engine.
///
/// Defaults reproduce the settings used for the national postcode runs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Existing nodes each attached point is connected to.
    pub attach_k: usize,

    /// Neighbours used by the reachability estimator.
    pub estimate_k: usize,

    /// Pairing strategy used by the reachability estimator.
    pub estimate_mode: EstimateMode,

    /// Smallest search half-width in metres; also the buffer given to sources
    /// that no target paired with.
    pub min_buffer: f64,

    /// Half-width at which buffer growth stops and the router accepts a
    /// best-effort subgraph.
    pub max_buffer: f64,

    pub growth: BufferGrowth,

    /// Added to every attachment edge length so no edge has zero length.
    pub connector_epsilon: f64,

    /// Travel speed (km/h) used to derive `time_weighted` for attachment edges.
    pub assumed_speed_kmh: f64,

    pub weight: Weight,

    /// Optional upper bound on path cost, in `weight` units.
    pub cutoff: Option<f64>,

    /// Drop sources that no target claimed (only meaningful for
    /// [`EstimateMode::TargetClaims`]).
    pub drop_unclaimed_sources: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            attach_k:               1,
            estimate_k:             10,
            estimate_mode:          EstimateMode::TargetClaims,
            min_buffer:             5_000.0,
            max_buffer:             500_000.0,
            growth:                 BufferGrowth::default(),
            connector_epsilon:      0.01,
            // (km / 25) * 1.609344 * 60 minutes, written as a plain speed.
            assumed_speed_kmh:      25.0 / 1.609_344,
            weight:                 Weight::Time,
            cutoff:                 None,
            drop_unclaimed_sources: false,
        }
    }
}

impl EngineConfig {
    /// Reject settings that would make routing ill-defined.
    pub fn validate(&self) -> CoreResult<()> {
        fn bad(msg: impl Into<String>) -> CoreResult<()> {
            Err(CoreError::Config(msg.into()))
        }

        if self.attach_k == 0 {
            return bad("attach_k must be at least 1");
        }
        if self.estimate_k == 0 {
            return bad("estimate_k must be at least 1");
        }
        if !(self.min_buffer.is_finite() && self.min_buffer > 0.0) {
            return bad(format!("min_buffer must be positive, got {}", self.min_buffer));
        }
        if !(self.max_buffer.is_finite() && self.max_buffer > 0.0) {
            return bad(format!("max_buffer must be positive, got {}", self.max_buffer));
        }
        if self.min_buffer > self.max_buffer {
            return bad(format!(
                "min_buffer ({}) exceeds max_buffer ({})",
                self.min_buffer, self.max_buffer
            ));
        }
        if !(self.growth.factor.is_finite() && self.growth.factor > 1.0) {
            return bad(format!("growth factor must be > 1, got {}", self.growth.factor));
        }
        if !(self.growth.small_radius_pad.is_finite() && self.growth.small_radius_pad >= 0.0) {
            return bad("growth small_radius_pad must be non-negative");
        }
        if !(self.connector_epsilon.is_finite() && self.connector_epsilon >= 0.0) {
            return bad("connector_epsilon must be non-negative");
        }
        if !(self.assumed_speed_kmh.is_finite() && self.assumed_speed_kmh > 0.0) {
            return bad("assumed_speed_kmh must be positive");
        }
        if let Some(c) = self.cutoff {
            if c.is_nan() || c < 0.0 {
                return bad(format!("cutoff must be non-negative, got {c}"));
            }
        }
        Ok(())
    }

    /// First search half-width for a source with estimated `buffer`.
    #[inline]
    pub fn initial_radius(&self, buffer: f64) -> f64 {
        buffer.max(self.min_buffer)
    }

    /// Next search half-width after an insufficient attempt at `radius`,
    /// clamped to `max_buffer`.  Always strictly greater than `radius` when
    /// `radius < max_buffer`.
    #[inline]
    pub fn next_radius(&self, radius: f64) -> f64 {
        self.growth.grow(radius).min(self.max_buffer)
    }

    /// Travel time in minutes for an attachment edge of `length_m` metres.
    #[inline]
    pub fn connector_time_min(&self, length_m: f64) -> f64 {
        (length_m / 1_000.0) / self.assumed_speed_kmh * 60.0
    }
}
