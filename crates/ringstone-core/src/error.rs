//! Error types for configuration and world distribution

use glam::DVec3;
use thiserror::Error;

use crate::world::features::SizeCategory;
use crate::world::region::RegionId;

/// Invalid distribution configuration, reported before any generation runs.
///
/// Values are never clamped into range; a bad config is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("ring growth factor must be finite and greater than 1.0, got {0}")]
    GrowthFactor(f64),

    #[error("base ring boundaries need at least 2 entries, got {0}")]
    TooFewBoundaries(usize),

    #[error("the first base ring boundary must be 0.0 (the world center), got {0}")]
    InnerBoundaryNotAtCenter(f64),

    #[error("base ring boundary {index} is negative or not finite ({value})")]
    NegativeRadius { index: usize, value: f64 },

    #[error("base ring boundaries must be strictly increasing (index {index}: {value} <= {previous})")]
    NonIncreasingRadius {
        index: usize,
        value: f64,
        previous: f64,
    },

    #[error("minimum spacing for {0:?} must be positive")]
    ZeroSpacing(SizeCategory),

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("corridor width range is empty ({min}..{max})")]
    EmptyWidthRange { min: f64, max: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    /// The injected ring catalog was built from other ring parameters
    #[error("ring catalog parameters do not match the config's rings section")]
    CatalogMismatch,
}

/// Errors produced while resolving regions or generating region content.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldGenError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The ring catalog could not grow far enough to cover a distance.
    ///
    /// Either the growth factor is degenerate or the queried distance is absurd.
    #[error("ring catalog could not cover distance {distance} after {iterations} extensions")]
    RingGrowthExhausted { distance: f64, iterations: usize },

    #[error("position {0:?} is not finite")]
    NonFinitePosition(DVec3),

    #[error("generation of region {0} was cancelled")]
    Cancelled(RegionId),
}

pub type Result<T, E = WorldGenError> = std::result::Result<T, E>;
