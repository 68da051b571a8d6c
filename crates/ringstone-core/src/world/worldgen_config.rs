//! Distribution configuration - serializable parameters for region generation
//!
//! This module provides data structures that capture every tunable of the
//! distribution pipeline, enabling:
//! - Serialization to RON format for presets
//! - Fail-fast validation before a single region is generated
//! - Configuration-driven noise layers
//!
//! The seed is NOT part of the config - same config + different seed = different world.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::world::features::SizeCategory;

/// Complete distribution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Display name for this configuration
    pub name: String,

    /// Ring layout and procedural ring growth
    pub rings: RingParams,

    /// Geological noise layers
    pub noise: NoiseParams,

    /// Candidate search and validation
    pub placement: PlacementParams,

    /// Clearing detection and discovery zone synthesis
    pub zones: ZoneParams,

    /// Corridors between discovery zones
    pub corridors: CorridorParams,
}

/// Ring boundaries and growth beyond the base set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingParams {
    /// Boundaries of the base rings, starting at the world center
    /// (default: [0, 50, 120, 220, 350] = 4 base rings)
    pub base_boundaries: Vec<f64>,
    /// `outer = inner * growth_factor` for procedural rings (default: 1.3)
    pub growth_factor: f64,
    /// Width of the blend band straddling each ring boundary (default: 10.0)
    pub transition_width: f64,
    /// Hard cap on catalog extensions per lookup (default: 1000)
    pub max_extension_iterations: usize,
    /// Content density of the base rings, one entry per base ring
    /// (default: [1.0, 1.1, 1.25, 1.4])
    pub base_content_density: Vec<f64>,
    /// Content density added per procedural ring (default: 0.08)
    pub content_density_step: f64,
    /// Content density ceiling (default: 3.0)
    pub max_content_density: f64,
    /// Difficulty ceiling (default: 10)
    pub max_difficulty: u8,
}

/// Noise layers and the thresholds applied to them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Base density layer (fractal)
    pub density: NoiseLayerConfig,
    /// Directional bias, x component
    pub bias_x: NoiseLayerConfig,
    /// Directional bias, z component
    pub bias_z: NoiseLayerConfig,
    /// Hotspot/valley classification layer
    pub hotspot: NoiseLayerConfig,
    /// Transition weight layer
    pub transition: NoiseLayerConfig,
    /// Low-frequency orientation layer (rotation and scale)
    pub orientation: NoiseLayerConfig,
    /// Hotspot threshold (default: 0.6)
    pub hotspot_threshold: f64,
    /// Valley threshold (default: -0.5)
    pub valley_threshold: f64,
    /// Density multiplier inside hotspots (default: 2.2)
    pub hotspot_multiplier: f64,
    /// Density multiplier inside valleys (default: 0.2)
    pub valley_multiplier: f64,
    /// Displacement in world units applied along the bias vector (default: 6.0)
    pub bias_strength: f64,
}

/// Candidate search limits and validation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementParams {
    /// Attempts per feature before it is skipped (default: 50)
    pub max_attempts: u32,
    /// Minimum distance from the world center, keeps spawn clear (default: 8.0)
    pub min_origin_distance: f64,
    /// Minimum spacing per size category
    pub spacing: SpacingTable,
    /// Terrain below this height counts as water/invalid (default: -1.0)
    pub min_valid_height: f64,
    /// Maximum rise over run at a candidate (default: 1.5)
    pub max_slope: f64,
    /// Distance of the slope probes from the candidate (default: 1.0)
    pub slope_probe: f64,
    /// Landmark chance for Large/Massive features in landmark formations (default: 0.3)
    pub landmark_chance: f64,
    /// Lowest acceptance probability in sparse noise (default: 0.25)
    pub min_density_acceptance: f64,
}

/// Minimum spacing between features, keyed by size category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacingTable {
    pub tiny: f64,
    pub small: f64,
    pub medium: f64,
    pub large: f64,
    pub massive: f64,
}

/// Clearing detection and zone synthesis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneParams {
    /// Grid step for clearing detection (default: 10.0)
    pub grid_resolution: f64,
    /// Minimum clearance for a clearing candidate (default: 8.0)
    pub clearance_threshold: f64,
    /// Radius cap for open clearings (default: 25.0)
    pub max_zone_radius: f64,
    /// Clearance an entry segment needs from every feature (default: 4.5)
    pub entry_clearance: f64,
    /// Entry point distance from the center, as a fraction of the radius (default: 0.8)
    pub entry_radius_factor: f64,
    /// Fewest entry directions probed (default: 4)
    pub min_entry_directions: u32,
    /// Most entry directions probed (default: 8)
    pub max_entry_directions: u32,
    /// Radius for counting nearby obstacles (default: 20.0)
    pub nearby_radius: f64,
    /// Zones closer to the origin than this may become settlements (default: 150.0)
    pub settlement_distance: f64,
    /// Radius at or above which a zone counts as large (default: 15.0)
    pub large_zone_radius: f64,
    /// Radius below which a zone counts as small (default: 12.0)
    pub small_zone_radius: f64,
}

/// Corridor generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorParams {
    /// Only zone pairs closer than this get connected (default: 50.0)
    pub max_connection_distance: f64,
    /// Narrowest corridor (default: 3.0)
    pub min_width: f64,
    /// Widest corridor (default: 6.0)
    pub max_width: f64,
    /// Approximate length of one path segment (default: 8.0)
    pub segment_length: f64,
    /// Sideways perturbation as a fraction of the zone distance (default: 0.2)
    pub offset_fraction: f64,
    /// Absolute cap on sideways perturbation (default: 6.0)
    pub max_offset: f64,
    /// Clearance every path point keeps from every feature (default: 4.5)
    pub clearance: f64,
    /// Perturbation re-samples per path point (default: 10)
    pub max_point_retries: u32,
    /// Landmark offset from the path, lower bound (default: 1.5)
    pub landmark_offset_min: f64,
    /// Landmark offset from the path, upper bound (default: 3.0)
    pub landmark_offset_max: f64,
    /// Extra distance of corridor markers beyond half the width (default: 1.0)
    pub marker_margin: f64,
}

/// Reusable noise layer configuration
///
/// Abstracts FastNoiseLite settings for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayerConfig {
    /// Offset added to world seed for this layer
    pub seed_offset: i32,
    /// Noise algorithm type
    pub noise_type: NoiseTypeConfig,
    /// Base frequency (lower = larger features)
    pub frequency: f32,
    /// Fractal combination type
    pub fractal_type: FractalTypeConfig,
    /// Number of fractal octaves (1-8)
    pub octaves: u8,
    /// Frequency multiplier per octave (default: 2.0)
    pub lacunarity: f32,
    /// Amplitude multiplier per octave / persistence (default: 0.5)
    pub gain: f32,
}

/// Noise algorithm types (maps to FastNoiseLite::NoiseType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoiseTypeConfig {
    OpenSimplex2,
    OpenSimplex2S,
    Cellular,
    Perlin,
    ValueCubic,
    Value,
}

/// Fractal combination types (maps to FastNoiseLite::FractalType)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractalTypeConfig {
    None,
    FBm,
    Ridged,
    PingPong,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            rings: RingParams::default(),
            noise: NoiseParams::default(),
            placement: PlacementParams::default(),
            zones: ZoneParams::default(),
            corridors: CorridorParams::default(),
        }
    }
}

impl Default for RingParams {
    fn default() -> Self {
        Self {
            base_boundaries: vec![0.0, 50.0, 120.0, 220.0, 350.0],
            growth_factor: 1.3,
            transition_width: 10.0,
            max_extension_iterations: 1000,
            base_content_density: vec![1.0, 1.1, 1.25, 1.4],
            content_density_step: 0.08,
            max_content_density: 3.0,
            max_difficulty: 10,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            density: NoiseLayerConfig {
                seed_offset: 0,
                frequency: 0.012,
                fractal_type: FractalTypeConfig::FBm,
                octaves: 3,
                ..NoiseLayerConfig::default()
            },
            bias_x: NoiseLayerConfig {
                seed_offset: 1,
                frequency: 0.02,
                ..NoiseLayerConfig::default()
            },
            bias_z: NoiseLayerConfig {
                seed_offset: 2,
                frequency: 0.02,
                ..NoiseLayerConfig::default()
            },
            hotspot: NoiseLayerConfig {
                seed_offset: 3,
                frequency: 0.006,
                ..NoiseLayerConfig::default()
            },
            transition: NoiseLayerConfig {
                seed_offset: 4,
                frequency: 0.03,
                ..NoiseLayerConfig::default()
            },
            orientation: NoiseLayerConfig {
                seed_offset: 5,
                frequency: 0.008,
                ..NoiseLayerConfig::default()
            },
            hotspot_threshold: 0.6,
            valley_threshold: -0.5,
            hotspot_multiplier: 2.2,
            valley_multiplier: 0.2,
            bias_strength: 6.0,
        }
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            max_attempts: 50,
            min_origin_distance: 8.0,
            spacing: SpacingTable::default(),
            min_valid_height: -1.0,
            max_slope: 1.5,
            slope_probe: 1.0,
            landmark_chance: 0.3,
            min_density_acceptance: 0.25,
        }
    }
}

impl Default for SpacingTable {
    fn default() -> Self {
        Self {
            tiny: 2.0,
            small: 3.0,
            medium: 4.5,
            large: 6.0,
            massive: 8.0,
        }
    }
}

impl Default for ZoneParams {
    fn default() -> Self {
        Self {
            grid_resolution: 10.0,
            clearance_threshold: 8.0,
            max_zone_radius: 25.0,
            entry_clearance: 4.5,
            entry_radius_factor: 0.8,
            min_entry_directions: 4,
            max_entry_directions: 8,
            nearby_radius: 20.0,
            settlement_distance: 150.0,
            large_zone_radius: 15.0,
            small_zone_radius: 12.0,
        }
    }
}

impl Default for CorridorParams {
    fn default() -> Self {
        Self {
            max_connection_distance: 50.0,
            min_width: 3.0,
            max_width: 6.0,
            segment_length: 8.0,
            offset_fraction: 0.2,
            max_offset: 6.0,
            clearance: 4.5,
            max_point_retries: 10,
            landmark_offset_min: 1.5,
            landmark_offset_max: 3.0,
            marker_margin: 1.0,
        }
    }
}

impl Default for NoiseLayerConfig {
    fn default() -> Self {
        Self {
            seed_offset: 0,
            noise_type: NoiseTypeConfig::OpenSimplex2,
            frequency: 0.01,
            fractal_type: FractalTypeConfig::None,
            octaves: 1,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

impl NoiseTypeConfig {
    /// Convert to fastnoise_lite::NoiseType
    pub fn to_fastnoise(&self) -> fastnoise_lite::NoiseType {
        match self {
            NoiseTypeConfig::OpenSimplex2 => fastnoise_lite::NoiseType::OpenSimplex2,
            NoiseTypeConfig::OpenSimplex2S => fastnoise_lite::NoiseType::OpenSimplex2S,
            NoiseTypeConfig::Cellular => fastnoise_lite::NoiseType::Cellular,
            NoiseTypeConfig::Perlin => fastnoise_lite::NoiseType::Perlin,
            NoiseTypeConfig::ValueCubic => fastnoise_lite::NoiseType::ValueCubic,
            NoiseTypeConfig::Value => fastnoise_lite::NoiseType::Value,
        }
    }
}

impl FractalTypeConfig {
    /// Convert to fastnoise_lite::FractalType
    pub fn to_fastnoise(&self) -> fastnoise_lite::FractalType {
        match self {
            FractalTypeConfig::None => fastnoise_lite::FractalType::None,
            FractalTypeConfig::FBm => fastnoise_lite::FractalType::FBm,
            FractalTypeConfig::Ridged => fastnoise_lite::FractalType::Ridged,
            FractalTypeConfig::PingPong => fastnoise_lite::FractalType::PingPong,
        }
    }
}

impl NoiseLayerConfig {
    /// Create a FastNoiseLite instance from this config
    pub fn to_fastnoise(&self, base_seed: u64) -> fastnoise_lite::FastNoiseLite {
        // FastNoiseLite seeds are i32; fold the high half in so no seed bits are lost
        let folded = (base_seed ^ (base_seed >> 32)) as i32;
        let mut noise =
            fastnoise_lite::FastNoiseLite::with_seed(folded.wrapping_add(self.seed_offset));
        noise.set_noise_type(Some(self.noise_type.to_fastnoise()));
        noise.set_frequency(Some(self.frequency));
        noise.set_fractal_type(Some(self.fractal_type.to_fastnoise()));
        noise.set_fractal_octaves(Some(self.octaves as i32));
        noise.set_fractal_lacunarity(Some(self.lacunarity));
        noise.set_fractal_gain(Some(self.gain));
        noise
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.frequency > 0.0 && self.frequency.is_finite()) {
            return Err(ConfigError::NonPositive {
                field,
                value: self.frequency as f64,
            });
        }
        if self.octaves == 0 {
            return Err(ConfigError::ZeroCount { field });
        }
        Ok(())
    }
}

impl SpacingTable {
    /// Minimum spacing for a size category
    pub fn for_size(&self, size: SizeCategory) -> f64 {
        match size {
            SizeCategory::Tiny => self.tiny,
            SizeCategory::Small => self.small,
            SizeCategory::Medium => self.medium,
            SizeCategory::Large => self.large,
            SizeCategory::Massive => self.massive,
        }
    }

    /// Largest spacing of any category (search radius for spacing queries)
    pub fn max_spacing(&self) -> f64 {
        SizeCategory::all()
            .iter()
            .map(|&size| self.for_size(size))
            .fold(0.0, f64::max)
    }
}

// ============================================================================
// Validation
// ============================================================================

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn unit_range(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { field, value })
    }
}

impl RingParams {
    /// Number of predefined rings
    pub fn base_ring_count(&self) -> usize {
        self.base_boundaries.len().saturating_sub(1)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(self.growth_factor.is_finite() && self.growth_factor > 1.0) {
            return Err(ConfigError::GrowthFactor(self.growth_factor));
        }
        if self.base_boundaries.len() < 2 {
            return Err(ConfigError::TooFewBoundaries(self.base_boundaries.len()));
        }
        for (index, &value) in self.base_boundaries.iter().enumerate() {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::NegativeRadius { index, value });
            }
            if index == 0 && value != 0.0 {
                return Err(ConfigError::InnerBoundaryNotAtCenter(value));
            }
            if index > 0 {
                let previous = self.base_boundaries[index - 1];
                if value <= previous {
                    return Err(ConfigError::NonIncreasingRadius {
                        index,
                        value,
                        previous,
                    });
                }
            }
        }
        if self.base_content_density.len() != self.base_ring_count() {
            return Err(ConfigError::ZeroCount {
                field: "rings.base_content_density (one entry per base ring)",
            });
        }
        for &density in &self.base_content_density {
            positive("rings.base_content_density", density)?;
        }
        non_negative("rings.transition_width", self.transition_width)?;
        non_negative("rings.content_density_step", self.content_density_step)?;
        positive("rings.max_content_density", self.max_content_density)?;
        if self.max_extension_iterations == 0 {
            return Err(ConfigError::ZeroCount {
                field: "rings.max_extension_iterations",
            });
        }
        if self.max_difficulty == 0 {
            return Err(ConfigError::ZeroCount {
                field: "rings.max_difficulty",
            });
        }
        Ok(())
    }
}

impl DistributionConfig {
    /// Check every parameter; the first problem found is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rings.validate()?;

        let noise = &self.noise;
        noise.density.validate("noise.density")?;
        noise.bias_x.validate("noise.bias_x")?;
        noise.bias_z.validate("noise.bias_z")?;
        noise.hotspot.validate("noise.hotspot")?;
        noise.transition.validate("noise.transition")?;
        noise.orientation.validate("noise.orientation")?;
        positive("noise.hotspot_multiplier", noise.hotspot_multiplier)?;
        positive("noise.valley_multiplier", noise.valley_multiplier)?;
        non_negative("noise.bias_strength", noise.bias_strength)?;

        let placement = &self.placement;
        if placement.max_attempts == 0 {
            return Err(ConfigError::ZeroCount {
                field: "placement.max_attempts",
            });
        }
        for &size in SizeCategory::all() {
            let spacing = placement.spacing.for_size(size);
            if !(spacing > 0.0 && spacing.is_finite()) {
                return Err(ConfigError::ZeroSpacing(size));
            }
        }
        non_negative("placement.min_origin_distance", placement.min_origin_distance)?;
        positive("placement.max_slope", placement.max_slope)?;
        positive("placement.slope_probe", placement.slope_probe)?;
        unit_range("placement.landmark_chance", placement.landmark_chance)?;
        unit_range(
            "placement.min_density_acceptance",
            placement.min_density_acceptance,
        )?;

        let zones = &self.zones;
        positive("zones.grid_resolution", zones.grid_resolution)?;
        positive("zones.clearance_threshold", zones.clearance_threshold)?;
        positive("zones.max_zone_radius", zones.max_zone_radius)?;
        positive("zones.entry_clearance", zones.entry_clearance)?;
        positive("zones.entry_radius_factor", zones.entry_radius_factor)?;
        non_negative("zones.nearby_radius", zones.nearby_radius)?;
        if zones.min_entry_directions < 2 || zones.max_entry_directions < zones.min_entry_directions
        {
            return Err(ConfigError::ZeroCount {
                field: "zones.min_entry_directions (>= 2, <= max_entry_directions)",
            });
        }

        let corridors = &self.corridors;
        positive(
            "corridors.max_connection_distance",
            corridors.max_connection_distance,
        )?;
        positive("corridors.min_width", corridors.min_width)?;
        if !(corridors.max_width >= corridors.min_width && corridors.max_width.is_finite()) {
            return Err(ConfigError::EmptyWidthRange {
                min: corridors.min_width,
                max: corridors.max_width,
            });
        }
        positive("corridors.segment_length", corridors.segment_length)?;
        positive("corridors.clearance", corridors.clearance)?;
        non_negative("corridors.offset_fraction", corridors.offset_fraction)?;
        non_negative("corridors.max_offset", corridors.max_offset)?;
        non_negative("corridors.landmark_offset_min", corridors.landmark_offset_min)?;
        if corridors.landmark_offset_max < corridors.landmark_offset_min {
            return Err(ConfigError::EmptyWidthRange {
                min: corridors.landmark_offset_min,
                max: corridors.landmark_offset_max,
            });
        }
        if corridors.max_point_retries == 0 {
            return Err(ConfigError::ZeroCount {
                field: "corridors.max_point_retries",
            });
        }

        Ok(())
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize distribution config")
    }

    /// Parse and validate a RON document
    pub fn from_ron(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).context("Failed to parse distribution config")?;
        config
            .validate()
            .context("Distribution config failed validation")?;
        Ok(config)
    }
}

// ============================================================================
// Preset helpers
// ============================================================================

impl DistributionConfig {
    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "sparse" => Some(Self::preset_sparse()),
            "dense" => Some(Self::preset_dense()),
            "wide_rings" | "wide-rings" => Some(Self::preset_wide_rings()),
            _ => None,
        }
    }

    /// Open landscape: wider spacing, bigger clearings
    pub fn preset_sparse() -> Self {
        Self {
            name: "Sparse".to_string(),
            placement: PlacementParams {
                spacing: SpacingTable {
                    tiny: 3.0,
                    small: 4.5,
                    medium: 6.0,
                    large: 8.0,
                    massive: 11.0,
                },
                ..PlacementParams::default()
            },
            zones: ZoneParams {
                max_zone_radius: 30.0,
                ..ZoneParams::default()
            },
            ..Self::default()
        }
    }

    /// Crowded rock fields: tight spacing, finer clearing grid
    pub fn preset_dense() -> Self {
        Self {
            name: "Dense".to_string(),
            placement: PlacementParams {
                max_attempts: 80,
                spacing: SpacingTable {
                    tiny: 1.5,
                    small: 2.0,
                    medium: 3.0,
                    large: 4.5,
                    massive: 6.0,
                },
                min_density_acceptance: 0.4,
                ..PlacementParams::default()
            },
            zones: ZoneParams {
                grid_resolution: 8.0,
                ..ZoneParams::default()
            },
            ..Self::default()
        }
    }

    /// Faster ring growth, fewer procedural rings for the same distance
    pub fn preset_wide_rings() -> Self {
        Self {
            name: "Wide Rings".to_string(),
            rings: RingParams {
                growth_factor: 1.4,
                transition_width: 16.0,
                ..RingParams::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DistributionConfig::default();
        assert_eq!(config.name, "Default");
        assert_eq!(config.rings.base_ring_count(), 4);
        assert_eq!(config.placement.max_attempts, 50);
        assert_eq!(config.corridors.max_point_retries, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_growth_factor_must_exceed_one() {
        let mut config = DistributionConfig::default();
        config.rings.growth_factor = 1.0;
        assert_eq!(config.validate(), Err(ConfigError::GrowthFactor(1.0)));

        config.rings.growth_factor = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GrowthFactor(_))
        ));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut config = DistributionConfig::default();
        config.rings.base_boundaries[0] = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeRadius { index: 0, .. })
        ));
    }

    #[test]
    fn test_non_increasing_radius_rejected() {
        let mut config = DistributionConfig::default();
        config.rings.base_boundaries[2] = 50.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonIncreasingRadius { index: 2, .. })
        ));
    }

    #[test]
    fn test_zero_spacing_rejected() {
        let mut config = DistributionConfig::default();
        config.placement.spacing.medium = 0.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroSpacing(SizeCategory::Medium))
        );
    }

    #[test]
    fn test_empty_width_range_rejected() {
        let mut config = DistributionConfig::default();
        config.corridors.max_width = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyWidthRange { .. })
        ));
    }

    #[test]
    fn test_density_table_must_match_rings() {
        let mut config = DistributionConfig::default();
        config.rings.base_content_density.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spacing_table() {
        let spacing = SpacingTable::default();
        assert_eq!(spacing.for_size(SizeCategory::Tiny), 2.0);
        assert_eq!(spacing.for_size(SizeCategory::Massive), 8.0);
        assert_eq!(spacing.max_spacing(), 8.0);
    }

    #[test]
    fn test_noise_config_to_fastnoise() {
        let config = NoiseLayerConfig::default();
        let noise = config.to_fastnoise(42);
        let value = noise.get_noise_2d(12.5, -3.0);
        assert!((-1.0..=1.0).contains(&value));

        // Seeds near the i32 boundary must not overflow
        let noise = config.to_fastnoise(i32::MAX as u64);
        assert!((-1.0..=1.0).contains(&noise.get_noise_2d(0.0, 0.0)));

        // Seed offset decorrelates layers sharing a base seed
        let shifted = NoiseLayerConfig {
            seed_offset: config.seed_offset + 1,
            ..config.clone()
        }
        .to_fastnoise(42);
        let base = config.to_fastnoise(42);
        let differs = (0..32).any(|i| {
            let (x, y) = (i as f32 * 7.3, i as f32 * -4.1);
            base.get_noise_2d(x, y) != shifted.get_noise_2d(x, y)
        });
        assert!(differs);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = DistributionConfig::preset_dense();
        let serialized = config.to_ron().expect("Failed to serialize");
        let deserialized = DistributionConfig::from_ron(&serialized).expect("Failed to parse");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_from_ron_validates() {
        let mut config = DistributionConfig::default();
        config.rings.growth_factor = 0.9;
        let serialized = config.to_ron().expect("Failed to serialize");
        assert!(DistributionConfig::from_ron(&serialized).is_err());
    }

    #[test]
    fn test_presets() {
        for name in ["default", "sparse", "dense", "wide_rings"] {
            let preset = DistributionConfig::preset(name).expect("preset exists");
            assert!(preset.validate().is_ok(), "preset {name} must validate");
        }
        assert!(DistributionConfig::preset("volcanic").is_none());

        let wide = DistributionConfig::preset_wide_rings();
        assert!(wide.rings.growth_factor > DistributionConfig::default().rings.growth_factor);
    }
}
