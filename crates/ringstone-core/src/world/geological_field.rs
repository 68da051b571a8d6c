//! Geological noise field - density, bias, hotspots and orientation
//!
//! Six independently seeded FastNoiseLite layers, each built from its
//! `NoiseLayerConfig`. Sampling is a pure function of the position and ring
//! index for a fixed seed, so every thread sees the same field.

use fastnoise_lite::FastNoiseLite;
use glam::{DVec2, DVec3};

use crate::world::worldgen_config::NoiseParams;

/// Lower bound of the density multiplier
pub const MIN_DENSITY: f64 = 0.1;
/// Upper bound of the density multiplier
pub const MAX_DENSITY: f64 = 3.0;

// Raw density noise [-1, 1] maps onto this range
const DENSITY_RANGE: (f64, f64) = (0.3, 1.8);

/// Noise readings at one position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeologicalField {
    /// 0.1 - 3.0, scales acceptance of placement candidates
    pub density_multiplier: f64,
    /// Each component in [-1, 1]
    pub bias: DVec2,
    pub is_hotspot: bool,
    pub is_valley: bool,
    /// 0.0 - 1.0
    pub transition_weight: f64,
}

/// Seeded noise layers shared read-only by all placement searches
pub struct NoiseField {
    seed: u64,
    params: NoiseParams,

    // Base density, fractal
    density_noise: FastNoiseLite,
    // Directional bias
    bias_x_noise: FastNoiseLite,
    bias_z_noise: FastNoiseLite,
    // Hotspot / valley classification
    hotspot_noise: FastNoiseLite,
    transition_noise: FastNoiseLite,
    // Low frequency, neighbors lean alike
    orientation_noise: FastNoiseLite,
}

impl NoiseField {
    pub fn new(seed: u64, params: &NoiseParams) -> Self {
        Self {
            seed,
            params: params.clone(),
            density_noise: params.density.to_fastnoise(seed),
            bias_x_noise: params.bias_x.to_fastnoise(seed),
            bias_z_noise: params.bias_z.to_fastnoise(seed),
            hotspot_noise: params.hotspot.to_fastnoise(seed),
            transition_noise: params.transition.to_fastnoise(seed),
            orientation_noise: params.orientation.to_fastnoise(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Sample every layer at a position
    pub fn sample(&self, position: DVec3, ring_index: u32) -> GeologicalField {
        let (x, z) = (position.x as f32, position.z as f32);

        let raw = self.density_noise.get_noise_2d(x, z) as f64;
        let (low, high) = DENSITY_RANGE;
        let mut density = low + (raw.clamp(-1.0, 1.0) + 1.0) * 0.5 * (high - low);

        let hotspot = self.hotspot_noise.get_noise_2d(x, z) as f64;
        let is_hotspot = hotspot > self.params.hotspot_threshold;
        let is_valley = hotspot < self.params.valley_threshold;
        if is_hotspot {
            density *= self.params.hotspot_multiplier;
        } else if is_valley {
            density *= self.params.valley_multiplier;
        }

        density *= ring_modifier(ring_index);

        let bias = DVec2::new(
            self.bias_x_noise.get_noise_2d(x, z) as f64,
            self.bias_z_noise.get_noise_2d(x, z) as f64,
        );
        let transition = self.transition_noise.get_noise_2d(x, z) as f64;

        GeologicalField {
            density_multiplier: density.clamp(MIN_DENSITY, MAX_DENSITY),
            bias: bias.clamp(DVec2::splat(-1.0), DVec2::splat(1.0)),
            is_hotspot,
            is_valley,
            transition_weight: ((transition + 1.0) * 0.5).clamp(0.0, 1.0),
        }
    }

    /// Two low-frequency samples in [-1, 1] for rotation and scale
    ///
    /// The second sample is read at an offset so the two are uncorrelated.
    pub fn orientation(&self, position: DVec3) -> (f64, f64) {
        let (x, z) = (position.x as f32, position.z as f32);
        let first = self.orientation_noise.get_noise_2d(x, z) as f64;
        let second = self
            .orientation_noise
            .get_noise_2d(x + 1013.0, z - 719.0) as f64;
        (first.clamp(-1.0, 1.0), second.clamp(-1.0, 1.0))
    }
}

/// Sparser near the origin, denser further out
pub fn ring_modifier(ring_index: u32) -> f64 {
    (0.6 + 0.15 * ring_index as f64).min(1.6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(seed: u64) -> NoiseField {
        NoiseField::new(seed, &NoiseParams::default())
    }

    #[test]
    fn test_ring_modifier() {
        assert!((ring_modifier(0) - 0.6).abs() < 1e-12);
        assert!((ring_modifier(2) - 0.9).abs() < 1e-12);
        assert_eq!(ring_modifier(7), 1.6);
        assert_eq!(ring_modifier(100), 1.6);
    }

    #[test]
    fn test_sample_ranges() {
        let field = field(42);
        for i in 0..200 {
            let position = DVec3::new(i as f64 * 13.7 - 900.0, 0.0, i as f64 * -7.3 + 400.0);
            let sample = field.sample(position, (i % 12) as u32);
            assert!((MIN_DENSITY..=MAX_DENSITY).contains(&sample.density_multiplier));
            assert!((0.0..=1.0).contains(&sample.transition_weight));
            assert!(sample.bias.x.abs() <= 1.0 && sample.bias.y.abs() <= 1.0);
            assert!(!(sample.is_hotspot && sample.is_valley));
        }
    }

    #[test]
    fn test_sample_is_deterministic() {
        let a = field(7);
        let b = field(7);
        let position = DVec3::new(123.4, 9.0, -56.7);
        assert_eq!(a.sample(position, 3), b.sample(position, 3));
        assert_eq!(a.orientation(position), b.orientation(position));
    }

    #[test]
    fn test_sample_ignores_height() {
        let field = field(7);
        let low = field.sample(DVec3::new(10.0, -50.0, 10.0), 1);
        let high = field.sample(DVec3::new(10.0, 50.0, 10.0), 1);
        assert_eq!(low, high);
    }

    #[test]
    fn test_seeds_differ() {
        let a = field(1);
        let b = field(2);
        let differs = (0..50).any(|i| {
            let position = DVec3::new(i as f64 * 31.0, 0.0, i as f64 * 17.0);
            a.sample(position, 0) != b.sample(position, 0)
        });
        assert!(differs);
    }

    #[test]
    fn test_high_seed_bits_matter() {
        let low = field(7);
        let high = field(7 | 1 << 32);
        let positions: Vec<DVec3> = (0..100)
            .map(|i| DVec3::new(i as f64 * 23.0 - 1000.0, 0.0, i as f64 * 11.0))
            .collect();
        assert!(
            positions
                .iter()
                .any(|&p| low.sample(p, 2) != high.sample(p, 2))
        );
        assert!(
            positions
                .iter()
                .any(|&p| low.orientation(p) != high.orientation(p))
        );
    }

    #[test]
    fn test_orientation_is_smooth() {
        let field = field(99);
        let (a, _) = field.orientation(DVec3::new(100.0, 0.0, 100.0));
        let (b, _) = field.orientation(DVec3::new(100.5, 0.0, 100.5));
        assert!((a - b).abs() < 0.1);
    }
}
