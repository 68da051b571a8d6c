//! Ring catalog - base rings plus lazily generated rings out to any distance
//!
//! Rings are stored contiguously by index. The catalog only ever appends, so a
//! definition handed out once never changes. Rings beyond the base set grow
//! geometrically (`outer = inner * growth_factor`), which keeps the ring count
//! small for reachable distances while the world stays unbounded.
//!
//! The catalog also owns the ledger of regions whose content already exists,
//! letting the orchestrator skip regions it has generated before.

use ahash::AHashSet;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, WorldGenError};
use crate::world::region::RegionId;
use crate::world::worldgen_config::{DistributionConfig, RingParams};

/// Visual/ecological style of a ring, ordered by distance from the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BiomeStyle {
    Meadow,
    Highland,
    Badlands,
    Wasteland,
    Primordial,
}

impl BiomeStyle {
    /// Style for a ring index (monotonic non-decreasing)
    pub fn for_ring(index: u32) -> Self {
        match index {
            0 => BiomeStyle::Meadow,
            1 => BiomeStyle::Highland,
            2..=3 => BiomeStyle::Badlands,
            4..=7 => BiomeStyle::Wasteland,
            _ => BiomeStyle::Primordial,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BiomeStyle::Meadow => "Meadow",
            BiomeStyle::Highland => "Highland",
            BiomeStyle::Badlands => "Badlands",
            BiomeStyle::Wasteland => "Wasteland",
            BiomeStyle::Primordial => "Primordial",
        }
    }
}

/// One ring of the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingDefinition {
    pub index: u32,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// 1..=max_difficulty
    pub difficulty: u8,
    pub biome_style: BiomeStyle,
    /// Multiplier on the base feature count
    pub content_density: f64,
}

impl RingDefinition {
    /// Inner boundary inclusive, outer boundary exclusive
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.inner_radius && distance < self.outer_radius
    }

    pub fn width(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) * 0.5
    }
}

/// Thread-safe, append-only ring storage plus the generated-region ledger
#[derive(Debug)]
pub struct RingCatalog {
    params: RingParams,
    rings: RwLock<Vec<RingDefinition>>,
    generated: RwLock<AHashSet<RegionId>>,
}

impl RingCatalog {
    /// Create a catalog holding the base rings
    pub fn new(params: RingParams) -> Result<Self, ConfigError> {
        params.validate()?;

        let rings = params
            .base_boundaries
            .windows(2)
            .zip(&params.base_content_density)
            .enumerate()
            .map(|(index, (bounds, &density))| RingDefinition {
                index: index as u32,
                inner_radius: bounds[0],
                outer_radius: bounds[1],
                difficulty: ((index + 1) as u8).min(params.max_difficulty),
                biome_style: BiomeStyle::for_ring(index as u32),
                content_density: density.min(params.max_content_density),
            })
            .collect();

        Ok(Self {
            params,
            rings: RwLock::new(rings),
            generated: RwLock::new(AHashSet::new()),
        })
    }

    /// Create a catalog from a full distribution config (validates all of it)
    pub fn from_config(config: &DistributionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(config.rings.clone())
    }

    pub fn params(&self) -> &RingParams {
        &self.params
    }

    /// Number of ring definitions currently memoized
    pub fn cached_ring_count(&self) -> usize {
        self.rings.read().len()
    }

    /// Definition of a ring, extending the catalog if needed
    pub fn ring_definition(&self, index: u32) -> Result<RingDefinition> {
        if let Some(ring) = self.rings.read().get(index as usize) {
            return Ok(ring.clone());
        }

        let mut rings = self.rings.write();
        let mut iterations = 0;
        while rings.len() <= index as usize {
            if iterations >= self.params.max_extension_iterations {
                return Err(WorldGenError::RingGrowthExhausted {
                    distance: rings.last().map_or(0.0, |r| r.outer_radius),
                    iterations,
                });
            }
            let next = self.next_ring(&rings, iterations)?;
            rings.push(next);
            iterations += 1;
        }
        Ok(rings[index as usize].clone())
    }

    /// Ring whose `[inner, outer)` interval contains `distance`
    pub fn ring_containing(&self, distance: f64) -> Result<RingDefinition> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(WorldGenError::RingGrowthExhausted {
                distance,
                iterations: 0,
            });
        }

        {
            let rings = self.rings.read();
            if let Some(last) = rings.last()
                && distance < last.outer_radius
            {
                let index = rings.partition_point(|ring| ring.outer_radius <= distance);
                return Ok(rings[index].clone());
            }
        }

        let mut rings = self.rings.write();
        let mut iterations = 0;
        loop {
            // Another thread may have extended far enough while we waited
            if let Some(last) = rings.last()
                && distance < last.outer_radius
            {
                let index = rings.partition_point(|ring| ring.outer_radius <= distance);
                return Ok(rings[index].clone());
            }
            if iterations >= self.params.max_extension_iterations {
                return Err(WorldGenError::RingGrowthExhausted {
                    distance,
                    iterations,
                });
            }
            let next = self.next_ring(&rings, iterations)?;
            rings.push(next);
            iterations += 1;
        }
    }

    fn next_ring(&self, rings: &[RingDefinition], iterations: usize) -> Result<RingDefinition> {
        let base_count = self.params.base_ring_count();
        let last = rings
            .last()
            .ok_or(ConfigError::TooFewBoundaries(self.params.base_boundaries.len()))?;

        let index = last.index + 1;
        let inner_radius = last.outer_radius;
        let outer_radius = inner_radius * self.params.growth_factor;
        if !outer_radius.is_finite() {
            return Err(WorldGenError::RingGrowthExhausted {
                distance: inner_radius,
                iterations,
            });
        }

        let procedural_step = (index as usize + 1).saturating_sub(base_count) as f64;
        let base_density = self
            .params
            .base_content_density
            .last()
            .copied()
            .unwrap_or(1.0);
        let content_density = (base_density + self.params.content_density_step * procedural_step)
            .min(self.params.max_content_density)
            .max(last.content_density);

        let difficulty = (index.saturating_add(1).min(u8::MAX as u32) as u8)
            .min(self.params.max_difficulty)
            .max(last.difficulty);

        log::debug!(
            "Extended ring catalog to ring {} ({:.1} - {:.1})",
            index,
            inner_radius,
            outer_radius
        );

        Ok(RingDefinition {
            index,
            inner_radius,
            outer_radius,
            difficulty,
            biome_style: BiomeStyle::for_ring(index).max(last.biome_style),
            content_density,
        })
    }

    // ------------------------------------------------------------------
    // Generated-region ledger
    // ------------------------------------------------------------------

    /// Record a region as generated. Returns false if it already was.
    pub fn mark_region_generated(&self, region: RegionId) -> bool {
        self.generated.write().insert(region)
    }

    pub fn is_region_generated(&self, region: RegionId) -> bool {
        self.generated.read().contains(&region)
    }

    /// Drop a region from the ledger so it will be generated again
    pub fn forget_region(&self, region: RegionId) -> bool {
        self.generated.write().remove(&region)
    }

    /// All generated regions, sorted
    pub fn generated_regions(&self) -> Vec<RegionId> {
        let mut regions: Vec<RegionId> = self.generated.read().iter().copied().collect();
        regions.sort();
        regions
    }

    /// Merge previously saved regions into the ledger
    pub fn restore_generated(&self, regions: impl IntoIterator<Item = RegionId>) {
        self.generated.write().extend(regions);
    }

    pub fn clear_generated(&self) {
        self.generated.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::region::Quadrant;

    fn catalog() -> RingCatalog {
        RingCatalog::new(RingParams::default()).expect("default params are valid")
    }

    #[test]
    fn test_base_rings() {
        let catalog = catalog();
        assert_eq!(catalog.cached_ring_count(), 4);

        let ring0 = catalog.ring_definition(0).unwrap();
        assert_eq!(ring0.inner_radius, 0.0);
        assert_eq!(ring0.outer_radius, 50.0);
        assert_eq!(ring0.difficulty, 1);
        assert_eq!(ring0.biome_style, BiomeStyle::Meadow);
        assert_eq!(ring0.content_density, 1.0);

        let ring3 = catalog.ring_definition(3).unwrap();
        assert_eq!(ring3.inner_radius, 220.0);
        assert_eq!(ring3.outer_radius, 350.0);
    }

    #[test]
    fn test_ring_contains_is_half_open() {
        let ring = catalog().ring_definition(1).unwrap();
        assert!(ring.contains(50.0));
        assert!(ring.contains(119.999));
        assert!(!ring.contains(120.0));
        assert!(!ring.contains(49.999));
    }

    #[test]
    fn test_geometric_growth() {
        let catalog = catalog();
        let ring4 = catalog.ring_definition(4).unwrap();
        assert_eq!(ring4.inner_radius, 350.0);
        assert!((ring4.outer_radius - 455.0).abs() < 1e-9);

        let ring5 = catalog.ring_definition(5).unwrap();
        assert_eq!(ring5.inner_radius, ring4.outer_radius);
        assert!(ring5.width() > ring4.width());
    }

    #[test]
    fn test_monotonic_attributes() {
        let catalog = catalog();
        let mut previous = catalog.ring_definition(0).unwrap();
        for index in 1..40 {
            let ring = catalog.ring_definition(index).unwrap();
            assert_eq!(ring.inner_radius, previous.outer_radius);
            assert!(ring.outer_radius > previous.outer_radius);
            assert!(ring.difficulty >= previous.difficulty);
            assert!(ring.difficulty <= 10);
            assert!(ring.biome_style >= previous.biome_style);
            assert!(ring.content_density >= previous.content_density);
            assert!(ring.content_density <= 3.0);
            previous = ring;
        }
    }

    #[test]
    fn test_ring_containing() {
        let catalog = catalog();
        assert_eq!(catalog.ring_containing(0.0).unwrap().index, 0);
        assert_eq!(catalog.ring_containing(49.9).unwrap().index, 0);
        assert_eq!(catalog.ring_containing(50.0).unwrap().index, 1);
        assert_eq!(catalog.ring_containing(349.0).unwrap().index, 3);

        let far = catalog.ring_containing(10_000.0).unwrap();
        assert!(far.contains(10_000.0));
        assert!(catalog.cached_ring_count() > 4);
    }

    #[test]
    fn test_memoized_extension() {
        let catalog = catalog();
        let first = catalog.ring_definition(50).unwrap();
        assert_eq!(catalog.cached_ring_count(), 51);

        let second = catalog.ring_definition(50).unwrap();
        assert_eq!(first, second);
        assert_eq!(catalog.cached_ring_count(), 51);
    }

    #[test]
    fn test_growth_guard() {
        let params = RingParams {
            max_extension_iterations: 10,
            ..RingParams::default()
        };
        let catalog = RingCatalog::new(params).unwrap();

        let err = catalog.ring_containing(1.0e12).unwrap_err();
        assert!(matches!(
            err,
            WorldGenError::RingGrowthExhausted { iterations: 10, .. }
        ));
        // Rings appended before the cap are complete and contiguous
        let count = catalog.cached_ring_count() as u32;
        for index in 1..count {
            let inner = catalog.ring_definition(index).unwrap();
            let outer = catalog.ring_definition(index - 1).unwrap();
            assert_eq!(inner.inner_radius, outer.outer_radius);
        }
        assert!(catalog.ring_containing(f64::INFINITY).is_err());
        assert!(catalog.ring_containing(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = RingParams {
            growth_factor: 0.8,
            ..RingParams::default()
        };
        assert_eq!(
            RingCatalog::new(params).unwrap_err(),
            ConfigError::GrowthFactor(0.8)
        );
    }

    #[test]
    fn test_generated_ledger() {
        let catalog = catalog();
        let region = RegionId::new(2, Quadrant::NegXPosZ);

        assert!(!catalog.is_region_generated(region));
        assert!(catalog.mark_region_generated(region));
        assert!(!catalog.mark_region_generated(region));
        assert!(catalog.is_region_generated(region));

        catalog.restore_generated([RegionId::new(0, Quadrant::PosXPosZ)]);
        assert_eq!(
            catalog.generated_regions(),
            vec![RegionId::new(0, Quadrant::PosXPosZ), region]
        );

        assert!(catalog.forget_region(region));
        assert!(!catalog.is_region_generated(region));
        catalog.clear_generated();
        assert!(catalog.generated_regions().is_empty());
    }
}
