//! Content distributor - decides how much of what goes into a region
//!
//! A plan fixes the feature budget, the size mix and the geological
//! formations of one region before any position is searched.

use std::f64::consts::TAU;
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::world::biome::{BiomeArchetype, BiomeDefinition};
use crate::world::features::{Formation, SizeDistribution};
use crate::world::geological_field::{GeologicalField, NoiseField};
use crate::world::region::RegionId;
use crate::world::ring_catalog::{RingCatalog, RingDefinition};
use crate::world::rng_trait::WorldRng;

// Base feature count of the first rings
const BASE_COUNTS: [u32; 4] = [8, 12, 14, 15];
// Beyond the table: fewer, larger features
const FAR_COUNT_DECAY: f64 = 0.93;
const MIN_FAR_COUNT: u32 = 6;

// One formation per this many features
const FEATURES_PER_FORMATION: u32 = 15;
// Formation center distance from the region center
const FORMATION_OFFSET: (f64, f64) = (20.0, 60.0);
const FORMATION_RADIUS_VARIATION: f64 = 0.2;
const FORMATION_INTENSITY: (f64, f64) = (0.4, 1.0);

/// Size mix per ring, Tiny..Massive
const SIZE_TABLES: [[f64; 5]; 5] = [
    [0.70, 0.20, 0.08, 0.02, 0.00],
    [0.45, 0.30, 0.15, 0.08, 0.02],
    [0.30, 0.28, 0.22, 0.13, 0.07],
    [0.15, 0.20, 0.25, 0.15, 0.25],
    [0.10, 0.15, 0.25, 0.25, 0.25],
];

/// Everything decided about a region before placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub region: RegionId,
    pub biome: BiomeArchetype,
    pub total_count: u32,
    pub size_weights: [f64; 5],
    pub formation_count: u32,
}

#[derive(Debug, Clone)]
pub struct DistributionPlan {
    pub region: RegionId,
    pub ring: RingDefinition,
    pub biome: BiomeDefinition,
    pub center: DVec3,
    pub total_count: u32,
    pub size_distribution: SizeDistribution,
    pub formations: Vec<Formation>,
    /// Field sampled at the region center
    pub field: GeologicalField,
}

impl DistributionPlan {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            region: self.region,
            biome: self.biome.archetype,
            total_count: self.total_count,
            size_weights: self.size_distribution.weights(),
            formation_count: self.formations.len() as u32,
        }
    }
}

/// Base feature count for a ring, before content density
pub fn base_feature_count(ring: u32) -> u32 {
    match BASE_COUNTS.get(ring as usize) {
        Some(&count) => count,
        None => {
            let last = BASE_COUNTS[BASE_COUNTS.len() - 1] as f64;
            let steps = (ring as usize - (BASE_COUNTS.len() - 1)) as i32;
            let count = (last * FAR_COUNT_DECAY.powi(steps)).round() as u32;
            count.max(MIN_FAR_COUNT)
        }
    }
}

/// Base size mix for a ring
pub fn base_size_distribution(ring: u32) -> SizeDistribution {
    let table = SIZE_TABLES[(ring as usize).min(SIZE_TABLES.len() - 1)];
    SizeDistribution::from_weights(table)
}

/// Dense ground favors small rocks, sparse ground favors big ones
pub fn density_size_factors(density: f64) -> [f64; 5] {
    let s = density.max(f64::MIN_POSITIVE).sqrt();
    [s, s, 1.0, 1.0 / s, 1.0 / s]
}

/// Plans feature budgets and formations per region
pub struct ContentDistributor {
    catalog: Arc<RingCatalog>,
    noise: Arc<NoiseField>,
}

impl ContentDistributor {
    pub fn new(catalog: Arc<RingCatalog>, noise: Arc<NoiseField>) -> Self {
        Self { catalog, noise }
    }

    /// Plan the content of a region around `center`
    pub fn plan<R: WorldRng>(
        &self,
        region: RegionId,
        center: DVec3,
        rng: &mut R,
    ) -> Result<DistributionPlan> {
        let ring = self.catalog.ring_definition(region.ring)?;
        let biome = BiomeArchetype::for_quadrant(region.quadrant).definition();
        let field = self.noise.sample(center, ring.index);

        let total_count =
            (base_feature_count(ring.index) as f64 * ring.content_density).round() as u32;

        let size_distribution = base_size_distribution(ring.index)
            .reweighted(biome.size_multipliers)
            .reweighted(density_size_factors(field.density_multiplier));

        let formation_count = (total_count / FEATURES_PER_FORMATION).max(1);
        let formations = (0..formation_count)
            .map(|_| plan_formation(&biome, center, rng))
            .collect();

        log::trace!(
            "Planned {} features in {} ({} biome)",
            total_count,
            region,
            biome.name
        );

        Ok(DistributionPlan {
            region,
            ring,
            biome,
            center,
            total_count,
            size_distribution,
            formations,
            field,
        })
    }
}

fn plan_formation<R: WorldRng>(biome: &BiomeDefinition, center: DVec3, rng: &mut R) -> Formation {
    let choice = rng.gen_range_u32(0, biome.formations.len() as u32 - 1) as usize;
    let kind = biome.formations[choice];

    let bearing = rng.gen_range_f64(0.0, TAU);
    let offset = rng.gen_range_f64(FORMATION_OFFSET.0, FORMATION_OFFSET.1);
    let variation = rng.gen_range_f64(
        1.0 - FORMATION_RADIUS_VARIATION,
        1.0 + FORMATION_RADIUS_VARIATION,
    );
    let intensity = rng.gen_range_f64(FORMATION_INTENSITY.0, FORMATION_INTENSITY.1);

    Formation {
        kind,
        center: center + DVec3::new(offset * bearing.sin(), 0.0, offset * bearing.cos()),
        radius: kind.base_radius() * variation,
        intensity,
        favored_sizes: kind.favored_sizes(),
    }
}
