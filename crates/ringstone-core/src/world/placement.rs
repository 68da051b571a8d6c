//! Placement search - finds a valid position for one planned feature
//!
//! Each attempt draws a candidate, picks its size and runs it through the
//! validation chain. The first candidate that passes every check becomes a
//! [`PlacementRecord`]; a feature that exhausts its attempts is skipped.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

use crate::error::Result;
use crate::world::content_distributor::{DistributionPlan, base_size_distribution};
use crate::world::features::{
    Formation, PlacementKind, PlacementRecord, SizeCategory, SizeDistribution, planar_distance,
};
use crate::world::geological_field::NoiseField;
use crate::world::obstacles::ObstacleSet;
use crate::world::region::{PlanarBounds, RegionId, RegionIndex, WORLD_CENTER};
use crate::world::rng_trait::WorldRng;
use crate::world::stats::{GenStats, RejectReason};
use crate::world::worldgen_config::PlacementParams;

/// Base tilt in radians before weathering
const BASE_TILT: f64 = 0.15;
/// Random yaw jitter on top of the orientation noise
const YAW_JITTER: f64 = 0.3;
/// Share of the scale range driven by noise (the rest is random)
const SCALE_NOISE_SHARE: f64 = 0.6;
/// Scale reduction at full weathering
const WEATHERING_SHRINK: f64 = 0.15;

/// Terrain height lookup supplied by the host
///
/// Any `Fn(DVec3) -> f64 + Send + Sync` closure works. Only x and z of the
/// argument are meaningful.
pub trait TerrainHeight: Send + Sync {
    fn height_at(&self, position: DVec3) -> f64;
}

impl<F> TerrainHeight for F
where
    F: Fn(DVec3) -> f64 + Send + Sync,
{
    fn height_at(&self, position: DVec3) -> f64 {
        self(position)
    }
}

/// Everything the search needs for one region
pub struct PlacementContext<'a> {
    pub plan: &'a DistributionPlan,
    /// Footprint square intersected with the region's bounding box
    pub search_area: PlanarBounds,
    pub index: &'a RegionIndex,
    pub noise: &'a NoiseField,
    pub params: &'a PlacementParams,
    /// World units of displacement along the density bias vector
    pub bias_strength: f64,
    pub terrain: &'a dyn TerrainHeight,
}

impl PlacementContext<'_> {
    pub fn region(&self) -> RegionId {
        self.plan.region
    }
}

/// Footprint square around `center` clipped to a region's bounding box
pub fn search_area(
    index: &RegionIndex,
    region: RegionId,
    center: DVec3,
    footprint: f64,
) -> Result<Option<PlanarBounds>> {
    let bounds = index.region_bounds(region)?;
    Ok(PlanarBounds::square(center, footprint.max(0.0)).intersect(&bounds))
}

/// Search for one feature
///
/// On success the feature is inserted into `obstacles` before returning.
pub fn place_one<R: WorldRng>(
    ctx: &PlacementContext<'_>,
    obstacles: &mut ObstacleSet,
    rng: &mut R,
    stats: &mut dyn GenStats,
) -> Option<PlacementRecord> {
    let region = ctx.region();
    let ring = ctx.plan.ring.index;

    for _ in 0..ctx.params.max_attempts {
        // 1. Draw a candidate
        let (candidate, formation) = draw_candidate(ctx, rng);

        // 2. Region and footprint
        let inside = ctx.search_area.contains(candidate)
            && ctx.index.contains(region, candidate).unwrap_or(false);
        if !inside {
            reject(stats, RejectReason::OutsideRegion, candidate);
            continue;
        }

        // 3. Spawn area
        if planar_distance(candidate, WORLD_CENTER) < ctx.params.min_origin_distance {
            reject(stats, RejectReason::NearOrigin, candidate);
            continue;
        }

        // 4. Size
        let size = draw_size(ctx, candidate, formation, rng);

        // 5. Spacing
        let spacing = ctx.params.spacing.for_size(size);
        if obstacles.violates_spacing(candidate, spacing) {
            reject(stats, RejectReason::Spacing, candidate);
            continue;
        }

        // 6. Terrain
        let height = ctx.terrain.height_at(candidate);
        if !height.is_finite() || height < ctx.params.min_valid_height {
            reject(stats, RejectReason::Height, candidate);
            continue;
        }
        if !slope_is_walkable(ctx, candidate) {
            reject(stats, RejectReason::Slope, candidate);
            continue;
        }

        // 7. Density thinning
        let field = ctx.noise.sample(candidate, ring);
        let acceptance = if field.is_hotspot {
            1.0
        } else {
            field
                .density_multiplier
                .clamp(ctx.params.min_density_acceptance, 1.0)
        };
        if !rng.check_probability(acceptance) {
            reject(stats, RejectReason::Density, candidate);
            continue;
        }

        let position = DVec3::new(candidate.x, height, candidate.z);
        let record = build_record(ctx, position, size, formation, rng);
        obstacles.insert(position, size, spacing);
        stats.record_placed();
        return Some(record);
    }

    log::debug!(
        "Skipped feature in {} after {} attempts",
        region,
        ctx.params.max_attempts
    );
    stats.record_skipped();
    None
}

fn reject(stats: &mut dyn GenStats, reason: RejectReason, candidate: DVec3) {
    log::trace!(
        "Rejected candidate ({:.1}, {:.1}): {:?}",
        candidate.x,
        candidate.z,
        reason
    );
    stats.record_rejection(reason);
}

fn draw_candidate<'p, R: WorldRng>(
    ctx: &PlacementContext<'p>,
    rng: &mut R,
) -> (DVec3, Option<&'p Formation>) {
    let formations = &ctx.plan.formations;
    if !formations.is_empty() && rng.check_probability(ctx.plan.biome.clustering) {
        let formation = pick_formation(formations, rng);
        let bearing = rng.gen_range_f64(0.0, TAU);
        let distance = formation.radius * rng.gen_f64().sqrt();
        let offset = DVec3::new(distance * bearing.sin(), 0.0, distance * bearing.cos());
        return (formation.center + offset, Some(formation));
    }

    let area = &ctx.search_area;
    let x = rng.gen_range_f64(area.min.x, area.max.x);
    let z = rng.gen_range_f64(area.min.y, area.max.y);
    let point = DVec3::new(x, 0.0, z);
    let bias = ctx.noise.sample(point, ctx.plan.ring.index).bias;
    let shift = DVec3::new(bias.x, 0.0, bias.y) * ctx.bias_strength;
    (point + shift, None)
}

/// Weighted by intensity
fn pick_formation<'p, R: WorldRng>(formations: &'p [Formation], rng: &mut R) -> &'p Formation {
    let total: f64 = formations.iter().map(|f| f.intensity).sum();
    let mut roll = rng.gen_f64() * total;
    for formation in formations {
        if roll < formation.intensity {
            return formation;
        }
        roll -= formation.intensity;
    }
    &formations[formations.len() - 1]
}

fn draw_size<R: WorldRng>(
    ctx: &PlacementContext<'_>,
    candidate: DVec3,
    formation: Option<&Formation>,
    rng: &mut R,
) -> SizeCategory {
    let mut distribution: SizeDistribution = ctx.plan.size_distribution;

    if let Ok(blend) = ctx.index.boundary_blend(candidate)
        && let Some(neighbor) = blend.neighbor
    {
        let neighbor_table =
            base_size_distribution(neighbor).reweighted(ctx.plan.biome.size_multipliers);
        distribution = distribution.blend(&neighbor_table, blend.neighbor_weight);
    }

    if let Some(formation) = formation {
        let boost = 1.0 + 2.0 * formation.intensity;
        distribution = distribution.favoring(formation.favored_sizes, boost);
    }

    distribution.pick(rng.gen_f64())
}

/// Central differences; any non-finite probe counts as too steep
fn slope_is_walkable(ctx: &PlacementContext<'_>, candidate: DVec3) -> bool {
    let probe = ctx.params.slope_probe;
    let sample = |dx: f64, dz: f64| ctx.terrain.height_at(candidate + DVec3::new(dx, 0.0, dz));

    let east = sample(probe, 0.0);
    let west = sample(-probe, 0.0);
    let north = sample(0.0, probe);
    let south = sample(0.0, -probe);
    if ![east, west, north, south].iter().all(|h| h.is_finite()) {
        return false;
    }

    let gradient_x = (east - west) / (2.0 * probe);
    let gradient_z = (north - south) / (2.0 * probe);
    (gradient_x * gradient_x + gradient_z * gradient_z).sqrt() <= ctx.params.max_slope
}

fn build_record<R: WorldRng>(
    ctx: &PlacementContext<'_>,
    position: DVec3,
    size: SizeCategory,
    formation: Option<&Formation>,
    rng: &mut R,
) -> PlacementRecord {
    let biome = &ctx.plan.biome;
    let (lean, grain) = ctx.noise.orientation(position);

    // Neighbors share orientation noise, so they lean alike
    let tilt = BASE_TILT * (1.0 + biome.weathering);
    let yaw = (lean + 1.0) * PI + rng.gen_range_f64(-YAW_JITTER, YAW_JITTER);
    let rotation = DVec3::new(grain * tilt, yaw.rem_euclid(TAU), lean * grain * tilt);

    let (min_scale, max_scale) = size.scale_range();
    let t = (grain + 1.0) * 0.5 * SCALE_NOISE_SHARE + rng.gen_f64() * (1.0 - SCALE_NOISE_SHARE);
    let weathered = 1.0 - WEATHERING_SHRINK * biome.weathering;
    let scale = min_scale + t.clamp(0.0, 1.0) * (max_scale - min_scale) * weathered;

    let cluster_count = match size.cluster_range() {
        Some((low, high)) if rng.check_probability(biome.clustering * 0.5) => {
            rng.gen_range_u32(low as u32, high as u32) as u8
        }
        _ => 1,
    };

    let host = formation.or_else(|| ctx.plan.formations.iter().find(|f| f.contains(position)));
    let is_landmark = size.is_large()
        && host.is_some_and(|f| f.kind.hosts_landmarks())
        && rng.check_probability(ctx.params.landmark_chance);

    PlacementRecord {
        position,
        size_category: size,
        rotation,
        scale,
        formation_tag: host.map(|f| f.kind),
        is_landmark,
        is_corridor_marker: false,
        zone_id: None,
        cluster_count,
        kind: PlacementKind::Feature,
    }
}
