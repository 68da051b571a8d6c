//! Region orchestration - plan, place, carve and cache

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use glam::DVec3;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, WorldGenError};
use crate::world::content_distributor::{ContentDistributor, PlanSummary};
use crate::world::corridors::{Corridor, generate_corridors, perpendicular};
use crate::world::discovery_zones::{DiscoveryZone, ZoneCarver};
use crate::world::features::{PlacementKind, PlacementRecord, SizeCategory};
use crate::world::geological_field::NoiseField;
use crate::world::obstacles::ObstacleSet;
use crate::world::placement::{PlacementContext, TerrainHeight, place_one, search_area};
use crate::world::region::{RegionId, RegionIndex};
use crate::world::ring_catalog::RingCatalog;
use crate::world::rng_trait::{WorldRng, region_rng};
use crate::world::stats::GenerationReport;
use crate::world::worldgen_config::DistributionConfig;

/// Distance of a zone gateway inside its entry point, toward the zone center
const GATEWAY_INSET: f64 = 1.5;

/// Cooperative cancellation flag, checked between placements and phases
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One region to generate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRequest {
    pub region: RegionId,
    pub center: DVec3,
    /// Side of the square search area around `center`
    pub footprint: f64,
}

/// Everything generated for a region besides the placement list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionLayout {
    pub region: RegionId,
    pub plan: PlanSummary,
    pub zones: Vec<DiscoveryZone>,
    pub corridors: Vec<Corridor>,
    pub report: GenerationReport,
}

/// Distribution orchestrator
///
/// Runs plan, placement search and zone carving for a region and caches the
/// resulting layout. Output depends only on the seed, the config, the
/// request and the terrain.
pub struct RockDistributor {
    seed: u64,
    config: DistributionConfig,
    catalog: Arc<RingCatalog>,
    index: RegionIndex,
    noise: Arc<NoiseField>,
    distributor: ContentDistributor,
    terrain: Box<dyn TerrainHeight>,
    layouts: RwLock<AHashMap<RegionId, Arc<RegionLayout>>>,
}

impl RockDistributor {
    /// Create a distributor; the config is validated up front
    ///
    /// The catalog must have been built from `config.rings`.
    pub fn new(
        seed: u64,
        config: DistributionConfig,
        catalog: Arc<RingCatalog>,
        terrain: impl TerrainHeight + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.params() != &config.rings {
            return Err(ConfigError::CatalogMismatch);
        }

        let noise = Arc::new(NoiseField::new(seed, &config.noise));
        let index = RegionIndex::new(catalog.clone());
        let distributor = ContentDistributor::new(catalog.clone(), noise.clone());

        log::info!(
            "Rock distributor ready (seed {}, config '{}')",
            seed,
            config.name
        );

        Ok(Self {
            seed,
            config,
            catalog,
            index,
            noise,
            distributor,
            terrain: Box::new(terrain),
            layouts: RwLock::new(AHashMap::new()),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<RingCatalog> {
        &self.catalog
    }

    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    /// Generate a region and cache its layout
    pub fn generate(
        &self,
        region: RegionId,
        center: DVec3,
        footprint: f64,
    ) -> Result<Vec<PlacementRecord>> {
        self.run(region, center, footprint, None)
    }

    /// Generate unless the catalog already lists the region as generated
    pub fn generate_if_needed(
        &self,
        region: RegionId,
        center: DVec3,
        footprint: f64,
    ) -> Result<Option<Vec<PlacementRecord>>> {
        if self.catalog.is_region_generated(region) {
            log::trace!("Region {} already generated", region);
            return Ok(None);
        }
        self.generate(region, center, footprint).map(Some)
    }

    /// Generate with cooperative cancellation
    ///
    /// A cancelled region is neither cached nor marked generated.
    pub fn generate_cancellable(
        &self,
        region: RegionId,
        center: DVec3,
        footprint: f64,
        cancel: &CancelToken,
    ) -> Result<Vec<PlacementRecord>> {
        self.run(region, center, footprint, Some(cancel))
    }

    /// Generate independent regions, in parallel where threads are available
    ///
    /// Results are returned in request order.
    pub fn generate_many(&self, requests: &[RegionRequest]) -> Vec<Result<Vec<PlacementRecord>>> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use rayon::prelude::*;
            requests
                .par_iter()
                .map(|request| self.generate(request.region, request.center, request.footprint))
                .collect()
        }

        #[cfg(target_arch = "wasm32")]
        {
            requests
                .iter()
                .map(|request| self.generate(request.region, request.center, request.footprint))
                .collect()
        }
    }

    pub fn layout(&self, region: RegionId) -> Option<Arc<RegionLayout>> {
        self.layouts.read().get(&region).cloned()
    }

    pub fn zones(&self, region: RegionId) -> Vec<DiscoveryZone> {
        self.layout(region)
            .map(|layout| layout.zones.clone())
            .unwrap_or_default()
    }

    pub fn corridors(&self, region: RegionId) -> Vec<Corridor> {
        self.layout(region)
            .map(|layout| layout.corridors.clone())
            .unwrap_or_default()
    }

    pub fn report(&self, region: RegionId) -> Option<GenerationReport> {
        self.layout(region).map(|layout| layout.report.clone())
    }

    /// Drop the cached layout and the generated mark of a region
    pub fn forget(&self, region: RegionId) -> bool {
        let had_layout = self.layouts.write().remove(&region).is_some();
        let was_generated = self.catalog.forget_region(region);
        had_layout || was_generated
    }

    fn run(
        &self,
        region: RegionId,
        center: DVec3,
        footprint: f64,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<PlacementRecord>> {
        let check = || match cancel {
            Some(token) if token.is_cancelled() => {
                log::debug!("Generation of {} cancelled", region);
                Err(WorldGenError::Cancelled(region))
            }
            _ => Ok(()),
        };
        check()?;

        if !center.is_finite() {
            return Err(WorldGenError::NonFinitePosition(center));
        }

        let mut rng = region_rng(self.seed, region);
        let plan = self.distributor.plan(region, center, &mut rng)?;
        let mut report = GenerationReport {
            planned_features: plan.total_count,
            ..GenerationReport::default()
        };

        let mut obstacles = ObstacleSet::new();
        let mut records = Vec::with_capacity(plan.total_count as usize);
        let mut zones = Vec::new();
        let mut corridors = Vec::new();

        if let Some(area) = search_area(&self.index, region, center, footprint)? {
            let ctx = PlacementContext {
                plan: &plan,
                search_area: area,
                index: &self.index,
                noise: &self.noise,
                params: &self.config.placement,
                bias_strength: self.config.noise.bias_strength,
                terrain: self.terrain.as_ref(),
            };
            for _ in 0..plan.total_count {
                check()?;
                if let Some(record) = place_one(&ctx, &mut obstacles, &mut rng, &mut report) {
                    records.push(record);
                }
            }
            check()?;

            let carver = ZoneCarver {
                region,
                index: &self.index,
                obstacles: &obstacles,
                terrain: self.terrain.as_ref(),
                params: &self.config.zones,
            };
            let clearings = carver.detect_clearings(&area)?;
            zones = carver.synthesize_zones(&clearings, &mut rng, &mut report);
            check()?;

            corridors = generate_corridors(
                region,
                &zones,
                &obstacles,
                &self.config.corridors,
                &mut rng,
                &mut report,
            );
            check()?;
        } else {
            log::debug!("Footprint around {:?} does not overlap {}", center, region);
        }

        let searched = records.len();
        self.inject_corridor_features(&corridors, &mut rng, &mut records);
        self.inject_gateways(&zones, &mut rng, &mut records);

        report.zones = zones.len() as u32;
        report.corridors = corridors.len() as u32;
        report.injected_features = (records.len() - searched) as u32;

        log::info!(
            "Generated {}: {} features ({} skipped), {} zones, {} corridors, {} injected",
            region,
            report.placed_features,
            report.skipped_features,
            report.zones,
            report.corridors,
            report.injected_features
        );

        let layout = RegionLayout {
            region,
            plan: plan.summary(),
            zones,
            corridors,
            report,
        };
        self.layouts.write().insert(region, Arc::new(layout));
        self.catalog.mark_region_generated(region);

        Ok(records)
    }

    /// Marker pairs straddling every path point, one rock per landmark
    fn inject_corridor_features<R: WorldRng>(
        &self,
        corridors: &[Corridor],
        rng: &mut R,
        records: &mut Vec<PlacementRecord>,
    ) {
        let margin = self.config.corridors.marker_margin;
        for corridor in corridors {
            let offset = corridor.width * 0.5 + margin;
            let last = corridor.path.len() - 1;
            for (i, &point) in corridor.path.iter().enumerate() {
                let before = corridor.path[i.saturating_sub(1)];
                let after = corridor.path[(i + 1).min(last)];
                let side = perpendicular(before, after);
                for sign in [-1.0, 1.0] {
                    let position = self.grounded(point + side * sign * offset, point.y);
                    let mut record =
                        injected(position, SizeCategory::Tiny, PlacementKind::CorridorMarker, rng);
                    record.is_corridor_marker = true;
                    records.push(record);
                }
            }

            for &landmark in &corridor.landmarks {
                let position = self.grounded(landmark, landmark.y);
                let mut record = injected(
                    position,
                    SizeCategory::Large,
                    PlacementKind::CorridorLandmark,
                    rng,
                );
                record.is_landmark = true;
                records.push(record);
            }
        }
    }

    /// Medium rocks just inside every zone entry
    fn inject_gateways<R: WorldRng>(
        &self,
        zones: &[DiscoveryZone],
        rng: &mut R,
        records: &mut Vec<PlacementRecord>,
    ) {
        for zone in zones {
            for entry in &zone.entry_points {
                let inward = DVec3::new(
                    zone.center.x - entry.position.x,
                    0.0,
                    zone.center.z - entry.position.z,
                )
                .normalize_or_zero();
                let position = self.grounded(
                    entry.position + inward * GATEWAY_INSET,
                    entry.position.y,
                );
                let mut record =
                    injected(position, SizeCategory::Medium, PlacementKind::ZoneGateway, rng);
                record.zone_id = Some(zone.id);
                records.push(record);
            }
        }
    }

    /// Snap to the terrain, keeping `fallback` where the terrain is invalid
    fn grounded(&self, position: DVec3, fallback: f64) -> DVec3 {
        let height = self.terrain.height_at(position);
        let y = if height.is_finite() { height } else { fallback };
        DVec3::new(position.x, y, position.z)
    }
}

fn injected<R: WorldRng>(
    position: DVec3,
    size: SizeCategory,
    kind: PlacementKind,
    rng: &mut R,
) -> PlacementRecord {
    let (min_scale, max_scale) = size.scale_range();
    PlacementRecord {
        position,
        size_category: size,
        rotation: DVec3::new(0.0, rng.gen_range_f64(0.0, std::f64::consts::TAU), 0.0),
        scale: rng.gen_range_f64(min_scale, max_scale),
        formation_tag: None,
        is_landmark: false,
        is_corridor_marker: false,
        zone_id: None,
        cluster_count: 1,
        kind,
    }
}
