//! Integration tests for region distribution
//!
//! These drive the public orchestrator API end to end: ring lookup, placement
//! search, zone carving, corridor generation and the generated-region ledger.

use std::sync::Arc;

use glam::DVec3;
use ringstone_core::world::features::planar_distance;
use ringstone_core::world::persistence::{restore_catalog_ledger, save_catalog_ledger};
use ringstone_core::world::{
    CancelToken, DistributionConfig, ObstacleSet, PlacementKind, PlacementRecord, Quadrant,
    RegionId, RegionIndex, RegionRequest, RingCatalog, RockDistributor,
};
use ringstone_core::{ConfigError, WorldGenError};

fn flat(_: DVec3) -> f64 {
    0.0
}

fn rolling(position: DVec3) -> f64 {
    (position.x * 0.05).sin() * 2.0 + (position.z * 0.04).cos() * 1.5
}

fn catalog() -> Arc<RingCatalog> {
    Arc::new(RingCatalog::new(DistributionConfig::default().rings).expect("valid rings"))
}

fn distributor(seed: u64) -> RockDistributor {
    RockDistributor::new(seed, DistributionConfig::default(), catalog(), rolling)
        .expect("valid config")
}

fn searched(records: &[PlacementRecord]) -> Vec<&PlacementRecord> {
    records
        .iter()
        .filter(|record| record.kind == PlacementKind::Feature)
        .collect()
}

fn sample_regions() -> Vec<RegionId> {
    [0, 1, 2, 3, 5, 9]
        .into_iter()
        .flat_map(|ring| Quadrant::all().map(|quadrant| RegionId::new(ring, quadrant)))
        .collect()
}

fn generate_at_center(distributor: &RockDistributor, region: RegionId) -> Vec<PlacementRecord> {
    let center = distributor
        .index()
        .region_center(region)
        .expect("center exists");
    distributor
        .generate(region, center, 200.0)
        .expect("generation succeeds")
}

// ============================================================================
// Ring and region tests
// ============================================================================

#[test]
fn test_region_coverage() {
    let index = RegionIndex::new(catalog());
    for i in 0..500 {
        let angle = i as f64 * 0.7;
        let distance = (i as f64).powf(1.8);
        let position = DVec3::new(distance * angle.sin(), 0.0, distance * angle.cos());

        let region = index.region_for(position).expect("every position maps");
        let ring = index
            .catalog()
            .ring_definition(region.ring)
            .expect("ring exists");
        let d = planar_distance(position, DVec3::ZERO);
        assert!(ring.inner_radius <= d && d < ring.outer_radius);
    }
}

#[test]
fn test_ring_monotonicity() {
    let catalog = catalog();
    for index in 0..80 {
        let ring = catalog.ring_definition(index).unwrap();
        let next = catalog.ring_definition(index + 1).unwrap();
        assert_eq!(ring.outer_radius, next.inner_radius);
        assert!(next.outer_radius > ring.outer_radius);
    }
}

#[test]
fn test_scenario_exact_boundary_resolves_outward() {
    let index = RegionIndex::new(catalog());
    let outer = index.catalog().ring_definition(1).unwrap().outer_radius;
    let region = index.region_for(DVec3::new(0.0, 0.0, outer)).unwrap();
    assert_eq!(region.ring, 2);
}

#[test]
fn test_scenario_far_ring_extends_once() {
    let catalog = catalog();
    assert_eq!(catalog.cached_ring_count(), 4);

    let first = catalog.ring_definition(50).unwrap();
    let extended = catalog.cached_ring_count();
    assert_eq!(extended, 51);

    let second = catalog.ring_definition(50).unwrap();
    assert_eq!(first, second);
    assert_eq!(catalog.cached_ring_count(), extended);
}

#[test]
fn test_concurrent_lookups_agree() {
    let catalog = catalog();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let catalog = catalog.clone();
            std::thread::spawn(move || {
                (0..200)
                    .map(|i| {
                        let distance = (i * 4 + t) as f64 * 37.0;
                        catalog.ring_containing(distance).unwrap().index
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("lookup thread");
    }

    let count = catalog.cached_ring_count() as u32;
    for index in 1..count {
        let previous = catalog.ring_definition(index - 1).unwrap();
        let ring = catalog.ring_definition(index).unwrap();
        assert_eq!(previous.outer_radius, ring.inner_radius);
        assert_eq!(ring.index, index);
    }
}

// ============================================================================
// Distribution tests
// ============================================================================

#[test]
fn test_scenario_ring_zero_feature_count() {
    let distributor =
        RockDistributor::new(42, DistributionConfig::default(), catalog(), flat).unwrap();
    let region = RegionId::new(0, Quadrant::PosXPosZ);
    let records = distributor
        .generate(region, DVec3::new(25.0, 0.0, 25.0), 100.0)
        .unwrap();

    let features = searched(&records);
    assert!(
        (6..=10).contains(&features.len()),
        "expected about 8 features, got {}",
        features.len()
    );
    for feature in features {
        assert_eq!(distributor.index().region_for(feature.position).unwrap(), region);
        assert!(planar_distance(feature.position, DVec3::ZERO) >= 8.0);
    }
}

#[test]
fn test_determinism_across_distributors() {
    for region in sample_regions() {
        let a = generate_at_center(&distributor(1234), region);
        let b = generate_at_center(&distributor(1234), region);
        assert_eq!(a, b, "region {} differs between runs", region);
    }

    // Same distributor, regenerated after forgetting
    let distributor = distributor(99);
    let region = RegionId::new(3, Quadrant::NegXNegZ);
    let first = generate_at_center(&distributor, region);
    let zones = distributor.zones(region);
    distributor.forget(region);
    let second = generate_at_center(&distributor, region);
    assert_eq!(first, second);
    assert_eq!(zones, distributor.zones(region));
}

#[test]
fn test_seeds_produce_different_worlds() {
    let region = RegionId::new(2, Quadrant::PosXPosZ);
    let a = generate_at_center(&distributor(1), region);
    let b = generate_at_center(&distributor(2), region);
    assert_ne!(a, b);
}

#[test]
fn test_spacing_invariant() {
    let distributor = distributor(7);
    let spacing = distributor.config().placement.spacing.clone();
    for region in sample_regions() {
        let records = generate_at_center(&distributor, region);
        let features = searched(&records);
        for (i, a) in features.iter().enumerate() {
            assert_eq!(distributor.index().region_for(a.position).unwrap(), region);
            for b in &features[i + 1..] {
                let required = spacing
                    .for_size(a.size_category)
                    .max(spacing.for_size(b.size_category));
                assert!(
                    planar_distance(a.position, b.position) >= required,
                    "{:?} and {:?} too close in {}",
                    a.position,
                    b.position,
                    region
                );
            }
        }
    }
}

#[test]
fn test_corridor_clearance() {
    let distributor = distributor(21);
    let clearance = distributor.config().corridors.clearance;
    for region in sample_regions() {
        let records = generate_at_center(&distributor, region);
        let features = searched(&records);
        for corridor in distributor.corridors(region) {
            assert!(corridor.path.len() >= 3);
            let width = &distributor.config().corridors;
            assert!(corridor.width >= width.min_width && corridor.width <= width.max_width);
            for point in &corridor.path {
                for feature in &features {
                    assert!(planar_distance(*point, feature.position) >= clearance);
                }
            }
        }
    }
}

#[test]
fn test_zone_entry_validity() {
    let distributor = distributor(5);
    let entry_clearance = distributor.config().zones.entry_clearance;
    let mut zone_count = 0;
    for region in sample_regions() {
        let records = generate_at_center(&distributor, region);
        let spacing = &distributor.config().placement.spacing;
        let mut obstacles = ObstacleSet::new();
        for feature in searched(&records) {
            obstacles.insert(
                feature.position,
                feature.size_category,
                spacing.for_size(feature.size_category),
            );
        }

        for zone in distributor.zones(region) {
            zone_count += 1;
            assert!(zone.entry_points.len() >= 2);
            assert!((0.2..=1.0).contains(&zone.accessibility));
            for entry in zone.entry_points.iter().filter(|entry| !entry.fallback) {
                assert!(obstacles.segment_is_clear(zone.center, entry.position, entry_clearance));
            }
            let gateways = records
                .iter()
                .filter(|record| record.zone_id == Some(zone.id))
                .count();
            assert_eq!(gateways, zone.entry_points.len());
        }
    }
    assert!(zone_count > 0, "expected at least one discovery zone");
}

#[test]
fn test_records_are_well_formed() {
    let distributor = distributor(17);
    for region in sample_regions() {
        for record in generate_at_center(&distributor, region) {
            assert!(record.position.is_finite());
            assert!(record.rotation.is_finite());
            let (min, max) = record.size_category.scale_range();
            assert!(record.scale >= min && record.scale <= max);
            assert!(record.cluster_count >= 1);
            assert_eq!(
                record.is_corridor_marker,
                record.kind == PlacementKind::CorridorMarker
            );
        }
    }
}

// ============================================================================
// Orchestration tests
// ============================================================================

#[test]
fn test_generate_many_and_active_regions() {
    let distributor = distributor(8);
    let player = DVec3::new(60.0, 0.0, -40.0);
    let active = distributor.index().active_regions(player, 150.0).unwrap();
    assert!(active.contains(&distributor.index().region_for(player).unwrap()));

    let requests: Vec<RegionRequest> = active
        .iter()
        .map(|&region| RegionRequest {
            region,
            center: distributor.index().region_center(region).unwrap(),
            footprint: 200.0,
        })
        .collect();
    let results = distributor.generate_many(&requests);
    assert_eq!(results.len(), requests.len());
    assert!(results.iter().all(|result| result.is_ok()));
    assert_eq!(distributor.catalog().generated_regions(), active);

    for request in &requests {
        let again = distributor
            .generate_if_needed(request.region, request.center, request.footprint)
            .unwrap();
        assert!(again.is_none());
    }
}

#[test]
fn test_cancellation() {
    let distributor = distributor(8);
    let region = RegionId::new(4, Quadrant::PosXNegZ);
    let center = distributor.index().region_center(region).unwrap();

    let token = CancelToken::new();
    let handle = token.clone();
    handle.cancel();
    assert!(token.is_cancelled());

    let result = distributor.generate_cancellable(region, center, 200.0, &token);
    assert_eq!(result, Err(WorldGenError::Cancelled(region)));
    assert!(distributor.layout(region).is_none());
    assert!(!distributor.catalog().is_region_generated(region));

    // A live token behaves like plain generation
    let live = CancelToken::new();
    let records = distributor
        .generate_cancellable(region, center, 200.0, &live)
        .unwrap();
    assert_eq!(records, generate_at_center(&self::distributor(8), region));
}

#[test]
fn test_ledger_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("generated.ron");

    let distributor = distributor(3);
    for quadrant in Quadrant::all() {
        generate_at_center(&distributor, RegionId::new(1, quadrant));
    }
    save_catalog_ledger(distributor.catalog(), &path).unwrap();

    let restored = distributor_with_ledger(&path);
    for quadrant in Quadrant::all() {
        let region = RegionId::new(1, quadrant);
        let center = restored.index().region_center(region).unwrap();
        assert!(restored
            .generate_if_needed(region, center, 200.0)
            .unwrap()
            .is_none());
    }
}

fn distributor_with_ledger(path: &std::path::Path) -> RockDistributor {
    let catalog = catalog();
    restore_catalog_ledger(&catalog, path).unwrap();
    RockDistributor::new(3, DistributionConfig::default(), catalog, rolling).unwrap()
}

// ============================================================================
// Configuration tests
// ============================================================================

#[test]
fn test_invalid_configs_fail_fast() {
    let mut config = DistributionConfig::default();
    config.rings.growth_factor = 1.0;
    assert!(matches!(
        RockDistributor::new(1, config, catalog(), flat),
        Err(ConfigError::GrowthFactor(_))
    ));

    let mut config = DistributionConfig::default();
    config.corridors.max_point_retries = 0;
    assert!(matches!(
        RockDistributor::new(1, config, catalog(), flat),
        Err(ConfigError::ZeroCount { .. })
    ));

    let mut rings = DistributionConfig::default().rings;
    rings.max_extension_iterations = 0;
    assert!(RingCatalog::new(rings).is_err());

    // A catalog built from other rings is not silently adopted
    let wide = DistributionConfig::preset_wide_rings();
    let wide_catalog = Arc::new(RingCatalog::from_config(&wide).unwrap());
    assert!(matches!(
        RockDistributor::new(1, DistributionConfig::default(), wide_catalog, flat),
        Err(ConfigError::CatalogMismatch)
    ));
}

#[test]
fn test_presets_round_trip_and_generate() {
    for name in ["default", "sparse", "dense", "wide_rings"] {
        let preset = DistributionConfig::preset(name).unwrap();
        let parsed = DistributionConfig::from_ron(&preset.to_ron().unwrap()).unwrap();
        assert_eq!(parsed, preset);

        let catalog = Arc::new(RingCatalog::from_config(&parsed).unwrap());
        let distributor = RockDistributor::new(10, parsed, catalog, rolling).unwrap();
        let region = RegionId::new(2, Quadrant::NegXPosZ);
        assert!(!generate_at_center(&distributor, region).is_empty());
    }
}
