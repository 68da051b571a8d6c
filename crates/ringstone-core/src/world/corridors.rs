//! Corridors - perturbed paths between nearby discovery zones
//!
//! Every point of a corridor path keeps `clearance` from every placed
//! feature. Points that cannot be cleared are dropped, and corridors left
//! with fewer than three points are discarded.

use std::f64::consts::PI;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::world::discovery_zones::{DiscoveryZone, ZoneId};
use crate::world::features::planar_distance;
use crate::world::obstacles::ObstacleSet;
use crate::world::region::RegionId;
use crate::world::rng_trait::WorldRng;
use crate::world::stats::GenStats;
use crate::world::worldgen_config::CorridorParams;

const MIN_SEGMENTS: u32 = 2;
const MIN_PATH_POINTS: usize = 3;
/// Fallback perturbation relative to the regular one
const FALLBACK_OFFSET_SHARE: f64 = 0.25;
/// Fallback step from the previous point toward the target, as a fraction
const FALLBACK_STEP: (f64, f64) = (0.3, 0.9);
/// Path points between landmarks
const LANDMARK_STRIDE: (u32, u32) = (2, 3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CorridorId {
    pub region: RegionId,
    pub index: u32,
}

impl fmt::Display for CorridorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}c{}", self.region, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: CorridorId,
    /// At least three points, from the first zone's center to the second's
    pub path: Vec<DVec3>,
    pub width: f64,
    pub connects: (ZoneId, ZoneId),
    pub landmarks: Vec<DVec3>,
}

/// Connect every zone pair closer than `max_connection_distance`
pub fn generate_corridors<R: WorldRng>(
    region: RegionId,
    zones: &[DiscoveryZone],
    obstacles: &ObstacleSet,
    params: &CorridorParams,
    rng: &mut R,
    stats: &mut dyn GenStats,
) -> Vec<Corridor> {
    let mut corridors = Vec::new();

    for (i, from) in zones.iter().enumerate() {
        for to in &zones[i + 1..] {
            let distance = planar_distance(from.center, to.center);
            if distance >= params.max_connection_distance {
                continue;
            }

            let width = rng.gen_range_f64(params.min_width, params.max_width);
            let path = carve_path(from.center, to.center, obstacles, params, rng, stats);
            if path.len() < MIN_PATH_POINTS {
                log::warn!(
                    "Discarded corridor {} -> {}: only {} clear points",
                    from.id,
                    to.id,
                    path.len()
                );
                stats.record_discarded_corridor();
                continue;
            }

            let landmarks = place_landmarks(&path, params, rng);
            corridors.push(Corridor {
                id: CorridorId {
                    region,
                    index: corridors.len() as u32,
                },
                path,
                width,
                connects: (from.id, to.id),
                landmarks,
            });
        }
    }

    corridors
}

fn carve_path<R: WorldRng>(
    start: DVec3,
    end: DVec3,
    obstacles: &ObstacleSet,
    params: &CorridorParams,
    rng: &mut R,
    stats: &mut dyn GenStats,
) -> Vec<DVec3> {
    let distance = planar_distance(start, end);
    let segments = ((distance / params.segment_length).ceil() as u32).max(MIN_SEGMENTS);
    let max_offset = (distance * params.offset_fraction).min(params.max_offset);
    let side = perpendicular(start, end);

    let mut path: Vec<DVec3> = Vec::with_capacity(segments as usize + 1);
    let mut keep = |point: DVec3, path: &mut Vec<DVec3>| {
        if obstacles.point_is_clear(point, params.clearance) {
            path.push(point);
        } else {
            log::debug!(
                "Dropped corridor point ({:.1}, {:.1}): no clearance",
                point.x,
                point.z
            );
            stats.record_dropped_corridor_point();
        }
    };

    keep(start, &mut path);

    for s in 1..segments {
        let t = s as f64 / segments as f64;
        let base = start.lerp(end, t);
        let envelope = (PI * t).sin();

        let perturbed = (0..params.max_point_retries).find_map(|_| {
            let offset = rng.gen_range_f64(-1.0, 1.0) * max_offset * envelope;
            let point = base + side * offset;
            obstacles
                .point_is_clear(point, params.clearance)
                .then_some(point)
        });

        let point = perturbed.or_else(|| {
            // Smaller steps from the last good point toward the target
            let previous = path.last().copied().unwrap_or(start);
            (0..params.max_point_retries).find_map(|_| {
                let step = rng.gen_range_f64(FALLBACK_STEP.0, FALLBACK_STEP.1);
                let offset =
                    rng.gen_range_f64(-1.0, 1.0) * max_offset * FALLBACK_OFFSET_SHARE;
                let point = previous.lerp(base, step) + side * offset;
                obstacles
                    .point_is_clear(point, params.clearance)
                    .then_some(point)
            })
        });

        // Unclearable points go through `keep` so they are logged and counted
        keep(point.unwrap_or(base), &mut path);
    }

    keep(end, &mut path);
    path
}

fn place_landmarks<R: WorldRng>(
    path: &[DVec3],
    params: &CorridorParams,
    rng: &mut R,
) -> Vec<DVec3> {
    let mut landmarks = Vec::new();
    let mut i = rng.gen_range_u32(LANDMARK_STRIDE.0, LANDMARK_STRIDE.1) as usize;
    while i < path.len() {
        let before = path[i - 1];
        let after = path[(i + 1).min(path.len() - 1)];
        let side = perpendicular(before, after);
        let sign = if rng.check_probability(0.5) { 1.0 } else { -1.0 };
        let offset = rng.gen_range_f64(params.landmark_offset_min, params.landmark_offset_max);
        landmarks.push(path[i] + side * sign * offset);
        i += rng.gen_range_u32(LANDMARK_STRIDE.0, LANDMARK_STRIDE.1) as usize;
    }
    landmarks
}

/// Unit vector in the XZ plane, perpendicular to a -> b
pub(crate) fn perpendicular(a: DVec3, b: DVec3) -> DVec3 {
    let direction = DVec3::new(b.x - a.x, 0.0, b.z - a.z).normalize_or_zero();
    DVec3::new(-direction.z, 0.0, direction.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use crate::world::discovery_zones::{EntryPoint, ZoneCategory};
    use crate::world::features::SizeCategory;
    use crate::world::region::Quadrant;
    use crate::world::stats::GenerationReport;

    fn region() -> RegionId {
        RegionId::new(2, Quadrant::PosXPosZ)
    }

    fn zone(index: u32, x: f64, z: f64) -> DiscoveryZone {
        DiscoveryZone {
            id: ZoneId {
                region: region(),
                index,
            },
            center: DVec3::new(x, 0.0, z),
            radius: 12.0,
            category: ZoneCategory::Scenic,
            accessibility: 1.0,
            entry_points: vec![EntryPoint {
                position: DVec3::new(x + 9.6, 0.0, z),
                fallback: false,
            }],
        }
    }

    fn run(
        zones: &[DiscoveryZone],
        obstacles: &ObstacleSet,
        seed: u64,
    ) -> (Vec<Corridor>, GenerationReport) {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let mut report = GenerationReport::default();
        let corridors = generate_corridors(
            region(),
            zones,
            obstacles,
            &CorridorParams::default(),
            &mut rng,
            &mut report,
        );
        (corridors, report)
    }

    #[test]
    fn test_open_ground_corridor() {
        let zones = [zone(0, 100.0, 100.0), zone(1, 140.0, 100.0)];
        let (corridors, report) = run(&zones, &ObstacleSet::new(), 1);

        assert_eq!(corridors.len(), 1);
        let corridor = &corridors[0];
        assert_eq!(corridor.connects, (zones[0].id, zones[1].id));
        assert!((3.0..=6.0).contains(&corridor.width));
        // ceil(40 / 8) = 5 segments -> 6 points
        assert_eq!(corridor.path.len(), 6);
        assert_eq!(corridor.path[0], zones[0].center);
        assert_eq!(*corridor.path.last().unwrap(), zones[1].center);
        assert!(!corridor.landmarks.is_empty());
        assert_eq!(report.dropped_corridor_points, 0);

        // Sideways perturbation stays within min(40 * 0.2, 6)
        for point in &corridor.path {
            assert!((point.z - 100.0).abs() <= 6.0 + 1e-9);
        }
    }

    #[test]
    fn test_distant_zones_not_connected() {
        let zones = [zone(0, 100.0, 100.0), zone(1, 160.0, 100.0)];
        let (corridors, _) = run(&zones, &ObstacleSet::new(), 1);
        assert!(corridors.is_empty());
    }

    #[test]
    fn test_every_point_keeps_clearance() {
        let zones = [
            zone(0, 100.0, 100.0),
            zone(1, 140.0, 110.0),
            zone(2, 120.0, 140.0),
        ];
        let mut obstacles = ObstacleSet::new();
        obstacles.insert(DVec3::new(120.0, 0.0, 104.0), SizeCategory::Medium, 4.5);
        obstacles.insert(DVec3::new(112.0, 0.0, 121.0), SizeCategory::Small, 3.0);
        obstacles.insert(DVec3::new(131.0, 0.0, 126.0), SizeCategory::Large, 6.0);

        for seed in 0..10 {
            let (corridors, report) = run(&zones, &obstacles, seed);
            for corridor in &corridors {
                assert!(corridor.path.len() >= 3);
                for point in &corridor.path {
                    assert!(obstacles.point_is_clear(*point, 4.5));
                }
            }
            assert_eq!(
                corridors.len() as u32 + report.discarded_corridors,
                3,
                "every close pair is either connected or discarded"
            );
        }
    }

    #[test]
    fn test_blocked_corridor_discarded() {
        let zones = [zone(0, 100.0, 100.0), zone(1, 116.0, 100.0)];
        let mut obstacles = ObstacleSet::new();
        // Wall across the whole gap
        for k in -30..=30 {
            obstacles.insert(DVec3::new(108.0, 0.0, 100.0 + k as f64), SizeCategory::Tiny, 2.0);
        }
        // Both endpoints are too close to the wall as well
        obstacles.insert(DVec3::new(102.0, 0.0, 100.0), SizeCategory::Tiny, 2.0);
        obstacles.insert(DVec3::new(114.0, 0.0, 100.0), SizeCategory::Tiny, 2.0);

        let (corridors, report) = run(&zones, &obstacles, 4);
        assert!(corridors.is_empty());
        assert_eq!(report.discarded_corridors, 1);
        assert!(report.dropped_corridor_points > 0);
    }

    #[test]
    fn test_landmarks_near_path() {
        let zones = [zone(0, 100.0, 100.0), zone(1, 100.0, 145.0)];
        let (corridors, _) = run(&zones, &ObstacleSet::new(), 9);
        let corridor = &corridors[0];
        for landmark in &corridor.landmarks {
            let nearest = corridor
                .path
                .iter()
                .map(|p| planar_distance(*p, *landmark))
                .fold(f64::INFINITY, f64::min);
            assert!(nearest <= 3.0 + 1e-9);
        }
    }

    #[test]
    fn test_perpendicular() {
        let side = perpendicular(DVec3::ZERO, DVec3::new(10.0, 5.0, 0.0));
        assert!((side - DVec3::new(0.0, 0.0, 1.0)).length() < 1e-12);
        assert_eq!(perpendicular(DVec3::ZERO, DVec3::ZERO), DVec3::ZERO);
    }
}
