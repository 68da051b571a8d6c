//! Discovery zones - open clearings found between placed features
//!
//! Clearings are detected on a coarse grid over the search area, thinned by
//! greedy non-max suppression and then classified:
//! - Settlement: large clearing close to the world center
//! - Defensive: large clearing ringed by rocks
//! - Cache: small clearing tucked between rocks
//! - Scenic: anything else
//!
//! Every zone gets at least two entry points. Entries whose path from the
//! center is blocked are only used as fallbacks.

use std::cmp::Ordering;
use std::f64::consts::TAU;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::world::features::planar_distance;
use crate::world::obstacles::ObstacleSet;
use crate::world::placement::TerrainHeight;
use crate::world::region::{PlanarBounds, RegionId, RegionIndex, WORLD_CENTER};
use crate::world::rng_trait::WorldRng;
use crate::world::stats::GenStats;
use crate::world::worldgen_config::ZoneParams;

/// Extra radius around a zone for counting surrounding rocks
const NEARBY_MARGIN: f64 = 20.0;
/// Rocks around a large clearing that make it defensive
const DEFENSIVE_MIN_NEARBY: usize = 4;
/// Rocks around a small clearing that make it a cache
const CACHE_MIN_NEARBY: usize = 3;
/// Accessibility lost per obstacle near the center
const ACCESSIBILITY_PENALTY: f64 = 0.1;
const MIN_ACCESSIBILITY: f64 = 0.2;
const MIN_ENTRY_POINTS: usize = 2;

/// Zone identifier, unique within the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub region: RegionId,
    pub index: u32,
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}z{}", self.region, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneCategory {
    Settlement,
    Defensive,
    Cache,
    Scenic,
}

impl ZoneCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ZoneCategory::Settlement => "Settlement",
            ZoneCategory::Defensive => "Defensive",
            ZoneCategory::Cache => "Cache",
            ZoneCategory::Scenic => "Scenic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub position: DVec3,
    /// Force-added to reach the minimum; its path is not guaranteed clear
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryZone {
    pub id: ZoneId,
    pub center: DVec3,
    pub radius: f64,
    pub category: ZoneCategory,
    /// 0.2 - 1.0
    pub accessibility: f64,
    pub entry_points: Vec<EntryPoint>,
}

/// Open area found by the grid scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clearing {
    pub center: DVec3,
    pub radius: f64,
}

/// Finds and classifies open areas of one region
pub struct ZoneCarver<'a> {
    pub region: RegionId,
    pub index: &'a RegionIndex,
    pub obstacles: &'a ObstacleSet,
    pub terrain: &'a dyn TerrainHeight,
    pub params: &'a ZoneParams,
}

impl ZoneCarver<'_> {
    /// Grid scan for clearings; overlapping discs merge into the larger one
    pub fn detect_clearings(&self, area: &PlanarBounds) -> Result<Vec<Clearing>> {
        let step = self.params.grid_resolution;
        let size = area.size();
        let columns = (size.x / step).floor() as u32;
        let rows = (size.y / step).floor() as u32;

        let mut candidates = Vec::new();
        for row in 0..=rows {
            for column in 0..=columns {
                let x = area.min.x + column as f64 * step;
                let z = area.min.y + row as f64 * step;
                let point = DVec3::new(x, 0.0, z);
                if !self.index.contains(self.region, point)? {
                    continue;
                }

                let clearance = self
                    .obstacles
                    .nearest_distance(point)
                    .unwrap_or(f64::INFINITY);
                if clearance < self.params.clearance_threshold {
                    continue;
                }

                let height = self.terrain.height_at(point);
                if !height.is_finite() {
                    continue;
                }
                candidates.push(Clearing {
                    center: DVec3::new(x, height, z),
                    radius: clearance.min(self.params.max_zone_radius),
                });
            }
        }

        // Stable sort keeps grid order between equal radii
        candidates.sort_by(|a, b| b.radius.partial_cmp(&a.radius).unwrap_or(Ordering::Equal));

        let mut kept: Vec<Clearing> = Vec::new();
        for candidate in candidates {
            let suppressed = kept.iter().any(|k| {
                planar_distance(k.center, candidate.center) < k.radius + candidate.radius
            });
            if !suppressed {
                kept.push(candidate);
            }
        }
        Ok(kept)
    }

    /// Classify clearings and give each at least two entry points
    pub fn synthesize_zones<R: WorldRng>(
        &self,
        clearings: &[Clearing],
        rng: &mut R,
        stats: &mut dyn GenStats,
    ) -> Vec<DiscoveryZone> {
        clearings
            .iter()
            .enumerate()
            .map(|(i, clearing)| {
                let id = ZoneId {
                    region: self.region,
                    index: i as u32,
                };
                let nearby = self
                    .obstacles
                    .count_within(clearing.center, clearing.radius + NEARBY_MARGIN);
                let close = self
                    .obstacles
                    .count_within(clearing.center, self.params.nearby_radius);

                DiscoveryZone {
                    id,
                    center: clearing.center,
                    radius: clearing.radius,
                    category: self.categorize(clearing, nearby),
                    accessibility: (1.0 - ACCESSIBILITY_PENALTY * close as f64)
                        .clamp(MIN_ACCESSIBILITY, 1.0),
                    entry_points: self.entry_points(id, clearing, rng, stats),
                }
            })
            .collect()
    }

    fn categorize(&self, clearing: &Clearing, nearby: usize) -> ZoneCategory {
        let large = clearing.radius >= self.params.large_zone_radius;
        let small = clearing.radius < self.params.small_zone_radius;
        let near_origin =
            planar_distance(clearing.center, WORLD_CENTER) < self.params.settlement_distance;

        if near_origin && large {
            ZoneCategory::Settlement
        } else if large && nearby >= DEFENSIVE_MIN_NEARBY {
            ZoneCategory::Defensive
        } else if small && nearby >= CACHE_MIN_NEARBY {
            ZoneCategory::Cache
        } else {
            ZoneCategory::Scenic
        }
    }

    fn entry_points<R: WorldRng>(
        &self,
        id: ZoneId,
        clearing: &Clearing,
        rng: &mut R,
        stats: &mut dyn GenStats,
    ) -> Vec<EntryPoint> {
        let directions = rng.gen_range_u32(
            self.params.min_entry_directions,
            self.params.max_entry_directions,
        );
        let spread = TAU / directions as f64;
        let phase = rng.gen_range_f64(0.0, spread);
        let reach = clearing.radius * self.params.entry_radius_factor;

        let mut entries = Vec::new();
        let mut blocked = Vec::new();
        for k in 0..directions {
            let angle = phase + k as f64 * spread;
            let mut position =
                clearing.center + DVec3::new(reach * angle.sin(), 0.0, reach * angle.cos());
            let height = self.terrain.height_at(position);
            position.y = if height.is_finite() {
                height
            } else {
                clearing.center.y
            };

            if self
                .obstacles
                .segment_is_clear(clearing.center, position, self.params.entry_clearance)
            {
                entries.push(EntryPoint {
                    position,
                    fallback: false,
                });
            } else {
                blocked.push(position);
            }
        }

        if entries.len() < MIN_ENTRY_POINTS {
            // Most open blocked directions first
            let score = |p: &DVec3| self.obstacles.nearest_distance(*p).unwrap_or(f64::INFINITY);
            blocked.sort_by(|a, b| score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal));

            let missing = MIN_ENTRY_POINTS - entries.len();
            for position in blocked.into_iter().take(missing) {
                log::warn!(
                    "Zone {} has too few clear entries, adding fallback at ({:.1}, {:.1})",
                    id,
                    position.x,
                    position.z
                );
                stats.record_fallback_entry();
                entries.push(EntryPoint {
                    position,
                    fallback: true,
                });
            }
        }
        entries
    }
}
