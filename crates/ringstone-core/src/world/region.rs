//! Region addressing - maps world positions onto (ring, quadrant) regions
//!
//! The world is centered on the origin. Rings are annuli of increasing radius;
//! each ring is cut into four quadrants by the sign of the planar offset. A
//! region is the unit of generation and caching.

use std::fmt;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldGenError};
use crate::world::features::planar_distance;
use crate::world::ring_catalog::{RingCatalog, RingDefinition};

/// Center of the ring layout
pub const WORLD_CENTER: DVec3 = DVec3::ZERO;

/// 90 degree sector, decided by the sign of (dx, dz). Zero counts as positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// 0: +x +z
    PosXPosZ,
    /// 1: +x -z
    PosXNegZ,
    /// 2: -x -z
    NegXNegZ,
    /// 3: -x +z
    NegXPosZ,
}

impl Quadrant {
    pub fn all() -> [Quadrant; 4] {
        [
            Quadrant::PosXPosZ,
            Quadrant::PosXNegZ,
            Quadrant::NegXNegZ,
            Quadrant::NegXPosZ,
        ]
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Quadrant::PosXPosZ),
            1 => Some(Quadrant::PosXNegZ),
            2 => Some(Quadrant::NegXNegZ),
            3 => Some(Quadrant::NegXPosZ),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Quadrant of a planar offset from the world center
    pub fn from_offset(dx: f64, dz: f64) -> Self {
        match (dx >= 0.0, dz >= 0.0) {
            (true, true) => Quadrant::PosXPosZ,
            (true, false) => Quadrant::PosXNegZ,
            (false, false) => Quadrant::NegXNegZ,
            (false, true) => Quadrant::NegXPosZ,
        }
    }

    /// Sign of x and z inside this quadrant
    pub fn signs(self) -> (f64, f64) {
        match self {
            Quadrant::PosXPosZ => (1.0, 1.0),
            Quadrant::PosXNegZ => (1.0, -1.0),
            Quadrant::NegXNegZ => (-1.0, -1.0),
            Quadrant::NegXPosZ => (-1.0, 1.0),
        }
    }

    /// Compass bearing of the sector midpoint, radians from +z toward +x
    pub fn mid_bearing(self) -> f64 {
        (self.index() as f64 * 90.0 + 45.0).to_radians()
    }
}

/// Identifies one region of the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId {
    pub ring: u32,
    pub quadrant: Quadrant,
}

impl RegionId {
    pub fn new(ring: u32, quadrant: Quadrant) -> Self {
        Self { ring, quadrant }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}q{}", self.ring, self.quadrant.index())
    }
}

/// Axis-aligned rectangle in the XZ plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl PlanarBounds {
    /// Square of side `size` centered on `center`
    pub fn square(center: DVec3, size: f64) -> Self {
        let half = size * 0.5;
        Self {
            min: DVec2::new(center.x - half, center.z - half),
            max: DVec2::new(center.x + half, center.z + half),
        }
    }

    /// Overlap of two rectangles, `None` when they are disjoint
    pub fn intersect(&self, other: &PlanarBounds) -> Option<PlanarBounds> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min.x <= max.x && min.y <= max.y).then_some(PlanarBounds { min, max })
    }

    pub fn contains(&self, position: DVec3) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.z >= self.min.y
            && position.z <= self.max.y
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

/// Blend weights near a ring boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingBlend {
    pub ring: u32,
    pub neighbor: Option<u32>,
    pub own_weight: f64,
    pub neighbor_weight: f64,
}

/// Resolves positions to regions against a shared ring catalog
#[derive(Debug, Clone)]
pub struct RegionIndex {
    catalog: Arc<RingCatalog>,
}

impl RegionIndex {
    pub fn new(catalog: Arc<RingCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<RingCatalog> {
        &self.catalog
    }

    /// Region containing a world position
    pub fn region_for(&self, position: DVec3) -> Result<RegionId> {
        let ring = self.ring_at(position)?;
        let offset = position - WORLD_CENTER;
        Ok(RegionId::new(ring.index, Quadrant::from_offset(offset.x, offset.z)))
    }

    /// Ring definition for a world position
    pub fn ring_at(&self, position: DVec3) -> Result<RingDefinition> {
        if !position.is_finite() {
            return Err(WorldGenError::NonFinitePosition(position));
        }
        self.catalog
            .ring_containing(planar_distance(position, WORLD_CENTER))
    }

    /// Representative point of a region: mid radius at the sector's mid bearing
    pub fn region_center(&self, region: RegionId) -> Result<DVec3> {
        let ring = self.catalog.ring_definition(region.ring)?;
        let radius = ring.mid_radius();
        let bearing = region.quadrant.mid_bearing();
        Ok(WORLD_CENTER + DVec3::new(radius * bearing.sin(), 0.0, radius * bearing.cos()))
    }

    /// Bounding rectangle of a region's sector
    pub fn region_bounds(&self, region: RegionId) -> Result<PlanarBounds> {
        let outer = self.catalog.ring_definition(region.ring)?.outer_radius;
        let (sx, sz) = region.quadrant.signs();
        let corner = DVec2::new(sx * outer, sz * outer);
        let center = DVec2::new(WORLD_CENTER.x, WORLD_CENTER.z);
        Ok(PlanarBounds {
            min: center + corner.min(DVec2::ZERO),
            max: center + corner.max(DVec2::ZERO),
        })
    }

    /// Whether a position lies inside a region, without growing the catalog
    pub fn contains(&self, region: RegionId, position: DVec3) -> Result<bool> {
        if !position.is_finite() {
            return Ok(false);
        }
        let offset = position - WORLD_CENTER;
        if Quadrant::from_offset(offset.x, offset.z) != region.quadrant {
            return Ok(false);
        }
        let ring = self.catalog.ring_definition(region.ring)?;
        Ok(ring.contains(planar_distance(position, WORLD_CENTER)))
    }

    /// Regions worth keeping loaded around a player
    ///
    /// Always includes the player's own region. Neighbors come from the
    /// adjacent rings and qualify when their center is within `render_distance`.
    pub fn active_regions(&self, player: DVec3, render_distance: f64) -> Result<Vec<RegionId>> {
        let own = self.region_for(player)?;
        let mut regions = vec![own];

        let first = own.ring.saturating_sub(1);
        let last = own.ring.saturating_add(1);
        for ring in first..=last {
            for quadrant in Quadrant::all() {
                let region = RegionId::new(ring, quadrant);
                let center = self.region_center(region)?;
                if planar_distance(center, player) <= render_distance {
                    regions.push(region);
                }
            }
        }

        regions.sort();
        regions.dedup();
        Ok(regions)
    }

    /// Blend weights toward the neighboring ring inside transition bands
    pub fn boundary_blend(&self, position: DVec3) -> Result<RingBlend> {
        let ring = self.ring_at(position)?;
        let half = self.catalog.params().transition_width * 0.5;
        let distance = planar_distance(position, WORLD_CENTER);

        let no_blend = RingBlend {
            ring: ring.index,
            neighbor: None,
            own_weight: 1.0,
            neighbor_weight: 0.0,
        };
        if half <= 0.0 {
            return Ok(no_blend);
        }

        let to_inner = distance - ring.inner_radius;
        let to_outer = ring.outer_radius - distance;
        let (neighbor, gap) = if ring.index > 0 && to_inner < half && to_inner <= to_outer {
            (ring.index - 1, to_inner)
        } else if to_outer < half {
            (ring.index + 1, to_outer)
        } else {
            return Ok(no_blend);
        };

        let neighbor_weight = 0.5 * (1.0 - gap / half);
        Ok(RingBlend {
            ring: ring.index,
            neighbor: Some(neighbor),
            own_weight: 1.0 - neighbor_weight,
            neighbor_weight,
        })
    }
}
