//! Feature vocabulary shared by the planner, the placement search and the zone carver
//!
//! Everything here is plain data: size categories and their scale ranges,
//! formation kinds, size distributions and the placement records handed to the
//! content-instantiation layer.

use bitflags::bitflags;
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::world::discovery_zones::ZoneId;

/// Rock size categories, ordered from smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeCategory {
    Tiny,
    Small,
    Medium,
    Large,
    Massive,
}

impl SizeCategory {
    /// All categories in ascending order
    pub fn all() -> &'static [SizeCategory] {
        &[
            SizeCategory::Tiny,
            SizeCategory::Small,
            SizeCategory::Medium,
            SizeCategory::Large,
            SizeCategory::Massive,
        ]
    }

    /// Position in [`SizeCategory::all`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Uniform scale range `(min, max)` for this category
    pub fn scale_range(self) -> (f64, f64) {
        match self {
            SizeCategory::Tiny => (0.3, 0.8),
            SizeCategory::Small => (0.8, 1.5),
            SizeCategory::Medium => (1.5, 2.5),
            SizeCategory::Large => (2.5, 4.0),
            SizeCategory::Massive => (4.0, 6.5),
        }
    }

    /// Cluster size range for categories that may spawn as multi-object clusters
    pub fn cluster_range(self) -> Option<(u8, u8)> {
        match self {
            SizeCategory::Large => Some((3, 5)),
            SizeCategory::Massive => Some((4, 7)),
            _ => None,
        }
    }

    pub fn is_large(self) -> bool {
        self >= SizeCategory::Large
    }

    pub fn mask(self) -> SizeMask {
        match self {
            SizeCategory::Tiny => SizeMask::TINY,
            SizeCategory::Small => SizeMask::SMALL,
            SizeCategory::Medium => SizeMask::MEDIUM,
            SizeCategory::Large => SizeMask::LARGE,
            SizeCategory::Massive => SizeMask::MASSIVE,
        }
    }
}

bitflags! {
    /// Set of size categories (formation preferences)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SizeMask: u8 {
        const TINY = 1 << 0;
        const SMALL = 1 << 1;
        const MEDIUM = 1 << 2;
        const LARGE = 1 << 3;
        const MASSIVE = 1 << 4;
    }
}

impl SizeMask {
    pub fn contains_size(self, size: SizeCategory) -> bool {
        self.contains(size.mask())
    }
}

/// Weights over the five size categories
///
/// Stored as a fixed array so iteration order (and therefore every weighted
/// draw) is stable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeDistribution {
    weights: [f64; 5],
}

impl SizeDistribution {
    /// Build from raw weights (Tiny..Massive) and normalize
    ///
    /// Negative or non-finite weights count as zero; an all-zero input becomes
    /// uniform.
    pub fn from_weights(weights: [f64; 5]) -> Self {
        let mut distribution = Self { weights };
        distribution.normalize();
        distribution
    }

    /// Normalized weight of a category
    pub fn get(&self, size: SizeCategory) -> f64 {
        self.weights[size.index()]
    }

    pub fn weights(&self) -> [f64; 5] {
        self.weights
    }

    /// Multiply each weight by the matching factor and renormalize
    pub fn reweighted(&self, factors: [f64; 5]) -> Self {
        let mut weights = self.weights;
        for (weight, factor) in weights.iter_mut().zip(factors) {
            *weight *= factor;
        }
        Self::from_weights(weights)
    }

    /// Multiply favored categories by `boost` and renormalize
    pub fn favoring(&self, favored: SizeMask, boost: f64) -> Self {
        let mut factors = [1.0; 5];
        for &size in SizeCategory::all() {
            if favored.contains_size(size) {
                factors[size.index()] = boost;
            }
        }
        self.reweighted(factors)
    }

    /// Linear blend toward `other` (`t = 0` keeps self, `t = 1` yields other)
    pub fn blend(&self, other: &SizeDistribution, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut weights = [0.0; 5];
        for (i, weight) in weights.iter_mut().enumerate() {
            *weight = self.weights[i] * (1.0 - t) + other.weights[i] * t;
        }
        Self::from_weights(weights)
    }

    /// Pick a category from a uniform value in [0, 1)
    pub fn pick(&self, roll: f64) -> SizeCategory {
        let mut cumulative = 0.0;
        let mut last_nonzero = SizeCategory::Tiny;
        for &size in SizeCategory::all() {
            let weight = self.get(size);
            if weight <= 0.0 {
                continue;
            }
            last_nonzero = size;
            cumulative += weight;
            if roll < cumulative {
                return size;
            }
        }
        // Rounding left a sliver past the last bucket
        last_nonzero
    }

    fn normalize(&mut self) {
        for weight in &mut self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                *weight = 0.0;
            }
        }
        let sum: f64 = self.weights.iter().sum();
        if sum <= 0.0 {
            self.weights = [0.2; 5];
        } else {
            for weight in &mut self.weights {
                *weight /= sum;
            }
        }
    }
}

/// Named geological clustering patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormationKind {
    Battlefield,
    Landslide,
    Erosion,
    Amphitheater,
    Outcrop,
    Scattered,
}

impl FormationKind {
    /// Base radius before per-formation variation
    pub fn base_radius(self) -> f64 {
        match self {
            FormationKind::Battlefield => 30.0,
            FormationKind::Landslide => 25.0,
            FormationKind::Erosion => 20.0,
            FormationKind::Amphitheater => 18.0,
            FormationKind::Outcrop => 12.0,
            FormationKind::Scattered => 35.0,
        }
    }

    /// Size categories this formation prefers
    pub fn favored_sizes(self) -> SizeMask {
        match self {
            FormationKind::Battlefield => SizeMask::MEDIUM | SizeMask::LARGE,
            FormationKind::Landslide => SizeMask::SMALL | SizeMask::MEDIUM | SizeMask::LARGE,
            FormationKind::Erosion => SizeMask::TINY | SizeMask::SMALL,
            FormationKind::Amphitheater => SizeMask::LARGE | SizeMask::MASSIVE,
            FormationKind::Outcrop => SizeMask::MEDIUM | SizeMask::LARGE | SizeMask::MASSIVE,
            FormationKind::Scattered => SizeMask::TINY | SizeMask::SMALL | SizeMask::MEDIUM,
        }
    }

    /// Formations whose large rocks can become landmarks
    pub fn hosts_landmarks(self) -> bool {
        matches!(self, FormationKind::Amphitheater | FormationKind::Outcrop)
    }
}

/// A geological formation planned for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub kind: FormationKind,
    pub center: DVec3,
    pub radius: f64,
    /// 0.0 - 1.0
    pub intensity: f64,
    pub favored_sizes: SizeMask,
}

impl Formation {
    /// Planar containment test (height ignored)
    pub fn contains(&self, position: DVec3) -> bool {
        planar_distance(self.center, position) <= self.radius
    }
}

/// Where a placement record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    /// Found by the placement search
    Feature,
    /// Tiny rock lining a corridor
    CorridorMarker,
    /// Large rock marking a corridor landmark
    CorridorLandmark,
    /// Medium rock framing a zone entry
    ZoneGateway,
}

/// Final placement handed to the content-instantiation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub position: DVec3,
    pub size_category: SizeCategory,
    /// Euler angles (XYZ order, radians)
    pub rotation: DVec3,
    pub scale: f64,
    pub formation_tag: Option<FormationKind>,
    pub is_landmark: bool,
    pub is_corridor_marker: bool,
    pub zone_id: Option<ZoneId>,
    /// Objects to spawn for this record (1 = single rock)
    pub cluster_count: u8,
    pub kind: PlacementKind,
}

/// Distance in the XZ plane
pub fn planar_distance(a: DVec3, b: DVec3) -> f64 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
