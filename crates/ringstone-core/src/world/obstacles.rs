//! Spatial index of placed features
//!
//! Backed by an R-tree over planar (x, z) points. One set is built per
//! region generation and consulted by the spacing check, clearing
//! detection, entry validation and corridor clearance.

use glam::DVec3;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::world::features::SizeCategory;

/// A placed feature as seen by spacing and clearance queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub size: SizeCategory,
    /// Minimum spacing this feature demands from its neighbors
    pub spacing: f64,
}

type ObstaclePoint = GeomWithData<[f64; 2], Obstacle>;

#[derive(Default)]
pub struct ObstacleSet {
    tree: RTree<ObstaclePoint>,
    max_spacing: f64,
}

impl std::fmt::Debug for ObstacleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleSet")
            .field("len", &self.tree.size())
            .field("max_spacing", &self.max_spacing)
            .finish()
    }
}

fn planar(position: DVec3) -> [f64; 2] {
    [position.x, position.z]
}

fn distance_squared(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dz = a[1] - b[1];
    dx * dx + dz * dz
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, position: DVec3, size: SizeCategory, spacing: f64) {
        self.max_spacing = self.max_spacing.max(spacing);
        self.tree
            .insert(GeomWithData::new(planar(position), Obstacle { size, spacing }));
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Whether a candidate with `spacing` would sit too close to any feature
    ///
    /// The required gap is the larger of the two features' spacings.
    pub fn violates_spacing(&self, position: DVec3, spacing: f64) -> bool {
        let point = planar(position);
        let search = spacing.max(self.max_spacing);
        self.tree
            .locate_within_distance(point, search * search)
            .any(|existing| {
                let required = spacing.max(existing.data.spacing);
                distance_squared(*existing.geom(), point) < required * required
            })
    }

    /// Planar distance to the nearest feature
    pub fn nearest_distance(&self, position: DVec3) -> Option<f64> {
        let point = planar(position);
        self.tree
            .nearest_neighbor(&point)
            .map(|nearest| distance_squared(*nearest.geom(), point).sqrt())
    }

    /// Number of features within `radius`
    pub fn count_within(&self, position: DVec3, radius: f64) -> usize {
        self.tree
            .locate_within_distance(planar(position), radius * radius)
            .count()
    }

    /// Whether every feature keeps at least `clearance` from the segment a-b
    pub fn segment_is_clear(&self, a: DVec3, b: DVec3, clearance: f64) -> bool {
        let start = planar(a);
        let end = planar(b);
        let mid = [(start[0] + end[0]) * 0.5, (start[1] + end[1]) * 0.5];
        let reach = distance_squared(start, end).sqrt() * 0.5 + clearance;

        self.tree
            .locate_within_distance(mid, reach * reach)
            .all(|existing| {
                segment_distance_squared(*existing.geom(), start, end) >= clearance * clearance
            })
    }

    /// Whether every feature keeps at least `clearance` from a point
    pub fn point_is_clear(&self, position: DVec3, clearance: f64) -> bool {
        self.count_within_strict(position, clearance) == 0
    }

    fn count_within_strict(&self, position: DVec3, radius: f64) -> usize {
        let point = planar(position);
        self.tree
            .locate_within_distance(point, radius * radius)
            .filter(|existing| distance_squared(*existing.geom(), point) < radius * radius)
            .count()
    }
}

fn segment_distance_squared(point: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let length_squared = ab[0] * ab[0] + ab[1] * ab[1];
    if length_squared <= f64::EPSILON {
        return distance_squared(point, a);
    }
    let t = (((point[0] - a[0]) * ab[0] + (point[1] - a[1]) * ab[1]) / length_squared)
        .clamp(0.0, 1.0);
    distance_squared(point, [a[0] + ab[0] * t, a[1] + ab[1] * t])
}
