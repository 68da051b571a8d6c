//! Generation statistics collection
//!
//! Recoverable conditions (rejected candidates, skipped features, dropped
//! corridor points) never surface as errors. They are recorded through
//! [`GenStats`] so hosts can still observe them.

use serde::{Deserialize, Serialize};

/// Why a placement candidate was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    OutsideRegion,
    NearOrigin,
    Spacing,
    Height,
    Slope,
    Density,
}

/// Trait for collecting generation statistics
pub trait GenStats {
    /// Record that a candidate failed validation
    fn record_rejection(&mut self, reason: RejectReason);

    /// Record that a feature was placed by the search
    fn record_placed(&mut self);

    /// Record that a feature exhausted its attempts and was skipped
    fn record_skipped(&mut self);

    /// Record that a corridor point could not be cleared and was dropped
    fn record_dropped_corridor_point(&mut self);

    /// Record that a corridor ended up with too few points
    fn record_discarded_corridor(&mut self);

    /// Record that an entry point was force-added below the minimum
    fn record_fallback_entry(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl GenStats for NoopStats {
    fn record_rejection(&mut self, _reason: RejectReason) {}
    fn record_placed(&mut self) {}
    fn record_skipped(&mut self) {}
    fn record_dropped_corridor_point(&mut self) {}
    fn record_discarded_corridor(&mut self) {}
    fn record_fallback_entry(&mut self) {}
}

/// Per-region counters, cached with the region layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub planned_features: u32,
    pub placed_features: u32,
    pub skipped_features: u32,

    pub rejected_outside_region: u32,
    pub rejected_near_origin: u32,
    pub rejected_spacing: u32,
    pub rejected_height: u32,
    pub rejected_slope: u32,
    pub rejected_density: u32,

    pub zones: u32,
    pub fallback_entry_points: u32,
    pub corridors: u32,
    pub discarded_corridors: u32,
    pub dropped_corridor_points: u32,

    /// Corridor markers, corridor landmarks and zone gateways
    pub injected_features: u32,
}

impl GenerationReport {
    pub fn total_rejections(&self) -> u32 {
        self.rejected_outside_region
            + self.rejected_near_origin
            + self.rejected_spacing
            + self.rejected_height
            + self.rejected_slope
            + self.rejected_density
    }

    pub fn rejections(&self, reason: RejectReason) -> u32 {
        match reason {
            RejectReason::OutsideRegion => self.rejected_outside_region,
            RejectReason::NearOrigin => self.rejected_near_origin,
            RejectReason::Spacing => self.rejected_spacing,
            RejectReason::Height => self.rejected_height,
            RejectReason::Slope => self.rejected_slope,
            RejectReason::Density => self.rejected_density,
        }
    }
}

impl GenStats for GenerationReport {
    fn record_rejection(&mut self, reason: RejectReason) {
        let counter = match reason {
            RejectReason::OutsideRegion => &mut self.rejected_outside_region,
            RejectReason::NearOrigin => &mut self.rejected_near_origin,
            RejectReason::Spacing => &mut self.rejected_spacing,
            RejectReason::Height => &mut self.rejected_height,
            RejectReason::Slope => &mut self.rejected_slope,
            RejectReason::Density => &mut self.rejected_density,
        };
        *counter += 1;
    }

    fn record_placed(&mut self) {
        self.placed_features += 1;
    }

    fn record_skipped(&mut self) {
        self.skipped_features += 1;
    }

    fn record_dropped_corridor_point(&mut self) {
        self.dropped_corridor_points += 1;
    }

    fn record_discarded_corridor(&mut self) {
        self.discarded_corridors += 1;
    }

    fn record_fallback_entry(&mut self) {
        self.fallback_entry_points += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_stats_records_nothing() {
        let mut stats = NoopStats;
        // Should do nothing without panicking
        stats.record_rejection(RejectReason::Slope);
        stats.record_placed();
        stats.record_skipped();
        stats.record_fallback_entry();
    }

    #[test]
    fn test_report_counts_rejections() {
        let mut report = GenerationReport::default();
        report.record_rejection(RejectReason::Spacing);
        report.record_rejection(RejectReason::Spacing);
        report.record_rejection(RejectReason::Height);

        assert_eq!(report.rejections(RejectReason::Spacing), 2);
        assert_eq!(report.rejections(RejectReason::Height), 1);
        assert_eq!(report.rejections(RejectReason::Density), 0);
        assert_eq!(report.total_rejections(), 3);
    }

    #[test]
    fn test_report_counts_outcomes() {
        let mut report = GenerationReport::default();
        let stats: &mut dyn GenStats = &mut report;
        stats.record_placed();
        stats.record_placed();
        stats.record_skipped();
        stats.record_dropped_corridor_point();
        stats.record_discarded_corridor();
        stats.record_fallback_entry();

        assert_eq!(report.placed_features, 2);
        assert_eq!(report.skipped_features, 1);
        assert_eq!(report.dropped_corridor_points, 1);
        assert_eq!(report.discarded_corridors, 1);
        assert_eq!(report.fallback_entry_points, 1);
    }
}
