//! World distribution - rings, regions, rocks, zones and corridors

pub mod biome;
pub mod content_distributor;
pub mod corridors;
pub mod discovery_zones;
pub mod features;
pub mod generation;
pub mod geological_field;
pub mod obstacles;
pub mod persistence;
pub mod placement;
pub mod region;
pub mod ring_catalog;
pub mod rng_trait;
pub mod stats;
pub mod worldgen_config;

pub use biome::{BiomeArchetype, BiomeDefinition};
pub use content_distributor::{ContentDistributor, DistributionPlan, PlanSummary};
pub use corridors::{Corridor, CorridorId};
pub use discovery_zones::{Clearing, DiscoveryZone, EntryPoint, ZoneCarver, ZoneCategory, ZoneId};
pub use features::{
    Formation, FormationKind, PlacementKind, PlacementRecord, SizeCategory, SizeDistribution,
    SizeMask,
};
pub use generation::{CancelToken, RegionLayout, RegionRequest, RockDistributor};
pub use geological_field::{GeologicalField, NoiseField};
pub use obstacles::ObstacleSet;
pub use persistence::{load_generated_regions, save_generated_regions};
pub use placement::{PlacementContext, TerrainHeight};
pub use region::{PlanarBounds, Quadrant, RegionId, RegionIndex, RingBlend, WORLD_CENTER};
pub use ring_catalog::{BiomeStyle, RingCatalog, RingDefinition};
pub use rng_trait::WorldRng;
pub use stats::{GenStats, GenerationReport, NoopStats, RejectReason};
pub use worldgen_config::{
    CorridorParams, DistributionConfig, FractalTypeConfig, NoiseLayerConfig, NoiseParams,
    NoiseTypeConfig, PlacementParams, RingParams, SpacingTable, ZoneParams,
};
