//! Headless region preview: generate regions and dump them as RON

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::DVec3;
use ringstone_core::world::persistence::{restore_catalog_ledger, save_catalog_ledger};
use ringstone_core::world::{
    PlacementRecord, Quadrant, RegionId, RegionLayout, RegionRequest, RingCatalog,
    RingDefinition, RockDistributor,
};
use serde::{Deserialize, Serialize};

use crate::config::{PreviewConfig, TerrainConfig};

/// One generated region as written to the preview output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionPreview {
    pub layout: RegionLayout,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<PlacementRecord>,
}

/// Whole preview document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewDocument {
    pub seed: u64,
    pub distribution: String,
    pub regions: Vec<RegionPreview>,
}

/// Gentle rolling hills, or flat ground when the amplitude is zero
pub fn terrain(config: &TerrainConfig) -> impl Fn(DVec3) -> f64 + Send + Sync + 'static {
    let amplitude = config.amplitude;
    let frequency = config.frequency * std::f64::consts::TAU;
    move |position: DVec3| {
        amplitude * 0.5 * ((position.x * frequency).sin() + (position.z * frequency * 0.8).cos())
    }
}

/// Build a distributor from the layered config, restoring a ledger if given
pub fn build_distributor(config: &PreviewConfig, ledger: Option<&Path>) -> Result<RockDistributor> {
    let distribution = config.distribution()?;
    let catalog = Arc::new(
        RingCatalog::from_config(&distribution).context("Invalid ring configuration")?,
    );

    if let Some(path) = ledger
        && path.exists()
    {
        let restored = restore_catalog_ledger(&catalog, path)?;
        log::info!("Restored {} generated regions from {:?}", restored, path);
    }

    RockDistributor::new(
        config.world.seed,
        distribution,
        catalog,
        terrain(&config.terrain),
    )
    .context("Invalid distribution configuration")
}

/// Regions of a ring, either one quadrant or all four
pub fn regions_for(ring: u32, quadrant: Option<Quadrant>) -> Vec<RegionId> {
    match quadrant {
        Some(quadrant) => vec![RegionId::new(ring, quadrant)],
        None => Quadrant::all()
            .into_iter()
            .map(|quadrant| RegionId::new(ring, quadrant))
            .collect(),
    }
}

/// Generate the given regions around their centers
///
/// Regions the catalog already lists as generated are skipped.
pub fn generate_preview(
    distributor: &RockDistributor,
    regions: &[RegionId],
    footprint: f64,
    include_records: bool,
) -> Result<PreviewDocument> {
    let mut requests = Vec::with_capacity(regions.len());
    for &region in regions {
        if distributor.catalog().is_region_generated(region) {
            log::info!("Skipping {}: already in the ledger", region);
            continue;
        }
        requests.push(RegionRequest {
            region,
            center: distributor.index().region_center(region)?,
            footprint,
        });
    }

    let results = distributor.generate_many(&requests);
    let mut previews = Vec::with_capacity(requests.len());
    for (request, result) in requests.iter().zip(results) {
        let records = result.with_context(|| format!("Failed to generate {}", request.region))?;
        let layout = distributor
            .layout(request.region)
            .with_context(|| format!("No layout cached for {}", request.region))?;
        previews.push(RegionPreview {
            layout: layout.as_ref().clone(),
            records: if include_records { records } else { Vec::new() },
        });
    }

    Ok(PreviewDocument {
        seed: distributor.seed(),
        distribution: distributor.config().name.clone(),
        regions: previews,
    })
}

/// Ring definitions `0..count`, extending the catalog as needed
pub fn ring_table(catalog: &RingCatalog, count: u32) -> Result<Vec<RingDefinition>> {
    (0..count)
        .map(|index| catalog.ring_definition(index).map_err(Into::into))
        .collect()
}

/// Serialize a preview document
pub fn to_ron(document: &PreviewDocument, pretty: bool) -> Result<String> {
    let serialized = if pretty {
        ron::ser::to_string_pretty(document, ron::ser::PrettyConfig::default())
    } else {
        ron::ser::to_string(document)
    };
    serialized.context("Failed to serialize preview")
}

/// Save the distributor's generated set
pub fn save_ledger(distributor: &RockDistributor, path: &Path) -> Result<()> {
    save_catalog_ledger(distributor.catalog(), path)
}
