//! Generated-region ledger on disk (RON)
//!
//! The ledger is a plain list of `(ring, quadrant)` pairs. Regions are
//! regenerated deterministically, so the ledger is all that needs saving.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::world::region::{Quadrant, RegionId};
use crate::world::ring_catalog::RingCatalog;

/// On-disk form of the ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionLedger {
    pub version: u32,
    pub regions: Vec<(u32, u8)>,
}

impl RegionLedger {
    pub fn from_regions(regions: &[RegionId]) -> Self {
        Self {
            version: 1,
            regions: regions
                .iter()
                .map(|region| (region.ring, region.quadrant.index()))
                .collect(),
        }
    }

    pub fn to_regions(&self) -> Result<Vec<RegionId>> {
        self.regions
            .iter()
            .map(|&(ring, quadrant)| match Quadrant::from_index(quadrant) {
                Some(quadrant) => Ok(RegionId::new(ring, quadrant)),
                None => bail!("Invalid quadrant {} for ring {} in ledger", quadrant, ring),
            })
            .collect()
    }
}

/// Write a ledger file, replacing any previous one
pub fn save_generated_regions(path: &Path, regions: &[RegionId]) -> Result<()> {
    let ledger = RegionLedger::from_regions(regions);
    let serialized = ron::ser::to_string_pretty(&ledger, ron::ser::PrettyConfig::default())
        .context("Failed to serialize region ledger")?;

    // Atomic write: write to temp file, then rename
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, serialized).context("Failed to write ledger temp file")?;
    std::fs::rename(&temp_path, path).context("Failed to rename ledger file")?;

    log::info!("Saved {} generated regions to {:?}", regions.len(), path);
    Ok(())
}

/// Read a ledger file
pub fn load_generated_regions(path: &Path) -> Result<Vec<RegionId>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read region ledger {:?}", path))?;
    let ledger: RegionLedger =
        ron::from_str(&contents).context("Failed to parse region ledger")?;
    let regions = ledger.to_regions()?;
    log::debug!("Loaded {} generated regions from {:?}", regions.len(), path);
    Ok(regions)
}

/// Save a catalog's generated set
pub fn save_catalog_ledger(catalog: &RingCatalog, path: &Path) -> Result<()> {
    save_generated_regions(path, &catalog.generated_regions())
}

/// Merge a saved ledger into a catalog, returning how many entries it held
pub fn restore_catalog_ledger(catalog: &RingCatalog, path: &Path) -> Result<usize> {
    let regions = load_generated_regions(path)?;
    let count = regions.len();
    catalog.restore_generated(regions);
    Ok(count)
}
