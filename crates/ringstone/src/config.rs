//! Preview configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `ringstone.ron` file (if exists)
//! 3. Environment variables prefixed with `RINGSTONE_`
//!
//! Example environment variable: `RINGSTONE_WORLD__SEED=1234`

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use ringstone_core::world::DistributionConfig;
use serde::{Deserialize, Serialize};

/// Main preview configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreviewConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub terrain: TerrainConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// Which world to distribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub seed: u64,
    /// Built-in distribution preset: default, sparse, dense, wide_rings
    pub preset: String,
    /// RON file holding a full distribution config; overrides `preset`
    #[serde(default)]
    pub distribution_file: Option<String>,
    /// Side of the square search area around each region center
    pub footprint: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            preset: "default".to_string(),
            distribution_file: None,
            footprint: 200.0,
        }
    }
}

/// Synthetic terrain the preview places rocks on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Peak height of the rolling hills (0 = flat ground)
    pub amplitude: f64,
    /// Hill frequency in cycles per world unit
    pub frequency: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            frequency: 0.03,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include every placement record, not just the layout summary
    pub include_records: bool,
    /// Pretty-print the RON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_records: true,
            pretty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl PreviewConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `ringstone.ron` file (if exists)
    /// 3. Environment variables prefixed with `RINGSTONE_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from("ringstone")
    }

    /// Same as [`PreviewConfig::load`] with a different file stem
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("world.seed", 42_u64)?
            .set_default("world.preset", "default")?
            .set_default("world.footprint", 200.0)?
            .set_default("terrain.amplitude", 2.0)?
            .set_default("terrain.frequency", 0.03)?
            .set_default("output.include_records", true)?
            .set_default("output.pretty", true)?
            .set_default("debug.verbose_logging", false)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_stem)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (RINGSTONE_WORLD__SEED, etc.)
            .add_source(Environment::with_prefix("RINGSTONE").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Resolve the distribution config named by the world section
    pub fn distribution(&self) -> Result<DistributionConfig> {
        if let Some(path) = &self.world.distribution_file {
            let source = std::fs::read_to_string(Path::new(path))
                .with_context(|| format!("Failed to read distribution config {}", path))?;
            return DistributionConfig::from_ron(&source);
        }

        DistributionConfig::preset(&self.world.preset)
            .ok_or_else(|| anyhow!("Unknown distribution preset '{}'", self.world.preset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreviewConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.preset, "default");
        assert_eq!(config.world.footprint, 200.0);
        assert!(config.output.pretty);
        assert!(!config.debug.verbose_logging);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config =
            PreviewConfig::load_from("ringstone-test-missing").expect("Failed to load config");
        assert_eq!(config.terrain.frequency, 0.03);
        assert!(config.world.distribution_file.is_none());
    }

    #[test]
    fn test_distribution_from_preset() {
        let mut config = PreviewConfig::default();
        config.world.preset = "sparse".to_string();
        assert_eq!(config.distribution().unwrap().name, "Sparse");

        config.world.preset = "nonexistent".to_string();
        assert!(config.distribution().is_err());
    }

    #[test]
    fn test_distribution_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.ron");
        std::fs::write(&path, DistributionConfig::preset_dense().to_ron().unwrap()).unwrap();

        let mut config = PreviewConfig::default();
        config.world.distribution_file = Some(path.to_string_lossy().into_owned());
        assert_eq!(
            config.distribution().unwrap(),
            DistributionConfig::preset_dense()
        );
    }
}
