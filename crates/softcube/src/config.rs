//! Run configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `softcube.ron` file (if exists), or the file given on the command line
//! 3. Environment variables prefixed with `SOFTCUBE_`
//!
//! Example environment variable: `SOFTCUBE_EVOLUTION__GENERATIONS=50`

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use softcube_core::{AssemblyConfig, OscillatorPalette, PhysicsConfig};

use crate::evolution::EvolutionConfig;

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "softcube";

/// Everything a run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SoftcubeConfig {
    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub palette: OscillatorPalette,

    #[serde(default)]
    pub assembly: AssemblyConfig,

    #[serde(default)]
    pub evolution: EvolutionConfig,
}

impl SoftcubeConfig {
    /// Load configuration with layered priority. A missing default file is
    /// fine; an explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("physics.gravity", f64::from(defaults.physics.gravity))?
            .set_default("physics.dt", f64::from(defaults.physics.dt))?
            .set_default("assembly.cube_count", defaults.assembly.cube_count as i64)?
            .set_default("evolution.generations", defaults.evolution.generations as i64)?
            .set_default("evolution.seed", defaults.evolution.seed as i64)?;

        // Layer 2: Config file
        let builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Ron).required(true)),
            None => builder.add_source(
                File::with_name(DEFAULT_CONFIG_FILE)
                    .format(FileFormat::Ron)
                    .required(false),
            ),
        };

        // Layer 3: Environment variables (SOFTCUBE_EVOLUTION__SEED, etc.)
        let builder = builder.add_source(
            Environment::with_prefix("SOFTCUBE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().context("Failed to build configuration")?;
        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse a RON document on top of the defaults
    pub fn from_ron(text: &str) -> Result<Self> {
        let loaded: Self = ron::from_str(text).context("Failed to parse RON configuration")?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        self.physics
            .validate()
            .map_err(|e| anyhow!("physics: {e}"))?;
        self.palette
            .validate()
            .map_err(|e| anyhow!("palette: {e}"))?;
        self.assembly
            .validate()
            .map_err(|e| anyhow!("assembly: {e}"))?;
        self.evolution
            .validate()
            .map_err(|e| anyhow!("evolution: {e}"))?;
        Ok(())
    }
}
