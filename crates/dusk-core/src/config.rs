use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read landscape config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse landscape config RON: {0}")]
    Parse(String),
    #[error("Invalid landscape config: {0}")]
    Invalid(String),
}

/// Tunables of the landscape store, loaded from RON.
///
/// Every field is optional in the RON source; missing fields take the value
/// from [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Stride given to new records and used to repair an invalid loaded stride.
    pub default_stride: f32,
    /// Smallest accepted height scaling factor.
    pub min_scale: f32,
    /// Maximum record count accepted when loading a file.
    pub max_records: u32,
    /// Capacity below which the record table doubles on growth.
    pub growth_doubling_limit: usize,
    /// Fixed growth increment above the doubling limit.
    pub growth_step: usize,
    /// Material name for solid meshes.
    pub land_material: String,
    /// RGBA colour for wireframe meshes.
    pub wireframe_colour: [f32; 4],
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            default_stride: DEFAULT_STRIDE,
            min_scale: MIN_SCALE,
            max_records: MAX_LAND_RECORDS,
            growth_doubling_limit: GROWTH_DOUBLING_LIMIT,
            growth_step: GROWTH_STEP,
            land_material: LAND_MATERIAL.to_string(),
            wireframe_colour: WIREFRAME_COLOUR,
        }
    }
}

impl LandscapeConfig {
    /// Parse a config from a RON string and validate it.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: Self = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a RON config file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_stride > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "default_stride must be positive, got {}",
                self.default_stride
            )));
        }
        if !(self.min_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if self.growth_step == 0 {
            return Err(ConfigError::Invalid("growth_step must not be zero".into()));
        }
        Ok(())
    }
}
