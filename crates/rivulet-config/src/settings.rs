//! Engine settings file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use rivulet_core::EngineConfig;

use crate::error::{ConfigError, write_with_parents};
use crate::validation::{ValidationResult, validate_settings};

/// Engine run settings, stored as TOML.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// buffer_size = 1024
/// cycles = 100
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per node per cycle.
    pub buffer_size: usize,
    /// Cycles per run; 0 runs until cancelled.
    pub cycles: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 1024,
            cycles: 100,
        }
    }
}

impl EngineSettings {
    /// Load settings from a TOML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings = Self::from_toml(&content)?;
        tracing::debug!("settings_load: {settings:?} from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: EngineSettings = toml::from_str(toml_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_with_parents(path.as_ref(), &self.to_toml()?)
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges; see [`validate_settings`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_settings(self)
    }

    /// Cycle limit for a driver run; `None` when unbounded.
    pub fn cycle_limit(&self) -> Option<u64> {
        (self.cycles > 0).then_some(self.cycles)
    }

    /// The engine configuration these settings describe.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            sample_rate: self.sample_rate as f32,
            buffer_size: self.buffer_size,
        }
    }
}
