use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::scoring::{
    BandTable, FrameworkCriteria, ProxyDefaults, ReferenceData, VetoPolicy, WeightTable,
};

/// Everything the scoring pipeline reads. Every section is optional in the TOML form and
/// falls back to the built-in methodology.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub weights: WeightTable,
    pub bands: BandTable,
    pub veto: VetoPolicy,
    pub frameworks: FrameworkCriteria,
    pub proxy: ProxyDefaults,
    pub reference: ReferenceData,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Reports the first violation found, weights first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights
            .validate()
            .map_err(|reason| ConfigError::InvalidWeightTable { reason })?;

        let invalid = |reason: String| ConfigError::InvalidConfiguration { reason };
        self.bands.validate().map_err(invalid)?;
        self.veto.validate().map_err(invalid)?;
        self.frameworks.validate().map_err(invalid)?;
        self.proxy.validate().map_err(invalid)?;
        self.reference.validate().map_err(invalid)
    }
}
