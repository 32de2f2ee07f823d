//! Analysis configuration persisted as a JSON file.
//!
//! Every section defaults to the recording protocol's constants, so a
//! partial file (or `{}`) is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    gate::AcceptanceCriteria,
    pitch::PitchRangeConfig,
    vad::{trim::TrimConfig, VadConfig},
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AnalysisConfig {
    pub vad: VadConfig,
    pub trim: TrimConfig,
    pub acceptance: AcceptanceCriteria,
    pub pitch: PitchRangeConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.vad.validate()?;
        self.trim.validate()?;
        self.acceptance.validate()?;
        self.pitch.validate()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read and validate a config file.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let raw = fs::read_to_string(path)?;
    AnalysisConfig::from_json(&raw)
}

pub fn save_config(path: &Path, config: &AnalysisConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}
