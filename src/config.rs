//! Analysis configuration
//!
//! Every heuristic constant used by the engines lives in a named config
//! field with a documented default. [`AnalysisConfig`] bundles the
//! per-engine sections and can be loaded from JSON; any section or field
//! left out takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregator::AggregationConfig;
use crate::delivery::DeliveryPatternConfig;
use crate::fatigue::FatigueConfig;
use crate::gaps::GapDetectionConfig;

/// Configuration errors. Always fatal, raised before any analysis runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("gap thresholds must satisfy critical > major > minor > 0 (got critical={critical}, major={major}, minor={minor})")]
    GapThresholdOrder { critical: u32, major: u32, minor: u32 },

    #[error("min_gap_days must be at least 1 (got {0})")]
    MinGapDays(u32),

    #[error("invalid fatigue config: {0}")]
    Fatigue(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("date window start {start} is after end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// All engine configuration in one place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub aggregation: AggregationConfig,
    pub delivery: DeliveryPatternConfig,
    pub gaps: GapDetectionConfig,
    pub fatigue: FatigueConfig,
}

impl AnalysisConfig {
    /// Parse and validate a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!("Loaded analysis config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregation.validate()?;
        self.delivery.validate()?;
        self.gaps.validate()?;
        self.fatigue.validate()?;
        Ok(())
    }
}
