//! Date-range-aware fatigue module
//!
//! Scores creative (CTR), audience (frequency) and platform (CPM) fatigue per
//! entity. Short date ranges, or entities with few data points, are judged
//! with stricter thresholds; long ranges additionally get CTR trend
//! statistics.

pub mod engine;
pub mod recommendations;
pub mod timeseries;
pub mod types;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub use engine::DateRangeAwareFatigueEngine;
pub use types::{
    AdFatigueGap, FatigueAnalysis, FatigueIndicatorSet, FatigueSeverity, FatigueSummary,
    RangeKind, TimeSeriesInsight,
};

/// Overall-score boundaries. Indicator scores (low=1, medium=2, high=3) are
/// summed, so the total runs from 3 to 9.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityTiers {
    /// Total at or above this is medium
    pub medium: u32,
    /// Total at or above this is high
    pub high: u32,
}

/// Fatigue thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Entities with fewer daily points are treated as short-term (default: 7)
    pub min_data_points: usize,
    /// Relative CTR change that counts as a trend (default: 0.20)
    pub ctr_decline_threshold: f64,
    /// Relative CPM change that counts as a trend (default: 0.25)
    pub cpm_increase_threshold: f64,
    /// Frequency at which audience fatigue becomes medium (default: 3.0)
    pub frequency_warning: f64,
    /// Absolute frequency change treated as stable (default: 0.2)
    pub frequency_dead_band: f64,
    /// Applied to CTR/CPM thresholds on short-term ranges (default: 0.8)
    pub short_term_multiplier: f64,
    /// Change above threshold * this is high severity (default: 1.5)
    pub severity_escalation: f64,
    /// Frequency above warning * this is high severity (default: 1.3)
    pub frequency_high_multiplier: f64,
    /// Points needed before checking weekly seasonality (default: 30)
    pub seasonality_min_points: usize,
    /// Lag-7 autocorrelation above which CTR is seasonal (default: 0.5)
    pub seasonality_autocorrelation: f64,
    pub short_term_tiers: SeverityTiers,
    pub long_term_tiers: SeverityTiers,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            min_data_points: 7,
            ctr_decline_threshold: 0.20,
            cpm_increase_threshold: 0.25,
            frequency_warning: 3.0,
            frequency_dead_band: 0.2,
            short_term_multiplier: 0.8,
            severity_escalation: 1.5,
            frequency_high_multiplier: 1.3,
            seasonality_min_points: 30,
            seasonality_autocorrelation: 0.5,
            short_term_tiers: SeverityTiers { medium: 4, high: 6 },
            long_term_tiers: SeverityTiers { medium: 5, high: 7 },
        }
    }
}

impl FatigueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ctr_decline_threshold", self.ctr_decline_threshold),
            ("cpm_increase_threshold", self.cpm_increase_threshold),
            ("frequency_warning", self.frequency_warning),
            ("short_term_multiplier", self.short_term_multiplier),
            ("severity_escalation", self.severity_escalation),
            ("frequency_high_multiplier", self.frequency_high_multiplier),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Fatigue(format!(
                    "{} must be positive (got {})",
                    name, value
                )));
            }
        }
        if !(self.frequency_dead_band >= 0.0) {
            return Err(ConfigError::Fatigue(format!(
                "frequency_dead_band must be >= 0 (got {})",
                self.frequency_dead_band
            )));
        }
        if self.min_data_points < 2 {
            return Err(ConfigError::Fatigue(format!(
                "min_data_points must be at least 2 (got {})",
                self.min_data_points
            )));
        }
        for (name, tiers) in [
            ("short_term_tiers", &self.short_term_tiers),
            ("long_term_tiers", &self.long_term_tiers),
        ] {
            if tiers.medium >= tiers.high {
                return Err(ConfigError::Fatigue(format!(
                    "{}: medium ({}) must be below high ({})",
                    name, tiers.medium, tiers.high
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_valid() {
        assert!(FatigueConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_term_tiers_tighter() {
        let config = FatigueConfig::default();
        assert!(config.short_term_tiers.medium < config.long_term_tiers.medium);
        assert!(config.short_term_tiers.high < config.long_term_tiers.high);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = FatigueConfig {
            ctr_decline_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Fatigue(_))));

        let config = FatigueConfig {
            long_term_tiers: SeverityTiers { medium: 7, high: 7 },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FatigueConfig {
            min_data_points: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
