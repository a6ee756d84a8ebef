//! Delivery analysis module
//!
//! Looks at how continuously an entity delivered over a date window:
//! - Pattern classification (none, continuous, single, partial, intermittent)
//! - Daily delivery timeline with synthesized empty days
//! - Per-entity reports pairing the pattern with gap detection

pub mod pattern;
pub mod report;
pub mod timeline;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub use pattern::{DeliveryPattern, DeliveryPatternAnalyzer, DeliveryPatternReport};
pub use report::{analyze_entity_delivery, EntityDeliveryReport};
pub use timeline::build_timeline;

/// Delivery pattern thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryPatternConfig {
    /// Delivery ratio above which a window counts as `partial` (default: 0.7)
    pub partial_ratio_cutoff: f64,
}

impl Default for DeliveryPatternConfig {
    fn default() -> Self {
        Self {
            partial_ratio_cutoff: 0.7,
        }
    }
}

impl DeliveryPatternConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.partial_ratio_cutoff > 0.0 && self.partial_ratio_cutoff < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "delivery.partial_ratio_cutoff",
                reason: format!("must be within (0, 1) (got {})", self.partial_ratio_cutoff),
            });
        }
        Ok(())
    }
}
