//! Delivery pattern classification

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::timeline::daily_totals;
use super::DeliveryPatternConfig;
use crate::config::ConfigError;
use crate::daterange::DateWindow;
use crate::models::insight::InsightRow;

/// How continuously an entity delivered across a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPattern {
    /// No delivery days at all
    None,
    /// Delivered every day of the window
    Continuous,
    /// Exactly one delivery day in a multi-day window
    Single,
    /// Delivery ratio above the partial cutoff
    Partial,
    Intermittent,
}

impl DeliveryPattern {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Continuous => "continuous",
            Self::Single => "single",
            Self::Partial => "partial",
            Self::Intermittent => "intermittent",
        }
    }
}

/// Pattern analysis for one entity over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPatternReport {
    pub total_requested_days: u32,
    pub actual_delivery_days: u32,
    /// actual / total, always within [0, 1]
    pub delivery_ratio: f64,
    pub pattern: DeliveryPattern,
    pub first_delivery_date: Option<NaiveDate>,
    pub last_delivery_date: Option<NaiveDate>,
}

/// Classifies delivery continuity of an entity's rows
#[derive(Debug, Clone, Default)]
pub struct DeliveryPatternAnalyzer {
    config: DeliveryPatternConfig,
}

impl DeliveryPatternAnalyzer {
    pub fn new(config: DeliveryPatternConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DeliveryPatternConfig {
        &self.config
    }

    /// Analyze one entity's rows against `window`.
    ///
    /// A delivery day is a distinct `date_start` inside the window whose
    /// summed rows show impressions or spend, the same rule the delivery
    /// timeline uses. Per-platform rows for one day count once. Undated rows
    /// and rows outside the window are ignored.
    pub fn analyze<'a, I>(&self, rows: I, window: &DateWindow) -> DeliveryPatternReport
    where
        I: IntoIterator<Item = &'a InsightRow>,
    {
        let delivery_days: BTreeSet<NaiveDate> = daily_totals(rows, window)
            .into_iter()
            .filter(|(_, metrics)| metrics.has_delivery())
            .map(|(date, _)| date)
            .collect();

        let total_requested_days = window.total_days();
        let actual_delivery_days = delivery_days.len() as u32;
        let delivery_ratio = if total_requested_days == 0 {
            0.0
        } else {
            (actual_delivery_days as f64 / total_requested_days as f64).min(1.0)
        };

        DeliveryPatternReport {
            total_requested_days,
            actual_delivery_days,
            delivery_ratio,
            pattern: self.classify(actual_delivery_days, total_requested_days, delivery_ratio),
            first_delivery_date: delivery_days.first().copied(),
            last_delivery_date: delivery_days.last().copied(),
        }
    }

    /// Rules are checked in order; the first match wins
    fn classify(&self, actual_days: u32, total_days: u32, ratio: f64) -> DeliveryPattern {
        if actual_days == 0 {
            DeliveryPattern::None
        } else if actual_days >= total_days {
            DeliveryPattern::Continuous
        } else if actual_days == 1 && total_days > 1 {
            DeliveryPattern::Single
        } else if ratio > self.config.partial_ratio_cutoff {
            DeliveryPattern::Partial
        } else {
            DeliveryPattern::Intermittent
        }
    }
}
