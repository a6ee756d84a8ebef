//! Metrics data types
//!
//! Base (additive, per-row) metrics and the calculated metric set derived
//! from aggregated numerators and denominators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw metrics carried by a single insight row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseMetrics {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    /// Distinct-count metric, not additive across rows
    pub reach: u64,
    /// Average impressions per unique viewer, not additive across rows
    pub frequency: f64,
    pub conversions: f64,
    pub first_conversions: f64,
    pub unique_clicks: u64,
    /// Revenue attributed to conversions
    pub conversion_value: f64,
}

impl BaseMetrics {
    /// CTR of this row alone (clicks / impressions * 100)
    pub fn row_ctr(&self) -> f64 {
        if self.impressions == 0 {
            return 0.0;
        }
        self.clicks as f64 / self.impressions as f64 * 100.0
    }

    /// Whether the row shows any delivery at all
    pub fn has_delivery(&self) -> bool {
        self.impressions > 0 || self.spend > 0.0
    }
}

/// Aggregated totals plus ratios recomputed from them.
///
/// Ratios are never summed or averaged across rows. Each one is derived from
/// the totals in this struct and is 0 when its denominator is 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMetrics {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    /// Max of per-row reach; an approximation, not a true unique count
    pub reach: u64,
    /// Mean of non-zero per-row frequencies
    pub frequency: f64,
    pub conversions: f64,
    pub first_conversions: f64,
    pub unique_clicks: u64,
    pub conversion_value: f64,
    /// clicks / impressions * 100
    pub ctr: f64,
    /// spend / clicks
    pub cpc: f64,
    /// spend / impressions * 1000
    pub cpm: f64,
    /// spend / conversions
    pub cpa: f64,
    /// conversion_value / spend
    pub roas: f64,
    /// conversions / clicks
    pub cvr: f64,
}

impl CalculatedMetrics {
    /// Whether the totals show any delivery (impressions or spend)
    pub fn has_delivery(&self) -> bool {
        self.impressions > 0 || self.spend > 0.0
    }
}

/// Metrics for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMetrics {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: CalculatedMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_ctr() {
        let m = BaseMetrics {
            impressions: 2000,
            clicks: 40,
            ..Default::default()
        };
        assert!((m.row_ctr() - 2.0).abs() < 1e-9);
        assert_eq!(BaseMetrics::default().row_ctr(), 0.0);
    }

    #[test]
    fn test_has_delivery() {
        assert!(!BaseMetrics::default().has_delivery());
        let spend_only = BaseMetrics {
            spend: 1.25,
            ..Default::default()
        };
        assert!(spend_only.has_delivery());
    }

    #[test]
    fn test_day_metrics_serialization_flattens() {
        let day = DayMetrics {
            date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            metrics: CalculatedMetrics {
                impressions: 100,
                ctr: 1.5,
                ..Default::default()
            },
        };

        let json = serde_json::to_string(&day).unwrap();
        assert!(json.contains("\"date\":\"2024-01-03\""));
        assert!(json.contains("\"impressions\":100"));
        assert!(json.contains("\"ctr\":1.5"));
    }
}
