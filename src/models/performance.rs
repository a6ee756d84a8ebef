//! Per-entity performance record types

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::insight::GroupBy;
use super::metrics::{CalculatedMetrics, DayMetrics};
use crate::metrics::platform::Platform;

/// Data quality tag attached to every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Complete,
    Partial,
}

/// Non-fatal data quality findings, surfaced to the caller and never raised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// At least one row reported CTR above the configured ceiling
    UnusuallyHighCtr { rows: usize, max_ctr: f64 },
    /// Many rows spread over very few dates
    LimitedDateRange { distinct_dates: usize, rows: usize },
    /// Too many tracked fields were missing in the raw rows
    MissingFields { ratio: f64 },
}

impl DataQualityWarning {
    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Self::UnusuallyHighCtr { rows, max_ctr } => format!(
                "unusually high CTR: {} row(s) above threshold, max {:.1}%",
                rows, max_ctr
            ),
            Self::LimitedDateRange {
                distinct_dates,
                rows,
            } => format!(
                "limited date range: {} rows over only {} distinct date(s)",
                rows, distinct_dates
            ),
            Self::MissingFields { ratio } => {
                format!("{:.1}% of tracked fields missing", ratio * 100.0)
            }
        }
    }
}

/// One entity's aggregated performance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdPerformanceRecord {
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub level: GroupBy,
    /// Earliest `date_start` across the entity's rows
    pub date_start: NaiveDate,
    /// Latest `date_stop` across the entity's rows
    pub date_stop: NaiveDate,
    pub row_count: usize,
    pub summary: CalculatedMetrics,
    pub daily_breakdown: Option<Vec<DayMetrics>>,
    pub platform_breakdown: Option<BTreeMap<Platform, CalculatedMetrics>>,
    pub data_quality: DataQuality,
    pub warnings: Vec<DataQualityWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_serialization_tagged() {
        let w = DataQualityWarning::LimitedDateRange {
            distinct_dates: 3,
            rows: 150,
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("\"kind\":\"limited_date_range\""));
        assert!(json.contains("\"distinct_dates\":3"));
    }

    #[test]
    fn test_warning_messages() {
        let high = DataQualityWarning::UnusuallyHighCtr {
            rows: 2,
            max_ctr: 75.0,
        };
        assert!(high.message().starts_with("unusually high CTR"));

        let limited = DataQualityWarning::LimitedDateRange {
            distinct_dates: 1,
            rows: 101,
        };
        assert!(limited.message().starts_with("limited date range"));

        let missing = DataQualityWarning::MissingFields { ratio: 0.125 };
        assert_eq!(missing.message(), "12.5% of tracked fields missing");
    }

    #[test]
    fn test_data_quality_serialization() {
        assert_eq!(
            serde_json::to_string(&DataQuality::Partial).unwrap(),
            "\"partial\""
        );
    }
}
