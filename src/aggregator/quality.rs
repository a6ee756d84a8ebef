//! Data quality checks applied per entity

use std::collections::HashSet;

use crate::ingest::raw::TRACKED_FIELD_COUNT;
use crate::models::insight::InsightRow;
use crate::models::performance::DataQualityWarning;

use super::AggregationConfig;

/// Outcome of the per-entity quality checks
#[derive(Debug, Clone, Default)]
pub struct QualityAssessment {
    pub warnings: Vec<DataQualityWarning>,
    /// Missing-field ratio exceeded the configured limit
    pub degraded: bool,
}

/// Share of tracked fields that were missing across the rows
pub fn missing_field_ratio(rows: &[&InsightRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let missing: usize = rows.iter().map(|r| r.missing_fields as usize).sum();
    missing as f64 / (rows.len() * TRACKED_FIELD_COUNT) as f64
}

/// Run every quality check on one entity's rows
pub fn assess(rows: &[&InsightRow], config: &AggregationConfig) -> QualityAssessment {
    let mut assessment = QualityAssessment::default();

    let high_ctr: Vec<f64> = rows
        .iter()
        .map(|r| r.metrics.row_ctr())
        .filter(|ctr| *ctr > config.high_ctr_warning_pct)
        .collect();
    if !high_ctr.is_empty() {
        let max_ctr = high_ctr.iter().cloned().fold(0.0, f64::max);
        assessment.warnings.push(DataQualityWarning::UnusuallyHighCtr {
            rows: high_ctr.len(),
            max_ctr,
        });
    }

    let distinct_dates: HashSet<_> = rows.iter().filter_map(|r| r.date_start).collect();
    if distinct_dates.len() < config.limited_range_min_dates
        && rows.len() > config.limited_range_min_rows
    {
        assessment.warnings.push(DataQualityWarning::LimitedDateRange {
            distinct_dates: distinct_dates.len(),
            rows: rows.len(),
        });
    }

    let ratio = missing_field_ratio(rows);
    if ratio > config.missing_field_ratio_limit {
        assessment
            .warnings
            .push(DataQualityWarning::MissingFields { ratio });
        assessment.degraded = true;
    }

    assessment
}
