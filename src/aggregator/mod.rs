//! Aggregation module
//!
//! Groups insight rows by entity (ad, ad set, or campaign) and produces one
//! [`AdPerformanceRecord`] per entity with:
//! - A summary with ratios recomputed from summed numerators/denominators
//! - An optional daily breakdown
//! - An optional platform breakdown
//! - Data quality tagging and warnings
//!
//! A failure while aggregating one entity is recorded in the batch's error
//! list and that entity is left out; the batch itself never aborts.

pub mod entity;
pub mod parallel;
pub mod quality;

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::ingest::dedupe_rows;
use crate::models::insight::{GroupBy, InsightRow};
use crate::models::performance::{AdPerformanceRecord, DataQuality};

pub use entity::aggregate_entity;
pub use parallel::aggregate_parallel;

/// Failure aggregating a single entity
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("entity {entity_id}: row {row_index} has no valid date_start")]
    MissingDate { entity_id: String, row_index: usize },

    #[error("entity {entity_id}: date_stop {stop} precedes date_start {start}")]
    InvertedDateRange {
        entity_id: String,
        start: chrono::NaiveDate,
        stop: chrono::NaiveDate,
    },

    #[error("entity {entity_id}: aggregation worker failed: {reason}")]
    WorkerFailed { entity_id: String, reason: String },
}

impl AggregationError {
    /// Entity the failure belongs to
    pub fn entity_id(&self) -> &str {
        match self {
            Self::MissingDate { entity_id, .. }
            | Self::InvertedDateRange { entity_id, .. }
            | Self::WorkerFailed { entity_id, .. } => entity_id,
        }
    }
}

// Errors leave the core as {entity_id, message}
impl Serialize for AggregationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AggregationError", 2)?;
        state.serialize_field("entity_id", self.entity_id())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Heuristic limits for data quality checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Row CTR (percent) above which a row is flagged (default: 50.0)
    pub high_ctr_warning_pct: f64,
    /// Entities with fewer distinct dates than this (default: 7)
    pub limited_range_min_dates: usize,
    /// and more rows than this get a limited-range warning (default: 100)
    pub limited_range_min_rows: usize,
    /// Missing tracked-field ratio above which a record is partial (default: 0.10)
    pub missing_field_ratio_limit: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            high_ctr_warning_pct: 50.0,
            limited_range_min_dates: 7,
            limited_range_min_rows: 100,
            missing_field_ratio_limit: 0.10,
        }
    }
}

impl AggregationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.high_ctr_warning_pct > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "aggregation.high_ctr_warning_pct",
                reason: format!("must be positive (got {})", self.high_ctr_warning_pct),
            });
        }
        if !(0.0..=1.0).contains(&self.missing_field_ratio_limit) {
            return Err(ConfigError::InvalidValue {
                field: "aggregation.missing_field_ratio_limit",
                reason: format!(
                    "must be within [0, 1] (got {})",
                    self.missing_field_ratio_limit
                ),
            });
        }
        Ok(())
    }
}

/// Per-call aggregation options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    pub include_daily: bool,
    pub include_platform: bool,
    /// Remove duplicate (entity, date, platform) rows before grouping
    pub dedupe: bool,
}

/// Batch-level bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationMetadata {
    pub group_by: GroupBy,
    pub total_rows: usize,
    /// Rows dropped because they had no id at the grouping level
    pub rows_missing_id: usize,
    pub duplicates_removed: usize,
    pub entity_count: usize,
    pub record_count: usize,
    pub error_count: usize,
    pub data_quality: DataQuality,
}

/// Result of one aggregation call
#[derive(Debug, Clone, Serialize)]
pub struct AggregationResult {
    /// One record per successfully aggregated entity, sorted by entity id
    pub records: Vec<AdPerformanceRecord>,
    pub errors: Vec<AggregationError>,
    pub metadata: AggregationMetadata,
}

/// Rows grouped by entity id, in entity id order
pub(crate) struct GroupedRows<'a> {
    pub groups: BTreeMap<String, Vec<&'a InsightRow>>,
    pub rows_missing_id: usize,
}

pub(crate) fn group_rows(rows: &[InsightRow], group_by: GroupBy) -> GroupedRows<'_> {
    let mut groups: BTreeMap<String, Vec<&InsightRow>> = BTreeMap::new();
    let mut rows_missing_id = 0usize;

    for row in rows {
        match row.entity_id(group_by) {
            Some(id) => groups.entry(id.to_string()).or_default().push(row),
            None => rows_missing_id += 1,
        }
    }

    if rows_missing_id > 0 {
        tracing::warn!(
            "Dropped {} rows without a {} id",
            rows_missing_id,
            group_by.as_str()
        );
    }

    GroupedRows {
        groups,
        rows_missing_id,
    }
}

/// Split per-entity outcomes into records and errors and build the result.
///
/// Any entity failure marks every surviving record `partial`, since the
/// batch no longer covers all of its entities.
pub(crate) fn collect_outcomes(
    outcomes: Vec<Result<AdPerformanceRecord, AggregationError>>,
    metadata_base: AggregationMetadata,
) -> AggregationResult {
    let (mut records, mut errors): (Vec<_>, Vec<_>) = (Vec::new(), Vec::new());
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!("Skipping entity: {}", err);
                errors.push(err);
            }
        }
    }

    records.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    errors.sort_by(|a, b| a.entity_id().cmp(b.entity_id()));

    if !errors.is_empty() {
        for record in records.iter_mut() {
            record.data_quality = DataQuality::Partial;
        }
    }

    let data_quality = if errors.is_empty()
        && records
            .iter()
            .all(|r| r.data_quality == DataQuality::Complete)
    {
        DataQuality::Complete
    } else {
        DataQuality::Partial
    };

    let metadata = AggregationMetadata {
        record_count: records.len(),
        error_count: errors.len(),
        data_quality,
        ..metadata_base
    };

    tracing::debug!(
        "Aggregated {} entities by {}: {} records, {} errors",
        metadata.entity_count,
        metadata.group_by.as_str(),
        metadata.record_count,
        metadata.error_count
    );

    AggregationResult {
        records,
        errors,
        metadata,
    }
}

/// Aggregator with explicit configuration
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    /// Create an aggregator, validating the config
    pub fn new(config: AggregationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate rows into per-entity performance records
    pub fn aggregate(
        &self,
        rows: &[InsightRow],
        group_by: GroupBy,
        opts: &AggregateOptions,
    ) -> AggregationResult {
        let total_rows = rows.len();

        let deduped;
        let (rows, duplicates_removed) = if opts.dedupe {
            let outcome = dedupe_rows(rows.to_vec(), group_by);
            deduped = outcome.rows;
            (deduped.as_slice(), outcome.removed)
        } else {
            (rows, 0)
        };

        let grouped = group_rows(rows, group_by);
        let entity_count = grouped.groups.len();

        let outcomes: Vec<Result<AdPerformanceRecord, AggregationError>> = grouped
            .groups
            .iter()
            .map(|(entity_id, entity_rows)| {
                aggregate_entity(entity_id, entity_rows, group_by, opts, &self.config)
            })
            .collect();

        collect_outcomes(
            outcomes,
            AggregationMetadata {
                group_by,
                total_rows,
                rows_missing_id: grouped.rows_missing_id,
                duplicates_removed,
                entity_count,
                record_count: 0,
                error_count: 0,
                data_quality: DataQuality::Complete,
            },
        )
    }
}

/// Aggregate with the default configuration
pub fn aggregate(rows: &[InsightRow], group_by: GroupBy, opts: &AggregateOptions) -> AggregationResult {
    Aggregator::default().aggregate(rows, group_by, opts)
}
