//! Single-entity aggregation

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::quality::assess;
use super::{AggregateOptions, AggregationConfig, AggregationError};
use crate::metrics::{MetricAccumulator, Platform};
use crate::models::insight::{GroupBy, InsightRow};
use crate::models::metrics::DayMetrics;
use crate::models::performance::{AdPerformanceRecord, DataQuality};

/// Aggregate one entity's rows into a performance record.
///
/// Fails when a row has no `date_start` or a `date_stop` earlier than its
/// `date_start`; the caller records the error and moves on.
pub fn aggregate_entity(
    entity_id: &str,
    rows: &[&InsightRow],
    group_by: GroupBy,
    opts: &AggregateOptions,
    config: &AggregationConfig,
) -> Result<AdPerformanceRecord, AggregationError> {
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    let mut summary = MetricAccumulator::new();
    let mut daily: BTreeMap<NaiveDate, MetricAccumulator> = BTreeMap::new();
    let mut platforms: BTreeMap<Platform, MetricAccumulator> = BTreeMap::new();

    for (row_index, row) in rows.iter().enumerate() {
        let start = row.date_start.ok_or_else(|| AggregationError::MissingDate {
            entity_id: entity_id.to_string(),
            row_index,
        })?;
        let stop = row.effective_stop().unwrap_or(start);
        if stop < start {
            return Err(AggregationError::InvertedDateRange {
                entity_id: entity_id.to_string(),
                start,
                stop,
            });
        }

        range = Some(match range {
            Some((min, max)) => (min.min(start), max.max(stop)),
            None => (start, stop),
        });

        summary.add(&row.metrics);

        if opts.include_daily {
            daily.entry(start).or_default().add(&row.metrics);
        }

        if opts.include_platform {
            // Untagged rows land in `other` so platform totals match the summary
            let platform = row
                .platform
                .as_deref()
                .map(Platform::normalize)
                .unwrap_or(Platform::Other);
            platforms.entry(platform).or_default().add(&row.metrics);
        }
    }

    // Groups are never built empty, so a missing range means no rows at all
    let (date_start, date_stop) = range.ok_or_else(|| AggregationError::MissingDate {
        entity_id: entity_id.to_string(),
        row_index: 0,
    })?;

    let quality = assess(rows, config);
    let data_quality = if quality.degraded {
        DataQuality::Partial
    } else {
        DataQuality::Complete
    };

    let entity_name = rows
        .iter()
        .find_map(|r| r.entity_name(group_by))
        .map(str::to_string);

    Ok(AdPerformanceRecord {
        entity_id: entity_id.to_string(),
        entity_name,
        level: group_by,
        date_start,
        date_stop,
        row_count: rows.len(),
        summary: summary.finish(),
        daily_breakdown: opts.include_daily.then(|| {
            daily
                .into_iter()
                .map(|(date, acc)| DayMetrics {
                    date,
                    metrics: acc.finish(),
                })
                .collect()
        }),
        platform_breakdown: opts.include_platform.then(|| {
            platforms
                .into_iter()
                .map(|(platform, acc)| (platform, acc.finish()))
                .collect()
        }),
        data_quality,
        warnings: quality.warnings,
    })
}
