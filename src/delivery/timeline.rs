//! Daily delivery timeline

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::daterange::DateWindow;
use crate::metrics::MetricAccumulator;
use crate::models::delivery::DailyDeliveryStatus;
use crate::models::insight::InsightRow;
use crate::models::metrics::CalculatedMetrics;

/// Build one status per day of `window` from an entity's rows.
///
/// Rows for the same day (e.g. one per platform) are summed. A day has
/// delivery when its impressions or spend are positive; days with no rows
/// are synthesized as empty.
pub fn build_timeline<'a, I>(rows: I, window: &DateWindow) -> Vec<DailyDeliveryStatus>
where
    I: IntoIterator<Item = &'a InsightRow>,
{
    let mut by_day = daily_totals(rows, window);

    window
        .days()
        .map(|date| match by_day.remove(&date) {
            Some(metrics) => DailyDeliveryStatus {
                date,
                has_delivery: metrics.has_delivery(),
                metrics,
            },
            None => DailyDeliveryStatus::empty(date),
        })
        .collect()
}

/// Summed metrics per dated day inside `window`, for days that have rows
pub(crate) fn daily_totals<'a, I>(rows: I, window: &DateWindow) -> BTreeMap<NaiveDate, CalculatedMetrics>
where
    I: IntoIterator<Item = &'a InsightRow>,
{
    let mut by_day: BTreeMap<NaiveDate, MetricAccumulator> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.date_start.filter(|d| window.contains(*d)) {
            by_day.entry(date).or_default().add(&row.metrics);
        }
    }
    by_day
        .into_iter()
        .map(|(date, acc)| (date, acc.finish()))
        .collect()
}
