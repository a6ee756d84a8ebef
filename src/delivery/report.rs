//! Per-entity delivery reports
//!
//! Pattern analysis and gap detection both read the same per-entity rows
//! and never each other's output.

use serde::{Deserialize, Serialize};

use super::pattern::{DeliveryPatternAnalyzer, DeliveryPatternReport};
use super::timeline::build_timeline;
use crate::aggregator::group_rows;
use crate::daterange::DateWindow;
use crate::gaps::{GapDetectionEngine, GapDetectionResult};
use crate::models::insight::{GroupBy, InsightRow};

/// Delivery pattern and gaps for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDeliveryReport {
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub delivery: DeliveryPatternReport,
    pub gaps: GapDetectionResult,
}

/// Run pattern analysis and gap detection for every entity in `rows`.
///
/// Reports come back sorted by entity id. Rows without an id at the
/// grouping level are skipped.
pub fn analyze_entity_delivery(
    rows: &[InsightRow],
    group_by: GroupBy,
    window: &DateWindow,
    analyzer: &DeliveryPatternAnalyzer,
    gap_engine: &GapDetectionEngine,
) -> Vec<EntityDeliveryReport> {
    let grouped = group_rows(rows, group_by);

    let reports: Vec<EntityDeliveryReport> = grouped
        .groups
        .into_iter()
        .map(|(entity_id, entity_rows)| {
            let delivery = analyzer.analyze(entity_rows.iter().copied(), window);
            let timeline = build_timeline(entity_rows.iter().copied(), window);
            let gaps = gap_engine.detect_gaps(&timeline);
            let entity_name = entity_rows
                .iter()
                .find_map(|r| r.entity_name(group_by))
                .map(str::to_string);

            EntityDeliveryReport {
                entity_id,
                entity_name,
                delivery,
                gaps,
            }
        })
        .collect();

    tracing::debug!(
        "Analyzed delivery for {} {}s over {} days",
        reports.len(),
        group_by.as_str(),
        window.total_days()
    );

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::DeliveryPattern;
    use crate::gaps::GapDetectionConfig;
    use crate::models::metrics::BaseMetrics;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn row(ad: &str, day: u32) -> InsightRow {
        InsightRow {
            ad_id: Some(ad.to_string()),
            ad_name: Some(format!("{} name", ad)),
            date_start: Some(d(day)),
            date_stop: Some(d(day)),
            metrics: BaseMetrics {
                impressions: 1000,
                clicks: 20,
                spend: 10.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_reports_per_entity_sorted() {
        let mut rows: Vec<InsightRow> = (1..=7).map(|day| row("b", day)).collect();
        rows.extend([1, 3, 5].map(|day| row("a", day)));
        rows.push(InsightRow::default());

        let window = DateWindow::new(d(1), d(7)).unwrap();
        let engine = GapDetectionEngine::new(GapDetectionConfig::default()).unwrap();
        let reports = analyze_entity_delivery(
            &rows,
            GroupBy::Ad,
            &window,
            &DeliveryPatternAnalyzer::default(),
            &engine,
        );

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].entity_id, "a");
        assert_eq!(reports[0].entity_name.as_deref(), Some("a name"));
        assert_eq!(reports[0].delivery.pattern, DeliveryPattern::Intermittent);
        // gaps on 01-02, 01-04 and 01-06..07
        assert_eq!(reports[0].gaps.gaps.len(), 3);
        assert!(reports[0].gaps.gaps[2].is_open());

        assert_eq!(reports[1].entity_id, "b");
        assert_eq!(reports[1].delivery.pattern, DeliveryPattern::Continuous);
        assert!(reports[1].gaps.gaps.is_empty());
        assert_eq!(reports[1].gaps.statistics.continuity_score, 100.0);
    }

    #[test]
    fn test_zero_metric_rows_agree_with_gaps() {
        let rows: Vec<InsightRow> = (1..=7)
            .map(|day| {
                let mut r = row("idle", day);
                r.metrics = BaseMetrics::default();
                r
            })
            .collect();

        let window = DateWindow::new(d(1), d(7)).unwrap();
        let engine = GapDetectionEngine::new(GapDetectionConfig::default()).unwrap();
        let reports = analyze_entity_delivery(
            &rows,
            GroupBy::Ad,
            &window,
            &DeliveryPatternAnalyzer::default(),
            &engine,
        );

        let report = &reports[0];
        assert_eq!(report.delivery.pattern, DeliveryPattern::None);
        assert_eq!(report.delivery.actual_delivery_days, 0);
        assert_eq!(report.gaps.gaps.len(), 1);
        assert_eq!(report.gaps.gaps[0].duration_days, 7);
        assert_eq!(report.gaps.statistics.continuity_score, 0.0);
    }
}
