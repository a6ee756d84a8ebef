//! Gap detection logic
//!
//! Single pass over the ordered timeline, accumulating a run while a day has
//! no delivery. A run closes on the next delivery day, whose metrics become
//! the gap's after-gap snapshot, or at the end of the timeline, leaving the
//! gap open.

use std::collections::BTreeMap;

use chrono::{Datelike, Weekday};

use super::types::{
    DeliveryGap, GapDetectionConfig, GapDetectionResult, GapImpact, GapMetadata, GapSeverity,
    GapStatistics, GapType,
};
use crate::config::ConfigError;
use crate::models::delivery::DailyDeliveryStatus;

/// Pre-gap averages over delivery days
#[derive(Debug, Clone, Copy, Default)]
struct Baseline {
    avg_impressions: f64,
    avg_spend: f64,
}

impl Baseline {
    fn from_days(days: &[&DailyDeliveryStatus]) -> Self {
        let delivered: Vec<&&DailyDeliveryStatus> = days.iter().filter(|d| d.has_delivery).collect();
        if delivered.is_empty() {
            return Self::default();
        }
        let n = delivered.len() as f64;
        Self {
            avg_impressions: delivered.iter().map(|d| d.metrics.impressions as f64).sum::<f64>() / n,
            avg_spend: delivered.iter().map(|d| d.metrics.spend).sum::<f64>() / n,
        }
    }
}

/// Gap detection engine with validated configuration
#[derive(Debug, Clone)]
pub struct GapDetectionEngine {
    config: GapDetectionConfig,
}

impl GapDetectionEngine {
    /// Create an engine. Fails if thresholds are out of order or
    /// `min_gap_days < 1`.
    pub fn new(config: GapDetectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GapDetectionConfig {
        &self.config
    }

    /// Detect gaps in a daily timeline.
    ///
    /// The timeline is expected to hold one entry per calendar day; it is
    /// sorted by date before scanning.
    pub fn detect_gaps(&self, timeline: &[DailyDeliveryStatus]) -> GapDetectionResult {
        let mut days: Vec<&DailyDeliveryStatus> = timeline.iter().collect();
        days.sort_by_key(|d| d.date);

        let overall = Baseline::from_days(&days);
        let mut gaps = Vec::new();
        let mut discarded_runs = 0usize;
        let mut run_start: Option<usize> = None;

        for (idx, day) in days.iter().enumerate() {
            if !day.has_delivery {
                if run_start.is_none() {
                    run_start = Some(idx);
                }
            } else if let Some(start) = run_start.take() {
                match self.build_gap(&days, start, idx - 1, Some(day), &overall) {
                    Some(gap) => gaps.push(gap),
                    None => discarded_runs += 1,
                }
            }
        }
        if let Some(start) = run_start {
            match self.build_gap(&days, start, days.len() - 1, None, &overall) {
                Some(gap) => gaps.push(gap),
                None => discarded_runs += 1,
            }
        }

        let statistics = calculate_statistics(&gaps, days.len());
        let metadata = GapMetadata {
            first_date: days.first().map(|d| d.date),
            last_date: days.last().map(|d| d.date),
            analyzed_days: days.len(),
            delivery_days: days.iter().filter(|d| d.has_delivery).count(),
            min_gap_days: self.config.min_gap_days,
            discarded_runs,
        };

        tracing::debug!(
            "Detected {} gaps over {} days (continuity {:.1})",
            gaps.len(),
            metadata.analyzed_days,
            statistics.continuity_score
        );

        GapDetectionResult {
            gaps,
            statistics,
            metadata,
        }
    }

    /// Build a gap from the run `days[start..=end]`, or `None` if it is too short
    fn build_gap(
        &self,
        days: &[&DailyDeliveryStatus],
        start: usize,
        end: usize,
        after: Option<&DailyDeliveryStatus>,
        overall: &Baseline,
    ) -> Option<DeliveryGap> {
        let duration_days = (end - start + 1) as u32;
        if duration_days < self.config.min_gap_days {
            return None;
        }

        let before = start.checked_sub(1).map(|i| days[i]);
        let baseline = Baseline::from_days(&days[..start]);

        let mut gap = DeliveryGap {
            start_date: days[start].date,
            end_date: days[end].date,
            duration_days,
            severity: self.classify_severity(duration_days),
            gap_type: GapType::Unexpected,
            impact: GapImpact::default(),
            before_gap_metrics: before.map(|d| d.metrics.clone()),
            after_gap_metrics: after.map(|d| d.metrics.clone()),
        };
        gap.gap_type = self.classify_type(&gap, overall);
        gap.impact = self.estimate_impact(&gap, &baseline);

        tracing::trace!(
            "Gap {} to {}: {} days, {} / {}",
            gap.start_date,
            gap.end_date,
            gap.duration_days,
            gap.severity.as_str(),
            gap.gap_type.display_name()
        );

        Some(gap)
    }

    /// First threshold the duration reaches wins
    pub fn classify_severity(&self, duration_days: u32) -> GapSeverity {
        let t = &self.config.thresholds;
        if duration_days >= t.critical_gap_days {
            GapSeverity::Critical
        } else if duration_days >= t.major_gap_days {
            GapSeverity::Major
        } else if duration_days >= t.minor_gap_days {
            GapSeverity::Minor
        } else {
            GapSeverity::Negligible
        }
    }

    /// Evaluated in precedence order; the first matching rule wins
    fn classify_type(&self, gap: &DeliveryGap, overall: &Baseline) -> GapType {
        let patterns = &self.config.patterns;
        let heuristics = &self.config.heuristics;

        let starts_on_weekend = matches!(gap.start_date.weekday(), Weekday::Sat | Weekday::Sun);
        if patterns.weekend_tolerance && gap.duration_days <= 2 && starts_on_weekend {
            return GapType::Weekend;
        }

        if patterns
            .scheduled_maintenance_windows
            .iter()
            .any(|w| w.covers(gap.start_date, gap.end_date))
        {
            return GapType::ScheduledMaintenance;
        }

        if let Some(before) = &gap.before_gap_metrics {
            if overall.avg_spend > 0.0
                && before.spend > overall.avg_spend * heuristics.high_spend_multiplier
            {
                return GapType::BudgetExhaustion;
            }
            if before.ctr < heuristics.low_ctr_threshold {
                return GapType::PerformancePause;
            }
        }

        GapType::Unexpected
    }

    fn estimate_impact(&self, gap: &DeliveryGap, baseline: &Baseline) -> GapImpact {
        let heuristics = &self.config.heuristics;

        let performance_drop_pct = match (&gap.before_gap_metrics, &gap.after_gap_metrics) {
            (Some(before), Some(after)) if before.ctr > 0.0 => {
                (before.ctr - after.ctr) / before.ctr * 100.0
            }
            _ => 0.0,
        };

        let duration = gap.duration_days as f64;
        GapImpact {
            performance_drop_pct,
            recovery_time_days: gap.duration_days.min(heuristics.max_recovery_days),
            estimated_lost_impressions: baseline.avg_impressions * duration,
            estimated_lost_revenue: baseline.avg_spend * duration * heuristics.revenue_loss_factor,
        }
    }
}

/// Summarize reported gaps over a timeline of `total_days` days
fn calculate_statistics(gaps: &[DeliveryGap], total_days: usize) -> GapStatistics {
    let total_gap_days: u32 = gaps.iter().map(|g| g.duration_days).sum();
    let gap_rate = if total_days == 0 {
        0.0
    } else {
        total_gap_days as f64 / total_days as f64 * 100.0
    };
    let continuity_score = if total_days == 0 {
        100.0
    } else {
        (100.0 - gap_rate).clamp(0.0, 100.0)
    };

    let mut by_severity = BTreeMap::new();
    let mut by_type = BTreeMap::new();
    for gap in gaps {
        *by_severity.entry(gap.severity).or_insert(0) += 1;
        *by_type.entry(gap.gap_type).or_insert(0) += 1;
    }

    GapStatistics {
        total_days,
        total_gaps: gaps.len(),
        total_gap_days,
        gap_rate,
        average_gap_duration: if gaps.is_empty() {
            0.0
        } else {
            total_gap_days as f64 / gaps.len() as f64
        },
        longest_gap_days: gaps.iter().map(|g| g.duration_days).max().unwrap_or(0),
        continuity_score,
        by_severity,
        by_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::types::{GapPatternConfig, GapThresholds, MaintenanceWindow};
    use crate::models::metrics::CalculatedMetrics;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn delivered(day: u32, impressions: u64, ctr: f64, spend: f64) -> DailyDeliveryStatus {
        DailyDeliveryStatus {
            date: date(day),
            has_delivery: true,
            metrics: CalculatedMetrics {
                impressions,
                spend,
                ctr,
                ..Default::default()
            },
        }
    }

    fn idle(day: u32) -> DailyDeliveryStatus {
        DailyDeliveryStatus::empty(date(day))
    }

    fn engine() -> GapDetectionEngine {
        GapDetectionEngine::new(GapDetectionConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_timeline() {
        let result = engine().detect_gaps(&[]);
        assert!(result.gaps.is_empty());
        assert_eq!(result.statistics.continuity_score, 100.0);
        assert_eq!(result.statistics.gap_rate, 0.0);
        assert!(!result.statistics.continuity_score.is_nan());
        assert!(result.metadata.first_date.is_none());
    }

    #[test]
    fn test_all_gap_timeline() {
        // 2024-01-01 is a Monday, so no weekend classification
        let timeline: Vec<_> = (1..=10).map(idle).collect();
        let result = engine().detect_gaps(&timeline);

        assert_eq!(result.gaps.len(), 1);
        let gap = &result.gaps[0];
        assert_eq!(gap.duration_days, 10);
        assert_eq!(gap.start_date, date(1));
        assert_eq!(gap.end_date, date(10));
        assert!(gap.is_open());
        assert!(gap.before_gap_metrics.is_none());
        assert_eq!(gap.gap_type, GapType::Unexpected);
        assert_eq!(gap.severity, GapSeverity::Critical);
        assert_eq!(result.statistics.continuity_score, 0.0);
        assert!((result.statistics.gap_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_continuous_delivery_has_no_gaps() {
        let timeline: Vec<_> = (1..=7).map(|d| delivered(d, 1000, 2.0, 10.0)).collect();
        let result = engine().detect_gaps(&timeline);
        assert!(result.gaps.is_empty());
        assert_eq!(result.statistics.continuity_score, 100.0);
        assert_eq!(result.metadata.delivery_days, 7);
    }

    #[test]
    fn test_closed_gap_captures_before_and_after() {
        let timeline = vec![
            delivered(1, 1000, 2.0, 10.0),
            delivered(2, 1000, 2.0, 10.0),
            idle(3),
            idle(4),
            idle(5),
            delivered(6, 800, 1.5, 8.0),
        ];
        let result = engine().detect_gaps(&timeline);

        assert_eq!(result.gaps.len(), 1);
        let gap = &result.gaps[0];
        assert_eq!(gap.duration_days, 3);
        assert_eq!(gap.severity, GapSeverity::Major);
        assert!(!gap.is_open());
        assert_eq!(gap.after_gap_metrics.as_ref().unwrap().impressions, 800);
        assert_eq!(gap.before_gap_metrics.as_ref().unwrap().impressions, 1000);

        // (2.0 - 1.5) / 2.0 * 100
        assert!((gap.impact.performance_drop_pct - 25.0).abs() < 1e-9);
        assert_eq!(gap.impact.recovery_time_days, 3);
        assert!((gap.impact.estimated_lost_impressions - 3000.0).abs() < 1e-9);
        // 10.0 * 3 * 0.8
        assert!((gap.impact.estimated_lost_revenue - 24.0).abs() < 1e-9);

        assert_eq!(result.statistics.total_gap_days, 3);
        assert!((result.statistics.gap_rate - 50.0).abs() < 1e-9);
        assert!((result.statistics.continuity_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_gap_at_end() {
        let timeline = vec![delivered(1, 500, 2.0, 5.0), idle(2), idle(3)];
        let result = engine().detect_gaps(&timeline);

        let gap = &result.gaps[0];
        assert!(gap.is_open());
        assert_eq!(gap.impact.performance_drop_pct, 0.0);
        assert_eq!(gap.end_date, date(3));
    }

    #[test]
    fn test_recovery_time_capped() {
        let mut timeline = vec![delivered(1, 100, 2.0, 1.0)];
        timeline.extend((2..=15).map(idle));
        timeline.push(delivered(16, 100, 2.0, 1.0));

        let result = engine().detect_gaps(&timeline);
        assert_eq!(result.gaps[0].duration_days, 14);
        assert_eq!(result.gaps[0].impact.recovery_time_days, 7);
    }

    #[test]
    fn test_min_gap_days_discards_short_runs() {
        let config = GapDetectionConfig {
            min_gap_days: 2,
            ..Default::default()
        };
        let engine = GapDetectionEngine::new(config).unwrap();
        let timeline = vec![
            delivered(1, 100, 2.0, 1.0),
            idle(2),
            delivered(3, 100, 2.0, 1.0),
            idle(4),
            idle(5),
            delivered(6, 100, 2.0, 1.0),
        ];

        let result = engine.detect_gaps(&timeline);
        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].start_date, date(4));
        assert_eq!(result.metadata.discarded_runs, 1);
        assert!(result.gaps.iter().all(|g| g.duration_days >= 2));
    }

    #[test]
    fn test_weekend_gap() {
        // 2024-01-06 and 01-07 are Saturday and Sunday
        let timeline = vec![
            delivered(5, 100, 2.0, 1.0),
            idle(6),
            idle(7),
            delivered(8, 100, 2.0, 1.0),
        ];
        let result = engine().detect_gaps(&timeline);
        assert_eq!(result.gaps[0].gap_type, GapType::Weekend);
    }

    #[test]
    fn test_weekend_tolerance_disabled() {
        let config = GapDetectionConfig {
            patterns: GapPatternConfig {
                weekend_tolerance: false,
                scheduled_maintenance_windows: Vec::new(),
            },
            ..Default::default()
        };
        let engine = GapDetectionEngine::new(config).unwrap();
        let timeline = vec![delivered(5, 100, 2.0, 1.0), idle(6), delivered(7, 100, 2.0, 1.0)];
        let result = engine.detect_gaps(&timeline);
        assert_eq!(result.gaps[0].gap_type, GapType::Unexpected);
    }

    #[test]
    fn test_long_weekend_start_not_weekend() {
        let timeline = vec![
            delivered(5, 100, 2.0, 1.0),
            idle(6),
            idle(7),
            idle(8),
            delivered(9, 100, 2.0, 1.0),
        ];
        let result = engine().detect_gaps(&timeline);
        assert_ne!(result.gaps[0].gap_type, GapType::Weekend);
    }

    #[test]
    fn test_scheduled_maintenance_gap() {
        let config = GapDetectionConfig {
            patterns: GapPatternConfig {
                weekend_tolerance: true,
                scheduled_maintenance_windows: vec![MaintenanceWindow {
                    start: date(2),
                    end: date(4),
                    label: None,
                }],
            },
            ..Default::default()
        };
        let engine = GapDetectionEngine::new(config).unwrap();
        let timeline = vec![
            delivered(1, 100, 2.0, 1.0),
            idle(2),
            idle(3),
            delivered(4, 100, 2.0, 1.0),
        ];
        let result = engine.detect_gaps(&timeline);
        assert_eq!(result.gaps[0].gap_type, GapType::ScheduledMaintenance);
    }

    #[test]
    fn test_budget_exhaustion_gap() {
        let timeline = vec![
            delivered(1, 1000, 2.0, 10.0),
            delivered(2, 1000, 2.0, 10.0),
            delivered(3, 1000, 2.0, 40.0),
            idle(4),
            delivered(5, 1000, 2.0, 10.0),
        ];
        // average delivery-day spend 17.5, pre-gap 40 > 26.25
        let result = engine().detect_gaps(&timeline);
        assert_eq!(result.gaps[0].gap_type, GapType::BudgetExhaustion);
        assert!(result.gaps[0].gap_type.is_heuristic());
    }

    #[test]
    fn test_performance_pause_gap() {
        let timeline = vec![
            delivered(1, 1000, 2.0, 10.0),
            delivered(2, 1000, 0.4, 10.0),
            idle(3),
            delivered(4, 1000, 2.0, 10.0),
        ];
        let result = engine().detect_gaps(&timeline);
        assert_eq!(result.gaps[0].gap_type, GapType::PerformancePause);
    }

    #[test]
    fn test_severity_thresholds() {
        let engine = GapDetectionEngine::new(GapDetectionConfig {
            thresholds: GapThresholds {
                critical_gap_days: 10,
                major_gap_days: 5,
                minor_gap_days: 2,
            },
            ..Default::default()
        })
        .unwrap();

        assert_eq!(engine.classify_severity(1), GapSeverity::Negligible);
        assert_eq!(engine.classify_severity(2), GapSeverity::Minor);
        assert_eq!(engine.classify_severity(5), GapSeverity::Major);
        assert_eq!(engine.classify_severity(9), GapSeverity::Major);
        assert_eq!(engine.classify_severity(10), GapSeverity::Critical);
    }

    #[test]
    fn test_construction_rejects_bad_config() {
        let bad = GapDetectionConfig {
            thresholds: GapThresholds {
                critical_gap_days: 3,
                major_gap_days: 4,
                minor_gap_days: 1,
            },
            ..Default::default()
        };
        assert!(matches!(
            GapDetectionEngine::new(bad),
            Err(ConfigError::GapThresholdOrder { .. })
        ));
    }

    #[test]
    fn test_unsorted_timeline_is_ordered() {
        let timeline = vec![
            delivered(4, 100, 2.0, 1.0),
            idle(2),
            delivered(1, 100, 2.0, 1.0),
            idle(3),
        ];
        let result = engine().detect_gaps(&timeline);
        assert_eq!(result.gaps.len(), 1);
        assert_eq!(result.gaps[0].start_date, date(2));
        assert_eq!(result.gaps[0].duration_days, 2);
    }

    #[test]
    fn test_statistics_counts() {
        let timeline = vec![
            delivered(1, 100, 2.0, 1.0),
            idle(2),
            delivered(3, 100, 2.0, 1.0),
            idle(4),
            idle(5),
            idle(6),
            delivered(7, 100, 2.0, 1.0),
        ];
        let result = engine().detect_gaps(&timeline);
        let stats = &result.statistics;

        assert_eq!(stats.total_gaps, 2);
        assert_eq!(stats.longest_gap_days, 3);
        assert!((stats.average_gap_duration - 2.0).abs() < 1e-9);
        assert_eq!(stats.by_severity.get(&GapSeverity::Minor), Some(&1));
        assert_eq!(stats.by_severity.get(&GapSeverity::Major), Some(&1));
    }
}
