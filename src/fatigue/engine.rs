//! Fatigue scoring engine

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::recommendations::generate_recommendations;
use super::timeseries::analyze_ctr_series;
use super::types::{
    AdFatigueGap, AudienceFatigue, CreativeFatigue, CreativeTrend, FatigueAnalysis,
    FatigueIndicatorSet, FatigueSeverity, FatigueSummary, PlatformFatigue, RangeKind,
    TrendDirection,
};
use super::FatigueConfig;
use crate::aggregator::group_rows;
use crate::config::ConfigError;
use crate::daterange::DateRangePreset;
use crate::metrics::MetricAccumulator;
use crate::models::insight::{GroupBy, InsightRow};
use crate::models::metrics::DayMetrics;

/// (last - first) / first, or 0 without two points or a positive first value
fn relative_change(first: f64, last: f64) -> f64 {
    if first > 0.0 {
        (last - first) / first
    } else {
        0.0
    }
}

/// Severity of a relative change against a threshold
fn change_severity(change: f64, threshold: f64, escalation: f64) -> FatigueSeverity {
    let magnitude = change.abs();
    if magnitude > threshold * escalation {
        FatigueSeverity::High
    } else if magnitude > threshold {
        FatigueSeverity::Medium
    } else {
        FatigueSeverity::Low
    }
}

fn direction(change: f64, band: f64) -> TrendDirection {
    if change > band {
        TrendDirection::Increasing
    } else if change < -band {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Collapse an entity's rows into one point per dated day, in date order
fn daily_series(rows: &[&InsightRow]) -> Vec<DayMetrics> {
    let mut by_day: BTreeMap<NaiveDate, MetricAccumulator> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.date_start {
            by_day.entry(date).or_default().add(&row.metrics);
        }
    }
    by_day
        .into_iter()
        .map(|(date, acc)| DayMetrics {
            date,
            metrics: acc.finish(),
        })
        .collect()
}

/// First and last values of a series, if it has at least two points
fn endpoints<F>(series: &[DayMetrics], value: F) -> Option<(f64, f64)>
where
    F: Fn(&DayMetrics) -> f64,
{
    match series {
        [first, .., last] => Some((value(first), value(last))),
        _ => None,
    }
}

/// Scores fatigue with thresholds adapted to the requested date range
#[derive(Debug, Clone, Default)]
pub struct DateRangeAwareFatigueEngine {
    config: FatigueConfig,
}

impl DateRangeAwareFatigueEngine {
    pub fn new(config: FatigueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FatigueConfig {
        &self.config
    }

    /// Analyze ad-level fatigue. The label only selects thresholds.
    pub fn analyze_gaps(&self, rows: &[InsightRow], date_range_label: &str) -> FatigueAnalysis {
        self.analyze_gaps_by(rows, GroupBy::Ad, date_range_label)
    }

    /// Analyze fatigue with one result per entity at `group_by` level
    pub fn analyze_gaps_by(
        &self,
        rows: &[InsightRow],
        group_by: GroupBy,
        date_range_label: &str,
    ) -> FatigueAnalysis {
        let preset = DateRangePreset::from_label(date_range_label);
        let grouped = group_rows(rows, group_by);

        let mut gaps = Vec::with_capacity(grouped.groups.len());
        let mut time_series_analysis = BTreeMap::new();

        for (entity_id, entity_rows) in grouped.groups {
            let series = daily_series(&entity_rows);
            let range_kind = self.range_kind(preset, entity_rows.len());

            if !range_kind.is_short_term() {
                let ctr: Vec<f64> = series.iter().map(|d| d.metrics.ctr).collect();
                time_series_analysis.insert(
                    entity_id.clone(),
                    analyze_ctr_series(
                        &ctr,
                        self.config.seasonality_min_points,
                        self.config.seasonality_autocorrelation,
                    ),
                );
            }

            let indicators = self.indicators(&series, range_kind);
            tracing::trace!(
                "Fatigue for {}: {} ({} points)",
                entity_id,
                indicators.overall_severity.as_str(),
                series.len()
            );

            gaps.push(AdFatigueGap {
                entity_name: entity_rows
                    .iter()
                    .find_map(|r| r.entity_name(group_by))
                    .map(str::to_string),
                entity_id,
                range_kind,
                row_count: entity_rows.len(),
                data_points: series.len(),
                first_date: series.first().map(|d| d.date),
                last_date: series.last().map(|d| d.date),
                indicators,
            });
        }

        let mut by_severity = BTreeMap::new();
        for gap in &gaps {
            *by_severity.entry(gap.indicators.overall_severity).or_insert(0) += 1;
        }

        let summary = FatigueSummary {
            date_range_label: date_range_label.to_string(),
            label_range_kind: if preset.is_short_term() {
                RangeKind::ShortTerm
            } else {
                RangeKind::LongTerm
            },
            total_entities: gaps.len(),
            short_term_entities: gaps.iter().filter(|g| g.range_kind.is_short_term()).count(),
            by_severity,
            rows_missing_id: grouped.rows_missing_id,
        };

        tracing::debug!(
            "Fatigue analysis over '{}': {} entities, {} high",
            date_range_label,
            summary.total_entities,
            summary.by_severity.get(&FatigueSeverity::High).copied().unwrap_or(0)
        );

        FatigueAnalysis {
            gaps,
            summary,
            time_series_analysis,
        }
    }

    /// Short-term if the label is a short preset or the entity has fewer
    /// than `min_data_points` rows
    pub fn range_kind(&self, preset: DateRangePreset, row_count: usize) -> RangeKind {
        if preset.is_short_term() || row_count < self.config.min_data_points {
            RangeKind::ShortTerm
        } else {
            RangeKind::LongTerm
        }
    }

    fn indicators(&self, series: &[DayMetrics], range_kind: RangeKind) -> FatigueIndicatorSet {
        let creative = self.creative(series, range_kind);
        let audience = self.audience(series);
        let platform = self.platform(series, range_kind);

        let score =
            creative.severity.score() + audience.severity.score() + platform.severity.score();
        let overall_severity = self.overall_severity(score, range_kind);

        let mut set = FatigueIndicatorSet {
            creative,
            audience,
            platform,
            overall_severity,
            recommendations: Vec::new(),
        };
        set.recommendations = generate_recommendations(&set, range_kind);
        set
    }

    fn threshold(&self, base: f64, range_kind: RangeKind) -> f64 {
        if range_kind.is_short_term() {
            base * self.config.short_term_multiplier
        } else {
            base
        }
    }

    fn creative(&self, series: &[DayMetrics], range_kind: RangeKind) -> CreativeFatigue {
        let threshold = self.threshold(self.config.ctr_decline_threshold, range_kind);
        let change = endpoints(series, |d| d.metrics.ctr)
            .map(|(first, last)| relative_change(first, last))
            .unwrap_or(0.0);

        let trend = if change < -threshold {
            CreativeTrend::Declining
        } else if change > threshold {
            CreativeTrend::Improving
        } else {
            CreativeTrend::Stable
        };

        CreativeFatigue {
            trend,
            severity: change_severity(change, threshold, self.config.severity_escalation),
            ctr_change_pct: change * 100.0,
        }
    }

    fn audience(&self, series: &[DayMetrics]) -> AudienceFatigue {
        let frequency_trend = endpoints(series, |d| d.metrics.frequency)
            .map(|(first, last)| direction(last - first, self.config.frequency_dead_band))
            .unwrap_or(TrendDirection::Stable);
        let current_frequency = series.last().map(|d| d.metrics.frequency).unwrap_or(0.0);

        let warning = self.config.frequency_warning;
        let severity = if current_frequency >= warning * self.config.frequency_high_multiplier {
            FatigueSeverity::High
        } else if current_frequency >= warning {
            FatigueSeverity::Medium
        } else {
            FatigueSeverity::Low
        };

        AudienceFatigue {
            frequency_trend,
            severity,
            current_frequency,
        }
    }

    fn platform(&self, series: &[DayMetrics], range_kind: RangeKind) -> PlatformFatigue {
        let threshold = self.threshold(self.config.cpm_increase_threshold, range_kind);
        let change = endpoints(series, |d| d.metrics.cpm)
            .map(|(first, last)| relative_change(first, last))
            .unwrap_or(0.0);

        PlatformFatigue {
            cpm_trend: direction(change, threshold),
            severity: change_severity(change, threshold, self.config.severity_escalation),
            cpm_change_pct: change * 100.0,
        }
    }

    fn overall_severity(&self, score: u32, range_kind: RangeKind) -> FatigueSeverity {
        let tiers = if range_kind.is_short_term() {
            &self.config.short_term_tiers
        } else {
            &self.config.long_term_tiers
        };
        if score >= tiers.high {
            FatigueSeverity::High
        } else if score >= tiers.medium {
            FatigueSeverity::Medium
        } else {
            FatigueSeverity::Low
        }
    }
}
