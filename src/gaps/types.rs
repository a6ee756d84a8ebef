//! Delivery gap types and data structures
//!
//! Defines gap severities and types, the structure for reporting detected
//! gaps, and the engine configuration.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::metrics::CalculatedMetrics;

/// Severity of a delivery gap, by duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapSeverity {
    Critical,
    Major,
    Minor,
    Negligible,
}

impl GapSeverity {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Negligible => "negligible",
        }
    }
}

/// Likely cause of a gap.
///
/// No stop-reason signal exists in insight data, so `BudgetExhaustion` and
/// `PerformancePause` are heuristic labels, not facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// Short gap starting on a Saturday or Sunday
    Weekend,
    /// Falls within a configured maintenance window
    ScheduledMaintenance,
    /// Preceded by unusually high spend
    BudgetExhaustion,
    /// Preceded by low CTR
    PerformancePause,
    Unexpected,
}

impl GapType {
    /// Get display name for the gap type
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Weekend => "Weekend",
            Self::ScheduledMaintenance => "Scheduled Maintenance",
            Self::BudgetExhaustion => "Budget Exhaustion",
            Self::PerformancePause => "Performance Pause",
            Self::Unexpected => "Unexpected",
        }
    }

    /// Whether the label is a best-effort guess rather than a known cause
    pub fn is_heuristic(&self) -> bool {
        matches!(self, Self::BudgetExhaustion | Self::PerformancePause)
    }
}

/// Estimated impact of a gap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapImpact {
    /// CTR change across the gap, percent of the pre-gap CTR
    pub performance_drop_pct: f64,
    /// Simplified estimate, capped at `max_recovery_days`
    pub recovery_time_days: u32,
    pub estimated_lost_impressions: f64,
    /// Heuristic: average pre-gap spend * duration * revenue_loss_factor
    pub estimated_lost_revenue: f64,
}

/// A contiguous run of days without delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryGap {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: u32,
    pub severity: GapSeverity,
    #[serde(rename = "type")]
    pub gap_type: GapType,
    pub impact: GapImpact,
    /// Last delivery day before the gap (`None` if the timeline starts in a gap)
    pub before_gap_metrics: Option<CalculatedMetrics>,
    /// First delivery day after the gap (`None` while the gap is still open)
    pub after_gap_metrics: Option<CalculatedMetrics>,
}

impl DeliveryGap {
    /// Gap still running at the end of the analyzed window
    pub fn is_open(&self) -> bool {
        self.after_gap_metrics.is_none()
    }
}

/// Gap duration thresholds. Must satisfy critical > major > minor > 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapThresholds {
    /// Days for a critical gap (default: 7)
    pub critical_gap_days: u32,
    /// Days for a major gap (default: 3)
    pub major_gap_days: u32,
    /// Days for a minor gap (default: 1)
    pub minor_gap_days: u32,
}

impl Default for GapThresholds {
    fn default() -> Self {
        Self {
            critical_gap_days: 7,
            major_gap_days: 3,
            minor_gap_days: 1,
        }
    }
}

/// Planned downtime that explains a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub label: Option<String>,
}

impl MaintenanceWindow {
    /// Whether the whole gap lies inside the window
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Known, expected non-delivery patterns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapPatternConfig {
    /// Classify short Saturday/Sunday gaps as weekend gaps (default: true)
    pub weekend_tolerance: bool,
    pub scheduled_maintenance_windows: Vec<MaintenanceWindow>,
}

impl Default for GapPatternConfig {
    fn default() -> Self {
        Self {
            weekend_tolerance: true,
            scheduled_maintenance_windows: Vec::new(),
        }
    }
}

/// Tunable heuristic constants. Their calibration is empirical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapHeuristics {
    /// Pre-gap spend above this multiple of the average delivery-day spend
    /// suggests budget exhaustion (default: 1.5)
    pub high_spend_multiplier: f64,
    /// Pre-gap CTR (percent) below this suggests a performance pause (default: 1.0)
    pub low_ctr_threshold: f64,
    /// Cap on the recovery estimate (default: 7)
    pub max_recovery_days: u32,
    /// Share of pre-gap daily spend counted as lost revenue (default: 0.8)
    pub revenue_loss_factor: f64,
}

impl Default for GapHeuristics {
    fn default() -> Self {
        Self {
            high_spend_multiplier: 1.5,
            low_ctr_threshold: 1.0,
            max_recovery_days: 7,
            revenue_loss_factor: 0.8,
        }
    }
}

/// Gap detection engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GapDetectionConfig {
    /// Runs shorter than this are not reported (default: 1)
    pub min_gap_days: u32,
    pub thresholds: GapThresholds,
    pub patterns: GapPatternConfig,
    pub heuristics: GapHeuristics,
}

impl Default for GapDetectionConfig {
    fn default() -> Self {
        Self {
            min_gap_days: 1,
            thresholds: GapThresholds::default(),
            patterns: GapPatternConfig::default(),
            heuristics: GapHeuristics::default(),
        }
    }
}

impl GapDetectionConfig {
    /// Check threshold ordering and minimum gap length
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(t.critical_gap_days > t.major_gap_days
            && t.major_gap_days > t.minor_gap_days
            && t.minor_gap_days > 0)
        {
            return Err(ConfigError::GapThresholdOrder {
                critical: t.critical_gap_days,
                major: t.major_gap_days,
                minor: t.minor_gap_days,
            });
        }
        if self.min_gap_days < 1 {
            return Err(ConfigError::MinGapDays(self.min_gap_days));
        }
        for window in &self.patterns.scheduled_maintenance_windows {
            if window.start > window.end {
                return Err(ConfigError::InvertedWindow {
                    start: window.start.to_string(),
                    end: window.end.to_string(),
                });
            }
        }
        let h = &self.heuristics;
        if !(h.revenue_loss_factor >= 0.0) || !(h.high_spend_multiplier > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "gaps.heuristics",
                reason: "revenue_loss_factor must be >= 0 and high_spend_multiplier > 0"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Batch statistics over all reported gaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapStatistics {
    pub total_days: usize,
    pub total_gaps: usize,
    pub total_gap_days: u32,
    /// Percent of analyzed days inside a reported gap
    pub gap_rate: f64,
    pub average_gap_duration: f64,
    pub longest_gap_days: u32,
    /// 100 - gap_rate, clamped to [0, 100]; 100 for an empty timeline
    pub continuity_score: f64,
    pub by_severity: BTreeMap<GapSeverity, usize>,
    pub by_type: BTreeMap<GapType, usize>,
}

/// Facts about the analyzed timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapMetadata {
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub analyzed_days: usize,
    pub delivery_days: usize,
    pub min_gap_days: u32,
    /// Non-delivery runs shorter than `min_gap_days`
    pub discarded_runs: usize,
}

/// Output of one gap detection call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapDetectionResult {
    pub gaps: Vec<DeliveryGap>,
    pub statistics: GapStatistics,
    pub metadata: GapMetadata,
}
