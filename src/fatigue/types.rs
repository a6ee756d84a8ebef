//! Fatigue analysis types

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of CTR movement for the creative indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeTrend {
    Declining,
    Improving,
    Stable,
}

/// Direction of a frequency or CPM series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Fatigue severity, ordered low to high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueSeverity {
    Low,
    Medium,
    High,
}

impl FatigueSeverity {
    /// Points used when summing indicators into an overall severity
    pub fn score(&self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Whether an analysis ran with short-term (stricter) thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    ShortTerm,
    LongTerm,
}

impl RangeKind {
    pub fn is_short_term(&self) -> bool {
        matches!(self, Self::ShortTerm)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeFatigue {
    pub trend: CreativeTrend,
    pub severity: FatigueSeverity,
    /// (last CTR - first CTR) / first CTR * 100
    pub ctr_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceFatigue {
    pub frequency_trend: TrendDirection,
    pub severity: FatigueSeverity,
    pub current_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformFatigue {
    pub cpm_trend: TrendDirection,
    pub severity: FatigueSeverity,
    /// (last CPM - first CPM) / first CPM * 100
    pub cpm_change_pct: f64,
}

/// All fatigue indicators for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueIndicatorSet {
    pub creative: CreativeFatigue,
    pub audience: AudienceFatigue,
    pub platform: PlatformFatigue,
    pub overall_severity: FatigueSeverity,
    pub recommendations: Vec<String>,
}

/// Fatigue result for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdFatigueGap {
    pub entity_id: String,
    pub entity_name: Option<String>,
    pub range_kind: RangeKind,
    /// Input rows for the entity; selects the range kind
    pub row_count: usize,
    /// Distinct dated days in the entity's series
    pub data_points: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub indicators: FatigueIndicatorSet,
}

/// Long-range CTR trend statistics for one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesInsight {
    pub data_points: usize,
    /// Least-squares CTR change per day, in percentage points
    pub ctr_slope: f64,
    /// r² of the linear fit, within [0, 1]
    pub trend_strength: f64,
    /// Lag-7 autocorrelation of daily CTR; `None` below the minimum point count
    pub weekly_autocorrelation: Option<f64>,
    pub has_weekly_seasonality: bool,
}

/// Batch-level summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueSummary {
    pub date_range_label: String,
    /// Classification of the label alone, before per-entity point counts
    pub label_range_kind: RangeKind,
    pub total_entities: usize,
    pub short_term_entities: usize,
    pub by_severity: BTreeMap<FatigueSeverity, usize>,
    pub rows_missing_id: usize,
}

/// Output of one fatigue analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAnalysis {
    /// One entry per entity, sorted by entity id
    pub gaps: Vec<AdFatigueGap>,
    pub summary: FatigueSummary,
    /// Keyed by entity id; only long-term entities appear
    pub time_series_analysis: BTreeMap<String, TimeSeriesInsight>,
}
