//! Metric accumulation
//!
//! Collects base metrics from any number of rows and derives the calculated
//! metric set from the aggregated totals.

use crate::models::metrics::{BaseMetrics, CalculatedMetrics};

/// Divide, returning 0 when the denominator is 0
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Running totals for a group of rows
#[derive(Debug, Clone, Default)]
pub struct MetricAccumulator {
    impressions: u64,
    clicks: u64,
    spend: f64,
    reach: u64,
    frequency_sum: f64,
    frequency_count: u32,
    conversions: f64,
    first_conversions: f64,
    unique_clicks: u64,
    conversion_value: f64,
    rows: usize,
}

impl MetricAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row's metrics
    pub fn add(&mut self, metrics: &BaseMetrics) {
        self.impressions = self.impressions.saturating_add(metrics.impressions);
        self.clicks = self.clicks.saturating_add(metrics.clicks);
        self.spend += metrics.spend;
        self.reach = self.reach.max(metrics.reach);
        if metrics.frequency > 0.0 {
            self.frequency_sum += metrics.frequency;
            self.frequency_count += 1;
        }
        self.conversions += metrics.conversions;
        self.first_conversions += metrics.first_conversions;
        self.unique_clicks = self.unique_clicks.saturating_add(metrics.unique_clicks);
        self.conversion_value += metrics.conversion_value;
        self.rows += 1;
    }

    /// Number of rows added so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Produce totals and ratios recomputed from them
    pub fn finish(&self) -> CalculatedMetrics {
        let impressions = self.impressions as f64;
        let clicks = self.clicks as f64;

        CalculatedMetrics {
            impressions: self.impressions,
            clicks: self.clicks,
            spend: self.spend,
            reach: self.reach,
            frequency: if self.frequency_count > 0 {
                self.frequency_sum / self.frequency_count as f64
            } else {
                0.0
            },
            conversions: self.conversions,
            first_conversions: self.first_conversions,
            unique_clicks: self.unique_clicks,
            conversion_value: self.conversion_value,
            ctr: safe_ratio(clicks, impressions) * 100.0,
            cpc: safe_ratio(self.spend, clicks),
            cpm: safe_ratio(self.spend, impressions) * 1000.0,
            cpa: safe_ratio(self.spend, self.conversions),
            roas: safe_ratio(self.conversion_value, self.spend),
            cvr: safe_ratio(self.conversions, clicks),
        }
    }
}

impl<'a> FromIterator<&'a BaseMetrics> for MetricAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a BaseMetrics>>(iter: I) -> Self {
        let mut acc = MetricAccumulator::new();
        for metrics in iter {
            acc.add(metrics);
        }
        acc
    }
}
