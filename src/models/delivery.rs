//! Daily delivery status snapshot

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::CalculatedMetrics;

/// Delivery state of one entity on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDeliveryStatus {
    pub date: NaiveDate,
    pub has_delivery: bool,
    pub metrics: CalculatedMetrics,
}

impl DailyDeliveryStatus {
    /// A synthesized day with no delivery and zero metrics
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            has_delivery: false,
            metrics: CalculatedMetrics::default(),
        }
    }
}
