//! Insight row types
//!
//! The closed, normalized schema every engine consumes. Raw loosely typed
//! rows are converted into this shape once, in [`crate::ingest`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::BaseMetrics;

/// Entity level used as the grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Ad,
    Adset,
    Campaign,
}

impl GroupBy {
    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ad => "ad",
            Self::Adset => "adset",
            Self::Campaign => "campaign",
        }
    }
}

impl From<&str> for GroupBy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "adset" | "ad_set" => GroupBy::Adset,
            "campaign" => GroupBy::Campaign,
            _ => GroupBy::Ad,
        }
    }
}

/// One day (optionally one platform) of metrics for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightRow {
    pub ad_id: Option<String>,
    pub ad_name: Option<String>,
    pub adset_id: Option<String>,
    pub adset_name: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    /// `None` when absent or not a valid `yyyy-mm-dd` date
    pub date_start: Option<NaiveDate>,
    pub date_stop: Option<NaiveDate>,
    /// Publisher platform as reported, before normalization
    pub platform: Option<String>,
    pub metrics: BaseMetrics,
    /// How many tracked fields were missing or unparseable in the raw row
    pub missing_fields: u8,
}

impl InsightRow {
    /// Entity id at the given level
    pub fn entity_id(&self, group_by: GroupBy) -> Option<&str> {
        match group_by {
            GroupBy::Ad => self.ad_id.as_deref(),
            GroupBy::Adset => self.adset_id.as_deref(),
            GroupBy::Campaign => self.campaign_id.as_deref(),
        }
    }

    /// Entity display name at the given level
    pub fn entity_name(&self, group_by: GroupBy) -> Option<&str> {
        match group_by {
            GroupBy::Ad => self.ad_name.as_deref(),
            GroupBy::Adset => self.adset_name.as_deref(),
            GroupBy::Campaign => self.campaign_name.as_deref(),
        }
    }

    /// Effective last day covered by the row (falls back to `date_start`)
    pub fn effective_stop(&self) -> Option<NaiveDate> {
        self.date_stop.or(self.date_start)
    }
}
