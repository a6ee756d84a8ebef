//! Raw insight rows and their normalization

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::{parse_count, parse_number, IngestError};
use crate::daterange::parse_date;
use crate::models::insight::InsightRow;
use crate::models::metrics::BaseMetrics;

/// Number of tracked fields counted in `InsightRow::missing_fields`
pub const TRACKED_FIELD_COUNT: usize = 5;

/// Accept a string, number, bool or null and keep it as text
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientVisitor;

    impl<'de> Visitor<'de> for LenientVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number, or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientVisitor)
        }
    }

    deserializer.deserialize_any(LenientVisitor)
}

/// Insight row as delivered by the reporting API or an export file.
///
/// Every field is optional text; numbers may arrive as strings or as JSON
/// numbers. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInsightRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ad_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ad_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub adset_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub adset_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campaign_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub campaign_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_start: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_stop: Option<String>,
    #[serde(default, alias = "platform", deserialize_with = "lenient_string")]
    pub publisher_platform: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub impressions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub clicks: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub spend: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reach: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conversions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_conversions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unique_clicks: Option<String>,
    #[serde(
        default,
        alias = "conversion_value",
        alias = "purchase_value",
        deserialize_with = "lenient_string"
    )]
    pub conversion_values: Option<String>,
}

impl RawInsightRow {
    /// Set a field by its canonical column name. Returns false for unknown names.
    pub fn set_field(&mut self, column: &str, value: &str) -> bool {
        let slot = match column {
            "ad_id" => &mut self.ad_id,
            "ad_name" => &mut self.ad_name,
            "adset_id" => &mut self.adset_id,
            "adset_name" => &mut self.adset_name,
            "campaign_id" => &mut self.campaign_id,
            "campaign_name" => &mut self.campaign_name,
            "date_start" => &mut self.date_start,
            "date_stop" => &mut self.date_stop,
            "publisher_platform" => &mut self.publisher_platform,
            "impressions" => &mut self.impressions,
            "clicks" => &mut self.clicks,
            "spend" => &mut self.spend,
            "reach" => &mut self.reach,
            "frequency" => &mut self.frequency,
            "conversions" => &mut self.conversions,
            "first_conversions" => &mut self.first_conversions,
            "unique_clicks" => &mut self.unique_clicks,
            "conversion_values" => &mut self.conversion_values,
            _ => return false,
        };
        *slot = Some(value.to_string());
        true
    }
}

/// Trim and drop empty strings
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a raw row into the closed schema.
///
/// Tracked fields (`date_start`, `date_stop`, `impressions`, `clicks`,
/// `spend`) that are absent or unparseable are counted in
/// `missing_fields`; their values default to 0 / `None`.
pub fn normalize_row(raw: RawInsightRow) -> InsightRow {
    let mut missing = 0u8;

    let date_start = raw.date_start.as_deref().and_then(parse_date);
    if date_start.is_none() {
        missing += 1;
    }
    let date_stop = raw.date_stop.as_deref().and_then(parse_date);
    if date_stop.is_none() {
        missing += 1;
    }

    let impressions = parse_count(raw.impressions.as_deref());
    let clicks = parse_count(raw.clicks.as_deref());
    let spend = parse_number(raw.spend.as_deref());
    missing += [impressions.missing, clicks.missing, spend.missing]
        .iter()
        .filter(|m| **m)
        .count() as u8;

    let metrics = BaseMetrics {
        impressions: impressions.value as u64,
        clicks: clicks.value as u64,
        spend: spend.value,
        reach: parse_count(raw.reach.as_deref()).value as u64,
        frequency: parse_number(raw.frequency.as_deref()).value,
        conversions: parse_number(raw.conversions.as_deref()).value,
        first_conversions: parse_number(raw.first_conversions.as_deref()).value,
        unique_clicks: parse_count(raw.unique_clicks.as_deref()).value as u64,
        conversion_value: parse_number(raw.conversion_values.as_deref()).value,
    };

    InsightRow {
        ad_id: clean_text(raw.ad_id),
        ad_name: clean_text(raw.ad_name),
        adset_id: clean_text(raw.adset_id),
        adset_name: clean_text(raw.adset_name),
        campaign_id: clean_text(raw.campaign_id),
        campaign_name: clean_text(raw.campaign_name),
        date_start,
        date_stop,
        platform: clean_text(raw.publisher_platform),
        metrics,
        missing_fields: missing,
    }
}

impl From<RawInsightRow> for InsightRow {
    fn from(raw: RawInsightRow) -> Self {
        normalize_row(raw)
    }
}

/// Accepts a bare array or the API's `{"data": [...]}` envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum RowsDocument {
    Bare(Vec<RawInsightRow>),
    Envelope { data: Vec<RawInsightRow> },
}

/// Decode and normalize rows from a JSON document
pub fn read_json_rows(json: &str) -> Result<Vec<InsightRow>, IngestError> {
    let raw = match serde_json::from_str::<RowsDocument>(json)? {
        RowsDocument::Bare(rows) => rows,
        RowsDocument::Envelope { data } => data,
    };
    tracing::debug!("Decoded {} raw insight rows from JSON", raw.len());
    Ok(raw.into_iter().map(normalize_row).collect())
}
