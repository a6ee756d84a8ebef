//! CSV ingestion
//!
//! Reads insight rows from API-style CSV (snake_case headers) or an Ads
//! Manager export ("Reporting starts", "Amount spent (USD)", ...). Columns
//! are matched by normalized header name; unknown columns are ignored.

use std::io::Read;

use super::raw::{normalize_row, RawInsightRow};
use super::IngestError;
use crate::models::insight::InsightRow;

/// Normalize a header: lowercase, drop parenthetical suffixes, snake_case
fn normalize_header(header: &str) -> String {
    let without_parens = match header.find('(') {
        Some(idx) => &header[..idx],
        None => header,
    };
    without_parens
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Canonical raw-row fields a header feeds
fn canonical_columns(header: &str) -> &'static [&'static str] {
    match normalize_header(header).as_str() {
        "ad_id" => &["ad_id"],
        "ad_name" => &["ad_name"],
        "adset_id" | "ad_set_id" => &["adset_id"],
        "adset_name" | "ad_set_name" => &["adset_name"],
        "campaign_id" => &["campaign_id"],
        "campaign_name" => &["campaign_name"],
        "date_start" | "reporting_starts" => &["date_start"],
        "date_stop" | "reporting_ends" => &["date_stop"],
        "day" | "date" => &["date_start", "date_stop"],
        "publisher_platform" | "platform" => &["publisher_platform"],
        "impressions" => &["impressions"],
        "clicks" => &["clicks"],
        "spend" | "amount_spent" => &["spend"],
        "reach" => &["reach"],
        "frequency" => &["frequency"],
        "conversions" | "results" => &["conversions"],
        "first_conversions" => &["first_conversions"],
        "unique_clicks" => &["unique_clicks"],
        "conversion_values" | "conversion_value" | "purchases_conversion_value" => {
            &["conversion_values"]
        }
        _ => &[],
    }
}

/// Read and normalize every row of a CSV document
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<InsightRow>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestError::MissingHeader);
    }
    let columns: Vec<&'static [&'static str]> =
        headers.iter().map(canonical_columns).collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut raw = RawInsightRow::default();
        for (idx, value) in record.iter().enumerate() {
            let Some(targets) = columns.get(idx) else {
                continue;
            };
            for target in targets.iter() {
                raw.set_field(target, value);
            }
        }
        rows.push(normalize_row(raw));
    }

    tracing::debug!("Read {} insight rows from CSV", rows.len());
    Ok(rows)
}
