//! Ingestion boundary
//!
//! Converts loosely typed insight rows into the closed [`InsightRow`]
//! schema in one explicit normalization step:
//! - Raw JSON/CSV records with string-typed numbers
//! - Defensive numeric parsing (non-numeric becomes 0)
//! - Missing-field accounting for data quality
//! - Optional duplicate removal
//!
//! [`InsightRow`]: crate::models::insight::InsightRow

pub mod csv_reader;
pub mod dedupe;
pub mod raw;

use thiserror::Error;

pub use csv_reader::read_csv_rows;
pub use dedupe::{dedupe_rows, DedupeOutcome};
pub use raw::{normalize_row, read_json_rows, RawInsightRow};

/// Errors decoding raw rows at the boundary
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV input has no header row")]
    MissingHeader,
}

/// Result of parsing one numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNumber {
    pub value: f64,
    /// Absent, empty, or not a number
    pub missing: bool,
}

/// Parse a numeric string defensively.
///
/// Thousands separators and a leading currency sign are tolerated. Anything
/// unparseable, non-finite or negative yields 0.
pub fn parse_number(raw: Option<&str>) -> ParsedNumber {
    let text = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => {
            return ParsedNumber {
                value: 0.0,
                missing: true,
            }
        }
    };

    let cleaned: String = text
        .trim_start_matches(['$', '€', '£'])
        .chars()
        .filter(|c| *c != ',')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => ParsedNumber {
            value: v.max(0.0),
            missing: false,
        },
        _ => ParsedNumber {
            value: 0.0,
            missing: true,
        },
    }
}

/// Parse a count field, rounding to the nearest whole number
pub fn parse_count(raw: Option<&str>) -> ParsedNumber {
    let parsed = parse_number(raw);
    ParsedNumber {
        value: parsed.value.round(),
        ..parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_plain() {
        let p = parse_number(Some("12.50"));
        assert!((p.value - 12.5).abs() < 1e-9);
        assert!(!p.missing);
    }

    #[test]
    fn test_parse_number_separators_and_currency() {
        assert!((parse_number(Some("1,234.5")).value - 1234.5).abs() < 1e-9);
        assert!((parse_number(Some("$99.99")).value - 99.99).abs() < 1e-9);
        assert!((parse_number(Some(" 42 ")).value - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_number_non_numeric_is_zero() {
        let p = parse_number(Some("n/a"));
        assert_eq!(p.value, 0.0);
        assert!(p.missing);

        let p = parse_number(Some("inf"));
        assert_eq!(p.value, 0.0);
        assert!(p.missing);

        let p = parse_number(Some("NaN"));
        assert_eq!(p.value, 0.0);
    }

    #[test]
    fn test_parse_number_absent() {
        assert!(parse_number(None).missing);
        assert!(parse_number(Some("")).missing);
        assert!(parse_number(Some("   ")).missing);
    }

    #[test]
    fn test_parse_number_negative_clamped() {
        let p = parse_number(Some("-5"));
        assert_eq!(p.value, 0.0);
        assert!(!p.missing);
    }

    #[test]
    fn test_parse_count_rounds() {
        assert_eq!(parse_count(Some("10.6")).value, 11.0);
        assert_eq!(parse_count(Some("1e3")).value, 1000.0);
    }
}
