//! Date ranges
//!
//! Inclusive date windows and the date-range presets used by the ads
//! reporting API. The preset label only selects thresholds in the fatigue
//! engine; resolving it to concrete dates is a convenience for callers.

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Parse a date in YYYY-MM-DD format.
///
/// Also accepts ISO 8601 timestamps ("2024-01-05T10:30:00Z") by taking the
/// date portion.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(0..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Inclusive range of calendar days. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unvalidated wire form of a [`DateWindow`]
#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = ConfigError;

    fn try_from(bounds: WindowBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Create a window from two YYYY-MM-DD strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        let parse = |field: &'static str, value: &str| {
            parse_date(value).ok_or_else(|| ConfigError::InvalidValue {
                field,
                reason: format!("'{}' is not a yyyy-mm-dd date", value),
            })
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the window, both ends included
    pub fn total_days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(u32::MAX)
    }

    /// Whether the date falls inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every day of the window in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.total_days() as usize)
    }
}

/// Date-range preset label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangePreset {
    Today,
    Yesterday,
    #[serde(rename = "last_3d")]
    Last3d,
    #[serde(rename = "last_7d")]
    Last7d,
    #[serde(rename = "last_14d")]
    Last14d,
    #[serde(rename = "last_28d")]
    Last28d,
    #[serde(rename = "last_30d")]
    Last30d,
    #[serde(rename = "last_90d")]
    Last90d,
    ThisMonth,
    LastMonth,
    Maximum,
    Custom,
}

impl DateRangePreset {
    /// Parse a preset label; anything unrecognized is `Custom`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "today" => Self::Today,
            "yesterday" => Self::Yesterday,
            "last_3d" => Self::Last3d,
            "last_7d" => Self::Last7d,
            "last_14d" => Self::Last14d,
            "last_28d" => Self::Last28d,
            "last_30d" => Self::Last30d,
            "last_90d" => Self::Last90d,
            "this_month" => Self::ThisMonth,
            "last_month" => Self::LastMonth,
            "maximum" => Self::Maximum,
            _ => Self::Custom,
        }
    }

    /// Get the API label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last3d => "last_3d",
            Self::Last7d => "last_7d",
            Self::Last14d => "last_14d",
            Self::Last28d => "last_28d",
            Self::Last30d => "last_30d",
            Self::Last90d => "last_90d",
            Self::ThisMonth => "this_month",
            Self::LastMonth => "last_month",
            Self::Maximum => "maximum",
            Self::Custom => "custom",
        }
    }

    /// Ranges of a week or less get stricter fatigue thresholds
    pub fn is_short_term(&self) -> bool {
        matches!(
            self,
            Self::Today | Self::Yesterday | Self::Last3d | Self::Last7d
        )
    }

    /// Concrete window relative to `today`.
    ///
    /// `last_Nd` presets cover the N full days before today. Returns `None`
    /// for `maximum` and `custom`, which have no fixed bounds.
    pub fn resolve(&self, today: NaiveDate) -> Option<DateWindow> {
        let last_n = |n: i64| DateWindow {
            start: today - ChronoDuration::days(n),
            end: today - ChronoDuration::days(1),
        };

        match self {
            Self::Today => Some(DateWindow {
                start: today,
                end: today,
            }),
            Self::Yesterday => {
                let day = today - ChronoDuration::days(1);
                Some(DateWindow {
                    start: day,
                    end: day,
                })
            }
            Self::Last3d => Some(last_n(3)),
            Self::Last7d => Some(last_n(7)),
            Self::Last14d => Some(last_n(14)),
            Self::Last28d => Some(last_n(28)),
            Self::Last30d => Some(last_n(30)),
            Self::Last90d => Some(last_n(90)),
            Self::ThisMonth => Some(DateWindow {
                start: today.with_day(1)?,
                end: today,
            }),
            Self::LastMonth => {
                let end = today.with_day(1)? - ChronoDuration::days(1);
                Some(DateWindow {
                    start: end.with_day(1)?,
                    end,
                })
            }
            Self::Maximum | Self::Custom => None,
        }
    }
}

impl From<&str> for DateRangePreset {
    fn from(s: &str) -> Self {
        Self::from_label(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-01-05"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("2024-01-05T10:30:00Z"), Some(d(2024, 1, 5)));
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_window_total_days_inclusive() {
        let window = DateWindow::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
        assert_eq!(window.total_days(), 10);

        let single = DateWindow::new(d(2024, 1, 1), d(2024, 1, 1)).unwrap();
        assert_eq!(single.total_days(), 1);
    }

    #[test]
    fn test_window_rejects_inverted() {
        let result = DateWindow::new(d(2024, 1, 10), d(2024, 1, 1));
        assert!(matches!(result, Err(ConfigError::InvertedWindow { .. })));
    }

    #[test]
    fn test_inverted_window_rejected_on_deserialize() {
        let result = serde_json::from_str::<DateWindow>(
            r#"{"start":"2024-01-10","end":"2024-01-01"}"#,
        );
        assert!(result.is_err());

        let window: DateWindow =
            serde_json::from_str(r#"{"start":"2024-01-01","end":"2024-01-10"}"#).unwrap();
        assert_eq!(window.total_days(), 10);
        assert_eq!(window.start(), d(2024, 1, 1));
        assert_eq!(window.end(), d(2024, 1, 10));
    }

    #[test]
    fn test_window_parse() {
        let window = DateWindow::parse("2024-02-27", "2024-03-01").unwrap();
        // 2024 is a leap year
        assert_eq!(window.total_days(), 4);
        assert!(DateWindow::parse("bad", "2024-03-01").is_err());
    }

    #[test]
    fn test_window_days_and_contains() {
        let window = DateWindow::new(d(2024, 1, 30), d(2024, 2, 2)).unwrap();
        let days: Vec<NaiveDate> = window.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], d(2024, 1, 30));
        assert_eq!(days[3], d(2024, 2, 2));
        assert!(window.contains(d(2024, 2, 1)));
        assert!(!window.contains(d(2024, 2, 3)));
    }

    #[test]
    fn test_preset_from_label() {
        assert_eq!(DateRangePreset::from_label("last_7d"), DateRangePreset::Last7d);
        assert_eq!(DateRangePreset::from_label("TODAY"), DateRangePreset::Today);
        assert_eq!(DateRangePreset::from_label("last_30d"), DateRangePreset::Last30d);
        assert_eq!(DateRangePreset::from_label("2024-01-01_2024-02-01"), DateRangePreset::Custom);
    }

    #[test]
    fn test_preset_short_term() {
        assert!(DateRangePreset::Today.is_short_term());
        assert!(DateRangePreset::Yesterday.is_short_term());
        assert!(DateRangePreset::Last3d.is_short_term());
        assert!(DateRangePreset::Last7d.is_short_term());
        assert!(!DateRangePreset::Last14d.is_short_term());
        assert!(!DateRangePreset::Last30d.is_short_term());
        assert!(!DateRangePreset::Custom.is_short_term());
    }

    #[test]
    fn test_preset_resolve() {
        let today = d(2024, 3, 15);

        let last7 = DateRangePreset::Last7d.resolve(today).unwrap();
        assert_eq!(last7.start(), d(2024, 3, 8));
        assert_eq!(last7.end(), d(2024, 3, 14));
        assert_eq!(last7.total_days(), 7);

        let yesterday = DateRangePreset::Yesterday.resolve(today).unwrap();
        assert_eq!(yesterday.total_days(), 1);
        assert_eq!(yesterday.start(), d(2024, 3, 14));

        let this_month = DateRangePreset::ThisMonth.resolve(today).unwrap();
        assert_eq!(this_month.start(), d(2024, 3, 1));
        assert_eq!(this_month.end(), today);

        let last_month = DateRangePreset::LastMonth.resolve(today).unwrap();
        assert_eq!(last_month.start(), d(2024, 2, 1));
        assert_eq!(last_month.end(), d(2024, 2, 29));

        assert!(DateRangePreset::Maximum.resolve(today).is_none());
    }

    #[test]
    fn test_preset_serialization() {
        let json = serde_json::to_string(&DateRangePreset::Last7d).unwrap();
        assert_eq!(json, "\"last_7d\"");
        let json = serde_json::to_string(&DateRangePreset::ThisMonth).unwrap();
        assert_eq!(json, "\"this_month\"");
    }
}
