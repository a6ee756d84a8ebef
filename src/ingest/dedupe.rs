//! Duplicate row removal
//!
//! The engines assume at most one row per (entity, date, platform). Paginated
//! fetches can repeat rows across page boundaries; this is the explicit step
//! that enforces the assumption. It is opt-in: `aggregate` only calls it
//! when `AggregateOptions::dedupe` is set.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::insight::{GroupBy, InsightRow};

/// Rows left after deduplication
#[derive(Debug, Clone)]
pub struct DedupeOutcome {
    pub rows: Vec<InsightRow>,
    /// Number of earlier duplicates that were dropped
    pub removed: usize,
}

/// Keep the last row seen for each (entity, date, platform) key.
///
/// Output keeps the position of each key's first occurrence. Rows without an
/// entity id are passed through untouched.
pub fn dedupe_rows(rows: Vec<InsightRow>, group_by: GroupBy) -> DedupeOutcome {
    let mut slots: HashMap<(String, Option<NaiveDate>, Option<String>), usize> = HashMap::new();
    let mut kept: Vec<InsightRow> = Vec::with_capacity(rows.len());
    let mut removed = 0usize;

    for row in rows {
        let Some(entity_id) = row.entity_id(group_by).map(str::to_string) else {
            kept.push(row);
            continue;
        };
        let platform = row.platform.as_deref().map(|p| p.trim().to_lowercase());
        let key = (entity_id, row.date_start, platform);

        match slots.get(&key) {
            Some(&idx) => {
                kept[idx] = row;
                removed += 1;
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(row);
            }
        }
    }

    if removed > 0 {
        tracing::debug!("Removed {} duplicate insight rows", removed);
    }

    DedupeOutcome {
        rows: kept,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::BaseMetrics;

    fn row(id: &str, day: u32, platform: Option<&str>, impressions: u64) -> InsightRow {
        InsightRow {
            ad_id: Some(id.to_string()),
            date_start: NaiveDate::from_ymd_opt(2024, 1, day),
            platform: platform.map(str::to_string),
            metrics: BaseMetrics {
                impressions,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_dedupe_keeps_last() {
        let rows = vec![
            row("a", 1, None, 100),
            row("a", 2, None, 200),
            row("a", 1, None, 150),
        ];

        let outcome = dedupe_rows(rows, GroupBy::Ad);
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].metrics.impressions, 150);
        assert_eq!(outcome.rows[1].metrics.impressions, 200);
    }

    #[test]
    fn test_dedupe_distinguishes_platforms() {
        let rows = vec![
            row("a", 1, Some("facebook"), 100),
            row("a", 1, Some("instagram"), 100),
            row("a", 1, Some("Facebook "), 120),
        ];

        let outcome = dedupe_rows(rows, GroupBy::Ad);
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].metrics.impressions, 120);
    }

    #[test]
    fn test_dedupe_passes_through_missing_ids() {
        let mut orphan = row("x", 1, None, 1);
        orphan.ad_id = None;
        let outcome = dedupe_rows(vec![orphan.clone(), orphan], GroupBy::Ad);
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.rows.len(), 2);
    }
}
