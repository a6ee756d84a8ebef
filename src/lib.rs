//! Adlens - Ad Performance Analytics Core
//!
//! Turns raw per-day/per-platform advertising insight rows into
//! decision-grade structures. It handles:
//! - Row normalization at the ingestion boundary (CSV/JSON, numeric strings)
//! - Per-entity aggregation with correctly recomputed ratio metrics
//! - Delivery pattern classification over a date window
//! - Delivery gap extraction, classification and impact estimation
//! - Date-range-aware creative/audience/platform fatigue scoring
//!
//! Everything here is a pure function of (rows, config). Nothing fetches,
//! persists, or renders.

pub mod aggregator;
pub mod config;
pub mod daterange;
pub mod delivery;
pub mod fatigue;
pub mod gaps;
pub mod ingest;
pub mod metrics;
pub mod models;

pub use aggregator::{
    aggregate, aggregate_parallel, AggregateOptions, AggregationError, AggregationResult, Aggregator,
};
pub use config::{AnalysisConfig, ConfigError};
pub use daterange::{DateRangePreset, DateWindow};
pub use delivery::{DeliveryPatternAnalyzer, DeliveryPattern, DeliveryPatternReport};
pub use fatigue::{DateRangeAwareFatigueEngine, FatigueAnalysis};
pub use gaps::{GapDetectionEngine, GapDetectionResult};
pub use models::insight::{GroupBy, InsightRow};
pub use models::performance::AdPerformanceRecord;

/// Install a formatting `tracing` subscriber at INFO level.
///
/// Embedding applications usually bring their own subscriber; this is for
/// tools and tests that just want to see the engine's log output. Calling it
/// more than once is a no-op.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();
}
