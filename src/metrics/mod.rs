//! Metrics calculation module
//!
//! Shared summation logic used for summaries, daily and platform breakdowns,
//! and delivery timelines:
//! - Additive fields are summed
//! - Reach is the max across rows
//! - Frequency is the mean of non-zero per-row values
//! - Ratios are recomputed from the totals, guarded to 0 on a zero denominator

pub mod accumulator;
pub mod platform;

pub use accumulator::{safe_ratio, MetricAccumulator};
pub use platform::Platform;
