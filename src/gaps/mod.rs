//! Delivery gap detection module
//!
//! Extracts runs of non-delivery days from a daily timeline and:
//! - Classifies severity by duration
//! - Labels a likely cause (weekend, maintenance, budget, performance, unexpected)
//! - Estimates CTR drop, recovery time, and lost impressions/revenue
//! - Summarizes gap rate and continuity over the timeline

pub mod detector;
pub mod types;

pub use detector::GapDetectionEngine;
pub use types::{
    DeliveryGap, GapDetectionConfig, GapDetectionResult, GapSeverity, GapStatistics, GapType,
};
