//! Data models module
//!
//! Contains the data structures shared across the analytics core:
//! - Normalized insight rows and the grouping key
//! - Base and calculated metric types
//! - Per-entity performance records
//! - Daily delivery status snapshots

pub mod delivery;
pub mod insight;
pub mod metrics;
pub mod performance;
