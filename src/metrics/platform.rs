//! Publisher platform normalization

use serde::{Deserialize, Serialize};

/// Normalized publisher platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Instagram,
    AudienceNetwork,
    Messenger,
    Other,
}

impl Platform {
    /// Map a reported platform name onto a known platform.
    ///
    /// Case-insensitive substring match; spaces and hyphens are treated as
    /// underscores so "Audience Network" resolves too.
    pub fn normalize(raw: &str) -> Self {
        let name = raw.trim().to_lowercase().replace([' ', '-'], "_");

        if name.contains("facebook") {
            Self::Facebook
        } else if name.contains("instagram") {
            Self::Instagram
        } else if name.contains("audience_network") {
            Self::AudienceNetwork
        } else if name.contains("messenger") {
            Self::Messenger
        } else {
            Self::Other
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
            Self::AudienceNetwork => "audience_network",
            Self::Messenger => "messenger",
            Self::Other => "other",
        }
    }
}
