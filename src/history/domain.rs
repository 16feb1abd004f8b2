//! Domain models for listening history.

use std::collections::BTreeMap;

use serde::Serialize;

/// Artwork size tiers offered by the history source, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtworkSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
    Mega,
}

impl ArtworkSize {
    /// Parse the source's size label. Unknown labels are ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "extralarge" => Some(Self::ExtraLarge),
            "mega" => Some(Self::Mega),
            _ => None,
        }
    }
}

/// One album from the listener's recent top list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningRecord {
    pub album: String,
    pub artist: String,
    pub play_count: u32,
    /// 1-based rank in the top list, when reported
    pub rank: Option<u32>,
    /// Album page on the history service
    pub url: String,
    /// Artwork URLs by size; only non-empty URLs are kept
    pub artwork: BTreeMap<ArtworkSize, String>,
}

impl ListeningRecord {
    /// Best thumbnail for display: extralarge, then large, then medium, then anything.
    pub fn best_artwork(&self) -> Option<&str> {
        [ArtworkSize::ExtraLarge, ArtworkSize::Large, ArtworkSize::Medium]
            .iter()
            .find_map(|size| self.artwork.get(size))
            .or_else(|| self.artwork.values().next())
            .map(String::as_str)
    }
}

/// Errors that can occur fetching listening history.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HistoryError {
    #[error("Listening history credentials not configured")]
    MissingCredentials,

    /// Error payload from the service (it reports these with HTTP 200)
    #[error("History API error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("History service returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}
