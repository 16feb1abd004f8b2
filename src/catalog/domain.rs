//! Internal domain models for the music catalog.
//!
//! These types are OUR types - they don't change when the catalog API changes.
//! All catalog responses get converted into these types via the adapter.

use serde::Serialize;
use tokio::time::Instant;

/// Bearer credential for catalog API requests.
#[derive(Clone)]
pub struct Credential {
    /// Opaque bearer token
    pub access_token: String,
    /// Token type reported by the provider (always "Bearer" in practice)
    pub token_type: String,
    /// Instant after which the token must not be handed out
    pub expires_at: Instant,
}

impl Credential {
    /// Whether the credential may still be used at `now`.
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.debug_struct("Credential")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Album candidate returned by a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogAlbum {
    /// Catalog album ID (also used to list tracks)
    pub id: String,
    /// Album title as listed by the catalog
    pub name: String,
    /// Credited artists, in listing order
    pub artists: Vec<String>,
    /// Popularity score (0-100), 0 when the catalog omits it
    pub popularity: u32,
    /// Artwork URLs, largest first
    pub images: Vec<String>,
}

impl CatalogAlbum {
    /// First credited artist, if any.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }

    /// Largest cover image, if any.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Track on a catalog album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    /// Direct preview clip URL, when the API exposes one
    pub preview_url: Option<String>,
}

/// The album selected for a listening record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumMatch {
    pub album_id: String,
    pub album_title: String,
    pub artist_name: String,
    /// Short audio clip URL; `None` is a normal outcome
    pub preview_url: Option<String>,
    /// Largest cover image URL, empty when the album has no artwork
    pub cover_url: String,
}

/// Errors that can occur talking to the catalog provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog API credentials not configured")]
    MissingCredentials,

    #[error("Catalog authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Catalog returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Configuration problems are fatal; everything else degrades to "no data".
    pub fn is_config(&self) -> bool {
        matches!(self, CatalogError::MissingCredentials)
    }

    /// The provider refused the bearer token (revoked or expired early).
    pub fn is_token_rejected(&self) -> bool {
        matches!(self, CatalogError::Upstream { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn album(artists: &[&str], images: &[&str]) -> CatalogAlbum {
        CatalogAlbum {
            id: "id".to_string(),
            name: "Name".to_string(),
            artists: artists.iter().map(|s| s.to_string()).collect(),
            popularity: 0,
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_credential_validity_window() {
        let now = Instant::now();
        let credential = Credential {
            access_token: "secret-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: now + Duration::from_secs(10),
        };

        assert!(credential.is_valid_at(now));
        assert!(!credential.is_valid_at(now + Duration::from_secs(10)));
        assert_eq!(credential.bearer(), "Bearer secret-token");
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential {
            access_token: "secret-token".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: Instant::now(),
        };
        assert!(!format!("{:?}", credential).contains("secret-token"));
    }

    #[test]
    fn test_primary_artist_and_cover() {
        let a = album(&["Daft Punk", "Pharrell"], &["big.jpg", "small.jpg"]);
        assert_eq!(a.primary_artist(), Some("Daft Punk"));
        assert_eq!(a.cover_url(), Some("big.jpg"));

        let empty = album(&[], &[]);
        assert_eq!(empty.primary_artist(), None);
        assert_eq!(empty.cover_url(), None);
    }

    #[test]
    fn test_album_match_serializes_camel_case() {
        let m = AlbumMatch {
            album_id: "abc".to_string(),
            album_title: "Discovery".to_string(),
            artist_name: "Daft Punk".to_string(),
            preview_url: None,
            cover_url: String::new(),
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["albumId"], "abc");
        assert_eq!(json["albumTitle"], "Discovery");
        assert_eq!(json["artistName"], "Daft Punk");
        assert!(json["previewUrl"].is_null());
        assert_eq!(json["coverUrl"], "");
    }

    #[test]
    fn test_only_missing_credentials_is_config() {
        assert!(CatalogError::MissingCredentials.is_config());
        assert!(!CatalogError::RateLimited.is_config());
        assert!(!CatalogError::Network("timeout".to_string()).is_config());
    }
}
