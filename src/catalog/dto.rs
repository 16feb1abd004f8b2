//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Spotify Web API returns, limited to the fields we read.
//! DO NOT use these types outside the catalog module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api
//!
//! Example search response:
//! ```json
//! {
//!   "albums": {
//!     "items": [{
//!       "id": "4m2880jivSbbyEGAKfITCa",
//!       "name": "Random Access Memories",
//!       "artists": [{"id": "4tZwfgrHOc3mvqYlEYSvVi", "name": "Daft Punk"}],
//!       "images": [{"url": "https://i.scdn.co/image/...", "height": 640, "width": 640}],
//!       "popularity": 80
//!     }],
//!     "limit": 20, "offset": 0, "total": 1
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: u64,
    pub scope: Option<String>,
}

/// Error body of the accounts service (`/api/token`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Error body of the Web API (`/v1/...`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
}

/// Response of `GET /v1/search?type=album`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Absent when the search matched nothing of the requested type
    pub albums: Option<Paging<Album>>,
}

/// Generic paging wrapper
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    #[serde(default)]
    pub items: Vec<T>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub total: Option<u32>,
    pub next: Option<String>,
}

/// Simplified album object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Cover art, widest first
    #[serde(default)]
    pub images: Vec<Image>,
    /// Only present on full album objects; search results often omit it
    pub popularity: Option<u32>,
    pub release_date: Option<String>,
}

/// Simplified artist object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

/// Image object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// Simplified track object from `GET /v1/albums/{id}/tracks`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    /// 30-second preview MP3, frequently null for client-credentials tokens
    pub preview_url: Option<String>,
    pub track_number: Option<u32>,
    pub duration_ms: Option<u64>,
}
