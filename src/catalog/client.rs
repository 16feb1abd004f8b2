//! Spotify Web API HTTP client
//!
//! Handles album search, album track listing and the embed-page fallback.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! ## API Quirks
//!
//! ### Field filters in the search query
//! The `q` parameter takes `album:` and `artist:` filters separated by a space.
//! The whole value is percent-encoded (spaces as `%20`), which the search
//! endpoint accepts; the filter syntax itself is not affected by encoding.
//!
//! ### Missing previews
//! Tracks listed with an app-only (client-credentials) token frequently carry
//! `preview_url: null`. The public embed page still exposes the clip, so the
//! client can fetch it as a fallback (see [`super::embed`]).

use super::{adapter, dto, embed};
use crate::catalog::domain::{CatalogAlbum, CatalogError, CatalogTrack, Credential};

/// Maximum number of search candidates requested.
pub const SEARCH_LIMIT: u32 = 20;

/// Maximum number of tracks scanned for a preview.
pub const TRACK_LIMIT: u32 = 20;

/// User agent sent with every request
const USER_AGENT: &str = concat!("RotationPreview/", env!("CARGO_PKG_VERSION"));

/// Spotify Web API client
pub struct CatalogClient {
    http_client: reqwest::Client,
    api_base: String,
    embed_base: String,
}

impl CatalogClient {
    /// Create a client sharing an existing connection pool.
    ///
    /// Use [`build_http_client`] for a pool that accepts gzip-compressed
    /// responses and sends a User-Agent identifying the application.
    pub fn with_http_client(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base: "https://api.spotify.com/v1".to_string(),
            embed_base: "https://open.spotify.com/embed".to_string(),
        }
    }

    /// Create a client for testing with custom base URLs
    #[cfg(test)]
    pub fn with_base_urls(api_base: impl Into<String>, embed_base: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base: api_base.into(),
            embed_base: embed_base.into(),
        }
    }

    /// Search albums matching both an album and an artist filter.
    pub async fn search_albums(
        &self,
        credential: &Credential,
        album_name: &str,
        artist_name: &str,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        let url = search_url(&self.api_base, album_name, artist_name);
        let response: dto::SearchResponse = self.get_json(&url, Some(credential)).await?;
        Ok(adapter::to_albums(response))
    }

    /// List the first tracks of an album, in album order.
    pub async fn album_tracks(
        &self,
        credential: &Credential,
        album_id: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        let url = format!(
            "{}/albums/{}/tracks?limit={}",
            self.api_base,
            urlencoding::encode(album_id),
            TRACK_LIMIT
        );
        let page: dto::Paging<dto::Track> = self.get_json(&url, Some(credential)).await?;
        Ok(adapter::to_tracks(page))
    }

    /// Fetch a track's embed page and extract its preview clip URL.
    ///
    /// No token is needed; the embed page is public.
    pub async fn embed_preview_url(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
        let url = format!("{}/track/{}", self.embed_base, urlencoding::encode(track_id));

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(status, None));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        embed::extract_preview_url(&html)
    }

    /// Send an authenticated GET and parse the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        credential: Option<&Credential>,
    ) -> Result<T, CatalogError> {
        let mut request = self.http_client.get(url);
        if let Some(credential) = credential {
            request = request.header(reqwest::header::AUTHORIZATION, credential.bearer());
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            let body = response.json::<dto::ApiError>().await.ok();
            return Err(upstream_error(status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

/// Build the shared HTTP client used for catalog and token requests.
pub fn build_http_client() -> Result<reqwest::Client, CatalogError> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {}", e)))
}

/// Build the search URL with the compound `album:… artist:…` query.
fn search_url(api_base: &str, album_name: &str, artist_name: &str) -> String {
    let query = format!("album:{} artist:{}", album_name, artist_name);
    format!(
        "{}/search?q={}&type=album&limit={}",
        api_base,
        urlencoding::encode(&query),
        SEARCH_LIMIT
    )
}

fn upstream_error(status: reqwest::StatusCode, body: Option<dto::ApiError>) -> CatalogError {
    CatalogError::Upstream {
        status: status.as_u16(),
        message: body
            .map(|b| b.error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
    }
}
