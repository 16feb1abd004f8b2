//! Last.fm HTTP client
//!
//! Fetches a user's top albums for a recent period.
//! See: https://www.last.fm/api/show/user.getTopAlbums
//!
//! The API key only identifies the application; keep it server-side anyway so
//! it never reaches a browser.

use super::{adapter, dto};
use crate::history::domain::{HistoryError, ListeningRecord};

/// Default reporting period.
pub const DEFAULT_PERIOD: &str = "1month";

/// Default number of albums fetched.
pub const DEFAULT_LIMIT: u32 = 2;

/// Last.fm API client
pub struct LastFmClient {
    api_key: String,
    username: String,
    period: String,
    limit: u32,
    http_client: reqwest::Client,
    base_url: String,
}

impl LastFmClient {
    /// Create a new client for one user's history.
    pub fn new(
        api_key: impl Into<String>,
        username: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            username: username.into(),
            period: DEFAULT_PERIOD.to_string(),
            limit: DEFAULT_LIMIT,
            http_client,
            base_url: "https://ws.audioscrobbler.com/2.0/".to_string(),
        }
    }

    /// Override the reporting period (`7day`, `1month`, `12month`, `overall`, ...).
    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    /// Override the number of albums fetched.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the user's top albums, best first.
    pub async fn top_albums(&self) -> Result<Vec<ListeningRecord>, HistoryError> {
        if self.api_key.trim().is_empty() || self.username.trim().is_empty() {
            return Err(HistoryError::MissingCredentials);
        }

        let response = self
            .http_client
            .get(self.top_albums_url())
            .send()
            .await
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Upstream {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let envelope = response
            .json::<dto::TopAlbumsEnvelope>()
            .await
            .map_err(|e| HistoryError::Parse(e.to_string()))?;

        let records = adapter::to_records(envelope)?;
        tracing::debug!("Fetched {} top albums for {}", records.len(), self.username);
        Ok(records)
    }

    fn top_albums_url(&self) -> String {
        format!(
            "{}?method=user.getTopAlbums&user={}&period={}&limit={}&api_key={}&format=json",
            self.base_url,
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.period),
            self.limit,
            urlencoding::encode(&self.api_key),
        )
    }
}
