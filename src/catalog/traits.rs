//! Trait definitions for the catalog API.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`CatalogClient`](super::CatalogClient) and
//! [`TokenCache`](super::TokenCache), while tests substitute the mocks below.

use async_trait::async_trait;

use super::domain::{CatalogAlbum, CatalogError, CatalogTrack, Credential};

/// Catalog lookups needed by the match resolver.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Search albums by album and artist name.
    async fn search_albums(
        &self,
        credential: &Credential,
        album_name: &str,
        artist_name: &str,
    ) -> Result<Vec<CatalogAlbum>, CatalogError>;

    /// List an album's tracks in album order.
    async fn album_tracks(
        &self,
        credential: &Credential,
        album_id: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError>;

    /// Extract a preview URL from a track's public embed page.
    async fn embed_preview_url(&self, track_id: &str) -> Result<Option<String>, CatalogError>;
}

#[async_trait]
impl CatalogApi for super::CatalogClient {
    async fn search_albums(
        &self,
        credential: &Credential,
        album_name: &str,
        artist_name: &str,
    ) -> Result<Vec<CatalogAlbum>, CatalogError> {
        self.search_albums(credential, album_name, artist_name).await
    }

    async fn album_tracks(
        &self,
        credential: &Credential,
        album_id: &str,
    ) -> Result<Vec<CatalogTrack>, CatalogError> {
        self.album_tracks(credential, album_id).await
    }

    async fn embed_preview_url(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
        self.embed_preview_url(track_id).await
    }
}

/// Mock catalog implementations for testing.
///
/// Every mock records its calls so tests can assert on network behaviour.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::catalog::token::{AccessTokens, TokenExchange, TokenGrant};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// Token exchange that hands out numbered tokens.
    pub struct MockExchange {
        lifetime: Duration,
        error: Option<CatalogError>,
        calls: Arc<AtomicUsize>,
    }

    impl MockExchange {
        /// Grant tokens with the given lifetime.
        pub fn granting(lifetime: Duration) -> Self {
            Self {
                lifetime,
                error: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Fail every exchange with `error`.
        pub fn failing(error: CatalogError) -> Self {
            Self {
                lifetime: Duration::ZERO,
                error: Some(error),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Shared exchange counter.
        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl TokenExchange for MockExchange {
        async fn exchange(&self) -> Result<TokenGrant, CatalogError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            // Give concurrent callers a chance to pile up behind the lock
            tokio::task::yield_now().await;
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(TokenGrant {
                access_token: format!("token-{}", n),
                token_type: "Bearer".to_string(),
                expires_in: self.lifetime,
            })
        }
    }

    /// Token source that always returns the same credential or error.
    pub struct MockTokens {
        pub error: Option<CatalogError>,
        invalidations: Arc<AtomicUsize>,
    }

    impl MockTokens {
        pub fn valid() -> Self {
            Self {
                error: None,
                invalidations: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_error(error: CatalogError) -> Self {
            Self {
                error: Some(error),
                ..Self::valid()
            }
        }

        /// Shared counter of `invalidate` calls.
        pub fn invalidations(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.invalidations)
        }
    }

    #[async_trait]
    impl AccessTokens for MockTokens {
        async fn access_token(&self) -> Result<Credential, CatalogError> {
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(Credential {
                access_token: "mock-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            })
        }

        async fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Scripted catalog: fixed search results, per-album tracks and
    /// per-track embed results.
    #[derive(Default)]
    pub struct MockCatalog {
        pub albums: Vec<CatalogAlbum>,
        pub search_error: Option<CatalogError>,
        pub tracks: HashMap<String, Vec<CatalogTrack>>,
        pub tracks_error: Option<CatalogError>,
        /// Embed results keyed by track ID; missing keys yield `Ok(None)`
        pub embeds: HashMap<String, Result<Option<String>, CatalogError>>,
        pub searches: Mutex<Vec<(String, String)>>,
        pub track_requests: Mutex<Vec<String>>,
        pub embed_requests: Mutex<Vec<String>>,
    }

    impl MockCatalog {
        pub fn with_albums(albums: Vec<CatalogAlbum>) -> Self {
            Self {
                albums,
                ..Default::default()
            }
        }

        pub fn tracks_for(mut self, album_id: &str, tracks: Vec<CatalogTrack>) -> Self {
            self.tracks.insert(album_id.to_string(), tracks);
            self
        }

        pub fn embed_for(
            mut self,
            track_id: &str,
            result: Result<Option<String>, CatalogError>,
        ) -> Self {
            self.embeds.insert(track_id.to_string(), result);
            self
        }

        pub fn embed_requests(&self) -> Vec<String> {
            self.embed_requests.lock().clone()
        }
    }

    #[async_trait]
    impl CatalogApi for MockCatalog {
        async fn search_albums(
            &self,
            _credential: &Credential,
            album_name: &str,
            artist_name: &str,
        ) -> Result<Vec<CatalogAlbum>, CatalogError> {
            self.searches
                .lock()
                .push((album_name.to_string(), artist_name.to_string()));
            if let Some(ref err) = self.search_error {
                return Err(err.clone());
            }
            Ok(self.albums.clone())
        }

        async fn album_tracks(
            &self,
            _credential: &Credential,
            album_id: &str,
        ) -> Result<Vec<CatalogTrack>, CatalogError> {
            self.track_requests.lock().push(album_id.to_string());
            if let Some(ref err) = self.tracks_error {
                return Err(err.clone());
            }
            Ok(self.tracks.get(album_id).cloned().unwrap_or_default())
        }

        async fn embed_preview_url(&self, track_id: &str) -> Result<Option<String>, CatalogError> {
            self.embed_requests.lock().push(track_id.to_string());
            self.embeds.get(track_id).cloned().unwrap_or(Ok(None))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_exchange_counts_calls() {
            let exchange = MockExchange::granting(Duration::from_secs(60));
            let calls = exchange.calls();
            let grant = exchange.exchange().await.unwrap();
            assert_eq!(grant.access_token, "token-1");
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_mock_catalog_records_embed_requests() {
            let catalog = MockCatalog::default()
                .embed_for("t1", Ok(Some("https://clip".to_string())));
            assert_eq!(
                catalog.embed_preview_url("t1").await.unwrap().as_deref(),
                Some("https://clip")
            );
            assert_eq!(catalog.embed_preview_url("t2").await.unwrap(), None);
            assert_eq!(catalog.embed_requests(), vec!["t1", "t2"]);
        }
    }
}
