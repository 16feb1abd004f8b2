//! Album match resolver - orchestrates search, ranking and preview lookup
//!
//! For one (album, artist) pair from the listening history:
//! 1. Get a bearer credential from the token cache
//! 2. Search the catalog (up to 20 candidates)
//! 3. Rank candidates and keep the best
//! 4. List the album's tracks and pick the first direct preview URL
//! 5. Otherwise try embed pages track by track until one yields a URL
//!
//! Only a configuration error reaches the caller. Every upstream failure is
//! logged and turned into "no match" (or "no preview" for steps 4 and 5).

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use crate::catalog::{
    AccessTokens, AlbumMatch, CatalogAlbum, CatalogApi, CatalogError, CatalogTrack, Credential,
};
use crate::matching::scoring::rank_candidates;

/// Resolves listening records to catalog albums.
#[derive(Clone)]
pub struct AlbumResolver {
    catalog: Arc<dyn CatalogApi>,
    tokens: Arc<dyn AccessTokens>,
}

impl AlbumResolver {
    pub fn new(catalog: Arc<dyn CatalogApi>, tokens: Arc<dyn AccessTokens>) -> Self {
        Self { catalog, tokens }
    }

    /// Find the best catalog match for an album.
    ///
    /// Returns `Ok(None)` when nothing matches or the catalog is unreachable.
    /// Returns `Err` only for [`CatalogError::MissingCredentials`].
    pub async fn resolve(
        &self,
        album_name: &str,
        artist_name: &str,
    ) -> Result<Option<AlbumMatch>, CatalogError> {
        let credential = match self.tokens.access_token().await {
            Ok(c) => c,
            Err(e) if e.is_config() => return Err(e),
            Err(e) => {
                tracing::warn!("No catalog token, skipping '{}' by '{}': {}", album_name, artist_name, e);
                return Ok(None);
            }
        };

        let candidates = match self
            .catalog
            .search_albums(&credential, album_name, artist_name)
            .await
        {
            Ok(albums) => albums,
            Err(e) if e.is_config() => return Err(e),
            Err(e) => {
                if e.is_token_rejected() {
                    self.tokens.invalidate().await;
                }
                tracing::warn!("Catalog search failed for '{}' by '{}': {}", album_name, artist_name, e);
                return Ok(None);
            }
        };

        let Some(best) = rank_candidates(candidates, album_name, artist_name)
            .into_iter()
            .next()
        else {
            tracing::debug!("No candidate matched '{}' by '{}'", album_name, artist_name);
            return Ok(None);
        };

        tracing::debug!(
            "Matched '{}' by '{}' to {} (score {}, popularity {})",
            album_name,
            artist_name,
            best.album.id,
            best.total(),
            best.album.popularity
        );

        let preview_url = self.find_preview(&credential, &best.album.id).await;
        Ok(Some(build_match(best.album, artist_name, preview_url)))
    }

    /// Like [`resolve`](Self::resolve) but folds every error into `None`.
    pub async fn resolve_or_none(&self, album_name: &str, artist_name: &str) -> Option<AlbumMatch> {
        match self.resolve(album_name, artist_name).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Resolve failed for '{}' by '{}': {}", album_name, artist_name, e);
                None
            }
        }
    }

    /// A failed track listing leaves the album matched without a preview
    async fn find_preview(&self, credential: &Credential, album_id: &str) -> Option<String> {
        let tracks = match self.catalog.album_tracks(credential, album_id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                tracing::warn!("Track listing failed for album {}: {}", album_id, e);
                return None;
            }
        };

        if let Some(url) = direct_preview(&tracks) {
            return Some(url);
        }

        self.embed_preview(&tracks).await
    }

    /// Check embed pages in listing order, stopping at the first hit.
    async fn embed_preview(&self, tracks: &[CatalogTrack]) -> Option<String> {
        let catalog = &self.catalog;
        let mut lookups = std::pin::pin!(stream::iter(tracks)
            .then(|track| async move {
                match catalog.embed_preview_url(&track.id).await {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::debug!("Embed lookup failed for track {}: {}", track.id, e);
                        None
                    }
                }
            })
            .filter_map(|url| async move { url }));

        let found = lookups.next().await;
        if found.is_none() {
            tracing::debug!("No preview available in {} tracks", tracks.len());
        }
        found
    }
}

fn direct_preview(tracks: &[CatalogTrack]) -> Option<String> {
    tracks.iter().find_map(|t| t.preview_url.clone())
}

fn build_match(album: CatalogAlbum, queried_artist: &str, preview_url: Option<String>) -> AlbumMatch {
    let artist_name = album
        .primary_artist()
        .unwrap_or(queried_artist)
        .to_string();
    let cover_url = album.cover_url().unwrap_or_default().to_string();

    AlbumMatch {
        album_id: album.id,
        album_title: album.name,
        artist_name,
        preview_url,
        cover_url,
    }
}
