//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where catalog DTO types are converted to domain types.

use super::dto;
use crate::catalog::domain::{CatalogAlbum, CatalogTrack};

/// Convert a search response into album candidates, preserving catalog order.
pub fn to_albums(response: dto::SearchResponse) -> Vec<CatalogAlbum> {
    response
        .albums
        .map(|page| page.items.into_iter().map(to_album).collect())
        .unwrap_or_default()
}

/// Convert a single album object.
pub fn to_album(album: dto::Album) -> CatalogAlbum {
    CatalogAlbum {
        id: album.id,
        name: album.name,
        artists: album.artists.into_iter().map(|a| a.name).collect(),
        popularity: album.popularity.unwrap_or(0),
        images: album.images.into_iter().map(|i| i.url).collect(),
    }
}

/// Convert an album-tracks page into tracks, preserving listing order.
pub fn to_tracks(page: dto::Paging<dto::Track>) -> Vec<CatalogTrack> {
    page.items
        .into_iter()
        .map(|t| CatalogTrack {
            id: t.id,
            name: t.name,
            // Treat an empty string the same as null
            preview_url: t.preview_url.filter(|u| !u.is_empty()),
        })
        .collect()
}
