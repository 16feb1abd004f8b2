//! Test utilities and fixtures for rotation-preview tests.
//!
//! Builders for the domain types that show up in almost every resolver,
//! rotation and route test.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{catalog_album, catalog_track};
//!
//! let catalog = MockCatalog::with_albums(vec![catalog_album("id", "Discovery", "Daft Punk", 70)])
//!     .tracks_for("id", vec![catalog_track("t1", Some("https://clip"))]);
//! ```

use std::collections::BTreeMap;

use warp::Filter;
use warp::http::StatusCode;

use crate::catalog::{AlbumMatch, CatalogAlbum, CatalogTrack};
use crate::history::{ArtworkSize, ListeningRecord};

/// Creates a catalog album with a single artist and one cover image.
///
/// The cover URL is derived from the ID (`https://i.scdn.co/image/{id}`).
/// Clear `artists` or `images` with struct mutation when a test needs them empty.
pub fn catalog_album(id: &str, name: &str, artist: &str, popularity: u32) -> CatalogAlbum {
    CatalogAlbum {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![artist.to_string()],
        popularity,
        images: vec![format!("https://i.scdn.co/image/{}", id)],
    }
}

/// Creates a catalog track, optionally with a direct preview URL.
pub fn catalog_track(id: &str, preview_url: Option<&str>) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        name: format!("Track {}", id),
        preview_url: preview_url.map(str::to_string),
    }
}

/// Creates a listening record with large and extralarge artwork.
pub fn listening_record(album: &str, artist: &str, play_count: u32) -> ListeningRecord {
    let mut artwork = BTreeMap::new();
    artwork.insert(ArtworkSize::Large, format!("https://lastfm.freetls.fastly.net/l/{}.png", album));
    artwork.insert(
        ArtworkSize::ExtraLarge,
        format!("https://lastfm.freetls.fastly.net/xl/{}.png", album),
    );

    ListeningRecord {
        album: album.to_string(),
        artist: artist.to_string(),
        play_count,
        rank: None,
        url: format!("https://www.last.fm/music/{}/{}", artist, album),
        artwork,
    }
}

/// Creates a resolved match, with or without a preview.
pub fn album_match(id: &str, preview_url: Option<&str>) -> AlbumMatch {
    AlbumMatch {
        album_id: id.to_string(),
        album_title: format!("Album {}", id),
        artist_name: "Test Artist".to_string(),
        preview_url: preview_url.map(str::to_string),
        cover_url: format!("https://i.scdn.co/image/{}", id),
    }
}

/// Serves `filter` on an ephemeral localhost port.
///
/// Returns the base URL (`http://127.0.0.1:{port}`). Must be called from
/// inside a tokio runtime; the server lives until the runtime shuts down.
pub fn serve_stub<F, R>(filter: F) -> String
where
    F: Filter<Extract = (R,), Error = warp::Rejection> + Clone + Send + Sync + 'static,
    R: warp::Reply,
{
    let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{}", addr)
}

/// Serves the same status and JSON body for every request.
pub fn serve_status(status: u16, body: serde_json::Value) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    serve_stub(warp::any().map(move || warp::reply::with_status(warp::reply::json(&body), status)).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_album_defaults() {
        let album = catalog_album("abc", "Discovery", "Daft Punk", 70);
        assert_eq!(album.primary_artist(), Some("Daft Punk"));
        assert_eq!(album.cover_url(), Some("https://i.scdn.co/image/abc"));
        assert_eq!(album.popularity, 70);
    }

    #[test]
    fn test_listening_record_prefers_extralarge() {
        let record = listening_record("Blue", "Joni Mitchell", 12);
        assert_eq!(
            record.best_artwork(),
            Some("https://lastfm.freetls.fastly.net/xl/Blue.png")
        );
    }

    #[test]
    fn test_catalog_track_preview() {
        assert_eq!(catalog_track("t1", None).preview_url, None);
        assert_eq!(
            catalog_track("t2", Some("https://clip")).preview_url.as_deref(),
            Some("https://clip")
        );
    }
}
