//! Adapter layer: Convert Last.fm DTOs to domain models

use super::dto;
use crate::history::domain::{ArtworkSize, HistoryError, ListeningRecord};

/// Convert a top-albums envelope into listening records.
///
/// An error payload becomes [`HistoryError::Api`].
pub fn to_records(envelope: dto::TopAlbumsEnvelope) -> Result<Vec<ListeningRecord>, HistoryError> {
    match envelope {
        dto::TopAlbumsEnvelope::Error(err) => Err(HistoryError::Api {
            code: err.error,
            message: err.message,
        }),
        dto::TopAlbumsEnvelope::TopAlbums(response) => Ok(response
            .topalbums
            .album
            .into_iter()
            .map(to_record)
            .collect()),
    }
}

fn to_record(album: dto::Album) -> ListeningRecord {
    let artwork = album
        .image
        .into_iter()
        .filter(|img| !img.text.is_empty())
        .filter_map(|img| ArtworkSize::from_label(&img.size).map(|size| (size, img.text)))
        .collect();

    ListeningRecord {
        album: album.name,
        artist: album.artist.name,
        play_count: album.playcount.trim().parse().unwrap_or(0),
        rank: album.attr.and_then(|a| a.rank.trim().parse().ok()),
        url: album.url,
        artwork,
    }
}
