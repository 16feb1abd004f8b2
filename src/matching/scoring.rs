//! Name normalization and candidate scoring.
//!
//! Album and artist names from the listening history rarely match the catalog
//! byte for byte ("Abbey Road (Remastered)", "AC/DC" vs "ACDC"). Both sides are
//! normalized, then each field scores:
//!
//! | relation                         | score |
//! |----------------------------------|-------|
//! | equal after normalization        | 2     |
//! | one contains the other           | 1     |
//! | otherwise                        | 0     |
//!
//! A candidate's total is album score + artist score. Candidates totalling 0
//! are dropped; the rest are ranked by total, then popularity.

use std::cmp::Reverse;

use crate::catalog::CatalogAlbum;

/// Normalize a name for comparison.
///
/// Lowercases, drops every character that is neither alphanumeric nor
/// whitespace, collapses whitespace runs to one space and trims the ends.
pub fn normalize(s: &str) -> String {
    let kept: String = s
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score one field: 2 exact, 1 substring either way, 0 otherwise.
///
/// Both arguments must already be normalized. An empty side counts as a
/// substring of anything.
pub fn field_score(found: &str, wanted: &str) -> u8 {
    if found == wanted {
        2
    } else if found.contains(wanted) || wanted.contains(found) {
        1
    } else {
        0
    }
}

/// A search candidate with its match score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub album: CatalogAlbum,
    pub album_score: u8,
    pub artist_score: u8,
}

impl ScoredCandidate {
    pub fn total(&self) -> u8 {
        self.album_score + self.artist_score
    }
}

/// Score a candidate against the (already normalized) query.
pub fn score_candidate(album: CatalogAlbum, wanted_album: &str, wanted_artist: &str) -> ScoredCandidate {
    let found_album = normalize(&album.name);
    let found_artist = normalize(album.primary_artist().unwrap_or(""));

    ScoredCandidate {
        album_score: field_score(&found_album, wanted_album),
        artist_score: field_score(&found_artist, wanted_artist),
        album,
    }
}

/// Score, filter and rank search candidates, best first.
///
/// Ordering is by total score, then popularity, both descending. The sort is
/// stable, so exact ties keep the catalog's order.
pub fn rank_candidates(
    candidates: Vec<CatalogAlbum>,
    album_name: &str,
    artist_name: &str,
) -> Vec<ScoredCandidate> {
    let wanted_album = normalize(album_name);
    let wanted_artist = normalize(artist_name);

    let mut scored: Vec<_> = candidates
        .into_iter()
        .map(|album| score_candidate(album, &wanted_album, &wanted_artist))
        .filter(|c| c.total() > 0)
        .collect();

    scored.sort_by_key(|c| (Reverse(c.total()), Reverse(c.album.popularity)));
    scored
}
