//! Current rotation: the listener's top albums paired with catalog matches.

use futures::future::join_all;
use serde::Serialize;

use crate::catalog::{AlbumMatch, CatalogError};
use crate::history::{HistoryError, ListeningHistoryApi, ListeningRecord};
use crate::matching::AlbumResolver;

/// Outcome of resolving one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "match", rename_all = "camelCase")]
pub enum Resolution {
    /// Not resolved yet
    Pending,
    /// Resolved, nothing in the catalog matched
    NoMatch,
    Matched(AlbumMatch),
}

impl Resolution {
    pub fn from_match(found: Option<AlbumMatch>) -> Self {
        found.map_or(Resolution::NoMatch, Resolution::Matched)
    }

    pub fn album_match(&self) -> Option<&AlbumMatch> {
        match self {
            Resolution::Matched(m) => Some(m),
            _ => None,
        }
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.album_match().and_then(|m| m.preview_url.as_deref())
    }
}

/// One album in the rotation.
#[derive(Debug, Clone, Serialize)]
pub struct RotationEntry {
    pub record: ListeningRecord,
    pub resolution: Resolution,
}

impl RotationEntry {
    pub fn pending(record: ListeningRecord) -> Self {
        Self {
            record,
            resolution: Resolution::Pending,
        }
    }
}

/// Errors that stop the rotation from being built at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RotationError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Fetch the top albums and resolve each one concurrently.
///
/// Entries keep the history's order. A missing catalog configuration fails
/// the whole rotation; any other per-album failure becomes
/// [`Resolution::NoMatch`].
pub async fn build_rotation(
    history: &dyn ListeningHistoryApi,
    resolver: &AlbumResolver,
) -> Result<Vec<RotationEntry>, RotationError> {
    let records = history.top_albums().await?;
    tracing::info!("Resolving {} albums from listening history", records.len());

    let entries = records.into_iter().map(RotationEntry::pending).collect();
    resolve_rotation(entries, resolver).await
}

/// Resolve every pending entry concurrently.
pub async fn resolve_rotation(
    entries: Vec<RotationEntry>,
    resolver: &AlbumResolver,
) -> Result<Vec<RotationEntry>, RotationError> {
    let resolved = join_all(entries.into_iter().map(|entry| async move {
        if entry.resolution != Resolution::Pending {
            return Ok(entry);
        }
        let found = resolver
            .resolve(&entry.record.album, &entry.record.artist)
            .await?;
        Ok::<_, CatalogError>(RotationEntry {
            resolution: Resolution::from_match(found),
            record: entry.record,
        })
    }))
    .await;

    let entries = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;
    let matched = entries
        .iter()
        .filter(|e| e.resolution.album_match().is_some())
        .count();
    tracing::info!("Matched {}/{} albums", matched, entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::{MockCatalog, MockTokens};
    use crate::history::traits::mocks::MockHistory;
    use crate::test_utils::{catalog_album, catalog_track, listening_record};
    use std::sync::Arc;

    fn resolver_with(catalog: MockCatalog, tokens: MockTokens) -> AlbumResolver {
        AlbumResolver::new(Arc::new(catalog), Arc::new(tokens))
    }

    #[tokio::test]
    async fn test_rotation_preserves_order_and_marks_no_match() {
        let history = MockHistory::with_records(vec![
            listening_record("Discovery", "Daft Punk", 42),
            listening_record("Unknown Pleasures", "Joy Division", 17),
        ]);
        let catalog = MockCatalog::with_albums(vec![catalog_album("disc", "Discovery", "Daft Punk", 75)])
            .tracks_for("disc", vec![catalog_track("t1", Some("https://clip/t1"))]);
        let resolver = resolver_with(catalog, MockTokens::valid());

        let rotation = build_rotation(&history, &resolver).await.unwrap();

        assert_eq!(rotation.len(), 2);
        assert_eq!(rotation[0].record.album, "Discovery");
        assert_eq!(rotation[0].resolution.preview_url(), Some("https://clip/t1"));
        assert_eq!(rotation[1].record.album, "Unknown Pleasures");
        assert_eq!(rotation[1].resolution, Resolution::NoMatch);
    }

    #[tokio::test]
    async fn test_rotation_history_error() {
        let history = MockHistory::with_error(HistoryError::MissingCredentials);
        let resolver = resolver_with(MockCatalog::default(), MockTokens::valid());

        let result = build_rotation(&history, &resolver).await;
        assert!(matches!(
            result,
            Err(RotationError::History(HistoryError::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn test_rotation_missing_catalog_credentials() {
        let history = MockHistory::with_records(vec![listening_record("Discovery", "Daft Punk", 1)]);
        let resolver = resolver_with(
            MockCatalog::default(),
            MockTokens::with_error(CatalogError::MissingCredentials),
        );

        let result = build_rotation(&history, &resolver).await;
        assert!(matches!(
            result,
            Err(RotationError::Catalog(CatalogError::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn test_resolved_entries_are_left_alone() {
        let catalog = Arc::new(MockCatalog::default());
        let resolver = AlbumResolver::new(catalog.clone(), Arc::new(MockTokens::valid()));
        let entries = vec![RotationEntry {
            record: listening_record("Blue", "Joni Mitchell", 3),
            resolution: Resolution::NoMatch,
        }];

        let resolved = resolve_rotation(entries, &resolver).await.unwrap();
        assert_eq!(resolved[0].resolution, Resolution::NoMatch);
        assert!(catalog.searches.lock().is_empty());
    }

    #[test]
    fn test_resolution_serialization() {
        assert_eq!(
            serde_json::to_value(Resolution::Pending).unwrap(),
            serde_json::json!({"status": "pending"})
        );
        assert_eq!(
            serde_json::to_value(Resolution::NoMatch).unwrap(),
            serde_json::json!({"status": "noMatch"})
        );
    }
}
