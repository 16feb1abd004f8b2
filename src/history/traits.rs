//! Trait seam for the listening-history source.

use async_trait::async_trait;

use super::domain::{HistoryError, ListeningRecord};

/// Source of the listener's recent top albums.
#[async_trait]
pub trait ListeningHistoryApi: Send + Sync {
    async fn top_albums(&self) -> Result<Vec<ListeningRecord>, HistoryError>;
}

#[async_trait]
impl ListeningHistoryApi for super::LastFmClient {
    async fn top_albums(&self) -> Result<Vec<ListeningRecord>, HistoryError> {
        self.top_albums().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;

    /// History source returning fixed records or an error.
    pub struct MockHistory {
        pub records: Vec<ListeningRecord>,
        pub error: Option<HistoryError>,
    }

    impl MockHistory {
        pub fn with_records(records: Vec<ListeningRecord>) -> Self {
            Self {
                records,
                error: None,
            }
        }

        pub fn with_error(error: HistoryError) -> Self {
            Self {
                records: vec![],
                error: Some(error),
            }
        }
    }

    #[async_trait]
    impl ListeningHistoryApi for MockHistory {
        async fn top_albums(&self) -> Result<Vec<ListeningRecord>, HistoryError> {
            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            Ok(self.records.clone())
        }
    }
}
