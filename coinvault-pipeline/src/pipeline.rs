//! Fetch-then-store refresh cycle.

use coinvault_core::{RejectedEntry, Snapshot};
use coinvault_source::MarketDataSource;
use coinvault_storage::{CacheStore, KeyValueBackend, StoreReceipt};

use crate::error::PipelineError;

/// What one refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The source returned no usable records; the cache was not touched.
    EmptySource { rejected: Vec<RejectedEntry> },

    /// A new generation was published.
    Stored {
        receipt: StoreReceipt,
        rejected: Vec<RejectedEntry>,
    },

    /// A step failed. The previously published cache is intact.
    Failed(PipelineError),
}

impl RefreshOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

/// Drives one source and one cache store.
pub struct RefreshPipeline<S, B> {
    source: S,
    store: CacheStore<B>,
    limit: u32,
}

impl<S, B> RefreshPipeline<S, B>
where
    S: MarketDataSource,
    B: KeyValueBackend,
{
    pub fn new(source: S, store: CacheStore<B>, limit: u32) -> Self {
        Self {
            source,
            store,
            limit,
        }
    }

    pub fn store(&self) -> &CacheStore<B> {
        &self.store
    }

    /// Fetch the current listing and replace the cache with it.
    ///
    /// Never panics and never retries. An empty fetch leaves the cache
    /// exactly as it was.
    pub async fn run(&self) -> RefreshOutcome {
        let provider = self.source.provider();
        let outcome = match self.source.fetch_entities(self.limit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(provider, error = %e, "fetch failed");
                return RefreshOutcome::Failed(PipelineError::SourceUnavailable(e));
            }
        };

        if outcome.is_empty() {
            tracing::warn!(
                provider,
                rejected = outcome.rejected.len(),
                "source returned no usable records; cache left unchanged"
            );
            return RefreshOutcome::EmptySource {
                rejected: outcome.rejected,
            };
        }

        match self.store.store(&outcome.accepted).await {
            Ok(receipt) => {
                tracing::info!(
                    provider,
                    generation = receipt.generation,
                    written = receipt.written,
                    rejected = outcome.rejected.len(),
                    "refresh complete"
                );
                RefreshOutcome::Stored {
                    receipt,
                    rejected: outcome.rejected,
                }
            }
            Err(e) => {
                tracing::error!(provider, error = %e, "storing fetched records failed");
                RefreshOutcome::Failed(PipelineError::StoreWrite(e))
            }
        }
    }

    /// Read back the published table.
    pub async fn snapshot(&self) -> Result<Snapshot, PipelineError> {
        self.store.load_all().await.map_err(|e| {
            tracing::error!(error = %e, "loading cache snapshot failed");
            PipelineError::StoreRead(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use coinvault_core::{EntityRecord, FetchOutcome, SourceError, StoreError};
    use coinvault_storage::InMemoryBackend;
    use coinvault_test_utils::assertions::assert_same_records;
    use coinvault_test_utils::fixtures;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Source that screens a fixed list of raw entries.
    struct StubSource {
        entries: Result<Vec<serde_json::Value>, SourceError>,
        calls: AtomicU32,
    }

    impl StubSource {
        fn returning(entries: Vec<serde_json::Value>) -> Self {
            Self {
                entries: Ok(entries),
                calls: AtomicU32::new(0),
            }
        }

        fn failing(error: SourceError) -> Self {
            Self {
                entries: Err(error),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn fetch_entities(&self, limit: u32) -> Result<FetchOutcome, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let entries = self.entries.clone()?;
            let taken: Vec<_> = entries.into_iter().take(limit as usize).collect();
            Ok(FetchOutcome::screen(&taken))
        }

        fn provider(&self) -> &str {
            "stub"
        }
    }

    fn pipeline(source: StubSource) -> RefreshPipeline<StubSource, InMemoryBackend> {
        RefreshPipeline::new(source, CacheStore::new(InMemoryBackend::new()), 50)
    }

    fn without_platform(id: i64) -> serde_json::Value {
        let mut raw = fixtures::raw_entry(id, id);
        if let Some(object) = raw.as_object_mut() {
            object.remove("platform");
        }
        raw
    }

    #[tokio::test]
    async fn test_run_stores_accepted_records() {
        let entries = vec![
            fixtures::raw_entry(1, 1),
            without_platform(2),
            fixtures::raw_entry(3, 3),
            without_platform(4),
            fixtures::raw_entry(5, 5),
        ];
        let pipeline = pipeline(StubSource::returning(entries));

        let outcome = pipeline.run().await;
        let RefreshOutcome::Stored { receipt, rejected } = outcome else {
            panic!("expected Stored, got {:?}", outcome);
        };
        assert_eq!(receipt.written, 3);
        let rejected_ids: Vec<Option<i64>> = rejected.iter().map(|r| r.id).collect();
        assert_eq!(rejected_ids, vec![Some(2), Some(4)]);

        let snapshot = pipeline.snapshot().await.unwrap();
        assert_same_records(
            snapshot.rows(),
            &fixtures::records(&[(1, 1), (3, 3), (5, 5)]),
        );
    }

    #[tokio::test]
    async fn test_empty_fetch_leaves_cache_unchanged() {
        let backend = InMemoryBackend::new();
        let store = CacheStore::new(backend.clone());
        let first: Vec<EntityRecord> = fixtures::records(&[(1, 1), (2, 2)]);
        store.store(&first).await.unwrap();
        let keys_before = backend.keys().unwrap();

        let pipeline = RefreshPipeline::new(
            StubSource::returning(vec![without_platform(9), json!("not an object")]),
            store,
            50,
        );
        let outcome = pipeline.run().await;
        assert!(matches!(
            outcome,
            RefreshOutcome::EmptySource { ref rejected } if rejected.len() == 2
        ));

        assert_eq!(backend.keys().unwrap(), keys_before);
        assert_same_records(pipeline.snapshot().await.unwrap().rows(), &first);
    }

    #[tokio::test]
    async fn test_empty_listing_is_empty_source() {
        let pipeline = pipeline(StubSource::returning(Vec::new()));
        assert_eq!(
            pipeline.run().await,
            RefreshOutcome::EmptySource {
                rejected: Vec::new()
            }
        );
        assert!(pipeline.store().backend().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_source_failure_is_reported() {
        let error = SourceError::Status {
            status: 401,
            message: "invalid key".to_string(),
        };
        let pipeline = pipeline(StubSource::failing(error.clone()));

        assert_eq!(
            pipeline.run().await,
            RefreshOutcome::Failed(PipelineError::SourceUnavailable(error))
        );
        assert_eq!(pipeline.source.calls.load(Ordering::SeqCst), 1);
        assert!(pipeline.store().backend().is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_previous_generation() {
        let backend = InMemoryBackend::new();
        let store = CacheStore::new(backend.clone());
        let first = fixtures::records(&[(1, 1)]);
        store.store(&first).await.unwrap();

        let pipeline = RefreshPipeline::new(
            StubSource::returning(vec![fixtures::raw_entry(7, 1), fixtures::raw_entry(8, 2)]),
            store,
            50,
        );
        backend.fail_sets_after(1);
        let outcome = pipeline.run().await;
        assert!(matches!(
            outcome,
            RefreshOutcome::Failed(PipelineError::StoreWrite(StoreError::WriteFailed { .. }))
        ));

        backend.heal().unwrap();
        assert_same_records(pipeline.snapshot().await.unwrap().rows(), &first);
    }

    #[tokio::test]
    async fn test_snapshot_reports_corrupt_cache() {
        let pipeline = pipeline(StubSource::returning(vec![fixtures::raw_entry(1, 1)]));
        assert!(pipeline.run().await.is_stored());
        pipeline
            .store()
            .backend()
            .insert_raw(
                "coin:1:1",
                coinvault_storage::StoredValue::String("[]".to_string()),
            )
            .unwrap();

        assert!(matches!(
            pipeline.snapshot().await,
            Err(PipelineError::StoreRead(StoreError::Corrupt { .. }))
        ));
    }

    #[tokio::test]
    async fn test_refreshed_cache_feeds_ranked_view() {
        let entries = vec![
            fixtures::raw_entry(1, 3),
            fixtures::raw_entry(2, 1),
            fixtures::raw_entry(3, 2),
        ];
        let pipeline = pipeline(StubSource::returning(entries));
        assert!(pipeline.run().await.is_stored());

        let snapshot = pipeline.snapshot().await.unwrap();
        let ids: Vec<i64> = coinvault_report::top_n(snapshot.rows(), 2)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_limit_is_forwarded() {
        let entries = (1..=10).map(|id| fixtures::raw_entry(id, id)).collect();
        let pipeline = RefreshPipeline::new(
            StubSource::returning(entries),
            CacheStore::new(InMemoryBackend::new()),
            4,
        );
        let RefreshOutcome::Stored { receipt, .. } = pipeline.run().await else {
            panic!("expected Stored");
        };
        assert_eq!(receipt.written, 4);
    }
}
