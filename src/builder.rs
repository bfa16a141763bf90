//! Dataset builder
//!
//! Orchestrates one build: read the disk snapshot unless a refresh is forced,
//! otherwise fetch the catalog index and every record, normalize them, and
//! persist the resulting dataset before returning it.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, SnapshotStore};
use crate::cli::Settings;
use crate::data::{fetch_in_batches, normalize, CatalogSource, Dataset, Pokemon};

/// Errors that abort a dataset build
///
/// `Clone` so a single failed build can be reported to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// The catalog index could not be fetched, so nothing can be assembled
    #[error("failed to fetch the catalog index: {0}")]
    ListFetch(String),
}

/// Builds datasets from a catalog source, with an optional disk snapshot
#[derive(Clone)]
pub struct DatasetBuilder {
    source: Arc<dyn CatalogSource>,
    cache: Option<SnapshotStore>,
    fetch_concurrency: usize,
    cache_ttl_hours: u32,
}

impl DatasetBuilder {
    /// Creates a builder
    ///
    /// # Arguments
    /// * `source` - Remote catalog to fetch from on a cache miss
    /// * `cache` - Snapshot store, or `None` to always fetch
    /// * `settings` - Supplies the concurrency window and cache TTL
    pub fn new(source: Arc<dyn CatalogSource>, cache: Option<SnapshotStore>, settings: &Settings) -> Self {
        Self {
            source,
            cache,
            fetch_concurrency: settings.fetch_concurrency.max(1),
            cache_ttl_hours: settings.cache_ttl_hours,
        }
    }

    /// Hours a snapshot stays fresh
    pub fn cache_ttl_hours(&self) -> u32 {
        self.cache_ttl_hours
    }

    /// Produces a dataset
    ///
    /// # Behavior
    /// - Unless `force_refresh`, returns the disk snapshot if it is fresh
    /// - Otherwise fetches and normalizes the whole catalog
    /// - Individual records that fail to fetch are dropped
    /// - A fresh build is written to disk; a failed write is only logged
    ///
    /// # Returns
    /// * `Err(BuildError::ListFetch)` if the catalog index cannot be fetched
    pub async fn build(&self, force_refresh: bool) -> Result<Dataset, BuildError> {
        if !force_refresh {
            if let Some(dataset) = self.load_cached() {
                return Ok(dataset);
            }
        }

        let dataset = self.fetch_remote().await?;

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.write(&dataset) {
                warn!(error = %err, "could not persist dataset snapshot, continuing without it");
            }
        }

        Ok(dataset)
    }

    /// Returns the snapshot if it exists, parses and is within the TTL
    fn load_cached(&self) -> Option<Dataset> {
        let cache = self.cache.as_ref()?;

        match cache.read(self.cache_ttl_hours) {
            Ok(cached) if !cached.is_expired => {
                info!(
                    total = cached.data.len(),
                    fetched_at = %cached.cached_at,
                    "loaded dataset from cache snapshot"
                );
                Some(cached.data)
            }
            Ok(cached) => {
                info!(fetched_at = %cached.cached_at, "cache snapshot is stale");
                None
            }
            Err(CacheError::Missing(path)) => {
                debug!(path = %path, "no cache snapshot yet");
                None
            }
            Err(err) => {
                warn!(error = %err, "ignoring unreadable cache snapshot");
                None
            }
        }
    }

    async fn fetch_remote(&self) -> Result<Dataset, BuildError> {
        info!(concurrency = self.fetch_concurrency, "fetching catalog from remote source");

        let references = self
            .source
            .fetch_list()
            .await
            .map_err(|err| BuildError::ListFetch(err.to_string()))?;

        let source = &self.source;
        let slots = fetch_in_batches(&references, self.fetch_concurrency, |reference| async move {
            source.fetch_detail(reference).await.map(normalize)
        })
        .await;

        let pokemon: Vec<Pokemon> = slots.into_iter().flatten().collect();
        let dataset = Dataset::new(Utc::now(), source.label(), pokemon);

        info!(
            references = references.len(),
            total = dataset.len(),
            "built dataset from remote catalog"
        );
        Ok(dataset)
    }
}
