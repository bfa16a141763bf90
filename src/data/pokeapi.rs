//! PokeAPI client for fetching the catalog index and per-entry records
//!
//! Every request is retried with a linear backoff. Detail records are fetched
//! in sequential batches whose members run concurrently; a record that still
//! fails after its retries becomes an empty slot instead of failing the batch.

use std::future::Future;
use std::time::Duration;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::{RawPokemon, DEFAULT_SOURCE};

/// Base URL for PokeAPI v2
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Attempts made per request before giving up
pub const MAX_ATTEMPTS: u32 = 3;

/// Backoff unit; attempt `n` waits `n` times this before retrying
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Errors that can occur when talking to the remote catalog
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// The request never produced a response
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Status { .. } | FetchError::Transport { .. })
    }
}

/// A remote catalog the dataset builder can pull from
///
/// Methods return boxed futures so the source can be shared as
/// `Arc<dyn CatalogSource>` across spawned build tasks.
pub trait CatalogSource: Send + Sync {
    /// Fetches the list of detail references (URLs) in the catalog
    fn fetch_list(&self) -> BoxFuture<'_, Result<Vec<String>, FetchError>>;

    /// Fetches one raw record by reference
    fn fetch_detail<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RawPokemon, FetchError>>;

    /// Provenance label recorded on built datasets
    fn label(&self) -> &str;
}

/// `/pokemon?offset&limit` response
#[derive(Debug, Deserialize)]
struct ListPayload {
    #[serde(default)]
    results: Vec<ListItem>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(default)]
    url: Option<String>,
}

/// Client for fetching Pokemon data from PokeAPI
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL for the API (allows override for testing)
    base_url: String,
    /// Maximum number of references requested from the list endpoint
    list_limit: u32,
    /// Backoff unit between attempts
    retry_delay: Duration,
}

impl PokeApiClient {
    /// Creates a client against `base_url`, normally [`POKEAPI_BASE_URL`]
    pub fn with_base_url(base_url: impl Into<String>, list_limit: u32) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            list_limit,
            retry_delay: RETRY_BASE_DELAY,
        }
    }

    /// URL of the catalog index
    fn list_url(&self) -> String {
        format!("{}/pokemon?offset=0&limit={}", self.base_url, self.list_limit)
    }

    /// GETs a URL and decodes its JSON body, retrying failed attempts
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        retry_with_backoff(MAX_ATTEMPTS, self.retry_delay, |_| self.fetch_once(url)).await
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl CatalogSource for PokeApiClient {
    fn fetch_list(&self) -> BoxFuture<'_, Result<Vec<String>, FetchError>> {
        async move {
            let payload: ListPayload = self.fetch_json(&self.list_url()).await?;
            Ok(payload
                .results
                .into_iter()
                .filter_map(|item| item.url)
                .filter(|url| !url.trim().is_empty())
                .collect())
        }
        .boxed()
    }

    fn fetch_detail<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RawPokemon, FetchError>> {
        self.fetch_json(reference).boxed()
    }

    fn label(&self) -> &str {
        DEFAULT_SOURCE
    }
}

/// Runs `operation` up to `max_attempts` times
///
/// Attempt `n` (1-based) that fails with a retryable error is followed by a
/// sleep of `n * base_delay`. Non-retryable errors are returned immediately.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && err.is_retryable() => {
                warn!(attempt, error = %err, "request failed, retrying");
                tokio::time::sleep(base_delay * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Maps every reference through `mapper` in batches of `batch_size`
///
/// Batches run one after another; the calls inside a batch run concurrently.
/// The output has one slot per reference, in input order. A slot is `None`
/// when the mapper returned `Ok(None)` or failed.
pub async fn fetch_in_batches<'a, T, F, Fut>(
    references: &'a [String],
    batch_size: usize,
    mapper: F,
) -> Vec<Option<T>>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<Option<T>, FetchError>>,
{
    let mut results = Vec::with_capacity(references.len());

    for batch in references.chunks(batch_size.max(1)) {
        let outcomes = join_all(batch.iter().map(|reference| mapper(reference.as_str()))).await;

        for (reference, outcome) in batch.iter().zip(outcomes) {
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => {
                    debug!(reference = %reference, error = %err, "dropping entry after failed fetch");
                    results.push(None);
                }
            }
        }
    }

    results
}
