//! In-memory catalog source used by unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;

use super::{CatalogSource, FetchError, RawPokemon};

/// Serves canned records and counts how often it is asked for them
#[derive(Default)]
pub(crate) struct FakeSource {
    records: Vec<(String, serde_json::Value)>,
    broken: HashSet<String>,
    list_failures_left: AtomicUsize,
    list_delay: Duration,
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeSource {
    /// A source with one default-form record per `(id, name, types)`
    pub fn with_pokemon(entries: &[(i64, &str, &[&str])]) -> Self {
        let records = entries
            .iter()
            .map(|(id, name, types)| (format!("fake://pokemon/{}", id), raw_json(*id, name, types)))
            .collect();
        Self {
            records,
            ..Default::default()
        }
    }

    /// Adds an arbitrary raw payload under its own reference
    pub fn with_record(mut self, reference: &str, value: serde_json::Value) -> Self {
        self.records.push((reference.to_string(), value));
        self
    }

    /// Makes the detail fetch for `reference` fail every time
    pub fn with_broken(mut self, reference: &str) -> Self {
        self.broken.insert(reference.to_string());
        self
    }

    /// Fails the next `times` list fetches
    pub fn failing_list(self, times: usize) -> Self {
        self.list_failures_left.store(times, Ordering::SeqCst);
        self
    }

    /// Delays every list fetch, keeping builds in flight for a while
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

/// Minimal `/pokemon/{id}` payload with flat stats of 10
pub(crate) fn raw_json(id: i64, name: &str, types: &[&str]) -> serde_json::Value {
    let types: Vec<_> = types
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "slot": i + 1, "type": { "name": t } }))
        .collect();
    let stats: Vec<_> = ["hp", "attack", "defense", "special-attack", "special-defense", "speed"]
        .iter()
        .map(|name| json!({ "base_stat": 10, "stat": { "name": name } }))
        .collect();

    json!({
        "id": id,
        "name": name,
        "is_default": true,
        "height": 10,
        "weight": 100,
        "base_experience": 64,
        "types": types,
        "stats": stats,
        "sprites": { "front_default": format!("https://img/{}.png", id) }
    })
}

impl CatalogSource for FakeSource {
    fn fetch_list(&self) -> BoxFuture<'_, Result<Vec<String>, FetchError>> {
        async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if !self.list_delay.is_zero() {
                tokio::time::sleep(self.list_delay).await;
            }

            let should_fail = self
                .list_failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(FetchError::Status {
                    status: 503,
                    url: "fake://pokemon".to_string(),
                });
            }

            Ok(self.records.iter().map(|(reference, _)| reference.clone()).collect())
        }
        .boxed()
    }

    fn fetch_detail<'a>(&'a self, reference: &'a str) -> BoxFuture<'a, Result<RawPokemon, FetchError>> {
        async move {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            let not_found = || FetchError::Status {
                status: 404,
                url: reference.to_string(),
            };
            if self.broken.contains(reference) {
                return Err(not_found());
            }
            let (_, value) = self
                .records
                .iter()
                .find(|(candidate, _)| candidate == reference)
                .ok_or_else(not_found)?;
            serde_json::from_value(value.clone()).map_err(|_| not_found())
        }
        .boxed()
    }

    fn label(&self) -> &str {
        "fake://"
    }
}
