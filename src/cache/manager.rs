//! Snapshot store for persisting the dataset to disk
//!
//! Provides a `SnapshotStore` that writes the whole dataset to a single JSON
//! file and reads it back with a freshness flag derived from its `fetchedAt`
//! timestamp. Writes replace the file atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Dataset, Pokemon};

/// File name of the snapshot inside the cache directory
pub const SNAPSHOT_FILE_NAME: &str = "pokedex-cache.json";

/// Errors that can occur when reading or writing the snapshot
#[derive(Debug, Error)]
pub enum CacheError {
    /// No snapshot has been written yet
    #[error("no cache snapshot at {0}")]
    Missing(String),

    /// The snapshot could not be read
    #[error("failed to read cache snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not a well-formed dataset
    #[error("malformed cache snapshot: {0}")]
    Malformed(String),

    /// The snapshot could not be written
    #[error("failed to persist cache snapshot to {path}: {reason}")]
    Persist { path: String, reason: String },
}

/// On-disk layout of a snapshot, as written
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFileRef<'a> {
    fetched_at: DateTime<Utc>,
    source: &'a str,
    total_pokemon: usize,
    pokemon: &'a [Pokemon],
    types: Vec<&'a str>,
    type_counts: &'a BTreeMap<String, usize>,
    region_counts: &'a BTreeMap<String, usize>,
}

/// On-disk layout of a snapshot, as read
///
/// Only `fetchedAt` and `pokemon` are required; the derived fields are
/// recomputed when the dataset is reassembled.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    fetched_at: DateTime<Utc>,
    #[serde(default)]
    source: String,
    pokemon: Vec<Pokemon>,
}

/// Result of reading the snapshot, including metadata about its freshness
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally built
    pub cached_at: DateTime<Utc>,
    /// Whether the snapshot is older than the TTL
    pub is_expired: bool,
}

/// Reads and writes the dataset snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Directory where the snapshot is stored
    cache_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a SnapshotStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// The platform cache directory for this service, if one exists
    pub fn platform_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pokedex-api").map(|dirs| dirs.cache_dir().to_path_buf())
    }

    /// Path to the snapshot file
    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Writes the dataset, fully replacing any previous snapshot
    ///
    /// The JSON is written to a sibling temp file first and then renamed over
    /// the snapshot, so readers never see a partially written file.
    pub fn write(&self, dataset: &Dataset) -> Result<(), CacheError> {
        let path = self.path();
        let persist_error = |reason: String| CacheError::Persist {
            path: path.display().to_string(),
            reason,
        };

        fs::create_dir_all(&self.cache_dir).map_err(|e| persist_error(e.to_string()))?;

        let snapshot = SnapshotFileRef {
            fetched_at: dataset.fetched_at(),
            source: dataset.source(),
            total_pokemon: dataset.len(),
            pokemon: dataset.pokemon(),
            types: dataset.types().collect(),
            type_counts: dataset.type_counts(),
            region_counts: dataset.region_counts(),
        };
        let json = serde_json::to_string(&snapshot).map_err(|e| persist_error(e.to_string()))?;

        let temp_path = temp_path_for(&path);
        fs::write(&temp_path, json).map_err(|e| persist_error(e.to_string()))?;
        fs::rename(&temp_path, &path).map_err(|e| persist_error(e.to_string()))
    }

    /// Reads the snapshot back
    ///
    /// # Arguments
    /// * `ttl_hours` - Age after which the snapshot is reported as expired
    ///
    /// # Returns
    /// * `Ok(CachedData)` with `is_expired` set from the snapshot's age
    /// * `Err(CacheError::Missing)` if no snapshot exists
    /// * `Err(CacheError::Malformed)` if the file is not a well-formed dataset
    pub fn read(&self, ttl_hours: u32) -> Result<CachedData<Dataset>, CacheError> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::Missing(path.display().to_string()))
            }
            Err(e) => return Err(CacheError::Io(e)),
        };

        let snapshot: SnapshotFile =
            serde_json::from_str(&content).map_err(|e| CacheError::Malformed(e.to_string()))?;

        let age = Utc::now() - snapshot.fetched_at;
        let is_expired = age > Duration::hours(i64::from(ttl_hours));

        Ok(CachedData {
            cached_at: snapshot.fetched_at,
            data: Dataset::new(snapshot.fetched_at, snapshot.source, snapshot.pokemon),
            is_expired,
        })
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
