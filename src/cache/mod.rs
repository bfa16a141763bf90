//! Cache module for storing the dataset snapshot on disk
//!
//! The snapshot is a single JSON file holding the whole normalized dataset.
//! It stays the source of truth until it is older than the configured TTL or
//! a refresh is forced; stale snapshots are ignored, not deleted.

mod manager;

pub use manager::{CacheError, CachedData, SnapshotStore, SNAPSHOT_FILE_NAME};
