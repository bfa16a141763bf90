//! Process-wide dataset handle with build coalescing
//!
//! `DatasetStore` owns the current snapshot and at most one in-flight build
//! that non-forced callers share. Forced refreshes always start their own
//! build. Builds are spawned onto the runtime, so they run to completion even
//! if every caller stops waiting.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{Duration, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::builder::{BuildError, DatasetBuilder};
use crate::data::Dataset;

type BuildResult = Result<Arc<Dataset>, BuildError>;
type PendingBuild = Shared<BoxFuture<'static, BuildResult>>;

/// Cheaply cloneable handle to the shared dataset state
#[derive(Clone)]
pub struct DatasetStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    builder: DatasetBuilder,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    current: Option<Arc<Dataset>>,
    /// Build id that produced `current`
    current_build: u64,
    in_flight: Option<(u64, PendingBuild)>,
    last_build: u64,
}

impl DatasetStore {
    pub fn new(builder: DatasetBuilder) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                builder,
                state: Mutex::new(StoreState::default()),
            }),
        }
    }

    /// Hours a snapshot stays fresh
    pub fn cache_ttl_hours(&self) -> u32 {
        self.inner.builder.cache_ttl_hours()
    }

    /// The installed snapshot, fresh or not, without triggering a build
    pub fn current(&self) -> Option<Arc<Dataset>> {
        self.inner.lock_state().current.clone()
    }

    /// Returns the current dataset, building it if needed
    ///
    /// A fresh in-memory snapshot is returned immediately. Otherwise the
    /// caller joins the build already in flight, or starts one. If that build
    /// fails while an older snapshot is still held, the older snapshot is
    /// returned instead of the error.
    pub async fn get_or_build(&self) -> BuildResult {
        let pending = {
            let mut state = self.inner.lock_state();
            if let Some(current) = state.current.as_ref().filter(|d| self.inner.is_fresh(d)) {
                return Ok(Arc::clone(current));
            }
            match &state.in_flight {
                Some((id, pending)) => {
                    debug!(build = id, "joining in-flight dataset build");
                    pending.clone()
                }
                None => self.start_build(&mut state, false),
            }
        };

        match pending.await {
            Ok(dataset) => Ok(dataset),
            Err(err) => match self.current() {
                Some(stale) => {
                    warn!(
                        error = %err,
                        fetched_at = %stale.fetched_at(),
                        "rebuild failed, serving stale dataset"
                    );
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Starts a new build that ignores the disk snapshot, and waits for it
    pub async fn force_build(&self) -> BuildResult {
        let pending = {
            let mut state = self.inner.lock_state();
            self.start_build(&mut state, true)
        };
        pending.await
    }

    fn start_build(&self, state: &mut StoreState, force_refresh: bool) -> PendingBuild {
        state.last_build += 1;
        let id = state.last_build;
        info!(build = id, force_refresh, "starting dataset build");

        let inner = Arc::clone(&self.inner);
        let pending = async move {
            let result = inner.builder.build(force_refresh).await.map(Arc::new);
            inner.settle(id, &result);
            result
        }
        .boxed()
        .shared();

        state.in_flight = Some((id, pending.clone()));
        tokio::spawn(pending.clone());
        pending
    }
}

impl StoreInner {
    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, dataset: &Dataset) -> bool {
        let ttl = Duration::hours(i64::from(self.builder.cache_ttl_hours()));
        Utc::now() - dataset.fetched_at() <= ttl
    }

    /// Records the outcome of build `id`
    ///
    /// The in-flight marker is cleared only if it still belongs to this build.
    /// A successful result is installed unless a later build already was.
    fn settle(&self, id: u64, result: &BuildResult) {
        let mut state = self.lock_state();

        if matches!(&state.in_flight, Some((in_flight, _)) if *in_flight == id) {
            state.in_flight = None;
        }

        match result {
            Ok(dataset) if id > state.current_build => {
                info!(build = id, total = dataset.len(), "installed dataset");
                state.current = Some(Arc::clone(dataset));
                state.current_build = id;
            }
            Ok(_) => debug!(build = id, "discarding result superseded by a later build"),
            Err(err) => warn!(build = id, error = %err, "dataset build failed"),
        }
    }
}
