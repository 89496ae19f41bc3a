//! Stale-while-revalidate coordination for one bound request
//!
//! Cached data is shown immediately; once it is older than `stale_time` a
//! single background fetch replaces it. `stale_time` is independent of the
//! cache TTL: an entry past its TTL is a plain miss.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::timer::RepeatingTask;
use crate::cache::{CacheRegistry, CachedResource, ResourceCache};
use crate::client::{PagedResponse, ResourceFetcher};
use crate::error::ApiError;

/// Default threshold after which cached data is revalidated
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(30);

/// Default period of the staleness re-check
pub const DEFAULT_STALE_CHECK_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SwrState<R> {
    pub data: Option<PagedResponse<R>>,
    /// Only foreground fetches toggle this
    pub loading: bool,
    /// Only foreground failures set this
    pub error: Option<ApiError>,
    pub is_stale: bool,
    /// Whether `data` was last served from the cache rather than fetched
    pub from_cache: bool,
    /// When the data currently shown was fetched from the gateway
    pub fetched_at: Option<Instant>,
}

impl<R> Default for SwrState<R> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            is_stale: false,
            from_cache: false,
            fetched_at: None,
        }
    }
}

pub struct StaleWhileRevalidate<R: CachedResource, F: ResourceFetcher> {
    cluster_id: String,
    params: R::Params,
    stale_time: Duration,
    fetcher: Arc<F>,
    cache: Arc<ResourceCache<PagedResponse<R>>>,
    state: watch::Sender<SwrState<R>>,
    in_flight: Mutex<Option<Revalidation>>,
    stale_check: Mutex<Option<RepeatingTask>>,
    auto_refresh: Mutex<Option<RepeatingTask>>,
    disposed: CancellationToken,
}

/// The single background fetch of a coordinator.
struct Revalidation {
    abort: AbortHandle,
    done: Shared<BoxFuture<'static, ()>>,
}

impl Revalidation {
    fn is_running(&self) -> bool {
        !self.abort.is_finished()
    }
}

fn slot<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: CachedResource, F: ResourceFetcher + 'static> StaleWhileRevalidate<R, F> {
    pub fn new(
        fetcher: Arc<F>,
        registry: &CacheRegistry,
        cluster_id: impl Into<String>,
        params: R::Params,
        stale_time: Duration,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SwrState::default());
        Arc::new(Self {
            cluster_id: cluster_id.into(),
            params,
            stale_time,
            fetcher,
            cache: registry.cache::<R>(),
            state,
            in_flight: Mutex::new(None),
            stale_check: Mutex::new(None),
            auto_refresh: Mutex::new(None),
            disposed: CancellationToken::new(),
        })
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn subscribe(&self) -> watch::Receiver<SwrState<R>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SwrState<R> {
        self.state.borrow().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }

    /// Whether a background revalidation is currently running.
    pub fn is_revalidating(&self) -> bool {
        slot(&self.in_flight)
            .as_ref()
            .is_some_and(Revalidation::is_running)
    }

    /// Foreground: serve the cache when possible, revalidating in the
    /// background if the entry is stale, otherwise fetch. Background: always
    /// fetch, joining the revalidation already running if there is one.
    pub async fn fetch(self: &Arc<Self>, is_background: bool) {
        if is_background {
            self.revalidate().await;
            return;
        }

        self.publish(|s| {
            s.loading = true;
            s.error = None;
        });

        if let Some((page, age)) = self.cache.get_with_age(&self.cluster_id, R::TYPE, &self.params) {
            let is_stale = age >= self.stale_time;
            let fetched_at = Instant::now().checked_sub(age);
            self.publish(|s| {
                s.data = Some(page);
                s.loading = false;
                s.is_stale = is_stale;
                s.from_cache = true;
                s.fetched_at = fetched_at;
            });
            if is_stale {
                let _ = self.revalidate();
            }
            return;
        }

        self.fetch_from_gateway(false).await;
    }

    /// Abort any pending revalidation, drop the cached entries and fetch in
    /// the foreground.
    pub async fn refresh(self: &Arc<Self>) {
        if let Some(pending) = slot(&self.in_flight).take() {
            pending.abort.abort();
        }
        self.cache.invalidate(&self.cluster_id, Some(R::TYPE));
        self.fetch(false).await;
    }

    /// Re-check staleness every `interval`. Never fetches.
    pub fn start_stale_check(self: &Arc<Self>, interval: Duration) {
        let weak = Arc::downgrade(self);
        let task = RepeatingTask::every("stale-check", interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(swr) = weak.upgrade() {
                    swr.update_staleness();
                }
            }
        });
        if let Some(previous) = slot(&self.stale_check).replace(task) {
            previous.cancel();
        }
    }

    /// Background fetch after every `delay`, each sleep starting once the
    /// previous fetch has settled.
    pub fn start_auto_refresh(self: &Arc<Self>, delay: Duration) {
        let weak = Arc::downgrade(self);
        let task = RepeatingTask::rescheduling("swr-auto-refresh", delay, move || {
            let weak = weak.clone();
            async move {
                if let Some(swr) = weak.upgrade() {
                    swr.fetch(true).await;
                }
            }
        });
        if let Some(previous) = slot(&self.auto_refresh).replace(task) {
            previous.cancel();
        }
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(task) = slot(&self.auto_refresh).take() {
            task.cancel();
        }
    }

    /// Stop every timer. A revalidation still in flight completes but its
    /// result is discarded.
    pub fn teardown(&self) {
        self.disposed.cancel();
        self.stop_auto_refresh();
        if let Some(task) = slot(&self.stale_check).take() {
            task.cancel();
        }
    }

    /// Spawn a background fetch unless one is already running. The returned
    /// future settles when that fetch completes or is aborted; dropping it
    /// leaves the fetch running.
    fn revalidate(self: &Arc<Self>) -> Shared<BoxFuture<'static, ()>> {
        let mut in_flight = slot(&self.in_flight);
        if let Some(pending) = in_flight.as_ref().filter(|p| p.is_running()) {
            log::debug!("Revalidation of {} already in flight", R::TYPE);
            return pending.done.clone();
        }

        let swr = Arc::clone(self);
        let handle = tokio::spawn(async move {
            swr.fetch_from_gateway(true).await;
        });
        let abort = handle.abort_handle();
        let done = handle.map(drop).boxed().shared();
        *in_flight = Some(Revalidation {
            abort,
            done: done.clone(),
        });
        done
    }

    async fn fetch_from_gateway(&self, is_background: bool) {
        let result = self
            .fetcher
            .fetch_page::<R>(&self.cluster_id, &self.params)
            .await;
        if self.is_disposed() {
            log::debug!("Dropping {} response after teardown", R::TYPE);
            return;
        }

        match result {
            Ok(page) => {
                self.cache
                    .set(&self.cluster_id, R::TYPE, page.clone(), &self.params, None);
                let is_stale = self.stale_time.is_zero();
                self.publish(|s| {
                    s.data = Some(page);
                    s.is_stale = is_stale;
                    s.from_cache = false;
                    s.fetched_at = Some(Instant::now());
                    if !is_background {
                        s.loading = false;
                        s.error = None;
                    }
                });
                if is_background {
                    log::debug!("Revalidated {} for {}", R::TYPE, self.cluster_id);
                }
            }
            Err(e) if is_background => {
                log::warn!("Background refresh of {} failed: {}", R::TYPE, e);
            }
            Err(e) => {
                self.publish(|s| {
                    s.loading = false;
                    s.error = Some(e);
                });
            }
        }
    }

    fn update_staleness(&self) {
        let stale_time = self.stale_time;
        self.state.send_if_modified(|s| {
            let Some(fetched_at) = s.fetched_at else {
                return false;
            };
            let is_stale = fetched_at.elapsed() >= stale_time;
            let changed = s.is_stale != is_stale;
            s.is_stale = is_stale;
            changed
        });
    }

    fn publish(&self, update: impl FnOnce(&mut SwrState<R>)) {
        if self.is_disposed() {
            return;
        }
        self.state.send_modify(update);
    }
}

impl<R: CachedResource, F: ResourceFetcher> Drop for StaleWhileRevalidate<R, F> {
    fn drop(&mut self) {
        self.disposed.cancel();
    }
}
