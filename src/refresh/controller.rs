//! Per-resource load/refresh controller
//!
//! A [`ResourceController`] sits between the presentation layer and the
//! gateway for one resource type: it answers from the cache when it can,
//! fetches on a miss, and publishes every transition on a watch channel so
//! a renderer can follow along.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::timer::RepeatingTask;
use crate::cache::{CacheRegistry, CachedResource, ResourceCache};
use crate::client::{PagedResponse, ResourceFetcher};
use crate::error::{ApiError, ApiResult, ErrorKind};

/// Called whenever a fetch comes back with an authentication failure.
pub type SessionExpiredHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// The request a controller replays on `refresh` and auto-refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRequest<P> {
    pub cluster_id: String,
    pub params: P,
}

/// Observable controller state.
#[derive(Debug, Clone)]
pub struct RefreshState<R: CachedResource> {
    /// Last successfully loaded page; kept across failures
    pub data: Option<PagedResponse<R>>,
    pub phase: LoadPhase,
    pub error: Option<ApiError>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_request: Option<LastRequest<R::Params>>,
    /// Whether `data` was served from the cache
    pub from_cache: bool,
}

impl<R: CachedResource> Default for RefreshState<R> {
    fn default() -> Self {
        Self {
            data: None,
            phase: LoadPhase::Idle,
            error: None,
            last_updated: None,
            last_request: None,
            from_cache: false,
        }
    }
}

impl<R: CachedResource> RefreshState<R> {
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

pub struct ResourceController<R: CachedResource, F: ResourceFetcher> {
    fetcher: Arc<F>,
    cache: Arc<ResourceCache<PagedResponse<R>>>,
    state: watch::Sender<RefreshState<R>>,
    disposed: CancellationToken,
    auto_refresh: Mutex<Option<RepeatingTask>>,
    on_session_expired: Option<SessionExpiredHook>,
}

impl<R: CachedResource, F: ResourceFetcher + 'static> ResourceController<R, F> {
    pub fn new(fetcher: Arc<F>, registry: &CacheRegistry) -> Self {
        let (state, _) = watch::channel(RefreshState::default());
        Self {
            fetcher,
            cache: registry.cache::<R>(),
            state,
            disposed: CancellationToken::new(),
            auto_refresh: Mutex::new(None),
            on_session_expired: None,
        }
    }

    pub fn with_session_expired(mut self, hook: SessionExpiredHook) -> Self {
        self.on_session_expired = Some(hook);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState<R>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RefreshState<R> {
        self.state.borrow().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.is_cancelled()
    }

    /// Load one page, answering from the cache when a valid entry exists.
    ///
    /// On failure the previously loaded data stays in the state and the
    /// classified error is both recorded and returned.
    pub async fn load(&self, cluster_id: &str, params: R::Params) -> ApiResult<PagedResponse<R>> {
        self.publish(|s| {
            s.phase = LoadPhase::Loading;
            s.error = None;
            s.last_request = Some(LastRequest {
                cluster_id: cluster_id.to_string(),
                params: params.clone(),
            });
        });

        if let Some((page, age)) = self.cache.get_with_age(cluster_id, R::TYPE, &params) {
            // Stamp with the original fetch time, not the time of the hit
            let fetched_at = chrono::Duration::from_std(age)
                .ok()
                .and_then(|age| Utc::now().checked_sub_signed(age));
            self.publish(|s| {
                s.data = Some(page.clone());
                s.phase = LoadPhase::Success;
                s.from_cache = true;
                s.last_updated = fetched_at.or_else(|| Some(Utc::now()));
            });
            return Ok(page);
        }

        match self.fetcher.fetch_page::<R>(cluster_id, &params).await {
            Ok(page) => {
                if self.is_disposed() {
                    log::debug!("Dropping {} response after teardown", R::TYPE);
                    return Ok(page);
                }
                self.cache.set(cluster_id, R::TYPE, page.clone(), &params, None);
                self.publish(|s| {
                    s.data = Some(page.clone());
                    s.phase = LoadPhase::Success;
                    s.from_cache = false;
                    s.last_updated = Some(Utc::now());
                });
                Ok(page)
            }
            Err(e) => {
                self.handle_error(&e);
                self.publish(|s| {
                    s.phase = LoadPhase::Error;
                    s.error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Invalidate and replay the last request. `None` when nothing has been
    /// loaded yet.
    pub async fn refresh(&self) -> Option<ApiResult<PagedResponse<R>>> {
        let last = self.state.borrow().last_request.clone()?;
        self.cache.invalidate(&last.cluster_id, Some(R::TYPE));
        Some(self.load(&last.cluster_id, last.params).await)
    }

    /// Drop cached entries of this resource type for a cluster without
    /// refetching.
    pub fn invalidate_cache(&self, cluster_id: &str) -> usize {
        self.cache.invalidate(cluster_id, Some(R::TYPE))
    }

    /// Cache-through fetch of an arbitrary page that does not touch the
    /// observable state.
    pub async fn fetch_page(&self, cluster_id: &str, params: &R::Params) -> ApiResult<PagedResponse<R>> {
        if let Some(page) = self.cache.get(cluster_id, R::TYPE, params) {
            return Ok(page);
        }
        let page = self
            .fetcher
            .fetch_page::<R>(cluster_id, params)
            .await
            .inspect_err(|e| self.handle_error(e))?;
        self.cache.set(cluster_id, R::TYPE, page.clone(), params, None);
        Ok(page)
    }

    /// Replay the last request every `interval` until stopped. Restarting
    /// replaces the running timer.
    pub fn start_auto_refresh(self: &Arc<Self>, interval: Duration) {
        if self.is_disposed() {
            return;
        }
        let weak = Arc::downgrade(self);
        let task = RepeatingTask::every("auto-refresh", interval, move || {
            let weak = weak.clone();
            async move {
                if let Some(controller) = weak.upgrade() {
                    controller.auto_refresh_tick().await;
                }
            }
        });
        log::debug!("Auto-refresh of {} every {:?}", R::TYPE, interval);

        let previous = self.timer_slot().replace(task);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(task) = self.timer_slot().take() {
            task.cancel();
        }
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.timer_slot()
            .as_ref()
            .is_some_and(|task| !task.is_cancelled())
    }

    /// Stop timers and ignore any response that lands afterwards.
    pub fn teardown(&self) {
        self.disposed.cancel();
        self.stop_auto_refresh();
    }

    /// Timer-driven refresh: no loading transition, and a failure keeps the
    /// data and the timer running.
    async fn auto_refresh_tick(&self) {
        if self.is_disposed() {
            return;
        }
        let Some(last) = self.state.borrow().last_request.clone() else {
            return;
        };

        self.cache.invalidate(&last.cluster_id, Some(R::TYPE));
        match self.fetcher.fetch_page::<R>(&last.cluster_id, &last.params).await {
            Ok(page) => {
                if self.is_disposed() {
                    return;
                }
                self.cache
                    .set(&last.cluster_id, R::TYPE, page.clone(), &last.params, None);
                log::debug!("Auto-refreshed {} ({} items)", R::TYPE, page.items.len());
                self.publish(|s| {
                    s.data = Some(page);
                    s.phase = LoadPhase::Success;
                    s.error = None;
                    s.from_cache = false;
                    s.last_updated = Some(Utc::now());
                });
            }
            Err(e) => {
                log::warn!("Auto-refresh of {} failed: {}", R::TYPE, e);
                self.handle_error(&e);
                self.publish(|s| {
                    s.phase = LoadPhase::Error;
                    s.error = Some(e);
                });
            }
        }
    }

    fn handle_error(&self, error: &ApiError) {
        if !self.is_disposed()
            && error.kind() == ErrorKind::Authentication
            && let Some(hook) = &self.on_session_expired
        {
            hook(error);
        }
    }

    fn publish(&self, update: impl FnOnce(&mut RefreshState<R>)) {
        if self.is_disposed() {
            return;
        }
        self.state.send_modify(update);
    }

    fn timer_slot(&self) -> std::sync::MutexGuard<'_, Option<RepeatingTask>> {
        self.auto_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
