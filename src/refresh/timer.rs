//! Cancellable background timers

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periods below this are rounded up; a zero period would spin.
const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Handle to a spawned repeating job.
///
/// The job stops on [`cancel`](Self::cancel) or when the handle is dropped.
/// An iteration already running when cancellation arrives is abandoned at
/// its next suspension point.
#[derive(Debug)]
pub struct RepeatingTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RepeatingTask {
    /// Run `job` every `period` on a fixed schedule, first run one period
    /// from now. A slow iteration delays the next tick rather than bunching
    /// missed ticks together.
    pub fn every<F, Fut>(name: &'static str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let token = CancellationToken::new();
        let shutdown = token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            _ = job() => {}
                        }
                    }
                }
            }
            log::debug!("{}: stopped", name);
        });

        Self {
            name,
            token,
            handle,
        }
    }

    /// Sleep `delay`, run `job`, repeat. The next sleep only starts once the
    /// previous run has finished.
    pub fn rescheduling<F, Fut>(name: &'static str, delay: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = delay.max(MIN_PERIOD);
        let token = CancellationToken::new();
        let shutdown = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {
                        tokio::select! {
                            _ = shutdown.cancelled() => break,
                            _ = job() => {}
                        }
                    }
                }
            }
            log::debug!("{}: stopped", name);
        });

        Self {
            name,
            token,
            handle,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the underlying task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_runs_on_schedule() {
        let (count, job) = counter();
        let task = RepeatingTask::every("test", Duration::from_secs(10), job);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_runs() {
        let (count, job) = counter();
        let task = RepeatingTask::every("test", Duration::from_secs(1), job);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        task.cancel();
        assert!(task.is_cancelled());
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (count, job) = counter();
        drop(RepeatingTask::rescheduling("test", Duration::from_secs(1), job));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_waits_for_previous_run() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let task = RepeatingTask::rescheduling("test", Duration::from_secs(2), move || {
            let c = c.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Run boundaries at 5s, 10s, 15s
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        task.cancel();
    }
}
