//! Auto-refresh timer.
//!
//! At most one timer runs per scheduler. `enable` always tears down the
//! previous timer before starting a new one, `disable` is a no-op when no
//! timer runs, and dropping the scheduler releases the timer.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::context::ViewContext;

/// Shortest accepted interval; shorter requests are raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct ActiveTimer {
    interval: Duration,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

#[derive(Debug, Default)]
pub struct RefreshScheduler {
    active: Option<ActiveTimer>,
    ticks: Arc<AtomicU64>,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer calling `on_tick` every `interval`, first one
    /// interval from now. Ticks run one after another; a slow tick delays
    /// the next instead of overlapping it.
    pub fn enable<F, Fut>(&mut self, interval: Duration, mut on_tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.disable();

        let interval = interval.max(MIN_INTERVAL);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let ticks = Arc::clone(&self.ticks);
        let task = tokio::spawn(async move {
            let mut timer = interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = timer.tick() => {}
                }
                ticks.fetch_add(1, Ordering::Relaxed);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = on_tick() => {}
                }
            }
        });

        info!(interval_secs = interval.as_secs_f64(), "auto-refresh enabled");
        self.active = Some(ActiveTimer {
            interval,
            cancel,
            task,
        });
    }

    /// Reload whatever tab is current at each tick.
    pub fn enable_reload(&mut self, interval: Duration, ctx: &Arc<ViewContext>) {
        let ctx = Arc::clone(ctx);
        self.enable(interval, move || {
            let load = ctx.reload_current();
            async move {
                // The load is its own task; cancelling the timer while waiting
                // here never leaves a region in the loading state.
                if let Some(load) = load {
                    let _ = load.await;
                }
            }
        });
    }

    /// Stop the timer. Returns whether one was running.
    pub fn disable(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.cancel.cancel();
        active.task.abort();
        debug!("auto-refresh disabled");
        true
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.active.as_ref().map(|active| active.interval)
    }

    /// Ticks fired by every timer this scheduler has run.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_interval() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.enable(Duration::from_secs(10), || async {});

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(scheduler.tick_count(), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(scheduler.tick_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_twice_keeps_one_timer() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.enable(Duration::from_secs(10), || async {});
        scheduler.enable(Duration::from_secs(10), || async {});
        assert!(scheduler.is_enabled());

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(scheduler.tick_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_disable() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.enable(Duration::from_secs(5), || async {});
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(scheduler.tick_count(), 2);

        assert!(scheduler.disable());
        assert!(!scheduler.disable());
        assert!(!scheduler.is_enabled());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(scheduler.tick_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.enable(Duration::ZERO, || async {});
        assert_eq!(scheduler.interval(), Some(MIN_INTERVAL));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tick_delays_the_next() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.enable(Duration::from_secs(1), || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        });
        tokio::time::sleep(Duration::from_millis(6_500)).await;
        // Ticks at 1s and, after the 5s tick body, at 6s.
        assert_eq!(scheduler.tick_count(), 2);
    }

    #[test]
    fn disable_without_timer_is_noop() {
        let mut scheduler = RefreshScheduler::new();
        assert!(!scheduler.disable());
        assert_eq!(scheduler.interval(), None);
    }
}
