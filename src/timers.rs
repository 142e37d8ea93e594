//! Cancellable periodic and deferred work
//!
//! Both timers own their tokio task and abort it on `stop`/`cancel` or drop,
//! so a timer never outlives the value that started it.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Runs an async tick on a fixed interval until stopped
///
/// The first tick fires one period after start. Ticks run sequentially; a
/// slow tick delays the next one instead of overlapping it.
#[derive(Debug)]
pub struct Poller {
    period: Duration,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the poll loop on the current runtime
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "Poller started");
        Self { period, handle }
    }

    /// Interval between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether the loop is still scheduled
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling; an in-flight tick is cancelled at its next await point
    pub fn stop(&self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            tracing::debug!("Poller stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Default delay for search-as-you-type
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delays work until calls stop arriving for `delay`
///
/// Each `call` replaces the pending one; only the last call within a quiet
/// window runs.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Quiet window
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `work`, cancelling whatever was pending
    pub fn call<Fut>(&self, work: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            work.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Whether scheduled work has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Drop pending work
    pub fn cancel(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
