//! View lifetime tracking
//!
//! A [`ViewScope`] stands for a mounted panel. Work spawned through it is
//! aborted on unmount, and [`ViewScope::guard`] drops results that arrive
//! after teardown so they never reach view state.

use crate::error::ClientError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Lifetime of a mounted view
#[derive(Debug)]
pub struct ViewScope {
    mounted: Arc<AtomicBool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    /// A freshly mounted scope
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Whether the view is still mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Handle that spawned work can poll to see if the view is gone
    pub fn mount_flag(&self) -> MountFlag {
        MountFlag(self.mounted.clone())
    }

    /// Spawn work tied to this scope
    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_mounted() {
            tracing::debug!("Ignoring spawn on unmounted view scope");
            return;
        }
        let handle = tokio::spawn(work);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// Await `work`, yielding its output only if the view is still mounted
    pub async fn guard<F: Future>(&self, work: F) -> Option<F::Output> {
        let output = work.await;
        self.is_mounted().then_some(output)
    }

    /// Tear the view down, aborting its outstanding work
    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Cloneable, read-only view of a scope's mounted state
#[derive(Debug, Clone)]
pub struct MountFlag(Arc<AtomicBool>);

impl MountFlag {
    /// Whether the owning view is still mounted
    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-view request tracker: last data, in-flight flag, last error
#[derive(Debug, Clone, PartialEq)]
pub struct CallState<T> {
    /// Last successful result
    pub data: Option<T>,
    /// Request in flight
    pub loading: bool,
    /// User-facing message of the last failure
    pub error: Option<String>,
}

impl<T> Default for CallState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> CallState<T> {
    /// Idle tracker with no data
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a request, recording its outcome unless the view unmounted first
    ///
    /// Returns `true` when the outcome was recorded. `loading` is cleared
    /// either way.
    pub async fn run<F>(&mut self, scope: &ViewScope, request: F) -> bool
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.loading = true;
        self.error = None;
        let outcome = scope.guard(request).await;
        self.loading = false;
        match outcome {
            Some(Ok(data)) => {
                self.data = Some(data);
                true
            }
            Some(Err(e)) => {
                self.error = Some(e.user_message());
                true
            }
            None => false,
        }
    }

    /// Back to idle with no data
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
