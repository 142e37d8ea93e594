//! Transient toast notifications
//!
//! Each toast gets an auto-dismiss timer on the ambient tokio runtime. The
//! timer is aborted when the toast is dismissed early or the center drops.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Auto-dismiss delay for success toasts
pub const SUCCESS_TIMEOUT: Duration = Duration::from_millis(3000);
/// Auto-dismiss delay for warning toasts
pub const WARNING_TIMEOUT: Duration = Duration::from_millis(4000);

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Something needs attention
    Warning,
    /// Neutral information
    Info,
}

/// A queued toast
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique toast id
    pub id: Uuid,
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
    /// When the toast was queued
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    items: Vec<Notification>,
    timers: HashMap<Uuid, JoinHandle<()>>,
}

impl Inner {
    fn remove(&mut self, id: Uuid) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}

/// Queue of toasts with per-level auto-dismiss
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
    default_timeout: Duration,
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("pending", &self.list().len())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl NotificationCenter {
    /// Create a center; `default_timeout` applies to error and info toasts
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            default_timeout,
        }
    }

    /// Auto-dismiss delay for a level
    pub fn timeout_for(&self, level: NotificationLevel) -> Duration {
        match level {
            NotificationLevel::Success => SUCCESS_TIMEOUT,
            NotificationLevel::Warning => WARNING_TIMEOUT,
            NotificationLevel::Error | NotificationLevel::Info => self.default_timeout,
        }
    }

    /// Queue a toast and schedule its dismissal
    ///
    /// Outside a tokio runtime the toast stays until dismissed.
    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        let id = notification.id;
        tracing::debug!(notification_id = %id, level = ?level, "Queued notification");

        let mut inner = lock(&self.inner);
        inner.items.push(notification);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let weak = Arc::downgrade(&self.inner);
            let delay = self.timeout_for(level);
            let timer = runtime.spawn(expire(weak, id, delay));
            inner.timers.insert(id, timer);
        }
        id
    }

    /// Queue an error toast
    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Error, message)
    }

    /// Queue a success toast
    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Success, message)
    }

    /// Queue a warning toast
    pub fn warning(&self, message: impl Into<String>) -> Uuid {
        self.push(NotificationLevel::Warning, message)
    }

    /// Remove a toast now, cancelling its timer. Returns whether it was present.
    pub fn dismiss(&self, id: Uuid) -> bool {
        lock(&self.inner).remove(id)
    }

    /// Current toasts, oldest first
    pub fn list(&self) -> Vec<Notification> {
        lock(&self.inner).items.clone()
    }

    /// Drop every toast and timer
    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
        inner.items.clear();
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.clear();
    }
}

async fn expire(inner: Weak<Mutex<Inner>>, id: Uuid, delay: Duration) {
    tokio::time::sleep(delay).await;
    if let Some(inner) = inner.upgrade() {
        let mut inner = lock(&inner);
        // Our own handle; dropping it instead of aborting lets this task finish
        inner.timers.remove(&id);
        inner.items.retain(|n| n.id != id);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
