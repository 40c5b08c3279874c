//! Transient user-facing notifications.
//!
//! Entries keep insertion order and expire independently: an entry is
//! gone once `duration` has elapsed since it was shown. Expiry is read
//! from the tokio clock, so paused-time tests observe it exactly.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    /// `Duration::ZERO` means the entry stays until hidden.
    pub duration: Duration,
    pub shown_at: Instant,
}

impl Notification {
    fn is_expired(&self, now: Instant) -> bool {
        !self.duration.is_zero() && now.duration_since(self.shown_at) >= self.duration
    }
}

/// Ordered collection of live notifications. Cloning shares the
/// collection.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    entries: Arc<watch::Sender<Vec<Notification>>>,
    default_duration: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl NotificationCenter {
    pub fn new(default_duration: Duration) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            entries: Arc::new(tx),
            default_duration,
        }
    }

    /// Append a notification. `duration: None` uses the center's default.
    ///
    /// When called inside a tokio runtime a timer removes the entry once
    /// it expires; [`list`](Self::list) hides expired entries regardless.
    pub fn show(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
        duration: Option<Duration>,
    ) -> NotificationId {
        let notification = Notification {
            id: NotificationId(Uuid::new_v4()),
            kind,
            title: title.into(),
            message,
            duration: duration.unwrap_or(self.default_duration),
            shown_at: Instant::now(),
        };
        let id = notification.id;
        let ttl = notification.duration;
        debug!(%id, ?kind, title = %notification.title, "Notification shown");

        self.entries.send_modify(|entries| entries.push(notification));

        if !ttl.is_zero() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let entries = Arc::downgrade(&self.entries);
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    remove(&entries, id);
                });
            }
        }
        id
    }

    pub fn success(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(NotificationKind::Success, title, message, None)
    }

    pub fn error(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(NotificationKind::Error, title, message, None)
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(NotificationKind::Warning, title, message, None)
    }

    pub fn info(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(NotificationKind::Info, title, message, None)
    }

    /// Remove an entry now. Unknown ids are ignored.
    pub fn hide(&self, id: NotificationId) {
        self.entries.send_if_modified(|entries| {
            let before = entries.len();
            entries.retain(|n| n.id != id);
            entries.len() != before
        });
    }

    /// Live notifications in insertion order.
    pub fn list(&self) -> Vec<Notification> {
        let now = Instant::now();
        self.entries.send_if_modified(|entries| {
            let before = entries.len();
            entries.retain(|n| !n.is_expired(now));
            entries.len() != before
        });
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.entries.subscribe()
    }
}

fn remove(entries: &Weak<watch::Sender<Vec<Notification>>>, id: NotificationId) {
    if let Some(entries) = entries.upgrade() {
        let removed = entries.send_if_modified(|list| {
            let before = list.len();
            list.retain(|n| n.id != id);
            list.len() != before
        });
        if removed {
            debug!(%id, "Notification expired");
        }
    }
}
