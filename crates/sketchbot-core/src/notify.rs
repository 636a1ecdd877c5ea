//! Notification bridge
//!
//! Every operator-visible outcome goes through a [`Notifier`]. The console
//! renders them as transient messages; tests subscribe to a
//! [`NotificationBus`] and count them.

use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;
use tracing::debug;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Action succeeded
    Success,
    /// Action failed
    Error,
    /// Informational notice
    Info,
}

impl Category {
    /// Get the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operator notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Category
    pub category: Category,
    /// User-facing text
    pub message: String,
}

impl Notification {
    /// Create a notification
    #[must_use]
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Sink for operator notifications. No return value is consumed.
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    fn notify(&self, category: Category, message: String);
}

/// Broadcast-based notification bus.
///
/// Slow subscribers miss notifications (lagged) rather than blocking the
/// session.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationBus {
    /// Create a bus buffering up to `capacity` notifications per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future notifications
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish a notification. Having no subscribers is not an error.
    pub fn publish(&self, notification: Notification) {
        debug!(
            category = %notification.category,
            message = %notification.message,
            "Publishing notification"
        );
        let _ = self.sender.send(notification);
    }
}

impl Notifier for NotificationBus {
    fn notify(&self, category: Category, message: String) {
        self.publish(Notification::new(category, message));
    }
}
