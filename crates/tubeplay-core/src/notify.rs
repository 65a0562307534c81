//! User-visible notifications.
//!
//! Failures absorbed by the playback controller surface here as one-shot,
//! non-blocking notices; UI layers decide how to show them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Human-readable text.
    pub message: String,
}

impl Notification {
    /// Informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for user-visible notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not block.
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => error!("{}", notification.message),
            NotificationLevel::Info | NotificationLevel::Success => {
                info!("{}", notification.message);
            }
        }
    }
}

/// Notifier that forwards to a channel consumed by a UI layer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its notifications arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // Receiver gone means nobody is displaying notices anymore.
        let _ = self.tx.send(notification);
    }
}
