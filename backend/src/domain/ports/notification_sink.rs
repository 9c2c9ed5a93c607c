//! Fire-and-forget notification delivery.

use crate::domain::NotificationMessage;

/// Delivers messages to users.
///
/// `notify` must return immediately: implementations hand the message to a
/// background task and log failures instead of reporting them, so a failed
/// delivery never fails the request that triggered it.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Queue `message` for delivery.
    fn notify(&self, message: NotificationMessage);
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationSink;

impl NotificationSink for NoOpNotificationSink {
    fn notify(&self, _message: NotificationMessage) {}
}
