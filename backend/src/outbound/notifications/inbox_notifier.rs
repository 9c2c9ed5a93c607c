//! Default [`NotificationSink`]: persist to the inbox, then push live.

use std::sync::Arc;

use mockable::Clock;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::domain::ports::{NotificationRepository, NotificationSink};
use crate::domain::{Notification, NotificationMessage, TraceId};

use super::PresenceRegistry;

/// Stores every message in the recipient's inbox and forwards it to their
/// open sockets.
///
/// Delivery runs on a spawned task under the caller's trace id. Failures are
/// logged and never reach the request that triggered them.
#[derive(Clone)]
pub struct InboxNotifier {
    inbox: Arc<dyn NotificationRepository>,
    presence: Arc<PresenceRegistry>,
    clock: Arc<dyn Clock>,
}

impl InboxNotifier {
    /// Build a notifier over the given inbox and registry.
    pub fn new(
        inbox: Arc<dyn NotificationRepository>,
        presence: Arc<PresenceRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inbox,
            presence,
            clock,
        }
    }

    async fn deliver(
        inbox: Arc<dyn NotificationRepository>,
        presence: Arc<PresenceRegistry>,
        notification: Notification,
    ) {
        if let Err(error) = inbox.insert(&notification).await {
            warn!(
                user_id = %notification.user_id,
                error = %error,
                "failed to store notification"
            );
            return;
        }
        let payload = match serde_json::to_string(&notification) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, "failed to encode notification for push");
                return;
            }
        };
        let delivered = presence.push(&notification.user_id, &payload);
        debug!(
            user_id = %notification.user_id,
            notification_id = %notification.id,
            delivered,
            "notification delivered"
        );
    }
}

impl NotificationSink for InboxNotifier {
    fn notify(&self, message: NotificationMessage) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(user_id = %message.user_id, "no runtime available; notification dropped");
            return;
        };
        let notification = Notification::from_message(message, self.clock.utc());
        let task = Self::deliver(
            Arc::clone(&self.inbox),
            Arc::clone(&self.presence),
            notification,
        );
        match TraceId::current() {
            Some(trace_id) => {
                runtime.spawn(TraceId::scope(trace_id, task));
            }
            None => {
                runtime.spawn(task);
            }
        }
    }
}
