//! Notification delivery: the live socket registry and the inbox-backed
//! sink that feeds it.

mod inbox_notifier;
mod presence;

pub use inbox_notifier::InboxNotifier;
pub use presence::{PresenceGuard, PresenceRegistry};
