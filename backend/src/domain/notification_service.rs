//! The caller's notification inbox.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};

use crate::domain::ports::{NotificationRepository, NotificationsInbox};
use crate::domain::{Caller, Error, Notification, NotificationId};

/// Service implementing [`NotificationsInbox`].
#[derive(Clone)]
pub struct NotificationService<N: ?Sized> {
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N: ?Sized> NotificationService<N> {
    /// Create the service over the inbox store.
    pub fn new(notifications: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }
}

fn missing(id: &NotificationId) -> Error {
    Error::not_found(format!("notification {id} not found"))
}

#[async_trait]
impl<N> NotificationsInbox for NotificationService<N>
where
    N: NotificationRepository + ?Sized,
{
    async fn list(
        &self,
        caller: &Caller,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Paginated<Notification>, Error> {
        let (items, total) = self
            .notifications
            .list(&caller.user_id, unread_only, self.clock.utc(), page)
            .await?;
        Ok(Paginated::new(items, total, page))
    }

    async fn mark_read(&self, caller: &Caller, id: &NotificationId) -> Result<(), Error> {
        if self.notifications.mark_read(&caller.user_id, id).await? {
            Ok(())
        } else {
            Err(missing(id))
        }
    }

    async fn mark_all_read(&self, caller: &Caller) -> Result<u64, Error> {
        Ok(self.notifications.mark_all_read(&caller.user_id).await?)
    }

    async fn delete(&self, caller: &Caller, id: &NotificationId) -> Result<(), Error> {
        if self.notifications.delete(&caller.user_id, id).await? {
            Ok(())
        } else {
            Err(missing(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::domain::ports::MockNotificationRepository;
    use crate::domain::{
        ErrorCode, NotificationMessage, NotificationMeta, UserId, UserRole,
    };
    use crate::outbound::memory::MemoryNotificationInbox;
    use crate::test_support::MutableClock;

    fn message_for(user: &UserId, text: &str) -> NotificationMessage {
        NotificationMessage {
            user_id: user.clone(),
            role: UserRole::Landlord,
            message: text.to_owned(),
            meta: NotificationMeta::default(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_and_hides_expired() {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let inbox = Arc::new(MemoryNotificationInbox::default());
        let caller = Caller::new(UserId::random(), UserRole::Landlord);

        let old = Notification::from_message(message_for(&caller.user_id, "old"), clock.utc());
        inbox.insert(&old).await.expect("insert");
        clock.advance(TimeDelta::days(29));
        let fresh = Notification::from_message(message_for(&caller.user_id, "fresh"), clock.utc());
        inbox.insert(&fresh).await.expect("insert");

        let service = NotificationService::new(inbox, clock.clone());
        let listed = service
            .list(&caller, false, PageRequest::default())
            .await
            .expect("list");
        let texts: Vec<&str> = listed.items.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(texts, vec!["fresh", "old"]);

        clock.advance(TimeDelta::days(2));
        let later = service
            .list(&caller, false, PageRequest::default())
            .await
            .expect("list");
        assert_eq!(later.info.total, 1);
    }

    #[tokio::test]
    async fn unread_filter_and_mark_read() {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let inbox = Arc::new(MemoryNotificationInbox::default());
        let caller = Caller::new(UserId::random(), UserRole::Tenant);
        let first = Notification::from_message(message_for(&caller.user_id, "a"), clock.utc());
        let second = Notification::from_message(message_for(&caller.user_id, "b"), clock.utc());
        inbox.insert(&first).await.expect("insert");
        inbox.insert(&second).await.expect("insert");

        let service = NotificationService::new(inbox, clock);
        service.mark_read(&caller, &first.id).await.expect("mark read");
        let unread = service
            .list(&caller, true, PageRequest::default())
            .await
            .expect("list");
        assert_eq!(unread.info.total, 1);
        assert_eq!(service.mark_all_read(&caller).await.expect("all"), 1);
    }

    #[tokio::test]
    async fn foreign_notifications_are_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_delete().times(1).return_once(|_, _| Ok(false));
        let service = NotificationService::new(Arc::new(repo), Arc::new(mockable::DefaultClock));
        let caller = Caller::new(UserId::random(), UserRole::Tenant);
        let err = service
            .delete(&caller, &NotificationId::random())
            .await
            .expect_err("not owned");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
