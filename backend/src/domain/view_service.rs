//! View counting with a rolling 24-hour deduplication window.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{ListingRepository, ViewLogRepository, ViewsCommand};
use crate::domain::{Error, ListingId, ViewOutcome, ViewRecord, Viewer, dedup_window};

/// Service implementing [`ViewsCommand`].
#[derive(Clone)]
pub struct ViewService<L: ?Sized, V: ?Sized> {
    listings: Arc<L>,
    views: Arc<V>,
    clock: Arc<dyn Clock>,
}

impl<L: ?Sized, V: ?Sized> ViewService<L, V> {
    /// Create the service over the listing store and the view log.
    pub fn new(listings: Arc<L>, views: Arc<V>, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            views,
            clock,
        }
    }
}

#[async_trait]
impl<L, V> ViewsCommand for ViewService<L, V>
where
    L: ListingRepository + ?Sized,
    V: ViewLogRepository + ?Sized,
{
    async fn record(&self, listing_id: &ListingId, viewer: Viewer) -> Result<ViewOutcome, Error> {
        let listing = self
            .listings
            .find(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))?;

        let now = self.clock.utc();
        if self
            .views
            .has_recent(listing_id, &viewer, now - dedup_window())
            .await?
        {
            debug!(%listing_id, "view suppressed inside dedup window");
            return Ok(ViewOutcome {
                recorded: false,
                views: listing.views,
            });
        }

        self.views
            .insert(&ViewRecord {
                listing_id: *listing_id,
                viewer,
                viewed_at: now,
            })
            .await?;
        let views = self
            .listings
            .increment_views(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("listing {listing_id} not found")))?;

        Ok(ViewOutcome {
            recorded: true,
            views,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};

    use super::*;
    use crate::domain::listing::fixtures::{details, listing};
    use crate::domain::ports::MockViewLogRepository;
    use crate::domain::{ErrorCode, UserId};
    use crate::outbound::memory::{MemoryListingStore, MemoryViewLog};
    use crate::test_support::MutableClock;

    struct Harness {
        service: ViewService<MemoryListingStore, MemoryViewLog>,
        clock: Arc<MutableClock>,
        listing_id: ListingId,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryListingStore::default());
        let seeded = listing(&UserId::random(), details("Cozy flat", "Lekki", 2, 1), 0);
        store.insert(&seeded).await.expect("seed listing");
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let service = ViewService::new(store, Arc::new(MemoryViewLog::default()), clock.clone());
        Harness {
            service,
            clock,
            listing_id: seeded.id,
        }
    }

    #[tokio::test]
    async fn repeat_view_inside_window_counts_once() {
        let h = harness().await;
        let viewer = Viewer::new(Some(UserId::random()), "10.0.0.1");

        let first = h.service.record(&h.listing_id, viewer.clone()).await.expect("first");
        h.clock.advance(TimeDelta::hours(23));
        let second = h.service.record(&h.listing_id, viewer).await.expect("second");

        assert!(first.recorded);
        assert!(!second.recorded);
        assert_eq!(second.views, 1);
    }

    #[tokio::test]
    async fn view_after_window_counts_again() {
        let h = harness().await;
        let viewer = Viewer::new(None, "10.0.0.1");

        h.service.record(&h.listing_id, viewer.clone()).await.expect("first");
        h.clock.advance(TimeDelta::hours(24) + TimeDelta::seconds(1));
        let second = h.service.record(&h.listing_id, viewer).await.expect("second");

        assert!(second.recorded);
        assert_eq!(second.views, 2);
    }

    #[tokio::test]
    async fn signed_in_viewer_is_recognised_across_addresses() {
        let h = harness().await;
        let user = UserId::random();

        h.service
            .record(&h.listing_id, Viewer::new(Some(user.clone()), "10.0.0.1"))
            .await
            .expect("first");
        let roaming = h
            .service
            .record(&h.listing_id, Viewer::new(Some(user), "192.168.1.9"))
            .await
            .expect("second");
        assert!(!roaming.recorded);
    }

    #[tokio::test]
    async fn shared_address_suppresses_other_anonymous_viewers() {
        let h = harness().await;
        h.service
            .record(&h.listing_id, Viewer::new(None, "203.0.113.7"))
            .await
            .expect("first");
        let neighbour = h
            .service
            .record(&h.listing_id, Viewer::new(Some(UserId::random()), "203.0.113.7"))
            .await
            .expect("second");
        assert!(!neighbour.recorded);
    }

    #[tokio::test]
    async fn unknown_listing_is_not_found_and_logs_nothing() {
        let mut views = MockViewLogRepository::new();
        views.expect_has_recent().never();
        views.expect_insert().never();
        let service = ViewService::new(
            Arc::new(MemoryListingStore::default()),
            Arc::new(views),
            Arc::new(MutableClock::new(Utc::now())),
        );
        let err = service
            .record(&ListingId::random(), Viewer::new(None, "10.0.0.1"))
            .await
            .expect_err("missing listing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
