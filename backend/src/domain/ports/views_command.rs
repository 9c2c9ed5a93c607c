//! Driving port for view counting.

use async_trait::async_trait;

use crate::domain::{Error, ListingId, ViewOutcome, Viewer};

/// Record listing views with 24-hour deduplication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewsCommand: Send + Sync {
    /// Count a view unless `viewer` already viewed `listing_id` within the
    /// window. A suppressed view is a success with `recorded = false`.
    async fn record(&self, listing_id: &ListingId, viewer: Viewer) -> Result<ViewOutcome, Error>;
}
