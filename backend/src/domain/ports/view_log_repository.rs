//! Port for the view deduplication log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ListingId, ViewRecord, Viewer};

use super::define_port_error;

define_port_error! {
    /// Errors raised by view log adapters.
    pub enum ViewLogRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "view log connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "view log query failed: {message}",
    }
}

/// Port for view observations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewLogRepository: Send + Sync {
    /// Whether `listing_id` has a record at or after `since` whose viewer
    /// matches `viewer` by identity or by address.
    async fn has_recent(
        &self,
        listing_id: &ListingId,
        viewer: &Viewer,
        since: DateTime<Utc>,
    ) -> Result<bool, ViewLogRepositoryError>;

    /// Append an observation.
    async fn insert(&self, record: &ViewRecord) -> Result<(), ViewLogRepositoryError>;
}
