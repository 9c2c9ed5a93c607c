//! Port for the per-user listing index read model.

use async_trait::async_trait;

use crate::domain::{IndexEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by listing index adapters.
    pub enum ListingIndexRepositoryError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "listing index connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "listing index query failed: {message}",
    }
}

/// Port for the denormalised "my listings" index.
///
/// Appends are idempotent per `(user, listing)` so the reconciliation sweep
/// and a retried publish can both call [`ListingIndexRepository::append`]
/// safely.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingIndexRepository: Send + Sync {
    /// Record `entry`, creating the user's index on first use. Returns
    /// `false` when the pair was already indexed.
    async fn append(&self, entry: &IndexEntry) -> Result<bool, ListingIndexRepositoryError>;

    /// Every entry for `user_id` in storage order. Callers re-sort.
    async fn entries(&self, user_id: &UserId)
    -> Result<Vec<IndexEntry>, ListingIndexRepositoryError>;
}
