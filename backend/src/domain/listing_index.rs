//! Per-user listing index entries.
//!
//! The index is a derived read model over the listing store. Entries are
//! kept per owner and always re-sorted by `posted_at` descending on read;
//! entries whose listing no longer exists are dropped silently.

use chrono::{DateTime, Utc};

use super::listing::{Listing, ListingId};
use super::user::UserId;

/// A single index row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Owning user.
    pub user_id: UserId,
    /// Indexed listing.
    pub listing_id: ListingId,
    /// When the listing was posted.
    pub posted_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Index entry for a freshly published listing.
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            user_id: listing.owner_id.clone(),
            listing_id: listing.id,
            posted_at: listing.created_at,
        }
    }
}

/// Which slice of a user's index to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexScope {
    /// Listings currently available.
    Active,
    /// Listings the owner has deactivated.
    Deactivated,
}

impl IndexScope {
    /// Whether `listing` belongs to this slice.
    pub const fn admits(self, listing: &Listing) -> bool {
        match self {
            Self::Active => listing.is_available,
            Self::Deactivated => !listing.is_available,
        }
    }
}

/// Counts shown on the owner's dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListingDashboard {
    /// Index entries that still resolve to a listing.
    pub total_listings: u64,
    /// Of those, how many are available.
    pub active_listings: u64,
    /// Of those, how many are deactivated.
    pub deactivated_listings: u64,
}

impl ListingDashboard {
    /// Tally resolved listings.
    pub fn tally<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        listings.into_iter().fold(Self::default(), |mut acc, listing| {
            acc.total_listings += 1;
            if listing.is_available {
                acc.active_listings += 1;
            } else {
                acc.deactivated_listings += 1;
            }
            acc
        })
    }
}
