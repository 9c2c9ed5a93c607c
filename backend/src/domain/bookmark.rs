//! Tenant bookmarks.

use chrono::{DateTime, Utc};

use super::listing::{Listing, ListingId};

/// One saved listing in a tenant's bookmark list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Saved listing.
    pub listing_id: ListingId,
    /// When the tenant saved it.
    pub saved_at: DateTime<Utc>,
}

/// A bookmark resolved against the listing store.
///
/// `listing` is `None` when the referenced listing has since been removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkedListing {
    /// Stored entry.
    pub entry: BookmarkEntry,
    /// Referenced listing, when it still exists.
    pub listing: Option<Listing>,
}

/// Outcome of an insert against the bookmark store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkInsert {
    /// A new entry was written at the front of the list.
    Inserted,
    /// The pair already existed; nothing changed.
    AlreadyExists,
}
