//! View observations and the rolling deduplication window.

use chrono::{DateTime, Duration, Utc};

use super::listing::ListingId;
use super::user::UserId;

/// Length of the window during which repeat views from one viewer do not
/// increment the counter.
pub const VIEW_DEDUP_WINDOW_HOURS: i64 = 24;

/// Placeholder address recorded when the connection exposes none.
pub const UNKNOWN_VIEWER_ADDRESS: &str = "unknown";

/// The rolling deduplication window as a [`Duration`].
pub fn dedup_window() -> Duration {
    Duration::hours(VIEW_DEDUP_WINDOW_HOURS)
}

/// Who is looking at a listing.
///
/// Matching is by identity OR address: a signed-in viewer who roams between
/// networks is still recognised, and anonymous viewers are recognised by
/// address alone. Viewers sharing an address (NAT) count once per window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// Session identity when the viewer is signed in.
    pub user_id: Option<UserId>,
    /// Network address as reported by the connection.
    pub address: String,
}

impl Viewer {
    /// Build a viewer, substituting [`UNKNOWN_VIEWER_ADDRESS`] for blanks.
    pub fn new(user_id: Option<UserId>, address: impl Into<String>) -> Self {
        let address = address.into();
        let address = if address.trim().is_empty() {
            UNKNOWN_VIEWER_ADDRESS.to_owned()
        } else {
            address.trim().to_owned()
        };
        Self { user_id, address }
    }
}

/// A stored view observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRecord {
    /// Viewed listing.
    pub listing_id: ListingId,
    /// Viewer identity and address.
    pub viewer: Viewer,
    /// Observation time.
    pub viewed_at: DateTime<Utc>,
}

/// Result of recording a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOutcome {
    /// Whether this call incremented the counter.
    pub recorded: bool,
    /// Counter value after the call.
    pub views: u64,
}
