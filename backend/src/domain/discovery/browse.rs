//! Browse strategies over available listings.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::listing::Listing;

/// Browse sort strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowseSort {
    /// Later of creation and update time, descending.
    #[default]
    Recent,
    /// Fresh random order per request. Best-effort sampling only: pages
    /// fetched on successive calls may repeat or skip listings.
    Random,
    /// Listings in commonly listed locations first.
    Popular,
}

impl BrowseSort {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Random => "random",
            Self::Popular => "popular",
        }
    }
}

impl fmt::Display for BrowseSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sort name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort strategy: {0}")]
pub struct UnknownBrowseSort(pub String);

impl FromStr for BrowseSort {
    type Err = UnknownBrowseSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "random" => Ok(Self::Random),
            "popular" => Ok(Self::Popular),
            other => Err(UnknownBrowseSort(other.to_owned())),
        }
    }
}

/// How often each location occurs among eligible listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFrequency {
    /// Location string exactly as stored.
    pub location: String,
    /// Number of eligible listings carrying it.
    pub count: u64,
}

/// Location buckets ranked for the `popular` sort: most frequent first,
/// alphabetical among equally frequent locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationRanking {
    ranked: Vec<String>,
    positions: HashMap<String, usize>,
}

impl LocationRanking {
    /// Rank a frequency table.
    pub fn new(mut frequencies: Vec<LocationFrequency>) -> Self {
        frequencies.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.location.cmp(&b.location))
        });
        let ranked: Vec<String> = frequencies.into_iter().map(|f| f.location).collect();
        let positions = ranked
            .iter()
            .enumerate()
            .map(|(rank, location)| (location.clone(), rank))
            .collect();
        Self { ranked, positions }
    }

    /// Count locations across `listings` and rank them.
    pub fn from_listings<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for listing in listings {
            *counts.entry(listing.details.location.as_str()).or_default() += 1;
        }
        Self::new(
            counts
                .into_iter()
                .map(|(location, count)| LocationFrequency {
                    location: location.to_owned(),
                    count,
                })
                .collect(),
        )
    }

    /// Locations in rank order.
    pub fn locations(&self) -> &[String] {
        &self.ranked
    }

    fn rank_of(&self, location: &str) -> usize {
        self.positions
            .get(location)
            .copied()
            .unwrap_or(self.ranked.len())
    }

    /// Popular ordering: bucket rank, then newest first within a bucket.
    pub fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        self.rank_of(&a.details.location)
            .cmp(&self.rank_of(&b.details.location))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// A browse request with any pre-pass data it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowsePlan {
    /// See [`BrowseSort::Recent`].
    Recent,
    /// See [`BrowseSort::Random`].
    Random,
    /// See [`BrowseSort::Popular`], carrying the location pre-pass.
    Popular(LocationRanking),
}

/// Recent ordering: last activity descending.
pub fn compare_recent(a: &Listing, b: &Listing) -> Ordering {
    b.last_activity()
        .cmp(&a.last_activity())
        .then_with(|| a.id.cmp(&b.id))
}
