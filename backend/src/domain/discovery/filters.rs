//! Search filters and the in-memory filter engine.
//!
//! [`SearchFilters`] is the raw request. [`SearchFilters::resolve`] folds the
//! keyword extraction in (explicit parameters win), normalises text for
//! case-insensitive matching and picks the result order. The resulting
//! [`SearchCriteria`] is evaluated in memory for per-user and bookmark
//! searches and translated to SQL by the persistence adapter for global
//! search.

use std::cmp::Ordering;

use super::keyword::parse_keyword;
use crate::domain::listing::Listing;

/// Raw search parameters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Title substring.
    pub title: Option<String>,
    /// Location substring.
    pub location: Option<String>,
    /// Apartment type substring.
    pub apartment_type: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<u64>,
    /// Inclusive upper price bound.
    pub max_price: Option<u64>,
    /// Exact bedroom count.
    pub bedrooms: Option<u32>,
    /// Free-text keyword.
    pub keyword: Option<String>,
}

/// Rejected filter combinations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFilterError {
    /// `min_price` exceeds `max_price`.
    #[error("minPrice ({min}) must not exceed maxPrice ({max})")]
    InvertedPriceRange {
        /// Lower bound supplied.
        min: u64,
        /// Upper bound supplied.
        max: u64,
    },
}

/// Order applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOrder {
    /// Creation time descending.
    Newest,
    /// Price ascending, newest first within a price.
    PriceAscending,
    /// Price descending, newest first within a price.
    PriceDescending,
    /// Bedroom count ascending, newest first within a count.
    BedroomsAscending,
}

impl SearchOrder {
    /// Total order over listings for this sort.
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        let newest = || b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id));
        match self {
            Self::Newest => newest(),
            Self::PriceAscending => a.details.price.cmp(&b.details.price).then_with(newest),
            Self::PriceDescending => b.details.price.cmp(&a.details.price).then_with(newest),
            Self::BedroomsAscending => a
                .details
                .bedrooms
                .cmp(&b.details.bedrooms)
                .then_with(newest),
        }
    }
}

/// Free text left over after keyword extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeText {
    phrase: String,
    words: Vec<String>,
}

impl FreeText {
    fn new(text: &str) -> Option<Self> {
        let phrase = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if phrase.is_empty() {
            return None;
        }
        let parts: Vec<&str> = phrase.split(' ').collect();
        let words = if parts.len() > 1 {
            parts
                .into_iter()
                .filter(|word| word.chars().count() > 2)
                .map(str::to_owned)
                .collect()
        } else {
            Vec::new()
        };
        Some(Self { phrase, words })
    }

    /// Whole remainder, lower-cased.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Individual words matched independently (multi-word remainders only).
    pub fn words(&self) -> &[String] {
        &self.words
    }

    fn matches(&self, listing: &Listing) -> bool {
        let fields = [
            Some(listing.details.title.as_str()),
            listing.details.description.as_deref(),
            Some(listing.details.location.as_str()),
        ];
        let hit = |needle: &str| {
            fields
                .iter()
                .flatten()
                .any(|field| contains_ignore_case(field, needle))
        };
        hit(&self.phrase) || self.words.iter().any(|word| hit(word))
    }
}

/// Normalised search criteria ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Lower-cased title needle.
    pub title: Option<String>,
    /// Lower-cased location needle.
    pub location: Option<String>,
    /// Lower-cased apartment type needle.
    pub apartment_type: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<u64>,
    /// Inclusive upper price bound.
    pub max_price: Option<u64>,
    /// Exact bedroom count.
    pub bedrooms: Option<u32>,
    /// Keyword remainder.
    pub text: Option<FreeText>,
    /// Result order.
    pub order: SearchOrder,
}

fn normalise(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_lowercase())
        .filter(|raw| !raw.is_empty())
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl SearchFilters {
    /// Fold keyword extraction in and validate the combination.
    pub fn resolve(self) -> Result<SearchCriteria, SearchFilterError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(SearchFilterError::InvertedPriceRange { min, max });
            }
        }

        let keyword = normalise(self.keyword);
        let parsed = keyword.as_deref().map(parse_keyword).unwrap_or_default();

        let explicit_bedrooms = self.bedrooms;
        let bedrooms = explicit_bedrooms.or(parsed.bedrooms);
        let apartment_type = normalise(self.apartment_type).or_else(|| {
            parsed
                .apartment_type
                .map(|kind| kind.as_str().to_owned())
        });

        let order = if keyword.is_some() {
            SearchOrder::Newest
        } else if self.min_price.is_some() {
            SearchOrder::PriceAscending
        } else if self.max_price.is_some() {
            SearchOrder::PriceDescending
        } else if explicit_bedrooms.is_some() {
            SearchOrder::BedroomsAscending
        } else {
            SearchOrder::Newest
        };

        Ok(SearchCriteria {
            title: normalise(self.title),
            location: normalise(self.location),
            apartment_type,
            min_price: self.min_price,
            max_price: self.max_price,
            bedrooms,
            text: parsed.remainder.as_deref().and_then(FreeText::new),
            order,
        })
    }
}

impl SearchCriteria {
    /// Whether `listing` satisfies every filter. Availability is not
    /// considered here; callers scope the candidate set first.
    pub fn matches(&self, listing: &Listing) -> bool {
        let details = &listing.details;
        let substring = |needle: &Option<String>, field: &str| {
            needle
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(field, needle))
        };

        substring(&self.title, &details.title)
            && substring(&self.location, &details.location)
            && substring(&self.apartment_type, details.apartment_type.as_str())
            && self.min_price.is_none_or(|min| details.price >= min)
            && self.max_price.is_none_or(|max| details.price <= max)
            && self.bedrooms.is_none_or(|count| details.bedrooms == count)
            && self.text.as_ref().is_none_or(|text| text.matches(listing))
    }

    /// Filter then sort `candidates`.
    pub fn apply(&self, candidates: Vec<Listing>) -> Vec<Listing> {
        let mut hits: Vec<Listing> = candidates
            .into_iter()
            .filter(|listing| self.matches(listing))
            .collect();
        hits.sort_by(|a, b| self.order.compare(a, b));
        hits
    }
}
