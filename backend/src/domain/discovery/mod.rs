//! Discovery engine: browse strategies, search filters, and keyword
//! extraction shared by every listing search surface.

mod browse;
mod filters;
mod keyword;

pub use browse::{
    BrowsePlan, BrowseSort, LocationFrequency, LocationRanking, UnknownBrowseSort, compare_recent,
};
pub use filters::{FreeText, SearchCriteria, SearchFilterError, SearchFilters, SearchOrder};
pub use keyword::{ParsedKeyword, parse_keyword};
