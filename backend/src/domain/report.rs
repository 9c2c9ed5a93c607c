//! Listing reports and their moderation lifecycle.
//!
//! Status only ever moves forward: `pending → reviewed → resolved` or
//! `pending → resolved`. Resolving decrements the listing's report counter
//! exactly once because a resolved report cannot be resolved again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::listing::ListingId;
use super::user::UserId;

/// Longest accepted report reason, in characters.
pub const MAX_REPORT_REASON_CHARS: usize = 500;

/// Report identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validation errors for report input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportValidationError {
    /// Reason was blank after trimming.
    #[error("report reason must not be empty")]
    EmptyReason,
    /// Reason exceeded [`MAX_REPORT_REASON_CHARS`].
    #[error("report reason must be at most {max} characters")]
    ReasonTooLong {
        /// Configured bound.
        max: usize,
    },
    /// Unknown status name.
    #[error("unknown report status: {0}")]
    UnknownStatus(String),
}

/// Trimmed, bounded report reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportReason(String);

impl ReportReason {
    /// Validate a raw reason.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ReportValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReportValidationError::EmptyReason);
        }
        if trimmed.chars().count() > MAX_REPORT_REASON_CHARS {
            return Err(ReportValidationError::ReasonTooLong {
                max: MAX_REPORT_REASON_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the reason text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Filed, not yet looked at.
    Pending,
    /// Seen by a moderator.
    Reviewed,
    /// Closed; the listing's counter has been decremented.
    Resolved,
}

impl ReportStatus {
    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
        }
    }

    /// Whether a report in this state may be resolved.
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ReportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "resolved" => Ok(Self::Resolved),
            other => Err(ReportValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// A filed report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Identity.
    pub id: ReportId,
    /// Reported listing.
    pub listing_id: ListingId,
    /// Reporting tenant.
    pub reporter_id: UserId,
    /// Free-text reason.
    pub reason: ReportReason,
    /// Current state.
    pub status: ReportStatus,
    /// Filing time.
    pub created_at: DateTime<Utc>,
    /// Set when the report is resolved.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Report {
    /// A newly filed, pending report.
    pub fn file(
        listing_id: ListingId,
        reporter_id: UserId,
        reason: ReportReason,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReportId::random(),
            listing_id,
            reporter_id,
            reason,
            status: ReportStatus::Pending,
            created_at: now,
            resolved_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn reason_is_trimmed() {
        let reason = ReportReason::new("  scam listing  ").expect("valid reason");
        assert_eq!(reason.as_str(), "scam listing");
    }

    #[rstest]
    #[case("   ", ReportValidationError::EmptyReason)]
    #[case(&"x".repeat(MAX_REPORT_REASON_CHARS + 1), ReportValidationError::ReasonTooLong { max: MAX_REPORT_REASON_CHARS })]
    fn reason_rejects_bad_input(#[case] raw: &str, #[case] expected: ReportValidationError) {
        assert_eq!(ReportReason::new(raw), Err(expected));
    }

    #[rstest]
    #[case(ReportStatus::Pending, true)]
    #[case(ReportStatus::Reviewed, true)]
    #[case(ReportStatus::Resolved, false)]
    fn only_unresolved_reports_are_open(#[case] status: ReportStatus, #[case] open: bool) {
        assert_eq!(status.is_open(), open);
    }

    #[rstest]
    fn status_parses_case_insensitively() {
        assert_eq!("Reviewed".parse::<ReportStatus>(), Ok(ReportStatus::Reviewed));
    }
}
