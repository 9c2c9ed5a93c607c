//! Administrative audit trail.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Kinds of administrative action that leave an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Hard delete of a listing.
    DeleteListing,
    /// Report closed by a moderator.
    ResolveReport,
    /// Per-user index rebuilt from the listing store.
    ReconcileIndex,
}

impl AuditAction {
    /// Stored name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeleteListing => "delete_listing",
            Self::ResolveReport => "resolve_report",
            Self::ReconcileIndex => "reconcile_index",
        }
    }

    /// Parse a stored name.
    pub fn parse(raw: &str) -> Option<Self> {
        [Self::DeleteListing, Self::ResolveReport, Self::ReconcileIndex]
            .into_iter()
            .find(|action| action.as_str() == raw)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Identity.
    pub id: Uuid,
    /// Acting administrator.
    pub admin_id: UserId,
    /// What they did.
    pub action: AuditAction,
    /// Identifier of the affected entity.
    pub target: String,
    /// Address the request came from, if known.
    pub ip_address: Option<String>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Build an entry with a fresh identifier.
    pub fn new(
        admin_id: UserId,
        action: AuditAction,
        target: impl Into<String>,
        ip_address: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            admin_id,
            action,
            target: target.into(),
            ip_address,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_round_trip() {
        for action in [
            AuditAction::DeleteListing,
            AuditAction::ResolveReport,
            AuditAction::ReconcileIndex,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("drop_table"), None);
    }
}
