//! Caller identity as supplied by the external identity service.
//!
//! The core never authenticates anyone. It receives a verified user id and
//! role with each request and only compares them against ownership and role
//! requirements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The id was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The id was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The role name is not recognised.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Marketplace roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Looks for apartments; may bookmark and report.
    Tenant,
    /// Lists their own property.
    Landlord,
    /// Lists property on behalf of owners.
    Agent,
    /// Moderates listings and reports.
    Admin,
    /// Administrator with access to the audit trail.
    SuperAdmin,
}

impl UserRole {
    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Landlord => "landlord",
            Self::Agent => "agent",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// Whether the role may moderate content.
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Whether the role may publish listings.
    pub const fn can_publish_listings(self) -> bool {
        matches!(self, Self::Landlord | Self::Agent)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tenant" => Ok(Self::Tenant),
            "landlord" => Ok(Self::Landlord),
            "agent" => Ok(Self::Agent),
            "admin" | "administrator" => Ok(Self::Admin),
            "superadmin" | "super_admin" | "superadministrator" => Ok(Self::SuperAdmin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// A verified caller: who is asking and in which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Identity of the caller.
    pub user_id: UserId,
    /// Role the identity service vouched for.
    pub role: UserRole,
}

impl Caller {
    /// Bundle an id and a role.
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Whether this caller is `user_id`.
    pub fn is(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
