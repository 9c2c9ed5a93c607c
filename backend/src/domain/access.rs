//! Role and ownership checks shared by the services.

use super::{Caller, Error, UserId};

/// Landlords and agents only.
pub(crate) fn require_publisher(caller: &Caller) -> Result<(), Error> {
    if caller.role.can_publish_listings() {
        Ok(())
    } else {
        Err(Error::forbidden("only landlords and agents may publish listings"))
    }
}

/// Tenants only.
pub(crate) fn require_tenant(caller: &Caller, action: &str) -> Result<(), Error> {
    if caller.role == super::UserRole::Tenant {
        Ok(())
    } else {
        Err(Error::forbidden(format!("only tenants may {action}")))
    }
}

/// Admins and superadmins.
pub(crate) fn require_admin(caller: &Caller) -> Result<(), Error> {
    if caller.role.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}

/// Superadmins only.
pub(crate) fn require_superadmin(caller: &Caller) -> Result<(), Error> {
    if caller.role == super::UserRole::SuperAdmin {
        Ok(())
    } else {
        Err(Error::forbidden("superadmin role required"))
    }
}

/// The caller must be `owner`.
pub(crate) fn require_owner(caller: &Caller, owner: &UserId) -> Result<(), Error> {
    if caller.is(owner) {
        Ok(())
    } else {
        Err(Error::forbidden("only the owner may access this resource"))
    }
}
