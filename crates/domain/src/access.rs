//! Pure authorization decision procedure.
//!
//! Every capability check in the system — API route guards and the resolved
//! permission payload handed to the client — goes through [`EffectiveUser`].
//! The functions here are synchronous and perform no I/O; resolving the
//! permission set against storage happens once per request, upstream.

use std::collections::BTreeSet;

use sandwich_core::UserId;

use crate::{Permission, Role};

/// The runtime view of a user consumed by every authorization decision.
///
/// `permissions` is resolved when the user is loaded for a request: the
/// explicit grant set when at least one grant row exists, otherwise the
/// role's default set. An explicit set fully replaces the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveUser {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Parsed role; `None` when the stored value is unrecognized.
    pub role: Option<Role>,
    /// Resolved permission set used for membership checks.
    pub permissions: BTreeSet<Permission>,
}

impl EffectiveUser {
    /// Returns whether this user may perform the given action.
    ///
    /// Admins are allowed unconditionally, before the stored set is
    /// consulted: an admin's grant rows may be stale or empty and must not
    /// matter.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        if self.role == Some(Role::Admin) {
            return true;
        }

        self.permissions.contains(&permission)
    }

    /// Returns whether this user holds one of the required roles.
    #[must_use]
    pub fn is_one_of(&self, required: &[Role]) -> bool {
        match self.role {
            Some(role) => required.contains(&role),
            None => false,
        }
    }
}

/// Returns whether the (possibly absent) user may perform the given action.
///
/// An unauthenticated caller is always denied.
#[must_use]
pub fn has_permission(user: Option<&EffectiveUser>, permission: Permission) -> bool {
    match user {
        Some(user) => user.can(permission),
        None => false,
    }
}

/// Returns whether the (possibly absent) user holds one of the required
/// roles. Denies without a user or without a recognized role.
#[must_use]
pub fn has_role(user: Option<&EffectiveUser>, required: &[Role]) -> bool {
    match user {
        Some(user) => user.is_one_of(required),
        None => false,
    }
}
