use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a single permission is granted to a user.
    PermissionGranted,
    /// Emitted when a single permission is revoked from a user.
    PermissionRevoked,
    /// Emitted when a user's full grant set is replaced.
    PermissionsReplaced,
    /// Emitted when a user's role is changed.
    UserRoleUpdated,
    /// Emitted when a user account is deactivated.
    UserDeactivated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionGranted => "permission.granted",
            Self::PermissionRevoked => "permission.revoked",
            Self::PermissionsReplaced => "permissions.replaced",
            Self::UserRoleUpdated => "user.role_updated",
            Self::UserDeactivated => "user.deactivated",
        }
    }
}
