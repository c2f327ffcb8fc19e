use std::collections::BTreeSet;
use std::str::FromStr;

use sandwich_core::AppError;
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Coarse-grained user classification determining a default permission
/// baseline. Exactly one role per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to everything, including destructive operations.
    Admin,
    /// Runs day-to-day operations: creates and edits records, moderates chat.
    Coordinator,
    /// Submits collections and posts messages.
    Volunteer,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coordinator => "coordinator",
            Self::Volunteer => "volunteer",
            Self::Viewer => "viewer",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Coordinator, Role::Volunteer, Role::Viewer];

        ALL
    }

    /// Returns the default permission set for this role.
    ///
    /// Admin is computed from the full catalog so a new permission extends
    /// the admin set without a second edit. The remaining roles form a
    /// strictly increasing chain: viewer < volunteer < coordinator < admin.
    #[must_use]
    pub fn default_permissions(&self) -> BTreeSet<Permission> {
        match self {
            Self::Admin => Permission::all().iter().copied().collect(),
            Self::Coordinator => {
                let mut permissions = Self::Volunteer.default_permissions();
                permissions.extend([
                    Permission::CreateProjects,
                    Permission::EditProjects,
                    Permission::CreateHosts,
                    Permission::EditHosts,
                    Permission::EditCollections,
                    Permission::CreateDrivers,
                    Permission::EditDrivers,
                    Permission::ModerateMessages,
                    Permission::ExportReports,
                    Permission::ViewUsers,
                    Permission::EditMeetings,
                ]);
                permissions
            }
            Self::Volunteer => {
                let mut permissions = Self::Viewer.default_permissions();
                permissions.extend([Permission::CreateCollections, Permission::CreateMessages]);
                permissions
            }
            Self::Viewer => BTreeSet::from([
                Permission::ViewProjects,
                Permission::ViewHosts,
                Permission::ViewCollections,
                Permission::ViewDrivers,
                Permission::ViewMessages,
                Permission::ViewReports,
                Permission::ViewMeetings,
            ]),
        }
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "coordinator" => Ok(Self::Coordinator),
            "volunteer" => Ok(Self::Volunteer),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}
