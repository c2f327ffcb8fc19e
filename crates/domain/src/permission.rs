use std::str::FromStr;

use sandwich_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
///
/// The catalog is closed: permissions are never registered at runtime, and
/// every stored grant row must decode to one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows viewing volunteer projects.
    ViewProjects,
    /// Allows creating volunteer projects.
    CreateProjects,
    /// Allows editing volunteer projects.
    EditProjects,
    /// Allows deleting volunteer projects.
    DeleteProjects,
    /// Allows viewing host sites.
    ViewHosts,
    /// Allows creating host sites.
    CreateHosts,
    /// Allows editing host sites.
    EditHosts,
    /// Allows deleting host sites.
    DeleteHosts,
    /// Allows viewing sandwich collections.
    ViewCollections,
    /// Allows submitting sandwich collections.
    CreateCollections,
    /// Allows editing sandwich collections.
    EditCollections,
    /// Allows deleting sandwich collections.
    DeleteCollections,
    /// Allows viewing delivery drivers.
    ViewDrivers,
    /// Allows creating delivery drivers.
    CreateDrivers,
    /// Allows editing delivery drivers.
    EditDrivers,
    /// Allows deleting delivery drivers.
    DeleteDrivers,
    /// Allows reading committee chat channels.
    ViewMessages,
    /// Allows posting committee chat messages.
    CreateMessages,
    /// Allows deleting other users' chat messages.
    ModerateMessages,
    /// Allows viewing collection reports.
    ViewReports,
    /// Allows exporting report data.
    ExportReports,
    /// Allows viewing the user directory.
    ViewUsers,
    /// Allows managing users, roles, and permission grants.
    ManageUsers,
    /// Allows viewing meetings and minutes.
    ViewMeetings,
    /// Allows editing meetings and minutes.
    EditMeetings,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewProjects => "view_projects",
            Self::CreateProjects => "create_projects",
            Self::EditProjects => "edit_projects",
            Self::DeleteProjects => "delete_projects",
            Self::ViewHosts => "view_hosts",
            Self::CreateHosts => "create_hosts",
            Self::EditHosts => "edit_hosts",
            Self::DeleteHosts => "delete_hosts",
            Self::ViewCollections => "view_collections",
            Self::CreateCollections => "create_collections",
            Self::EditCollections => "edit_collections",
            Self::DeleteCollections => "delete_collections",
            Self::ViewDrivers => "view_drivers",
            Self::CreateDrivers => "create_drivers",
            Self::EditDrivers => "edit_drivers",
            Self::DeleteDrivers => "delete_drivers",
            Self::ViewMessages => "view_messages",
            Self::CreateMessages => "create_messages",
            Self::ModerateMessages => "moderate_messages",
            Self::ViewReports => "view_reports",
            Self::ExportReports => "export_reports",
            Self::ViewUsers => "view_users",
            Self::ManageUsers => "manage_users",
            Self::ViewMeetings => "view_meetings",
            Self::EditMeetings => "edit_meetings",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            // Project management.
            Permission::ViewProjects,
            Permission::CreateProjects,
            Permission::EditProjects,
            Permission::DeleteProjects,
            // Host management.
            Permission::ViewHosts,
            Permission::CreateHosts,
            Permission::EditHosts,
            Permission::DeleteHosts,
            // Collections.
            Permission::ViewCollections,
            Permission::CreateCollections,
            Permission::EditCollections,
            Permission::DeleteCollections,
            // Drivers.
            Permission::ViewDrivers,
            Permission::CreateDrivers,
            Permission::EditDrivers,
            Permission::DeleteDrivers,
            // Messaging.
            Permission::ViewMessages,
            Permission::CreateMessages,
            Permission::ModerateMessages,
            // Reports.
            Permission::ViewReports,
            Permission::ExportReports,
            // User management.
            Permission::ViewUsers,
            Permission::ManageUsers,
            // Meetings.
            Permission::ViewMeetings,
            Permission::EditMeetings,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view_projects" => Ok(Self::ViewProjects),
            "create_projects" => Ok(Self::CreateProjects),
            "edit_projects" => Ok(Self::EditProjects),
            "delete_projects" => Ok(Self::DeleteProjects),
            "view_hosts" => Ok(Self::ViewHosts),
            "create_hosts" => Ok(Self::CreateHosts),
            "edit_hosts" => Ok(Self::EditHosts),
            "delete_hosts" => Ok(Self::DeleteHosts),
            "view_collections" => Ok(Self::ViewCollections),
            "create_collections" => Ok(Self::CreateCollections),
            "edit_collections" => Ok(Self::EditCollections),
            "delete_collections" => Ok(Self::DeleteCollections),
            "view_drivers" => Ok(Self::ViewDrivers),
            "create_drivers" => Ok(Self::CreateDrivers),
            "edit_drivers" => Ok(Self::EditDrivers),
            "delete_drivers" => Ok(Self::DeleteDrivers),
            "view_messages" => Ok(Self::ViewMessages),
            "create_messages" => Ok(Self::CreateMessages),
            "moderate_messages" => Ok(Self::ModerateMessages),
            "view_reports" => Ok(Self::ViewReports),
            "export_reports" => Ok(Self::ExportReports),
            "view_users" => Ok(Self::ViewUsers),
            "manage_users" => Ok(Self::ManageUsers),
            "view_meetings" => Ok(Self::ViewMeetings),
            "edit_meetings" => Ok(Self::EditMeetings),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}
