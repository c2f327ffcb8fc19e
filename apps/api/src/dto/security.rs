use sandwich_domain::Permission;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for a single permission grant.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-permission-request.ts"
)]
pub struct GrantPermissionRequest {
    pub permission: String,
}

/// Incoming payload for a role change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-role-request.ts"
)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

/// API representation of one permission grant row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-permission-grant-response.ts"
)]
pub struct UserPermissionGrantResponse {
    pub user_id: String,
    pub permission: String,
    pub granted_at: String,
    pub granted_by: Option<String>,
}

impl From<sandwich_application::UserPermissionGrant> for UserPermissionGrantResponse {
    fn from(value: sandwich_application::UserPermissionGrant) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            permission: value.permission.as_str().to_owned(),
            granted_at: value.granted_at,
            granted_by: value.granted_by.map(|granted_by| granted_by.to_string()),
        }
    }
}

/// Confirmation payload after a grant set replacement.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permissions-updated-response.ts"
)]
pub struct PermissionsUpdatedResponse {
    pub user_id: String,
    pub permissions: Vec<String>,
}

impl PermissionsUpdatedResponse {
    /// Builds the confirmation body from the applied set.
    #[must_use]
    pub fn new(user_id: String, permissions: &[Permission]) -> Self {
        Self {
            user_id,
            permissions: permissions
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// API representation of a user directory entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-summary-response.ts"
)]
pub struct UserSummaryResponse {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<sandwich_application::UserSummary> for UserSummaryResponse {
    fn from(value: sandwich_application::UserSummary) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            role: value.role,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub actor_user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub detail: Option<String>,
    pub created_at: String,
}

impl From<sandwich_application::AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: sandwich_application::AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            actor_user_id: value.actor_user_id.to_string(),
            action: value.action,
            resource_type: value.resource_type,
            resource_id: value.resource_id,
            detail: value.detail,
            created_at: value.created_at,
        }
    }
}
