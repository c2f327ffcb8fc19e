use sandwich_core::UserIdentity;
use sandwich_domain::{EffectiveUser, Permission};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Generic message response for auth flows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generic-message-response.ts"
)]
pub struct GenericMessageResponse {
    pub message: String,
}

/// API representation of the authenticated user.
///
/// `permissions` is the resolved set the client uses to decide which
/// controls to render; the server re-checks every call regardless.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl UserIdentityResponse {
    /// Combines the identity with the resolved permission view.
    #[must_use]
    pub fn from_identity(identity: &UserIdentity, effective_user: &EffectiveUser) -> Self {
        Self {
            user_id: identity.user_id().to_string(),
            email: identity.email().to_owned(),
            first_name: identity.first_name().to_owned(),
            last_name: identity.last_name().to_owned(),
            role: identity.role().to_owned(),
            permissions: effective_user
                .permissions
                .iter()
                .map(Permission::as_str)
                .map(str::to_owned)
                .collect(),
        }
    }
}
