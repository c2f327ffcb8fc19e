//! Transport payloads, exported as TypeScript types for the web client.

mod auth;
mod common;
mod records;
mod security;

pub use auth::{LoginRequest, RegisterRequest};
pub use common::{
    GenericMessageResponse, HealthDependencyStatus, HealthResponse, UserIdentityResponse,
};
pub use records::{
    CollectionReportResponse, CollectionResponse, CollectionTotalsResponse, DriverResponse,
    GroupCollectionPayload, HostResponse, HostTotalsResponse, MeetingResponse, MessageResponse,
    PostMessageRequest, ProjectResponse, SaveCollectionRequest, SaveDriverRequest,
    SaveHostRequest, SaveMeetingRequest, SaveProjectRequest, WeeklyTotalsResponse,
};
pub use security::{
    AuditLogEntryResponse, GrantPermissionRequest, PermissionsUpdatedResponse,
    UpdateUserRoleRequest, UserPermissionGrantResponse, UserSummaryResponse,
};
