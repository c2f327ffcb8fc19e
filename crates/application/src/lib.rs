//! Application services and repository ports for the Sandwich Project
//! backend.

#![forbid(unsafe_code)]

mod audit;
mod authorization_service;
mod collection_service;
mod driver_service;
mod host_service;
mod meeting_service;
mod message_service;
mod permission_admin_service;
mod project_service;
mod rate_limit_service;
mod report_service;
mod user_service;

pub use audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
pub use authorization_service::{
    AuthorizationService, PermissionCache, PermissionRepository, UserPermissionGrant,
    require_permission,
};
pub use collection_service::{
    Collection, CollectionInput, CollectionRepository, CollectionService,
};
pub use driver_service::{Driver, DriverInput, DriverRepository, DriverService};
pub use host_service::{Host, HostInput, HostRepository, HostService};
pub use meeting_service::{Meeting, MeetingInput, MeetingRepository, MeetingService};
pub use message_service::{MESSAGE_MAX_LENGTH, Message, MessageRepository, MessageService};
pub use permission_admin_service::PermissionAdminService;
pub use project_service::{Project, ProjectInput, ProjectRepository, ProjectService};
pub use rate_limit_service::{
    AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService,
};
pub use report_service::{
    CollectionReport, CollectionStatsRepository, CollectionTotals, HostTotals, ReportService,
    WeeklyTotals,
};
pub use user_service::{
    LOCKOUT_MINUTES, MAX_FAILED_LOGINS, PasswordHasher, RegisterParams, UserRecord,
    UserRepository, UserService, UserSummary,
};
