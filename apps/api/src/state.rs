use sandwich_application::{
    AuthorizationService, CollectionService, DriverService, HostService, MeetingService,
    MessageService, PermissionAdminService, ProjectService, RateLimitService, ReportService,
    UserService,
};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub permission_admin_service: PermissionAdminService,
    pub user_service: UserService,
    pub rate_limit_service: RateLimitService,
    pub project_service: ProjectService,
    pub host_service: HostService,
    pub driver_service: DriverService,
    pub collection_service: CollectionService,
    pub message_service: MessageService,
    pub meeting_service: MeetingService,
    pub report_service: ReportService,
    pub pool: PgPool,
    pub frontend_url: String,
}
