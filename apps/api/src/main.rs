//! Sandwich Project API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use sandwich_application::{
    AuthorizationService, CollectionService, DriverService, HostService, MeetingService,
    MessageService, PermissionAdminService, ProjectService, RateLimitRule, RateLimitService,
    ReportService, UserService,
};
use sandwich_core::AppError;
use sandwich_infrastructure::{
    Argon2PasswordHasher, InMemoryPermissionCache, PostgresAuditRepository,
    PostgresCollectionRepository, PostgresDriverRepository, PostgresHostRepository,
    PostgresMeetingRepository, PostgresMessageRepository, PostgresPermissionRepository,
    PostgresProjectRepository, PostgresRateLimitRepository, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    // Authorization core: grant store, resolution cache, decision services.
    let permission_repository = Arc::new(PostgresPermissionRepository::new(pool.clone()));
    let permission_cache = Arc::new(InMemoryPermissionCache::new(config.permission_cache_ttl));
    let authorization_service =
        AuthorizationService::new(permission_repository.clone(), permission_cache);
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let permission_admin_service = PermissionAdminService::new(
        authorization_service.clone(),
        permission_repository,
        audit_repository.clone(),
    );

    // Accounts.
    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let user_service = UserService::new(
        user_repository,
        password_hasher,
        authorization_service.clone(),
        audit_repository,
    );

    // Rate limiting.
    let rate_limit_repository = Arc::new(PostgresRateLimitRepository::new(pool.clone()));
    let rate_limit_service = RateLimitService::new(rate_limit_repository);

    // Record services.
    let project_service = ProjectService::new(Arc::new(PostgresProjectRepository::new(
        pool.clone(),
    )));
    let host_service = HostService::new(Arc::new(PostgresHostRepository::new(pool.clone())));
    let driver_service =
        DriverService::new(Arc::new(PostgresDriverRepository::new(pool.clone())));
    let collection_repository = Arc::new(PostgresCollectionRepository::new(pool.clone()));
    let collection_service = CollectionService::new(collection_repository.clone());
    let report_service = ReportService::new(collection_repository);
    let message_service =
        MessageService::new(Arc::new(PostgresMessageRepository::new(pool.clone())));
    let meeting_service =
        MeetingService::new(Arc::new(PostgresMeetingRepository::new(pool.clone())));

    let app_state = AppState {
        authorization_service,
        permission_admin_service,
        user_service,
        rate_limit_service,
        project_service,
        host_service,
        driver_service,
        collection_service,
        message_service,
        meeting_service,
        report_service,
        pool,
        frontend_url: config.frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route(
            "/api/projects",
            get(handlers::projects::list_projects_handler)
                .post(handlers::projects::create_project_handler),
        )
        .route(
            "/api/projects/{project_id}",
            get(handlers::projects::get_project_handler)
                .put(handlers::projects::update_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        .route(
            "/api/hosts",
            get(handlers::hosts::list_hosts_handler).post(handlers::hosts::create_host_handler),
        )
        .route(
            "/api/hosts/{host_id}",
            get(handlers::hosts::get_host_handler)
                .put(handlers::hosts::update_host_handler)
                .delete(handlers::hosts::delete_host_handler),
        )
        .route(
            "/api/drivers",
            get(handlers::drivers::list_drivers_handler)
                .post(handlers::drivers::create_driver_handler),
        )
        .route(
            "/api/drivers/{driver_id}",
            get(handlers::drivers::get_driver_handler)
                .put(handlers::drivers::update_driver_handler)
                .delete(handlers::drivers::delete_driver_handler),
        )
        .route(
            "/api/collections",
            get(handlers::collections::list_collections_handler)
                .post(handlers::collections::create_collection_handler),
        )
        .route(
            "/api/collections/{collection_id}",
            get(handlers::collections::get_collection_handler)
                .put(handlers::collections::update_collection_handler)
                .delete(handlers::collections::delete_collection_handler),
        )
        .route(
            "/api/chat/{channel}/messages",
            get(handlers::messages::list_channel_handler)
                .post(handlers::messages::post_message_handler),
        )
        .route(
            "/api/chat/messages/{message_id}",
            delete(handlers::messages::delete_message_handler),
        )
        .route(
            "/api/meetings",
            get(handlers::meetings::list_meetings_handler)
                .post(handlers::meetings::schedule_meeting_handler),
        )
        .route(
            "/api/meetings/{meeting_id}",
            get(handlers::meetings::get_meeting_handler)
                .put(handlers::meetings::update_meeting_handler),
        )
        .route(
            "/api/reports/collections",
            get(handlers::reports::collection_report_handler),
        )
        .route(
            "/api/reports/collections/export",
            get(handlers::reports::export_host_totals_handler),
        )
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{user_id}/role",
            put(handlers::users::update_user_role_handler),
        )
        .route(
            "/api/users/{user_id}",
            delete(handlers::users::deactivate_user_handler),
        )
        .route("/auth/user", get(auth::me_handler))
        .route(
            "/auth/permissions/{user_id}",
            get(handlers::permissions::list_grants_handler)
                .put(handlers::permissions::set_user_permissions_handler)
                .post(handlers::permissions::grant_permission_handler),
        )
        .route(
            "/auth/permissions/{user_id}/{permission}",
            delete(handlers::permissions::revoke_permission_handler),
        )
        .route(
            "/auth/audit-log",
            get(handlers::permissions::list_audit_log_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    // Rate limit rules (OWASP Credential Stuffing Prevention).
    // Login: 10 attempts per IP per 15 minutes.
    let login_rate_rule = RateLimitRule::new("login", 10, 15 * 60);
    // Registration: 5 attempts per IP per hour.
    let register_rate_rule = RateLimitRule::new("register", 5, 60 * 60);

    let login_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(login_rate_rule));

    let register_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(register_rate_rule));

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(login_routes)
        .merge(register_routes)
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "sandwich-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
