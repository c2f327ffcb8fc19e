//! Infrastructure adapters: PostgreSQL repositories, password hashing, and
//! the in-memory permission cache.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_permission_cache;
mod postgres_audit_repository;
mod postgres_collection_repository;
mod postgres_driver_repository;
mod postgres_host_repository;
mod postgres_meeting_repository;
mod postgres_message_repository;
mod postgres_permission_repository;
mod postgres_project_repository;
mod postgres_rate_limit_repository;
mod postgres_user_repository;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_permission_cache::{
    DEFAULT_PERMISSION_CACHE_TTL, InMemoryPermissionCache,
};
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_collection_repository::PostgresCollectionRepository;
pub use postgres_driver_repository::PostgresDriverRepository;
pub use postgres_host_repository::PostgresHostRepository;
pub use postgres_meeting_repository::PostgresMeetingRepository;
pub use postgres_message_repository::PostgresMessageRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_user_repository::PostgresUserRepository;
