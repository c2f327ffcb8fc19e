use async_trait::async_trait;

use sandwich_core::{AppResult, UserId};
use sandwich_domain::AuditAction;

/// Administrative audit event appended by application use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// User who performed the action.
    pub actor_user_id: UserId,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Kind of resource the action touched.
    pub resource_type: String,
    /// Identifier of the touched resource.
    pub resource_id: String,
    /// Optional human-readable detail.
    pub detail: Option<String>,
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier.
    pub event_id: String,
    /// Actor user identifier.
    pub actor_user_id: UserId,
    /// Stable action identifier.
    pub action: String,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
    /// Event timestamp in RFC3339.
    pub created_at: String,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

/// Repository port for the append-only audit log.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one event to the log.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists most recent entries, newest first.
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}
