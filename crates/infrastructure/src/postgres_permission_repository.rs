//! PostgreSQL-backed permission grant store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use sandwich_application::{PermissionRepository, UserPermissionGrant};
use sandwich_core::{AppError, AppResult, UserId};
use sandwich_domain::Permission;

/// PostgreSQL implementation of the permission repository port.
///
/// The `user_permissions` table carries a unique constraint on
/// `(user_id, permission)`; duplicate grants surface as conflicts.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GrantRow {
    permission: String,
    granted_at: String,
    granted_by: Option<uuid::Uuid>,
}

fn decode_permission(value: &str, user_id: UserId) -> AppResult<Permission> {
    Permission::from_str(value).map_err(|error| {
        AppError::Internal(format!(
            "failed to decode permission '{value}' for user '{user_id}': {error}"
        ))
    })
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY permission
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load permissions: {error}")))?;

        rows.iter()
            .map(|value| decode_permission(value, user_id))
            .collect()
    }

    async fn list_grants_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT
                permission,
                to_char(granted_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"')
                    AS granted_at,
                granted_by
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY permission
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load grants: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(UserPermissionGrant {
                    user_id,
                    permission: decode_permission(row.permission.as_str(), user_id)?,
                    granted_at: row.granted_at,
                    granted_by: row.granted_by.map(UserId::from_uuid),
                })
            })
            .collect()
    }

    async fn grant(
        &self,
        user_id: UserId,
        permission: Permission,
        granted_by: Option<UserId>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, permission, granted_by)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .bind(granted_by.map(|granted_by| granted_by.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if error
                .as_database_error()
                .is_some_and(|database_error| database_error.is_unique_violation())
            {
                AppError::Conflict(format!(
                    "permission '{}' is already granted to user '{user_id}'",
                    permission.as_str()
                ))
            } else {
                AppError::Internal(format!("failed to persist grant: {error}"))
            }
        })?;

        Ok(())
    }

    async fn revoke(&self, user_id: UserId, permission: Permission) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = $1 AND permission = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete grant: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_all(
        &self,
        user_id: UserId,
        permissions: &[Permission],
        granted_by: Option<UserId>,
    ) -> AppResult<()> {
        // Single transaction: a concurrent reader observes the full old set
        // or the full new set, never an interleaving.
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            DELETE FROM user_permissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear grants for user '{user_id}': {error}"
            ))
        })?;

        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, permission, granted_by)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, permission) DO NOTHING
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(permission.as_str())
            .bind(granted_by.map(|granted_by| granted_by.as_uuid()))
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to persist grant '{}': {error}",
                    permission.as_str()
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
