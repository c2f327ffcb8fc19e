//! PostgreSQL-backed host site repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{Host, HostInput, HostRepository};
use sandwich_core::{AppError, AppResult};

/// PostgreSQL implementation of the host repository port.
#[derive(Clone)]
pub struct PostgresHostRepository {
    pool: PgPool,
}

impl PostgresHostRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct HostRow {
    id: Uuid,
    name: String,
    address: String,
    contact_name: String,
    contact_phone: String,
    is_active: bool,
    notes: Option<String>,
    created_at: String,
}

impl From<HostRow> for Host {
    fn from(row: HostRow) -> Self {
        Self {
            host_id: row.id,
            name: row.name,
            address: row.address,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            is_active: row.is_active,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

const HOST_COLUMNS: &str = r#"
    id, name, address, contact_name, contact_phone, is_active, notes,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl HostRepository for PostgresHostRepository {
    async fn list(&self) -> AppResult<Vec<Host>> {
        let rows = sqlx::query_as::<_, HostRow>(&format!(
            "SELECT {HOST_COLUMNS} FROM hosts ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list hosts: {error}")))?;

        Ok(rows.into_iter().map(Host::from).collect())
    }

    async fn find(&self, host_id: Uuid) -> AppResult<Option<Host>> {
        let row = sqlx::query_as::<_, HostRow>(&format!(
            "SELECT {HOST_COLUMNS} FROM hosts WHERE id = $1"
        ))
        .bind(host_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load host: {error}")))?;

        Ok(row.map(Host::from))
    }

    async fn create(&self, input: &HostInput) -> AppResult<Host> {
        let row = sqlx::query_as::<_, HostRow>(&format!(
            r#"
            INSERT INTO hosts (name, address, contact_name, contact_phone, is_active, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {HOST_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.address.trim())
        .bind(input.contact_name.as_str())
        .bind(input.contact_phone.as_str())
        .bind(input.is_active)
        .bind(input.notes.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create host: {error}")))?;

        Ok(Host::from(row))
    }

    async fn update(&self, host_id: Uuid, input: &HostInput) -> AppResult<Host> {
        let row = sqlx::query_as::<_, HostRow>(&format!(
            r#"
            UPDATE hosts
            SET name = $2,
                address = $3,
                contact_name = $4,
                contact_phone = $5,
                is_active = $6,
                notes = $7
            WHERE id = $1
            RETURNING {HOST_COLUMNS}
            "#
        ))
        .bind(host_id)
        .bind(input.name.trim())
        .bind(input.address.trim())
        .bind(input.contact_name.as_str())
        .bind(input.contact_phone.as_str())
        .bind(input.is_active)
        .bind(input.notes.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update host: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("host '{host_id}' was not found")))?;

        Ok(Host::from(row))
    }

    async fn delete(&self, host_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM hosts WHERE id = $1")
            .bind(host_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete host: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("host '{host_id}' was not found")));
        }

        Ok(())
    }
}
