//! PostgreSQL-backed driver repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{Driver, DriverInput, DriverRepository};
use sandwich_core::{AppError, AppResult};

/// PostgreSQL implementation of the driver repository port.
#[derive(Clone)]
pub struct PostgresDriverRepository {
    pool: PgPool,
}

impl PostgresDriverRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    name: String,
    phone: String,
    email: Option<String>,
    vehicle_notes: Option<String>,
    host_id: Option<Uuid>,
    is_active: bool,
    created_at: String,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            driver_id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            vehicle_notes: row.vehicle_notes,
            host_id: row.host_id,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const DRIVER_COLUMNS: &str = r#"
    id, name, phone, email, vehicle_notes, host_id, is_active,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl DriverRepository for PostgresDriverRepository {
    async fn list(&self) -> AppResult<Vec<Driver>> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list drivers: {error}")))?;

        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn find(&self, driver_id: Uuid) -> AppResult<Option<Driver>> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
        ))
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load driver: {error}")))?;

        Ok(row.map(Driver::from))
    }

    async fn create(&self, input: &DriverInput) -> AppResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r#"
            INSERT INTO drivers (name, phone, email, vehicle_notes, host_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(input.email.as_deref())
        .bind(input.vehicle_notes.as_deref())
        .bind(input.host_id)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create driver: {error}")))?;

        Ok(Driver::from(row))
    }

    async fn update(&self, driver_id: Uuid, input: &DriverInput) -> AppResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r#"
            UPDATE drivers
            SET name = $2,
                phone = $3,
                email = $4,
                vehicle_notes = $5,
                host_id = $6,
                is_active = $7
            WHERE id = $1
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(driver_id)
        .bind(input.name.trim())
        .bind(input.phone.trim())
        .bind(input.email.as_deref())
        .bind(input.vehicle_notes.as_deref())
        .bind(input.host_id)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update driver: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("driver '{driver_id}' was not found")))?;

        Ok(Driver::from(row))
    }

    async fn delete(&self, driver_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(driver_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete driver: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "driver '{driver_id}' was not found"
            )));
        }

        Ok(())
    }
}
