//! PostgreSQL-backed meeting repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{Meeting, MeetingInput, MeetingRepository};
use sandwich_core::{AppError, AppResult};
use sandwich_domain::MeetingStatus;

/// PostgreSQL implementation of the meeting repository port.
#[derive(Clone)]
pub struct PostgresMeetingRepository {
    pool: PgPool,
}

impl PostgresMeetingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MeetingRow {
    id: Uuid,
    title: String,
    scheduled_at: String,
    meeting_type: String,
    agenda: Option<String>,
    minutes: Option<String>,
    status: String,
    created_at: String,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = AppError;

    fn try_from(row: MeetingRow) -> Result<Self, Self::Error> {
        let status = MeetingStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode status of meeting '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            meeting_id: row.id,
            title: row.title,
            scheduled_at: row.scheduled_at,
            meeting_type: row.meeting_type,
            agenda: row.agenda,
            minutes: row.minutes,
            status,
            created_at: row.created_at,
        })
    }
}

const MEETING_COLUMNS: &str = r#"
    id, title,
    to_char(scheduled_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS scheduled_at,
    meeting_type, agenda, minutes, status,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl MeetingRepository for PostgresMeetingRepository {
    async fn list(&self) -> AppResult<Vec<Meeting>> {
        let rows = sqlx::query_as::<_, MeetingRow>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings ORDER BY scheduled_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list meetings: {error}")))?;

        rows.into_iter().map(Meeting::try_from).collect()
    }

    async fn find(&self, meeting_id: Uuid) -> AppResult<Option<Meeting>> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1"
        ))
        .bind(meeting_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load meeting: {error}")))?;

        row.map(Meeting::try_from).transpose()
    }

    async fn create(&self, input: &MeetingInput) -> AppResult<Meeting> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
            INSERT INTO meetings (title, scheduled_at, meeting_type, agenda, minutes, status)
            VALUES ($1, $2::timestamptz, $3, $4, $5, $6)
            RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(input.title.trim())
        .bind(input.scheduled_at.as_str())
        .bind(input.meeting_type.as_str())
        .bind(input.agenda.as_deref())
        .bind(input.minutes.as_deref())
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create meeting: {error}")))?;

        Meeting::try_from(row)
    }

    async fn update(&self, meeting_id: Uuid, input: &MeetingInput) -> AppResult<Meeting> {
        let row = sqlx::query_as::<_, MeetingRow>(&format!(
            r#"
            UPDATE meetings
            SET title = $2,
                scheduled_at = $3::timestamptz,
                meeting_type = $4,
                agenda = $5,
                minutes = $6,
                status = $7
            WHERE id = $1
            RETURNING {MEETING_COLUMNS}
            "#
        ))
        .bind(meeting_id)
        .bind(input.title.trim())
        .bind(input.scheduled_at.as_str())
        .bind(input.meeting_type.as_str())
        .bind(input.agenda.as_deref())
        .bind(input.minutes.as_deref())
        .bind(input.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update meeting: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("meeting '{meeting_id}' was not found")))?;

        Meeting::try_from(row)
    }
}
