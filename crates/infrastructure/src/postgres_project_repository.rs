//! PostgreSQL-backed project repository.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use sandwich_application::{Project, ProjectInput, ProjectRepository};
use sandwich_core::{AppError, AppResult};
use sandwich_domain::ProjectStatus;

/// PostgreSQL implementation of the project repository port.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    assignees: Vec<String>,
    due_date: Option<String>,
    created_at: String,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = ProjectStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode status of project '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            project_id: row.id,
            title: row.title,
            description: row.description,
            status,
            assignees: row.assignees,
            due_date: row.due_date,
            created_at: row.created_at,
        })
    }
}

const PROJECT_COLUMNS: &str = r#"
    id, title, description, status, assignees,
    to_char(due_date, 'YYYY-MM-DD') AS due_date,
    to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
"#;

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn list(&self) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list projects: {error}")))?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn find(&self, project_id: Uuid) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load project: {error}")))?;

        row.map(Project::try_from).transpose()
    }

    async fn create(&self, input: &ProjectInput) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (title, description, status, assignees, due_date)
            VALUES ($1, $2, $3, $4, $5::date)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.status.as_str())
        .bind(&input.assignees)
        .bind(input.due_date.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create project: {error}")))?;

        Project::try_from(row)
    }

    async fn update(&self, project_id: Uuid, input: &ProjectInput) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects
            SET title = $2,
                description = $3,
                status = $4,
                assignees = $5,
                due_date = $6::date
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(project_id)
        .bind(input.title.trim())
        .bind(input.description.as_deref())
        .bind(input.status.as_str())
        .bind(&input.assignees)
        .bind(input.due_date.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update project: {error}")))?
        .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' was not found")))?;

        Project::try_from(row)
    }

    async fn delete(&self, project_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete project: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' was not found"
            )));
        }

        Ok(())
    }
}
