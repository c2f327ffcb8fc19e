use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, NonEmptyString};
use sandwich_domain::{EffectiveUser, Permission, ProjectStatus};

use crate::authorization_service::require_permission;

/// Volunteer project projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Stable project identifier.
    pub project_id: Uuid,
    /// Project title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: ProjectStatus,
    /// Names of volunteers working the project.
    pub assignees: Vec<String>,
    /// Optional due date (ISO `YYYY-MM-DD`).
    pub due_date: Option<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: String,
}

/// Input payload for creating or updating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInput {
    /// Project title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: ProjectStatus,
    /// Names of volunteers working the project.
    pub assignees: Vec<String>,
    /// Optional due date (ISO `YYYY-MM-DD`).
    pub due_date: Option<String>,
}

impl ProjectInput {
    fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.title.as_str())?;

        if let Some(due_date) = self.due_date.as_deref() {
            chrono::NaiveDate::parse_from_str(due_date, "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!("invalid due date '{due_date}', expected YYYY-MM-DD"))
            })?;
        }

        Ok(())
    }
}

/// Repository port for project rows.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Lists all projects, newest first.
    async fn list(&self) -> AppResult<Vec<Project>>;

    /// Returns one project, if it exists.
    async fn find(&self, project_id: Uuid) -> AppResult<Option<Project>>;

    /// Creates a project and returns the stored row.
    async fn create(&self, input: &ProjectInput) -> AppResult<Project>;

    /// Updates a project; `NotFound` when it does not exist.
    async fn update(&self, project_id: Uuid, input: &ProjectInput) -> AppResult<Project>;

    /// Deletes a project; `NotFound` when it does not exist.
    async fn delete(&self, project_id: Uuid) -> AppResult<()>;
}

/// Application service for volunteer project tracking.
#[derive(Clone)]
pub struct ProjectService {
    repository: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    /// Creates a new project service.
    #[must_use]
    pub fn new(repository: Arc<dyn ProjectRepository>) -> Self {
        Self { repository }
    }

    /// Lists projects for any user allowed to view them.
    pub async fn list_projects(&self, actor: &EffectiveUser) -> AppResult<Vec<Project>> {
        require_permission(actor, Permission::ViewProjects)?;
        self.repository.list().await
    }

    /// Returns one project.
    pub async fn get_project(&self, actor: &EffectiveUser, project_id: Uuid) -> AppResult<Project> {
        require_permission(actor, Permission::ViewProjects)?;
        self.repository
            .find(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' was not found")))
    }

    /// Creates a project.
    pub async fn create_project(
        &self,
        actor: &EffectiveUser,
        input: ProjectInput,
    ) -> AppResult<Project> {
        require_permission(actor, Permission::CreateProjects)?;
        input.validate()?;
        self.repository.create(&input).await
    }

    /// Updates a project.
    pub async fn update_project(
        &self,
        actor: &EffectiveUser,
        project_id: Uuid,
        input: ProjectInput,
    ) -> AppResult<Project> {
        require_permission(actor, Permission::EditProjects)?;
        input.validate()?;
        self.repository.update(project_id, &input).await
    }

    /// Deletes a project.
    pub async fn delete_project(&self, actor: &EffectiveUser, project_id: Uuid) -> AppResult<()> {
        require_permission(actor, Permission::DeleteProjects)?;
        self.repository.delete(project_id).await
    }
}
