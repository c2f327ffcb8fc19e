use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, NonEmptyString};
use sandwich_domain::{EffectiveUser, Permission};

use crate::authorization_service::require_permission;

/// Host site projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Stable host identifier.
    pub host_id: Uuid,
    /// Site name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact person name.
    pub contact_name: String,
    /// Contact phone number.
    pub contact_phone: String,
    /// Whether the site currently collects.
    pub is_active: bool,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp in RFC3339.
    pub created_at: String,
}

/// Input payload for creating or updating a host site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInput {
    /// Site name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Contact person name.
    pub contact_name: String,
    /// Contact phone number.
    pub contact_phone: String,
    /// Whether the site currently collects.
    pub is_active: bool,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl HostInput {
    fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.name.as_str())?;
        NonEmptyString::new(self.address.as_str())?;
        Ok(())
    }
}

/// Repository port for host rows.
#[async_trait]
pub trait HostRepository: Send + Sync {
    /// Lists all host sites by name.
    async fn list(&self) -> AppResult<Vec<Host>>;

    /// Returns one host site, if it exists.
    async fn find(&self, host_id: Uuid) -> AppResult<Option<Host>>;

    /// Creates a host site and returns the stored row.
    async fn create(&self, input: &HostInput) -> AppResult<Host>;

    /// Updates a host site; `NotFound` when it does not exist.
    async fn update(&self, host_id: Uuid, input: &HostInput) -> AppResult<Host>;

    /// Deletes a host site; `NotFound` when it does not exist.
    async fn delete(&self, host_id: Uuid) -> AppResult<()>;
}

/// Application service for sandwich host sites.
#[derive(Clone)]
pub struct HostService {
    repository: Arc<dyn HostRepository>,
}

impl HostService {
    /// Creates a new host service.
    #[must_use]
    pub fn new(repository: Arc<dyn HostRepository>) -> Self {
        Self { repository }
    }

    /// Lists host sites.
    pub async fn list_hosts(&self, actor: &EffectiveUser) -> AppResult<Vec<Host>> {
        require_permission(actor, Permission::ViewHosts)?;
        self.repository.list().await
    }

    /// Returns one host site.
    pub async fn get_host(&self, actor: &EffectiveUser, host_id: Uuid) -> AppResult<Host> {
        require_permission(actor, Permission::ViewHosts)?;
        self.repository
            .find(host_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("host '{host_id}' was not found")))
    }

    /// Creates a host site.
    pub async fn create_host(&self, actor: &EffectiveUser, input: HostInput) -> AppResult<Host> {
        require_permission(actor, Permission::CreateHosts)?;
        input.validate()?;
        self.repository.create(&input).await
    }

    /// Updates a host site.
    pub async fn update_host(
        &self,
        actor: &EffectiveUser,
        host_id: Uuid,
        input: HostInput,
    ) -> AppResult<Host> {
        require_permission(actor, Permission::EditHosts)?;
        input.validate()?;
        self.repository.update(host_id, &input).await
    }

    /// Deletes a host site.
    pub async fn delete_host(&self, actor: &EffectiveUser, host_id: Uuid) -> AppResult<()> {
        require_permission(actor, Permission::DeleteHosts)?;
        self.repository.delete(host_id).await
    }
}
