use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, NonEmptyString};
use sandwich_domain::{EffectiveUser, Permission};

use crate::authorization_service::require_permission;

/// Delivery driver projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    /// Stable driver identifier.
    pub driver_id: Uuid,
    /// Driver name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional vehicle notes (capacity, cooler space).
    pub vehicle_notes: Option<String>,
    /// Host site the driver usually serves, when fixed.
    pub host_id: Option<Uuid>,
    /// Whether the driver is currently available.
    pub is_active: bool,
    /// Creation timestamp in RFC3339.
    pub created_at: String,
}

/// Input payload for creating or updating a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInput {
    /// Driver name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Optional vehicle notes.
    pub vehicle_notes: Option<String>,
    /// Host site the driver usually serves, when fixed.
    pub host_id: Option<Uuid>,
    /// Whether the driver is currently available.
    pub is_active: bool,
}

impl DriverInput {
    fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.name.as_str())?;
        NonEmptyString::new(self.phone.as_str())?;
        Ok(())
    }
}

/// Repository port for driver rows.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Lists all drivers by name.
    async fn list(&self) -> AppResult<Vec<Driver>>;

    /// Returns one driver, if it exists.
    async fn find(&self, driver_id: Uuid) -> AppResult<Option<Driver>>;

    /// Creates a driver and returns the stored row.
    async fn create(&self, input: &DriverInput) -> AppResult<Driver>;

    /// Updates a driver; `NotFound` when it does not exist.
    async fn update(&self, driver_id: Uuid, input: &DriverInput) -> AppResult<Driver>;

    /// Deletes a driver; `NotFound` when it does not exist.
    async fn delete(&self, driver_id: Uuid) -> AppResult<()>;
}

/// Application service for delivery drivers.
#[derive(Clone)]
pub struct DriverService {
    repository: Arc<dyn DriverRepository>,
}

impl DriverService {
    /// Creates a new driver service.
    #[must_use]
    pub fn new(repository: Arc<dyn DriverRepository>) -> Self {
        Self { repository }
    }

    /// Lists drivers.
    pub async fn list_drivers(&self, actor: &EffectiveUser) -> AppResult<Vec<Driver>> {
        require_permission(actor, Permission::ViewDrivers)?;
        self.repository.list().await
    }

    /// Returns one driver.
    pub async fn get_driver(&self, actor: &EffectiveUser, driver_id: Uuid) -> AppResult<Driver> {
        require_permission(actor, Permission::ViewDrivers)?;
        self.repository
            .find(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("driver '{driver_id}' was not found")))
    }

    /// Creates a driver.
    pub async fn create_driver(
        &self,
        actor: &EffectiveUser,
        input: DriverInput,
    ) -> AppResult<Driver> {
        require_permission(actor, Permission::CreateDrivers)?;
        input.validate()?;
        self.repository.create(&input).await
    }

    /// Updates a driver.
    pub async fn update_driver(
        &self,
        actor: &EffectiveUser,
        driver_id: Uuid,
        input: DriverInput,
    ) -> AppResult<Driver> {
        require_permission(actor, Permission::EditDrivers)?;
        input.validate()?;
        self.repository.update(driver_id, &input).await
    }

    /// Deletes a driver.
    pub async fn delete_driver(&self, actor: &EffectiveUser, driver_id: Uuid) -> AppResult<()> {
        require_permission(actor, Permission::DeleteDrivers)?;
        self.repository.delete(driver_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, Role};

    use super::{Driver, DriverInput, DriverRepository, DriverService};

    #[derive(Default)]
    struct FakeDriverRepository {
        drivers: Mutex<Vec<Driver>>,
    }

    #[async_trait]
    impl DriverRepository for FakeDriverRepository {
        async fn list(&self) -> AppResult<Vec<Driver>> {
            Ok(self.drivers.lock().await.clone())
        }

        async fn find(&self, driver_id: Uuid) -> AppResult<Option<Driver>> {
            Ok(self
                .drivers
                .lock()
                .await
                .iter()
                .find(|driver| driver.driver_id == driver_id)
                .cloned())
        }

        async fn create(&self, input: &DriverInput) -> AppResult<Driver> {
            let driver = Driver {
                driver_id: Uuid::new_v4(),
                name: input.name.clone(),
                phone: input.phone.clone(),
                email: input.email.clone(),
                vehicle_notes: input.vehicle_notes.clone(),
                host_id: input.host_id,
                is_active: input.is_active,
                created_at: "2025-01-01T00:00:00Z".to_owned(),
            };
            self.drivers.lock().await.push(driver.clone());
            Ok(driver)
        }

        async fn update(&self, driver_id: Uuid, input: &DriverInput) -> AppResult<Driver> {
            let mut drivers = self.drivers.lock().await;
            let driver = drivers
                .iter_mut()
                .find(|driver| driver.driver_id == driver_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("driver '{driver_id}' was not found"))
                })?;
            driver.name = input.name.clone();
            driver.is_active = input.is_active;
            Ok(driver.clone())
        }

        async fn delete(&self, driver_id: Uuid) -> AppResult<()> {
            let mut drivers = self.drivers.lock().await;
            let before = drivers.len();
            drivers.retain(|driver| driver.driver_id != driver_id);
            if drivers.len() == before {
                return Err(AppError::NotFound(format!(
                    "driver '{driver_id}' was not found"
                )));
            }
            Ok(())
        }
    }

    fn service() -> DriverService {
        DriverService::new(Arc::new(FakeDriverRepository::default()))
    }

    fn user_with_role(role: Role) -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(role),
            permissions: role.default_permissions(),
        }
    }

    fn input(name: &str) -> DriverInput {
        DriverInput {
            name: name.to_owned(),
            phone: "555-0101".to_owned(),
            email: None,
            vehicle_notes: None,
            host_id: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn viewers_list_but_cannot_mutate() {
        let service = service();
        let viewer = user_with_role(Role::Viewer);

        let listed = service.list_drivers(&viewer).await;
        assert!(listed.is_ok());

        let created = service.create_driver(&viewer, input("Pat Wheeler")).await;
        assert!(matches!(created, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn delete_requires_the_admin_only_permission() {
        let service = service();
        let coordinator = user_with_role(Role::Coordinator);

        let created = match service.create_driver(&coordinator, input("Pat Wheeler")).await {
            Ok(driver) => driver,
            Err(error) => panic!("create failed: {error}"),
        };

        let denied = service.delete_driver(&coordinator, created.driver_id).await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let admin = user_with_role(Role::Admin);
        let deleted = service.delete_driver(&admin, created.driver_id).await;
        assert!(deleted.is_ok());
    }

    #[tokio::test]
    async fn name_and_phone_are_required() {
        let service = service();
        let admin = user_with_role(Role::Admin);

        let mut missing_phone = input("Pat Wheeler");
        missing_phone.phone = "  ".to_owned();
        let created = service.create_driver(&admin, missing_phone).await;
        assert!(matches!(created, Err(AppError::Validation(_))));
    }
}
