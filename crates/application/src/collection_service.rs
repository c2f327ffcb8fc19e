use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use sandwich_core::{AppError, AppResult, NonEmptyString, UserId};
use sandwich_domain::{EffectiveUser, GroupCollection, Permission};

use crate::authorization_service::require_permission;

/// Sandwich collection projection returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Stable collection identifier.
    pub collection_id: Uuid,
    /// Host site the sandwiches were collected at.
    pub host_name: String,
    /// Collection date (ISO `YYYY-MM-DD`).
    pub collection_date: String,
    /// Sandwiches brought by individual volunteers.
    pub individual_sandwiches: i32,
    /// Per-group tallies.
    pub group_collections: Vec<GroupCollection>,
    /// User who submitted the tally.
    pub submitted_by: UserId,
    /// Submission timestamp in RFC3339.
    pub created_at: String,
}

impl Collection {
    /// Total sandwiches across individual and group tallies.
    #[must_use]
    pub fn total_sandwiches(&self) -> i64 {
        i64::from(self.individual_sandwiches)
            + self
                .group_collections
                .iter()
                .map(|group| i64::from(group.sandwich_count))
                .sum::<i64>()
    }
}

/// Input payload for submitting or correcting a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInput {
    /// Host site the sandwiches were collected at.
    pub host_name: String,
    /// Collection date (ISO `YYYY-MM-DD`).
    pub collection_date: String,
    /// Sandwiches brought by individual volunteers.
    pub individual_sandwiches: i32,
    /// Per-group tallies.
    pub group_collections: Vec<GroupCollection>,
}

impl CollectionInput {
    fn validate(&self) -> AppResult<()> {
        NonEmptyString::new(self.host_name.as_str())?;

        chrono::NaiveDate::parse_from_str(&self.collection_date, "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!(
                "invalid collection date '{}', expected YYYY-MM-DD",
                self.collection_date
            ))
        })?;

        if self.individual_sandwiches < 0 {
            return Err(AppError::Validation(
                "individual sandwich count must not be negative".to_owned(),
            ));
        }

        for group in &self.group_collections {
            group.validate()?;
        }

        let group_total: i64 = self
            .group_collections
            .iter()
            .map(|group| i64::from(group.sandwich_count))
            .sum();
        if i64::from(self.individual_sandwiches) + group_total == 0 {
            return Err(AppError::Validation(
                "a collection must record at least one sandwich".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Repository port for collection rows.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Lists collections, newest date first.
    async fn list(&self) -> AppResult<Vec<Collection>>;

    /// Returns one collection, if it exists.
    async fn find(&self, collection_id: Uuid) -> AppResult<Option<Collection>>;

    /// Creates a collection and returns the stored row.
    async fn create(&self, input: &CollectionInput, submitted_by: UserId)
    -> AppResult<Collection>;

    /// Updates a collection; `NotFound` when it does not exist.
    async fn update(&self, collection_id: Uuid, input: &CollectionInput)
    -> AppResult<Collection>;

    /// Deletes a collection; `NotFound` when it does not exist.
    async fn delete(&self, collection_id: Uuid) -> AppResult<()>;
}

/// Application service for weekly sandwich tallies.
#[derive(Clone)]
pub struct CollectionService {
    repository: Arc<dyn CollectionRepository>,
}

impl CollectionService {
    /// Creates a new collection service.
    #[must_use]
    pub fn new(repository: Arc<dyn CollectionRepository>) -> Self {
        Self { repository }
    }

    /// Lists collections.
    pub async fn list_collections(&self, actor: &EffectiveUser) -> AppResult<Vec<Collection>> {
        require_permission(actor, Permission::ViewCollections)?;
        self.repository.list().await
    }

    /// Returns one collection.
    pub async fn get_collection(
        &self,
        actor: &EffectiveUser,
        collection_id: Uuid,
    ) -> AppResult<Collection> {
        require_permission(actor, Permission::ViewCollections)?;
        self.repository
            .find(collection_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("collection '{collection_id}' was not found"))
            })
    }

    /// Submits a collection on behalf of the acting user.
    pub async fn create_collection(
        &self,
        actor: &EffectiveUser,
        input: CollectionInput,
    ) -> AppResult<Collection> {
        require_permission(actor, Permission::CreateCollections)?;
        input.validate()?;
        self.repository.create(&input, actor.user_id).await
    }

    /// Corrects a collection.
    ///
    /// Submitters may fix their own tallies; anyone else needs the edit
    /// permission.
    pub async fn update_collection(
        &self,
        actor: &EffectiveUser,
        collection_id: Uuid,
        input: CollectionInput,
    ) -> AppResult<Collection> {
        let existing = self
            .repository
            .find(collection_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("collection '{collection_id}' was not found"))
            })?;

        if existing.submitted_by == actor.user_id {
            require_permission(actor, Permission::CreateCollections)?;
        } else {
            require_permission(actor, Permission::EditCollections)?;
        }

        input.validate()?;
        self.repository.update(collection_id, &input).await
    }

    /// Deletes a collection.
    pub async fn delete_collection(
        &self,
        actor: &EffectiveUser,
        collection_id: Uuid,
    ) -> AppResult<()> {
        require_permission(actor, Permission::DeleteCollections)?;
        self.repository.delete(collection_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, GroupCollection, Role};

    use super::{Collection, CollectionInput, CollectionRepository, CollectionService};

    #[derive(Default)]
    struct FakeCollectionRepository {
        collections: Mutex<Vec<Collection>>,
    }

    #[async_trait]
    impl CollectionRepository for FakeCollectionRepository {
        async fn list(&self) -> AppResult<Vec<Collection>> {
            Ok(self.collections.lock().await.clone())
        }

        async fn find(&self, collection_id: Uuid) -> AppResult<Option<Collection>> {
            Ok(self
                .collections
                .lock()
                .await
                .iter()
                .find(|collection| collection.collection_id == collection_id)
                .cloned())
        }

        async fn create(
            &self,
            input: &CollectionInput,
            submitted_by: UserId,
        ) -> AppResult<Collection> {
            let collection = Collection {
                collection_id: Uuid::new_v4(),
                host_name: input.host_name.clone(),
                collection_date: input.collection_date.clone(),
                individual_sandwiches: input.individual_sandwiches,
                group_collections: input.group_collections.clone(),
                submitted_by,
                created_at: "2025-01-01T00:00:00Z".to_owned(),
            };
            self.collections.lock().await.push(collection.clone());
            Ok(collection)
        }

        async fn update(
            &self,
            collection_id: Uuid,
            input: &CollectionInput,
        ) -> AppResult<Collection> {
            let mut collections = self.collections.lock().await;
            let collection = collections
                .iter_mut()
                .find(|collection| collection.collection_id == collection_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("collection '{collection_id}' was not found"))
                })?;
            collection.individual_sandwiches = input.individual_sandwiches;
            collection.group_collections = input.group_collections.clone();
            Ok(collection.clone())
        }

        async fn delete(&self, collection_id: Uuid) -> AppResult<()> {
            let mut collections = self.collections.lock().await;
            let before = collections.len();
            collections.retain(|collection| collection.collection_id != collection_id);
            if collections.len() == before {
                return Err(AppError::NotFound(format!(
                    "collection '{collection_id}' was not found"
                )));
            }
            Ok(())
        }
    }

    fn service() -> CollectionService {
        CollectionService::new(Arc::new(FakeCollectionRepository::default()))
    }

    fn user_with_role(role: Role) -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(role),
            permissions: role.default_permissions(),
        }
    }

    fn input() -> CollectionInput {
        CollectionInput {
            host_name: "North site".to_owned(),
            collection_date: "2025-06-04".to_owned(),
            individual_sandwiches: 40,
            group_collections: vec![GroupCollection {
                group_name: "Scout Troop 12".to_owned(),
                sandwich_count: 60,
            }],
        }
    }

    #[tokio::test]
    async fn volunteers_submit_collections_under_their_own_id() {
        let service = service();
        let volunteer = user_with_role(Role::Volunteer);

        let created = match service.create_collection(&volunteer, input()).await {
            Ok(collection) => collection,
            Err(error) => panic!("create failed: {error}"),
        };

        assert_eq!(created.submitted_by, volunteer.user_id);
        assert_eq!(created.total_sandwiches(), 100);
    }

    #[tokio::test]
    async fn viewers_cannot_submit() {
        let service = service();
        let viewer = user_with_role(Role::Viewer);

        let created = service.create_collection(&viewer, input()).await;
        assert!(matches!(created, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn submitters_fix_their_own_tallies_but_not_others() {
        let service = service();
        let volunteer = user_with_role(Role::Volunteer);
        let other_volunteer = user_with_role(Role::Volunteer);

        let created = match service.create_collection(&volunteer, input()).await {
            Ok(collection) => collection,
            Err(error) => panic!("create failed: {error}"),
        };

        let mut corrected = input();
        corrected.individual_sandwiches = 45;
        let own_fix = service
            .update_collection(&volunteer, created.collection_id, corrected.clone())
            .await;
        assert!(own_fix.is_ok());

        let foreign_fix = service
            .update_collection(&other_volunteer, created.collection_id, corrected.clone())
            .await;
        assert!(matches!(foreign_fix, Err(AppError::Forbidden(_))));

        // A coordinator holds edit_collections and may correct anyone's tally.
        let coordinator = user_with_role(Role::Coordinator);
        let coordinator_fix = service
            .update_collection(&coordinator, created.collection_id, corrected)
            .await;
        assert!(coordinator_fix.is_ok());
    }

    #[tokio::test]
    async fn deletion_is_reserved_for_delete_collections() {
        let service = service();
        let volunteer = user_with_role(Role::Volunteer);

        let created = match service.create_collection(&volunteer, input()).await {
            Ok(collection) => collection,
            Err(error) => panic!("create failed: {error}"),
        };

        let denied = service
            .delete_collection(&volunteer, created.collection_id)
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let admin = user_with_role(Role::Admin);
        let deleted = service.delete_collection(&admin, created.collection_id).await;
        assert!(deleted.is_ok());
    }

    #[tokio::test]
    async fn empty_and_malformed_submissions_are_rejected() {
        let service = service();
        let volunteer = user_with_role(Role::Volunteer);

        let mut nothing_collected = input();
        nothing_collected.individual_sandwiches = 0;
        nothing_collected.group_collections.clear();
        let rejected = service.create_collection(&volunteer, nothing_collected).await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));

        let mut bad_date = input();
        bad_date.collection_date = "last wednesday".to_owned();
        let rejected = service.create_collection(&volunteer, bad_date).await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));

        let mut negative = input();
        negative.individual_sandwiches = -5;
        let rejected = service.create_collection(&volunteer, negative).await;
        assert!(matches!(rejected, Err(AppError::Validation(_))));
    }
}
