use std::sync::Arc;

use sandwich_core::{AppResult, UserId};
use sandwich_domain::{AuditAction, EffectiveUser, Permission};

use crate::audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
use crate::authorization_service::{
    AuthorizationService, PermissionRepository, UserPermissionGrant, require_permission,
};

/// Administrative service for per-user permission grants.
///
/// Every operation requires the `manage_users` permission on the acting
/// user, invalidates the target's cached permission set after a mutation,
/// and appends an audit event. Storage failures surface to the caller,
/// never as a partial apply.
#[derive(Clone)]
pub struct PermissionAdminService {
    authorization: AuthorizationService,
    repository: Arc<dyn PermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PermissionAdminService {
    /// Creates a new permission administration service.
    #[must_use]
    pub fn new(
        authorization: AuthorizationService,
        repository: Arc<dyn PermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization,
            repository,
            audit_repository,
        }
    }

    /// Lists the explicit grant rows for one user.
    pub async fn list_grants(
        &self,
        actor: &EffectiveUser,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionGrant>> {
        require_permission(actor, Permission::ManageUsers)?;
        self.repository.list_grants_for_user(user_id).await
    }

    /// Grants a single permission to a user.
    ///
    /// Not idempotent: a duplicate grant is a conflict. Administrators
    /// replacing a whole set use [`PermissionAdminService::set_user_permissions`].
    pub async fn grant_permission(
        &self,
        actor: &EffectiveUser,
        user_id: UserId,
        permission: Permission,
    ) -> AppResult<()> {
        require_permission(actor, Permission::ManageUsers)?;

        self.repository
            .grant(user_id, permission, Some(actor.user_id))
            .await?;
        self.authorization.invalidate_cached_permissions(user_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id,
                action: AuditAction::PermissionGranted,
                resource_type: "user_permission".to_owned(),
                resource_id: format!("{user_id}:{}", permission.as_str()),
                detail: Some(format!(
                    "granted '{}' to user '{user_id}'",
                    permission.as_str()
                )),
            })
            .await
    }

    /// Revokes a single permission from a user. Revoking a permission that
    /// was never granted succeeds as a no-op.
    pub async fn revoke_permission(
        &self,
        actor: &EffectiveUser,
        user_id: UserId,
        permission: Permission,
    ) -> AppResult<()> {
        require_permission(actor, Permission::ManageUsers)?;

        let removed = self.repository.revoke(user_id, permission).await?;
        self.authorization.invalidate_cached_permissions(user_id).await;

        if !removed {
            return Ok(());
        }

        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id,
                action: AuditAction::PermissionRevoked,
                resource_type: "user_permission".to_owned(),
                resource_id: format!("{user_id}:{}", permission.as_str()),
                detail: Some(format!(
                    "revoked '{}' from user '{user_id}'",
                    permission.as_str()
                )),
            })
            .await
    }

    /// Replaces a user's full grant set.
    ///
    /// The replacement is atomic in the store; an empty set revokes every
    /// explicit grant, which returns the user to their role defaults.
    pub async fn set_user_permissions(
        &self,
        actor: &EffectiveUser,
        user_id: UserId,
        permissions: Vec<Permission>,
    ) -> AppResult<()> {
        require_permission(actor, Permission::ManageUsers)?;

        self.repository
            .replace_all(user_id, &permissions, Some(actor.user_id))
            .await?;
        self.authorization.invalidate_cached_permissions(user_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id,
                action: AuditAction::PermissionsReplaced,
                resource_type: "user_permission".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "replaced grant set for user '{user_id}' with {} permissions",
                    permissions.len()
                )),
            })
            .await
    }

    /// Lists recent administrative audit entries.
    pub async fn list_audit_log(
        &self,
        actor: &EffectiveUser,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        require_permission(actor, Permission::ManageUsers)?;
        self.audit_repository.list_recent_entries(query).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, Permission, Role};

    use crate::audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
    use crate::authorization_service::test_support::{
        FakePermissionCache, FakePermissionRepository,
    };
    use crate::authorization_service::{AuthorizationService, PermissionRepository};

    use super::PermissionAdminService;

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }

        async fn list_recent_entries(
            &self,
            _query: AuditLogQuery,
        ) -> AppResult<Vec<AuditLogEntry>> {
            Ok(Vec::new())
        }
    }

    struct Fixture {
        service: PermissionAdminService,
        repository: Arc<FakePermissionRepository>,
        cache: Arc<FakePermissionCache>,
        audit: Arc<FakeAuditRepository>,
    }

    fn fixture() -> Fixture {
        fixture_with_repository(Arc::new(FakePermissionRepository::default()))
    }

    fn fixture_with_repository(repository: Arc<FakePermissionRepository>) -> Fixture {
        let cache = Arc::new(FakePermissionCache::default());
        let audit = Arc::new(FakeAuditRepository::default());
        let authorization =
            AuthorizationService::new(repository.clone(), cache.clone());
        let service = PermissionAdminService::new(
            authorization,
            repository.clone(),
            audit.clone(),
        );

        Fixture {
            service,
            repository,
            cache,
            audit,
        }
    }

    fn admin() -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Admin),
            permissions: BTreeSet::new(),
        }
    }

    fn coordinator() -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Coordinator),
            permissions: Role::Coordinator.default_permissions(),
        }
    }

    #[tokio::test]
    async fn every_mutation_requires_manage_users() {
        let fixture = fixture();
        let actor = coordinator();
        let target = UserId::new();

        let granted = fixture
            .service
            .grant_permission(&actor, target, Permission::ViewReports)
            .await;
        assert!(matches!(granted, Err(AppError::Forbidden(_))));

        let revoked = fixture
            .service
            .revoke_permission(&actor, target, Permission::ViewReports)
            .await;
        assert!(matches!(revoked, Err(AppError::Forbidden(_))));

        let replaced = fixture
            .service
            .set_user_permissions(&actor, target, vec![Permission::ViewReports])
            .await;
        assert!(matches!(replaced, Err(AppError::Forbidden(_))));

        let listed = fixture.service.list_grants(&actor, target).await;
        assert!(matches!(listed, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn duplicate_grant_is_a_conflict() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        let first = fixture
            .service
            .grant_permission(&actor, target, Permission::ViewReports)
            .await;
        assert!(first.is_ok());

        let second = fixture
            .service
            .grant_permission(&actor, target, Permission::ViewReports)
            .await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn revoking_a_missing_grant_is_a_quiet_no_op() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        let revoked = fixture
            .service
            .revoke_permission(&actor, target, Permission::ViewReports)
            .await;
        assert!(revoked.is_ok());

        // No audit noise for a no-op revoke.
        assert!(fixture.audit.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn replace_leaves_no_residue_and_is_idempotent() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        let first = fixture
            .service
            .set_user_permissions(
                &actor,
                target,
                vec![Permission::ViewProjects, Permission::EditProjects],
            )
            .await;
        assert!(first.is_ok());

        let second = fixture
            .service
            .set_user_permissions(&actor, target, vec![Permission::ViewReports])
            .await;
        assert!(second.is_ok());

        let stored = fixture.repository.list_for_user(target).await;
        assert_eq!(stored.ok(), Some(vec![Permission::ViewReports]));

        // Replaying the same set succeeds, unlike a raw duplicate grant.
        let replay = fixture
            .service
            .set_user_permissions(&actor, target, vec![Permission::ViewReports])
            .await;
        assert!(replay.is_ok());

        let stored = fixture.repository.list_for_user(target).await;
        assert_eq!(stored.ok(), Some(vec![Permission::ViewReports]));
    }

    #[tokio::test]
    async fn empty_replacement_revokes_everything() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        let seeded = fixture
            .service
            .set_user_permissions(&actor, target, vec![Permission::ViewProjects])
            .await;
        assert!(seeded.is_ok());

        let cleared = fixture
            .service
            .set_user_permissions(&actor, target, Vec::new())
            .await;
        assert!(cleared.is_ok());

        let stored = fixture.repository.list_for_user(target).await;
        assert_eq!(stored.ok(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn mutations_invalidate_the_cached_set() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        fixture
            .cache
            .entries
            .lock()
            .await
            .insert(target, BTreeSet::from([Permission::DeleteProjects]));

        let replaced = fixture
            .service
            .set_user_permissions(&actor, target, vec![Permission::ViewProjects])
            .await;
        assert!(replaced.is_ok());

        assert!(!fixture.cache.entries.lock().await.contains_key(&target));
    }

    #[tokio::test]
    async fn failed_replacement_surfaces_to_the_administrator() {
        let fixture = fixture_with_repository(Arc::new(FakePermissionRepository {
            fail_replace: true,
            ..Default::default()
        }));
        let actor = admin();

        let replaced = fixture
            .service
            .set_user_permissions(&actor, UserId::new(), vec![Permission::ViewProjects])
            .await;
        assert!(matches!(replaced, Err(AppError::Internal(_))));

        // Nothing is audited for a failed mutation.
        assert!(fixture.audit.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn grants_are_audited_with_actor_and_target() {
        let fixture = fixture();
        let actor = admin();
        let target = UserId::new();

        let granted = fixture
            .service
            .grant_permission(&actor, target, Permission::ExportReports)
            .await;
        assert!(granted.is_ok());

        let events = fixture.audit.events.lock().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor_user_id, actor.user_id);
        assert!(events[0].resource_id.contains("export_reports"));
    }
}
