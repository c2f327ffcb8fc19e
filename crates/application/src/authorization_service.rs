use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use sandwich_core::{AppError, AppResult, UserId, UserIdentity};
use sandwich_domain::{EffectiveUser, Permission, Role};

/// One persisted permission grant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermissionGrant {
    /// User the grant belongs to.
    pub user_id: UserId,
    /// Granted permission.
    pub permission: Permission,
    /// Grant timestamp in RFC3339.
    pub granted_at: String,
    /// Administrator who issued the grant, when recorded.
    pub granted_by: Option<UserId>,
}

/// Repository port for the per-user permission grant store.
///
/// At most one row exists per `(user_id, permission)` pair; the store
/// enforces this with a unique constraint.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists granted permissions for a user. Empty when no rows exist.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>>;

    /// Lists full grant rows for a user, for administrative views.
    async fn list_grants_for_user(&self, user_id: UserId)
    -> AppResult<Vec<UserPermissionGrant>>;

    /// Inserts one grant row. A duplicate grant is a `Conflict` error; callers
    /// needing idempotence use [`PermissionRepository::replace_all`].
    async fn grant(
        &self,
        user_id: UserId,
        permission: Permission,
        granted_by: Option<UserId>,
    ) -> AppResult<()>;

    /// Deletes one grant row. Returns whether a row existed; deleting a
    /// missing grant is a successful no-op.
    async fn revoke(&self, user_id: UserId, permission: Permission) -> AppResult<bool>;

    /// Replaces the user's full grant set in one transaction: delete every
    /// existing row, then insert one row per entry. A concurrent reader sees
    /// either the full old set or the full new set, never a mixture. An empty
    /// slice revokes everything.
    async fn replace_all(
        &self,
        user_id: UserId,
        permissions: &[Permission],
        granted_by: Option<UserId>,
    ) -> AppResult<()>;
}

/// Cache port for resolved permission sets.
///
/// Entries are best-effort with a bounded TTL; every grant mutation and role
/// change invalidates the affected user so a revocation cannot outlive the
/// TTL window.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached set for a user, if present and fresh.
    async fn get(&self, user_id: UserId) -> Option<BTreeSet<Permission>>;

    /// Stores the resolved set for a user.
    async fn put(&self, user_id: UserId, permissions: BTreeSet<Permission>);

    /// Drops the cached entry for a user.
    async fn invalidate(&self, user_id: UserId);
}

/// Ensures the actor holds the given permission.
///
/// The single enforcement entry point; services never test roles directly.
/// Denial maps to `Forbidden`, which the API layer renders as 403.
pub fn require_permission(actor: &EffectiveUser, permission: Permission) -> AppResult<()> {
    if actor.can(permission) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "user '{}' is missing permission '{}'",
        actor.user_id,
        permission.as_str()
    )))
}

/// Application service that assembles the per-request authorization view.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn PermissionRepository>,
    cache: Arc<dyn PermissionCache>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(repository: Arc<dyn PermissionRepository>, cache: Arc<dyn PermissionCache>) -> Self {
        Self { repository, cache }
    }

    /// Resolves the permission set used for decisions about one user.
    ///
    /// Explicit grant rows, when at least one exists, are used exactly as
    /// stored; otherwise the role defaults apply. An unrecognized role
    /// resolves to the empty set.
    pub async fn resolve_effective_permissions(
        &self,
        user_id: UserId,
        role: Option<Role>,
    ) -> AppResult<BTreeSet<Permission>> {
        if let Some(cached) = self.cache.get(user_id).await {
            return Ok(cached);
        }

        let grants = self.repository.list_for_user(user_id).await?;
        let permissions: BTreeSet<Permission> = if grants.is_empty() {
            role.map(|role| role.default_permissions()).unwrap_or_default()
        } else {
            grants.into_iter().collect()
        };

        self.cache.put(user_id, permissions.clone()).await;
        Ok(permissions)
    }

    /// Builds the decision-procedure view for an authenticated identity.
    pub async fn effective_user(&self, identity: &UserIdentity) -> AppResult<EffectiveUser> {
        let role = Role::from_str(identity.role()).ok();
        let permissions = self
            .resolve_effective_permissions(identity.user_id(), role)
            .await?;

        Ok(EffectiveUser {
            user_id: identity.user_id(),
            role,
            permissions,
        })
    }

    /// Drops the cached permission set for a user.
    ///
    /// Called after every grant mutation and role change.
    pub async fn invalidate_cached_permissions(&self, user_id: UserId) {
        self.cache.invalidate(user_id).await;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::Permission;

    use super::{PermissionCache, PermissionRepository, UserPermissionGrant};

    /// In-memory permission store mirroring the unique-row constraint.
    #[derive(Default)]
    pub struct FakePermissionRepository {
        pub rows: Mutex<HashMap<UserId, Vec<UserPermissionGrant>>>,
        pub list_calls: AtomicUsize,
        pub fail_replace: bool,
    }

    #[async_trait]
    impl PermissionRepository for FakePermissionRepository {
        async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Permission>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .await
                .get(&user_id)
                .map(|grants| grants.iter().map(|grant| grant.permission).collect())
                .unwrap_or_default())
        }

        async fn list_grants_for_user(
            &self,
            user_id: UserId,
        ) -> AppResult<Vec<UserPermissionGrant>> {
            Ok(self
                .rows
                .lock()
                .await
                .get(&user_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn grant(
            &self,
            user_id: UserId,
            permission: Permission,
            granted_by: Option<UserId>,
        ) -> AppResult<()> {
            let mut rows = self.rows.lock().await;
            let grants = rows.entry(user_id).or_default();
            if grants.iter().any(|grant| grant.permission == permission) {
                return Err(AppError::Conflict(format!(
                    "permission '{}' is already granted",
                    permission.as_str()
                )));
            }

            grants.push(UserPermissionGrant {
                user_id,
                permission,
                granted_at: "2025-01-01T00:00:00Z".to_owned(),
                granted_by,
            });
            Ok(())
        }

        async fn revoke(&self, user_id: UserId, permission: Permission) -> AppResult<bool> {
            let mut rows = self.rows.lock().await;
            let grants = rows.entry(user_id).or_default();
            let before = grants.len();
            grants.retain(|grant| grant.permission != permission);
            Ok(grants.len() < before)
        }

        async fn replace_all(
            &self,
            user_id: UserId,
            permissions: &[Permission],
            granted_by: Option<UserId>,
        ) -> AppResult<()> {
            if self.fail_replace {
                return Err(AppError::Internal("replace failed".to_owned()));
            }

            let mut rows = self.rows.lock().await;
            let grants = permissions
                .iter()
                .map(|permission| UserPermissionGrant {
                    user_id,
                    permission: *permission,
                    granted_at: "2025-01-01T00:00:00Z".to_owned(),
                    granted_by,
                })
                .collect();
            rows.insert(user_id, grants);
            Ok(())
        }
    }

    /// Unbounded cache fake; TTL behavior is covered by the infrastructure
    /// implementation's own tests.
    #[derive(Default)]
    pub struct FakePermissionCache {
        pub entries: Mutex<HashMap<UserId, BTreeSet<Permission>>>,
    }

    #[async_trait]
    impl PermissionCache for FakePermissionCache {
        async fn get(&self, user_id: UserId) -> Option<BTreeSet<Permission>> {
            self.entries.lock().await.get(&user_id).cloned()
        }

        async fn put(&self, user_id: UserId, permissions: BTreeSet<Permission>) {
            self.entries.lock().await.insert(user_id, permissions);
        }

        async fn invalidate(&self, user_id: UserId) {
            self.entries.lock().await.remove(&user_id);
        }
    }
}
