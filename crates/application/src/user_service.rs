use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use sandwich_core::{AppError, AppResult, UserId};
use sandwich_domain::{
    AuditAction, EffectiveUser, EmailAddress, Permission, Role, validate_password,
};

use crate::audit::{AuditEvent, AuditRepository};
use crate::authorization_service::{AuthorizationService, require_permission};

/// Failed logins tolerated before the account is temporarily locked
/// (OWASP Authentication cheat sheet).
pub const MAX_FAILED_LOGINS: i32 = 10;

/// Lockout duration after too many failed logins.
pub const LOCKOUT_MINUTES: i64 = 15;

/// Full user row used by authentication flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Stable user identifier.
    pub id: UserId,
    /// Account email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Raw role storage value; parsed at permission resolution.
    pub role: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Consecutive failed login attempts.
    pub failed_login_count: i32,
    /// Lockout expiry, when locked.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Directory projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Account email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Raw role storage value.
    pub role: String,
    /// Whether the account may sign in.
    pub is_active: bool,
    /// Account creation timestamp in RFC3339.
    pub created_at: String,
}

/// Input payload for account registration.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    /// Requested email address.
    pub email: String,
    /// Plaintext password, validated and hashed before storage.
    pub password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

/// Repository port for user rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the user with the given email, if one exists.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Returns the user with the given id, if one exists.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a user row and returns its id.
    async fn create(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        role: Role,
    ) -> AppResult<UserId>;

    /// Returns the total number of user rows.
    async fn count_users(&self) -> AppResult<i64>;

    /// Lists all users for the administrative directory.
    async fn list_users(&self) -> AppResult<Vec<UserSummary>>;

    /// Updates a user's role.
    async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()>;

    /// Activates or deactivates a user.
    async fn set_active(&self, user_id: UserId, is_active: bool) -> AppResult<()>;

    /// Increments the failed-login counter, optionally locking the account.
    async fn record_failed_login(
        &self,
        user_id: UserId,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Clears the failed-login counter and any lockout.
    async fn reset_failed_logins(&self, user_id: UserId) -> AppResult<()>;
}

/// Port for password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool>;
}

/// Application service for accounts and the user directory.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    authorization: AuthorizationService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        authorization: AuthorizationService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            authorization,
            audit_repository,
        }
    }

    /// Registers a new account.
    ///
    /// The first registered account becomes the admin; everyone after that
    /// starts as a volunteer.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserId> {
        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;

        if params.first_name.trim().is_empty() || params.last_name.trim().is_empty() {
            return Err(AppError::Validation(
                "first and last name are required".to_owned(),
            ));
        }

        if self.repository.find_by_email(email.as_str()).await?.is_some() {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let role = if self.repository.count_users().await? == 0 {
            Role::Admin
        } else {
            Role::Volunteer
        };

        let password_hash = self.password_hasher.hash(&params.password)?;
        self.repository
            .create(
                email.as_str(),
                &password_hash,
                params.first_name.trim(),
                params.last_name.trim(),
                role,
            )
            .await
    }

    /// Authenticates an email/password pair.
    ///
    /// Failures are reported with one generic message to prevent account
    /// enumeration. Repeated failures lock the account for a short window.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<UserRecord> {
        let invalid =
            || AppError::Unauthorized("invalid email or password".to_owned());

        let normalized = EmailAddress::new(email).map_err(|_| invalid())?;
        let user = self
            .repository
            .find_by_email(normalized.as_str())
            .await?
            .ok_or_else(invalid)?;

        if !user.is_active {
            return Err(AppError::Unauthorized(
                "this account has been deactivated".to_owned(),
            ));
        }

        if let Some(locked_until) = user.locked_until
            && locked_until > Utc::now()
        {
            return Err(AppError::Unauthorized(
                "account temporarily locked, try again later".to_owned(),
            ));
        }

        if !self.password_hasher.verify(password, &user.password_hash)? {
            let attempts = user.failed_login_count + 1;
            let locked_until = (attempts >= MAX_FAILED_LOGINS)
                .then(|| Utc::now() + Duration::minutes(LOCKOUT_MINUTES));
            self.repository
                .record_failed_login(user.id, locked_until)
                .await?;
            return Err(invalid());
        }

        if user.failed_login_count > 0 || user.locked_until.is_some() {
            self.repository.reset_failed_logins(user.id).await?;
        }

        Ok(user)
    }

    /// Returns a user row by id, if it exists.
    pub async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.repository.find_by_id(user_id).await
    }

    /// Returns the user directory for administrative views.
    pub async fn list_users(&self, actor: &EffectiveUser) -> AppResult<Vec<UserSummary>> {
        require_permission(actor, Permission::ViewUsers)?;
        self.repository.list_users().await
    }

    /// Changes a user's role and invalidates their cached permission set.
    pub async fn update_role(
        &self,
        actor: &EffectiveUser,
        user_id: UserId,
        role: Role,
    ) -> AppResult<()> {
        require_permission(actor, Permission::ManageUsers)?;

        if self.repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        self.repository.update_role(user_id, role).await?;
        self.authorization.invalidate_cached_permissions(user_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id,
                action: AuditAction::UserRoleUpdated,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!("set role of '{user_id}' to '{}'", role.as_str())),
            })
            .await
    }

    /// Deactivates a user account.
    pub async fn deactivate_user(&self, actor: &EffectiveUser, user_id: UserId) -> AppResult<()> {
        require_permission(actor, Permission::ManageUsers)?;

        if actor.user_id == user_id {
            return Err(AppError::Validation(
                "you cannot deactivate your own account".to_owned(),
            ));
        }

        if self.repository.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        self.repository.set_active(user_id, false).await?;
        self.authorization.invalidate_cached_permissions(user_id).await;

        self.audit_repository
            .append_event(AuditEvent {
                actor_user_id: actor.user_id,
                action: AuditAction::UserDeactivated,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use tokio::sync::Mutex;

    use sandwich_core::{AppError, AppResult, UserId};
    use sandwich_domain::{EffectiveUser, Role};

    use crate::audit::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
    use crate::authorization_service::AuthorizationService;
    use crate::authorization_service::test_support::{
        FakePermissionCache, FakePermissionRepository,
    };

    use super::{
        MAX_FAILED_LOGINS, PasswordHasher, RegisterParams, UserRecord, UserRepository,
        UserService, UserSummary,
    };

    #[derive(Default)]
    struct FakeUserRepository {
        users: Mutex<Vec<UserRecord>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepository {
        async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|user| user.email == email)
                .cloned())
        }

        async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|user| user.id == user_id)
                .cloned())
        }

        async fn create(
            &self,
            email: &str,
            password_hash: &str,
            first_name: &str,
            last_name: &str,
            role: Role,
        ) -> AppResult<UserId> {
            let user_id = UserId::new();
            self.users.lock().await.push(UserRecord {
                id: user_id,
                email: email.to_owned(),
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                role: role.as_str().to_owned(),
                password_hash: password_hash.to_owned(),
                is_active: true,
                failed_login_count: 0,
                locked_until: None,
            });
            Ok(user_id)
        }

        async fn count_users(&self) -> AppResult<i64> {
            Ok(self.users.lock().await.len() as i64)
        }

        async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .map(|user| UserSummary {
                    user_id: user.id,
                    email: user.email.clone(),
                    first_name: user.first_name.clone(),
                    last_name: user.last_name.clone(),
                    role: user.role.clone(),
                    is_active: user.is_active,
                    created_at: "2025-01-01T00:00:00Z".to_owned(),
                })
                .collect())
        }

        async fn update_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
            let mut users = self.users.lock().await;
            if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
                user.role = role.as_str().to_owned();
            }
            Ok(())
        }

        async fn set_active(&self, user_id: UserId, is_active: bool) -> AppResult<()> {
            let mut users = self.users.lock().await;
            if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
                user.is_active = is_active;
            }
            Ok(())
        }

        async fn record_failed_login(
            &self,
            user_id: UserId,
            locked_until: Option<DateTime<Utc>>,
        ) -> AppResult<()> {
            let mut users = self.users.lock().await;
            if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
                user.failed_login_count += 1;
                user.locked_until = locked_until;
            }
            Ok(())
        }

        async fn reset_failed_logins(&self, user_id: UserId) -> AppResult<()> {
            let mut users = self.users.lock().await;
            if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
                user.failed_login_count = 0;
                user.locked_until = None;
            }
            Ok(())
        }
    }

    struct FakePasswordHasher;

    impl PasswordHasher for FakePasswordHasher {
        fn hash(&self, password: &str) -> AppResult<String> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
            Ok(password_hash == format!("hashed:{password}"))
        }
    }

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
        service: UserService,
        repository: Arc<FakeUserRepository>,
        cache: Arc<FakePermissionCache>,
    }

    fn fixture() -> Fixture {
        let repository = Arc::new(FakeUserRepository::default());
        let cache = Arc::new(FakePermissionCache::default());
        let authorization = AuthorizationService::new(
            Arc::new(FakePermissionRepository::default()),
            cache.clone(),
        );
        let service = UserService::new(
            repository.clone(),
            Arc::new(FakePasswordHasher),
            authorization,
            Arc::new(FakeAuditRepository::default()),
        );

        Fixture {
            service,
            repository,
            cache,
        }
    }

    fn register_params(email: &str) -> RegisterParams {
        RegisterParams {
            email: email.to_owned(),
            password: "a perfectly fine passphrase".to_owned(),
            first_name: "Sam".to_owned(),
            last_name: "Rye".to_owned(),
        }
    }

    fn admin() -> EffectiveUser {
        EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Admin),
            permissions: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn first_registered_user_becomes_admin() {
        let fixture = fixture();

        let first = fixture.service.register(register_params("a@example.org")).await;
        assert!(first.is_ok());
        let second = fixture.service.register(register_params("b@example.org")).await;
        assert!(second.is_ok());

        let users = fixture.repository.users.lock().await;
        assert_eq!(users[0].role, "admin");
        assert_eq!(users[1].role, "volunteer");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let fixture = fixture();

        let first = fixture.service.register(register_params("a@example.org")).await;
        assert!(first.is_ok());

        let second = fixture.service.register(register_params("A@Example.org")).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_with_a_generic_message() {
        let fixture = fixture();
        let registered = fixture.service.register(register_params("a@example.org")).await;
        assert!(registered.is_ok());

        let unknown = fixture.service.login("b@example.org", "whatever12").await;
        let wrong = fixture.service.login("a@example.org", "wrong password").await;

        for outcome in [unknown, wrong] {
            match outcome {
                Err(AppError::Unauthorized(message)) => {
                    assert_eq!(message, "invalid email or password");
                }
                other => panic!("expected unauthorized, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_account() {
        let fixture = fixture();
        let registered = fixture.service.register(register_params("a@example.org")).await;
        assert!(registered.is_ok());

        for _ in 0..MAX_FAILED_LOGINS {
            let attempt = fixture.service.login("a@example.org", "wrong password").await;
            assert!(attempt.is_err());
        }

        // Even the correct password is rejected while locked.
        let locked = fixture
            .service
            .login("a@example.org", "a perfectly fine passphrase")
            .await;
        match locked {
            Err(AppError::Unauthorized(message)) => {
                assert!(message.contains("locked"));
            }
            other => panic!("expected lockout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn successful_login_clears_the_failure_counter() {
        let fixture = fixture();
        let registered = fixture.service.register(register_params("a@example.org")).await;
        assert!(registered.is_ok());

        let failed = fixture.service.login("a@example.org", "wrong password").await;
        assert!(failed.is_err());

        let succeeded = fixture
            .service
            .login("a@example.org", "a perfectly fine passphrase")
            .await;
        assert!(succeeded.is_ok());

        let users = fixture.repository.users.lock().await;
        assert_eq!(users[0].failed_login_count, 0);
    }

    #[tokio::test]
    async fn expired_lockout_allows_login_again() {
        let fixture = fixture();
        let registered = fixture.service.register(register_params("a@example.org")).await;
        assert!(registered.is_ok());

        {
            let mut users = fixture.repository.users.lock().await;
            users[0].failed_login_count = MAX_FAILED_LOGINS;
            users[0].locked_until = Some(Utc::now() - Duration::minutes(1));
        }

        let outcome = fixture
            .service
            .login("a@example.org", "a perfectly fine passphrase")
            .await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn deactivated_accounts_cannot_sign_in() {
        let fixture = fixture();
        let user_id = match fixture.service.register(register_params("a@example.org")).await {
            Ok(user_id) => user_id,
            Err(error) => panic!("registration failed: {error}"),
        };

        let deactivated = fixture.repository.set_active(user_id, false).await;
        assert!(deactivated.is_ok());

        let outcome = fixture
            .service
            .login("a@example.org", "a perfectly fine passphrase")
            .await;
        assert!(matches!(outcome, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn directory_requires_view_users() {
        let fixture = fixture();
        let volunteer = EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Volunteer),
            permissions: Role::Volunteer.default_permissions(),
        };

        let listed = fixture.service.list_users(&volunteer).await;
        assert!(matches!(listed, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn role_update_requires_manage_users_and_invalidates_cache() {
        let fixture = fixture();
        let user_id = match fixture.service.register(register_params("a@example.org")).await {
            Ok(user_id) => user_id,
            Err(error) => panic!("registration failed: {error}"),
        };

        let coordinator = EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Coordinator),
            permissions: Role::Coordinator.default_permissions(),
        };
        let denied = fixture
            .service
            .update_role(&coordinator, user_id, Role::Coordinator)
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        fixture
            .cache
            .entries
            .lock()
            .await
            .insert(user_id, std::collections::BTreeSet::new());

        let updated = fixture
            .service
            .update_role(&admin(), user_id, Role::Coordinator)
            .await;
        assert!(updated.is_ok());
        assert!(!fixture.cache.entries.lock().await.contains_key(&user_id));

        let users = fixture.repository.users.lock().await;
        assert_eq!(users[0].role, "coordinator");
    }

    #[tokio::test]
    async fn deactivation_requires_manage_users() {
        let fixture = fixture();
        let coordinator = EffectiveUser {
            user_id: UserId::new(),
            role: Some(Role::Coordinator),
            permissions: Role::Coordinator.default_permissions(),
        };

        let outcome = fixture
            .service
            .deactivate_user(&coordinator, UserId::new())
            .await;
        assert!(matches!(outcome, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn admins_cannot_deactivate_themselves() {
        let fixture = fixture();
        let actor = admin();

        let outcome = fixture.service.deactivate_user(&actor, actor.user_id).await;
        assert!(matches!(outcome, Err(AppError::Validation(_))));
    }
}
