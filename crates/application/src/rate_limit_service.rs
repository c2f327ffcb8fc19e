use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sandwich_core::{AppError, AppResult};

/// Configuration for one fixed-window rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// Category name prefixed onto the key (e.g. "login").
    pub category: String,
    /// Maximum attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }
}

/// Information about the current window for a key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempts in the current window, including this one.
    pub attempt_count: i32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}

/// Repository port for rate limit persistence.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key and returns the updated count.
    ///
    /// An expired window resets the counter.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes entries whose window started before the cutoff.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Application service for request rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records an attempt under `"{category}:{key}"` and rejects once the
    /// rule's budget for the window is spent.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes stale windows. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use tokio::sync::Mutex;

    use sandwich_core::{AppError, AppResult};

    use super::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};

    #[derive(Default)]
    struct FakeRateLimitRepository {
        counters: Mutex<HashMap<String, i32>>,
    }

    #[async_trait]
    impl RateLimitRepository for FakeRateLimitRepository {
        async fn record_attempt(
            &self,
            key: &str,
            _window_duration_seconds: i64,
        ) -> AppResult<AttemptInfo> {
            let mut counters = self.counters.lock().await;
            let count = counters.entry(key.to_owned()).or_insert(0);
            *count += 1;
            Ok(AttemptInfo {
                attempt_count: *count,
                window_started_at: Utc::now(),
            })
        }

        async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn attempts_within_budget_pass_and_excess_is_rejected() {
        let repository = Arc::new(FakeRateLimitRepository::default());
        let service = RateLimitService::new(repository);
        let rule = RateLimitRule::new("login", 3, 900);

        for _ in 0..3 {
            let outcome = service.check_rate_limit(&rule, "10.0.0.1").await;
            assert!(outcome.is_ok());
        }

        let rejected = service.check_rate_limit(&rule, "10.0.0.1").await;
        assert!(matches!(rejected, Err(AppError::RateLimited(_))));

        // A different key has its own budget.
        let other = service.check_rate_limit(&rule, "10.0.0.2").await;
        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn categories_do_not_share_budgets() {
        let repository = Arc::new(FakeRateLimitRepository::default());
        let service = RateLimitService::new(repository);
        let login = RateLimitRule::new("login", 1, 900);
        let register = RateLimitRule::new("register", 1, 900);

        let first = service.check_rate_limit(&login, "10.0.0.1").await;
        assert!(first.is_ok());
        let second = service.check_rate_limit(&register, "10.0.0.1").await;
        assert!(second.is_ok());
    }
}
