//! In-memory permission cache with a bounded TTL.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use sandwich_application::PermissionCache;
use sandwich_core::UserId;
use sandwich_domain::Permission;

/// Default freshness window for cached permission sets.
pub const DEFAULT_PERMISSION_CACHE_TTL: Duration = Duration::from_secs(30);

/// In-memory implementation of the permission cache port.
///
/// Entries expire after the TTL; grant mutations and role changes
/// invalidate eagerly, so the TTL only bounds staleness for changes made
/// outside the application (e.g. manual SQL).
pub struct InMemoryPermissionCache {
    ttl: Duration,
    entries: Mutex<HashMap<UserId, CacheEntry>>,
}

struct CacheEntry {
    stored_at: Instant,
    permissions: BTreeSet<Permission>,
}

impl InMemoryPermissionCache {
    /// Creates a cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new(DEFAULT_PERMISSION_CACHE_TTL)
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, user_id: UserId) -> Option<BTreeSet<Permission>> {
        let mut entries = self.entries.lock().await;
        match entries.get(&user_id) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                Some(entry.permissions.clone())
            }
            Some(_) => {
                entries.remove(&user_id);
                None
            }
            None => None,
        }
    }

    async fn put(&self, user_id: UserId, permissions: BTreeSet<Permission>) {
        self.entries.lock().await.insert(
            user_id,
            CacheEntry {
                stored_at: Instant::now(),
                permissions,
            },
        );
    }

    async fn invalidate(&self, user_id: UserId) {
        self.entries.lock().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::time::Duration;

    use sandwich_application::PermissionCache as _;
    use sandwich_core::UserId;
    use sandwich_domain::Permission;

    use super::InMemoryPermissionCache;

    #[tokio::test]
    async fn entries_are_returned_until_the_ttl_elapses() {
        let cache = InMemoryPermissionCache::new(Duration::from_millis(50));
        let user_id = UserId::new();
        let permissions = BTreeSet::from([Permission::ViewProjects]);

        cache.put(user_id, permissions.clone()).await;
        assert_eq!(cache.get(user_id).await, Some(permissions));

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get(user_id).await, None);
    }

    #[tokio::test]
    async fn invalidation_is_immediate() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(3600));
        let user_id = UserId::new();

        cache
            .put(user_id, BTreeSet::from([Permission::ManageUsers]))
            .await;
        cache.invalidate(user_id).await;

        assert_eq!(cache.get(user_id).await, None);
    }

    #[tokio::test]
    async fn users_are_cached_independently() {
        let cache = InMemoryPermissionCache::new(Duration::from_secs(3600));
        let first = UserId::new();
        let second = UserId::new();

        cache
            .put(first, BTreeSet::from([Permission::ViewProjects]))
            .await;
        cache.invalidate(second).await;

        assert!(cache.get(first).await.is_some());
        assert!(cache.get(second).await.is_none());
    }
}
