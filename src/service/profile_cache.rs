use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProfileCacheConfig;
use crate::models::profile::Profile;
use crate::service::clock::Clock;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CacheEntry {
    profile: Profile,
    captured_at: DateTime<Utc>,
}

/// Process-local profile snapshots keyed by user id, with a fixed TTL.
pub struct ProfileCache {
    ttl: chrono::Duration,
    cleanup_interval: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<Uuid, CacheEntry>>,
}

impl ProfileCache {
    pub fn new(config: &ProfileCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: config.ttl(),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_seconds.max(1)),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.captured_at >= self.ttl
    }

    /// Live entry for `user_id`. Expired entries are dropped on read.
    pub async fn get(&self, user_id: &Uuid) -> Option<Profile> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;

        match entries.get(user_id) {
            Some(entry) if !self.is_expired(entry, now) => Some(entry.profile.clone()),
            Some(_) => {
                entries.remove(user_id);
                debug!(user_id = %user_id, "profile cache entry expired");
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, profile: Profile) {
        let captured_at = self.clock.now();
        let mut entries = self.entries.lock().await;
        entries.insert(profile.id, CacheEntry { profile, captured_at });
    }

    pub async fn invalidate(&self, user_id: &Uuid) {
        self.entries.lock().await.remove(user_id);
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| now - entry.captured_at < self.ttl);
        before - entries.len()
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        let cleanup_interval = self.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cleanup_interval);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired().await;
                if evicted > 0 {
                    debug!(evicted, "evicted expired profile cache entries");
                }
            }
        });
    }
}
