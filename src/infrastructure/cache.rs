// Tagged query cache
//
// Listing and detail reads are cached under a key and a set of tags;
// mutations invalidate by tag.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

struct Entry {
    value: Value,
    tags: Vec<String>,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    /// tag -> keys carrying it
    index: HashMap<String, HashSet<String>>,
    /// bumped by every invalidation
    epoch: u64,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> bool {
        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        for tag in &entry.tags {
            if let Some(keys) = self.index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.index.remove(tag);
                }
            }
        }
        true
    }

    fn evict_expired(&mut self, ttl: Duration) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.stored_at.elapsed() >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.remove(&key);
        }
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.stored_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.remove(&key);
        }
    }
}

/// Process-local cache of serialized query results, invalidated by tag
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone)]
pub struct TagCache {
    state: Arc<RwLock<CacheState>>,
    ttl: Duration,
    max_entries: usize,
}

impl TagCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            ttl,
            max_entries,
        }
    }

    /// Returns the cached value if present, unexpired and decodable
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.read().await;
        let entry = state.entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Stores a value under `key`, replacing any previous entry
    pub async fn insert<T: Serialize>(&self, key: &str, tags: &[String], value: &T) {
        self.store(key, tags, value, None).await;
    }

    /// Stores unless an invalidation happened after `loaded_at`
    async fn store<T: Serialize>(&self, key: &str, tags: &[String], value: &T, loaded_at: Option<u64>) {
        if self.max_entries == 0 {
            return;
        }
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Skipping cache insert for unserializable value");
                return;
            }
        };

        let mut state = self.state.write().await;
        if loaded_at.is_some_and(|epoch| epoch != state.epoch) {
            tracing::debug!(key, "Skipping cache insert for a load raced by an invalidation");
            return;
        }
        state.remove(key);
        if state.entries.len() >= self.max_entries {
            state.evict_expired(self.ttl);
        }
        while state.entries.len() >= self.max_entries {
            state.evict_oldest();
        }

        for tag in tags {
            state
                .index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        state.entries.insert(
            key.to_string(),
            Entry {
                value,
                tags: tags.to_vec(),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry carrying any of `tags`; returns how many were dropped
    pub async fn invalidate(&self, tags: &[String]) -> usize {
        let mut state = self.state.write().await;
        state.epoch += 1;
        let keys: HashSet<String> = tags
            .iter()
            .filter_map(|tag| state.index.get(tag))
            .flatten()
            .cloned()
            .collect();
        let removed = keys.iter().filter(|key| state.remove(key)).count();
        if removed > 0 {
            tracing::debug!(?tags, removed, "Cache entries invalidated");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Read-through helper: returns the cached value or runs `load` and caches it
    pub async fn cached<T, E, F, Fut>(&self, key: String, tags: Vec<String>, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(hit);
        }
        let epoch = self.state.read().await.epoch;
        let value = load().await?;
        self.store(&key, &tags, &value, Some(epoch)).await;
        Ok(value)
    }
}

/// Tag names shared by reads and invalidations
pub mod tags {
    use uuid::Uuid;

    use crate::domain::address::PartyRef;

    pub fn user_organizations(user_id: Uuid) -> String {
        format!("user:{}:organizations", user_id)
    }

    pub fn organization(organization_id: Uuid) -> String {
        format!("organization:{}", organization_id)
    }

    pub fn members(organization_id: Uuid) -> String {
        format!("organization:{}:members", organization_id)
    }

    pub fn clients(organization_id: Uuid) -> String {
        format!("organization:{}:clients", organization_id)
    }

    pub fn suppliers(organization_id: Uuid) -> String {
        format!("organization:{}:suppliers", organization_id)
    }

    pub fn products(organization_id: Uuid) -> String {
        format!("organization:{}:products", organization_id)
    }

    pub fn product_categories(organization_id: Uuid) -> String {
        format!("organization:{}:product-categories", organization_id)
    }

    pub fn fiscal_years(organization_id: Uuid) -> String {
        format!("organization:{}:fiscal-years", organization_id)
    }

    pub fn client(id: Uuid) -> String {
        format!("client:{}", id)
    }

    pub fn supplier(id: Uuid) -> String {
        format!("supplier:{}", id)
    }

    pub fn product(id: Uuid) -> String {
        format!("product:{}", id)
    }

    /// `client:{id}` or `supplier:{id}`
    pub fn party(owner: PartyRef) -> String {
        owner.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> TagCache {
        TagCache::new(Duration::from_secs(60), 10)
    }

    #[tokio::test]
    async fn stores_and_returns_values() {
        let cache = cache();
        cache
            .insert("clients:1", &["organization:1:clients".to_string()], &vec![1, 2, 3])
            .await;
        assert_eq!(cache.get::<Vec<i32>>("clients:1").await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn invalidation_drops_every_tagged_entry() {
        let cache = cache();
        let tag = "organization:1:clients".to_string();
        cache.insert("a", &[tag.clone()], &1).await;
        cache.insert("b", &[tag.clone(), "client:9".to_string()], &2).await;
        cache.insert("c", &["organization:2:clients".to_string()], &3).await;

        assert_eq!(cache.invalidate(&[tag]).await, 2);
        assert_eq!(cache.get::<i32>("a").await, None);
        assert_eq!(cache.get::<i32>("b").await, None);
        assert_eq!(cache.get::<i32>("c").await, Some(3));

        // the index no longer references dropped keys
        assert_eq!(cache.invalidate(&["client:9".to_string()]).await, 0);
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = TagCache::new(Duration::ZERO, 10);
        cache.insert("a", &[], &1).await;
        assert_eq!(cache.get::<i32>("a").await, None);
    }

    #[tokio::test]
    async fn capacity_evicts_oldest() {
        let cache = TagCache::new(Duration::from_secs(60), 2);
        cache.insert("a", &[], &1).await;
        cache.insert("b", &[], &2).await;
        cache.insert("c", &[], &3).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get::<i32>("a").await, None);
        assert_eq!(cache.get::<i32>("c").await, Some(3));
    }

    #[tokio::test]
    async fn cached_loads_once() {
        let cache = cache();
        let first: Result<i32, String> = cache.cached("k".into(), vec![], || async { Ok(1) }).await;
        let second: Result<i32, String> = cache.cached("k".into(), vec![], || async { Ok(2) }).await;
        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
    }

    #[tokio::test]
    async fn load_raced_by_invalidation_is_not_cached() {
        let cache = cache();
        let tag = "organization:1:members".to_string();
        let loaded: Result<i32, String> = cache
            .cached("members:1".into(), vec![tag.clone()], || async {
                // a mutation commits while the read is in flight
                cache.invalidate(&[tag.clone()]).await;
                Ok(1)
            })
            .await;
        assert_eq!(loaded, Ok(1));
        assert_eq!(cache.get::<i32>("members:1").await, None);

        let reloaded: Result<i32, String> = cache
            .cached("members:1".into(), vec![tag], || async { Ok(2) })
            .await;
        assert_eq!(reloaded, Ok(2));
        assert_eq!(cache.get::<i32>("members:1").await, Some(2));
    }

    #[tokio::test]
    async fn failed_loads_are_not_cached() {
        let cache = cache();
        let failed: Result<i32, String> =
            cache.cached("k".into(), vec![], || async { Err("boom".to_string()) }).await;
        assert!(failed.is_err());
        assert!(cache.is_empty().await);
    }
}
