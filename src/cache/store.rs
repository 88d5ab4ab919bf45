//! Two-tier cache store: a memory map mirrored to persistent storage.
//!
//! Entries are JSON envelopes stamped with a write time and a format
//! version. Memory is always checked first; on a memory miss the persistent
//! tier is consulted and, when valid, used to repopulate memory. Persistent
//! failures never propagate to callers - the store degrades to memory-only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use super::storage::{StorageError, StoragePort};

/// Bump when the persisted entry shape changes; entries written under an
/// older version are discarded on read.
pub const CACHE_FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub cached_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u32,
}

impl CacheEntry {
    fn new(data: Value) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
            version: CACHE_FORMAT_VERSION,
        }
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        Utc::now() - self.cached_at > max_age
    }
}

/// Key-addressed cache of JSON-serializable collections.
pub struct CacheStore {
    namespace: String,
    /// Age past which `purge_expired` discards persisted entries.
    default_ttl: Duration,
    memory: Mutex<HashMap<String, CacheEntry>>,
    storage: Arc<dyn StoragePort>,
}

impl CacheStore {
    pub fn new(storage: Arc<dyn StoragePort>, namespace: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            namespace: namespace.into(),
            default_ttl,
            memory: Mutex::new(HashMap::new()),
            storage,
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn owns(&self, storage_key: &str) -> bool {
        storage_key.starts_with(&format!("{}:", self.namespace))
    }

    /// Look up `key`, requiring the entry to be no older than `max_age`.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        self.lookup(key, Some(max_age))
    }

    /// Look up `key` with no age check. Used by the cache-only strategy and
    /// the network-first stale fallback.
    pub fn get_stale(&self, key: &str) -> Option<Value> {
        self.lookup(key, None)
    }

    fn lookup(&self, key: &str, max_age: Option<Duration>) -> Option<Value> {
        // Memory tier. Both tiers share the write timestamp, so an entry
        // that is expired here is expired below too.
        {
            let memory = self.memory.lock().unwrap();
            if let Some(entry) = memory.get(key) {
                if entry.version != CACHE_FORMAT_VERSION {
                    // Stale-format leftover; fall through to remove
                } else if max_age.map(|a| entry.is_expired(a)).unwrap_or(false) {
                    return None;
                } else {
                    return Some(entry.data.clone());
                }
            }
        }

        // Persistent tier
        let storage_key = self.storage_key(key);
        let raw = match self.storage.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key = key, error = %e, "Persistent cache read failed");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = key, error = %e, "Corrupt cache entry, removing");
                let _ = self.storage.remove(&storage_key);
                return None;
            }
        };

        if entry.version != CACHE_FORMAT_VERSION {
            debug!(key = key, version = entry.version, "Cache entry from older format, removing");
            let _ = self.storage.remove(&storage_key);
            return None;
        }

        if max_age.map(|a| entry.is_expired(a)).unwrap_or(false) {
            return None;
        }

        let data = entry.data.clone();
        self.memory.lock().unwrap().insert(key.to_string(), entry);
        Some(data)
    }

    /// Store `value` under `key`, stamped with the current time.
    ///
    /// The write always succeeds in memory. If the persistent tier reports
    /// it is full, this namespace's expired entries are purged and the
    /// write retried once; after that the entry stays memory-only.
    pub fn set(&self, key: &str, value: &Value) {
        let entry = CacheEntry::new(value.clone());
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to serialize cache entry");
                self.memory.lock().unwrap().insert(key.to_string(), entry);
                return;
            }
        };

        self.memory.lock().unwrap().insert(key.to_string(), entry);

        let storage_key = self.storage_key(key);
        match self.storage.set(&storage_key, &raw) {
            Ok(()) => {}
            Err(StorageError::Full) => {
                let purged = self.purge_expired();
                debug!(key = key, purged = purged, "Persistent store full, purged expired entries");
                if let Err(e) = self.storage.set(&storage_key, &raw) {
                    warn!(key = key, error = %e, "Cache entry kept in memory only");
                }
            }
            Err(e) => {
                warn!(key = key, error = %e, "Persistent cache write failed");
            }
        }
    }

    pub fn remove(&self, key: &str) {
        self.memory.lock().unwrap().remove(key);
        if let Err(e) = self.storage.remove(&self.storage_key(key)) {
            debug!(key = key, error = %e, "Persistent cache remove failed");
        }
    }

    /// Wipe every entry in this store's namespace. Unrelated keys sharing
    /// the same physical storage are untouched.
    pub fn clear(&self) {
        self.memory.lock().unwrap().clear();
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Could not enumerate persistent cache keys");
                return;
            }
        };
        for storage_key in keys.iter().filter(|k| self.owns(k)) {
            if let Err(e) = self.storage.remove(storage_key) {
                debug!(key = %storage_key, error = %e, "Persistent cache remove failed");
            }
        }
    }

    /// Drop persisted entries in this namespace that are expired, corrupt,
    /// or from an older format version. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, "Could not enumerate persistent cache keys");
                return 0;
            }
        };

        let mut purged = 0;
        for storage_key in keys.iter().filter(|k| self.owns(k)) {
            let drop = match self.storage.get(storage_key) {
                Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => {
                        entry.version != CACHE_FORMAT_VERSION || entry.is_expired(self.default_ttl)
                    }
                    Err(_) => true, // corrupt
                },
                Ok(None) => false,
                Err(_) => false,
            };
            if drop && self.storage.remove(storage_key).is_ok() {
                purged += 1;
            }
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::super::storage::MemoryStorage;
    use super::*;

    fn store_with(storage: Arc<MemoryStorage>) -> CacheStore {
        CacheStore::new(storage, "el-test", Duration::minutes(60))
    }

    #[test]
    fn test_set_get_round_trip() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        let value = serde_json::json!([{"id": "rec1"}]);
        store.set("stories:all", &value);
        assert_eq!(store.get("stories:all", Duration::hours(24)), Some(value));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        store.set("k", &serde_json::json!(1));

        // Rewrite the persisted entry two hours into the past and drop the
        // memory copy so the persistent tier is consulted.
        let raw = storage.get("el-test:k").unwrap().unwrap();
        let mut entry: CacheEntry = serde_json::from_str(&raw).unwrap();
        entry.cached_at = Utc::now() - Duration::hours(2);
        storage
            .set("el-test:k", &serde_json::to_string(&entry).unwrap())
            .unwrap();
        store.memory.lock().unwrap().clear();

        assert_eq!(store.get("k", Duration::minutes(30)), None);
        // No age check still sees it
        assert_eq!(store.get_stale("k"), Some(serde_json::json!(1)));
    }

    #[test]
    fn test_corrupt_persisted_entry_removed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("el-test:bad", "not json{{").unwrap();
        let store = store_with(storage.clone());

        assert_eq!(store.get("bad", Duration::hours(1)), None);
        assert_eq!(storage.get("el-test:bad").unwrap(), None);
    }

    #[test]
    fn test_version_mismatch_treated_absent() {
        let storage = Arc::new(MemoryStorage::new());
        let entry = serde_json::json!({
            "data": [1, 2, 3],
            "cached_at": Utc::now().to_rfc3339(),
            "version": CACHE_FORMAT_VERSION - 1,
        });
        storage.set("el-test:old", &entry.to_string()).unwrap();
        let store = store_with(storage.clone());

        assert_eq!(store.get("old", Duration::hours(1)), None);
        assert_eq!(storage.get("el-test:old").unwrap(), None);
    }

    #[test]
    fn test_clear_scoped_to_namespace() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("unrelated", "keep me").unwrap();
        let store = store_with(storage.clone());
        store.set("a", &serde_json::json!(1));
        store.set("b", &serde_json::json!(2));

        store.clear();

        assert_eq!(store.get("a", Duration::hours(1)), None);
        assert_eq!(store.get("b", Duration::hours(1)), None);
        assert_eq!(storage.get("unrelated").unwrap().as_deref(), Some("keep me"));
    }

    #[test]
    fn test_full_storage_purges_and_retries() {
        // Capacity fits roughly one entry; the second write triggers the
        // purge-and-retry path.
        let storage = Arc::new(MemoryStorage::with_capacity_bytes(200));
        let store = CacheStore::new(storage.clone(), "el-test", Duration::minutes(0));
        store.set("first", &serde_json::json!("x".repeat(80)));

        std::thread::sleep(std::time::Duration::from_millis(5));

        // With default_ttl zero the first entry is already expired, so the
        // retry succeeds after purging it.
        store.set("second", &serde_json::json!("y".repeat(80)));
        assert!(storage.get("el-test:second").unwrap().is_some());
        assert_eq!(storage.get("el-test:first").unwrap(), None);
        // The first entry survives in memory regardless
        assert_eq!(store.get_stale("first"), Some(serde_json::json!("x".repeat(80))));
    }

    #[test]
    fn test_persistent_tier_repopulates_memory() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_with(storage.clone());
        store.set("k", &serde_json::json!({"n": 7}));
        store.memory.lock().unwrap().clear();

        assert_eq!(
            store.get("k", Duration::hours(1)),
            Some(serde_json::json!({"n": 7}))
        );
        assert!(store.memory.lock().unwrap().contains_key("k"));
    }
}
