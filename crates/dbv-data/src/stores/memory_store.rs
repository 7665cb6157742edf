//! In-memory key/value store

use std::sync::Arc;

use ahash::AHashMap;
use dbv_core::{KeyValueStore, StoreResult};
use parking_lot::RwLock;
use serde_json::Value;

/// Key/value store held in memory.
///
/// Clones share the same entries, so a handle kept outside the engine sees
/// every write the engine makes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<AHashMap<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `entries`
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Value currently stored under `key`
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    /// Stored keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clear the store
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
