//! Key-value storage backends for the cache
//!
//! The cache only needs four primitives: batched get, batched set, batched
//! remove, and a listing of every stored key. Each call is atomic on its
//! own; nothing spans calls.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::StoreError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Generic async key-value store holding JSON values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Missing keys are simply absent from the map.
    async fn get(&self, keys: &[String]) -> StoreResult<HashMap<String, Value>>;

    /// Write every entry in `items`, replacing existing values
    async fn set(&self, items: HashMap<String, Value>) -> StoreResult<()>;

    /// Delete the given keys. Unknown keys are ignored.
    async fn remove(&self, keys: &[String]) -> StoreResult<()>;

    /// Every key currently stored
    async fn list_all_keys(&self) -> StoreResult<Vec<String>>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, keys: &[String]) -> StoreResult<HashMap<String, Value>> {
        (**self).get(keys).await
    }

    async fn set(&self, items: HashMap<String, Value>) -> StoreResult<()> {
        (**self).set(items).await
    }

    async fn remove(&self, keys: &[String]) -> StoreResult<()> {
        (**self).remove(keys).await
    }

    async fn list_all_keys(&self) -> StoreResult<Vec<String>> {
        (**self).list_all_keys().await
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[String]) -> StoreResult<HashMap<String, Value>> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, Value>) -> StoreResult<()> {
        self.entries.write().await.extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn list_all_keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
