//! In-memory secure backend.
//!
//! Non-persistent byte storage using DashMap for concurrent access. Used by
//! tests and by embedders that supply their own persistence.

use super::backend::SecureBackend;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory backend using DashMap.
///
/// `MemoryBackend` is `Clone`; clones share the same map, so a test can
/// keep a handle to inspect or corrupt raw bytes behind the store's back.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys, expired envelopes included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns true if raw bytes exist under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.data.clear();
    }
}

#[async_trait]
impl SecureBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get() {
        let backend = MemoryBackend::new();

        backend.put("key1", b"value1".to_vec()).await.unwrap();
        let value = backend.get("key1").await.unwrap();
        assert_eq!(value, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();

        backend.put("key1", b"value1".to_vec()).await.unwrap();
        backend.delete("key1").await.unwrap();
        backend.delete("key1").await.unwrap();

        assert_eq!(backend.get("key1").await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let backend = MemoryBackend::new();
        let handle = backend.clone();

        backend.put("k", b"v".to_vec()).await.unwrap();
        assert!(handle.contains_key("k"));
        assert_eq!(handle.len(), 1);

        handle.clear();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_overwrite() {
        let backend = MemoryBackend::new();

        backend.put("key", b"value1".to_vec()).await.unwrap();
        backend.put("key", b"value2".to_vec()).await.unwrap();

        assert_eq!(backend.get("key").await.unwrap(), Some(b"value2".to_vec()));
    }
}
