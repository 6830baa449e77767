//! Knowledge storage trait and the in-memory backend
//!
//! Durability across restarts is an external collaborator's concern: the
//! exchange writes through this trait, and a persistent backend can be
//! swapped in without touching exchange logic.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::{KnowledgeError, KnowledgeItem, Result};

/// Trait for knowledge storage backends
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Insert a sealed item; ids are unique so collisions are a backend fault
    async fn insert(&self, item: KnowledgeItem) -> Result<()>;

    /// Fetch one item by id
    async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>>;

    /// Snapshot of every stored item, unordered
    async fn all(&self) -> Result<Vec<KnowledgeItem>>;

    /// Number of stored items
    async fn len(&self) -> Result<usize>;

    /// Remove everything; returns how many items were dropped
    async fn clear(&self) -> Result<usize>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// In-memory store backed by a concurrent map
#[derive(Clone)]
pub struct InMemoryKnowledgeStore {
    items: Arc<DashMap<String, KnowledgeItem>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryKnowledgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    async fn insert(&self, item: KnowledgeItem) -> Result<()> {
        if self.items.contains_key(&item.id) {
            return Err(KnowledgeError::store(format!(
                "duplicate knowledge id: {}",
                item.id
            )));
        }
        tracing::debug!("Stored knowledge item {} ({})", item.id, item.category);
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<KnowledgeItem>> {
        Ok(self.items.get(id).map(|e| e.value().clone()))
    }

    async fn all(&self) -> Result<Vec<KnowledgeItem>> {
        Ok(self.items.iter().map(|e| e.value().clone()).collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.items.len())
    }

    async fn clear(&self) -> Result<usize> {
        let count = self.items.len();
        self.items.clear();
        tracing::info!("Cleared {} knowledge items", count);
        Ok(count)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnowledgeDraft;

    fn item() -> KnowledgeItem {
        KnowledgeItem::seal(KnowledgeDraft::new("infra", "optimization", "Cache Pattern"))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemoryKnowledgeStore::new();
        let stored = item();
        let id = stored.id.clone();

        store.insert(stored).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Cache Pattern");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemoryKnowledgeStore::new();
        let stored = item();

        store.insert(stored.clone()).await.unwrap();
        let result = store.insert(stored).await;
        assert!(matches!(result, Err(KnowledgeError::Store(_))));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemoryKnowledgeStore::new();
        store.insert(item()).await.unwrap();
        store.insert(item()).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let store = Arc::new(InMemoryKnowledgeStore::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(item()).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 10);
    }
}
