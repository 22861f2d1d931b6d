use crate::{Definition, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract for definition records.
///
/// `save` is an upsert: a record without an id is inserted under a freshly
/// assigned id, a record with an id replaces whatever is stored under it.
/// Implementations must be safe under concurrent saves from different
/// definitions.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn save(&self, definition: Definition) -> Result<Definition, StoreError>;

    async fn find_all(&self) -> Result<Vec<Definition>, StoreError>;

    async fn remove(&self, id: &str) -> Result<(), StoreError>;
}

/// In-memory store keyed by definition id.
pub struct MemoryDefinitionStore {
    records: RwLock<HashMap<String, Definition>>,
}

impl MemoryDefinitionStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryDefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DefinitionStore for MemoryDefinitionStore {
    async fn save(&self, mut definition: Definition) -> Result<Definition, StoreError> {
        let id = match definition.id.clone() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                definition.id = Some(id.clone());
                id
            }
        };
        definition.updated_at = Some(Utc::now());

        let mut records = self.records.write().await;
        records.insert(id, definition.clone());
        Ok(definition)
    }

    async fn find_all(&self) -> Result<Vec<Definition>, StoreError> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        records.remove(id);
        Ok(())
    }
}

/// The two storage targets a descriptor can be routed to.
#[derive(Clone)]
pub struct DefinitionStores {
    pub tiles: Arc<dyn DefinitionStore>,
    pub activity_streams: Arc<dyn DefinitionStore>,
}

impl DefinitionStores {
    /// Fresh in-memory pair, used by the binaries and by tests.
    pub fn in_memory() -> Self {
        Self {
            tiles: Arc::new(MemoryDefinitionStore::new()),
            activity_streams: Arc::new(MemoryDefinitionStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_id_when_absent() {
        let store = MemoryDefinitionStore::new();
        let saved = store.save(Definition::default()).await.unwrap();
        assert!(saved.id.is_some());
        assert!(saved.updated_at.is_some());
    }

    #[tokio::test]
    async fn save_with_id_updates_in_place() {
        let store = MemoryDefinitionStore::new();
        let first = store.save(Definition::default()).await.unwrap();

        let mut second = first.clone();
        second
            .extra
            .insert("name".to_string(), serde_json::json!("renamed"));
        store.save(second).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].extra.get("name").and_then(|v| v.as_str()),
            Some("renamed")
        );
    }

    #[tokio::test]
    async fn remove_deletes_the_record() {
        let store = MemoryDefinitionStore::new();
        let saved = store.save(Definition::default()).await.unwrap();
        store.remove(saved.id.as_deref().unwrap()).await.unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
