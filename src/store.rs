//! Collection Store API
//!
//! Async CRUD surface over a [`CollectionRegistry`]. The registry sits behind a
//! single `RwLock`: reads share it, and every write holds it exclusively for the
//! whole validate-then-mutate step, so writes are applied in lock order and no
//! reader ever sees a half-applied change.

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{CollectionError, Result};
use crate::registry::{CollectionInfo, CollectionRegistry};

/// Shared, lock-protected collection registry
#[derive(Debug, Default)]
pub struct CollectionStore {
    registry: RwLock<CollectionRegistry>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection under `name` with the given schema text
    pub async fn register(&self, name: &str, schema_text: &str) -> Result<CollectionInfo> {
        let mut registry = self.registry.write().await;
        match registry.register(name, schema_text).map(|c| c.info(false)) {
            Ok(info) => {
                info!(
                    collection = name,
                    checksum = %info.checksum,
                    total = registry.len(),
                    "Registered collection"
                );
                Ok(info)
            }
            Err(e) => {
                warn!(collection = name, error = %e, "Collection registration rejected");
                Err(e)
            }
        }
    }

    /// Describe a registered collection, including its merged schema
    pub async fn describe(&self, name: &str) -> Result<CollectionInfo> {
        let registry = self.registry.read().await;
        registry
            .get(name)
            .map(|collection| collection.info(true))
            .ok_or_else(|| not_found(name))
    }

    /// All items of a collection in insertion order
    pub async fn list(&self, name: &str) -> Result<Vec<Value>> {
        let registry = self.registry.read().await;
        let collection = registry.get(name).ok_or_else(|| not_found(name))?;
        debug!(collection = name, count = collection.items().len(), "Listing items");
        Ok(collection.items().to_vec())
    }

    /// Validate `doc` with a fresh id and append it
    pub async fn create(&self, name: &str, doc: Value) -> Result<Value> {
        let mut registry = self.registry.write().await;
        let collection = registry.get_mut(name).ok_or_else(|| not_found(name))?;
        let item = collection.insert(doc).inspect_err(|e| log_rejected(name, e))?;
        info!(collection = name, id = item_id(&item), "Created item");
        Ok(item)
    }

    /// Replace the item `id` with `doc`; the path id always wins over any id in `doc`
    pub async fn update(&self, name: &str, id: &str, doc: Value) -> Result<Value> {
        let mut registry = self.registry.write().await;
        let collection = registry.get_mut(name).ok_or_else(|| not_found(name))?;
        let item = collection.replace(id, doc).inspect_err(|e| log_rejected(name, e))?;
        info!(collection = name, id, "Updated item");
        Ok(item)
    }

    /// Remove the item `id`
    pub async fn delete(&self, name: &str, id: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        let collection = registry.get_mut(name).ok_or_else(|| not_found(name))?;
        collection.remove(id).inspect_err(|e| log_rejected(name, e))?;
        info!(collection = name, id, "Deleted item");
        Ok(())
    }
}

fn not_found(name: &str) -> CollectionError {
    CollectionError::CollectionNotFound(name.to_string())
}

fn item_id(item: &Value) -> &str {
    item.get(crate::schema::ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn log_rejected(name: &str, error: &CollectionError) {
    warn!(collection = name, error = %error, issues = error.issues().len(), "Write rejected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const BOOKS: &str =
        r#"{"type":"object","properties":{"title":{"type":"string"}},"required":["title"]}"#;

    #[tokio::test]
    async fn test_unknown_collection() {
        let store = CollectionStore::new();
        assert!(matches!(
            store.list("books").await,
            Err(CollectionError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.create("books", json!({})).await,
            Err(CollectionError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.update("books", "x", json!({})).await,
            Err(CollectionError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.delete("books", "x").await,
            Err(CollectionError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_books_round() {
        let store = CollectionStore::new();
        let info = store.register("books", BOOKS).await.unwrap();
        assert_eq!(info.name, "books");

        let dune = store.create("books", json!({ "title": "Dune" })).await.unwrap();
        assert_eq!(dune["title"], "Dune");
        assert!(uuid::Uuid::parse_str(dune["id"].as_str().unwrap()).is_ok());

        assert_eq!(store.list("books").await.unwrap(), vec![dune.clone()]);

        let id = dune["id"].as_str().unwrap();
        let updated = store
            .update("books", id, json!({ "title": "Dune Messiah" }))
            .await
            .unwrap();
        assert_eq!(updated["id"], id);

        store.delete("books", id).await.unwrap();
        assert!(store.list("books").await.unwrap().is_empty());
        assert!(matches!(
            store.delete("books", id).await,
            Err(CollectionError::ItemNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_describe() {
        let store = CollectionStore::new();
        store.register("books", BOOKS).await.unwrap();
        store.create("books", json!({ "title": "Dune" })).await.unwrap();

        let info = store.describe("books").await.unwrap();
        assert_eq!(info.item_count, Some(1));
        let schema = info.schema.unwrap();
        assert_eq!(schema["properties"]["id"]["type"], "string");
        assert_eq!(schema["additionalProperties"], false);

        assert!(matches!(
            store.describe("films").await,
            Err(CollectionError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_string_item_rejected() {
        let store = CollectionStore::new();
        store
            .register("loose", r#"{"type": ["object", "string"]}"#)
            .await
            .unwrap();

        let err = store.create("loose", json!("hello")).await.unwrap_err();
        assert!(matches!(err, CollectionError::ValidationFailed(_)));
        assert!(store.list("loose").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_all_land() {
        let store = Arc::new(CollectionStore::new());
        store.register("books", BOOKS).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.create("books", json!({ "title": format!("Book {}", i) })).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.list("books").await.unwrap().len(), 50);
    }
}
