//! Shopping list service
//!
//! A positional list of `{name, quantity}` items persisted to a flat JSON file.
//! Items are addressed by index; deleting one shifts the rest down.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{CollectionError, Result};
use crate::files::JsonFileStore;
use crate::schema::{CompiledSchema, DocumentValidator, ValidationIssue};

/// Default data file for the shopping list
pub const DEFAULT_DATA_FILE: &str = "shopping-list.json";

fn item_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "quantity": { "type": "integer", "minimum": 1 }
        },
        "required": ["name", "quantity"]
    })
}

/// Coerce a numeric-string quantity (`"2"`) into an integer before validation
fn normalize(mut item: Value) -> Value {
    if let Some(quantity) = item.get_mut("quantity") {
        if let Some(parsed) = quantity.as_str().and_then(|s| s.trim().parse::<i64>().ok()) {
            *quantity = Value::from(parsed);
        }
    }
    item
}

/// The shopping list
#[derive(Debug)]
pub struct ShoppingList {
    file: JsonFileStore,
    validator: CompiledSchema,
}

impl ShoppingList {
    pub fn new(file: JsonFileStore) -> Result<Self> {
        Ok(Self {
            file,
            validator: CompiledSchema::from_value(item_schema())?,
        })
    }

    /// Make sure the backing file exists
    pub async fn init(&self) -> Result<()> {
        self.file.ensure_exists().await
    }

    /// All items in list order
    pub async fn list(&self) -> Result<Vec<Value>> {
        self.file.read().await
    }

    /// Validate and append an item
    pub async fn append(&self, item: Value) -> Result<Value> {
        let item = self.checked(item)?;
        let stored = item.clone();
        let len = self
            .file
            .modify(move |items| {
                items.push(item);
                Ok(items.len())
            })
            .await?;
        info!(index = len - 1, "Appended shopping list item");
        Ok(stored)
    }

    /// Overwrite the item at `index`.
    ///
    /// Validation runs before the index lookup, so an invalid body is reported
    /// as such even when the index is out of range.
    pub async fn replace(&self, index: usize, item: Value) -> Result<Value> {
        let item = self.checked(item)?;
        let stored = item.clone();
        self.file
            .modify(move |items| {
                let slot = items
                    .get_mut(index)
                    .ok_or(CollectionError::IndexOutOfRange(index))?;
                *slot = item;
                Ok(())
            })
            .await?;
        info!(index, "Replaced shopping list item");
        Ok(stored)
    }

    /// Shallow-merge `partial` onto the item at `index`
    pub async fn patch(&self, index: usize, partial: Value) -> Result<Value> {
        let Value::Object(fields) = partial else {
            return Err(CollectionError::ValidationFailed(vec![ValidationIssue::new(
                "",
                "type",
                "patch body must be a JSON object",
            )]));
        };

        let merged = self
            .file
            .modify(|items| {
                let slot = items
                    .get_mut(index)
                    .ok_or(CollectionError::IndexOutOfRange(index))?;
                let mut merged = slot.clone();
                if let Value::Object(target) = &mut merged {
                    target.extend(fields);
                }
                let merged = self.checked(merged)?;
                *slot = merged.clone();
                Ok(merged)
            })
            .await?;
        info!(index, "Patched shopping list item");
        Ok(merged)
    }

    /// Remove the item at `index`
    pub async fn remove(&self, index: usize) -> Result<Value> {
        let removed = self
            .file
            .modify(|items| {
                if index >= items.len() {
                    return Err(CollectionError::IndexOutOfRange(index));
                }
                Ok(items.remove(index))
            })
            .await?;
        info!(index, "Removed shopping list item");
        Ok(removed)
    }

    fn checked(&self, item: Value) -> Result<Value> {
        let item = normalize(item);
        self.validator.validate(&item).map_err(|issues| {
            warn!(issues = issues.len(), "Invalid shopping list item");
            CollectionError::ValidationFailed(issues)
        })?;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn shopping_list() -> (TempDir, ShoppingList) {
        let dir = tempdir().unwrap();
        let file = JsonFileStore::new(dir.path().join(DEFAULT_DATA_FILE));
        (dir, ShoppingList::new(file).unwrap())
    }

    #[test]
    fn test_normalize_quantity() {
        assert_eq!(normalize(json!({"quantity": "2"}))["quantity"], 2);
        assert_eq!(normalize(json!({"quantity": "two"}))["quantity"], "two");
        assert_eq!(normalize(json!({"quantity": 3}))["quantity"], 3);
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let (_dir, list) = shopping_list();
        assert!(list.list().await.unwrap().is_empty());

        list.append(json!({"name": "Flour", "quantity": 1})).await.unwrap();
        assert_eq!(
            list.list().await.unwrap(),
            vec![json!({"name": "Flour", "quantity": 1})]
        );
    }

    #[tokio::test]
    async fn test_append_rejects_invalid() {
        let (_dir, list) = shopping_list();
        let err = list.append(json!({"name": "", "quantity": 0})).await.unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(list.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replace() {
        let (_dir, list) = shopping_list();
        list.append(json!({"name": "Flour", "quantity": 1})).await.unwrap();

        list.replace(0, json!({"name": "Milk", "quantity": "2"})).await.unwrap();
        assert_eq!(list.list().await.unwrap()[0], json!({"name": "Milk", "quantity": 2}));

        assert!(matches!(
            list.replace(1, json!({"name": "Milk", "quantity": 2})).await,
            Err(CollectionError::IndexOutOfRange(1))
        ));
        assert!(matches!(
            list.replace(5, json!({"name": ""})).await,
            Err(CollectionError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_patch_merges_fields() {
        let (_dir, list) = shopping_list();
        list.append(json!({"name": "Flour", "quantity": 1})).await.unwrap();

        let patched = list.patch(0, json!({"quantity": 4})).await.unwrap();
        assert_eq!(patched, json!({"name": "Flour", "quantity": 4}));
        assert_eq!(list.list().await.unwrap()[0], patched);

        assert!(list.patch(0, json!({"quantity": 0})).await.is_err());
        assert_eq!(list.list().await.unwrap()[0]["quantity"], 4);
        assert!(matches!(
            list.patch(3, json!({"quantity": 2})).await,
            Err(CollectionError::IndexOutOfRange(3))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let (_dir, list) = shopping_list();
        list.append(json!({"name": "Flour", "quantity": 1})).await.unwrap();
        list.append(json!({"name": "Milk", "quantity": 2})).await.unwrap();

        list.remove(0).await.unwrap();
        assert_eq!(list.list().await.unwrap()[0]["name"], "Milk");
        assert!(matches!(
            list.remove(1).await,
            Err(CollectionError::IndexOutOfRange(1))
        ));
    }
}
