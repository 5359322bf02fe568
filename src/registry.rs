//! Collection Registry
//!
//! Maps collection names to their compiled validator and item list. Names are
//! registered once; there is no way to replace a schema or drop a collection.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::checksum::Checksum;
use crate::error::{CollectionError, Result};
use crate::schema::{CompiledSchema, DocumentValidator, ValidationIssue, ID_FIELD};

/// Letters and hyphens only
const COLLECTION_NAME_PATTERN: &str = r"^[A-Za-z-]+$";

/// Summary of a registered collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub checksum: Checksum,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
}

/// A named collection: its validator plus the items written so far
pub struct Collection {
    name: String,
    schema: Value,
    checksum: Checksum,
    validator: Box<dyn DocumentValidator>,
    items: Vec<Value>,
}

impl Collection {
    /// Create an empty collection guarded by `validator`
    pub fn new(name: impl Into<String>, compiled: CompiledSchema) -> Self {
        let schema = compiled.document().clone();
        let checksum = compiled.checksum().clone();
        Self {
            name: name.into(),
            schema,
            checksum,
            validator: Box::new(compiled),
            items: Vec::new(),
        }
    }

    /// All items in insertion order
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Summary of this collection; `detailed` adds the schema and item count
    pub fn info(&self, detailed: bool) -> CollectionInfo {
        CollectionInfo {
            name: self.name.clone(),
            checksum: self.checksum.clone(),
            schema: detailed.then(|| self.schema.clone()),
            item_count: detailed.then_some(self.items.len()),
        }
    }

    /// Assign a fresh id to `doc`, validate it and append it.
    ///
    /// The id is set before validation, so the schema sees the same object that
    /// gets stored.
    pub fn insert(&mut self, doc: Value) -> Result<Value> {
        let item = with_id(doc, &Uuid::new_v4().to_string())?;
        self.check(&item)?;
        self.items.push(item.clone());
        Ok(item)
    }

    /// Replace the item with `id` by `doc`, keeping its id and position.
    pub fn replace(&mut self, id: &str, doc: Value) -> Result<Value> {
        let index = self.position(id)?;
        let item = with_id(doc, id)?;
        self.check(&item)?;
        self.items[index] = item.clone();
        Ok(item)
    }

    /// Remove the item with `id`; later items shift down one position.
    pub fn remove(&mut self, id: &str) -> Result<Value> {
        let index = self.position(id)?;
        Ok(self.items.remove(index))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.get(ID_FIELD).and_then(Value::as_str) == Some(id))
            .ok_or_else(|| CollectionError::ItemNotFound {
                collection: self.name.clone(),
                id: id.to_string(),
            })
    }

    fn check(&self, item: &Value) -> Result<()> {
        self.validator
            .validate(item)
            .map_err(CollectionError::ValidationFailed)
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("checksum", &self.checksum)
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

/// Set `id` on an object document. Items must be objects whatever the
/// collection schema allows, otherwise they could not carry an id.
fn with_id(doc: Value, id: &str) -> Result<Value> {
    let Value::Object(mut map) = doc else {
        return Err(CollectionError::ValidationFailed(vec![ValidationIssue::new(
            "",
            "type",
            "item must be a JSON object",
        )]));
    };
    map.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(Value::Object(map))
}

/// Name -> collection mapping
#[derive(Debug)]
pub struct CollectionRegistry {
    name_pattern: Regex,
    collections: HashMap<String, Collection>,
}

impl Default for CollectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self {
            name_pattern: Regex::new(COLLECTION_NAME_PATTERN).unwrap(),
            collections: HashMap::new(),
        }
    }

    /// Whether `name` may be used as a collection name
    pub fn is_valid_name(&self, name: &str) -> bool {
        self.name_pattern.is_match(name)
    }

    /// Register a new collection.
    ///
    /// Checks run in order: name pattern, duplicate name, schema compilation.
    /// Nothing is inserted unless all three pass.
    pub fn register(&mut self, name: &str, schema_text: &str) -> Result<&Collection> {
        if !self.is_valid_name(name) {
            return Err(CollectionError::InvalidName(name.to_string()));
        }
        if self.collections.contains_key(name) {
            return Err(CollectionError::AlreadyExists(name.to_string()));
        }

        let compiled = CompiledSchema::compile(schema_text)?;
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name, compiled));
        Ok(collection)
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
