//! Schema merging and compilation
//!
//! Collection schemas arrive as caller-supplied JSON Schema text. Each one is
//! layered onto a fixed base schema that reserves the `id` field, then compiled
//! once into a validator that every later write goes through.
//!
//! The pipeline has two stages:
//!
//! 1. [`merge_schemas`] - a pure JSON Merge Patch (RFC 7396) of the caller
//!    schema onto the base.
//! 2. [`CompiledSchema::compile`] - Draft 7 compilation of the merged document.
//!
//! Callers only see the [`DocumentValidator`] trait, so the validation library
//! can be swapped without touching the registry.

use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::checksum::Checksum;
use crate::error::{CollectionError, Result};

/// Name of the server-assigned identity field
pub const ID_FIELD: &str = "id";

/// The fixed schema fragment merged under every collection schema
pub fn base_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            ID_FIELD: { "type": "string" }
        },
        "additionalProperties": false
    })
}

/// Merge `overlay` onto `base` with JSON Merge Patch semantics.
///
/// Objects merge key by key with the overlay winning, `null` removes a key,
/// and any other overlay value replaces the base value outright. Arrays are
/// replaced, never concatenated.
pub fn merge_schemas(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    merge_patch(&mut merged, overlay);
    merged
}

fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// JSON pointer to the offending part of the document (empty for the root)
    pub instance_path: String,
    /// JSON pointer to the schema keyword that failed
    pub schema_path: String,
    /// The failing keyword (e.g. "required", "type")
    pub keyword: String,
    /// Human-readable description
    pub message: String,
}

impl ValidationIssue {
    /// Build an issue by hand, for validators that are not schema-driven
    pub fn new(instance_path: impl Into<String>, keyword: impl Into<String>, message: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self {
            instance_path: instance_path.into(),
            schema_path: format!("/{}", keyword),
            keyword,
            message: message.into(),
        }
    }
}

impl From<jsonschema::ValidationError<'_>> for ValidationIssue {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        let schema_path = error.schema_path.to_string();
        let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            instance_path: error.instance_path.to_string(),
            schema_path,
            keyword,
            message: error.to_string(),
        }
    }
}

/// Anything that can check a document against a fixed set of rules
pub trait DocumentValidator: Send + Sync {
    /// Check `doc`, returning every violation found
    fn validate(&self, doc: &Value) -> std::result::Result<(), Vec<ValidationIssue>>;
}

/// A JSON Schema compiled for repeated validation
pub struct CompiledSchema {
    document: Value,
    checksum: Checksum,
    inner: JSONSchema,
}

impl CompiledSchema {
    /// Parse caller schema text, merge it onto [`base_schema`] and compile it.
    pub fn compile(schema_text: &str) -> Result<Self> {
        let overlay: Value = serde_json::from_str(schema_text)
            .map_err(|e| CollectionError::Schema(format!("schema is not valid JSON: {}", e)))?;

        if !overlay.is_object() {
            return Err(CollectionError::Schema(
                "schema must be a JSON object".to_string(),
            ));
        }

        Self::from_value(merge_schemas(&base_schema(), &overlay))
    }

    /// Compile a complete schema document as-is, without the base merge.
    pub fn from_value(document: Value) -> Result<Self> {
        let inner = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&document)
            .map_err(|e| CollectionError::Schema(e.to_string()))?;
        let checksum = Checksum::from_json(&document);

        Ok(Self {
            document,
            checksum,
            inner,
        })
    }

    /// The schema document this validator was compiled from
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Fingerprint of the compiled document
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }
}

impl DocumentValidator for CompiledSchema {
    fn validate(&self, doc: &Value) -> std::result::Result<(), Vec<ValidationIssue>> {
        self.inner
            .validate(doc)
            .map_err(|errors| errors.map(ValidationIssue::from).collect())
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("checksum", &self.checksum)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"{
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "description": {"type": "string"},
            "price": {"type": "number"}
        },
        "required": ["name", "price"],
        "additionalProperties": false
    }"#;

    #[test]
    fn test_merge_unions_properties() {
        let overlay = json!({
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        });
        let merged = merge_schemas(&base_schema(), &overlay);

        assert_eq!(merged["type"], "object");
        assert_eq!(merged["properties"]["id"]["type"], "string");
        assert_eq!(merged["properties"]["title"]["type"], "string");
        assert_eq!(merged["required"], json!(["title"]));
        assert_eq!(merged["additionalProperties"], false);
    }

    #[test]
    fn test_merge_overlay_wins() {
        let overlay = json!({
            "properties": { "id": { "type": "integer" } },
            "additionalProperties": true
        });
        let merged = merge_schemas(&base_schema(), &overlay);

        assert_eq!(merged["properties"]["id"]["type"], "integer");
        assert_eq!(merged["additionalProperties"], true);
    }

    #[test]
    fn test_merge_null_removes_key() {
        let merged = merge_schemas(&base_schema(), &json!({ "additionalProperties": null }));
        assert!(merged.get("additionalProperties").is_none());
    }

    #[test]
    fn test_compile_and_validate() {
        let schema = CompiledSchema::compile(PRODUCTS).unwrap();

        let ok = json!({ "id": "abc", "name": "Flour", "price": 1.5 });
        assert!(schema.validate(&ok).is_ok());

        let missing_price = json!({ "id": "abc", "name": "Flour" });
        let issues = schema.validate(&missing_price).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].keyword, "required");
        assert_eq!(issues[0].instance_path, "");
    }

    #[test]
    fn test_unlisted_properties_rejected() {
        let schema = CompiledSchema::compile(PRODUCTS).unwrap();
        let extra = json!({ "name": "Flour", "price": 1, "colour": "white" });
        let issues = schema.validate(&extra).unwrap_err();
        assert!(issues.iter().any(|i| i.keyword == "additionalProperties"));
    }

    #[test]
    fn test_type_error_points_at_field() {
        let schema = CompiledSchema::compile(PRODUCTS).unwrap();
        let wrong = json!({ "name": "Flour", "price": "cheap" });
        let issues = schema.validate(&wrong).unwrap_err();
        assert_eq!(issues[0].instance_path, "/price");
        assert_eq!(issues[0].keyword, "type");
    }

    #[test]
    fn test_compile_rejects_bad_json() {
        let err = CompiledSchema::compile("{not json").unwrap_err();
        assert!(matches!(err, CollectionError::Schema(_)));
    }

    #[test]
    fn test_compile_rejects_non_object() {
        let err = CompiledSchema::compile("[1, 2]").unwrap_err();
        assert!(matches!(err, CollectionError::Schema(_)));
    }

    #[test]
    fn test_compile_rejects_invalid_schema() {
        let err = CompiledSchema::compile(r#"{"type": 12}"#).unwrap_err();
        assert!(matches!(err, CollectionError::Schema(_)));
    }

    #[test]
    fn test_checksum_tracks_merged_document() {
        let a = CompiledSchema::compile(PRODUCTS).unwrap();
        let b = CompiledSchema::compile(PRODUCTS).unwrap();
        assert_eq!(a.checksum(), b.checksum());
        assert!(a.checksum().verify_json(a.document()));
    }
}
