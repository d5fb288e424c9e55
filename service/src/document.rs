//! Persisted-entity contracts.
//!
//! A [`DocumentSchema`] composes a base document shape with identifier and
//! timestamp augmentations. It has no serialization operations; the storage
//! layer consumes the shapes directly.

use contract_schema_core::{Shape, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::meta::{check_key, require, require_object};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
pub const DEFAULT_ID_FIELD: &str = "id";

/// Builder configuration for a [`DocumentSchema`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentConfig {
    pub key: Option<String>,
    pub document: Option<Shape>,
    /// Member holding the identifier. Defaults to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
}

impl DocumentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn document(mut self, shape: Shape) -> Self {
        self.document = Some(shape);
        self
    }

    pub fn id_field(mut self, name: impl Into<String>) -> Self {
        self.id_field = Some(name.into());
        self
    }

    /// Meta-validates the configuration and derives the four document
    /// variants.
    pub fn build(self) -> Result<DocumentSchema, ConfigError> {
        let key = require("key", self.key)?;
        check_key(&key)?;
        let document = require("document", self.document)?;
        require_object("document", &document)?;

        let id_field = self
            .id_field
            .unwrap_or_else(|| DEFAULT_ID_FIELD.to_string());
        if id_field.is_empty() || id_field.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidIdField(id_field));
        }

        let with_id = Shape::object([(id_field.as_str(), Shape::object_id())]);
        let with_date = Shape::object([(CREATED_AT, Shape::date()), (UPDATED_AT, Shape::date())]);
        let entry_document_with_id = document.clone().and(with_id.clone());
        let entry_document_with_date = document.clone().and(with_date.clone());
        let full_document = document.clone().and(with_date).and(with_id);

        // Plural form is a plain suffix.
        let full_key = format!("{key}s");
        let all = Shape::object([
            ("key", Shape::literal(key.as_str())),
            ("fullKey", Shape::literal(full_key.as_str())),
            ("document", document.clone()),
            ("fullDocument", full_document.clone()),
        ]);

        debug!(key = %key, id_field = %id_field, "Built document schema");

        Ok(DocumentSchema {
            key,
            full_key,
            id_field,
            document,
            entry_document_with_id,
            entry_document_with_date,
            full_document,
            all,
        })
    }
}

/// Builds a [`DocumentSchema`] from `config`; see [`DocumentConfig::build`].
pub fn make_schema(config: DocumentConfig) -> Result<DocumentSchema, ConfigError> {
    config.build()
}

/// Immutable descriptor of one persisted entity.
#[derive(Debug, Clone)]
pub struct DocumentSchema {
    key: String,
    full_key: String,
    id_field: String,
    document: Shape,
    entry_document_with_id: Shape,
    entry_document_with_date: Shape,
    full_document: Shape,
    all: Shape,
}

impl DocumentSchema {
    pub fn builder() -> DocumentConfig {
        DocumentConfig::new()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The key with an `s` appended.
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// The base shape, before any augmentation.
    pub fn document(&self) -> &Shape {
        &self.document
    }

    /// Base shape plus the identifier.
    pub fn entry_document_with_id(&self) -> &Shape {
        &self.entry_document_with_id
    }

    /// Base shape plus both timestamps.
    pub fn entry_document_with_date(&self) -> &Shape {
        &self.entry_document_with_date
    }

    /// Base shape plus identifier and timestamps.
    pub fn full_document(&self) -> &Shape {
        &self.full_document
    }

    pub fn all(&self) -> &Shape {
        &self.all
    }

    pub fn make_document(&self, value: &Value) -> Result<Value, ValidationError> {
        self.document.parse(value)
    }

    pub fn make_full_document(&self, value: &Value) -> Result<Value, ValidationError> {
        self.full_document.parse(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn user() -> DocumentSchema {
        DocumentSchema::builder()
            .key("user")
            .document(Shape::object([("name", Shape::string()), ("age", Shape::integer())]))
            .build()
            .unwrap()
    }

    fn stored_user() -> Value {
        json!({
            "name": "Ada",
            "age": 36,
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-02T08:30:00Z",
            "id": "65e1f0a2b3c4d5e6f7a8b9c0",
        })
    }

    #[test]
    fn test_full_key_appends_s() {
        let schema = user();
        assert_eq!(schema.key(), "user");
        assert_eq!(schema.full_key(), "users");
        assert_eq!(schema.id_field(), "id");
    }

    #[test]
    fn test_full_document_accepts_complete_value() {
        let out = user().make_full_document(&stored_user()).unwrap();
        assert_eq!(out["createdAt"], json!("2024-03-01T12:00:00.000Z"));
        assert_eq!(out["id"], json!("65e1f0a2b3c4d5e6f7a8b9c0"));
        assert_eq!(out["name"], json!("Ada"));
    }

    #[test]
    fn test_full_document_requires_every_augmentation() {
        let schema = user();
        for missing in ["id", CREATED_AT, UPDATED_AT, "name"] {
            let mut value = stored_user();
            value.as_object_mut().unwrap().remove(missing);
            let err = schema.make_full_document(&value).unwrap_err();
            assert_eq!(err.top_level_keys(), vec![missing]);
        }
    }

    #[test]
    fn test_partial_variants() {
        let schema = user();
        let base = json!({ "name": "Ada", "age": 36 });
        assert!(schema.document().is_valid(&base));
        assert!(!schema.entry_document_with_id().is_valid(&base));
        assert!(!schema.entry_document_with_date().is_valid(&base));

        let with_id = json!({ "name": "Ada", "age": 36, "id": "65e1f0a2b3c4d5e6f7a8b9c0" });
        assert!(schema.entry_document_with_id().is_valid(&with_id));

        let with_date = json!({
            "name": "Ada",
            "age": 36,
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-01T12:00:00Z",
        });
        assert!(schema.entry_document_with_date().is_valid(&with_date));
        assert!(!schema.full_document().is_valid(&with_date));
    }

    #[test]
    fn test_custom_id_field() {
        let schema = DocumentSchema::builder()
            .key("order")
            .document(Shape::object([("total", Shape::number())]))
            .id_field("_id")
            .build()
            .unwrap();
        let value = json!({
            "total": 9.5,
            "_id": { "$oid": "65e1f0a2b3c4d5e6f7a8b9c0" },
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-01T12:00:00Z",
        });
        let out = schema.make_full_document(&value).unwrap();
        assert_eq!(out["_id"], json!("65e1f0a2b3c4d5e6f7a8b9c0"));
    }

    #[test]
    fn test_full_document_is_idempotent() {
        let schema = user();
        let once = schema.make_full_document(&stored_user()).unwrap();
        let twice = schema.make_full_document(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_build_rejects_non_object_document() {
        let err = DocumentSchema::builder()
            .key("tag")
            .document(Shape::string())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotObjectShape {
                field: "document",
                kind: "string"
            }
        );
    }

    #[test]
    fn test_build_rejects_blank_id_field() {
        let err = DocumentSchema::builder()
            .key("tag")
            .document(Shape::empty_object())
            .id_field(" ")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidIdField(" ".to_string()));
    }
}
