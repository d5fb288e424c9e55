//! CLI-style command contracts.
//!
//! A [`CommandSchema`] pins a command key and carries the shapes of its body,
//! flag params and response. Params serialize to `--name=value` tokens.
//!
//! # Example
//!
//! ```
//! use contract_schema_core::Shape;
//! use contract_schema_service::command;
//! use serde_json::json;
//!
//! let start = command::make_schema(
//!     command::CommandConfig::new()
//!         .key("start")
//!         .body(Shape::string())
//!         .params(Shape::object([
//!             ("global", Shape::boolean()),
//!             ("flat", Shape::literal("UAE")),
//!         ]))
//!         .response(Shape::empty_object()),
//! )
//! .unwrap();
//!
//! assert_eq!(start.full_key(), "/start");
//! assert_eq!(
//!     start.make_full_path(&json!({ "global": true, "flat": "UAE" })).unwrap(),
//!     "start --global=true--flat=UAE"
//! );
//! ```

use std::sync::Arc;

use contract_schema_core::{ObjectShape, Shape, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::meta::{check_key, require, require_object};
use crate::render::{RenderedParams, TypeofRenderer, ValueKindRenderer, value_text};

/// Builder configuration for a [`CommandSchema`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandConfig {
    pub key: Option<String>,
    pub body: Option<Shape>,
    pub params: Option<Shape>,
    pub response: Option<Shape>,
    /// Text placed between flag tokens. Defaults to none at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_separator: Option<String>,
    #[serde(skip)]
    pub kind_renderer: Option<Arc<dyn ValueKindRenderer>>,
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn body(mut self, shape: Shape) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn params(mut self, shape: Shape) -> Self {
        self.params = Some(shape);
        self
    }

    pub fn response(mut self, shape: Shape) -> Self {
        self.response = Some(shape);
        self
    }

    pub fn token_separator(mut self, separator: impl Into<String>) -> Self {
        self.token_separator = Some(separator.into());
        self
    }

    /// Replaces the default [`TypeofRenderer`] used for shape tokens.
    pub fn kind_renderer(mut self, renderer: impl ValueKindRenderer + 'static) -> Self {
        self.kind_renderer = Some(Arc::new(renderer));
        self
    }

    /// Meta-validates the configuration and builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the key is missing or malformed, a shape
    /// is missing, or params is not an object shape.
    pub fn build(self) -> Result<CommandSchema, ConfigError> {
        let key = require("key", self.key)?;
        check_key(&key)?;
        let body = require("body", self.body)?;
        let params = require("params", self.params)?;
        let response = require("response", self.response)?;
        require_object("params", &params)?;

        let full_key = format!("/{key}");
        let request = ObjectShape::new([
            ("key", Shape::literal(key.as_str())),
            ("fullKey", Shape::literal(full_key.as_str())),
            ("body", body.clone()),
            ("params", params.clone()),
        ]);
        let request_config = Shape::from(request.pick(&["body", "params"]));
        let request = Shape::from(request);
        let all = Shape::object([("request", request.clone()), ("response", response.clone())]);

        debug!(key = %key, "Built command schema");

        Ok(CommandSchema {
            key,
            full_key,
            body,
            params,
            response,
            request,
            request_config,
            all,
            separator: self.token_separator.unwrap_or_default(),
            renderer: self
                .kind_renderer
                .unwrap_or_else(|| Arc::new(TypeofRenderer)),
        })
    }
}

/// Builds a [`CommandSchema`] from `config`; see [`CommandConfig::build`].
pub fn make_schema(config: CommandConfig) -> Result<CommandSchema, ConfigError> {
    config.build()
}

/// The structural request fields of a command invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandRequestConfig {
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub params: Value,
}

/// Immutable descriptor of one command.
#[derive(Debug, Clone)]
pub struct CommandSchema {
    key: String,
    full_key: String,
    body: Shape,
    params: Shape,
    response: Shape,
    request: Shape,
    request_config: Shape,
    all: Shape,
    separator: String,
    renderer: Arc<dyn ValueKindRenderer>,
}

impl CommandSchema {
    /// Starts a configuration; finish with [`CommandConfig::build`].
    pub fn builder() -> CommandConfig {
        CommandConfig::new()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// `/` followed by the key.
    pub fn full_key(&self) -> &str {
        &self.full_key
    }

    pub fn body(&self) -> &Shape {
        &self.body
    }

    pub fn params(&self) -> &Shape {
        &self.params
    }

    pub fn response(&self) -> &Shape {
        &self.response
    }

    pub fn request(&self) -> &Shape {
        &self.request
    }

    pub fn request_config(&self) -> &Shape {
        &self.request_config
    }

    pub fn all(&self) -> &Shape {
        &self.all
    }

    pub fn token_separator(&self) -> &str {
        &self.separator
    }

    pub fn make_body(&self, value: &Value) -> Result<Value, ValidationError> {
        self.check("body", &self.body, value)
    }

    pub fn make_params(&self, value: &Value) -> Result<Value, ValidationError> {
        self.check("params", &self.params, value)
    }

    pub fn make_response(&self, value: &Value) -> Result<Value, ValidationError> {
        self.check("response", &self.response, value)
    }

    /// Validates body and params together, reporting every failing field.
    pub fn make_request_config(
        &self,
        config: &CommandRequestConfig,
    ) -> Result<CommandRequestConfig, ValidationError> {
        let mut input = Map::new();
        input.insert("body".to_string(), config.body.clone());
        input.insert("params".to_string(), config.params.clone());

        let out = self.check("request config", &self.request_config, &Value::Object(input))?;
        Ok(CommandRequestConfig {
            body: out.get("body").cloned().unwrap_or(Value::Null),
            params: out.get("params").cloned().unwrap_or(Value::Null),
        })
    }

    /// Renders params as `--name=value` tokens.
    ///
    /// Tokens follow the key order of the caller's value; members the params
    /// shape strips are skipped. The shape string holds `--name=<kind>` in the
    /// same positions. Tokens are joined with the configured separator, which
    /// is empty by default (`--a=1--b=2`).
    pub fn stringify_params(&self, value: &Value) -> Result<RenderedParams, ValidationError> {
        let params = self.check("params", &self.params, value)?;

        let mut values = Vec::new();
        let mut shapes = Vec::new();
        if let (Value::Object(input), Value::Object(canonical)) = (value, &params) {
            for key in input.keys() {
                let Some(member) = canonical.get(key) else {
                    continue;
                };
                values.push(format!("--{key}={}", value_text(member)));
                shapes.push(format!("--{key}={}", self.renderer.kind_name(member)));
            }
        }

        Ok(RenderedParams {
            shape: shapes.join(&self.separator),
            value: values.join(&self.separator),
        })
    }

    /// The key, a space, then the rendered params.
    pub fn make_full_path(&self, value: &Value) -> Result<String, ValidationError> {
        let rendered = self.stringify_params(value)?;
        Ok(format!("{} {}", self.key, rendered.value))
    }

    fn check(&self, part: &'static str, shape: &Shape, value: &Value) -> Result<Value, ValidationError> {
        shape.parse(value).inspect_err(|err| {
            debug!(key = %self.key, part, issues = err.len(), "Rejected command value");
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::render::JsonTypeRenderer;

    fn start_command() -> CommandSchema {
        CommandSchema::builder()
            .key("start")
            .body(Shape::string())
            .params(Shape::object([
                ("global", Shape::boolean()),
                ("flat", Shape::literal("UAE")),
            ]))
            .response(Shape::empty_object())
            .build()
            .unwrap()
    }

    #[test]
    fn test_full_key_derived() {
        let schema = start_command();
        assert_eq!(schema.key(), "start");
        assert_eq!(schema.full_key(), "/start");
    }

    #[test]
    fn test_stringify_params_default_convention() {
        let rendered = start_command()
            .stringify_params(&json!({ "global": true, "flat": "UAE" }))
            .unwrap();
        assert_eq!(rendered.value, "--global=true--flat=UAE");
        assert_eq!(rendered.shape, "--global=boolean--flat=string");
    }

    #[test]
    fn test_stringify_params_follows_value_key_order() {
        let rendered = start_command()
            .stringify_params(&json!({ "flat": "UAE", "global": false, "extra": 1 }))
            .unwrap();
        assert_eq!(rendered.value, "--flat=UAE--global=false");
    }

    #[test]
    fn test_make_full_path() {
        assert_eq!(
            start_command()
                .make_full_path(&json!({ "global": true, "flat": "UAE" }))
                .unwrap(),
            "start --global=true--flat=UAE"
        );
    }

    #[test]
    fn test_custom_separator_and_renderer() {
        let schema = CommandSchema::builder()
            .key("serve")
            .body(Shape::any())
            .params(Shape::object([("port", Shape::integer()), ("host", Shape::string())]))
            .response(Shape::any())
            .token_separator(" ")
            .kind_renderer(JsonTypeRenderer)
            .build()
            .unwrap();
        let rendered = schema
            .stringify_params(&json!({ "port": 8080, "host": "localhost" }))
            .unwrap();
        assert_eq!(rendered.value, "--port=8080 --host=localhost");
        assert_eq!(rendered.shape, "--port=integer --host=string");
        assert_eq!(
            schema
                .make_full_path(&json!({ "port": 1, "host": "h" }))
                .unwrap(),
            "serve --port=1 --host=h"
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = start_command()
            .make_full_path(&json!({ "global": "yes", "flat": "UK" }))
            .unwrap_err();
        assert_eq!(err.top_level_keys(), vec!["global", "flat"]);
    }

    #[test]
    fn test_make_request_config_checks_both_fields() {
        let err = start_command()
            .make_request_config(&CommandRequestConfig {
                body: json!(5),
                params: json!({ "global": 1, "flat": "UAE" }),
            })
            .unwrap_err();
        assert_eq!(err.top_level_keys(), vec!["body", "params"]);
    }

    #[test]
    fn test_make_request_config_accepts_valid_pair() {
        let out = start_command()
            .make_request_config(&CommandRequestConfig {
                body: json!("now"),
                params: json!({ "global": true, "flat": "UAE" }),
            })
            .unwrap();
        assert_eq!(out.body, json!("now"));
    }

    #[test]
    fn test_build_rejects_bad_key() {
        let err = CommandSchema::builder()
            .key("two words")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidKey("two words".to_string()));
    }

    #[test]
    fn test_build_requires_object_params() {
        let err = CommandSchema::builder()
            .key("run")
            .body(Shape::any())
            .params(Shape::string())
            .response(Shape::any())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotObjectShape { field: "params", .. }));
    }

    #[test]
    fn test_request_shape_pins_key() {
        let schema = start_command();
        let request = json!({
            "key": "start",
            "fullKey": "/start",
            "body": "b",
            "params": { "global": true, "flat": "UAE" },
        });
        assert!(schema.request().is_valid(&request));
        assert!(!schema.all().is_valid(&json!({ "request": request })));
    }
}
