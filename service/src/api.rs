//! HTTP-style endpoint contracts.
//!
//! An [`ApiSchema`] pins an endpoint's method, authentication flag, disabled
//! flag and path, and carries the shapes of its body, path params, query and
//! response. Besides validating each of those, it renders params into path
//! segments in a caller-chosen order.
//!
//! # Example
//!
//! ```
//! use contract_schema_core::{ResponseShape, Shape};
//! use contract_schema_service::api;
//! use serde_json::json;
//!
//! let endpoint = api::make_schema(
//!     api::ApiConfig::new()
//!         .method("get")
//!         .auth("YES")
//!         .path("/sss")
//!         .body(Shape::empty_object())
//!         .params(Shape::object([
//!             ("pageSize", Shape::number()),
//!             ("currentPage", Shape::number()),
//!         ]))
//!         .query(Shape::object([("isMarid", Shape::boolean())]))
//!         .response(
//!             ResponseShape::new(Shape::object([
//!                 ("name", Shape::string()),
//!                 ("age", Shape::number()),
//!                 ("isMarid", Shape::boolean()),
//!             ]))
//!             .list()
//!             .simple(),
//!         ),
//! )
//! .unwrap();
//!
//! let params = json!({ "currentPage": 10, "pageSize": 12 });
//! let order = ["pageSize", "currentPage"];
//! assert_eq!(endpoint.make_full_path(&params, &order).unwrap(), "/sss/12/10");
//! assert_eq!(
//!     endpoint.make_full_path_shape(&order).unwrap(),
//!     "/sss/:pageSize/:currentPage"
//! );
//! assert!(endpoint.need_authentication());
//! ```

use contract_schema_core::{ObjectShape, Shape, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, Result, SchemaError};
use crate::identity::{Method, Toggle};
use crate::meta::{check_path, require, require_object};
use crate::render::{RenderedParams, path_segment};

/// Builder configuration for an [`ApiSchema`].
///
/// Identity fields are kept as raw strings until [`build`](Self::build) so
/// that meta-validation sees exactly what the caller (or a contract file)
/// supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub method: Option<String>,
    pub auth: Option<String>,
    /// Defaults to `NO` when absent.
    pub disable: Option<String>,
    pub path: Option<String>,
    pub body: Option<Shape>,
    pub params: Option<Shape>,
    pub query: Option<Shape>,
    pub response: Option<Shape>,
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        self.method = Some(method.as_ref().to_string());
        self
    }

    pub fn auth(mut self, auth: impl AsRef<str>) -> Self {
        self.auth = Some(auth.as_ref().to_string());
        self
    }

    pub fn disable(mut self, disable: impl AsRef<str>) -> Self {
        self.disable = Some(disable.as_ref().to_string());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
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

    pub fn query(mut self, shape: Shape) -> Self {
        self.query = Some(shape);
        self
    }

    pub fn response(mut self, shape: Shape) -> Self {
        self.response = Some(shape);
        self
    }

    /// Meta-validates the configuration and builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the method is not a supported verb, a
    /// toggle is not `YES`/`NO`, the path lacks a leading `/`, a shape is
    /// missing, or params/query are not object shapes.
    pub fn build(self) -> std::result::Result<ApiSchema, ConfigError> {
        let method: Method = require("method", self.method)?.parse()?;
        let auth = Toggle::parse_field("auth", &require("auth", self.auth)?)?;
        let disable = match self.disable {
            Some(raw) => Toggle::parse_field("disable", &raw)?,
            None => Toggle::No,
        };
        let path = require("path", self.path)?;
        check_path(&path)?;
        let body = require("body", self.body)?;
        let params = require("params", self.params)?;
        let query = require("query", self.query)?;
        let response = require("response", self.response)?;
        require_object("params", &params)?;
        require_object("query", &query)?;

        let param_names = params
            .field_names()
            .unwrap_or_default()
            .into_iter()
            .map(String::from)
            .collect();

        let request = ObjectShape::new([
            ("method", Shape::literal(method.as_str())),
            ("auth", Shape::literal(auth.as_str())),
            ("disable", Shape::literal(disable.as_str())),
            ("path", Shape::literal(path.as_str())),
            ("body", body.clone()),
            ("params", params.clone()),
            ("query", query.clone()),
        ]);
        let request_config = Shape::from(request.pick(&["body", "params", "query"]));
        let request = Shape::from(request);
        let all = Shape::object([("request", request.clone()), ("response", response.clone())]);

        debug!(%method, %auth, %disable, path = %path, "Built API schema");

        Ok(ApiSchema {
            method,
            auth,
            disable,
            path,
            body,
            params,
            query,
            response,
            request,
            request_config,
            all,
            param_names,
        })
    }
}

/// Builds an [`ApiSchema`] from `config`; see [`ApiConfig::build`].
pub fn make_schema(config: ApiConfig) -> std::result::Result<ApiSchema, ConfigError> {
    config.build()
}

/// The structural request fields of an endpoint call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub query: Value,
}

/// Immutable descriptor of one endpoint.
///
/// Identity fields are only readable; a descriptor carries the method,
/// toggles and path it was built with for its whole lifetime.
#[derive(Debug, Clone)]
pub struct ApiSchema {
    method: Method,
    auth: Toggle,
    disable: Toggle,
    path: String,
    body: Shape,
    params: Shape,
    query: Shape,
    response: Shape,
    request: Shape,
    request_config: Shape,
    all: Shape,
    param_names: Vec<String>,
}

impl ApiSchema {
    /// Starts a configuration; finish with [`ApiConfig::build`].
    pub fn builder() -> ApiConfig {
        ApiConfig::new()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn auth(&self) -> Toggle {
        self.auth
    }

    pub fn disable(&self) -> Toggle {
        self.disable
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True iff auth is `YES`.
    pub fn need_authentication(&self) -> bool {
        self.auth.is_yes()
    }

    /// True iff disable is `YES`.
    pub fn is_disabled(&self) -> bool {
        self.disable.is_yes()
    }

    pub fn body(&self) -> &Shape {
        &self.body
    }

    pub fn params(&self) -> &Shape {
        &self.params
    }

    pub fn query(&self) -> &Shape {
        &self.query
    }

    pub fn response(&self) -> &Shape {
        &self.response
    }

    /// Full request shape: identity literals plus body, params and query.
    pub fn request(&self) -> &Shape {
        &self.request
    }

    /// Request shape reduced to body, params and query.
    pub fn request_config(&self) -> &Shape {
        &self.request_config
    }

    /// `{request, response}`.
    pub fn all(&self) -> &Shape {
        &self.all
    }

    /// Params member names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.param_names.iter().map(String::as_str)
    }

    pub fn make_body(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        self.check("body", &self.body, value)
    }

    pub fn make_params(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        self.check("params", &self.params, value)
    }

    pub fn make_query(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        self.check("query", &self.query, value)
    }

    pub fn make_response(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        self.check("response", &self.response, value)
    }

    /// Validates body, params and query together.
    ///
    /// Every failing field is reported; issue paths start with the field
    /// name (`body`, `params` or `query`).
    pub fn make_request_config(
        &self,
        config: &RequestConfig,
    ) -> std::result::Result<RequestConfig, ValidationError> {
        let mut input = Map::new();
        input.insert("body".to_string(), config.body.clone());
        input.insert("params".to_string(), config.params.clone());
        input.insert("query".to_string(), config.query.clone());

        let out = self.check("request config", &self.request_config, &Value::Object(input))?;
        Ok(RequestConfig {
            body: member(&out, "body"),
            params: member(&out, "params"),
            query: member(&out, "query"),
        })
    }

    /// Renders params as path segments in `order`.
    ///
    /// `value` gets `/<value>` per name and `shape` gets `/:<name>`, in one
    /// pass, so both always have the same segments in the same positions.
    /// Values are percent-encoded, so a value never spans two segments.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownParam`] / [`SchemaError::DuplicateParam`] for a
    /// bad `order`, [`SchemaError::Validation`] when `value` does not match
    /// the params shape, and [`SchemaError::MissingParam`] when a named member
    /// is absent from the value.
    pub fn stringify_params(&self, value: &Value, order: &[&str]) -> Result<RenderedParams> {
        self.check_order(order)?;
        let params = self.check("params", &self.params, value)?;

        let mut rendered = RenderedParams {
            shape: String::new(),
            value: String::new(),
        };
        for name in order {
            let Some(member) = params.get(*name) else {
                return Err(SchemaError::MissingParam((*name).to_string()));
            };
            rendered.shape.push_str("/:");
            rendered.shape.push_str(name);
            rendered.value.push('/');
            rendered.value.push_str(&path_segment(member));
        }
        Ok(rendered)
    }

    /// `path` followed by the rendered params.
    pub fn make_full_path(&self, value: &Value, order: &[&str]) -> Result<String> {
        let rendered = self.stringify_params(value, order)?;
        Ok(format!("{}{}", self.path, rendered.value))
    }

    /// `path` followed by `/:<name>` per name in `order`.
    pub fn make_full_path_shape(&self, order: &[&str]) -> Result<String> {
        self.check_order(order)?;
        let mut shape = self.path.clone();
        for name in order {
            shape.push_str("/:");
            shape.push_str(name);
        }
        Ok(shape)
    }

    fn check_order(&self, order: &[&str]) -> Result<()> {
        for (index, name) in order.iter().enumerate() {
            if !self.param_names.iter().any(|known| known == name) {
                return Err(SchemaError::UnknownParam((*name).to_string()));
            }
            if order[..index].contains(name) {
                return Err(SchemaError::DuplicateParam((*name).to_string()));
            }
        }
        Ok(())
    }

    fn check(
        &self,
        part: &'static str,
        shape: &Shape,
        value: &Value,
    ) -> std::result::Result<Value, ValidationError> {
        shape.parse(value).inspect_err(|err| {
            debug!(path = %self.path, part, issues = err.len(), "Rejected endpoint value");
        })
    }
}

fn member(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}
