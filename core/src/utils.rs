//! Reusable shapes shared by every schema family.
//!
//! - [`pagination`]: the page envelope attached to list responses.
//! - [`json_object`]: coerces JSON text (repairing it first) into a shape.
//! - [`object_id`]: opaque document identifiers.
//! - [`ResponseShape`]: `{data}` / `{data: [..]}` / `{pagination, data: [..]}`
//!   response envelopes around a data shape.

use crate::shape::Shape;

/// Page envelope: `{currentPage ≥ 1, totalItems ≥ 0, itemsPerPage ≥ 1}`,
/// all integers.
///
/// # Examples
///
/// ```
/// use contract_schema_core::pagination;
/// use serde_json::json;
///
/// let page = json!({ "currentPage": 1, "totalItems": 0, "itemsPerPage": 20 });
/// assert!(pagination().is_valid(&page));
/// assert!(!pagination().is_valid(&json!({ "currentPage": 0, "totalItems": 0, "itemsPerPage": 20 })));
/// ```
pub fn pagination() -> Shape {
    Shape::object([
        ("currentPage", Shape::integer().min(1.0)),
        ("totalItems", Shape::integer().min(0.0)),
        ("itemsPerPage", Shape::integer().min(1.0)),
    ])
}

/// Accepts JSON text, repairs and parses it, then validates it against
/// `inner`.
///
/// # Examples
///
/// ```
/// use contract_schema_core::{json_object, Shape};
/// use serde_json::json;
///
/// let shape = json_object(Shape::object([("ok", Shape::boolean())]));
/// assert_eq!(shape.parse(&json!("{ok: True,}")).unwrap(), json!({ "ok": true }));
/// ```
pub fn json_object(inner: Shape) -> Shape {
    Shape::json_text(inner)
}

/// Opaque identifier shape; see [`Shape::ObjectId`].
pub fn object_id() -> Shape {
    Shape::object_id()
}

/// Response envelopes around a data shape.
///
/// # Examples
///
/// ```
/// use contract_schema_core::{ResponseShape, Shape};
/// use serde_json::json;
///
/// let users = ResponseShape::new(Shape::object([("name", Shape::string())]));
/// let page = users.list().with_pagination();
///
/// let body = json!({
///     "pagination": { "currentPage": 1, "totalItems": 1, "itemsPerPage": 10 },
///     "data": [{ "name": "Ada" }],
/// });
/// assert!(page.is_valid(&body));
/// assert!(users.item().is_valid(&json!({ "data": { "name": "Ada" } })));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseShape {
    data: Shape,
}

impl ResponseShape {
    pub fn new(data: Shape) -> Self {
        Self { data }
    }

    /// The bare data shape.
    pub fn data(&self) -> &Shape {
        &self.data
    }

    /// `{data}`
    pub fn item(&self) -> Shape {
        Shape::object([("data", self.data.clone())])
    }

    /// List envelopes.
    pub fn list(&self) -> ListResponse<'_> {
        ListResponse { data: &self.data }
    }
}

/// List envelopes produced by [`ResponseShape::list`].
#[derive(Debug, Clone, Copy)]
pub struct ListResponse<'a> {
    data: &'a Shape,
}

impl ListResponse<'_> {
    /// `{data: [..]}`
    pub fn simple(&self) -> Shape {
        Shape::object([("data", self.data.clone().array())])
    }

    /// `{pagination, data: [..]}`
    pub fn with_pagination(&self) -> Shape {
        Shape::object([
            ("pagination", pagination()),
            ("data", self.data.clone().array()),
        ])
    }
}
