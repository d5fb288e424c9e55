//! Shape validators and shared shape utilities.
//!
//! This crate provides the validation layer the contract builders are made
//! of:
//!
//! - [`Shape`]: declarative description of a JSON value; [`Shape::parse`]
//!   validates and canonicalizes, reporting every mismatch at once.
//! - [`ObjectShape`]: object members in declaration order, with
//!   [`pick`](ObjectShape::pick) and [`omit`](ObjectShape::omit).
//! - [`ValidationError`] / [`Issue`]: path-qualified mismatch reports.
//! - [`ObjectId`]: opaque 12-byte document identifiers.
//! - [`repair_json`]: best-effort repair of near-valid JSON text.
//! - [`pagination`], [`json_object`], [`object_id`], [`ResponseShape`]:
//!   reusable shapes.
//!
//! # Example
//!
//! ```
//! use contract_schema_core::*;
//! use serde_json::json;
//!
//! let user = Shape::object([
//!     ("id", object_id()),
//!     ("name", Shape::string().min(1.0)),
//!     ("createdAt", Shape::date()),
//! ]);
//!
//! let canonical = user
//!     .parse(&json!({
//!         "id": "65A1F0C2E4B0A1B2C3D4E5F6",
//!         "name": "Ada",
//!         "createdAt": "2024-03-01T12:00:00Z",
//!     }))
//!     .unwrap();
//! assert_eq!(canonical["id"], "65a1f0c2e4b0a1b2c3d4e5f6");
//! assert_eq!(canonical["createdAt"], "2024-03-01T12:00:00.000Z");
//!
//! // Canonical values validate to themselves.
//! assert_eq!(user.parse(&canonical).unwrap(), canonical);
//! ```

mod object_id;
mod repair;
mod shape;
mod utils;
mod validate;

pub use object_id::{ObjectId, ObjectIdError};
pub use repair::{RepairError, repair_json};
pub use shape::{ObjectShape, Shape};
pub use utils::{ListResponse, ResponseShape, json_object, object_id, pagination};
pub use validate::{Issue, IssueCode, PathSegment, ValidationError};
