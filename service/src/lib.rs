//! Contract builders for three families of interface:
//!
//! - [`api`]: HTTP-style endpoints with a method, auth flag, path and
//!   request/response shapes. Params render into path segments.
//! - [`command`]: CLI-style commands whose params render as `--name=value`
//!   flags.
//! - [`document`]: persisted entities with identifier and timestamp
//!   augmentations.
//!
//! Every builder meta-validates its configuration and returns an immutable
//! descriptor, or a [`ConfigError`]. Descriptors validate runtime values with
//! the shapes from [`contract_schema_core`].
//!
//! Contracts can also be declared in YAML and loaded with [`ContractFile`].

pub mod api;
pub mod command;
pub mod document;

mod config;
mod error;
mod identity;
mod meta;
mod render;

pub use api::{ApiConfig, ApiSchema, RequestConfig};
pub use command::{CommandConfig, CommandRequestConfig, CommandSchema};
pub use config::{ContractFile, ContractSet};
pub use document::{DocumentConfig, DocumentSchema};
pub use error::{ConfigError, Result, SchemaError};
pub use identity::{Method, Toggle};
pub use render::{JsonTypeRenderer, RenderedParams, TypeofRenderer, ValueKindRenderer};
