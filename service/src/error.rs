//! Error types for contract building and serialization.
//!
//! Two classes of failure are kept distinct:
//!
//! - [`ConfigError`]: a builder was handed a bad configuration. It is returned
//!   from `build()` before anything is derived.
//! - [`ValidationError`]: a runtime value did not match its shape. Every
//!   mismatch is reported.
//!
//! [`SchemaError`] unifies both with serialization-order and contract-file
//! failures.

use contract_schema_core::ValidationError;
use thiserror::Error;

/// Builder configuration rejected during meta-validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Method outside the supported verb set.
    #[error(
        "unsupported method `{0}` (expected one of get, post, put, delete, head, options, patch)"
    )]
    InvalidMethod(String),
    /// Toggle field that is neither `YES` nor `NO`.
    #[error("`{field}` must be \"YES\" or \"NO\", got `{value}`")]
    InvalidToggle { field: &'static str, value: String },
    /// Path template without a leading `/`.
    #[error("path must start with '/', got `{0}`")]
    InvalidPath(String),
    /// A required configuration field was not supplied.
    #[error("`{0}` is required")]
    MissingField(&'static str),
    /// Key is empty or contains characters outside `[A-Za-z0-9_.:-]`.
    #[error("invalid key `{0}`")]
    InvalidKey(String),
    /// A shape that must describe an object does not.
    #[error("`{field}` must be an object shape, got {kind}")]
    NotObjectShape { field: &'static str, kind: &'static str },
    /// Identifier member name is empty or contains whitespace.
    #[error("invalid identifier field name `{0}`")]
    InvalidIdField(String),
}

/// Errors raised by contract operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Builder meta-validation failure.
    #[error("invalid schema configuration: {0}")]
    Config(#[from] ConfigError),

    /// Runtime value rejected by a shape.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Parameter order names a member the params shape does not declare.
    #[error("unknown parameter `{0}` in parameter order")]
    UnknownParam(String),

    /// Parameter order names a member twice.
    #[error("parameter `{0}` appears more than once in parameter order")]
    DuplicateParam(String),

    /// Parameter order names a member the value does not carry.
    #[error("parameter `{0}` has no value")]
    MissingParam(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A named contract in a contract file failed meta-validation.
    #[error("contract `{name}`: {source}")]
    Contract {
        name: String,
        #[source]
        source: ConfigError,
    },
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
