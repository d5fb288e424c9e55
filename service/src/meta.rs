//! Meta-validation helpers shared by the builders.

use std::sync::LazyLock;

use contract_schema_core::Shape;
use regex::Regex;

use crate::error::ConfigError;

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").expect("static regex must compile")
});

pub(crate) fn require<T>(field: &'static str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or(ConfigError::MissingField(field))
}

pub(crate) fn require_object(field: &'static str, shape: &Shape) -> Result<(), ConfigError> {
    if shape.is_object() {
        Ok(())
    } else {
        Err(ConfigError::NotObjectShape {
            field,
            kind: shape.kind(),
        })
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), ConfigError> {
    if KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey(key.to_string()))
    }
}

pub(crate) fn check_path(path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath(path.to_string()))
    }
}
