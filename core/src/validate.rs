//! Validation issues and the aggregated [`ValidationError`].
//!
//! A [`Shape`](crate::Shape) never stops at the first mismatch. Every problem
//! found while walking a value is recorded as an [`Issue`] carrying the path of
//! the offending field, and the whole set is returned as one
//! [`ValidationError`] so callers can report everything at once.
//!
//! # Examples
//!
//! ```
//! use contract_schema_core::*;
//! use serde_json::json;
//!
//! let shape = Shape::object([
//!     ("name", Shape::string()),
//!     ("age", Shape::integer().min(0.0)),
//! ]);
//!
//! let err = shape.parse(&json!({ "age": -1 })).unwrap_err();
//! assert_eq!(err.len(), 2);
//! assert_eq!(err.issues()[0].path_string(), "name");
//! assert!(matches!(err.issues()[1].code, IssueCode::TooSmall { .. }));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One step in the path from the root value to an offending field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array element position.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Reason a value was rejected.
///
/// The `Display` impl provides a human-readable message without the path;
/// see [`Issue`] for the path-qualified form.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    /// The value has the wrong JSON type.
    #[error("expected {expected}, received {received}")]
    InvalidType { expected: String, received: String },
    /// The value differs from the literal the shape pins it to.
    #[error("invalid literal value, expected {expected}")]
    InvalidLiteral { expected: Value },
    /// A required object member is absent.
    #[error("required")]
    Required,
    /// Number below its lower bound.
    #[error("number must be greater than or equal to {minimum}")]
    TooSmall { minimum: f64 },
    /// Number above its upper bound.
    #[error("number must be less than or equal to {maximum}")]
    TooBig { maximum: f64 },
    /// String shorter than its minimum length.
    #[error("string must contain at least {min_len} character(s)")]
    TooShort { min_len: usize },
    /// String longer than its maximum length.
    #[error("string must contain at most {max_len} character(s)")]
    TooLong { max_len: usize },
    /// Number with a fractional part where an integer is required.
    #[error("expected integer, received float")]
    NotInteger,
    /// Strict object received members it does not declare.
    #[error("unrecognized key(s) in object: {}", .keys.join(", "))]
    UnrecognizedKeys { keys: Vec<String> },
    /// String that is not an RFC 3339 timestamp.
    #[error("invalid date: {received}")]
    InvalidDate { received: String },
    /// String that is not a 24-digit hexadecimal identifier.
    #[error("invalid object id: {received}")]
    InvalidObjectId { received: String },
    /// Text that could not be repaired into JSON.
    #[error("invalid JSON text: {reason}")]
    InvalidJson { reason: String },
    /// No union member accepted the value.
    #[error("value matches none of the {options} union option(s)")]
    InvalidUnion { options: usize },
    /// Intersection members produced incompatible outputs.
    #[error("intersection results could not be merged")]
    IntersectionConflict,
}

/// A single mismatch and where it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Path from the validated root to the offending value.
    pub path: Vec<PathSegment>,
    /// What went wrong.
    #[serde(flatten)]
    pub code: IssueCode,
}

impl Issue {
    /// Creates an issue at `path`.
    pub fn new(path: Vec<PathSegment>, code: IssueCode) -> Self {
        Self { path, code }
    }

    /// Renders the path as `a.b[0].c`. The root path renders as an empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use contract_schema_core::{Issue, IssueCode, PathSegment};
    ///
    /// let issue = Issue::new(
    ///     vec!["items".into(), PathSegment::Index(2), "name".into()],
    ///     IssueCode::Required,
    /// );
    /// assert_eq!(issue.path_string(), "items[2].name");
    /// ```
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                PathSegment::Key(key) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(key);
                }
                PathSegment::Index(index) => {
                    out.push_str(&format!("[{index}]"));
                }
            }
        }
        out
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.path_string(), self.code)
        }
    }
}

/// Every issue found while validating one value.
///
/// Never constructed empty by [`Shape::parse`](crate::Shape::parse).
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Wraps a set of issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// All issues, in discovery order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consumes the error and returns its issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether the error carries no issues.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Distinct top-level keys named by the issue paths, in first-seen order.
    pub fn top_level_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if let Some(PathSegment::Key(key)) = issue.path.first() {
                if !keys.contains(&key.as_str()) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}
