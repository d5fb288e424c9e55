//! Text rendering of parameter values.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

/// Result of serializing parameters: the template and the concrete string,
/// built in the same pass so their segments line up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedParams {
    /// Template with placeholders (`/:id`, `--flag=<kind>`).
    pub shape: String,
    /// Same template with concrete values substituted.
    pub value: String,
}

/// Names the kind of a parameter value in command shape strings.
///
/// The set of names is not fixed; swap the renderer to change it.
pub trait ValueKindRenderer: fmt::Debug + Send + Sync {
    fn kind_name(&self, value: &Value) -> Cow<'static, str>;
}

/// Mirrors JavaScript `typeof`: arrays and `null` report `object`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeofRenderer;

impl ValueKindRenderer for TypeofRenderer {
    fn kind_name(&self, value: &Value) -> Cow<'static, str> {
        Cow::Borrowed(match value {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
        })
    }
}

/// Reports the JSON type name, distinguishing `null`, `array` and `integer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTypeRenderer;

impl ValueKindRenderer for JsonTypeRenderer {
    fn kind_name(&self, value: &Value) -> Cow<'static, str> {
        Cow::Borrowed(match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        })
    }
}

/// Plain text of a value: strings unquoted, everything else as compact JSON.
pub(crate) fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Value text percent-encoded for use as one path segment.
pub(crate) fn path_segment(value: &Value) -> String {
    urlencoding::encode(&value_text(value)).into_owned()
}
