//! The [`Shape`] validator.
//!
//! A shape describes what a JSON value must look like. [`Shape::parse`]
//! checks a value against it and returns a canonicalized copy, or a
//! [`ValidationError`] listing every mismatch. Shapes compose: objects can be
//! picked from, shapes can be intersected with [`Shape::and`], wrapped in
//! arrays with [`Shape::array`], and so on.
//!
//! Shapes are plain data and (de)serialize with serde, so they can also be
//! declared in configuration files:
//!
//! ```
//! use contract_schema_core::Shape;
//!
//! let shape: Shape = serde_json::from_str(
//!     r#"{"type": "object", "fields": {"page": {"type": "number", "integer": true, "min": 1}}}"#,
//! )
//! .unwrap();
//! assert_eq!(shape, Shape::object([("page", Shape::integer().min(1.0))]));
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::object_id::ObjectId;
use crate::repair::repair_json;
use crate::validate::{Issue, IssueCode, PathSegment, ValidationError};

/// Declarative description of an acceptable JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Accepts anything, including an absent object member.
    #[default]
    Any,
    /// A string, optionally length-bounded (in characters).
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_len: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_len: Option<usize>,
    },
    /// A number, optionally integral and bounded (inclusive).
    Number {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        integer: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
    /// Exactly this value.
    Literal { value: Value },
    /// An object with declared members.
    Object(ObjectShape),
    /// An array whose elements all match `items`.
    Array { items: Box<Shape> },
    /// `inner`, or absent when used as an object member.
    Optional { inner: Box<Shape> },
    /// `inner` or `null`.
    Nullable { inner: Box<Shape> },
    /// The first option that accepts the value.
    Union { options: Vec<Shape> },
    /// Every part must accept the value; object outputs are merged.
    Intersection { parts: Vec<Shape> },
    /// RFC 3339 timestamp, canonicalized to UTC with millisecond precision.
    Date,
    /// A 24-hex-digit identifier or `{"$oid": "<hex>"}`, canonicalized to
    /// lower-case hex.
    ObjectId,
    /// JSON text that is repaired, parsed and validated against `inner`.
    /// Already-parsed values are validated against `inner` directly.
    JsonText { inner: Box<Shape> },
}

impl Shape {
    pub fn any() -> Self {
        Self::Any
    }

    pub fn string() -> Self {
        Self::String {
            min_len: None,
            max_len: None,
        }
    }

    pub fn number() -> Self {
        Self::Number {
            integer: false,
            min: None,
            max: None,
        }
    }

    pub fn integer() -> Self {
        Self::Number {
            integer: true,
            min: None,
            max: None,
        }
    }

    pub fn boolean() -> Self {
        Self::Boolean
    }

    pub fn null() -> Self {
        Self::Null
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Builds an object shape from `(name, shape)` pairs in declaration order.
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Shape)>) -> Self {
        Self::Object(ObjectShape::new(fields))
    }

    /// An object shape with no members.
    pub fn empty_object() -> Self {
        Self::Object(ObjectShape::default())
    }

    pub fn date() -> Self {
        Self::Date
    }

    pub fn object_id() -> Self {
        Self::ObjectId
    }

    pub fn json_text(inner: Shape) -> Self {
        Self::JsonText {
            inner: Box::new(inner),
        }
    }

    /// An array of `self`.
    pub fn array(self) -> Self {
        Self::Array {
            items: Box::new(self),
        }
    }

    pub fn optional(self) -> Self {
        Self::Optional {
            inner: Box::new(self),
        }
    }

    pub fn nullable(self) -> Self {
        Self::Nullable {
            inner: Box::new(self),
        }
    }

    /// Union of `self` and `other`; nested unions are flattened.
    pub fn or(self, other: Shape) -> Self {
        let mut options = match self {
            Self::Union { options } => options,
            shape => vec![shape],
        };
        match other {
            Self::Union { options: more } => options.extend(more),
            shape => options.push(shape),
        }
        Self::Union { options }
    }

    /// Intersection of `self` and `other`; nested intersections are flattened.
    ///
    /// # Examples
    ///
    /// ```
    /// use contract_schema_core::Shape;
    /// use serde_json::json;
    ///
    /// let named = Shape::object([("name", Shape::string())]);
    /// let aged = Shape::object([("age", Shape::integer())]);
    /// let person = named.and(aged);
    ///
    /// let out = person.parse(&json!({ "name": "Ada", "age": 36, "x": 1 })).unwrap();
    /// assert_eq!(out, json!({ "name": "Ada", "age": 36 }));
    /// assert!(person.parse(&json!({ "name": "Ada" })).is_err());
    /// ```
    pub fn and(self, other: Shape) -> Self {
        let mut parts = match self {
            Self::Intersection { parts } => parts,
            shape => vec![shape],
        };
        match other {
            Self::Intersection { parts: more } => parts.extend(more),
            shape => parts.push(shape),
        }
        Self::Intersection { parts }
    }

    /// Lower bound: minimum value for numbers, minimum length for strings.
    /// Other shapes are returned unchanged.
    pub fn min(self, bound: f64) -> Self {
        match self {
            Self::Number { integer, max, .. } => Self::Number {
                integer,
                min: Some(bound),
                max,
            },
            Self::String { max_len, .. } => Self::String {
                min_len: Some(bound.max(0.0) as usize),
                max_len,
            },
            shape => shape,
        }
    }

    /// Upper bound: maximum value for numbers, maximum length for strings.
    /// Other shapes are returned unchanged.
    pub fn max(self, bound: f64) -> Self {
        match self {
            Self::Number { integer, min, .. } => Self::Number {
                integer,
                min,
                max: Some(bound),
            },
            Self::String { min_len, .. } => Self::String {
                min_len,
                max_len: Some(bound.max(0.0) as usize),
            },
            shape => shape,
        }
    }

    /// Rejects undeclared members. Only affects object shapes.
    pub fn strict(self) -> Self {
        match self {
            Self::Object(object) => Self::Object(object.strict()),
            shape => shape,
        }
    }

    /// Short name of the shape kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String { .. } => "string",
            Self::Number { integer: true, .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Literal { .. } => "literal",
            Self::Object(_) => "object",
            Self::Array { .. } => "array",
            Self::Optional { .. } => "optional",
            Self::Nullable { .. } => "nullable",
            Self::Union { .. } => "union",
            Self::Intersection { .. } => "intersection",
            Self::Date => "date",
            Self::ObjectId => "object_id",
            Self::JsonText { .. } => "json_text",
        }
    }

    /// The object shape, if `self` is a plain object.
    pub fn as_object(&self) -> Option<&ObjectShape> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Declared member names when `self` is object-shaped: a plain object, or
    /// an intersection whose parts are all object-shaped.
    pub fn field_names(&self) -> Option<Vec<&str>> {
        match self {
            Self::Object(object) => Some(object.field_names()),
            Self::Intersection { parts } => {
                let mut names: Vec<&str> = Vec::new();
                for part in parts {
                    for name in part.field_names()? {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                Some(names)
            }
            _ => None,
        }
    }

    /// Whether values of this shape are always JSON objects with known members.
    pub fn is_object(&self) -> bool {
        self.field_names().is_some()
    }

    /// Whether an object member with this shape may be absent.
    fn accepts_missing(&self) -> bool {
        matches!(self, Self::Optional { .. } | Self::Any)
    }

    /// Validates `value` and returns its canonical form.
    pub fn parse(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut path = Vec::new();
        let mut issues = Vec::new();
        match self.check(value, &mut path, &mut issues) {
            Some(out) if issues.is_empty() => Ok(out),
            _ => Err(ValidationError::new(issues)),
        }
    }

    /// Whether `value` is accepted.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.parse(value).is_ok()
    }

    /// Returns the canonical value, or `None` after recording at least one issue.
    fn check(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        match self {
            Self::Any => Some(value.clone()),
            Self::String { min_len, max_len } => {
                let Value::String(s) = value else {
                    return invalid_type("string", value, path, issues);
                };
                let len = s.chars().count();
                let mut ok = true;
                if let Some(min_len) = *min_len {
                    if len < min_len {
                        issues.push(Issue::new(path.clone(), IssueCode::TooShort { min_len }));
                        ok = false;
                    }
                }
                if let Some(max_len) = *max_len {
                    if len > max_len {
                        issues.push(Issue::new(path.clone(), IssueCode::TooLong { max_len }));
                        ok = false;
                    }
                }
                ok.then(|| value.clone())
            }
            Self::Number { integer, min, max } => {
                let Some(n) = value.as_f64() else {
                    let expected = if *integer { "integer" } else { "number" };
                    return invalid_type(expected, value, path, issues);
                };
                let mut ok = true;
                if *integer && !(value.is_i64() || value.is_u64() || n.fract() == 0.0) {
                    issues.push(Issue::new(path.clone(), IssueCode::NotInteger));
                    ok = false;
                }
                if let Some(minimum) = *min {
                    if n < minimum {
                        issues.push(Issue::new(path.clone(), IssueCode::TooSmall { minimum }));
                        ok = false;
                    }
                }
                if let Some(maximum) = *max {
                    if n > maximum {
                        issues.push(Issue::new(path.clone(), IssueCode::TooBig { maximum }));
                        ok = false;
                    }
                }
                ok.then(|| canonical_number(value, n))
            }
            Self::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                _ => invalid_type("boolean", value, path, issues),
            },
            Self::Null => match value {
                Value::Null => Some(Value::Null),
                _ => invalid_type("null", value, path, issues),
            },
            Self::Literal { value: expected } => {
                if value == expected {
                    Some(value.clone())
                } else {
                    issues.push(Issue::new(
                        path.clone(),
                        IssueCode::InvalidLiteral {
                            expected: expected.clone(),
                        },
                    ));
                    None
                }
            }
            Self::Object(object) => object.check(value, path, issues),
            Self::Array { items } => {
                let Value::Array(elements) = value else {
                    return invalid_type("array", value, path, issues);
                };
                let mut out = Vec::with_capacity(elements.len());
                let mut ok = true;
                for (index, element) in elements.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    match items.check(element, path, issues) {
                        Some(parsed) => out.push(parsed),
                        None => ok = false,
                    }
                    path.pop();
                }
                ok.then_some(Value::Array(out))
            }
            Self::Optional { inner } => inner.check(value, path, issues),
            Self::Nullable { inner } => match value {
                Value::Null => Some(Value::Null),
                _ => inner.check(value, path, issues),
            },
            Self::Union { options } => {
                for option in options {
                    let mut scratch_path = path.clone();
                    let mut scratch = Vec::new();
                    if let Some(out) = option.check(value, &mut scratch_path, &mut scratch) {
                        if scratch.is_empty() {
                            return Some(out);
                        }
                    }
                }
                issues.push(Issue::new(
                    path.clone(),
                    IssueCode::InvalidUnion {
                        options: options.len(),
                    },
                ));
                None
            }
            Self::Intersection { parts } => {
                let mut outputs = Vec::with_capacity(parts.len());
                let mut ok = true;
                for part in parts {
                    match part.check(value, path, issues) {
                        Some(out) => outputs.push(out),
                        None => ok = false,
                    }
                }
                if !ok {
                    return None;
                }
                let mut merged = outputs.into_iter();
                let first = merged.next().unwrap_or_else(|| value.clone());
                let result = merged.try_fold(first, merge_outputs);
                if result.is_none() {
                    issues.push(Issue::new(path.clone(), IssueCode::IntersectionConflict));
                }
                result
            }
            Self::Date => {
                let Value::String(raw) = value else {
                    return invalid_type("date", value, path, issues);
                };
                match DateTime::parse_from_rfc3339(raw) {
                    Ok(parsed) => Some(Value::String(
                        parsed
                            .with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::Millis, true),
                    )),
                    Err(_) => {
                        issues.push(Issue::new(
                            path.clone(),
                            IssueCode::InvalidDate {
                                received: raw.clone(),
                            },
                        ));
                        None
                    }
                }
            }
            Self::ObjectId => {
                let raw = match value {
                    Value::String(raw) => raw,
                    Value::Object(map) if map.len() == 1 => match map.get("$oid") {
                        Some(Value::String(raw)) => raw,
                        _ => return invalid_type("object_id", value, path, issues),
                    },
                    _ => return invalid_type("object_id", value, path, issues),
                };
                match ObjectId::parse_str(raw) {
                    Ok(id) => Some(id.into()),
                    Err(_) => {
                        issues.push(Issue::new(
                            path.clone(),
                            IssueCode::InvalidObjectId {
                                received: raw.clone(),
                            },
                        ));
                        None
                    }
                }
            }
            Self::JsonText { inner } => {
                let Value::String(text) = value else {
                    return inner.check(value, path, issues);
                };
                let parsed = repair_json(text)
                    .map_err(|e| e.to_string())
                    .and_then(|fixed| {
                        serde_json::from_str::<Value>(&fixed).map_err(|e| e.to_string())
                    });
                match parsed {
                    Ok(parsed) => inner.check(&parsed, path, issues),
                    Err(reason) => {
                        issues.push(Issue::new(path.clone(), IssueCode::InvalidJson { reason }));
                        None
                    }
                }
            }
        }
    }
}

/// Whole floats within integer range become integers (`12.0` -> `12`).
fn canonical_number(value: &Value, n: f64) -> Value {
    if value.is_i64() || value.is_u64() || n.fract() != 0.0 {
        return value.clone();
    }
    if n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::from(n as i64)
    } else if n >= 0.0 && n < u64::MAX as f64 {
        Value::from(n as u64)
    } else {
        value.clone()
    }
}

impl From<ObjectShape> for Shape {
    fn from(object: ObjectShape) -> Self {
        Self::Object(object)
    }
}

/// Member list of an object shape.
///
/// Members keep their declaration order, which is also the key order of
/// canonical output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectShape {
    #[serde(default, with = "ordered_fields")]
    fields: Vec<(String, Shape)>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    strict: bool,
}

impl ObjectShape {
    /// Creates an object shape. A repeated name replaces the earlier member
    /// in place.
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, Shape)>) -> Self {
        let mut object = Self::default();
        for (name, shape) in fields {
            object = object.with_field(name, shape);
        }
        object
    }

    /// Adds or replaces a member.
    pub fn with_field(mut self, name: impl Into<String>, shape: Shape) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = shape,
            None => self.fields.push((name, shape)),
        }
        self
    }

    /// Rejects undeclared members instead of stripping them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn fields(&self) -> &[(String, Shape)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Shape> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, shape)| shape)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sub-shape with only the named members, in declaration order.
    /// Unknown names are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use contract_schema_core::{ObjectShape, Shape};
    ///
    /// let full = ObjectShape::new([
    ///     ("a", Shape::string()),
    ///     ("b", Shape::number()),
    ///     ("c", Shape::boolean()),
    /// ]);
    /// assert_eq!(full.pick(&["c", "a"]).field_names(), vec!["a", "c"]);
    /// ```
    pub fn pick(&self, names: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .cloned()
                .collect(),
            strict: self.strict,
        }
    }

    /// Sub-shape without the named members.
    pub fn omit(&self, names: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| !names.contains(&name.as_str()))
                .cloned()
                .collect(),
            strict: self.strict,
        }
    }

    fn check(
        &self,
        value: &Value,
        path: &mut Vec<PathSegment>,
        issues: &mut Vec<Issue>,
    ) -> Option<Value> {
        let Value::Object(map) = value else {
            return invalid_type("object", value, path, issues);
        };

        let mut out = Map::new();
        let mut ok = true;
        for (name, shape) in &self.fields {
            path.push(PathSegment::Key(name.clone()));
            match map.get(name) {
                Some(member) => match shape.check(member, path, issues) {
                    Some(parsed) => {
                        out.insert(name.clone(), parsed);
                    }
                    None => ok = false,
                },
                None if shape.accepts_missing() => {}
                None => {
                    issues.push(Issue::new(path.clone(), IssueCode::Required));
                    ok = false;
                }
            }
            path.pop();
        }

        if self.strict {
            let unknown: Vec<String> = map
                .keys()
                .filter(|key| self.field(key).is_none())
                .cloned()
                .collect();
            if !unknown.is_empty() {
                issues.push(Issue::new(
                    path.clone(),
                    IssueCode::UnrecognizedKeys { keys: unknown },
                ));
                ok = false;
            }
        }

        ok.then_some(Value::Object(out))
    }
}

fn received_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(
    expected: &str,
    value: &Value,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    issues.push(Issue::new(
        path.to_vec(),
        IssueCode::InvalidType {
            expected: expected.to_string(),
            received: received_kind(value).to_string(),
        },
    ));
    None
}

/// Merges two intersection outputs. Objects merge member-wise; anything
/// else must be equal.
fn merge_outputs(left: Value, right: Value) -> Option<Value> {
    match (left, right) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                let merged = match left.remove(&key) {
                    Some(existing) => merge_outputs(existing, value)?,
                    None => value,
                };
                left.insert(key, merged);
            }
            Some(Value::Object(left))
        }
        (left, right) if left == right => Some(left),
        _ => None,
    }
}

/// Serializes object members as a map while keeping declaration order.
mod ordered_fields {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};

    use super::Shape;

    pub fn serialize<S: Serializer>(
        fields: &[(String, Shape)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(fields.iter().map(|(name, shape)| (name, shape)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Shape)>, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Vec<(String, Shape)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of member names to shapes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields: Vec<(String, Shape)> = Vec::new();
                while let Some((name, shape)) = access.next_entry::<String, Shape>()? {
                    if fields.iter().any(|(existing, _)| *existing == name) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate member `{name}`"
                        )));
                    }
                    fields.push((name, shape));
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}
