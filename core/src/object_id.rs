//! Opaque 12-byte document identifier.
//!
//! Identifiers travel as 24 hexadecimal digits. The first four bytes hold the
//! creation time in seconds since the Unix epoch (big-endian), which
//! [`ObjectId::timestamp`] exposes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Reasons a string is not an [`ObjectId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    /// Wrong number of characters.
    #[error("object id must be 24 hex digits, got {0} character(s)")]
    InvalidLength(usize),
    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hex digit '{ch}' at index {index}")]
    InvalidCharacter { ch: char, index: usize },
}

/// A 12-byte identifier rendered as 24 lower-case hex digits.
///
/// # Examples
///
/// ```
/// use contract_schema_core::ObjectId;
///
/// let id: ObjectId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
/// assert_eq!(id.to_hex(), "65a1f0c2e4b0a1b2c3d4e5f6");
/// assert!(ObjectId::is_valid("65a1f0c2e4b0a1b2c3d4e5f6"));
/// assert!(!ObjectId::is_valid("not-an-id"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Builds an identifier from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parses 24 hex digits (either case).
    pub fn parse_str(s: &str) -> Result<Self, ObjectIdError> {
        let len = s.chars().count();
        if len != 24 {
            return Err(ObjectIdError::InvalidLength(len));
        }

        let mut bytes = [0u8; 12];
        let mut high = 0u8;
        for (index, ch) in s.chars().enumerate() {
            let Some(nibble) = ch.to_digit(16) else {
                return Err(ObjectIdError::InvalidCharacter { ch, index });
            };
            let nibble = nibble as u8;
            if index % 2 == 0 {
                high = nibble;
            } else {
                bytes[index / 2] = (high << 4) | nibble;
            }
        }
        Ok(Self(bytes))
    }

    /// Whether `s` is a well-formed identifier.
    pub fn is_valid(s: &str) -> bool {
        Self::parse_str(s).is_ok()
    }

    /// Lower-case hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// Creation time embedded in the first four bytes.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::<Utc>::from_timestamp(i64::from(secs), 0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::String(id.to_hex())
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_str(&raw).map_err(serde::de::Error::custom)
    }
}
