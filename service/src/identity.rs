//! Identity tags fixed at schema construction.
//!
//! Methods and toggles are closed enums, so a built descriptor can only ever
//! carry one of the accepted values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// HTTP-style method of an endpoint.
///
/// # Examples
///
/// ```
/// use contract_schema_service::Method;
///
/// assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
/// assert_eq!(Method::Patch.as_str(), "patch");
/// assert!("trace".parse::<Method>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Patch,
    ];

    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
            Self::Patch => "patch",
        }
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidMethod(s.to_string()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A `YES`/`NO` flag (authentication, disabled state).
///
/// Defaults to [`Toggle::No`], the least restrictive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Toggle {
    #[serde(rename = "YES")]
    Yes,
    #[default]
    #[serde(rename = "NO")]
    No,
}

impl Toggle {
    /// `"YES"` or `"NO"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    pub const fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Parses the exact strings `YES` and `NO`, naming `field` on failure.
    pub fn parse_field(field: &'static str, raw: &str) -> Result<Self, ConfigError> {
        match raw {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(ConfigError::InvalidToggle {
                field,
                value: raw.to_string(),
            }),
        }
    }
}

impl FromStr for Toggle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_field("toggle", s)
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        if value { Self::Yes } else { Self::No }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Toggle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
