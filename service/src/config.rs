//! Contract files: declarative YAML descriptions of a set of contracts.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! endpoints:
//!   listUsers:
//!     method: get
//!     auth: "YES"
//!     path: /users
//!     body: { type: object }
//!     params:
//!       type: object
//!       fields:
//!         pageSize: { type: number, integer: true }
//!         currentPage: { type: number, integer: true }
//!     query: { type: object }
//!     response: { type: any }
//! commands:
//!   start:
//!     key: start
//!     body: { type: any }
//!     params:
//!       type: object
//!       fields:
//!         global: { type: boolean }
//!     response: { type: any }
//! documents:
//!   user:
//!     key: user
//!     document:
//!       type: object
//!       fields:
//!         name: { type: string }
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::{ApiConfig, ApiSchema};
use crate::command::{CommandConfig, CommandSchema};
use crate::document::{DocumentConfig, DocumentSchema};
use crate::error::{ConfigError, Result, SchemaError};

/// A contract file as written on disk.
///
/// Entries are keyed by contract name. Building the file meta-validates every
/// entry and fails on the first bad one, naming it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractFile {
    /// File format version (e.g. `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, ApiConfig>,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandConfig>,
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentConfig>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl ContractFile {
    /// Loads a contract file from YAML on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](SchemaError::Io) if the file cannot be read, or
    /// [`Yaml`](SchemaError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let contracts: Self = serde_yaml::from_reader(reader)?;
        debug!(
            path = %path.display(),
            endpoints = contracts.endpoints.len(),
            commands = contracts.commands.len(),
            documents = contracts.documents.len(),
            "Loaded contract file"
        );
        Ok(contracts)
    }

    /// Parses a contract file from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serializes the file back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builds every contract in the file.
    ///
    /// # Errors
    ///
    /// Returns [`Contract`](SchemaError::Contract) naming the first entry that
    /// fails meta-validation.
    pub fn build(&self) -> Result<ContractSet> {
        let endpoints = build_all(&self.endpoints, |config| config.build())?;
        let commands = build_all(&self.commands, |config| config.build())?;
        let documents = build_all(&self.documents, |config| config.build())?;

        info!(
            version = %self.version,
            endpoints = endpoints.len(),
            commands = commands.len(),
            documents = documents.len(),
            "Built contract set"
        );

        Ok(ContractSet {
            endpoints,
            commands,
            documents,
        })
    }
}

fn build_all<C: Clone, S>(
    entries: &BTreeMap<String, C>,
    build: impl Fn(C) -> std::result::Result<S, ConfigError>,
) -> Result<BTreeMap<String, S>> {
    entries
        .iter()
        .map(|(name, config)| {
            build(config.clone())
                .map(|schema| (name.clone(), schema))
                .map_err(|source| SchemaError::Contract {
                    name: name.clone(),
                    source,
                })
        })
        .collect()
}

/// Built contracts, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct ContractSet {
    endpoints: BTreeMap<String, ApiSchema>,
    commands: BTreeMap<String, CommandSchema>,
    documents: BTreeMap<String, DocumentSchema>,
}

impl ContractSet {
    pub fn endpoint(&self, name: &str) -> Option<&ApiSchema> {
        self.endpoints.get(name)
    }

    pub fn command(&self, name: &str) -> Option<&CommandSchema> {
        self.commands.get(name)
    }

    pub fn document(&self, name: &str) -> Option<&DocumentSchema> {
        self.documents.get(name)
    }

    /// Endpoint names in sorted order.
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Total number of contracts of every family.
    pub fn len(&self) -> usize {
        self.endpoints.len() + self.commands.len() + self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    const CONTRACTS: &str = r#"
version: "1.0"
endpoints:
  listUsers:
    method: get
    auth: "YES"
    path: /users
    body: { type: object }
    params:
      type: object
      fields:
        pageSize: { type: number, integer: true }
        currentPage: { type: number, integer: true }
    query:
      type: object
      fields:
        verbose: { type: optional, inner: { type: boolean } }
    response: { type: any }
commands:
  start:
    key: start
    body: { type: any }
    params:
      type: object
      fields:
        global: { type: boolean }
        flat: { type: literal, value: UAE }
    response: { type: any }
documents:
  user:
    key: user
    document:
      type: object
      fields:
        name: { type: string }
"#;

    #[test]
    fn test_from_yaml_str_and_build() {
        let file = ContractFile::from_yaml_str(CONTRACTS).unwrap();
        assert_eq!(file.version, "1.0");

        let set = file.build().unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.endpoint_count(), 1);

        let list = set.endpoint("listUsers").unwrap();
        assert_eq!(
            list.make_full_path(&json!({ "pageSize": 12, "currentPage": 10 }), &["pageSize", "currentPage"])
                .unwrap(),
            "/users/12/10"
        );

        let start = set.command("start").unwrap();
        assert_eq!(
            start
                .make_full_path(&json!({ "global": true, "flat": "UAE" }))
                .unwrap(),
            "start --global=true--flat=UAE"
        );

        assert_eq!(set.document("user").unwrap().full_key(), "users");
        assert!(set.endpoint("missing").is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CONTRACTS.as_bytes()).unwrap();

        let contracts = ContractFile::load(file.path()).unwrap();
        assert_eq!(
            contracts.endpoints.keys().collect::<Vec<_>>(),
            vec!["listUsers"]
        );
        assert_eq!(contracts.build().unwrap().command_names().collect::<Vec<_>>(), vec!["start"]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ContractFile::load("/nonexistent/contracts.yml").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }

    #[test]
    fn test_bad_yaml_is_yaml_error() {
        let err = ContractFile::from_yaml_str("endpoints: [not, a, map]").unwrap_err();
        assert!(matches!(err, SchemaError::Yaml(_)));
    }

    #[test]
    fn test_build_names_bad_contract() {
        let yaml = r#"
endpoints:
  broken:
    method: fetch
    auth: "NO"
    path: /x
    body: { type: any }
    params: { type: object }
    query: { type: object }
    response: { type: any }
"#;
        let err = ContractFile::from_yaml_str(yaml).unwrap().build().unwrap_err();
        match err {
            SchemaError::Contract { name, source } => {
                assert_eq!(name, "broken");
                assert_eq!(source, ConfigError::InvalidMethod("fetch".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_defaults() {
        let file = ContractFile::from_yaml_str("{}").unwrap();
        assert_eq!(file.version, "1.0");
        assert!(file.build().unwrap().is_empty());
    }

    #[test]
    fn test_yaml_round_trip_preserves_contracts() {
        let file = ContractFile::from_yaml_str(CONTRACTS).unwrap();
        let again = ContractFile::from_yaml_str(&file.to_yaml_string().unwrap()).unwrap();
        assert_eq!(again.endpoints, file.endpoints);
        assert_eq!(again.commands.len(), 1);
    }
}
